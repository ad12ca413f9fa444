use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    routing::post,
};
use chrono::{FixedOffset, TimeZone};
use dompet::clock::ManualClock;
use dompet::conversation::{ConversationRouter, replies, spawn_sessions};
use dompet::ledger::MemoryLedger;
use dompet::reminder::{self, MemoryPreferences};
use dompet::server::access_log::Delivery;
use dompet::telegram::{
    TelegramClient, UpdateDispatcher, WebhookState, run_polling, webhook_router,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceExt;
use url::Url;

const BOT_TOKEN: &str = "123456:test-token";
const SECRET: &str = "s3cret";

#[derive(Clone, Default)]
struct FakeTelegram {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
    pending: Arc<Mutex<Vec<Value>>>,
}

impl FakeTelegram {
    fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn sent_texts(&self) -> Vec<(i64, String)> {
        self.calls()
            .into_iter()
            .filter(|(method, _)| method == "sendMessage")
            .map(|(_, body)| {
                (
                    body["chat_id"].as_i64().unwrap(),
                    body["text"].as_str().unwrap().to_string(),
                )
            })
            .collect()
    }
}

async fn bot_method(
    State(fake): State<FakeTelegram>,
    Path((bot, method)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    assert_eq!(bot, format!("bot{BOT_TOKEN}"));
    fake.calls.lock().unwrap().push((method.clone(), body.clone()));

    let result = match method.as_str() {
        "sendMessage" => json!({
            "message_id": 100,
            "chat": {"id": body["chat_id"], "type": "private"},
            "date": 0,
            "text": body["text"],
        }),
        "getUpdates" => {
            let batch: Vec<Value> = fake.pending.lock().unwrap().drain(..).collect();
            if batch.is_empty() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            json!(batch)
        }
        "answerCallbackQuery" | "deleteWebhook" | "setWebhook" => json!(true),
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"ok": false, "error_code": 404, "description": "Not Found"})),
            );
        }
    };
    (StatusCode::OK, Json(json!({"ok": true, "result": result})))
}

async fn spawn_fake_telegram(fake: FakeTelegram) -> Url {
    let app = Router::new()
        .route("/{bot}/{method}", post(bot_method))
        .with_state(fake);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });
    Url::parse(&format!("http://{}/", addr)).expect("valid base url")
}

async fn dispatcher(fake: FakeTelegram) -> (UpdateDispatcher, TelegramClient) {
    let api_url = spawn_fake_telegram(fake).await;
    let client = TelegramClient::new(reqwest::Client::new(), api_url, BOT_TOKEN, 30);

    let clock = Arc::new(ManualClock::new(
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 17, 12, 0, 0)
            .unwrap(),
    ));
    let sessions = spawn_sessions().await.expect("session actor");
    let preferences = reminder::spawn(Arc::new(MemoryPreferences::new()))
        .await
        .expect("preference actor");
    let router = ConversationRouter::new(
        Arc::new(MemoryLedger::new()),
        sessions,
        preferences,
        clock,
    );
    (UpdateDispatcher::new(router, client.clone()), client)
}

fn text_update(update_id: i64, chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "chat": {"id": chat_id, "type": "private"},
            "date": 1_792_200_000,
            "text": text,
        }
    })
}

fn webhook_post(body: &Value, secret: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        builder = builder.header("x-telegram-bot-api-secret-token", secret);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn webhook_rejects_missing_or_wrong_secret() {
    let fake = FakeTelegram::default();
    let (dispatcher, _) = dispatcher(fake.clone()).await;
    let app = webhook_router(WebhookState::new(dispatcher, Some(SECRET)));

    let update = text_update(1, 42, "/start");
    let resp = app
        .clone()
        .oneshot(webhook_post(&update, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .oneshot(webhook_post(&update, Some("nope")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn webhook_update_is_answered_through_the_bot_api() {
    let fake = FakeTelegram::default();
    let (dispatcher, _) = dispatcher(fake.clone()).await;
    let app = webhook_router(WebhookState::new(dispatcher, Some(SECRET)));

    let resp = app
        .clone()
        .oneshot(webhook_post(&text_update(1, 42, "10rb, Makanan, Siang"), Some(SECRET)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(
        resp.extensions().get::<Delivery>(),
        Some(&Delivery::Dispatched {
            update_id: 1,
            chat_id: Some(42)
        })
    );

    let sent = fake.sent_texts();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 42);
    assert!(sent[0].1.starts_with("✅Data berhasil ditambahkan."));

    app.oneshot(webhook_post(&text_update(2, 42, "/summary"), Some(SECRET)))
        .await
        .unwrap();
    assert_eq!(
        fake.sent_texts()[1].1,
        "📊 Total pengeluaran saat ini: Rp. 10000"
    );
}

#[tokio::test]
async fn webhook_acknowledges_undecodable_bodies() {
    let fake = FakeTelegram::default();
    let (dispatcher, _) = dispatcher(fake.clone()).await;
    let app = webhook_router(WebhookState::new(dispatcher, None));

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.extensions().get::<Delivery>(), Some(&Delivery::Undecodable));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn reminder_buttons_are_acknowledged_and_confirmed() {
    let fake = FakeTelegram::default();
    let (dispatcher, _) = dispatcher(fake.clone()).await;
    let app = webhook_router(WebhookState::new(dispatcher, None));

    let update = json!({
        "update_id": 7,
        "callback_query": {
            "id": "cb-7",
            "data": "reminder_monthly",
            "message": {"message_id": 3, "chat": {"id": 42}, "date": 0}
        }
    });
    let resp = app.oneshot(webhook_post(&update, None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let calls = fake.calls();
    assert_eq!(calls[0].0, "answerCallbackQuery");
    assert_eq!(calls[0].1["callback_query_id"], "cb-7");
    assert_eq!(
        fake.sent_texts(),
        vec![(
            42,
            replies::reminder_confirmation(dompet::reminder::ReminderPeriod::Monthly).to_string()
        )]
    );
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let (dispatcher, _) = dispatcher(FakeTelegram::default()).await;
    let app = webhook_router(WebhookState::new(dispatcher, Some(SECRET)));

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn polling_clears_the_webhook_and_advances_the_offset() {
    let fake = FakeTelegram::default();
    fake.pending.lock().unwrap().extend([
        text_update(500, 42, "/start"),
        text_update(501, 42, "5k, Parkir, Mall"),
    ]);
    let (dispatcher, client) = dispatcher(fake.clone()).await;

    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(run_polling(client, dispatcher, 0, rx));
    tokio::time::sleep(Duration::from_millis(300)).await;
    tx.send(true).expect("poller listening");
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("poller stops")
        .expect("poller task")
        .expect("poller result");

    let calls = fake.calls();
    assert_eq!(calls[0].0, "deleteWebhook");
    assert_eq!(calls[1].0, "getUpdates");
    assert!(calls[1].1.get("offset").is_none());
    assert_eq!(
        calls[1].1["allowed_updates"],
        json!(["message", "callback_query"])
    );

    let later_poll = calls
        .iter()
        .skip(2)
        .find(|(method, _)| method == "getUpdates")
        .expect("second poll");
    assert_eq!(later_poll.1["offset"], 502);

    let sent = fake.sent_texts();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1, replies::START);
}
