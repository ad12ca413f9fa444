use crate::clock::{Clock, SystemClock};
use crate::config::{Config, StorageBackend};
use crate::conversation::{ConversationRouter, spawn_sessions};
use crate::error::DompetError;
use crate::google_oauth::{ServiceAccountKey, ServiceAccountTokenSource};
use crate::ledger::{LedgerStore, MemoryLedger};
use crate::reminder::{self, MemoryPreferences, PreferenceStore, ReminderScheduler, SchedulerSettings};
use crate::sheets::{SheetsClient, SheetsLedger, SheetsPreferences};
use crate::telegram::{TelegramClient, UpdateDispatcher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const USER_AGENT: &str = concat!("dompet/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, DompetError> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(5))
        .timeout(timeout)
        .build()?)
}

/// Everything `main` needs to run either transport.
pub struct Services {
    pub scheduler: ReminderScheduler,
    pub telegram: TelegramClient,
    pub dispatcher: UpdateDispatcher,
}

impl Services {
    pub async fn build(cfg: &Config) -> Result<Self, DompetError> {
        let http = build_http_client(Duration::from_secs(cfg.basic.request_timeout_secs))?;

        // Log the effective settings here so `main` stays wiring-only.
        info!(
            mode = ?cfg.telegram.mode,
            api_url = %cfg.telegram.api_url,
            send_rate_per_sec = cfg.telegram.send_rate_per_sec,
            poll_timeout_secs = cfg.telegram.poll_timeout_secs,
            "Telegram config (effective)"
        );
        info!(
            tick_secs = cfg.reminder.tick_secs,
            hour = cfg.reminder.hour,
            dispatch_timeout_secs = cfg.reminder.dispatch_timeout_secs,
            utc_offset_minutes = ?cfg.basic.utc_offset_minutes,
            reject_unparsed_nominal = cfg.ledger.reject_unparsed_nominal,
            "Reminder and ledger config (effective)"
        );

        let (ledger, preference_store) = open_stores(cfg, &http).await?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(cfg.basic.utc_offset()));

        let sessions = spawn_sessions().await?;
        let preferences = reminder::spawn(preference_store).await?;

        let router = ConversationRouter::new(ledger, sessions, preferences.clone(), clock.clone())
            .reject_unparsed_nominal(cfg.ledger.reject_unparsed_nominal);

        let telegram = TelegramClient::new(
            http,
            cfg.telegram.api_url.clone(),
            &cfg.telegram.bot_token,
            cfg.telegram.send_rate_per_sec,
        );
        let scheduler = ReminderScheduler::new(
            preferences,
            router.summary().clone(),
            Arc::new(telegram.clone()),
            clock,
            SchedulerSettings::from(&cfg.reminder),
        );
        let dispatcher = UpdateDispatcher::new(router, telegram.clone());

        Ok(Self {
            scheduler,
            telegram,
            dispatcher,
        })
    }
}

type Stores = (Arc<dyn LedgerStore>, Arc<dyn PreferenceStore>);

async fn open_stores(cfg: &Config, http: &reqwest::Client) -> Result<Stores, DompetError> {
    let storage = &cfg.storage;
    match storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; entries and preferences are lost on restart");
            Ok((
                Arc::new(MemoryLedger::new()),
                Arc::new(MemoryPreferences::new()),
            ))
        }
        StorageBackend::Sheets => {
            let key = ServiceAccountKey::from_base64(&storage.credentials_base64)?;
            let ledger_sheet = if storage.ledger_sheet.is_empty() {
                "<first>"
            } else {
                storage.ledger_sheet.as_str()
            };
            info!(
                client_email = %key.client_email,
                spreadsheet_id = %storage.spreadsheet_id,
                ledger_sheet = %ledger_sheet,
                preferences_sheet = %storage.preferences_sheet,
                sheets_api_url = %storage.sheets_api_url,
                "Using Google Sheets storage"
            );

            let tokens = Arc::new(ServiceAccountTokenSource::new(
                http.clone(),
                key,
                storage.token_url.clone(),
            ));
            let client = SheetsClient::new(
                http.clone(),
                storage.sheets_api_url.clone(),
                storage.spreadsheet_id.as_str(),
                tokens,
            );
            let ledger = SheetsLedger::new(client.clone(), storage.ledger_sheet.as_str());
            let preferences = SheetsPreferences::new(client, storage.preferences_sheet.as_str());

            if let Err(e) = ledger.ensure_header().await {
                warn!(error = %e, "Could not verify the ledger header row");
            }
            if let Err(e) = preferences.ensure_header().await {
                warn!(error = %e, "Could not verify the preferences header row");
            }
            Ok((Arc::new(ledger), Arc::new(preferences)))
        }
    }
}
