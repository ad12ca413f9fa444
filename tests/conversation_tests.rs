use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use dompet::clock::ManualClock;
use dompet::conversation::{ConversationRouter, replies, spawn_sessions};
use dompet::error::{LedgerError, StoreError};
use dompet::ledger::{ColumnSpec, EntryDraft, LedgerEntry, LedgerStore, MemoryLedger, Position, RawRow};
use dompet::reminder::{self, MemoryPreferences, ReminderPeriod};
use dompet::transport::{Inbound, Reply};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const CHAT: i64 = 4242;

fn wib(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(7 * 3600)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Memory ledger whose individual operations can be made to fail.
#[derive(Default)]
struct FlakyLedger {
    inner: MemoryLedger,
    fail_append: AtomicBool,
    fail_get: AtomicBool,
    fail_update: AtomicBool,
}

fn outage() -> StoreError {
    StoreError::Backend("simulated outage".to_string())
}

#[async_trait]
impl LedgerStore for FlakyLedger {
    async fn append_row(&self, draft: &EntryDraft) -> Result<Position, StoreError> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(outage());
        }
        self.inner.append_row(draft).await
    }

    async fn get_row(&self, position: Position) -> Result<LedgerEntry, LedgerError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(outage().into());
        }
        self.inner.get_row(position).await
    }

    async fn update_row(&self, position: Position, draft: &EntryDraft) -> Result<(), StoreError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(outage());
        }
        self.inner.update_row(position, draft).await
    }

    async fn remove_last_row(&self) -> Result<Position, StoreError> {
        self.inner.remove_last_row().await
    }

    async fn scan_rows(&self, columns: ColumnSpec) -> Result<Vec<RawRow>, StoreError> {
        self.inner.scan_rows(columns).await
    }
}

struct Harness {
    router: ConversationRouter,
    ledger: Arc<FlakyLedger>,
    prefs: Arc<MemoryPreferences>,
    clock: Arc<ManualClock>,
}

impl Harness {
    async fn new() -> Self {
        Self::with_ledger(FlakyLedger::default()).await
    }

    async fn with_ledger(ledger: FlakyLedger) -> Self {
        let ledger = Arc::new(ledger);
        let prefs = Arc::new(MemoryPreferences::new());
        let clock = Arc::new(ManualClock::new(wib(2026, 10, 17, 9, 30)));
        let sessions = spawn_sessions().await.expect("session actor");
        let preferences = reminder::spawn(prefs.clone())
            .await
            .expect("preference actor");
        let router = ConversationRouter::new(ledger.clone(), sessions, preferences, clock.clone());
        Self {
            router,
            ledger,
            prefs,
            clock,
        }
    }

    async fn say_in(&self, chat_id: i64, text: &str) -> String {
        self.router
            .handle(Inbound::Message {
                chat_id,
                text: text.to_string(),
            })
            .await
            .expect("messages always get a reply")
            .text
    }

    async fn say(&self, text: &str) -> String {
        self.say_in(CHAT, text).await
    }

    async fn press(&self, token: &str) -> Option<Reply> {
        self.router
            .handle(Inbound::Choice {
                chat_id: CHAT,
                token: token.to_string(),
            })
            .await
    }

    async fn entries(&self) -> Vec<LedgerEntry> {
        self.ledger.inner.entries().await
    }
}

#[tokio::test]
async fn appended_entry_reads_back_with_todays_date() {
    let h = Harness::new().await;

    let reply = h.say("10rb, Makanan, Makan siang").await;
    assert!(reply.starts_with("✅Data berhasil ditambahkan."), "{reply}");
    assert!(reply.contains("💰10000\n🎯Makanan\n📚Makan siang"), "{reply}");
    assert!(reply.ends_with("Total Nominal: Rp. 10000"), "{reply}");

    let entries = h.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].position, 1);
    assert_eq!(entries[0].date, day(2026, 10, 17));
    assert_eq!(entries[0].amount, 10_000);

    h.say("1,5jt, Sewa, Kos").await;
    assert_eq!(
        h.say("/summary").await,
        "📊 Total pengeluaran saat ini: Rp. 10000"
    );
}

#[tokio::test]
async fn multiplier_and_separator_forms_are_accepted() {
    let h = Harness::new().await;
    h.say("1.500.000, Sewa, Kos").await;
    h.say("25K, Makanan, Kopi").await;
    h.say("2jt, Belanja, Laptop").await;

    let amounts: Vec<i64> = h.entries().await.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![1_500_000, 25_000, 2_000_000]);
    assert_eq!(
        h.say("/summary").await,
        "📊 Total pengeluaran saat ini: Rp. 3525000"
    );
}

#[tokio::test]
async fn malformed_messages_get_the_format_hint() {
    let h = Harness::new().await;
    assert_eq!(h.say("halo").await, replies::FORMAT_HINT);
    assert_eq!(h.say("10rb, Makanan").await, replies::FORMAT_HINT);
    assert_eq!(h.say("10rb, Makanan, a, b").await, replies::FORMAT_HINT);
    assert!(h.entries().await.is_empty());
}

#[tokio::test]
async fn unparsed_nominal_records_zero_unless_rejected() {
    let h = Harness::new().await;
    h.say("sepuluh, Makanan, Bakso").await;
    assert_eq!(h.entries().await[0].amount, 0);

    let strict = Harness::new().await;
    let router = strict.router.clone().reject_unparsed_nominal(true);
    let reply = router
        .handle(Inbound::Message {
            chat_id: CHAT,
            text: "sepuluh, Makanan, Bakso".to_string(),
        })
        .await
        .expect("reply");
    assert_eq!(reply.text, replies::invalid_nominal("sepuluh"));
    assert!(strict.entries().await.is_empty());
}

#[tokio::test]
async fn edit_of_missing_entry_starts_no_session() {
    let h = Harness::new().await;
    assert_eq!(h.say("/edit 3").await, replies::ENTRY_NOT_FOUND);
    assert_eq!(h.say("/edit 0").await, replies::ENTRY_NOT_FOUND);
    assert_eq!(h.say("/edit").await, replies::INVALID_ENTRY_NUMBER);
    assert_eq!(h.say("/edit dua").await, replies::INVALID_ENTRY_NUMBER);

    // Not in an edit session, so this is a plain append.
    h.say("5k, Parkir, Mall").await;
    assert_eq!(h.entries().await.len(), 1);
}

#[tokio::test]
async fn edit_session_survives_bad_input_and_commands() {
    let h = Harness::new().await;
    h.say("10rb, Makanan, Siang").await;
    h.say("20rb, Belanja, Sabun").await;

    let prompt = h.say("/edit 1").await;
    assert!(prompt.starts_with("✏️ Edit entri #1:"), "{prompt}");
    assert!(prompt.contains("📅17-10-2026 - 💰10000 | 🎯Makanan | 📚Siang"));

    assert_eq!(h.say("salah format").await, replies::EDIT_FORMAT_HINT);
    assert!(h.say("/summary").await.contains("Rp. 30000"));

    let edited = h.say("12rb, Makanan, Siang + es teh").await;
    assert_eq!(
        edited,
        "✅ Data berhasil diedit:\n📅17-10-2026 - 💰12000 | 🎯Makanan | 📚Siang + es teh"
    );

    let entries = h.entries().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].amount, 12_000);
    assert_eq!(entries[1].amount, 20_000);

    // Session is over: the next entry is appended.
    h.say("1k, Parkir, Motor").await;
    assert_eq!(h.entries().await.len(), 3);
}

#[tokio::test]
async fn edit_can_be_retargeted() {
    let h = Harness::new().await;
    h.say("10rb, A, a").await;
    h.say("20rb, B, b").await;

    h.say("/edit 1").await;
    h.say("/edit 2").await;
    h.say("25rb, B, bb").await;

    let entries = h.entries().await;
    assert_eq!(entries[0].amount, 10_000);
    assert_eq!(entries[1].amount, 25_000);
    assert_eq!(entries[1].note, "bb");
}

#[tokio::test]
async fn sessions_are_per_chat() {
    let h = Harness::new().await;
    h.say("10rb, A, a").await;
    h.say("/edit 1").await;

    h.say_in(7, "3k, Lain, Chat lain").await;
    let entries = h.entries().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].amount, 10_000);

    h.say("11rb, A, a2").await;
    assert_eq!(h.entries().await[0].amount, 11_000);
}

#[tokio::test]
async fn failed_edit_ends_the_session() {
    let h = Harness::new().await;
    h.say("10rb, A, a").await;
    h.say("/edit 1").await;

    h.ledger.fail_update.store(true, Ordering::SeqCst);
    assert_eq!(h.say("12rb, A, a").await, replies::EDIT_FAILED);
    h.ledger.fail_update.store(false, Ordering::SeqCst);

    h.say("1k, B, b").await;
    let entries = h.entries().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].amount, 10_000);
}

#[tokio::test]
async fn edit_target_removed_before_commit_fails_and_ends_the_session() {
    let h = Harness::new().await;
    h.say("10rb, A, a").await;
    h.say("20rb, B, b").await;

    h.say("/edit 2").await;
    h.say("/remove").await;
    assert_eq!(h.say("30rb, C, c").await, replies::EDIT_FAILED);

    let entries = h.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, 10_000);

    // Session is gone: the next entry is a plain append at the freed position.
    h.say("5k, D, d").await;
    let entries = h.entries().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].position, 2);
    assert_eq!(entries[1].category, "D");
}

#[tokio::test]
async fn backend_failures_are_reported_to_the_user() {
    let h = Harness::new().await;
    h.ledger.fail_append.store(true, Ordering::SeqCst);
    assert_eq!(h.say("10rb, A, a").await, replies::APPEND_FAILED);

    h.ledger.fail_append.store(false, Ordering::SeqCst);
    h.say("10rb, A, a").await;
    h.ledger.fail_get.store(true, Ordering::SeqCst);
    assert_eq!(h.say("/edit 1").await, replies::ENTRY_LOOKUP_FAILED);

    // Lookup failed, so no session: this appends.
    h.ledger.fail_get.store(false, Ordering::SeqCst);
    h.say("2k, B, b").await;
    assert_eq!(h.entries().await.len(), 2);
}

#[tokio::test]
async fn remove_takes_only_the_last_entry() {
    let h = Harness::new().await;
    assert_eq!(h.say("/remove").await, replies::NOTHING_TO_REMOVE);

    h.say("10rb, A, a").await;
    h.say("20rb, B, b").await;
    assert_eq!(
        h.say("/remove").await,
        "✅ Data berhasil dihapus:\n📅17-10-2026 - 💰20000 | 🎯B | 📚b"
    );

    let entries = h.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].note, "a");

    h.say("/remove").await;
    assert_eq!(h.say("/remove").await, replies::NOTHING_TO_REMOVE);
    assert_eq!(h.say("/last").await, "Belum ada data yang dimasukkan");
}

#[tokio::test]
async fn last_and_history_render_recent_entries() {
    let h = Harness::new().await;
    assert_eq!(h.say("/history").await, "Belum ada data yang dimasukkan");

    for (i, note) in ["a", "b", "c", "d", "e", "f"].iter().enumerate() {
        h.say(&format!("{}k, Kat, {note}", i + 1)).await;
    }

    assert_eq!(
        h.say("/last").await,
        "🕘 Data terakhir: #6 - 📅17-10-2026 - 💰6000 | 🎯Kat | 📚f"
    );
    assert_eq!(
        h.say("/history").await,
        "🧾 5 Transaksi Terakhir:\n\n\
         1. Rp 2.000 - Kat - b\n\
         2. Rp 3.000 - Kat - c\n\
         3. Rp 4.000 - Kat - d\n\
         4. Rp 5.000 - Kat - e\n\
         5. Rp 6.000 - Kat - f\n"
    );
}

#[tokio::test]
async fn weekly_and_monthly_windows_follow_the_clock() {
    let ledger = FlakyLedger {
        inner: MemoryLedger::with_entries([
            EntryDraft::new(day(2026, 9, 30), 1_000, "Lama", "September"),
            EntryDraft::new(day(2026, 10, 3), 2_000, "Awal", "Bulan ini"),
            EntryDraft::new(day(2026, 10, 11), 3_000, "Minggu", "Hari Minggu"),
            EntryDraft::new(day(2026, 10, 17), 4_000, "Sabtu", "Hari ini"),
        ]),
        ..FlakyLedger::default()
    };
    let h = Harness::with_ledger(ledger).await;

    assert_eq!(
        h.say("/weekly").await,
        "📊 Pengeluaran Minggu Ini (Rp. 7000):\n\n\
         📅11-10-2026 - 💰3000 | 🎯Minggu | 📚Hari Minggu\n\
         📅17-10-2026 - 💰4000 | 🎯Sabtu | 📚Hari ini\n"
    );
    assert!(
        h.say("/monthly")
            .await
            .starts_with("📊 Pengeluaran Bulan Ini (Rp. 9000):")
    );

    h.clock.set(wib(2026, 11, 2, 8, 0));
    assert_eq!(h.say("/weekly").await, "Tidak ada pengeluaran minggu ini");
    assert_eq!(h.say("/monthly").await, "Tidak ada pengeluaran bulan ini");
}

#[tokio::test]
async fn unknown_and_fixed_commands() {
    let h = Harness::new().await;
    assert_eq!(h.say("/start").await, replies::START);
    assert_eq!(h.say("/help").await, replies::HELP);
    assert_eq!(h.say("/terbang").await, replies::UNKNOWN_COMMAND);
}

#[tokio::test]
async fn reminder_choice_is_saved_with_current_time() {
    let h = Harness::new().await;

    let prompt = h
        .router
        .handle(Inbound::Message {
            chat_id: CHAT,
            text: "/reminder".to_string(),
        })
        .await
        .expect("reply");
    assert_eq!(prompt.text, replies::REMINDER_PROMPT);
    let keyboard = prompt.keyboard.expect("choice buttons");
    let tokens: Vec<&str> = keyboard
        .inline_keyboard
        .iter()
        .flatten()
        .map(|b| b.callback_data.as_str())
        .collect();
    assert_eq!(
        tokens,
        vec!["reminder_daily", "reminder_weekly", "reminder_monthly", "reminder_none"]
    );

    let reply = h.press("reminder_weekly").await.expect("confirmation");
    assert_eq!(
        reply.text,
        replies::reminder_confirmation(ReminderPeriod::Weekly)
    );
    let saved = h.prefs.get(CHAT).await.expect("saved preference");
    assert_eq!(saved.period, ReminderPeriod::Weekly);
    assert_eq!(
        saved.last_sent_at,
        Utc.with_ymd_and_hms(2026, 10, 17, 2, 30, 0).unwrap()
    );

    let reply = h.press("reminder_none").await.expect("confirmation");
    assert_eq!(reply.text, "✅ Pengingat dimatikan.");
    assert_eq!(
        h.prefs.get(CHAT).await.map(|p| p.period),
        Some(ReminderPeriod::None)
    );

    assert!(h.press("something_else").await.is_none());
}
