//! User-facing texts.

use crate::ledger::{EntryDraft, LedgerEntry, Position};
use crate::reminder::ReminderPeriod;
use crate::summary::render_entry_line;
use dompet_schema::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const START: &str = "👋 Hai! Saya adalah bot pencatat keuangan.\n\n\
📝 Untuk mencatat pengeluaran, kirim dalam format:\n\
Nominal, Kategori, Keterangan\n\
Contoh: 10rb, Makanan, Makan Siang di Kantin\n\n\
📋 Perintah yang tersedia:\n\
/help - Tampilkan bantuan\n\
/summary - Tampilkan total pengeluaran\n\
/weekly - Tampilkan pengeluaran minggu ini\n\
/monthly - Tampilkan pengeluaran bulan ini\n\
/last - Tampilkan data terakhir\n\
/remove - Hapus entri terakhir\n\
/edit - Edit entri berdasarkan nomor\n\
/history - Tampilkan 5 transaksi terakhir\n\
/reminder - Atur pengingat harian/mingguan/bulanan";

pub const HELP: &str = "📋 Cara menggunakan bot:\n\n\
1. Untuk mencatat pengeluaran:\n\
\u{20}  Kirim dalam format: Nominal, Kategori, Keterangan\n\
\u{20}  Contoh: 10rb, Makanan, Makan Siang di Kantin\n\n\
2. Perintah yang tersedia:\n\
\u{20}  /start - Mulai bot\n\
\u{20}  /help - Tampilkan bantuan ini\n\
\u{20}  /summary - Tampilkan total pengeluaran\n\
\u{20}  /weekly - Tampilkan pengeluaran minggu ini\n\
\u{20}  /monthly - Tampilkan pengeluaran bulan ini\n\
\u{20}  /last - Tampilkan data terakhir\n\
\u{20}  /remove - Hapus entri terakhir\n\
\u{20}  /edit <nomor> - Edit entri berdasarkan nomor\n\
\u{20}  /history - Tampilkan 5 transaksi terakhir\n\
\u{20}  /reminder - Atur pengingat\n\n\
3. Format nominal:\n\
\u{20}  - 10rb = 10.000\n\
\u{20}  - 1jt = 1.000.000\n\
\u{20}  - 100k = 100.000";

pub const FORMAT_HINT: &str = "Format salah🙅🏻‍♂️. Gunakan: Nominal, Kategori, Keterangan. \n\
Contoh: 10rb, Makanan, Makan Siang di Kantin\n\n\
Gunakan /help untuk melihat bantuan lengkap";

pub const EDIT_FORMAT_HINT: &str = "Format salah🙅🏻‍♂️. Gunakan: Nominal, Kategori, Keterangan\n\
Contoh: 10rb, Makanan, Makan Siang di Kantin";

pub const APPEND_FAILED: &str = "❌Terjadi kesalahan saat menambahkan data.";
pub const EDIT_FAILED: &str = "❌ Gagal mengedit data.";
pub const ENTRY_NOT_FOUND: &str = "❌ Entri tidak ditemukan";
pub const ENTRY_LOOKUP_FAILED: &str = "❌ Gagal mengambil data entri";
pub const INVALID_ENTRY_NUMBER: &str = "❌ Nomor entri tidak valid. Gunakan format: /edit <nomor>";
pub const UNKNOWN_COMMAND: &str =
    "❌ Perintah tidak dikenali. Gunakan /help untuk melihat daftar perintah yang tersedia";
pub const SUMMARY_FAILED: &str = "❌ Gagal mengambil total pengeluaran";
pub const WEEKLY_FAILED: &str = "❌ Gagal mengambil data pengeluaran mingguan";
pub const MONTHLY_FAILED: &str = "❌ Gagal mengambil data pengeluaran bulanan";
pub const LAST_FAILED: &str = "❌ Gagal mengambil data terakhir";
pub const REMOVE_FAILED: &str = "❌ Gagal menghapus data terakhir";
pub const NOTHING_TO_REMOVE: &str = "❌ Tidak ada data untuk dihapus";
pub const HISTORY_FAILED: &str = "❌ Gagal mengambil riwayat transaksi";
pub const REMINDER_PROMPT: &str = "🔔 Pilih jenis pengingat:";
pub const REMINDER_SAVE_FAILED: &str = "❌ Gagal menyimpan pengaturan pengingat";
pub const INTERNAL_FAILURE: &str = "❌ Terjadi kesalahan. Silakan coba lagi.";

pub fn invalid_nominal(input: &str) -> String {
    format!("❌ Nominal tidak valid: {input}\nContoh: 10rb, 1jt, 100k, 25000")
}

pub fn appended(draft: &EntryDraft, total: Option<i64>) -> String {
    let mut text = format!(
        "✅Data berhasil ditambahkan.\nKamu telah memasukkan:\n💰{}\n🎯{}\n📚{}",
        draft.amount, draft.category, draft.note
    );
    if let Some(total) = total {
        text.push_str(&format!("\n\nTotal Nominal: Rp. {total}"));
    }
    text
}

pub fn edit_prompt(entry: &LedgerEntry) -> String {
    format!(
        "✏️ Edit entri #{}:\n{}\n\nKirim data baru dalam format:\nNominal, Kategori, Keterangan\nContoh: 10rb, Makanan, Makan Siang di Kantin",
        entry.position,
        render_entry_line(entry)
    )
}

pub fn edited(entry: &LedgerEntry) -> String {
    format!("✅ Data berhasil diedit:\n{}", render_entry_line(entry))
}

pub fn removed(entry: Option<&LedgerEntry>, position: Position) -> String {
    match entry {
        Some(entry) => format!("✅ Data berhasil dihapus:\n{}", render_entry_line(entry)),
        None => format!("✅ Data berhasil dihapus: #{position}"),
    }
}

pub fn summary_total(total: i64) -> String {
    format!("📊 Total pengeluaran saat ini: Rp. {total}")
}

pub fn reminder_confirmation(period: ReminderPeriod) -> &'static str {
    match period {
        ReminderPeriod::Daily => {
            "✅ Pengingat harian diaktifkan. Kamu akan menerima ringkasan pengeluaran setiap hari."
        }
        ReminderPeriod::Weekly => {
            "✅ Pengingat mingguan diaktifkan. Kamu akan menerima ringkasan pengeluaran setiap minggu."
        }
        ReminderPeriod::Monthly => {
            "✅ Pengingat bulanan diaktifkan. Kamu akan menerima ringkasan pengeluaran setiap bulan."
        }
        ReminderPeriod::None => "✅ Pengingat dimatikan.",
    }
}

/// 2x2 keyboard: Daily, Weekly / Monthly, Off.
pub fn reminder_keyboard() -> InlineKeyboardMarkup {
    let button = |period: ReminderPeriod| InlineKeyboardButton {
        text: period.button_label().to_string(),
        callback_data: period.callback_token(),
    };
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![button(ReminderPeriod::Daily), button(ReminderPeriod::Weekly)],
            vec![button(ReminderPeriod::Monthly), button(ReminderPeriod::None)],
        ],
    }
}
