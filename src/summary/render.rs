use super::{PeriodKind, PeriodSummary};
use crate::ledger::LedgerEntry;
use std::fmt::Write as _;

pub const NO_DATA_TEXT: &str = "Belum ada data yang dimasukkan";

/// Thousands separated with dots: `1500000` -> `1.500.000`.
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// `📅date - 💰amount | 🎯category | 📚note`
pub fn render_entry_line(entry: &LedgerEntry) -> String {
    format!(
        "📅{} - 💰{} | 🎯{} | 📚{}",
        entry.formatted_date(),
        entry.amount,
        entry.category,
        entry.note
    )
}

pub fn render_last(entry: &LedgerEntry) -> String {
    format!(
        "🕘 Data terakhir: #{} - {}",
        entry.position,
        render_entry_line(entry)
    )
}

pub fn render_history(entries: &[LedgerEntry]) -> String {
    if entries.is_empty() {
        return NO_DATA_TEXT.to_string();
    }
    let mut out = format!("🧾 {} Transaksi Terakhir:\n\n", entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. Rp {} - {} - {}",
            i + 1,
            format_rupiah(entry.amount),
            entry.category,
            entry.note
        );
    }
    out
}

pub fn render_period(summary: &PeriodSummary) -> String {
    let (label, empty) = match summary.kind {
        PeriodKind::Daily => ("Hari Ini", "Tidak ada pengeluaran hari ini"),
        PeriodKind::Weekly => ("Minggu Ini", "Tidak ada pengeluaran minggu ini"),
        PeriodKind::Monthly => ("Bulan Ini", "Tidak ada pengeluaran bulan ini"),
    };
    if summary.is_empty() {
        return empty.to_string();
    }

    let mut out = format!("📊 Pengeluaran {label} (Rp. {}):\n\n", summary.total);
    for entry in &summary.entries {
        // Daily lines carry no date; every entry is from today.
        let line = match summary.kind {
            PeriodKind::Daily => format!(
                "💰{} | 🎯{} | 📚{}",
                entry.amount, entry.category, entry.note
            ),
            PeriodKind::Weekly | PeriodKind::Monthly => render_entry_line(entry),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}
