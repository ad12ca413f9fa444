/// The three fields of a `nominal, category, note` message, trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerInput<'a> {
    pub nominal: &'a str,
    pub category: &'a str,
    pub note: &'a str,
}

/// Exactly three comma-separated fields with a non-empty nominal.
pub fn parse_ledger_input(text: &str) -> Option<LedgerInput<'_>> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    match fields.as_slice() {
        [nominal, category, note] if !nominal.is_empty() => Some(LedgerInput {
            nominal,
            category,
            note,
        }),
        _ => None,
    }
}
