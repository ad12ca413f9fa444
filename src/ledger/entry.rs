use chrono::NaiveDate;

/// Row number of an entry in storage order. Assigned on append.
pub type Position = u32;

/// Date layout stored in the ledger's Date column (`DD-MM-YYYY`).
pub const DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub position: Position,
    pub date: NaiveDate,
    pub amount: i64,
    pub category: String,
    pub note: String,
}

/// Entry contents before a position is known (append) or when replacing one (edit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub amount: i64,
    pub category: String,
    pub note: String,
}

impl EntryDraft {
    pub fn new(
        date: NaiveDate,
        amount: i64,
        category: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            category: category.into(),
            note: note.into(),
        }
    }

    pub fn at(&self, position: Position) -> LedgerEntry {
        LedgerEntry {
            position,
            date: self.date,
            amount: self.amount,
            category: self.category.clone(),
            note: self.note.clone(),
        }
    }

    pub fn formatted_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

impl LedgerEntry {
    pub fn formatted_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}
