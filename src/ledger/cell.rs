use super::entry::{DATE_FORMAT, LedgerEntry, Position};
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error as ThisError;

pub(crate) const COL_POSITION: usize = 0;
pub(crate) const COL_DATE: usize = 1;
pub(crate) const COL_AMOUNT: usize = 2;
pub(crate) const COL_CATEGORY: usize = 3;
pub(crate) const COL_NOTE: usize = 4;

/// A backend cell after normalisation. Backends return the same logical value
/// either as text or as a number depending on how it was written.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::String(s) if s.trim().is_empty() => Cell::Empty,
            Value::String(s) => Cell::Text(s.clone()),
            Value::Number(n) => n.as_f64().map_or(Cell::Empty, Cell::Number),
            Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl Cell {
    /// Integer view: text is parsed as a plain integer, numbers are truncated.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            Cell::Number(_) => None,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.is_finite() && n.fract() == 0.0 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Text(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok(),
            _ => None,
        }
    }
}

/// Which ledger columns a scan needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSpec {
    /// Only the Amount column (enough for the running total).
    Amounts,
    /// Position through Note.
    Entries,
}

impl ColumnSpec {
    /// A1 column range for this spec.
    pub fn columns(self) -> &'static str {
        match self {
            ColumnSpec::Amounts => "C:C",
            ColumnSpec::Entries => "A:E",
        }
    }

    /// Index of the first fetched column in the full ledger layout.
    pub fn offset(self) -> usize {
        match self {
            ColumnSpec::Amounts => COL_AMOUNT,
            ColumnSpec::Entries => COL_POSITION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum RowError {
    #[error("row {position}: missing {column}")]
    Missing {
        position: Position,
        column: &'static str,
    },

    #[error("row {position}: unparseable {column} {value:?}")]
    Invalid {
        position: Position,
        column: &'static str,
        value: String,
    },
}

/// One scanned row, cells laid out in ledger column order regardless of which
/// columns were fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub position: Position,
    pub cells: Vec<Cell>,
}

static EMPTY_CELL: Cell = Cell::Empty;

impl RawRow {
    pub fn new(position: Position, cells: Vec<Cell>) -> Self {
        Self { position, cells }
    }

    /// Builds a row from backend values that start at `spec`'s first column.
    pub fn from_values(position: Position, spec: ColumnSpec, values: &[Value]) -> Self {
        let cells = std::iter::repeat_n(Cell::Empty, spec.offset())
            .chain(values.iter().map(Cell::from))
            .collect();
        Self { position, cells }
    }

    pub fn cell(&self, index: usize) -> &Cell {
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }

    pub fn amount(&self) -> Option<i64> {
        self.cell(COL_AMOUNT).as_integer()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.cell(COL_DATE).as_date()
    }

    /// Typed view of the row. Requires a parseable date and amount;
    /// category and note default to empty.
    pub fn to_entry(&self) -> Result<LedgerEntry, RowError> {
        let date = match self.cell(COL_DATE) {
            Cell::Empty => {
                return Err(RowError::Missing {
                    position: self.position,
                    column: "date",
                });
            }
            cell => cell.as_date().ok_or_else(|| RowError::Invalid {
                position: self.position,
                column: "date",
                value: cell.as_text(),
            })?,
        };
        let amount = match self.cell(COL_AMOUNT) {
            Cell::Empty => {
                return Err(RowError::Missing {
                    position: self.position,
                    column: "amount",
                });
            }
            cell => cell.as_integer().ok_or_else(|| RowError::Invalid {
                position: self.position,
                column: "amount",
                value: cell.as_text(),
            })?,
        };

        Ok(LedgerEntry {
            position: self.position,
            date,
            amount,
            category: self.cell(COL_CATEGORY).as_text(),
            note: self.cell(COL_NOTE).as_text(),
        })
    }

    /// Cells for storing `entry`, in ledger column order.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_entry(entry: &LedgerEntry) -> Self {
        Self {
            position: entry.position,
            cells: vec![
                Cell::Number(f64::from(entry.position)),
                Cell::Text(entry.formatted_date()),
                Cell::Number(entry.amount as f64),
                Cell::Text(entry.category.clone()),
                Cell::Text(entry.note.clone()),
            ],
        }
    }
}
