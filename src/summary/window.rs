use chrono::{Datelike, Days, Months, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodKind {
    Daily,
    Weekly,
    Monthly,
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window containing `today`. Weeks start on Sunday.
    pub fn for_period(kind: PeriodKind, today: NaiveDate) -> Self {
        match kind {
            PeriodKind::Daily => Self {
                start: today,
                end: today,
            },
            PeriodKind::Weekly => {
                let back = u64::from(today.weekday().num_days_from_sunday());
                let start = today.checked_sub_days(Days::new(back)).unwrap_or(today);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
                Self { start, end }
            }
            PeriodKind::Monthly => {
                let start = today.with_day(1).unwrap_or(today);
                let end = start
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(NaiveDate::MAX);
                Self { start, end }
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekly_window_runs_sunday_to_saturday() {
        // 2026-10-14 is a Wednesday.
        let w = DateWindow::for_period(PeriodKind::Weekly, d(2026, 10, 14));
        assert_eq!(w.start, d(2026, 10, 11));
        assert_eq!(w.end, d(2026, 10, 17));
        assert!(w.contains(w.start));
        assert!(w.contains(w.end));
        assert!(!w.contains(d(2026, 10, 10)));
        assert!(!w.contains(d(2026, 10, 18)));
    }

    #[test]
    fn sunday_starts_its_own_week() {
        let w = DateWindow::for_period(PeriodKind::Weekly, d(2026, 10, 18));
        assert_eq!(w.start, d(2026, 10, 18));
        assert_eq!(w.end, d(2026, 10, 24));
    }

    #[test]
    fn monthly_window_covers_whole_month() {
        let w = DateWindow::for_period(PeriodKind::Monthly, d(2028, 2, 10));
        assert_eq!(w.start, d(2028, 2, 1));
        assert_eq!(w.end, d(2028, 2, 29));

        let w = DateWindow::for_period(PeriodKind::Monthly, d(2026, 12, 31));
        assert_eq!(w.start, d(2026, 12, 1));
        assert_eq!(w.end, d(2026, 12, 31));
    }

    #[test]
    fn daily_window_is_a_single_day() {
        let w = DateWindow::for_period(PeriodKind::Daily, d(2026, 10, 18));
        assert!(w.contains(d(2026, 10, 18)));
        assert!(!w.contains(d(2026, 10, 17)));
    }
}
