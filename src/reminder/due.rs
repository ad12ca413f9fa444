use super::preference::{ReminderPeriod, UserPreference};
use chrono::{DateTime, Datelike, FixedOffset, TimeDelta, Timelike, Utc, Weekday};

/// Last day of a Sunday-start week.
const WEEK_END: Weekday = Weekday::Sat;

/// Whether `pref` should fire at `now` (read in the clock's local offset).
///
/// | period  | due when                                                  |
/// |---------|-----------------------------------------------------------|
/// | daily   | hour == `hour` and 24h since the last reminder            |
/// | weekly  | Saturday, hour == `hour` and 7 days since the last one    |
/// | monthly | day 1, hour == `hour` and 30 days since the last one      |
///
/// Weekly reminders go out on Saturday, the closing day of the Sunday to
/// Saturday window `/weekly` reports, so the message covers the whole week.
pub fn is_due(pref: &UserPreference, now: DateTime<FixedOffset>, hour: u32) -> bool {
    let elapsed = now.with_timezone(&Utc) - pref.last_sent_at;
    let at_hour = now.hour() == hour;

    match pref.period {
        ReminderPeriod::None => false,
        ReminderPeriod::Daily => at_hour && elapsed >= TimeDelta::hours(24),
        ReminderPeriod::Weekly => {
            now.weekday() == WEEK_END && at_hour && elapsed >= TimeDelta::days(7)
        }
        ReminderPeriod::Monthly => now.day() == 1 && at_hour && elapsed >= TimeDelta::days(30),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    fn pref(period: ReminderPeriod, last: DateTime<FixedOffset>) -> UserPreference {
        UserPreference::new(1, period).sent_at(last.with_timezone(&Utc))
    }

    #[test]
    fn daily_fires_at_the_hour_after_a_day() {
        let now = at(2026, 10, 14, 20, 0);
        assert!(is_due(&pref(ReminderPeriod::Daily, now - TimeDelta::hours(25)), now, 20));
        assert!(!is_due(&pref(ReminderPeriod::Daily, now - TimeDelta::hours(23)), now, 20));
        assert!(!is_due(
            &pref(ReminderPeriod::Daily, now - TimeDelta::hours(25)),
            at(2026, 10, 14, 19, 59),
            20
        ));
    }

    #[test]
    fn never_sent_preference_uses_the_epoch() {
        let now = at(2026, 10, 14, 20, 30);
        assert!(is_due(&UserPreference::new(1, ReminderPeriod::Daily), now, 20));
    }

    #[test]
    fn weekly_fires_on_saturday_only() {
        let saturday = at(2026, 10, 17, 20, 0);
        let friday = at(2026, 10, 16, 20, 0);
        let sunday = at(2026, 10, 18, 20, 0);
        let last = saturday - TimeDelta::days(8);
        assert!(is_due(&pref(ReminderPeriod::Weekly, last), saturday, 20));
        assert!(!is_due(&pref(ReminderPeriod::Weekly, last), friday, 20));
        assert!(!is_due(&pref(ReminderPeriod::Weekly, last), sunday, 20));
        assert!(!is_due(
            &pref(ReminderPeriod::Weekly, saturday - TimeDelta::days(6)),
            saturday,
            20
        ));
    }

    #[test]
    fn monthly_fires_on_the_first() {
        let first = at(2026, 11, 1, 20, 5);
        assert!(is_due(&pref(ReminderPeriod::Monthly, first - TimeDelta::days(31)), first, 20));
        assert!(!is_due(
            &pref(ReminderPeriod::Monthly, first - TimeDelta::days(29)),
            first,
            20
        ));
        assert!(!is_due(
            &pref(ReminderPeriod::Monthly, first - TimeDelta::days(31)),
            at(2026, 11, 2, 20, 5),
            20
        ));
    }

    #[test]
    fn hour_is_read_in_the_local_offset() {
        // 20:00 at +07:00 is 13:00 UTC.
        let now = at(2026, 10, 14, 20, 0);
        assert_eq!(now.with_timezone(&Utc).hour(), 13);
        assert!(is_due(&UserPreference::new(1, ReminderPeriod::Daily), now, 20));
    }

    #[test]
    fn none_never_fires() {
        let now = at(2026, 11, 1, 20, 0);
        assert!(!is_due(&UserPreference::new(1, ReminderPeriod::None), now, 20));
    }
}
