//! Daily trigger timing.

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, TimeZone, Timelike, Utc};
use std::time::Duration;

/// Fires once per day at a fixed UTC time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
}

impl DailySchedule {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.at
    }

    /// The first fire instant strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = Utc.from_utc_datetime(&now.date_naive().and_time(self.at));
        if today > now {
            today
        } else {
            today + ChronoDuration::days(1)
        }
    }

    /// Time left until the next fire, measured from `now`.
    pub fn until_next(&self, now: DateTime<Utc>) -> Duration {
        (self.next_after(now) - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// All fire instants in `(start, end]`.
    pub fn fires_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let mut fires = Vec::new();
        let mut next = self.next_after(start);
        while next <= end {
            fires.push(next);
            next = self.next_after(next);
        }
        fires
    }

    /// Equivalent five-field cron expression (`minute hour * * *`).
    pub fn cron_expression(&self) -> String {
        format!("{} {} * * *", self.at.minute(), self.at.hour())
    }
}

impl Default for DailySchedule {
    fn default() -> Self {
        Self::new(NaiveTime::from_hms_opt(11, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKFLOW: &str = include_str!("../../../.github/workflows/auto-save.yml");

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_next_fire_later_today() {
        let schedule = DailySchedule::default();
        assert_eq!(
            schedule.next_after(utc(2024, 3, 1, 9, 0, 0)),
            utc(2024, 3, 1, 11, 0, 0)
        );
    }

    #[test]
    fn test_next_fire_tomorrow_when_passed() {
        let schedule = DailySchedule::default();
        assert_eq!(
            schedule.next_after(utc(2024, 3, 1, 11, 0, 1)),
            utc(2024, 3, 2, 11, 0, 0)
        );
    }

    #[test]
    fn test_fire_instant_itself_is_not_next() {
        let schedule = DailySchedule::default();
        let fire = utc(2024, 3, 1, 11, 0, 0);
        assert_eq!(schedule.next_after(fire), utc(2024, 3, 2, 11, 0, 0));
    }

    #[test]
    fn test_exactly_one_fire_per_day() {
        let schedule = DailySchedule::default();
        let start = utc(2024, 2, 1, 0, 0, 0);
        let end = utc(2024, 3, 1, 0, 0, 0);

        let fires = schedule.fires_between(start, end);
        assert_eq!(fires.len(), 29);
        for pair in fires.windows(2) {
            assert_eq!(pair[1] - pair[0], ChronoDuration::days(1));
        }
        assert!(fires.iter().all(|f| f.hour() == 11 && f.minute() == 0));
    }

    #[test]
    fn test_until_next() {
        let schedule = DailySchedule::default();
        assert_eq!(
            schedule.until_next(utc(2024, 3, 1, 10, 30, 0)),
            Duration::from_secs(30 * 60)
        );
    }

    #[test]
    fn test_cron_expression() {
        assert_eq!(DailySchedule::default().cron_expression(), "0 11 * * *");
        let custom = DailySchedule::new(NaiveTime::from_hms_opt(2, 30, 0).unwrap());
        assert_eq!(custom.cron_expression(), "30 2 * * *");
    }

    #[test]
    fn test_workflow_matches_schedule() {
        let cron = DailySchedule::default().cron_expression();
        assert!(WORKFLOW.contains(&format!("cron: \"{cron}\"")));
        assert!(WORKFLOW.contains("workflow_dispatch:"));
    }

    #[test]
    fn test_workflow_is_read_only() {
        assert!(WORKFLOW.contains("permissions:\n  contents: read"));
        assert!(!WORKFLOW.contains("write"));
    }

    #[test]
    fn test_workflow_injects_all_values() {
        for name in [
            "API_ACCESS_KEY_COINONE",
            "API_SECRET_KEY_COINONE",
            "DISCORD_WEBHOOK_URL",
            "HOLD_CURRENCY",
            "BUY_CURRENCY",
            "AMOUNT",
        ] {
            assert!(
                WORKFLOW.contains(&format!("{name}: ${{{{")),
                "workflow does not inject {name}"
            );
        }
    }
}
