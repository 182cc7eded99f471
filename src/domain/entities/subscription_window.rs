use chrono::{Duration, NaiveDateTime};

/// Period a plan assignment covers. `end_date` is `None` for perpetual plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionWindow {
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
}

impl SubscriptionWindow {
    pub fn starting_at(start: NaiveDateTime, duration_in_days: Option<i32>) -> Self {
        let end_date = duration_in_days
            .filter(|days| *days > 0)
            .map(|days| start + Duration::days(i64::from(days)));
        Self {
            start_date: start,
            end_date,
        }
    }

    pub fn is_perpetual(&self) -> bool {
        self.end_date.is_none()
    }
}
