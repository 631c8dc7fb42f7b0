use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inclusive date range used by the range-filtered store queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    /// First day, inclusive (YYYY-MM-DD).
    pub start: NaiveDate,
    /// Last day, inclusive (YYYY-MM-DD).
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Calendar period shorthand accepted by the statistics endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    Year,
}

impl Period {
    /// Resolve to the concrete range containing `today`.
    /// Weeks start on Monday, matching the rest of the app.
    pub fn range(self, today: NaiveDate) -> DateRange {
        match self {
            Period::Week => {
                let start =
                    today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                DateRange::new(start, start + Duration::days(6))
            }
            Period::Month => {
                let start = today.with_day(1).expect("day 1 exists in every month");
                let next_month = if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
                }
                .expect("first of month is always valid");
                DateRange::new(start, next_month - Duration::days(1))
            }
            Period::Year => DateRange::new(
                NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("jan 1 is always valid"),
                NaiveDate::from_ymd_opt(today.year(), 12, 31).expect("dec 31 is always valid"),
            ),
        }
    }
}
