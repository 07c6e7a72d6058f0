use k8s_openapi::chrono::{DateTime, Utc};
use rstest::rstest;

use super::*;

fn ts(value: &str) -> DateTime<Utc> {
    value.parse().unwrap()
}

#[rstest]
#[case("*/5 * * * *", "2024-03-10T10:02:30Z", "2024-03-10T10:05:00Z")]
#[case("0 * * * *", "2024-03-10T10:00:00Z", "2024-03-10T11:00:00Z")]
#[case("@daily", "2024-03-10T10:00:00Z", "2024-03-11T00:00:00Z")]
#[case("30 2 1 * *", "2024-01-31T03:00:00Z", "2024-02-01T02:30:00Z")]
#[case("0 9 * * MON-FRI", "2024-03-09T12:00:00Z", "2024-03-11T09:00:00Z")]
#[case("0 0 29 2 *", "2023-03-01T00:00:00Z", "2024-02-29T00:00:00Z")]
#[case("0 12 * * 7", "2024-03-10T13:00:00Z", "2024-03-17T12:00:00Z")]
#[case("15 10 1 jan *", "2024-03-10T10:00:00Z", "2025-01-01T10:15:00Z")]
fn next_after_test(#[case] expression: &str, #[case] after: &str, #[case] expected: &str) {
    let schedule = CronSchedule::parse(expression).unwrap();
    assert_eq!(Some(ts(expected)), schedule.next_after(ts(after)));
}

#[test]
fn day_of_month_or_weekday_test() {
    // both restricted, either one matches
    let schedule = CronSchedule::parse("0 0 15 * 1").unwrap();
    assert_eq!(
        Some(ts("2024-03-11T00:00:00Z")),
        schedule.next_after(ts("2024-03-10T00:00:00Z"))
    );
}

#[rstest]
#[case("")]
#[case("* * * *")]
#[case("60 * * * *")]
#[case("* 24 * * *")]
#[case("*/0 * * * *")]
#[case("5-1 * * * *")]
#[case("0 0 31 2 * *")]
fn invalid_expression_test(#[case] expression: &str) {
    assert!(CronSchedule::parse(expression).is_none());
}
