use rstest::rstest;

use super::*;

#[rstest]
#[case("250m", Some(0.25))]
#[case("5Gi", Some(5_368_709_120.0))]
#[case("2", Some(2.0))]
#[case("1.5k", Some(1500.0))]
#[case("1e3", Some(1000.0))]
#[case("128974848", Some(128_974_848.0))]
#[case("100Mi", Some(104_857_600.0))]
#[case("", None)]
#[case("abc", None)]
#[case("10Xi", None)]
fn parse_quantity_test(#[case] input: &str, #[case] expected: Option<f64>) {
    assert_eq!(expected, parse_quantity(input));
}

#[rstest]
#[case("2022-06-28T00:00:00Z", Some(1_656_374_400.0))]
#[case("2022-06-28T00:00:00.5Z", Some(1_656_374_400.5))]
#[case("2022-06-28", None)]
#[case("now", None)]
fn parse_timestamp_test(#[case] input: &str, #[case] expected: Option<f64>) {
    assert_eq!(expected, parse_timestamp(input));
}

#[rstest]
#[case("28%", Some(0.28))]
#[case("100%", Some(1.0))]
#[case("28", None)]
#[case("x%", None)]
fn parse_percentage_test(#[case] input: &str, #[case] expected: Option<f64>) {
    assert_eq!(expected, parse_percentage(input));
}

#[rstest]
#[case("True", Some(true))]
#[case("1", Some(true))]
#[case("f", Some(false))]
#[case("FALSE", Some(false))]
#[case("yes", None)]
fn parse_bool_test(#[case] input: &str, #[case] expected: Option<bool>) {
    assert_eq!(expected, parse_bool(input));
}

#[rstest]
#[case("1h", Some(3600.0))]
#[case("30m", Some(1800.0))]
#[case("45s", Some(45.0))]
#[case("1h30m45s", Some(5445.0))]
#[case("2160h", Some(7_776_000.0))]
#[case("500ms", Some(0.5))]
#[case("0s", Some(0.0))]
#[case("0", Some(0.0))]
#[case("-1m", Some(-60.0))]
#[case("invalid", None)]
#[case("", None)]
#[case("10", None)]
fn parse_duration_test(#[case] input: &str, #[case] expected: Option<f64>) {
    assert_eq!(expected, parse_duration(input));
}
