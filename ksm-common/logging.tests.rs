use rstest::rstest;

use super::*;

#[test]
fn timestamp_format_test() {
    let format = timestamp_format().unwrap();
    let time = time::OffsetDateTime::from_unix_timestamp_nanos(1_656_374_400_123_000_000).unwrap();

    assert_eq!("2022-06-28T00:00:00.123", time.format(&format).unwrap());
}

#[rstest]
#[case("text", Ok(LogFormat::Text))]
#[case("LOGFMT", Ok(LogFormat::Text))]
#[case("json", Ok(LogFormat::Json))]
fn log_format_test(#[case] input: &str, #[case] expected: Result<LogFormat, String>) {
    assert_eq!(expected, input.parse::<LogFormat>());
}

#[test]
fn unknown_log_format_test() {
    assert!("xml".parse::<LogFormat>().is_err());
}
