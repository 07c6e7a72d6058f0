use rstest::rstest;

use super::*;

#[rstest]
#[case(None, ContentType::Text)]
#[case(Some("text/plain"), ContentType::Text)]
#[case(Some("*/*"), ContentType::Text)]
#[case(Some("application/openmetrics-text; version=1.0.0"), ContentType::OpenMetrics)]
#[case(Some("text/plain;q=0.5, application/openmetrics-text;version=0.0.1;q=0.75"), ContentType::OpenMetrics)]
fn negotiate_test(#[case] accept: Option<&str>, #[case] expected: ContentType) {
    assert_eq!(expected, ContentType::negotiate(accept));
}

#[test]
fn write_eof_test() {
    let mut out = String::new();
    ContentType::Text.write_eof(&mut out);
    assert_eq!("", out);

    ContentType::OpenMetrics.write_eof(&mut out);
    assert_eq!("# EOF\n", out);
}
