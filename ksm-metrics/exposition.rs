#[cfg(test)]
#[path = "./exposition.tests.rs"]
mod exposition_tests;

pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";
pub const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Exposition format of the metrics endpoint.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    #[default]
    Text,
    OpenMetrics,
}

impl ContentType {
    /// Picks the exposition format from the `Accept` header value.\
    /// **Note** that OpenMetrics is used only when the client asks for it explicitly.
    pub fn negotiate(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return ContentType::Text;
        };

        let wants_openmetrics = accept
            .split(',')
            .map(|part| part.split(';').next().unwrap_or_default().trim())
            .any(|media| media.eq_ignore_ascii_case("application/openmetrics-text"));

        if wants_openmetrics {
            ContentType::OpenMetrics
        } else {
            ContentType::Text
        }
    }

    /// Returns value for the `Content-Type` response header.
    pub fn header_value(&self) -> &'static str {
        match self {
            ContentType::Text => TEXT_CONTENT_TYPE,
            ContentType::OpenMetrics => OPENMETRICS_CONTENT_TYPE,
        }
    }

    /// Writes end of the exposition if the format requires it.
    pub fn write_eof(&self, out: &mut String) {
        if *self == ContentType::OpenMetrics {
            out.push_str("# EOF\n");
        }
    }
}
