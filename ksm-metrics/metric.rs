use std::fmt::Write;

#[cfg(test)]
#[path = "./metric.tests.rs"]
mod metric_tests;

/// Type of the metric family as written in the `# TYPE` line.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    #[default]
    Gauge,
    Counter,
    Info,
    StateSet,
}

impl MetricType {
    /// Returns metric type name used by the OpenMetrics format.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
            MetricType::Counter => "counter",
            MetricType::Info => "info",
            MetricType::StateSet => "stateset",
        }
    }

    /// Returns metric type name understood by the Prometheus text format.\
    /// **Note** that `info` and `stateset` are not known there, so they are exposed as `gauge`.
    pub fn as_text_str(&self) -> &'static str {
        match self {
            MetricType::Info | MetricType::StateSet => MetricType::Gauge.as_str(),
            other => other.as_str(),
        }
    }
}

/// Single sample of the metric family.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Metric {
    pub label_keys: Vec<String>,
    pub label_values: Vec<String>,
    pub value: f64,
}

impl Metric {
    /// Creates new [`Metric`] instance without labels.
    pub fn new(value: f64) -> Self {
        Self {
            label_keys: Vec::new(),
            label_values: Vec::new(),
            value,
        }
    }

    /// Creates new [`Metric`] instance with the specified labels.
    pub fn with_labels(label_keys: &[&str], label_values: Vec<String>, value: f64) -> Self {
        Self {
            label_keys: label_keys.iter().map(|k| (*k).to_owned()).collect(),
            label_values,
            value,
        }
    }

    /// Prepends labels to the metric.
    pub fn prepend_labels(&mut self, keys: &[&str], values: &[&str]) {
        self.label_keys
            .splice(0..0, keys.iter().map(|k| (*k).to_owned()));
        self.label_values
            .splice(0..0, values.iter().map(|v| (*v).to_owned()));
    }

    fn write(&self, name: &str, out: &mut String) {
        out.push_str(name);

        if !self.label_keys.is_empty() {
            out.push('{');
            for (i, (key, value)) in self.label_keys.iter().zip(self.label_values.iter()).enumerate() {
                if i > 0 {
                    out.push(',');
                }

                out.push_str(key);
                out.push_str("=\"");
                escape_label_value(value, out);
                out.push('"');
            }
            out.push('}');
        }

        out.push(' ');
        write_value(self.value, out);
        out.push('\n');
    }
}

/// Set of metrics with the same name generated for one Kubernetes object.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Family {
    pub name: String,
    pub metric_type: MetricType,
    pub metrics: Vec<Metric>,
}

impl Family {
    /// Creates new [`Family`] instance from metrics.\
    /// **Note** that name and type are set later by the owning generator.
    pub fn from_metrics(metrics: Vec<Metric>) -> Self {
        Self {
            name: String::new(),
            metric_type: MetricType::Gauge,
            metrics,
        }
    }

    /// Creates new [`Family`] instance holding a single metric without labels.
    pub fn single(value: f64) -> Self {
        Self::from_metrics(vec![Metric::new(value)])
    }

    /// Creates new empty [`Family`] instance.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Renders all metrics of the family as text lines.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for metric in &self.metrics {
            if metric.label_keys.len() != metric.label_values.len() {
                tracing::error!(
                    "Metric {} has {} label keys and {} label values, skipping",
                    self.name,
                    metric.label_keys.len(),
                    metric.label_values.len()
                );
                continue;
            }

            metric.write(&self.name, &mut out);
        }

        out
    }
}

/// Escapes `\`, new line and `"` characters in the label value.
pub fn escape_label_value(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
}

/// Writes sample value in the form accepted by both Prometheus text and OpenMetrics formats.
pub fn write_value(value: f64, out: &mut String) {
    if value.is_nan() {
        out.push_str("NaN");
    } else if value.is_infinite() {
        out.push_str(if value > 0.0 { "+Inf" } else { "-Inf" });
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        let _ = write!(out, "{}", value as i64);
    } else {
        let _ = write!(out, "{value}");
    }
}
