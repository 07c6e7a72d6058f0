use k8s_openapi::serde_json::Value;
use ksm_config::ValueType;
use ksm_metrics::Metric;
use ksm_metrics::labels::bool_value;
use std::collections::BTreeMap;

use super::ValuePath;
use crate::values::{parse_bool, parse_duration, parse_percentage, parse_quantity, parse_timestamp};

#[cfg(test)]
#[path = "./each.tests.rs"]
mod each_tests;

/// Possible errors when extracting metric values from the custom resource.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("expected number but found nil value")]
    Nil,

    #[error("got nil while resolving path")]
    NilPath,

    #[error("expected value for path to be string, got {0}")]
    NotString(String),

    #[error("failed to parse {0:?} as a number")]
    NotNumber(String),

    #[error("failed to parse {0:?} as a duration")]
    InvalidDuration(String),

    #[error("expected number but was {0}")]
    Unsupported(String),

    #[error("{path}: {source}")]
    At { path: String, source: Box<ExtractError> },
}

impl ExtractError {
    fn at(self, path: impl Into<String>) -> Self {
        Self::At {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Single value extracted from the custom resource together with its labels.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct EachValue {
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

impl EachValue {
    /// Creates new [`EachValue`] instance without labels.
    pub fn new(value: f64) -> Self {
        Self {
            labels: BTreeMap::new(),
            value,
        }
    }

    /// Adds `defaults` labels that are not already set.
    pub fn default_labels(&mut self, defaults: &BTreeMap<String, String>) {
        for (key, value) in defaults {
            if !self.labels.contains_key(key) {
                self.labels.insert(key.clone(), value.clone());
            }
        }
    }

    /// Converts value to the metric with labels sorted by their names.
    pub fn into_metric(self) -> Metric {
        let (label_keys, label_values) = self.labels.into_iter().unzip();
        Metric {
            label_keys,
            label_values,
            value: self.value,
        }
    }
}

/// Part shared by all compiled metric types.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Common {
    pub path: ValuePath,
    pub labels_from_path: BTreeMap<String, ValuePath>,
}

/// Compiled source of the metric values.
#[derive(Debug, Clone, PartialEq)]
pub enum Each {
    Gauge {
        common: Common,
        value_from: ValuePath,
        label_from_key: String,
        nil_is_zero: bool,
        value_type: Option<ValueType>,
    },
    Info {
        common: Common,
        label_from_key: String,
    },
    StateSet {
        common: Common,
        value_from: ValuePath,
        list: Vec<String>,
        label_name: String,
    },
}

impl Each {
    fn common(&self) -> &Common {
        match self {
            Each::Gauge { common, .. } | Each::Info { common, .. } | Each::StateSet { common, .. } => common,
        }
    }

    /// Extracts all values from the object.\
    /// **Note** that values are sorted by their labels.
    pub fn values(&self, object: &Value) -> (Vec<EachValue>, Vec<ExtractError>) {
        let common = self.common();
        let value = common.path.get(object);
        let mut result = Vec::new();
        let mut errors = Vec::new();

        match self {
            Each::Gauge {
                value_from,
                label_from_key,
                nil_is_zero,
                value_type,
                ..
            } => {
                let gauge = Gauge {
                    labels_from_path: &common.labels_from_path,
                    value_from,
                    label_from_key,
                    nil_is_zero: *nil_is_zero,
                    value_type: *value_type,
                };
                gauge.values(value, &mut result, &mut errors);
            },
            Each::Info { label_from_key, .. } => {
                info_values(value, &common.labels_from_path, label_from_key, &mut result);
            },
            Each::StateSet {
                value_from,
                list,
                label_name,
                ..
            } => match value {
                Some(Value::Array(items)) => {
                    for item in items {
                        let state_set = state_set_values(Some(item), value_from, list, label_name, &common.labels_from_path);
                        push_or_error(state_set, &mut result, &mut errors);
                    }
                },
                other => {
                    let state_set = state_set_values(other, value_from, list, label_name, &common.labels_from_path);
                    push_or_error(state_set, &mut result, &mut errors);
                },
            },
        }

        let path = common.path.to_string();
        let errors = errors.into_iter().map(|e| e.at(path.as_str())).collect();
        result.sort_by(|a, b| a.labels.cmp(&b.labels));
        (result, errors)
    }
}

struct Gauge<'a> {
    labels_from_path: &'a BTreeMap<String, ValuePath>,
    value_from: &'a ValuePath,
    label_from_key: &'a str,
    nil_is_zero: bool,
    value_type: Option<ValueType>,
}

impl Gauge<'_> {
    fn values(&self, value: Option<&Value>, result: &mut Vec<EachValue>, errors: &mut Vec<ExtractError>) {
        match value {
            Some(Value::Object(map)) => {
                for (key, item) in map {
                    let each = if self.value_from.single_key() == Some(key.as_str()) {
                        to_float(item, self.nil_is_zero, self.value_type).map(|v| Some(EachValue::new(v)))
                    } else {
                        self.extract_value(Some(item))
                    };

                    let mut each = match each {
                        Ok(Some(each)) => each,
                        Ok(None) => continue,
                        Err(error) => {
                            errors.push(error.at(format!("[{key}]")));
                            continue;
                        },
                    };

                    if !key.is_empty() && !self.label_from_key.is_empty() {
                        each.labels.insert(self.label_from_key.to_owned(), key.clone());
                    }

                    add_path_labels(value, self.labels_from_path, &mut each.labels);
                    add_path_labels(Some(item), self.labels_from_path, &mut each.labels);
                    result.push(each);
                }
            },
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    match self.extract_value(Some(item)) {
                        Ok(Some(mut each)) => {
                            add_path_labels(Some(item), self.labels_from_path, &mut each.labels);
                            result.push(each);
                        },
                        Ok(None) => (),
                        Err(error) => errors.push(error.at(format!("[{i}]"))),
                    }
                }
            },
            other => match self.extract_value(other) {
                Ok(Some(mut each)) => {
                    add_path_labels(other, self.labels_from_path, &mut each.labels);
                    result.push(each);
                },
                Ok(None) => (),
                Err(error) => errors.push(error),
            },
        }
    }

    fn extract_value(&self, item: Option<&Value>) -> Result<Option<EachValue>, ExtractError> {
        let item = item.filter(|i| !i.is_null());
        match item.and_then(|i| self.value_from.get(i)) {
            Some(value) => to_float(value, self.nil_is_zero, self.value_type)
                .map(|v| Some(EachValue::new(v)))
                .map_err(|e| e.at(self.value_from.to_string())),
            None if self.nil_is_zero => Ok(Some(EachValue::new(0.0))),
            None if item.is_none() => Err(ExtractError::NilPath),
            None => Ok(None),
        }
    }
}

fn info_values(
    value: Option<&Value>,
    labels_from_path: &BTreeMap<String, ValuePath>,
    label_from_key: &str,
    result: &mut Vec<EachValue>,
) {
    let mut push = |item: &Value, key: Option<&str>| {
        let mut each = EachValue::new(1.0);
        if let Some(key) = key {
            each.labels.insert(label_from_key.to_owned(), key.to_owned());
        }

        add_path_labels(Some(item), labels_from_path, &mut each.labels);
        result.push(each);
    };

    match value {
        None => (),
        Some(Value::Array(items)) => items.iter().for_each(|item| push(item, None)),
        Some(Value::Object(map)) if !label_from_key.is_empty() => {
            map.iter().for_each(|(key, item)| push(item, Some(key)));
        },
        Some(object @ Value::Object(map)) => {
            let resolves_on_object =
                labels_from_path.is_empty() || labels_from_path.values().any(|p| p.get(object).is_some());
            if resolves_on_object {
                push(object, None);
            } else {
                map.values().for_each(|item| push(item, None));
            }
        },
        Some(other) => push(other, None),
    }
}

fn state_set_values(
    item: Option<&Value>,
    value_from: &ValuePath,
    list: &[String],
    label_name: &str,
    labels_from_path: &BTreeMap<String, ValuePath>,
) -> Result<Vec<EachValue>, ExtractError> {
    let current = match item.and_then(|i| value_from.get(i)) {
        Some(Value::String(current)) => current,
        Some(other) => return Err(ExtractError::NotString(other.to_string())),
        None => return Err(ExtractError::NotString("nil".to_owned())),
    };

    let values = list
        .iter()
        .map(|state| {
            let mut each = EachValue::new(bool_value(state == current));
            each.labels.insert(label_name.to_owned(), state.clone());
            add_path_labels(item, labels_from_path, &mut each.labels);
            each
        })
        .collect();
    Ok(values)
}

fn push_or_error(values: Result<Vec<EachValue>, ExtractError>, result: &mut Vec<EachValue>, errors: &mut Vec<ExtractError>) {
    match values {
        Ok(values) => result.extend(values),
        Err(error) => errors.push(error),
    }
}

/// Adds labels with values resolved from `object`.\
/// Keys starting with `*` copy the whole resolved map, keys ending with `*` copy it with the key prefix.
/// Other keys are added last and only when their path resolves.
pub fn add_path_labels(
    object: Option<&Value>,
    labels: &BTreeMap<String, ValuePath>,
    result: &mut BTreeMap<String, String>,
) {
    let Some(object) = object else {
        return;
    };

    for (_, path) in labels.iter().filter(|(k, _)| k.starts_with('*')) {
        if let Some(Value::Object(map)) = path.get(object) {
            result.extend(map.iter().map(|(k, v)| (k.clone(), label_value(v))));
        }
    }

    for (key, path) in labels.iter().filter(|(k, _)| !k.starts_with('*') && k.ends_with('*')) {
        if let Some(Value::Object(map)) = path.get(object) {
            let prefix = key.trim_end_matches('*');
            result.extend(map.iter().map(|(k, v)| (format!("{prefix}{k}"), label_value(v))));
        }
    }

    for (key, path) in labels.iter().filter(|(k, _)| !k.contains('*')) {
        if let Some(value) = path.get(object) {
            result.insert(key.clone(), label_value(value));
        }
    }
}

/// Converts extracted value to the metric value.\
/// Strings can hold booleans, numbers, RFC 3339 timestamps, percentages or quantities.
pub fn to_float(value: &Value, nil_is_zero: bool, value_type: Option<ValueType>) -> Result<f64, ExtractError> {
    if value_type == Some(ValueType::Duration) {
        return match value {
            Value::String(text) => parse_duration(text).ok_or_else(|| ExtractError::InvalidDuration(text.clone())),
            other => Err(ExtractError::InvalidDuration(other.to_string())),
        };
    }

    match value {
        Value::Null if nil_is_zero => Ok(0.0),
        Value::Null => Err(ExtractError::Nil),
        Value::Bool(value) => Ok(bool_value(*value)),
        Value::Number(number) => number.as_f64().ok_or_else(|| ExtractError::Unsupported(number.to_string())),
        Value::String(text) => parse_bool(text)
            .map(bool_value)
            .or_else(|| text.parse::<f64>().ok())
            .or_else(|| parse_timestamp(text))
            .or_else(|| parse_percentage(text))
            .or_else(|| parse_quantity(text))
            .ok_or_else(|| ExtractError::NotNumber(text.clone())),
        other => Err(ExtractError::Unsupported(other.to_string())),
    }
}

fn label_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
