use k8s_openapi::serde_json::Value;
use std::fmt::Display;

use super::CustomResourceError;
use crate::values::parse_bool;

#[cfg(test)]
#[path = "./path.tests.rs"]
mod path_tests;

#[derive(Debug, Clone, PartialEq)]
enum PathOp {
    /// Map key, or list index when applied to a list.
    Key(String),

    /// First list element whose `key` field matches `value`, written as `[key=value]`.
    Lookup {
        part: String,
        key: String,
        value: String,
        number: Option<f64>,
        boolean: Option<bool>,
    },
}

impl PathOp {
    fn part(&self) -> &str {
        match self {
            PathOp::Key(part) => part,
            PathOp::Lookup { part, .. } => part,
        }
    }

    fn apply<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        match self {
            PathOp::Key(part) => get_key(value, part),
            PathOp::Lookup {
                key,
                value: expected,
                number,
                boolean,
                ..
            } => value.as_array()?.iter().find(|item| {
                let Some(candidate) = item.as_object().and_then(|o| o.get(key)) else {
                    return false;
                };

                candidate.as_str() == Some(expected.as_str())
                    || number.is_some_and(|n| as_number(candidate) == Some(n))
                    || boolean.is_some_and(|b| candidate.as_bool() == Some(b))
            }),
        }
    }
}

/// Compiled path to a value inside the custom resource object.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ValuePath {
    ops: Vec<PathOp>,
}

impl ValuePath {
    /// Compiles path parts, e.g. `["status", "conditions", "[type=Ready]", "status"]`.
    pub fn compile(path: &[String]) -> Result<Self, CustomResourceError> {
        let ops = path
            .iter()
            .map(|part| {
                let Some(lookup) = part.strip_prefix('[').and_then(|p| p.strip_suffix(']')) else {
                    return Ok(PathOp::Key(part.clone()));
                };

                let Some((key, value)) = lookup.split_once('=') else {
                    return Err(CustomResourceError::InvalidListLookup(part.clone()));
                };

                Ok(PathOp::Lookup {
                    part: part.clone(),
                    key: key.to_owned(),
                    value: value.to_owned(),
                    number: value.parse::<f64>().ok(),
                    boolean: parse_bool(value),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { ops })
    }

    /// Returns `true` if the path has no parts and points to the object itself.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Returns the key if the path consists of a single map key.
    pub fn single_key(&self) -> Option<&str> {
        match self.ops.as_slice() {
            [PathOp::Key(key)] => Some(key),
            _ => None,
        }
    }

    /// Resolves path against the `value`.\
    /// **Note** that `null` values are treated as missing ones.
    pub fn get<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let mut current = value;
        for op in &self.ops {
            if current.is_null() {
                return None;
            }

            current = op.apply(current)?;
        }

        (!current.is_null()).then_some(current)
    }
}

impl Display for ValuePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = self.ops.iter().map(PathOp::part).collect::<Vec<_>>();
        write!(f, "[{}]", parts.join(","))
    }
}

fn get_key<'a>(value: &'a Value, part: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(part) {
                return Some(found);
            }

            // `key=value` returns the value only if it matches
            let (key, expected) = part.split_once('=')?;
            map.get(key).filter(|v| v.as_str() == Some(expected))
        },
        Value::Array(list) => {
            let index = part.parse::<i64>().ok()?;
            let index = if index < 0 { index + list.len() as i64 } else { index };
            usize::try_from(index).ok().and_then(|i| list.get(i))
        },
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.parse::<f64>().ok(),
        _ => None,
    }
}
