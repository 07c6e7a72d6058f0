use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::ConfigError;

#[cfg(test)]
#[path = "./allow_list.tests.rs"]
mod allow_list_tests;

const WILDCARD: &str = "*";

/// Kubernetes labels or annotations allowed per resource, e.g. `pods=[app,team],namespaces=[*]`.\
/// **Note** that `*` used as a resource name applies its keys to every enabled resource.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct LabelsAllowList(BTreeMap<String, Vec<String>>);

impl LabelsAllowList {
    /// Returns allowed keys for the `resource`.
    pub fn get(&self, resource: &str) -> &[String] {
        self.0.get(resource).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns `true` if nothing is allowed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over resources and their allowed keys.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Replaces the `*` resource entry with an entry for every one of the `resources`.\
    /// Keys already allowed for a resource are kept and the wildcard ones are appended.
    pub fn resolve_wildcard<S: AsRef<str>>(&mut self, resources: &[S]) {
        let Some(keys) = self.0.remove(WILDCARD) else {
            return;
        };

        for resource in resources {
            let entry = self.0.entry(resource.as_ref().to_owned()).or_default();
            for key in &keys {
                if !entry.contains(key) {
                    entry.push(key.clone());
                }
            }
        }
    }
}

impl FromStr for LabelsAllowList {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut result = BTreeMap::new();
        let mut rest = value.trim();

        while !rest.is_empty() {
            let Some((name, tail)) = rest.split_once("=[") else {
                return Err(invalid(value));
            };
            let Some((keys, tail)) = tail.split_once(']') else {
                return Err(invalid(value));
            };

            let name = name.trim();
            if !is_valid_name(name) {
                return Err(invalid(value));
            }

            let mut allowed = Vec::new();
            for key in keys.split(',').map(str::trim) {
                if key.is_empty() {
                    if keys.trim().is_empty() {
                        continue;
                    }

                    return Err(invalid(value));
                }

                if !is_valid_key(key) {
                    return Err(invalid(value));
                }

                allowed.push(key.to_owned());
            }

            result.insert(name.to_owned(), allowed);

            rest = tail.trim_start();
            if let Some(next) = rest.strip_prefix(',') {
                rest = next.trim_start();
                if rest.is_empty() {
                    return Err(invalid(value));
                }
            } else if !rest.is_empty() {
                return Err(invalid(value));
            }
        }

        Ok(Self(result))
    }
}

impl Display for LabelsAllowList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (resource, keys)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }

            write!(f, "{resource}=[{}]", keys.join(","))?;
        }

        Ok(())
    }
}

impl From<BTreeMap<String, Vec<String>>> for LabelsAllowList {
    fn from(value: BTreeMap<String, Vec<String>>) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for LabelsAllowList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Map(BTreeMap<String, Vec<String>>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Raw::Map(map) => Ok(Self(map)),
        }
    }
}

fn invalid(value: &str) -> ConfigError {
    ConfigError::InvalidAllowList(value.to_owned())
}

fn is_valid_name(name: &str) -> bool {
    name == WILDCARD || (!name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
}

fn is_valid_key(key: &str) -> bool {
    key == WILDCARD
        || key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'))
}
