use kube::api::ApiResource;
use std::fmt::Display;

#[cfg(test)]
#[path = "./gvk.tests.rs"]
mod gvk_tests;

pub const CORE_VERSION: &str = "v1";
pub const WILDCARD: &str = "*";

/// Kubernetes API type identifier.\
/// **Note** that `version` and `kind` can be wildcards (`*` or empty) when used as a query.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    /// Creates new [`GroupVersionKind`] instance.
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Creates new [`GroupVersionKind`] instance from `api_version` (`group/version` or `version`) and `kind`.
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => Self::new(group, version, kind),
            None => Self::new("", api_version, kind),
        }
    }

    /// Returns `true` if group is set and is not a wildcard.
    pub fn has_group(&self) -> bool {
        is_concrete(&self.group)
    }

    /// Returns `true` if version is set and is not a wildcard.
    pub fn has_version(&self) -> bool {
        is_concrete(&self.version)
    }

    /// Returns `true` if kind is set and is not a wildcard.
    pub fn has_kind(&self) -> bool {
        is_concrete(&self.kind)
    }

    /// Returns `true` if version or kind is a wildcard.
    pub fn is_pattern(&self) -> bool {
        !self.has_version() || !self.has_kind()
    }

    /// Returns api version in the `group/version` form, or just `version` for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Builds [`ApiResource`] for this GVK and the provided `plural` name.
    pub fn to_api_resource(&self, plural: &str) -> ApiResource {
        ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version: self.api_version(),
            kind: self.kind.clone(),
            plural: plural.to_owned(),
        }
    }
}

impl Display for GroupVersionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}, Kind={}", self.group, self.version, self.kind)
    }
}

impl From<&ApiResource> for GroupVersionKind {
    fn from(value: &ApiResource) -> Self {
        Self::new(&value.group, &value.version, &value.kind)
    }
}

fn is_concrete(value: &str) -> bool {
    !value.is_empty() && value != WILDCARD
}
