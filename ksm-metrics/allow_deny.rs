use regex::Regex;
use thiserror::Error;

#[cfg(test)]
#[path = "./allow_deny.tests.rs"]
mod allow_deny_tests;

/// Possible errors from building metric families filters.
#[derive(Error, Debug)]
pub enum AllowDenyError {
    /// Both allow and deny lists were provided.
    #[error("allow-list and deny-list are mutually exclusive")]
    Exclusive,

    /// One of the patterns is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Filters metric family names by allow-list or deny-list of regular expressions.\
/// **Note** that patterns are not anchored, so `kube_pod` matches every pod family.
#[derive(Debug, Default)]
pub struct AllowDenyList {
    list: Option<Regex>,
    is_allow_list: bool,
}

impl AllowDenyList {
    /// Creates new [`AllowDenyList`] instance.\
    /// If both lists are empty every name is allowed.
    pub fn new(allow: &[String], deny: &[String]) -> Result<Self, AllowDenyError> {
        let allow = non_empty(allow);
        let deny = non_empty(deny);
        if !allow.is_empty() && !deny.is_empty() {
            return Err(AllowDenyError::Exclusive);
        }

        let is_allow_list = !allow.is_empty();
        let patterns = if is_allow_list { allow } else { deny };
        Ok(Self {
            list: compile(&patterns)?,
            is_allow_list,
        })
    }

    /// Returns `true` if this is an allow-list.
    pub fn is_allow_list(&self) -> bool {
        self.is_allow_list
    }

    /// Returns `true` if the metric family with the specified name should be exposed.
    pub fn is_included(&self, name: &str) -> bool {
        match &self.list {
            Some(list) => list.is_match(name) == self.is_allow_list,
            None => true,
        }
    }

    /// Returns `true` if the metric family with the specified name should be dropped.
    pub fn is_excluded(&self, name: &str) -> bool {
        !self.is_included(name)
    }

    /// Returns a human readable status of the filter.
    pub fn status(&self) -> String {
        let kind = if self.is_allow_list { "allow" } else { "deny" };
        match &self.list {
            Some(list) => format!("{kind}-list: {}", list.as_str()),
            None => "no metric families filtering".to_owned(),
        }
    }
}

/// Decides about families that are generated only on request.
#[derive(Debug, Default)]
pub struct OptInFilter {
    list: Option<Regex>,
    count: usize,
}

impl OptInFilter {
    /// Creates new [`OptInFilter`] instance.
    pub fn new(patterns: &[String]) -> Result<Self, AllowDenyError> {
        let patterns = non_empty(patterns);
        Ok(Self {
            list: compile(&patterns)?,
            count: patterns.len(),
        })
    }

    /// Returns `true` if the opt-in family with the specified name was requested.
    pub fn is_included(&self, name: &str) -> bool {
        self.list.as_ref().is_some_and(|l| l.is_match(name))
    }

    /// Returns number of opt-in patterns.
    pub fn count(&self) -> usize {
        self.count
    }
}

fn non_empty(patterns: &[String]) -> Vec<&str> {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect()
}

fn compile(patterns: &[&str]) -> Result<Option<Regex>, AllowDenyError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    for pattern in patterns {
        if let Err(source) = Regex::new(pattern) {
            return Err(AllowDenyError::InvalidPattern {
                pattern: (*pattern).to_owned(),
                source,
            });
        }
    }

    let joined = patterns.join("|");
    Regex::new(&joined)
        .map(Some)
        .map_err(|source| AllowDenyError::InvalidPattern { pattern: joined, source })
}
