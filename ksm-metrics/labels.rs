use std::collections::{BTreeMap, HashMap};

use crate::Metric;

#[cfg(test)]
#[path = "./labels.tests.rs"]
mod labels_tests;

/// Allow-list entry that allows every Kubernetes label or annotation.
pub const LABEL_WILDCARD: &str = "*";

/// Possible condition statuses, in the order they are exposed.
pub const CONDITION_STATUSES: [&str; 3] = ["True", "False", "Unknown"];

/// Replaces all characters that are not valid in a Prometheus label name with an underscore.
pub fn sanitize_label_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Converts `camelCase` name to the `snake_case` one.
pub fn to_snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut previous = None;
    for c in name.chars() {
        if c.is_ascii_uppercase() && previous.is_some_and(|p: char| p.is_ascii_lowercase() || p.is_ascii_digit()) {
            result.push('_');
        }

        result.push(c.to_ascii_lowercase());
        previous = Some(c);
    }

    result
}

/// Builds Prometheus label name from the prefix and Kubernetes label or annotation key.
pub fn label_name(prefix: &str, key: &str) -> String {
    format!("{prefix}_{}", to_snake_case(&sanitize_label_name(key)))
}

/// Converts Kubernetes labels or annotations to Prometheus label keys and values.\
/// **Note** that keys are sorted and keys that map to the same Prometheus name get the `_conflictN` suffix.
pub fn map_to_prometheus_labels(prefix: &str, input: &BTreeMap<String, String>) -> (Vec<String>, Vec<String>) {
    struct Conflict {
        count: usize,
        initial: usize,
    }

    let mut keys: Vec<String> = Vec::with_capacity(input.len());
    let mut values = Vec::with_capacity(input.len());
    let mut conflicts: HashMap<String, Conflict> = HashMap::new();

    for (key, value) in input {
        let mut label_key = label_name(prefix, key);
        if let Some(conflict) = conflicts.get_mut(&label_key) {
            if conflict.count == 1 {
                keys[conflict.initial] = conflict_suffix(&keys[conflict.initial], 1);
            }

            conflict.count += 1;
            label_key = conflict_suffix(&label_key, conflict.count);
        } else {
            conflicts.insert(
                label_key.clone(),
                Conflict {
                    count: 1,
                    initial: keys.len(),
                },
            );
        }

        keys.push(label_key);
        values.push(value.clone());
    }

    (keys, values)
}

/// Returns Prometheus labels only for the Kubernetes labels or annotations from the allow-list.\
/// **Note** that the [`LABEL_WILDCARD`] as the first allow-list entry allows all of them.
pub fn create_prometheus_labels(
    prefix: &str,
    input: Option<&BTreeMap<String, String>>,
    allow_list: &[String],
) -> (Vec<String>, Vec<String>) {
    let empty = BTreeMap::new();
    let input = input.unwrap_or(&empty);
    if allow_list.first().is_some_and(|f| f == LABEL_WILDCARD) {
        return map_to_prometheus_labels(prefix, input);
    }

    let allowed = allow_list
        .iter()
        .filter_map(|key| input.get(key).map(|value| (key.clone(), value.clone())))
        .collect::<BTreeMap<_, _>>();
    map_to_prometheus_labels(prefix, &allowed)
}

/// Generates one metric for each possible condition status.\
/// **Note** that the returned metrics have only the `status` label value set,
/// the `status` key and other labels must be added by the caller.
pub fn condition_metrics(status: &str) -> Vec<Metric> {
    CONDITION_STATUSES
        .iter()
        .map(|s| Metric {
            label_keys: Vec::new(),
            label_values: vec![s.to_lowercase()],
            value: bool_value(s.eq_ignore_ascii_case(status)),
        })
        .collect()
}

/// Converts boolean to the metric value.
pub fn bool_value(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

fn conflict_suffix(label: &str, count: usize) -> String {
    format!("{label}_conflict{count}")
}
