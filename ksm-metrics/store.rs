use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{ContentType, Family, FamilyHeader};

#[cfg(test)]
#[path = "./store.tests.rs"]
mod store_tests;

pub type GenerateFamiliesFn<K> = Arc<dyn Fn(&K) -> Vec<Family> + Send + Sync>;

/// Keeps rendered metric families for every object of one resource.\
/// **Note** that families are rendered when an object is added or updated,
/// so writing the store is only a matter of concatenating text.
pub struct MetricsStore<K> {
    headers: Vec<FamilyHeader>,
    generate: GenerateFamiliesFn<K>,
    metrics: RwLock<HashMap<String, Vec<String>>>,
}

impl<K> MetricsStore<K> {
    /// Creates new [`MetricsStore`] instance.\
    /// **Note** that `generate` must return families in the same order as `headers`.
    pub fn new(headers: Vec<FamilyHeader>, generate: impl Fn(&K) -> Vec<Family> + Send + Sync + 'static) -> Self {
        Self {
            headers,
            generate: Arc::new(generate),
            metrics: RwLock::new(HashMap::new()),
        }
    }

    /// Returns headers of all families in the store.
    pub fn headers(&self) -> &[FamilyHeader] {
        &self.headers
    }

    /// Adds or updates object with the specified `uid`.
    pub fn add(&self, uid: &str, object: &K) {
        let rendered = self.render(object);
        if let Ok(mut metrics) = self.metrics.write() {
            metrics.insert(uid.to_owned(), rendered);
        }
    }

    /// Removes object with the specified `uid`.
    pub fn delete(&self, uid: &str) {
        if let Ok(mut metrics) = self.metrics.write() {
            metrics.remove(uid);
        }
    }

    /// Replaces all objects in the store.
    pub fn replace<'a>(&self, objects: impl IntoIterator<Item = (&'a str, &'a K)>)
    where
        K: 'a,
    {
        let rendered = objects
            .into_iter()
            .map(|(uid, object)| (uid.to_owned(), self.render(object)))
            .collect::<HashMap<_, _>>();
        if let Ok(mut metrics) = self.metrics.write() {
            *metrics = rendered;
        }
    }

    /// Returns number of objects in the store.
    pub fn len(&self) -> usize {
        self.metrics.read().map_or(0, |m| m.len())
    }

    /// Returns `true` if there are no objects in the store.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes all families, including headers, of all objects in the store.
    pub fn write_all(&self, content_type: ContentType, out: &mut String) {
        for index in 0..self.headers.len() {
            self.write_family(index, content_type, true, out);
        }
    }

    /// Writes the family at `index` for every object in the store.
    pub(crate) fn write_family(&self, index: usize, content_type: ContentType, with_header: bool, out: &mut String) {
        if with_header && let Some(header) = self.headers.get(index) {
            header.write(content_type, out);
        }

        if let Ok(metrics) = self.metrics.read() {
            for families in metrics.values() {
                if let Some(family) = families.get(index) {
                    out.push_str(family);
                }
            }
        }
    }

    fn render(&self, object: &K) -> Vec<String> {
        (self.generate)(object).iter().map(Family::render).collect()
    }
}
