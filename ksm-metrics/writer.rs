use std::sync::Arc;

use crate::{ContentType, MetricsStore};

#[cfg(test)]
#[path = "./writer.tests.rs"]
mod writer_tests;

/// Writes metrics of one resource to the exposition output.
pub trait MetricsWriter: Send + Sync {
    /// Writes all families with headers to `out`.
    fn write_all(&self, out: &mut String, content_type: ContentType);
}

/// Writes metrics from many stores of the same resource as one set of families.\
/// **Note** that header of each family is written only once and is followed by the metrics from all stores.
pub struct MultiStoreMetricsWriter<K> {
    stores: Vec<Arc<MetricsStore<K>>>,
}

impl<K> MultiStoreMetricsWriter<K> {
    /// Creates new [`MultiStoreMetricsWriter`] instance.
    pub fn new(stores: Vec<Arc<MetricsStore<K>>>) -> Self {
        Self { stores }
    }

    /// Returns stores used by this writer.
    pub fn stores(&self) -> &[Arc<MetricsStore<K>>] {
        &self.stores
    }
}

impl<K: Send + Sync> MetricsWriter for MultiStoreMetricsWriter<K> {
    fn write_all(&self, out: &mut String, content_type: ContentType) {
        let Some(first) = self.stores.first() else {
            return;
        };

        for (index, header) in first.headers().iter().enumerate() {
            header.write(content_type, out);
            for store in &self.stores {
                store.write_family(index, content_type, false, out);
            }
        }
    }
}

/// Writes output of all the writers and ends it as the content type requires.
pub fn write_exposition(writers: &[Arc<dyn MetricsWriter>], content_type: ContentType) -> String {
    let mut out = String::new();
    for writer in writers {
        writer.write_all(&mut out, content_type);
    }

    content_type.write_eof(&mut out);
    out
}
