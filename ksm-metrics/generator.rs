use std::fmt::Write;
use std::sync::Arc;

use crate::{ContentType, Family, MetricType};

#[cfg(test)]
#[path = "./generator.tests.rs"]
mod generator_tests;

pub type GenerateFn<K> = Arc<dyn Fn(&K) -> Family + Send + Sync>;

/// Stability level of the metric family.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityLevel {
    #[default]
    Alpha,
    Stable,
}

impl StabilityLevel {
    fn as_str(&self) -> &'static str {
        match self {
            StabilityLevel::Alpha => "ALPHA",
            StabilityLevel::Stable => "STABLE",
        }
    }
}

/// `# HELP` and `# TYPE` data of the metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyHeader {
    pub name: String,
    pub help: String,
    pub metric_type: MetricType,
}

impl FamilyHeader {
    /// Writes header lines for the specified content type.
    pub fn write(&self, content_type: ContentType, out: &mut String) {
        let metric_type = match content_type {
            ContentType::Text => self.metric_type.as_text_str(),
            ContentType::OpenMetrics => self.metric_type.as_str(),
        };

        let _ = writeln!(out, "# HELP {} {}", self.name, self.help);
        let _ = writeln!(out, "# TYPE {} {}", self.name, metric_type);
    }
}

/// Provides everything needed to generate a metric family from a Kubernetes object.
pub struct FamilyGenerator<K> {
    pub name: String,
    pub help: String,
    pub metric_type: MetricType,
    pub stability: StabilityLevel,
    pub deprecated_version: Option<String>,
    pub opt_in: bool,
    generate: GenerateFn<K>,
}

impl<K> Clone for FamilyGenerator<K> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            help: self.help.clone(),
            metric_type: self.metric_type,
            stability: self.stability,
            deprecated_version: self.deprecated_version.clone(),
            opt_in: self.opt_in,
            generate: Arc::clone(&self.generate),
        }
    }
}

impl<K> FamilyGenerator<K> {
    /// Creates new [`FamilyGenerator`] instance with the `ALPHA` stability level.
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        metric_type: MetricType,
        generate: impl Fn(&K) -> Family + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            metric_type,
            stability: StabilityLevel::Alpha,
            deprecated_version: None,
            opt_in: false,
            generate: Arc::new(generate),
        }
    }

    /// Marks metric family as stable.
    pub fn stable(mut self) -> Self {
        self.stability = StabilityLevel::Stable;
        self
    }

    /// Marks metric family as alpha, e.g. a shared family that is not stable for this resource.
    pub fn alpha(mut self) -> Self {
        self.stability = StabilityLevel::Alpha;
        self
    }

    /// Marks metric family as deprecated since the specified version.
    pub fn deprecated(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.help = format!("(Deprecated since {version}) {}", self.help);
        self.deprecated_version = Some(version);
        self
    }

    /// Marks metric family as opt-in, it is generated only when explicitly requested.
    pub fn opt_in(mut self) -> Self {
        self.opt_in = true;
        self
    }

    /// Generates metric family for the provided object and gives it its name and type.
    pub fn generate(&self, object: &K) -> Family {
        let mut family = (self.generate)(object);
        family.name.clone_from(&self.name);
        family.metric_type = self.metric_type;
        family
    }

    /// Returns header of the generated metric family.
    pub fn header(&self) -> FamilyHeader {
        let help = if self.stability == StabilityLevel::Stable {
            format!("[{}] {}", self.stability.as_str(), self.help)
        } else {
            self.help.clone()
        };

        FamilyHeader {
            name: self.name.clone(),
            help,
            metric_type: self.metric_type,
        }
    }
}

/// Returns headers of all the provided generators.
pub fn extract_headers<K>(generators: &[FamilyGenerator<K>]) -> Vec<FamilyHeader> {
    generators.iter().map(FamilyGenerator::header).collect()
}

/// Composes generators into one function that renders all families for an object.\
/// **Note** that the returned families are in the same order as the generators (and their headers).
pub fn compose_metric_gen_fns<K: 'static>(
    generators: Vec<FamilyGenerator<K>>,
) -> impl Fn(&K) -> Vec<Family> + Send + Sync + 'static {
    move |object| generators.iter().map(|g| g.generate(object)).collect()
}

/// Keeps only generators accepted by the `test` function.
pub fn filter_metric_families<K>(
    generators: Vec<FamilyGenerator<K>>,
    test: impl Fn(&FamilyGenerator<K>) -> bool,
) -> Vec<FamilyGenerator<K>> {
    generators.into_iter().filter(|g| test(g)).collect()
}
