use kube::Client;
use kube::api::{ApiResource, DynamicObject};
use ksm_common::{fnv1a_64, jump_hash};
use ksm_config::{LabelsAllowList, NamespaceList, Options, WatchedNamespaces};
use ksm_kube::client::get_dynamic_api;
use ksm_kube::discovery::CrDiscoverer;
use ksm_kube::utils::get_object_uid;
use ksm_kube::{EventHandler, WatchEvent, WatchOptions, watch};
use ksm_metrics::{
    AllowDenyError, AllowDenyList, FamilyGenerator, MetricsStore, MetricsWriter, MultiStoreMetricsWriter, OptInFilter,
    Telemetry, compose_metric_gen_fns, extract_headers, filter_metric_families,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::custom_resources::{CustomResourceError, CustomResourceFactory};
use crate::resources::{AVAILABLE_RESOURCES, collector};

#[cfg(test)]
#[path = "./builder.tests.rs"]
mod builder_tests;

/// Possible errors when building metrics stores.
#[derive(thiserror::Error, Debug)]
pub enum BuilderError {
    /// Resource has no built-in collector.
    #[error("resource {0} is not supported, available resources: {1}")]
    UnknownResource(String, String),

    /// Stores cannot be watched without the kubernetes client.
    #[error("kubernetes client is required to build metrics stores")]
    MissingClient,

    /// Metric families filter is invalid.
    #[error("invalid metric families filter: {0}")]
    FamiliesFilter(#[from] AllowDenyError),

    /// Custom resource could not be resolved.
    #[error(transparent)]
    CustomResource(#[from] CustomResourceError),
}

/// Decides which objects belong to the current shard.\
/// **Note** that an object is kept if `jump_hash(fnv1a_64(uid), total_shards) == shard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardFilter {
    shard: u32,
    total_shards: u32,
}

impl Default for ShardFilter {
    fn default() -> Self {
        Self {
            shard: 0,
            total_shards: 1,
        }
    }
}

impl ShardFilter {
    /// Creates new [`ShardFilter`] instance.
    pub fn new(shard: u32, total_shards: u32) -> Self {
        Self { shard, total_shards }
    }

    /// Returns `true` if objects are split between more than one shard.
    pub fn is_sharded(&self) -> bool {
        self.total_shards > 1
    }

    /// Returns `true` if the object with the specified `uid` belongs to this shard.
    pub fn keeps(&self, uid: &str) -> bool {
        !self.is_sharded() || jump_hash(fnv1a_64(uid.as_bytes()), self.total_shards) == self.shard
    }
}

/// Applies watcher events of one resource to its metrics store.
pub struct StoreHandler {
    store: Arc<MetricsStore<DynamicObject>>,
    shard: ShardFilter,
    listed: Option<Vec<(String, DynamicObject)>>,
}

impl StoreHandler {
    /// Creates new [`StoreHandler`] instance.
    pub fn new(store: Arc<MetricsStore<DynamicObject>>, shard: ShardFilter) -> Self {
        Self {
            store,
            shard,
            listed: None,
        }
    }
}

impl EventHandler for StoreHandler {
    async fn handle(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::Init => self.listed = Some(Vec::new()),
            WatchEvent::InitApply(object) => {
                let uid = get_object_uid(&object);
                if self.shard.keeps(&uid) {
                    self.listed.get_or_insert_default().push((uid, object));
                }
            },
            WatchEvent::InitDone => {
                let listed = self.listed.take().unwrap_or_default();
                self.store.replace(listed.iter().map(|(uid, object)| (uid.as_str(), object)));
            },
            WatchEvent::Apply(object) => {
                let uid = get_object_uid(&object);
                if self.shard.keeps(&uid) {
                    self.store.add(&uid, &object);
                } else {
                    self.store.delete(&uid);
                }
            },
            WatchEvent::Delete(object) => self.store.delete(&get_object_uid(&object)),
        }
    }
}

/// Resource that is going to be watched together with its metric family generators.
pub struct StorePlan {
    pub name: String,
    pub api_resource: ApiResource,
    pub namespaced: bool,
    pub generators: Vec<FamilyGenerator<DynamicObject>>,
    pub stop_token: Option<CancellationToken>,
}

/// Metrics writers with the watchers that keep them up to date.
pub struct BuiltStores {
    writers: Vec<Arc<dyn MetricsWriter>>,
    resources: Vec<String>,
    tasks: Vec<JoinHandle<()>>,
    cancellation_token: CancellationToken,
}

impl BuiltStores {
    /// Returns metrics writers, one for each watched resource.
    pub fn writers(&self) -> &[Arc<dyn MetricsWriter>] {
        &self.writers
    }

    /// Returns names of all watched resources.
    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// Cancels all watchers.
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    /// Cancels all watchers and waits until they are finished.
    pub async fn stop(&mut self) {
        self.cancel();
        ksm_common::tasks::wait_for_tasks(std::mem::take(&mut self.tasks), "store").await;
    }
}

impl Drop for BuiltStores {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Builds metrics stores for the enabled resources and keeps them filled by kubernetes watchers.
#[derive(Default)]
pub struct Builder {
    client: Option<Client>,
    telemetry: Option<Telemetry>,
    resources: Vec<String>,
    namespaces: WatchedNamespaces,
    namespaces_fields: Option<String>,
    families_filter: AllowDenyList,
    opt_in_filter: OptInFilter,
    labels_allow_list: LabelsAllowList,
    annotations_allow_list: LabelsAllowList,
    shard: ShardFilter,
    custom_resources: Vec<CustomResourceFactory>,
    discoverer: Option<Arc<CrDiscoverer>>,
}

impl Builder {
    /// Creates new [`Builder`] instance configured from the exporter options.
    pub fn from_options(options: &Options) -> Result<Self, BuilderError> {
        let resources = options.enabled_resources();
        let mut labels_allow_list = options.labels_allow_list.clone();
        labels_allow_list.resolve_wildcard(&resources);
        let mut annotations_allow_list = options.annotations_allow_list.clone();
        annotations_allow_list.resolve_wildcard(&resources);

        Ok(Self::default()
            .with_resources(resources)
            .with_namespaces(options.effective_namespaces())
            .with_namespaces_denylist(&options.namespaces_denylist)
            .with_families_filter(AllowDenyList::new(
                &options.metric_allowlist.to_vec(),
                &options.metric_denylist.to_vec(),
            )?)
            .with_opt_in_filter(OptInFilter::new(&options.metric_opt_in_list.to_vec())?)
            .with_allow_lists(labels_allow_list, annotations_allow_list)
            .with_sharding(ShardFilter::new(options.shard, options.total_shards)))
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_telemetry(mut self, telemetry: Option<Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Sets enabled built-in resources.
    pub fn with_resources(mut self, mut resources: Vec<String>) -> Self {
        resources.sort();
        resources.dedup();
        self.resources = resources;
        self
    }

    /// Sets namespaces in which namespaced resources are watched.
    pub fn with_namespaces(mut self, namespaces: WatchedNamespaces) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Sets namespaces that are excluded from the all-namespaces watchers.
    pub fn with_namespaces_denylist(mut self, denylist: &NamespaceList) -> Self {
        self.namespaces_fields = denylist.as_exclude_field_selector();
        self
    }

    pub fn with_families_filter(mut self, filter: AllowDenyList) -> Self {
        self.families_filter = filter;
        self
    }

    pub fn with_opt_in_filter(mut self, filter: OptInFilter) -> Self {
        self.opt_in_filter = filter;
        self
    }

    /// Sets labels and annotations that are exposed by the `*_labels` and `*_annotations` families.
    pub fn with_allow_lists(mut self, labels: LabelsAllowList, annotations: LabelsAllowList) -> Self {
        self.labels_allow_list = labels;
        self.annotations_allow_list = annotations;
        self
    }

    pub fn with_sharding(mut self, shard: ShardFilter) -> Self {
        self.shard = shard;
        self
    }

    /// Sets custom resource factories and the discovery cache used to resolve their wildcards.
    pub fn with_custom_resources(
        mut self,
        factories: Vec<CustomResourceFactory>,
        discoverer: Option<Arc<CrDiscoverer>>,
    ) -> Self {
        self.custom_resources = factories;
        self.discoverer = discoverer;
        self
    }

    /// Returns namespaces in which namespaced resources are watched.
    pub fn namespaces(&self) -> &WatchedNamespaces {
        &self.namespaces
    }

    /// Returns `true` if the metric family should be generated.\
    /// Opt-in families must also be requested explicitly.
    pub fn is_family_enabled(&self, generator: &FamilyGenerator<DynamicObject>) -> bool {
        (!generator.opt_in || self.opt_in_filter.is_included(&generator.name))
            && self.families_filter.is_included(&generator.name)
    }

    /// Returns plans for all built-in and custom resources that have at least one enabled metric family.
    pub fn plan(&self) -> Result<Vec<StorePlan>, BuilderError> {
        let mut plans = Vec::with_capacity(self.resources.len() + self.custom_resources.len());
        for resource in &self.resources {
            let collector = collector(resource)
                .ok_or_else(|| BuilderError::UnknownResource(resource.clone(), AVAILABLE_RESOURCES.join(",")))?;
            let generators = (collector.generators)(
                self.labels_allow_list.get(resource),
                self.annotations_allow_list.get(resource),
            );

            self.push_plan(&mut plans, StorePlan {
                name: collector.name.to_owned(),
                api_resource: collector.api_resource,
                namespaced: collector.namespaced,
                generators,
                stop_token: None,
            });
        }

        for factory in &self.custom_resources {
            for resolved in factory.resolve(self.discoverer.as_deref())? {
                let stop_token = self.discoverer.as_ref().and_then(|d| d.stop_token(resolved.gvk()));
                self.push_plan(&mut plans, StorePlan {
                    name: resolved.name().to_owned(),
                    api_resource: resolved.api_resource(),
                    namespaced: false,
                    generators: resolved.generators(),
                    stop_token,
                });
            }
        }

        Ok(plans)
    }

    /// Builds metrics stores and starts watchers that fill them.\
    /// **Note** that watchers are children of the `parent` token.
    pub fn build(&self, parent: &CancellationToken) -> Result<BuiltStores, BuilderError> {
        let client = self.client.clone().ok_or(BuilderError::MissingClient)?;
        let plans = self.plan()?;

        if let Some(telemetry) = &self.telemetry {
            telemetry.record_sharding(self.shard.shard, self.shard.total_shards);
        }

        let cancellation_token = parent.child_token();
        let mut writers: Vec<Arc<dyn MetricsWriter>> = Vec::with_capacity(plans.len());
        let mut resources = Vec::with_capacity(plans.len());
        let mut tasks = Vec::new();

        for plan in plans {
            let stores = self.watch_plan(&plan, &client, &cancellation_token, &mut tasks);
            tracing::info!("Active resource: {} ({} stores)", plan.name, stores.len());
            writers.push(Arc::new(MultiStoreMetricsWriter::new(stores)));
            resources.push(plan.name);
        }

        Ok(BuiltStores {
            writers,
            resources,
            tasks,
            cancellation_token,
        })
    }

    fn push_plan(&self, plans: &mut Vec<StorePlan>, mut plan: StorePlan) {
        plan.generators = filter_metric_families(plan.generators, |g| self.is_family_enabled(g));
        if plan.generators.is_empty() {
            tracing::info!("All metric families of {} are filtered out, skipping it", plan.name);
        } else {
            plans.push(plan);
        }
    }

    fn watch_plan(
        &self,
        plan: &StorePlan,
        client: &Client,
        parent: &CancellationToken,
        tasks: &mut Vec<JoinHandle<()>>,
    ) -> Vec<Arc<MetricsStore<DynamicObject>>> {
        let cancellation_token = parent.child_token();
        if let Some(stop_token) = plan.stop_token.clone() {
            let cancellation_token = cancellation_token.clone();
            tasks.push(tokio::spawn(async move {
                tokio::select! {
                    () = stop_token.cancelled() => cancellation_token.cancel(),
                    () = cancellation_token.cancelled() => (),
                }
            }));
        }

        let namespaces = self.plan_namespaces(plan);
        if namespaces.is_empty() {
            tracing::debug!("No watched namespaces for {}", plan.name);
        }

        let headers = extract_headers(&plan.generators);
        let mut stores = Vec::with_capacity(namespaces.len());
        for namespace in namespaces {
            let store = Arc::new(MetricsStore::new(
                headers.clone(),
                compose_metric_gen_fns(plan.generators.clone()),
            ));

            let api = get_dynamic_api(&plan.api_resource, client.clone(), plan.namespaced, namespace);
            let fields = if plan.namespaced && namespace.is_none() {
                self.namespaces_fields.clone()
            } else {
                None
            };
            let options = WatchOptions::new(plan.name.clone()).with_fields(fields);
            let handler = StoreHandler::new(Arc::clone(&store), self.shard);

            tasks.push(tokio::spawn({
                let telemetry = self.telemetry.clone();
                let cancellation_token = cancellation_token.clone();
                async move {
                    watch(api, options, handler, telemetry, cancellation_token).await;
                }
            }));
            stores.push(store);
        }

        stores
    }

    /// Returns namespaces to start watchers in, `None` stands for a cluster-wide watcher.
    fn plan_namespaces(&self, plan: &StorePlan) -> Vec<Option<&str>> {
        match &self.namespaces {
            WatchedNamespaces::Only(namespaces) if plan.namespaced => {
                namespaces.iter().map(|n| Some(n.as_str())).collect()
            },
            _ => vec![None],
        }
    }
}
