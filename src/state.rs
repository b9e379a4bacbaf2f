use crate::aggregate::{summarize, AggregateOptions, DateFilter, GroupKey};
use crate::config::AnalyticsConfig;
use crate::fallback::{FallbackSource, FileSource, HttpSource};
use crate::models::{AnalyticsSummary, ResolutionTier};
use crate::render::{ChartRegistry, RenderedView, ViewRenderer};
use crate::resolver::DataResolver;
use crate::store::{EmbeddedStore, JsonDirStore};
use chrono::Utc;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleQuery {
    pub filter: DateFilter,
    pub group_by: Option<GroupKey>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AnalyticsConfig>,
    pub resolver: Arc<DataResolver>,
    pub renderer: Arc<Mutex<ViewRenderer<ChartRegistry>>>,
    sequence: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: AnalyticsConfig, resolver: DataResolver) -> Self {
        let renderer = ViewRenderer::new(ChartRegistry::default(), config.render.clone());
        Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
            renderer: Arc::new(Mutex::new(renderer)),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Wires the store and fallback source the config asks for.
    pub fn from_config(config: AnalyticsConfig) -> Self {
        let store: Option<Arc<dyn EmbeddedStore>> = config
            .store_dir
            .as_ref()
            .map(|dir| Arc::new(JsonDirStore::new(dir.clone())) as Arc<dyn EmbeddedStore>);
        let fallback: Arc<dyn FallbackSource> = match &config.fallback_url {
            Some(base_url) => Arc::new(HttpSource::new(base_url, &config.fallback_path)),
            None => Arc::new(FileSource::new(config.static_dir.clone(), &config.fallback_path)),
        };
        let resolver = DataResolver::new(
            store,
            config.database.clone(),
            config.collection.clone(),
            fallback,
        )
        .with_demo_fallback(config.demo_fallback);

        Self::new(config, resolver)
    }

    fn options_for(&self, query: &CycleQuery) -> AggregateOptions {
        let mut options = self.config.aggregate.clone();
        if let Some(group_by) = query.group_by {
            options.group_by = group_by;
        }
        options
    }

    /// One resolution and aggregation pass, without touching the view.
    pub async fn summarize(&self, query: &CycleQuery) -> (ResolutionTier, AnalyticsSummary) {
        let resolution = self.resolver.resolve().await;
        let tier = resolution.tier;
        let summary = summarize(resolution, &self.options_for(query), query.filter, Utc::now());
        (tier, summary)
    }

    /// Full refresh cycle. Each cycle takes the next sequence number and
    /// answers with its own summary. Only the newest cycle paints the shared
    /// view; an overtaken one gets an off-screen render tagged with its own
    /// sequence so the page can drop it.
    pub async fn refresh(&self, query: &CycleQuery) -> RenderedView {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let resolution = self.resolver.resolve().await;
        let tier = resolution.tier;
        let summary = summarize(resolution, &self.options_for(query), query.filter, Utc::now());

        if self.sequence.load(Ordering::SeqCst) == sequence {
            let mut renderer = self.renderer.lock().await;
            if let Some(view) = renderer.render_cycle(sequence, tier, &summary) {
                return view;
            }
        }

        debug!(sequence, "refresh cycle superseded, leaving the view alone");
        let mut view = scratch_view(self, tier, &summary);
        view.sequence = sequence;
        view
    }

    /// Latest applied view, refreshing once if nothing has been painted yet.
    pub async fn current_view(&self) -> RenderedView {
        if let Some(view) = self.renderer.lock().await.current() {
            return view.clone();
        }
        self.refresh(&CycleQuery::default()).await
    }
}

/// Renders through a throwaway chart backend so no shared handle is touched.
fn scratch_view(state: &AppState, tier: ResolutionTier, summary: &AnalyticsSummary) -> RenderedView {
    ViewRenderer::new(ChartRegistry::default(), state.config.render.clone()).render(tier, summary)
}
