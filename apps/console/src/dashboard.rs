//! Page-session object tying the report, charts, search and view counter together.

use std::rc::Rc;

use tracing::{info, warn};

use crate::charts::{
    ChartKind, ChartRenderer, ChartSettings, ChartStyle, ChartSurface, RenderOutcome,
    RenderSummary,
};
use crate::models::{ReportSnapshot, SearchHit, Sentiment};
use crate::notices::{NoticeLevel, Notifier};
use crate::report::{ReportSource, ReportStore};
use crate::search::{self, SearchError, SearchSource, SearchView};
use crate::views::{CounterStore, ViewCounter};

pub struct Dashboard<B, C, N, K> {
    store: ReportStore<Rc<B>>,
    backend: Rc<B>,
    charts: ChartRenderer<C>,
    notifier: N,
    views: ViewCounter<K>,
    search_top_k: usize,
}

impl<B, C, N, K> Dashboard<B, C, N, K>
where
    B: ReportSource + SearchSource,
    C: ChartSurface,
    N: Notifier,
    K: CounterStore,
{
    pub fn new(
        backend: B,
        surface: C,
        notifier: N,
        views: ViewCounter<K>,
        settings: ChartSettings,
        search_top_k: usize,
    ) -> Self {
        let backend = Rc::new(backend);
        Self {
            store: ReportStore::new(Rc::clone(&backend)),
            backend,
            charts: ChartRenderer::new(surface, settings),
            notifier,
            views,
            search_top_k: search_top_k.max(1),
        }
    }

    pub fn snapshot(&self) -> Option<Rc<ReportSnapshot>> {
        self.store.current()
    }

    pub fn charts_generated(&self) -> u64 {
        self.charts.charts_generated()
    }

    pub fn view_count(&self) -> u64 {
        self.views.current()
    }

    pub fn chart_settings(&self) -> ChartSettings {
        self.charts.settings()
    }

    #[cfg(test)]
    pub fn surface(&self) -> &C {
        self.charts.surface()
    }

    /// One full render cycle; a completed cycle counts as a view.
    pub async fn generate(&self) -> Option<RenderSummary> {
        let summary = self.charts.render_all(&self.store, &self.notifier).await?;
        let views = self.views.increment();
        info!(views, "dashboard view recorded");
        Some(summary)
    }

    /// Reloads the report, then renders from the fresh snapshot only.
    pub async fn refresh(&self) -> Option<RenderSummary> {
        self.charts.reset_counter();
        if self
            .store
            .refresh(self.charts.surface(), &self.notifier)
            .await
            .is_err()
        {
            return None;
        }
        self.generate().await
    }

    /// Applies a style change and redraws that chart when a snapshot is loaded.
    pub async fn restyle(&self, kind: ChartKind, style: ChartStyle) -> Option<RenderOutcome> {
        self.charts
            .update_settings(|settings| settings.set_style(kind, style));
        let snapshot = self.store.current()?;
        let outcome = self.charts.render(kind, &snapshot).await;
        if let RenderOutcome::Failed(reason) = &outcome {
            self.notifier.notify(
                &format!("No se pudo actualizar '{}': {reason}", kind.title()),
                NoticeLevel::Error,
            );
        }
        Some(outcome)
    }

    /// Stores a new top-N; takes effect on the next render cycle.
    pub fn set_top_n(&self, top_n: usize) {
        self.charts
            .update_settings(|settings| settings.top_n = top_n.max(1));
    }

    pub async fn search(&self, query: &str) -> Option<SearchView> {
        let query = query.trim();
        if query.is_empty() {
            self.notifier
                .notify("Ingresa un término de búsqueda", NoticeLevel::Warning);
            return None;
        }
        let hits = self.backend.search(query, self.search_top_k).await;
        self.present(hits, query)
    }

    pub async fn filter_by_sentiment(&self, sentiment: Sentiment) -> Option<SearchView> {
        let hits = self
            .backend
            .search_by_sentiment(sentiment, self.search_top_k)
            .await;
        self.present(hits, sentiment.display_label())
    }

    pub async fn search_by_product(&self, product: &str) -> Option<SearchView> {
        let product = product.trim();
        if product.is_empty() {
            self.notifier
                .notify("Ingresa el nombre de un producto", NoticeLevel::Warning);
            return None;
        }
        let hits = self
            .backend
            .search_by_product(product, self.search_top_k)
            .await;
        self.present(hits, product)
    }

    fn present(
        &self,
        hits: Result<Vec<SearchHit>, SearchError>,
        query_label: &str,
    ) -> Option<SearchView> {
        match hits {
            Ok(hits) => {
                info!(query = query_label, hits = hits.len(), "search finished");
                Some(search::render(&hits, query_label))
            }
            Err(err) => {
                warn!(query = query_label, %err, "search failed");
                self.notifier
                    .notify(&format!("Error en la búsqueda: {err}"), NoticeLevel::Error);
                None
            }
        }
    }
}
