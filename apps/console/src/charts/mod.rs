pub mod plotly;
pub mod spec;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::ReportSnapshot;
use crate::notices::{NoticeLevel, Notifier};
use crate::report::{ReportSource, ReportStore};

pub use spec::{ChartSpec, Figure};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Sentiment,
    Products,
    Brands,
    Events,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        Self::Sentiment,
        Self::Products,
        Self::Brands,
        Self::Events,
    ];

    pub fn container_id(self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment-chart",
            Self::Products => "products-chart",
            Self::Brands => "brands-chart",
            Self::Events => "events-chart",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Sentiment => "Distribución de Sentimientos",
            Self::Products => "Productos Más Mencionados",
            Self::Brands => "Marcas Más Mencionadas",
            Self::Events => "Tipos de Eventos",
        }
    }

    pub fn default_style(self) -> ChartStyle {
        match self {
            Self::Sentiment => ChartStyle::Donut,
            Self::Products | Self::Brands => ChartStyle::Bar,
            Self::Events => ChartStyle::Pie,
        }
    }

    pub fn from_container_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.container_id() == id)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.container_id())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartStyle {
    Donut,
    Pie,
    Bar,
}

impl ChartStyle {
    pub const ALL: [ChartStyle; 3] = [Self::Donut, Self::Pie, Self::Bar];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Donut => "donut",
            Self::Pie => "pie",
            Self::Bar => "bar",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.as_str() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Donut => "Dona",
            Self::Pie => "Circular",
            Self::Bar => "Barras",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartSettings {
    pub top_n: usize,
    overrides: HashMap<ChartKind, ChartStyle>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            top_n: 10,
            overrides: HashMap::new(),
        }
    }
}

impl ChartSettings {
    pub fn with_top_n(top_n: usize) -> Self {
        Self {
            top_n: top_n.max(1),
            ..Self::default()
        }
    }

    pub fn style_for(&self, kind: ChartKind) -> ChartStyle {
        self.overrides
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_style())
    }

    pub fn set_style(&mut self, kind: ChartKind, style: ChartStyle) {
        if style == kind.default_style() {
            self.overrides.remove(&kind);
        } else {
            self.overrides.insert(kind, style);
        }
    }
}

/// Inline content shown inside a chart container instead of a figure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placeholder {
    Clearing,
    Empty,
    Failed(String),
}

impl Placeholder {
    pub fn message(&self) -> String {
        match self {
            Self::Clearing => "Actualizando datos...".to_string(),
            Self::Empty => "No hay datos disponibles para este gráfico".to_string(),
            Self::Failed(reason) => format!("No se pudo generar el gráfico: {reason}"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("contenedor '{0}' no encontrado")]
    MissingContainer(String),
    #[error("{0}")]
    Draw(String),
}

/// Display regions the charts are drawn into.
pub trait ChartSurface {
    fn has_container(&self, container_id: &str) -> bool;

    fn show_placeholder(&self, container_id: &str, placeholder: &Placeholder);

    async fn draw(&self, container_id: &str, figure: &Figure) -> Result<(), RenderError>;
}

impl<T: ChartSurface> ChartSurface for Rc<T> {
    fn has_container(&self, container_id: &str) -> bool {
        self.as_ref().has_container(container_id)
    }

    fn show_placeholder(&self, container_id: &str, placeholder: &Placeholder) {
        self.as_ref().show_placeholder(container_id, placeholder)
    }

    async fn draw(&self, container_id: &str, figure: &Figure) -> Result<(), RenderError> {
        self.as_ref().draw(container_id, figure).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    EmptyData,
    Failed(String),
}

impl RenderOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub outcomes: Vec<(ChartKind, RenderOutcome)>,
}

impl RenderSummary {
    /// Charts that settled without failing, empty ones included.
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_failure())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_failure())
            .count()
    }

    pub fn outcome(&self, kind: ChartKind) -> Option<&RenderOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| outcome)
    }
}

pub struct ChartRenderer<C> {
    surface: C,
    settings: RefCell<ChartSettings>,
    charts_generated: Cell<u64>,
}

impl<C: ChartSurface> ChartRenderer<C> {
    pub fn new(surface: C, settings: ChartSettings) -> Self {
        Self {
            surface,
            settings: RefCell::new(settings),
            charts_generated: Cell::new(0),
        }
    }

    pub fn surface(&self) -> &C {
        &self.surface
    }

    pub fn settings(&self) -> ChartSettings {
        self.settings.borrow().clone()
    }

    pub fn update_settings(&self, update: impl FnOnce(&mut ChartSettings)) {
        update(&mut self.settings.borrow_mut());
    }

    pub fn charts_generated(&self) -> u64 {
        self.charts_generated.get()
    }

    pub fn reset_counter(&self) {
        self.charts_generated.set(0);
    }

    /// Renders one chart. Failures stay inside the chart's own container.
    pub async fn render(&self, kind: ChartKind, snapshot: &ReportSnapshot) -> RenderOutcome {
        let settings = self.settings();
        self.render_with(kind, snapshot, &settings).await
    }

    async fn render_with(
        &self,
        kind: ChartKind,
        snapshot: &ReportSnapshot,
        settings: &ChartSettings,
    ) -> RenderOutcome {
        let container = kind.container_id();

        if !self.surface.has_container(container) {
            let err = RenderError::MissingContainer(container.to_string());
            warn!(chart = %kind, %err, "chart container missing");
            return RenderOutcome::Failed(err.to_string());
        }

        let spec = ChartSpec::derive(kind, snapshot, settings);
        if spec.is_empty() {
            debug!(chart = %kind, "no data for chart");
            self.surface.show_placeholder(container, &Placeholder::Empty);
            return RenderOutcome::EmptyData;
        }

        match self.surface.draw(container, &spec.figure()).await {
            Ok(()) => {
                debug!(chart = %kind, points = spec.points.len(), "chart rendered");
                RenderOutcome::Rendered
            }
            Err(err) => {
                warn!(chart = %kind, %err, "chart render failed");
                let reason = err.to_string();
                self.surface
                    .show_placeholder(container, &Placeholder::Failed(reason.clone()));
                RenderOutcome::Failed(reason)
            }
        }
    }

    /// Renders every chart kind concurrently and waits for all of them to settle.
    ///
    /// Without a snapshot one load is attempted first; if that fails the cycle is
    /// abandoned with a single warning and `None` is returned.
    pub async fn render_all<S: ReportSource>(
        &self,
        store: &ReportStore<S>,
        notifier: &impl Notifier,
    ) -> Option<RenderSummary> {
        self.reset_counter();

        let snapshot = match store.current() {
            Some(snapshot) => snapshot,
            None => match store.fetch().await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    notifier.notify(
                        &format!("No hay datos disponibles para generar los gráficos: {err}"),
                        NoticeLevel::Warning,
                    );
                    return None;
                }
            },
        };

        let settings = self.settings();
        let outcomes = join_all(
            ChartKind::ALL
                .into_iter()
                .map(|kind| self.render_with(kind, &snapshot, &settings)),
        )
        .await;

        let summary = RenderSummary {
            outcomes: ChartKind::ALL.into_iter().zip(outcomes).collect(),
        };
        self.charts_generated
            .set(self.charts_generated.get() + summary.succeeded() as u64);

        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "render cycle finished"
        );

        if summary.failed() == 0 {
            notifier.notify(
                &format!("{} gráficos generados correctamente", summary.succeeded()),
                NoticeLevel::Success,
            );
        } else {
            notifier.notify(
                &format!(
                    "Gráficos generados: {} exitosos, {} con errores",
                    summary.succeeded(),
                    summary.failed()
                ),
                NoticeLevel::Warning,
            );
        }

        Some(summary)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::CountMap;
    use crate::notices::tests::RecordingNotifier;
    use crate::report::tests::{sample_snapshot, ScriptedSource};
    use crate::report::ReportError;
    use futures::executor::block_on;
    use std::collections::HashSet;

    /// In-memory surface: every container exists unless listed as missing.
    #[derive(Default)]
    pub(crate) struct RecordingSurface {
        pub missing: HashSet<&'static str>,
        pub failing: HashSet<&'static str>,
        drawn: RefCell<Vec<(String, Figure)>>,
        placeholders: RefCell<Vec<(String, Placeholder)>>,
    }

    impl RecordingSurface {
        pub fn drawn(&self) -> Vec<String> {
            self.drawn.borrow().iter().map(|(id, _)| id.clone()).collect()
        }

        pub fn placeholders(&self) -> Vec<(String, Placeholder)> {
            self.placeholders.borrow().clone()
        }
    }

    impl ChartSurface for RecordingSurface {
        fn has_container(&self, container_id: &str) -> bool {
            !self.missing.contains(container_id)
        }

        fn show_placeholder(&self, container_id: &str, placeholder: &Placeholder) {
            self.placeholders
                .borrow_mut()
                .push((container_id.to_string(), placeholder.clone()));
        }

        async fn draw(&self, container_id: &str, figure: &Figure) -> Result<(), RenderError> {
            if self.failing.contains(container_id) {
                return Err(RenderError::Draw("Plotly rechazó la figura".into()));
            }
            self.drawn
                .borrow_mut()
                .push((container_id.to_string(), figure.clone()));
            Ok(())
        }
    }

    fn loaded_store() -> ReportStore<ScriptedSource> {
        let store = ReportStore::new(ScriptedSource::with(vec![Ok(sample_snapshot())]));
        block_on(store.fetch()).unwrap();
        store
    }

    #[test]
    fn render_all_draws_every_chart() {
        let store = loaded_store();
        let renderer = ChartRenderer::new(RecordingSurface::default(), ChartSettings::default());
        let notifier = RecordingNotifier::default();

        let summary = block_on(renderer.render_all(&store, &notifier)).unwrap();

        assert_eq!(summary.succeeded(), 4);
        assert_eq!(summary.failed(), 0);
        assert_eq!(renderer.charts_generated(), 4);
        assert_eq!(renderer.surface().drawn().len(), 4);
        assert_eq!(notifier.levels(), [NoticeLevel::Success]);
    }

    #[test]
    fn one_failure_does_not_stop_siblings() {
        let store = loaded_store();
        let surface = RecordingSurface {
            failing: HashSet::from(["products-chart"]),
            missing: HashSet::from(["events-chart"]),
            ..Default::default()
        };
        let renderer = ChartRenderer::new(surface, ChartSettings::default());
        let notifier = RecordingNotifier::default();

        let summary = block_on(renderer.render_all(&store, &notifier)).unwrap();

        assert_eq!(summary.succeeded() + summary.failed(), ChartKind::ALL.len());
        assert_eq!(summary.failed(), 2);
        assert!(matches!(
            summary.outcome(ChartKind::Events),
            Some(RenderOutcome::Failed(reason)) if reason.contains("events-chart")
        ));
        assert_eq!(renderer.charts_generated(), 2);
        assert_eq!(
            renderer.surface().drawn(),
            ["sentiment-chart", "brands-chart"]
        );
        // failed draw shows inline, missing container has nowhere to show
        let placeholders = renderer.surface().placeholders();
        assert_eq!(placeholders.len(), 1);
        assert_eq!(placeholders[0].0, "products-chart");
        assert_eq!(notifier.levels(), [NoticeLevel::Warning]);
    }

    #[test]
    fn empty_sentiment_is_not_a_failure() {
        let mut snapshot = sample_snapshot();
        snapshot.sentiment_distribution = CountMap::default();
        let store = ReportStore::new(ScriptedSource::with(vec![Ok(snapshot)]));
        let renderer = ChartRenderer::new(RecordingSurface::default(), ChartSettings::default());
        let notifier = RecordingNotifier::default();

        let summary = block_on(renderer.render_all(&store, &notifier)).unwrap();

        assert_eq!(
            summary.outcome(ChartKind::Sentiment),
            Some(&RenderOutcome::EmptyData)
        );
        assert_eq!(summary.failed(), 0);
        assert_eq!(
            renderer.surface().placeholders(),
            [("sentiment-chart".to_string(), Placeholder::Empty)]
        );
    }

    #[test]
    fn missing_snapshot_triggers_one_load() {
        let store = ReportStore::new(ScriptedSource::with(vec![Ok(sample_snapshot())]));
        let renderer = ChartRenderer::new(RecordingSurface::default(), ChartSettings::default());
        let notifier = RecordingNotifier::default();

        let summary = block_on(renderer.render_all(&store, &notifier));

        assert!(summary.is_some());
        assert!(store.current().is_some());
    }

    #[test]
    fn failed_load_aborts_cycle_with_single_warning() {
        let source = ScriptedSource::with(vec![Err(ReportError::Transport("timeout".into()))]);
        let store = ReportStore::new(source);
        let renderer = ChartRenderer::new(RecordingSurface::default(), ChartSettings::default());
        let notifier = RecordingNotifier::default();

        let summary = block_on(renderer.render_all(&store, &notifier));

        assert!(summary.is_none());
        assert_eq!(notifier.levels(), [NoticeLevel::Warning]);
        assert!(renderer.surface().drawn().is_empty());
        assert!(renderer.surface().placeholders().is_empty());
        assert_eq!(renderer.charts_generated(), 0);
    }

    #[test]
    fn counter_resets_each_cycle() {
        let store = loaded_store();
        let renderer = ChartRenderer::new(RecordingSurface::default(), ChartSettings::default());
        let notifier = RecordingNotifier::default();

        block_on(renderer.render_all(&store, &notifier));
        block_on(renderer.render_all(&store, &notifier));

        assert_eq!(renderer.charts_generated(), 4);
    }

    #[test]
    fn single_render_uses_current_settings() {
        let renderer = ChartRenderer::new(RecordingSurface::default(), ChartSettings::with_top_n(1));
        renderer.update_settings(|settings| settings.set_style(ChartKind::Products, ChartStyle::Pie));

        let outcome = block_on(renderer.render(ChartKind::Products, &sample_snapshot()));

        assert_eq!(outcome, RenderOutcome::Rendered);
        let drawn = renderer.surface().drawn.borrow();
        let value = serde_json::to_value(&drawn[0].1).unwrap();
        assert_eq!(value["data"][0]["type"], "pie");
        assert_eq!(value["data"][0]["labels"], serde_json::json!(["Camisa"]));
    }

    #[test]
    fn style_override_back_to_default_is_forgotten() {
        let mut settings = ChartSettings::default();
        settings.set_style(ChartKind::Events, ChartStyle::Bar);
        assert_eq!(settings.style_for(ChartKind::Events), ChartStyle::Bar);
        settings.set_style(ChartKind::Events, ChartStyle::Pie);
        assert_eq!(settings, ChartSettings::default());
    }
}
