use std::rc::Rc;
use std::time::Duration;

use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

use crate::api::DashboardClient;
use crate::charts::plotly::PlotlySurface;
use crate::charts::{ChartKind, ChartSettings, RenderOutcome, RenderSummary};
use crate::dashboard::Dashboard;
use crate::models::{ReportSummary, Sentiment};
use crate::notices::{
    ensure_styles, post_notice, DocumentStyles, ExpiryTimer, NoticeHost, NoticeLevel,
    NotificationCenter, Notifier,
};
use crate::search::SearchView;
use crate::views::{BrowserStorage, ViewCounter};
use crate::APP_CONFIG;

pub type AppSignal = Signal<AppState>;

pub type ConsoleDashboard = Dashboard<DashboardClient, PlotlySurface, AppActions, BrowserStorage>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartBoardState {
    pub is_busy: bool,
    pub last_summary: Option<RenderSummary>,
    pub outcomes: Vec<(ChartKind, RenderOutcome)>,
    pub charts_generated: u64,
    pub settings: ChartSettings,
}

impl ChartBoardState {
    pub fn outcome(&self, kind: ChartKind) -> Option<&RenderOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| outcome)
    }

    fn record(&mut self, kind: ChartKind, outcome: RenderOutcome) {
        match self.outcomes.iter_mut().find(|(k, _)| *k == kind) {
            Some(slot) => slot.1 = outcome,
            None => self.outcomes.push((kind, outcome)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportState {
    pub summary: Option<ReportSummary>,
    pub generated_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchState {
    pub view: Option<SearchView>,
    pub is_loading: bool,
    pub active_filter: Option<Sentiment>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub charts: ChartBoardState,
    pub report: ReportState,
    pub search: SearchState,
    pub notices: NotificationCenter,
    pub view_count: u64,
}

#[derive(Clone, Copy)]
pub struct AppActions {
    state: AppSignal,
}

impl PartialEq for AppActions {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl AppActions {
    pub fn new(state: AppSignal) -> Self {
        Self { state }
    }

    fn update<R>(&self, apply: impl FnOnce(&mut AppState) -> R) -> R {
        let mut signal = self.state;
        let mut state = signal.write();
        apply(&mut state)
    }

    pub fn set_charts_busy(&self, busy: bool) {
        self.update(|state| state.charts.is_busy = busy);
    }

    pub fn set_search_loading(&self, loading: bool, filter: Option<Sentiment>) {
        self.update(|state| {
            state.search.is_loading = loading;
            if loading {
                state.search.active_filter = filter;
            }
        });
    }

    pub fn apply_render_summary(&self, summary: Option<RenderSummary>, dashboard: &ConsoleDashboard) {
        let report = dashboard.snapshot();
        let charts_generated = dashboard.charts_generated();
        let view_count = dashboard.view_count();
        let settings = dashboard.chart_settings();
        self.update(|state| {
            state.charts.charts_generated = charts_generated;
            state.charts.settings = settings;
            state.view_count = view_count;
            match summary {
                Some(summary) => {
                    state.charts.outcomes = summary.outcomes.clone();
                    state.charts.last_summary = Some(summary);
                }
                None => {
                    state.charts.outcomes.clear();
                    state.charts.last_summary = None;
                }
            }
            state.report = match report {
                Some(snapshot) => ReportState {
                    summary: Some(snapshot.summary.clone()),
                    generated_at: snapshot.generated_at.clone(),
                },
                None => ReportState::default(),
            };
        });
    }

    pub fn apply_chart_outcome(
        &self,
        kind: ChartKind,
        outcome: Option<RenderOutcome>,
        settings: ChartSettings,
    ) {
        self.update(|state| {
            state.charts.settings = settings;
            if let Some(outcome) = outcome {
                state.charts.record(kind, outcome);
            }
        });
    }

    pub fn set_chart_settings(&self, settings: ChartSettings) {
        self.update(|state| state.charts.settings = settings);
    }

    pub fn set_search_view(&self, view: Option<SearchView>) {
        self.update(|state| {
            state.search.is_loading = false;
            if view.is_some() {
                state.search.view = view;
            }
        });
    }

    pub fn set_view_count(&self, count: u64) {
        self.update(|state| state.view_count = count);
    }

    pub fn dismiss_notice(&self, id: u64) {
        self.update(|state| {
            state.notices.dismiss(id);
        });
    }
}

impl NoticeHost for AppActions {
    fn with_center<R>(&self, apply: impl FnOnce(&mut NotificationCenter) -> R) -> R {
        self.update(|state| apply(&mut state.notices))
    }
}

/// Expiry timers on the Dioxus runtime.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimer;

impl ExpiryTimer for BrowserTimer {
    fn schedule(&self, after: Duration, expire: Box<dyn FnOnce()>) {
        let millis = u32::try_from(after.as_millis()).unwrap_or(u32::MAX);
        spawn(async move {
            TimeoutFuture::new(millis).await;
            expire();
        });
    }
}

impl Notifier for AppActions {
    fn notify(&self, message: &str, level: NoticeLevel) {
        ensure_styles(&DocumentStyles);
        match level {
            NoticeLevel::Error => tracing::error!(message, "notice"),
            NoticeLevel::Warning => tracing::warn!(message, "notice"),
            _ => tracing::info!(message, "notice"),
        }
        let ttl = APP_CONFIG
            .get()
            .map(|config| config.notice_ttl)
            .unwrap_or(Duration::from_secs(5));
        post_notice(self, &BrowserTimer, ttl, message, level);
    }
}

/// Context handle; `None` when the HTTP client could not be built at bootstrap.
#[derive(Clone)]
pub struct DashboardHandle(Option<Rc<ConsoleDashboard>>);

impl DashboardHandle {
    pub fn new(client: Option<DashboardClient>, actions: AppActions) -> Self {
        let config = APP_CONFIG.get().cloned().unwrap_or_default();
        let dashboard = client.map(|client| {
            Rc::new(Dashboard::new(
                client,
                PlotlySurface,
                actions,
                ViewCounter::new(BrowserStorage, config.view_counter_key.clone()),
                ChartSettings::with_top_n(config.top_n),
                config.search_top_k,
            ))
        });
        Self(dashboard)
    }

    pub fn get(&self) -> Option<Rc<ConsoleDashboard>> {
        self.0.clone()
    }
}

pub fn use_app_state() -> AppSignal {
    use_context::<AppSignal>()
}

pub fn use_app_actions() -> AppActions {
    AppActions::new(use_app_state())
}

pub fn use_dashboard() -> DashboardHandle {
    use_context::<DashboardHandle>()
}
