use dioxus::prelude::*;

use crate::commands::{self, Command, CommandOutput};
use crate::notices::{NoticeLevel, Notifier};
use crate::state::{use_app_actions, use_dashboard, AppActions, DashboardHandle};

/// Runs UI actions against the page's dashboard and folds the results into app state.
#[derive(Clone)]
pub struct CommandRunner {
    handle: DashboardHandle,
    actions: AppActions,
}

impl CommandRunner {
    pub fn run(&self, action: &str, payload: &str) {
        let command = match commands::parse(action, payload) {
            Ok(command) => command,
            Err(err) => {
                tracing::warn!(action, %err, "ui action rejected");
                self.actions.notify(&err.to_string(), NoticeLevel::Warning);
                return;
            }
        };

        let Some(dashboard) = self.handle.get() else {
            self.actions
                .notify("El cliente de la API no está inicializado", NoticeLevel::Error);
            return;
        };

        let actions = self.actions;
        match &command {
            Command::GenerateCharts | Command::RefreshReport => actions.set_charts_busy(true),
            Command::Search(_) | Command::SearchProduct(_) => {
                actions.set_search_loading(true, None)
            }
            Command::FilterSentiment(sentiment) => {
                actions.set_search_loading(true, Some(*sentiment))
            }
            Command::ChartStyle(..) | Command::TopN(_) => {}
        }

        spawn(async move {
            match commands::dispatch(&dashboard, command).await {
                CommandOutput::Charts(summary) => {
                    actions.apply_render_summary(summary, &dashboard);
                    actions.set_charts_busy(false);
                }
                CommandOutput::Chart(kind, outcome) => {
                    actions.apply_chart_outcome(kind, outcome, dashboard.chart_settings());
                }
                CommandOutput::Search(view) => actions.set_search_view(view),
                CommandOutput::SettingsUpdated => {
                    actions.set_chart_settings(dashboard.chart_settings())
                }
            }
        });
    }
}

pub fn use_command_runner() -> CommandRunner {
    CommandRunner {
        handle: use_dashboard(),
        actions: use_app_actions(),
    }
}

/// Shows the persisted view count and initial chart settings once per mount.
pub fn use_dashboard_bootstrap() {
    let handle = use_dashboard();
    let actions = use_app_actions();

    use_hook(move || {
        if let Some(dashboard) = handle.get() {
            actions.set_view_count(dashboard.view_count());
            actions.set_chart_settings(dashboard.chart_settings());
        }
    });
}
