#![allow(non_snake_case)]

mod api;
mod charts;
mod commands;
mod config;
mod dashboard;
mod hooks;
mod models;
mod notices;
mod report;
mod search;
mod state;
mod ui;
mod views;

use api::{ClientError, DashboardClient};
use config::AppConfig;
use dioxus::prelude::*;
use dioxus_router::prelude::*;
use hooks::dashboard::use_dashboard_bootstrap;
use once_cell::sync::OnceCell;
use state::{AppActions, AppState, DashboardHandle};
use tracing::{error, info};
use ui::charts::ChartsPanel;
use ui::notifications::NoticeStack;
use ui::search::SearchPanel;
use ui::summary::ReportSummaryCard;

pub(crate) static APP_CONFIG: OnceCell<AppConfig> = OnceCell::new();
pub(crate) static API_CLIENT: OnceCell<DashboardClient> = OnceCell::new();

fn main() {
    console_error_panic_hook::set_once();
    init_logging();
    bootstrap_infrastructure();
    launch(App);
}

fn init_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = dioxus_logger::init(tracing::Level::INFO);
    });
}

fn bootstrap_infrastructure() {
    let config = AppConfig::from_env();
    let _ = APP_CONFIG.set(config.clone());

    match DashboardClient::new(config) {
        Ok(client) => {
            info!(base_url = %client.config().api_base_url, "dashboard client initialized");
            let _ = API_CLIENT.set(client);
        }
        Err(err) => {
            report_client_error("no se pudo inicializar el cliente de la API", &err);
        }
    }
}

fn report_client_error(context: &str, err: &ClientError) {
    error!(%context, ?err, status = ?err.status(), "api bootstrap error");
}

#[component]
fn App() -> Element {
    let app_state = use_signal(AppState::default);

    use_context_provider(|| app_state);
    use_context_provider(|| DashboardHandle::new(API_CLIENT.get().cloned(), AppActions::new(app_state)));

    rsx! {
        div { class: "relative",
            Router::<Route> {}
            NoticeStack {}
        }
    }
}

#[derive(Clone, Routable, Debug, PartialEq)]
enum Route {
    #[route("/")]
    Dashboard {},
}

#[component]
fn Dashboard() -> Element {
    use_dashboard_bootstrap();

    let api_endpoint = API_CLIENT
        .get()
        .map(|client| client.config().api_base_url.clone())
        .unwrap_or_else(|| "API no configurada".to_string());

    rsx! {
        div { class: "app-shell space-y-4",
            section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
                h1 { class: "text-xl font-semibold text-slate-900", "Panel de opiniones de clientes" }
                p { class: "text-sm text-slate-600", "API: {api_endpoint}" }
            }
            ReportSummaryCard {}
            ChartsPanel {}
            SearchPanel {}
        }
    }
}
