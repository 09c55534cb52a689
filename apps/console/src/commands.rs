//! UI action identifiers and their handlers.
//!
//! Controls only ever emit an action id plus a payload string; everything past
//! that point is plain data, so the wiring can be exercised without a DOM.

use thiserror::Error;

use crate::charts::{ChartKind, ChartStyle, ChartSurface, RenderOutcome, RenderSummary};
use crate::dashboard::Dashboard;
use crate::models::Sentiment;
use crate::notices::Notifier;
use crate::report::ReportSource;
use crate::search::{SearchSource, SearchView};
use crate::views::CounterStore;

pub const GENERATE_CHARTS: &str = "generate-charts";
pub const REFRESH_REPORT: &str = "refresh-report";
pub const SEARCH: &str = "search";
pub const SEARCH_PRODUCT: &str = "search-product";
pub const FILTER_SENTIMENT: &str = "filter-sentiment";
pub const CHART_STYLE: &str = "chart-style";
pub const TOP_N: &str = "top-n";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    GenerateCharts,
    RefreshReport,
    Search(String),
    SearchProduct(String),
    FilterSentiment(Sentiment),
    ChartStyle(ChartKind, ChartStyle),
    TopN(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("acción desconocida: {0}")]
    UnknownAction(String),
    #[error("valor inválido para {action}: {value}")]
    InvalidPayload { action: String, value: String },
}

type Parser = fn(Option<&str>, &str) -> Option<Command>;

/// Action id (the part before an optional `:` argument) to payload parser.
const TABLE: &[(&str, Parser)] = &[
    (GENERATE_CHARTS, parse_generate),
    (REFRESH_REPORT, parse_refresh),
    (SEARCH, parse_search),
    (SEARCH_PRODUCT, parse_search_product),
    (FILTER_SENTIMENT, parse_filter_sentiment),
    (CHART_STYLE, parse_chart_style),
    (TOP_N, parse_top_n),
];

fn parse_generate(_: Option<&str>, _: &str) -> Option<Command> {
    Some(Command::GenerateCharts)
}

fn parse_refresh(_: Option<&str>, _: &str) -> Option<Command> {
    Some(Command::RefreshReport)
}

fn parse_search(_: Option<&str>, payload: &str) -> Option<Command> {
    Some(Command::Search(payload.to_string()))
}

fn parse_search_product(_: Option<&str>, payload: &str) -> Option<Command> {
    Some(Command::SearchProduct(payload.to_string()))
}

fn parse_filter_sentiment(arg: Option<&str>, payload: &str) -> Option<Command> {
    match Sentiment::from_label(arg.unwrap_or(payload)) {
        Sentiment::Unknown => None,
        known => Some(Command::FilterSentiment(known)),
    }
}

fn parse_chart_style(arg: Option<&str>, payload: &str) -> Option<Command> {
    let kind = ChartKind::from_container_id(arg?)?;
    let style = ChartStyle::parse(payload)?;
    Some(Command::ChartStyle(kind, style))
}

fn parse_top_n(_: Option<&str>, payload: &str) -> Option<Command> {
    payload
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .map(Command::TopN)
}

/// Resolves `action` (e.g. `"chart-style:events-chart"`) and its payload into a command.
pub fn parse(action: &str, payload: &str) -> Result<Command, CommandError> {
    let (name, arg) = match action.split_once(':') {
        Some((name, arg)) => (name, Some(arg)),
        None => (action, None),
    };

    let parser = TABLE
        .iter()
        .find(|(id, _)| *id == name)
        .map(|(_, parser)| parser)
        .ok_or_else(|| CommandError::UnknownAction(action.to_string()))?;

    parser(arg, payload).ok_or_else(|| CommandError::InvalidPayload {
        action: action.to_string(),
        value: payload.to_string(),
    })
}

#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutput {
    Charts(Option<RenderSummary>),
    Chart(ChartKind, Option<RenderOutcome>),
    Search(Option<SearchView>),
    SettingsUpdated,
}

pub async fn dispatch<B, C, N, K>(
    dashboard: &Dashboard<B, C, N, K>,
    command: Command,
) -> CommandOutput
where
    B: ReportSource + SearchSource,
    C: ChartSurface,
    N: Notifier,
    K: CounterStore,
{
    tracing::debug!(?command, "dispatching command");
    match command {
        Command::GenerateCharts => CommandOutput::Charts(dashboard.generate().await),
        Command::RefreshReport => CommandOutput::Charts(dashboard.refresh().await),
        Command::Search(query) => CommandOutput::Search(dashboard.search(&query).await),
        Command::SearchProduct(product) => {
            CommandOutput::Search(dashboard.search_by_product(&product).await)
        }
        Command::FilterSentiment(sentiment) => {
            CommandOutput::Search(dashboard.filter_by_sentiment(sentiment).await)
        }
        Command::ChartStyle(kind, style) => {
            CommandOutput::Chart(kind, dashboard.restyle(kind, style).await)
        }
        Command::TopN(top_n) => {
            dashboard.set_top_n(top_n);
            CommandOutput::SettingsUpdated
        }
    }
}
