use crate::charts::{ChartKind, ChartStyle, RenderOutcome};
use crate::commands;
use crate::hooks::dashboard::use_command_runner;
use crate::state::use_app_state;
use dioxus::prelude::*;

const TOP_N_CHOICES: [usize; 4] = [5, 10, 15, 20];

#[component]
pub fn ChartsPanel() -> Element {
    let runner = use_command_runner();
    let board = use_app_state().read().charts.clone();
    let view_count = use_app_state().read().view_count;

    let status = board.last_summary.as_ref().map(|summary| {
        if summary.failed() == 0 {
            format!("{} gráficos generados", summary.succeeded())
        } else {
            format!(
                "{} exitosos, {} con errores",
                summary.succeeded(),
                summary.failed()
            )
        }
    });

    let on_generate = {
        let runner = runner.clone();
        move |_| runner.run(commands::GENERATE_CHARTS, "")
    };
    let on_refresh = {
        let runner = runner.clone();
        move |_| runner.run(commands::REFRESH_REPORT, "")
    };
    let on_top_n = {
        let runner = runner.clone();
        move |evt: FormEvent| runner.run(commands::TOP_N, &evt.value())
    };

    rsx! {
        section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm space-y-4",
            div { class: "flex flex-wrap items-center justify-between gap-3",
                div {
                    h2 { class: "text-base font-semibold text-slate-900", "Análisis de opiniones" }
                    p { class: "text-xs text-slate-500",
                        "Gráficos generados: {board.charts_generated} · Visitas: {view_count}"
                    }
                    if let Some(status) = status {
                        p { class: "text-[11px] text-slate-500", "{status}" }
                    }
                }
                div { class: "flex items-center gap-2",
                    label { class: "text-xs text-slate-600", r#for: "top-n-select", "Top" }
                    select {
                        id: "top-n-select",
                        class: "rounded border border-slate-300 px-2 py-1 text-xs",
                        disabled: board.is_busy,
                        onchange: on_top_n,
                        for choice in TOP_N_CHOICES {
                            option {
                                key: "{choice}",
                                value: "{choice}",
                                selected: choice == board.settings.top_n,
                                "{choice}"
                            }
                        }
                    }
                    button {
                        class: "rounded bg-indigo-600 px-3 py-1 text-xs font-medium text-white transition hover:bg-indigo-500 disabled:opacity-50",
                        disabled: board.is_busy,
                        onclick: on_generate,
                        if board.is_busy { "Generando..." } else { "Generar gráficos" }
                    }
                    button {
                        class: "rounded bg-slate-200 px-3 py-1 text-xs text-slate-700 transition hover:bg-slate-300 disabled:opacity-50",
                        disabled: board.is_busy,
                        onclick: on_refresh,
                        "Actualizar reporte"
                    }
                }
            }
            div { class: "grid gap-4 md:grid-cols-2",
                for kind in ChartKind::ALL {
                    ChartCard {
                        key: "{kind}",
                        kind,
                        style: board.settings.style_for(kind),
                        outcome: board.outcome(kind).cloned(),
                        busy: board.is_busy,
                    }
                }
            }
        }
    }
}

#[component]
fn ChartCard(
    kind: ChartKind,
    style: ChartStyle,
    outcome: Option<RenderOutcome>,
    busy: bool,
) -> Element {
    let runner = use_command_runner();
    let action = format!("{}:{}", commands::CHART_STYLE, kind.container_id());

    let badge = match outcome {
        Some(RenderOutcome::Failed(_)) => Some(("Error", "bg-red-100 text-red-700")),
        Some(RenderOutcome::EmptyData) => Some(("Sin datos", "bg-amber-100 text-amber-700")),
        Some(RenderOutcome::Rendered) | None => None,
    };

    rsx! {
        article { class: "rounded border border-slate-200 p-3",
            header { class: "mb-2 flex items-center justify-between gap-2",
                h3 { class: "text-sm font-semibold text-slate-800", "{kind.title()}" }
                div { class: "flex items-center gap-2",
                    if let Some((text, classes)) = badge {
                        span { class: format!("rounded px-2 py-0.5 text-[11px] {}", classes), "{text}" }
                    }
                    select {
                        class: "rounded border border-slate-300 px-2 py-1 text-[11px]",
                        disabled: busy,
                        onchange: move |evt: FormEvent| runner.run(&action, &evt.value()),
                        for option_style in ChartStyle::ALL {
                            option {
                                key: "{option_style.as_str()}",
                                value: option_style.as_str(),
                                selected: option_style == style,
                                "{option_style.label()}"
                            }
                        }
                    }
                }
            }
            div { id: kind.container_id(), class: "chart-container min-h-[400px]" }
        }
    }
}
