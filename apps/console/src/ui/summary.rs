use crate::state::use_app_state;
use dioxus::prelude::*;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Renders backend timestamps as `dd/mm/yyyy hh:mm`; anything unparseable is shown as sent.
pub(crate) fn format_generated_at(raw: &str) -> String {
    let display = format_description!("[day]/[month]/[year] [hour]:[minute]");
    let iso_local = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let trimmed = raw.trim();

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        if let Ok(text) = parsed.format(&display) {
            return text;
        }
    }
    let without_fraction = trimmed.split('.').next().unwrap_or(trimmed);
    if let Ok(parsed) = PrimitiveDateTime::parse(without_fraction, &iso_local) {
        if let Ok(text) = parsed.format(&display) {
            return text;
        }
    }
    raw.to_string()
}

#[component]
pub fn ReportSummaryCard() -> Element {
    let report = use_app_state().read().report.clone();

    let Some(summary) = report.summary else {
        return rsx! {
            section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
                h2 { class: "text-base font-semibold text-slate-900", "Resumen general" }
                p { class: "text-xs text-slate-500", "Genera los gráficos para cargar el reporte." }
            }
        };
    };

    let generated = report.generated_at.as_deref().map(format_generated_at);
    let stats = [
        ("Reseñas", summary.total_reviews),
        ("Productos únicos", summary.unique_products),
        ("Marcas únicas", summary.unique_brands),
        ("Eventos", summary.total_events),
    ];

    rsx! {
        section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
            div { class: "flex items-baseline justify-between",
                h2 { class: "text-base font-semibold text-slate-900", "Resumen general" }
                if let Some(generated) = generated {
                    span { class: "text-[11px] text-slate-500", "Generado: {generated}" }
                }
            }
            dl { class: "mt-3 grid grid-cols-2 gap-3 md:grid-cols-4",
                for (label, value) in stats {
                    div { key: "{label}", class: "rounded bg-slate-50 p-3",
                        dt { class: "text-[11px] uppercase text-slate-500", "{label}" }
                        dd { class: "text-lg font-semibold text-slate-900", "{value}" }
                    }
                }
            }
        }
    }
}
