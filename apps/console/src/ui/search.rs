use crate::commands;
use crate::hooks::dashboard::use_command_runner;
use crate::models::Sentiment;
use crate::search::{ResultBlock, SearchView};
use crate::state::use_app_state;
use dioxus::prelude::*;

#[component]
pub fn SearchPanel() -> Element {
    let runner = use_command_runner();
    let search = use_app_state().read().search.clone();

    let mut query = use_signal(String::new);
    let mut product = use_signal(String::new);

    let on_search = {
        let runner = runner.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            runner.run(commands::SEARCH, &query.read());
        }
    };
    let on_product = {
        let runner = runner.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            runner.run(commands::SEARCH_PRODUCT, &product.read());
        }
    };

    rsx! {
        section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm space-y-4",
            h2 { class: "text-base font-semibold text-slate-900", "Búsqueda semántica" }
            form { class: "flex gap-2", onsubmit: on_search,
                input {
                    class: "flex-1 rounded border border-slate-300 px-3 py-1 text-sm",
                    placeholder: "¿Qué opinan de la batería?",
                    value: "{query}",
                    oninput: move |evt| query.set(evt.value()),
                }
                button {
                    class: "rounded bg-indigo-600 px-3 py-1 text-xs font-medium text-white transition hover:bg-indigo-500 disabled:opacity-50",
                    r#type: "submit",
                    disabled: search.is_loading,
                    "Buscar"
                }
            }
            div { class: "flex flex-wrap items-center gap-2",
                span { class: "text-xs text-slate-500", "Filtrar por sentimiento:" }
                for sentiment in Sentiment::KNOWN {
                    SentimentFilterButton {
                        key: "{sentiment}",
                        sentiment,
                        active: search.active_filter == Some(sentiment),
                        disabled: search.is_loading,
                    }
                }
            }
            form { class: "flex gap-2", onsubmit: on_product,
                input {
                    class: "flex-1 rounded border border-slate-300 px-3 py-1 text-sm",
                    placeholder: "Producto",
                    value: "{product}",
                    oninput: move |evt| product.set(evt.value()),
                }
                button {
                    class: "rounded bg-slate-200 px-3 py-1 text-xs text-slate-700 transition hover:bg-slate-300 disabled:opacity-50",
                    r#type: "submit",
                    disabled: search.is_loading,
                    "Buscar producto"
                }
            }
            if search.is_loading {
                p { class: "text-xs text-slate-500", "Buscando..." }
            }
            if let Some(view) = search.view.clone() {
                SearchResults { view }
            }
        }
    }
}

#[component]
fn SentimentFilterButton(sentiment: Sentiment, active: bool, disabled: bool) -> Element {
    let runner = use_command_runner();
    let action = format!("{}:{}", commands::FILTER_SENTIMENT, sentiment.query_label());
    let class = if active {
        "rounded-full bg-indigo-600 px-3 py-1 text-[11px] text-white"
    } else {
        "rounded-full bg-slate-100 px-3 py-1 text-[11px] text-slate-700 hover:bg-slate-200"
    };

    rsx! {
        button {
            class,
            disabled,
            onclick: move |_| runner.run(&action, ""),
            "{sentiment.display_label()}"
        }
    }
}

#[component]
fn SearchResults(view: SearchView) -> Element {
    rsx! {
        div { class: "space-y-3",
            p { class: "text-xs font-medium text-slate-600", "{view.headline()}" }
            for block in view.blocks().iter().cloned() {
                ResultCard { key: "{block.id}", block }
            }
        }
    }
}

#[component]
fn ResultCard(block: ResultBlock) -> Element {
    rsx! {
        article { class: "rounded border border-slate-200 p-3 space-y-2",
            div { class: "flex items-center justify-between text-[11px] text-slate-500",
                span { class: "font-mono", "#{block.id}" }
                span { class: format!("sentiment-badge {}", block.badge.class),
                    "{block.badge.icon} {block.badge.label}"
                }
                span { "Relevancia: {block.score}" }
            }
            p { class: "text-sm text-slate-800", "{block.text}" }
            if let Some(products) = block.products {
                TagList { label: "Productos", tags: products }
            }
            if let Some(brands) = block.brands {
                TagList { label: "Marcas", tags: brands }
            }
        }
    }
}

#[component]
fn TagList(label: &'static str, tags: Vec<String>) -> Element {
    rsx! {
        div { class: "flex flex-wrap items-center gap-1 text-[11px]",
            span { class: "text-slate-500", "{label}:" }
            for tag in tags {
                span { class: "rounded bg-slate-100 px-2 py-0.5 text-slate-700", "{tag}" }
            }
        }
    }
}
