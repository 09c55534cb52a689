use crate::notices::{Notice, NoticeLevel};
use crate::state::{use_app_actions, use_app_state};
use dioxus::prelude::*;

fn accent_classes(level: NoticeLevel) -> (&'static str, &'static str) {
    match level {
        NoticeLevel::Success => ("border-emerald-500 bg-emerald-50", "text-emerald-700"),
        NoticeLevel::Error => ("border-red-500 bg-red-50", "text-red-700"),
        NoticeLevel::Warning => ("border-amber-500 bg-amber-50", "text-amber-700"),
        NoticeLevel::Info => ("border-slate-500 bg-slate-50", "text-slate-700"),
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct ToastProps {
    pub notice: Notice,
    pub on_close: EventHandler<u64>,
}

#[component]
pub fn Toast(props: ToastProps) -> Element {
    let (container_class, accent_text) = accent_classes(props.notice.level);
    let id = props.notice.id;

    rsx! {
        div { class: format!("notice {}", container_class), role: "alert",
            div { class: "flex items-start justify-between gap-4",
                div { class: "space-y-1",
                    h3 { class: format!("text-sm font-semibold {}", accent_text),
                        "{props.notice.level.title()}"
                    }
                    p { class: "text-xs text-slate-700", "{props.notice.message}" }
                }
                button {
                    class: "rounded bg-slate-200 px-2 py-1 text-[11px] text-slate-600 transition hover:bg-slate-300",
                    onclick: move |_| props.on_close.call(id),
                    "Cerrar"
                }
            }
        }
    }
}

#[component]
pub fn NoticeStack() -> Element {
    let actions = use_app_actions();
    let center = use_app_state().read().notices.clone();

    if center.is_empty() {
        return rsx! { Fragment {} };
    }
    let notices = center.notices().to_vec();

    rsx! {
        div { class: "notice-stack",
            for notice in notices {
                Toast {
                    key: "{notice.id}",
                    notice: notice.clone(),
                    on_close: move |id| actions.dismiss_notice(id),
                }
            }
        }
    }
}
