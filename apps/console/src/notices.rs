//! Transient user-facing notices.
//!
//! Notices stack independently: each has its own id, expiry timer and close
//! button, so removing one never touches the others.

use std::rc::Rc;
use std::time::Duration;

pub const NOTICE_STYLE_ID: &str = "notice-center-styles";

const NOTICE_STYLES: &str = r#"
.notice-stack { position: fixed; top: 1rem; right: 1rem; z-index: 50; display: flex; flex-direction: column; gap: .75rem; width: 20rem; pointer-events: none; }
.notice { pointer-events: auto; border-left: 4px solid; border-radius: .5rem; padding: .75rem 1rem; box-shadow: 0 4px 12px rgba(15, 23, 42, .15); animation: notice-in .2s ease-out; }
@keyframes notice-in { from { opacity: 0; transform: translateX(1rem); } to { opacity: 1; transform: none; } }
"#;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl NoticeLevel {
    pub fn title(self) -> &'static str {
        match self {
            Self::Success => "Listo",
            Self::Error => "Error",
            Self::Warning => "Atención",
            Self::Info => "Información",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Sink for user-facing messages.
pub trait Notifier {
    fn notify(&self, message: &str, level: NoticeLevel);
}

impl<T: Notifier + ?Sized> Notifier for Rc<T> {
    fn notify(&self, message: &str, level: NoticeLevel) {
        self.as_ref().notify(message, level)
    }
}

/// Where the shared notice stylesheet lives.
pub trait StyleHost {
    fn has_style(&self, id: &str) -> bool;
    fn insert_style(&self, id: &str, css: &str);
}

/// Installs the notice stylesheet unless the host already carries it.
pub fn ensure_styles(host: &impl StyleHost) -> bool {
    if host.has_style(NOTICE_STYLE_ID) {
        return false;
    }
    host.insert_style(NOTICE_STYLE_ID, NOTICE_STYLES);
    true
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotificationCenter {
    notices: Vec<Notice>,
    next_id: u64,
}

impl NotificationCenter {
    pub fn push(&mut self, message: impl Into<String>, level: NoticeLevel) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.notices.push(Notice {
            id,
            level,
            message: message.into(),
        });
        id
    }

    /// Used both by the close button and by expiry; unknown ids are ignored.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|notice| notice.id != id);
        before != self.notices.len()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

/// Runs `expire` once `after` has elapsed.
pub trait ExpiryTimer {
    fn schedule(&self, after: Duration, expire: Box<dyn FnOnce()>);
}

/// Whatever owns the live `NotificationCenter`; cloned into each expiry callback.
pub trait NoticeHost: Clone + 'static {
    fn with_center<R>(&self, apply: impl FnOnce(&mut NotificationCenter) -> R) -> R;
}

/// Stacks a notice and arms an expiry timer for that notice alone.
pub fn post_notice<H: NoticeHost>(
    host: &H,
    timer: &impl ExpiryTimer,
    ttl: Duration,
    message: &str,
    level: NoticeLevel,
) -> u64 {
    let id = host.with_center(|center| center.push(message, level));
    let owner = host.clone();
    timer.schedule(
        ttl,
        Box::new(move || {
            owner.with_center(|center| center.dismiss(id));
        }),
    );
    id
}

/// `<head>`-backed style host.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentStyles;

impl StyleHost for DocumentStyles {
    fn has_style(&self, id: &str) -> bool {
        web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(id))
            .is_some()
    }

    fn insert_style(&self, id: &str, css: &str) {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            return;
        };
        let Some(head) = document.head() else {
            return;
        };
        match document.create_element("style") {
            Ok(style) => {
                style.set_id(id);
                style.set_text_content(Some(css));
                if let Err(err) = head.append_child(&style) {
                    tracing::warn!(?err, "failed to attach notice styles");
                }
            }
            Err(err) => tracing::warn!(?err, "failed to create notice styles"),
        }
    }
}
