//! Report snapshot lifecycle.
//!
//! The store keeps at most one snapshot. A refresh drops it before fetching so a
//! failed reload never leaves stale charts presented as current.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::charts::{ChartKind, ChartSurface, Placeholder};
use crate::models::ReportSnapshot;
use crate::notices::{NoticeLevel, Notifier};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("no se pudo contactar al servidor: {0}")]
    Transport(String),
    #[error("reporte inválido: {0}")]
    Payload(String),
}

/// Anything able to produce a fresh report.
pub trait ReportSource {
    async fn fetch_report(&self) -> Result<ReportSnapshot, ReportError>;
}

impl<T: ReportSource> ReportSource for Rc<T> {
    async fn fetch_report(&self) -> Result<ReportSnapshot, ReportError> {
        self.as_ref().fetch_report().await
    }
}

impl ReportSnapshot {
    /// Validates a raw report body before it may become the current snapshot.
    pub fn from_payload(payload: Value) -> Result<Self, ReportError> {
        let Value::Object(fields) = payload else {
            return Err(ReportError::Payload(
                "se esperaba un objeto JSON".to_string(),
            ));
        };

        if fields.is_empty() {
            return Err(ReportError::Payload("el reporte está vacío".to_string()));
        }

        if let Some(message) = fields.get("error").and_then(Value::as_str) {
            return Err(ReportError::Payload(message.to_string()));
        }

        serde_json::from_value(Value::Object(fields))
            .map_err(|err| ReportError::Payload(format!("estructura inesperada: {err}")))
    }
}

pub struct ReportStore<S> {
    source: S,
    current: RefCell<Option<Rc<ReportSnapshot>>>,
}

impl<S: ReportSource> ReportStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            current: RefCell::new(None),
        }
    }

    pub fn current(&self) -> Option<Rc<ReportSnapshot>> {
        self.current.borrow().clone()
    }

    /// One fetch, no notice. Callers decide how a failure is surfaced.
    pub(crate) async fn fetch(&self) -> Result<Rc<ReportSnapshot>, ReportError> {
        match self.source.fetch_report().await {
            Ok(snapshot) => {
                let snapshot = Rc::new(snapshot);
                info!(
                    total_reviews = snapshot.summary.total_reviews,
                    sentiments = snapshot.sentiment_distribution.total(),
                    products = snapshot.top_products.len(),
                    brands = snapshot.top_brands.len(),
                    "report snapshot loaded"
                );
                self.current.replace(Some(Rc::clone(&snapshot)));
                Ok(snapshot)
            }
            Err(err) => {
                warn!(%err, "report fetch failed");
                self.current.replace(None);
                Err(err)
            }
        }
    }

    /// Fetches the report, replacing the current snapshot on success.
    /// A failure is announced once and leaves no snapshot behind.
    pub async fn load(&self, notifier: &impl Notifier) -> Result<Rc<ReportSnapshot>, ReportError> {
        self.fetch().await.inspect_err(|err| {
            notifier.notify(&format!("Error al cargar el reporte: {err}"), NoticeLevel::Error);
        })
    }

    /// Drops the snapshot, puts every chart container in its clearing state, then loads.
    pub async fn refresh(
        &self,
        surface: &impl ChartSurface,
        notifier: &impl Notifier,
    ) -> Result<Rc<ReportSnapshot>, ReportError> {
        self.current.replace(None);
        for kind in ChartKind::ALL {
            surface.show_placeholder(kind.container_id(), &Placeholder::Clearing);
        }
        self.load(notifier).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::charts::tests::RecordingSurface;
    use crate::charts::{ChartSettings, ChartSpec};
    use crate::models::CountMap;
    use crate::notices::tests::RecordingNotifier;
    use futures::executor::block_on;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Replays queued results; an exhausted queue behaves like a transport failure.
    #[derive(Default)]
    pub(crate) struct ScriptedSource {
        pub responses: RefCell<VecDeque<Result<ReportSnapshot, ReportError>>>,
        pub calls: std::cell::Cell<usize>,
    }

    impl ScriptedSource {
        pub fn with(responses: Vec<Result<ReportSnapshot, ReportError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: Default::default(),
            }
        }
    }

    impl ReportSource for ScriptedSource {
        async fn fetch_report(&self) -> Result<ReportSnapshot, ReportError> {
            self.calls.set(self.calls.get() + 1);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ReportError::Transport("offline".into())))
        }
    }

    pub(crate) fn sample_snapshot() -> ReportSnapshot {
        ReportSnapshot {
            sentiment_distribution: CountMap::from_iter([
                ("positivo", 7),
                ("negativo", 2),
                ("neutro", 1),
            ]),
            top_products: CountMap::from_iter([("Zapato", 3), ("Camisa", 9), ("Reloj", 9)]),
            top_brands: CountMap::from_iter([("Acme", 4)]),
            event_type_counts: CountMap::from_iter([("purchase", 5), ("return", 1)]),
            ..Default::default()
        }
    }

    #[test]
    fn payload_error_field_is_rejected() {
        let err = ReportSnapshot::from_payload(json!({"error": "No hay reseñas procesadas"}))
            .unwrap_err();
        assert_eq!(err, ReportError::Payload("No hay reseñas procesadas".into()));
    }

    #[test]
    fn empty_or_non_object_payloads_are_rejected() {
        assert!(ReportSnapshot::from_payload(json!({})).is_err());
        assert!(ReportSnapshot::from_payload(json!([1, 2])).is_err());
        assert!(ReportSnapshot::from_payload(Value::Null).is_err());
    }

    #[test]
    fn payload_keeps_count_order_for_tie_breaks() {
        let payload: Value = serde_json::from_str(
            r#"{"productos_más_mencionados": {"Reloj": 9, "Camisa": 9, "Zapato": 3}}"#,
        )
        .unwrap();
        let snapshot = ReportSnapshot::from_payload(payload).unwrap();

        let labels: Vec<&str> = snapshot
            .top_products
            .entries()
            .iter()
            .map(|(label, _)| label.as_str())
            .collect();
        assert_eq!(labels, ["Reloj", "Camisa", "Zapato"]);

        let spec = ChartSpec::derive(
            ChartKind::Products,
            &snapshot,
            &ChartSettings::with_top_n(1),
        );
        assert_eq!(spec.labels(), ["Reloj"]);
    }

    #[test]
    fn load_stores_snapshot() {
        let store = ReportStore::new(ScriptedSource::with(vec![Ok(sample_snapshot())]));
        let notifier = RecordingNotifier::default();

        let snapshot = block_on(store.load(&notifier)).unwrap();

        assert_eq!(store.current().as_deref(), Some(&*snapshot));
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn failed_refresh_leaves_no_snapshot_and_one_notice() {
        let store = ReportStore::new(ScriptedSource::with(vec![
            Ok(sample_snapshot()),
            Err(ReportError::Transport("HTTP 500".into())),
        ]));
        let surface = RecordingSurface::default();
        let notifier = RecordingNotifier::default();

        block_on(store.load(&notifier)).unwrap();
        let result = block_on(store.refresh(&surface, &notifier));

        assert!(result.is_err());
        assert!(store.current().is_none());
        let notices = notifier.messages();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].1, NoticeLevel::Error);
        assert!(notices[0].0.contains("HTTP 500"));
        assert_eq!(surface.placeholders().len(), ChartKind::ALL.len());
        assert!(surface
            .placeholders()
            .iter()
            .all(|(_, placeholder)| *placeholder == Placeholder::Clearing));
        assert!(surface.drawn().is_empty());
    }

    #[test]
    fn successful_refresh_replaces_snapshot() {
        let mut newer = sample_snapshot();
        newer.summary.total_reviews = 99;
        let store = ReportStore::new(ScriptedSource::with(vec![
            Ok(sample_snapshot()),
            Ok(newer.clone()),
        ]));
        let notifier = RecordingNotifier::default();

        block_on(store.load(&notifier)).unwrap();
        block_on(store.refresh(&RecordingSurface::default(), &notifier)).unwrap();

        assert_eq!(store.current().as_deref(), Some(&newer));
    }
}
