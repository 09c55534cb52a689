use std::rc::Rc;

use thiserror::Error;

use crate::models::{SearchHit, Sentiment};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("error de conexión: {0}")]
    Transport(String),
    #[error("{0}")]
    Rejected(String),
}

/// Backend search resources.
pub trait SearchSource {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, SearchError>;

    async fn search_by_sentiment(
        &self,
        sentiment: Sentiment,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, SearchError>;

    async fn search_by_product(
        &self,
        product: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, SearchError>;
}

impl<T: SearchSource> SearchSource for Rc<T> {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, SearchError> {
        self.as_ref().search(query, top_k).await
    }

    async fn search_by_sentiment(
        &self,
        sentiment: Sentiment,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        self.as_ref().search_by_sentiment(sentiment, top_k).await
    }

    async fn search_by_product(
        &self,
        product: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        self.as_ref().search_by_product(product, top_k).await
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SentimentBadge {
    pub icon: &'static str,
    pub class: &'static str,
    pub label: &'static str,
}

pub fn sentiment_badge(label: Option<&str>) -> SentimentBadge {
    let sentiment = label.map(Sentiment::from_label).unwrap_or(Sentiment::Unknown);
    match sentiment {
        Sentiment::Positive => SentimentBadge {
            icon: "😊",
            class: "sentiment-positive",
            label: sentiment.display_label(),
        },
        Sentiment::Negative => SentimentBadge {
            icon: "😞",
            class: "sentiment-negative",
            label: sentiment.display_label(),
        },
        Sentiment::Neutral => SentimentBadge {
            icon: "😐",
            class: "sentiment-neutral",
            label: sentiment.display_label(),
        },
        Sentiment::Unknown => SentimentBadge {
            icon: "❓",
            class: "sentiment-unknown",
            label: sentiment.display_label(),
        },
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultBlock {
    pub id: String,
    /// Shown exactly as the backend sent it.
    pub score: String,
    pub badge: SentimentBadge,
    pub text: String,
    pub products: Option<Vec<String>>,
    pub brands: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchView {
    NoResults { query_label: String },
    Results {
        query_label: String,
        blocks: Vec<ResultBlock>,
    },
}

impl SearchView {
    pub fn blocks(&self) -> &[ResultBlock] {
        match self {
            Self::NoResults { .. } => &[],
            Self::Results { blocks, .. } => blocks,
        }
    }

    pub fn query_label(&self) -> &str {
        match self {
            Self::NoResults { query_label } | Self::Results { query_label, .. } => query_label,
        }
    }

    pub fn headline(&self) -> String {
        match self.blocks().len() {
            0 => format!("No se encontraron resultados para \"{}\"", self.query_label()),
            n => format!("{n} resultados para \"{}\"", self.query_label()),
        }
    }
}

/// Turns ranked hits into display blocks, keeping the collaborator's order.
pub fn render(hits: &[SearchHit], query_label: &str) -> SearchView {
    if hits.is_empty() {
        return SearchView::NoResults {
            query_label: query_label.to_string(),
        };
    }

    let blocks = hits
        .iter()
        .map(|hit| ResultBlock {
            id: hit.id.clone(),
            score: hit.score.to_string(),
            badge: sentiment_badge(hit.sentiment.as_deref()),
            text: hit.text.clone(),
            products: non_empty(&hit.products),
            brands: non_empty(&hit.brands),
        })
        .collect();

    SearchView::Results {
        query_label: query_label.to_string(),
        blocks,
    }
}

fn non_empty(tags: &[String]) -> Option<Vec<String>> {
    (!tags.is_empty()).then(|| tags.to_vec())
}
