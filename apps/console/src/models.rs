use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label/count pairs kept in the order the backend wrote them.
///
/// Stable tie-breaking in the top-N charts depends on this order, so the JSON
/// object is read entry by entry instead of through a sorted map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CountMap(Vec<(String, u64)>);

impl CountMap {
    pub fn entries(&self) -> &[(String, u64)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, count)| count).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for CountMap {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'de> Deserialize<'de> for CountMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CountMapVisitor;

        impl<'de> Visitor<'de> for CountMapVisitor {
            type Value = CountMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of non-negative integer counts")
            }

            fn visit_unit<E>(self) -> Result<CountMap, E> {
                Ok(CountMap::default())
            }

            fn visit_map<A>(self, mut access: A) -> Result<CountMap, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, count)) = access.next_entry::<String, u64>()? {
                    entries.push((label, count));
                }
                Ok(CountMap(entries))
            }
        }

        deserializer.deserialize_any(CountMapVisitor)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    #[serde(rename = "total_reseñas", default)]
    pub total_reviews: u64,
    #[serde(rename = "productos_únicos", default)]
    pub unique_products: u64,
    #[serde(rename = "marcas_únicas", default)]
    pub unique_brands: u64,
    #[serde(rename = "eventos_totales", default)]
    pub total_events: u64,
}

/// Precomputed analytics report served by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    #[serde(rename = "distribución_sentimientos", default)]
    pub sentiment_distribution: CountMap,
    #[serde(rename = "productos_más_mencionados", default)]
    pub top_products: CountMap,
    #[serde(rename = "marcas_más_mencionadas", default)]
    pub top_brands: CountMap,
    #[serde(rename = "tipos_eventos_más_comunes", default)]
    pub event_type_counts: CountMap,
    #[serde(rename = "resumen_general", default)]
    pub summary: ReportSummary,
    #[serde(rename = "generado_en", default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Unknown,
}

impl Sentiment {
    pub const KNOWN: [Sentiment; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    /// Accepts the Spanish labels used by the UI and the English ones the extractor emits.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "positivo" | "positive" => Self::Positive,
            "negativo" | "negative" => Self::Negative,
            "neutro" | "neutral" => Self::Neutral,
            _ => Self::Unknown,
        }
    }

    /// Label understood by the per-sentiment search resource.
    pub fn query_label(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Unknown => "unknown",
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            Self::Positive => "Positivo",
            Self::Negative => "Negativo",
            Self::Neutral => "Neutro",
            Self::Unknown => "Desconocido",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_label())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default = "SearchHit::unknown_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub brands: Vec<String>,
}

impl SearchHit {
    fn unknown_id() -> String {
        "unknown".to_string()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Null => Ok(SearchHit::unknown_id()),
        other => Ok(other.to_string()),
    }
}
