//! Per-chart dataset derivation and the figure shape handed to Plotly.

use serde::Serialize;

use super::{ChartKind, ChartSettings, ChartStyle};
use crate::models::{CountMap, ReportSnapshot, Sentiment};

pub const DONUT_HOLE: f64 = 0.4;

const PRODUCT_COLOR: &str = "#87CEEB";
const BRAND_COLOR: &str = "#F4A261";
const UNKNOWN_SENTIMENT_COLOR: &str = "#9CA3AF";
const EVENT_PALETTE: [&str; 6] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40",
];

pub fn sentiment_color(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "#2E8B57",
        Sentiment::Negative => "#DC143C",
        Sentiment::Neutral => "#4682B4",
        Sentiment::Unknown => UNKNOWN_SENTIMENT_COLOR,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataPoint {
    pub label: String,
    pub value: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub style: ChartStyle,
    pub points: Vec<DataPoint>,
    pub colors: Vec<String>,
}

impl ChartSpec {
    pub fn derive(kind: ChartKind, snapshot: &ReportSnapshot, settings: &ChartSettings) -> Self {
        let style = settings.style_for(kind);
        match kind {
            ChartKind::Sentiment => {
                let ranked = ranked(&snapshot.sentiment_distribution, None);
                let colors = ranked
                    .iter()
                    .map(|(label, _)| sentiment_color(Sentiment::from_label(label)).to_string())
                    .collect();
                Self {
                    kind,
                    style,
                    points: titled(ranked),
                    colors,
                }
            }
            ChartKind::Products | ChartKind::Brands => {
                let source = if kind == ChartKind::Products {
                    &snapshot.top_products
                } else {
                    &snapshot.top_brands
                };
                let color = if kind == ChartKind::Products {
                    PRODUCT_COLOR
                } else {
                    BRAND_COLOR
                };
                let points: Vec<DataPoint> = ranked(source, Some(settings.top_n))
                    .into_iter()
                    .map(|(label, value)| DataPoint {
                        label: label.to_string(),
                        value,
                    })
                    .collect();
                let colors = vec![color.to_string(); points.len()];
                Self {
                    kind,
                    style,
                    points,
                    colors,
                }
            }
            ChartKind::Events => {
                let points = titled(ranked(&snapshot.event_type_counts, Some(settings.top_n)));
                let colors = EVENT_PALETTE
                    .iter()
                    .cycle()
                    .take(points.len())
                    .map(|color| color.to_string())
                    .collect();
                Self {
                    kind,
                    style,
                    points,
                    colors,
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|point| point.label.clone()).collect()
    }

    pub fn values(&self) -> Vec<u64> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn figure(&self) -> Figure {
        let trace = match self.style {
            ChartStyle::Donut | ChartStyle::Pie => Trace::Pie {
                labels: self.labels(),
                values: self.values(),
                hole: if self.style == ChartStyle::Donut {
                    DONUT_HOLE
                } else {
                    0.0
                },
                marker: PieMarker {
                    colors: self.colors.clone(),
                },
                textinfo: "percent",
                textposition: if self.kind == ChartKind::Events {
                    "outside"
                } else {
                    "inside"
                },
                sort: false,
            },
            ChartStyle::Bar => Trace::Bar {
                x: self.values(),
                y: self.labels(),
                orientation: "h",
                marker: BarMarker {
                    color: self.colors.clone(),
                },
            },
        };

        let is_bar = self.style == ChartStyle::Bar;
        Figure {
            data: vec![trace],
            layout: Layout {
                title: Title {
                    text: self.kind.title().to_string(),
                },
                showlegend: !is_bar,
                height: 400,
                margin: Margin {
                    l: if is_bar { 140 } else { 40 },
                    r: 40,
                    t: 60,
                    b: 40,
                },
                // largest bar on top
                yaxis: is_bar.then_some(Axis {
                    autorange: Some("reversed"),
                    automargin: true,
                    title: None,
                }),
                xaxis: is_bar.then(|| Axis {
                    autorange: None,
                    automargin: true,
                    title: Some(Title {
                        text: "Menciones".to_string(),
                    }),
                }),
            },
            config: RenderOptions {
                responsive: true,
                display_mode_bar: false,
            },
        }
    }
}

/// Entries ordered by descending count, ties kept in source order, optionally cut to `limit`.
pub fn ranked(source: &CountMap, limit: Option<usize>) -> Vec<(&str, u64)> {
    let mut entries: Vec<(&str, u64)> = source
        .entries()
        .iter()
        .map(|(label, count)| (label.as_str(), *count))
        .collect();
    // sort_by is stable
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

fn titled(entries: Vec<(&str, u64)>) -> Vec<DataPoint> {
    entries
        .into_iter()
        .map(|(label, value)| DataPoint {
            label: title_case(label),
            value,
        })
        .collect()
}

/// `"stopped_working"` -> `"Stopped Working"`, `"positivo"` -> `"Positivo"`.
pub fn title_case(label: &str) -> String {
    label
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone, Debug, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
    pub config: RenderOptions,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Pie {
        labels: Vec<String>,
        values: Vec<u64>,
        hole: f64,
        marker: PieMarker,
        textinfo: &'static str,
        textposition: &'static str,
        sort: bool,
    },
    Bar {
        x: Vec<u64>,
        y: Vec<String>,
        orientation: &'static str,
        marker: BarMarker,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct PieMarker {
    pub colors: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BarMarker {
    pub color: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Layout {
    pub title: Title,
    pub showlegend: bool,
    pub height: u32,
    pub margin: Margin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorange: Option<&'static str>,
    pub automargin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub responsive: bool,
    pub display_mode_bar: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> ReportSnapshot {
        ReportSnapshot {
            sentiment_distribution: CountMap::from_iter([
                ("positivo", 7),
                ("negativo", 2),
                ("neutro", 1),
            ]),
            top_products: CountMap::from_iter([("Zapato", 3), ("Camisa", 9), ("Reloj", 9)]),
            top_brands: CountMap::from_iter([("Acme", 1), ("Globex", 4)]),
            event_type_counts: CountMap::from_iter([
                ("purchase", 1),
                ("return", 2),
                ("complaint", 3),
                ("recommendation", 4),
                ("failure", 5),
                ("function", 6),
                ("delivery", 7),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn sentiment_chart_is_a_titled_donut() {
        let spec = ChartSpec::derive(ChartKind::Sentiment, &snapshot(), &ChartSettings::default());
        assert_eq!(spec.style, ChartStyle::Donut);
        assert_eq!(spec.labels(), ["Positivo", "Negativo", "Neutro"]);
        assert_eq!(spec.values(), [7, 2, 1]);
        assert_eq!(spec.colors, ["#2E8B57", "#DC143C", "#4682B4"]);
    }

    #[test]
    fn sentiment_colors_follow_role_not_rank() {
        let snapshot = ReportSnapshot {
            sentiment_distribution: CountMap::from_iter([("neutral", 9), ("negative", 4)]),
            ..Default::default()
        };
        let spec = ChartSpec::derive(ChartKind::Sentiment, &snapshot, &ChartSettings::default());
        assert_eq!(spec.labels(), ["Neutral", "Negative"]);
        assert_eq!(spec.colors, ["#4682B4", "#DC143C"]);
    }

    #[test]
    fn sentiment_keeps_every_category() {
        let snapshot = ReportSnapshot {
            sentiment_distribution: CountMap::from_iter(
                (0..15).map(|i| (format!("label{i}"), i as u64)),
            ),
            ..Default::default()
        };
        let settings = ChartSettings {
            top_n: 3,
            ..Default::default()
        };
        let spec = ChartSpec::derive(ChartKind::Sentiment, &snapshot, &settings);
        assert_eq!(spec.points.len(), 15);
    }

    #[test]
    fn top_n_keeps_tie_order_and_drops_the_rest() {
        let settings = ChartSettings {
            top_n: 2,
            ..Default::default()
        };
        let spec = ChartSpec::derive(ChartKind::Products, &snapshot(), &settings);
        assert_eq!(
            spec.points,
            [
                DataPoint {
                    label: "Camisa".into(),
                    value: 9
                },
                DataPoint {
                    label: "Reloj".into(),
                    value: 9
                },
            ]
        );
    }

    #[test]
    fn ranked_output_is_sorted_bounded_and_stable() {
        let source = CountMap::from_iter([
            ("a", 1),
            ("b", 5),
            ("c", 1),
            ("d", 5),
            ("e", 0),
            ("f", 3),
        ]);
        for limit in 0..8 {
            let out = ranked(&source, Some(limit));
            assert!(out.len() <= limit);
            assert!(out.windows(2).all(|w| w[0].1 >= w[1].1));
            // equal counts stay in source order
            let positions: Vec<usize> = out
                .iter()
                .map(|(label, _)| {
                    source
                        .entries()
                        .iter()
                        .position(|(l, _)| l == label)
                        .unwrap()
                })
                .collect();
            for w in out.windows(2).zip(positions.windows(2)) {
                if w.0[0].1 == w.0[1].1 {
                    assert!(w.1[0] < w.1[1]);
                }
            }
        }
    }

    #[test]
    fn brand_labels_are_not_retitled() {
        let snapshot = ReportSnapshot {
            top_brands: CountMap::from_iter([("iPhone", 2)]),
            ..Default::default()
        };
        let spec = ChartSpec::derive(ChartKind::Brands, &snapshot, &ChartSettings::default());
        assert_eq!(spec.labels(), ["iPhone"]);
        assert_eq!(spec.style, ChartStyle::Bar);
        assert_eq!(spec.colors, [BRAND_COLOR]);
    }

    #[test]
    fn event_palette_cycles_past_six() {
        let spec = ChartSpec::derive(ChartKind::Events, &snapshot(), &ChartSettings::default());
        assert_eq!(spec.points.len(), 7);
        assert_eq!(spec.colors[0], EVENT_PALETTE[0]);
        assert_eq!(spec.colors[6], EVENT_PALETTE[0]);
        assert_eq!(spec.labels()[0], "Delivery");
    }

    #[test]
    fn title_case_handles_separators_and_accents() {
        assert_eq!(title_case("positivo"), "Positivo");
        assert_eq!(title_case("stopped_working"), "Stopped Working");
        assert_eq!(title_case("éxito total"), "Éxito Total");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn pie_figure_serializes_for_plotly() {
        let spec = ChartSpec::derive(ChartKind::Events, &snapshot(), &ChartSettings::default());
        let value = serde_json::to_value(spec.figure()).unwrap();
        assert_eq!(value["data"][0]["type"], json!("pie"));
        assert_eq!(value["data"][0]["textposition"], json!("outside"));
        assert_eq!(value["data"][0]["sort"], json!(false));
        assert_eq!(value["config"]["displayModeBar"], json!(false));
        assert!(value["layout"].get("yaxis").is_none());
    }

    #[test]
    fn bar_figure_is_horizontal_and_reversed() {
        let spec = ChartSpec::derive(ChartKind::Products, &snapshot(), &ChartSettings::default());
        let value = serde_json::to_value(spec.figure()).unwrap();
        assert_eq!(value["data"][0]["type"], json!("bar"));
        assert_eq!(value["data"][0]["orientation"], json!("h"));
        assert_eq!(value["data"][0]["y"], json!(["Camisa", "Reloj", "Zapato"]));
        assert_eq!(value["layout"]["yaxis"]["autorange"], json!("reversed"));
    }

    #[test]
    fn donut_override_to_pie_drops_the_hole() {
        let mut settings = ChartSettings::default();
        settings.set_style(ChartKind::Sentiment, ChartStyle::Pie);
        let spec = ChartSpec::derive(ChartKind::Sentiment, &snapshot(), &settings);
        let value = serde_json::to_value(spec.figure()).unwrap();
        assert_eq!(value["data"][0]["hole"], json!(0.0));
    }
}
