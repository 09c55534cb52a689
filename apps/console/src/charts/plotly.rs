//! Browser chart surface backed by Plotly.js (loaded through the `Dioxus.toml` web resources).

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::{ChartSurface, Figure, Placeholder, RenderError};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Plotly, js_name = newPlot, catch)]
    fn new_plot(
        container_id: &str,
        data: &JsValue,
        layout: &JsValue,
        config: &JsValue,
    ) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = Plotly, js_name = purge, catch)]
    fn purge(container_id: &str) -> Result<(), JsValue>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PlotlySurface;

impl PlotlySurface {
    fn element(container_id: &str) -> Option<web_sys::Element> {
        web_sys::window()?
            .document()?
            .get_element_by_id(container_id)
    }
}

impl ChartSurface for PlotlySurface {
    fn has_container(&self, container_id: &str) -> bool {
        Self::element(container_id).is_some()
    }

    fn show_placeholder(&self, container_id: &str, placeholder: &Placeholder) {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            return;
        };
        let Some(container) = document.get_element_by_id(container_id) else {
            return;
        };
        // plot may not exist yet
        let _ = purge(container_id);
        container.set_text_content(None);

        let variant = match placeholder {
            Placeholder::Clearing => "clearing",
            Placeholder::Empty => "empty",
            Placeholder::Failed(_) => "failed",
        };
        let notice = match document.create_element("div") {
            Ok(notice) => notice,
            Err(err) => {
                tracing::warn!(?err, container_id, "failed to create chart placeholder");
                return;
            }
        };
        notice.set_class_name(&format!("chart-placeholder chart-placeholder--{variant}"));
        notice.set_text_content(Some(&placeholder.message()));
        if let Err(err) = container.append_child(&notice) {
            tracing::warn!(?err, container_id, "failed to attach chart placeholder");
        }
    }

    async fn draw(&self, container_id: &str, figure: &Figure) -> Result<(), RenderError> {
        let data = to_js(&figure.data)?;
        let layout = to_js(&figure.layout)?;
        let config = to_js(&figure.config)?;

        if let Some(element) = Self::element(container_id) {
            element.set_text_content(None);
        }

        let promise = new_plot(container_id, &data, &layout, &config).map_err(js_reason)?;
        JsFuture::from(promise).await.map_err(js_reason)?;
        Ok(())
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, RenderError> {
    let json = serde_json::to_string(value).map_err(|err| RenderError::Draw(err.to_string()))?;
    js_sys::JSON::parse(&json).map_err(js_reason)
}

fn js_reason(value: JsValue) -> RenderError {
    let reason = value
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "error desconocido de Plotly".to_string());
    RenderError::Draw(reason)
}
