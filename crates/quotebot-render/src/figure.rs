//! Chart figure descriptions
//!
//! A [`Figure`] is the JSON chart description the rendering backend consumes.
//! It carries a `data` array of traces and a `layout` object, mirroring the
//! document shape the renderer expects on its stdin.

use crate::backend::{Backend, RenderRequest, RenderResult};
use crate::error::{RenderError, Result};
use crate::layout::LayoutUpdate;
use crate::plots::PlotsResponse;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Output format requested from the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

/// Candle colors for up and down bars
const INCREASING_COLOR: &str = "#00ACFF";
const DECREASING_COLOR: &str = "#e4003a";

/// A chart or table description destined for the rendering backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    data: Vec<Value>,
    layout: Value,
}

impl Default for Figure {
    fn default() -> Self {
        Self::new()
    }
}

impl Figure {
    /// Create an empty figure with no traces and an empty layout
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            layout: json!({}),
        }
    }

    /// Create a candlestick figure from parallel OHLC columns
    pub fn candlestick(
        dates: Vec<String>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    ) -> Self {
        let trace = json!({
            "type": "candlestick",
            "x": dates,
            "open": open,
            "high": high,
            "low": low,
            "close": close,
            "increasing": {"line": {"color": INCREASING_COLOR}},
            "decreasing": {"line": {"color": DECREASING_COLOR}},
        });
        let mut figure = Self::new();
        figure.data.push(trace);
        figure
    }

    /// Create a table figure from a header row and column-major cells
    pub fn table(header: Vec<String>, cells: Vec<Vec<String>>) -> Self {
        let trace = json!({
            "type": "table",
            "header": {"values": header},
            "cells": {"values": cells},
        });
        let mut figure = Self::new();
        figure.data.push(trace);
        figure
    }

    /// Append a raw trace to the data array
    pub fn add_trace(mut self, trace: Value) -> Self {
        self.data.push(trace);
        self
    }

    /// Merge an arbitrary JSON patch into every trace
    pub fn update(mut self, patch: &Value) -> Self {
        for trace in &mut self.data {
            merge_value(trace, patch);
        }
        self
    }

    /// Merge a typed layout update into the layout object
    pub fn update_layout(mut self, update: &LayoutUpdate) -> Self {
        if let Ok(patch) = serde_json::to_value(update) {
            merge_value(&mut self.layout, &patch);
        }
        self
    }

    /// Pin the y axis to the price window with asymmetric headroom.
    ///
    /// The lower bound sits 20% of the span below the lowest low so candles
    /// clear the volume area; the upper bound leaves 8% above the highest
    /// high. Autoranging is disabled so the backend honors the window.
    pub fn with_price_headroom(mut self, lows: &[f64], highs: &[f64]) -> Self {
        let min_low = lows.iter().copied().fold(f64::INFINITY, f64::min);
        let max_high = highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !min_low.is_finite() || !max_high.is_finite() {
            return self;
        }
        let span = max_high - min_low;
        let patch = json!({
            "yaxis": {
                "autorange": false,
                "range": [min_low - span * 0.2, max_high + span * 0.08],
            }
        });
        merge_value(&mut self.layout, &patch);
        self
    }

    /// Number of traces in the figure
    pub fn trace_count(&self) -> usize {
        self.data.len()
    }

    /// The layout object as JSON
    pub fn layout(&self) -> &Value {
        &self.layout
    }

    /// Whole figure as a JSON document for the backend
    pub fn to_value(&self) -> Value {
        json!({"data": self.data, "layout": self.layout})
    }

    /// Render to PNG via the backend and wrap the result for Discord delivery
    pub async fn prepare_image(&self, backend: &Backend) -> Result<PlotsResponse> {
        let result = backend
            .submit(RenderRequest::image(
                self.to_value(),
                ImageFormat::Png,
                1.0,
            ))
            .await?;
        match result {
            RenderResult::Raster(image64) => PlotsResponse::from_base64(image64),
            RenderResult::Svg(_) => Err(RenderError::Failure(
                "expected raster output from renderer".to_string(),
            )),
        }
    }

    /// Render a table figure to PNG via the backend
    pub async fn prepare_table(&self, backend: &Backend) -> Result<PlotsResponse> {
        self.prepare_image(backend).await
    }

    /// Render to the given format and write the bytes to `path`
    pub async fn write_image(
        &self,
        backend: &Backend,
        format: ImageFormat,
        path: &std::path::Path,
    ) -> Result<()> {
        let result = backend
            .submit(RenderRequest::image(self.to_value(), format, 1.0))
            .await?;
        let bytes = match result {
            RenderResult::Raster(payload) => BASE64.decode(payload.as_bytes())?,
            // SVG comes back as document text, not base64
            RenderResult::Svg(text) => text.into_bytes(),
        };
        tokio::fs::write(path, bytes)
            .await
            .map_err(RenderError::Io)?;
        Ok(())
    }
}

/// Deep-merge `patch` into `dest`: objects recurse, everything else replaces
fn merge_value(dest: &mut Value, patch: &Value) {
    match (dest, patch) {
        (Value::Object(dest_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                merge_value(dest_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        },
        (dest, patch) => *dest = patch.clone(),
    }
}
