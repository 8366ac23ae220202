//! Typed layout updates for chart figures
//!
//! Layout changes are described with explicit structs instead of loose JSON
//! so that callers cannot misspell a plotly key. Only the fields that are
//! set get serialized and merged into the figure's layout object.

use serde::{Deserialize, Serialize};

/// Margins around the plot area, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

impl Margin {
    pub fn new(l: u32, r: u32, t: u32, b: u32) -> Self {
        Self { l, r, t, b }
    }
}

/// Axis overrides applied to either axis of a figure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorange: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick0: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nticks: Option<u32>,
}

impl AxisUpdate {
    pub fn visible(mut self, on: bool) -> Self {
        self.visible = Some(on);
        self
    }

    pub fn showgrid(mut self, on: bool) -> Self {
        self.showgrid = Some(on);
        self
    }

    pub fn fixed_range(mut self, min: f64, max: f64) -> Self {
        self.autorange = Some(false);
        self.range = Some([min, max]);
        self
    }

    pub fn tick0(mut self, start: f64) -> Self {
        self.tick0 = Some(start);
        self
    }

    pub fn tickangle(mut self, degrees: f64) -> Self {
        self.tickangle = Some(degrees);
        self
    }

    pub fn nticks(mut self, n: u32) -> Self {
        self.nticks = Some(n);
        self
    }
}

/// Title placement and text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
}

/// A partial layout: every set field overwrites the figure's current layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<AxisUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<AxisUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontUpdate>,
}

/// Font family and size for the whole figure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl LayoutUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, text: impl Into<String>) -> Self {
        let update = self.title.get_or_insert_with(TitleUpdate::default);
        update.text = Some(text.into());
        self
    }

    pub fn title_x(mut self, x: f64) -> Self {
        let update = self.title.get_or_insert_with(TitleUpdate::default);
        update.x = Some(x);
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn margin(mut self, margin: Margin) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn paper_bgcolor(mut self, color: impl Into<String>) -> Self {
        self.paper_bgcolor = Some(color.into());
        self
    }

    pub fn plot_bgcolor(mut self, color: impl Into<String>) -> Self {
        self.plot_bgcolor = Some(color.into());
        self
    }

    pub fn showlegend(mut self, on: bool) -> Self {
        self.showlegend = Some(on);
        self
    }

    pub fn xaxis(mut self, axis: AxisUpdate) -> Self {
        self.xaxis = Some(axis);
        self
    }

    pub fn yaxis(mut self, axis: AxisUpdate) -> Self {
        self.yaxis = Some(axis);
        self
    }

    pub fn font(mut self, font: FontUpdate) -> Self {
        self.font = Some(font);
        self
    }
}
