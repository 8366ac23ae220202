//! Tabular formatter
//!
//! Turns a labeled numeric table (rows = line items, columns = periods) into
//! a styled table description for the rendering backend: per-column text
//! formatting, magnitude/sign font colors, and alternating row fills.

use crate::figure::Figure;
use crate::layout::LayoutUpdate;
use serde_json::json;

/// Unit suffixes appended per division by 1000
const SUFFIXES: [&str; 6] = ["", "K", "M", "B", "T", "P"];

/// Neutral font color for labels, headers, and small values
const NEUTRAL: &str = "white";

/// Positive shades, largest magnitude first
const POSITIVE_SHADES: [&str; 3] = ["rgb(74,222,128)", "rgb(22,163,74)", "rgb(21,128,61)"];

/// Negative shades, largest magnitude first
const NEGATIVE_SHADES: [&str; 3] = ["rgb(248,113,113)", "rgb(220,38,38)", "rgb(185,28,28)"];

/// Default alternating row fills
const STRIPE_A: &str = "rgb(30,30,30)";
const STRIPE_B: &str = "rgb(48,48,48)";

/// Shorten a value with a magnitude suffix, e.g. `1_500_000 -> "1.50M"`.
///
/// Divides by 1000 until the value drops below 1000, then renders with the
/// requested precision. The division count is capped at the last suffix so
/// absurdly large inputs never index out of range.
pub fn numerize(value: f64, precision: usize) -> String {
    let mut v = value;
    let mut idx = 0;
    while v.abs() >= 1000.0 && idx < SUFFIXES.len() - 1 {
        v /= 1000.0;
        idx += 1;
    }
    format!("{v:.precision$}{}", SUFFIXES[idx])
}

/// Digit count of the integer part, sign stripped
fn integer_digits(value: f64) -> usize {
    format!("{}", value.abs().trunc()).len()
}

/// Map a value to a font color by sign and integer-digit count.
///
/// Buckets are `>9`, `7-9`, and `4-6` digits; anything smaller, and any
/// missing value, stays neutral.
pub fn magnitude_color(value: Option<f64>) -> &'static str {
    let Some(v) = value else {
        return NEUTRAL;
    };
    let shades = if v < 0.0 {
        NEGATIVE_SHADES
    } else {
        POSITIVE_SHADES
    };
    match integer_digits(v) {
        d if d > 9 => shades[0],
        d if d > 6 => shades[1],
        d if d > 3 => shades[2],
        _ => NEUTRAL,
    }
}

/// Alternating row fills for `n` rows: `[A, B, A, B, ...]`
pub fn stripe_fills(n: usize, colors: (&str, &str)) -> Vec<String> {
    (0..n)
        .map(|i| {
            if i % 2 == 0 {
                colors.0.to_string()
            } else {
                colors.1.to_string()
            }
        })
        .collect()
}

/// Per-column display formatting rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnFormat {
    /// Magnitude suffix with the given decimal precision
    Magnitude { precision: usize },
    /// Dollar sign plus two-decimal magnitude suffix
    Currency,
    /// Two-decimal percentage
    Percentage,
    /// Thousands-grouped with two decimals
    Grouped,
    /// Magnitude suffix wrapped in bold markup
    BoldMagnitude,
    /// Plain two-decimal rendering
    Plain,
}

impl ColumnFormat {
    /// Format one cell; missing values render as empty, never fail
    pub fn apply(&self, value: Option<f64>) -> String {
        let Some(v) = value else {
            return String::new();
        };
        match self {
            Self::Magnitude { precision } => numerize(v, *precision),
            Self::Currency => format!("${}", numerize(v, 2)),
            Self::Percentage => format!("{v:.2}%"),
            Self::Grouped => group_thousands(v),
            Self::BoldMagnitude => format!("<b>{}</b>", numerize(v, 2)),
            Self::Plain => format!("{v:.2}"),
        }
    }
}

/// `1234567.5 -> "1,234,567.50"`
fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, f),
        None => (formatted.as_str(), "00"),
    };
    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// A labeled two-dimensional numeric table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSpec {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    /// Row-major cell values, one entry per column label
    pub rows: Vec<Vec<Option<f64>>>,
}

/// A fully styled, renderable table description
#[derive(Debug, Clone, PartialEq)]
pub struct TableRenderSpec {
    header: Vec<String>,
    /// Column-major display strings, labels first
    columns: Vec<Vec<String>>,
    /// Column-major font colors
    font_colors: Vec<Vec<String>>,
    row_fills: Vec<String>,
    col_width: Vec<f64>,
    cell_align: Vec<String>,
    width: u32,
    height: u32,
    header_visible: bool,
}

impl TableRenderSpec {
    /// Format every data column of `table` with its matching rule.
    ///
    /// `formats` pairs with `table.column_labels` by position; a missing rule
    /// falls back to plain formatting. The label column is passed through
    /// untouched. Row fills alternate and sizing defaults to the caller's
    /// later overrides.
    pub fn from_table(table: &TableSpec, formats: &[ColumnFormat]) -> Self {
        let n_rows = table.row_labels.len();
        let mut columns = vec![table.row_labels.clone()];
        for (col_idx, _) in table.column_labels.iter().enumerate() {
            let rule = formats.get(col_idx).copied().unwrap_or(ColumnFormat::Plain);
            let column = table
                .rows
                .iter()
                .map(|row| rule.apply(row.get(col_idx).copied().flatten()))
                .collect();
            columns.push(column);
        }

        let mut header = vec![String::new()];
        header.extend(table.column_labels.iter().cloned());

        let n_cols = columns.len();
        Self {
            header,
            columns,
            font_colors: vec![vec![NEUTRAL.to_string(); n_rows]; n_cols],
            row_fills: stripe_fills(n_rows, (STRIPE_A, STRIPE_B)),
            col_width: vec![1.0; n_cols],
            cell_align: vec!["left".to_string(); n_cols],
            width: 650,
            height: 30 + 45 * n_rows as u32,
            header_visible: true,
        }
    }

    /// Color the first data column by magnitude and sign of its raw values
    pub fn color_by_magnitude(mut self, table: &TableSpec) -> Self {
        if self.font_colors.len() < 2 {
            return self;
        }
        self.font_colors[1] = table
            .rows
            .iter()
            .map(|row| magnitude_color(row.first().copied().flatten()).to_string())
            .collect();
        self
    }

    /// Relative column widths, label column first
    pub fn col_width(mut self, widths: Vec<f64>) -> Self {
        self.col_width = widths;
        self
    }

    /// Per-column text alignment, label column first
    pub fn cell_align(mut self, align: Vec<&str>) -> Self {
        self.cell_align = align.into_iter().map(str::to_string).collect();
        self
    }

    /// Override the alternating row fill pair
    pub fn stripes(mut self, a: &str, b: &str) -> Self {
        let n = self.columns.first().map_or(0, Vec::len);
        self.row_fills = stripe_fills(n, (a, b));
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn header_visible(mut self, visible: bool) -> Self {
        self.header_visible = visible;
        self
    }

    pub fn row_fills(&self) -> &[String] {
        &self.row_fills
    }

    pub fn columns(&self) -> &[Vec<String>] {
        &self.columns
    }

    pub fn font_colors(&self) -> &[Vec<String>] {
        &self.font_colors
    }

    /// Build the table figure for the rendering backend.
    ///
    /// The paper stays transparent so the compositor's autocrop can trim the
    /// unused canvas around the table.
    pub fn into_figure(self) -> Figure {
        let n_cols = self.columns.len();
        let fills: Vec<Vec<String>> = (0..n_cols).map(|_| self.row_fills.clone()).collect();
        let header = if self.header_visible {
            json!({"values": self.header, "align": "center", "fill": {"color": STRIPE_B}})
        } else {
            json!({"values": Vec::<String>::new(), "height": 1})
        };
        let trace = json!({
            "type": "table",
            "columnwidth": self.col_width,
            "header": header,
            "cells": {
                "values": self.columns,
                "align": self.cell_align,
                "fill": {"color": fills},
                "font": {"color": self.font_colors},
                "height": 30,
            },
        });
        Figure::new().add_trace(trace).update_layout(
            &LayoutUpdate::new()
                .size(self.width, self.height)
                .margin(crate::layout::Margin::new(0, 0, 0, 0))
                .paper_bgcolor("rgba(0,0,0,0)"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numerize_spec_values() {
        assert_eq!(numerize(1_500_000.0, 2), "1.50M");
        assert_eq!(numerize(999.0, 2), "999.00");
        assert_eq!(numerize(-2_300.0, 2), "-2.30K");
    }

    #[test]
    fn test_numerize_suffix_cap() {
        // 1e18 exhausts the suffix set; index must stay in range
        assert_eq!(numerize(1e18, 2), "1000.00P");
        assert_eq!(numerize(1e15, 0), "1P");
    }

    #[test]
    fn test_stripe_sequence_five_rows() {
        let fills = stripe_fills(5, ("A", "B"));
        assert_eq!(fills, vec!["A", "B", "A", "B", "A"]);
        assert_eq!(fills.iter().filter(|c| *c == "A").count(), 3);
        assert_eq!(fills.iter().filter(|c| *c == "B").count(), 2);
    }

    #[test]
    fn test_magnitude_color_buckets() {
        assert_eq!(magnitude_color(None), "white");
        assert_eq!(magnitude_color(Some(999.0)), "white");
        assert_eq!(magnitude_color(Some(-999.0)), "white");
        assert_eq!(magnitude_color(Some(12_345.0)), "rgb(21,128,61)");
        assert_eq!(magnitude_color(Some(-12_345.0)), "rgb(185,28,28)");
        assert_eq!(magnitude_color(Some(12_345_678.0)), "rgb(22,163,74)");
        assert_eq!(magnitude_color(Some(-12_345_678.0)), "rgb(220,38,38)");
        assert_eq!(magnitude_color(Some(12_345_678_901.0)), "rgb(74,222,128)");
        assert_eq!(magnitude_color(Some(-12_345_678_901.0)), "rgb(248,113,113)");
    }

    #[test]
    fn test_column_format_variants() {
        assert_eq!(
            ColumnFormat::Magnitude { precision: 2 }.apply(Some(383_285_000_000.0)),
            "383.29B"
        );
        assert_eq!(ColumnFormat::Currency.apply(Some(1_500.0)), "$1.50K");
        assert_eq!(ColumnFormat::Percentage.apply(Some(12.345)), "12.35%");
        assert_eq!(ColumnFormat::Grouped.apply(Some(1_234_567.5)), "1,234,567.50");
        assert_eq!(ColumnFormat::Grouped.apply(Some(-1_234.0)), "-1,234.00");
        assert_eq!(
            ColumnFormat::BoldMagnitude.apply(Some(2_000_000.0)),
            "<b>2.00M</b>"
        );
        assert_eq!(ColumnFormat::Plain.apply(Some(3.14159)), "3.14");
        assert_eq!(ColumnFormat::Plain.apply(None), "");
    }

    fn sample_table() -> TableSpec {
        TableSpec {
            row_labels: vec!["Revenue".into(), "Net Income".into(), "EPS".into()],
            column_labels: vec!["2023-09-30".into()],
            rows: vec![
                vec![Some(383_285_000_000.0)],
                vec![Some(-97_000_000_000.0)],
                vec![Some(6.13)],
            ],
        }
    }

    #[test]
    fn test_from_table_shapes() {
        let spec = TableRenderSpec::from_table(
            &sample_table(),
            &[ColumnFormat::Magnitude { precision: 2 }],
        );
        assert_eq!(spec.columns().len(), 2);
        assert_eq!(spec.columns()[0][0], "Revenue");
        assert_eq!(spec.columns()[1][0], "383.29B");
        assert_eq!(spec.columns()[1][1], "-97.00B");
        assert_eq!(spec.columns()[1][2], "6.13");
        assert_eq!(spec.row_fills().len(), 3);
    }

    #[test]
    fn test_color_by_magnitude_first_data_column() {
        let table = sample_table();
        let spec = TableRenderSpec::from_table(&table, &[ColumnFormat::Plain])
            .color_by_magnitude(&table);
        assert!(spec.font_colors()[0].iter().all(|c| c == "white"));
        assert_eq!(spec.font_colors()[1][0], "rgb(74,222,128)");
        assert_eq!(spec.font_colors()[1][1], "rgb(248,113,113)");
        assert_eq!(spec.font_colors()[1][2], "white");
    }

    #[test]
    fn test_into_figure_table_trace() {
        let table = sample_table();
        let figure = TableRenderSpec::from_table(&table, &[ColumnFormat::Plain])
            .col_width(vec![8.0, 5.0])
            .cell_align(vec!["left", "right"])
            .size(650, 165)
            .into_figure();
        let doc = figure.to_value();
        assert_eq!(doc["data"][0]["type"], "table");
        assert_eq!(doc["data"][0]["columnwidth"][0], 8.0);
        assert_eq!(doc["layout"]["width"], 650);
        assert_eq!(doc["layout"]["paper_bgcolor"], "rgba(0,0,0,0)");
    }

    #[test]
    fn test_default_height_tracks_rows() {
        let spec = TableRenderSpec::from_table(&sample_table(), &[ColumnFormat::Plain]);
        assert_eq!(spec.height, 30 + 45 * 3);
    }
}
