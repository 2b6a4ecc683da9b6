//! Chart kinds, per-chart options and shared styling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five conversion views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Daily CR per version, one line each
    TimeSeries,
    /// Overall CR per version
    Bar,
    /// Uplift per version over a reference version
    Diff,
    /// Cumulative CR per version over time
    Cumulative,
    /// Cumulative uplift over a reference version over time
    CumulativeDiff,
}

impl ChartKind {
    /// Every kind, in the order the driver renders them
    pub const ALL: [ChartKind; 5] = [
        ChartKind::TimeSeries,
        ChartKind::Bar,
        ChartKind::Diff,
        ChartKind::Cumulative,
        ChartKind::CumulativeDiff,
    ];

    /// Output file name without extension
    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::TimeSeries => "ts_versions",
            ChartKind::Bar => "bar_versions",
            ChartKind::Diff => "diff_v",
            ChartKind::Cumulative => "cumulative",
            ChartKind::CumulativeDiff => "cumulative_diff",
        }
    }

    /// Output file name
    pub fn file_name(self) -> String {
        format!("{}.png", self.file_stem())
    }

    /// Whether the chart compares against a reference version
    pub fn needs_reference(self) -> bool {
        matches!(self, ChartKind::Diff | ChartKind::CumulativeDiff)
    }

    /// Whether values are drawn as bars (and annotated)
    pub fn is_bar(self) -> bool {
        matches!(self, ChartKind::Bar | ChartKind::Diff)
    }

    /// Value axis caption
    pub fn value_label(self) -> &'static str {
        if self.needs_reference() {
            "Uplift (%)"
        } else {
            "CR (%)"
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Per-chart options
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    /// Which view this is
    pub kind: ChartKind,
    /// Caption drawn above the plot
    pub title: String,
    /// Category or time axis caption
    pub x_label: Option<String>,
    /// Value axis caption
    pub y_label: Option<String>,
    /// Fixed value axis; computed from the data when absent
    pub y_range: Option<(f64, f64)>,
}

impl ChartSpec {
    /// Spec with the default title and value caption for `kind`
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            title: kind.file_stem().to_string(),
            x_label: None,
            y_label: Some(kind.value_label().to_string()),
            y_range: None,
        }
    }

    /// Replace the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the category or time axis caption
    pub fn with_x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = Some(label.into());
        self
    }

    /// Fix the value axis
    pub fn with_y_range(mut self, range: Option<(f64, f64)>) -> Self {
        self.y_range = range;
        self
    }
}

/// Size, fonts and colors shared by all charts of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Font family for every text element
    pub font_family: String,
    /// Caption size
    pub title_font_size: u32,
    /// Axis, legend and annotation size
    pub label_font_size: u32,
    /// Plot background (hex)
    pub background_color: String,
    /// Series colors (hex), cycled
    pub palette: Vec<String>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 1200,
            font_family: "sans-serif".to_string(),
            title_font_size: 24,
            label_font_size: 14,
            background_color: "#E5E5E5".to_string(),
            palette: [
                "#E24A33", "#348ABD", "#988ED5", "#777777", "#FBC15E", "#8EBA42", "#FFB5B8",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}
