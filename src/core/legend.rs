//! Legend sizing and item placement.

use serde::{Deserialize, Serialize};

use crate::core::collection::max_f64;
use crate::core::props::Padding;
use crate::core::style::{StyleSpec, evaluate_style};
use crate::core::types::{Datum, Point};

/// Measures rendered text; callers plug in a shaping backend or use
/// [`HeuristicTextMeasurer`].
pub trait TextMeasurer {
    /// `(width, height)` of a single line.
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64);
}

/// Assumes glyphs average 0.6em wide and lines are 1em tall.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        (0.6 * font_size * text.chars().count() as f64, font_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LegendOrientation {
    Horizontal,
    #[default]
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendProps {
    #[serde(default)]
    pub orientation: LegendOrientation,
    /// Wrap after this many items; unset keeps everything on one row (or column).
    #[serde(default)]
    pub items_per_row: Option<usize>,
    #[serde(default = "default_gutter")]
    pub gutter: f64,
    #[serde(default = "default_symbol_spacer")]
    pub symbol_spacer: f64,
    #[serde(default = "default_symbol_size")]
    pub symbol_size: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_padding")]
    pub padding: Padding,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

fn default_gutter() -> f64 {
    10.0
}

fn default_symbol_spacer() -> f64 {
    8.0
}

fn default_symbol_size() -> f64 {
    8.0
}

fn default_font_size() -> f64 {
    14.0
}

fn default_padding() -> Padding {
    Padding::uniform(0.0)
}

impl Default for LegendProps {
    fn default() -> Self {
        Self {
            orientation: LegendOrientation::default(),
            items_per_row: None,
            gutter: default_gutter(),
            symbol_spacer: default_symbol_spacer(),
            symbol_size: default_symbol_size(),
            font_size: default_font_size(),
            padding: default_padding(),
            x: 0.0,
            y: 0.0,
            width: None,
            height: None,
        }
    }
}

impl LegendProps {
    #[must_use]
    pub fn horizontal() -> Self {
        Self {
            orientation: LegendOrientation::Horizontal,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_items_per_row(mut self, items_per_row: usize) -> Self {
        self.items_per_row = Some(items_per_row);
        self
    }

    #[must_use]
    pub fn with_gutter(mut self, gutter: f64) -> Self {
        self.gutter = gutter;
        self
    }

    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    fn items_per_row(&self) -> Option<usize> {
        self.items_per_row.filter(|count| *count > 0)
    }
}

#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub name: String,
    pub symbol: String,
    /// `fontSize` in this style overrides the legend font size.
    pub label_style: Option<StyleSpec>,
}

impl LegendEntry {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: "square".to_owned(),
            label_style: None,
        }
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    #[must_use]
    pub fn with_label_style(mut self, style: StyleSpec) -> Self {
        self.label_style = Some(style);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItemLayout {
    pub name: String,
    pub row: usize,
    pub column: usize,
    /// Symbol center.
    pub symbol: Point,
    /// Label start, vertically centered on the row.
    pub label: Point,
    pub text_size: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendLayout {
    pub width: f64,
    pub height: f64,
    pub items: Vec<LegendItemLayout>,
}

fn font_size(entry: &LegendEntry, index: usize, props: &LegendProps) -> f64 {
    entry
        .label_style
        .as_ref()
        .and_then(|style| {
            let datum = Datum::new(index as f64, 0.0).with_label(entry.name.clone());
            evaluate_style(style, &datum, false).number("fontSize")
        })
        .unwrap_or(props.font_size)
}

/// Sizes the legend and places each item.
///
/// Horizontal legends fill rows first; vertical legends fill columns first,
/// with `items_per_row` bounding the column length.
#[must_use]
pub fn legend_layout(
    entries: &[LegendEntry],
    props: &LegendProps,
    measurer: &dyn TextMeasurer,
) -> LegendLayout {
    let count = entries.len();
    let text_sizes: Vec<(f64, f64)> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| measurer.measure(&entry.name, font_size(entry, index, props)))
        .collect();
    let per_row = props.items_per_row().unwrap_or(count.max(1));
    let row_count = match props.items_per_row() {
        Some(per_row) => count.div_ceil(per_row),
        None => 1,
    };
    let max_width = max_f64(text_sizes.iter().map(|(width, _)| *width)).unwrap_or(0.0);
    let max_height = max_f64(text_sizes.iter().map(|(_, height)| *height)).unwrap_or(0.0);
    let cell_width = max_width + props.symbol_size + props.symbol_spacer;
    let horizontal = props.orientation == LegendOrientation::Horizontal;

    let (content_width, content_height) = if count == 0 {
        (0.0, 0.0)
    } else if horizontal {
        let row_items = per_row.min(count) as f64;
        (
            row_items * (cell_width + props.gutter) - props.gutter,
            max_height * row_count as f64,
        )
    } else {
        let total_height: f64 = text_sizes.iter().map(|(_, height)| height).sum();
        (
            row_count as f64 * cell_width + props.gutter * (row_count as f64 - 1.0),
            (total_height + props.gutter * (count as f64 - 1.0)) / row_count as f64,
        )
    };

    let padding = props.padding;
    let mut column_heights: Vec<f64> = Vec::new();
    let items = entries
        .iter()
        .zip(&text_sizes)
        .enumerate()
        .map(|(index, (entry, size))| {
            let (row, column) = if horizontal {
                (index / per_row, index % per_row)
            } else {
                (index % per_row, index / per_row)
            };
            let left = props.x + padding.left + column as f64 * (cell_width + props.gutter);
            let (top, row_height) = if horizontal {
                (props.y + padding.top + row as f64 * max_height, max_height)
            } else {
                if column_heights.len() <= column {
                    column_heights.resize(column + 1, 0.0);
                }
                let top = props.y + padding.top + column_heights[column];
                column_heights[column] += size.1 + props.gutter;
                (top, size.1)
            };
            let center_y = top + row_height / 2.0;
            LegendItemLayout {
                name: entry.name.clone(),
                row,
                column,
                symbol: Point::new(left + props.symbol_size / 2.0, center_y),
                label: Point::new(left + props.symbol_size + props.symbol_spacer, center_y),
                text_size: *size,
            }
        })
        .collect();

    LegendLayout {
        width: props
            .width
            .unwrap_or(padding.left + content_width + padding.right),
        height: props
            .height
            .unwrap_or(padding.top + content_height + padding.bottom),
        items,
    }
}
