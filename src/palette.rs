// Deterministic series colors

use crate::chart_type::{ChartFamily, ChartType};
use crate::ir::{ChartData, ColorSpec};

/// Default series colors, cycled by index.
pub const DEFAULT_COLORS: [&str; 10] = [
    "#1a4570", "#ee8939", "#f5b843", "#8b3834", "#e0ba3f", "#e6e770", "#4d83c5", "#d3a037",
    "#779c51", "#b2d571",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new(DEFAULT_COLORS.iter().map(|c| c.to_string()).collect())
    }
}

impl ColorPalette {
    /// An empty list falls back to the default colors.
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            return Self::default();
        }
        Self { colors }
    }

    /// Color for a series index; the same index always yields the same color.
    pub fn color_at(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }

    /// The first `count` colors, wrapping around the palette.
    pub fn assign_colors(&self, count: usize) -> Vec<String> {
        (0..count).map(|i| self.color_at(i).to_string()).collect()
    }
}

/// Re-express a color with a new alpha channel.
///
/// Handles `#rgb`, `#rrggbb`, `rgb(...)` and `rgba(...)`; other color syntaxes
/// are returned unchanged.
pub fn with_alpha(color: &str, alpha: f64) -> String {
    match parse_rgb(color) {
        Some((r, g, b)) => format!("rgba({}, {}, {}, {})", r, g, b, alpha),
        None => color.to_string(),
    }
}

fn parse_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.get(..6)?.to_string(),
            _ => return None,
        };
        let channel = |i: usize| -> Option<u8> {
            u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok()
        };
        return Some((channel(0)?, channel(2)?, channel(4)?));
    }

    let inner = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>().ok());
    Some((parts.next()??, parts.next()??, parts.next()??))
}

/// Fill in every color the transformer left unset.
///
/// Series without an explicit color take the palette color at their index.
/// Single-series charts get one color per label instead, and radar series a
/// translucent copy of their border as background.
pub fn assign_missing_colors(
    chart: &mut ChartData,
    chart_type: &ChartType,
    palette: &ColorPalette,
    fill_alpha: f64,
) {
    let profile = chart_type.profile();

    if profile.family == ChartFamily::SingleSeries {
        let colors = palette.assign_colors(chart.label_count());
        for dataset in &mut chart.datasets {
            dataset.background_color = Some(ColorSpec::Each(colors.clone()));
            dataset.border_color = Some(ColorSpec::Each(colors.clone()));
        }
        return;
    }

    for (idx, dataset) in chart.datasets.iter_mut().enumerate() {
        let border = dataset
            .border_color
            .get_or_insert_with(|| ColorSpec::Single(palette.color_at(idx).to_string()))
            .clone();

        if profile.translucent_fill {
            let fill = match &border {
                ColorSpec::Single(c) => ColorSpec::Single(with_alpha(c, fill_alpha)),
                ColorSpec::Each(cs) => {
                    ColorSpec::Each(cs.iter().map(|c| with_alpha(c, fill_alpha)).collect())
                }
            };
            dataset.background_color = Some(fill);
        } else if dataset.background_color.is_none() {
            dataset.background_color = Some(border);
        }
    }
}
