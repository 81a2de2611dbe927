// Library exports for sheetchart

pub mod csv_reader;
pub mod data;
pub mod error;
pub mod parser;
pub mod request;
pub mod runtime;
pub mod value;

// Chart pipeline stages
pub mod chart_type;
pub mod filter;
pub mod ir;
pub mod palette;
pub mod percent;
pub mod sanitize;
pub mod transform;

pub use chart_type::ChartType;
pub use data::{SheetPreview, TabularDataset};
pub use error::ChartError;
pub use ir::ChartData;
pub use request::{ChartRequest, SeriesSpec};
pub use runtime::{generate_chart, ChartResponse};
pub use value::CellValue;

use palette::{ColorPalette, DEFAULT_COLORS};
use serde::Deserialize;

/// Presentation defaults applied while building charts.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartOptions {
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default = "default_bubble_radius")]
    pub bubble_radius: f64,
    #[serde(default = "default_radar_fill_alpha")]
    pub radar_fill_alpha: f64,
    #[serde(default = "default_border_width")]
    pub border_width: f64,
}

fn default_palette() -> Vec<String> { DEFAULT_COLORS.iter().map(|c| c.to_string()).collect() }
fn default_bubble_radius() -> f64 { 10.0 }
fn default_radar_fill_alpha() -> f64 { 0.2 }
fn default_border_width() -> f64 { 1.0 }

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            bubble_radius: default_bubble_radius(),
            radar_fill_alpha: default_radar_fill_alpha(),
            border_width: default_border_width(),
        }
    }
}

impl ChartOptions {
    pub fn color_palette(&self) -> ColorPalette {
        ColorPalette::new(self.palette.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_fall_back_to_defaults() {
        let opts: ChartOptions = serde_json::from_str(r#"{"bubble_radius": 4}"#).unwrap();
        assert_eq!(opts.bubble_radius, 4.0);
        assert_eq!(opts.border_width, 1.0);
        assert_eq!(opts.radar_fill_alpha, 0.2);
        assert_eq!(opts.palette.len(), 10);
    }

    #[test]
    fn test_empty_palette_uses_default_colors() {
        let opts = ChartOptions {
            palette: vec![],
            ..ChartOptions::default()
        };
        assert_eq!(opts.color_palette(), ColorPalette::default());
    }
}
