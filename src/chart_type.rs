// Chart types and their per-type shaping configuration

use crate::ir::StyleFlags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chart kinds understood by the pipeline.
///
/// Unknown names are kept as `Other` so newer presentation-side types degrade
/// to an empty chart instead of failing the request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChartType {
    Line,
    Bar,
    Radar,
    StackedBar,
    PercentStackedBar,
    Pie,
    Doughnut,
    PolarArea,
    Scatter,
    Bubble,
    Other(String),
}

/// Shaping strategy shared by a group of chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFamily {
    /// One aggregated value per distinct x category, for every series.
    Category,
    /// Per-series sums inner-joined on the x category.
    StackedPivot,
    /// First series only, summed per x category.
    SingleSeries,
    /// Raw `{x, y[, r]}` points, one per row.
    Coordinate,
    Unsupported,
}

/// Order in which category labels are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOrder {
    /// Ascending natural order of the distinct x values.
    Sorted,
    /// Order of first appearance in the rows.
    FirstAppearance,
}

/// What a category with no usable values aggregates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationPolicy {
    /// `null`, keeping "no data" distinct from a zero sum.
    NullPreserving,
    /// `0`.
    ZeroFill,
}

/// Everything the transformer needs to know about one chart type.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartProfile {
    pub family: ChartFamily,
    pub label_order: LabelOrder,
    pub policy: AggregationPolicy,
    pub style: StyleFlags,
    /// Background is the border color made translucent.
    pub translucent_fill: bool,
    /// Series values are rewritten as percentages of each category total.
    pub percent: bool,
}

impl ChartProfile {
    fn new(family: ChartFamily, label_order: LabelOrder, policy: AggregationPolicy) -> Self {
        Self {
            family,
            label_order,
            policy,
            style: StyleFlags::default(),
            translucent_fill: false,
            percent: false,
        }
    }

    fn with_style(mut self, style: StyleFlags) -> Self {
        self.style = style;
        self
    }
}

impl ChartType {
    pub const ALL: [ChartType; 10] = [
        ChartType::Line,
        ChartType::Bar,
        ChartType::Radar,
        ChartType::StackedBar,
        ChartType::PercentStackedBar,
        ChartType::Pie,
        ChartType::Doughnut,
        ChartType::PolarArea,
        ChartType::Scatter,
        ChartType::Bubble,
    ];

    pub fn name(&self) -> &str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Radar => "radar",
            ChartType::StackedBar => "stackedBar",
            ChartType::PercentStackedBar => "percentStackedBar",
            ChartType::Pie => "pie",
            ChartType::Doughnut => "doughnut",
            ChartType::PolarArea => "polarArea",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
            ChartType::Other(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .unwrap_or_else(|| ChartType::Other(name.to_string()))
    }

    /// Per-type configuration table.
    pub fn profile(&self) -> ChartProfile {
        use AggregationPolicy::*;
        use ChartFamily::*;
        use LabelOrder::*;

        let bars = |bar: f64| StyleFlags {
            bar_percentage: Some(bar),
            category_percentage: Some(0.8),
            ..StyleFlags::default()
        };

        match self {
            ChartType::Line => {
                ChartProfile::new(Category, Sorted, NullPreserving).with_style(StyleFlags {
                    fill: Some(false),
                    tension: Some(0.0),
                    point_radius: Some(0.0),
                    point_hover_radius: Some(3.0),
                    span_gaps: Some(false),
                    ..StyleFlags::default()
                })
            }
            ChartType::Bar => {
                ChartProfile::new(Category, FirstAppearance, ZeroFill).with_style(bars(0.8))
            }
            ChartType::Radar => {
                let mut profile = ChartProfile::new(Category, FirstAppearance, ZeroFill)
                    .with_style(StyleFlags {
                        fill: Some(true),
                        ..StyleFlags::default()
                    });
                profile.translucent_fill = true;
                profile
            }
            ChartType::StackedBar => {
                ChartProfile::new(StackedPivot, FirstAppearance, ZeroFill).with_style(bars(0.9))
            }
            ChartType::PercentStackedBar => {
                let mut profile = ChartProfile::new(StackedPivot, FirstAppearance, ZeroFill)
                    .with_style(bars(0.9));
                profile.percent = true;
                profile
            }
            ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea => {
                ChartProfile::new(SingleSeries, FirstAppearance, ZeroFill)
            }
            ChartType::Scatter | ChartType::Bubble => {
                ChartProfile::new(Coordinate, FirstAppearance, NullPreserving)
            }
            ChartType::Other(_) => ChartProfile::new(Unsupported, FirstAppearance, ZeroFill),
        }
    }
}

impl From<String> for ChartType {
    fn from(name: String) -> Self {
        ChartType::from_name(&name)
    }
}

impl From<ChartType> for String {
    fn from(t: ChartType) -> Self {
        t.name().to_string()
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for t in ChartType::ALL {
            assert_eq!(ChartType::from_name(t.name()), t);
        }
    }

    #[test]
    fn test_unknown_names_are_kept() {
        let t = ChartType::from_name("heatmap");
        assert_eq!(t, ChartType::Other("heatmap".into()));
        assert_eq!(t.profile().family, ChartFamily::Unsupported);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_eq!(
            ChartType::from_name("stackedbar"),
            ChartType::Other("stackedbar".into())
        );
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let t: ChartType = serde_json::from_str("\"percentStackedBar\"").unwrap();
        assert_eq!(t, ChartType::PercentStackedBar);
        assert_eq!(serde_json::to_string(&ChartType::PolarArea).unwrap(), "\"polarArea\"");
    }

    #[test]
    fn test_profile_table() {
        let line = ChartType::Line.profile();
        assert_eq!(line.label_order, LabelOrder::Sorted);
        assert_eq!(line.policy, AggregationPolicy::NullPreserving);
        assert_eq!(line.style.span_gaps, Some(false));

        let bar = ChartType::Bar.profile();
        assert_eq!(bar.policy, AggregationPolicy::ZeroFill);
        assert_eq!(bar.style.bar_percentage, Some(0.8));

        let pct = ChartType::PercentStackedBar.profile();
        assert_eq!(pct.family, ChartFamily::StackedPivot);
        assert!(pct.percent);
        assert_eq!(pct.style.bar_percentage, Some(0.9));

        assert!(ChartType::Radar.profile().translucent_fill);
        assert_eq!(ChartType::Doughnut.profile().family, ChartFamily::SingleSeries);
        assert_eq!(ChartType::Bubble.profile().family, ChartFamily::Coordinate);
    }
}
