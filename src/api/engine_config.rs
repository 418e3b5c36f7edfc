use serde::{Deserialize, Serialize};

use crate::core::legend::LegendProps;
use crate::core::props::{ChartLayout, Padding};
use crate::core::stack::StackOptions;
use crate::core::voronoi::VoronoiProps;
use crate::error::{ChartError, ChartResult};

/// Chart-wide settings shared by every computation of one engine.
///
/// Serializable so hosts can persist and reload a chart setup; see
/// [`LayoutEngineConfig::to_json_contract_v1_pretty`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEngineConfig {
    #[serde(default)]
    pub layout: ChartLayout,
    #[serde(default)]
    pub stack: StackOptions,
    #[serde(default)]
    pub voronoi: VoronoiProps,
    #[serde(default)]
    pub legend: LegendProps,
}

impl Default for LayoutEngineConfig {
    fn default() -> Self {
        Self::new(ChartLayout::default())
    }
}

impl LayoutEngineConfig {
    #[must_use]
    pub fn new(layout: ChartLayout) -> Self {
        Self {
            layout,
            stack: StackOptions::default(),
            voronoi: VoronoiProps::default(),
            legend: LegendProps::default(),
        }
    }

    #[must_use]
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.layout.padding = padding;
        self
    }

    #[must_use]
    pub fn with_stack_options(mut self, options: StackOptions) -> Self {
        self.stack = options;
        self
    }

    #[must_use]
    pub fn with_voronoi(mut self, voronoi: VoronoiProps) -> Self {
        self.voronoi = voronoi;
        self
    }

    #[must_use]
    pub fn with_legend(mut self, legend: LegendProps) -> Self {
        self.legend = legend;
        self
    }

    /// Rejects surfaces no scale can be built for.
    pub fn validate(&self) -> ChartResult<()> {
        let ChartLayout {
            width,
            height,
            padding,
            inner_radius,
            ..
        } = self.layout;
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(ChartError::InvalidViewport { width, height });
        }
        let sides = [padding.top, padding.bottom, padding.left, padding.right];
        if sides.iter().any(|side| !side.is_finite() || *side < 0.0) {
            return Err(ChartError::InvalidConfig(
                "padding must be finite and non-negative".to_owned(),
            ));
        }
        if padding.left + padding.right >= width || padding.top + padding.bottom >= height {
            return Err(ChartError::InvalidConfig(format!(
                "padding leaves no plot area in a {width}x{height} surface"
            )));
        }
        if !inner_radius.is_finite() || inner_radius < 0.0 {
            return Err(ChartError::InvalidConfig(
                "inner radius must be finite and non-negative".to_owned(),
            ));
        }
        if let Some(radius) = self.voronoi.radius
            && (!radius.is_finite() || radius < 0.0)
        {
            return Err(ChartError::InvalidConfig(
                "voronoi radius must be finite and non-negative".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to serialize config: {e}")))
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to parse config: {e}")))
    }
}
