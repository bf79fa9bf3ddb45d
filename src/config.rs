use crate::ir::{Margin, Spacing};
use crate::text_metrics::FontWeight;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pixel constants for one diagram family's boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStyle {
    pub min_width: f64,
    pub min_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub line_height: f64,
    pub section_gap: f64,
    pub title_font_size: f64,
    pub title_weight: FontWeight,
    pub detail_font_size: f64,
    pub detail_weight: FontWeight,
    pub max_line_chars: usize,
}

impl BoxStyle {
    pub fn flow() -> Self {
        Self {
            min_width: 80.0,
            min_height: 40.0,
            padding_x: 15.0,
            padding_y: 10.0,
            line_height: 20.0,
            section_gap: 0.0,
            title_font_size: 14.0,
            title_weight: FontWeight::Normal,
            detail_font_size: 12.0,
            detail_weight: FontWeight::Normal,
            max_line_chars: 28,
        }
    }

    pub fn context() -> Self {
        Self {
            min_width: 216.0,
            min_height: 60.0,
            padding_x: 16.0,
            padding_y: 12.0,
            line_height: 18.0,
            section_gap: 8.0,
            title_font_size: 16.0,
            title_weight: FontWeight::Bold,
            detail_font_size: 13.0,
            detail_weight: FontWeight::Normal,
            max_line_chars: 32,
        }
    }

    pub fn class() -> Self {
        Self {
            min_width: 120.0,
            min_height: 56.0,
            padding_x: 12.0,
            padding_y: 8.0,
            line_height: 18.0,
            section_gap: 10.0,
            title_font_size: 14.0,
            title_weight: FontWeight::Bold,
            detail_font_size: 13.0,
            detail_weight: FontWeight::Normal,
            max_line_chars: 48,
        }
    }

    pub fn layered() -> Self {
        Self {
            min_width: 120.0,
            min_height: 44.0,
            padding_x: 14.0,
            padding_y: 10.0,
            line_height: 18.0,
            section_gap: 6.0,
            title_font_size: 14.0,
            title_weight: FontWeight::Medium,
            detail_font_size: 12.0,
            detail_weight: FontWeight::Normal,
            max_line_chars: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStyle {
    pub padding: f64,
    pub header_height: f64,
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for GroupStyle {
    fn default() -> Self {
        Self {
            padding: 16.0,
            header_height: 28.0,
            min_width: 120.0,
            min_height: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLabelStyle {
    pub font_size: f64,
    pub weight: FontWeight,
    pub padding_x: f64,
    pub padding_y: f64,
    pub line_height: f64,
    pub max_line_chars: usize,
}

impl Default for EdgeLabelStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            weight: FontWeight::Normal,
            padding_x: 6.0,
            padding_y: 4.0,
            line_height: 16.0,
            max_line_chars: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub order_passes: usize,
    pub position_passes: usize,
    pub self_loop_size: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            order_passes: 4,
            position_passes: 4,
            self_loop_size: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub spacing: Spacing,
    pub margin: Margin,
    pub engine: EngineConfig,
    pub group: GroupStyle,
    pub edge_label: EdgeLabelStyle,
    pub flow: BoxStyle,
    pub context: BoxStyle,
    pub class: BoxStyle,
    pub layered: BoxStyle,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: Spacing::default(),
            margin: Margin::default(),
            engine: EngineConfig::default(),
            group: GroupStyle::default(),
            edge_label: EdgeLabelStyle::default(),
            flow: BoxStyle::flow(),
            context: BoxStyle::context(),
            class: BoxStyle::class(),
            layered: BoxStyle::layered(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct BoxStyleFile {
    min_width: Option<f64>,
    min_height: Option<f64>,
    padding_x: Option<f64>,
    padding_y: Option<f64>,
    line_height: Option<f64>,
    section_gap: Option<f64>,
    title_font_size: Option<f64>,
    title_weight: Option<FontWeight>,
    detail_font_size: Option<f64>,
    detail_weight: Option<FontWeight>,
    max_line_chars: Option<usize>,
}

impl BoxStyleFile {
    fn apply(self, style: &mut BoxStyle) {
        if let Some(v) = self.min_width {
            style.min_width = v;
        }
        if let Some(v) = self.min_height {
            style.min_height = v;
        }
        if let Some(v) = self.padding_x {
            style.padding_x = v;
        }
        if let Some(v) = self.padding_y {
            style.padding_y = v;
        }
        if let Some(v) = self.line_height {
            style.line_height = v;
        }
        if let Some(v) = self.section_gap {
            style.section_gap = v;
        }
        if let Some(v) = self.title_font_size {
            style.title_font_size = v;
        }
        if let Some(v) = self.title_weight {
            style.title_weight = v;
        }
        if let Some(v) = self.detail_font_size {
            style.detail_font_size = v;
        }
        if let Some(v) = self.detail_weight {
            style.detail_weight = v;
        }
        if let Some(v) = self.max_line_chars {
            style.max_line_chars = v;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GroupStyleFile {
    padding: Option<f64>,
    header_height: Option<f64>,
    min_width: Option<f64>,
    min_height: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EdgeLabelStyleFile {
    font_size: Option<f64>,
    weight: Option<FontWeight>,
    padding_x: Option<f64>,
    padding_y: Option<f64>,
    line_height: Option<f64>,
    max_line_chars: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    node_spacing: Option<f64>,
    rank_spacing: Option<f64>,
    margin_x: Option<f64>,
    margin_y: Option<f64>,
    order_passes: Option<usize>,
    position_passes: Option<usize>,
    self_loop_size: Option<f64>,
    group: Option<GroupStyleFile>,
    edge_label: Option<EdgeLabelStyleFile>,
    flow: Option<BoxStyleFile>,
    context: Option<BoxStyleFile>,
    class: Option<BoxStyleFile>,
    layered: Option<BoxStyleFile>,
}

/// Overlay a camelCase JSON document onto the defaults. Unknown keys are ignored.
pub fn parse_config(contents: &str) -> anyhow::Result<LayoutConfig> {
    let parsed: ConfigFile =
        serde_json::from_str(contents).context("invalid layout configuration JSON")?;
    let mut config = LayoutConfig::default();

    if let Some(v) = parsed.node_spacing {
        config.spacing.node = v;
    }
    if let Some(v) = parsed.rank_spacing {
        config.spacing.rank = v;
    }
    if let Some(v) = parsed.margin_x {
        config.margin.x = v;
    }
    if let Some(v) = parsed.margin_y {
        config.margin.y = v;
    }
    if let Some(v) = parsed.order_passes {
        config.engine.order_passes = v;
    }
    if let Some(v) = parsed.position_passes {
        config.engine.position_passes = v;
    }
    if let Some(v) = parsed.self_loop_size {
        config.engine.self_loop_size = v;
    }
    if let Some(group) = parsed.group {
        if let Some(v) = group.padding {
            config.group.padding = v;
        }
        if let Some(v) = group.header_height {
            config.group.header_height = v;
        }
        if let Some(v) = group.min_width {
            config.group.min_width = v;
        }
        if let Some(v) = group.min_height {
            config.group.min_height = v;
        }
    }
    if let Some(label) = parsed.edge_label {
        if let Some(v) = label.font_size {
            config.edge_label.font_size = v;
        }
        if let Some(v) = label.weight {
            config.edge_label.weight = v;
        }
        if let Some(v) = label.padding_x {
            config.edge_label.padding_x = v;
        }
        if let Some(v) = label.padding_y {
            config.edge_label.padding_y = v;
        }
        if let Some(v) = label.line_height {
            config.edge_label.line_height = v;
        }
        if let Some(v) = label.max_line_chars {
            config.edge_label.max_line_chars = v;
        }
    }
    if let Some(style) = parsed.flow {
        style.apply(&mut config.flow);
    }
    if let Some(style) = parsed.context {
        style.apply(&mut config.context);
    }
    if let Some(style) = parsed.class {
        style.apply(&mut config.class);
    }
    if let Some(style) = parsed.layered {
        style.apply(&mut config.layered);
    }

    Ok(config)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, LayoutConfig::default());
    }

    #[test]
    fn overlays_present_keys_only() {
        let config = parse_config(
            r#"{
                "nodeSpacing": 30,
                "group": {"padding": 10},
                "class": {"sectionGap": 4, "titleWeight": "medium"},
                "somethingElse": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.spacing.node, 30.0);
        assert_eq!(config.spacing.rank, Spacing::default().rank);
        assert_eq!(config.group.padding, 10.0);
        assert_eq!(config.group.header_height, GroupStyle::default().header_height);
        assert_eq!(config.class.section_gap, 4.0);
        assert_eq!(config.class.title_weight, FontWeight::Medium);
        assert_eq!(config.context, BoxStyle::context());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_config("{ not json").is_err());
    }
}
