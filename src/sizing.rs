//! Box sizing from text content.
//!
//! Every family renders its boxes as a stack of text sections (title, details,
//! compartments). A box is as wide as its widest line plus horizontal padding and as tall
//! as all its lines plus vertical padding and one gap between consecutive sections, both
//! clamped from below by the family minimum.

use crate::config::{BoxStyle, EdgeLabelStyle};
use crate::text_metrics::{
    FontWeight, max_width_for_chars, split_lines, widest_line_width, wrap_line,
};

/// Lines rendered with one font.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSection {
    pub lines: Vec<String>,
    pub font_size: f64,
    pub weight: FontWeight,
}

impl TextSection {
    /// Splits on explicit breaks and wraps each line at `max_chars` average columns.
    pub fn wrapped(text: &str, font_size: f64, weight: FontWeight, max_chars: usize) -> Self {
        let budget = max_width_for_chars(max_chars, font_size, weight);
        let lines = split_lines(text)
            .iter()
            .flat_map(|line| wrap_line(line, budget, font_size, weight))
            .collect();
        Self {
            lines,
            font_size,
            weight,
        }
    }

    pub fn single_line(text: &str, font_size: f64, weight: FontWeight) -> Self {
        Self {
            lines: vec![text.trim().to_string()],
            font_size,
            weight,
        }
    }

    pub fn width(&self) -> f64 {
        widest_line_width(&self.lines, self.font_size, self.weight)
    }
}

pub fn measure_box(sections: &[TextSection], style: &BoxStyle) -> (f64, f64) {
    let widest = sections
        .iter()
        .map(TextSection::width)
        .fold(0.0, f64::max);
    let lines: usize = sections.iter().map(|section| section.lines.len()).sum();
    let gaps = sections.len().saturating_sub(1) as f64;

    let width = (widest + 2.0 * style.padding_x).max(style.min_width);
    let height = (lines as f64 * style.line_height + 2.0 * style.padding_y + gaps * style.section_gap)
        .max(style.min_height);
    (width, height)
}

/// One wrapped label.
pub fn flow_sections(label: &str, style: &BoxStyle) -> Vec<TextSection> {
    vec![TextSection::wrapped(
        label,
        style.title_font_size,
        style.title_weight,
        style.max_line_chars,
    )]
}

/// Title, then a detail section with the `[technology]` (or `[kind]`) tag and the
/// description. The detail section is omitted when both are absent.
pub fn context_sections(
    title: &str,
    kind: Option<&str>,
    technology: Option<&str>,
    description: Option<&str>,
    style: &BoxStyle,
) -> Vec<TextSection> {
    let mut sections = vec![TextSection::wrapped(
        title,
        style.title_font_size,
        style.title_weight,
        style.max_line_chars,
    )];

    let mut details: Vec<String> = Vec::new();
    if let Some(tag) = technology.or(kind).filter(|t| !t.trim().is_empty()) {
        details.push(format!("[{}]", tag.trim()));
    }
    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        details.extend(
            TextSection::wrapped(
                description,
                style.detail_font_size,
                style.detail_weight,
                style.max_line_chars,
            )
            .lines,
        );
    }
    if !details.is_empty() {
        sections.push(TextSection {
            lines: details,
            font_size: style.detail_font_size,
            weight: style.detail_weight,
        });
    }
    sections
}

/// Name, attributes and methods. Empty compartments keep their gap but add no lines.
pub fn class_sections(
    name: &str,
    attributes: &[String],
    methods: &[String],
    style: &BoxStyle,
) -> Vec<TextSection> {
    let compartment = |members: &[String]| TextSection {
        lines: members.iter().map(|m| m.trim().to_string()).collect(),
        font_size: style.detail_font_size,
        weight: style.detail_weight,
    };
    vec![
        TextSection::single_line(name, style.title_font_size, style.title_weight),
        compartment(attributes),
        compartment(methods),
    ]
}

pub fn layered_sections(label: &str, style: &BoxStyle) -> Vec<TextSection> {
    vec![TextSection::single_line(
        label,
        style.title_font_size,
        style.title_weight,
    )]
}

/// Box reserved for an edge label: the wrapped label plus an optional `[technology]` line.
pub fn measure_edge_label(
    label: &str,
    technology: Option<&str>,
    style: &EdgeLabelStyle,
) -> (f64, f64) {
    let mut section = TextSection::wrapped(label, style.font_size, style.weight, style.max_line_chars);
    if let Some(technology) = technology.filter(|t| !t.trim().is_empty()) {
        section.lines.push(format!("[{}]", technology.trim()));
    }
    let width = section.width() + 2.0 * style.padding_x;
    let height = section.lines.len() as f64 * style.line_height + 2.0 * style.padding_y;
    (width, height)
}
