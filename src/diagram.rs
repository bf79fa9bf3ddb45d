//! Parser-facing diagram model and its conversion into a sized graph.
//!
//! Parsers produce a [`Diagram`]: elements with text bodies, relations between element
//! ids, and a group forest. [`build_sized_graph`] measures every element with its family's
//! box style, measures relation labels, and drops relations whose endpoints do not exist.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::{BoxStyle, LayoutConfig};
use crate::ir::{Direction, EdgeKind, Group, SizedEdge, SizedGraph, SizedNode};
use crate::sizing::{
    class_sections, context_sections, flow_sections, layered_sections, measure_box,
    measure_edge_label,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFamily {
    /// Flowchart-style boxes with a single label.
    #[default]
    Flow,
    /// Context/container views: title plus technology tag and description.
    Context,
    /// Class boxes with name, attribute and method compartments.
    Class,
    /// Layered architecture views: one-line boxes in full-width bands.
    Layered,
}

impl DiagramFamily {
    pub fn box_style(self, config: &LayoutConfig) -> &BoxStyle {
        match self {
            DiagramFamily::Flow => &config.flow,
            DiagramFamily::Context => &config.context,
            DiagramFamily::Class => &config.class,
            DiagramFamily::Layered => &config.layered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementBody {
    Label {
        text: String,
    },
    Detailed {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        technology: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Compartments {
        name: String,
        #[serde(default)]
        attributes: Vec<String>,
        #[serde(default)]
        methods: Vec<String>,
    },
}

impl ElementBody {
    /// The text a reader identifies the element by.
    pub fn display_text(&self) -> &str {
        match self {
            ElementBody::Label { text } => text,
            ElementBody::Detailed { title, .. } => title,
            ElementBody::Compartments { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Explicit id; derived from the display text when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub body: ElementBody,
    /// Free-form element kind (`person`, `database`, ...) carried through to the output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Element {
    pub fn label(text: impl Into<String>) -> Self {
        Self {
            id: None,
            body: ElementBody::Label { text: text.into() },
            kind: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn identifier(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => identifier_from_label(self.body.display_text()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    /// Hidden relations only influence placement.
    #[serde(default)]
    pub hidden: bool,
}

impl Relation {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
            technology: None,
            hidden: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    #[serde(default)]
    pub family: DiagramFamily,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// Label-derived identifier: surrounding whitespace trimmed, inner whitespace runs
/// replaced by `_`. Two labels mapping to the same identifier collide; the first element
/// wins in layout.
pub fn identifier_from_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join("_")
}

pub fn build_sized_graph(diagram: &Diagram, config: &LayoutConfig) -> SizedGraph {
    let style = diagram.family.box_style(config);
    let mut graph = SizedGraph {
        direction: diagram.direction,
        spacing: config.spacing,
        margin: config.margin,
        groups: diagram.groups.clone(),
        uniform_bands: diagram.family == DiagramFamily::Layered,
        ..SizedGraph::default()
    };

    let mut known: BTreeSet<String> = BTreeSet::new();
    for element in &diagram.elements {
        let id = element.identifier();
        let sections = match (&element.body, diagram.family) {
            (ElementBody::Label { text }, DiagramFamily::Layered) => layered_sections(text, style),
            (ElementBody::Label { text }, _) => flow_sections(text, style),
            (
                ElementBody::Detailed {
                    title,
                    technology,
                    description,
                },
                _,
            ) => context_sections(
                title,
                element.kind.as_deref(),
                technology.as_deref(),
                description.as_deref(),
                style,
            ),
            (
                ElementBody::Compartments {
                    name,
                    attributes,
                    methods,
                },
                _,
            ) => class_sections(name, attributes, methods, style),
        };
        let (width, height) = measure_box(&sections, style);
        if !known.insert(id.clone()) {
            tracing::debug!(id = %id, "duplicate element identifier; first element wins");
        }
        graph.nodes.push(SizedNode {
            id,
            width,
            height,
            label: Some(element.body.display_text().to_string()),
            kind: element.kind.clone(),
        });
    }

    for relation in &diagram.relations {
        if !known.contains(&relation.from) || !known.contains(&relation.to) {
            tracing::debug!(
                from = %relation.from,
                to = %relation.to,
                "dropping relation with unknown endpoint"
            );
            continue;
        }
        let mut edge = SizedEdge::new(relation.from.clone(), relation.to.clone());
        if relation.hidden {
            edge.kind = EdgeKind::Ordering;
        } else if let Some(label) = relation.label.as_deref().filter(|l| !l.trim().is_empty()) {
            let (width, height) =
                measure_edge_label(label, relation.technology.as_deref(), &config.edge_label);
            edge = edge.with_label(label, width, height);
        }
        graph.edges.push(edge);
    }

    tracing::trace!(
        family = ?diagram.family,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        groups = graph.groups.len(),
        "built sized graph"
    );
    graph
}
