use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB", alias = "TD")]
    TopDown,
    #[serde(rename = "LR")]
    LeftRight,
}

impl Direction {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::TopDown => "TB",
            Self::LeftRight => "LR",
        }
    }
}

/// Whether an edge is drawn or only steers rank placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Real,
    Ordering,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizedNode {
    pub id: String,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl SizedNode {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            label: None,
            kind: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizedEdge {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_height: Option<f64>,
    #[serde(default)]
    pub kind: EdgeKind,
}

impl SizedEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
            label_width: None,
            label_height: None,
            kind: EdgeKind::Real,
        }
    }

    pub fn ordering(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: EdgeKind::Ordering,
            ..Self::new(source, target)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>, width: f64, height: f64) -> Self {
        self.label = Some(label.into());
        self.label_width = Some(width);
        self.label_height = Some(height);
        self
    }

    /// Reserved label box, if the edge carries a label with a usable size.
    pub fn label_size(&self) -> Option<(f64, f64)> {
        self.label.as_ref()?;
        let width = self.label_width.unwrap_or(0.0).max(0.0);
        let height = self.label_height.unwrap_or(0.0).max(0.0);
        Some((width, height))
    }
}

/// A container in the group forest. Children are owned; there are no parent links.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, alias = "memberNodeIds")]
    pub members: Vec<String>,
    #[serde(default, alias = "childGroups")]
    pub children: Vec<Group>,
}

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members.extend(members.into_iter().map(Into::into));
        self
    }

    pub fn with_child(mut self, child: Group) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    pub node: f64,
    pub rank: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            node: 50.0,
            rank: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub x: f64,
    pub y: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self { x: 20.0, y: 20.0 }
    }
}

/// Input to the layout core: nodes with precomputed sizes, edges, and the group forest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizedGraph {
    #[serde(default)]
    pub nodes: Vec<SizedNode>,
    #[serde(default)]
    pub edges: Vec<SizedEdge>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub spacing: Spacing,
    #[serde(default)]
    pub margin: Margin,
    /// Stack top-level groups as bands sharing one x-origin and width.
    #[serde(default)]
    pub uniform_bands: bool,
}

impl SizedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: &str, width: f64, height: f64) -> &mut SizedNode {
        self.nodes.push(SizedNode::new(id, width, height));
        let last = self.nodes.len() - 1;
        &mut self.nodes[last]
    }

    pub fn add_edge(&mut self, source: &str, target: &str) -> &mut SizedEdge {
        self.edges.push(SizedEdge::new(source, target));
        let last = self.edges.len() - 1;
        &mut self.edges[last]
    }

    /// Nothing to lay out and nothing to validate.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_accepts_td_alias() {
        let direction: Direction = serde_json::from_str(r#""TD""#).unwrap();
        assert_eq!(direction, Direction::TopDown);
        assert_eq!(Direction::TopDown.as_token(), "TB");
        assert!(serde_json::from_str::<Direction>(r#""RL""#).is_err());
    }

    #[test]
    fn deserializes_minimal_graph_with_defaults() {
        let json = r#"{
            "nodes": [{"id": "A", "width": 100, "height": 50}],
            "edges": [{"source": "A", "target": "A", "kind": "ordering"}],
            "groups": [{"id": "g", "memberNodeIds": ["A"], "childGroups": []}],
            "direction": "TB"
        }"#;
        let graph: SizedGraph = serde_json::from_str(json).unwrap();
        assert_eq!(graph.nodes[0].width, 100.0);
        assert_eq!(graph.edges[0].kind, EdgeKind::Ordering);
        assert_eq!(graph.groups[0].members, vec!["A"]);
        assert_eq!(graph.spacing, Spacing::default());
        assert!(!graph.uniform_bands);
    }

    #[test]
    fn label_size_requires_label() {
        let plain = SizedEdge::new("a", "b");
        assert_eq!(plain.label_size(), None);
        let labeled = SizedEdge::new("a", "b").with_label("calls", 40.0, 18.0);
        assert_eq!(labeled.label_size(), Some((40.0, 18.0)));
    }

    #[test]
    fn edges_alone_are_not_empty() {
        let mut graph = SizedGraph::new();
        assert!(graph.is_empty());
        graph.add_edge("a", "b");
        assert!(!graph.is_empty());
    }
}
