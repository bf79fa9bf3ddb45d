//! Group forest bookkeeping for recursive layout.
//!
//! The owned `Group` tree is flattened into an arena in depth-first pre-order, with
//! derived parent links and node ownership. Every group and the root form a *scope*
//! whose direct items (member nodes and child groups) are laid out together.

use std::collections::BTreeMap;
use std::fmt;

use super::error::LayoutError;
use super::geometry::{Point, Rect};
use crate::config::GroupStyle;
use crate::ir::Group;

/// `None` is the root scope.
pub(super) type Scope = Option<usize>;

/// A box placed within one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum ScopeItem {
    Node(usize),
    Group(usize),
}

impl fmt::Display for ScopeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeItem::Node(idx) => write!(f, "node #{idx}"),
            ScopeItem::Group(idx) => write!(f, "group #{idx}"),
        }
    }
}

pub(super) struct GroupEntry<'a> {
    pub group: &'a Group,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Node indices owned directly by this group.
    pub members: Vec<usize>,
}

pub(super) struct GroupArena<'a> {
    pub entries: Vec<GroupEntry<'a>>,
    pub roots: Vec<usize>,
    /// Owning group per node index. A node listed twice stays with its first group.
    pub owner: Vec<Option<usize>>,
}

impl<'a> GroupArena<'a> {
    pub fn build(
        groups: &'a [Group],
        node_index: &BTreeMap<&str, usize>,
        node_count: usize,
    ) -> Result<Self, LayoutError> {
        let mut arena = GroupArena {
            entries: Vec::new(),
            roots: Vec::new(),
            owner: vec![None; node_count],
        };
        for group in groups {
            let idx = arena.push(group, None, node_index)?;
            arena.roots.push(idx);
        }
        Ok(arena)
    }

    fn push(
        &mut self,
        group: &'a Group,
        parent: Option<usize>,
        node_index: &BTreeMap<&str, usize>,
    ) -> Result<usize, LayoutError> {
        let idx = self.entries.len();
        self.entries.push(GroupEntry {
            group,
            parent,
            children: Vec::new(),
            members: Vec::new(),
        });
        for member in &group.members {
            let Some(&node) = node_index.get(member.as_str()) else {
                return Err(LayoutError::unknown_group_member(&group.id, member));
            };
            if self.owner[node].is_none() {
                self.owner[node] = Some(idx);
                self.entries[idx].members.push(node);
            }
        }
        for child in &group.children {
            let child_idx = self.push(child, Some(idx), node_index)?;
            self.entries[idx].children.push(child_idx);
        }
        Ok(idx)
    }

    /// Children before parents.
    pub fn post_order(&self) -> Vec<usize> {
        fn visit(arena: &GroupArena<'_>, idx: usize, out: &mut Vec<usize>) {
            for &child in &arena.entries[idx].children {
                visit(arena, child, out);
            }
            out.push(idx);
        }
        let mut out = Vec::with_capacity(self.entries.len());
        for &root in &self.roots {
            visit(self, root, &mut out);
        }
        out
    }

    /// Groups enclosing `node`, outermost first.
    pub fn ancestry(&self, node: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = self.owner[node];
        while let Some(idx) = current {
            chain.push(idx);
            current = self.entries[idx].parent;
        }
        chain.reverse();
        chain
    }

    /// Direct items of a scope: owned nodes in declaration order, then child groups.
    pub fn scope_items(&self, scope: Scope) -> Vec<ScopeItem> {
        match scope {
            Some(idx) => {
                let entry = &self.entries[idx];
                entry
                    .members
                    .iter()
                    .map(|&node| ScopeItem::Node(node))
                    .chain(entry.children.iter().map(|&child| ScopeItem::Group(child)))
                    .collect()
            }
            None => self
                .owner
                .iter()
                .enumerate()
                .filter(|(_, owner)| owner.is_none())
                .map(|(node, _)| ScopeItem::Node(node))
                .chain(self.roots.iter().map(|&root| ScopeItem::Group(root)))
                .collect(),
        }
    }

    /// Innermost scope holding both nodes, and the item standing in for each node there.
    pub fn common_scope(&self, source: usize, target: usize) -> (Scope, ScopeItem, ScopeItem) {
        let source_chain = self.ancestry(source);
        let target_chain = self.ancestry(target);
        let shared = source_chain
            .iter()
            .zip(&target_chain)
            .take_while(|(a, b)| a == b)
            .count();
        let scope = if shared == 0 {
            None
        } else {
            Some(source_chain[shared - 1])
        };
        let representative = |node: usize, chain: &[usize]| match chain.get(shared) {
            Some(&group) => ScopeItem::Group(group),
            None => ScopeItem::Node(node),
        };
        (
            scope,
            representative(source, &source_chain),
            representative(target, &target_chain),
        )
    }
}

/// Size of a group box and where its interior layout lands inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Container {
    pub width: f64,
    pub height: f64,
    /// Added to interior-layout coordinates to get coordinates relative to the group's
    /// top-left corner.
    pub content_offset: Point,
}

/// Bounding box of the interior plus padding on every side and the header band on top.
/// Groups with nothing inside get the placeholder minimum size. Content narrower than the
/// minimum width is centred horizontally.
pub(super) fn size_container(content: Option<Rect>, style: &GroupStyle) -> Container {
    let Some(content) = content else {
        return Container {
            width: style.min_width,
            height: style.min_height,
            content_offset: Point::new(0.0, 0.0),
        };
    };
    let inner_width = content.width + 2.0 * style.padding;
    let width = inner_width.max(style.min_width);
    let height = (content.height + 2.0 * style.padding + style.header_height).max(style.min_height);
    Container {
        width,
        height,
        content_offset: Point::new(
            style.padding + (width - inner_width) / 2.0 - content.x,
            style.header_height + style.padding - content.y,
        ),
    }
}

/// Stretch every band to the shared leftmost origin and rightmost edge.
pub(super) fn normalize_bands(bands: &mut [Rect]) {
    if bands.len() < 2 {
        return;
    }
    let left = bands.iter().map(|band| band.x).fold(f64::INFINITY, f64::min);
    let right = bands
        .iter()
        .map(Rect::right)
        .fold(f64::NEG_INFINITY, f64::max);
    for band in bands {
        band.x = left;
        band.width = right - left;
    }
}
