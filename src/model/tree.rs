//! Arena-backed node tree.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`]. The
//! flattened display sequence is derived on demand from expansion and
//! filter state.

use super::error::TreeError;
use super::node::{Node, NodeId, NodeSpec, NodeStatus, Selection};
use std::collections::{HashMap, HashSet};

/// Hierarchical node collection with multiple top-level nodes.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    keys: HashMap<String, NodeId>,
    next_auto_key: u64,
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from top-level specs.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DuplicateKey`] if two specs share a key.
    pub fn from_specs(specs: Vec<NodeSpec>) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        tree.add_children(None, specs)?;
        Ok(tree)
    }

    /// Append subtrees below `parent`, or at top level for `None`.
    ///
    /// Keys are validated before anything is inserted, so a failed call
    /// leaves the tree unchanged.
    ///
    /// # Errors
    ///
    /// - [`TreeError::UnknownNode`] if `parent` is not in this tree
    /// - [`TreeError::DuplicateKey`] if a key is already used
    pub fn add_children(
        &mut self,
        parent: Option<NodeId>,
        specs: Vec<NodeSpec>,
    ) -> Result<Vec<NodeId>, TreeError> {
        if let Some(parent) = parent {
            self.check(parent)?;
        }
        let mut seen = HashSet::new();
        check_keys(&specs, &self.keys, &mut seen)?;

        let level = parent.map_or(0, |p| self.nodes[p.get()].level + 1);
        let mut added = Vec::with_capacity(specs.len());
        for spec in specs {
            added.push(self.insert(parent, level, spec));
        }
        match parent {
            Some(p) => self.nodes[p.get()].children.extend(added.iter().copied()),
            None => self.roots.extend(added.iter().copied()),
        }
        Ok(added)
    }

    fn insert(&mut self, parent: Option<NodeId>, level: usize, spec: NodeSpec) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        let key = match spec.key {
            Some(key) => key,
            None => self.generate_key(),
        };
        self.keys.insert(key.clone(), id);
        // A lazy node that already ships children is treated as loaded.
        let lazy = spec.lazy && spec.children.is_empty();
        self.nodes.push(Node {
            key,
            title: spec.title,
            parent,
            children: Vec::new(),
            level,
            expanded: spec.expanded && !lazy,
            selected: if spec.selected {
                Selection::Checked
            } else {
                Selection::Unchecked
            },
            status: NodeStatus::Ok,
            status_message: None,
            lazy,
            hidden: false,
            node_type: spec.node_type,
            data: spec.data,
            load_generation: 0,
        });
        let children: Vec<NodeId> = spec
            .children
            .into_iter()
            .map(|child| self.insert(Some(id), level + 1, child))
            .collect();
        self.nodes[id.get()].children = children;
        id
    }

    fn generate_key(&mut self) -> String {
        loop {
            self.next_auto_key += 1;
            let key = format!("_{}", self.next_auto_key);
            if !self.keys.contains_key(&key) {
                return key;
            }
        }
    }

    fn check(&self, id: NodeId) -> Result<(), TreeError> {
        if id.get() < self.nodes.len() {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(id))
        }
    }

    /// Number of nodes, including collapsed and hidden ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.get())
    }

    /// Look up a node, failing for ids from another tree.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if the id is out of range.
    pub fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.get(id).ok_or(TreeError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(id.get()).ok_or(TreeError::UnknownNode(id))
    }

    /// Find a node by key.
    pub fn find_by_key(&self, key: &str) -> Option<NodeId> {
        self.keys.get(key).copied()
    }

    /// Top-level nodes in display order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Whether `id` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.get(id).and_then(|n| n.parent);
        std::iter::from_fn(move || {
            let next = current?;
            current = self.get(next).and_then(|n| n.parent);
            Some(next)
        })
    }

    /// All descendants of `id` in depth-first order, collapsed or not.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(id) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.get()].children.iter().rev().copied());
        }
        out
    }

    /// Flattened display sequence.
    ///
    /// A node appears when every ancestor is expanded. Hidden nodes and
    /// their subtrees are skipped unless `include_hidden` is set.
    pub fn visible_nodes(&self, include_hidden: bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.get()];
            if node.hidden && !include_hidden {
                continue;
            }
            out.push(id);
            if node.expanded {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Whether every ancestor of `id` is expanded.
    pub fn is_reachable(&self, id: NodeId) -> bool {
        self.ancestors(id)
            .all(|a| self.nodes[a.get()].expanded && !self.nodes[a.get()].hidden)
    }

    /// Set the filter flag for a node.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for foreign ids.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> Result<bool, TreeError> {
        let node = self.node_mut(id)?;
        let changed = node.hidden != hidden;
        node.hidden = hidden;
        Ok(changed)
    }

    /// Expand or collapse every node that has loaded children.
    ///
    /// Returns the nodes whose flag changed.
    pub fn set_expanded_all(&mut self, expanded: bool) -> Vec<NodeId> {
        let mut changed = Vec::new();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if node.has_children() && node.expanded != expanded {
                node.expanded = expanded;
                changed.push(NodeId::new(index));
            }
        }
        changed
    }

    /// Set a node's checkbox value.
    ///
    /// With `cascade`, descendants take the same value and ancestors are
    /// recomputed to checked, unchecked or partial. Returns every node
    /// whose value changed.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for foreign ids.
    pub fn set_selection(
        &mut self,
        id: NodeId,
        value: Selection,
        cascade: bool,
    ) -> Result<Vec<NodeId>, TreeError> {
        let node = self.node_mut(id)?;
        let mut changed = Vec::new();
        if node.selected != value {
            node.selected = value;
            changed.push(id);
        }
        if !cascade || value == Selection::Partial {
            return Ok(changed);
        }

        for child in self.descendants(id) {
            let node = &mut self.nodes[child.get()];
            if node.selected != value {
                node.selected = value;
                changed.push(child);
            }
        }

        let ancestors: Vec<NodeId> = self.ancestors(id).collect();
        for ancestor in ancestors {
            let aggregated = Selection::aggregate(
                self.nodes[ancestor.get()]
                    .children
                    .iter()
                    .map(|c| self.nodes[c.get()].selected),
            );
            let Some(aggregated) = aggregated else { break };
            let node = &mut self.nodes[ancestor.get()];
            if node.selected == aggregated {
                break;
            }
            node.selected = aggregated;
            changed.push(ancestor);
        }
        Ok(changed)
    }

    /// Recompute every parent's checkbox value from its children.
    ///
    /// Used after bulk construction when selection cascades.
    pub fn recompute_selection(&mut self) {
        let order: Vec<NodeId> = self
            .roots
            .clone()
            .into_iter()
            .flat_map(|r| std::iter::once(r).chain(self.descendants(r)))
            .collect();
        for id in order.into_iter().rev() {
            let aggregated = Selection::aggregate(
                self.nodes[id.get()]
                    .children
                    .iter()
                    .map(|c| self.nodes[c.get()].selected),
            );
            if let Some(value) = aggregated {
                self.nodes[id.get()].selected = value;
            }
        }
    }
}

fn check_keys(
    specs: &[NodeSpec],
    existing: &HashMap<String, NodeId>,
    seen: &mut HashSet<String>,
) -> Result<(), TreeError> {
    for spec in specs {
        if let Some(key) = &spec.key {
            if existing.contains_key(key) || !seen.insert(key.clone()) {
                return Err(TreeError::DuplicateKey { key: key.clone() });
            }
        }
        check_keys(&spec.children, existing, seen)?;
    }
    Ok(())
}
