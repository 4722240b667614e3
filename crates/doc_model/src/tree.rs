//! Document tree storage
//!
//! Nodes live in an arena indexed by [`NodeId`]; parent back-references
//! live in a parallel table filled by [`DocumentTree::link_parents`] after
//! construction, which keeps the object graph acyclic while preserving
//! O(1) upward lookup. The tree also owns the catalogs built during the
//! same parse.

use crate::{
    DocumentProps, DocumentSettings, Node, NodeId, NodeKind, NumberingCatalog, StyleCatalog,
};
use serde::{Deserialize, Serialize};

/// The complete parsed document: node arena plus catalogs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    root: NodeId,
    pub styles: StyleCatalog,
    pub numbering: NumberingCatalog,
    pub settings: DocumentSettings,
}

impl DocumentTree {
    /// Create a tree holding only a document root.
    pub fn new() -> Self {
        let root = Node::new(NodeKind::Document(DocumentProps::default()));
        Self {
            nodes: vec![root],
            parents: vec![None],
            root: NodeId(0),
            styles: StyleCatalog::new(),
            numbering: NumberingCatalog::new(),
            settings: DocumentSettings::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node to the arena without attaching it anywhere.
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.parents.push(None);
        id
    }

    /// Append a node and record it as the last child of `parent`.
    pub fn push_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.push(node);
        self.nodes[parent.index()].children.push(id);
        self.parents[id.index()] = Some(parent);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Top-level body nodes (children of the document root).
    pub fn body(&self) -> &[NodeId] {
        self.children(self.root)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.index()]
    }

    /// Rebuild the parent table from the forward links, walking from the
    /// root. After this pass the table is consistent with every child list
    /// reachable from the root; detached nodes keep `None`.
    pub fn link_parents(&mut self) {
        for parent in &mut self.parents {
            *parent = None;
        }
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            for i in 0..self.nodes[id.index()].children.len() {
                let child = self.nodes[id.index()].children[i];
                self.parents[child.index()] = Some(id);
                stack.push(child);
            }
        }
    }

    /// Depth-first walk of the subtree rooted at `id`, `id` included.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Concatenated text content of the subtree rooted at `id`.
    pub fn text_of(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node_id in self.descendants(id) {
            if let Some(text) = self.node(node_id).text_content() {
                out.push_str(text);
            }
        }
        out
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParagraphNodeProps, RunNodeProps};

    fn paragraph() -> Node {
        Node::new(NodeKind::Paragraph(ParagraphNodeProps::default()))
    }

    fn run() -> Node {
        Node::new(NodeKind::Run(RunNodeProps::default()))
    }

    #[test]
    fn test_push_child_links_both_directions() {
        let mut tree = DocumentTree::new();
        let para = tree.push_child(tree.root(), paragraph());
        let run_id = tree.push_child(para, run());

        assert_eq!(tree.body(), &[para]);
        assert_eq!(tree.children(para), &[run_id]);
        assert_eq!(tree.parent(run_id), Some(para));
        assert_eq!(tree.parent(para), Some(tree.root()));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_link_parents_rebuilds_table() {
        let mut tree = DocumentTree::new();
        let para = tree.push_child(tree.root(), paragraph());
        let run_id = tree.push_child(para, run());
        let text = tree.push_child(run_id, Node::text("x"));

        // Detach a run node manually and build a replacement paragraph
        // referencing it; the pass must follow the new forward links.
        let para2 = tree.push(paragraph());
        tree.node_mut(tree.root()).children.push(para2);
        tree.node_mut(para).children.clear();
        tree.node_mut(para2).children.push(run_id);

        tree.link_parents();
        assert_eq!(tree.parent(run_id), Some(para2));
        assert_eq!(tree.parent(text), Some(run_id));
        assert_eq!(tree.parent(para2), Some(tree.root()));
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = DocumentTree::new();
        let para = tree.push_child(tree.root(), paragraph());
        let run_a = tree.push_child(para, run());
        let text_a = tree.push_child(run_a, Node::text("a"));
        let run_b = tree.push_child(para, run());

        assert_eq!(tree.descendants(para), vec![para, run_a, text_a, run_b]);
    }

    #[test]
    fn test_text_of_concatenates_in_order() {
        let mut tree = DocumentTree::new();
        let para = tree.push_child(tree.root(), paragraph());
        let run_id = tree.push_child(para, run());
        tree.push_child(run_id, Node::text("hello"));
        tree.push_child(run_id, Node::text(" "));
        tree.push_child(run_id, Node::text("world"));

        assert_eq!(tree.text_of(para), "hello world");
    }

    #[test]
    fn test_tree_serializes_round_trip() {
        let mut tree = DocumentTree::new();
        let para = tree.push_child(tree.root(), paragraph());
        let run_id = tree.push_child(para, run());
        tree.push_child(run_id, Node::text("persisted"));
        tree.numbering.insert(crate::NumberingLevel {
            num_id: "1".to_string(),
            level: 0,
            format: "decimal".to_string(),
            ..Default::default()
        });

        let json = serde_json::to_string(&tree).unwrap();
        let restored: DocumentTree = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.text_of(restored.root()), "persisted");
        assert_eq!(restored.parent(run_id), Some(para));
        assert!(restored.numbering.get("1", 0).is_some());
    }
}
