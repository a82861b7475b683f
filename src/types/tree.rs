//! Constituency trees.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::span::Span;
use super::term::TermId;
use crate::error::{NafError, Result};

/// Node of a constituency tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Labelled phrase node.
    NonTerminal {
        /// Node id (`nter*`).
        id: String,
        /// Phrase label.
        label: String,
        /// Children in surface order.
        children: Vec<TreeNode>,
        /// Id of the edge to the parent.
        edge_id: Option<String>,
        /// Whether the edge to the parent is marked head.
        head: bool,
    },
    /// Leaf over one or more terms.
    Terminal {
        /// Node id (`ter*`).
        id: String,
        /// Covered terms.
        span: Span<TermId>,
        /// Id of the edge to the parent.
        edge_id: Option<String>,
        /// Whether the edge to the parent is marked head.
        head: bool,
    },
}

impl TreeNode {
    /// Node id.
    pub fn id(&self) -> &str {
        match self {
            Self::NonTerminal { id, .. } | Self::Terminal { id, .. } => id,
        }
    }

    /// Id of the edge to the parent.
    pub fn edge_id(&self) -> Option<&str> {
        match self {
            Self::NonTerminal { edge_id, .. } | Self::Terminal { edge_id, .. } => edge_id.as_deref(),
        }
    }

    /// Whether the edge to the parent is marked head.
    pub fn is_head(&self) -> bool {
        match self {
            Self::NonTerminal { head, .. } | Self::Terminal { head, .. } => *head,
        }
    }

    /// Children; empty for terminals.
    pub fn children(&self) -> &[TreeNode] {
        match self {
            Self::NonTerminal { children, .. } => children,
            Self::Terminal { .. } => &[],
        }
    }

    /// This node and its descendants in depth-first pre-order.
    pub fn walk(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children().iter().rev());
        }
        out
    }
}

/// One parent-child edge, as stored in the serialized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEdge<'a> {
    /// Edge id.
    pub id: Option<&'a str>,
    /// Child node id.
    pub from: &'a str,
    /// Parent node id.
    pub to: &'a str,
    /// Head flag.
    pub head: bool,
}

/// Constituency tree, optionally tied to a sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    sentence: Option<u32>,
    root: TreeNode,
}

impl Tree {
    pub(crate) fn new(sentence: Option<u32>, root: TreeNode) -> Self {
        Self { sentence, root }
    }

    /// Sentence number.
    pub fn sentence(&self) -> Option<u32> {
        self.sentence
    }

    /// Root node.
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Every node in depth-first pre-order.
    pub fn nodes(&self) -> Vec<&TreeNode> {
        self.root.walk()
    }

    /// Every term covered by a terminal.
    pub fn terms(&self) -> Vec<&TermId> {
        self.nodes()
            .into_iter()
            .filter_map(|n| match n {
                TreeNode::Terminal { span, .. } => Some(span.targets()),
                TreeNode::NonTerminal { .. } => None,
            })
            .flatten()
            .collect()
    }

    /// Edges in depth-first order.
    pub fn edges(&self) -> Vec<TreeEdge<'_>> {
        let mut out = Vec::new();
        for parent in self.nodes() {
            for child in parent.children() {
                out.push(TreeEdge {
                    id: child.edge_id(),
                    from: child.id(),
                    to: parent.id(),
                    head: child.is_head(),
                });
            }
        }
        out
    }

    /// Rebuild a tree from flat node and edge lists.
    ///
    /// The root is the first non-terminal that is nobody's child. Children keep
    /// the order of their edges.
    pub(crate) fn assemble(
        sentence: Option<u32>,
        nonterminals: Vec<(String, String)>,
        terminals: Vec<(String, Span<TermId>)>,
        edges: &[TreeEdge<'_>],
    ) -> Result<Self> {
        let labels: HashMap<String, String> = nonterminals.iter().cloned().collect();
        let spans: HashMap<String, Span<TermId>> = terminals.into_iter().collect();

        let mut children: HashMap<&str, Vec<&TreeEdge<'_>>> = HashMap::new();
        let mut is_child: HashSet<&str> = HashSet::new();
        for edge in edges {
            for end in [edge.from, edge.to] {
                if !labels.contains_key(end) && !spans.contains_key(end) {
                    return Err(NafError::unresolved("edge", end));
                }
            }
            children.entry(edge.to).or_default().push(edge);
            is_child.insert(edge.from);
        }

        let root_id = nonterminals
            .iter()
            .map(|(id, _)| id.as_str())
            .find(|id| !is_child.contains(id))
            .ok_or_else(|| NafError::malformed("constituency tree has no root"))?;

        let mut seen = HashSet::new();
        let root = build_node(root_id, None, false, &labels, &spans, &children, &mut seen)?;
        Ok(Self::new(sentence, root))
    }
}

fn build_node<'a>(
    id: &'a str,
    edge_id: Option<&str>,
    head: bool,
    labels: &HashMap<String, String>,
    spans: &HashMap<String, Span<TermId>>,
    children: &HashMap<&str, Vec<&TreeEdge<'a>>>,
    seen: &mut HashSet<&'a str>,
) -> Result<TreeNode> {
    if !seen.insert(id) {
        return Err(NafError::malformed(format!("constituency node {} is reached twice", id)));
    }
    let edge_id = edge_id.map(str::to_string);
    if let Some(span) = spans.get(id) {
        return Ok(TreeNode::Terminal {
            id: id.to_string(),
            span: span.clone(),
            edge_id,
            head,
        });
    }
    let label = labels.get(id).cloned().ok_or_else(|| NafError::unresolved("edge", id))?;
    let mut kids = Vec::new();
    for edge in children.get(id).map(Vec::as_slice).unwrap_or_default() {
        kids.push(build_node(edge.from, edge.id, edge.head, labels, spans, children, seen)?);
    }
    Ok(TreeNode::NonTerminal {
        id: id.to_string(),
        label,
        children: kids,
        edge_id,
        head,
    })
}

/// Numeric suffix of a node id, used to order nodes on output.
pub fn id_number(id: &str) -> u64 {
    let digits = &id[id.trim_end_matches(|c: char| c.is_ascii_digit()).len()..];
    digits.parse().unwrap_or(0)
}
