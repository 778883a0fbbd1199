use std::ops::{Index, IndexMut};

use crate::compiler::MatcherId;
use crate::state::SequenceState;
use crate::Captures;

/// Index of a [`Node`] within a [`Pool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl From<NodeId> for usize {
    #[inline]
    fn from(value: NodeId) -> Self {
        value.0 as usize
    }
}

/// An element in a priority list. `better` and `worse` link the node with
/// its siblings, the first node in a list has no `better` sibling.
#[derive(Debug)]
pub(crate) struct Node {
    pub better: Option<NodeId>,
    pub worse: Option<NodeId>,
    pub data: NodeData,
}

impl Node {
    pub fn new(data: NodeData) -> Self {
        Self { better: None, worse: None, data }
    }
}

#[derive(Debug)]
pub(crate) enum NodeData {
    Sequence(Sequence),
    Match(Match),
}

/// A live alternative, waiting at matcher `next`.
#[derive(Debug)]
pub(crate) struct Sequence {
    pub next: MatcherId,
    pub state: SequenceState,
}

/// A match attempt.
///
/// The root of the engine is a match without captures. Every other match
/// node replaces a sequence that reached the end of the pattern, and owns
/// the attempts started after it, which are listed in `head`.
#[derive(Debug)]
pub(crate) struct Match {
    pub generation: u64,
    pub captures: Option<Captures>,
    pub head: Option<NodeId>,
}

/// Arena where the nodes of all the priority lists are allocated.
///
/// Released slots are recycled by later allocations.
#[derive(Debug, Default)]
pub(crate) struct Pool {
    slots: Vec<Option<Node>>,
    free: Vec<NodeId>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a node, reusing a released slot if possible.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[usize::from(id)] = Some(node);
            id
        } else {
            let id = NodeId(self.slots.len() as u32);
            self.slots.push(Some(node));
            id
        }
    }

    /// Releases a single node and returns it. Nodes linked to it are not
    /// affected.
    pub fn release(&mut self, id: NodeId) -> Node {
        let node = self.slots[usize::from(id)]
            .take()
            .unwrap_or_else(|| panic!("releasing dangling node {:?}", id));
        self.free.push(id);
        node
    }

    /// Releases `first` and all its worse siblings, including the lists
    /// owned by match nodes.
    pub fn release_chain(&mut self, first: Option<NodeId>) {
        let mut pending: Vec<NodeId> = first.into_iter().collect();
        while let Some(id) = pending.pop() {
            let node = self.release(id);
            pending.extend(node.worse);
            if let NodeData::Match(Match { head: Some(head), .. }) = node.data
            {
                pending.push(head);
            }
        }
    }

    /// Number of live nodes.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of live sequence nodes.
    pub fn sequences(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|node| matches!(node.data, NodeData::Sequence(_)))
            .count()
    }

    pub fn sequence_mut(&mut self, id: NodeId) -> &mut Sequence {
        match &mut self[id].data {
            NodeData::Sequence(sequence) => sequence,
            NodeData::Match(_) => {
                panic!("node {:?} is a match, not a sequence", id)
            }
        }
    }

    pub fn match_ref(&self, id: NodeId) -> &Match {
        match &self[id].data {
            NodeData::Match(m) => m,
            NodeData::Sequence(_) => {
                panic!("node {:?} is a sequence, not a match", id)
            }
        }
    }

    pub fn match_mut(&mut self, id: NodeId) -> &mut Match {
        match &mut self[id].data {
            NodeData::Match(m) => m,
            NodeData::Sequence(_) => {
                panic!("node {:?} is a sequence, not a match", id)
            }
        }
    }

    #[inline]
    pub fn is_match(&self, id: NodeId) -> bool {
        matches!(self[id].data, NodeData::Match(_))
    }
}

impl Index<NodeId> for Pool {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Self::Output {
        self.slots[usize::from(id)]
            .as_ref()
            .unwrap_or_else(|| panic!("dangling node {:?}", id))
    }
}

impl IndexMut<NodeId> for Pool {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        self.slots[usize::from(id)]
            .as_mut()
            .unwrap_or_else(|| panic!("dangling node {:?}", id))
    }
}
