//! In-memory canvas
//!
//! Holds a container and its children, answers discovery, and applies
//! mutations to its own copy. Used by the command-line tool to arrange a
//! saved snapshot, and by tests.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CanvasDiscovery, CanvasError, CanvasMutator, CanvasNode, MutationCall};

/// A container plus its child nodes, in z-order (last is frontmost)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    pub container: CanvasNode,
    #[serde(default)]
    pub nodes: Vec<CanvasNode>,
}

#[derive(Debug, Default)]
pub struct MemoryCanvas {
    container: CanvasNode,
    nodes: Mutex<Vec<CanvasNode>>,
    applied: Mutex<Vec<MutationCall>>,
    rejected_ids: HashSet<String>,
}

impl MemoryCanvas {
    pub fn new(container: CanvasNode, nodes: Vec<CanvasNode>) -> Self {
        Self {
            container,
            nodes: Mutex::new(nodes),
            applied: Mutex::new(Vec::new()),
            rejected_ids: HashSet::new(),
        }
    }

    pub fn from_snapshot(snapshot: CanvasSnapshot) -> Self {
        Self::new(snapshot.container, snapshot.nodes)
    }

    /// Reject every mutation targeting these ids
    pub fn with_rejected<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rejected_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn container_id(&self) -> &str {
        &self.container.id
    }

    /// Current state of the canvas
    pub fn snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            container: self.container.clone(),
            nodes: self.lock_nodes().clone(),
        }
    }

    pub fn node(&self, id: &str) -> Option<CanvasNode> {
        self.lock_nodes().iter().find(|n| n.id == id).cloned()
    }

    /// Every mutation applied so far, in order
    pub fn applied_calls(&self) -> Vec<MutationCall> {
        lock(&self.applied).clone()
    }

    fn lock_nodes(&self) -> MutexGuard<'_, Vec<CanvasNode>> {
        lock(&self.nodes)
    }
}

/// A poisoned lock still holds usable data here
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl CanvasDiscovery for MemoryCanvas {
    async fn container(&self, container_id: &str) -> Result<CanvasNode, CanvasError> {
        if container_id == self.container.id {
            Ok(self.container.clone())
        } else {
            Err(CanvasError::not_found(container_id))
        }
    }

    async fn children(&self, container_id: &str) -> Result<Vec<CanvasNode>, CanvasError> {
        if container_id == self.container.id {
            Ok(self.lock_nodes().clone())
        } else {
            Err(CanvasError::not_found(container_id))
        }
    }

    async fn nodes(&self, ids: &[String]) -> Result<Vec<CanvasNode>, CanvasError> {
        let nodes = self.lock_nodes();
        Ok(ids
            .iter()
            .filter_map(|id| nodes.iter().find(|n| &n.id == id).cloned())
            .collect())
    }
}

#[async_trait]
impl CanvasMutator for MemoryCanvas {
    async fn apply(&self, call: &MutationCall) -> Result<(), CanvasError> {
        let id = call.element_id();
        if self.rejected_ids.contains(id) {
            return Err(CanvasError::rejected(format!("node '{}' is locked", id)));
        }

        let mut nodes = self.lock_nodes();
        let index = nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| CanvasError::not_found(id))?;

        match call {
            MutationCall::Move { x, y, .. } => nodes[index].set_position(*x, *y),
            MutationCall::Resize { width, height, .. } => nodes[index].set_size(*width, *height),
            MutationCall::CornerRadius { radius, .. } => nodes[index].corner_radius = Some(*radius),
            MutationCall::BringToFront { .. } => {
                let node = nodes.remove(index);
                nodes.push(node);
            }
        }
        drop(nodes);

        lock(&self.applied).push(call.clone());
        Ok(())
    }
}
