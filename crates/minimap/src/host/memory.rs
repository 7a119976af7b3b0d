//! In-memory host used by the demo driver and the test suites.

use std::collections::HashMap;

use crate::geometry::{Vec2, Vec3};
use crate::locator::SceneGraph;

use super::{
    Anchor, ImageRef, LocateError, OverlaySurface, PrimitiveDesc, PrimitiveId, PrimitiveKind,
    SceneHandle, SceneNode,
};

#[derive(Debug, Clone)]
struct MemoryNode {
    name: String,
    parent: Option<SceneHandle>,
    children: Vec<SceneHandle>,
    position: Vec3,
    yaw_degrees: f32,
    active: bool,
    image: Option<ImageRef>,
    text: Option<String>,
}

/// Scene graph backed by a flat node table. Roots are looked up by name in
/// creation order.
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: HashMap<u64, MemoryNode>,
    roots: Vec<SceneHandle>,
    next_id: u64,
    faulting: bool,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, name: &str) -> SceneHandle {
        let handle = self.insert(name, None);
        self.roots.push(handle);
        handle
    }

    pub fn add_child(&mut self, parent: SceneHandle, name: &str) -> SceneHandle {
        let handle = self.insert(name, Some(parent));
        if let Some(node) = self.nodes.get_mut(&parent.0) {
            node.children.push(handle);
        }
        handle
    }

    /// Creates every missing segment of `path` and returns the last node.
    pub fn ensure_path(&mut self, path: &[&str]) -> Option<SceneHandle> {
        let (first, rest) = path.split_first()?;
        let mut current = match self.root_named(first) {
            Some(handle) => handle,
            None => self.add_root(first),
        };
        for segment in rest {
            current = match self.child_named(current, segment) {
                Some(handle) => handle,
                None => self.add_child(current, segment),
            };
        }
        Some(current)
    }

    /// Destroys the node and its whole subtree. Outstanding handles go stale.
    pub fn remove(&mut self, handle: SceneHandle) -> bool {
        let Some(node) = self.nodes.remove(&handle.0) else {
            return false;
        };
        self.roots.retain(|root| *root != handle);
        if let Some(parent) = node.parent.and_then(|parent| self.nodes.get_mut(&parent.0)) {
            parent.children.retain(|child| *child != handle);
        }
        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.nodes.remove(&child.0) {
                pending.extend(removed.children);
            }
        }
        true
    }

    pub fn set_position(&mut self, handle: SceneHandle, position: Vec3) {
        if let Some(node) = self.nodes.get_mut(&handle.0) {
            node.position = position;
        }
    }

    pub fn set_yaw(&mut self, handle: SceneHandle, yaw_degrees: f32) {
        if let Some(node) = self.nodes.get_mut(&handle.0) {
            node.yaw_degrees = yaw_degrees;
        }
    }

    pub fn set_active(&mut self, handle: SceneHandle, active: bool) {
        if let Some(node) = self.nodes.get_mut(&handle.0) {
            node.active = active;
        }
    }

    pub fn set_image(&mut self, handle: SceneHandle, image: Option<ImageRef>) {
        if let Some(node) = self.nodes.get_mut(&handle.0) {
            node.image = image;
        }
    }

    pub fn set_text(&mut self, handle: SceneHandle, text: &str) {
        if let Some(node) = self.nodes.get_mut(&handle.0) {
            node.text = Some(text.to_string());
        }
    }

    /// While set, every root lookup fails as a host fault.
    pub fn set_faulting(&mut self, faulting: bool) {
        self.faulting = faulting;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn insert(&mut self, name: &str, parent: Option<SceneHandle>) -> SceneHandle {
        let handle = SceneHandle(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.nodes.insert(
            handle.0,
            MemoryNode {
                name: name.to_string(),
                parent,
                children: Vec::new(),
                position: Vec3::default(),
                yaw_degrees: 0.0,
                active: true,
                image: None,
                text: None,
            },
        );
        handle
    }

    fn root_named(&self, name: &str) -> Option<SceneHandle> {
        self.roots
            .iter()
            .copied()
            .find(|root| self.nodes.get(&root.0).is_some_and(|node| node.name == name))
    }

    fn child_named(&self, parent: SceneHandle, name: &str) -> Option<SceneHandle> {
        let node = self.nodes.get(&parent.0)?;
        node.children
            .iter()
            .copied()
            .find(|child| self.nodes.get(&child.0).is_some_and(|node| node.name == name))
    }
}

impl SceneGraph for MemoryScene {
    fn root(&self, name: &str) -> Result<Option<SceneHandle>, LocateError> {
        if self.faulting {
            return Err(LocateError::HostFault {
                segment: name.to_string(),
                reason: "scene graph unavailable".to_string(),
            });
        }
        Ok(self.root_named(name))
    }

    fn child(&self, parent: SceneHandle, name: &str) -> Result<Option<SceneHandle>, LocateError> {
        Ok(self.child_named(parent, name))
    }

    fn children(&self, parent: SceneHandle) -> Result<Vec<SceneHandle>, LocateError> {
        Ok(self
            .nodes
            .get(&parent.0)
            .map(|node| node.children.clone())
            .unwrap_or_default())
    }

    fn node(&self, handle: SceneHandle) -> Option<SceneNode> {
        self.nodes.get(&handle.0).map(|node| SceneNode {
            name: node.name.clone(),
            position: node.position,
            yaw_degrees: node.yaw_degrees,
            active: node.active,
        })
    }

    fn image(&self, handle: SceneHandle) -> Option<ImageRef> {
        self.nodes.get(&handle.0).and_then(|node| node.image)
    }

    fn text(&self, handle: SceneHandle) -> Option<String> {
        self.nodes.get(&handle.0).and_then(|node| node.text.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveRecord {
    pub desc: PrimitiveDesc,
    pub visible: bool,
    pub enabled: bool,
    pub image: Option<ImageRef>,
    /// Every value passed to `set_enabled`, in order.
    pub enabled_history: Vec<bool>,
    children: Vec<PrimitiveId>,
}

#[derive(Debug, Default)]
pub struct MemorySurface {
    primitives: HashMap<PrimitiveId, PrimitiveRecord>,
    next_id: u64,
    created_total: u64,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, id: PrimitiveId) -> Option<&PrimitiveRecord> {
        self.primitives.get(&id)
    }

    pub fn alive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn created_total(&self) -> u64 {
        self.created_total
    }

    pub fn children_of(&self, id: PrimitiveId) -> Vec<PrimitiveId> {
        self.primitives
            .get(&id)
            .map(|record| record.children.clone())
            .unwrap_or_default()
    }

    pub fn find_by_name(&self, name: &str) -> Vec<PrimitiveId> {
        let mut ids = self
            .primitives
            .iter()
            .filter(|(_, record)| record.desc.name == name)
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();
        ids.sort();
        ids
    }

    fn with_record(&mut self, id: PrimitiveId, apply: impl FnOnce(&mut PrimitiveRecord)) {
        if let Some(record) = self.primitives.get_mut(&id) {
            apply(record);
        }
    }
}

impl OverlaySurface for MemorySurface {
    fn create(&mut self, desc: PrimitiveDesc) -> PrimitiveId {
        let id = PrimitiveId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.created_total = self.created_total.saturating_add(1);
        if let Some(parent) = desc.parent.and_then(|parent| self.primitives.get_mut(&parent)) {
            parent.children.push(id);
        }
        let image = match &desc.kind {
            PrimitiveKind::Image { image, .. } => *image,
            _ => None,
        };
        self.primitives.insert(
            id,
            PrimitiveRecord {
                desc,
                visible: true,
                enabled: true,
                image,
                enabled_history: Vec::new(),
                children: Vec::new(),
            },
        );
        id
    }

    fn destroy(&mut self, id: PrimitiveId) {
        let Some(record) = self.primitives.remove(&id) else {
            return;
        };
        if let Some(parent) = record
            .desc
            .parent
            .and_then(|parent| self.primitives.get_mut(&parent))
        {
            parent.children.retain(|child| *child != id);
        }
        let mut pending = record.children;
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.primitives.remove(&child) {
                pending.extend(removed.children);
            }
        }
    }

    fn is_alive(&self, id: PrimitiveId) -> bool {
        self.primitives.contains_key(&id)
    }

    fn anchored_position(&self, id: PrimitiveId) -> Option<Vec2> {
        self.primitives
            .get(&id)
            .map(|record| record.desc.anchored_position)
    }

    fn set_anchored_position(&mut self, id: PrimitiveId, position: Vec2) {
        self.with_record(id, |record| record.desc.anchored_position = position);
    }

    fn set_size(&mut self, id: PrimitiveId, size: Vec2) {
        self.with_record(id, |record| record.desc.size = size);
    }

    fn set_anchor(&mut self, id: PrimitiveId, anchor: Anchor) {
        self.with_record(id, |record| record.desc.anchor = anchor);
    }

    fn set_visible(&mut self, id: PrimitiveId, visible: bool) {
        self.with_record(id, |record| record.visible = visible);
    }

    fn set_image(&mut self, id: PrimitiveId, image: ImageRef) {
        self.with_record(id, |record| record.image = Some(image));
    }

    fn set_enabled(&mut self, id: PrimitiveId, enabled: bool) {
        self.with_record(id, |record| {
            record.enabled = enabled;
            record.enabled_history.push(enabled);
        });
    }

    fn set_text(&mut self, id: PrimitiveId, text: &str) {
        self.with_record(id, |record| {
            if let PrimitiveKind::Text { text: current, .. } = &mut record.desc.kind {
                *current = text.to_string();
            }
        });
    }
}
