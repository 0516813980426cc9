//! Scene graph and hierarchical scene organization.
//!
//! A [`Scene`] owns exactly one root [`Node`]. Nodes own their children, carry
//! a local transform and an optional payload (mesh or light). Nodes are only
//! ever added: a [`NodeId`] stays valid for the lifetime of the scene, which
//! is what animation bindings and the GPU mirror key on.

use log::warn;

use crate::data_structures::{
    instance::Instance,
    model::{Geometry, Material},
    texture::{TextureAsset, TextureHandle},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
    const DETACHED: NodeId = NodeId(u32::MAX);
}

/// Light sources. Positions are taken from the owning node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    /// Shines from the node position towards the origin.
    Directional {
        color: [f32; 3],
        intensity: f32,
    },
    /// `distance` of zero means no attenuation cut-off.
    Point {
        color: [f32; 3],
        intensity: f32,
        distance: f32,
    },
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
}

#[derive(Clone, Debug, Default)]
pub enum Payload {
    #[default]
    Group,
    Mesh(Mesh),
    Light(Light),
}

#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    pub name: String,
    pub local: Instance,
    world: Instance,
    pub payload: Payload,
    children: Vec<Node>,
}

impl Node {
    pub fn group(name: impl Into<String>) -> Self {
        Self::with_payload(name, Payload::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self::with_payload(name, Payload::Mesh(Mesh { geometry, material }))
    }

    pub fn light(name: impl Into<String>, light: Light) -> Self {
        Self::with_payload(name, Payload::Light(light))
    }

    fn with_payload(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            id: NodeId::DETACHED,
            name: name.into(),
            local: Instance::default(),
            world: Instance::default(),
            payload,
            children: Vec::new(),
        }
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.local.position = cgmath::Vector3::new(x, y, z);
        self
    }

    pub fn transformed(mut self, local: Instance) -> Self {
        self.local = local;
        self
    }

    /// Appends a child to a node that is not yet part of a scene.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn world_transform(&self) -> &Instance {
        &self.world
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.payload {
            Payload::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Depth-first, parents before children.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    fn assign_ids(&mut self, next_id: &mut u32) {
        self.id = NodeId(*next_id);
        *next_id += 1;
        for child in &mut self.children {
            child.assign_ids(next_id);
        }
    }

    fn update_world_transforms(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        let world = self.world;
        for child in &mut self.children {
            child.update_world_transforms(&world);
        }
    }
}

/// The top-level container: one root node, the texture table and the background.
#[derive(Debug)]
pub struct Scene {
    root: Node,
    next_id: u32,
    textures: Vec<TextureAsset>,
    background: Option<TextureHandle>,
}

impl Scene {
    pub fn new() -> Self {
        let mut root = Node::group("scene");
        let mut next_id = 0;
        root.assign_ids(&mut next_id);
        Self {
            root,
            next_id,
            textures: Vec::new(),
            background: None,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Attach `node` (and its subtree) under the root.
    pub fn add(&mut self, mut node: Node) -> NodeId {
        node.assign_ids(&mut self.next_id);
        let id = node.id;
        self.root.children.push(node);
        id
    }

    /// Attach `node` under `parent`. Returns `None` if `parent` is unknown.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Option<NodeId> {
        let id = self.attach(parent, node);
        if id.is_none() {
            warn!("Cannot attach a node to unknown parent {:?}", parent);
        }
        id
    }

    fn attach(&mut self, parent: NodeId, mut node: Node) -> Option<NodeId> {
        let parent = self.root.find_mut(parent)?;
        node.assign_ids(&mut self.next_id);
        let id = node.id;
        parent.children.push(node);
        Some(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.root.find_mut(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Node> {
        let mut found = None;
        self.root.visit(&mut |node| {
            if found.is_none() && node.name == name {
                found = Some(node);
            }
        });
        found
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        let mut count = 0;
        self.root.visit(&mut |_| count += 1);
        count
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    pub fn update_world_transforms(&mut self) {
        self.root.update_world_transforms(&Instance::default());
    }

    pub fn add_texture(&mut self, texture: TextureAsset) -> TextureHandle {
        self.textures.push(texture);
        TextureHandle(self.textures.len() - 1)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureAsset> {
        self.textures.get(handle.0)
    }

    pub fn texture_mut(&mut self, handle: TextureHandle) -> Option<&mut TextureAsset> {
        self.textures.get_mut(handle.0)
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureHandle, &TextureAsset)> {
        self.textures
            .iter()
            .enumerate()
            .map(|(idx, texture)| (TextureHandle(idx), texture))
    }

    pub fn background(&self) -> Option<TextureHandle> {
        self.background
    }

    pub fn set_background(&mut self, background: Option<TextureHandle>) {
        self.background = background;
    }

    /// Lights with their world positions.
    pub fn lights(&self) -> Vec<(Light, cgmath::Vector3<f32>)> {
        let mut lights = Vec::new();
        self.root.visit(&mut |node| {
            if let Payload::Light(light) = node.payload {
                lights.push((light, node.world.position));
            }
        });
        lights
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
