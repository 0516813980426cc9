//! Scene data structures: nodes, meshes, materials, textures and transforms.
//!
//! - `instance` holds node transforms and their per-draw GPU layout
//! - `model` contains geometry and material definitions
//! - `primitives` generates the procedural box, sphere, cylinder and plane
//! - `scene_graph` is the node tree the showcase renders
//! - `texture` contains texture assets and their GPU counterparts

pub mod instance;
pub mod model;
pub mod primitives;
pub mod scene_graph;
pub mod texture;
