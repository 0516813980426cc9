//! flow-showcase
//!
//! A small demo scene rendered with wgpu on native and on the web: an
//! equirectangular background, a textured ground plane, three primitives, an
//! OBJ model loaded at runtime, a keyframed rotation of the cube, and a camera
//! that can be orbited with the mouse and tuned from an egui panel.
//!
//! High-level modules
//! - `camera`: perspective camera, its uniform and the orbit controls
//! - `config`: asset paths and scene constants, with environment overrides
//! - `context`: window, device, pipelines and the GPU copy of the scene
//! - `data_structures`: scene graph, meshes, materials, textures and transforms
//! - `flow`: the frame loop and the winit application
//! - `gui`: sliders bound to camera fields and the near/far pair helper
//! - `pipelines`: render pipelines for meshes and the background, and the egui overlay
//! - `render`: lazily created GPU buffers for scene nodes
//! - `resources`: asset sources, texture/OBJ loading, animation and the load queue
//! - `showcase`: assembling the scene and reacting to input and loads
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod gui;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod showcase;

pub use config::ShowcaseConfig;
pub use flow::run;
pub use showcase::Showcase;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point of the web build.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run(ShowcaseConfig::from_env()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
