//! shiftview
//!
//! A small HDR-lit glTF viewer for native windows and the browser. It loads an
//! equirectangular environment and then a model, renders them with wgpu
//! through a post-processing chain ending in a subtle RGB shift, lets the user
//! orbit the camera, and tilts the model towards the pointer with an eased
//! tween.
//!
//! High-level modules
//! - `animation`: easing curves and last-writer-wins tweens
//! - `boot`: the environment-then-model startup sequence
//! - `camera`: camera, projection, uniforms and orbit controls
//! - `config`: startup constants
//! - `context`: GPU device, surface and camera resources
//! - `data_structures`: models, textures, environment maps and the scene graph
//! - `flow`: the winit event loop and render loop
//! - `input`: pointer-to-rotation bridge
//! - `pipelines`: scene and RGB shift render pipelines
//! - `render`: the pass composer
//! - `resources`: asset fetching and glTF/HDR decoding
//!

pub mod animation;
pub mod boot;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;

pub use config::{AssetPaths, Config};
pub use flow::run;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run(Config::default()).map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{:#}", e)))
}
