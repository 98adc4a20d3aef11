//! Scene data: models, textures, environments, transforms and the scene graph.
//!
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `environment` holds the HDR environment map used for lighting
//! - `transform` holds node transformation data
//! - `scene_graph` enables hierarchical scene organization

pub mod environment;
pub mod model;
pub mod scene_graph;
pub mod texture;
pub mod transform;
