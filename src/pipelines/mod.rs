//! Render pipelines and their WGSL sources.
//!
//! - `basic`: the lit scene pipeline drawing glTF meshes
//! - `rgb_shift`: the fullscreen chromatic offset used as the final post pass

pub mod basic;
pub mod rgb_shift;
