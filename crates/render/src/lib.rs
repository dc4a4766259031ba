//! wgpu render backend for the ray-marching viewer.
//!
//! The host side is deliberately thin: one full-screen quad, one fragment
//! shader that computes the whole image, and a small set of named uniforms
//! republished every frame. Shaders declare their inputs as a single
//! uniform struct at `@group(0)`; the member names are the contract
//! (`u_resolution`, `u_time`, `u_camera_pos`, `u_camera_rot`).
//!
//! # Invariants
//! - The renderer never mutates camera or input state.
//! - A uniform name the bound shader does not declare is logged once and
//!   skipped for the rest of the session, never retried.

mod renderer;
mod shaders;
mod uniforms;

pub use renderer::Renderer;
pub use shaders::DEFAULT_SHADER;
pub use uniforms::{
    ShaderError, UniformBlock, UniformError, UniformPublisher, UniformSink, UniformValue,
    U_CAMERA_POS, U_CAMERA_ROT, U_RESOLUTION, U_TIME,
};
