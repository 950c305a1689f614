//! WebGPU rendering module
//!
//! The scene is tessellated on the CPU into one colored triangle list per
//! frame and drawn with a single pass.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderInitError, RenderState};
pub use vertex::Vertex;
