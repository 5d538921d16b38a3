/// GPU-accelerated camera image undistortion
///
/// Architecture:
/// - `shaders.rs` - WGSL shader source and binding slots
/// - `pipeline.rs` - wgpu render pipeline, textures and uploads
///
/// The raw grayscale image and its RGBA32F lookup map are uploaded as two
/// textures; the fragment shader uses the lookup to fetch each output pixel.

pub mod pipeline;
pub mod shaders;

pub use pipeline::PipelineState;
