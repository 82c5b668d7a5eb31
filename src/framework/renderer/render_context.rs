use std::sync::Arc;
use crate::framework::gpu;

use super::Globals;

#[derive(Debug)]
pub struct RenderContext {

    /// A GPU context which is shared with whole application
    pub gpu: Arc<gpu::Context>,

    /// Configuration of surface is renderers responsibility
    pub surface_config: wgpu::SurfaceConfiguration,

    /// A part of surface configuration
    pub scale_factor: f64,

    /// Samples per pixel of color and depth attachments, pipelines have to match it
    pub sample_count: u32,

    /// Multiplier of scene radiance before tone mapping
    pub exposure: f32,

    /// Camera and viewport uniforms shared by all render modules
    pub globals: Globals,
}
