use anyhow::Result;

use crate::framework::{
    application::Context,
    renderer::{Renderer, RenderPass},
};

use super::{
    scene::Scene,
    modules::{
        LayeredMeshRenderModule,
        StarfieldRenderModule,
    },
};

pub fn define_renderer(context: &Context, exposure: f32) -> Result<Renderer<Scene>> {
    let mut renderer = Renderer::new(context.gpu.clone(), context.window, exposure)?;

    // load modules
    let starfield_module = renderer.register_module(StarfieldRenderModule::new);
    let mesh_module = renderer.register_module(LayeredMeshRenderModule::new);

    // stars are background, everything else is blended over them
    renderer.register_render_pass(RenderPass::base, &[
        starfield_module,
        mesh_module,
    ])?;

    Ok(renderer)
}
