use crate::framework::gpu;

use super::RenderContext;

#[derive(Debug)]
pub enum RenderPass {
    /// Main render pass drawing color values to the screen, using depth buffer
    ///  - with more than one sample per pixel it draws into `color_target` which is resolved into the surface
    Base {
        clear_color:   wgpu::Color,
        color_target:  Option<gpu::MultisampledTarget>,
        depth_texture: gpu::DepthStencilTexture,
    },
}

#[derive(Debug)]
pub struct RenderPassContext<'pass> {
    pub attachment:  &'pass RenderPass,
    pub render_pass: wgpu::RenderPass<'pass>,
}

fn color_target(context: &RenderContext) -> Option<gpu::MultisampledTarget> {
    (context.sample_count > 1).then(|| gpu::MultisampledTarget::new(
        "Base Pass Multisampled Color Target",
        &context.gpu.device,
        &context.surface_config,
        context.sample_count,
    ))
}

fn depth_texture(context: &RenderContext) -> gpu::DepthStencilTexture {
    gpu::DepthStencilTexture::new(
        "Base Pass Depth texture",
        &context.gpu.device,
        &context.surface_config,
        context.sample_count,
    )
}

// Construction
impl RenderPass {

    pub fn base(context: &RenderContext) -> Self {
        Self::Base {
            #[cfg(feature = "white_bg")]
            clear_color: wgpu::Color::WHITE,
            #[cfg(not(feature = "white_bg"))]
            clear_color: wgpu::Color::BLACK,
            color_target: color_target(context),
            depth_texture: depth_texture(context),
        }
    }
}

impl RenderPass {
    pub fn resize(&mut self, context: &RenderContext) {
        match self {
            Self::Base { color_target: target, depth_texture: depth, .. } => {
                *target = color_target(context);
                *depth = depth_texture(context);
            },
        }
    }

    pub fn start<'pass>(
        &'pass self,
        encoder: &'pass mut wgpu::CommandEncoder,
        view: &'pass wgpu::TextureView,
    ) -> RenderPassContext<'pass> {
        match self {
            Self::Base {
                clear_color,
                color_target,
                depth_texture,
            } => {
                // ⬇ multisampled target is drawn into and resolved to the surface view
                let (view, resolve_target) = match color_target {
                    Some(target) => (target.view(), Some(view)),
                    None => (view, None),
                };

                RenderPassContext {
                    attachment: self,
                    render_pass: encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Base Render Pass"),

                        // Color frame buffer
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view,
                            resolve_target,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(*clear_color),
                                store: true
                            }
                        })],

                        // Depth buffer used in depth testing of this pass
                        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                            view: &depth_texture.texture().view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: true,
                            }),
                            stencil_ops: None,
                        }),
                    })
                }
            },
        }
    }
}
