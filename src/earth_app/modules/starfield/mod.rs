use std::{
    borrow::Cow,
    collections::HashMap,
};

use crate::{
    earth_app::scene::Scene,
    framework::{
        gpu::{self, vertices::ColorVertex},
        renderer::{RenderContext, RenderModule, RenderPassContext},
        scene_graph::{DrawList, Geometry, GeometryId, MaterialFlags, Shading},
    },
};

/// Quad corners are generated from vertex index, one instance per star.
const VERTICES_PER_SPRITE: u32 = 6;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PushConstants {
    model:  glam::Mat4,
    /// x: sprite size, y: size attenuation enabled
    params: glam::Vec4,
}

impl PushConstants {
    fn new(model: glam::Mat4, size: f32, flags: MaterialFlags) -> Self {
        let attenuation = if flags.contains(MaterialFlags::SIZE_ATTENUATION) { 1.0 } else { 0.0 };
        Self {
            model,
            params: glam::vec4(size, attenuation, 0.0, 0.0),
        }
    }
}

#[derive(Debug)]
struct SpriteBatch {
    geometry:       GeometryId,
    push_constants: PushConstants,
}

/// Draws point geometries as round camera facing sprites.
#[derive(Debug)]
pub struct StarfieldRenderModule {
    pipeline:         wgpu::RenderPipeline,
    instance_buffers: HashMap<GeometryId, gpu::Buffer<ColorVertex>>,
    batches:          Vec<SpriteBatch>,
}

impl StarfieldRenderModule {

    #[profiler::function]
    pub fn new(context: &RenderContext) -> Self {

        // ⬇ load and compile wgsl shader code
        let shader = context.gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Starfield Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("_shader.wgsl"))),
        });

        // ⬇ define layout of buffers for out render pipeline
        let pipeline_layout = context.gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Starfield Render Pipeline Layout"),
            bind_group_layouts: &[&context.globals.bind_group_layout],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::VERTEX,
                range: 0..std::mem::size_of::<PushConstants>() as u32,
            }],
        });

        let pipeline = context.gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Starfield Render Pipeline"),
            layout: Some(&pipeline_layout),
            // ⬇ every star is one instance, quad corners come from vertex index
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[ColorVertex::instance_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: context.surface_config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            // stars are tested against depth but never occlude anything
            depth_stencil: Some(gpu::DepthStencilTexture::stencil(false)),
            multisample: gpu::multisample_state(context.sample_count),
            multiview: None,
        });

        Self {
            pipeline,
            instance_buffers: HashMap::new(),
            batches: vec![],
        }
    }
}

impl RenderModule<Scene> for StarfieldRenderModule {

    #[profiler::function]
    fn prepare(&mut self, scene: &Scene, context: &RenderContext) {
        let list = DrawList::collect(&scene.graph, &scene.textures, context.globals.camera_position());

        self.batches.clear();
        for item in list.points.iter() {
            let Geometry::Points { points } = item.geometry else {
                continue;
            };
            if points.is_empty() {
                continue;
            }
            let size = match item.material.shading {
                Shading::Points { size } => size,
                _ => 1.0,
            };

            // point positions never change, only the node transform does
            self.instance_buffers.entry(item.geometry_id).or_insert_with(|| {
                gpu::Buffer::new(&context.gpu, Some("Star Instance Buffer"), points, wgpu::BufferUsages::VERTEX)
            });

            self.batches.push(SpriteBatch {
                geometry:       item.geometry_id,
                push_constants: PushConstants::new(item.world, size, item.material.flags),
            });
        }
    }

    #[profiler::function]
    fn render<'pass, 'a: 'pass>(
        &'a self,
        context: &'a RenderContext,
        render_pass_context: &mut RenderPassContext<'pass>,
    ) {
        let render_pass = &mut render_pass_context.render_pass;
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &context.globals.bind_group, &[]);

        for batch in &self.batches {
            profiler::scope!("Draw star batch");
            let Some(instances) = self.instance_buffers.get(&batch.geometry) else {
                continue;
            };
            render_pass.set_push_constants(wgpu::ShaderStages::VERTEX, 0, bytemuck::cast_slice(&[batch.push_constants]));
            render_pass.set_vertex_buffer(0, instances.buffer.slice(..));
            render_pass.draw(0..VERTICES_PER_SPRITE, 0..instances.size as u32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attenuation_flag_reaches_push_constants() {
        let attenuated = PushConstants::new(glam::Mat4::IDENTITY, 0.2, MaterialFlags::SIZE_ATTENUATION);
        let fixed = PushConstants::new(glam::Mat4::IDENTITY, 3.0, MaterialFlags::VERTEX_COLORS);
        assert_eq!(attenuated.params, glam::vec4(0.2, 1.0, 0.0, 0.0));
        assert_eq!(fixed.params.y, 0.0);
        assert!(std::mem::size_of::<PushConstants>() <= 128);
    }
}
