use std::collections::{hash_map::Entry, HashMap, HashSet};

use strum::EnumCount;

use crate::{
    debug,
    earth_app::scene::Scene,
    framework::{
        assets::TextureBinding,
        gpu::{self, vertices::MeshVertex},
        renderer::{RenderContext, RenderModule, RenderPassContext, TextureCache},
        scene_graph::{DrawList, Geometry, GeometryId, SurfaceKey, TextureSlot},
    },
};

use super::{LightsUniform, MaterialUniform, MeshPipelines, PushConstants, SurfacePipeline};

#[derive(Debug)]
struct GeometryResource {
    vertex_buffer: gpu::Buffer<MeshVertex>,
    index_buffer:  gpu::Buffer<u32>,
}

#[derive(Debug)]
struct SurfaceResource {
    uniform:    gpu::Buffer<MaterialUniform>,
    bindings:   [TextureBinding; TextureSlot::COUNT],
    bind_group: wgpu::BindGroup,
}

#[derive(Debug)]
struct DrawCommand {
    surface:        SurfaceKey,
    geometry:       GeometryId,
    pipeline:       SurfacePipeline,
    push_constants: PushConstants,
}

/// Draws every triangle mesh surface of the scene
///  - opaque surfaces first, then transparent ones back to front
///  - geometry buffers are uploaded once and shared by all surfaces using the geometry
///  - a material bind group is rebuilt only when textures resolved for the surface change
#[derive(Debug)]
pub struct LayeredMeshRenderModule {
    pipelines:     MeshPipelines,
    textures:      TextureCache,
    geometries:    HashMap<GeometryId, GeometryResource>,
    surfaces:      HashMap<SurfaceKey, SurfaceResource>,
    draw_commands: Vec<DrawCommand>,
}

impl LayeredMeshRenderModule {
    pub fn new(context: &RenderContext) -> Self {
        Self {
            pipelines:     MeshPipelines::new(context),
            textures:      TextureCache::new(&context.gpu),
            geometries:    HashMap::new(),
            surfaces:      HashMap::new(),
            draw_commands: vec![],
        }
    }
}

impl RenderModule<Scene> for LayeredMeshRenderModule {

    #[profiler::function]
    fn prepare(&mut self, scene: &Scene, context: &RenderContext) {
        let gpu = &context.gpu;

        if self.textures.sync(gpu, &scene.textures) {
            debug!("Textures uploaded, {} still loading", scene.textures.pending_count());
        }

        let list = DrawList::collect(&scene.graph, &scene.textures, context.globals.camera_position());
        self.pipelines.update_lights(gpu, LightsUniform::from_lights(&list.lights));

        self.draw_commands.clear();
        let mut drawn = HashSet::new();

        for item in list.opaque.iter().chain(list.transparent.iter()) {
            let Geometry::Mesh { vertices, indices } = item.geometry else {
                continue;
            };

            self.geometries.entry(item.geometry_id).or_insert_with(|| {
                profiler::scope!("Upload geometry");
                GeometryResource {
                    vertex_buffer: gpu::Buffer::new(gpu, Some("Mesh Vertex Buffer"), vertices, wgpu::BufferUsages::VERTEX),
                    index_buffer:  gpu::Buffer::new(gpu, Some("Mesh Index Buffer"), indices, wgpu::BufferUsages::INDEX),
                }
            });

            let uniform = MaterialUniform::from_material(item.material);
            match self.surfaces.entry(item.key) {
                Entry::Occupied(mut entry) => {
                    let surface = entry.get_mut();
                    surface.uniform.queue_update(gpu, &[uniform]);
                    if surface.bindings != item.textures {
                        surface.bind_group = self.pipelines.create_material_bind_group(gpu, &surface.uniform, &self.textures, &item.textures);
                        surface.bindings = item.textures;
                    }
                },
                Entry::Vacant(entry) => {
                    let uniform = gpu::Buffer::new_uniform(gpu, Some("Mesh Material Uniform Buffer"), uniform);
                    let bind_group = self.pipelines.create_material_bind_group(gpu, &uniform, &self.textures, &item.textures);
                    entry.insert(SurfaceResource {
                        uniform,
                        bindings: item.textures,
                        bind_group,
                    });
                },
            }

            drawn.insert(item.key);
            self.draw_commands.push(DrawCommand {
                surface:        item.key,
                geometry:       item.geometry_id,
                pipeline:       SurfacePipeline::for_material(item.material),
                push_constants: PushConstants { model: item.world },
            });
        }

        // surfaces removed from the scene release their buffers
        self.surfaces.retain(|key, _| drawn.contains(key));
    }

    #[profiler::function]
    fn render<'pass, 'a: 'pass>(
        &'a self,
        context: &'a RenderContext,
        render_pass_context: &mut RenderPassContext<'pass>,
    ) {
        let render_pass = &mut render_pass_context.render_pass;
        let mut current_pipeline = None;

        for command in &self.draw_commands {
            profiler::scope!("Draw mesh surface");
            let (Some(geometry), Some(surface)) = (self.geometries.get(&command.geometry), self.surfaces.get(&command.surface)) else {
                continue;
            };

            if current_pipeline != Some(command.pipeline) {
                let Some(pipeline) = self.pipelines.pipeline(command.pipeline) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &context.globals.bind_group, &[]);
                render_pass.set_bind_group(1, self.pipelines.lights_bind_group(), &[]);
                current_pipeline = Some(command.pipeline);
            }

            render_pass.set_bind_group(2, &surface.bind_group, &[]);
            render_pass.set_push_constants(wgpu::ShaderStages::VERTEX, 0, bytemuck::cast_slice(&[command.push_constants]));
            render_pass.set_vertex_buffer(0, geometry.vertex_buffer.buffer.slice(..));
            render_pass.set_index_buffer(geometry.index_buffer.buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..geometry.index_buffer.size as u32, 0, 0..1);
        }
    }
}
