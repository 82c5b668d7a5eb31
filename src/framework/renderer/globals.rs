use crate::framework::{
    camera,
    gpu,
};

/// Per frame values shared by every render module, bound at group 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub view_projection: glam::Mat4,
    pub view:            glam::Mat4,
    /// xyz: camera world position, w: tone mapping exposure
    pub camera_position: glam::Vec4,
    /// xy: surface size in pixels, z: aspect ratio
    pub viewport:        glam::Vec4,
}

impl GlobalsUniform {
    pub fn from_camera(camera: &camera::Camera, exposure: f32, width: u32, height: u32) -> Self {
        Self {
            view_projection: camera.view_projection_matrix(),
            view:            camera.view_matrix(),
            camera_position: camera.position.extend(exposure),
            viewport:        glam::vec4(width as f32, height as f32, camera.aspect_ratio, 0.0),
        }
    }
}

#[derive(Debug)]
pub struct Globals {
    pub uniform:           GlobalsUniform,
    pub buffer:            gpu::Buffer<GlobalsUniform>,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group:        wgpu::BindGroup,
}

impl Globals {
    #[profiler::function]
    pub fn new(gpu: &gpu::Context) -> Self {
        let uniform = GlobalsUniform::from_camera(&camera::Camera::default(), 1.0, 1, 1);
        let buffer = gpu::Buffer::new_uniform(gpu, Some("Globals Uniform Buffer"), uniform);

        let bind_group_layout = gpu.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.buffer.as_entire_binding(),
            }],
        });

        Self { uniform, buffer, bind_group_layout, bind_group }
    }

    #[profiler::function]
    pub fn update(&mut self, gpu: &gpu::Context, uniform: GlobalsUniform) {
        self.uniform = uniform;
        self.buffer.queue_update(gpu, &[uniform]);
    }

    pub fn camera_position(&self) -> glam::Vec3 {
        self.uniform.camera_position.truncate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_carries_exposure_with_camera_position() {
        let camera = camera::Camera {
            position: glam::vec3(0.0, 0.0, 10.0),
            aspect_ratio: 2.0,
            ..Default::default()
        };
        let uniform = GlobalsUniform::from_camera(&camera, 0.8, 800, 400);
        assert_eq!(uniform.camera_position, glam::vec4(0.0, 0.0, 10.0, 0.8));
        assert_eq!(uniform.viewport.z, 2.0);
        assert_eq!(std::mem::size_of::<GlobalsUniform>() % 16, 0);
    }
}
