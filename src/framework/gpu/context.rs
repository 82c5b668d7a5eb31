use anyhow::{Context as _, Result};
use winit::window::Window;

use crate::info;

#[derive(Debug)]
pub struct Context {
    pub surface: wgpu::Surface,
    pub adapter: wgpu::Adapter,
    pub device:  wgpu::Device,
    pub queue:   wgpu::Queue,
}

impl Context {

    #[profiler::function]
    pub async fn new(window: &Window) -> Result<Self> {
        let instance = {
            profiler::scope!("Creating instance");
            wgpu::Instance::new(wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                dx12_shader_compiler: wgpu::Dx12Compiler::default(),
            })
        };

        // Safety: window outlives the surface, both are owned by the event loop closure for the whole run
        let surface = {
            profiler::scope!("Creating surface");
            unsafe { instance.create_surface(window) }
                .context("Failed to create window surface")?
        };

        let adapter = profiler::call!(
            instance.request_adapter(
                &wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    force_fallback_adapter: false,
                    compatible_surface: Some(&surface),
                }
            ).await.context("Failed to find an appropriate adapter")?
        );

        info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = Self::new_device_queue(&adapter).await?;

        Ok(Self {
            adapter,
            surface,
            device,
            queue,
        })
    }

    #[profiler::function]
    pub async fn new_device_queue(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                features: wgpu::Features::PUSH_CONSTANTS, // per draw model matrices
                limits: wgpu::Limits {
                    max_push_constant_size: 128,
                    ..Default::default()
                },
            },
            None
        ).await.context("Failed to create device")
    }

    /// Preferred output format, non-sRGB when available because shaders write display values directly.
    pub fn preferred_surface_format(&self) -> Option<wgpu::TextureFormat> {
        let formats = self.surface.get_capabilities(&self.adapter).formats;
        formats
            .iter()
            .copied()
            .find(|format| !format.describe().srgb)
            .or_else(|| formats.first().copied())
    }
}
