use std::{sync::Arc, fmt::Debug};

use anyhow::{bail, Context as _, Result};
use slotmap::{SlotMap, new_key_type};
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    debug,
    info,
    warn,
    framework::{gpu, camera::SceneWithCamera, updater::UpdateResultAction},
};

use super::{
    Globals,
    GlobalsUniform,
    RenderModule,
    RenderContext,
    RenderPass,
};

new_key_type! { pub struct RenderModuleID; }
new_key_type! { pub struct RenderPassID; }


#[derive(Debug)]
struct RegisteredRenderPass {
    attachment: RenderPass,
    modules:    Vec<RenderModuleID>,
}

/// How a window size change affects the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceChange {
    /// Same size and scale factor as configured, nothing to do
    Unchanged,
    /// Window has no area, there is nothing to draw into
    Minimized,
    /// Surface and size dependent attachments have to be rebuilt
    Reconfigure,
}

impl SurfaceChange {
    pub fn classify(
        config: &wgpu::SurfaceConfiguration,
        current_scale_factor: f64,
        minimized: bool,
        size: &PhysicalSize<u32>,
        scale_factor: f64,
    ) -> Self {
        if size.width == 0 || size.height == 0 {
            return Self::Minimized;
        }
        let same_size = config.width == size.width && config.height == size.height;
        if same_size && current_scale_factor == scale_factor && !minimized {
            Self::Unchanged
        } else {
            Self::Reconfigure
        }
    }
}

#[derive(Debug)]
pub struct Renderer<S: SceneWithCamera> {
    context:   RenderContext,
    modules:   SlotMap<RenderModuleID, Box<dyn RenderModule<S>>>,
    passes:    SlotMap<RenderPassID, RegisteredRenderPass>,
    minimized: bool,
}

// Renderer construction methods
impl<S: SceneWithCamera> Renderer<S> {
    pub fn new(gpu: Arc<gpu::Context>, window: &Window, exposure: f32) -> Result<Self> {
        let capabilities = gpu.surface.get_capabilities(&gpu.adapter);
        let format = gpu.preferred_surface_format().context("Surface is not supported by the adapter")?;

        let present_mode = if cfg!(feature = "no_vsync") && capabilities.present_modes.contains(&wgpu::PresentMode::Immediate) {
            wgpu::PresentMode::Immediate
        } else {
            wgpu::PresentMode::Fifo // VSynch essentially - capping renders on display frame rate
        };

        // setup surface for rendering
        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage:        wgpu::TextureUsages::RENDER_ATTACHMENT, // texture will be used to draw on screen
            format,
            present_mode,
            width:        size.width.max(1),
            height:       size.height.max(1),
            alpha_mode:   capabilities.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        gpu.surface.configure(&gpu.device, &surface_config);
        info!("Surface configured: {:?} {}x{} {:?}", format, surface_config.width, surface_config.height, present_mode);

        Ok(Self {
            context: RenderContext {
                globals:      Globals::new(&gpu),
                gpu,
                surface_config,
                scale_factor: window.scale_factor(),
                sample_count: gpu::MSAA_SAMPLE_COUNT,
                exposure,
            },
            modules:   SlotMap::with_key(),
            passes:    SlotMap::with_key(),
            minimized: size.width == 0 || size.height == 0,
        })
    }

    /// Adds a new render module to the renderer
    pub fn register_module<M, F>(&mut self, get_module: F) -> RenderModuleID
        where
            M: RenderModule<S> + 'static,
            F: FnOnce(&RenderContext) -> M,
    {
        let module = get_module(&self.context);
        self.modules.insert(Box::new(module))
    }

    /// Passes are executed in order of their registration, modules in the order given here
    pub fn register_render_pass<F>(&mut self, get_pass: F, modules: &[RenderModuleID]) -> Result<RenderPassID>
        where
            F: FnOnce(&RenderContext) -> RenderPass,
    {
        if let Some(unknown) = modules.iter().find(|module| !self.modules.contains_key(**module)) {
            bail!("Cannot set render pass, render module {:?} is not registered", unknown);
        }

        let pass = get_pass(&self.context);
        Ok(self.passes.insert(RegisteredRenderPass {
            attachment: pass,
            modules:    modules.to_vec(),
        }))
    }
}

// renderer runtime methods
impl<S: SceneWithCamera> Renderer<S> {

    /// Reconfigures surface and size dependent attachments
    ///  - zero sized window suspends rendering until it gets an area again
    ///  - asks for redraw when the surface was rebuilt, unchanged sizes are ignored
    #[profiler::function]
    pub fn resize(&mut self, size: &PhysicalSize<u32>, scale_factor: f64) -> UpdateResultAction {
        let change = SurfaceChange::classify(
            &self.context.surface_config,
            self.context.scale_factor,
            self.minimized,
            size,
            scale_factor,
        );
        match change {
            SurfaceChange::Unchanged => UpdateResultAction::None,
            SurfaceChange::Minimized => {
                if !self.minimized {
                    debug!("Window minimized, rendering suspended");
                }
                self.minimized = true;
                UpdateResultAction::None
            },
            SurfaceChange::Reconfigure => {
                self.minimized = false;
                self.context.surface_config.width = size.width;
                self.context.surface_config.height = size.height;
                self.context.scale_factor = scale_factor;
                self.reconfigure();
                UpdateResultAction::Redraw
            },
        }
    }

    /// Nothing is drawn while the window has no area.
    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    fn reconfigure(&mut self) {
        self.context.gpu.surface.configure(&self.context.gpu.device, &self.context.surface_config);
        for pass in self.passes.values_mut() {
            pass.attachment.resize(&self.context);
        }
    }

    #[profiler::function]
    pub fn prepare(&mut self, scene: &S) {

        // Update shared GPU resource outside of individual render module scopes
        let uniform = GlobalsUniform::from_camera(
            scene.get_camera_rig().camera(),
            self.context.exposure,
            self.context.surface_config.width,
            self.context.surface_config.height,
        );
        self.context.globals.update(&self.context.gpu, uniform);

        for module in self.modules.values_mut() {
            module.prepare(scene, &self.context);
        }
    }

    /// Draws one frame
    ///  - lost or outdated surface is reconfigured and the frame is skipped
    ///  - out of memory is returned to the caller as fatal
    #[profiler::function]
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if self.minimized {
            return Ok(());
        }

        // ask surface to provide us a texture we will draw into
        let output = match profiler::call!(self.context.gpu.surface.get_current_texture()) {
            Ok(output) => output,
            Err(error @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                warn!("Skipping frame, surface is {:?}", error);
                self.reconfigure();
                return Ok(());
            },
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Skipping frame, surface texture acquisition timed out");
                return Ok(());
            },
            Err(error) => return Err(error),
        };

        // View on surface texture understandable by RenderPassColorAttachment
        let view = profiler::call!(
            output.texture.create_view(&wgpu::TextureViewDescriptor::default())
        );

        // Create an encoder for building a GPU commands for this frame
        let mut encoder = profiler::call!(
            self.context.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder")
            })
        );

        { profiler::scope!("Render Passes");
            for pass in self.passes.values() {
                profiler::scope!("One Render Pass execute");
                let mut render_pass_context = pass.attachment.start(&mut encoder, &view);
                for module_id in pass.modules.iter() {
                    profiler::scope!("One Module execute");
                    if let Some(module) = self.modules.get(*module_id) {
                        module.render(&self.context, &mut render_pass_context);
                    }
                }
            }
        }

        profiler::call!(self.context.gpu.queue.submit(Some(encoder.finish())));
        profiler::call!(output.present());
        Ok(())
    }

    #[profiler::function]
    pub fn finalize(&mut self) {
        for module in self.modules.values_mut() {
            module.finalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: u32, height: u32) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage:        wgpu::TextureUsages::RENDER_ATTACHMENT,
            format:       wgpu::TextureFormat::Bgra8Unorm,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode:   wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
        }
    }

    #[test]
    fn zero_area_suspends_instead_of_reconfiguring() {
        let config = config(800, 600);
        for size in [PhysicalSize::new(0, 0), PhysicalSize::new(800, 0), PhysicalSize::new(0, 600)] {
            assert_eq!(SurfaceChange::classify(&config, 1.0, false, &size, 1.0), SurfaceChange::Minimized);
            assert_eq!(SurfaceChange::classify(&config, 1.0, true, &size, 1.0), SurfaceChange::Minimized);
        }
    }

    #[test]
    fn restoring_same_size_rebuilds_the_surface() {
        let config = config(800, 600);
        let size = PhysicalSize::new(800, 600);
        assert_eq!(SurfaceChange::classify(&config, 1.0, false, &size, 1.0), SurfaceChange::Unchanged);
        assert_eq!(SurfaceChange::classify(&config, 1.0, true, &size, 1.0), SurfaceChange::Reconfigure);
    }

    #[test]
    fn size_or_scale_change_rebuilds_the_surface() {
        let config = config(800, 600);
        assert_eq!(
            SurfaceChange::classify(&config, 1.0, false, &PhysicalSize::new(1024, 600), 1.0),
            SurfaceChange::Reconfigure,
        );
        assert_eq!(
            SurfaceChange::classify(&config, 1.0, false, &PhysicalSize::new(800, 600), 2.0),
            SurfaceChange::Reconfigure,
        );
    }
}
