use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};
use winit_input_helper::WinitInputHelper;
use winit::{
    event::Event,
    platform::run_return::EventLoopExtRunReturn,
    window::{Window, WindowBuilder},
    event_loop::{EventLoop, ControlFlow},
};

use crate::{error, info};

use super::{
    gpu,
    renderer::Renderer,
    clock::FrameClock,
    camera::SceneWithCamera,
    updater::{
        Updater,
        ResizeContext,
        UpdateContext,
        UpdateResultAction,
    },
};

#[derive(Clone, Debug)]
pub struct RunParams {
    pub window_name: String,
    pub window_width: u32,
    pub window_height: u32,
}
impl Default for RunParams {
    fn default() -> Self {
        Self {
            window_name: "My App".into(),
            window_width: 1280,
            window_height: 720,
        }
    }
}

pub struct Context<'a> {
    pub window: &'a Window,
    pub gpu: Arc<gpu::Context>,
}

pub struct ApplicationDescriptor<A, B, C> {
    pub init_renderer: A,
    pub init_updater: B,
    pub init_scene: C,
}

/// Opens the window and runs the event loop until the window is closed
///  - every redraw advances the frame clock, runs the updater and renders the scene
///  - frames stop while the window is minimized and resume once it has an area again
///  - resize and scale factor changes reach the renderer first, then the updater
///  - a fatal render error ends the loop and is returned
#[profiler::function(pinned)]
pub async fn run<S, DR, DU, IS>(app_desc: ApplicationDescriptor<DR, DU, IS>, params: RunParams) -> Result<()>
where
    S:  SceneWithCamera,
    DR: FnOnce(&Context) -> Result<Renderer<S>>, // init_renderer
    DU: FnOnce(&Context) -> Updater<S>,          // init_updater
    IS: FnOnce(&Context) -> Result<S>,           // init_scene
{
    let mut event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(params.window_name.as_str())
        .with_inner_size(winit::dpi::LogicalSize::new(params.window_width, params.window_height))
        .build(&event_loop)
        .context("Failed to create window")?;
    let gpu = Arc::new(gpu::Context::new(&window).await?);

    let context = Context {
        window: &window,
        gpu:    gpu.clone(),
    };

    // init application specifics
    let mut scene = (app_desc.init_scene)(&context)?;
    let mut updater = (app_desc.init_updater)(&context);
    let mut renderer = (app_desc.init_renderer)(&context)?;

    // Execution control
    let mut input = WinitInputHelper::new();
    let mut clock = FrameClock::now();
    let mut fatal_error = None;

    info!("Entering event loop");
    window.request_redraw();

    event_loop.run_return(|event, _, control_flow| {
        profiler::scope!("Event incoming");
        *control_flow = ControlFlow::Wait;

        let mut flow_result_action = UpdateResultAction::None;

        // Frame loop is driven by redraw requests, vsync of the surface paces them
        let frame_requested = matches!(event, Event::RedrawRequested(_)) && !renderer.is_minimized();
        if frame_requested {
            profiler::scope!("Processing redraw request");

            let frame = clock.next_frame().clone();
            updater.update(UpdateContext {
                scene: &mut scene,
                input: &input,
                frame: &frame,
            });

            renderer.prepare(&scene);
            flow_result_action = match renderer.render() {
                Ok(()) => UpdateResultAction::Redraw,
                Err(render_error) => {
                    error!("Rendering failed: {:?}", render_error);
                    fatal_error = Some(anyhow!("Rendering failed: {:?}", render_error));
                    UpdateResultAction::Exit
                },
            };
            renderer.finalize();
        }

        // Input helper collects events into coherent input state and reports true once all pending events are processed
        if input.update(&event) {
            profiler::scope!("Processing input");

            let input_result = if let Some(size) = input.window_resized() {
                let scale_factor = input.scale_factor().unwrap_or_else(|| window.scale_factor());
                renderer.resize(&size, scale_factor).combine(updater.resize(ResizeContext {
                    scene: &mut scene,
                    size:  &size,
                    scale_factor,
                }))
            } else if let Some(scale_factor) = input.scale_factor_changed() {
                let size = window.inner_size();
                renderer.resize(&size, scale_factor).combine(updater.resize(ResizeContext {
                    scene: &mut scene,
                    size:  &size,
                    scale_factor,
                }))
            } else if input.close_requested() || input.destroyed() {
                UpdateResultAction::Exit
            } else {
                updater.input(UpdateContext {
                    scene: &mut scene,
                    input: &input,
                    frame: clock.current_frame(),
                })
            };

            flow_result_action = flow_result_action.combine(input_result);
        }

        // Decide on final control flow based on combination of all result actions
        match flow_result_action {
            UpdateResultAction::Exit => *control_flow = ControlFlow::Exit,
            UpdateResultAction::Redraw => window.request_redraw(),
            UpdateResultAction::None => {},
        }
    });

    info!("Event loop finished after {} frames", clock.current_frame().order);
    match fatal_error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
