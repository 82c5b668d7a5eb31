
use winit_input_helper::WinitInputHelper;

use crate::framework::clock::Frame;

// Contexts
// -------------

pub struct UpdateContext<'a, Scene> {
    pub scene: &'a mut Scene,
    pub input: &'a WinitInputHelper,
    pub frame: &'a Frame,
}

pub struct ResizeContext<'a, Scene> {
    pub scene:        &'a mut Scene,
    pub size:         &'a winit::dpi::PhysicalSize<u32>,
    pub scale_factor: f64,
}

// Update results structs
// ----------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResultAction {
    None, Redraw, Exit
}
impl UpdateResultAction {
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (UpdateResultAction::Exit, _) => UpdateResultAction::Exit,
            (_, UpdateResultAction::Exit) => UpdateResultAction::Exit,
            (UpdateResultAction::Redraw, _) => UpdateResultAction::Redraw,
            (_, UpdateResultAction::Redraw) => UpdateResultAction::Redraw,
            _ => UpdateResultAction::None,
        }
    }
}

pub struct InputUpdateResult {
    pub handled: bool,
    pub result: UpdateResultAction
}

impl InputUpdateResult {
    pub fn combine(self, other: Self) -> Self {
        Self {
            handled: self.handled || other.handled,
            result: self.result.combine(other.result)
        }
    }
}

impl Default for InputUpdateResult {
    fn default() -> Self {
        Self {
            handled: false,
            result: UpdateResultAction::None
        }
    }
}

// UpdaterModule
// -------------

/// A piece of per-frame logic working on the scene.
pub trait UpdaterModule<Scene> {
    fn input(&mut self, _context: &mut UpdateContext<Scene>) -> InputUpdateResult {
        InputUpdateResult::default()
    }
    /// Invoked once per displayed frame, before the frame is rendered
    fn update(&mut self, context: &mut UpdateContext<Scene>) -> UpdateResultAction;
    fn resize(&mut self, _context: &mut ResizeContext<Scene>) -> UpdateResultAction {
        UpdateResultAction::None
    }
}

// Updater
// -------

pub struct Updater<Scene> {
    modules: Vec<Box<dyn UpdaterModule<Scene>>>,
}

impl<Scene> Default for Updater<Scene> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Scene> Updater<Scene> {
    pub fn new() -> Self {
        Self { modules: vec![] }
    }

    pub fn with_module<M>(mut self, module: M) -> Self
    where
        M: UpdaterModule<Scene> + 'static
    {
        self.modules.push(Box::new(module));
        self
    }

    /// Invoked when input has changed, stops at first module which handled the input
    #[profiler::function]
    pub fn input(&mut self, mut context: UpdateContext<Scene>) -> UpdateResultAction {
        let mut result = InputUpdateResult::default();
        for module in self.modules.iter_mut() {
            result = result.combine(module.input(&mut context));
            if result.handled {
                break;
            }
        }
        result.result
    }

    /// Invoked on every frame, modules run in registration order
    #[profiler::function]
    pub fn update(&mut self, mut context: UpdateContext<Scene>) -> UpdateResultAction {
        let mut result = UpdateResultAction::None;
        for module in self.modules.iter_mut() {
            result = result.combine(module.update(&mut context));
        }
        result
    }

    /// React to resize event
    #[profiler::function]
    pub fn resize(&mut self, mut context: ResizeContext<Scene>) -> UpdateResultAction {
        let mut result = UpdateResultAction::None;
        for module in self.modules.iter_mut() {
            result = result.combine(module.resize(&mut context));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::clock::FrameClock;

    struct Counter(u32);

    impl UpdaterModule<Vec<&'static str>> for Counter {
        fn update(&mut self, context: &mut UpdateContext<Vec<&'static str>>) -> UpdateResultAction {
            self.0 += 1;
            context.scene.push("counter");
            UpdateResultAction::None
        }
    }

    struct Redrawer;

    impl UpdaterModule<Vec<&'static str>> for Redrawer {
        fn update(&mut self, context: &mut UpdateContext<Vec<&'static str>>) -> UpdateResultAction {
            context.scene.push("redrawer");
            UpdateResultAction::Redraw
        }
    }

    #[test]
    fn exit_wins_over_redraw() {
        assert_eq!(UpdateResultAction::Redraw.combine(UpdateResultAction::Exit), UpdateResultAction::Exit);
        assert_eq!(UpdateResultAction::None.combine(UpdateResultAction::Redraw), UpdateResultAction::Redraw);
        assert_eq!(UpdateResultAction::None.combine(UpdateResultAction::None), UpdateResultAction::None);
    }

    #[test]
    fn modules_update_in_registration_order() {
        let mut updater = Updater::new()
            .with_module(Counter(0))
            .with_module(Redrawer);
        let mut scene = vec![];
        let input = WinitInputHelper::new();
        let clock = FrameClock::now();

        let result = updater.update(UpdateContext {
            scene: &mut scene,
            input: &input,
            frame: clock.current_frame(),
        });

        assert_eq!(result, UpdateResultAction::Redraw);
        assert_eq!(scene, vec!["counter", "redrawer"]);
    }
}
