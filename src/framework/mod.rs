
pub mod gpu;
pub mod math;
pub mod camera;
pub mod application;
pub mod renderer;
pub mod updater;
pub mod scene_graph;
pub mod assets;
pub mod clock;
pub mod log;
