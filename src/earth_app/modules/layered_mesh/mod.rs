
mod uniforms;
pub use uniforms::*;

mod pipeline;
pub use pipeline::*;

mod render_module;
pub use render_module::*;
