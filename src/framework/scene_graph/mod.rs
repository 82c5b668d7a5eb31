//! Hierarchy of transformable nodes owning drawable surfaces and lights.
//!
//! Nodes live in a slot map owned by [`SceneGraph`], parent transforms compose with children only when
//! world matrices are computed for rendering.

mod graph;
pub use graph::*;

mod geometry;
pub use geometry::*;

mod material;
pub use material::*;

mod draw_list;
pub use draw_list::*;
