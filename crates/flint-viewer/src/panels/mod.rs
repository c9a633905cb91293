//! GUI panels for the viewer

mod entity_inspector;
mod render_stats;
mod scene_tree;

pub use entity_inspector::EntityInspector;
pub use render_stats::RenderStats;
pub use scene_tree::SceneTree;
