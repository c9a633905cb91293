//! Flint Viewer - egui-based scene validation GUI
//!
//! Provides an interactive viewer with entity inspector, scene tree,
//! constraint overlay, and render stats. Also supports an optional
//! spline editor mode for interactive track editing.

pub mod app;
pub mod panels;
pub mod projection;
pub mod spline_editor;
pub mod transform_gizmo;
