//! Flint Scene - TOML scene serialization
//!
//! This crate handles loading and saving scenes in TOML format.

mod format;
mod loader;
mod prefab;
mod saver;

pub use format::{EntityDef, PostProcessDef, PrefabFile, PrefabInstance, SceneFile, SceneMetadata};
pub use loader::{load_scene, load_scene_string, reload_scene};
pub use saver::{save_scene, save_scene_string};
