pub mod hot_reload;

pub use hot_reload::{HotReloadConfig, HotReloadManager, HotReloadStats, ReloadEvent};
