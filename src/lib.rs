//! Motionlab - preset-driven view animations
//!
//! A catalog of named, editable animations (timing, easing curve,
//! optional spring) performed against a stage whose frames go to a
//! pluggable surface. The animator stands in for a platform animation
//! system: performing a preset starts exactly one transaction and
//! returns immediately.

pub mod animation;
pub mod config;
pub mod core;
pub mod stage;

// Re-export commonly used types
pub use config::Config;
pub use core::hot_reload::{HotReloadConfig, HotReloadManager, ReloadEvent};

// Re-export animation types for consumers
pub use animation::{display_secs, Animation, Animator, AnimatorStats, Catalog, StageBlock};
pub use animation::{CurveOptions, EasingCurve, Motion, TransactionRecord};
pub use stage::{Frame, NullSurface, RecordingSurface, Stage, Surface, TerminalSurface};
pub use stage::{Transform, ViewState};
