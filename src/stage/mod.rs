pub mod surface;
pub mod terminal;

pub use surface::{Frame, NullSurface, RecordingSurface, Surface};
pub use terminal::TerminalSurface;

use serde::{Deserialize, Serialize};

/// Affine transform applied to the animated view
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Transform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32, // in degrees
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Component-wise interpolation toward a target transform
    /// Progress past 1.0 extrapolates, which is how springs overshoot
    pub fn interpolate(&self, target: &Transform, progress: f32) -> Transform {
        Transform {
            translate_x: lerp(self.translate_x, target.translate_x, progress),
            translate_y: lerp(self.translate_y, target.translate_y, progress),
            scale_x: lerp(self.scale_x, target.scale_x, progress),
            scale_y: lerp(self.scale_y, target.scale_y, progress),
            rotation: lerp(self.rotation, target.rotation, progress),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Animatable state of the staged view
///
/// `offset` is the horizontal distance from stage center, the same
/// constraint constant the preset closures write to. Positive values
/// sit to the right, the baseline parks the view past the right edge.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ViewState {
    pub offset: f32,
    pub transform: Transform,
    pub opacity: f32,
}

impl ViewState {
    pub fn interpolate(&self, target: &ViewState, progress: f32) -> ViewState {
        ViewState {
            offset: lerp(self.offset, target.offset, progress),
            transform: self.transform.interpolate(&target.transform, progress),
            opacity: lerp(self.opacity, target.opacity, progress),
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            offset: 0.0,
            transform: Transform::identity(),
            opacity: 1.0,
        }
    }
}

/// The stage the animator drives: one view plus the geometry needed to
/// park it at its baseline between runs
#[derive(Debug, Clone)]
pub struct Stage {
    pub view: ViewState,
    screen_width: f32,
    view_width: f32,
}

impl Stage {
    pub fn new(screen_width: f32, view_width: f32) -> Self {
        let mut stage = Self {
            view: ViewState::default(),
            screen_width,
            view_width,
        };
        stage.reset();
        stage
    }

    pub fn screen_width(&self) -> f32 {
        self.screen_width
    }

    pub fn view_width(&self) -> f32 {
        self.view_width
    }

    /// Offset that parks the view just past the right screen edge
    pub fn baseline_offset(&self) -> f32 {
        self.screen_width / 2.0 + self.view_width
    }

    /// Return the view to its pre-animation baseline: identity
    /// transform, parked offset, fully opaque
    ///
    /// Resetting between runs is the trigger path's job, never part of
    /// performing an animation.
    pub fn reset(&mut self) {
        self.view = ViewState {
            offset: self.baseline_offset(),
            transform: Transform::identity(),
            opacity: 1.0,
        };
    }
}

fn lerp(from: f32, to: f32, progress: f32) -> f32 {
    from + (to - from) * progress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_identity_interpolation() {
        let from = Transform {
            rotation: -90.0,
            scale_x: 0.25,
            scale_y: 0.25,
            ..Transform::identity()
        };
        let to = Transform::identity();

        let mid = from.interpolate(&to, 0.5);
        assert_eq!(mid.rotation, -45.0);
        assert_eq!(mid.scale_x, 0.625);

        let done = from.interpolate(&to, 1.0);
        assert!(done.is_identity());
    }

    #[test]
    fn test_interpolation_overshoot() {
        let from = ViewState {
            offset: 100.0,
            ..ViewState::default()
        };
        let to = ViewState {
            offset: 0.0,
            ..ViewState::default()
        };

        let past = from.interpolate(&to, 1.1);
        assert!((past.offset - -10.0).abs() < 1e-3);
    }

    #[test]
    fn test_stage_starts_at_baseline() {
        let stage = Stage::new(750.0, 160.0);
        assert_eq!(stage.baseline_offset(), 535.0);
        assert_eq!(stage.view.offset, 535.0);
        assert!(stage.view.transform.is_identity());
    }

    #[test]
    fn test_stage_reset_restores_baseline() {
        let mut stage = Stage::new(750.0, 160.0);
        stage.view.offset = 0.0;
        stage.view.transform.rotation = -90.0;
        stage.view.opacity = 0.2;

        stage.reset();
        assert_eq!(stage.view.offset, stage.baseline_offset());
        assert!(stage.view.transform.is_identity());
        assert_eq!(stage.view.opacity, 1.0);
    }
}
