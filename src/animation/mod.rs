use std::fmt;

use crate::stage::ViewState;

pub mod animator;
pub mod catalog;
pub mod easing;
pub mod motion;
pub mod presets;

// Re-export commonly used types
pub use animator::{Animator, AnimatorStats, TransactionRecord};
pub use catalog::Catalog;
pub use easing::{CurveOptions, EasingCurve};
pub use motion::{Motion, MotionCurve, UnitSpring};
pub use presets::demo_catalog;

/// Work an animation performs against the staged view
///
/// Blocks are stored as plain data on the animation and run by
/// `perform`; there is no subclassing and no downcasting anywhere.
pub type StageBlock = Box<dyn FnMut(&mut ViewState) + Send>;

/// A named, editable view animation
///
/// Everything the edit surface touches lives here as a value: timing,
/// curve options, the motion kind and the work blocks. Numeric fields
/// hold whatever the caller wrote, including out-of-range values; the
/// animator clamps once when it builds the transaction.
pub struct Animation {
    /// Display and selection identifier
    pub tag: String,

    /// Seconds to wait before the transaction starts moving
    pub delay_secs: f32,

    /// Seconds the transaction runs for
    pub duration_secs: f32,

    /// Curve option flags; empty means the platform default curve
    pub options: CurveOptions,

    /// Tween or spring motion
    pub motion: Motion,

    animate: StageBlock,
    prepare: Option<StageBlock>,
}

impl Animation {
    /// Tween animation with no delay and no preparation
    pub fn new(
        tag: impl Into<String>,
        duration_secs: f32,
        options: CurveOptions,
        animate: impl FnMut(&mut ViewState) + Send + 'static,
    ) -> Self {
        Self {
            tag: tag.into(),
            delay_secs: 0.0,
            duration_secs,
            options,
            motion: Motion::Tween,
            animate: Box::new(animate),
            prepare: None,
        }
    }

    /// Spring animation; damping and velocity are recorded exactly as
    /// given, even out of range
    pub fn spring(
        tag: impl Into<String>,
        duration_secs: f32,
        options: CurveOptions,
        damping: f32,
        initial_velocity: f32,
        animate: impl FnMut(&mut ViewState) + Send + 'static,
    ) -> Self {
        let mut animation = Self::new(tag, duration_secs, options, animate);
        animation.motion = Motion::Spring {
            damping,
            initial_velocity,
        };
        animation
    }

    pub fn with_delay(mut self, delay_secs: f32) -> Self {
        self.delay_secs = delay_secs;
        self
    }

    pub fn with_prepare(mut self, prepare: impl FnMut(&mut ViewState) + Send + 'static) -> Self {
        self.prepare = Some(Box::new(prepare));
        self
    }

    pub fn has_preparation(&self) -> bool {
        self.prepare.is_some()
    }

    /// Spring parameters, if this is the spring variant
    pub fn spring_params(&self) -> Option<(f32, f32)> {
        self.motion.spring_params()
    }

    /// Write the damping ratio; only the spring variant has one
    pub fn set_damping(&mut self, value: f32) -> bool {
        match &mut self.motion {
            Motion::Spring { damping, .. } => {
                *damping = value;
                true
            }
            Motion::Tween => false,
        }
    }

    /// Write the initial velocity; only the spring variant has one
    pub fn set_initial_velocity(&mut self, value: f32) -> bool {
        match &mut self.motion {
            Motion::Spring {
                initial_velocity, ..
            } => {
                *initial_velocity = value;
                true
            }
            Motion::Tween => false,
        }
    }

    /// Run this animation against the animator's stage
    ///
    /// Preparation, when present, is applied to the live view first and
    /// completes before the transaction exists. The animation block is
    /// then evaluated into the transaction's target state, and exactly
    /// one transaction is handed to the animator. Returns as soon as
    /// the transaction is scheduled; it never waits for the animation
    /// to finish and no completion callback is involved.
    pub fn perform(&mut self, animator: &Animator) {
        if let Some(prepare) = self.prepare.as_mut() {
            animator.with_view(|view| prepare(view));
        }

        let start = animator.view_snapshot();
        let mut target = start;
        (self.animate)(&mut target);

        animator.begin(self, start, target);
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("tag", &self.tag)
            .field("delay_secs", &self.delay_secs)
            .field("duration_secs", &self.duration_secs)
            .field("options", &self.options)
            .field("motion", &self.motion)
            .field("has_preparation", &self.prepare.is_some())
            .finish()
    }
}

/// Format a seconds value the way the edit surface displays it:
/// exactly one decimal place
pub fn display_secs(secs: f32) -> String {
    format!("{secs:.1}")
}
