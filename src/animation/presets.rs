use super::catalog::Catalog;
use super::easing::CurveOptions;
use super::Animation;
use crate::stage::{Stage, Transform, ViewState};

/// Stage geometry the built-in presets were tuned against
pub const DEMO_SCREEN_WIDTH: f32 = 750.0;
pub const DEMO_VIEW_WIDTH: f32 = 160.0;

/// Slide the view from its parked baseline to stage center
pub(crate) fn slide_to_center(view: &mut ViewState) {
    view.offset = 0.0;
}

/// Shrink the view to a quarter and tip it on its side
pub(crate) fn shrink_and_tip(view: &mut ViewState) {
    view.transform = Transform {
        rotation: -90.0,
        scale_x: 0.25,
        scale_y: 0.25,
        ..Transform::identity()
    };
}

/// Undo any transform while sliding to center
pub(crate) fn restore_and_slide(view: &mut ViewState) {
    view.transform = Transform::identity();
    view.offset = 0.0;
}

pub fn demo_stage() -> Stage {
    Stage::new(DEMO_SCREEN_WIDTH, DEMO_VIEW_WIDTH)
}

/// The four built-in presets, in picker order
///
/// All slide the view in over one second. "Second" and "Spring2" first
/// shrink and tip the view so the slide also unwinds a transform; the
/// spring pair bounces with damping 0.6 and initial velocity 0.7.
pub fn demo_catalog() -> Catalog {
    let first = Animation::new("First", 1.0, CurveOptions::empty(), slide_to_center);

    let second = Animation::new("Second", 1.0, CurveOptions::empty(), restore_and_slide)
        .with_prepare(shrink_and_tip);

    let spring1 = Animation::spring(
        "Spring1",
        1.0,
        CurveOptions::EASE_IN_OUT,
        0.6,
        0.7,
        slide_to_center,
    );

    let spring2 = Animation::spring(
        "Spring2",
        1.0,
        CurveOptions::EASE_IN_OUT,
        0.6,
        0.7,
        restore_and_slide,
    )
    .with_prepare(shrink_and_tip);

    Catalog::new(vec![first, second, spring1, spring2])
}
