use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Animation option flags carried by a preset
    /// An empty set is valid and means "use the platform default curve"
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CurveOptions: u8 {
        const EASE_IN_OUT = 0b0001;
        const EASE_IN     = 0b0010;
        const EASE_OUT    = 0b0100;
        const LINEAR      = 0b1000;
    }
}

/// Timing curves for view animations
/// Closed set: adding a curve is a deliberate API change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EasingCurve {
    EaseInOut,
    EaseIn,
    EaseOut,
    Linear,
}

/// Per-curve metadata record: display name, option flag and the
/// cubic bezier control points used for evaluation
struct CurveInfo {
    name: &'static str,
    options: CurveOptions,
    bezier: (f32, f32, f32, f32),
}

impl EasingCurve {
    /// All curves in picker row order
    pub const ALL: [EasingCurve; 4] = [
        EasingCurve::EaseInOut,
        EasingCurve::EaseIn,
        EasingCurve::EaseOut,
        EasingCurve::Linear,
    ];

    /// The single source of truth both lookup directions read from
    fn info(&self) -> CurveInfo {
        match self {
            EasingCurve::EaseInOut => CurveInfo {
                name: "ease-in-out",
                options: CurveOptions::EASE_IN_OUT,
                bezier: (0.42, 0.0, 0.58, 1.0),
            },
            EasingCurve::EaseIn => CurveInfo {
                name: "ease-in",
                options: CurveOptions::EASE_IN,
                bezier: (0.42, 0.0, 1.0, 1.0),
            },
            EasingCurve::EaseOut => CurveInfo {
                name: "ease-out",
                options: CurveOptions::EASE_OUT,
                bezier: (0.0, 0.0, 0.58, 1.0),
            },
            EasingCurve::Linear => CurveInfo {
                name: "linear",
                options: CurveOptions::LINEAR,
                bezier: (0.0, 0.0, 1.0, 1.0),
            },
        }
    }

    /// Stable display name shown in pickers and listings
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Create easing curve from its display name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        let name = name.as_str();
        Self::ALL.into_iter().find(|curve| {
            let display = curve.info().name;
            name == display || name == display.replace('-', "")
        })
    }

    /// The curve's option flag
    pub fn options(&self) -> CurveOptions {
        self.info().options
    }

    /// Recover the curve from an option set, matching exactly one flag
    /// Empty or combined sets have no single curve and yield None
    pub fn from_options(options: CurveOptions) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|curve| curve.info().options == options)
    }

    /// Apply easing curve to progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingCurve::Linear => t,
            _ => {
                let (x1, y1, x2, y2) = self.info().bezier;
                cubic_bezier(t, x1, y1, x2, y2)
            }
        }
    }
}

impl Default for EasingCurve {
    fn default() -> Self {
        EasingCurve::EaseInOut
    }
}

impl CurveOptions {
    /// Effective curve for a transaction: the exact matching flag,
    /// otherwise the platform default (empty and mixed sets included)
    pub fn resolve(&self) -> EasingCurve {
        EasingCurve::from_options(*self).unwrap_or_default()
    }
}

/// Evaluate the curve y(x) of a CSS-style cubic bezier at x = t
/// Solves x(s) = t with Newton-Raphson, falling back to bisection
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let s = solve_bezier_parameter(t, x1, x2);
    sample_bezier(s, y1, y2)
}

/// One bezier axis: B(s) with P0 = 0, P3 = 1
fn sample_bezier(s: f32, c1: f32, c2: f32) -> f32 {
    // Horner form of 3(1-s)²s·c1 + 3(1-s)s²·c2 + s³
    ((1.0 - 3.0 * c2 + 3.0 * c1) * s * s * s) + ((3.0 * c2 - 6.0 * c1) * s * s) + (3.0 * c1 * s)
}

fn sample_bezier_derivative(s: f32, c1: f32, c2: f32) -> f32 {
    3.0 * (1.0 - 3.0 * c2 + 3.0 * c1) * s * s + 2.0 * (3.0 * c2 - 6.0 * c1) * s + 3.0 * c1
}

fn solve_bezier_parameter(x: f32, x1: f32, x2: f32) -> f32 {
    // Newton-Raphson converges in a handful of steps for these curves
    let mut s = x;
    for _ in 0..8 {
        let err = sample_bezier(s, x1, x2) - x;
        if err.abs() < 1e-5 {
            return s;
        }
        let slope = sample_bezier_derivative(s, x1, x2);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    // Bisection fallback for flat spots
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    s = x;
    for _ in 0..20 {
        let err = sample_bezier(s, x1, x2) - x;
        if err.abs() < 1e-5 {
            break;
        }
        if err > 0.0 {
            hi = s;
        } else {
            lo = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for curve in EasingCurve::ALL {
            assert_eq!(EasingCurve::from_name(curve.name()), Some(curve));
        }
    }

    #[test]
    fn test_options_round_trip() {
        for curve in EasingCurve::ALL {
            assert_eq!(EasingCurve::from_options(curve.options()), Some(curve));
        }
    }

    #[test]
    fn test_from_name_unknown() {
        assert_eq!(EasingCurve::from_name("bounce"), None);
        assert_eq!(EasingCurve::from_name(""), None);
    }

    #[test]
    fn test_from_name_loose_spelling() {
        assert_eq!(
            EasingCurve::from_name("EaseInOut"),
            Some(EasingCurve::EaseInOut)
        );
        assert_eq!(EasingCurve::from_name("ease-out"), Some(EasingCurve::EaseOut));
    }

    #[test]
    fn test_empty_options_resolve_to_default() {
        assert_eq!(CurveOptions::empty().resolve(), EasingCurve::EaseInOut);
        assert_eq!(EasingCurve::from_options(CurveOptions::empty()), None);
    }

    #[test]
    fn test_mixed_options_resolve_to_default() {
        let mixed = CurveOptions::EASE_IN | CurveOptions::LINEAR;
        assert_eq!(EasingCurve::from_options(mixed), None);
        assert_eq!(mixed.resolve(), EasingCurve::EaseInOut);
    }

    #[test]
    fn test_option_flags_are_distinct() {
        for a in EasingCurve::ALL {
            for b in EasingCurve::ALL {
                if a != b {
                    assert!((a.options() & b.options()).is_empty());
                }
            }
        }
    }

    #[test]
    fn test_linear_apply() {
        let curve = EasingCurve::Linear;
        assert_eq!(curve.apply(0.0), 0.0);
        assert_eq!(curve.apply(0.5), 0.5);
        assert_eq!(curve.apply(1.0), 1.0);
    }

    #[test]
    fn test_apply_endpoints() {
        for curve in EasingCurve::ALL {
            assert!(curve.apply(0.0).abs() < 1e-4);
            assert!((curve.apply(1.0) - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_ease_in_starts_slow() {
        let eased = EasingCurve::EaseIn.apply(0.25);
        assert!(eased < 0.25, "ease-in should lag linear early, got {eased}");
    }

    #[test]
    fn test_ease_out_starts_fast() {
        let eased = EasingCurve::EaseOut.apply(0.25);
        assert!(eased > 0.25, "ease-out should lead linear early, got {eased}");
    }

    #[test]
    fn test_ease_in_out_symmetric_midpoint() {
        let mid = EasingCurve::EaseInOut.apply(0.5);
        assert!((mid - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_apply_monotonic() {
        for curve in EasingCurve::ALL {
            let mut last = 0.0;
            for i in 0..=100 {
                let y = curve.apply(i as f32 / 100.0);
                assert!(y >= last - 1e-4, "{} not monotonic at {i}", curve.name());
                last = y;
            }
        }
    }
}
