use super::easing::{CurveOptions, EasingCurve};

/// Envelope amplitude treated as settled
const SETTLE_EPSILON: f32 = 0.001;

/// Smallest damping ratio the driver will integrate with
const MIN_DAMPING: f32 = 1e-3;

/// How an animation moves between its start and target values
///
/// A tween follows the easing curve picked from the animation's options.
/// A spring follows damped harmonic motion; `damping` is the damping
/// ratio (1.0 settles without oscillating, lower values bounce) and
/// `initial_velocity` is the normalized starting velocity (1.0 covers
/// the full distance in one second; negative values launch away from
/// the target first).
///
/// Parameters are stored exactly as given. Out-of-range values are the
/// driver's problem, clamped once when the transaction is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Tween,
    Spring { damping: f32, initial_velocity: f32 },
}

impl Motion {
    pub fn is_spring(&self) -> bool {
        matches!(self, Motion::Spring { .. })
    }

    /// Damping and velocity, if this is the spring variant
    pub fn spring_params(&self) -> Option<(f32, f32)> {
        match *self {
            Motion::Spring {
                damping,
                initial_velocity,
            } => Some((damping, initial_velocity)),
            Motion::Tween => None,
        }
    }

    /// Resolve into the concrete curve a transaction will run with
    pub fn curve(&self, options: CurveOptions, duration_secs: f32) -> MotionCurve {
        match *self {
            Motion::Tween => MotionCurve::Tween(options.resolve()),
            Motion::Spring {
                damping,
                initial_velocity,
            } => MotionCurve::Spring(UnitSpring::new(damping, initial_velocity, duration_secs)),
        }
    }
}

/// Resolved per-transaction curve: what the tick loop actually samples
#[derive(Debug, Clone, Copy)]
pub enum MotionCurve {
    Tween(EasingCurve),
    Spring(UnitSpring),
}

impl MotionCurve {
    /// Progress for normalized time t in [0, 1]
    /// Springs may overshoot 1.0 on the way; both end at exactly 1.0
    pub fn progress(&self, t: f32) -> f32 {
        match self {
            MotionCurve::Tween(curve) => curve.apply(t),
            MotionCurve::Spring(spring) => spring.position(t),
        }
    }
}

/// Closed-form damped spring on normalized time, settled at t = 1
///
/// The undamped frequency is chosen so the decay envelope reaches
/// `SETTLE_EPSILON` exactly at t = 1, whatever the damping ratio. The
/// initial velocity is given per second of real time, so it is scaled
/// by the transaction duration when the spring is built.
#[derive(Debug, Clone, Copy)]
pub struct UnitSpring {
    zeta: f32,
    omega: f32,
    velocity: f32,
}

impl UnitSpring {
    pub fn new(damping: f32, initial_velocity: f32, duration_secs: f32) -> Self {
        // Boundary clamp: the model forwards values verbatim, the math
        // needs a positive finite ratio
        let zeta = if damping.is_finite() {
            damping.max(MIN_DAMPING)
        } else {
            1.0
        };
        let velocity = if initial_velocity.is_finite() {
            initial_velocity * duration_secs.max(0.0)
        } else {
            0.0
        };
        let omega = -SETTLE_EPSILON.ln() / zeta;

        Self {
            zeta,
            omega,
            velocity,
        }
    }

    /// Spring position for normalized time t, from 0 toward 1
    pub fn position(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        let zeta = self.zeta;
        let omega = self.omega;
        let v0 = self.velocity;

        if zeta < 1.0 - MIN_DAMPING {
            // Underdamped: decaying oscillation around the target
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let envelope = (-zeta * omega * t).exp();
            let coeff = (zeta * omega - v0) / omega_d;
            1.0 - envelope * ((omega_d * t).cos() + coeff * (omega_d * t).sin())
        } else if zeta < 1.0 + MIN_DAMPING {
            // Critically damped: fastest approach without oscillation
            let envelope = (-omega * t).exp();
            1.0 - envelope * (1.0 + (omega - v0) * t)
        } else {
            // Overdamped: two decaying exponentials
            let root = (zeta * zeta - 1.0).sqrt();
            let r1 = -omega * (zeta - root);
            let r2 = -omega * (zeta + root);
            let a = (v0 + r2) / (r1 - r2);
            let b = -1.0 - a;
            1.0 + a * (r1 * t).exp() + b * (r2 * t).exp()
        }
    }
}
