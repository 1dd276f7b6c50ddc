use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::motion::{Motion, MotionCurve};
use super::Animation;
use crate::stage::surface::SurfaceBox;
use crate::stage::{Frame, Stage, ViewState};

/// 60fps tick rate, the same cadence the heartbeat runs at
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// One started transaction, as handed to the motion primitive
///
/// `motion` holds the model's parameters verbatim; `effective_curve` is
/// what empty or mixed option sets resolved to. `start` already has any
/// preparation applied.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub tag: String,
    pub delay_secs: f32,
    pub duration_secs: f32,
    pub motion: Motion,
    pub effective_curve: super::EasingCurve,
    pub start: ViewState,
    pub target: ViewState,
}

#[derive(Debug, Clone, Copy)]
pub struct AnimatorStats {
    pub started: u64,
    pub completed: u64,
    pub frames_presented: u64,
    pub active: usize,
}

struct Shared {
    stage: Mutex<Stage>,
    surface: AsyncMutex<SurfaceBox>,
    history: Mutex<Vec<TransactionRecord>>,
    started: AtomicU64,
    completed: AtomicU64,
    frames: AtomicU64,
    active: watch::Sender<usize>,
    tick: watch::Sender<u64>,
}

impl Shared {
    fn stage(&self) -> MutexGuard<'_, Stage> {
        self.stage.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn history(&self) -> MutexGuard<'_, Vec<TransactionRecord>> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Drives animated transactions against one stage and one surface
///
/// Stands in for the platform animation system: `perform` hands it a
/// transaction, a spawned task interpolates the view at 60fps and
/// presents each frame. A heartbeat task pulses `next_tick` waiters
/// every frame interval whether or not anything is animating.
pub struct Animator {
    shared: Arc<Shared>,
    heartbeat: JoinHandle<()>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Animator {
    /// Must be called from within a tokio runtime
    pub fn new(stage: Stage, surface: SurfaceBox) -> Self {
        let (active, _) = watch::channel(0usize);
        let (tick, _) = watch::channel(0u64);

        let shared = Arc::new(Shared {
            stage: Mutex::new(stage),
            surface: AsyncMutex::new(surface),
            history: Mutex::new(Vec::new()),
            started: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            frames: AtomicU64::new(0),
            active,
            tick,
        });

        let heartbeat = {
            let shared = Arc::clone(&shared);
            tokio::spawn(async move {
                let mut ticker = interval(FRAME_INTERVAL);
                loop {
                    ticker.tick().await;
                    shared.tick.send_modify(|count| *count += 1);
                }
            })
        };

        Self {
            shared,
            heartbeat,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Run a closure against the live view state, synchronously
    pub fn with_view<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        f(&mut self.shared.stage().view)
    }

    pub fn view_snapshot(&self) -> ViewState {
        self.shared.stage().view
    }

    pub fn baseline_offset(&self) -> f32 {
        self.shared.stage().baseline_offset()
    }

    pub fn screen_width(&self) -> f32 {
        self.shared.stage().screen_width()
    }

    /// Park the view back at its baseline
    ///
    /// The trigger path calls this before re-performing a preset;
    /// performing never resets anything by itself.
    pub fn reset_stage(&self) {
        self.shared.stage().reset();
        debug!("📐 Stage reset to baseline");
    }

    /// Start exactly one transaction for the given animation
    pub(crate) fn begin(&self, animation: &Animation, start: ViewState, target: ViewState) {
        let duration = clamp_secs(animation.duration_secs);
        let delay = clamp_secs(animation.delay_secs);
        let curve = animation.motion.curve(animation.options, duration.as_secs_f32());

        let record = TransactionRecord {
            id: Uuid::new_v4(),
            tag: animation.tag.clone(),
            delay_secs: animation.delay_secs,
            duration_secs: animation.duration_secs,
            motion: animation.motion,
            effective_curve: animation.options.resolve(),
            start,
            target,
        };

        info!(
            "🎬 Transaction '{}' started ({})",
            record.tag,
            curve_label(&curve)
        );
        debug!(
            "   id={} delay={:?} duration={:?} start_offset={:.1} target_offset={:.1}",
            record.id, delay, duration, start.offset, target.offset
        );

        let transaction = Transaction {
            id: record.id,
            tag: record.tag.clone(),
            delay,
            duration,
            curve,
            start,
            target,
        };

        self.shared.history().push(record);
        self.shared.started.fetch_add(1, Ordering::SeqCst);
        self.shared.active.send_modify(|count| *count += 1);

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(run_transaction(shared, transaction));
        let mut tasks = self
            .tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Wait until no transaction is in flight
    ///
    /// A driver affordance for callers and tests; performing an
    /// animation never requires anyone to await this.
    pub async fn idle(&self) {
        let mut active = self.shared.active.subscribe();
        let _ = active.wait_for(|count| *count == 0).await;
    }

    /// Wait for the next heartbeat pulse
    ///
    /// Deferring work here lands it on the next run-loop iteration,
    /// after the current call stack has fully unwound.
    pub async fn next_tick(&self) {
        let mut tick = self.shared.tick.subscribe();
        let _ = tick.changed().await;
    }

    /// Every transaction started so far, oldest first
    pub fn history(&self) -> Vec<TransactionRecord> {
        self.shared.history().clone()
    }

    pub fn stats(&self) -> AnimatorStats {
        AnimatorStats {
            started: self.shared.started.load(Ordering::SeqCst),
            completed: self.shared.completed.load(Ordering::SeqCst),
            frames_presented: self.shared.frames.load(Ordering::SeqCst),
            active: *self.shared.active.borrow(),
        }
    }

    /// Stop the heartbeat and wait for in-flight transactions
    pub async fn shutdown(&self) {
        self.heartbeat.abort();

        let handles: Vec<JoinHandle<()>> = {
            let mut tasks = self
                .tasks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            tasks.drain(..).collect()
        };
        for result in join_all(handles).await {
            if let Err(e) = result {
                if !e.is_cancelled() {
                    warn!("⚠️  Transaction task failed: {}", e);
                }
            }
        }

        let stats = self.stats();
        info!(
            "⏹️  Animator stopped: {} transactions, {} frames",
            stats.completed, stats.frames_presented
        );
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        self.heartbeat.abort();
        let tasks = self
            .tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for handle in tasks.iter() {
            handle.abort();
        }
    }
}

struct Transaction {
    id: Uuid,
    tag: String,
    delay: Duration,
    duration: Duration,
    curve: MotionCurve,
    start: ViewState,
    target: ViewState,
}

async fn run_transaction(shared: Arc<Shared>, transaction: Transaction) {
    // The start state is visible during the delay
    present(&shared, &transaction, Duration::ZERO, 0.0, transaction.start).await;

    if !transaction.delay.is_zero() {
        sleep(transaction.delay).await;
    }

    let begun = Instant::now();
    let mut ticker = interval(FRAME_INTERVAL);
    loop {
        ticker.tick().await;
        let elapsed = begun.elapsed();
        let t = if transaction.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / transaction.duration.as_secs_f32()).min(1.0)
        };

        if t >= 1.0 {
            // Land on the exact target, not an interpolated neighbor
            present(&shared, &transaction, elapsed, 1.0, transaction.target).await;
            break;
        }

        let progress = transaction.curve.progress(t);
        let view = transaction.start.interpolate(&transaction.target, progress);
        present(&shared, &transaction, elapsed, progress, view).await;
    }

    {
        let mut surface = shared.surface.lock().await;
        if let Err(e) = surface.finish(&transaction.tag).await {
            warn!("⚠️  Surface '{}' failed to finish: {}", surface.name(), e);
        }
    }

    shared.completed.fetch_add(1, Ordering::SeqCst);
    shared.active.send_modify(|count| *count -= 1);
    info!("✅ Transaction '{}' completed", transaction.tag);
}

async fn present(
    shared: &Arc<Shared>,
    transaction: &Transaction,
    elapsed: Duration,
    progress: f32,
    view: ViewState,
) {
    let frame = {
        let mut stage = shared.stage();
        stage.view = view;
        Frame {
            transaction: transaction.id,
            tag: transaction.tag.clone(),
            elapsed_secs: elapsed.as_secs_f32(),
            progress,
            view,
        }
    };

    let mut surface = shared.surface.lock().await;
    if let Err(e) = surface.present(&frame).await {
        warn!("⚠️  Surface '{}' failed to present: {}", surface.name(), e);
    }
    shared.frames.fetch_add(1, Ordering::SeqCst);
}

/// Boundary clamp: the model stores values verbatim, the driver floors
/// negatives and non-finite values to zero exactly once, here
fn clamp_secs(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs.max(0.0)).unwrap_or(Duration::ZERO)
}

fn curve_label(curve: &MotionCurve) -> &'static str {
    match curve {
        MotionCurve::Tween(easing) => easing.name(),
        MotionCurve::Spring(_) => "spring",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::easing::CurveOptions;
    use crate::animation::EasingCurve;
    use crate::stage::{NullSurface, RecordingSurface};
    use std::sync::Mutex as StdMutex;

    fn test_animator() -> Animator {
        // Stage center is 100 units from a baseline at offset 100
        Animator::new(Stage::new(200.0, 0.0), Box::new(NullSurface))
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_transaction_per_perform() {
        let animator = test_animator();
        let mut animation = Animation::new("First", 1.0, CurveOptions::empty(), |view| {
            view.offset = 0.0;
        });

        animation.perform(&animator);
        animator.idle().await;

        let stats = animator.stats();
        assert_eq!(stats.started, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.active, 0);

        let history = animator.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].tag, "First");
        assert_eq!(history[0].delay_secs, 0.0);
        assert_eq!(history[0].duration_secs, 1.0);
        assert_eq!(history[0].effective_curve, EasingCurve::EaseInOut);
        assert_eq!(history[0].start.offset, 100.0);
        assert_eq!(history[0].target.offset, 0.0);

        assert_eq!(animator.view_snapshot().offset, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preparation_runs_before_transaction() {
        let animator = test_animator();
        let events = Arc::new(StdMutex::new(Vec::new()));

        let prep_events = Arc::clone(&events);
        let anim_events = Arc::clone(&events);
        let mut animation = Animation::new("Second", 1.0, CurveOptions::empty(), move |view| {
            anim_events.lock().unwrap().push("animate");
            view.transform = crate::stage::Transform::identity();
            view.offset = 0.0;
        })
        .with_prepare(move |view| {
            prep_events.lock().unwrap().push("prepare");
            view.transform.rotation = -90.0;
            view.transform.scale_x = 0.25;
            view.transform.scale_y = 0.25;
        });

        animation.perform(&animator);

        // Both blocks already ran by the time perform returned
        assert_eq!(*events.lock().unwrap(), vec!["prepare", "animate"]);

        // The transaction's start snapshot has the preparation applied
        let history = animator.history();
        assert_eq!(history[0].start.transform.rotation, -90.0);
        assert_eq!(history[0].start.transform.scale_x, 0.25);
        assert!(history[0].target.transform.is_identity());

        animator.idle().await;
        assert!(animator.view_snapshot().transform.is_identity());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_preparation_path() {
        let animator = test_animator();
        let mut animation = Animation::new("First", 1.0, CurveOptions::empty(), |view| {
            view.offset = 0.0;
        });
        assert!(!animation.has_preparation());

        animation.perform(&animator);
        animator.idle().await;

        assert_eq!(animator.stats().started, 1);
        assert_eq!(animator.view_snapshot().offset, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spring_params_reach_primitive_verbatim() {
        let animator = test_animator();
        let mut animation = Animation::spring(
            "Spring1",
            1.0,
            CurveOptions::EASE_IN_OUT,
            0.6,
            0.7,
            |view| view.offset = 0.0,
        );

        animation.perform(&animator);
        animator.idle().await;

        let history = animator.history();
        assert_eq!(
            history[0].motion,
            Motion::Spring {
                damping: 0.6,
                initial_velocity: 0.7
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tween_never_carries_spring_fields() {
        let animator = test_animator();
        let mut animation = Animation::new("First", 1.0, CurveOptions::LINEAR, |view| {
            view.offset = 0.0;
        });

        animation.perform(&animator);
        animator.idle().await;

        let history = animator.history();
        assert_eq!(history[0].motion, Motion::Tween);
        assert_eq!(history[0].effective_curve, EasingCurve::Linear);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_still_transacts() {
        let animator = test_animator();
        let mut animation = Animation::new("Instant", 0.0, CurveOptions::empty(), |view| {
            view.offset = 0.0;
        });

        animation.perform(&animator);
        animator.idle().await;

        assert_eq!(animator.stats().started, 1);
        assert_eq!(animator.view_snapshot().offset, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_negative_timing_clamps_at_driver_only() {
        let animator = test_animator();
        let mut animation = Animation::new("Backward", -1.0, CurveOptions::empty(), |view| {
            view.offset = 0.0;
        })
        .with_delay(-0.5);

        animation.perform(&animator);
        animator.idle().await;

        // Model values stay verbatim in the record, the run completes
        let history = animator.history();
        assert_eq!(history[0].duration_secs, -1.0);
        assert_eq!(history[0].delay_secs, -0.5);
        assert_eq!(animator.view_snapshot().offset, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_transactions() {
        let surface = RecordingSurface::new();
        let frames = surface.frames();
        let animator = Animator::new(Stage::new(200.0, 0.0), Box::new(surface));

        let mut first = Animation::new("First", 1.0, CurveOptions::empty(), |view| {
            view.offset = 0.0;
        });
        let mut second = Animation::new("Second", 0.5, CurveOptions::empty(), |view| {
            view.opacity = 0.0;
        });

        first.perform(&animator);
        second.perform(&animator);
        assert_eq!(animator.stats().started, 2);

        animator.idle().await;
        assert_eq!(animator.stats().completed, 2);

        // Interleaved frames stay attributable to their transaction
        let history = animator.history();
        let frames = frames.lock().unwrap();
        for frame in frames.iter() {
            let record = history
                .iter()
                .find(|record| record.id == frame.transaction)
                .unwrap();
            assert_eq!(record.tag, frame.tag);
        }
        assert!(frames.iter().any(|f| f.transaction == history[0].id));
        assert!(frames.iter().any(|f| f.transaction == history[1].id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_recorded_in_order() {
        let surface = RecordingSurface::new();
        let frames = surface.frames();
        let animator = Animator::new(Stage::new(200.0, 0.0), Box::new(surface));

        let mut animation = Animation::new("First", 1.0, CurveOptions::empty(), |view| {
            view.offset = 0.0;
        });
        animation.perform(&animator);
        animator.idle().await;

        let frames = frames.lock().unwrap();
        assert!(frames.len() > 10);
        assert_eq!(frames.first().unwrap().progress, 0.0);
        assert_eq!(frames.last().unwrap().progress, 1.0);
        assert_eq!(frames.last().unwrap().view.offset, 0.0);

        let mut last_elapsed = -1.0;
        for frame in frames.iter() {
            assert!(frame.elapsed_secs >= last_elapsed);
            last_elapsed = frame.elapsed_secs;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_spring_frames_overshoot_target() {
        let surface = RecordingSurface::new();
        let frames = surface.frames();
        let animator = Animator::new(Stage::new(200.0, 0.0), Box::new(surface));

        let mut animation =
            Animation::spring("Loose", 1.0, CurveOptions::empty(), 0.3, 0.0, |view| {
                view.offset = 0.0;
            });
        animation.perform(&animator);
        animator.idle().await;

        let frames = frames.lock().unwrap();
        let min_offset = frames
            .iter()
            .map(|frame| frame.view.offset)
            .fold(f32::MAX, f32::min);
        assert!(
            min_offset < -1.0,
            "spring never crossed the target, min {min_offset}"
        );
        assert_eq!(frames.last().unwrap().view.offset, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_holds_start_state() {
        let surface = RecordingSurface::new();
        let frames = surface.frames();
        let animator = Animator::new(Stage::new(200.0, 0.0), Box::new(surface));

        let mut animation = Animation::new("Patient", 0.2, CurveOptions::empty(), |view| {
            view.offset = 0.0;
        })
        .with_delay(0.5);
        animation.perform(&animator);
        animator.idle().await;

        let frames = frames.lock().unwrap();
        assert_eq!(frames.first().unwrap().view.offset, 100.0);
        assert_eq!(frames.last().unwrap().view.offset, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_between_runs() {
        let animator = test_animator();
        let mut animation = Animation::new("First", 0.2, CurveOptions::empty(), |view| {
            view.offset = 0.0;
        });

        animation.perform(&animator);
        animator.idle().await;
        assert_eq!(animator.view_snapshot().offset, 0.0);

        animator.reset_stage();
        assert_eq!(animator.view_snapshot().offset, 100.0);

        animation.perform(&animator);
        animator.idle().await;
        assert_eq!(animator.view_snapshot().offset, 0.0);
        assert_eq!(animator.stats().started, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_tick_resolves() {
        let animator = test_animator();
        animator.next_tick().await;
        animator.next_tick().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_transactions() {
        let animator = test_animator();
        let mut animation = Animation::new("First", 0.3, CurveOptions::empty(), |view| {
            view.offset = 0.0;
        });

        animation.perform(&animator);
        animator.shutdown().await;

        assert_eq!(animator.stats().completed, 1);
        assert_eq!(animator.view_snapshot().offset, 0.0);
    }
}
