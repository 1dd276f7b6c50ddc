/// Slide Showcase - Runs the four built-in presets on the terminal stage
/// Run with: cargo run --example slide_showcase

use motionlab::animation::{demo_catalog, presets, Animation, Animator};
use motionlab::display_secs;
use motionlab::stage::TerminalSurface;
use motionlab::EasingCurve;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🎬 Motionlab Slide Showcase");
    println!("===========================");
    println!("Four presets, one stage: plain tweens, a prepared entrance and two springs\n");

    let stage = presets::demo_stage();
    let screen_width = stage.screen_width();
    let animator = Animator::new(stage, Box::new(TerminalSurface::new(screen_width)));
    let mut catalog = demo_catalog();

    for index in 0..catalog.len() {
        catalog.select(index);
        introduce(index, catalog.selected());

        // Reset is the trigger path's job; perform never rewinds the stage
        animator.reset_stage();
        catalog.selected_mut().perform(&animator);
        animator.idle().await;
        println!();
    }

    let stats = animator.stats();
    println!("✅ Showcase complete: {} transactions, {} frames presented\n", stats.completed, stats.frames_presented);

    println!("📋 Transaction log:");
    for record in animator.history() {
        let motion = match record.motion.spring_params() {
            Some((damping, velocity)) => format!("spring {damping:.1}/{velocity:.1}"),
            None => record.effective_curve.name().to_string(),
        };
        println!(
            "   {:<8} {}s after {}s delay  {:<22} offset {:>5.0} → {:>3.0}",
            record.tag,
            display_secs(record.duration_secs),
            display_secs(record.delay_secs),
            motion,
            record.start.offset,
            record.target.offset,
        );
    }

    animator.shutdown().await;
    Ok(())
}

fn introduce(index: usize, animation: &Animation) {
    const NUMBERS: [&str; 4] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣"];
    let number = NUMBERS.get(index).copied().unwrap_or("▶");

    let motion = match animation.spring_params() {
        Some((damping, velocity)) => {
            format!("damped spring ({damping:.1} damping, {velocity:.1} velocity)")
        }
        None => {
            let curve = EasingCurve::from_options(animation.options).unwrap_or_default();
            format!("{} tween", curve.name())
        }
    };

    println!("{number}  {} - {}s {}", animation.tag, display_secs(animation.duration_secs), motion);
    if animation.has_preparation() {
        println!("   Shrinks and tips off-screen first, then restores while sliding in");
    }
}
