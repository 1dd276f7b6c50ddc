/// Edit Session - Interactive preset editor on the terminal stage
/// Run with: cargo run --example edit_session
/// Reproduces the original edit screen: pick a preset, nudge its fields
/// in 0.1 steps, pick a curve, trigger it from the baseline

use std::io::{self, Write};

use motionlab::animation::{demo_catalog, presets, Animation, Animator, Catalog};
use motionlab::display_secs;
use motionlab::stage::TerminalSurface;
use motionlab::{CurveOptions, EasingCurve};

const FIELD_STEP: f32 = 0.1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🎛️  Motionlab Edit Session");
    println!("==========================");
    println!("Edits land on the selected preset only; values are kept verbatim\n");

    let stage = presets::demo_stage();
    let screen_width = stage.screen_width();
    let animator = Animator::new(stage, Box::new(TerminalSurface::new(screen_width)));
    let mut catalog = demo_catalog();

    loop {
        show_catalog(&catalog);
        print!("   > ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        match input.trim() {
            "q" | "quit" => {
                println!("   👋 Goodbye!");
                break;
            }
            "t" | "" => trigger(&animator, &mut catalog).await,
            "c" => pick_curve(&animator, &mut catalog).await?,
            "dur+" => nudge_duration(catalog.selected_mut(), FIELD_STEP),
            "dur-" => nudge_duration(catalog.selected_mut(), -FIELD_STEP),
            "del+" => nudge_delay(catalog.selected_mut(), FIELD_STEP),
            "del-" => nudge_delay(catalog.selected_mut(), -FIELD_STEP),
            "damp+" => nudge_damping(catalog.selected_mut(), FIELD_STEP),
            "damp-" => nudge_damping(catalog.selected_mut(), -FIELD_STEP),
            "vel+" => nudge_velocity(catalog.selected_mut(), FIELD_STEP),
            "vel-" => nudge_velocity(catalog.selected_mut(), -FIELD_STEP),
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 && n <= catalog.len() => {
                    catalog.select(n - 1);
                    println!("   ▶ {}", catalog.selected().tag);
                }
                _ => println!("   ❌ Unknown command\n"),
            },
        }
    }

    animator.shutdown().await;
    Ok(())
}

fn show_catalog(catalog: &Catalog) {
    println!("   ──────────────────────────────────────────────────────");
    for (index, animation) in catalog.iter().enumerate() {
        let marker = if index == catalog.selected_index() {
            "▶"
        } else {
            " "
        };
        let motion = match animation.spring_params() {
            Some((damping, velocity)) => format!("spring {damping:.1}/{velocity:.1}"),
            None => "tween".to_string(),
        };
        println!(
            "   {marker} {}. {:<8} {:>4}s +{}s  {:<13} {}",
            index + 1,
            animation.tag,
            display_secs(animation.duration_secs),
            display_secs(animation.delay_secs),
            curve_label(animation.options),
            motion,
        );
    }
    println!("   ──────────────────────────────────────────────────────");
    println!(
        "   [1-{}] select  [t]rigger  [c]urve  [dur±] [del±] [damp±] [vel±]  [q]uit",
        catalog.len()
    );
}

async fn trigger(animator: &Animator, catalog: &mut Catalog) {
    println!("\n   🎬 {} from the baseline:", catalog.selected().tag);
    animator.reset_stage();
    catalog.selected_mut().perform(animator);
    animator.idle().await;
    println!();
}

async fn pick_curve(animator: &Animator, catalog: &mut Catalog) -> anyhow::Result<()> {
    println!("\n   🎨 Curve picker:");
    for (index, curve) in EasingCurve::ALL.iter().enumerate() {
        println!("   {}. {}", index + 1, curve.name());
    }
    println!("   {}. platform default", EasingCurve::ALL.len() + 1);

    // The open picker pushes the rows below it down
    animator.with_view(|view| view.transform.translate_y = 24.0);

    print!("   pick: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let animation = catalog.selected_mut();
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=EasingCurve::ALL.len()).contains(&n) => {
            let curve = EasingCurve::ALL[n - 1];
            animation.options = curve.options();
            println!("   curve set to {}", curve.name());
        }
        Ok(n) if n == EasingCurve::ALL.len() + 1 => {
            animation.options = CurveOptions::empty();
            println!("   curve cleared, platform default applies");
        }
        _ => println!("   ❌ Not a curve, keeping {}", curve_label(animation.options)),
    }

    collapse_picker(animator).await;
    Ok(())
}

/// Close the picker with its settling spring
///
/// The closing animation must not start inside the selection handler;
/// it waits for the next run-loop tick before performing.
async fn collapse_picker(animator: &Animator) {
    animator.next_tick().await;

    let mut collapse = Animation::spring(
        "picker",
        0.5,
        CurveOptions::EASE_IN_OUT,
        0.8,
        0.7,
        |view| view.transform.translate_y = 0.0,
    );
    collapse.perform(animator);
    animator.idle().await;
    println!();
}

fn nudge_duration(animation: &mut Animation, step: f32) {
    animation.duration_secs += step;
    println!(
        "   {} duration {}s",
        animation.tag,
        display_secs(animation.duration_secs)
    );
}

fn nudge_delay(animation: &mut Animation, step: f32) {
    animation.delay_secs += step;
    println!(
        "   {} delay {}s",
        animation.tag,
        display_secs(animation.delay_secs)
    );
}

fn nudge_damping(animation: &mut Animation, step: f32) {
    match animation.spring_params() {
        Some((damping, _)) => {
            animation.set_damping(damping + step);
            println!("   {} damping {:.1}", animation.tag, damping + step);
        }
        None => println!("   ❌ '{}' is a tween, no spring fields", animation.tag),
    }
}

fn nudge_velocity(animation: &mut Animation, step: f32) {
    match animation.spring_params() {
        Some((_, velocity)) => {
            animation.set_initial_velocity(velocity + step);
            println!("   {} velocity {:.1}", animation.tag, velocity + step);
        }
        None => println!("   ❌ '{}' is a tween, no spring fields", animation.tag),
    }
}

fn curve_label(options: CurveOptions) -> String {
    if options.is_empty() {
        return "(default)".to_string();
    }
    match EasingCurve::from_options(options) {
        Some(curve) => curve.name().to_string(),
        None => "(mixed)".to_string(),
    }
}
