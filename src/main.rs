use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

use motionlab::animation::{demo_catalog, presets, Animation, Animator, Catalog};
use motionlab::config::{default_config_path, Config};
use motionlab::core::hot_reload::{HotReloadConfig, HotReloadManager};
use motionlab::stage::{NullSurface, Stage, TerminalSurface};
use motionlab::{display_secs, CurveOptions, EasingCurve};

#[derive(Parser)]
#[command(name = "motionlab")]
#[command(about = "Preset-driven view animations with editable timing")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Preset file path (built-in presets are used when omitted and
    /// the default file is missing)
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List presets and their current values
    List {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Reset the stage and run one preset
    Run {
        /// Preset tag or zero-based index (defaults to the first)
        preset: Option<String>,

        /// Override duration in seconds
        #[arg(long)]
        duration: Option<f32>,

        /// Override delay in seconds
        #[arg(long)]
        delay: Option<f32>,

        /// Override easing curve by display name
        #[arg(long)]
        curve: Option<String>,

        /// Override spring damping (spring presets only)
        #[arg(long)]
        damping: Option<f32>,

        /// Override spring initial velocity (spring presets only)
        #[arg(long)]
        velocity: Option<f32>,

        /// Skip terminal rendering
        #[arg(long)]
        headless: bool,
    },
    /// Re-run a preset every time the preset file changes
    Watch {
        /// Preset tag or zero-based index (defaults to the first)
        preset: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("motionlab={log_level}"))
        .with_target(false)
        .init();

    info!("🎛️  Starting Motionlab v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::List { json } => {
            let (_, catalog) = load_presets(&cli.config).await?;
            list_presets(&catalog, json)
        }
        Commands::Run {
            preset,
            duration,
            delay,
            curve,
            damping,
            velocity,
            headless,
        } => {
            let (stage, mut catalog) = load_presets(&cli.config).await?;
            select_preset(&mut catalog, preset.as_deref())?;

            let animation = catalog.selected_mut();
            apply_overrides(animation, duration, delay, curve.as_deref(), damping, velocity)?;

            perform_selected(stage, &mut catalog, headless).await
        }
        Commands::Watch { preset } => watch(&cli.config, preset.as_deref()).await,
    }
}

/// Load the preset file, or fall back to the built-in catalog
///
/// An explicitly given path must load; the default path is allowed to
/// be absent.
async fn load_presets(config: &Option<String>) -> Result<(Stage, Catalog)> {
    let (path, required) = match config {
        Some(path) => (path.clone(), true),
        None => (default_config_path(), false),
    };

    match Config::load(&path).await {
        Ok(config) => {
            let catalog = config.build_catalog();
            if catalog.is_empty() {
                bail!("preset file '{}' contains no usable presets", path);
            }
            Ok((config.stage(), catalog))
        }
        Err(e) if required => Err(e),
        Err(_) => {
            info!("📋 No preset file at '{}', using built-in presets", path);
            Ok((presets::demo_stage(), demo_catalog()))
        }
    }
}

fn select_preset(catalog: &mut Catalog, preset: Option<&str>) -> Result<()> {
    let Some(wanted) = preset else {
        return Ok(());
    };

    if let Ok(index) = wanted.parse::<usize>() {
        if index >= catalog.len() {
            bail!(
                "preset index {} out of bounds ({} presets)",
                index,
                catalog.len()
            );
        }
        catalog.select(index);
        return Ok(());
    }

    if !catalog.select_tag(wanted) {
        bail!(
            "no preset tagged '{}' (available: {})",
            wanted,
            catalog.tags().join(", ")
        );
    }
    Ok(())
}

/// The live-edit write path: overrides land on the selected preset's
/// fields exactly as the edit surface would write them
fn apply_overrides(
    animation: &mut Animation,
    duration: Option<f32>,
    delay: Option<f32>,
    curve: Option<&str>,
    damping: Option<f32>,
    velocity: Option<f32>,
) -> Result<()> {
    if let Some(duration) = duration {
        animation.duration_secs = duration;
    }
    if let Some(delay) = delay {
        animation.delay_secs = delay;
    }
    if let Some(name) = curve {
        let curve = EasingCurve::from_name(name)
            .ok_or_else(|| anyhow!("unknown curve '{}' (try: ease-in-out, ease-in, ease-out, linear)", name))?;
        animation.options = curve.options();
    }
    if let Some(damping) = damping {
        if !animation.set_damping(damping) {
            warn!(
                "⚠️  '{}' is not a spring preset, --damping ignored",
                animation.tag
            );
        }
    }
    if let Some(velocity) = velocity {
        if !animation.set_initial_velocity(velocity) {
            warn!(
                "⚠️  '{}' is not a spring preset, --velocity ignored",
                animation.tag
            );
        }
    }
    Ok(())
}

async fn perform_selected(stage: Stage, catalog: &mut Catalog, headless: bool) -> Result<()> {
    let screen_width = stage.screen_width();
    let animator = if headless {
        Animator::new(stage, Box::new(NullSurface))
    } else {
        Animator::new(stage, Box::new(TerminalSurface::new(screen_width)))
    };

    announce(catalog.selected());

    animator.reset_stage();
    catalog.selected_mut().perform(&animator);
    animator.idle().await;

    let stats = animator.stats();
    println!(
        "✅ {} transaction(s), {} frames, final offset {:.1}",
        stats.completed,
        stats.frames_presented,
        animator.view_snapshot().offset
    );

    animator.shutdown().await;
    Ok(())
}

async fn watch(config: &Option<String>, preset: Option<&str>) -> Result<()> {
    let raw = config.clone().unwrap_or_else(default_config_path);
    let path = shellexpand::tilde(&raw).into_owned();

    // First run before any change arrives
    {
        let (stage, mut catalog) = load_presets(&Some(path.clone())).await?;
        select_preset(&mut catalog, preset)?;
        perform_selected(stage, &mut catalog, false).await?;
    }

    let mut manager = HotReloadManager::new(path.as_str(), HotReloadConfig::default());
    let mut reloads = BroadcastStream::new(manager.subscribe());
    manager.start()?;
    println!("👀 Watching '{}' - edit the file to re-run, Ctrl-C to quit", path);

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                println!();
                info!("⏹️  Watch loop stopped");
                break;
            }
            Some(event) = reloads.next() => {
                if event.is_err() {
                    // Lagged receiver; the next change still reaches us
                    continue;
                }
                match load_presets(&Some(path.clone())).await {
                    Ok((stage, mut catalog)) => {
                        if let Err(e) = select_preset(&mut catalog, preset) {
                            warn!("⚠️  {}", e);
                            continue;
                        }
                        if let Err(e) = perform_selected(stage, &mut catalog, false).await {
                            warn!("⚠️  Run failed: {}", e);
                        }
                    }
                    Err(e) => warn!("⚠️  Reload failed: {:#}", e),
                }
            }
        }
    }

    manager.stop();
    Ok(())
}

fn announce(animation: &Animation) {
    let motion = match animation.spring_params() {
        Some((damping, velocity)) => {
            format!("spring damping {damping:.1} velocity {velocity:.1}")
        }
        None => describe_options(animation.options),
    };
    println!(
        "▶ {}: {}s after {}s delay, {}",
        animation.tag,
        display_secs(animation.duration_secs),
        display_secs(animation.delay_secs),
        motion
    );
}

fn list_presets(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        let entries: Vec<serde_json::Value> = catalog
            .iter()
            .map(|animation| {
                let spring = animation.spring_params().map(|(damping, velocity)| {
                    serde_json::json!({ "damping": damping, "initial_velocity": velocity })
                });
                serde_json::json!({
                    "tag": animation.tag,
                    "duration_secs": animation.duration_secs,
                    "delay_secs": animation.delay_secs,
                    "curve": EasingCurve::from_options(animation.options).map(|c| c.name()),
                    "spring": spring,
                    "has_preparation": animation.has_preparation(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("  #  Tag       Duration  Delay  Curve         Motion");
    println!("  ─────────────────────────────────────────────────────────");
    for (index, animation) in catalog.iter().enumerate() {
        let motion = match animation.spring_params() {
            Some((damping, velocity)) => format!("spring {damping:.1}/{velocity:.1}"),
            None => "tween".to_string(),
        };
        println!(
            "  {}  {:<9} {:>7}s {:>5}s  {:<13} {}{}",
            index,
            animation.tag,
            display_secs(animation.duration_secs),
            display_secs(animation.delay_secs),
            describe_options(animation.options),
            motion,
            if animation.has_preparation() {
                " +prep"
            } else {
                ""
            }
        );
    }
    Ok(())
}

fn describe_options(options: CurveOptions) -> String {
    if options.is_empty() {
        return "(default)".to_string();
    }
    match EasingCurve::from_options(options) {
        Some(curve) => curve.name().to_string(),
        None => "(mixed)".to_string(),
    }
}
