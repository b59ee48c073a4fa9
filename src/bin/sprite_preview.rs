use anyhow::{anyhow, bail, Context, Result};
use glam::UVec2;
use kestrel_sprite_anim::aspect::Viewport;
use kestrel_sprite_anim::cli::CliOverrides;
use kestrel_sprite_anim::config::AnimatorConfig;
use kestrel_sprite_anim::time::{FixedStepClock, FrameClock};
use kestrel_sprite_anim::{AnimationEvent, SpriteAnimator, TickOutcome};
use log::info;
use serde_json::{json, Value};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("sprite_preview error: {err:?}");
        process::exit(1);
    }
}

#[derive(Debug)]
struct PreviewOptions {
    image: Option<PathBuf>,
    image_size: Option<UVec2>,
    atlas: Option<PathBuf>,
    config: Option<PathBuf>,
    ticks: usize,
    step_ms: f64,
    viewport: Viewport,
    realtime: bool,
    json: bool,
    passthrough: Vec<String>,
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        return Ok(());
    }
    let options = parse_preview_args(&args)?;

    let mut config = match &options.config {
        Some(path) => AnimatorConfig::load(path)?,
        None => AnimatorConfig::default(),
    };
    let mut overrides_args = vec!["sprite_preview".to_string()];
    overrides_args.extend(options.passthrough.iter().cloned());
    let overrides = CliOverrides::parse(overrides_args)?.into_config_overrides();
    if !overrides.is_empty() {
        info!("[preview] CLI overrides: {}", overrides.applied_fields().join(", "));
        config.apply_overrides(&overrides);
    }

    let image_size = match (&options.image, options.image_size) {
        (_, Some(size)) => Some(size),
        (Some(path), None) => {
            let (w, h) = image::image_dimensions(path)
                .with_context(|| format!("failed to read image dimensions of '{}'", path.display()))?;
            Some(UVec2::new(w, h))
        }
        (None, None) => None,
    };
    let raw_atlas: Option<Value> = match &options.atlas {
        Some(path) => {
            let bytes = fs::read(path).with_context(|| format!("failed to read atlas '{}'", path.display()))?;
            Some(
                serde_json::from_slice(&bytes)
                    .with_context(|| format!("failed to parse atlas '{}'", path.display()))?,
            )
        }
        None => None,
    };

    let mut animator = SpriteAnimator::new(config, 0.0).with_viewport(options.viewport);
    animator.setup(raw_atlas.as_ref(), image_size).context("atlas setup failed")?;
    report_events(animator.drain_events(), 0.0, options.json);

    let signals = {
        let mut signals = animator.default_signals();
        signals.play = true;
        signals
    };
    let mut fixed = FixedStepClock::new(0.0, options.step_ms);
    let mut wall = FrameClock::new();
    for _ in 0..options.ticks {
        let tick = if options.realtime {
            thread::sleep(Duration::from_secs_f64(options.step_ms / 1000.0));
            wall.tick(signals)
        } else {
            fixed.tick(signals)
        };
        let outcome = animator.tick(&tick);
        let events = animator.drain_events();
        report_tick(&animator, tick.now_ms, outcome, options.json);
        report_events(events, tick.now_ms, options.json);
        if outcome == TickOutcome::Ended {
            break;
        }
    }
    info!(
        "[preview] stopped at cursor {} in phase '{}'",
        animator.clock().current_frame(),
        animator.phase().as_str()
    );
    Ok(())
}

fn report_tick(animator: &SpriteAnimator, now_ms: f64, outcome: TickOutcome, as_json: bool) {
    if outcome != TickOutcome::Advanced {
        return;
    }
    let params = animator.render_params();
    let Some(window) = params.window else {
        return;
    };
    let shown = animator.clock().current_frame().saturating_sub(1);
    if as_json {
        let image_size = animator.atlas().map(|atlas| atlas.image_size).unwrap_or(UVec2::ONE);
        let (min, max) = window.pixel_bounds(image_size);
        println!(
            "{}",
            json!({
                "t": now_ms,
                "frame": shown,
                "offset": [window.offset.x, window.offset.y],
                "repeat": [window.repeat.x, window.repeat.y],
                "pixels": [min.x, min.y, max.x, max.y],
                "scale": [params.scale.x, params.scale.y, params.scale.z],
            })
        );
    } else {
        println!(
            "t={now_ms:>8.1}ms frame={shown:<3} offset=({:.4}, {:.4}) repeat=({:.4}, {:.4}) scale=({:.3}, {:.3})",
            window.offset.x, window.offset.y, window.repeat.x, window.repeat.y, params.scale.x, params.scale.y
        );
    }
}

fn report_events(events: Vec<AnimationEvent>, now_ms: f64, as_json: bool) {
    for event in events {
        if as_json {
            println!("{}", json!({ "t": now_ms, "event": event.kind(), "detail": event.to_string() }));
        } else {
            println!("t={now_ms:>8.1}ms event {event}");
        }
    }
}

fn print_usage() {
    eprintln!(
        "Sprite Preview

Usage:
  sprite_preview [--image sheet.png | --size WxH] [--atlas atlas.json] [--config animator.json]
                 [--ticks N] [--step-ms MS] [--viewport WxH] [--realtime] [--json]
                 [--fps F] [--loop on|off] [--clip NAME] [--scale S] [--start I] [--end I] [--frames N]

Simulates host ticks against an animator and prints every addressed frame and
lifecycle event. Without --atlas the image is cut into --frames equal columns.
"
    );
}

fn parse_preview_args(args: &[String]) -> Result<PreviewOptions> {
    let mut options = PreviewOptions {
        image: None,
        image_size: None,
        atlas: None,
        config: None,
        ticks: 60,
        step_ms: 1000.0 / 60.0,
        viewport: Viewport::new(8.0, 6.0),
        realtime: false,
        json: false,
        passthrough: Vec::new(),
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--realtime" => options.realtime = true,
            "--json" => options.json = true,
            "--image" | "--size" | "--atlas" | "--config" | "--ticks" | "--step-ms" | "--viewport" => {
                let value = iter.next().ok_or_else(|| anyhow!("Expected a value after '{arg}'"))?;
                match arg.as_str() {
                    "--image" => options.image = Some(PathBuf::from(value)),
                    "--size" => options.image_size = Some(parse_dimensions(value)?),
                    "--atlas" => options.atlas = Some(PathBuf::from(value)),
                    "--config" => options.config = Some(PathBuf::from(value)),
                    "--ticks" => {
                        options.ticks =
                            value.parse().with_context(|| format!("Invalid tick count '{value}'"))?;
                    }
                    "--step-ms" => {
                        options.step_ms = value.parse().with_context(|| format!("Invalid step '{value}'"))?;
                    }
                    _ => {
                        let size = parse_dimensions(value)?;
                        options.viewport = Viewport::new(size.x as f32, size.y as f32);
                    }
                }
            }
            _ if arg.starts_with("--") => {
                let value = iter.next().ok_or_else(|| anyhow!("Expected a value after '{arg}'"))?;
                options.passthrough.push(arg.clone());
                options.passthrough.push(value.clone());
            }
            other => bail!("Unexpected argument '{other}'"),
        }
    }
    if options.image.is_none() && options.image_size.is_none() && options.atlas.is_none() {
        bail!("Provide --atlas, --image or --size");
    }
    Ok(options)
}

fn parse_dimensions(value: &str) -> Result<UVec2> {
    let (w, h) = value.split_once(|c: char| c == 'x' || c == 'X').ok_or_else(|| anyhow!("Expected WxH, got '{value}'"))?;
    let w: u32 = w.trim().parse().with_context(|| format!("Invalid width in '{value}'"))?;
    let h: u32 = h.trim().parse().with_context(|| format!("Invalid height in '{value}'"))?;
    Ok(UVec2::new(w, h))
}
