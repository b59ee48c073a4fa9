use anyhow::{anyhow, Context, Result};
use kestrel_sprite_anim::atlas::{parse_atlas_slice, AtlasDescription};
use kestrel_sprite_anim::clips::group_clips;
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(summary) if summary.failed() => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("atlas_check error: {err:?}");
            ExitCode::from(1)
        }
    }
}

#[derive(Default, Serialize)]
struct RunSummary {
    checked: usize,
    warnings: usize,
    errors: usize,
    #[serde(skip)]
    fail_on_warn: bool,
}

impl RunSummary {
    fn failed(&self) -> bool {
        self.errors > 0 || (self.fail_on_warn && self.warnings > 0)
    }
}

struct CliOptions {
    fail_on_warn: bool,
    report_stats: bool,
    show_help: bool,
    clips: Vec<String>,
    targets: Vec<String>,
}

fn run(args: &[String]) -> Result<RunSummary> {
    let options = parse_cli_args(args)?;
    let mut summary = RunSummary { fail_on_warn: options.fail_on_warn, ..RunSummary::default() };
    if options.show_help {
        print_usage();
        return Ok(summary);
    }
    let targets = AtlasTargets::gather(&options.targets)?;
    if targets.is_empty() {
        return Err(anyhow!("no atlas files found in provided paths"));
    }
    for path in targets {
        summary.checked += 1;
        let bytes = fs::read(&path).with_context(|| format!("failed to read '{}'", path.display()))?;
        match parse_atlas_slice(&bytes) {
            Ok(atlas) => summary.warnings += report_atlas(&path, &atlas, &options),
            Err(err) => {
                println!("[ERROR] {} - {err}", path.display());
                if options.report_stats {
                    println!("{}", json!({ "severity": "error", "path": path.display().to_string(), "message": err.to_string() }));
                }
                summary.errors += 1;
            }
        }
    }
    println!("Checked {} atlases ({} warnings, {} errors)", summary.checked, summary.warnings, summary.errors);
    if options.report_stats {
        println!("{}", json!({ "summary": summary }));
    }
    Ok(summary)
}

fn report_atlas(path: &Path, atlas: &AtlasDescription, options: &CliOptions) -> usize {
    let shape = if atlas.is_flat() { "flat" } else { "keyed" };
    println!(
        "OK {} - {} frames ({shape}), image {}x{}",
        path.display(),
        atlas.frame_count(),
        atlas.image_size.x,
        atlas.image_size.y
    );
    let mut warnings = 0;
    if atlas.frame_count() == 0 {
        println!("[WARN] {} - atlas has no frames", path.display());
        warnings += 1;
    }
    let clips = group_clips(atlas, &options.clips);
    for clip in clips.iter() {
        if clip.is_empty() {
            println!("[WARN] {} - clip '{}' matches no frames", path.display(), clip.name);
            warnings += 1;
        } else {
            println!("  clip '{}': {}", clip.name, clip.frame_names().join(", "));
        }
        if options.report_stats {
            println!(
                "{}",
                json!({
                    "path": path.display().to_string(),
                    "clip": clip.name.as_ref(),
                    "frames": clip.len(),
                })
            );
        }
    }
    if atlas.is_flat() && !options.clips.is_empty() {
        println!("[WARN] {} - flat atlas ignores --clips", path.display());
        warnings += 1;
    }
    warnings
}

fn print_usage() {
    eprintln!(
        "Atlas Check

Usage:
  atlas_check [--fail-on-warn] [--report-stats] [--clips a,b,...] <path> [<path>...]

Each <path> may be a JSON atlas or a directory that is walked recursively.
--clips groups hash atlases into the named clips and reports their frames.
Malformed atlases exit with code 2; --fail-on-warn does the same for warnings.
"
    );
}

fn parse_cli_args(args: &[String]) -> Result<CliOptions> {
    let mut options = CliOptions {
        fail_on_warn: false,
        report_stats: false,
        show_help: false,
        clips: Vec::new(),
        targets: Vec::new(),
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--fail-on-warn" => options.fail_on_warn = true,
            "--report-stats" => options.report_stats = true,
            "--help" | "-h" => options.show_help = true,
            "--clips" => {
                let value = iter.next().ok_or_else(|| anyhow!("expected a value after '--clips'"))?;
                options.clips.extend(
                    value.split(',').map(str::trim).filter(|name| !name.is_empty()).map(str::to_string),
                );
            }
            _ if arg.starts_with("--") => {
                return Err(anyhow!("unknown flag '{arg}'"));
            }
            _ => options.targets.push(arg.clone()),
        }
    }
    Ok(options)
}

/// Atlas files to check, deduplicated by canonical path, in discovery order.
#[derive(Default)]
struct AtlasTargets {
    seen: HashSet<PathBuf>,
    files: Vec<PathBuf>,
}

impl AtlasTargets {
    fn gather(inputs: &[String]) -> Result<Vec<PathBuf>> {
        let mut targets = Self::default();
        for input in inputs {
            let path = Path::new(input);
            let meta = fs::metadata(path).with_context(|| format!("cannot access '{input}'"))?;
            if meta.is_dir() {
                targets.scan_dir(path).with_context(|| format!("failed to enumerate directory '{input}'"))?;
            } else {
                targets.push(path);
            }
        }
        Ok(targets.files)
    }

    /// Children are visited in sorted path order.
    fn scan_dir(&mut self, dir: &Path) -> Result<()> {
        let mut children = fs::read_dir(dir)?
            .map(|entry| -> Result<PathBuf> { Ok(entry?.path()) })
            .collect::<Result<Vec<_>>>()?;
        children.sort();
        for child in children {
            if child.is_dir() {
                self.scan_dir(&child)?;
            } else if has_json_extension(&child) {
                self.push(&child);
            }
        }
        Ok(())
    }

    fn push(&mut self, path: &Path) {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if self.seen.insert(key.clone()) {
            self.files.push(key);
        }
    }
}

fn has_json_extension(path: &Path) -> bool {
    path.extension().and_then(OsStr::to_str).is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
