use crate::config::AnimatorConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliOverrides {
    fps: Option<f32>,
    looped: Option<bool>,
    clip: Option<String>,
    scale: Option<f32>,
    start: Option<usize>,
    end: Option<usize>,
    frames: Option<u32>,
    autoplay: Option<bool>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Use --fps/--loop/--clip/--scale with values.");
            };
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "fps" => {
                    overrides.fps = Some(value.parse::<f32>().with_context(|| format!("Invalid fps '{value}'"))?);
                }
                "loop" => overrides.looped = Some(parse_bool_flag("loop", &value)?),
                "autoplay" => overrides.autoplay = Some(parse_bool_flag("autoplay", &value)?),
                "clip" => overrides.clip = Some(value),
                "scale" => {
                    overrides.scale =
                        Some(value.parse::<f32>().with_context(|| format!("Invalid scale '{value}'"))?);
                }
                "start" => {
                    overrides.start =
                        Some(value.parse::<usize>().with_context(|| format!("Invalid start frame '{value}'"))?);
                }
                "end" => {
                    overrides.end =
                        Some(value.parse::<usize>().with_context(|| format!("Invalid end frame '{value}'"))?);
                }
                "frames" => {
                    overrides.frames =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid frame count '{value}'"))?);
                }
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --fps, --loop, --autoplay, --clip, --scale, --start, --end, --frames."
                ),
            }
        }
        Ok(overrides)
    }

    pub fn into_config_overrides(self) -> AnimatorConfigOverrides {
        AnimatorConfigOverrides {
            fps: self.fps,
            looped: self.looped,
            active_clip: self.clip,
            scale_factor: self.scale,
            start_frame: self.start,
            end_frame: self.end,
            number_of_frames: self.frames,
            auto_play: self.autoplay,
        }
    }
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}
