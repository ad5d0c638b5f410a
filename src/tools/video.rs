//! Video generation tools.
//!
//! These tools never touch media. They turn recipe inputs into ffmpeg
//! filter strings, timelines and argument lists that a renderer can run.

use crate::tools::{args, text, ToolError, ToolRegistry};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

pub const BROLL_EFFECTS: &[&str] = &["ken_burns", "pan", "zoom"];
pub const MERGE_STRATEGIES: &[&str] = &["pad", "trim", "stretch"];

const MAX_ZOOM: f64 = 1.5;

pub fn register_broll(registry: &mut ToolRegistry) {
    registry.register_fn(
        "plan_broll",
        "Plan B-roll clips from still images with ken_burns, pan or zoom motion",
        plan_broll,
    );
}

pub fn register_voiceover(registry: &mut ToolRegistry) {
    registry.register_fn(
        "plan_voiceover",
        "Plan a TTS voice-over: split a script into timed speech segments for a voice",
        plan_voiceover,
    );
}

pub fn register_merger(registry: &mut ToolRegistry) {
    registry.register_fn(
        "plan_merge",
        "Plan how to merge and sync a voice-over track with a video track",
        plan_merge,
    );
}

pub fn register_shorts(registry: &mut ToolRegistry) {
    registry.register_fn(
        "plan_vertical_crop",
        "Compute a centered vertical crop for shorts",
        plan_vertical_crop,
    );
}

/// Parse `WIDTHxHEIGHT`
pub(crate) fn parse_resolution(name: &str, value: &str) -> Result<(u32, u32), ToolError> {
    let invalid = || ToolError::invalid(name, format!("expected WIDTHxHEIGHT, got '{}'", value));
    let (w, h) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
    let w: u32 = w.trim().parse().map_err(|_| invalid())?;
    let h: u32 = h.trim().parse().map_err(|_| invalid())?;
    if w == 0 || h == 0 {
        return Err(invalid());
    }
    Ok((w, h))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn positive(args: &Value, name: &str, default: f64) -> Result<f64, ToolError> {
    let value = args::f64_or(args, name, default)?;
    if value <= 0.0 {
        return Err(ToolError::invalid(name, "must be greater than zero"));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// B-roll
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
struct Clip {
    index: usize,
    image: String,
    start: f64,
    duration: f64,
    frames: u32,
    motion: &'static str,
    filter: String,
}

fn zoompan(motion: &str, frames: u32, fps: u32, width: u32, height: u32) -> String {
    let step = (MAX_ZOOM - 1.0) / frames.max(1) as f64;
    let centered = "x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)'";
    let (zoom, position) = match motion {
        "zoom_in" => (format!("min(zoom+{:.5},{})", step, MAX_ZOOM), centered.to_string()),
        "zoom_out" => (
            format!("if(eq(on,1),{},max(zoom-{:.5},1.0))", MAX_ZOOM, step),
            centered.to_string(),
        ),
        _ => (
            "1.2".to_string(),
            format!("x='(iw-iw/zoom)*on/{}':y='ih/2-(ih/zoom/2)'", frames.max(1)),
        ),
    };
    format!(
        "zoompan=z='{}':d={}:{}:s={}x{}:fps={}",
        zoom, frames, position, width, height, fps
    )
}

fn plan_broll(args: &Value) -> Result<Value, ToolError> {
    let images = args::string_list(args, "images")?;
    if images.is_empty() {
        return Err(ToolError::MissingArgument("images".to_string()));
    }
    let duration = positive(args, "duration_per_image", 4.0)?;
    let effect = args::str_or(args, "effect", "ken_burns");
    if !BROLL_EFFECTS.contains(&effect) {
        return Err(ToolError::invalid(
            "effect",
            format!("unsupported effect '{}' ({})", effect, BROLL_EFFECTS.join(", ")),
        ));
    }
    let fps = args::u32_or(args, "fps", 25)?;
    if fps == 0 {
        return Err(ToolError::invalid("fps", "must be greater than zero"));
    }
    let (width, height) = parse_resolution("resolution", args::str_or(args, "resolution", "1920x1080"))?;

    let frames = (duration * fps as f64).round() as u32;
    let clips: Vec<Clip> = images
        .into_iter()
        .enumerate()
        .map(|(index, image)| {
            // Ken Burns alternates direction so consecutive clips don't feel identical
            let motion = match effect {
                "ken_burns" if index % 2 == 1 => "zoom_out",
                "ken_burns" | "zoom" => "zoom_in",
                _ => "pan",
            };
            Clip {
                index,
                image,
                start: round2(index as f64 * duration),
                duration,
                frames,
                motion,
                filter: zoompan(motion, frames, fps, width, height),
            }
        })
        .collect();

    let inputs: String = (0..clips.len()).map(|i| format!("[v{}]", i)).collect();
    let concat = format!("{}concat=n={}:v=1:a=0[out]", inputs, clips.len());
    let total = round2(clips.len() as f64 * duration);
    debug!("Planned {} B-roll clips ({}s)", clips.len(), total);

    Ok(json!({
        "effect": effect,
        "fps": fps,
        "resolution": format!("{}x{}", width, height),
        "clips": clips,
        "concat_filter": concat,
        "total_duration": total,
    }))
}

// ---------------------------------------------------------------------------
// Voice-over
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
struct SpeechSegment {
    index: usize,
    text: String,
    words: usize,
    start: f64,
    duration: f64,
}

fn plan_voiceover(args: &Value) -> Result<Value, ToolError> {
    let script = args::required_str(args, "script")?;
    let voice = args::str_or(args, "voice", "alloy");
    let wpm = positive(args, "words_per_minute", 150.0)?;
    let pause = args::f64_or(args, "pause_seconds", 0.4)?.max(0.0);

    let mut segments = Vec::new();
    let mut cursor = 0.0;
    for (index, sentence) in text::sentences(script).into_iter().enumerate() {
        let words = text::word_count(&sentence);
        let duration = round2(words as f64 / wpm * 60.0);
        if index > 0 {
            cursor += pause;
        }
        segments.push(SpeechSegment {
            index,
            text: sentence,
            words,
            start: round2(cursor),
            duration,
        });
        cursor += duration;
    }

    let total_words: usize = segments.iter().map(|s| s.words).sum();
    Ok(json!({
        "voice": voice,
        "words_per_minute": wpm,
        "segments": segments,
        "total_words": total_words,
        "total_duration": round2(cursor),
    }))
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

fn plan_merge(args: &Value) -> Result<Value, ToolError> {
    let video_duration = args::required_f64(args, "video_duration")?;
    let audio_duration = args::required_f64(args, "audio_duration")?;
    if video_duration <= 0.0 || audio_duration <= 0.0 {
        return Err(ToolError::invalid("duration", "durations must be greater than zero"));
    }
    let strategy = args::str_or(args, "strategy", "pad");
    let video = args::str_or(args, "video_path", "video.mp4");
    let audio = args::str_or(args, "audio_path", "voiceover.mp3");
    let output = args::str_or(args, "output_path", "merged.mp4");

    let diff = round2((audio_duration - video_duration).abs());
    let mut ffmpeg: Vec<String> = ["-y", "-i", video, "-i", audio]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let (output_duration, adjustment) = match strategy {
        "pad" if audio_duration > video_duration => {
            ffmpeg.extend([
                "-filter_complex".to_string(),
                format!("[0:v]tpad=stop_mode=clone:stop_duration={}[v]", diff),
                "-map".to_string(),
                "[v]".to_string(),
                "-map".to_string(),
                "1:a".to_string(),
            ]);
            (audio_duration, format!("hold last video frame for {}s", diff))
        }
        "pad" => {
            ffmpeg.extend([
                "-filter_complex".to_string(),
                format!("[1:a]apad=whole_dur={}[a]", video_duration),
                "-map".to_string(),
                "0:v".to_string(),
                "-map".to_string(),
                "[a]".to_string(),
            ]);
            (video_duration, format!("pad audio with {}s of silence", diff))
        }
        "trim" => {
            let shortest = video_duration.min(audio_duration);
            ffmpeg.extend([
                "-map".to_string(),
                "0:v".to_string(),
                "-map".to_string(),
                "1:a".to_string(),
                "-t".to_string(),
                shortest.to_string(),
            ]);
            (shortest, format!("trim {}s from the longer track", diff))
        }
        "stretch" => {
            let factor = audio_duration / video_duration;
            ffmpeg.extend([
                "-filter_complex".to_string(),
                format!("[0:v]setpts={:.4}*PTS[v]", factor),
                "-map".to_string(),
                "[v]".to_string(),
                "-map".to_string(),
                "1:a".to_string(),
            ]);
            (audio_duration, format!("retime video by a factor of {:.4}", factor))
        }
        other => {
            return Err(ToolError::invalid(
                "strategy",
                format!("unsupported strategy '{}' ({})", other, MERGE_STRATEGIES.join(", ")),
            ))
        }
    };
    ffmpeg.extend(["-c:v", "libx264", "-c:a", "aac", output].iter().map(|s| s.to_string()));
    let adjustment = if diff == 0.0 { "none".to_string() } else { adjustment };

    Ok(json!({
        "strategy": strategy,
        "video_offset": 0.0,
        "audio_offset": 0.0,
        "output_duration": round2(output_duration),
        "adjustment": adjustment,
        "ffmpeg_args": ffmpeg,
    }))
}

// ---------------------------------------------------------------------------
// Vertical crop
// ---------------------------------------------------------------------------

fn even(value: f64) -> u32 {
    ((value / 2.0).round() * 2.0) as u32
}

fn parse_ratio(value: &str) -> Result<f64, ToolError> {
    let invalid = || ToolError::invalid("target", format!("expected W:H, got '{}'", value));
    let (w, h) = value.split_once(':').ok_or_else(invalid)?;
    let w: f64 = w.trim().parse().map_err(|_| invalid())?;
    let h: f64 = h.trim().parse().map_err(|_| invalid())?;
    if w <= 0.0 || h <= 0.0 {
        return Err(invalid());
    }
    Ok(w / h)
}

fn plan_vertical_crop(args: &Value) -> Result<Value, ToolError> {
    let width = args::required_f64(args, "width")?;
    let height = args::required_f64(args, "height")?;
    if width < 2.0 || height < 2.0 {
        return Err(ToolError::invalid("width", "source frame is too small"));
    }
    let target = args::str_or(args, "target", "9:16");
    let ratio = parse_ratio(target)?;
    let (out_w, out_h) = parse_resolution("output_resolution", args::str_or(args, "output_resolution", "1080x1920"))?;

    let (crop_w, crop_h) = if width / height > ratio {
        (even(height * ratio).min(width as u32), height as u32)
    } else {
        (width as u32, even(width / ratio).min(height as u32))
    };
    let x = (width as u32 - crop_w) / 2;
    let y = (height as u32 - crop_h) / 2;

    Ok(json!({
        "target": target,
        "crop": { "width": crop_w, "height": crop_h, "x": x, "y": y },
        "filter": format!("crop={}:{}:{}:{},scale={}:{}", crop_w, crop_h, x, y, out_w, out_h),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("r", "1920x1080").unwrap(), (1920, 1080));
        assert!(parse_resolution("r", "1920").is_err());
        assert!(parse_resolution("r", "0x10").is_err());
    }

    #[test]
    fn test_plan_broll_ken_burns_alternates() {
        let out = plan_broll(&json!({
            "images": ["a.png", "b.png", "c.png"],
            "duration_per_image": 4.0,
            "fps": 25
        }))
        .unwrap();

        let clips = out["clips"].as_array().unwrap();
        assert_eq!(clips.len(), 3);
        assert_eq!(clips[0]["motion"], "zoom_in");
        assert_eq!(clips[1]["motion"], "zoom_out");
        assert_eq!(clips[2]["motion"], "zoom_in");
        assert_eq!(clips[1]["frames"], 100);
        assert_eq!(clips[2]["start"], 8.0);
        assert!(clips[0]["filter"].as_str().unwrap().starts_with("zoompan="));
        assert_eq!(out["total_duration"], 12.0);
        assert_eq!(out["concat_filter"], "[v0][v1][v2]concat=n=3:v=1:a=0[out]");
    }

    #[test]
    fn test_plan_broll_pan() {
        let out = plan_broll(&json!({ "images": ["a.png"], "effect": "pan" })).unwrap();
        let filter = out["clips"][0]["filter"].as_str().unwrap();
        assert!(filter.contains("z='1.2'"));
        assert!(filter.contains("on/100"));
    }

    #[test]
    fn test_plan_broll_rejects_bad_input() {
        assert!(plan_broll(&json!({ "images": [] })).is_err());
        assert!(plan_broll(&json!({ "images": ["a.png"], "effect": "spin" })).is_err());
        assert!(plan_broll(&json!({ "images": ["a.png"], "duration_per_image": 0 })).is_err());
        // 2^32 + 10 must not wrap around to 10 fps
        let err = plan_broll(&json!({ "images": ["a.png"], "fps": 4_294_967_306u64 })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { ref name, .. } if name == "fps"));
    }

    #[test]
    fn test_plan_voiceover_segments() {
        let out = plan_voiceover(&json!({
            "script": "One two three four five. Six seven eight nine ten.",
            "words_per_minute": 150,
            "pause_seconds": 0.5
        }))
        .unwrap();

        let segments = out["segments"].as_array().unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0]["duration"], 2.0);
        assert_eq!(segments[1]["start"], 2.5);
        assert_eq!(out["total_duration"], 4.5);
        assert_eq!(out["total_words"], 10);
        assert_eq!(out["voice"], "alloy");
    }

    #[test]
    fn test_plan_merge_pad_video() {
        let out = plan_merge(&json!({ "video_duration": 10.0, "audio_duration": 12.5 })).unwrap();
        assert_eq!(out["output_duration"], 12.5);
        let args: Vec<&str> = out["ffmpeg_args"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert!(args.contains(&"[0:v]tpad=stop_mode=clone:stop_duration=2.5[v]"));
        assert_eq!(args.last(), Some(&"merged.mp4"));
    }

    #[test]
    fn test_plan_merge_trim_and_stretch() {
        let trim = plan_merge(&json!({
            "video_duration": 10.0,
            "audio_duration": 8.0,
            "strategy": "trim"
        }))
        .unwrap();
        assert_eq!(trim["output_duration"], 8.0);

        let stretch = plan_merge(&json!({
            "video_duration": 10.0,
            "audio_duration": 12.0,
            "strategy": "stretch"
        }))
        .unwrap();
        assert_eq!(stretch["output_duration"], 12.0);
        assert!(stretch["adjustment"].as_str().unwrap().contains("1.2000"));

        let bad = json!({ "video_duration": 1.0, "audio_duration": 1.0, "strategy": "loop" });
        assert!(plan_merge(&bad).is_err());
    }

    #[test]
    fn test_plan_vertical_crop_landscape() {
        let out = plan_vertical_crop(&json!({ "width": 1920, "height": 1080 })).unwrap();
        assert_eq!(out["crop"], json!({ "width": 608, "height": 1080, "x": 656, "y": 0 }));
        assert_eq!(out["filter"], "crop=608:1080:656:0,scale=1080:1920");
    }

    #[test]
    fn test_plan_vertical_crop_already_tall() {
        let out = plan_vertical_crop(&json!({ "width": 1080, "height": 2400 })).unwrap();
        assert_eq!(out["crop"]["width"], 1080);
        assert_eq!(out["crop"]["height"], 1920);
        assert_eq!(out["crop"]["y"], 240);
    }
}
