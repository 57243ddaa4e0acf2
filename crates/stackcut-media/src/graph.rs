//! Layer stack and its compilation to a single FFmpeg invocation.
//!
//! Layers are composited bottom to top onto a solid color source. Each
//! distinct `(path, repeats)` pair becomes one input; a looped source gets a
//! dedicated input with `-stream_loop`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use stackcut_models::{format_fps, EncodingProfile, Rgb};

use crate::audio::AudioTrackSet;
use crate::clip::{AudioOp, AudioTrack, ClipHandle, VideoOp};
use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::geometry::CanvasSpec;
use crate::overlay::TextLayer;

/// One visual element of the composite.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// Solid fill covering the canvas
    Background(Rgb),
    /// Video placed with its top-left corner at `(x, y)`
    Video { clip: ClipHandle, x: i64, y: i64 },
    /// Text rendered from `text_file`
    Text { layer: TextLayer, text_file: PathBuf },
}

/// Everything the final encode needs.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    canvas: CanvasSpec,
    fps: f64,
    layers: Vec<Layer>,
    audio: AudioTrackSet,
}

impl RenderPlan {
    /// Plan with a background layer only.
    pub fn new(canvas: CanvasSpec, fps: f64, background: Rgb) -> Self {
        Self {
            canvas,
            fps,
            layers: vec![Layer::Background(background)],
            audio: AudioTrackSet::default(),
        }
    }

    pub fn push_video(&mut self, clip: ClipHandle, x: i64, y: i64) {
        self.layers.push(Layer::Video { clip, x, y });
    }

    pub fn push_text(&mut self, layer: TextLayer, text_file: PathBuf) {
        self.layers.push(Layer::Text { layer, text_file });
    }

    pub fn set_audio(&mut self, audio: AudioTrackSet) {
        self.audio = audio;
    }

    pub fn canvas(&self) -> &CanvasSpec {
        &self.canvas
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Layers, bottom first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn audio(&self) -> &AudioTrackSet {
        &self.audio
    }

    /// Compile to one FFmpeg command writing `output`.
    pub fn compile(&self, output: &Path, profile: &EncodingProfile) -> MediaResult<FfmpegCommand> {
        let mut inputs = InputTable::default();
        let mut chains: Vec<String> = Vec::new();

        let background = match self.layers.first() {
            Some(Layer::Background(color)) => *color,
            _ => {
                return Err(MediaError::invalid_config(
                    "Layer stack must start with a background",
                ))
            }
        };
        chains.push(format!(
            "color=c={}:s={}x{}:r={}:d={:.3}[base0]",
            background.to_ffmpeg(),
            self.canvas.width,
            self.canvas.height,
            format_fps(self.fps),
            self.canvas.duration,
        ));

        let mut base = "base0".to_string();
        for (idx, layer) in self.layers.iter().enumerate().skip(1) {
            let next = format!("base{}", idx);
            match layer {
                Layer::Background(_) => {
                    return Err(MediaError::invalid_config(
                        "Only the bottom layer may be a background",
                    ))
                }
                Layer::Video { clip, x, y } => {
                    let input = inputs.index_of(clip.path(), clip.repeats());
                    let label = format!("v{}", idx);
                    chains.push(format!(
                        "[{}:v]{}[{}]",
                        input,
                        video_chain(clip.ops()),
                        label
                    ));
                    chains.push(format!(
                        "[{}][{}]overlay=x={}:y={}:eof_action=pass[{}]",
                        base, label, x, y, next
                    ));
                }
                Layer::Text { layer, text_file } => {
                    chains.push(format!("[{}]{}[{}]", base, layer.drawtext_filter(text_file), next));
                }
            }
            base = next;
        }
        // Rename the top of the stack
        chains.push(format!("[{}]null[vout]", base));

        let audio_map = self.compile_audio(&mut inputs, &mut chains);

        let mut cmd = FfmpegCommand::new(output);
        for (path, repeats) in inputs.entries() {
            cmd = if *repeats > 1 {
                cmd.input_with_args(["-stream_loop".to_string(), (repeats - 1).to_string()], path)
            } else {
                cmd.input(path)
            };
        }

        cmd = cmd.filter_complex(chains.join(";")).map("[vout]");
        cmd = match audio_map {
            Some(spec) => cmd.map(spec),
            None => cmd.no_audio(),
        };

        Ok(cmd
            .output_args(profile.to_ffmpeg_args(self.canvas.width, self.canvas.height, self.fps))
            .duration(self.canvas.duration))
    }

    /// Append audio chains; returns the stream to map, if any.
    fn compile_audio(&self, inputs: &mut InputTable, chains: &mut Vec<String>) -> Option<String> {
        match self.audio.tracks() {
            [] => None,
            [track] if track.ops().is_empty() => {
                let input = inputs.index_of(track.path(), track.repeats());
                Some(format!("{}:a", input))
            }
            [track] => {
                chains.push(audio_chain(inputs, track, "aout"));
                Some("[aout]".to_string())
            }
            tracks => {
                let mut mix_inputs = String::new();
                for (i, track) in tracks.iter().enumerate() {
                    let label = format!("a{}", i);
                    chains.push(audio_chain(inputs, track, &label));
                    let _ = write!(mix_inputs, "[{}]", label);
                }
                chains.push(format!(
                    "{}amix=inputs={}:duration=longest:normalize=0[aout]",
                    mix_inputs,
                    tracks.len()
                ));
                Some("[aout]".to_string())
            }
        }
    }
}

fn video_chain(ops: &[VideoOp]) -> String {
    if ops.is_empty() {
        return "null".to_string();
    }
    ops.iter()
        .map(|op| match op {
            VideoOp::Crop { x, y, width, height } => format!("crop={}:{}:{}:{}", width, height, x, y),
            VideoOp::Scale { width, height } => format!("scale={}:{}", width, height),
            VideoOp::Trim { duration } => {
                format!("trim=duration={:.3},setpts=PTS-STARTPTS", duration)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn audio_chain(inputs: &mut InputTable, track: &AudioTrack, label: &str) -> String {
    let input = inputs.index_of(track.path(), track.repeats());
    let filters = if track.ops().is_empty() {
        "anull".to_string()
    } else {
        track
            .ops()
            .iter()
            .map(|op| match op {
                AudioOp::Trim { duration } => format!(
                    "apad=whole_dur={d:.3},atrim=duration={d:.3},asetpts=PTS-STARTPTS",
                    d = duration
                ),
                AudioOp::Volume(v) => format!("volume={:.3}", v),
            })
            .collect::<Vec<_>>()
            .join(",")
    };
    format!("[{}:a]{}[{}]", input, filters, label)
}

/// De-duplicated `(path, repeats)` inputs in first-use order.
#[derive(Debug, Default)]
struct InputTable {
    entries: Vec<(PathBuf, u32)>,
}

impl InputTable {
    fn index_of(&mut self, path: &Path, repeats: u32) -> usize {
        if let Some(idx) = self
            .entries
            .iter()
            .position(|(p, r)| p == path && *r == repeats)
        {
            return idx;
        }
        self.entries.push((path.to_path_buf(), repeats));
        self.entries.len() - 1
    }

    fn entries(&self) -> &[(PathBuf, u32)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::test_support::video_info;
    use crate::clip::HandleId;
    use crate::overlay::Coord;

    const CANVAS: CanvasSpec = CanvasSpec {
        width: 607,
        height: 1080,
        duration: 5.0,
    };

    fn square(id: u64, path: &str, duration: f64) -> ClipHandle {
        ClipHandle::open(HandleId(id), path, &video_info(1920, 1080, duration))
            .cropped(420, 0, 1080, 1080)
            .unwrap()
            .resized(540, 540)
            .unwrap()
    }

    #[test]
    fn test_compile_two_videos() {
        let primary = square(1, "a.mp4", 5.0).trimmed(5.0).unwrap();
        let secondary = square(2, "b.mp4", 2.0).looped(3).unwrap().trimmed(5.0).unwrap();

        let mut plan = RenderPlan::new(CANVAS, 30.0, Rgb::BLACK);
        plan.push_video(secondary, 33, 506);
        plan.push_video(primary, 33, 34);

        let cmd = plan.compile(Path::new("out.mp4"), &EncodingProfile::default()).unwrap();

        assert_eq!(cmd.inputs().len(), 2);
        assert_eq!(cmd.inputs()[0].path, PathBuf::from("b.mp4"));
        assert_eq!(cmd.inputs()[0].args, vec!["-stream_loop", "2"]);
        assert!(cmd.inputs()[1].args.is_empty());

        let graph = cmd.filter_graph().unwrap();
        assert!(graph.starts_with("color=c=0x000000:s=607x1080:r=30:d=5.000[base0]"));
        assert!(graph.contains(
            "[0:v]crop=1080:1080:420:0,scale=540:540,trim=duration=5.000,setpts=PTS-STARTPTS[v1]"
        ));
        assert!(graph.contains("[base0][v1]overlay=x=33:y=506:eof_action=pass[base1]"));
        assert!(graph.contains("[base1][v2]overlay=x=33:y=34:eof_action=pass[base2]"));
        assert!(graph.ends_with("[base2]null[vout]"));

        assert_eq!(cmd.output_values("-map"), vec!["[vout]"]);
        assert_eq!(cmd.output_value("-t"), Some("5.000"));
        assert_eq!(cmd.output_value("-r"), Some("30"));
        // 607 is odd: 4:2:0 needs even sides
        assert_eq!(cmd.output_value("-pix_fmt"), Some("yuv444p"));
        assert!(cmd.build_args().contains(&"-an".to_string()));
    }

    #[test]
    fn test_text_layers_stack_above_videos() {
        let mut plan = RenderPlan::new(CANVAS, 30.0, Rgb::new(16, 32, 48));
        plan.push_video(square(1, "a.mp4", 5.0), 33, 34);
        plan.push_text(
            TextLayer {
                text: "@stackcut".to_string(),
                font_file: PathBuf::from("/fonts/Arial-Bold.ttf"),
                font_size: 30,
                color: Rgb::WHITE,
                opacity: 0.7,
                x: Coord::Fixed(40),
                y: Coord::Centered { span: 1080, bias: 60 },
                duration: 5.0,
            },
            PathBuf::from("/tmp/job/text_0.txt"),
        );

        let cmd = plan.compile(Path::new("out.mp4"), &EncodingProfile::default()).unwrap();
        let graph = cmd.filter_graph().unwrap();
        assert!(graph.starts_with("color=c=0x102030"));
        let overlay = graph.find("overlay=").unwrap();
        let drawtext = graph.find("[base1]drawtext=").unwrap();
        assert!(overlay < drawtext);
        assert!(graph.contains("y='floor((1080-text_h)/2)+60'"));
        assert!(graph.ends_with("[base2]null[vout]"));
    }

    #[test]
    fn test_unmodified_primary_audio_is_mapped_directly() {
        let mut primary = square(1, "a.mp4", 5.0);
        let audio = primary.take_audio();
        let mut plan = RenderPlan::new(CANVAS, 30.0, Rgb::BLACK);
        plan.push_video(primary, 33, 34);
        plan.set_audio(AudioTrackSet::primary_only(audio));

        let cmd = plan.compile(Path::new("out.mp4"), &EncodingProfile::default()).unwrap();
        assert_eq!(cmd.inputs().len(), 1);
        assert_eq!(cmd.output_values("-map"), vec!["[vout]", "0:a"]);
        assert!(!cmd.build_args().contains(&"-an".to_string()));
    }

    #[test]
    fn test_music_mix_sums_tracks() {
        let mut primary = square(1, "a.mp4", 5.0);
        let voice = primary.take_audio().unwrap().trimmed(5.0);
        let music = AudioTrack::from_parts(HandleId(3), "music.mp3", 3.0)
            .looped(2)
            .unwrap()
            .trimmed(5.0)
            .with_volume(0.2);

        let mut plan = RenderPlan::new(CANVAS, 30.0, Rgb::BLACK);
        plan.push_video(primary, 33, 34);
        plan.set_audio(AudioTrackSet::from_tracks(vec![voice, music]));

        let cmd = plan.compile(Path::new("out.mp4"), &EncodingProfile::default()).unwrap();
        assert_eq!(cmd.inputs().len(), 2);
        assert_eq!(cmd.inputs()[1].path, PathBuf::from("music.mp3"));
        assert_eq!(cmd.inputs()[1].args, vec!["-stream_loop", "1"]);

        let graph = cmd.filter_graph().unwrap();
        assert!(graph.contains(
            "[0:a]apad=whole_dur=5.000,atrim=duration=5.000,asetpts=PTS-STARTPTS[a0]"
        ));
        assert!(graph.contains(
            "[1:a]apad=whole_dur=5.000,atrim=duration=5.000,asetpts=PTS-STARTPTS,volume=0.200[a1]"
        ));
        assert!(graph.contains("[a0][a1]amix=inputs=2:duration=longest:normalize=0[aout]"));
        assert_eq!(cmd.output_values("-map"), vec!["[vout]", "[aout]"]);
    }

    #[test]
    fn test_same_source_shares_input() {
        let mut plan = RenderPlan::new(CANVAS, 30.0, Rgb::BLACK);
        plan.push_video(square(1, "a.mp4", 5.0), 0, 0);
        plan.push_video(square(1, "a.mp4", 5.0), 0, 540);
        let cmd = plan.compile(Path::new("out.mp4"), &EncodingProfile::default()).unwrap();
        assert_eq!(cmd.inputs().len(), 1);
    }

    #[test]
    fn test_even_canvas_requests_yuv420p() {
        let canvas = CanvasSpec {
            width: 608,
            height: 1080,
            duration: 5.0,
        };
        let mut plan = RenderPlan::new(canvas, 29.97, Rgb::BLACK);
        plan.push_video(square(1, "a.mp4", 5.0), 34, 34);
        let cmd = plan.compile(Path::new("out.mp4"), &EncodingProfile::default()).unwrap();
        assert_eq!(cmd.output_value("-pix_fmt"), Some("yuv420p"));
        assert_eq!(cmd.output_value("-r"), Some("29.97"));
    }
}
