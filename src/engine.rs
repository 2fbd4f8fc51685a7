//! # Conversion Engine Module
//!
//! Questo modulo isola la conversione vera e propria video → GIF.
//!
//! ## Responsabilità:
//! - Definisce il trait `ConversionEngine` (open → encode → release)
//! - Implementa `FfmpegEngine` che delega a `ffprobe` e `ffmpeg`
//! - Traduce le `ConversionOptions` nei filtri palettegen/paletteuse
//!
//! ## Pipeline di conversione (FfmpegEngine):
//! 1. `open`: verifica il file e lo analizza con ffprobe, crea una
//!    directory di lavoro temporanea
//! 2. `encode`: due passate ffmpeg
//!    - palettegen: `fps=<fps>,palettegen=max_colors=<n>:stats_mode=<mode>`
//!    - paletteuse: `paletteuse=dither=<dither>[:diff_mode=rectangle]`, loop infinito
//!    poi copia la GIF nella destinazione finale
//! 3. `release`: rimuove la directory temporanea
//!
//! ## Mappatura opzioni:
//! - `quality` → numero di colori della palette (2-256) e tipo di dithering
//! - `optimize` → statistiche differenziali e aggiornamento a rettangoli
//! - `fps` → filtro `fps`
//!
//! ## Esempio:
//! ```rust,ignore
//! let engine = FfmpegEngine::discover(&ToolResolver::new());
//! let mut clip = engine.open(Path::new("movie.mov"))?;
//! let result = engine.encode(&mut clip, Path::new("movie.gif"), &options);
//! engine.release(clip);
//! ```

use crate::args;
use crate::config::ConversionOptions;
use crate::error::ConversionError;
use crate::tool_resolver::ToolResolver;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, warn};

/// External capability turning one video into one animated image
pub trait ConversionEngine: Send + Sync + 'static {
    /// Open resource for one input; released exactly once by the caller
    type Handle: Send;

    fn open(&self, input: &Path) -> Result<Self::Handle, ConversionError>;

    fn encode(
        &self,
        handle: &mut Self::Handle,
        output: &Path,
        options: &ConversionOptions,
    ) -> Result<(), ConversionError>;

    fn release(&self, handle: Self::Handle);
}

/// An opened input video
#[derive(Debug)]
pub struct VideoClip {
    pub path: PathBuf,
    pub info: VideoInfo,
    scratch: TempDir,
}

/// ffmpeg-backed engine
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegEngine {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Locate the tools; missing ones fall back to the bare command name so
    /// the failure surfaces per conversion instead of at startup.
    pub fn discover(resolver: &ToolResolver) -> Self {
        let locate = |tool: &str| {
            resolver
                .resolve_tool(tool)
                .unwrap_or_else(|| PathBuf::from(ToolResolver::executable_name(tool)))
        };

        Self::new(locate("ffmpeg"), locate("ffprobe"))
    }

    /// Check if required tools are available
    pub fn check_dependencies(resolver: &ToolResolver) -> Result<(), ConversionError> {
        for tool in ["ffmpeg", "ffprobe"] {
            if !resolver.is_tool_available(tool) {
                return Err(ConversionError::MissingTool(format!(
                    "{} is required for GIF conversion",
                    tool
                )));
            }
        }

        Ok(())
    }

    /// Get video information using ffprobe
    pub fn probe(&self, video_path: &Path) -> Result<VideoInfo, ConversionError> {
        let output = Command::new(&self.ffprobe)
            .args(args!["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(video_path)
            .output()
            .map_err(|e| {
                ConversionError::Probe(format!("Failed to execute {}: {}", self.ffprobe.display(), e))
            })?;

        if !output.status.success() {
            return Err(ConversionError::Probe(format!(
                "{}: {}",
                video_path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        VideoInfo::from_ffprobe_json(&String::from_utf8_lossy(&output.stdout))?
            .ok_or_else(|| ConversionError::NoVideoStream(video_path.to_path_buf()))
    }

    fn run_ffmpeg(&self, mut cmd: Command, stage: &str) -> Result<(), ConversionError> {
        let start_time = std::time::Instant::now();
        let output = cmd.output().map_err(|e| {
            ConversionError::Ffmpeg(format!("Failed to execute {}: {}", self.ffmpeg.display(), e))
        })?;

        if !output.status.success() {
            return Err(ConversionError::Ffmpeg(format!(
                "{} failed after {:.1}s: {}",
                stage,
                start_time.elapsed().as_secs_f64(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        debug!("{} completed in {:.1}s", stage, start_time.elapsed().as_secs_f64());
        Ok(())
    }

    fn ffmpeg_command(&self) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(args!["-hide_banner", "-nostdin"]);

        // Suppress FFmpeg output unless in debug mode
        if !tracing::enabled!(tracing::Level::DEBUG) {
            cmd.args(args!["-loglevel", "error"]);
        }

        cmd
    }
}

impl ConversionEngine for FfmpegEngine {
    type Handle = VideoClip;

    fn open(&self, input: &Path) -> Result<VideoClip, ConversionError> {
        let metadata = std::fs::metadata(input).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConversionError::NotFound(input.to_path_buf()),
            _ => ConversionError::Io(e),
        })?;
        if !metadata.is_file() {
            return Err(ConversionError::NotFound(input.to_path_buf()));
        }

        let info = self.probe(input)?;
        debug!(
            "Opened {} ({}x{}, {:.1}s, {})",
            input.display(),
            info.width,
            info.height,
            info.duration,
            info.codec
        );

        Ok(VideoClip {
            path: input.to_path_buf(),
            info,
            scratch: TempDir::new()?,
        })
    }

    fn encode(
        &self,
        clip: &mut VideoClip,
        output: &Path,
        options: &ConversionOptions,
    ) -> Result<(), ConversionError> {
        let palette = clip.scratch.path().join("palette.png");
        let rendered = clip.scratch.path().join("render.gif");

        let mut palette_pass = self.ffmpeg_command();
        palette_pass
            .arg("-i")
            .arg(&clip.path)
            .args(args!["-vf", palette_filter(options), "-y"])
            .arg(&palette);
        self.run_ffmpeg(palette_pass, "Palette generation")?;

        let mut render_pass = self.ffmpeg_command();
        render_pass
            .arg("-i")
            .arg(&clip.path)
            .arg("-i")
            .arg(&palette)
            .args(args!["-lavfi", render_filter(options), "-loop", 0, "-y"])
            .arg(&rendered);
        self.run_ffmpeg(render_pass, "GIF encoding")?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&rendered, output)?;

        Ok(())
    }

    fn release(&self, clip: VideoClip) {
        let scratch = clip.scratch.path().to_path_buf();
        if let Err(e) = clip.scratch.close() {
            warn!("Failed to remove scratch directory {}: {}", scratch.display(), e);
        }
    }
}

/// Palette size derived from the 1-100 quality scale
pub fn max_colors(quality: u8) -> u32 {
    (u32::from(quality) * 256 / 100).clamp(2, 256)
}

fn dither(quality: u8) -> &'static str {
    if quality >= 50 {
        "sierra2_4a"
    } else {
        "bayer:bayer_scale=5"
    }
}

/// First pass: build the palette
pub fn palette_filter(options: &ConversionOptions) -> String {
    let stats_mode = if options.optimize { "diff" } else { "full" };
    format!(
        "fps={},palettegen=max_colors={}:stats_mode={}",
        options.fps,
        max_colors(options.quality),
        stats_mode
    )
}

/// Second pass: map frames onto the palette given as input `1`
pub fn render_filter(options: &ConversionOptions) -> String {
    let mut filter = format!(
        "fps={}[x];[x][1:v]paletteuse=dither={}",
        options.fps,
        dither(options.quality)
    );
    if options.optimize {
        filter.push_str(":diff_mode=rectangle");
    }
    filter
}

/// Video file information
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub codec: String,
}

impl VideoInfo {
    /// Parse `ffprobe -print_format json` output; `None` without a video stream
    pub fn from_ffprobe_json(json: &str) -> Result<Option<Self>, ConversionError> {
        let info: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ConversionError::Probe(format!("Invalid ffprobe output: {}", e)))?;

        let duration = info["format"]["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        let Some(video_stream) = info["streams"]
            .as_array()
            .and_then(|streams| streams.iter().find(|s| s["codec_type"] == "video"))
        else {
            return Ok(None);
        };

        Ok(Some(Self {
            duration,
            width: video_stream["width"].as_u64().unwrap_or(0) as u32,
            height: video_stream["height"].as_u64().unwrap_or(0) as u32,
            codec: video_stream["codec_name"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
        }))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PROBE_OUTPUT: &str = r#"{
        "streams": [
            {"codec_type": "audio", "codec_name": "aac"},
            {"codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080}
        ],
        "format": {"duration": "12.500000", "bit_rate": "8000000"}
    }"#;

    #[test]
    fn test_parse_ffprobe_output() {
        let info = VideoInfo::from_ffprobe_json(PROBE_OUTPUT).unwrap().unwrap();
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert_eq!(info.codec, "h264");
        assert_eq!(info.duration, 12.5);
    }

    #[test]
    fn test_parse_ffprobe_without_video_stream() {
        let json = r#"{"streams": [{"codec_type": "audio"}], "format": {}}"#;
        assert_eq!(VideoInfo::from_ffprobe_json(json).unwrap(), None);
        assert!(VideoInfo::from_ffprobe_json("not json").is_err());
    }

    #[test]
    fn test_max_colors() {
        assert_eq!(max_colors(100), 256);
        assert_eq!(max_colors(80), 204);
        assert_eq!(max_colors(1), 2);
    }

    #[test]
    fn test_filters_follow_options() {
        let options = ConversionOptions::default();
        assert_eq!(
            palette_filter(&options),
            "fps=15,palettegen=max_colors=204:stats_mode=diff"
        );
        assert_eq!(
            render_filter(&options),
            "fps=15[x];[x][1:v]paletteuse=dither=sierra2_4a:diff_mode=rectangle"
        );

        let options = ConversionOptions {
            fps: 10,
            optimize: false,
            quality: 30,
        };
        assert_eq!(
            palette_filter(&options),
            "fps=10,palettegen=max_colors=76:stats_mode=full"
        );
        assert_eq!(
            render_filter(&options),
            "fps=10[x];[x][1:v]paletteuse=dither=bayer:bayer_scale=5"
        );
    }

    #[test]
    fn test_open_missing_file() {
        let engine = FfmpegEngine::new("ffmpeg", "ffprobe");
        let result = engine.open(Path::new("/definitely/not/here.mov"));
        assert!(matches!(result, Err(ConversionError::NotFound(_))));
    }

    #[test]
    fn test_open_directory_is_not_a_video() {
        let dir = TempDir::new().unwrap();
        let engine = FfmpegEngine::new("ffmpeg", "ffprobe");
        assert!(matches!(engine.open(dir.path()), Err(ConversionError::NotFound(_))));
    }

    #[test]
    fn test_probe_with_missing_tool() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("clip.mov");
        std::fs::write(&video, b"not a real movie").unwrap();

        let engine = FfmpegEngine::new("/no/such/ffmpeg", "/no/such/ffprobe");
        assert!(matches!(engine.open(&video), Err(ConversionError::Probe(_))));
    }
}
