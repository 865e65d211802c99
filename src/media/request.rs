//! FFmpeg argument generation for frame grabs and timelapse encodes.

use std::path::{Path, PathBuf};

/// Buffer size passed alongside a bitrate cap.
pub const ENCODE_BUFFER_SIZE: &str = "2M";

/// Output rotation, selected by a numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Code 1: 90 degrees clockwise
    Clockwise,
    /// Code 2: 90 degrees counter-clockwise
    CounterClockwise,
    /// Code 3: 180 degrees
    UpsideDown,
    /// Code 4: horizontal mirror
    Mirror,
}

impl Rotation {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Rotation::Clockwise),
            2 => Some(Rotation::CounterClockwise),
            3 => Some(Rotation::UpsideDown),
            4 => Some(Rotation::Mirror),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Rotation::Clockwise => 1,
            Rotation::CounterClockwise => 2,
            Rotation::UpsideDown => 3,
            Rotation::Mirror => 4,
        }
    }

    /// The FFmpeg filter expression for this rotation.
    pub fn filter(&self) -> &'static str {
        match self {
            Rotation::Clockwise => "transpose=clock",
            Rotation::CounterClockwise => "transpose=cclock",
            Rotation::UpsideDown => "hflip,vflip",
            Rotation::Mirror => "hflip",
        }
    }
}

/// Arguments that grab a single still from `url` into `dest`.
pub fn grab_args(url: &str, dest: &Path) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-ss".to_string(),
        "0".to_string(),
        "-i".to_string(),
        url.to_string(),
        "-frames:v".to_string(),
        "1".to_string(),
        dest.to_string_lossy().into_owned(),
    ]
}

/// Everything needed to turn staged stills into one video.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    /// Glob over the staged stills, expanded by FFmpeg itself
    pub input_pattern: String,
    /// Video file to write
    pub output: PathBuf,
    /// Output frames per second
    pub framerate: u32,
    /// Explicit encoder (None = FFmpeg's default for the container)
    pub encoder: Option<String>,
    /// Bitrate cap in kbit/s
    pub bitrate_kbps: Option<u32>,
    /// Pixel format, e.g. yuv420p
    pub chroma: Option<String>,
    pub rotation: Option<Rotation>,
}

impl EncodeRequest {
    /// Same request with the encoder left to FFmpeg.
    pub fn without_encoder(&self) -> Self {
        Self {
            encoder: None,
            ..self.clone()
        }
    }

    /// Build the `-vf` chain: rotation first, then pixel format.
    pub fn video_filter(&self) -> Option<String> {
        let mut filters = Vec::new();
        if let Some(rotation) = self.rotation {
            filters.push(rotation.filter().to_string());
        }
        if let Some(ref chroma) = self.chroma {
            filters.push(format!("format={}", chroma));
        }

        if filters.is_empty() {
            None
        } else {
            Some(filters.join(","))
        }
    }

    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-framerate".into(),
            self.framerate.to_string(),
            "-pattern_type".into(),
            "glob".into(),
            "-i".into(),
            self.input_pattern.clone(),
        ];

        if let Some(ref encoder) = self.encoder {
            args.push("-c:v".into());
            args.push(encoder.clone());
        }

        if let Some(kbps) = self.bitrate_kbps {
            let rate = format!("{}k", kbps);
            args.push("-b:v".into());
            args.push(rate.clone());
            args.push("-maxrate".into());
            args.push(rate);
            args.push("-bufsize".into());
            args.push(ENCODE_BUFFER_SIZE.into());
        }

        if let Some(filter) = self.video_filter() {
            args.push("-vf".into());
            args.push(filter);
        }

        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> EncodeRequest {
        EncodeRequest {
            input_pattern: "/srv/lapse/garden_*.jpg".to_string(),
            output: PathBuf::from("/srv/lapse/garden_2026-10-16.mp4"),
            framerate: 25,
            encoder: None,
            bitrate_kbps: None,
            chroma: None,
            rotation: None,
        }
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(|s| s.as_str())
    }

    #[test]
    fn test_rotation_codes() {
        for code in 1..=4 {
            let rotation = Rotation::from_code(code).unwrap();
            assert_eq!(rotation.code(), code);
        }
        assert!(Rotation::from_code(0).is_none());
        assert!(Rotation::from_code(5).is_none());
    }

    #[test]
    fn test_grab_args() {
        let args = grab_args("rtsp://cam/live", Path::new("/tmp/g_1.jpg"));
        assert_eq!(value_after(&args, "-i"), Some("rtsp://cam/live"));
        assert_eq!(value_after(&args, "-frames:v"), Some("1"));
        assert_eq!(value_after(&args, "-loglevel"), Some("error"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/g_1.jpg"));
    }

    #[test]
    fn test_minimal_encode_args() {
        let args = request().to_ffmpeg_args();
        assert_eq!(value_after(&args, "-framerate"), Some("25"));
        assert_eq!(value_after(&args, "-pattern_type"), Some("glob"));
        assert_eq!(value_after(&args, "-i"), Some("/srv/lapse/garden_*.jpg"));
        assert!(!args.contains(&"-c:v".to_string()));
        assert!(!args.contains(&"-b:v".to_string()));
        assert!(!args.contains(&"-vf".to_string()));
        assert_eq!(
            args.last().map(String::as_str),
            Some("/srv/lapse/garden_2026-10-16.mp4")
        );
    }

    #[test]
    fn test_framerate_precedes_input() {
        let args = request().to_ffmpeg_args();
        let framerate = args.iter().position(|a| a == "-framerate").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(framerate < input);
    }

    #[test]
    fn test_encoder_and_bitrate_args() {
        let req = EncodeRequest {
            encoder: Some("h264_nvenc".to_string()),
            bitrate_kbps: Some(4000),
            ..request()
        };
        let args = req.to_ffmpeg_args();
        assert_eq!(value_after(&args, "-c:v"), Some("h264_nvenc"));
        assert_eq!(value_after(&args, "-b:v"), Some("4000k"));
        assert_eq!(value_after(&args, "-maxrate"), Some("4000k"));
        assert_eq!(value_after(&args, "-bufsize"), Some(ENCODE_BUFFER_SIZE));
    }

    #[test]
    fn test_video_filter_combines_rotation_and_chroma() {
        let req = EncodeRequest {
            rotation: Some(Rotation::UpsideDown),
            chroma: Some("yuv420p".to_string()),
            ..request()
        };
        assert_eq!(req.video_filter().as_deref(), Some("hflip,vflip,format=yuv420p"));
        assert_eq!(
            value_after(&req.to_ffmpeg_args(), "-vf"),
            Some("hflip,vflip,format=yuv420p")
        );
    }

    #[test]
    fn test_video_filter_chroma_only() {
        let req = EncodeRequest {
            chroma: Some("yuv420p".to_string()),
            ..request()
        };
        assert_eq!(req.video_filter().as_deref(), Some("format=yuv420p"));
    }

    #[test]
    fn test_without_encoder_keeps_everything_else() {
        let req = EncodeRequest {
            encoder: Some("badcodec".to_string()),
            bitrate_kbps: Some(2500),
            rotation: Some(Rotation::Clockwise),
            ..request()
        };
        let fallback = req.without_encoder();
        assert!(fallback.encoder.is_none());
        assert_eq!(fallback.bitrate_kbps, Some(2500));
        assert_eq!(fallback.rotation, Some(Rotation::Clockwise));
        assert_eq!(fallback.output, req.output);
    }
}
