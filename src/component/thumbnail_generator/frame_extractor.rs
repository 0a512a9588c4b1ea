use crate::tools::{FrameRate, frame_to_seconds};
use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::process::Command;

/// 縮圖尺寸設定
pub const THUMBNAIL_WIDTH: u32 = 320;
pub const THUMBNAIL_HEIGHT: u32 = 180;

/// 兩段式 seek 的前置緩衝時間（秒）
const SEEK_MARGIN: f64 = 2.0;

/// 擷取單一幀到指定路徑
///
/// 實作必須可在多個 worker 之間共用。
pub trait FrameExtractor: Send + Sync {
    fn extract_frame(
        &self,
        video_path: &Path,
        frame_number: u64,
        output_path: &Path,
    ) -> Result<()>;
}

/// 擷取輸出設定
#[derive(Debug, Clone, Copy)]
pub struct ExtractorConfig {
    pub width: u32,
    pub height: u32,
    /// JPEG 品質 (1-31，數字越小品質越高)
    pub quality: u8,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            width: THUMBNAIL_WIDTH,
            height: THUMBNAIL_HEIGHT,
            quality: 2,
        }
    }
}

/// 以 ffmpeg 實作的 `FrameExtractor`
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    frame_rate: FrameRate,
    config: ExtractorConfig,
}

impl FfmpegFrameExtractor {
    #[must_use]
    pub const fn new(frame_rate: FrameRate, config: ExtractorConfig) -> Self {
        Self { frame_rate, config }
    }

    /// 組出 ffmpeg 參數
    ///
    /// 兩段式 seek：
    /// 1. `-ss` 在 `-i` 前：快速跳轉到最近的關鍵幀
    /// 2. `-ss` 在 `-i` 後：精準解碼到目標幀
    fn build_args(&self, video_path: &Path, frame_number: u64, output_path: &Path) -> Vec<String> {
        let timestamp = frame_to_seconds(frame_number, self.frame_rate);
        let t0 = (timestamp - SEEK_MARGIN).max(0.0);
        let delta = timestamp - t0;

        // 保持比例縮放，不足部分填黑
        let filter = format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:black",
            w = self.config.width,
            h = self.config.height
        );

        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
        ];

        if t0 > 0.0 {
            args.push("-ss".to_string());
            args.push(format!("{t0:.3}"));
        }

        args.push("-i".to_string());
        args.push(video_path.to_string_lossy().to_string());

        if delta > 0.0 {
            args.push("-ss".to_string());
            args.push(format!("{delta:.3}"));
        }

        args.extend([
            "-frames:v".to_string(),
            "1".to_string(),
            "-an".to_string(),
            "-sn".to_string(),
            "-dn".to_string(),
            "-threads".to_string(),
            "1".to_string(),
            "-vf".to_string(),
            filter,
            "-q:v".to_string(),
            self.config.quality.to_string(),
            "-y".to_string(),
            output_path.to_string_lossy().to_string(),
        ]);

        args
    }
}

impl FrameExtractor for FfmpegFrameExtractor {
    fn extract_frame(
        &self,
        video_path: &Path,
        frame_number: u64,
        output_path: &Path,
    ) -> Result<()> {
        let args = self.build_args(video_path, frame_number, output_path);
        debug!("擷取第 {frame_number} 幀: ffmpeg {}", args.join(" "));

        let output = Command::new("ffmpeg")
            .args(&args)
            .output()
            .with_context(|| format!("無法執行 ffmpeg 擷取縮圖: {}", video_path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg 擷取縮圖失敗: {}", stderr.trim());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extractor() -> FfmpegFrameExtractor {
        FfmpegFrameExtractor::new(FrameRate::new(25.0).unwrap(), ExtractorConfig::default())
    }

    #[test]
    fn test_build_args_near_start_skips_fast_seek() {
        let args = extractor().build_args(
            Path::new("/in/video.mov"),
            25,
            Path::new("/out/scene_000_00.jpg"),
        );

        // 1 秒 < SEEK_MARGIN，只有 -i 之後的精準 seek
        assert_eq!(args.iter().filter(|a| *a == "-ss").count(), 1);
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss > input);
        assert_eq!(args[ss + 1], "1.000");
        assert_eq!(args.last().map(String::as_str), Some("/out/scene_000_00.jpg"));
    }

    #[test]
    fn test_build_args_two_stage_seek() {
        let args = extractor().build_args(
            Path::new("/in/video.mov"),
            250,
            Path::new("/out/a.jpg"),
        );

        assert_eq!(args.iter().filter(|a| *a == "-ss").count(), 2);
        assert_eq!(args[3], "-ss");
        assert_eq!(args[4], "8.000");
        assert!(args.contains(&"2.000".to_string()));
    }

    #[test]
    fn test_build_args_frame_zero() {
        let args = extractor().build_args(Path::new("/in/v.mov"), 0, Path::new("/out/a.jpg"));
        assert!(!args.contains(&"-ss".to_string()));
    }

    #[test]
    fn test_build_args_uses_config() {
        let custom = FfmpegFrameExtractor::new(
            FrameRate::new(24.0).unwrap(),
            ExtractorConfig {
                width: 640,
                height: 360,
                quality: 5,
            },
        );
        let args = custom.build_args(Path::new("/v.mov"), 10, &PathBuf::from("/o.jpg"));
        assert!(args.iter().any(|a| a.starts_with("scale=640:360")));
        let q = args.iter().position(|a| a == "-q:v").unwrap();
        assert_eq!(args[q + 1], "5");
    }

    #[test]
    fn test_extractor_config_default() {
        let config = ExtractorConfig::default();
        assert_eq!(config.width, THUMBNAIL_WIDTH);
        assert_eq!(config.height, THUMBNAIL_HEIGHT);
        assert_eq!(config.quality, 2);
    }
}
