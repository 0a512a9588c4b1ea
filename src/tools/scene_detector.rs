use crate::tools::ffprobe_info::VideoInfo;
use anyhow::{Context, Result};
use log::debug;
use regex::Regex;
use std::path::Path;
use std::process::Command;

/// 場景邊界偵測介面，回傳依序排列的 `(start_frame, end_frame)`
pub trait SceneDetector: Send + Sync {
    fn detect(&self, path: &Path, video_info: &VideoInfo) -> Result<Vec<(u64, u64)>>;
}

/// 場景偵測設定
#[derive(Debug, Clone)]
pub struct SceneDetectorConfig {
    /// 場景變換閾值 (0-100)，越低越敏感
    pub threshold: f64,
    /// 縮放到的寬度（加速分析）
    pub scale_width: u32,
}

impl Default for SceneDetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 12.0,
            scale_width: 320,
        }
    }
}

/// 使用 ffmpeg scdet 濾鏡偵測硬切點
#[derive(Debug, Clone, Default)]
pub struct FfmpegSceneDetector {
    config: SceneDetectorConfig,
}

impl FfmpegSceneDetector {
    #[must_use]
    pub const fn new(config: SceneDetectorConfig) -> Self {
        Self { config }
    }
}

impl SceneDetector for FfmpegSceneDetector {
    fn detect(&self, path: &Path, video_info: &VideoInfo) -> Result<Vec<(u64, u64)>> {
        debug!(
            "場景偵測設定: threshold={}, scale_width={}",
            self.config.threshold, self.config.scale_width
        );

        // 逐幀分析，避免降低 fps 後切點落在錯誤的幀
        let filter = format!(
            "scale={}:-1,scdet=s=1:t={}",
            self.config.scale_width, self.config.threshold
        );

        let output = Command::new("ffmpeg")
            .args(["-hide_banner", "-i"])
            .arg(path)
            .args([
                "-an", "-sn", "-dn", "-vf", &filter, "-f", "null", "-",
            ])
            .output()
            .with_context(|| format!("無法執行 ffmpeg 場景偵測: {}", path.display()))?;

        if !output.status.success() {
            anyhow::bail!("ffmpeg 場景偵測失敗: {}", path.display());
        }

        // scdet 輸出在 stderr
        let stderr = String::from_utf8_lossy(&output.stderr);
        let cuts = parse_scdet_output(&stderr, video_info.duration_seconds)?;

        Ok(cuts_to_boundaries(
            &cuts,
            video_info.frame_rate.as_f64(),
            video_info.total_frames(),
        ))
    }
}

/// 解析 ffmpeg scdet 輸出，回傳切點時間（秒）
fn parse_scdet_output(output: &str, duration: f64) -> Result<Vec<f64>> {
    // 例如: [Parsed_scdet_1 @ 0x7f9...] lavfi.scd.score: 42.1, lavfi.scd.time: 12.345
    // 或: lavfi.scd.time=12.345
    let time_regex = Regex::new(r"lavfi\.scd\.time[:=]\s*([0-9.]+)")?;

    let mut cuts: Vec<f64> = output
        .lines()
        .filter_map(|line| time_regex.captures(line))
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|&t| t > 0.0 && t < duration)
        .collect();

    cuts.sort_by(f64::total_cmp);
    cuts.dedup_by(|a, b| (*a - *b).abs() < f64::EPSILON);

    debug!("偵測到 {} 個場景變換點", cuts.len());

    Ok(cuts)
}

/// 把切點時間轉為相鄰的幀區間 `[0,c1], [c1,c2], …, [cn,total]`
///
/// 四捨五入後落在同一幀或超出範圍的切點會被略過，保證每段 `end > start`。
#[must_use]
pub fn cuts_to_boundaries(cuts: &[f64], fps: f64, total_frames: u64) -> Vec<(u64, u64)> {
    let mut boundaries = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0_u64;

    for &cut in cuts {
        let frame = (cut * fps).round() as u64;
        if frame <= start || frame >= total_frames {
            continue;
        }
        boundaries.push((start, frame));
        start = frame;
    }

    if total_frames > start {
        boundaries.push((start, total_frames));
    }

    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scdet_output_colon_format() {
        let output = r"
[Parsed_scdet_1 @ 0x7f9b8c] lavfi.scd.score: 41.200, lavfi.scd.time: 12.345
[Parsed_scdet_1 @ 0x7f9b8c] lavfi.scd.score: 38.900, lavfi.scd.time: 25.678
";
        let cuts = parse_scdet_output(output, 100.0).unwrap();
        assert_eq!(cuts.len(), 2);
        assert!((cuts[0] - 12.345).abs() < 0.001);
        assert!((cuts[1] - 25.678).abs() < 0.001);
    }

    #[test]
    fn test_parse_scdet_output_equals_format() {
        let output = r"
frame:123 pts:12345 pts_time:12.345
lavfi.scd.time=12.345
frame:456 pts:25678 pts_time:25.678
lavfi.scd.time=25.678
";
        let cuts = parse_scdet_output(output, 100.0).unwrap();
        assert_eq!(cuts.len(), 2);
    }

    #[test]
    fn test_parse_scdet_output_filters_out_of_range() {
        let output = r"
lavfi.scd.time=0.0
lavfi.scd.time=50.0
lavfi.scd.time=150.0
";
        let cuts = parse_scdet_output(output, 100.0).unwrap();
        assert_eq!(cuts, vec![50.0]);
    }

    #[test]
    fn test_cuts_to_boundaries() {
        let boundaries = cuts_to_boundaries(&[2.0, 4.5], 24.0, 240);
        assert_eq!(boundaries, vec![(0, 48), (48, 108), (108, 240)]);
    }

    #[test]
    fn test_cuts_to_boundaries_skips_degenerate_cuts() {
        // 0.01 秒四捨五入為第 0 幀；兩個切點落在同一幀
        let boundaries = cuts_to_boundaries(&[0.01, 1.0, 1.01, 20.0], 25.0, 100);
        assert_eq!(boundaries, vec![(0, 25), (25, 100)]);
    }

    #[test]
    fn test_cuts_to_boundaries_without_cuts() {
        assert_eq!(cuts_to_boundaries(&[], 25.0, 100), vec![(0, 100)]);
        assert!(cuts_to_boundaries(&[], 25.0, 0).is_empty());
    }
}
