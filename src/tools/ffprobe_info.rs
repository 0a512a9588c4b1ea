use crate::tools::timecode::FrameRate;
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// 時間軸與縮圖所需的影片資訊
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
    pub frame_rate: FrameRate,
}

impl VideoInfo {
    /// 例如 `1920x1080`
    #[must_use]
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// 依時長與幀率估算總幀數
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        (self.duration_seconds * self.frame_rate.as_f64()).round() as u64
    }
}

/// 取得影片幀率、解析度與時長
pub trait MediaProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<VideoInfo>;
}

/// 以 ffprobe 實作的 `MediaProbe`
#[derive(Debug, Default, Clone, Copy)]
pub struct FfprobeMediaProbe;

impl MediaProbe for FfprobeMediaProbe {
    fn probe(&self, path: &Path) -> Result<VideoInfo> {
        get_video_info(path)
    }
}

/// `-show_entries` 只要求需要的欄位
#[derive(Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// 呼叫 ffprobe 讀取第一條視訊串流
pub fn get_video_info(path: &Path) -> Result<VideoInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,duration:format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.status.success() {
        bail!(
            "ffprobe 回傳錯誤: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_ffprobe_output(&stdout).with_context(|| format!("無法解析影片資訊: {}", path.display()))
}

fn parse_ffprobe_output(stdout: &str) -> Result<VideoInfo> {
    let report: ProbeReport =
        serde_json::from_str(stdout).context("ffprobe 輸出不是有效的 JSON")?;

    let Some(stream) = report.streams.into_iter().next() else {
        bail!("影片中沒有視訊串流");
    };

    let (Some(width), Some(height)) = (stream.width, stream.height) else {
        bail!("缺少影片解析度");
    };

    // 容器時長優先，其次是串流時長
    let duration_seconds = report
        .format
        .and_then(|format| format.duration)
        .or(stream.duration)
        .and_then(|value| value.parse::<f64>().ok())
        .ok_or_else(|| anyhow!("缺少影片時長"))?;

    // 時間碼運算需要正確的幀率，解析失敗不套用預設值
    let raw_rate = stream
        .r_frame_rate
        .ok_or_else(|| anyhow!("缺少影片幀率"))?;
    let fps =
        parse_frame_rate(&raw_rate).ok_or_else(|| anyhow!("無法解析影片幀率: {raw_rate}"))?;

    Ok(VideoInfo {
        duration_seconds,
        width,
        height,
        frame_rate: FrameRate::new(fps)?,
    })
}

/// `30000/1001` 形式的分數或一般小數；分母為 0 時回傳 `None`
#[must_use]
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.trim().parse().ok()?;
            let denominator: f64 = denominator.trim().parse().ok()?;
            (denominator > 0.0).then(|| numerator / denominator)
        }
        None => rate.trim().parse().ok(),
    }
}
