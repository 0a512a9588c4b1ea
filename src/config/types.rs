use crate::component::thumbnail_generator::{
    DEFAULT_CONCURRENCY, ExtractorConfig, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 最近使用的專案數量上限
pub const MAX_RECENT_PROJECTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::ZhTw => write!(f, "繁體中文"),
        }
    }
}

/// 時間欄位的呈現方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// `HH:MM:SS.mmm`
    #[default]
    Clock,
    /// `HH:MM:SS:FF`
    Timecode,
    /// 秒數，小數兩位
    Seconds,
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock => write!(f, "clock (HH:MM:SS.mmm)"),
            Self::Timecode => write!(f, "timecode (HH:MM:SS:FF)"),
            Self::Seconds => write!(f, "seconds"),
        }
    }
}

/// 時間軸欄位配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TimelineLayout {
    /// 起點、終點、中點
    #[default]
    Midpoint,
    /// 起點、終點、長度（秒）
    Duration,
}

impl fmt::Display for TimelineLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Midpoint => write!(f, "start / end / midpoint"),
            Self::Duration => write!(f, "start / end / duration"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailSettings {
    /// 每個場景的縮圖數量
    pub count: usize,
    /// 同時執行的 ffmpeg 數量
    pub concurrency: usize,
    /// 保留每次輸出的時間戳快照
    pub keep_history: bool,
    pub width: u32,
    pub height: u32,
    /// JPEG 品質 (1-31)
    pub quality: u8,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            count: 3,
            concurrency: DEFAULT_CONCURRENCY,
            keep_history: false,
            width: THUMBNAIL_WIDTH,
            height: THUMBNAIL_HEIGHT,
            quality: 2,
        }
    }
}

impl ThumbnailSettings {
    #[must_use]
    pub const fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            width: self.width,
            height: self.height,
            quality: self.quality,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    pub time_format: TimeFormat,
    pub layout: TimelineLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdlSettings {
    /// 以 `Clip_NN` 取代來源片段名稱
    pub template_mode: bool,
    /// 覆寫偵測到的幀率
    pub framerate_override: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub projects_root: PathBuf,
    pub recent_projects: Vec<String>,
    pub thumbnail: ThumbnailSettings,
    pub timeline: TimelineSettings,
    pub edl: EdlSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            projects_root: PathBuf::from("projects"),
            recent_projects: Vec::new(),
            thumbnail: ThumbnailSettings::default(),
            timeline: TimelineSettings::default(),
            edl: EdlSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: UserSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: UserSettings =
            serde_json::from_str(r#"{"thumbnail": {"count": 5}, "language": "zh-TW"}"#).unwrap();

        assert_eq!(settings.language, Language::ZhTw);
        assert_eq!(settings.thumbnail.count, 5);
        assert_eq!(settings.thumbnail.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(settings.projects_root, PathBuf::from("projects"));
        assert_eq!(settings.timeline.time_format, TimeFormat::Clock);
    }

    #[test]
    fn test_enum_serialization() {
        let json = serde_json::to_string(&TimelineSettings {
            time_format: TimeFormat::Timecode,
            layout: TimelineLayout::Duration,
        })
        .unwrap();
        assert_eq!(json, r#"{"time_format":"timecode","layout":"duration"}"#);
    }
}
