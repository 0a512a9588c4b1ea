//! 幀數、秒數與時間碼之間的換算
//!
//! 全部為純函式，可在多執行緒中直接呼叫。時間碼採用 non-drop-frame 規則，
//! 每一階段都是截斷而非四捨五入。

use crate::error::{PipelineError, PipelineResult};
use serde::Serialize;
use std::fmt;

/// 已驗證的幀率（必定大於 0 且為有限值）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct FrameRate(f64);

impl FrameRate {
    pub fn new(fps: f64) -> PipelineResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(PipelineError::InvalidFrameRate(fps));
        }
        Ok(Self(fps))
    }

    #[must_use]
    pub const fn as_f64(self) -> f64 {
        self.0
    }

    /// 時間碼中每秒的幀數欄位上限（29.97 → 30）
    #[must_use]
    pub fn nominal(self) -> u64 {
        (self.0.round() as u64).max(1)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[must_use]
pub fn frame_to_seconds(frame: u64, fps: FrameRate) -> f64 {
    frame as f64 / fps.as_f64()
}

/// 秒數轉為 `HH:MM:SS.mmm`，毫秒以下截斷
///
/// 截斷前加上 1e-6 毫秒的容差吸收浮點誤差，因此距離下一個毫秒不到 1 奈秒的輸入
/// 會進位到下一個毫秒。
pub fn seconds_to_clock(seconds: f64) -> PipelineResult<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(PipelineError::NegativeSeconds(seconds));
    }

    // 0.29 * 1000 = 289.999…
    let total_ms = (seconds * 1000.0 + 1e-6).floor() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;

    Ok(format!("{h:02}:{m:02}:{s:02}.{ms:03}"))
}

/// 幀數轉為 `HH:MM:SS:FF`
#[must_use]
pub fn frame_to_timecode(frame: u64, fps: FrameRate) -> String {
    let total_secs = whole_seconds(frame, fps);
    let ff = frame % fps.nominal();
    let h = total_secs / 3600;
    let m = (total_secs / 60) % 60;
    let s = total_secs % 60;

    format!("{h:02}:{m:02}:{s:02}:{ff:02}")
}

/// 解析 `HH:MM:SS:FF` 並換回幀數
///
/// `SS` 是 `frame / fps` 的整數部分，`FF` 是 `frame mod nominal`，
/// 因此在該秒涵蓋的幀區間內找出餘數相符的幀。幀率不大於 `nominal()` 時
/// (含 23.976、29.97 等 NTSC 幀率) 結果與原始幀數完全相同；
/// 找不到相符的幀或欄位超出範圍時回傳 `None`。
#[must_use]
pub fn timecode_to_frame(timecode: &str, fps: FrameRate) -> Option<u64> {
    let parts: Vec<u64> = timecode
        .split(':')
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;

    let [h, m, s, ff] = parts.as_slice() else {
        return None;
    };

    let nominal = fps.nominal();
    if *m >= 60 || *s >= 60 || *ff >= nominal {
        return None;
    }

    let total_secs = h.checked_mul(3600)?.checked_add(m * 60)?.checked_add(*s)?;

    // 該秒的第一幀，邊界以正向換算為準
    let mut first = (total_secs as f64 * fps.as_f64()).ceil() as u64;
    while first > 0 && whole_seconds(first - 1, fps) >= total_secs {
        first -= 1;
    }
    while whole_seconds(first, fps) < total_secs {
        first = first.checked_add(1)?;
    }

    let offset = (ff + nominal - first % nominal) % nominal;
    let frame = first.checked_add(offset)?;
    (whole_seconds(frame, fps) == total_secs).then_some(frame)
}

fn whole_seconds(frame: u64, fps: FrameRate) -> u64 {
    (frame as f64 / fps.as_f64()).floor() as u64
}
