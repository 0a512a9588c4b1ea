//! 管線錯誤類型
//!
//! 前置條件錯誤與契約違反會直接回報給呼叫端；
//! 單一縮圖擷取失敗則記錄在 `ExtractionReport`，不會出現在這裡。

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("找不到必要的輸入檔案: {0}")]
    MissingInput(PathBuf),

    #[error("場景資料格式錯誤（第 {line} 行）: {reason}")]
    MalformedSceneData { line: usize, reason: String },

    #[error("幀率必須大於 0: {0}")]
    InvalidFrameRate(f64),

    #[error("秒數不可為負數: {0}")]
    NegativeSeconds(f64),

    #[error("每個場景的縮圖數量至少為 1")]
    InvalidThumbnailCount,

    #[error("並行數量至少為 1")]
    InvalidConcurrency,

    #[error("操作已取消：已完成 {completed}/{total} 個工作")]
    Cancelled { completed: usize, total: usize },
}

/// 取消時使用的結束碼（與 SIGINT 慣例一致）
pub const CANCELLED_EXIT_CODE: u8 = 130;

impl PipelineError {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// 錯誤鏈中是否含有取消
#[must_use]
pub fn is_cancelled(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<PipelineError>())
        .any(PipelineError::is_cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_is_cancelled_through_context() {
        let error = Err::<(), _>(PipelineError::Cancelled {
            completed: 3,
            total: 9,
        })
        .context("縮圖擷取")
        .unwrap_err();
        assert!(is_cancelled(&error));

        let error = anyhow::Error::from(PipelineError::InvalidConcurrency);
        assert!(!is_cancelled(&error));
    }
}
