//! 縮圖輸出資料夾管理
//!
//! 不保留歷史時固定輸出到 `latest/` 並清空其內容；
//! 保留歷史時每次建立新的時間戳資料夾，舊快照永不刪除。
//! 快照名稱使用 UTC 時間，夏令時間切換時仍依建立順序排序。

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// 不保留歷史時使用的固定資料夾名稱
pub const LATEST_DIR_NAME: &str = "latest";

/// 快照資料夾名稱格式，字典序即時間順序
pub const SNAPSHOT_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

#[must_use]
pub fn snapshot_dir_name(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(SNAPSHOT_FORMAT).to_string()
}

/// 決定並準備本次縮圖輸出資料夾
pub fn prepare_output_dir(
    base_dir: &Path,
    keep_history: bool,
    timestamp: &DateTime<Utc>,
) -> Result<PathBuf> {
    if keep_history {
        let snapshot_dir = base_dir.join(snapshot_dir_name(timestamp));
        if snapshot_dir.exists() {
            bail!("快照資料夾已存在: {}", snapshot_dir.display());
        }
        fs::create_dir_all(&snapshot_dir)
            .with_context(|| format!("無法建立快照資料夾: {}", snapshot_dir.display()))?;
        info!("縮圖輸出至新快照: {}", snapshot_dir.display());
        return Ok(snapshot_dir);
    }

    let latest_dir = base_dir.join(LATEST_DIR_NAME);
    let removed = clear_directory(&latest_dir)?;
    info!(
        "縮圖輸出至 {}（已清除 {removed} 個項目）",
        latest_dir.display()
    );
    Ok(latest_dir)
}

/// 清除資料夾內所有檔案與子資料夾，保留資料夾本身
///
/// 資料夾不存在時會建立，回傳刪除的項目數。
pub fn clear_directory(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("無法建立資料夾: {}", dir.display()))?;
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("無法讀取資料夾: {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("無法刪除資料夾: {}", path.display()))?;
        } else {
            fs::remove_file(&path)
                .with_context(|| format!("無法刪除檔案: {}", path.display()))?;
        }

        debug!("已刪除: {}", path.display());
        removed += 1;
    }

    Ok(removed)
}
