//! 場景邊界清單
//!
//! 由 `scenes.txt` 載入，每行 `start_frame end_frame`。載入後不可再修改。

use crate::error::{PipelineError, PipelineResult};
use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// 單一場景（內部 0-based，顯示時 +1）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scene {
    pub index: usize,
    pub start_frame: u64,
    pub end_frame: u64,
}

impl Scene {
    /// 顯示用編號（1-based）
    #[must_use]
    pub const fn number(&self) -> usize {
        self.index + 1
    }

    #[must_use]
    pub const fn duration_frames(&self) -> u64 {
        self.end_frame - self.start_frame
    }

    #[must_use]
    pub const fn midpoint_frame(&self) -> u64 {
        (self.start_frame + self.end_frame) / 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneModel {
    scenes: Vec<Scene>,
}

impl SceneModel {
    /// 解析場景文字內容
    pub fn load(source: &str) -> PipelineResult<Self> {
        let mut scenes: Vec<Scene> = Vec::new();

        for (line_index, raw_line) in source.lines().enumerate() {
            let line_number = line_index + 1;
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            let (start_frame, end_frame) = parse_line(line).map_err(|reason| {
                PipelineError::MalformedSceneData {
                    line: line_number,
                    reason,
                }
            })?;

            if end_frame <= start_frame {
                return Err(PipelineError::MalformedSceneData {
                    line: line_number,
                    reason: format!("結束幀 {end_frame} 必須大於起始幀 {start_frame}"),
                });
            }

            if let Some(previous) = scenes.last() {
                if start_frame < previous.start_frame {
                    return Err(PipelineError::MalformedSceneData {
                        line: line_number,
                        reason: format!(
                            "起始幀 {start_frame} 小於前一個場景的起始幀 {}",
                            previous.start_frame
                        ),
                    });
                }
                if start_frame < previous.end_frame {
                    return Err(PipelineError::MalformedSceneData {
                        line: line_number,
                        reason: format!(
                            "與前一個場景重疊（前一個場景結束於 {}）",
                            previous.end_frame
                        ),
                    });
                }
            }

            scenes.push(Scene {
                index: scenes.len(),
                start_frame,
                end_frame,
            });
        }

        if scenes.is_empty() {
            return Err(PipelineError::MalformedSceneData {
                line: 0,
                reason: "沒有任何場景".to_string(),
            });
        }

        Ok(Self { scenes })
    }

    /// 從檔案載入；檔案不存在視為前置條件錯誤
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        if !path.is_file() {
            return Err(PipelineError::MissingInput(path.to_path_buf()).into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("無法讀取場景檔案: {}", path.display()))?;

        Ok(Self::load(&content)?)
    }

    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    #[must_use]
    pub fn scene_at(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scene> {
        self.scenes.iter()
    }

    #[must_use]
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }
}

impl<'a> IntoIterator for &'a SceneModel {
    type Item = &'a Scene;
    type IntoIter = std::slice::Iter<'a, Scene>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenes.iter()
    }
}

/// 把邊界寫成 `scenes.txt` 格式
#[must_use]
pub fn format_scene_lines(boundaries: &[(u64, u64)]) -> String {
    boundaries
        .iter()
        .map(|(start, end)| format!("{start} {end}\n"))
        .collect()
}

fn parse_line(line: &str) -> Result<(u64, u64), String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [start, end] = tokens.as_slice() else {
        return Err(format!("需要兩個整數，實際為 {} 個欄位: {line:?}", tokens.len()));
    };

    let start = start
        .parse::<u64>()
        .map_err(|_| format!("無法解析起始幀: {start:?}"))?;
    let end = end
        .parse::<u64>()
        .map_err(|_| format!("無法解析結束幀: {end:?}"))?;

    Ok((start, end))
}
