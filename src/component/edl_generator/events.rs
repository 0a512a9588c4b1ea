//! EDL 事件與輸出
//!
//! 錄製時間碼以整數幀累加器計算，事件之間首尾相接。

use crate::tools::{FrameRate, SceneModel, frame_to_timecode};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdlEvent {
    pub event_number: usize,
    pub source_in: String,
    pub source_out: String,
    pub record_in: String,
    pub record_out: String,
    pub clip_name: String,
    pub comment: String,
}

/// 依場景順序建立 EDL 事件
///
/// `template_mode` 只影響片段名稱（`Clip_NN`），不影響時間碼。
#[must_use]
pub fn build(
    model: &SceneModel,
    fps: FrameRate,
    template_mode: bool,
    clip_name: &str,
) -> Vec<EdlEvent> {
    let mut record_frame: u64 = 0;

    model
        .iter()
        .map(|scene| {
            let number = scene.number();
            let record_in = record_frame;
            record_frame += scene.duration_frames();

            EdlEvent {
                event_number: number,
                source_in: frame_to_timecode(scene.start_frame, fps),
                source_out: frame_to_timecode(scene.end_frame, fps),
                record_in: frame_to_timecode(record_in, fps),
                record_out: frame_to_timecode(record_frame, fps),
                clip_name: if template_mode {
                    format!("Clip_{number:02}")
                } else {
                    clip_name.to_string()
                },
                comment: format!("Scene {number} - Hard Cut"),
            }
        })
        .collect()
}

/// 寫出 CMX 3600 風格的 EDL
pub fn export(events: &[EdlEvent], title: &str, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("無法建立 EDL 檔案: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_edl(events, title, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn write_edl(events: &[EdlEvent], title: &str, writer: &mut impl Write) -> Result<()> {
    writeln!(writer, "TITLE: {title}")?;
    writeln!(writer, "FCM: NON-DROP FRAME")?;

    for event in events {
        writeln!(writer)?;
        writeln!(
            writer,
            "{:04}  AX       V     C        {} {} {} {}",
            event.event_number,
            event.source_in,
            event.source_out,
            event.record_in,
            event.record_out
        )?;
        writeln!(writer, "* FROM CLIP NAME: {}", event.clip_name)?;
        writeln!(writer, "* COMMENT: {}", event.comment)?;
    }

    Ok(())
}
