//! 時間軸紀錄與輸出
//!
//! 時間欄位只在 `build` 時格式化一次，CSV 與 JSON 共用同一份欄位值，
//! 兩種輸出的數字不會各自捨入而不一致。

use crate::config::{TimeFormat, TimelineLayout};
use crate::error::PipelineResult;
use crate::tools::{
    FrameRate, SceneModel, frame_to_seconds, frame_to_timecode, seconds_to_clock,
};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value, json};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRecord {
    pub scene_number: usize,
    pub start_frame: u64,
    pub end_frame: u64,
    pub midpoint_frame: u64,
    pub start_time: String,
    pub end_time: String,
    pub midpoint_time: String,
    /// 場景長度（秒，小數兩位）
    pub duration: String,
}

impl TimelineRecord {
    /// 依欄位配置列出 (欄位名稱, 值)
    #[must_use]
    pub fn cells(&self, layout: TimelineLayout) -> Vec<(&'static str, Value)> {
        let mut cells = vec![
            ("Scene", json!(self.scene_number)),
            ("Start Frame", json!(self.start_frame)),
            ("End Frame", json!(self.end_frame)),
        ];

        match layout {
            TimelineLayout::Midpoint => cells.extend([
                ("Midpoint Frame", json!(self.midpoint_frame)),
                ("Start Time", json!(self.start_time)),
                ("End Time", json!(self.end_time)),
                ("Midpoint Time", json!(self.midpoint_time)),
            ]),
            TimelineLayout::Duration => cells.extend([
                ("Start Time", json!(self.start_time)),
                ("End Time", json!(self.end_time)),
                ("Duration (s)", json!(self.duration)),
            ]),
        }

        cells
    }
}

/// 時間軸 JSON 的 metadata 區塊
#[derive(Debug, Clone, Serialize)]
pub struct TimelineMetadata {
    pub resolution: String,
    pub fps: FrameRate,
    pub duration: f64,
}

/// 由場景清單建立時間軸紀錄
pub fn build(
    model: &SceneModel,
    fps: FrameRate,
    time_format: TimeFormat,
) -> PipelineResult<Vec<TimelineRecord>> {
    model
        .iter()
        .map(|scene| {
            let midpoint_frame = scene.midpoint_frame();
            Ok(TimelineRecord {
                scene_number: scene.number(),
                start_frame: scene.start_frame,
                end_frame: scene.end_frame,
                midpoint_frame,
                start_time: format_time(scene.start_frame, fps, time_format)?,
                end_time: format_time(scene.end_frame, fps, time_format)?,
                midpoint_time: format_time(midpoint_frame, fps, time_format)?,
                duration: format!("{:.2}", frame_to_seconds(scene.duration_frames(), fps)),
            })
        })
        .collect()
}

fn format_time(frame: u64, fps: FrameRate, time_format: TimeFormat) -> PipelineResult<String> {
    match time_format {
        TimeFormat::Clock => seconds_to_clock(frame_to_seconds(frame, fps)),
        TimeFormat::Timecode => Ok(frame_to_timecode(frame, fps)),
        TimeFormat::Seconds => Ok(format!("{:.2}", frame_to_seconds(frame, fps))),
    }
}

/// 輸出 CSV
pub fn export_tabular(
    records: &[TimelineRecord],
    layout: TimelineLayout,
    path: &Path,
) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("無法建立 CSV 檔案: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_tabular(records, layout, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn write_tabular(
    records: &[TimelineRecord],
    layout: TimelineLayout,
    writer: &mut impl Write,
) -> Result<()> {
    let header: Vec<&str> = header_for(layout);
    writeln!(writer, "{}", header.join(","))?;

    for record in records {
        let row: Vec<String> = record
            .cells(layout)
            .into_iter()
            .map(|(_, value)| csv_field(&value))
            .collect();
        writeln!(writer, "{}", row.join(","))?;
    }

    Ok(())
}

/// 輸出 JSON（四格縮排）
pub fn export_structured(
    records: &[TimelineRecord],
    layout: TimelineLayout,
    metadata: &TimelineMetadata,
    path: &Path,
) -> Result<()> {
    let scenes: Vec<Value> = records
        .iter()
        .map(|record| {
            let object: Map<String, Value> = record
                .cells(layout)
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect();
            Value::Object(object)
        })
        .collect();

    let document = json!({
        "metadata": metadata,
        "scenes": scenes,
    });

    let file =
        File::create(path).with_context(|| format!("無法建立 JSON 檔案: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut serializer =
        Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    document
        .serialize(&mut serializer)
        .context("無法序列化時間軸")?;
    writer.flush()?;

    Ok(())
}

fn header_for(layout: TimelineLayout) -> Vec<&'static str> {
    let sample = TimelineRecord {
        scene_number: 0,
        start_frame: 0,
        end_frame: 0,
        midpoint_frame: 0,
        start_time: String::new(),
        end_time: String::new(),
        midpoint_time: String::new(),
        duration: String::new(),
    };
    sample.cells(layout).into_iter().map(|(name, _)| name).collect()
}

fn csv_field(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn model() -> SceneModel {
        SceneModel::load("0 10\n10 25\n").unwrap()
    }

    fn fps25() -> FrameRate {
        FrameRate::new(25.0).unwrap()
    }

    #[test]
    fn test_build_clock_format() {
        let records = build(&model(), fps25(), TimeFormat::Clock).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].scene_number, 2);
        assert_eq!(records[1].midpoint_frame, 17);
        assert_eq!(records[1].start_time, "00:00:00.400");
        assert_eq!(records[1].end_time, "00:00:01.000");
        assert_eq!(records[1].midpoint_time, "00:00:00.680");
        assert_eq!(records[1].duration, "0.60");
    }

    #[test]
    fn test_build_timecode_and_seconds_format() {
        let records = build(&model(), fps25(), TimeFormat::Timecode).unwrap();
        assert_eq!(records[1].end_time, "00:00:01:00");

        let records = build(&model(), fps25(), TimeFormat::Seconds).unwrap();
        assert_eq!(records[1].start_time, "0.40");
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = build(&model(), fps25(), TimeFormat::Clock).unwrap();
        let b = build(&model(), fps25(), TimeFormat::Clock).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_write_tabular_midpoint_layout() {
        let records = build(&model(), fps25(), TimeFormat::Clock).unwrap();
        let mut buffer = Vec::new();
        write_tabular(&records, TimelineLayout::Midpoint, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Scene,Start Frame,End Frame,Midpoint Frame,Start Time,End Time,Midpoint Time"
        );
        assert_eq!(lines[1], "1,0,10,5,00:00:00.000,00:00:00.400,00:00:00.200");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_tabular_duration_layout() {
        let records = build(&model(), fps25(), TimeFormat::Seconds).unwrap();
        let mut buffer = Vec::new();
        write_tabular(&records, TimelineLayout::Duration, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(
            text,
            "Scene,Start Frame,End Frame,Start Time,End Time,Duration (s)\n\
             1,0,10,0.00,0.40,0.40\n\
             2,10,25,0.40,1.00,0.60\n"
        );
    }

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field(&json!("a,b")), "\"a,b\"");
        assert_eq!(csv_field(&json!("say \"hi\"")), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field(&json!(42)), "42");
    }

    #[test]
    fn test_export_structured_matches_tabular() {
        let temp_dir = TempDir::new().unwrap();
        let records = build(&model(), fps25(), TimeFormat::Clock).unwrap();
        let metadata = TimelineMetadata {
            resolution: "1920x1080".to_string(),
            fps: fps25(),
            duration: 1.0,
        };

        let json_path = temp_dir.path().join("timeline.json");
        let csv_path = temp_dir.path().join("timeline.csv");
        export_structured(&records, TimelineLayout::Midpoint, &metadata, &json_path).unwrap();
        export_tabular(&records, TimelineLayout::Midpoint, &csv_path).unwrap();

        let json_text = std::fs::read_to_string(&json_path).unwrap();
        assert!(json_text.contains("\n    \"metadata\""));
        let value: Value = serde_json::from_str(&json_text).unwrap();
        assert_eq!(value["metadata"]["resolution"], "1920x1080");
        assert_eq!(value["metadata"]["fps"], 25.0);

        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        let csv_rows: Vec<Vec<&str>> = csv_text
            .lines()
            .skip(1)
            .map(|line| line.split(',').collect())
            .collect();
        let header: Vec<&str> = header_for(TimelineLayout::Midpoint);

        for (row, scene) in csv_rows.iter().zip(value["scenes"].as_array().unwrap()) {
            for (column, cell) in header.iter().zip(row) {
                assert_eq!(csv_field(&scene[*column]), *cell, "{column}");
            }
        }

        // JSON 欄位順序與 CSV 相同
        let keys: Vec<&String> = value["scenes"][0].as_object().unwrap().keys().collect();
        assert_eq!(keys, header);
    }
}
