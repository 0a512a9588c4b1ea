use super::builder::{TimelineMetadata, build, export_structured, export_tabular};
use crate::config::TimelineSettings;
use crate::tools::{
    FfprobeMediaProbe, MediaProbe, ProjectPaths, SceneModel, ensure_directory_exists,
};
use anyhow::{Context, Result};
use console::style;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// 時間軸輸出結果
#[derive(Debug, Clone)]
pub struct TimelineExport {
    pub scene_count: usize,
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

pub struct TimelineExporter {
    settings: TimelineSettings,
    probe: Arc<dyn MediaProbe>,
}

impl TimelineExporter {
    #[must_use]
    pub fn new(settings: TimelineSettings) -> Self {
        Self {
            settings,
            probe: Arc::new(FfprobeMediaProbe),
        }
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn MediaProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn run(&self, project: &ProjectPaths) -> Result<TimelineExport> {
        println!("{}", style("=== 時間軸匯出 ===").cyan().bold());

        project.require_inputs(true)?;
        let video_path = project.video_path();
        let scene_model = SceneModel::load_file(&project.scenes_path())?;
        let video_info = self
            .probe
            .probe(&video_path)
            .with_context(|| format!("無法讀取影片資訊: {}", video_path.display()))?;

        // 全部紀錄成功建立後才寫檔
        let records = build(
            &scene_model,
            video_info.frame_rate,
            self.settings.time_format,
        )?;
        let metadata = TimelineMetadata {
            resolution: video_info.resolution(),
            fps: video_info.frame_rate,
            duration: video_info.duration_seconds,
        };

        ensure_directory_exists(&project.outputs_dir())?;
        let csv_path = project.timeline_csv_path();
        let json_path = project.timeline_json_path();
        export_tabular(&records, self.settings.layout, &csv_path)?;
        export_structured(&records, self.settings.layout, &metadata, &json_path)?;

        let export = TimelineExport {
            scene_count: records.len(),
            csv_path,
            json_path,
        };
        Self::print_summary(&export);

        Ok(export)
    }

    fn print_summary(export: &TimelineExport) {
        println!("  場景數: {}", style(export.scene_count).green());
        println!("  CSV:  {}", export.csv_path.display());
        println!("  JSON: {}", export.json_path.display());

        info!(
            "時間軸匯出完成 - {} 個場景: {}",
            export.scene_count,
            export.csv_path.display()
        );
    }
}
