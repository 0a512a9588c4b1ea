use super::events::{build, export};
use crate::config::EdlSettings;
use crate::tools::{
    FfprobeMediaProbe, FrameRate, MediaProbe, ProjectPaths, SceneModel, ensure_directory_exists,
};
use anyhow::{Context, Result};
use console::style;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

pub struct EdlGenerator {
    settings: EdlSettings,
    probe: Arc<dyn MediaProbe>,
}

impl EdlGenerator {
    #[must_use]
    pub fn new(settings: EdlSettings) -> Self {
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

    pub fn run(&self, project: &ProjectPaths) -> Result<PathBuf> {
        println!("{}", style("=== EDL 產生 ===").cyan().bold());

        // 指定幀率時不需要讀取影片
        project.require_inputs(self.settings.framerate_override.is_none())?;
        let scene_model = SceneModel::load_file(&project.scenes_path())?;
        let fps = self.resolve_frame_rate(project)?;
        println!("  使用幀率: {} fps", style(fps).green());

        let events = build(
            &scene_model,
            fps,
            self.settings.template_mode,
            &project.clip_name(),
        );

        ensure_directory_exists(&project.outputs_dir())?;
        let edl_path = project.edl_path();
        export(&events, project.name(), &edl_path)?;

        println!("  事件數: {}", style(events.len()).green());
        println!("  EDL: {}", edl_path.display());
        info!("EDL 產生完成 - {} 個事件: {}", events.len(), edl_path.display());

        Ok(edl_path)
    }

    fn resolve_frame_rate(&self, project: &ProjectPaths) -> Result<FrameRate> {
        if let Some(fps) = self.settings.framerate_override {
            return Ok(FrameRate::new(fps)?);
        }

        let video_path = project.video_path();
        let video_info = self
            .probe
            .probe(&video_path)
            .with_context(|| format!("無法讀取影片資訊: {}", video_path.display()))?;
        Ok(video_info.frame_rate)
    }
}
