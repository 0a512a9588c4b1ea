use super::extraction_engine::{ExtractionEngine, ExtractionReport, ProgressCounter};
use super::frame_extractor::{FfmpegFrameExtractor, FrameExtractor};
use super::history::prepare_output_dir;
use super::scheduler::create_jobs;
use crate::config::ThumbnailSettings;
use crate::error::PipelineError;
use crate::tools::{
    FfprobeMediaProbe, MediaProbe, ProjectPaths, SceneModel, ensure_directory_exists,
};
use anyhow::{Context, Result};
use chrono::Utc;
use console::style;
use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 場景縮圖產生器
///
/// 三階段流程：
/// A. 讀取場景與影片資訊（任何輸出之前）
/// B. 準備輸出資料夾並排程
/// C. 平行擷取縮圖，寫出擷取紀錄
pub struct ThumbnailGenerator {
    settings: ThumbnailSettings,
    shutdown_signal: Arc<AtomicBool>,
    probe: Arc<dyn MediaProbe>,
    extractor: Option<Arc<dyn FrameExtractor>>,
    show_progress: bool,
}

impl ThumbnailGenerator {
    #[must_use]
    pub fn new(settings: ThumbnailSettings, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            settings,
            shutdown_signal,
            probe: Arc::new(FfprobeMediaProbe),
            extractor: None,
            show_progress: true,
        }
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn MediaProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// 指定擷取器；未指定時依影片幀率建立 ffmpeg 擷取器
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn FrameExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    #[must_use]
    pub const fn with_progress_bar(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn run(&self, project: &ProjectPaths) -> Result<ExtractionReport> {
        println!("{}", style("=== 場景縮圖擷取 ===").cyan().bold());

        // Stage A: 前置條件
        project.require_inputs(true)?;
        if self.settings.count == 0 {
            return Err(PipelineError::InvalidThumbnailCount.into());
        }
        if self.settings.concurrency == 0 {
            return Err(PipelineError::InvalidConcurrency.into());
        }

        let video_path = project.video_path();
        let scene_model = SceneModel::load_file(&project.scenes_path())?;
        let video_info = self
            .probe
            .probe(&video_path)
            .with_context(|| format!("無法讀取影片資訊: {}", video_path.display()))?;

        println!(
            "  {} {} 個場景，{} fps，{}",
            style("A").dim(),
            scene_model.scene_count(),
            video_info.frame_rate,
            video_info.resolution()
        );

        // Stage B: 輸出資料夾與工作排程
        let output_dir = prepare_output_dir(
            &project.thumbnails_dir(),
            self.settings.keep_history,
            &Utc::now(),
        )?;
        let jobs = create_jobs(&scene_model, self.settings.count, &output_dir)?;
        println!(
            "  {} 每個場景 {} 張，共 {} 張 → {}",
            style("B").dim(),
            self.settings.count,
            jobs.len(),
            output_dir.display()
        );

        // Stage C: 擷取
        let extractor: Arc<dyn FrameExtractor> = match &self.extractor {
            Some(extractor) => Arc::clone(extractor),
            None => Arc::new(FfmpegFrameExtractor::new(
                video_info.frame_rate,
                self.settings.extractor_config(),
            )),
        };
        let engine =
            ExtractionEngine::new(extractor, &video_path, Arc::clone(&self.shutdown_signal));

        let progress = if self.show_progress {
            ProgressCounter::with_progress_bar(jobs.len())
        } else {
            ProgressCounter::new(jobs.len())
        };
        let report = engine.run(jobs, self.settings.concurrency, &progress)?;
        progress.finish(report.cancelled);

        // 取消時也要留下目前為止的紀錄
        ensure_directory_exists(&project.outputs_dir())?;
        let log_path = project.extraction_log_path();
        report.write_log(&log_path)?;
        info!("擷取紀錄已寫入: {}", log_path.display());

        self.print_summary(&report);

        if report.cancelled {
            warn!("縮圖擷取被中斷");
            return Err(PipelineError::Cancelled {
                completed: report.finished_count(),
                total: report.total,
            }
            .into());
        }

        Ok(report)
    }

    fn print_summary(&self, report: &ExtractionReport) {
        println!();
        println!("{}", style("=== 縮圖擷取摘要 ===").cyan().bold());
        println!("  總計: {} 張", report.total);
        println!("  成功: {} 張", style(report.succeeded_count()).green());

        if report.failed_count() > 0 {
            println!("  失敗: {} 張", style(report.failed_count()).red());
            for failed in &report.failed {
                println!(
                    "    {} 場景 {} 位置 {}（第 {} 幀）",
                    style("✗").red(),
                    failed.scene_index + 1,
                    failed.position_index,
                    failed.frame_number
                );
            }
        }

        if report.skipped > 0 {
            println!("  未執行: {} 張", style(report.skipped).yellow());
        }

        info!(
            "縮圖擷取完成 - 成功: {}, 失敗: {}, 未執行: {}",
            report.succeeded_count(),
            report.failed_count(),
            report.skipped
        );
    }
}
