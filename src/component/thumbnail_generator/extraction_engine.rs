//! 縮圖擷取引擎
//!
//! 固定大小的 rayon 執行緒池依工作順序 (FIFO) 派送，完成順序不固定。
//! 單一工作失敗只會記錄在報告中，不影響其他工作。

use super::frame_extractor::FrameExtractor;
use super::scheduler::ThumbnailJob;
use crate::error::PipelineError;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// 預設並行數量
pub const DEFAULT_CONCURRENCY: usize = 4;

/// 工作完成計數器，所有 worker 共用
#[derive(Debug)]
pub struct ProgressCounter {
    completed: AtomicUsize,
    total: usize,
    progress_bar: Option<ProgressBar>,
}

impl ProgressCounter {
    #[must_use]
    pub const fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
            progress_bar: None,
        }
    }

    /// 附帶終端機進度條
    #[must_use]
    pub fn with_progress_bar(total: usize) -> Self {
        let progress_bar = ProgressBar::new(total as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        progress_bar.set_message("擷取縮圖中...");

        Self {
            completed: AtomicUsize::new(0),
            total,
            progress_bar: Some(progress_bar),
        }
    }

    /// 記錄一個工作完成，回傳目前完成數
    pub fn record(&self) -> usize {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.inc(1);
        }
        debug!("進度 {completed}/{}", self.total);
        completed
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// 結束進度條；中斷時保留停下的位置並標示未完成
    pub fn finish(&self, cancelled: bool) {
        let Some(progress_bar) = &self.progress_bar else {
            return;
        };

        if cancelled {
            progress_bar.abandon_with_message("已中斷");
        } else {
            progress_bar.finish_with_message("完成");
        }
    }
}

/// 擷取成功的工作
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedJob {
    pub scene_index: usize,
    pub position_index: usize,
    pub frame_number: u64,
    pub output_path: PathBuf,
}

/// 擷取失敗的工作
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedJob {
    pub scene_index: usize,
    pub position_index: usize,
    pub frame_number: u64,
    pub output_path: PathBuf,
    pub error: String,
}

/// 擷取結果報告
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExtractionReport {
    pub total: usize,
    pub succeeded: Vec<CompletedJob>,
    pub failed: Vec<FailedJob>,
    /// 因取消而未執行的工作數
    pub skipped: usize,
    pub cancelled: bool,
}

impl ExtractionReport {
    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// 已執行完畢（不論成敗）的工作數
    #[must_use]
    pub fn finished_count(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// 寫出 JSON 紀錄檔（取消時也會寫出目前為止的結果）
    pub fn write_log(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("無法序列化擷取紀錄")?;
        fs::write(path, content)
            .with_context(|| format!("無法寫入擷取紀錄: {}", path.display()))?;
        Ok(())
    }
}

enum JobOutcome {
    Succeeded(ThumbnailJob),
    Failed(ThumbnailJob, String),
    Skipped,
}

pub struct ExtractionEngine {
    extractor: Arc<dyn FrameExtractor>,
    video_path: PathBuf,
    shutdown_signal: Arc<AtomicBool>,
}

impl ExtractionEngine {
    #[must_use]
    pub fn new(
        extractor: Arc<dyn FrameExtractor>,
        video_path: &Path,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            extractor,
            video_path: video_path.to_path_buf(),
            shutdown_signal,
        }
    }

    /// 以 `concurrency` 個 worker 執行所有工作
    ///
    /// 每次派送前與每個工作開始時都會檢查中斷信號；
    /// 已在執行中的工作會跑完，尚未開始的計入 `skipped`。
    pub fn run(
        &self,
        jobs: Vec<ThumbnailJob>,
        concurrency: usize,
        progress: &ProgressCounter,
    ) -> Result<ExtractionReport> {
        if concurrency == 0 {
            return Err(PipelineError::InvalidConcurrency.into());
        }

        let total = jobs.len();
        info!("開始擷取 {total} 張縮圖（並行 {concurrency}）");

        let pool = ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .thread_name(|i| format!("thumbnail-worker-{i}"))
            .build()
            .context("無法建立縮圖執行緒池")?;

        let outcomes: Mutex<Vec<JobOutcome>> = Mutex::new(Vec::with_capacity(total));
        let mut not_dispatched = 0;

        pool.scope_fifo(|scope| {
            for job in jobs {
                if self.is_cancelled() {
                    not_dispatched += 1;
                    continue;
                }

                let outcomes = &outcomes;
                scope.spawn_fifo(move |_| {
                    let outcome = self.run_job(job, progress);
                    outcomes
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(outcome);
                });
            }
        });

        let outcomes = outcomes.into_inner().unwrap_or_else(PoisonError::into_inner);
        let report = self.build_report(total, not_dispatched, outcomes);

        if report.cancelled {
            warn!(
                "擷取已取消: 完成 {}, 失敗 {}, 未執行 {}",
                report.succeeded_count(),
                report.failed_count(),
                report.skipped
            );
        } else {
            info!(
                "擷取完成: 成功 {}, 失敗 {}",
                report.succeeded_count(),
                report.failed_count()
            );
        }

        Ok(report)
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown_signal.load(Ordering::SeqCst)
    }

    fn run_job(&self, job: ThumbnailJob, progress: &ProgressCounter) -> JobOutcome {
        if self.is_cancelled() {
            return JobOutcome::Skipped;
        }

        debug!(
            "擷取場景 {} 位置 {}: 第 {} 幀",
            job.scene_index, job.position_index, job.frame_number
        );

        let result = self
            .extractor
            .extract_frame(&self.video_path, job.frame_number, &job.output_path)
            .and_then(|()| {
                if job.output_path.exists() {
                    Ok(())
                } else {
                    Err(anyhow::anyhow!(
                        "縮圖檔案未建立: {}",
                        job.output_path.display()
                    ))
                }
            });

        progress.record();

        match result {
            Ok(()) => JobOutcome::Succeeded(job),
            Err(e) => {
                error!(
                    "縮圖擷取失敗 [場景 {} 位置 {}]: {e:#}",
                    job.scene_index, job.position_index
                );
                JobOutcome::Failed(job, format!("{e:#}"))
            }
        }
    }

    fn build_report(
        &self,
        total: usize,
        not_dispatched: usize,
        outcomes: Vec<JobOutcome>,
    ) -> ExtractionReport {
        let mut report = ExtractionReport {
            total,
            skipped: not_dispatched,
            ..ExtractionReport::default()
        };

        for outcome in outcomes {
            match outcome {
                JobOutcome::Succeeded(job) => report.succeeded.push(CompletedJob {
                    scene_index: job.scene_index,
                    position_index: job.position_index,
                    frame_number: job.frame_number,
                    output_path: job.output_path,
                }),
                JobOutcome::Failed(job, error) => report.failed.push(FailedJob {
                    scene_index: job.scene_index,
                    position_index: job.position_index,
                    frame_number: job.frame_number,
                    output_path: job.output_path,
                    error,
                }),
                JobOutcome::Skipped => report.skipped += 1,
            }
        }

        // 完成順序不固定，報告依 (場景, 位置) 排序
        report
            .succeeded
            .sort_by_key(|j| (j.scene_index, j.position_index));
        report
            .failed
            .sort_by_key(|j| (j.scene_index, j.position_index));
        report.cancelled = report.skipped > 0 || self.is_cancelled();

        report
    }
}
