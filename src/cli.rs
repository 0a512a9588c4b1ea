//! 命令列介面；未指定子命令時進入互動選單

use crate::component::{
    EdlGenerator, ProjectImporter, ThumbnailGenerator, TimelineExporter, run_all,
};
use crate::config::save::{add_recent_project, save_settings};
use crate::config::{Config, TimeFormat, TimelineLayout, UserSettings};
use crate::tools::{FfmpegSceneDetector, ProjectPaths, SceneDetectorConfig};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

#[derive(Debug, Parser)]
#[command(
    name = "scene_export",
    version,
    about = "Scene thumbnails, timeline and EDL export for detected video scenes"
)]
pub struct Cli {
    /// Folder that holds all projects (overrides settings.json).
    #[arg(long, global = true)]
    pub projects_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Copy a video into a new project and detect its scenes.
    Import {
        /// Source video file.
        video: PathBuf,
        /// Project name (defaults to the video file stem).
        #[arg(long)]
        name: Option<String>,
        /// Scene change threshold for ffmpeg scdet (0-100).
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Extract sampled thumbnails for every scene.
    Thumbnails {
        project: String,
        #[command(flatten)]
        thumbnail: ThumbnailArgs,
    },

    /// Export timeline.csv and timeline.json.
    Timeline {
        project: String,
        #[command(flatten)]
        timeline: TimelineArgs,
    },

    /// Export timeline.edl.
    Edl {
        project: String,
        #[command(flatten)]
        edl: EdlArgs,
    },

    /// Run thumbnails, timeline and EDL in sequence.
    All {
        project: String,
        #[command(flatten)]
        thumbnail: ThumbnailArgs,
        #[command(flatten)]
        timeline: TimelineArgs,
        #[command(flatten)]
        edl: EdlArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ThumbnailArgs {
    /// Thumbnails per scene.
    #[arg(long)]
    pub count: Option<usize>,
    /// Number of concurrent ffmpeg workers.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,
    /// Keep previous thumbnails in a timestamped folder.
    #[arg(long)]
    pub keep_history: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct TimelineArgs {
    /// Time column format.
    #[arg(long, value_enum)]
    pub time_format: Option<TimeFormat>,
    /// Timeline column layout.
    #[arg(long, value_enum)]
    pub layout: Option<TimelineLayout>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct EdlArgs {
    /// Use placeholder clip names (Clip_01, Clip_02, ...).
    #[arg(short, long)]
    pub template: bool,
    /// Override the detected frame rate.
    #[arg(short, long)]
    pub framerate: Option<f64>,
}

impl ThumbnailArgs {
    fn apply(&self, settings: &mut UserSettings) {
        if let Some(count) = self.count {
            settings.thumbnail.count = count;
        }
        if let Some(concurrency) = self.concurrency {
            settings.thumbnail.concurrency = concurrency;
        }
        if self.keep_history {
            settings.thumbnail.keep_history = true;
        }
    }
}

impl TimelineArgs {
    fn apply(&self, settings: &mut UserSettings) {
        if let Some(time_format) = self.time_format {
            settings.timeline.time_format = time_format;
        }
        if let Some(layout) = self.layout {
            settings.timeline.layout = layout;
        }
    }
}

impl EdlArgs {
    fn apply(&self, settings: &mut UserSettings) {
        if self.template {
            settings.edl.template_mode = true;
        }
        if self.framerate.is_some() {
            settings.edl.framerate_override = self.framerate;
        }
    }
}

/// 執行單一子命令
///
/// 命令列參數只影響這次執行，不寫回設定檔；最近使用的專案則會保存。
pub fn execute(
    command: &Commands,
    projects_root: Option<&Path>,
    config: &mut Config,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<()> {
    let mut settings = config.settings.clone();
    if let Some(root) = projects_root {
        settings.projects_root = root.to_path_buf();
    }

    let project_name = match command {
        Commands::Import {
            video,
            name,
            threshold,
        } => {
            let mut detector_config = SceneDetectorConfig::default();
            if let Some(threshold) = threshold {
                detector_config.threshold = *threshold;
            }
            let project = ProjectImporter::new(&settings.projects_root)
                .with_detector(Arc::new(FfmpegSceneDetector::new(detector_config)))
                .run(video, name.as_deref())?;
            project.name().to_string()
        }
        Commands::Thumbnails { project, thumbnail } => {
            thumbnail.apply(&mut settings);
            let paths = ProjectPaths::open(&settings.projects_root, project)?;
            ThumbnailGenerator::new(settings.thumbnail, Arc::clone(shutdown_signal))
                .run(&paths)?;
            project.clone()
        }
        Commands::Timeline { project, timeline } => {
            timeline.apply(&mut settings);
            let paths = ProjectPaths::open(&settings.projects_root, project)?;
            TimelineExporter::new(settings.timeline).run(&paths)?;
            project.clone()
        }
        Commands::Edl { project, edl } => {
            edl.apply(&mut settings);
            let paths = ProjectPaths::open(&settings.projects_root, project)?;
            EdlGenerator::new(settings.edl).run(&paths)?;
            project.clone()
        }
        Commands::All {
            project,
            thumbnail,
            timeline,
            edl,
        } => {
            thumbnail.apply(&mut settings);
            timeline.apply(&mut settings);
            edl.apply(&mut settings);
            let paths = ProjectPaths::open(&settings.projects_root, project)?;
            run_all(&settings, &paths, shutdown_signal)?;
            project.clone()
        }
    };

    add_recent_project(&mut config.settings, &project_name);
    if let Err(e) = save_settings(&config.settings) {
        warn!("無法保存最近使用的專案: {e:#}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_with_overrides() {
        let cli = Cli::try_parse_from([
            "scene_export",
            "all",
            "demo",
            "--count",
            "5",
            "-j",
            "8",
            "--time-format",
            "timecode",
            "--layout",
            "duration",
            "--template",
            "--framerate",
            "23.976",
        ])
        .unwrap();

        let Some(Commands::All {
            project,
            thumbnail,
            timeline,
            edl,
        }) = cli.command
        else {
            panic!("expected `all` command");
        };
        assert_eq!(project, "demo");

        let mut settings = UserSettings::default();
        thumbnail.apply(&mut settings);
        timeline.apply(&mut settings);
        edl.apply(&mut settings);

        assert_eq!(settings.thumbnail.count, 5);
        assert_eq!(settings.thumbnail.concurrency, 8);
        assert!(!settings.thumbnail.keep_history);
        assert_eq!(settings.timeline.time_format, TimeFormat::Timecode);
        assert_eq!(settings.timeline.layout, TimelineLayout::Duration);
        assert!(settings.edl.template_mode);
        assert_eq!(settings.edl.framerate_override, Some(23.976));
    }

    #[test]
    fn test_no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["scene_export"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.projects_root.is_none());
    }

    #[test]
    fn test_absent_flags_keep_settings() {
        let mut settings = UserSettings::default();
        settings.edl.framerate_override = Some(30.0);
        EdlArgs::default().apply(&mut settings);
        ThumbnailArgs::default().apply(&mut settings);

        assert_eq!(settings.edl.framerate_override, Some(30.0));
        assert_eq!(settings.thumbnail, UserSettings::default().thumbnail);
    }
}
