use crate::tools::{
    FfmpegSceneDetector, FfprobeMediaProbe, MediaProbe, ProjectPaths, SceneDetector, SceneModel,
    ensure_directory_exists, format_scene_lines, validate_file_exists,
};
use anyhow::{Context, Result, bail};
use console::style;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 建立專案資料夾並偵測場景
///
/// 影片複製為 `<projects_root>/<name>/<name>.<ext>`，場景邊界寫入 `outputs/scenes.txt`。
pub struct ProjectImporter {
    projects_root: PathBuf,
    detector: Arc<dyn SceneDetector>,
    probe: Arc<dyn MediaProbe>,
}

impl ProjectImporter {
    #[must_use]
    pub fn new(projects_root: &Path) -> Self {
        Self {
            projects_root: projects_root.to_path_buf(),
            detector: Arc::new(FfmpegSceneDetector::default()),
            probe: Arc::new(FfprobeMediaProbe),
        }
    }

    #[must_use]
    pub fn with_detector(mut self, detector: Arc<dyn SceneDetector>) -> Self {
        self.detector = detector;
        self
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn MediaProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// `name` 未指定時使用來源檔名（不含副檔名）
    pub fn run(&self, source: &Path, name: Option<&str>) -> Result<ProjectPaths> {
        println!("{}", style("=== 匯入影片 ===").cyan().bold());

        validate_file_exists(source)?;
        let name = match name {
            Some(name) => name.trim().to_string(),
            None => source
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        if name.is_empty() {
            bail!("無法決定專案名稱: {}", source.display());
        }
        let Some(extension) = source.extension().and_then(|ext| ext.to_str()) else {
            bail!("影片沒有副檔名: {}", source.display());
        };

        let project = ProjectPaths::new(&self.projects_root, &name, extension);
        ensure_directory_exists(&project.outputs_dir())?;
        ensure_directory_exists(&project.thumbnails_dir())?;

        let video_path = project.video_path();
        Self::copy_video(source, &video_path)?;
        println!("  影片: {}", video_path.display());

        let video_info = self
            .probe
            .probe(&video_path)
            .with_context(|| format!("無法讀取影片資訊: {}", video_path.display()))?;
        println!(
            "  {} fps，{}，{:.2} 秒",
            video_info.frame_rate,
            video_info.resolution(),
            video_info.duration_seconds
        );

        let boundaries = self.detector.detect(&video_path, &video_info)?;
        let scene_text = format_scene_lines(&boundaries);
        // 寫檔前先驗證，不留下無法載入的 scenes.txt
        let scene_model = SceneModel::load(&scene_text)?;

        let scenes_path = project.scenes_path();
        fs::write(&scenes_path, scene_text)
            .with_context(|| format!("無法寫入場景檔: {}", scenes_path.display()))?;

        println!("  場景數: {}", style(scene_model.scene_count()).green());
        info!(
            "專案 {} 匯入完成 - {} 個場景",
            project.name(),
            scene_model.scene_count()
        );

        Ok(project)
    }

    fn copy_video(source: &Path, destination: &Path) -> Result<()> {
        if destination.exists() && fs::canonicalize(source)? == fs::canonicalize(destination)? {
            debug!("影片已在專案資料夾中: {}", destination.display());
            return Ok(());
        }

        fs::copy(source, destination).with_context(|| {
            format!(
                "無法複製影片: {} -> {}",
                source.display(),
                destination.display()
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FrameRate, VideoInfo};
    use tempfile::TempDir;

    struct FixedProbe;

    impl MediaProbe for FixedProbe {
        fn probe(&self, _path: &Path) -> Result<VideoInfo> {
            Ok(VideoInfo {
                duration_seconds: 2.0,
                width: 1280,
                height: 720,
                frame_rate: FrameRate::new(25.0)?,
            })
        }
    }

    struct FixedDetector(Vec<(u64, u64)>);

    impl SceneDetector for FixedDetector {
        fn detect(&self, _path: &Path, _video_info: &VideoInfo) -> Result<Vec<(u64, u64)>> {
            Ok(self.0.clone())
        }
    }

    fn importer(root: &Path, boundaries: Vec<(u64, u64)>) -> ProjectImporter {
        ProjectImporter::new(root)
            .with_probe(Arc::new(FixedProbe))
            .with_detector(Arc::new(FixedDetector(boundaries)))
    }

    #[test]
    fn test_import_creates_project_layout() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("holiday.mp4");
        fs::write(&source, b"video").unwrap();
        let root = temp_dir.path().join("projects");

        let project = importer(&root, vec![(0, 20), (20, 50)])
            .run(&source, None)
            .unwrap();

        assert_eq!(project.name(), "holiday");
        assert_eq!(fs::read(project.video_path()).unwrap(), b"video");
        assert!(project.thumbnails_dir().is_dir());
        assert_eq!(
            fs::read_to_string(project.scenes_path()).unwrap(),
            "0 20\n20 50\n"
        );
    }

    #[test]
    fn test_import_with_explicit_name() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("raw_take.mov");
        fs::write(&source, b"video").unwrap();

        let project = importer(temp_dir.path(), vec![(0, 50)])
            .run(&source, Some("trailer"))
            .unwrap();

        assert_eq!(
            project.video_path(),
            temp_dir.path().join("trailer").join("trailer.mov")
        );
    }

    #[test]
    fn test_import_rejects_empty_detection() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("blank.mp4");
        fs::write(&source, b"video").unwrap();

        let importer = importer(temp_dir.path(), Vec::new());
        assert!(importer.run(&source, None).is_err());
        assert!(!temp_dir.path().join("blank/outputs/scenes.txt").exists());
    }

    #[test]
    fn test_import_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let importer = importer(temp_dir.path(), vec![(0, 10)]);
        assert!(importer.run(&temp_dir.path().join("nope.mp4"), None).is_err());
    }
}
