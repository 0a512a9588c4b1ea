//! 專案資料夾結構
//!
//! ```text
//! <projects_root>/<name>/
//! ├── <name>.<ext>          原始影片
//! ├── thumbnails/           縮圖（latest/ 或時間戳快照）
//! └── outputs/
//!     ├── scenes.txt
//!     ├── timeline.csv
//!     ├── timeline.json
//!     ├── timeline.edl
//!     └── extraction_log.json
//! ```

use crate::error::PipelineError;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    name: String,
    root: PathBuf,
    video_extension: String,
}

impl ProjectPaths {
    #[must_use]
    pub fn new(projects_root: &Path, name: &str, video_extension: &str) -> Self {
        Self {
            name: name.to_string(),
            root: projects_root.join(name),
            video_extension: video_extension.trim_start_matches('.').to_string(),
        }
    }

    /// 開啟既有專案，從資料夾中找出 `<name>.<ext>` 影片
    pub fn open(projects_root: &Path, name: &str) -> Result<Self> {
        let root = projects_root.join(name);
        if !root.is_dir() {
            return Err(PipelineError::MissingInput(root).into());
        }

        let entries = fs::read_dir(&root)
            .with_context(|| format!("無法讀取專案資料夾: {}", root.display()))?;

        let mut extensions: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.file_stem().is_some_and(|stem| stem == name))
            .filter_map(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(str::to_string)
            })
            .collect();
        extensions.sort();

        match extensions.first() {
            Some(extension) => Ok(Self::new(projects_root, name, extension)),
            None => bail!("專案資料夾中找不到影片 {name}.*: {}", root.display()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn video_path(&self) -> PathBuf {
        self.root
            .join(format!("{}.{}", self.name, self.video_extension))
    }

    #[must_use]
    pub fn outputs_dir(&self) -> PathBuf {
        self.root.join("outputs")
    }

    #[must_use]
    pub fn thumbnails_dir(&self) -> PathBuf {
        self.root.join("thumbnails")
    }

    #[must_use]
    pub fn scenes_path(&self) -> PathBuf {
        self.outputs_dir().join("scenes.txt")
    }

    #[must_use]
    pub fn timeline_csv_path(&self) -> PathBuf {
        self.outputs_dir().join("timeline.csv")
    }

    #[must_use]
    pub fn timeline_json_path(&self) -> PathBuf {
        self.outputs_dir().join("timeline.json")
    }

    #[must_use]
    pub fn edl_path(&self) -> PathBuf {
        self.outputs_dir().join("timeline.edl")
    }

    #[must_use]
    pub fn extraction_log_path(&self) -> PathBuf {
        self.outputs_dir().join("extraction_log.json")
    }

    /// EDL 預設片段名稱（與專案影片同名）
    #[must_use]
    pub fn clip_name(&self) -> String {
        format!("{}.{}", self.name, self.video_extension)
    }

    /// 確認影片與場景檔存在；任何輸出前呼叫
    pub fn require_inputs(&self, need_video: bool) -> Result<()> {
        if need_video {
            require_file(&self.video_path())?;
        }
        require_file(&self.scenes_path())
    }
}

pub fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(PipelineError::MissingInput(path.to_path_buf()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_project_paths_layout() {
        let paths = ProjectPaths::new(Path::new("/data/projects"), "trailer", ".mov");

        assert_eq!(paths.video_path(), PathBuf::from("/data/projects/trailer/trailer.mov"));
        assert_eq!(
            paths.scenes_path(),
            PathBuf::from("/data/projects/trailer/outputs/scenes.txt")
        );
        assert_eq!(
            paths.edl_path(),
            PathBuf::from("/data/projects/trailer/outputs/timeline.edl")
        );
        assert_eq!(
            paths.thumbnails_dir(),
            PathBuf::from("/data/projects/trailer/thumbnails")
        );
        assert_eq!(paths.clip_name(), "trailer.mov");
    }

    #[test]
    fn test_require_inputs_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ProjectPaths::new(temp_dir.path(), "demo", "mp4");

        let err = paths.require_inputs(false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingInput(p)) if p == &paths.scenes_path()
        ));

        fs::create_dir_all(paths.outputs_dir()).unwrap();
        fs::write(paths.scenes_path(), "0 10\n").unwrap();
        assert!(paths.require_inputs(false).is_ok());
        assert!(paths.require_inputs(true).is_err());
    }

    #[test]
    fn test_open_finds_project_video() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("demo");
        fs::create_dir_all(root.join("outputs")).unwrap();
        fs::write(root.join("demo.mkv"), b"video").unwrap();
        fs::write(root.join("notes.txt"), b"").unwrap();

        let paths = ProjectPaths::open(temp_dir.path(), "demo").unwrap();
        assert_eq!(paths.video_path(), root.join("demo.mkv"));
    }

    #[test]
    fn test_open_missing_project() {
        let temp_dir = TempDir::new().unwrap();
        assert!(ProjectPaths::open(temp_dir.path(), "nothing").is_err());

        fs::create_dir_all(temp_dir.path().join("empty")).unwrap();
        assert!(ProjectPaths::open(temp_dir.path(), "empty").is_err());
    }
}
