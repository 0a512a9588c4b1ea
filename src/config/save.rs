use crate::config::load::SETTINGS_FILE;
use crate::config::types::{MAX_RECENT_PROJECTS, UserSettings};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(settings: &UserSettings) -> Result<()> {
    save_settings_to(settings, Path::new(SETTINGS_FILE))
}

pub fn save_settings_to(settings: &UserSettings, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

/// 更新最近使用的專案
/// 將新專案加入最前面，去重並限制數量
pub fn add_recent_project(settings: &mut UserSettings, name: &str) {
    settings.recent_projects.retain(|p| p != name);
    settings.recent_projects.insert(0, name.to_string());
    settings.recent_projects.truncate(MAX_RECENT_PROJECTS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[test]
    fn test_add_recent_project_dedup_and_limit() {
        let mut settings = UserSettings::default();
        for i in 0..12 {
            add_recent_project(&mut settings, &format!("p{i}"));
        }
        add_recent_project(&mut settings, "p5");

        assert_eq!(settings.recent_projects.len(), MAX_RECENT_PROJECTS);
        assert_eq!(settings.recent_projects[0], "p5");
        assert_eq!(
            settings.recent_projects.iter().filter(|p| *p == "p5").count(),
            1
        );
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");

        let mut settings = UserSettings::default();
        settings.thumbnail.keep_history = true;
        settings.edl.framerate_override = Some(23.976);
        save_settings_to(&settings, &path).unwrap();

        assert_eq!(Config::load_settings(&path).unwrap(), settings);
    }
}
