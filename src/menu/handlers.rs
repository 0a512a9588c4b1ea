use crate::component::{
    EdlGenerator, ProjectImporter, ThumbnailGenerator, TimelineExporter, run_all,
};
use crate::config::Config;
use crate::config::save::{add_recent_project, save_settings};
use crate::error::is_cancelled;
use crate::pause;
use crate::signal::clear_stale_signal;
use crate::tools::ProjectPaths;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::warn;
use rust_i18n::t;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_project_importer(term: &Term, config: &mut Config) -> Result<()> {
    let source: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("import.video_prompt"))
        .interact_text_on(term)?;
    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("import.name_prompt"))
        .allow_empty(true)
        .interact_text_on(term)?;

    let importer = ProjectImporter::new(&config.settings.projects_root);
    let name = Some(name.trim()).filter(|name| !name.is_empty());
    let result = importer
        .run(Path::new(source.trim()), name)
        .map(|project| project.name().to_string());

    finish(term, config, result)
}

pub fn run_thumbnail_generator(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let Some(project) = select_project(term, config)? else {
        return Ok(());
    };

    clear_stale_signal(shutdown_signal);
    let generator =
        ThumbnailGenerator::new(config.settings.thumbnail, Arc::clone(shutdown_signal));
    let result = generator
        .run(&project)
        .map(|_| project.name().to_string());

    finish(term, config, result)
}

pub fn run_timeline_exporter(term: &Term, config: &mut Config) -> Result<()> {
    let Some(project) = select_project(term, config)? else {
        return Ok(());
    };

    let exporter = TimelineExporter::new(config.settings.timeline);
    let result = exporter
        .run(&project)
        .map(|_| project.name().to_string());

    finish(term, config, result)
}

pub fn run_edl_generator(term: &Term, config: &mut Config) -> Result<()> {
    let Some(project) = select_project(term, config)? else {
        return Ok(());
    };

    let generator = EdlGenerator::new(config.settings.edl);
    let result = generator
        .run(&project)
        .map(|_| project.name().to_string());

    finish(term, config, result)
}

pub fn run_all_steps(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let Some(project) = select_project(term, config)? else {
        return Ok(());
    };

    clear_stale_signal(shutdown_signal);
    let result = run_all(&config.settings, &project, shutdown_signal)
        .map(|()| project.name().to_string());

    finish(term, config, result)
}

/// 顯示錯誤並記錄最近使用的專案；中斷則往上傳遞
fn finish(term: &Term, config: &mut Config, result: Result<String>) -> Result<()> {
    match result {
        Ok(name) => {
            add_recent_project(&mut config.settings, &name);
            if let Err(e) = save_settings(&config.settings) {
                warn!("無法保存最近使用的專案: {e:#}");
            }
        }
        Err(e) if is_cancelled(&e) => return Err(e),
        Err(e) => {
            eprintln!("{} {e:#}", style(t!("common.error")).red().bold());
        }
    }

    pause(term)
}

/// 選擇專案：最近使用的在前，其餘依名稱排序
fn select_project(term: &Term, config: &Config) -> Result<Option<ProjectPaths>> {
    let root = &config.settings.projects_root;
    let names = list_projects(root, &config.settings.recent_projects);

    if names.is_empty() {
        println!(
            "{}",
            style(t!("project.none_found", root = root.display())).yellow()
        );
        pause(term)?;
        return Ok(None);
    }

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("project.prompt"))
        .items(&names)
        .default(0)
        .interact_on_opt(term)?;

    // ESC pressed
    let Some(index) = selection else {
        return Ok(None);
    };

    match ProjectPaths::open(root, &names[index]) {
        Ok(project) => Ok(Some(project)),
        Err(e) => {
            eprintln!("{} {e:#}", style(t!("common.error")).red().bold());
            pause(term)?;
            Ok(None)
        }
    }
}

fn list_projects(root: &Path, recent: &[String]) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root)
        .map(|entries| {
            entries
                .filter_map(std::result::Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_dir())
                .filter_map(|path| {
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                })
                .collect()
        })
        .unwrap_or_default();
    names.sort();

    let mut ordered: Vec<String> = recent
        .iter()
        .filter(|name| names.contains(*name))
        .cloned()
        .collect();
    ordered.extend(names.into_iter().filter(|name| !recent.contains(name)));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_projects_recent_first() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["alpha", "beta", "gamma"] {
            fs::create_dir_all(temp_dir.path().join(name)).unwrap();
        }
        fs::write(temp_dir.path().join("stray.txt"), b"").unwrap();

        let recent = vec!["gamma".to_string(), "deleted".to_string()];
        assert_eq!(
            list_projects(temp_dir.path(), &recent),
            ["gamma", "alpha", "beta"]
        );
    }

    #[test]
    fn test_list_projects_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        assert!(list_projects(&temp_dir.path().join("none"), &[]).is_empty());
    }
}
