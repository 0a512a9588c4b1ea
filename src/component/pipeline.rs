use super::{EdlGenerator, ThumbnailGenerator, TimelineExporter};
use crate::config::UserSettings;
use crate::tools::ProjectPaths;
use anyhow::Result;
use console::style;
use log::info;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 依序執行縮圖、時間軸與 EDL
///
/// 縮圖個別失敗不影響後續步驟；中斷則整個流程停止。
pub fn run_all(
    settings: &UserSettings,
    project: &ProjectPaths,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<()> {
    info!("開始處理專案: {}", project.name());

    ThumbnailGenerator::new(settings.thumbnail, Arc::clone(shutdown_signal)).run(project)?;
    println!();
    TimelineExporter::new(settings.timeline).run(project)?;
    println!();
    EdlGenerator::new(settings.edl).run(project)?;

    println!(
        "\n{} {}",
        style("全部完成，輸出位於").green().bold(),
        project.outputs_dir().display()
    );
    Ok(())
}
