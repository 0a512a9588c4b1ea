use anyhow::{Context, Result};
use log::warn;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 安裝 Ctrl-C 處理器，回傳共用的中斷旗標
pub fn setup_shutdown_signal() -> Result<Arc<AtomicBool>> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    ctrlc::set_handler(move || {
        signal_clone.store(true, Ordering::SeqCst);
        eprintln!("\n收到中斷信號，停止派發新的擷取工作...");
    })
    .context("無法設定 Ctrl-C 處理器")?;

    Ok(shutdown_signal)
}

/// 選單模式下開始新工作前清除先前殘留的中斷旗標
///
/// 在選單提示時按下的 Ctrl-C 不應讓下一次擷取直接中斷。回傳旗標原本是否已設定。
pub fn clear_stale_signal(shutdown_signal: &AtomicBool) -> bool {
    let was_set = shutdown_signal.swap(false, Ordering::SeqCst);
    if was_set {
        warn!("忽略開始前收到的中斷信號");
    }
    was_set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_stale_signal() {
        let signal = AtomicBool::new(true);
        assert!(clear_stale_signal(&signal));
        assert!(!signal.load(Ordering::SeqCst));
        assert!(!clear_stale_signal(&signal));
    }
}
