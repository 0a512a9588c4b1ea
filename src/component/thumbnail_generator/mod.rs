//! 場景縮圖元件
//!
//! 三階段流程：
//! A. 讀取場景清單與影片資訊
//! B. 準備輸出資料夾（覆寫或時間戳快照）並排程取樣位置
//! C. 以固定大小的執行緒池平行擷取

mod extraction_engine;
mod frame_extractor;
mod history;
mod main;
mod scheduler;

pub use extraction_engine::{
    CompletedJob, DEFAULT_CONCURRENCY, ExtractionEngine, ExtractionReport, FailedJob,
    ProgressCounter,
};
pub use frame_extractor::{
    ExtractorConfig, FfmpegFrameExtractor, FrameExtractor, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH,
};
pub use history::{LATEST_DIR_NAME, clear_directory, prepare_output_dir, snapshot_dir_name};
pub use main::ThumbnailGenerator;
pub use scheduler::{ThumbnailJob, create_jobs, positions_for, thumbnail_file_name};
