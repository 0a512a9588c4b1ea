//! 時間軸匯出元件
//!
//! 以場景清單與影片幀率建立每個場景的起訖與中點時間，
//! 同時輸出 CSV 與 JSON（含 metadata）。

mod builder;
mod main;

pub use builder::{
    TimelineMetadata, TimelineRecord, build, export_structured, export_tabular,
};
pub use main::{TimelineExport, TimelineExporter};
