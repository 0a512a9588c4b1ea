//! 功能元件模組
//!
//! 每個子模組只依賴共用的場景清單，彼此不讀取對方的輸出

pub mod edl_generator;
mod pipeline;
pub mod project_importer;
pub mod thumbnail_generator;
pub mod timeline_exporter;

pub use edl_generator::EdlGenerator;
pub use pipeline::run_all;
pub use project_importer::ProjectImporter;
pub use thumbnail_generator::ThumbnailGenerator;
pub use timeline_exporter::TimelineExporter;
