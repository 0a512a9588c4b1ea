//! 影片匯入元件：建立專案資料夾並寫出場景邊界

mod main;

pub use main::ProjectImporter;
