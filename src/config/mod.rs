pub mod load;
pub mod save;
pub mod types;

pub use types::{
    Config, EdlSettings, Language, MAX_RECENT_PROJECTS, ThumbnailSettings, TimeFormat,
    TimelineLayout, TimelineSettings, UserSettings,
};
