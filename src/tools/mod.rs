mod ffprobe_info;
mod path_validator;
mod project;
mod scene_detector;
mod scene_model;
mod timecode;

pub use ffprobe_info::{
    FfprobeMediaProbe, MediaProbe, VideoInfo, get_video_info, parse_frame_rate,
};
pub use path_validator::{ensure_directory_exists, validate_file_exists};
pub use project::{ProjectPaths, require_file};
pub use scene_detector::{
    FfmpegSceneDetector, SceneDetector, SceneDetectorConfig, cuts_to_boundaries,
};
pub use scene_model::{Scene, SceneModel, format_scene_lines};
pub use timecode::{
    FrameRate, frame_to_seconds, frame_to_timecode, seconds_to_clock, timecode_to_frame,
};
