//! 縮圖取樣排程
//!
//! 取樣位置只由場景邊界與張數決定，檔名以位置編號命名，
//! 相同輸入每次都會得到相同的檔案集合。

use crate::error::{PipelineError, PipelineResult};
use crate::tools::{Scene, SceneModel};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 單張縮圖擷取工作
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThumbnailJob {
    pub scene_index: usize,
    pub position_index: usize,
    pub frame_number: u64,
    pub output_path: PathBuf,
}

/// 計算場景內的取樣幀
///
/// `step = max(1, (end - start) / (count - 1))`，從 `start` 開始每隔 `step`
/// 取一幀（不含 `end`），達到 `count` 張即停止；不足時以 `end` 補齊。
/// 已經取滿時不會強制加入 `end`。
pub fn positions_for(scene: &Scene, count: usize) -> PipelineResult<Vec<u64>> {
    if count == 0 {
        return Err(PipelineError::InvalidThumbnailCount);
    }

    let start = scene.start_frame;
    let end = scene.end_frame;

    if count == 1 {
        return Ok(vec![start]);
    }

    let step = (end.saturating_sub(start) / (count as u64 - 1)).max(1);

    let mut positions: Vec<u64> = (0..)
        .map(|i| start + i * step)
        .take_while(|&frame| frame < end)
        .take(count)
        .collect();

    // 場景太短時以 end 補滿
    positions.resize(count, end.max(start));

    Ok(positions)
}

/// 縮圖檔名：`scene_000_00.jpg`
#[must_use]
pub fn thumbnail_file_name(scene_index: usize, position_index: usize) -> String {
    format!("scene_{scene_index:03}_{position_index:02}.jpg")
}

/// 依 (場景, 位置) 順序建立所有擷取工作
pub fn create_jobs(
    model: &SceneModel,
    count: usize,
    output_dir: &Path,
) -> PipelineResult<Vec<ThumbnailJob>> {
    let mut jobs = Vec::with_capacity(model.scene_count() * count);

    for scene in model {
        for (position_index, frame_number) in positions_for(scene, count)?.into_iter().enumerate()
        {
            jobs.push(ThumbnailJob {
                scene_index: scene.index,
                position_index,
                frame_number,
                output_path: output_dir.join(thumbnail_file_name(scene.index, position_index)),
            });
        }
    }

    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(start: u64, end: u64) -> Scene {
        Scene {
            index: 0,
            start_frame: start,
            end_frame: end,
        }
    }

    #[test]
    fn test_positions_even_split() {
        assert_eq!(positions_for(&scene(0, 10), 3).unwrap(), vec![0, 5, 10]);
    }

    #[test]
    fn test_positions_cap_reached_before_end() {
        // step = 3，取滿四張時尚未到達 end
        assert_eq!(positions_for(&scene(0, 10), 4).unwrap(), vec![0, 3, 6, 9]);
        assert_eq!(positions_for(&scene(10, 25), 3).unwrap(), vec![10, 17, 24]);
    }

    #[test]
    fn test_positions_shortfall_appends_end() {
        assert_eq!(positions_for(&scene(100, 200), 2).unwrap(), vec![100, 200]);
        assert_eq!(positions_for(&scene(10, 24), 3).unwrap(), vec![10, 17, 24]);
    }

    #[test]
    fn test_positions_short_scene_pads_with_end() {
        assert_eq!(positions_for(&scene(0, 2), 5).unwrap(), vec![0, 1, 2, 2, 2]);
    }

    #[test]
    fn test_positions_single() {
        assert_eq!(positions_for(&scene(40, 80), 1).unwrap(), vec![40]);
        assert_eq!(positions_for(&scene(40, 40), 1).unwrap(), vec![40]);
    }

    #[test]
    fn test_positions_zero_count() {
        assert!(matches!(
            positions_for(&scene(0, 10), 0),
            Err(PipelineError::InvalidThumbnailCount)
        ));
    }

    #[test]
    fn test_positions_properties() {
        let scenes = [(0, 1), (0, 7), (3, 50), (120, 121), (1000, 4321), (5, 6000)];
        for (start, end) in scenes {
            for count in 1..=12 {
                let positions = positions_for(&scene(start, end), count).unwrap();
                assert_eq!(positions.len(), count);
                assert_eq!(positions[0], start);
                assert!(positions.iter().all(|&f| (start..=end).contains(&f)));
                assert!(positions.windows(2).all(|w| w[0] <= w[1]));
            }
        }
    }

    #[test]
    fn test_create_jobs_order_and_names() {
        let model = SceneModel::load("0 10\n10 25\n").unwrap();
        let jobs = create_jobs(&model, 3, Path::new("/thumbs")).unwrap();

        assert_eq!(jobs.len(), 6);
        let keys: Vec<(usize, usize, u64)> = jobs
            .iter()
            .map(|j| (j.scene_index, j.position_index, j.frame_number))
            .collect();
        assert_eq!(
            keys,
            vec![(0, 0, 0), (0, 1, 5), (0, 2, 10), (1, 0, 10), (1, 1, 17), (1, 2, 24)]
        );
        assert_eq!(jobs[4].output_path, PathBuf::from("/thumbs/scene_001_01.jpg"));
    }

    #[test]
    fn test_create_jobs_is_deterministic() {
        let model = SceneModel::load("0 48\n48 97\n120 300\n").unwrap();
        let a = create_jobs(&model, 4, Path::new("/t")).unwrap();
        let b = create_jobs(&model, 4, Path::new("/t")).unwrap();
        assert_eq!(a, b);
    }
}
