use crate::draw::canvas::Raster;
use crate::draw::model::{ColorId, ToolId};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SNAPSHOT_SUBDIR: &str = "snapshots";
const SNAPSHOT_PREFIX: &str = "aurora";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub timestamp: DateTime<Local>,
    pub emotion: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub scale_factor: f64,
    pub position: (i32, i32),
    pub colors_used: Vec<ColorId>,
    pub tool: ToolId,
    pub steps: u64,
    pub overview: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTargets {
    pub image: PathBuf,
    pub meta: PathBuf,
}

pub fn snapshot_folder(data_dir: &Path) -> PathBuf {
    data_dir.join(SNAPSHOT_SUBDIR)
}

pub fn ensure_output_folder(data_dir: &Path) -> Result<PathBuf> {
    let output = snapshot_folder(data_dir);
    fs::create_dir_all(&output)
        .with_context(|| format!("create snapshot folder {}", output.display()))?;
    Ok(output)
}

pub fn timestamped_stem(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

pub fn build_filename(stem: &str, suffix: &str) -> String {
    format!("{}_{}.png", stem, suffix)
}

/// `aurora_<stamp>_<emotion>.png` plus a `_meta.json` sidecar.
pub fn snapshot_targets(output_dir: &Path, now: DateTime<Local>, emotion: &str) -> SnapshotTargets {
    let tag = emotion.trim().replace(' ', "_");
    let stem = format!("{SNAPSHOT_PREFIX}_{}", timestamped_stem(now));
    let image = output_dir.join(build_filename(&stem, &tag));
    let meta = output_dir.join(format!("{stem}_{tag}_meta.json"));
    SnapshotTargets { image, meta }
}

pub fn write_png(raster: &Raster, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create image parent folder {}", parent.display()))?;
    }
    raster
        .to_image()
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png {}", path.display()))
}

pub fn read_png(path: &Path) -> Result<Raster> {
    let img = image::open(path)
        .with_context(|| format!("decode png {}", path.display()))?
        .to_rgb8();
    Ok(Raster::from_image(&img))
}

pub fn write_snapshot(raster: &Raster, meta: &SnapshotMeta, data_dir: &Path) -> Result<SnapshotTargets> {
    let output = ensure_output_folder(data_dir)?;
    let targets = snapshot_targets(&output, meta.timestamp, &meta.emotion);
    write_png(raster, &targets.image)?;
    let json = serde_json::to_string_pretty(meta).context("serialize snapshot metadata")?;
    fs::write(&targets.meta, json)
        .with_context(|| format!("write snapshot metadata {}", targets.meta.display()))?;
    tracing::info!(path = %targets.image.display(), "snapshot saved");
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::Rgb;
    use chrono::TimeZone;

    fn sample_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .expect("date time")
    }

    #[test]
    fn filename_builder_formats_timestamp_and_suffix() {
        assert_eq!(
            build_filename("20260102_030405", "calm"),
            "20260102_030405_calm.png"
        );
    }

    #[test]
    fn snapshot_targets_tag_emotion_and_sidecar() {
        let targets = snapshot_targets(Path::new("/tmp/snaps"), sample_time(), "deeply curious");
        assert!(targets
            .image
            .ends_with("aurora_20260102_030405_deeply_curious.png"));
        assert!(targets
            .meta
            .ends_with("aurora_20260102_030405_deeply_curious_meta.json"));
    }

    #[test]
    fn snapshot_writes_image_and_metadata() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut raster = Raster::new(6, 4);
        raster.set(2, 1, Rgb::new(255, 0, 0));
        let meta = SnapshotMeta {
            timestamp: sample_time(),
            emotion: "joyful".into(),
            canvas_width: 6,
            canvas_height: 4,
            scale_factor: 1.0,
            position: (3, 2),
            colors_used: vec![ColorId::Red],
            tool: ToolId::Pen,
            steps: 12,
            overview: String::new(),
        };

        let targets = write_snapshot(&raster, &meta, dir.path()).expect("write snapshot");
        let loaded = read_png(&targets.image).expect("read png");
        assert_eq!(loaded, raster);

        let json = fs::read_to_string(&targets.meta).expect("read meta");
        let parsed: SnapshotMeta = serde_json::from_str(&json).expect("parse meta");
        assert_eq!(parsed, meta);
    }
}
