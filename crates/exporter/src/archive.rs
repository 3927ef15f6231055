//! Archive packaging for exported frames.

use std::fs::File;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use radar_common::{RadarError, RadarResult};
use tracing::debug;

/// Bundle every file under `frames_dir` into a gzip-compressed tarball at
/// `archive_path`, preserving the relative `YYYY/MM/DD/...` member paths.
pub fn archive_frames(frames_dir: &Path, archive_path: &Path) -> RadarResult<()> {
    let file = File::create(archive_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in walkdir::WalkDir::new(frames_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| RadarError::persistence_failure(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(frames_dir)
            .map_err(|e| RadarError::persistence_failure(e.to_string()))?;

        builder.append_path_with_name(entry.path(), relative)?;
        debug!(member = %relative.display(), "archived frame");
    }

    builder.into_inner()?.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;

    #[test]
    fn test_archive_preserves_member_paths() {
        let staging = tempfile::tempdir().unwrap();
        let frames = staging.path().join("frames");

        for name in [
            "2026/08/01/2026_08_01_00_00.tif",
            "2026/08/01/2026_08_01_06_00.tif",
            "2026/08/02/2026_08_02_00_00.tif",
        ] {
            let path = frames.join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"II*\0frame").unwrap();
        }

        let archive_path = staging.path().join("export.tar.gz");
        archive_frames(&frames, &archive_path).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&archive_path).unwrap()));
        let members: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().display().to_string())
            .collect();

        assert_eq!(
            members,
            vec![
                "2026/08/01/2026_08_01_00_00.tif",
                "2026/08/01/2026_08_01_06_00.tif",
                "2026/08/02/2026_08_02_00_00.tif",
            ]
        );
    }

    #[test]
    fn test_empty_frame_dir_yields_empty_archive() {
        let staging = tempfile::tempdir().unwrap();
        let frames = staging.path().join("frames");
        std::fs::create_dir_all(&frames).unwrap();

        let archive_path = staging.path().join("export.tar.gz");
        archive_frames(&frames, &archive_path).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&archive_path).unwrap()));
        assert_eq!(archive.entries().unwrap().count(), 0);
    }
}
