//! Unpacking of downloaded release archives
//!
//! OTT releases ship as gzip'd tarballs. `downloads/ott3.6.tgz` is unpacked
//! into `downloads/ott3.6/`, so its `ott3.6/taxonomy.tsv` member ends up at
//! `downloads/ott3.6/ott3.6/taxonomy.tsv`.
//!
//! Extraction goes through a `.part` directory which is renamed into place
//! once every member is written.

use flate2::read::GzDecoder;
use ott_common::{OttError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

const ARCHIVE_SUFFIXES: &[&str] = &[".tar.gz", ".tgz"];

/// Whether `path` names a gzip'd tarball
pub fn is_archive(path: &Path) -> bool {
    archive_stem(path).is_some()
}

fn archive_stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    ARCHIVE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .filter(|stem| !stem.is_empty())
}

/// Directory an archive is unpacked into, if `path` is an archive
pub fn extraction_directory(path: &Path) -> Option<PathBuf> {
    let stem = archive_stem(path)?;
    Some(match path.parent() {
        Some(parent) => parent.join(stem),
        None => PathBuf::from(stem),
    })
}

pub(crate) fn with_part_suffix(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Unpack a `.tgz` into `destination`, returning the number of members written
///
/// Members are written with [`tar::Entry::unpack_in`], which refuses paths
/// escaping `destination`.
#[instrument(skip_all, fields(archive = %archive.display()))]
pub fn unpack(archive: &Path, destination: &Path) -> Result<usize> {
    let staging = with_part_suffix(destination);
    if staging.exists() {
        std::fs::remove_dir_all(&staging)?;
    }
    std::fs::create_dir_all(&staging)?;

    let decoder = GzDecoder::new(BufReader::new(File::open(archive)?));
    let mut tar = tar::Archive::new(decoder);
    let mut unpacked = 0;

    for entry in tar
        .entries()
        .map_err(|e| OttError::parse(format!("Failed to read {}: {}", archive.display(), e)))?
    {
        let mut entry = entry.map_err(|e| {
            OttError::parse(format!("Corrupt entry in {}: {}", archive.display(), e))
        })?;
        let member = entry.path()?.to_path_buf();

        if entry.unpack_in(&staging)? {
            debug!(member = %member.display(), "Unpacked");
            unpacked += 1;
        }
    }

    std::fs::rename(&staging, destination)?;
    info!(destination = %destination.display(), members = unpacked, "Archive unpacked");
    Ok(unpacked)
}

/// Unpack `archive` next to itself unless that directory already exists
///
/// Returns the extraction directory, or `None` when `archive` is not a tarball.
pub async fn unpack_if_missing(archive: &Path) -> Result<Option<PathBuf>> {
    let Some(destination) = extraction_directory(archive) else {
        return Ok(None);
    };

    if destination.is_dir() {
        debug!(destination = %destination.display(), "Already unpacked, skipping");
        return Ok(Some(destination));
    }

    let archive = archive.to_path_buf();
    let target = destination.clone();
    tokio::task::spawn_blocking(move || unpack(&archive, &target))
        .await
        .map_err(std::io::Error::other)??;

    Ok(Some(destination))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    /// Write a `.tgz` holding `files` (relative path, contents)
    pub(crate) fn write_tgz(path: &Path, files: &[(&str, &str)]) {
        let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::fast());
        let mut builder = tar::Builder::new(encoder);

        for (name, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, contents.as_bytes()).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_is_archive() {
        assert!(is_archive(Path::new("downloads/ott3.6.tgz")));
        assert!(is_archive(Path::new("downloads/ott3.6.tar.gz")));
        assert!(!is_archive(Path::new("downloads/taxonomy.tsv")));
        assert!(!is_archive(Path::new(".tgz")));
    }

    #[test]
    fn test_extraction_directory() {
        assert_eq!(
            extraction_directory(Path::new("downloads/ott3.6.tgz")),
            Some(PathBuf::from("downloads/ott3.6"))
        );
        assert_eq!(
            extraction_directory(Path::new("ott2.10.tar.gz")),
            Some(PathBuf::from("ott2.10"))
        );
        assert_eq!(extraction_directory(Path::new("downloads/readme.txt")), None);
    }

    #[test]
    fn test_unpack() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("ott3.6.tgz");
        write_tgz(
            &archive,
            &[
                ("ott3.6/taxonomy.tsv", "uid\t|\tparent_uid\t|\n"),
                ("ott3.6/synonyms.tsv", "name\t|\tuid\t|\n"),
            ],
        );

        let destination = dir.path().join("ott3.6");
        let count = unpack(&archive, &destination).unwrap();

        assert_eq!(count, 2);
        assert!(destination.join("ott3.6/taxonomy.tsv").is_file());
        assert!(destination.join("ott3.6/synonyms.tsv").is_file());
        assert!(!with_part_suffix(&destination).exists());
    }

    #[test]
    fn test_unpack_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.tgz");
        std::fs::write(&archive, b"not a tarball").unwrap();

        assert!(unpack(&archive, &dir.path().join("broken")).is_err());
    }

    #[tokio::test]
    async fn test_unpack_if_missing_skips_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("ott3.7.tgz");
        std::fs::write(&archive, b"never read").unwrap();
        std::fs::create_dir(dir.path().join("ott3.7")).unwrap();

        let unpacked = unpack_if_missing(&archive).await.unwrap();
        assert_eq!(unpacked, Some(dir.path().join("ott3.7")));
    }
}
