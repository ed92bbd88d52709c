//! Release archive extraction
//!
//! IP releases ship as `<name>-<version>.tar.gz`, usually wrapping a single
//! top-level directory.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid path in archive: {0}")]
    UnsafePath(PathBuf),
}

/// Extract a tar.gz archive into `dest_dir`. Returns the number of files written.
///
/// Entries that would land outside `dest_dir`, directly or through a symlink
/// unpacked earlier, fail the whole extraction.
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<usize, ExtractError> {
    fs::create_dir_all(dest_dir)?;
    let root = dest_dir.canonicalize()?;

    let reader = BufReader::new(File::open(archive_path)?);
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(reader));
    let mut files = 0;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let relative_path = entry.path()?.into_owned();

        // Zip Slip
        if relative_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(ExtractError::UnsafePath(relative_path));
        }

        let target = dest_dir.join(&relative_path);
        let parent = target.parent().unwrap_or(dest_dir);
        if !resolves_inside(&root, parent)? {
            return Err(ExtractError::UnsafePath(relative_path));
        }

        let is_dir = entry.header().entry_type().is_dir();
        if entry.unpack_in(dest_dir)? && !is_dir {
            files += 1;
        }
    }

    Ok(files)
}

/// Whether `path`, or its closest existing ancestor, resolves under `root`.
fn resolves_inside(root: &Path, path: &Path) -> io::Result<bool> {
    let existing = path.ancestors().find(|p| p.exists()).unwrap_or(path);
    Ok(existing.canonicalize()?.starts_with(root))
}

/// If `dir` holds a single top-level directory, move its contents up.
pub fn strip_components(dir: &Path) -> io::Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(Result::ok).collect();
    entries.retain(|e| !e.file_name().to_string_lossy().starts_with('.'));

    if entries.len() == 1 && entries[0].file_type()?.is_dir() {
        let top_level = entries[0].path();
        for entry in fs::read_dir(&top_level)?.filter_map(Result::ok) {
            fs::rename(entry.path(), dir.join(entry.file_name()))?;
        }
        fs::remove_dir(top_level)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::tempdir;

    fn write_archive(path: &Path, files: &[(&str, &[u8])]) {
        let gz = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(gz);
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_extract_and_strip() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("EF_AES-v1.0.0.tar.gz");
        write_archive(
            &archive,
            &[
                ("EF_AES/hdl/rtl/aes.v", b"module aes;"),
                ("EF_AES/EF_AES.yaml", b"info: {}"),
            ],
        );

        let dest = dir.path().join("out");
        assert_eq!(extract_tar_gz(&archive, &dest).unwrap(), 2);
        strip_components(&dest).unwrap();

        assert_eq!(
            fs::read_to_string(dest.join("hdl/rtl/aes.v")).unwrap(),
            "module aes;"
        );
        assert!(dest.join("EF_AES.yaml").exists());
        assert!(!dest.join("EF_AES").exists());
    }

    #[test]
    fn test_strip_keeps_flat_layout() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.v"), "a").unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();

        strip_components(dir.path()).unwrap();

        assert!(dir.path().join("a.v").exists());
        assert!(dir.path().join("docs").is_dir());
    }

    #[test]
    fn test_strip_ignores_hidden_files() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("file.txt"), "content").unwrap();
        fs::write(dir.path().join(".DS_Store"), "junk").unwrap();

        strip_components(dir.path()).unwrap();

        assert!(dir.path().join("file.txt").exists());
        assert!(!nested.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_writes_through_symlink() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let archive = dir.path().join("evil.tar.gz");

        let gz = GzEncoder::new(File::create(&archive).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(gz);

        let mut link = tar::Header::new_gnu();
        link.set_entry_type(tar::EntryType::Symlink);
        link.set_size(0);
        link.set_mode(0o777);
        link.set_link_name(outside.path()).unwrap();
        builder
            .append_data(&mut link, "ip/link", std::io::empty())
            .unwrap();

        let mut file = tar::Header::new_gnu();
        file.set_size(1);
        file.set_mode(0o644);
        builder
            .append_data(&mut file, "ip/link/evil.txt", &b"x"[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let dest = dir.path().join("out");
        let err = extract_tar_gz(&archive, &dest).unwrap_err();
        assert!(matches!(err, ExtractError::UnsafePath(_)));
        assert!(!outside.path().join("evil.txt").exists());
    }

    #[test]
    fn test_rejects_parent_components() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("evil.tar.gz");

        // tar::Builder refuses `..`, so write the raw header name.
        let gz = GzEncoder::new(File::create(&archive).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(gz);
        let mut header = tar::Header::new_gnu();
        let name = b"../escape.txt";
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        header.set_size(1);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, &b"x"[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let dest = dir.path().join("out");
        let err = extract_tar_gz(&archive, &dest).unwrap_err();
        assert!(matches!(err, ExtractError::UnsafePath(_)));
        assert!(!dir.path().join("escape.txt").exists());
    }
}
