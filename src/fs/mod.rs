use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

/// Directory permissions for created season directories: rwxr-xr-x.
pub const DIR_MODE: u32 = 0o755;

pub trait Filesystem {
    /// Creates `path` and any missing parents. Succeeds if `path` already exists.
    fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(DIR_MODE)
            .create(path)
    }

    fn hard_link(&self, original: &Path, link: &Path) -> std::io::Result<()>;
}

pub struct PosixFilesystem;

impl Filesystem for PosixFilesystem {
    fn hard_link(&self, original: &Path, link: &Path) -> std::io::Result<()> {
        std::fs::hard_link(original, link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    #[test]
    fn create_dir_all_nested() {
        let tmp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let dir = tmp_dir.path().join("a").join("b");

        PosixFilesystem.create_dir_all(&dir).expect("failed to create dirs");
        assert!(dir.is_dir());

        // umask may clear bits, but never adds any.
        let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode & !DIR_MODE, 0);
    }

    #[test]
    fn create_dir_all_existing() {
        let tmp_dir = tempfile::tempdir().expect("failed to create temp dir");
        PosixFilesystem
            .create_dir_all(tmp_dir.path())
            .expect("existing directory should be accepted");
    }

    #[test]
    fn hard_link_shares_inode() {
        let tmp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let original = tmp_dir.path().join("original.mkv");
        let link = tmp_dir.path().join("link.mkv");
        std::fs::write(&original, "episode").expect("failed to create test file");

        PosixFilesystem
            .hard_link(&original, &link)
            .expect("failed to create hard link");

        assert_eq!(
            std::fs::metadata(&original).unwrap().ino(),
            std::fs::metadata(&link).unwrap().ino()
        );
        assert_eq!(std::fs::read_to_string(&link).unwrap(), "episode");
    }

    #[test]
    fn hard_link_existing_destination_fails() {
        let tmp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let original = tmp_dir.path().join("original.mkv");
        let link = tmp_dir.path().join("link.mkv");
        std::fs::write(&original, "episode").expect("failed to create test file");
        std::fs::write(&link, "other").expect("failed to create test file");

        let err = PosixFilesystem.hard_link(&original, &link).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
    }
}
