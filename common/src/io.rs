use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::{env, fs};

pub const QUALIFIER: &str = "org";
pub const ORGANIZATION: &str = "packet-inspector";
pub const APPLICATION: &str = "inspector";

/// Falls back to the working directory when the platform has no home
/// directory to derive project directories from.
pub fn get_storage_file_path(
    file_name: &str, file_kind: FileKind,
) -> Result<PathBuf, std::io::Error> {
    let dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION);
    match dirs {
        None => {
            let mut current_dir = env::current_dir()?;
            current_dir.push(file_name);
            Ok(current_dir)
        },
        Some(value) => Ok(file_kind.into_path(&value).join(file_name)),
    }
}

/// Absolute paths are kept, relative ones land in the storage directory of
/// `file_kind`.
pub fn resolve_storage_path(path: &Path, file_kind: FileKind) -> Result<PathBuf, std::io::Error> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    get_storage_file_path(&path.to_string_lossy(), file_kind)
}

pub fn create_parent_directories(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent_path) = path.parent() {
        return fs::create_dir_all(parent_path);
    }

    Ok(())
}

pub enum FileKind {
    Data,
    Log,
}

impl FileKind {
    pub fn into_path(self, project_dirs: &ProjectDirs) -> &Path {
        match self {
            FileKind::Data => project_dirs.data_dir(),
            FileKind::Log => project_dirs.data_local_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_path_ends_with_file_name() {
        let path = get_storage_file_path("capture.pcap", FileKind::Data).unwrap();
        assert!(path.ends_with("capture.pcap"));
    }

    #[test]
    fn test_absolute_path_kept() {
        let path = env::temp_dir().join("capture.pcap");
        assert_eq!(resolve_storage_path(&path, FileKind::Data).unwrap(), path);
    }

    #[test]
    fn test_relative_path_resolved_to_storage() {
        let path = resolve_storage_path(Path::new("dumps/capture.pcap"), FileKind::Data).unwrap();
        assert_eq!(
            path,
            get_storage_file_path("dumps/capture.pcap", FileKind::Data).unwrap()
        );
        assert!(path.ends_with("dumps/capture.pcap"));
    }

    #[test]
    fn test_create_parent_directories_without_parent() {
        assert!(create_parent_directories(Path::new("capture.pcap")).is_ok());
    }
}
