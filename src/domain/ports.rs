use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// File system access for the pipeline components.
pub trait Storage: Send + Sync {
    /// Whether `path` exists. A failure to find out, such as a permission
    /// error on a parent directory, is an error and not absence.
    fn exists(&self, path: &Path) -> Result<bool>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    /// Regular files directly inside `dir`, symlinks followed. A missing
    /// directory lists as empty.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()>;
    fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}
