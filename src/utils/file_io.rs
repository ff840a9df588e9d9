use std::fs::create_dir_all;
use std::fs::File;
use std::fs::OpenOptions;
use std::fs::Permissions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tracing::debug;
use tracing::error;

/// Owner read/write only
pub const OWNER_RW: u32 = 0o600;
/// Owner read only
pub const OWNER_RO: u32 = 0o400;

pub fn create_parent_dir_if_not_exist(path: &Path) -> std::io::Result<()> {
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            create_dir_all(parent_dir).inspect_err(|e| {
                error!("Failed to create directory {:?}: {:?}", parent_dir, e);
            })?;
            debug!("created {:?}", parent_dir);
        }
    }
    Ok(())
}

pub fn open_file_for_append(path: &Path) -> std::io::Result<File> {
    create_parent_dir_if_not_exist(path)?;
    OpenOptions::new().append(true).create(true).open(path)
}

/// Truncates `path` and writes `buf`, creating the file with `mode`.
///
/// An existing file keeps its inode but has its permissions reset to `mode`.
pub fn write_with_mode(
    path: &Path,
    buf: &[u8],
    mode: u32,
) -> std::io::Result<()> {
    create_parent_dir_if_not_exist(path)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)?;
    file.set_permissions(Permissions::from_mode(mode))?;
    file.write_all(buf)?;
    file.sync_all()
}

/// Removes `dir` if it exists, then recreates it empty.
pub fn reset_dir(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    create_dir_all(dir)
}
