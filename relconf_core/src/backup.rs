use std::path::Path;
use std::path::PathBuf;

use tracing::info;

use crate::RelconfResult;

/// Name of the directory, next to the rewritten files, that keeps the most
/// recent prior version of each file.
pub const BACKUP_DIR_NAME: &str = "OLD_FILES";

/// Location of the backup for `file_name` inside `dir`.
pub fn backup_path(dir: &Path, file_name: &str) -> PathBuf {
	dir.join(BACKUP_DIR_NAME).join(file_name)
}

/// Move `dir/file_name` into `dir/OLD_FILES/file_name`, creating the backup
/// directory when needed and replacing any older backup of the same name.
///
/// On return the original path is vacant. If a later write fails, the backup
/// is the only copy left; nothing here tries to restore it.
pub fn move_to_backup(dir: &Path, file_name: &str) -> RelconfResult<PathBuf> {
	let backup_dir = dir.join(BACKUP_DIR_NAME);
	if !backup_dir.is_dir() {
		std::fs::create_dir(&backup_dir)?;
	}

	let backup = backup_dir.join(file_name);
	// `rename` refuses to replace an existing file on some platforms.
	if backup.exists() {
		std::fs::remove_file(&backup)?;
	}

	std::fs::rename(dir.join(file_name), &backup)?;
	info!(file = file_name, backup = %backup.display(), "moved file to backup");

	Ok(backup)
}
