//! Local file handling around uploads: folder listing, backups and
//! writing optimized images back in place.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::info;
use thiserror::Error;
use walkdir::WalkDir;

use crate::api::FileInfo;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("[E010] {0} is not a directory\n\nSuggestions:\n  • Pass the folder that contains the images")]
    NotADirectory(PathBuf),

    #[error("[E011] {0} has no file name")]
    MissingFileName(PathBuf),

    #[error("[E012] File system error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("[E013] Couldn't replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("[E014] Backup of {0} would overwrite the file itself\n\nSuggestions:\n  • Pick a backup folder outside the folder being optimized")]
    BackupIsSource(PathBuf),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

impl FileError {
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotADirectory(_) => "E010",
            Self::MissingFileName(_) => "E011",
            Self::Io { .. } | Self::Walk(_) => "E012",
            Self::Persist { .. } => "E013",
            Self::BackupIsSource(_) => "E014",
        }
    }

    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Regular files directly inside `folder`, sorted by name and keyed
/// `file0`, `file1`, ...
///
/// # Errors
///
/// Fails if `folder` is not a directory or can't be read.
pub fn folder_files(folder: &Path) -> Result<Vec<FileInfo>, FileError> {
    if !folder.is_dir() {
        return Err(FileError::NotADirectory(folder.to_path_buf()));
    }

    let mut files = vec![];
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(FileInfo::new(
                format!("file{}", files.len()),
                entry.into_path(),
            ));
        }
    }
    Ok(files)
}

/// Copies every file into `backup_folder`, keeping its base name.
///
/// Originals stay where they are, so calling this twice yields the same
/// backup contents.
///
/// # Errors
///
/// Fails on the first file that can't be copied, and before copying
/// anything if a backup would land on its own source.
pub fn backup_files(files: &[FileInfo], backup_folder: &Path) -> Result<Vec<PathBuf>, FileError> {
    fs::create_dir_all(backup_folder).map_err(FileError::io(backup_folder))?;

    let mut targets = Vec::with_capacity(files.len());
    for file in files {
        let name = file
            .path
            .file_name()
            .ok_or_else(|| FileError::MissingFileName(file.path.clone()))?;
        let backup_path = backup_folder.join(name);
        // Copying a file onto itself truncates it.
        let source = fs::canonicalize(&file.path).map_err(FileError::io(&file.path))?;
        if fs::canonicalize(&backup_path).is_ok_and(|target| target == source) {
            return Err(FileError::BackupIsSource(file.path.clone()));
        }
        targets.push((file, backup_path));
    }

    let mut backups = Vec::with_capacity(targets.len());
    for (file, backup_path) in targets {
        fs::copy(&file.path, &backup_path).map_err(FileError::io(&file.path))?;
        info!(
            "Backed up {} to {}",
            file.path.display(),
            backup_path.display()
        );
        backups.push(backup_path);
    }
    Ok(backups)
}

/// Replaces `path` with `contents`.
///
/// The bytes go to a temporary file next to `path` which is then renamed
/// over it; the original survives a failed write.
///
/// # Errors
///
/// Fails if the temporary file can't be written or renamed.
pub fn replace_file(path: &Path, contents: &[u8]) -> Result<(), FileError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(FileError::io(dir))?;
    temp.write_all(contents).map_err(FileError::io(path))?;
    temp.as_file().sync_all().map_err(FileError::io(path))?;

    if let Ok(metadata) = fs::metadata(path) {
        // Keep the original's permissions, tempfile creates 0600.
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(FileError::io(path))?;
    }

    temp.persist(path).map_err(|err| FileError::Persist {
        path: path.to_path_buf(),
        source: err.error,
    })?;
    Ok(())
}
