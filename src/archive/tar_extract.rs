use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use super::ExtractError;

/// Stream a tar archive from `reader` into `target_dir`, dropping the first
/// `strip_components` path segments of every entry (§4.4).
pub fn extract_tar<R: Read>(
    reader: R,
    target_dir: &Path,
    strip_components: u32,
) -> Result<(), ExtractError> {
    let mut archive = tar::Archive::new(reader);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let raw_path = entry.path()?.into_owned();

        // A leading `./` in the tar entry name survives as a phantom
        // `CurDir` component (`./a/b`'s components are `[CurDir, a, b]`);
        // drop it before counting so `strip_components` lines up with the
        // `/`-separated segments the header actually names.
        let components: Vec<Component> = raw_path
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        let strip = strip_components as usize;
        if strip >= components.len() {
            continue;
        }
        let remaining: PathBuf = components[strip..].iter().collect();

        if remaining
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(ExtractError::PathTraversal {
                path: remaining.display().to_string(),
            });
        }

        let absolute = target_dir.join(&remaining);
        if !absolute.starts_with(target_dir) {
            return Err(ExtractError::PathTraversal {
                path: remaining.display().to_string(),
            });
        }

        let header = entry.header().clone();
        let mode = header.mode().unwrap_or(0o644);
        let entry_type = header.entry_type();

        if entry_type.is_dir() {
            create_dir_all(&absolute)?;
            set_mode(&absolute, mode)?;
            continue;
        }

        if entry_type.is_file() {
            if let Some(parent) = absolute.parent() {
                create_dir_all(parent)?;
            }
            let mut file = fs::File::create(&absolute).map_err(|source| {
                ExtractError::ArchiveFileCreateError {
                    path: absolute.display().to_string(),
                    source,
                }
            })?;
            io::copy(&mut entry, &mut file)?;
            set_mode(&absolute, mode)?;
            continue;
        }

        if entry_type.is_symlink() {
            let link_name = entry.link_name()?.unwrap_or_default().into_owned();
            if absolute.symlink_metadata().is_ok() {
                return Err(ExtractError::SymlinkExtractionError {
                    path: absolute.display().to_string(),
                    target: link_name.display().to_string(),
                    source: io::Error::new(io::ErrorKind::AlreadyExists, "target already exists"),
                });
            }
            if let Some(parent) = absolute.parent() {
                create_dir_all(parent)?;
            }
            create_symlink(&link_name, &absolute)?;
            continue;
        }

        return Err(ExtractError::UnsupportedEntryError {
            path: remaining.display().to_string(),
        });
    }

    Ok(())
}

fn create_dir_all(path: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(path).map_err(|source| ExtractError::ArchiveDirCreateError {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), ExtractError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|source| {
        ExtractError::ArchiveFileCreateError {
            path: path.display().to_string(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), ExtractError> {
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> Result<(), ExtractError> {
    std::os::unix::fs::symlink(target, link).map_err(|source| {
        ExtractError::SymlinkExtractionError {
            path: link.display().to_string(),
            target: target.display().to_string(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn create_symlink(target: &Path, link: &Path) -> Result<(), ExtractError> {
    Err(ExtractError::UnsupportedEntryError {
        path: link.display().to_string(),
    })
}
