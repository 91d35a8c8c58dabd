use crate::datesort_core::capture::CaptureDate;
use filetime::FileTime;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// How a photo gets to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    #[default]
    Move,
    Copy,
}

/// Folder for photos taken on `date`: `{base_dir}/YYYY/YYYY-MM-DD`.
pub fn date_folder(date: &CaptureDate, base_dir: Option<&Path>) -> PathBuf {
    let day = date.taken_at.date();
    let year = format!("{:04}", day.year());
    let relative = Path::new(&year).join(format!(
        "{}-{:02}-{:02}",
        year,
        u8::from(day.month()),
        day.day()
    ));

    match base_dir {
        Some(base) => base.join(relative),
        None => relative,
    }
}

/// First free path for `file_name` inside `folder`.
///
/// Appends `_1`, `_2`, ... to the stem until neither the filesystem nor
/// `reserved` holds the candidate.
pub fn unique_destination(folder: &Path, file_name: &OsStr, reserved: &HashSet<PathBuf>) -> PathBuf {
    let taken = |path: &Path| path.exists() || reserved.contains(path);

    let destination = folder.join(file_name);
    if !taken(&destination) {
        return destination;
    }

    let name = Path::new(file_name);
    let stem = name.file_stem().unwrap_or(file_name);
    let extension = name.extension();

    let mut counter: u64 = 1;
    loop {
        let mut candidate = OsString::from(stem);
        candidate.push(format!("_{}", counter));
        if let Some(ext) = extension {
            candidate.push(".");
            candidate.push(ext);
        }

        let destination = folder.join(candidate);
        if !taken(&destination) {
            return destination;
        }
        counter += 1;
    }
}

/// Move or copy `source` to `destination`.
///
/// Moves are renames. A symlinked photo, or one on another filesystem, is
/// copied and the source removed instead.
pub fn transfer(source: &Path, destination: &Path, mode: TransferMode) -> io::Result<()> {
    match mode {
        TransferMode::Copy => copy_preserving_times(source, destination),
        TransferMode::Move => {
            if fs::symlink_metadata(source)?.file_type().is_symlink() {
                return copy_then_remove(source, destination);
            }
            match fs::rename(source, destination) {
                Ok(()) => Ok(()),
                Err(e) if falls_back_to_copy(&e) => {
                    log::debug!(
                        "Rename {} -> {} crosses devices, copying instead",
                        source.display(),
                        destination.display()
                    );
                    copy_then_remove(source, destination)
                }
                Err(e) => Err(e),
            }
        }
    }
}

fn falls_back_to_copy(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices
}

/// Copy `source` to `destination`, then remove `source`.
///
/// If the source cannot be removed the copy is deleted again, so a failed
/// move never leaves the photo in two places.
fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    copy_preserving_times(source, destination)?;
    if let Err(e) = fs::remove_file(source) {
        if let Err(cleanup) = fs::remove_file(destination) {
            log::warn!(
                "Could not remove partial copy {}: {}",
                destination.display(),
                cleanup
            );
        }
        return Err(e);
    }
    Ok(())
}

/// Copy contents, permissions and access/modification times.
///
/// The destination is created exclusively, so an existing file is never
/// overwritten.
pub fn copy_preserving_times(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;

    let mut reader = File::open(source)?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;
    io::copy(&mut reader, &mut writer)?;
    drop(writer);

    fs::set_permissions(destination, metadata.permissions())?;
    filetime::set_file_times(
        destination,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )
}

/// Whether `source` already lives at `destination`.
pub fn is_same_file(source: &Path, destination: &Path) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(destination)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
