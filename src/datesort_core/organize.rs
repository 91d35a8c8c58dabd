use crate::datesort_core::capture::DateExtractor;
use crate::datesort_core::error::{DatesortError, Result};
use crate::datesort_core::placement::{
    TransferMode, date_folder, is_same_file, transfer, unique_destination,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where and how photos are organized.
#[derive(Debug, Clone, Default)]
pub struct OrganizeOptions {
    /// Root of the `YYYY/YYYY-MM-DD` tree; relative to the working directory when unset.
    pub base_dir: Option<PathBuf>,
    pub mode: TransferMode,
    /// Resolve destinations without touching the filesystem.
    pub dry_run: bool,
}

/// Outcome of organizing a directory.
#[derive(Debug, Default)]
pub struct ProcessingResult {
    pub processed: Vec<PathBuf>,
    /// One `"{path}: {message}"` line per failed file.
    pub errors: Vec<String>,
}

impl ProcessingResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl std::fmt::Display for ProcessingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Successfully processed {} files", self.processed.len())?;
        if self.has_errors() {
            write!(f, "\n\nErrors occurred with {} files:", self.errors.len())?;
            for error in &self.errors {
                write!(f, "\n- {}", error)?;
            }
        }
        Ok(())
    }
}

/// Files photos into date folders.
pub struct Organizer {
    extractor: DateExtractor,
    options: OrganizeOptions,
    /// Destinations handed out during a dry run.
    planned: HashSet<PathBuf>,
}

impl Organizer {
    pub fn new(extractor: DateExtractor, options: OrganizeOptions) -> Self {
        Self {
            extractor,
            options,
            planned: HashSet::new(),
        }
    }

    pub fn options(&self) -> &OrganizeOptions {
        &self.options
    }

    /// Move or copy one photo into its date folder and return where it went.
    pub fn organize_file(&mut self, path: &Path) -> Result<PathBuf> {
        let date = self.extractor.capture_date(path)?;
        let folder = date_folder(&date, self.options.base_dir.as_deref());
        let file_name = path.file_name().ok_or_else(|| {
            DatesortError::filesystem(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;

        let natural = folder.join(file_name);
        if is_same_file(path, &natural) {
            log::debug!("{} is already in place", path.display());
            return Ok(natural);
        }

        if self.options.dry_run {
            let destination = unique_destination(&folder, file_name, &self.planned);
            self.planned.insert(destination.clone());
            log::info!("[DRY RUN] {} -> {}", path.display(), destination.display());
            return Ok(destination);
        }

        fs::create_dir_all(&folder).map_err(|e| DatesortError::filesystem(path, e))?;

        let destination = unique_destination(&folder, file_name, &self.planned);
        transfer(path, &destination, self.options.mode)
            .map_err(|e| DatesortError::filesystem(path, e))?;

        log::debug!(
            "{} {} -> {}",
            match self.options.mode {
                TransferMode::Move => "Moved",
                TransferMode::Copy => "Copied",
            },
            path.display(),
            destination.display()
        );
        Ok(destination)
    }

    /// Organize every photo under `source_dir`.
    ///
    /// A failing file is recorded in the result and the scan carries on.
    pub fn organize_dir(&mut self, source_dir: &Path) -> Result<ProcessingResult> {
        self.organize_dir_with(source_dir, |_, _| {})
    }

    /// Like [`Organizer::organize_dir`], calling `on_placed` with each
    /// source path and its destination.
    pub fn organize_dir_with<F>(&mut self, source_dir: &Path, mut on_placed: F) -> Result<ProcessingResult>
    where
        F: FnMut(&Path, &Path),
    {
        if !source_dir.is_dir() {
            return Err(DatesortError::NotADirectory(source_dir.to_path_buf()));
        }

        log::info!("Scanning source directory {}", source_dir.display());
        let photos = self.collect_photos(source_dir);
        log::info!("Found {} photos to organize", photos.len());

        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let bar = ProgressBar::new(photos.len() as u64).with_style(bar_style);
        bar.set_message("Organizing photos");

        let mut result = ProcessingResult::default();
        for path in photos {
            match self.organize_file(&path) {
                Ok(destination) => {
                    on_placed(&path, &destination);
                    result.processed.push(path);
                }
                Err(e) => {
                    log::warn!("{}", e);
                    result.errors.push(format!("{}: {}", path.display(), e));
                }
            }
            bar.inc(1);
        }
        bar.finish_with_message("Done");

        log::info!(
            "Organized {} photos ({} errors)",
            result.processed.len(),
            result.errors.len()
        );
        Ok(result)
    }

    /// Every file under `source_dir` with a registered decoder, listed up
    /// front so files moved inside the tree are not visited twice.
    fn collect_photos(&self, source_dir: &Path) -> Vec<PathBuf> {
        let registry = self.extractor.registry();
        WalkDir::new(source_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            // Follows file symlinks; symlinked directories are not descended.
            .filter(|e| e.path().is_file())
            .map(|e| e.into_path())
            .filter(|path| {
                let handled = registry.handles(path);
                if !handled {
                    log::debug!("Skipping non-photo file: {}", path.display());
                }
                handled
            })
            .collect()
    }
}
