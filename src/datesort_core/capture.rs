use crate::datesort_core::decoder::{DATE_TAG_PRIORITY, DateTags, DecoderRegistry};
use crate::datesort_core::error::{DatesortError, Result};
use std::fmt;
use std::path::Path;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Date format used in EXIF data.
const EXIF_DATE_FORMAT: &[time::format_description::FormatItem] =
    time::macros::format_description!("[year]:[month]:[day] [hour]:[minute]:[second]");

/// Where a capture date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    /// The numbered EXIF tag.
    Metadata(u16),
    /// The file's last-modified time.
    ModifiedTime,
}

/// When a photo was taken, as wall-clock time without a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureDate {
    pub taken_at: PrimitiveDateTime,
    pub source: DateSource,
}

impl fmt::Display for CaptureDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            DateSource::Metadata(tag) => write!(f, "{} (tag {})", self.taken_at, tag),
            DateSource::ModifiedTime => write!(f, "{} (modified time)", self.taken_at),
        }
    }
}

/// Works out capture dates using the registered metadata decoders.
pub struct DateExtractor {
    registry: DecoderRegistry,
    offset: UtcOffset,
}

impl DateExtractor {
    /// Modification times are read in the local time zone, or UTC if it
    /// cannot be determined.
    pub fn new(registry: DecoderRegistry) -> Self {
        let offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
            log::warn!("Failed to get local time zone, using UTC for file times.");
            UtcOffset::UTC
        });
        Self { registry, offset }
    }

    /// Interpret modification times in `offset` instead of the local zone.
    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    /// Capture date of the photo at `path`.
    ///
    /// Tries the date tags in priority order and falls back to the
    /// modification time when none parses or the image cannot be opened.
    pub fn capture_date(&self, path: &Path) -> Result<CaptureDate> {
        let decoder = self
            .registry
            .decoder_for(path)
            .ok_or_else(|| DatesortError::UnsupportedFormat(path.to_path_buf()))?;

        let decode_error = match decoder.read_date_tags(path) {
            Ok(tags) if tags.is_empty() => {
                log::debug!("No date tags in {}, using modified time", path.display());
                None
            }
            Ok(tags) => {
                if let Some(date) = first_parseable(&tags, path) {
                    log::debug!("Photo [{}] taken at {}", path.display(), date);
                    return Ok(date);
                }
                None
            }
            Err(e) => {
                log::warn!(
                    "Failed to read metadata for {} with {} decoder: {}. Using modified time.",
                    path.display(),
                    decoder.name(),
                    e
                );
                Some(e)
            }
        };

        let taken_at = self.modified_time(path).map_err(|io_err| {
            let reason = match decode_error {
                Some(e) => format!("{}; modified time unavailable: {}", e, io_err),
                None => io_err.to_string(),
            };
            DatesortError::UnreadableImage {
                path: path.to_path_buf(),
                reason,
            }
        })?;

        let date = CaptureDate {
            taken_at,
            source: DateSource::ModifiedTime,
        };
        log::debug!("Photo [{}] taken at {}", path.display(), date);
        Ok(date)
    }

    fn modified_time(&self, path: &Path) -> std::io::Result<PrimitiveDateTime> {
        let modified = std::fs::metadata(path)?.modified()?;
        let local = OffsetDateTime::from(modified).to_offset(self.offset);
        Ok(PrimitiveDateTime::new(local.date(), local.time()))
    }
}

fn first_parseable(tags: &DateTags, path: &Path) -> Option<CaptureDate> {
    DATE_TAG_PRIORITY.iter().find_map(|&tag| {
        let raw = tags.get(tag)?;
        match parse_exif_date(raw) {
            Ok(taken_at) => Some(CaptureDate {
                taken_at,
                source: DateSource::Metadata(tag),
            }),
            Err(e) => {
                log::debug!("Ignoring tag {} of {}: {}", tag, path.display(), e);
                None
            }
        }
    })
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` string.
pub fn parse_exif_date(date_str: &str) -> Result<PrimitiveDateTime> {
    let trimmed = date_str.trim_end_matches('\0').trim();
    if trimmed.is_empty() {
        return Err(DatesortError::InvalidDateFormat("empty date".to_string()));
    }

    PrimitiveDateTime::parse(trimmed, EXIF_DATE_FORMAT)
        .map_err(|e| DatesortError::InvalidDateFormat(e.to_string()))
}
