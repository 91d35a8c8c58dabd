use crate::datesort_core::decoder::{
    DateTags, MetadataDecoder, TAG_DATE_TIME_DIGITIZED, TAG_DATE_TIME_ORIGINAL,
};
use crate::datesort_core::error::{DatesortError, Result};
use exiftool::ExifTool;
use serde::Deserialize;
use std::cell::RefCell;
use std::path::Path;

/// Date fields requested from exiftool.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
struct RawDateInfo {
    #[serde(default)]
    date_time_original: String,
    #[serde(default)]
    create_date: String,
}

/// Metadata decoder backed by a long-running exiftool process.
///
/// Covers formats the native decoders cannot open. Each call goes through
/// the same exiftool instance, so the decoder is not shareable across threads.
pub struct ExifToolDecoder {
    exiftool: RefCell<ExifTool>,
}

impl ExifToolDecoder {
    pub fn new() -> Result<Self> {
        let exiftool = ExifTool::new().map_err(|e| DatesortError::Exiftool(e.to_string()))?;
        Ok(Self {
            exiftool: RefCell::new(exiftool),
        })
    }
}

impl MetadataDecoder for ExifToolDecoder {
    fn name(&self) -> &'static str {
        "exiftool"
    }

    fn read_date_tags(&self, path: &Path) -> Result<DateTags> {
        let raw: RawDateInfo = self
            .exiftool
            .borrow_mut()
            .read_metadata(path, &[])
            .map_err(|e| DatesortError::Exiftool(e.to_string()))?;

        Ok(date_tags_from_raw(raw))
    }
}

fn date_tags_from_raw(raw: RawDateInfo) -> DateTags {
    let mut tags = DateTags::new();
    if !raw.date_time_original.is_empty() {
        tags.insert(TAG_DATE_TIME_ORIGINAL, raw.date_time_original);
    }
    if !raw.create_date.is_empty() {
        tags.insert(TAG_DATE_TIME_DIGITIZED, raw.create_date);
    }
    tags
}

/// Check if exiftool is available on the system.
pub fn exiftool_available() -> bool {
    std::process::Command::new("exiftool")
        .arg("-ver")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
