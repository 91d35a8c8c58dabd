pub mod capture;
pub mod cli;
pub mod decoder;
pub mod error;
pub mod exiftool_backend;
pub mod media;
pub mod organize;
pub mod placement;

#[cfg(test)]
mod testutil;

pub use capture::{CaptureDate, DateExtractor, DateSource, parse_exif_date};
pub use cli::Cli;
pub use decoder::{DateTags, DecoderRegistry, HeifDecoder, MetadataDecoder, RasterDecoder};
pub use error::{DatesortError, Result};
pub use exiftool_backend::{ExifToolDecoder, exiftool_available};
pub use organize::{OrganizeOptions, Organizer, ProcessingResult};
pub use placement::{TransferMode, date_folder, unique_destination};
