use crate::datesort_core::error::{DatesortError, Result};
use crate::datesort_core::media::{HEIF_EXTENSIONS, RASTER_EXTENSIONS, has_extension};
use exif::{Exif, In, Value};
use image::ImageReader;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::rc::Rc;

/// EXIF DateTimeOriginal.
pub const TAG_DATE_TIME_ORIGINAL: u16 = 36867;
/// EXIF DateTimeDigitized (exiftool calls it CreateDate).
pub const TAG_DATE_TIME_DIGITIZED: u16 = 36868;
/// Tag 0x900C in the EXIF IFD.
pub const TAG_DATE_TIME_EXTRA: u16 = 36876;

/// Date-bearing tags, in the order they are tried.
pub const DATE_TAG_PRIORITY: [u16; 3] = [
    TAG_DATE_TIME_ORIGINAL,
    TAG_DATE_TIME_DIGITIZED,
    TAG_DATE_TIME_EXTRA,
];

/// ISO-BMFF major brands accepted as HEIF.
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"mif1", b"msf1",
];

/// Raw text of the date tags found in a file, keyed by tag number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTags {
    values: BTreeMap<u16, String>,
}

impl DateTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: u16, value: impl Into<String>) {
        self.values.insert(tag, value.into());
    }

    pub fn get(&self, tag: u16) -> Option<&str> {
        self.values.get(&tag).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pull the primary-image date tags out of parsed EXIF data.
    fn from_exif(exif: &Exif) -> Self {
        let mut tags = Self::new();
        for field in exif.fields() {
            let number = field.tag.number();
            if field.ifd_num != In::PRIMARY || !DATE_TAG_PRIORITY.contains(&number) {
                continue;
            }
            if let Value::Ascii(ref values) = field.value {
                if let Some(first) = values.first() {
                    tags.insert(number, String::from_utf8_lossy(first).into_owned());
                }
            }
        }
        tags
    }
}

/// Reads capture-date tags from one family of image formats.
pub trait MetadataDecoder {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Open `path` as an image and return whatever date tags it carries.
    ///
    /// An image without metadata yields empty tags; an error means the file
    /// could not be opened as this kind of image at all.
    fn read_date_tags(&self, path: &Path) -> Result<DateTags>;
}

/// Decoders keyed by lowercase file extension.
#[derive(Default, Clone)]
pub struct DecoderRegistry {
    decoders: BTreeMap<String, Rc<dyn MetadataDecoder>>,
}

impl DecoderRegistry {
    /// An empty registry; nothing will be organized until decoders are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in raster and HEIF decoders.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(RASTER_EXTENSIONS, Rc::new(RasterDecoder));
        registry.register(HEIF_EXTENSIONS, Rc::new(HeifDecoder));
        registry
    }

    /// Register `decoder` for `extensions`, replacing any previous decoder.
    pub fn register(&mut self, extensions: &[&str], decoder: Rc<dyn MetadataDecoder>) {
        for ext in extensions {
            let ext = ext.trim_start_matches('.').to_lowercase();
            log::debug!("Registering {} decoder for .{}", decoder.name(), ext);
            self.decoders.insert(ext, Rc::clone(&decoder));
        }
    }

    /// Find the decoder for `path`, preferring the longest matching extension.
    pub fn decoder_for(&self, path: &Path) -> Option<&dyn MetadataDecoder> {
        self.decoders
            .iter()
            .filter(|(ext, _)| has_extension(path, ext))
            .max_by_key(|(ext, _)| ext.len())
            .map(|(_, decoder)| decoder.as_ref())
    }

    /// Whether some decoder handles `path`.
    pub fn handles(&self, path: &Path) -> bool {
        self.decoder_for(path).is_some()
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }
}

/// JPEG, PNG, GIF and BMP through the `image` crate.
pub struct RasterDecoder;

impl MetadataDecoder for RasterDecoder {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn read_date_tags(&self, path: &Path) -> Result<DateTags> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format().ok_or_else(|| DatesortError::InvalidImage {
            format: "raster".to_string(),
            reason: "unrecognized image signature".to_string(),
        })?;

        // Reading the header is enough to prove the file opens as an image.
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| DatesortError::InvalidImage {
                format: format!("{:?}", format),
                reason: e.to_string(),
            })?;
        log::debug!(
            "Opened {} as {:?} ({}x{})",
            path.display(),
            format,
            width,
            height
        );

        read_exif_tags(path)
    }
}

/// HEIC/HEIF: checked by signature, metadata read straight from the container.
pub struct HeifDecoder;

impl MetadataDecoder for HeifDecoder {
    fn name(&self) -> &'static str {
        "heif"
    }

    fn read_date_tags(&self, path: &Path) -> Result<DateTags> {
        let mut header = [0u8; 12];
        File::open(path)?
            .read_exact(&mut header)
            .map_err(|e| DatesortError::InvalidImage {
                format: "HEIF".to_string(),
                reason: e.to_string(),
            })?;

        if !is_heif_header(&header) {
            return Err(DatesortError::InvalidImage {
                format: "HEIF".to_string(),
                reason: "missing ftyp box with a HEIF brand".to_string(),
            });
        }

        read_exif_tags(path)
    }
}

fn is_heif_header(header: &[u8; 12]) -> bool {
    &header[4..8] == b"ftyp" && HEIF_BRANDS.iter().any(|brand| header[8..12] == brand[..])
}

/// Read EXIF from any container kamadak-exif understands.
///
/// Missing or malformed EXIF is not an error here; it just means no tags.
fn read_exif_tags(path: &Path) -> Result<DateTags> {
    let mut reader = BufReader::new(File::open(path)?);
    match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Ok(DateTags::from_exif(&exif)),
        Err(e) => {
            log::debug!("No usable EXIF in {}: {}", path.display(), e);
            Ok(DateTags::new())
        }
    }
}
