use std::path::Path;

/// Raster formats read through the `image` crate (lowercase).
pub const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

/// High-efficiency formats that need the HEIF decoder (lowercase).
pub const HEIF_EXTENSIONS: &[&str] = &["heic"];

/// Every extension organized by default.
pub fn photo_extensions() -> impl Iterator<Item = &'static str> {
    RASTER_EXTENSIONS.iter().chain(HEIF_EXTENSIONS).copied()
}

/// Lowercased file name of `path`, if it has one.
pub fn lowercase_file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
}

/// Check whether the file name ends with `.{ext}`, ignoring case.
///
/// This matches on the name rather than `Path::extension` so that a file
/// called `.jpg` still counts as a JPEG.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    lowercase_file_name(path)
        .map(|name| {
            name.len() > ext.len()
                && name.ends_with(&ext.to_lowercase())
                && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
        })
        .unwrap_or(false)
}
