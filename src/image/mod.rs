//! Raster image helpers built on the `image` crate
//!
//! Used by classification to decide whether a copied file is really an
//! image, and by previews to describe bitmaps without decoding pixels.

use anyhow::{Context, Result, anyhow};
use image::{ImageFormat, ImageReader};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Check whether the path has a known raster image extension
pub fn is_image_path(path: &Path) -> bool {
    ImageFormat::from_path(path).is_ok()
}

/// Largest image accepted into history, in bytes (50MB)
pub const DEFAULT_MAX_IMAGE_SIZE_BYTES: u64 = 52_428_800;

/// Guess the MIME type of an in-memory bitmap from its magic bytes
pub fn guess_mime_type(data: &[u8]) -> Option<&'static str> {
    image::guess_format(data).ok().map(|format| format.to_mime_type())
}

/// Read an image file from disk
/// Returns (bytes, mime_type)
///
/// Fails without reading when the file is empty or larger than `max_bytes`,
/// and fails when the bytes are not a recognized image whatever the
/// extension says.
pub fn read_image_file(path: &Path, max_bytes: u64) -> Result<(Vec<u8>, String)> {
    let size = fs::metadata(path)
        .with_context(|| format!("Failed to stat image {:?}", path))?
        .len();
    if size == 0 {
        return Err(anyhow!("Image file {:?} is empty", path));
    }
    if size > max_bytes {
        return Err(anyhow!(
            "Image file {:?} is {} bytes, over the {} byte limit",
            path,
            size,
            max_bytes
        ));
    }

    let data = fs::read(path).with_context(|| format!("Failed to read image {:?}", path))?;
    let mime_type = guess_mime_type(&data)
        .ok_or_else(|| anyhow!("{:?} does not contain a recognized image format", path))?;
    Ok((data, mime_type.to_string()))
}

/// Pixel dimensions of an encoded bitmap, read from its header only
pub fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions() {
        assert!(is_image_path(Path::new("/tmp/shot.png")));
        assert!(is_image_path(Path::new("/tmp/Photo.JPG")));
        assert!(!is_image_path(Path::new("/tmp/notes.txt")));
        assert!(!is_image_path(Path::new("/tmp/no_extension")));
    }

    fn temp_file(name: &str, data: &[u8]) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("clipstack-image-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_read_image_file_checks_size_and_header() {
        let png = sample_png(4, 4);
        let path = temp_file("ok.png", &png);
        let (data, mime_type) = read_image_file(&path, DEFAULT_MAX_IMAGE_SIZE_BYTES).unwrap();
        assert_eq!(data, png);
        assert_eq!(mime_type, "image/png");

        // One byte under the file size is already too small
        assert!(read_image_file(&path, png.len() as u64 - 1).is_err());
        assert!(read_image_file(&path, png.len() as u64).is_ok());

        let fake = temp_file("fake.png", b"this is a text file with a png name");
        assert!(read_image_file(&fake, DEFAULT_MAX_IMAGE_SIZE_BYTES).is_err());

        let empty = temp_file("empty.png", b"");
        assert!(read_image_file(&empty, DEFAULT_MAX_IMAGE_SIZE_BYTES).is_err());
    }

    #[test]
    fn test_dimensions_and_guess() {
        let png = sample_png(3, 2);
        assert_eq!(dimensions(&png), Some((3, 2)));
        assert_eq!(guess_mime_type(&png), Some("image/png"));
        assert_eq!(dimensions(&[0, 1, 2]), None);
    }
}
