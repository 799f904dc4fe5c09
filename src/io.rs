use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tga::TgaEncoder;
use image::{DynamicImage, ImageError, ImageOutputFormat};
use rfd::FileDialog;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, LoadError};
use crate::navigator::ImageRef;

/// Extensions picked up from the images directory (lowercase).
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

/// Check if a file extension is a supported source image.
pub fn is_source_extension(ext: &str) -> bool {
    SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

// ============================================================================
// OUTPUT FORMATS
// ============================================================================

/// Encodings a patch can be written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Tga,
    Tiff,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Bmp => "bmp",
            SaveFormat::Tga => "tga",
            SaveFormat::Tiff => "tiff",
        }
    }

    /// Map a file extension to a format we can encode, if any.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(SaveFormat::Png),
            "jpg" | "jpeg" => Some(SaveFormat::Jpeg),
            "bmp" => Some(SaveFormat::Bmp),
            "tga" => Some(SaveFormat::Tga),
            "tiff" | "tif" => Some(SaveFormat::Tiff),
            _ => None,
        }
    }
}

/// The `--format` choice: a fixed encoding, or whatever the source file uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Fixed(SaveFormat),
    MatchSource,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Fixed(SaveFormat::Png)
    }
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        if s.eq_ignore_ascii_case("source") {
            return Ok(OutputFormat::MatchSource);
        }
        SaveFormat::from_extension(s)
            .map(OutputFormat::Fixed)
            .ok_or_else(|| ConfigError::UnknownFormat(s.to_string()))
    }

    /// Concrete format for patches cut from `source`. Sources we cannot
    /// encode (e.g. WEBP) fall back to PNG.
    pub fn resolve(&self, source: &Path) -> SaveFormat {
        match self {
            OutputFormat::Fixed(f) => *f,
            OutputFormat::MatchSource => source
                .extension()
                .and_then(|e| e.to_str())
                .and_then(SaveFormat::from_extension)
                .unwrap_or_default(),
        }
    }
}

// ============================================================================
// DISCOVERY & LOADING
// ============================================================================

/// List the source images directly inside `dir`, sorted by path.
///
/// Only the header of each file is read here. Files whose header cannot be
/// parsed are skipped with a warning; an empty result is an error.
pub fn discover_images(dir: &Path) -> Result<Vec<ImageRef>, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::ImagesPathMissing(dir.to_path_buf()));
    }

    let pattern = Path::new(&glob::Pattern::escape(&dir.to_string_lossy())).join("*");
    let entries = glob::glob(&pattern.to_string_lossy()).map_err(|source| ConfigError::ImagesPattern {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(is_source_extension)
        })
        .collect();
    paths.sort();

    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        match image::image_dimensions(&path) {
            Ok((width, height)) => images.push(ImageRef::new(path, width, height)),
            Err(e) => {
                crate::log_warn!("Skipping unreadable image {}: {}", path.display(), e);
            }
        }
    }

    if images.is_empty() {
        return Err(ConfigError::NoImages(dir.to_path_buf()));
    }
    Ok(images)
}

/// Fully decode a source image.
pub fn load_image(path: &Path) -> Result<DynamicImage, LoadError> {
    image::open(path).map_err(|source| LoadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Show the native folder picker. `None` when the user cancels.
pub fn pick_images_folder() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Select Folder with Source Images")
        .pick_folder()
}

// ============================================================================
// ENCODING
// ============================================================================

/// Encode `image` into `writer` in the requested format.
/// JPEG drops the alpha channel; every other format is written as RGBA.
pub fn encode_and_write<W: Write + Seek>(
    image: &DynamicImage,
    writer: &mut W,
    format: SaveFormat,
    quality: u8,
) -> Result<(), ImageError> {
    match format {
        SaveFormat::Png => {
            let rgba = image.to_rgba8();
            let encoder = PngEncoder::new(writer);
            #[allow(deprecated)]
            encoder.encode(rgba.as_raw(), rgba.width(), rgba.height(), image::ColorType::Rgba8)?;
        }
        SaveFormat::Jpeg => {
            let rgb = image.to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(writer, quality);
            encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), image::ColorType::Rgb8)?;
        }
        SaveFormat::Bmp => {
            let rgba = image.to_rgba8();
            let mut encoder = BmpEncoder::new(writer);
            encoder.encode(rgba.as_raw(), rgba.width(), rgba.height(), image::ColorType::Rgba8)?;
        }
        SaveFormat::Tga => {
            let rgba = image.to_rgba8();
            let encoder = TgaEncoder::new(writer);
            encoder.encode(rgba.as_raw(), rgba.width(), rgba.height(), image::ColorType::Rgba8)?;
        }
        SaveFormat::Tiff => {
            DynamicImage::ImageRgba8(image.to_rgba8()).write_to(writer, ImageOutputFormat::Tiff)?;
        }
    }
    Ok(())
}
