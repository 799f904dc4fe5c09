// ============================================================================
// patchcrop CLI: startup configuration
// ============================================================================
//
// Usage examples:
//   patchcrop --images-path slides/ --output-path patches/ --patch-size 256
//   patchcrop --images-path slides/ --format source
//   patchcrop                                  (folder picker for the images)
//
// Everything here is read once at startup; the resulting `Config` is never
// mutated afterwards.

use std::path::PathBuf;

use clap::Parser;

use crate::error::ConfigError;
use crate::io::{OutputFormat, pick_images_folder};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Select fixed-size square patches from images and export them as files.
#[derive(Parser, Debug)]
#[command(
    name = "patchcrop",
    about = "Interactive patch cropper for building image datasets",
    long_about = "Step through a directory of images, place non-overlapping square\n\
                  patches with the mouse and export them as separate files.\n\n\
                  Controls:\n  \
                  left click    add a patch at the preview outline\n  \
                  middle click  remove the patch under the pointer\n  \
                  s             save the current image's patches\n  \
                  d / a         next / previous image (unsaved patches are dropped)\n  \
                  q             quit"
)]
pub struct CliArgs {
    /// Directory containing the source images (jpg, png, bmp, tiff, webp).
    /// A folder picker is shown when omitted.
    #[arg(long, value_name = "DIR")]
    pub images_path: Option<PathBuf>,

    /// Directory where patches are written. Created if it does not exist.
    #[arg(long, default_value = "./patches", value_name = "DIR")]
    pub output_path: PathBuf,

    /// Side length of every patch, in pixels.
    #[arg(long, default_value_t = 512, value_name = "PX")]
    pub patch_size: u32,

    /// Patch file format: png, jpeg, bmp, tga, tiff, or source (same as the input image).
    #[arg(short, long, default_value = "png", value_name = "FORMAT")]
    pub format: String,

    /// JPEG quality (1-100).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// Echo log lines to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated, immutable run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub images_path: PathBuf,
    pub output_path: PathBuf,
    pub patch_size: u32,
    pub format: OutputFormat,
    pub quality: u8,
    pub verbose: bool,
}

impl Config {
    /// Validate the arguments and prepare the output directory. Shows the
    /// folder picker when no images path was given.
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let images_path = match args.images_path.clone() {
            Some(p) => p,
            None => pick_images_folder().ok_or(ConfigError::PickerCancelled)?,
        };
        Self::from_parts(images_path, args)
    }

    fn from_parts(images_path: PathBuf, args: CliArgs) -> Result<Self, ConfigError> {
        if args.patch_size == 0 {
            return Err(ConfigError::ZeroPatchSize);
        }
        if !(1..=100).contains(&args.quality) {
            return Err(ConfigError::InvalidQuality(args.quality));
        }
        if !images_path.is_dir() {
            return Err(ConfigError::ImagesPathMissing(images_path));
        }
        let format = OutputFormat::parse(&args.format)?;

        prepare_output_dir(&args.output_path)?;

        Ok(Self {
            images_path,
            output_path: args.output_path,
            patch_size: args.patch_size,
            format,
            quality: args.quality,
            verbose: args.verbose,
        })
    }
}

/// Create the output directory if needed and warn when it already holds
/// files that a save may overwrite.
fn prepare_output_dir(path: &std::path::Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(path).map_err(|source| ConfigError::OutputDir {
        path: path.to_path_buf(),
        source,
    })?;

    let non_empty = std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if non_empty {
        eprintln!(
            "warning: output directory '{}' is not empty. Files may be overwritten.",
            path.display()
        );
        crate::log_warn!("Output directory {} is not empty", path.display());
    }
    Ok(())
}
