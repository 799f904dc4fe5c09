// ============================================================================
// Patch export: crop accepted rectangles and write one file per patch
// ============================================================================
//
// File naming: `<source stem>_<index>.<ext>`, index in selection order,
// starting at 0. Saving the same selection again overwrites the same files.
//
// Each patch is encoded into a hidden temporary sibling and renamed into
// place, so a failed write never leaves a truncated patch behind. The first
// failure aborts the save; patches written before it are kept.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageError};

use crate::error::ExportError;
use crate::io::{OutputFormat, SaveFormat, encode_and_write};
use crate::navigator::ImageRef;
use crate::selection::SelectionSet;

#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    format: OutputFormat,
    quality: u8,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>, format: OutputFormat, quality: u8) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
            quality,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Destination of the `index`-th patch cut from `image`.
    pub fn patch_path(&self, image: &ImageRef, index: usize) -> PathBuf {
        let format = self.format.resolve(&image.path);
        self.output_dir
            .join(format!("{}_{}.{}", image.stem(), index, format.extension()))
    }

    /// Write every patch in `selection` and return how many files were written.
    pub fn save(
        &self,
        image: &ImageRef,
        pixels: &DynamicImage,
        selection: &SelectionSet,
    ) -> Result<usize, ExportError> {
        let format = self.format.resolve(&image.path);
        let (width, height) = (pixels.width(), pixels.height());

        for (index, rect) in selection.iter().enumerate() {
            let fits = rect.x.checked_add(rect.size).is_some_and(|r| r <= width)
                && rect.y.checked_add(rect.size).is_some_and(|b| b <= height);
            if !fits {
                return Err(ExportError::PatchOutOfBounds { index, width, height });
            }

            let patch = pixels.crop_imm(rect.x, rect.y, rect.size, rect.size);
            let path = self.patch_path(image, index);
            write_atomic(&patch, &path, format, self.quality)
                .map_err(|source| ExportError::Write { index, path, source })?;
        }

        Ok(selection.len())
    }
}

fn write_atomic(patch: &DynamicImage, path: &Path, format: SaveFormat, quality: u8) -> Result<(), ImageError> {
    let tmp = temp_sibling(path);
    let result = write_file(patch, &tmp, format, quality).and_then(|()| {
        fs::rename(&tmp, path)?;
        Ok(())
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_file(patch: &DynamicImage, path: &Path, format: SaveFormat, quality: u8) -> Result<(), ImageError> {
    let mut writer = BufWriter::new(File::create(path)?);
    encode_and_write(patch, &mut writer, format, quality)?;
    writer.flush()?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PatchRect;
    use image::{Rgb, RgbImage};

    /// 64x32 gradient so every crop has distinct content.
    fn source() -> (ImageRef, DynamicImage) {
        let img = RgbImage::from_fn(64, 32, |x, y| Rgb([(x * 4) as u8, (y * 8) as u8, 77]));
        (ImageRef::new("/in/tile.jpg", 64, 32), DynamicImage::ImageRgb8(img))
    }

    fn selection(rects: &[PatchRect]) -> SelectionSet {
        let mut set = SelectionSet::new();
        for r in rects {
            set.add(*r);
        }
        set
    }

    fn png_exporter(dir: &Path) -> Exporter {
        Exporter::new(dir, OutputFormat::default(), 90)
    }

    #[test]
    fn test_writes_one_file_per_patch_in_order() {
        let out = tempfile::tempdir().unwrap();
        let (image, pixels) = source();
        let set = selection(&[PatchRect::new(16, 0, 16), PatchRect::new(0, 16, 16)]);

        let written = png_exporter(out.path()).save(&image, &pixels, &set).unwrap();
        assert_eq!(written, 2);

        let first = image::open(out.path().join("tile_0.png")).unwrap().to_rgb8();
        assert_eq!(first.dimensions(), (16, 16));
        assert_eq!(first.get_pixel(0, 0), pixels.to_rgb8().get_pixel(16, 0));

        let second = image::open(out.path().join("tile_1.png")).unwrap().to_rgb8();
        assert_eq!(second.get_pixel(3, 5), pixels.to_rgb8().get_pixel(3, 21));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let out = tempfile::tempdir().unwrap();
        let (image, pixels) = source();
        let set = selection(&[PatchRect::new(0, 0, 8)]);
        png_exporter(out.path()).save(&image, &pixels, &set).unwrap();

        let names: Vec<String> = fs::read_dir(out.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["tile_0.png"]);
    }

    #[test]
    fn test_save_twice_is_idempotent() {
        let out = tempfile::tempdir().unwrap();
        let (image, pixels) = source();
        let set = selection(&[PatchRect::new(0, 0, 16), PatchRect::new(32, 16, 16)]);
        let exporter = png_exporter(out.path());

        let read_all = || -> Vec<Vec<u8>> {
            (0..2)
                .map(|i| image::open(exporter.patch_path(&image, i)).unwrap().to_rgb8().into_raw())
                .collect()
        };

        assert_eq!(exporter.save(&image, &pixels, &set).unwrap(), 2);
        let first = read_all();
        assert_eq!(exporter.save(&image, &pixels, &set).unwrap(), 2);
        assert_eq!(read_all(), first);
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_empty_selection_writes_nothing() {
        let out = tempfile::tempdir().unwrap();
        let (image, pixels) = source();
        let written = png_exporter(out.path()).save(&image, &pixels, &SelectionSet::new()).unwrap();
        assert_eq!(written, 0);
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_stops_at_first_failing_patch() {
        let out = tempfile::tempdir().unwrap();
        let (image, pixels) = source();
        let exporter = png_exporter(out.path());
        // A directory squatting on the second patch's name makes its rename fail.
        fs::create_dir(exporter.patch_path(&image, 1)).unwrap();

        let set = selection(&[
            PatchRect::new(0, 0, 8),
            PatchRect::new(8, 0, 8),
            PatchRect::new(16, 0, 8),
        ]);
        let err = exporter.save(&image, &pixels, &set).unwrap_err();
        assert_eq!(err.index(), Some(1));
        assert!(err.to_string().contains("tile_1.png"));

        assert!(exporter.patch_path(&image, 0).is_file());
        assert!(!exporter.patch_path(&image, 2).exists());
    }

    #[test]
    fn test_unwritable_output_dir_reports_first_index() {
        let out = tempfile::tempdir().unwrap();
        let (image, pixels) = source();
        let exporter = png_exporter(&out.path().join("missing"));
        let set = selection(&[PatchRect::new(0, 0, 8)]);

        let err = exporter.save(&image, &pixels, &set).unwrap_err();
        assert!(matches!(err, ExportError::Write { index: 0, .. }));
    }

    #[test]
    fn test_patch_outside_pixels_is_reported() {
        let out = tempfile::tempdir().unwrap();
        let (image, pixels) = source();
        let set = selection(&[PatchRect::new(0, 0, 8), PatchRect::new(60, 0, 8)]);

        let err = png_exporter(out.path()).save(&image, &pixels, &set).unwrap_err();
        assert!(matches!(err, ExportError::PatchOutOfBounds { index: 1, width: 64, height: 32 }));
    }

    #[test]
    fn test_match_source_format_naming() {
        let out = tempfile::tempdir().unwrap();
        let (image, pixels) = source();
        let exporter = Exporter::new(out.path(), OutputFormat::MatchSource, 90);
        let set = selection(&[PatchRect::new(0, 0, 8)]);

        exporter.save(&image, &pixels, &set).unwrap();
        assert!(out.path().join("tile_0.jpg").is_file());
    }
}
