use std::path::{Path, PathBuf};

use crate::geometry::ImageBounds;

/// One source image as discovered at startup. Dimensions come from the file
/// header, so the full image is only decoded once it becomes current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ImageRef {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self { path: path.into(), width, height }
    }

    pub fn bounds(&self) -> ImageBounds {
        ImageBounds::new(self.width, self.height)
    }

    /// File name without extension; the prefix of every exported patch.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string())
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Ordered image list plus a cursor that clamps at both ends.
#[derive(Debug, Clone)]
pub struct ImageNavigator {
    images: Vec<ImageRef>,
    index: usize,
}

impl ImageNavigator {
    /// Returns `None` for an empty list; "no images" is a startup error, not
    /// a navigator state.
    pub fn new(images: Vec<ImageRef>) -> Option<Self> {
        if images.is_empty() {
            return None;
        }
        Some(Self { images, index: 0 })
    }

    pub fn current(&self) -> &ImageRef {
        &self.images[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    /// Move to the next image. Returns `false` on the last image.
    pub fn advance(&mut self) -> bool {
        let next = (self.index + 1).min(self.images.len() - 1);
        self.move_to(next)
    }

    /// Move to the previous image. Returns `false` on the first image.
    pub fn retreat(&mut self) -> bool {
        let prev = self.index.saturating_sub(1);
        self.move_to(prev)
    }

    fn move_to(&mut self, index: usize) -> bool {
        let changed = index != self.index;
        self.index = index;
        changed
    }

    /// One-based position, e.g. "3/12".
    pub fn position_label(&self) -> String {
        format!("{}/{}", self.index + 1, self.images.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav(n: usize) -> ImageNavigator {
        let images = (0..n)
            .map(|i| ImageRef::new(format!("/data/img_{i}.png"), 64, 64))
            .collect();
        ImageNavigator::new(images).unwrap()
    }

    #[test]
    fn test_empty_list_is_rejected() {
        assert!(ImageNavigator::new(Vec::new()).is_none());
    }

    #[test]
    fn test_starts_at_first_image() {
        let n = nav(3);
        assert_eq!(n.index(), 0);
        assert_eq!(n.current().stem(), "img_0");
        assert_eq!(n.position_label(), "1/3");
    }

    #[test]
    fn test_advance_clamps_at_last() {
        let mut n = nav(3);
        assert!(n.advance());
        assert!(n.advance());
        assert_eq!(n.index(), 2);
        assert!(!n.advance());
        assert_eq!(n.index(), 2);
    }

    #[test]
    fn test_retreat_clamps_at_first() {
        let mut n = nav(3);
        assert!(!n.retreat());
        assert_eq!(n.index(), 0);
        n.advance();
        assert!(n.retreat());
        assert_eq!(n.index(), 0);
    }

    #[test]
    fn test_single_image_never_moves() {
        let mut n = nav(1);
        assert!(!n.advance());
        assert!(!n.retreat());
        assert_eq!(n.position_label(), "1/1");
    }

    #[test]
    fn test_image_ref_names() {
        let r = ImageRef::new("/data/cells/slide.01.jpg", 10, 20);
        assert_eq!(r.stem(), "slide.01");
        assert_eq!(r.file_name(), "slide.01.jpg");
        assert_eq!(r.bounds(), ImageBounds::new(10, 20));
    }
}
