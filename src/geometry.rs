// ============================================================================
// Patch geometry: square rectangles, bounds and overlap checks
// ============================================================================
//
// Every rectangle here covers the half-open pixel range
// [x, x + size) × [y, y + size). Two rectangles overlap only when they share
// at least one pixel; rectangles that merely touch along an edge do not.

/// A pixel position in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of the current source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageBounds {
    pub width: u32,
    pub height: u32,
}

impl ImageBounds {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when `p` addresses a pixel inside the image.
    pub fn contains(&self, p: Point) -> bool {
        p.x < self.width && p.y < self.height
    }
}

/// Axis-aligned square patch anchored at its top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchRect {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

impl PatchRect {
    pub const fn new(x: u32, y: u32, size: u32) -> Self {
        Self { x, y, size }
    }

    pub fn at(anchor: Point, size: u32) -> Self {
        Self::new(anchor.x, anchor.y, size)
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Exclusive right edge. Saturates instead of wrapping for anchors near `u32::MAX`.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.size)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.size)
    }

    /// `true` when the pixel `p` lies inside the patch.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// `true` when both rectangles share at least one pixel.
    /// Edge-adjacent rectangles (e.g. `x = 0` and `x = size`) do not overlap.
    pub fn overlaps(&self, other: &PatchRect) -> bool {
        if self.size == 0 || other.size == 0 {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// `true` when every pixel of the patch lies inside `bounds`.
    pub fn fits_within(&self, bounds: ImageBounds) -> bool {
        let fits_x = self
            .x
            .checked_add(self.size)
            .is_some_and(|right| right <= bounds.width);
        let fits_y = self
            .y
            .checked_add(self.size)
            .is_some_and(|bottom| bottom <= bounds.height);
        self.size > 0 && fits_x && fits_y
    }
}

/// Decide whether `candidate` may join `existing`: it must be fully inside
/// `bounds` and must not share a pixel with any accepted rectangle.
pub fn is_valid_placement(candidate: &PatchRect, existing: &[PatchRect], bounds: ImageBounds) -> bool {
    candidate.fits_within(bounds) && !existing.iter().any(|r| r.overlaps(candidate))
}

/// Anchor for a patch whose top-left follows the pointer but whose far edge
/// never crosses the image border: `min(pointer, dim - size)` per axis,
/// floored at 0 when the patch is larger than the image.
pub fn clamp_anchor(pointer: Point, size: u32, bounds: ImageBounds) -> Point {
    Point::new(
        pointer.x.min(bounds.width.saturating_sub(size)),
        pointer.y.min(bounds.height.saturating_sub(size)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: ImageBounds = ImageBounds::new(1024, 768);

    #[test]
    fn test_bottom_right_aligned_is_valid() {
        let rect = PatchRect::new(1024 - 512, 768 - 512, 512);
        assert!(is_valid_placement(&rect, &[], BOUNDS));
    }

    #[test]
    fn test_one_pixel_past_right_edge_is_invalid() {
        let rect = PatchRect::new(1024 - 512 + 1, 0, 512);
        assert!(!is_valid_placement(&rect, &[], BOUNDS));

        let rect = PatchRect::new(0, 768 - 512 + 1, 512);
        assert!(!is_valid_placement(&rect, &[], BOUNDS));
    }

    #[test]
    fn test_candidates_outside_image_are_rejected() {
        for rect in [
            PatchRect::new(1024, 0, 16),
            PatchRect::new(0, 768, 16),
            PatchRect::new(5000, 5000, 16),
            PatchRect::new(u32::MAX - 4, 0, 16),
            PatchRect::new(0, 0, 2048),
        ] {
            assert!(!is_valid_placement(&rect, &[], BOUNDS), "{rect:?} should be rejected");
        }
    }

    #[test]
    fn test_zero_sized_patch_is_never_valid() {
        assert!(!is_valid_placement(&PatchRect::new(10, 10, 0), &[], BOUNDS));
    }

    #[test]
    fn test_overlap_is_rejected() {
        let existing = [PatchRect::new(100, 100, 64)];
        assert!(!is_valid_placement(&PatchRect::new(163, 163, 64), &existing, BOUNDS));
        assert!(!is_valid_placement(&PatchRect::new(100, 100, 64), &existing, BOUNDS));
        assert!(!is_valid_placement(&PatchRect::new(40, 120, 64), &existing, BOUNDS));
    }

    #[test]
    fn test_edge_touching_is_allowed() {
        let existing = [PatchRect::new(100, 100, 64)];
        // right, left, below, above, diagonal corner
        for rect in [
            PatchRect::new(164, 100, 64),
            PatchRect::new(36, 100, 64),
            PatchRect::new(100, 164, 64),
            PatchRect::new(100, 36, 64),
            PatchRect::new(164, 164, 64),
        ] {
            assert!(is_valid_placement(&rect, &existing, BOUNDS), "{rect:?} should be accepted");
        }
    }

    #[test]
    fn test_contains_is_half_open() {
        let rect = PatchRect::new(10, 20, 5);
        assert!(rect.contains(Point::new(10, 20)));
        assert!(rect.contains(Point::new(14, 24)));
        assert!(!rect.contains(Point::new(15, 20)));
        assert!(!rect.contains(Point::new(10, 25)));
        assert!(!rect.contains(Point::new(9, 20)));
    }

    #[test]
    fn test_clamp_anchor() {
        assert_eq!(clamp_anchor(Point::new(100, 100), 512, BOUNDS), Point::new(100, 100));
        assert_eq!(clamp_anchor(Point::new(900, 700), 512, BOUNDS), Point::new(512, 256));
        assert_eq!(clamp_anchor(Point::new(0, 0), 512, BOUNDS), Point::new(0, 0));
    }

    #[test]
    fn test_clamp_anchor_floors_at_zero_for_oversized_patch() {
        let small = ImageBounds::new(100, 50);
        assert_eq!(clamp_anchor(Point::new(60, 30), 128, small), Point::new(0, 0));
    }
}
