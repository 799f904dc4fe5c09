use crate::geometry::{PatchRect, Point};

/// Accepted patches for the image currently on screen, in the order they
/// were placed. Insertion order is also the export order, so the n-th patch
/// always lands in the file with index n.
///
/// The set does not validate on insert; callers run
/// [`is_valid_placement`](crate::geometry::is_valid_placement) first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    rects: Vec<PatchRect>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rect: PatchRect) {
        self.rects.push(rect);
    }

    /// Remove the patch covering `point`. Returns `None` (and changes nothing)
    /// when the point is on empty space.
    pub fn remove_at(&mut self, point: Point) -> Option<PatchRect> {
        let idx = self.rects.iter().position(|r| r.contains(point))?;
        Some(self.rects.remove(idx))
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    pub fn all(&self) -> &[PatchRect] {
        &self.rects
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatchRect> + '_ {
        self.rects.iter()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ImageBounds, is_valid_placement};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_add_then_remove_inside() {
        let mut set = SelectionSet::new();
        let rect = PatchRect::new(10, 10, 32);
        set.add(rect);
        assert_eq!(set.all(), &[rect]);

        assert_eq!(set.remove_at(Point::new(41, 41)), Some(rect));
        assert!(set.all().is_empty());
    }

    #[test]
    fn test_remove_on_empty_space_is_noop() {
        let mut set = SelectionSet::new();
        set.add(PatchRect::new(0, 0, 16));
        assert_eq!(set.remove_at(Point::new(16, 0)), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_removal_keeps_order_of_the_rest() {
        let mut set = SelectionSet::new();
        let a = PatchRect::new(0, 0, 8);
        let b = PatchRect::new(8, 0, 8);
        let c = PatchRect::new(16, 0, 8);
        set.add(a);
        set.add(b);
        set.add(c);

        set.remove_at(Point::new(9, 3));
        assert_eq!(set.all(), &[a, c]);
    }

    #[test]
    fn test_clear() {
        let mut set = SelectionSet::new();
        set.add(PatchRect::new(0, 0, 8));
        set.add(PatchRect::new(8, 8, 8));
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_random_placements_never_overlap() {
        let bounds = ImageBounds::new(640, 480);
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for size in [1, 7, 32, 100] {
            let mut set = SelectionSet::new();
            for _ in 0..2_000 {
                let candidate = PatchRect::new(
                    rng.random_range(0..bounds.width + 20),
                    rng.random_range(0..bounds.height + 20),
                    size,
                );
                if is_valid_placement(&candidate, set.all(), bounds) {
                    set.add(candidate);
                }
            }

            assert!(!set.is_empty());
            for (i, a) in set.iter().enumerate() {
                assert!(a.fits_within(bounds));
                for b in set.all().iter().skip(i + 1) {
                    assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
                }
            }
        }
    }
}
