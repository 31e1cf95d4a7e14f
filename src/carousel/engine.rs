//! Infinite-loop carousel state.
//!
//! The slide strip is padded with K clones on each side
//! (`[last K] ++ items ++ [first K]`) so the animated transition can run
//! across the wrap point. Once the transition has finished, `settle()`
//! snaps the index back into the real window without animation; the
//! clones are visually identical to the slides they stand in for, so the
//! jump is invisible.

use serde::Serialize;
use std::ops::RangeInclusive;
use tracing::debug;

use crate::types::HubError;

/// Clone padding used by the home page carousel (the widest layout shows
/// two cards at once).
pub const DEFAULT_VISIBLE_COUNT: usize = 2;

/// Largest supported number of simultaneously visible slides.
pub const MAX_VISIBLE_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// How the view should move to the current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// Regular slide animation.
    Animated,
    /// Wrap-around correction; must be applied with transitions disabled.
    Instant,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Read-only view of the carousel for renderers and the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarouselSnapshot {
    pub current_index: usize,
    pub active_slide: usize,
    pub visible_count: usize,
    pub slide_count: usize,
    pub is_auto_playing: bool,
    pub transition: Transition,
    /// Whether a wrap-around snap is still outstanding.
    pub pending_correction: bool,
    /// Horizontal translation of the strip, as a percentage of the viewport.
    pub offset_pct: f64,
    pub indicators: Vec<bool>,
}

// ---------------------------------------------------------------------------
// Carousel
// ---------------------------------------------------------------------------

/// Carousel over a fixed, non-empty list of slides.
#[derive(Debug, Clone)]
pub struct Carousel<T> {
    items: Vec<T>,
    extended: Vec<T>,
    visible_count: usize,
    current_index: usize,
    is_auto_playing: bool,
    transition: Transition,
}

impl<T: Clone> Carousel<T> {
    /// Build a carousel showing `visible_count` slides at a time.
    pub fn new(items: Vec<T>, visible_count: usize) -> Result<Self, HubError> {
        if items.is_empty() {
            return Err(HubError::EmptyCarousel);
        }
        validate_visible_count(visible_count)?;

        let extended = build_extended(&items, visible_count);
        Ok(Self {
            items,
            extended,
            visible_count,
            current_index: visible_count,
            is_auto_playing: true,
            transition: Transition::Animated,
        })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The padded strip actually rendered: `[last K] ++ items ++ [first K]`.
    pub fn extended_items(&self) -> &[T] {
        &self.extended
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn is_auto_playing(&self) -> bool {
        self.is_auto_playing
    }

    pub fn transition(&self) -> Transition {
        self.transition
    }

    /// Indices of `extended_items` holding the real (non-cloned) slides.
    pub fn real_range(&self) -> RangeInclusive<usize> {
        self.visible_count..=self.visible_count + self.len() - 1
    }

    /// Manual step forward. Stops auto-play for good.
    pub fn next(&mut self) {
        self.stop_auto_play();
        self.step_forward();
    }

    /// Manual step backward. Stops auto-play for good.
    pub fn prev(&mut self) {
        self.stop_auto_play();
        self.settle();
        self.current_index -= 1;
        self.transition = Transition::Animated;
    }

    /// Jump straight to a real slide. Stops auto-play for good.
    pub fn go_to(&mut self, slide: usize) -> Result<(), HubError> {
        if slide >= self.len() {
            return Err(HubError::SlideOutOfRange {
                slide,
                len: self.len(),
            });
        }
        self.stop_auto_play();
        self.current_index = slide + self.visible_count;
        self.transition = Transition::Animated;
        Ok(())
    }

    /// Timer-driven step. Identical to `next()` except that it leaves
    /// auto-play running.
    pub fn advance(&mut self) {
        self.step_forward();
    }

    /// Target index of the wrap-around snap, if the current index sits in
    /// a cloned region.
    pub fn needs_correction(&self) -> Option<usize> {
        let k = self.visible_count;
        let last_real = k + self.len() - 1;
        if self.current_index > last_real {
            Some(k)
        } else if self.current_index < k {
            Some(last_real)
        } else {
            None
        }
    }

    /// Apply any outstanding wrap-around snap. Returns true if the index
    /// moved.
    pub fn settle(&mut self) -> bool {
        match self.needs_correction() {
            Some(target) => {
                debug!(from = self.current_index, to = target, "Carousel wrap-around snap");
                self.current_index = target;
                self.transition = Transition::Instant;
                true
            }
            None => false,
        }
    }

    /// The real slide currently in front: `(currentIndex - K) mod N`.
    pub fn active_slide(&self) -> usize {
        let offset = self.current_index as isize - self.visible_count as isize;
        offset.rem_euclid(self.len() as isize) as usize
    }

    /// Whether indicator dot `i` should be highlighted.
    pub fn is_indicator_active(&self, i: usize) -> bool {
        i < self.len() && (self.active_slide() == i || self.current_index == i + self.visible_count)
    }

    pub fn indicators(&self) -> Vec<bool> {
        (0..self.len()).map(|i| self.is_indicator_active(i)).collect()
    }

    /// Rebuild the padding for a new breakpoint, keeping the same slide in
    /// front. Auto-play state is left as it was.
    pub fn set_visible_count(&mut self, visible_count: usize) -> Result<(), HubError> {
        validate_visible_count(visible_count)?;
        if visible_count == self.visible_count {
            return Ok(());
        }
        let slide = self.active_slide();
        self.extended = build_extended(&self.items, visible_count);
        self.visible_count = visible_count;
        self.current_index = slide + visible_count;
        self.transition = Transition::Instant;
        Ok(())
    }

    /// Strip translation as a percentage of the viewport width.
    pub fn offset_pct(&self) -> f64 {
        self.current_index as f64 * (100.0 / self.visible_count as f64)
    }

    pub fn snapshot(&self) -> CarouselSnapshot {
        CarouselSnapshot {
            current_index: self.current_index,
            active_slide: self.active_slide(),
            visible_count: self.visible_count,
            slide_count: self.len(),
            is_auto_playing: self.is_auto_playing,
            transition: self.transition,
            pending_correction: self.needs_correction().is_some(),
            offset_pct: self.offset_pct(),
            indicators: self.indicators(),
        }
    }

    fn stop_auto_play(&mut self) {
        if self.is_auto_playing {
            debug!("Manual navigation, auto-play disabled");
        }
        self.is_auto_playing = false;
    }

    fn step_forward(&mut self) {
        // A snap still pending from the previous step is applied first so
        // the index never runs off the padded strip.
        self.settle();
        self.current_index += 1;
        self.transition = Transition::Animated;
    }
}

fn validate_visible_count(visible_count: usize) -> Result<(), HubError> {
    if visible_count == 0 || visible_count > MAX_VISIBLE_COUNT {
        return Err(HubError::InvalidVisibleCount(visible_count));
    }
    Ok(())
}

/// `[last k] ++ items ++ [first k]`, wrapping cyclically when there are
/// fewer than `k` items.
fn build_extended<T: Clone>(items: &[T], k: usize) -> Vec<T> {
    let n = items.len();
    (0..n + 2 * k)
        .map(|j| items[(j + n * k - k) % n].clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn carousel(n: usize, k: usize) -> Carousel<usize> {
        Carousel::new((0..n).collect(), k).unwrap()
    }

    #[test]
    fn test_extended_layout_for_all_visible_counts() {
        for n in 2..8 {
            for k in 1..=3 {
                let c = carousel(n, k);
                let ext = c.extended_items();
                assert_eq!(ext.len(), n + 2 * k);
                assert_eq!(&ext[k..k + n], c.items());
            }
        }
    }

    #[test]
    fn test_extended_clones_tail_and_head() {
        let c = Carousel::new(vec!['a', 'b', 'c', 'd'], 2).unwrap();
        assert_eq!(c.extended_items(), &['c', 'd', 'a', 'b', 'c', 'd', 'a', 'b']);
        assert_eq!(c.current_index(), 2);
        assert!(c.is_auto_playing());
    }

    #[test]
    fn test_single_item_pads_with_copies() {
        let c = Carousel::new(vec!["only"], 2).unwrap();
        assert_eq!(c.extended_items(), &["only"; 5]);
        assert_eq!(c.real_range(), 2..=2);
    }

    #[test]
    fn test_single_item_wrap_is_noop() {
        let mut c = Carousel::new(vec!["only"], 1).unwrap();
        c.next();
        assert_eq!(c.current_index(), 2);
        assert!(c.settle());
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.active_slide(), 0);
    }

    #[test]
    fn test_empty_rejected() {
        let result = Carousel::<u8>::new(Vec::new(), 2);
        assert!(matches!(result, Err(HubError::EmptyCarousel)));
    }

    #[test]
    fn test_visible_count_bounds() {
        assert!(matches!(
            Carousel::new(vec![1, 2], 0),
            Err(HubError::InvalidVisibleCount(0))
        ));
        assert!(matches!(
            Carousel::new(vec![1, 2], 4),
            Err(HubError::InvalidVisibleCount(4))
        ));
    }

    #[test]
    fn test_next_n_times_returns_to_start() {
        for k in 1..=3 {
            let n = 4;
            let mut c = carousel(n, k);
            for _ in 0..n {
                c.next();
            }
            assert_eq!(c.current_index(), k + n);
            assert!(c.settle());
            assert_eq!(c.current_index(), k);
            assert_eq!(c.transition(), Transition::Instant);
        }
    }

    #[test]
    fn test_prev_from_start_wraps_to_last() {
        let mut c = carousel(4, 2);
        c.prev();
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.needs_correction(), Some(5));
        c.settle();
        assert_eq!(c.current_index(), 5);
        assert_eq!(c.active_slide(), 3);
    }

    #[test]
    fn test_manual_navigation_latches_autoplay_off() {
        let mut c = carousel(5, 2);
        c.next();
        assert!(!c.is_auto_playing());
        c.advance();
        c.settle();
        assert!(!c.is_auto_playing());

        let mut c = carousel(5, 2);
        c.prev();
        assert!(!c.is_auto_playing());

        let mut c = carousel(5, 2);
        c.go_to(1).unwrap();
        assert!(!c.is_auto_playing());
    }

    #[test]
    fn test_advance_keeps_autoplay() {
        let mut c = carousel(3, 2);
        c.advance();
        c.advance();
        assert!(c.is_auto_playing());
        assert_eq!(c.current_index(), 4);
    }

    #[test]
    fn test_go_to_sets_index_immediately() {
        let mut c = carousel(10, 2);
        c.go_to(3).unwrap();
        assert_eq!(c.current_index(), 5);
        assert_eq!(c.needs_correction(), None);
    }

    #[test]
    fn test_go_to_out_of_range() {
        let mut c = carousel(4, 2);
        let err = c.go_to(4).unwrap_err();
        assert!(matches!(err, HubError::SlideOutOfRange { slide: 4, len: 4 }));
        // A rejected jump is not an interaction.
        assert!(c.is_auto_playing());
    }

    #[test]
    fn test_step_while_snap_pending_stays_in_bounds() {
        let mut c = carousel(3, 1);
        c.prev(); // index 0, clone of the last slide
        c.prev(); // pending snap applied first, then back one
        assert_eq!(c.current_index(), 2);
        assert_eq!(c.active_slide(), 1);

        let mut c = carousel(3, 1);
        for _ in 0..5 {
            c.next();
            assert!(c.current_index() < c.extended_items().len());
        }
        c.settle();
        assert_eq!(c.active_slide(), 2);
    }

    #[test]
    fn test_active_indicator_in_clone_regions() {
        let mut c = carousel(4, 2);
        assert_eq!(c.indicators(), vec![true, false, false, false]);

        // Cloned tail: index K+N shows the first slide.
        for _ in 0..4 {
            c.next();
        }
        assert_eq!(c.current_index(), 6);
        assert_eq!(c.indicators(), vec![true, false, false, false]);

        // Cloned head: index K-1 shows the last slide.
        let mut c = carousel(4, 2);
        c.prev();
        assert_eq!(c.indicators(), vec![false, false, false, true]);
    }

    #[test]
    fn test_exactly_one_indicator_active() {
        let mut c = carousel(6, 3);
        for _ in 0..20 {
            c.next();
            assert_eq!(c.indicators().iter().filter(|a| **a).count(), 1);
            c.settle();
            assert_eq!(c.indicators().iter().filter(|a| **a).count(), 1);
        }
    }

    #[test]
    fn test_set_visible_count_keeps_active_slide() {
        let mut c = carousel(5, 2);
        c.go_to(3).unwrap();
        c.set_visible_count(1).unwrap();
        assert_eq!(c.visible_count(), 1);
        assert_eq!(c.extended_items().len(), 7);
        assert_eq!(c.current_index(), 4);
        assert_eq!(c.active_slide(), 3);
        assert!(c.set_visible_count(9).is_err());
    }

    #[test]
    fn test_snapshot_fields() {
        let mut c = carousel(4, 2);
        c.next();
        let snap = c.snapshot();
        assert_eq!(snap.current_index, 3);
        assert_eq!(snap.active_slide, 1);
        assert_eq!(snap.slide_count, 4);
        assert!(!snap.is_auto_playing);
        assert!(!snap.pending_correction);
        assert!((snap.offset_pct - 150.0).abs() < 1e-9);
        assert_eq!(snap.transition, Transition::Animated);
    }
}
