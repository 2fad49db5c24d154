//! Linear layouts: how a container splits its extent among children and
//! which of them are selected.

use std::cell::RefCell;
use std::ops::Range;

use smallvec::SmallVec;

use crate::WidgetId;
use crate::widget::Size;

/// How clicks change a layout's selected set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Select {
    #[default]
    None,
    One,
    Any,
}

/// A child's place along the layout axis, relative to the content start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub pos: i32,
    pub len: i32,
}

impl Span {
    pub fn end(&self) -> i32 {
        self.pos + self.len
    }
}

/// Splits `extent` among children of the given sizes.
///
/// Pixel sizes are taken as they are. In a fitted layout the remaining space
/// `extent - fixed - (n-1)*spacing` is shared by percent children in
/// proportion to their percentages, rounding cumulatively so the spans and
/// spacing add up to exactly `extent` whenever something is flexible and
/// the remainder isn't negative. In a scrolling layout a percent child is
/// that share of the viewport and the content may overflow.
pub fn partition(sizes: &[Size], extent: i32, spacing: i32, scrolling: bool) -> Vec<Span> {
    let n = sizes.len() as i32;
    let gaps = spacing * (n - 1).max(0);
    let fixed: i32 = sizes
        .iter()
        .map(|s| match s {
            Size::Pixels(px) => *px,
            Size::Percent(_) => 0,
        })
        .sum();
    let pct_sum: f32 = sizes
        .iter()
        .map(|s| match s {
            Size::Percent(p) => p.max(0.0),
            Size::Pixels(_) => 0.0,
        })
        .sum();
    let rest = (extent - fixed - gaps).max(0) as f32;

    let mut spans = Vec::with_capacity(sizes.len());
    let mut pos = 0;
    let mut acc = 0.0f32;
    let mut acc_px = 0;
    for s in sizes {
        let len = match *s {
            Size::Pixels(px) => px,
            Size::Percent(p) if scrolling => (p.max(0.0) * extent as f32).round() as i32,
            Size::Percent(p) if pct_sum > 0.0 => {
                acc += p.max(0.0) / pct_sum * rest;
                let upto = acc.round() as i32;
                let len = upto - acc_px;
                acc_px = upto;
                len
            }
            Size::Percent(_) => 0,
        };
        spans.push(Span { pos, len });
        pos += len + spacing;
    }
    spans
}

/// Total extent of laid out content including spacing.
pub fn content_len(spans: &[Span]) -> i32 {
    spans.last().map_or(0, Span::end)
}

/// Indices of the spans that intersect `[offset, offset + viewport)`:
/// from the first one ending after `offset` to the first one starting at or
/// after the viewport's end. Spans must be laid out in order.
pub fn visible_range(spans: &[Span], offset: i32, viewport: i32) -> Range<usize> {
    visible_spans(spans, is_uniform(spans), offset, viewport)
}

/// [`visible_range`] for spans whose uniformity is already known. Uniform
/// spans take constant time, others a binary search.
pub(crate) fn visible_spans(spans: &[Span], uniform: bool, offset: i32, viewport: i32) -> Range<usize> {
    if viewport <= 0 {
        return 0..0;
    }
    if uniform && let Some(first) = spans.first() {
        let stride = spans.get(1).map_or(first.len, |s| s.pos - first.pos);
        return uniform_range(spans.len(), first.pos, first.len, stride, offset, viewport);
    }
    let end = offset + viewport;
    let lo = spans.partition_point(|s| s.end() <= offset);
    let hi = spans.partition_point(|s| s.pos < end).max(lo);
    lo..hi
}

fn is_uniform(spans: &[Span]) -> bool {
    spans.first().is_some_and(|first| spans.iter().all(|s| s.len == first.len))
}

/// Visible range of `n` items of equal `len` placed every `stride` pixels
/// starting at `start`.
pub fn uniform_range(
    n: usize,
    start: i32,
    len: i32,
    stride: i32,
    offset: i32,
    viewport: i32,
) -> Range<usize> {
    if n == 0 || len <= 0 || viewport <= 0 {
        return 0..0;
    }
    if stride <= 0 {
        // single item or overlapping items
        let hit = start + len > offset && start < offset + viewport;
        return if hit { 0..n } else { n..n };
    }
    let rel = offset - start;
    // first i with start + i*stride + len > offset
    let lo = ((rel - len).div_euclid(stride) + 1).clamp(0, n as i32) as usize;
    // first i with start + i*stride >= offset + viewport
    let hi_raw = rel + viewport;
    let hi = if hi_raw <= 0 {
        0
    } else {
        ((hi_raw + stride - 1) / stride).clamp(0, n as i32) as usize
    };
    lo..hi.max(lo)
}

pub(crate) struct PartitionCache {
    pub extent: i32,
    pub spans: Vec<Span>,
    /// All spans share one length.
    pub uniform: bool,
}

/// Children laid out along one axis.
#[derive(Default)]
pub struct Layout {
    pub(crate) children: Vec<WidgetId>,
    pub(crate) vertical: bool,
    pub(crate) spacing: i32,
    pub(crate) select: Select,
    selected: SmallVec<[WidgetId; 4]>,
    pub(crate) cache: RefCell<Option<PartitionCache>>,
}

impl Layout {
    pub fn new(vertical: bool, spacing: i32, select: Select) -> Self {
        Self {
            vertical,
            spacing,
            select,
            ..Self::default()
        }
    }

    pub fn vertical(spacing: i32) -> Self {
        Self::new(true, spacing, Select::None)
    }

    pub fn horizontal(spacing: i32) -> Self {
        Self::new(false, spacing, Select::None)
    }

    pub fn with_select(mut self, select: Select) -> Self {
        self.select = select;
        self
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn is_vertical(&self) -> bool {
        self.vertical
    }

    pub fn spacing(&self) -> i32 {
        self.spacing
    }

    pub fn select_mode(&self) -> Select {
        self.select
    }

    pub fn selected(&self) -> &[WidgetId] {
        &self.selected
    }

    pub fn is_selected(&self, id: WidgetId) -> bool {
        self.selected.contains(&id)
    }

    pub(crate) fn invalidate(&self) {
        self.cache.borrow_mut().take();
    }

    /// Runs `f` on the spans for `extent`, computing them with `compute` when
    /// the cached ones were made for another extent or were invalidated.
    pub(crate) fn with_spans<R>(
        &self,
        extent: i32,
        compute: impl FnOnce() -> Vec<Span>,
        f: impl FnOnce(&[Span]) -> R,
    ) -> R {
        self.with_cache(extent, compute, |c| f(&c.spans))
    }

    /// Children inside the viewport of length `extent`. `offset` receives the
    /// content length and returns the scroll offset to use.
    pub(crate) fn visible(
        &self,
        extent: i32,
        compute: impl FnOnce() -> Vec<Span>,
        offset: impl FnOnce(i32) -> i32,
    ) -> Range<usize> {
        self.with_cache(extent, compute, |c| {
            let offset = offset(content_len(&c.spans));
            visible_spans(&c.spans, c.uniform, offset, extent)
        })
    }

    fn with_cache<R>(
        &self,
        extent: i32,
        compute: impl FnOnce() -> Vec<Span>,
        f: impl FnOnce(&PartitionCache) -> R,
    ) -> R {
        let mut cache = self.cache.borrow_mut();
        let c = match cache.take() {
            Some(c) if c.extent == extent => c,
            _ => {
                let spans = compute();
                PartitionCache {
                    extent,
                    uniform: is_uniform(&spans),
                    spans,
                }
            }
        };
        f(cache.insert(c))
    }

    /// Applies a click on `child` to the selected set.
    pub(crate) fn click_select(&mut self, child: WidgetId) {
        match self.select {
            Select::None => {}
            Select::One => {
                self.selected.clear();
                self.selected.push(child);
            }
            Select::Any => {
                if let Some(i) = self.selected.iter().position(|&c| c == child) {
                    self.selected.remove(i);
                } else {
                    self.selected.push(child);
                }
            }
        }
    }

    pub(crate) fn set_selected(&mut self, ids: impl IntoIterator<Item = WidgetId>) {
        self.selected.clear();
        for id in ids {
            if self.select == Select::None {
                break;
            }
            if self.children.contains(&id) && !self.selected.contains(&id) {
                self.selected.push(id);
                if self.select == Select::One {
                    break;
                }
            }
        }
    }

    pub(crate) fn forget(&mut self, id: WidgetId) {
        self.selected.retain(|c| *c != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn sum_with_spacing(spans: &[Span], spacing: i32) -> i32 {
        spans.iter().map(|s| s.len).sum::<i32>() + spacing * (spans.len() as i32 - 1).max(0)
    }

    #[test]
    fn test_partition_fills_extent() {
        let cases: &[&[Size]] = &[
            &[Size::Percent(1.0); 3],
            &[Size::Pixels(30), Size::Percent(0.3), Size::Percent(0.7)],
            &[Size::Percent(0.1), Size::Pixels(7), Size::Percent(0.1), Size::Percent(0.1)],
            &[Size::Percent(2.0), Size::Percent(1.0)],
        ];
        for sizes in cases {
            for extent in [0, 1, 17, 100, 333, 1001] {
                for spacing in [0, 3] {
                    let spans = partition(sizes, extent, spacing, false);
                    let fixed: i32 = sizes
                        .iter()
                        .map(|s| if let Size::Pixels(p) = s { *p } else { 0 })
                        .sum();
                    if extent - fixed - spacing * (sizes.len() as i32 - 1) >= 0 {
                        assert_eq!(sum_with_spacing(&spans, spacing), extent, "{sizes:?} {extent}");
                        assert_eq!(content_len(&spans), extent);
                    }
                    assert!(spans.iter().all(|s| s.len >= 0));
                }
            }
        }
    }

    #[test]
    fn test_partition_shares() {
        let spans = partition(&[Size::Pixels(40), Size::Percent(0.25), Size::Percent(0.75)], 250, 5, false);
        assert_eq!(
            spans,
            [Span { pos: 0, len: 40 }, Span { pos: 45, len: 50 }, Span { pos: 100, len: 150 }]
        );
    }

    #[test]
    fn test_scrolling_partition_overflows() {
        let spans = partition(&[Size::Percent(1.0), Size::Percent(0.5), Size::Pixels(20)], 200, 10, true);
        assert_eq!(
            spans,
            [Span { pos: 0, len: 200 }, Span { pos: 210, len: 100 }, Span { pos: 320, len: 20 }]
        );
        assert_eq!(content_len(&spans), 340);
    }

    fn brute_force(spans: &[Span], offset: i32, viewport: i32) -> Vec<usize> {
        spans
            .iter()
            .enumerate()
            .filter(|(_, s)| s.len > 0 && s.pos < offset + viewport && s.end() > offset)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_visible_range_is_sound() {
        let lens_sets: &[&[i32]] = &[
            &[10, 10, 10, 10, 10],
            &[5, 0, 12, 3, 0, 8],
            &[1],
            &[0, 0],
            &[7, 7, 20, 7],
        ];
        for lens in lens_sets {
            for spacing in [0, 2] {
                let sizes: Vec<Size> = lens.iter().map(|l| Size::Pixels(*l)).collect();
                let spans = partition(&sizes, 0, spacing, true);
                let total = content_len(&spans);
                for viewport in 1..=total + 2 {
                    for offset in 0..=total {
                        let r = visible_range(&spans, offset, viewport);
                        let expect = brute_force(&spans, offset, viewport);
                        for i in &expect {
                            assert!(r.contains(i), "{lens:?} s={offset} v={viewport} r={r:?}");
                        }
                        for i in r.clone() {
                            let s = spans[i];
                            assert!(s.len == 0 || expect.contains(&i), "{lens:?} {r:?} {i}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_uniform_matches_search() {
        for stride_gap in [0, 4] {
            let spans: Vec<Span> = (0..9)
                .map(|i| Span {
                    pos: i * (12 + stride_gap),
                    len: 12,
                })
                .collect();
            for offset in 0..content_len(&spans) {
                for viewport in [1, 5, 12, 40] {
                    let fast = uniform_range(9, 0, 12, 12 + stride_gap, offset, viewport);
                    let lo = spans.partition_point(|s| s.end() <= offset);
                    let hi = spans.partition_point(|s| s.pos < offset + viewport);
                    assert_eq!(fast, lo..hi, "o={offset} v={viewport}");
                }
            }
        }
    }

    #[test]
    fn test_cached_uniform_flag() {
        let l = Layout::vertical(0);
        let uniform = || partition(&[Size::Pixels(10); 50], 0, 2, true);
        assert_eq!(l.visible(30, uniform, |_| 25), 2..5);
        assert!(l.cache.borrow().as_ref().is_some_and(|c| c.uniform));

        l.invalidate();
        let mixed = || partition(&[Size::Pixels(10), Size::Pixels(40), Size::Pixels(10)], 0, 0, true);
        assert_eq!(l.visible(30, mixed, |total| total - 30), 1..3);
        assert!(l.cache.borrow().as_ref().is_some_and(|c| !c.uniform));
        // a cache hit keeps the spans even when `compute` would differ
        assert_eq!(l.visible(30, uniform, |_| 0), 0..2);
    }

    #[test]
    fn test_selection_modes() {
        let mut ids = SlotMap::<WidgetId, ()>::with_key();
        let (a, b) = (ids.insert(()), ids.insert(()));

        let mut none = Layout::vertical(0);
        none.children = vec![a, b];
        none.click_select(a);
        assert!(none.selected().is_empty());

        let mut one = Layout::vertical(0).with_select(Select::One);
        one.children = vec![a, b];
        one.click_select(a);
        one.click_select(b);
        assert_eq!(one.selected(), [b]);
        one.set_selected([a, b]);
        assert_eq!(one.selected(), [a]);

        let mut any = Layout::vertical(0).with_select(Select::Any);
        any.children = vec![a, b];
        any.click_select(a);
        any.click_select(b);
        any.click_select(a);
        assert_eq!(any.selected(), [b]);
        any.forget(b);
        assert!(any.selected().is_empty());
    }
}
