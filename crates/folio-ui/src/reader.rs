//! Picture reader: a strip of pages scrolled along the reading direction
//! and zoomed as a whole.
//!
//! Pages are [`Picture`] children whose `res` gives their unscaled size.
//! Offsets count from the first page whatever the direction; right-to-left
//! reading only mirrors where pages land on screen.

use std::ops::Range;

use folio_core::{IVec2, Rect, Texture};
use folio_files::ReadDirection;

use crate::WidgetId;
use crate::layout::{Layout, Select, Span, content_len, partition};
use crate::scroll::{Scroll, clamp_offset};
use crate::tree::Tree;
use crate::widget::{Picture, Size, WidgetKind};

pub const ZOOM_STEP: f32 = 1.2;
pub const MIN_ZOOM: f32 = 0.01;

pub struct ReaderBox {
    pub layout: Layout,
    pub(crate) scroll: Scroll,
    /// Pan across the reading axis, zero when pages are centered.
    pub(crate) cross: i32,
    zoom: f32,
    direction: ReadDirection,
}

impl ReaderBox {
    pub fn new(direction: ReadDirection, spacing: i32) -> Self {
        Self {
            layout: Layout::new(direction.is_vertical(), spacing, Select::None),
            scroll: Scroll::default(),
            cross: 0,
            zoom: 1.0,
            direction,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn direction(&self) -> ReadDirection {
        self.direction
    }

    pub fn is_horizontal(&self) -> bool {
        !self.direction.is_vertical()
    }

    pub fn is_mirrored(&self) -> bool {
        self.direction == ReadDirection::RightToLeft
    }

    pub fn cross(&self) -> i32 {
        self.cross
    }

    pub fn scroll(&self) -> &Scroll {
        &self.scroll
    }

    /// On-screen size of a page at the current zoom.
    pub fn page_size(&self, res: IVec2) -> IVec2 {
        IVec2::new(
            (res.x as f32 * self.zoom).round() as i32,
            (res.y as f32 * self.zoom).round() as i32,
        )
    }
}

impl<M> Tree<M> {
    pub fn reader(&self, id: WidgetId) -> Option<&ReaderBox> {
        match self.kind(id)? {
            WidgetKind::ReaderBox(rb) => Some(rb),
            _ => None,
        }
    }

    fn reader_mut(&mut self, id: WidgetId) -> Option<&mut ReaderBox> {
        match self.kind_mut(id)? {
            WidgetKind::ReaderBox(rb) => Some(rb),
            _ => None,
        }
    }

    /// Appends a page; the reader frees `tex` when the page goes away.
    pub fn add_page(&mut self, reader: WidgetId, tex: Option<Texture>, res: IVec2) -> Option<WidgetId> {
        self.reader(reader)?;
        self.push(reader, Size::Pixels(0), WidgetKind::Picture(Picture::page(tex, res)))
    }

    pub fn page_count(&self, reader: WidgetId) -> usize {
        self.reader(reader).map_or(0, |rb| rb.layout.children.len())
    }

    fn page_res(&self, page: WidgetId) -> IVec2 {
        match self.kind(page) {
            Some(WidgetKind::Picture(p)) => p.res,
            _ => IVec2::ZERO,
        }
    }

    fn page_spans<R>(&self, rb: &ReaderBox, viewport: i32, f: impl FnOnce(&[Span]) -> R) -> R {
        rb.layout.with_spans(viewport, || self.page_sizes(rb, viewport), f)
    }

    fn page_sizes(&self, rb: &ReaderBox, viewport: i32) -> Vec<Span> {
        let horizontal = rb.is_horizontal();
        let sizes: Vec<Size> = rb
            .layout
            .children
            .iter()
            .map(|&c| Size::Pixels(rb.page_size(self.page_res(c)).along(horizontal)))
            .collect();
        partition(&sizes, viewport, rb.layout.spacing, true)
    }

    pub(crate) fn reader_total(&self, rb: &ReaderBox, rect: Rect) -> i32 {
        self.page_spans(rb, rect.size().along(rb.is_horizontal()), content_len)
    }

    pub(crate) fn reader_visible(&self, rb: &ReaderBox, rect: Rect) -> Range<usize> {
        let viewport = rect.size().along(rb.is_horizontal());
        rb.layout.visible(
            viewport,
            || self.page_sizes(rb, viewport),
            |total| clamp_offset(rb.scroll.offset, total, viewport),
        )
    }

    /// How far pages may be panned across the axis either way.
    fn cross_limit(&self, rb: &ReaderBox, rect: Rect) -> i32 {
        let horizontal = rb.is_horizontal();
        let widest = rb
            .layout
            .children
            .iter()
            .map(|&c| rb.page_size(self.page_res(c)).across(horizontal))
            .max()
            .unwrap_or(0);
        ((widest - rect.size().across(horizontal)) / 2).max(0)
    }

    pub(crate) fn page_rect(&self, rb: &ReaderBox, prect: Rect, index: usize) -> Rect {
        let horizontal = rb.is_horizontal();
        let viewport = prect.size().along(horizontal);
        let (span, total) = self.page_spans(rb, viewport, |s| {
            (s.get(index).copied().unwrap_or_default(), content_len(s))
        });
        let size = rb
            .layout
            .children
            .get(index)
            .map_or(IVec2::ZERO, |&c| rb.page_size(self.page_res(c)));

        let mut along = span.pos - clamp_offset(rb.scroll.offset, total, viewport);
        if total < viewport {
            along += (viewport - total) / 2;
        }
        if rb.is_mirrored() {
            along = viewport - along - span.len;
        }
        let limit = self.cross_limit(rb, prect);
        let cross = (prect.size().across(horizontal) - size.across(horizontal)) / 2 + rb.cross.clamp(-limit, limit);
        Rect::from_parts(
            prect.pos() + IVec2::from_axis(horizontal, along, cross),
            IVec2::from_axis(horizontal, span.len, size.across(horizontal)),
        )
    }

    pub(crate) fn reader_pan_cross(&mut self, id: WidgetId, d: i32) {
        if let Some(rb) = self.reader_mut(id) {
            rb.cross = rb.cross.saturating_add(d);
        }
        self.reader_clamp_cross(id);
    }

    pub(crate) fn reader_clamp_cross(&mut self, id: WidgetId) {
        let rect = self.rect(id);
        let Some(limit) = self.reader(id).map(|rb| self.cross_limit(rb, rect)) else {
            return;
        };
        if let Some(rb) = self.reader_mut(id) {
            rb.cross = rb.cross.clamp(-limit, limit);
        }
    }

    /// Sets the zoom, keeping the point at the middle of the view at the
    /// same proportion of the content.
    pub fn set_zoom(&mut self, id: WidgetId, zoom: f32) {
        let rect = self.rect(id);
        let Some(rb) = self.reader(id) else {
            return;
        };
        let viewport = rect.size().along(rb.is_horizontal());
        let total = self.reader_total(rb, rect);
        let center = self.scroll_offset(id) + viewport / 2;
        let prop = if total > 0 { center as f64 / total as f64 } else { 0.0 };

        let Some(rb) = self.reader_mut(id) else {
            return;
        };
        let zoom = zoom.max(MIN_ZOOM);
        let scale = zoom / rb.zoom;
        rb.zoom = zoom;
        rb.cross = (rb.cross as f32 * scale).round() as i32;
        rb.layout.invalidate();

        let total = self.reader(id).map_or(0, |rb| self.reader_total(rb, rect));
        let offset = (prop * total as f64).round() as i32 - viewport / 2;
        self.set_scroll(id, offset);
        self.reader_clamp_cross(id);
    }

    pub fn zoom_in(&mut self, id: WidgetId) {
        if let Some(z) = self.reader(id).map(ReaderBox::zoom) {
            self.set_zoom(id, z * ZOOM_STEP);
        }
    }

    pub fn zoom_out(&mut self, id: WidgetId) {
        if let Some(z) = self.reader(id).map(ReaderBox::zoom) {
            self.set_zoom(id, z / ZOOM_STEP);
        }
    }

    pub fn zoom_reset(&mut self, id: WidgetId) {
        self.set_zoom(id, 1.0);
    }

    pub fn center_view(&mut self, id: WidgetId) {
        if let Some(rb) = self.reader_mut(id) {
            rb.cross = 0;
        }
    }

    /// Changes the reading direction, staying on the current page.
    pub fn set_direction(&mut self, id: WidgetId, direction: ReadDirection) {
        let page = self.current_page(id);
        let Some(rb) = self.reader_mut(id) else {
            return;
        };
        if rb.direction == direction {
            return;
        }
        rb.direction = direction;
        rb.layout.vertical = direction.is_vertical();
        rb.cross = 0;
        rb.layout.invalidate();
        if let Some(p) = page {
            self.scroll_to_page(id, p);
        }
    }

    /// Page under the middle of the view.
    pub fn current_page(&self, id: WidgetId) -> Option<usize> {
        let rb = self.reader(id)?;
        if rb.layout.children.is_empty() {
            return None;
        }
        let rect = self.rect(id);
        let viewport = rect.size().along(rb.is_horizontal());
        let center = self.scroll_offset(id) + viewport / 2;
        Some(self.page_spans(rb, viewport, |s| s.partition_point(|sp| sp.pos <= center).saturating_sub(1)))
    }

    fn page_start(&self, id: WidgetId, page: usize) -> Option<i32> {
        let rb = self.reader(id)?;
        let viewport = self.rect(id).size().along(rb.is_horizontal());
        self.page_spans(rb, viewport, |s| s.get(page).map(|sp| sp.pos))
    }

    /// Puts the start of `page` at the start of the view. Returns whether
    /// the view moved.
    pub fn scroll_to_page(&mut self, id: WidgetId, page: usize) -> bool {
        let last = self.page_count(id).saturating_sub(1);
        match self.page_start(id, page.min(last)) {
            Some(pos) => self.set_scroll(id, pos),
            None => false,
        }
    }

    pub fn next_page(&mut self, id: WidgetId) -> bool {
        let Some(cur) = self.current_page(id) else {
            return false;
        };
        if cur + 1 < self.page_count(id) {
            self.scroll_to_page(id, cur + 1)
        } else {
            self.set_scroll(id, i32::MAX)
        }
    }

    /// Back to the start of the current page, or to the previous page when
    /// already there.
    pub fn prev_page(&mut self, id: WidgetId) -> bool {
        let Some(cur) = self.current_page(id) else {
            return false;
        };
        let offset = self.scroll_offset(id);
        match self.page_start(id, cur) {
            Some(start) if start < offset => self.set_scroll(id, start),
            _ if cur > 0 => self.scroll_to_page(id, cur - 1),
            _ => self.set_scroll(id, 0),
        }
    }

    pub fn scroll_to_start(&mut self, id: WidgetId) -> bool {
        self.set_scroll(id, 0)
    }

    pub fn scroll_to_end(&mut self, id: WidgetId) -> bool {
        self.set_scroll(id, i32::MAX)
    }

    /// Whether the view can't move further in the given reading direction.
    pub fn at_limit(&self, id: WidgetId, forward: bool) -> bool {
        let Some(g) = self.scroll_geom(id) else {
            return false;
        };
        let offset = self.scroll_offset(id);
        if forward { offset >= (g.total - g.viewport).max(0) } else { offset <= 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(direction: ReadDirection, pages: usize, res: IVec2) -> (Tree<()>, WidgetId, Vec<WidgetId>) {
        let mut t = Tree::new();
        let id = t.add_root(WidgetKind::ReaderBox(ReaderBox::new(direction, 0)));
        t.set_root_rect(id, Rect::new(0, 0, 300, 300));
        let pages = (0..pages).map(|_| t.add_page(id, None, res).unwrap()).collect();
        (t, id, pages)
    }

    #[test]
    fn test_zoom_round_trip() {
        let (mut t, id, pages) = reader(ReadDirection::TopToBottom, 3, IVec2::new(100, 200));
        t.set_scroll(id, 150);
        let before = t.rect(pages[1]);
        t.zoom_in(id);
        t.zoom_out(id);
        assert!((t.reader(id).unwrap().zoom() - 1.0).abs() < 1e-6);
        assert_eq!(t.rect(pages[1]), before);
    }

    #[test]
    fn test_zoom_keeps_center() {
        let (mut t, id, pages) = reader(ReadDirection::TopToBottom, 3, IVec2::new(100, 200));
        t.set_scroll(id, 150);
        // middle of the view at 300 of 600; after zooming at 360 of 720
        t.zoom_in(id);
        assert_eq!(t.rect(pages[0]).size(), IVec2::new(120, 240));
        assert_eq!(t.scroll_offset(id), 210);
        t.zoom_reset(id);
        assert_eq!(t.scroll_offset(id), 150);
    }

    #[test]
    fn test_zoom_floor() {
        let (mut t, id, _) = reader(ReadDirection::TopToBottom, 1, IVec2::new(100, 200));
        t.set_zoom(id, -3.0);
        assert_eq!(t.reader(id).unwrap().zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_right_to_left_mirrors() {
        let (ltr, lid, lp) = reader(ReadDirection::LeftToRight, 3, IVec2::new(200, 100));
        let (rtl, rid, rp) = reader(ReadDirection::RightToLeft, 3, IVec2::new(200, 100));
        assert_eq!(ltr.rect(lp[0]), Rect::new(0, 100, 200, 100));
        assert_eq!(rtl.rect(rp[0]), Rect::new(100, 100, 200, 100));
        assert_eq!(rtl.rect(rp[1]), Rect::new(-100, 100, 200, 100));
        assert_eq!(ltr.visible_range(lid), 0..2);
        assert_eq!(rtl.visible_range(rid), 0..2);
    }

    #[test]
    fn test_right_to_left_scrolls_leftward() {
        let (mut t, id, _) = reader(ReadDirection::RightToLeft, 3, IVec2::new(200, 100));
        // moving the view left reads on
        assert_eq!(t.scroll_by(id, IVec2::new(-50, 0)), None);
        assert_eq!(t.scroll_offset(id), 50);
        assert_eq!(t.scroll_by(id, IVec2::new(50, 0)), None);
        assert_eq!(t.scroll_by(id, IVec2::new(50, 0)), Some(false));
    }

    #[test]
    fn test_pages() {
        let (mut t, id, _) = reader(ReadDirection::TopToBottom, 4, IVec2::new(100, 200));
        assert_eq!(t.current_page(id), Some(0));
        assert!(t.next_page(id));
        assert_eq!(t.scroll_offset(id), 200);
        assert_eq!(t.current_page(id), Some(1));
        t.set_scroll(id, 250);
        assert!(t.prev_page(id));
        assert_eq!(t.scroll_offset(id), 200);
        assert!(t.prev_page(id));
        assert_eq!(t.scroll_offset(id), 0);
        assert!(t.at_limit(id, false));
        assert!(!t.prev_page(id));

        assert!(t.scroll_to_end(id));
        assert!(t.at_limit(id, true));
        assert_eq!(t.current_page(id), Some(3));
        assert!(!t.next_page(id));
    }

    #[test]
    fn test_cross_pan_limits() {
        let (mut t, id, pages) = reader(ReadDirection::TopToBottom, 2, IVec2::new(500, 200));
        // 500 wide in 300: 100 px of pan each way
        t.scroll_by(id, IVec2::new(1000, 0));
        assert_eq!(t.reader(id).unwrap().cross(), -100);
        assert_eq!(t.rect(pages[0]).x, -200);
        t.center_view(id);
        assert_eq!(t.rect(pages[0]).x, -100);
    }

    #[test]
    fn test_direction_change_keeps_page() {
        let (mut t, id, pages) = reader(ReadDirection::TopToBottom, 4, IVec2::new(200, 200));
        t.scroll_to_page(id, 2);
        t.set_direction(id, ReadDirection::LeftToRight);
        assert_eq!(t.current_page(id), Some(2));
        assert_eq!(t.rect(pages[2]), Rect::new(0, 50, 200, 200));
    }

    #[test]
    fn test_reload_starts_at_top() {
        let (mut t, id, _) = reader(ReadDirection::TopToBottom, 4, IVec2::new(500, 200));
        t.set_scroll(id, 250);
        t.scroll_by(id, IVec2::new(60, 0));
        t.clear_children(id);
        let pages: Vec<WidgetId> = (0..4).filter_map(|_| t.add_page(id, None, IVec2::new(500, 200))).collect();
        assert_eq!(t.scroll_offset(id), 0);
        assert_eq!(t.reader(id).unwrap().cross(), 0);
        assert_eq!(t.rect(pages[0]), Rect::new(-100, 0, 500, 200));
    }

    #[test]
    fn test_short_content_is_centered() {
        let (t, _, pages) = reader(ReadDirection::TopToBottom, 1, IVec2::new(100, 100));
        assert_eq!(t.rect(pages[0]), Rect::new(100, 100, 100, 100));
    }
}
