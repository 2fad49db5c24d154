//! Widget arena.
//!
//! Widgets live in one [`SlotMap`] and refer to each other by [`WidgetId`].
//! A container lists its children in order and every child knows its parent
//! and its position in that list, so `children[node.index] == id` holds
//! after every insert, remove and replace. Geometry is never stored: a
//! widget's rect follows from its root's rect, the partition of each
//! ancestor layout and the scroll offsets on the way down.

use std::ops::Range;

use folio_core::{Direction, IVec2, Rect, Texture};
use slotmap::{SecondaryMap, SlotMap};

use crate::WidgetId;
use crate::layout::{Layout, content_len, partition, uniform_range};
use crate::scroll::{BAR_WIDTH, Scroll, TileBox, clamp_offset, offset_for_thumb, thumb};
use crate::widget::{Label, Size, WidgetKind};

pub struct Node<M> {
    pub(crate) parent: Option<WidgetId>,
    pub(crate) index: usize,
    pub(crate) rel_size: Size,
    pub kind: WidgetKind<M>,
}

impl<M> Node<M> {
    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rel_size(&self) -> Size {
        self.rel_size
    }
}

/// Scroll geometry of a scrolling container, in window coordinates.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScrollGeom {
    pub horizontal: bool,
    pub total: i32,
    pub viewport: i32,
    pub bar: Rect,
    /// Offset zero sits at the far end of the axis (right-to-left reading).
    pub mirrored: bool,
}

impl ScrollGeom {
    pub fn track(&self) -> i32 {
        self.bar.size().along(self.horizontal)
    }
}

pub struct Tree<M> {
    nodes: SlotMap<WidgetId, Node<M>>,
    roots: SecondaryMap<WidgetId, Rect>,
    garbage: Vec<Texture>,
}

impl<M> Default for Tree<M> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: SecondaryMap::new(),
            garbage: Vec::new(),
        }
    }
}

impl<M> Tree<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: WidgetId) -> Option<&Node<M>> {
        self.nodes.get(id)
    }

    pub fn kind(&self, id: WidgetId) -> Option<&WidgetKind<M>> {
        self.nodes.get(id).map(|n| &n.kind)
    }

    pub fn kind_mut(&mut self, id: WidgetId) -> Option<&mut WidgetKind<M>> {
        self.nodes.get_mut(id).map(|n| &mut n.kind)
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn index(&self, id: WidgetId) -> Option<usize> {
        self.nodes.get(id).map(|n| n.index)
    }

    pub fn layout(&self, id: WidgetId) -> Option<&Layout> {
        self.kind(id).and_then(WidgetKind::layout)
    }

    pub(crate) fn layout_mut(&mut self, id: WidgetId) -> Option<&mut Layout> {
        self.kind_mut(id).and_then(WidgetKind::layout_mut)
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.layout(id).map_or(&[], Layout::children)
    }

    pub fn child(&self, id: WidgetId, index: usize) -> Option<WidgetId> {
        self.children(id).get(index).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.nodes.keys()
    }

    pub fn label(&self, id: WidgetId) -> Option<&Label<M>> {
        self.kind(id).and_then(WidgetKind::label)
    }

    pub fn label_mut(&mut self, id: WidgetId) -> Option<&mut Label<M>> {
        self.kind_mut(id).and_then(WidgetKind::label_mut)
    }

    pub fn text(&self, id: WidgetId) -> Option<&str> {
        match self.kind(id)? {
            WidgetKind::LabelEdit(e) => Some(e.text()),
            k => k.label().map(Label::text),
        }
    }

    pub fn set_text(&mut self, id: WidgetId, text: &str) {
        match self.kind_mut(id) {
            Some(WidgetKind::LabelEdit(e)) => e.set_text(text),
            Some(k) => {
                if let Some(l) = k.label_mut() {
                    l.set_text(text);
                }
            }
            None => {}
        }
    }

    /// Adds a widget with no parent. Its rect is whatever
    /// [`set_root_rect`](Self::set_root_rect) last gave it.
    pub fn add_root(&mut self, kind: WidgetKind<M>) -> WidgetId {
        let id = self.nodes.insert(Node {
            parent: None,
            index: 0,
            rel_size: Size::default(),
            kind,
        });
        self.roots.insert(id, Rect::default());
        id
    }

    pub fn is_root(&self, id: WidgetId) -> bool {
        self.roots.contains_key(id)
    }

    pub fn set_root_rect(&mut self, id: WidgetId, rect: Rect) {
        if let Some(r) = self.roots.get_mut(id)
            && *r != rect
        {
            *r = rect;
            self.invalidate_below(id);
        }
    }

    fn invalidate_below(&self, id: WidgetId) {
        if let Some(l) = self.layout(id) {
            l.invalidate();
            for &c in l.children() {
                self.invalidate_below(c);
            }
        }
    }

    pub fn push(&mut self, parent: WidgetId, size: impl Into<Size>, kind: WidgetKind<M>) -> Option<WidgetId> {
        let n = self.children(parent).len();
        self.insert(parent, n, size, kind)
    }

    /// Inserts a child at `index`, clamped to the child count. `None` when
    /// `parent` isn't a container.
    pub fn insert(
        &mut self,
        parent: WidgetId,
        index: usize,
        size: impl Into<Size>,
        kind: WidgetKind<M>,
    ) -> Option<WidgetId> {
        let len = self.layout(parent)?.children.len();
        let index = index.min(len);
        let id = self.nodes.insert(Node {
            parent: Some(parent),
            index,
            rel_size: size.into(),
            kind,
        });
        if let Some(l) = self.layout_mut(parent) {
            l.children.insert(index, id);
            l.invalidate();
        }
        self.reindex(parent, index + 1);
        Some(id)
    }

    /// Removes a widget with its whole subtree. Textures the widgets owned
    /// are queued for the next [`take_garbage`](Self::take_garbage).
    pub fn remove(&mut self, id: WidgetId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        if let Some(parent) = node.parent {
            let index = node.index;
            if let Some(l) = self.layout_mut(parent) {
                if l.children.get(index) == Some(&id) {
                    l.children.remove(index);
                }
                l.forget(id);
                l.invalidate();
            }
            self.reindex(parent, index);
        }
        self.roots.remove(id);
        self.drop_subtree(id);
        true
    }

    /// Swaps a widget's kind in place, dropping the old kind's subtree.
    pub fn replace(&mut self, id: WidgetId, kind: WidgetKind<M>) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let parent = node.parent;
        let old = std::mem::replace(&mut node.kind, kind);
        self.release(old);
        if let Some(l) = parent.and_then(|p| self.layout(p)) {
            l.invalidate();
        }
        true
    }

    pub fn clear_children(&mut self, id: WidgetId) {
        let Some(l) = self.layout_mut(id) else {
            return;
        };
        let kids = std::mem::take(&mut l.children);
        l.set_selected([]);
        l.invalidate();
        if let Some(s) = self.scroll_state_mut(id) {
            *s = Scroll::default();
        }
        if let Some(WidgetKind::ReaderBox(rb)) = self.kind_mut(id) {
            rb.cross = 0;
        }
        for c in kids {
            self.drop_subtree(c);
        }
    }

    pub fn set_size(&mut self, id: WidgetId, size: impl Into<Size>) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.rel_size = size.into();
        if let Some(l) = node.parent.and_then(|p| self.layout(p)) {
            l.invalidate();
        }
    }

    /// Textures of removed widgets, for the renderer to free.
    pub fn take_garbage(&mut self) -> Vec<Texture> {
        std::mem::take(&mut self.garbage)
    }

    fn reindex(&mut self, parent: WidgetId, from: usize) {
        let kids: Vec<WidgetId> = self.children(parent).get(from..).map(<[_]>::to_vec).unwrap_or_default();
        for (i, c) in kids.into_iter().enumerate() {
            if let Some(n) = self.nodes.get_mut(c) {
                n.index = from + i;
            }
        }
    }

    fn drop_subtree(&mut self, id: WidgetId) {
        if let Some(node) = self.nodes.remove(id) {
            self.roots.remove(id);
            self.release(node.kind);
        }
    }

    fn release(&mut self, kind: WidgetKind<M>) {
        self.garbage.extend(kind.owned_textures());
        if let Some(l) = kind.layout() {
            for &c in l.children() {
                self.drop_subtree(c);
            }
        }
    }

    pub fn ancestors(&self, id: WidgetId) -> impl Iterator<Item = WidgetId> + '_ {
        std::iter::successors(self.parent(id), |&p| self.parent(p))
    }

    pub fn is_within(&self, id: WidgetId, ancestor: WidgetId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    pub fn root_of(&self, id: WidgetId) -> WidgetId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Nearest enclosing container that scrolls.
    pub fn scroll_ancestor(&self, id: WidgetId) -> Option<WidgetId> {
        self.ancestors(id).find(|&a| self.scroll_state(a).is_some())
    }

    // geometry

    pub fn rect(&self, id: WidgetId) -> Rect {
        match self.nodes.get(id) {
            Some(Node { parent: None, .. }) => self.roots.get(id).copied().unwrap_or_default(),
            Some(Node {
                parent: Some(p),
                index,
                ..
            }) => self.child_rect(*p, *index),
            None => Rect::default(),
        }
    }

    /// Region a widget may draw into: its parent's rect clipped by the
    /// parent's own frame.
    pub fn frame(&self, id: WidgetId) -> Rect {
        match self.parent(id) {
            Some(p) => self.rect(p).intersect(&self.frame(p)),
            None => self.rect(id),
        }
    }

    fn child_sizes(&self, l: &Layout) -> Vec<Size> {
        l.children
            .iter()
            .map(|c| self.nodes.get(*c).map_or(Size::Pixels(0), |n| n.rel_size))
            .collect()
    }

    fn child_rect(&self, parent: WidgetId, index: usize) -> Rect {
        let prect = self.rect(parent);
        let Some(kind) = self.kind(parent) else {
            return Rect::default();
        };
        match kind {
            WidgetKind::Layout(l) => {
                let horizontal = !l.vertical;
                let extent = prect.size().along(horizontal);
                let span = l
                    .with_spans(
                        extent,
                        || partition(&self.child_sizes(l), extent, l.spacing, false),
                        |s| s.get(index).copied(),
                    )
                    .unwrap_or_default();
                Rect::from_parts(
                    prect.pos() + IVec2::from_axis(horizontal, span.pos, 0),
                    IVec2::from_axis(horizontal, span.len, prect.size().across(horizontal)),
                )
            }
            WidgetKind::ScrollArea(sa) => {
                let l = &sa.layout;
                let horizontal = !l.vertical;
                let viewport = prect.size().along(horizontal);
                let (span, total) = l.with_spans(
                    viewport,
                    || partition(&self.child_sizes(l), viewport, l.spacing, true),
                    |s| (s.get(index).copied().unwrap_or_default(), content_len(s)),
                );
                let mut cross = prect.size().across(horizontal);
                if total > viewport {
                    cross = (cross - BAR_WIDTH).max(0);
                }
                let offset = clamp_offset(sa.scroll.offset, total, viewport);
                Rect::from_parts(
                    prect.pos() + IVec2::from_axis(horizontal, span.pos - offset, 0),
                    IVec2::from_axis(horizontal, span.len, cross),
                )
            }
            WidgetKind::TileBox(tb) => {
                let width = grid_width(tb, prect);
                let offset = clamp_offset(tb.scroll.offset, tb.content_height(width), prect.h);
                let pos = tb.tile_pos(index, width);
                Rect::from_parts(prect.pos() + pos - IVec2::new(0, offset), tb.tile)
            }
            WidgetKind::ReaderBox(rb) => self.page_rect(rb, prect, index),
            _ => Rect::default(),
        }
    }

    /// Children worth drawing or hit testing: all of a plain layout's, only
    /// those intersecting the viewport for scrolling containers.
    pub fn visible_range(&self, id: WidgetId) -> Range<usize> {
        let rect = self.rect(id);
        match self.kind(id) {
            Some(WidgetKind::Layout(l)) => 0..l.children.len(),
            Some(WidgetKind::ScrollArea(sa)) => {
                let l = &sa.layout;
                let horizontal = !l.vertical;
                let viewport = rect.size().along(horizontal);
                l.visible(
                    viewport,
                    || partition(&self.child_sizes(l), viewport, l.spacing, true),
                    |total| clamp_offset(sa.scroll.offset, total, viewport),
                )
            }
            Some(WidgetKind::TileBox(tb)) => {
                let width = grid_width(tb, rect);
                let cols = tb.columns(width);
                let offset = clamp_offset(tb.scroll.offset, tb.content_height(width), rect.h);
                let stride = tb.tile.y + tb.layout.spacing;
                let rows = uniform_range(tb.rows(width), 0, tb.tile.y, stride, offset, rect.h);
                let n = tb.layout.children.len();
                (rows.start * cols).min(n)..(rows.end * cols).min(n)
            }
            Some(WidgetKind::ReaderBox(rb)) => self.reader_visible(rb, rect),
            _ => 0..0,
        }
    }

    pub(crate) fn scroll_state(&self, id: WidgetId) -> Option<&Scroll> {
        match self.kind(id)? {
            WidgetKind::ScrollArea(s) => Some(&s.scroll),
            WidgetKind::TileBox(t) => Some(&t.scroll),
            WidgetKind::ReaderBox(r) => Some(&r.scroll),
            _ => None,
        }
    }

    pub(crate) fn scroll_state_mut(&mut self, id: WidgetId) -> Option<&mut Scroll> {
        match self.kind_mut(id)? {
            WidgetKind::ScrollArea(s) => Some(&mut s.scroll),
            WidgetKind::TileBox(t) => Some(&mut t.scroll),
            WidgetKind::ReaderBox(r) => Some(&mut r.scroll),
            _ => None,
        }
    }

    pub fn is_scrollable(&self, id: WidgetId) -> bool {
        self.scroll_state(id).is_some()
    }

    pub(crate) fn scroll_geom(&self, id: WidgetId) -> Option<ScrollGeom> {
        let rect = self.rect(id);
        let (horizontal, total, mirrored) = match self.kind(id)? {
            WidgetKind::ScrollArea(sa) => {
                let l = &sa.layout;
                let horizontal = !l.vertical;
                let viewport = rect.size().along(horizontal);
                let total = l.with_spans(
                    viewport,
                    || partition(&self.child_sizes(l), viewport, l.spacing, true),
                    content_len,
                );
                (horizontal, total, false)
            }
            WidgetKind::TileBox(tb) => (false, tb.content_height(grid_width(tb, rect)), false),
            WidgetKind::ReaderBox(rb) => (rb.is_horizontal(), self.reader_total(rb, rect), rb.is_mirrored()),
            _ => return None,
        };
        let bar = if horizontal {
            Rect::new(rect.x, rect.y + rect.h - BAR_WIDTH, rect.w, BAR_WIDTH)
        } else {
            Rect::new(rect.x + rect.w - BAR_WIDTH, rect.y, BAR_WIDTH, rect.h)
        };
        Some(ScrollGeom {
            horizontal,
            total,
            viewport: rect.size().along(horizontal),
            bar,
            mirrored,
        })
    }

    /// Current offset, clamped to the content.
    pub fn scroll_offset(&self, id: WidgetId) -> i32 {
        match (self.scroll_state(id), self.scroll_geom(id)) {
            (Some(s), Some(g)) => clamp_offset(s.offset, g.total, g.viewport),
            _ => 0,
        }
    }

    /// Returns whether the offset changed.
    pub fn set_scroll(&mut self, id: WidgetId, offset: i32) -> bool {
        let Some(g) = self.scroll_geom(id) else {
            return false;
        };
        let offset = clamp_offset(offset, g.total, g.viewport);
        match self.scroll_state_mut(id) {
            Some(s) if s.offset != offset => {
                s.offset = offset;
                true
            }
            _ => false,
        }
    }

    /// Moves the view of a scrolling container by `d` screen pixels.
    ///
    /// Returns `Some(forward)` when the request pushed along the scroll axis
    /// against an end that was already reached.
    pub fn scroll_by(&mut self, id: WidgetId, d: IVec2) -> Option<bool> {
        let g = self.scroll_geom(id)?;
        if let Some(WidgetKind::ReaderBox(_)) = self.kind(id) {
            self.reader_pan_cross(id, -d.across(g.horizontal));
        }
        let mut along = d.along(g.horizontal);
        if g.mirrored {
            along = -along;
        }
        if along == 0 {
            return None;
        }
        let before = self.scroll_offset(id);
        self.set_scroll(id, before + along);
        (self.scroll_offset(id) == before).then_some(along > 0)
    }

    /// Re-clamps every stored offset, e.g. after the window shrank.
    pub fn refresh_scrolls(&mut self) {
        let ids: Vec<WidgetId> = self.nodes.keys().filter(|&id| self.is_scrollable(id)).collect();
        for id in ids {
            let off = self.scroll_state(id).map_or(0, |s| s.offset);
            self.set_scroll(id, off);
            self.reader_clamp_cross(id);
        }
    }

    /// Scrolls every enclosing container just enough to show `id`.
    pub fn scroll_into_view(&mut self, id: WidgetId) {
        let Some(area) = self.scroll_ancestor(id) else {
            return;
        };
        if let Some(g) = self.scroll_geom(area) {
            let h = g.horizontal;
            let view = self.rect(area);
            let r = self.rect(id);
            let (vs, ve) = (view.pos().along(h), view.pos().along(h) + g.viewport);
            let (rs, re) = (r.pos().along(h), r.end().along(h));
            let mut delta = if rs < vs {
                rs - vs
            } else if re > ve {
                (re - ve).min(rs - vs)
            } else {
                0
            };
            if g.mirrored {
                delta = -delta;
            }
            if delta != 0 {
                let off = self.scroll_offset(area);
                self.set_scroll(area, off + delta);
            }
        }
        self.scroll_into_view(area);
    }

    /// Scroll bar and thumb rects, when the content overflows.
    pub fn bar_rects(&self, id: WidgetId) -> Option<(Rect, Rect)> {
        let g = self.scroll_geom(id)?;
        let t = thumb(self.scroll_offset(id), g.total, g.viewport, g.track())?;
        let pos = if g.mirrored { g.track() - t.pos - t.len } else { t.pos };
        let th = Rect::from_parts(
            g.bar.pos() + IVec2::from_axis(g.horizontal, pos, 0),
            IVec2::from_axis(g.horizontal, t.len, BAR_WIDTH),
        );
        Some((g.bar, th))
    }

    /// Starts dragging the scroll bar if `pos` is on it. A press beside the
    /// thumb first centers the thumb on the cursor.
    pub(crate) fn bar_press(&mut self, id: WidgetId, pos: IVec2) -> bool {
        let Some((bar, th)) = self.bar_rects(id) else {
            return false;
        };
        let Some(g) = self.scroll_geom(id) else {
            return false;
        };
        if !bar.contains(pos) {
            return false;
        }
        let h = g.horizontal;
        let cursor = pos.along(h);
        let grab = if th.contains(pos) {
            cursor - th.pos().along(h)
        } else {
            let grab = th.size().along(h) / 2;
            self.bar_move_thumb(id, cursor - grab);
            grab
        };
        if let Some(s) = self.scroll_state_mut(id) {
            s.drag = Some(grab);
        }
        true
    }

    pub(crate) fn bar_drag(&mut self, id: WidgetId, pos: IVec2) {
        let Some(grab) = self.scroll_state(id).and_then(|s| s.drag) else {
            return;
        };
        if let Some(g) = self.scroll_geom(id) {
            self.bar_move_thumb(id, pos.along(g.horizontal) - grab);
        }
    }

    pub(crate) fn bar_release(&mut self, id: WidgetId) {
        if let Some(s) = self.scroll_state_mut(id) {
            s.drag = None;
        }
    }

    /// Scrolls so the thumb starts at screen coordinate `start`.
    fn bar_move_thumb(&mut self, id: WidgetId, start: i32) {
        let Some(g) = self.scroll_geom(id) else {
            return;
        };
        let Some(t) = thumb(0, g.total, g.viewport, g.track()) else {
            return;
        };
        let mut px = start - g.bar.pos().along(g.horizontal);
        if g.mirrored {
            px = g.track() - px - t.len;
        }
        let off = offset_for_thumb(px, g.total, g.viewport, g.track());
        self.set_scroll(id, off);
    }

    /// Innermost widget under `pos`, searching from `id` down. Scroll bars
    /// belong to their container.
    pub fn hit(&self, id: WidgetId, pos: IVec2) -> Option<WidgetId> {
        let node = self.nodes.get(id)?;
        if !self.rect(id).intersect(&self.frame(id)).contains(pos) {
            return None;
        }
        if let Some(l) = node.kind.layout() {
            if self.bar_rects(id).is_some_and(|(bar, _)| bar.contains(pos)) {
                return Some(id);
            }
            for i in self.visible_range(id) {
                if let Some(w) = l.children.get(i).and_then(|&c| self.hit(c, pos)) {
                    return Some(w);
                }
            }
        }
        Some(id)
    }

    /// Innermost scrolling container under `pos`.
    pub fn scroll_area_at(&self, root: WidgetId, pos: IVec2) -> Option<WidgetId> {
        let w = self.hit(root, pos)?;
        if self.is_scrollable(w) {
            Some(w)
        } else {
            self.scroll_ancestor(w)
        }
    }

    // selection and navigation

    /// Applies a click on `id` to its parent's selected set.
    pub fn select_in_parent(&mut self, id: WidgetId) {
        if let Some(p) = self.parent(id)
            && let Some(l) = self.layout_mut(p)
        {
            l.click_select(id);
        }
    }

    pub fn set_selected(&mut self, layout: WidgetId, ids: impl IntoIterator<Item = WidgetId>) {
        if let Some(l) = self.layout_mut(layout) {
            l.set_selected(ids);
        }
    }

    /// First navigable widget in `id`'s subtree, in child order.
    pub fn first_navigable(&self, id: WidgetId) -> Option<WidgetId> {
        let node = self.nodes.get(id)?;
        if node.kind.is_navigable() && !self.rect(id).is_empty() {
            return Some(id);
        }
        node.kind.layout()?.children.iter().find_map(|&c| self.first_navigable(c))
    }

    /// Widget that keyboard navigation moves to from `id`, if any.
    ///
    /// Siblings along the direction are tried first, entering containers at
    /// the child nearest to where the move started. When a layout runs out
    /// the search continues in its parent. A root has nowhere to go.
    pub fn navigate(&self, id: WidgetId, dir: Direction) -> Option<WidgetId> {
        let node = self.nodes.get(id)?;
        let parent = node.parent?;
        let c = self.rect(id).center();
        let perp = if dir.is_vertical() { c.x } else { c.y };
        self.nav_next(parent, node.index, perp, dir)
    }

    fn nav_next(&self, container: WidgetId, index: usize, perp: i32, dir: Direction) -> Option<WidgetId> {
        let node = self.nodes.get(container)?;
        let l = node.kind.layout()?;
        let n = l.children.len();
        let candidates: Vec<usize> = match &node.kind {
            WidgetKind::TileBox(tb) => {
                let cols = tb.columns(grid_width(tb, self.rect(container)));
                let target = match dir {
                    Direction::Up => index.checked_sub(cols),
                    Direction::Down if index + cols < n => Some(index + cols),
                    // short last row
                    Direction::Down if index / cols + 1 < n.div_ceil(cols) => Some(n - 1),
                    Direction::Down => None,
                    Direction::Left => (index % cols != 0).then(|| index - 1),
                    Direction::Right => (index % cols + 1 < cols && index + 1 < n).then_some(index + 1),
                };
                target.into_iter().collect()
            }
            _ if l.vertical == dir.is_vertical() => {
                if dir.is_negative() {
                    (0..index.min(n)).rev().collect()
                } else {
                    (index + 1..n).collect()
                }
            }
            _ => Vec::new(),
        };
        for i in candidates {
            if let Some(w) = l.children.get(i).and_then(|&c| self.nav_target(c, perp, dir)) {
                return Some(w);
            }
        }
        self.nav_next(node.parent?, node.index, perp, dir)
    }

    /// The navigable widget to land on when moving into `id`.
    fn nav_target(&self, id: WidgetId, perp: i32, dir: Direction) -> Option<WidgetId> {
        let node = self.nodes.get(id)?;
        if node.kind.is_navigable() {
            return (!self.rect(id).is_empty()).then_some(id);
        }
        let l = node.kind.layout()?;
        let mut range = self.visible_range(id);
        if range.is_empty() {
            range = 0..l.children.len();
        }
        // entering a list against its order lands on its last item
        let backward = dir.is_negative() && l.vertical == dir.is_vertical();
        let order: Vec<usize> = if backward { range.rev().collect() } else { range.collect() };
        let mut best: Option<(i32, WidgetId)> = None;
        for i in order {
            let Some(w) = l.children.get(i).and_then(|&c| self.nav_target(c, perp, dir)) else {
                continue;
            };
            let c = self.rect(w).center();
            let d = ((if dir.is_vertical() { c.x } else { c.y }) - perp).abs();
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, w));
            }
        }
        best.map(|(_, w)| w)
    }
}

/// Width the tiles of a grid are placed in, leaving room for the scroll bar
/// when the rows overflow.
fn grid_width(tb: &TileBox, rect: Rect) -> i32 {
    if tb.content_height(rect.w) > rect.h {
        (rect.w - BAR_WIDTH).max(0)
    } else {
        rect.w
    }
}
