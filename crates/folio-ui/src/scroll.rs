//! Scrolling containers and the scroll bar arithmetic they share.
//!
//! Every way of scrolling ends in one clamp: `offset` stays within
//! `0..=max(total - viewport, 0)`. Drawing and hit testing only visit the
//! children in the visible range.

use folio_core::IVec2;

use crate::layout::{Layout, Select};

/// Thickness of a scroll bar and minimum length of its thumb.
pub const BAR_WIDTH: i32 = 10;
/// Pixels scrolled per wheel notch before the speed setting applies.
pub const WHEEL_FACTOR: i32 = 140;

pub fn max_offset(total: i32, viewport: i32) -> i32 {
    (total - viewport).max(0)
}

pub fn clamp_offset(offset: i32, total: i32, viewport: i32) -> i32 {
    offset.clamp(0, max_offset(total, viewport))
}

/// Scroll bar thumb relative to the start of its track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thumb {
    pub pos: i32,
    pub len: i32,
}

fn thumb_len(total: i32, viewport: i32, track: i32) -> i32 {
    let len = (viewport as i64 * track as i64 / total.max(1) as i64) as i32;
    len.max(BAR_WIDTH).min(track)
}

/// Thumb for the given scroll state, `None` when everything fits.
pub fn thumb(offset: i32, total: i32, viewport: i32, track: i32) -> Option<Thumb> {
    if total <= viewport || track <= 0 {
        return None;
    }
    let len = thumb_len(total, viewport, track);
    let room = track - len;
    let pos = if room > 0 {
        (clamp_offset(offset, total, viewport) as i64 * room as i64 / max_offset(total, viewport) as i64) as i32
    } else {
        0
    };
    Some(Thumb { pos, len })
}

/// Scroll offset that puts the thumb at `thumb_pos` along the track.
pub fn offset_for_thumb(thumb_pos: i32, total: i32, viewport: i32, track: i32) -> i32 {
    if total <= viewport || track <= 0 {
        return 0;
    }
    let room = track - thumb_len(total, viewport, track);
    if room <= 0 {
        return 0;
    }
    (thumb_pos.clamp(0, room) as i64 * max_offset(total, viewport) as i64 / room as i64) as i32
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Scroll {
    pub(crate) offset: i32,
    /// Cursor distance from the thumb start while the bar is dragged.
    pub(crate) drag: Option<i32>,
}

impl Scroll {
    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}

/// Layout whose content may be longer than the area showing it.
#[derive(Default)]
pub struct ScrollArea {
    pub layout: Layout,
    pub(crate) scroll: Scroll,
}

impl ScrollArea {
    pub fn new(vertical: bool, spacing: i32, select: Select) -> Self {
        Self {
            layout: Layout::new(vertical, spacing, select),
            scroll: Scroll::default(),
        }
    }

    pub fn scroll(&self) -> &Scroll {
        &self.scroll
    }
}

/// Vertical grid of equally sized tiles.
#[derive(Default)]
pub struct TileBox {
    pub layout: Layout,
    pub tile: IVec2,
    pub(crate) scroll: Scroll,
}

impl TileBox {
    pub fn new(tile: IVec2, spacing: i32, select: Select) -> Self {
        Self {
            layout: Layout::new(true, spacing, select),
            tile,
            scroll: Scroll::default(),
        }
    }

    pub fn scroll(&self) -> &Scroll {
        &self.scroll
    }

    /// Tiles per row for a grid `width` pixels wide; at least one.
    pub fn columns(&self, width: i32) -> usize {
        let stride = self.tile.x + self.layout.spacing;
        if stride <= 0 {
            return 1;
        }
        ((width + self.layout.spacing) / stride).max(1) as usize
    }

    pub fn rows(&self, width: i32) -> usize {
        self.layout.children.len().div_ceil(self.columns(width))
    }

    pub fn content_height(&self, width: i32) -> i32 {
        let rows = self.rows(width) as i32;
        (rows * self.tile.y + (rows - 1).max(0) * self.layout.spacing).max(0)
    }

    /// Tile position relative to the grid's content origin.
    pub fn tile_pos(&self, index: usize, width: i32) -> IVec2 {
        let cols = self.columns(width);
        let (row, col) = ((index / cols) as i32, (index % cols) as i32);
        IVec2::new(
            col * (self.tile.x + self.layout.spacing),
            row * (self.tile.y + self.layout.spacing),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_idempotent() {
        for (total, viewport) in [(1000, 300), (100, 300), (300, 300), (0, 0)] {
            for offset in [-50, 0, 10, 699, 700, 701, 5000] {
                let once = clamp_offset(offset, total, viewport);
                assert_eq!(clamp_offset(once, total, viewport), once);
                assert!(once >= 0 && once <= max_offset(total, viewport));
            }
        }
        assert_eq!(clamp_offset(5000, 1000, 300), 700);
        assert_eq!(clamp_offset(20, 100, 300), 0);
    }

    #[test]
    fn test_thumb_geometry() {
        assert_eq!(thumb(0, 300, 300, 300), None);
        let t = thumb(0, 1200, 300, 300).unwrap();
        assert_eq!(t, Thumb { pos: 0, len: 75 });
        let end = thumb(900, 1200, 300, 300).unwrap();
        assert_eq!(end.pos, 225);
        // a very long list keeps the thumb grabbable
        assert_eq!(thumb(0, 1_000_000, 300, 300).unwrap().len, BAR_WIDTH);
    }

    #[test]
    fn test_thumb_drag_maps_linearly() {
        // offset = thumb_px / (track - thumb) * (total - viewport)
        assert_eq!(offset_for_thumb(0, 1200, 300, 300), 0);
        assert_eq!(offset_for_thumb(225, 1200, 300, 300), 900);
        assert_eq!(offset_for_thumb(75, 1200, 300, 300), 300);
        assert_eq!(offset_for_thumb(-20, 1200, 300, 300), 0);
        assert_eq!(offset_for_thumb(400, 1200, 300, 300), 900);
        for px in 0..=225 {
            let off = offset_for_thumb(px, 1200, 300, 300);
            assert!((thumb(off, 1200, 300, 300).unwrap().pos - px).abs() <= 1);
        }
    }

    #[test]
    fn test_tile_grid() {
        let mut tb = TileBox::new(IVec2::new(100, 30), 10, Select::None);
        assert_eq!(tb.columns(330), 3);
        assert_eq!(tb.columns(320), 3);
        assert_eq!(tb.columns(319), 2);
        assert_eq!(tb.columns(5), 1);
        let mut ids = slotmap::SlotMap::<crate::WidgetId, ()>::with_key();
        tb.layout.children = (0..7).map(|_| ids.insert(())).collect();
        assert_eq!(tb.rows(330), 3);
        assert_eq!(tb.content_height(330), 3 * 30 + 2 * 10);
        assert_eq!(tb.tile_pos(4, 330), IVec2::new(110, 40));
    }
}
