//! Which pictures of a directory the reader holds at once.

use std::ops::Range;
use std::path::Path;

use folio_files::{Action, LimitKind, PictureLimit, ReadDirection};

/// Pictures starting at `from` when going `forward`, else ending right
/// before it, as many as `limit` allows. A batch never comes out empty while
/// there is a picture in that direction, even one above the size limit.
pub fn batch(len: usize, from: usize, forward: bool, limit: PictureLimit, size_of: impl Fn(usize) -> u64) -> Range<usize> {
    let from = from.min(len);
    let mut bytes = 0u64;
    let mut take = |i: usize, taken: usize| match limit.kind {
        LimitKind::None => true,
        LimitKind::Count => taken < limit.count.max(1),
        LimitKind::Size => {
            bytes = bytes.saturating_add(size_of(i));
            taken == 0 || bytes <= limit.size
        }
    };
    if forward {
        let mut end = from;
        while end < len && take(end, end - from) {
            end += 1;
        }
        from..end
    } else {
        let mut start = from;
        while start > 0 && take(start - 1, from - start) {
            start -= 1;
        }
        start..from
    }
}

pub fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map_or(0, |m| m.len())
}

/// Whether a directional action pages forward (`Some(true)`), back, or not
/// at all in `direction`.
pub fn page_step(direction: ReadDirection, action: Action) -> Option<bool> {
    use Action::{Down, Left, Right, Up};
    match (direction, action) {
        (ReadDirection::TopToBottom, Down)
        | (ReadDirection::LeftToRight, Right)
        | (ReadDirection::RightToLeft, Left) => Some(true),
        (ReadDirection::TopToBottom, Up)
        | (ReadDirection::LeftToRight, Left)
        | (ReadDirection::RightToLeft, Right) => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(kind: LimitKind, count: usize, size: u64) -> PictureLimit {
        PictureLimit { kind, count, size }
    }

    #[test]
    fn test_count_limit() {
        let l = limit(LimitKind::Count, 2, 0);
        assert_eq!(batch(5, 0, true, l, |_| 1), 0..2);
        assert_eq!(batch(5, 4, true, l, |_| 1), 4..5);
        assert_eq!(batch(5, 2, false, l, |_| 1), 0..2);
        assert_eq!(batch(5, 5, false, l, |_| 1), 3..5);
        assert_eq!(batch(5, 5, true, l, |_| 1), 5..5);
        assert_eq!(batch(0, 0, true, l, |_| 1), 0..0);
    }

    #[test]
    fn test_size_limit_keeps_one_picture() {
        let sizes = [10, 30, 5, 100, 1];
        let l = limit(LimitKind::Size, 0, 40);
        assert_eq!(batch(5, 0, true, l, |i| sizes[i]), 0..2);
        assert_eq!(batch(5, 2, true, l, |i| sizes[i]), 2..3);
        assert_eq!(batch(5, 3, true, l, |i| sizes[i]), 3..4);
        assert_eq!(batch(5, 3, false, l, |i| sizes[i]), 1..3);
    }

    #[test]
    fn test_no_limit_takes_rest() {
        let l = limit(LimitKind::None, 1, 1);
        assert_eq!(batch(4, 1, true, l, |_| 1000), 1..4);
        assert_eq!(batch(4, 1, false, l, |_| 1000), 0..1);
    }

    #[test]
    fn test_page_step_follows_direction() {
        use ReadDirection::*;
        assert_eq!(page_step(TopToBottom, Action::Down), Some(true));
        assert_eq!(page_step(TopToBottom, Action::Right), None);
        assert_eq!(page_step(LeftToRight, Action::Left), Some(false));
        assert_eq!(page_step(RightToLeft, Action::Left), Some(true));
        assert_eq!(page_step(RightToLeft, Action::ZoomIn), None);
    }
}
