//! Click counting and wheel accumulation, kept apart from the event loop so
//! they can be driven with made-up timestamps.

use std::time::Duration;

use folio_core::{IVec2, MouseButton};
use web_time::Instant;

pub const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
/// How far the second press may land from the first one.
pub const DOUBLE_CLICK_DISTANCE: i32 = 4;
/// Pixels of a precise scroll worth one wheel notch.
pub const PIXELS_PER_NOTCH: f64 = 40.0;

#[derive(Clone, Copy, Debug)]
struct Press {
    button: MouseButton,
    at: Instant,
    pos: IVec2,
}

/// Counts consecutive presses of one button close in time and place.
#[derive(Debug, Default)]
pub struct ClickCounter {
    last: Option<Press>,
    count: u32,
}

impl ClickCounter {
    /// Registers a press and returns its click count.
    pub fn press(&mut self, button: MouseButton, pos: IVec2, at: Instant) -> u32 {
        let chained = self.last.is_some_and(|p| {
            let d = pos - p.pos;
            p.button == button
                && at.saturating_duration_since(p.at) <= DOUBLE_CLICK_TIME
                && d.x.abs() <= DOUBLE_CLICK_DISTANCE
                && d.y.abs() <= DOUBLE_CLICK_DISTANCE
        });
        self.count = if chained { self.count + 1 } else { 1 };
        self.last = Some(Press { button, at, pos });
        self.count
    }

    /// Count of the latest press of `button`, for its release.
    pub fn count(&self, button: MouseButton) -> u32 {
        match self.last {
            Some(p) if p.button == button => self.count,
            _ => 1,
        }
    }
}

/// Turns fractional wheel deltas into whole notches.
#[derive(Debug, Default)]
pub struct WheelAccum {
    rem: [f64; 2],
}

impl WheelAccum {
    pub fn lines(&mut self, x: f32, y: f32) -> IVec2 {
        self.add(x as f64, y as f64)
    }

    pub fn pixels(&mut self, x: f64, y: f64) -> IVec2 {
        self.add(x / PIXELS_PER_NOTCH, y / PIXELS_PER_NOTCH)
    }

    fn add(&mut self, x: f64, y: f64) -> IVec2 {
        let mut out = [0; 2];
        for (i, v) in [x, y].into_iter().enumerate() {
            let total = self.rem[i] + v;
            out[i] = total.trunc() as i32;
            self.rem[i] = total - out[i] as f64;
        }
        IVec2::new(out[0], out[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_second_press_is_double() {
        let mut c = ClickCounter::default();
        let t = Instant::now();
        let pos = IVec2::new(10, 10);
        assert_eq!(c.press(MouseButton::Left, pos, t), 1);
        let t2 = t + Duration::from_millis(200);
        assert_eq!(c.press(MouseButton::Left, pos + IVec2::new(2, -1), t2), 2);
        assert_eq!(c.count(MouseButton::Left), 2);
        assert_eq!(c.count(MouseButton::Right), 1);
    }

    #[test]
    fn test_slow_or_far_press_restarts() {
        let mut c = ClickCounter::default();
        let t = Instant::now();
        let pos = IVec2::new(10, 10);
        c.press(MouseButton::Left, pos, t);
        assert_eq!(c.press(MouseButton::Left, pos, t + Duration::from_millis(800)), 1);
        let t3 = t + Duration::from_millis(900);
        assert_eq!(c.press(MouseButton::Left, pos + IVec2::new(20, 0), t3), 1);
        let t4 = t + Duration::from_millis(950);
        assert_eq!(c.press(MouseButton::Right, pos + IVec2::new(20, 0), t4), 1);
    }

    #[test]
    fn test_wheel_pixels_accumulate() {
        let mut w = WheelAccum::default();
        assert_eq!(w.pixels(0.0, 30.0), IVec2::ZERO);
        assert_eq!(w.pixels(0.0, 30.0), IVec2::new(0, 1));
        assert_eq!(w.pixels(0.0, -60.0), IVec2::new(0, -1));
        assert_eq!(w.lines(1.0, 2.0), IVec2::new(1, 2));
    }
}
