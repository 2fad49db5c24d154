use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Integer pixel vector, used for both positions and sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IVec2 {
    pub x: i32,
    pub y: i32,
}

impl IVec2 {
    pub const ZERO: IVec2 = IVec2 { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: i32) -> Self {
        Self { x: v, y: v }
    }

    /// Component along a layout axis: `x` when horizontal, `y` otherwise.
    pub fn along(self, horizontal: bool) -> i32 {
        if horizontal { self.x } else { self.y }
    }

    pub fn across(self, horizontal: bool) -> i32 {
        if horizontal { self.y } else { self.x }
    }

    /// Builds a vector from an axis component and a cross component.
    pub fn from_axis(horizontal: bool, along: i32, across: i32) -> Self {
        if horizontal {
            Self::new(along, across)
        } else {
            Self::new(across, along)
        }
    }

    pub fn length(self) -> f32 {
        ((self.x as f32).powi(2) + (self.y as f32).powi(2)).sqrt()
    }

    pub fn has_zero(self) -> bool {
        self.x == 0 || self.y == 0
    }
}

impl Add for IVec2 {
    type Output = IVec2;
    fn add(self, o: IVec2) -> IVec2 {
        IVec2::new(self.x + o.x, self.y + o.y)
    }
}

impl AddAssign for IVec2 {
    fn add_assign(&mut self, o: IVec2) {
        self.x += o.x;
        self.y += o.y;
    }
}

impl Sub for IVec2 {
    type Output = IVec2;
    fn sub(self, o: IVec2) -> IVec2 {
        IVec2::new(self.x - o.x, self.y - o.y)
    }
}

impl SubAssign for IVec2 {
    fn sub_assign(&mut self, o: IVec2) {
        self.x -= o.x;
        self.y -= o.y;
    }
}

impl Neg for IVec2 {
    type Output = IVec2;
    fn neg(self) -> IVec2 {
        IVec2::new(-self.x, -self.y)
    }
}

impl Mul<i32> for IVec2 {
    type Output = IVec2;
    fn mul(self, s: i32) -> IVec2 {
        IVec2::new(self.x * s, self.y * s)
    }
}

impl Div<i32> for IVec2 {
    type Output = IVec2;
    fn div(self, s: i32) -> IVec2 {
        IVec2::new(self.x / s, self.y / s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Amounts cut off each side of a rect by [`Rect::crop`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Crop {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Crop {
    pub fn is_none(&self) -> bool {
        self.left == 0 && self.top == 0 && self.right == 0 && self.bottom == 0
    }
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_parts(pos: IVec2, size: IVec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    pub fn pos(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.w, self.h)
    }

    /// Exclusive bottom-right corner.
    pub fn end(&self) -> IVec2 {
        IVec2::new(self.x + self.w, self.y + self.h)
    }

    pub fn center(&self) -> IVec2 {
        IVec2::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Half-open containment; empty rects contain nothing.
    pub fn contains(&self, p: IVec2) -> bool {
        !self.is_empty() && p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    pub fn overlaps(&self, o: &Rect) -> bool {
        !self.intersect(o).is_empty()
    }

    /// Overlapping area of both rects, zero-sized when they are disjoint.
    pub fn intersect(&self, o: &Rect) -> Rect {
        let x0 = self.x.max(o.x);
        let y0 = self.y.max(o.y);
        let x1 = (self.x + self.w).min(o.x + o.w);
        let y1 = (self.y + self.h).min(o.y + o.h);
        if x1 <= x0 || y1 <= y0 {
            Rect::new(x0, y0, 0, 0)
        } else {
            Rect::new(x0, y0, x1 - x0, y1 - y0)
        }
    }

    /// Clips `self` to `frame` and reports how much was removed from each side.
    pub fn crop(&self, frame: &Rect) -> (Rect, Crop) {
        let out = self.intersect(frame);
        if out.is_empty() {
            return (
                out,
                Crop {
                    left: self.w,
                    top: self.h,
                    right: 0,
                    bottom: 0,
                },
            );
        }
        let crop = Crop {
            left: out.x - self.x,
            top: out.y - self.y,
            right: self.end().x - out.end().x,
            bottom: self.end().y - out.end().y,
        };
        (out, crop)
    }

    pub fn translate(&self, d: IVec2) -> Rect {
        Rect::new(self.x + d.x, self.y + d.y, self.w, self.h)
    }

    pub fn inset(&self, margin: i32) -> Rect {
        Rect::new(
            self.x + margin,
            self.y + margin,
            (self.w - margin * 2).max(0),
            (self.h - margin * 2).max(0),
        )
    }
}
