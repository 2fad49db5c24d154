//! Turning the tree into draw commands.
//!
//! Only children in a container's visible range are visited, and every
//! command carries the frame it must be clipped to.

use folio_core::{DrawList, DrawSys, IVec2, Rect, ThemeColor};

use crate::WidgetId;
use crate::tree::Tree;
use crate::widget::{Align, CARET_WIDTH, ICON_MARGIN, Label, SLIDER_WIDTH, TEXT_MARGIN, WidgetKind};

pub(crate) struct DrawState {
    pub select: Option<WidgetId>,
    pub capture: Option<WidgetId>,
}

impl<M> Tree<M> {
    pub fn free_garbage(&mut self, ds: &mut dyn DrawSys) {
        for tex in self.take_garbage() {
            ds.free_texture(tex);
        }
    }

    /// Renders the text of visible labels whose text changed or whose
    /// height differs from the one their texture was made for.
    pub fn refresh_text(&mut self, root: WidgetId, ds: &mut dyn DrawSys) {
        let mut jobs = Vec::new();
        self.collect_stale(root, &mut jobs);
        for (id, h) in jobs {
            let Some(l) = self.label_mut(id) else {
                continue;
            };
            if let Some(old) = l.text_tex.take() {
                ds.free_texture(old);
            }
            l.text_tex = if h > 0 { ds.render_text(l.text(), h) } else { None };
            l.tex_height = h;
            l.stale = false;
        }
    }

    fn collect_stale(&self, id: WidgetId, jobs: &mut Vec<(WidgetId, i32)>) {
        let Some(kind) = self.kind(id) else {
            return;
        };
        if let Some(l) = kind.label() {
            let h = self.rect(id).h;
            if l.stale || l.tex_height != h {
                jobs.push((id, h));
            }
        }
        if let Some(layout) = kind.layout() {
            for i in self.visible_range(id) {
                if let Some(&c) = layout.children().get(i) {
                    self.collect_stale(c, jobs);
                }
            }
        }
    }

    /// Background for a clickable widget: highlighted when it holds the
    /// keyboard selection, lighter when its layout has it selected.
    fn button_color(&self, id: WidgetId, st: &DrawState) -> ThemeColor {
        if st.select == Some(id) {
            ThemeColor::Select
        } else if self
            .parent(id)
            .and_then(|p| self.layout(p))
            .is_some_and(|l| l.is_selected(id))
        {
            ThemeColor::Light
        } else {
            ThemeColor::Normal
        }
    }

    /// Draws a layer root over its own background.
    pub(crate) fn draw_panel(&self, id: WidgetId, ds: &dyn DrawSys, st: &DrawState, out: &mut DrawList) {
        let rect = self.rect(id);
        out.rect(rect, rect, ThemeColor::Normal);
        self.draw_widget(id, ds, st, out);
    }

    pub(crate) fn draw_widget(&self, id: WidgetId, ds: &dyn DrawSys, st: &DrawState, out: &mut DrawList) {
        let Some(kind) = self.kind(id) else {
            return;
        };
        let rect = self.rect(id);
        let frame = rect.intersect(&self.frame(id));
        if frame.is_empty() {
            return;
        }
        match kind {
            WidgetKind::Spacer => {}
            WidgetKind::Picture(p) => {
                if p.show_bg {
                    out.rect(rect, frame, ThemeColor::Dark);
                }
                out.texture(p.tex, rect.inset(p.margin), frame, None);
            }
            WidgetKind::Button(b) => {
                out.rect(rect, frame, self.button_color(id, st));
                out.texture(b.icon.tex, rect.inset(b.icon.margin), frame, None);
            }
            WidgetKind::CheckBox(c) => {
                out.rect(rect, frame, self.button_color(id, st));
                let tick = if c.on { ThemeColor::Light } else { ThemeColor::Dark };
                out.rect(rect.inset(rect.w.min(rect.h) / 4), frame, tick);
            }
            WidgetKind::Slider(s) => {
                out.rect(rect, frame, self.button_color(id, st));
                let bar = Rect::new(rect.x + rect.h / 4, rect.y + rect.h / 4, rect.w - rect.h / 2, rect.h / 2);
                out.rect(bar, frame, ThemeColor::Dark);
                let hx = s.handle_x(rect.x, rect.w, rect.h);
                out.rect(Rect::new(hx, rect.y, SLIDER_WIDTH, rect.h), frame, ThemeColor::Light);
            }
            WidgetKind::ProgressBar(p) => {
                out.rect(rect, frame, ThemeColor::Dark);
                let filled = (rect.w as f32 * p.fraction()).round() as i32;
                out.rect(Rect::new(rect.x, rect.y, filled, rect.h), frame, ThemeColor::Light);
            }
            WidgetKind::Label(l) => self.draw_label(id, l, rect, frame, 0, ds, st, out),
            WidgetKind::ComboBox(c) => self.draw_label(id, &c.label, rect, frame, 0, ds, st, out),
            WidgetKind::KeyGetter(k) => self.draw_label(id, &k.label, rect, frame, 0, ds, st, out),
            WidgetKind::LabelEdit(e) => {
                let editing = st.capture == Some(id);
                let ofs = if editing { e.text_ofs } else { 0 };
                self.draw_label(id, &e.label, rect, frame, ofs, ds, st, out);
                if editing {
                    let x = rect.x + TEXT_MARGIN + e.text_ofs + e.caret_px;
                    out.rect(Rect::new(x, rect.y, CARET_WIDTH, rect.h), frame, ThemeColor::Light);
                }
            }
            WidgetKind::Layout(_) => self.draw_children(id, ds, st, out),
            WidgetKind::ScrollArea(_) | WidgetKind::TileBox(_) | WidgetKind::ReaderBox(_) => {
                self.draw_children(id, ds, st, out);
                if let Some((bar, thumb)) = self.bar_rects(id) {
                    out.rect(bar, frame, ThemeColor::Dark);
                    out.rect(thumb, frame, ThemeColor::Light);
                }
            }
        }
    }

    fn draw_children(&self, id: WidgetId, ds: &dyn DrawSys, st: &DrawState, out: &mut DrawList) {
        let children = self.children(id);
        for i in self.visible_range(id) {
            if let Some(&c) = children.get(i) {
                self.draw_widget(c, ds, st, out);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_label(
        &self,
        id: WidgetId,
        l: &Label<M>,
        rect: Rect,
        frame: Rect,
        ofs: i32,
        ds: &dyn DrawSys,
        st: &DrawState,
        out: &mut DrawList,
    ) {
        out.rect(rect, frame, self.button_color(id, st));
        let mut icon_w = 0;
        if l.icon.is_some() {
            let side = rect.h - 2 * ICON_MARGIN;
            out.texture(
                l.icon,
                Rect::new(rect.x + ICON_MARGIN, rect.y + ICON_MARGIN, side, side),
                frame,
                None,
            );
            icon_w = rect.h;
        }
        let Some(tex) = l.text_tex else {
            return;
        };
        let size = ds.texture_size(tex).unwrap_or(IVec2::ZERO);
        let left = rect.x + icon_w + TEXT_MARGIN;
        let x = match l.align {
            Align::Left => left + ofs,
            Align::Center => rect.x + icon_w + (rect.w - icon_w - size.x) / 2,
            Align::Right => rect.end().x - TEXT_MARGIN - size.x,
        };
        let text_frame = Rect::new(left, rect.y, rect.w - icon_w - 2 * TEXT_MARGIN, rect.h).intersect(&frame);
        out.texture(
            Some(tex),
            Rect::new(x, rect.y + (rect.h - size.y) / 2, size.x, size.y),
            text_frame,
            Some(ThemeColor::Text),
        );
    }
}

#[cfg(test)]
mod tests {
    use folio_core::{DrawCmd, Headless};

    use super::*;
    use crate::layout::{Layout, Select};
    use crate::scroll::ScrollArea;
    use crate::widget::Calls;

    fn st() -> DrawState {
        DrawState {
            select: None,
            capture: None,
        }
    }

    #[test]
    fn test_only_visible_children_draw() {
        let mut ds = Headless::default();
        let mut t: Tree<()> = Tree::new();
        let root = t.add_root(WidgetKind::ScrollArea(ScrollArea::new(true, 0, Select::None)));
        t.set_root_rect(root, Rect::new(0, 0, 100, 50));
        for i in 0..100 {
            t.push(root, 10, WidgetKind::Label(Label::new(format!("item {i}"), Calls::default())));
        }
        t.refresh_text(root, &mut ds);
        // five rows, each one background plus one text texture
        assert_eq!(ds.live_textures(), 5);
        let mut out = DrawList::new();
        t.draw_widget(root, &ds, &st(), &mut out);
        let textures = out.cmds.iter().filter(|c| matches!(c, DrawCmd::Texture { .. })).count();
        assert_eq!(textures, 5);
    }

    #[test]
    fn test_text_rerenders_on_change() {
        let mut ds = Headless::default();
        let mut t: Tree<()> = Tree::new();
        let root = t.add_root(WidgetKind::Layout(Layout::vertical(0)));
        t.set_root_rect(root, Rect::new(0, 0, 100, 20));
        let l = t.push(root, 1.0, WidgetKind::Label(Label::new("a", Calls::default()))).unwrap();
        t.refresh_text(root, &mut ds);
        let first = t.label(l).unwrap().text_texture();
        t.refresh_text(root, &mut ds);
        assert_eq!(t.label(l).unwrap().text_texture(), first);

        t.set_text(l, "bb");
        t.refresh_text(root, &mut ds);
        assert_ne!(t.label(l).unwrap().text_texture(), first);
        assert_eq!(ds.live_textures(), 1);

        t.remove(l);
        t.free_garbage(&mut ds);
        assert_eq!(ds.live_textures(), 0);
    }

    #[test]
    fn test_commands_are_clipped_to_frames() {
        let ds = Headless::default();
        let mut t: Tree<()> = Tree::new();
        let root = t.add_root(WidgetKind::ScrollArea(ScrollArea::new(true, 0, Select::None)));
        t.set_root_rect(root, Rect::new(0, 0, 100, 50));
        for _ in 0..10 {
            t.push(root, 20, WidgetKind::Spacer);
        }
        t.push(root, 20, WidgetKind::ProgressBar(crate::widget::ProgressBar::new(1, 0, 2)));
        t.set_scroll(root, 1000);
        let mut out = DrawList::new();
        t.draw_widget(root, &ds, &st(), &mut out);
        for cmd in &out.cmds {
            if let DrawCmd::Rect { frame, .. } = cmd {
                assert!(Rect::new(0, 0, 100, 50).intersect(frame) == *frame);
            }
        }
        assert!(!out.is_empty());
    }
}
