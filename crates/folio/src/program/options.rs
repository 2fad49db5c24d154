//! Settings screen: what each row does once its widget reports a change.

use std::path::{Path, PathBuf};

use folio_core::{IVec2, Sink};
use folio_files::settings::{DEFAULT_FONT, DEFAULT_THEME, parse_memory};
use folio_files::{Bindings, Filter, LimitKind, ReadDirection, Settings, list_dir};
use folio_ui::{WidgetId, WidgetKind};

use super::screens::{LINE_HEIGHT, limit_text, limit_value};
use super::{Field, Msg, Program};
use crate::host::Host;

impl<S: Sink<Msg> + Clone> Program<S> {
    pub(super) fn on_option(&mut self, msg: Msg, id: WidgetId, host: &mut Host) {
        match msg {
            Msg::SetZoom => self.apply_edit(
                id,
                |sets, text| match text.trim().parse::<f32>() {
                    Ok(z) if z.is_finite() && z > 0.0 => {
                        sets.zoom = z;
                        true
                    }
                    _ => false,
                },
                |sets| sets.zoom.to_string(),
            ),
            Msg::SetSpacing => self.apply_edit(
                id,
                |sets, text| match text.trim().parse::<i32>() {
                    Ok(s) if s >= 0 => {
                        sets.spacing = s;
                        true
                    }
                    _ => false,
                },
                |sets| sets.spacing.to_string(),
            ),
            Msg::SetLimitValue => self.apply_edit(
                id,
                |sets, text| {
                    let limit = &mut sets.picture_limit;
                    match limit.kind {
                        LimitKind::Count => match text.trim().parse::<usize>() {
                            Ok(n) if n > 0 => limit.count = n,
                            _ => return false,
                        },
                        LimitKind::Size => match parse_memory(text) {
                            Some(b) if b > 0 => limit.size = b,
                            _ => return false,
                        },
                        LimitKind::None => return false,
                    }
                    true
                },
                |sets| limit_text(&sets.picture_limit),
            ),
            Msg::SetFullscreen => {
                if let Some(on) = self.check_state(id) {
                    host.shell.set_fullscreen(on);
                    self.sets.fullscreen = on;
                }
            }
            Msg::SetShowHidden => {
                if let Some(on) = self.check_state(id) {
                    self.sets.show_hidden = on;
                }
            }
            Msg::SetFont => {
                self.apply_edit(
                    id,
                    |sets, text| {
                        let text = text.trim();
                        sets.font = if text.is_empty() { DEFAULT_FONT } else { text }.to_owned();
                        true
                    },
                    |sets| sets.font.clone(),
                );
                self.apply_look(host);
            }
            Msg::SetLibrary => self.change_library(id, host),
            Msg::SetScrollSpeed => {
                self.apply_edit(
                    id,
                    |sets, text| {
                        let speeds: Vec<f32> = text
                            .split_whitespace()
                            .filter_map(|w| w.parse().ok())
                            .filter(|v: &f32| v.is_finite() && *v >= 0.0)
                            .collect();
                        match speeds[..] {
                            [v] => sets.scroll_speed = [v; 2],
                            [x, y] => sets.scroll_speed = [x, y],
                            _ => return false,
                        }
                        true
                    },
                    |sets| format!("{} {}", sets.scroll_speed[0], sets.scroll_speed[1]),
                );
                self.scene.scroll_speed = self.sets.scroll_speed;
            }
            Msg::SlideDeadzone => {
                let Some(WidgetKind::Slider(s)) = self.scene.tree().kind(id) else {
                    return;
                };
                self.sets.set_deadzone(s.value());
                self.scene.deadzone = self.sets.deadzone();
                let text = self.sets.deadzone().to_string();
                if let Some(edit) = self.sibling(id, 2) {
                    self.set_edit(edit, &text);
                }
            }
            Msg::TypeDeadzone => {
                self.apply_edit(
                    id,
                    |sets, text| match text.trim().parse::<i32>() {
                        Ok(v) => {
                            sets.set_deadzone(v);
                            true
                        }
                        Err(_) => false,
                    },
                    |sets| sets.deadzone().to_string(),
                );
                let dz = self.sets.deadzone();
                self.scene.deadzone = dz;
                if let Some(slider) = self.sibling(id, 1)
                    && let Some(WidgetKind::Slider(s)) = self.scene.tree_mut().kind_mut(slider)
                {
                    s.set_value(dz);
                }
            }
            Msg::BindingSet => self.refresh_bindings(),
            other => log::debug!("{other:?} isn't a settings message"),
        }
    }

    /// Applies the text of the edit `id` to the settings, then shows what
    /// the settings hold so rejected input is reverted.
    fn apply_edit(
        &mut self,
        id: WidgetId,
        apply: impl FnOnce(&mut Settings, &str) -> bool,
        shown: impl Fn(&Settings) -> String,
    ) {
        let Some(text) = self.edit_text(id) else {
            return;
        };
        if !apply(&mut self.sets, &text) {
            log::debug!("rejected setting value \"{text}\"");
        }
        let text = shown(&self.sets);
        self.set_edit(id, &text);
    }

    pub(super) fn edit_text(&self, id: WidgetId) -> Option<String> {
        match self.scene.tree().kind(id)? {
            WidgetKind::LabelEdit(e) => Some(e.text().to_owned()),
            _ => None,
        }
    }

    pub(super) fn set_edit(&mut self, id: WidgetId, text: &str) {
        if let Some(WidgetKind::LabelEdit(e)) = self.scene.tree_mut().kind_mut(id) {
            e.set_text(text);
        }
    }

    fn check_state(&self, id: WidgetId) -> Option<bool> {
        match self.scene.tree().kind(id)? {
            WidgetKind::CheckBox(c) => Some(c.on),
            _ => None,
        }
    }

    /// Child `idx` of the row holding `id`.
    fn sibling(&self, id: WidgetId, idx: usize) -> Option<WidgetId> {
        let tree = self.scene.tree();
        tree.child(tree.parent(id)?, idx)
    }

    /// Shows every key getter's binding again; setting one control may
    /// have taken it from another action.
    fn refresh_bindings(&mut self) {
        let tree = self.scene.tree_mut();
        let getters: Vec<WidgetId> = tree
            .ids()
            .filter(|&id| matches!(tree.kind(id), Some(WidgetKind::KeyGetter(_))))
            .collect();
        for id in getters {
            if let Some(WidgetKind::KeyGetter(k)) = tree.kind_mut(id) {
                k.refresh(&self.bindings);
            }
        }
    }

    fn change_library(&mut self, id: WidgetId, host: &mut Host) {
        let Some(text) = self.edit_text(id) else {
            return;
        };
        let dir = PathBuf::from(text.trim());
        let old = self.sets.library.clone();
        if dir == old {
            return;
        }
        if !self.sets.set_library(dir.clone()) {
            log::info!("{} isn't a directory", dir.display());
            self.set_edit(id, &old.to_string_lossy());
            self.show_message("Invalid directory.", host);
            return;
        }
        log::info!("library is now {}", dir.display());
        if worth_moving(&old, &dir) {
            self.old_library = Some(old);
            let asked = self.show_choice("Move books to the new library?", Msg::MoveBooks, Msg::ClosePopup, host);
            if asked.is_none() {
                self.old_library = None;
            }
        }
    }

    pub(super) fn open_combo(&mut self, field: Field, id: WidgetId, host: &mut Host) {
        let tree = self.scene.tree();
        let Some(WidgetKind::ComboBox(c)) = tree.kind(id) else {
            return;
        };
        let items = c
            .options()
            .iter()
            .enumerate()
            .map(|(i, o)| (o.clone(), Msg::PickCombo(field, i)))
            .collect();
        let rect = tree.rect(id);
        self.combo = Some(id);
        let at = rect.pos() + IVec2::new(0, rect.h.max(LINE_HEIGHT));
        if self.show_menu(items, at, rect.w, id, host).is_none() {
            log::warn!("option list left incomplete");
        }
    }

    pub(super) fn pick_combo(&mut self, field: Field, idx: usize, host: &mut Host) {
        self.scene.close_context();
        let Some(id) = self.combo.take() else {
            return;
        };
        let picked = match self.scene.tree_mut().kind_mut(id) {
            Some(WidgetKind::ComboBox(c)) => {
                c.set_current(idx);
                c.current_text().to_owned()
            }
            _ => return,
        };
        match field {
            Field::Direction => {
                if let Some(d) = ReadDirection::from_name(&picked) {
                    self.sets.direction = d;
                }
            }
            Field::Limit => {
                if let Some(kind) = LimitKind::from_name(&picked) {
                    self.sets.picture_limit.kind = kind;
                    let value = limit_value(&self.sets.picture_limit);
                    if let Some(slot) = self.sibling(id, 2) {
                        self.scene.tree_mut().replace(slot, value);
                    }
                }
            }
            Field::Theme => {
                self.sets.set_theme(&picked, &self.themes);
                host.ds.use_palette(self.fs.load_palette(&self.sets.theme));
            }
        }
    }

    /// Back to defaults, except for the library and its books.
    pub(super) fn reset_settings(&mut self, host: &mut Host) {
        log::info!("settings reset");
        let library = std::mem::take(&mut self.sets.library);
        self.sets = Settings::new(self.fs.dir());
        self.sets.set_theme(DEFAULT_THEME, &self.themes);
        self.sets.library = library;
        self.bindings = Bindings::default();
        if host.shell.is_fullscreen() != self.sets.fullscreen {
            host.shell.set_fullscreen(self.sets.fullscreen);
        }
        self.scene.scroll_speed = self.sets.scroll_speed;
        self.scene.deadzone = self.sets.deadzone();
        self.apply_look(host);
        self.show_settings(host);
    }
}

/// Whether books in `old` can go to `new`: something to move and neither
/// directory inside the other.
fn worth_moving(old: &Path, new: &Path) -> bool {
    old.is_dir()
        && !list_dir(old, Filter::All, true).is_empty()
        && !old.starts_with(new)
        && !new.starts_with(old)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{fill, temp_dir};

    #[test]
    fn test_worth_moving_needs_books_and_separate_dirs() {
        let root = temp_dir("worth");
        let old = fill(&root, "old", &["a.png"]);
        let new = fill(&root, "new", &[]);
        let empty = fill(&root, "empty", &[]);
        assert!(worth_moving(&old, &new));
        assert!(!worth_moving(&empty, &new));
        assert!(!worth_moving(&old, &old.join("inner")));
        assert!(!worth_moving(&old, &root));
    }
}
