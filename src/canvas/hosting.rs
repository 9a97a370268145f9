//! Hosting floaters as tabs: docking in, tearing off, tab selection and the
//! tab strip.

use crate::constants::TEAR_OFF_OFFSET;
use crate::floater::{Capabilities, Floater, FloaterId};
use crate::geometry::{Point, Rect};
use crate::host::{HostedSnapshot, InsertionPoint, ScrollDirection};

use super::WindowCanvas;

impl WindowCanvas {
    /// Area hosted floaters occupy: below the header and the tab strip,
    /// inside the border.
    pub fn host_content_rect(&self, host: FloaterId) -> Option<Rect> {
        let rect = self.floaters.get(host).filter(|f| f.is_host())?.rect;
        let c = &self.config;
        Some(Rect::new(
            rect.left + c.host_border,
            rect.top + c.header_height + c.tab_height,
            rect.right - c.host_border,
            rect.bottom - c.host_border,
        ))
    }

    pub fn tab_strip_rect(&self, host: FloaterId) -> Option<Rect> {
        let rect = self.floaters.get(host).filter(|f| f.is_host())?.rect;
        let c = &self.config;
        Some(Rect::new(
            rect.left + c.host_border,
            rect.top + c.header_height,
            rect.right - c.host_border,
            rect.top + c.header_height + c.tab_height,
        ))
    }

    /// Tab label rects in canvas coordinates, shifted by the strip's scroll
    /// offset. Labels may extend past the strip.
    pub fn tab_rects(&self, host: FloaterId) -> Vec<(FloaterId, Rect)> {
        let Some(strip) = self.tab_strip_rect(host) else {
            return Vec::new();
        };
        let Some(tabs) = self.floaters.get(host).and_then(Floater::tabbed_host) else {
            return Vec::new();
        };
        let width = self.config.tab_width;
        let start = strip.left - tabs.scroll_offset();
        tabs.tabs()
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let left = start + i as i32 * width;
                (*id, Rect::new(left, strip.top, left + width, strip.bottom))
            })
            .collect()
    }

    /// Size a host needs to show a floater of the given size.
    fn host_size_for(&self, width: i32, height: i32) -> (i32, i32) {
        let c = &self.config;
        (
            width + 2 * c.host_border,
            height + c.header_height + c.tab_height + c.host_border,
        )
    }

    /// Docks `id` into `host` as a tab, taking it off the canvas (or out of
    /// another host). While hosted the floater gives up resizing,
    /// minimizing and dragging; the host grows to fit it.
    pub fn add_hosted(
        &mut self,
        host: FloaterId,
        id: FloaterId,
        select_added: bool,
        insertion: InsertionPoint,
    ) -> bool {
        if host == id || !self.floaters.get(host).is_some_and(Floater::is_host) {
            return false;
        }
        let Some(floater) = self.floaters.get(id) else {
            return false;
        };
        if floater.is_host() || floater.is_modal_dialog() {
            return false;
        }
        if self.live_host(id) == Some(host) {
            if select_added {
                self.show_hosted(host, id);
            }
            return true;
        }
        if let Some(previous) = self.live_host(id) {
            self.remove_hosted(previous, id);
        }

        self.set_minimized(id, false);
        self.z_order.retain(|f| *f != id);
        if self.drag.is_some_and(|d| d.floater == id) {
            self.end_drag();
        }

        let Some(floater) = self.floaters.get_mut(id) else {
            return false;
        };
        let snapshot = HostedSnapshot {
            width: floater.rect.width(),
            height: floater.rect.height(),
            capabilities: floater.capabilities,
        };
        floater.set_capability(Capabilities::HOST_STRIPPED, false);
        self.set_host(id, Some(host));

        let (need_width, need_height) = self.host_size_for(snapshot.width, snapshot.height);
        if let Some(host_rect) = self.floaters.get(host).map(|h| h.rect) {
            let grown = host_rect.with_size(
                host_rect.width().max(need_width),
                host_rect.height().max(need_height),
            );
            if grown != host_rect {
                self.set_floater_rect(host, grown);
            }
        }

        if let Some(tabs) = self.floaters.get_mut(host).and_then(Floater::tabbed_host_mut) {
            tabs.insert(id, snapshot, insertion);
            if select_added {
                tabs.select(id);
            }
        }
        self.layout_hosted(host, false);
        if select_added {
            self.show_hosted(host, id);
        }
        tracing::debug!(floater = ?id, host = ?host, "floater hosted");
        true
    }

    /// Undocks a tab, restoring what it gave up when it was hosted. The
    /// floater ends up detached and hidden.
    pub fn remove_hosted(&mut self, host: FloaterId, id: FloaterId) {
        let Some(snapshot) = self
            .floaters
            .get_mut(host)
            .and_then(Floater::tabbed_host_mut)
            .and_then(|tabs| tabs.remove(id))
        else {
            return;
        };

        self.release_focus(id);
        if self.drag.is_some_and(|d| d.floater == id) {
            self.end_drag();
        }
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.capabilities = snapshot.capabilities;
            if !snapshot.capabilities.contains(Capabilities::RESIZE) {
                floater.rect = floater.rect.with_size(snapshot.width, snapshot.height);
            }
            floater.enable_resize_ctrls(floater.is_resizable() && !floater.minimized);
            floater.visible = false;
        }
        self.set_host(id, None);
        if let Some(rect) = self.floaters.get(id).map(|f| f.rect) {
            self.set_floater_rect(id, rect);
        }

        if self
            .floaters
            .get(host)
            .and_then(Floater::tabbed_host)
            .is_some_and(|tabs| tabs.auto_resize())
        {
            self.fit_host_to_tabs(host);
        }
        self.layout_hosted(host, false);
        tracing::debug!(floater = ?id, host = ?host, "floater unhosted");
    }

    /// Resizes an auto-resizing host to its largest tab, keeping its
    /// top-left corner in place.
    fn fit_host_to_tabs(&mut self, host: FloaterId) {
        let Some(tabs) = self.floaters.get(host).and_then(Floater::tabbed_host) else {
            return;
        };
        let largest = tabs
            .tabs()
            .iter()
            .filter_map(|t| self.floaters.get(*t))
            .fold(None, |acc: Option<(i32, i32)>, f| {
                let (w, h) = (f.rect.width(), f.rect.height());
                Some(acc.map_or((w, h), |(aw, ah)| (aw.max(w), ah.max(h))))
            });
        let Some((width, height)) = largest else {
            return;
        };
        let (need_width, need_height) = self.host_size_for(width, height);
        if let Some(rect) = self.floaters.get(host).map(|h| h.rect) {
            self.set_floater_rect(host, rect.with_size(need_width, need_height));
        }
    }

    /// Closes every tab. Returns `true` only when none is left, i.e. no tab
    /// refused.
    pub fn close_all_hosted(&mut self, host: FloaterId) -> bool {
        let tabs: Vec<FloaterId> = match self.floaters.get(host).and_then(Floater::tabbed_host) {
            Some(tabs) => tabs.tabs().to_vec(),
            None => return true,
        };
        for tab in tabs {
            self.close_floater(tab);
        }
        self.floaters
            .get(host)
            .and_then(Floater::tabbed_host)
            .is_none_or(|tabs| tabs.tab_count() == 0)
    }

    /// Tears a hosted floater off onto the canvas next to its host, or docks
    /// a torn-off floater back into the host it came from.
    pub fn tear_off(&mut self, id: FloaterId) {
        let Some(floater) = self.floaters.get(id) else {
            return;
        };
        if let Some(host) = self.live_host(id) {
            if !floater.can_tear_off() {
                return;
            }
            let saved = floater
                .persist_key
                .as_deref()
                .and_then(|key| self.store.as_deref().and_then(|s| s.get_rect(key)));
            let Some(host_rect) = self.floaters.get(host).map(|h| h.rect) else {
                return;
            };
            self.remove_hosted(host, id);
            self.z_order.insert(0, id);

            let origin = saved.map_or_else(
                || {
                    Point::new(
                        host_rect.left + TEAR_OFF_OFFSET,
                        host_rect.top + self.config.header_height + TEAR_OFF_OFFSET,
                    )
                },
                |r| r.origin(),
            );
            if let Some(rect) = self.floaters.get(id).map(|f| f.rect) {
                self.set_floater_rect(id, rect.with_origin(origin.x, origin.y));
            }
            if let Some(floater) = self.floaters.get_mut(id) {
                floater.torn_off = true;
                floater.has_rect = true;
                floater.visible = true;
                floater.sync_buttons_with_capabilities();
            }
            self.adjust_to_fit_screen(id, false);
            self.bring_to_front(id, true);
            tracing::debug!(floater = ?id, host = ?host, "floater torn off");
        } else if floater.torn_off
            && let Some(last) = floater.last_host
            && self.floaters.get(last).is_some_and(Floater::is_host)
        {
            self.store_rect(id);
            if self.add_hosted(last, id, true, InsertionPoint::End) {
                self.open_floater(last);
                self.set_floater_focus(id, true);
                tracing::debug!(floater = ?id, host = ?last, "floater docked back");
            }
        }
    }

    /// Makes `id` the visible tab of `host`.
    pub fn show_hosted(&mut self, host: FloaterId, id: FloaterId) {
        let Some(tabs) = self.floaters.get_mut(host).and_then(Floater::tabbed_host_mut) else {
            return;
        };
        if !tabs.select(id) {
            return;
        }
        let index = tabs.tabs().iter().position(|t| *t == id).unwrap_or(0) as i32;
        let hidden: Vec<FloaterId> = tabs.tabs().iter().copied().filter(|t| *t != id).collect();

        if let Some(strip) = self.tab_strip_rect(host) {
            let width = self.config.tab_width;
            let max_offset = self.max_tab_scroll(host);
            if let Some(tabs) = self.floaters.get_mut(host).and_then(Floater::tabbed_host_mut) {
                let left = index * width;
                let offset = tabs.scroll_offset();
                if left < offset {
                    tabs.scroll_by(left - offset, max_offset);
                } else if left + width > offset + strip.width() {
                    tabs.scroll_by(left + width - offset - strip.width(), max_offset);
                }
            }
        }

        for tab in hidden {
            if self.has_focus(tab) {
                self.release_focus(tab);
            }
        }
        self.layout_hosted(host, false);
    }

    /// Selects a tab and focuses it.
    pub fn select_tab(&mut self, host: FloaterId, id: FloaterId) {
        if self.live_host(id) != Some(host) {
            return;
        }
        self.show_hosted(host, id);
        self.set_floater_focus(id, true);
    }

    pub fn cycle_tab(&mut self, host: FloaterId, forward: bool) {
        let next = self
            .floaters
            .get(host)
            .and_then(Floater::tabbed_host)
            .and_then(|tabs| tabs.neighbor_of_active(if forward { 1 } else { -1 }));
        if let Some(next) = next {
            self.select_tab(host, next);
        }
    }

    /// Places every tab in the content area and shows only the active one.
    /// With `resize_tabs`, tabs that were resizable before hosting are
    /// stretched to fill it.
    pub(crate) fn layout_hosted(&mut self, host: FloaterId, resize_tabs: bool) {
        let Some(content) = self.host_content_rect(host) else {
            return;
        };
        let Some(host_floater) = self.floaters.get(host) else {
            return;
        };
        let host_visible = host_floater.visible;
        let Some(tabs) = host_floater.tabbed_host() else {
            return;
        };
        let active = tabs.active();
        let entries: Vec<(FloaterId, bool)> = tabs
            .tabs()
            .iter()
            .map(|t| {
                let resizable = tabs
                    .snapshot(*t)
                    .is_some_and(|s| s.capabilities.contains(Capabilities::RESIZE));
                (*t, resizable)
            })
            .collect();

        for (tab, resizable) in entries {
            let Some(rect) = self.floaters.get(tab).map(|f| f.rect) else {
                continue;
            };
            let placed = if resize_tabs && resizable {
                content
            } else {
                rect.with_origin(content.left, content.top)
            };
            if placed != rect {
                self.set_floater_rect(tab, placed);
            }
            if let Some(floater) = self.floaters.get_mut(tab) {
                floater.visible = host_visible && active == Some(tab);
            }
        }
    }

    fn max_tab_scroll(&self, host: FloaterId) -> i32 {
        let Some(strip) = self.tab_strip_rect(host) else {
            return 0;
        };
        let count = self
            .floaters
            .get(host)
            .and_then(Floater::tabbed_host)
            .map_or(0, |tabs| tabs.tab_count() as i32);
        (count * self.config.tab_width - strip.width()).max(0)
    }

    /// Starts or stops tab-strip auto-scroll depending on whether a dragged
    /// tab is held past either end of the strip.
    pub(crate) fn update_tab_autoscroll(&mut self, host: FloaterId, pointer: Point) {
        let Some(strip) = self.tab_strip_rect(host) else {
            return;
        };
        let config = &self.config;
        let Some(tabs) = self.floaters.get_mut(host).and_then(Floater::tabbed_host_mut) else {
            return;
        };
        let scroll = tabs.autoscroll_mut();
        if pointer.x < strip.left {
            scroll.start(ScrollDirection::Backward, config);
        } else if pointer.x >= strip.right {
            scroll.start(ScrollDirection::Forward, config);
        } else {
            scroll.stop();
        }
    }

    /// Advances every active tab-strip auto-scroll by one frame.
    pub(crate) fn tick_autoscroll(&mut self) {
        let hosts: Vec<FloaterId> = self
            .floaters
            .iter()
            .filter(|(_, f)| f.tabbed_host().is_some_and(|t| t.autoscroll_active()))
            .map(|(id, _)| id)
            .collect();
        for host in hosts {
            let max_offset = self.max_tab_scroll(host);
            let config = &self.config;
            if let Some(tabs) = self.floaters.get_mut(host).and_then(Floater::tabbed_host_mut) {
                let delta = tabs.autoscroll_mut().tick(config);
                tabs.scroll_by(delta, max_offset);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::CloseOutcome;
    use super::*;
    use crate::floater::{ChromeButtons, FloaterHooks, FloaterParams};

    fn host(canvas: &mut WindowCanvas, auto_resize: bool) -> FloaterId {
        let host = canvas.create_host(
            FloaterParams::new("host")
                .with_rect(Rect::from_origin_size(50, 50, 100, 60))
                .with_capabilities(Capabilities::all() - Capabilities::TEAR_OFF),
            auto_resize,
        );
        canvas.open_floater(host);
        host
    }

    fn tab(canvas: &mut WindowCanvas, title: &str, width: i32, height: i32) -> FloaterId {
        let id = canvas.create_floater(
            FloaterParams::new(title)
                .with_rect(Rect::from_origin_size(300, 300, width, height))
                .with_capabilities(
                    Capabilities::RESIZE
                        | Capabilities::MINIMIZE
                        | Capabilities::CLOSE
                        | Capabilities::DRAG
                        | Capabilities::TEAR_OFF,
                ),
        );
        canvas.open_floater(id);
        id
    }

    #[test]
    fn host_grows_and_selects_added_tab() {
        let mut canvas = canvas();
        let h = host(&mut canvas, true);
        let a = tab(&mut canvas, "a", 200, 100);
        let b = tab(&mut canvas, "b", 250, 80);
        assert!(canvas.add_hosted(h, a, false, InsertionPoint::End));
        assert!(canvas.add_hosted(h, b, true, InsertionPoint::End));

        let tabs = canvas.floater(h).unwrap().tabbed_host().unwrap();
        assert_eq!(tabs.active(), Some(b));
        let rect = canvas.floater(h).unwrap().rect();
        assert!(rect.width() >= 250 + 4);
        assert!(rect.height() >= 100 + 18 + 16 + 2);
        assert!(canvas.floater(b).unwrap().is_visible());
        assert!(!canvas.floater(a).unwrap().is_visible());
        assert_eq!(canvas.z_order(), &[h]);
    }

    #[test]
    fn hosting_round_trip_restores_size_and_capabilities() {
        let mut canvas = canvas();
        let h = host(&mut canvas, true);
        let a = tab(&mut canvas, "a", 200, 100);
        let before = canvas.floater(a).unwrap().capabilities();
        canvas.add_hosted(h, a, true, InsertionPoint::End);

        let hosted = canvas.floater(a).unwrap();
        assert!(!hosted.is_resizable());
        assert!(!hosted.can_minimize());
        assert!(!hosted.can_drag());
        assert_eq!(hosted.button_size(), 14);
        assert!(hosted.buttons_enabled().contains(ChromeButtons::TEAR_OFF));

        canvas.remove_hosted(h, a);
        let restored = canvas.floater(a).unwrap();
        assert_eq!(restored.capabilities(), before);
        assert_eq!((restored.rect().width(), restored.rect().height()), (200, 100));
        assert_eq!(restored.button_size(), 16);
        assert_eq!(canvas.membership(a), super::super::Membership::Detached);
    }

    #[test]
    fn auto_resize_host_shrinks_to_remaining_tabs() {
        let mut canvas = canvas();
        let h = host(&mut canvas, true);
        let big = tab(&mut canvas, "big", 400, 300);
        let small = tab(&mut canvas, "small", 120, 90);
        canvas.add_hosted(h, big, true, InsertionPoint::End);
        canvas.add_hosted(h, small, true, InsertionPoint::End);
        let origin = canvas.floater(h).unwrap().rect().origin();

        canvas.remove_hosted(h, big);
        let rect = canvas.floater(h).unwrap().rect();
        assert_eq!(rect.origin(), origin);
        assert_eq!((rect.width(), rect.height()), (124, 90 + 18 + 16 + 2));
        assert!(canvas.floater(small).unwrap().is_visible());
    }

    #[test]
    fn hosts_and_dialogs_cannot_be_tabs() {
        let mut canvas = canvas();
        let h = host(&mut canvas, false);
        let other = host(&mut canvas, false);
        let dialog = canvas.create_modal_dialog(FloaterParams::new("dialog"));
        assert!(!canvas.add_hosted(h, other, true, InsertionPoint::End));
        assert!(!canvas.add_hosted(h, dialog, true, InsertionPoint::End));
        assert!(!canvas.add_hosted(h, h, true, InsertionPoint::End));
    }

    #[test]
    fn tear_off_and_redock() {
        let mut canvas = canvas();
        let h = host(&mut canvas, false);
        let a = tab(&mut canvas, "a", 200, 100);
        canvas.add_hosted(h, a, true, InsertionPoint::End);

        canvas.tear_off(a);
        let torn = canvas.floater(a).unwrap();
        assert!(torn.is_torn_off());
        assert!(torn.is_visible());
        assert!(torn.can_drag());
        assert_eq!(torn.rect().origin(), Point::new(55, 73));
        assert_eq!(canvas.z_order().first(), Some(&a));
        assert_eq!(canvas.focused_floater(), Some(a));

        canvas.tear_off(a);
        assert_eq!(canvas.membership(a), super::super::Membership::Hosted(h));
        assert!(!canvas.floater(a).unwrap().is_torn_off());
        assert_eq!(canvas.focused_floater(), Some(a));
    }

    #[test]
    fn host_close_is_refused_while_a_tab_refuses() {
        let mut canvas = canvas();
        let h = host(&mut canvas, false);
        let a = tab(&mut canvas, "a", 200, 100);
        let stubborn = tab(&mut canvas, "stubborn", 200, 100);
        canvas.add_hosted(h, a, true, InsertionPoint::End);
        canvas.add_hosted(h, stubborn, true, InsertionPoint::End);
        canvas.set_hooks(
            stubborn,
            FloaterHooks {
                can_close: Some(Box::new(|_| false)),
                ..FloaterHooks::default()
            },
        );
        assert_eq!(canvas.close_floater(h), CloseOutcome::Refused);
        assert!(!canvas.contains(a));
        assert!(canvas.contains(h));
        let tabs = canvas.floater(h).unwrap().tabbed_host().unwrap();
        assert_eq!(tabs.tabs(), &[stubborn]);
    }

    #[test]
    fn select_and_cycle_tabs() {
        let mut canvas = canvas();
        let h = host(&mut canvas, false);
        let ids: Vec<FloaterId> = (0..3).map(|i| tab(&mut canvas, &format!("t{i}"), 100, 80)).collect();
        for id in &ids {
            canvas.add_hosted(h, *id, false, InsertionPoint::End);
        }
        canvas.select_tab(h, ids[1]);
        assert_eq!(canvas.focused_floater(), Some(ids[1]));
        canvas.cycle_tab(h, true);
        assert_eq!(canvas.focused_floater(), Some(ids[2]));
        canvas.cycle_tab(h, true);
        assert_eq!(canvas.focused_floater(), Some(ids[0]));
        assert!(canvas.floater(ids[0]).unwrap().is_visible());
        assert!(!canvas.floater(ids[2]).unwrap().is_visible());
    }

    #[test]
    fn tab_strip_autoscrolls_past_its_end() {
        let mut canvas = canvas();
        let h = host(&mut canvas, false);
        for i in 0..6 {
            let id = tab(&mut canvas, &format!("t{i}"), 100, 80);
            canvas.add_hosted(h, id, false, InsertionPoint::End);
        }
        let strip = canvas.tab_strip_rect(h).unwrap();
        canvas.update_tab_autoscroll(h, Point::new(strip.right + 3, strip.top));
        for _ in 0..10 {
            canvas.tick_autoscroll();
        }
        let offset = canvas.floater(h).unwrap().tabbed_host().unwrap().scroll_offset();
        assert!(offset > 0);
        assert!(offset <= 6 * 80 - strip.width());

        canvas.update_tab_autoscroll(h, Point::new(strip.left + 1, strip.top));
        canvas.tick_autoscroll();
        assert_eq!(
            canvas.floater(h).unwrap().tabbed_host().unwrap().scroll_offset(),
            offset
        );
    }
}
