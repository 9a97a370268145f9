//! Bookkeeping for a tabbed host. Geometry and the hosted floaters
//! themselves are handled by the canvas; this keeps the tab order, the
//! active tab, the pre-hosting snapshots and the tab-strip scroll state.

use std::collections::HashMap;

use crate::config::FloaterConfig;
use crate::constants::AUTOSCROLL_RAMP_FRAMES;
use crate::floater::{Capabilities, FloaterId};

/// What a floater looked like before it entered a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostedSnapshot {
    pub width: i32,
    pub height: i32,
    pub capabilities: Capabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionPoint {
    Start,
    #[default]
    End,
    /// Immediately after the active tab.
    AfterActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Backward,
    Forward,
}

/// Per-frame accelerating scroll of the tab strip.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AutoScroll {
    direction: Option<ScrollDirection>,
    rate: f32,
    carry: f32,
}

impl AutoScroll {
    pub fn start(&mut self, direction: ScrollDirection, config: &FloaterConfig) {
        if self.direction != Some(direction) {
            self.direction = Some(direction);
            self.rate = config.autoscroll_min_rate;
            self.carry = 0.0;
        }
    }

    pub fn stop(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.direction.is_some()
    }

    /// Advances one frame and returns the whole-pixel offset change.
    pub fn tick(&mut self, config: &FloaterConfig) -> i32 {
        let Some(direction) = self.direction else {
            return 0;
        };
        let step = (config.autoscroll_max_rate - config.autoscroll_min_rate) / AUTOSCROLL_RAMP_FRAMES;
        self.carry += self.rate;
        self.rate = (self.rate + step).min(config.autoscroll_max_rate);
        let whole = self.carry.trunc();
        self.carry -= whole;
        let pixels = whole as i32;
        match direction {
            ScrollDirection::Backward => -pixels,
            ScrollDirection::Forward => pixels,
        }
    }
}

#[derive(Debug, Default)]
pub struct TabbedHost {
    tabs: Vec<FloaterId>,
    active: Option<FloaterId>,
    snapshots: HashMap<FloaterId, HostedSnapshot>,
    auto_resize: bool,
    scroll_offset: i32,
    autoscroll: AutoScroll,
}

impl TabbedHost {
    pub fn new(auto_resize: bool) -> Self {
        Self {
            auto_resize,
            ..Self::default()
        }
    }

    pub fn tabs(&self) -> &[FloaterId] {
        &self.tabs
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn active(&self) -> Option<FloaterId> {
        self.active
    }

    pub fn contains(&self, id: FloaterId) -> bool {
        self.tabs.contains(&id)
    }

    pub fn auto_resize(&self) -> bool {
        self.auto_resize
    }

    pub fn snapshot(&self, id: FloaterId) -> Option<&HostedSnapshot> {
        self.snapshots.get(&id)
    }

    pub(crate) fn snapshot_mut(&mut self, id: FloaterId) -> Option<&mut HostedSnapshot> {
        self.snapshots.get_mut(&id)
    }

    pub fn scroll_offset(&self) -> i32 {
        self.scroll_offset
    }

    pub(crate) fn insert(
        &mut self,
        id: FloaterId,
        snapshot: HostedSnapshot,
        insertion: InsertionPoint,
    ) {
        if self.tabs.contains(&id) {
            return;
        }
        let index = match insertion {
            InsertionPoint::Start => 0,
            InsertionPoint::End => self.tabs.len(),
            InsertionPoint::AfterActive => self
                .active
                .and_then(|a| self.tabs.iter().position(|t| *t == a))
                .map_or(self.tabs.len(), |i| i + 1),
        };
        self.tabs.insert(index, id);
        self.snapshots.insert(id, snapshot);
        if self.active.is_none() {
            self.active = Some(id);
        }
    }

    /// Removes a tab, handing the active selection to its neighbor.
    pub(crate) fn remove(&mut self, id: FloaterId) -> Option<HostedSnapshot> {
        let index = self.tabs.iter().position(|t| *t == id)?;
        self.tabs.remove(index);
        if self.active == Some(id) {
            let next = index.min(self.tabs.len().saturating_sub(1));
            self.active = self.tabs.get(next).copied();
        }
        self.snapshots.remove(&id)
    }

    pub(crate) fn select(&mut self, id: FloaterId) -> bool {
        if !self.tabs.contains(&id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Tab `offset` positions away from the active one, wrapping around.
    pub fn neighbor_of_active(&self, offset: isize) -> Option<FloaterId> {
        let len = self.tabs.len() as isize;
        if len == 0 {
            return None;
        }
        let current = self
            .active
            .and_then(|a| self.tabs.iter().position(|t| *t == a))
            .unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len);
        self.tabs.get(next as usize).copied()
    }

    /// Drops tabs whose floaters no longer exist.
    pub(crate) fn prune(&mut self, mut alive: impl FnMut(FloaterId) -> bool) {
        let dead: Vec<FloaterId> = self.tabs.iter().copied().filter(|t| !alive(*t)).collect();
        for id in dead {
            self.remove(id);
        }
    }

    pub fn autoscroll_active(&self) -> bool {
        self.autoscroll.is_active()
    }

    pub(crate) fn autoscroll_mut(&mut self) -> &mut AutoScroll {
        &mut self.autoscroll
    }

    pub(crate) fn scroll_by(&mut self, delta: i32, max_offset: i32) {
        self.scroll_offset = (self.scroll_offset + delta).clamp(0, max_offset.max(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<FloaterId> {
        let mut map: SlotMap<FloaterId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn snap() -> HostedSnapshot {
        HostedSnapshot {
            width: 10,
            height: 10,
            capabilities: Capabilities::CLOSE,
        }
    }

    #[test]
    fn insertion_points() {
        let ids = ids(4);
        let mut host = TabbedHost::new(true);
        host.insert(ids[0], snap(), InsertionPoint::End);
        host.insert(ids[1], snap(), InsertionPoint::Start);
        host.insert(ids[2], snap(), InsertionPoint::AfterActive);
        assert_eq!(host.tabs(), &[ids[1], ids[0], ids[2]]);
        assert_eq!(host.active(), Some(ids[0]));
        host.insert(ids[2], snap(), InsertionPoint::Start);
        assert_eq!(host.tab_count(), 3);
    }

    #[test]
    fn removing_active_selects_neighbor() {
        let ids = ids(3);
        let mut host = TabbedHost::new(true);
        for id in &ids {
            host.insert(*id, snap(), InsertionPoint::End);
        }
        host.select(ids[2]);
        assert!(host.remove(ids[2]).is_some());
        assert_eq!(host.active(), Some(ids[1]));
        host.remove(ids[0]);
        host.remove(ids[1]);
        assert_eq!(host.active(), None);
        assert!(host.remove(ids[1]).is_none());
    }

    #[test]
    fn neighbor_wraps() {
        let ids = ids(3);
        let mut host = TabbedHost::new(false);
        for id in &ids {
            host.insert(*id, snap(), InsertionPoint::End);
        }
        assert_eq!(host.neighbor_of_active(-1), Some(ids[2]));
        assert_eq!(host.neighbor_of_active(1), Some(ids[1]));
    }

    #[test]
    fn autoscroll_accelerates_to_the_cap() {
        let config = FloaterConfig {
            autoscroll_min_rate: 1.0,
            autoscroll_max_rate: 4.0,
            ..FloaterConfig::default()
        };
        let mut scroll = AutoScroll::default();
        assert_eq!(scroll.tick(&config), 0);
        scroll.start(ScrollDirection::Forward, &config);
        let first = scroll.tick(&config);
        assert_eq!(first, 1);
        let mut total = first;
        for _ in 0..200 {
            total += scroll.tick(&config);
        }
        assert!(total > 600);
        scroll.start(ScrollDirection::Backward, &config);
        assert_eq!(scroll.tick(&config), -1);
        scroll.stop();
        assert!(!scroll.is_active());
    }
}
