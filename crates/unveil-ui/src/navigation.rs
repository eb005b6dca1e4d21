//! Section navigation: a menu whose active entry follows the scroll spy and
//! whose entries scroll their section into view.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use unveil_core::*;

use crate::scroll_spy::ScrollSpy;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub id: String,
    pub label: String,
}

impl NavItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Clone)]
pub struct NavigationMenu {
    viewport: Viewport,
    items: Rc<[(NavItem, RegionHandle)]>,
    spy: ScrollSpy,
    open: Signal<bool>,
}

impl NavigationMenu {
    pub fn new(viewport: &Viewport, items: Vec<(NavItem, RegionHandle)>) -> Self {
        let spy = ScrollSpy::bind(
            viewport,
            items.iter().map(|(item, handle)| (item.id.clone(), *handle)),
        );
        Self {
            viewport: viewport.clone(),
            items: items.into(),
            spy,
            open: signal(false),
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &NavItem> {
        self.items.iter().map(|(item, _)| item)
    }

    pub fn active_id(&self) -> Option<String> {
        self.spy.active_id()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.spy.active().with(|a| a.as_deref() == Some(id))
    }

    pub fn spy(&self) -> &ScrollSpy {
        &self.spy
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn open_signal(&self) -> Signal<bool> {
        self.open.clone()
    }

    pub fn toggle_menu(&self) {
        self.open.update(|o| *o = !*o);
    }

    pub fn close_menu(&self) {
        self.open.set_if_changed(false);
    }

    /// Scrolls to the section named `id` and closes the menu. Returns false
    /// for an unknown id or a section whose region is gone.
    pub fn select(&self, id: &str) -> bool {
        let Some((_, handle)) = self.items.iter().find(|(item, _)| item.id == id) else {
            log::debug!("navigation: no item {id:?}");
            return false;
        };
        let scrolled = self.viewport.scroll_into_view(*handle);
        self.close_menu();
        scrolled
    }

    pub fn dispose(&self) {
        self.spy.dispose();
    }
}
