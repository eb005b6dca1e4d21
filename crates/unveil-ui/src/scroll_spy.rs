//! Active-section tracking.
//!
//! On every scroll sample the spy takes the viewport midpoint
//! (`scroll_top + viewport_height / 2`), scans the sections from last to
//! first and picks the first one whose top is at or above it. When nothing
//! qualifies the first section stays active.
//!
//! Sections must be registered in top-to-bottom document order; an unordered
//! list ranks sections arbitrarily.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use unveil_core::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub top_offset: f32,
}

impl Section {
    pub fn new(id: impl Into<String>, top_offset: f32) -> Self {
        Self {
            id: id.into(),
            top_offset,
        }
    }
}

/// Index of the active section for `midpoint`, `None` only when `sections`
/// is empty.
pub fn active_index(sections: &[Section], midpoint: f32) -> Option<usize> {
    if sections.is_empty() {
        return None;
    }
    Some(
        sections
            .iter()
            .rposition(|s| s.top_offset <= midpoint)
            .unwrap_or(0),
    )
}

#[derive(Clone)]
pub struct ScrollSpy {
    sections: Rc<[Section]>,
    active: Signal<Option<String>>,
    subscription: Rc<RefCell<Option<Dispose>>>,
    disposed: Rc<Cell<bool>>,
}

impl ScrollSpy {
    /// Registers sections with known offsets. The first one starts active.
    pub fn register(sections: Vec<Section>) -> Self {
        let first = sections.first().map(|s| s.id.clone());
        let this = Self {
            sections: sections.into(),
            active: signal(first),
            subscription: Rc::new(RefCell::new(None)),
            disposed: Rc::new(Cell::new(false)),
        };
        if let Some(scope) = current_scope() {
            let s = this.clone();
            scope.add_disposer(move || s.dispose());
        }
        this
    }

    /// Registers `(id, region)` pairs, reading each region's top once, and
    /// follows `viewport`'s scroll position until disposed. Unknown regions
    /// are skipped.
    pub fn bind<S: Into<String>>(
        viewport: &Viewport,
        sections: impl IntoIterator<Item = (S, RegionHandle)>,
    ) -> Self {
        let resolved: Vec<Section> = sections
            .into_iter()
            .filter_map(|(id, handle)| {
                let id = id.into();
                match viewport.region(handle) {
                    Some(region) => Some(Section::new(id, region.top)),
                    None => {
                        log::warn!("scroll spy: section {id:?} has no registered region");
                        None
                    }
                }
            })
            .collect();
        let this = Self::register(resolved);
        this.sample(viewport.sample());

        let sections = this.sections.clone();
        let active = this.active.clone();
        let disposed = this.disposed.clone();
        let guard = viewport.subscribe_scroll(move |s| {
            if !disposed.get() {
                Self::publish(&sections, &active, s.midpoint());
            }
        });
        *this.subscription.borrow_mut() = Some(guard);
        this
    }

    /// Feeds one scroll sample and returns the active id.
    pub fn sample(&self, sample: ScrollSample) -> Option<String> {
        self.sample_midpoint(sample.midpoint())
    }

    pub fn sample_midpoint(&self, midpoint: f32) -> Option<String> {
        if !self.disposed.get() {
            Self::publish(&self.sections, &self.active, midpoint);
        }
        self.active.get()
    }

    fn publish(sections: &[Section], active: &Signal<Option<String>>, midpoint: f32) {
        let id = active_index(sections, midpoint).map(|i| sections[i].id.clone());
        if active.set_if_changed(id) {
            log::debug!("scroll spy: active section {:?}", active.get());
        }
    }

    pub fn active_id(&self) -> Option<String> {
        self.active.get()
    }

    pub fn active(&self) -> Signal<Option<String>> {
        self.active.clone()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Stops following the viewport. The last active id is kept.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let sub = self.subscription.borrow_mut().take();
        if let Some(sub) = sub {
            sub.run();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two() -> ScrollSpy {
        ScrollSpy::register(vec![Section::new("a", 0.0), Section::new("b", 500.0)])
    }

    #[test]
    fn midpoint_selects_section() {
        let spy = two();
        assert_eq!(spy.sample_midpoint(100.0).as_deref(), Some("a"));
        assert_eq!(spy.sample_midpoint(600.0).as_deref(), Some("b"));
        assert_eq!(spy.sample_midpoint(-10.0).as_deref(), Some("a"));
    }

    #[test]
    fn later_section_wins_at_its_boundary() {
        let spy = two();
        assert_eq!(spy.sample_midpoint(500.0).as_deref(), Some("b"));
        assert_eq!(spy.sample_midpoint(499.9).as_deref(), Some("a"));
    }

    #[test]
    fn first_section_is_active_before_any_sample_and_empty_has_none() {
        assert_eq!(two().active_id().as_deref(), Some("a"));
        let empty = ScrollSpy::register(Vec::new());
        assert_eq!(empty.sample_midpoint(100.0), None);
        assert_eq!(active_index(&[], 5.0), None);
    }

    #[test]
    fn bound_spy_follows_viewport() {
        let vp = Viewport::new(800.0);
        let hero = vp.add_region(0.0, 900.0);
        let about = vp.add_region(900.0, 1200.0);
        let projects = vp.add_region(2100.0, 1500.0);
        let spy = ScrollSpy::bind(&vp, [("hero", hero), ("about", about), ("projects", projects)]);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        spy.active().subscribe(move |id| s.borrow_mut().push(id.clone()));

        vp.set_scroll(400.0); // midpoint 800
        vp.set_scroll(600.0); // midpoint 1000
        vp.set_scroll(700.0);
        vp.set_scroll(1800.0); // midpoint 2200
        assert_eq!(spy.active_id().as_deref(), Some("projects"));
        assert_eq!(
            *seen.borrow(),
            vec![Some("about".to_string()), Some("projects".to_string())]
        );

        spy.dispose();
        spy.dispose();
        vp.set_scroll(0.0);
        assert_eq!(spy.active_id().as_deref(), Some("projects"));
        assert_eq!(spy.sample_midpoint(0.0).as_deref(), Some("projects"));
    }

    #[test]
    fn bind_skips_unknown_regions() {
        let vp = Viewport::new(100.0);
        let a = vp.add_region(0.0, 10.0);
        let gone = vp.add_region(50.0, 10.0);
        vp.remove_region(gone);
        let spy = ScrollSpy::bind(&vp, [("a", a), ("gone", gone)]);
        assert_eq!(spy.sections().len(), 1);
    }
}
