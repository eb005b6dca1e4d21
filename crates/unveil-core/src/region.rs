//! # Regions and the viewport
//!
//! Components never query a global document. The host registers every
//! observable block of the page with a [`Viewport`] and passes the returned
//! [`RegionHandle`]s to the engines that need them.
//!
//! The viewport owns the scroll position and doubles as the page's
//! [`IntersectionSource`]: observers get one visible-fraction sample
//! immediately and another after every scroll or resize.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::effects::{Dispose, subscription};
use crate::error::ObserveError;
use crate::signal::{Signal, signal};

new_key_type! {
    /// Opaque handle to a registered page region.
    pub struct RegionHandle;
}

/// Vertical extent of a region in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub top: f32,
    pub height: f32,
}

impl Region {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollSample {
    pub scroll_top: f32,
    pub viewport_height: f32,
}

impl ScrollSample {
    /// `scroll_top + viewport_height / 2`
    pub fn midpoint(&self) -> f32 {
        self.scroll_top + self.viewport_height / 2.0
    }

    /// Fraction of `region` inside the visible band, in `[0, 1]`.
    pub fn visible_fraction(&self, region: &Region) -> f32 {
        let view_top = self.scroll_top;
        let view_bottom = self.scroll_top + self.viewport_height;
        let overlap = (region.bottom().min(view_bottom) - region.top.max(view_top)).max(0.0);
        if region.height <= 0.0 {
            // Zero-height regions count as fully visible once inside the band.
            return if region.top >= view_top && region.top <= view_bottom {
                1.0
            } else {
                0.0
            };
        }
        (overlap / region.height).clamp(0.0, 1.0)
    }
}

/// Something that can report how much of a region is on screen.
pub trait IntersectionSource {
    /// Starts delivering visible-fraction samples for `region` to `on_sample`.
    /// The returned guard stops delivery.
    fn observe(
        &self,
        region: RegionHandle,
        on_sample: Rc<dyn Fn(f32)>,
    ) -> Result<Dispose, ObserveError>;
}

/// Host without any observation primitive.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoIntersection;

impl IntersectionSource for NoIntersection {
    fn observe(&self, _: RegionHandle, _: Rc<dyn Fn(f32)>) -> Result<Dispose, ObserveError> {
        Err(ObserveError::Unsupported)
    }
}

/// Page model: registered regions plus the current scroll position.
#[derive(Clone)]
pub struct Viewport {
    regions: Rc<RefCell<SlotMap<RegionHandle, Region>>>,
    scroll: Signal<ScrollSample>,
}

impl Viewport {
    pub fn new(viewport_height: f32) -> Self {
        Self {
            regions: Rc::new(RefCell::new(SlotMap::with_key())),
            scroll: signal(ScrollSample {
                scroll_top: 0.0,
                viewport_height: viewport_height.max(0.0),
            }),
        }
    }

    pub fn add_region(&self, top: f32, height: f32) -> RegionHandle {
        self.regions.borrow_mut().insert(Region {
            top,
            height: height.max(0.0),
        })
    }

    pub fn remove_region(&self, handle: RegionHandle) -> Option<Region> {
        self.regions.borrow_mut().remove(handle)
    }

    pub fn region(&self, handle: RegionHandle) -> Option<Region> {
        self.regions.borrow().get(handle).copied()
    }

    pub fn sample(&self) -> ScrollSample {
        self.scroll.get()
    }

    pub fn set_scroll(&self, scroll_top: f32) {
        self.scroll.update(|s| s.scroll_top = scroll_top);
    }

    pub fn scroll_by(&self, dy: f32) {
        self.scroll.update(|s| s.scroll_top += dy);
    }

    pub fn resize(&self, viewport_height: f32) {
        self.scroll
            .update(|s| s.viewport_height = viewport_height.max(0.0));
    }

    /// Brings `handle`'s top edge to the top of the viewport. Unknown handles
    /// are ignored.
    pub fn scroll_into_view(&self, handle: RegionHandle) -> bool {
        match self.region(handle) {
            Some(region) => {
                self.set_scroll(region.top);
                true
            }
            None => {
                log::debug!("viewport: scroll_into_view on unknown region {handle:?}");
                false
            }
        }
    }

    pub fn visible_fraction(&self, handle: RegionHandle) -> Option<f32> {
        let region = self.region(handle)?;
        Some(self.scroll.with(|s| s.visible_fraction(&region)))
    }

    pub fn subscribe_scroll(&self, f: impl Fn(&ScrollSample) + 'static) -> Dispose {
        subscription(&self.scroll, f)
    }
}

impl IntersectionSource for Viewport {
    fn observe(
        &self,
        region: RegionHandle,
        on_sample: Rc<dyn Fn(f32)>,
    ) -> Result<Dispose, ObserveError> {
        let initial = self
            .visible_fraction(region)
            .ok_or(ObserveError::UnknownRegion(region))?;

        let regions = Rc::downgrade(&self.regions);
        let cb = on_sample.clone();
        let guard = self.subscribe_scroll(move |sample| {
            let Some(regions) = regions.upgrade() else {
                return;
            };
            // A region removed mid-observation stops producing samples.
            let found = regions.borrow().get(region).copied();
            if let Some(r) = found {
                cb(sample.visible_fraction(&r));
            }
        });
        on_sample(initial);
        Ok(guard)
    }
}
