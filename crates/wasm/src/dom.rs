//! DOM side of the tracker: the table-of-contents list and the section observer.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};

use crate::tracker::{ActiveSectionTracker, SectionView, attribute_selector};

/// Slugs of the direct children of `toc` that carry `data-slug`, in order.
pub fn collect_slugs(toc: &Element) -> Vec<String> {
    let children = toc.children();
    (0..children.length())
        .filter_map(|index| children.item(index))
        .filter_map(|child| child.get_attribute("data-slug"))
        .collect()
}

/// Moves the active class between `[data-slug]` entries of the list.
pub struct ClassListView {
    toc: Element,
    active_class: String,
}

impl ClassListView {
    /// View over the entries of `toc`.
    pub fn new(toc: Element, active_class: String) -> Self {
        Self { toc, active_class }
    }

    fn entry(&self, slug: &str) -> Option<Element> {
        self.toc
            .query_selector(&attribute_selector("data-slug", slug))
            .ok()
            .flatten()
    }
}

impl SectionView for ClassListView {
    fn move_marker(&mut self, previous: Option<&str>, next: &str) {
        if let Some(entry) = previous.and_then(|slug| self.entry(slug)) {
            if let Err(err) = entry.class_list().remove_1(&self.active_class) {
                log::warn!("could not clear active class: {:?}", err);
            }
        }
        match self.entry(next) {
            Some(entry) => {
                if let Err(err) = entry.class_list().add_1(&self.active_class) {
                    log::warn!("could not set active class: {:?}", err);
                }
            }
            None => log::warn!("no table-of-contents entry for `{next}`"),
        }
    }
}

/// An `IntersectionObserver` over the `[data-heading-id]` sections of the
/// registered slugs. Disconnects when dropped.
pub struct SectionObserver {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl SectionObserver {
    /// Observes every registered section found in `document`.
    pub fn observe<V: SectionView + 'static>(
        document: &Document,
        tracker: &Rc<RefCell<ActiveSectionTracker<V>>>,
    ) -> Result<Self, JsValue> {
        let shared = Rc::clone(tracker);
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            let Ok(mut tracker) = shared.try_borrow_mut() else {
                log::warn!("visibility change arrived while the tracker was busy");
                return;
            };
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                if let Some(id) = entry.target().get_attribute("data-heading-id") {
                    tracker.observe(&id, entry.is_intersecting());
                }
            }
        });

        let tracker = tracker.borrow();
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(tracker.config().threshold));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        for id in tracker.ids() {
            match document.query_selector(&attribute_selector("data-heading-id", id))? {
                Some(section) => observer.observe(&section),
                None => log::debug!("no section for table-of-contents entry `{id}`"),
            }
        }
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for SectionObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
