//! Browser bindings for the table-of-contents tracker.
//!
//! `installPageTracker` wires everything up: on each `astro:page-load` it
//! attaches a tracker to `#toc`, collecting the `data-slug` entries and
//! observing the matching `section[data-heading-id]` elements. The observer
//! is released on `astro:before-swap`.
//!
//! ```javascript
//! import init, { installPageTracker } from 'neohome-wasm';
//!
//! await init();
//! installPageTracker({ threshold: 0.9, activeClass: 'active' });
//! ```
//!
//! `TocTracker.attach(element)` attaches to one list directly, and
//! `new TocTracker(slugs, onToggle)` leaves the DOM to the caller.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

pub mod dom;
pub mod tracker;

pub use dom::{ClassListView, SectionObserver};
pub use tracker::{ActiveSectionTracker, ConfigError, SectionView, TrackerConfig};

/// Event fired by Astro after every navigation, including the first load.
const PAGE_LOAD_EVENT: &str = "astro:page-load";
/// Event fired by Astro before the page content is replaced.
const PAGE_LEAVE_EVENT: &str = "astro:before-swap";

thread_local! {
    static PAGE_TRACKER: RefCell<Option<TocTracker>> = const { RefCell::new(None) };
}

fn parse_config(options: JsValue) -> Result<TrackerConfig, JsError> {
    let config = if options.is_undefined() || options.is_null() {
        TrackerConfig::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsError::new(&format!("Invalid tracker options: {}", e)))?
    };
    config.validate()?;
    Ok(config)
}

fn js_error(err: JsValue) -> JsError {
    JsError::new(&err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

fn document() -> Result<web_sys::Document, JsError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsError::new("no document available"))
}

/// Attaches a tracker to `#toc` after every page load and releases it before
/// the page is swapped out.
#[wasm_bindgen(js_name = installPageTracker)]
pub fn install_page_tracker(options: JsValue) -> Result<(), JsError> {
    let config = parse_config(options)?;
    let document = document()?;

    let on_load = Closure::<dyn FnMut()>::new(move || {
        release_page_tracker();
        let Some(toc) = document_element("toc") else {
            return;
        };
        match TocTracker::attach_with(toc, config.clone()) {
            Ok(tracker) => PAGE_TRACKER.with(|slot| *slot.borrow_mut() = Some(tracker)),
            Err(err) => log::warn!("could not attach table-of-contents tracker: {:?}", err),
        }
    });
    let on_leave = Closure::<dyn FnMut()>::new(release_page_tracker);

    document
        .add_event_listener_with_callback(PAGE_LOAD_EVENT, on_load.as_ref().unchecked_ref())
        .map_err(js_error)?;
    document
        .add_event_listener_with_callback(PAGE_LEAVE_EVENT, on_leave.as_ref().unchecked_ref())
        .map_err(js_error)?;
    // Listeners live as long as the page.
    on_load.forget();
    on_leave.forget();
    Ok(())
}

fn document_element(id: &str) -> Option<web_sys::Element> {
    web_sys::window()?.document()?.get_element_by_id(id)
}

fn release_page_tracker() {
    // Dropping the tracker disconnects its observer.
    PAGE_TRACKER.with(|slot| slot.borrow_mut().take());
}

/// Forwards marker moves to a JavaScript callback `(previous, next, className)`.
pub struct CallbackView {
    on_toggle: js_sys::Function,
    active_class: JsValue,
}

impl SectionView for CallbackView {
    fn move_marker(&mut self, previous: Option<&str>, next: &str) {
        let previous = previous.map_or(JsValue::NULL, JsValue::from_str);
        let result = self.on_toggle.call3(
            &JsValue::NULL,
            &previous,
            &JsValue::from_str(next),
            &self.active_class,
        );
        if let Err(err) = result {
            log::warn!("onToggle callback threw: {:?}", err);
        }
    }
}

/// Where marker moves go.
pub enum TrackerView {
    /// A JavaScript callback.
    Callback(CallbackView),
    /// Class toggling on the table-of-contents entries.
    ClassList(ClassListView),
}

impl SectionView for TrackerView {
    fn move_marker(&mut self, previous: Option<&str>, next: &str) {
        match self {
            TrackerView::Callback(view) => view.move_marker(previous, next),
            TrackerView::ClassList(view) => view.move_marker(previous, next),
        }
    }
}

/// Table-of-contents tracker exposed to JavaScript.
#[wasm_bindgen]
pub struct TocTracker {
    inner: Rc<RefCell<ActiveSectionTracker<TrackerView>>>,
    observer: Option<SectionObserver>,
}

impl TocTracker {
    fn from_view(slugs: Vec<String>, view: TrackerView, config: TrackerConfig) -> Self {
        TocTracker {
            inner: Rc::new(RefCell::new(ActiveSectionTracker::new(slugs, view, config))),
            observer: None,
        }
    }

    fn attach_with(toc: web_sys::Element, config: TrackerConfig) -> Result<TocTracker, JsError> {
        let document = toc
            .owner_document()
            .ok_or_else(|| JsError::new("table of contents is not in a document"))?;
        let slugs = dom::collect_slugs(&toc);
        let view = TrackerView::ClassList(ClassListView::new(toc, config.active_class.clone()));
        let mut tracker = TocTracker::from_view(slugs, view, config);
        let observer = SectionObserver::observe(&document, &tracker.inner).map_err(js_error)?;
        tracker.observer = Some(observer);
        Ok(tracker)
    }
}

#[wasm_bindgen]
impl TocTracker {
    /// Registers the table-of-contents slugs in display order.
    ///
    /// `options` accepts `{ threshold, activeClass }`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        slugs: Vec<String>,
        on_toggle: js_sys::Function,
        options: JsValue,
    ) -> Result<TocTracker, JsError> {
        let config = parse_config(options)?;
        let view = CallbackView {
            on_toggle,
            active_class: JsValue::from_str(&config.active_class),
        };
        Ok(TocTracker::from_view(slugs, TrackerView::Callback(view), config))
    }

    /// Attaches to a table-of-contents list.
    ///
    /// Registers the `data-slug` of each child in order, observes the
    /// matching `[data-heading-id]` sections and toggles the active class on
    /// the entries itself.
    pub fn attach(toc: web_sys::Element, options: JsValue) -> Result<TocTracker, JsError> {
        TocTracker::attach_with(toc, parse_config(options)?)
    }

    /// Feeds one visibility change. Returns whether the marker moved.
    pub fn observe(&mut self, slug: &str, is_intersecting: bool) -> bool {
        match self.inner.try_borrow_mut() {
            Ok(mut tracker) => tracker.observe(slug, is_intersecting),
            Err(_) => {
                log::warn!("ignoring re-entrant visibility change for {slug}");
                false
            }
        }
    }

    /// Slug currently carrying the marker.
    #[wasm_bindgen(getter, js_name = activeSlug)]
    pub fn active_slug(&self) -> Option<String> {
        self.inner.borrow().active_id().map(str::to_string)
    }

    /// Registered slugs in order.
    #[wasm_bindgen(getter)]
    pub fn slugs(&self) -> Vec<String> {
        self.inner.borrow().ids().map(str::to_string).collect()
    }

    /// Threshold the sections are observed at.
    #[wasm_bindgen(getter)]
    pub fn threshold(&self) -> f64 {
        self.inner.borrow().config().threshold
    }

    /// Class name toggled on the active entry.
    #[wasm_bindgen(getter, js_name = activeClass)]
    pub fn active_class(&self) -> String {
        self.inner.borrow().config().active_class.clone()
    }

    /// Disconnects the observer; later `observe` calls do nothing.
    pub fn dispose(&mut self) {
        self.observer = None;
        self.inner.borrow_mut().clear();
    }
}
