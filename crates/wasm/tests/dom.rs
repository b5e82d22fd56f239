use neohome_wasm::TocTracker;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use web_sys::{Document, Element};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window()
        .and_then(|window| window.document())
        .expect("document")
}

struct Page {
    root: Element,
    toc: Element,
}

impl Page {
    /// A `ul` with one `li[data-slug]` per slug plus an unrelated item, and one
    /// `section[data-heading-id]` per slug.
    fn new(slugs: &[&str]) -> Page {
        let document = document();
        let root = document.create_element("div").expect("div");
        let toc = document.create_element("ul").expect("ul");
        for slug in slugs {
            let item = document.create_element("li").expect("li");
            item.set_attribute("data-slug", slug).expect("data-slug");
            toc.append_child(&item).expect("append li");
        }
        let spacer = document.create_element("li").expect("li");
        toc.append_child(&spacer).expect("append li");
        root.append_child(&toc).expect("append toc");
        for slug in slugs {
            let section = document.create_element("section").expect("section");
            section.set_attribute("data-heading-id", slug).expect("data-heading-id");
            root.append_child(&section).expect("append section");
        }
        document
            .body()
            .expect("body")
            .append_child(&root)
            .expect("append root");
        Page { root, toc }
    }

    fn is_active(&self, slug: &str) -> bool {
        self.toc
            .query_selector(&format!("[data-slug=\"{slug}\"]"))
            .expect("selector")
            .expect("entry")
            .class_list()
            .contains("active")
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        self.root.remove();
    }
}

#[wasm_bindgen_test]
fn attach_registers_entries_in_list_order() {
    let page = Page::new(&["intro", "usage", "faq"]);
    let tracker = TocTracker::attach(page.toc.clone(), JsValue::UNDEFINED).expect("tracker");
    assert_eq!(tracker.slugs(), vec!["intro", "usage", "faq"]);
    assert_eq!(tracker.threshold(), 0.9);
}

#[wasm_bindgen_test]
fn attached_tracker_moves_the_active_class() {
    let page = Page::new(&["a", "b", "c"]);
    let mut tracker = TocTracker::attach(page.toc.clone(), JsValue::UNDEFINED).expect("tracker");

    assert!(tracker.observe("c", true));
    assert!(page.is_active("c"));
    assert!(tracker.observe("b", true));
    assert!(page.is_active("b"));
    assert!(!page.is_active("c"));

    tracker.observe("b", false);
    tracker.observe("c", false);
    assert!(page.is_active("b"));
}

#[wasm_bindgen_test]
fn dispose_releases_the_observer() {
    let page = Page::new(&["a"]);
    let mut tracker = TocTracker::attach(page.toc.clone(), JsValue::UNDEFINED).expect("tracker");
    tracker.dispose();
    assert!(!tracker.observe("a", true));
    assert!(!page.is_active("a"));
    assert!(tracker.slugs().is_empty());
}

#[wasm_bindgen_test]
fn attach_rejects_invalid_threshold() {
    let page = Page::new(&["a"]);
    let options = js_sys::JSON::parse(r#"{"threshold": -1}"#).expect("options");
    assert!(TocTracker::attach(page.toc.clone(), options).is_err());
}
