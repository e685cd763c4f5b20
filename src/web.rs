//! Browser host (cargo feature `web`).
//!
//! Binds the controller to real page elements and to the Pagefind module.
//! The page loads the module itself and hands it over:
//!
//! ```js
//! import init, { mount } from "./sitesearch.js";
//! await init();
//! const pagefind = await import("../pagefind/pagefind.js");
//! mount(pagefind);
//! ```

use std::rc::Rc;
use std::time::Duration;

use js_sys::{Array, Promise};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use crate::config::{Config, DomConfig};
use crate::controller::SearchController;
use crate::dom::{DomHost, Node};
use crate::error::{Result, SiteSearchError};
use crate::index::{
    ResultHandle, SearchIndex, SearchOptions, SearchOutcome, SearchResponse, SearchResult,
};

#[wasm_bindgen]
extern "C" {
    /// The object returned by `import("/pagefind/pagefind.js")`.
    pub type PagefindModule;

    #[wasm_bindgen(method, catch)]
    fn init(this: &PagefindModule) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = debouncedSearch)]
    fn debounced_search(
        this: &PagefindModule,
        term: &str,
        options: &JsValue,
        timeout_ms: f64,
    ) -> std::result::Result<Promise, JsValue>;

    /// One entry of `search.results`.
    type RawHit;

    #[wasm_bindgen(method, catch)]
    fn data(this: &RawHit) -> std::result::Result<Promise, JsValue>;
}

fn js_error(context: &str, err: JsValue) -> SiteSearchError {
    let detail = err
        .as_string()
        .or_else(|| err.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{:?}", err));
    SiteSearchError::index(format!("{}: {}", context, detail))
}

/// Search index backed by the Pagefind module.
pub struct PagefindIndex {
    module: PagefindModule,
}

impl PagefindIndex {
    pub fn new(module: JsValue) -> Self {
        Self {
            module: module.unchecked_into(),
        }
    }
}

impl SearchIndex for PagefindIndex {
    type Hit = PagefindHit;

    fn init(&self) -> Result<()> {
        // Pagefind loads lazily; the returned promise only matters to it.
        self.module
            .init()
            .map(|_| ())
            .map_err(|e| js_error("pagefind.init", e))
    }

    async fn debounced_search(
        &self,
        query: &str,
        options: &SearchOptions,
        delay: Duration,
    ) -> Result<SearchOutcome<PagefindHit>> {
        // Plain objects, not `Map`s: Pagefind reads filters with `Object.entries`.
        let options = options
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| SiteSearchError::serde(e.to_string()))?;
        let promise = self
            .module
            .debounced_search(query, &options, delay.as_millis() as f64)
            .map_err(|e| js_error("pagefind.debouncedSearch", e))?;
        let search = JsFuture::from(promise)
            .await
            .map_err(|e| js_error("pagefind.debouncedSearch", e))?;

        // Pagefind resolves to null when a newer call replaced this one.
        if search.is_null() || search.is_undefined() {
            return Ok(SearchOutcome::Superseded);
        }

        let results = js_sys::Reflect::get(&search, &JsValue::from_str("results"))
            .map_err(|e| js_error("reading search.results", e))?;
        let hits: Vec<PagefindHit> = Array::from(&results)
            .iter()
            .map(|raw| PagefindHit {
                raw: raw.unchecked_into(),
            })
            .collect();

        let unfiltered = js_sys::Reflect::get(&search, &JsValue::from_str("unfilteredResultCount"))
            .ok()
            .and_then(|v| v.as_f64())
            .map(|n| n as usize)
            .unwrap_or(hits.len());

        Ok(SearchOutcome::Fresh(SearchResponse {
            results: hits,
            unfiltered_result_count: unfiltered,
        }))
    }
}

/// A Pagefind hit whose fragment is fetched on `data()`.
pub struct PagefindHit {
    raw: RawHit,
}

impl ResultHandle for PagefindHit {
    async fn data(&self) -> Result<SearchResult> {
        let promise = self.raw.data().map_err(|e| js_error("result.data", e))?;
        let value = JsFuture::from(promise)
            .await
            .map_err(|e| js_error("result.data", e))?;
        serde_wasm_bindgen::from_value(value).map_err(|e| SiteSearchError::serde(e.to_string()))
    }
}

/// The search box elements of the current document.
pub struct WebDom {
    document: Document,
    input: HtmlInputElement,
    container: HtmlElement,
    list: Element,
    visible_display: String,
}

impl WebDom {
    /// Look up the search box elements. Fails on the first one missing.
    pub fn from_document(config: &DomConfig) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| SiteSearchError::dom("no document"))?;

        let search_container = element_by_id(&document, &config.search_container_id)?;
        let input = search_container
            .first_element_child()
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
            .ok_or_else(|| {
                SiteSearchError::dom(format!(
                    "#{} has no input as first child",
                    config.search_container_id
                ))
            })?;

        let container = element_by_id(&document, &config.results_container_id)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| SiteSearchError::dom("results container is not an HTML element"))?;
        let list = container.first_element_child().ok_or_else(|| {
            SiteSearchError::dom(format!(
                "#{} has no list element",
                config.results_container_id
            ))
        })?;

        Ok(Self {
            document,
            input,
            container,
            list,
            visible_display: config.visible_display.clone(),
        })
    }

    fn build(&self, node: &Node, parent: &Element) -> std::result::Result<(), JsValue> {
        match node {
            Node::Element(element) => {
                let el = self.document.create_element(element.tag)?;
                for (name, value) in &element.attrs {
                    el.set_attribute(name, value)?;
                }
                for child in &element.children {
                    self.build(child, &el)?;
                }
                parent.append_child(&el)?;
            }
            Node::Text(text) => {
                parent.append_child(&self.document.create_text_node(text))?;
            }
            Node::Html(html) => {
                parent.insert_adjacent_html("beforeend", html)?;
            }
        }
        Ok(())
    }
}

fn element_by_id(document: &Document, id: &str) -> Result<Element> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| SiteSearchError::dom(format!("missing element #{}", id)))
}

impl DomHost for WebDom {
    fn query(&self) -> String {
        self.input.value()
    }

    fn set_query(&mut self, value: &str) {
        self.input.set_value(value);
    }

    fn enable_input(&mut self) {
        self.input.set_disabled(false);
    }

    fn set_visible(&mut self, visible: bool) {
        let display = if visible {
            self.visible_display.as_str()
        } else {
            "none"
        };
        if let Err(e) = self.container.style().set_property("display", display) {
            tracing::error!(?e, "failed to set results container display");
        }
    }

    fn replace_results(&mut self, nodes: Vec<Node>) {
        self.list.set_inner_html("");
        for node in &nodes {
            if let Err(e) = self.build(node, &self.list) {
                tracing::error!(?e, "failed to build results node");
            }
        }
    }
}

/// Mount the search box on the current page.
///
/// `config` is an optional object shaped like the TOML config.
#[wasm_bindgen]
pub fn mount(pagefind: JsValue, config: JsValue) -> std::result::Result<(), JsValue> {
    let config: Config = if config.is_undefined() || config.is_null() {
        Config::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    let to_js = |e: SiteSearchError| JsValue::from_str(&e.to_string());

    let dom = WebDom::from_document(&config.dom).map_err(to_js)?;
    let document = dom.document.clone();
    let input = dom.input.clone();
    let controller = Rc::new(SearchController::new(
        PagefindIndex::new(pagefind),
        dom,
        &config,
    ));
    controller.mount().map_err(to_js)?;

    let clear = element_by_id(&document, &config.dom.clear_button_id).map_err(to_js)?;
    let on_clear = {
        let controller = Rc::clone(&controller);
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            controller.on_clear();
        })
    };
    clear.add_event_listener_with_callback("click", on_clear.as_ref().unchecked_ref())?;
    on_clear.forget();

    let on_input = {
        let controller = Rc::clone(&controller);
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let controller = Rc::clone(&controller);
            spawn_local(async move {
                if let Err(e) = controller.on_input().await {
                    tracing::error!(error = %e, "search failed");
                    web_sys::console::error_1(&JsValue::from_str(&e.to_string()));
                }
            });
        })
    };
    input.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;
    on_input.forget();

    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::dom::Element as NodeElement;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const HIT: &str = r#"{
        data: () => Promise.resolve({
            url: "/doc/pcre2api.html",
            meta: { title: "pcre2api" },
            excerpt: "compile a <mark>pattern</mark>",
            sub_results: []
        })
    }"#;

    /// A module object with the two methods the binding calls.
    fn pagefind_stub(search_body: &str) -> JsValue {
        let module = js_sys::Object::new();
        let init = js_sys::Function::new_no_args("return Promise.resolve();");
        let search = js_sys::Function::new_no_args(search_body);
        js_sys::Reflect::set(&module, &JsValue::from_str("init"), &init).unwrap();
        js_sys::Reflect::set(&module, &JsValue::from_str("debouncedSearch"), &search).unwrap();
        module.into()
    }

    fn fresh_stub(unfiltered: usize) -> JsValue {
        pagefind_stub(&format!(
            "return Promise.resolve({{ results: [{}], unfilteredResultCount: {} }});",
            HIT, unfiltered
        ))
    }

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    /// Add a search box and results container with ids prefixed by `prefix`.
    fn fixture(prefix: &str, list_markup: &str) -> DomConfig {
        let document = document();
        let body = document.body().unwrap();

        let nav = document.create_element("div").unwrap();
        nav.set_id(&format!("{prefix}-nav"));
        nav.set_inner_html("<input disabled>");
        let clear = document.create_element("button").unwrap();
        clear.set_id(&format!("{prefix}-clear"));
        let results = document.create_element("div").unwrap();
        results.set_id(&format!("{prefix}-results"));
        results.set_inner_html(list_markup);

        body.append_child(&nav).unwrap();
        body.append_child(&clear).unwrap();
        body.append_child(&results).unwrap();

        DomConfig {
            search_container_id: format!("{prefix}-nav"),
            clear_button_id: format!("{prefix}-clear"),
            results_container_id: format!("{prefix}-results"),
            ..DomConfig::default()
        }
    }

    fn web_dom(config: &DomConfig) -> WebDom {
        match WebDom::from_document(config) {
            Ok(dom) => dom,
            Err(e) => panic!("{e}"),
        }
    }

    fn expect_dom_error(config: &DomConfig) -> String {
        match WebDom::from_document(config) {
            Err(SiteSearchError::Dom { message }) => message,
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("lookup should have failed"),
        }
    }

    #[wasm_bindgen_test]
    async fn test_null_search_is_superseded() {
        let index = PagefindIndex::new(pagefind_stub("return Promise.resolve(null);"));
        let outcome = index
            .debounced_search("a", &SearchOptions::default(), Duration::from_millis(200))
            .await
            .unwrap();
        assert!(outcome.is_superseded());
    }

    #[wasm_bindgen_test]
    async fn test_search_results_and_data() {
        let index = PagefindIndex::new(fresh_stub(4));
        index.init().unwrap();

        let outcome = index
            .debounced_search("pattern", &SearchOptions::default(), Duration::ZERO)
            .await
            .unwrap();
        let response = outcome.fresh().expect("search should be fresh");
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.unfiltered_result_count, 4);

        let result = response.results[0].data().await.unwrap();
        assert_eq!(result.url, "/doc/pcre2api.html");
        assert_eq!(result.title(), "pcre2api");
        assert!(!result.has_sub_results());
    }

    #[wasm_bindgen_test]
    async fn test_search_exception_is_index_error() {
        let index = PagefindIndex::new(pagefind_stub("throw new Error('index missing');"));
        let err = match index
            .debounced_search("a", &SearchOptions::default(), Duration::ZERO)
            .await
        {
            Err(e) => e,
            Ok(_) => panic!("search should have failed"),
        };
        assert!(matches!(err, SiteSearchError::Index { .. }));
        assert!(err.to_string().contains("index missing"));
    }

    #[wasm_bindgen_test]
    fn test_missing_elements_fail_fast() {
        let config = DomConfig {
            search_container_id: "no-such-nav".to_string(),
            ..DomConfig::default()
        };
        assert!(expect_dom_error(&config).contains("no-such-nav"));

        let config = fixture("nolist", "");
        assert!(expect_dom_error(&config).contains("nolist-results"));
    }

    #[wasm_bindgen_test]
    fn test_input_state_and_query() {
        let mut dom = web_dom(&fixture("input", "<ul></ul>"));
        assert!(dom.input.disabled());

        dom.enable_input();
        assert!(!dom.input.disabled());

        dom.set_query("pcre2");
        assert_eq!(dom.query(), "pcre2");
    }

    #[wasm_bindgen_test]
    fn test_set_visible_writes_display() {
        let mut dom = web_dom(&fixture("visible", "<ul></ul>"));
        let display = |dom: &WebDom| dom.container.style().get_property_value("display").unwrap();

        dom.set_visible(true);
        assert_eq!(display(&dom), "flex");
        dom.set_visible(false);
        assert_eq!(display(&dom), "none");
    }

    #[wasm_bindgen_test]
    fn test_replace_results_builds_nodes() {
        let mut dom = web_dom(&fixture("build", "<ul><li>stale</li></ul>"));

        dom.replace_results(vec![
            NodeElement::new("div")
                .attr("class", "search-count")
                .child(Node::text("a < b"))
                .into(),
            Node::html("<mark>hit</mark>"),
        ]);

        assert_eq!(
            dom.list.inner_html(),
            "<div class=\"search-count\">a &lt; b</div><mark>hit</mark>"
        );
    }

    #[wasm_bindgen_test]
    async fn test_controller_renders_into_page() {
        let dom_config = fixture("ctrl", "<ul></ul>");
        let config = Config {
            dom: dom_config.clone(),
            ..Config::default()
        };
        let controller =
            SearchController::new(PagefindIndex::new(fresh_stub(1)), web_dom(&dom_config), &config);
        controller.mount().unwrap();
        controller.dom_mut().set_query("pattern");

        controller.on_input().await.unwrap();

        let dom = controller.dom();
        assert_eq!(
            dom.container.style().get_property_value("display").unwrap(),
            "flex"
        );
        let link = dom.list.query_selector("li > a").unwrap().unwrap();
        assert_eq!(link.get_attribute("href").as_deref(), Some("/doc/pcre2api"));
        assert_eq!(
            dom.list.query_selector("mark").unwrap().unwrap().text_content().as_deref(),
            Some("pattern")
        );
    }
}
