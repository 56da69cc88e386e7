//! Browser helpers shared by the page shell

use anyhow::{Context, anyhow};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlAnchorElement, Response, Window};

use crate::presence::{Presence, PresenceError, parse_envelope};

#[wasm_bindgen(inline_js = "
    export function write_clipboard(text) {
        if (!navigator.clipboard) {
            return Promise.reject(new Error('clipboard unavailable'));
        }
        return navigator.clipboard.writeText(text);
    }
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn write_clipboard(text: &str) -> Result<js_sys::Promise, JsValue>;
}

pub fn window() -> anyhow::Result<Window> {
    web_sys::window().context("no window")
}

pub fn document() -> anyhow::Result<Document> {
    window()?.document().context("no document")
}

/// Element by id, cast to the expected type
pub fn element<T: JsCast>(document: &Document, id: &str) -> anyhow::Result<T> {
    document
        .get_element_by_id(id)
        .with_context(|| format!("missing #{id}"))?
        .dyn_into::<T>()
        .map_err(|_| anyhow!("#{id} has an unexpected element type"))
}

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// JS exception to a loggable error
pub fn js_error(err: JsValue) -> anyhow::Error {
    let message = err
        .as_string()
        .or_else(|| err.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{:?}", err));
    anyhow!(message)
}

/// Repeating timer, cleared when dropped
pub struct Interval {
    handle: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn new(millis: i32, callback: impl FnMut() + 'static) -> anyhow::Result<Self> {
        let closure = Closure::<dyn FnMut()>::new(callback);
        let handle = window()?
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis,
            )
            .map_err(js_error)?;
        Ok(Self {
            handle,
            _closure: closure,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.handle);
        }
    }
}

/// GET `url`; returns the HTTP status and body text
pub async fn fetch_text(url: &str) -> anyhow::Result<(u16, String)> {
    let response: Response = JsFuture::from(window()?.fetch_with_str(url))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| anyhow!("fetch did not return a Response"))?;

    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?
        .as_string()
        .unwrap_or_default();

    Ok((response.status(), text))
}

/// One presence poll
pub async fn fetch_presence(url: &str) -> Result<Presence, PresenceError> {
    let (status, body) = fetch_text(url)
        .await
        .map_err(|e| PresenceError::Network(e.to_string()))?;
    if !(200..300).contains(&status) {
        return Err(PresenceError::Http(status));
    }
    parse_envelope(&body)
}

/// Start a browser download of `url` saved as `file_name`
pub fn download(url: &str, file_name: &str) -> anyhow::Result<()> {
    let link: HtmlAnchorElement = document()?
        .create_element("a")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| anyhow!("<a> is not an anchor"))?;
    link.set_href(url);
    link.set_download(file_name);
    link.click();
    Ok(())
}

/// Copy text to the clipboard; failures are logged
pub async fn copy_to_clipboard(text: &str) {
    let result = match write_clipboard(text) {
        Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => log::info!("Copied to clipboard"),
        Err(e) => log::warn!("Clipboard write failed: {}", js_error(e)),
    }
}
