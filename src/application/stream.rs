//! Server-driven datastar SSE responses.

use std::convert::Infallible;

use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, Sse},
};
use datastar::prelude::{ElementPatchMode, ExecuteScript, PatchElements};

use crate::application::ui::VisitMode;

/// Ordered batch of datastar events sent back for one interaction.
#[derive(Default)]
pub struct StreamBuilder {
    events: Vec<Event>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Patch the element matching `selector` with `html`.
    pub fn push_patch(
        &mut self,
        html: String,
        selector: &str,
        mode: ElementPatchMode,
    ) -> &mut Self {
        let event = PatchElements::new(html)
            .selector(selector)
            .mode(mode)
            .write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    pub fn push_replace(&mut self, selector: &str, html: String) -> &mut Self {
        self.push_patch(html, selector, ElementPatchMode::Replace)
    }

    /// Empty the element matching `selector` (closing a modal host).
    pub fn push_clear(&mut self, selector: &str) -> &mut Self {
        self.push_patch(String::new(), selector, ElementPatchMode::Inner)
    }

    pub fn push_script(&mut self, script: String) -> &mut Self {
        let event = ExecuteScript::new(script).write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Rewrite the address bar without adding a history entry.
    pub fn push_history_replace(&mut self, href: &str) -> &mut Self {
        self.push_script(format!(
            "window.history.replaceState(null, '', {});",
            js_string(href)
        ))
    }

    /// Record `href` as a new history entry.
    pub fn push_history_entry(&mut self, href: &str) -> &mut Self {
        self.push_script(format!(
            "window.history.pushState(null, '', {});",
            js_string(href)
        ))
    }

    /// Update the address bar only while an element matches `guard`.
    pub fn push_guarded_history(&mut self, guard: &str, href: &str, mode: VisitMode) -> &mut Self {
        let method = match mode {
            VisitMode::Push => "pushState",
            VisitMode::Replace => "replaceState",
        };
        self.push_script(format!(
            "if (document.querySelector({})) window.history.{method}(null, '', {});",
            js_string(guard),
            js_string(href)
        ))
    }

    /// Send the browser to another page.
    pub fn push_redirect(&mut self, href: &str) -> &mut Self {
        self.push_script(format!("window.location.assign({});", js_string(href)))
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn into_response(self) -> Response {
        let stream = stream! {
            for event in self.events {
                yield Ok::<Event, Infallible>(event);
            }
        };
        Sse::new(stream).into_response()
    }
}

/// Quote a value as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_strings_escape_quotes() {
        assert_eq!(js_string("/barang?search=a'b"), "\"/barang?search=a'b\"");
        assert_eq!(js_string("x\"y"), "\"x\\\"y\"");
    }

    #[test]
    fn builder_counts_events() {
        let mut stream = StreamBuilder::new();
        assert!(stream.is_empty());
        stream
            .push_replace("[data-admin-panel=\"barang\"]", "<div></div>".into())
            .push_history_replace("/barang");
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn guarded_history_follows_the_visit_mode() {
        let mut stream = StreamBuilder::new();
        stream
            .push_guarded_history("[data-panel-ticket=\"3\"]", "/barang", VisitMode::Push)
            .push_guarded_history("[data-panel-ticket=\"4\"]", "/barang", VisitMode::Replace);
        assert_eq!(stream.len(), 2);
    }
}
