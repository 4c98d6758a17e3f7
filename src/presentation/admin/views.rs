mod dashboard;
mod kehadiran;
mod resources;
mod stok;
mod toast;

pub use dashboard::*;
pub use kehadiran::*;
pub use resources::*;
pub use stok::*;
pub use toast::*;

use askama::Template;

#[derive(Clone)]
pub struct AdminBrandView {
    pub title: String,
}

#[derive(Clone)]
pub struct AdminNavigationItemView {
    pub label: String,
    pub href: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct AdminNavigationView {
    pub items: Vec<AdminNavigationItemView>,
}

#[derive(Clone)]
pub struct AdminMetaView {
    pub title: String,
}

#[derive(Clone)]
pub struct AdminChrome {
    pub brand: AdminBrandView,
    pub navigation: AdminNavigationView,
    pub meta: AdminMetaView,
    /// Module URL of the datastar client bundle.
    pub datastar_src: String,
}

#[derive(Clone)]
pub struct AdminLayout<T> {
    pub chrome: AdminChrome,
    pub asset_version: String,
    pub toasts: Vec<AdminToastItem>,
    pub content: T,
}

impl<T> AdminLayout<T> {
    pub fn new(chrome: AdminChrome, content: T) -> Self {
        Self {
            chrome,
            asset_version: asset_version(),
            toasts: Vec::new(),
            content,
        }
    }

    pub fn with_toasts(mut self, toasts: Vec<AdminToastItem>) -> Self {
        self.toasts = toasts;
        self
    }
}

fn asset_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl OptionView {
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HiddenFieldView {
    pub name: String,
    pub value: String,
}

/// A full admin page whose main panel was rendered separately, so panel
/// refreshes and first loads share one template.
#[derive(Clone)]
pub struct AdminPanelPageView {
    pub heading: String,
    pub panel_html: String,
    /// Address-bar rewrite applied once the page loads.
    pub replace_location: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/panel_page.html")]
pub struct AdminPanelPageTemplate {
    pub view: AdminLayout<AdminPanelPageView>,
}

#[derive(Clone)]
pub struct AdminErrorView {
    pub heading: String,
    pub message: String,
    pub back_href: String,
}

#[derive(Template)]
#[template(path = "admin/error.html")]
pub struct AdminErrorTemplate {
    pub view: AdminLayout<AdminErrorView>,
}
