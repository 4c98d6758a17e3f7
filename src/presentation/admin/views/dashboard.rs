use askama::Template;

use super::AdminLayout;

#[derive(Clone)]
pub struct AdminDashboardCardView {
    pub label: String,
    pub href: String,
    /// `None` when the count could not be loaded.
    pub total: Option<u64>,
    pub hint: String,
}

impl AdminDashboardCardView {
    pub fn total_label(&self) -> String {
        match self.total {
            Some(total) => total.to_string(),
            None => "-".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AdminDashboardView {
    pub title: String,
    pub cards: Vec<AdminDashboardCardView>,
    pub export_links: Vec<super::ExportLinkView>,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub view: AdminLayout<AdminDashboardView>,
}
