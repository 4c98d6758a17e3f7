use askama::Template;

use super::{ExtraFilterView, FilterTabView, PaginationView};

#[derive(Clone, Debug)]
pub struct RekapRowView {
    pub nama: String,
    pub kelas: String,
    pub sangga: String,
    pub hadir: u64,
    pub izin: u64,
    pub sakit: u64,
    pub alpha: u64,
    pub total: u64,
    pub persentase: String,
}

#[derive(Clone, Debug)]
pub struct RekapTotalsView {
    pub hadir: u64,
    pub izin: u64,
    pub sakit: u64,
    pub alpha: u64,
}

#[derive(Clone, Debug)]
pub struct KehadiranRekapView {
    pub heading: String,
    pub period: String,
    pub panel_action: String,
    pub search_value: String,
    pub debounce_ms: u64,
    pub scope_tabs: Vec<FilterTabView>,
    pub filters: Vec<ExtraFilterView>,
    pub rows: Vec<RekapRowView>,
    pub totals: RekapTotalsView,
    pub pagination: PaginationView,
    pub empty_message: String,
}

impl KehadiranRekapView {
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }
}

#[derive(Template)]
#[template(path = "admin/kehadiran_panel.html")]
pub struct KehadiranPanelTemplate {
    pub content: KehadiranRekapView,
}
