use askama::Template;

use crate::application::resources::Cell;

use super::{HiddenFieldView, OptionView};

#[derive(Clone, Debug)]
pub struct ColumnHeaderView {
    pub label: String,
    pub sortable: bool,
    pub action: String,
    pub is_active: bool,
    pub indicator: &'static str,
}

#[derive(Clone, Debug)]
pub struct FilterTabView {
    pub label: String,
    pub action: String,
    pub is_active: bool,
}

#[derive(Clone, Debug)]
pub struct ExtraFilterView {
    pub name: String,
    pub label: String,
    pub options: Vec<OptionView>,
}

#[derive(Clone, Debug)]
pub struct ResourceRowView {
    pub id: String,
    pub cells: Vec<Cell>,
    pub edit_href: String,
    pub detail_action: String,
    pub delete_action: String,
    /// JavaScript string literal shown by the confirm dialog.
    pub delete_confirm: String,
    pub status_action: Option<String>,
}

#[derive(Clone, Debug)]
pub struct PageLinkView {
    pub label: String,
    pub action: String,
    pub is_current: bool,
    pub is_gap: bool,
}

#[derive(Clone, Debug)]
pub struct PaginationView {
    pub summary: String,
    pub links: Vec<PageLinkView>,
    pub previous_action: Option<String>,
    pub next_action: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ExportLinkView {
    pub label: String,
    pub href: String,
}

#[derive(Clone, Debug)]
pub struct ResourceListView {
    pub slug: String,
    pub title: String,
    pub singular: String,
    pub panel_action: String,
    /// Panel request issued by the search box; rewrites history instead of
    /// pushing an entry per keystroke pause.
    pub search_action: String,
    pub new_href: String,
    pub search_name: String,
    pub search_value: String,
    pub debounce_ms: u64,
    /// Current state minus search and page, resubmitted with the search box.
    pub hidden_fields: Vec<HiddenFieldView>,
    pub headers: Vec<ColumnHeaderView>,
    pub tabs: Vec<FilterTabView>,
    pub extra_filters: Vec<ExtraFilterView>,
    pub per_page_name: String,
    pub per_page_options: Vec<OptionView>,
    pub rows: Vec<ResourceRowView>,
    pub column_count: usize,
    pub empty_message: String,
    pub pagination: PaginationView,
    pub export_links: Vec<ExportLinkView>,
}

impl ResourceListView {
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn has_tabs(&self) -> bool {
        !self.tabs.is_empty()
    }

    pub fn has_sortable(&self) -> bool {
        self.headers.iter().any(|header| header.sortable)
    }

    pub fn has_exports(&self) -> bool {
        !self.export_links.is_empty()
    }
}

#[derive(Template)]
#[template(path = "admin/resource_panel.html")]
pub struct ResourcePanelTemplate {
    pub content: ResourceListView,
}

#[derive(Clone, Debug)]
pub struct FilePreviewView {
    pub src: String,
    pub handle: String,
}

#[derive(Clone, Debug)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    /// `input`, `textarea`, `select` or `file`.
    pub control: &'static str,
    pub input_type: &'static str,
    pub value: String,
    pub required: bool,
    pub options: Vec<OptionView>,
    pub accept: String,
    pub error: Option<String>,
    pub preview: Option<FilePreviewView>,
    pub preview_action: String,
}

impl FieldView {
    pub fn is_input(&self) -> bool {
        self.control == "input"
    }

    pub fn is_textarea(&self) -> bool {
        self.control == "textarea"
    }

    pub fn is_select(&self) -> bool {
        self.control == "select"
    }

    pub fn is_file(&self) -> bool {
        self.control == "file"
    }
}

#[derive(Clone, Debug)]
pub struct GroupRowView {
    pub index: usize,
    pub fields: Vec<FieldView>,
    pub remove_action: String,
}

#[derive(Clone, Debug)]
pub struct GroupView {
    pub name: String,
    pub label: String,
    pub headers: Vec<String>,
    pub rows: Vec<GroupRowView>,
    pub add_action: String,
    pub error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResourceFormView {
    pub slug: String,
    pub heading: String,
    pub action: String,
    pub submit_label: String,
    pub back_href: String,
    pub hidden_fields: Vec<HiddenFieldView>,
    pub fields: Vec<FieldView>,
    pub groups: Vec<GroupView>,
    pub summary_error: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/resource_form_panel.html")]
pub struct ResourceFormPanelTemplate {
    pub content: ResourceFormView,
}

#[derive(Template)]
#[template(path = "admin/file_preview.html")]
pub struct FilePreviewTemplate {
    pub field: FieldView,
}

#[derive(Clone, Debug)]
pub struct StatusModalView {
    pub heading: String,
    pub record_label: String,
    pub action: String,
    pub options: Vec<OptionView>,
    pub error: Option<String>,
    pub hidden_fields: Vec<HiddenFieldView>,
}

#[derive(Template)]
#[template(path = "admin/status_modal.html")]
pub struct StatusModalTemplate {
    pub content: StatusModalView,
}

#[derive(Clone, Debug)]
pub struct DetailEntryView {
    pub label: String,
    pub cell: Cell,
}

#[derive(Clone, Debug)]
pub struct DetailModalView {
    pub heading: String,
    pub entries: Vec<DetailEntryView>,
    pub edit_href: String,
}

#[derive(Template)]
#[template(path = "admin/detail_modal.html")]
pub struct DetailModalTemplate {
    pub content: DetailModalView,
}
