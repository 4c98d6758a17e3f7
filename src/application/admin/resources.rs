//! Generic list, form and modal services behind every resource page.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::application::{
    backend::{
        BackendGateway, ExportFormat, FormMethod, PageProps, SubmitOutcome, storage_path,
    },
    forms::{FieldErrors, FormDraft, parse_quantity},
    list_query::{ListQuery, PER_PAGE_OPTIONS, QuerySchema, SortDirection, echo_pairs},
    pagination::Paginated,
    resources::{Cell, Column, FieldKind, FieldSpec, GroupSpec, Resource, RowContext, Routes},
    ui::Modal,
    uploads::{MultipartBody, PreviewHandle, SelectedFile},
};
use crate::presentation::admin::views::{
    ColumnHeaderView, DetailEntryView, DetailModalView, ExportLinkView, ExtraFilterView,
    FieldView, FilePreviewView, FilterTabView, GroupRowView, GroupView, HiddenFieldView,
    OptionView, ResourceFormView, ResourceListView, ResourceRowView, StatusModalView,
};

use super::{AdminUiSettings, LoadError, pagination_view};

const TARGET: &str = "sekretariat::application::admin::resources";

/// Draft keys with this prefix hold client bookkeeping and never reach the
/// backend.
pub const INTERNAL_FIELD_PREFIX: &str = "_";
pub const HISTORY_FIELD: &str = "_history";
/// Ticket the browser attached to a panel request.
pub const TICKET_FIELD: &str = "_seq";

/// Status modal of one record; the draft is the status picked so far.
pub type StatusModal<R> = Modal<<R as Resource>::Record, String>;

pub fn preview_field(name: &str) -> String {
    format!("_preview_{name}")
}

pub fn stored_field(name: &str) -> String {
    format!("_stored_{name}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(u64),
}

impl FormMode {
    pub fn action<R: Resource>(self) -> String {
        match self {
            FormMode::Create => format!("/{}/create", R::SLUG),
            FormMode::Edit(id) => format!("/{}/{id}/edit", R::SLUG),
        }
    }

    pub fn rows_path<R: Resource>(self) -> String {
        match self {
            FormMode::Create => format!("/{}/form/rows", R::SLUG),
            FormMode::Edit(id) => format!("/{}/{id}/form/rows", R::SLUG),
        }
    }

    pub fn preview_path<R: Resource>(self) -> String {
        match self {
            FormMode::Create => format!("/{}/form/preview", R::SLUG),
            FormMode::Edit(id) => format!("/{}/{id}/form/preview", R::SLUG),
        }
    }

    fn method(self) -> FormMethod {
        match self {
            FormMode::Create => FormMethod::Post,
            FormMode::Edit(_) => FormMethod::Put,
        }
    }

    fn backend_path<R: Resource>(self) -> String {
        match self {
            FormMode::Create => Routes::store::<R>(),
            FormMode::Edit(id) => Routes::record::<R>(id),
        }
    }

    fn props_path<R: Resource>(self) -> String {
        match self {
            FormMode::Create => Routes::create_props::<R>(),
            FormMode::Edit(id) => Routes::edit_props::<R>(id),
        }
    }
}

/// One loaded list page together with the query the backend applied.
pub struct ResourceList<R: Resource> {
    pub query: ListQuery,
    pub page: Paginated<R::Record>,
    pub props: PageProps,
}

/// Outcome toast shown after a redirect back to the list.
pub fn flash_message<R: Resource>(flash: &str) -> Option<String> {
    let singular = R::SINGULAR;
    match flash {
        "created" => Some(format!("{singular} berhasil ditambahkan.")),
        "updated" => Some(format!("{singular} berhasil diperbarui.")),
        "deleted" => Some(format!("{singular} berhasil dihapus.")),
        _ => None,
    }
}

pub fn export_links() -> Vec<ExportLinkView> {
    ExportFormat::ALL
        .iter()
        .map(|format| ExportLinkView {
            label: format.label().to_string(),
            href: format.path().to_string(),
        })
        .collect()
}

/// Requested state overlaid with what the backend echoes back, so the
/// controls show the values that produced the rows.
pub fn applied_query(
    schema: &QuerySchema,
    requested: &ListQuery,
    props: &PageProps,
) -> ListQuery {
    let echoed = props.filters_echo().map(echo_pairs).unwrap_or_default();
    schema.decode(schema.encode(requested).into_iter().chain(echoed))
}

/// Clamp every quantity cell of the draft's item groups to `[1, available]`.
pub fn normalize_quantities(groups: &[GroupSpec], draft: &mut FormDraft) {
    for group in groups {
        let Some(quantity) = group.quantity.as_ref() else {
            continue;
        };
        let mut list = draft.group(group.name);
        for index in 0..list.len() {
            list = list.update(index, |row| {
                let mut row = row.clone();
                let raw = row.get(quantity.field).cloned().unwrap_or_default();
                let ceiling = row
                    .get(quantity.source_field)
                    .and_then(|value| quantity.available_for(value));
                row.insert(
                    quantity.field.to_string(),
                    parse_quantity(&raw, ceiling).to_string(),
                );
                row
            });
        }
        draft.set_group(group.name, list);
    }
}

/// Multipart body for a draft: every public field, each item group as
/// `group[i][field]`, then the file when one is attached.
pub fn multipart_body(draft: &FormDraft, file: Option<SelectedFile>) -> MultipartBody {
    let mut body = MultipartBody::new();
    for (name, value) in draft.fields() {
        if !name.starts_with(INTERNAL_FIELD_PREFIX) {
            body = body.text(name, value);
        }
    }
    for (name, list) in draft.groups() {
        body = body.group(
            name,
            list.items()
                .iter()
                .map(|row| row.iter().map(|(field, value)| (field.as_str(), value.as_str()))),
        );
    }
    match file {
        Some(file) => body.file(file),
        None => body,
    }
}

pub fn seed_draft<R: Resource>(record: &R::Record, props: &PageProps) -> FormDraft {
    let mut draft = R::draft_from(record);
    if let (Some(path), Some(field)) = (R::stored_file(record), file_field::<R>(props)) {
        draft.set(stored_field(field.name), path);
    }
    draft
}

fn file_field<R: Resource>(props: &PageProps) -> Option<FieldSpec> {
    R::form_fields(props)
        .into_iter()
        .find(|spec| matches!(spec.kind, FieldKind::File { .. }))
}

#[derive(Clone)]
pub struct AdminResourceService {
    backend: Arc<dyn BackendGateway>,
    ui: AdminUiSettings,
}

impl AdminResourceService {
    pub fn new(backend: Arc<dyn BackendGateway>, ui: AdminUiSettings) -> Self {
        Self { backend, ui }
    }

    pub fn ui(&self) -> &AdminUiSettings {
        &self.ui
    }

    pub fn backend(&self) -> &Arc<dyn BackendGateway> {
        &self.backend
    }

    pub async fn load_list<R: Resource>(
        &self,
        requested: &ListQuery,
    ) -> Result<ResourceList<R>, LoadError> {
        let schema = R::schema();
        let params = schema.encode(requested);
        let props = self
            .backend
            .fetch_props(schema.path(), &params)
            .await
            .map_err(|err| LoadError::new(R::TITLE, err))?;
        let page = props
            .collection::<R::Record>(R::COLLECTION_KEY)
            .map_err(|err| LoadError::new(R::TITLE, err))?;

        let mut query = applied_query(schema, requested, &props);
        query.page = page.current_page;

        debug!(
            target = TARGET,
            resource = R::SLUG,
            total = page.total,
            page = page.current_page,
            "list page loaded"
        );
        Ok(ResourceList { query, page, props })
    }

    pub fn list_view<R: Resource>(&self, list: &ResourceList<R>) -> ResourceListView {
        let schema = R::schema();
        let names = schema.param_names();
        let query = &list.query;
        let ctx = RowContext {
            timezone: self.ui.timezone,
        };
        let panel_href = |query: &ListQuery| panel_action::<R>(schema, query);
        let state = schema.to_query_string(query);

        let headers = R::columns()
            .iter()
            .map(|column| header_view(column, schema, query, &panel_href))
            .collect();

        let tabs = filter_tabs::<R>(query, &panel_href);

        let extra_filters = R::extra_filters(&list.props)
            .into_iter()
            .map(|filter| {
                let current = query.extra(filter.key).unwrap_or_default();
                let mut options = vec![OptionView::new(
                    "",
                    format!("Semua {}", filter.label.to_lowercase()),
                    current.is_empty(),
                )];
                options.extend(filter.options.into_iter().map(|option| {
                    let selected = option.value == current;
                    OptionView::new(option.value, option.label, selected)
                }));
                ExtraFilterView {
                    name: filter.key.to_string(),
                    label: filter.label.to_string(),
                    options,
                }
            })
            .collect();

        // Search, extras and page size are live controls of the toolbar form;
        // the rest of the state rides along as hidden inputs.
        let hidden_fields = schema
            .encode(query)
            .into_iter()
            .filter(|(key, _)| {
                key != names.search
                    && key != names.page
                    && key != names.per_page
                    && !schema.extra_key_list().contains(&key.as_str())
            })
            .map(|(name, value)| HiddenFieldView { name, value })
            .collect();

        let rows = list
            .page
            .data
            .iter()
            .map(|record| {
                let id = R::id(record);
                ResourceRowView {
                    id: id.to_string(),
                    cells: R::row(record, &ctx),
                    edit_href: format!("/{}/{id}/edit", R::SLUG),
                    detail_action: format!("/{}/{id}/detail", R::SLUG),
                    delete_action: format!("/{}/{id}/delete?{state}", R::SLUG),
                    delete_confirm: confirm_literal(&format!(
                        "Hapus {} \"{}\"? Tindakan ini tidak dapat dibatalkan.",
                        R::SINGULAR.to_lowercase(),
                        R::display_name(record)
                    )),
                    status_action: R::has_status()
                        .then(|| format!("/{}/{id}/status?{state}", R::SLUG)),
                }
            })
            .collect();

        let empty_message = if query.search.is_empty() {
            format!("Belum ada data {}.", R::SINGULAR.to_lowercase())
        } else {
            format!(
                "Tidak ada {} yang cocok dengan \"{}\".",
                R::SINGULAR.to_lowercase(),
                query.search
            )
        };

        let pagination = pagination_view(&list.page, |page| {
            panel_href(&query.clone().with_page(page))
        });

        ResourceListView {
            slug: R::SLUG.to_string(),
            title: R::TITLE.to_string(),
            singular: R::SINGULAR.to_string(),
            panel_action: format!("/{}/panel", R::SLUG),
            search_action: format!("/{}/panel?{HISTORY_FIELD}=replace", R::SLUG),
            new_href: format!("/{}/new", R::SLUG),
            search_name: names.search.to_string(),
            search_value: query.search.clone(),
            debounce_ms: self.ui.debounce_ms(),
            hidden_fields,
            headers,
            tabs,
            extra_filters,
            per_page_name: names.per_page.to_string(),
            per_page_options: per_page_options(query.per_page),
            rows,
            column_count: R::columns().len() + 1,
            empty_message,
            pagination,
            export_links: if R::has_exports() {
                export_links()
            } else {
                Vec::new()
            },
        }
    }

    pub async fn load_form_props<R: Resource>(
        &self,
        mode: FormMode,
    ) -> Result<PageProps, LoadError> {
        self.backend
            .fetch_props(&mode.props_path::<R>(), &[])
            .await
            .map_err(|err| LoadError::new(R::SINGULAR, err))
    }

    /// Edit-page props plus a draft seeded from the stored record.
    pub async fn load_edit<R: Resource>(
        &self,
        id: u64,
    ) -> Result<(PageProps, FormDraft), LoadError> {
        let props = self.load_form_props::<R>(FormMode::Edit(id)).await?;
        let record: R::Record = props
            .record(R::RECORD_KEY)
            .map_err(|err| LoadError::new(R::SINGULAR, err))?;
        let draft = seed_draft::<R>(&record, &props);
        Ok((props, draft))
    }

    pub async fn load_record<R: Resource>(&self, id: u64) -> Result<R::Record, LoadError> {
        let props = self
            .backend
            .fetch_props(&Routes::record::<R>(id), &[])
            .await
            .map_err(|err| LoadError::new(R::SINGULAR, err))?;
        props
            .record(R::RECORD_KEY)
            .map_err(|err| LoadError::new(R::SINGULAR, err))
    }

    /// Load `id` and open its status modal on the current status.
    pub async fn open_status_modal<R: Resource>(
        &self,
        id: u64,
    ) -> Result<StatusModal<R>, LoadError> {
        let record = self.load_record::<R>(id).await?;
        Ok(Modal::open(record, |record| {
            R::current_status(record).unwrap_or_default().to_string()
        }))
    }

    pub fn form_view<R: Resource>(
        &self,
        mode: FormMode,
        props: &PageProps,
        draft: &FormDraft,
        errors: &FieldErrors,
    ) -> ResourceFormView {
        let preview_action = mode.preview_path::<R>();
        let fields = R::form_fields(props)
            .iter()
            .map(|spec| {
                field_view(
                    spec,
                    spec.name.to_string(),
                    draft.value(spec.name),
                    errors.first(spec.name),
                    file_preview(spec, draft),
                    format!("{preview_action}?field={}", spec.name),
                )
            })
            .collect();

        let rows_path = mode.rows_path::<R>();
        let groups = R::item_groups(props)
            .iter()
            .map(|group| group_view(group, draft, errors, &rows_path))
            .collect();

        let hidden_fields = draft
            .fields()
            .filter(|(name, _)| name.starts_with("_stored_"))
            .map(|(name, value)| HiddenFieldView {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect();

        let (heading, submit_label) = match mode {
            FormMode::Create => (format!("Tambah {}", R::SINGULAR), "Simpan"),
            FormMode::Edit(_) => (format!("Ubah {}", R::SINGULAR), "Simpan Perubahan"),
        };

        ResourceFormView {
            slug: R::SLUG.to_string(),
            heading,
            action: mode.action::<R>(),
            submit_label: submit_label.to_string(),
            back_href: R::index_path().to_string(),
            hidden_fields,
            fields,
            groups,
            summary_error: (!errors.is_empty()).then(|| {
                errors
                    .summary()
                    .unwrap_or("Periksa kembali isian yang ditandai.")
                    .to_string()
            }),
        }
    }

    /// The file field named `field`, rendered on its own for preview patches.
    pub fn file_field_view<R: Resource>(
        &self,
        mode: FormMode,
        props: &PageProps,
        draft: &FormDraft,
        field: &str,
    ) -> Option<FieldView> {
        let spec = R::form_fields(props)
            .into_iter()
            .find(|spec| spec.name == field && matches!(spec.kind, FieldKind::File { .. }))?;
        Some(field_view(
            &spec,
            spec.name.to_string(),
            draft.value(spec.name),
            None,
            file_preview(&spec, draft),
            format!("{}?field={}", mode.preview_path::<R>(), spec.name),
        ))
    }

    pub async fn submit<R: Resource>(
        &self,
        mode: FormMode,
        draft: &FormDraft,
        file: Option<SelectedFile>,
    ) -> Result<SubmitOutcome, LoadError> {
        let body = multipart_body(draft, file);
        let outcome = self
            .backend
            .submit(mode.method(), &mode.backend_path::<R>(), body)
            .await
            .map_err(|err| LoadError::new(R::SINGULAR, err))?;
        info!(
            target = TARGET,
            resource = R::SLUG,
            mode = ?mode,
            accepted = outcome.is_accepted(),
            "form submitted"
        );
        Ok(outcome)
    }

    pub async fn delete<R: Resource>(&self, id: u64) -> Result<SubmitOutcome, LoadError> {
        let outcome = self
            .backend
            .delete(&Routes::record::<R>(id))
            .await
            .map_err(|err| LoadError::new(R::SINGULAR, err))?;
        info!(
            target = TARGET,
            resource = R::SLUG,
            id,
            accepted = outcome.is_accepted(),
            "record deleted"
        );
        Ok(outcome)
    }

    pub async fn update_status<R: Resource>(
        &self,
        id: u64,
        status: &str,
    ) -> Result<SubmitOutcome, LoadError> {
        let outcome = self
            .backend
            .submit_json(
                FormMethod::Patch,
                &Routes::status::<R>(id),
                json!({ "status": status }),
            )
            .await
            .map_err(|err| LoadError::new(R::SINGULAR, err))?;
        info!(
            target = TARGET,
            resource = R::SLUG,
            id,
            status,
            accepted = outcome.is_accepted(),
            "status updated"
        );
        Ok(outcome)
    }

    /// `None` once the modal is closed.
    pub fn status_modal_view<R: Resource>(
        &self,
        modal: &StatusModal<R>,
        query: &ListQuery,
        error: Option<String>,
    ) -> Option<StatusModalView> {
        let (record, selected) = modal.record().zip(modal.draft())?;
        let id = R::id(record);
        Some(StatusModalView {
            heading: format!("Ubah Status {}", R::SINGULAR),
            record_label: R::display_name(record),
            action: format!("/{}/{id}/status", R::SLUG),
            options: R::status_options()
                .into_iter()
                .map(|option| {
                    let is_selected = option.value == *selected;
                    OptionView::new(option.value, option.label, is_selected)
                })
                .collect(),
            error,
            hidden_fields: R::schema()
                .encode(query)
                .into_iter()
                .map(|(name, value)| HiddenFieldView { name, value })
                .collect(),
        })
    }

    pub fn detail_view<R: Resource>(&self, record: &R::Record) -> DetailModalView {
        let ctx = RowContext {
            timezone: self.ui.timezone,
        };
        let entries = R::columns()
            .iter()
            .zip(R::row(record, &ctx))
            .map(|(column, cell)| DetailEntryView {
                label: column.label.to_string(),
                cell,
            })
            .collect();
        DetailModalView {
            heading: R::display_name(record),
            entries,
            edit_href: format!("/{}/{}/edit", R::SLUG, R::id(record)),
        }
    }
}

fn panel_action<R: Resource>(schema: &QuerySchema, query: &ListQuery) -> String {
    format!("/{}/panel?{}", R::SLUG, schema.to_query_string(query))
}

fn header_view<F>(
    column: &Column,
    schema: &QuerySchema,
    query: &ListQuery,
    panel_href: &F,
) -> ColumnHeaderView
where
    F: Fn(&ListQuery) -> String,
{
    let sortable = column.sortable && schema.sortable(column.key);
    let is_active = sortable && query.sort_field == column.key;
    let indicator = match (sortable, is_active, query.sort_direction) {
        (false, _, _) => "",
        (true, false, _) => "↕",
        (true, true, SortDirection::Asc) => "↑",
        (true, true, SortDirection::Desc) => "↓",
    };
    ColumnHeaderView {
        label: column.label.to_string(),
        sortable,
        action: if sortable {
            panel_href(&query.clone().with_sort(column.key, schema))
        } else {
            String::new()
        },
        is_active,
        indicator,
    }
}

fn filter_tabs<R: Resource>(
    query: &ListQuery,
    panel_href: &impl Fn(&ListQuery) -> String,
) -> Vec<FilterTabView> {
    let options = R::filter_tabs();
    if options.is_empty() {
        return Vec::new();
    }
    let mut tabs = vec![FilterTabView {
        label: "Semua".to_string(),
        action: panel_href(&query.clone().with_filter(None)),
        is_active: query.filter.is_none(),
    }];
    tabs.extend(options.into_iter().map(|option| FilterTabView {
        is_active: query.filter.as_deref() == Some(option.value.as_str()),
        action: panel_href(&query.clone().with_filter(Some(option.value))),
        label: option.label,
    }));
    tabs
}

fn per_page_options(current: u32) -> Vec<OptionView> {
    let mut sizes: Vec<u32> = PER_PAGE_OPTIONS.to_vec();
    if !sizes.contains(&current) {
        sizes.push(current);
        sizes.sort_unstable();
    }
    sizes
        .into_iter()
        .map(|size| OptionView::new(size.to_string(), size.to_string(), size == current))
        .collect()
}

fn confirm_literal(message: &str) -> String {
    serde_json::Value::String(message.to_string()).to_string()
}

fn file_preview(spec: &FieldSpec, draft: &FormDraft) -> Option<FilePreviewView> {
    if !matches!(spec.kind, FieldKind::File { .. }) {
        return None;
    }
    if let Some(handle) = PreviewHandle::parse(draft.value(&preview_field(spec.name))) {
        return Some(FilePreviewView {
            src: format!("/previews/{}", handle.id()),
            handle: handle.id().to_string(),
        });
    }
    let stored = draft.value(&stored_field(spec.name));
    (!stored.is_empty()).then(|| FilePreviewView {
        src: storage_path(stored),
        handle: String::new(),
    })
}

pub(crate) fn field_view(
    spec: &FieldSpec,
    name: String,
    value: &str,
    error: Option<&str>,
    preview: Option<FilePreviewView>,
    preview_action: String,
) -> FieldView {
    let (control, input_type, options, accept) = match &spec.kind {
        FieldKind::Text => ("input", "text", Vec::new(), ""),
        FieldKind::Email => ("input", "email", Vec::new(), ""),
        FieldKind::Password => ("input", "password", Vec::new(), ""),
        FieldKind::Number => ("input", "number", Vec::new(), ""),
        FieldKind::Date => ("input", "date", Vec::new(), ""),
        FieldKind::Textarea => ("textarea", "", Vec::new(), ""),
        FieldKind::Select(options) => (
            "select",
            "",
            options
                .iter()
                .map(|option| {
                    OptionView::new(
                        option.value.clone(),
                        option.label.clone(),
                        option.value == value,
                    )
                })
                .collect(),
            "",
        ),
        FieldKind::File { accept } => ("file", "file", Vec::new(), *accept),
    };
    FieldView {
        name,
        label: spec.label.to_string(),
        control,
        input_type,
        value: if control == "file" {
            String::new()
        } else {
            value.to_string()
        },
        required: spec.required,
        options,
        accept: accept.to_string(),
        error: error.map(str::to_string),
        preview,
        preview_action,
    }
}

fn group_view(
    group: &GroupSpec,
    draft: &FormDraft,
    errors: &FieldErrors,
    rows_path: &str,
) -> GroupView {
    let rows = draft
        .group(group.name)
        .items()
        .iter()
        .enumerate()
        .map(|(index, row)| GroupRowView {
            index,
            fields: group
                .fields
                .iter()
                .map(|spec| {
                    field_view(
                        spec,
                        format!("{}[{index}][{}]", group.name, spec.name),
                        row.get(spec.name).map(String::as_str).unwrap_or_default(),
                        errors.first(&format!("{}.{index}.{}", group.name, spec.name)),
                        None,
                        String::new(),
                    )
                })
                .collect(),
            remove_action: format!(
                "{rows_path}?action=remove&group={}&index={index}",
                group.name
            ),
        })
        .collect();
    GroupView {
        name: group.name.to_string(),
        label: group.label.to_string(),
        headers: group
            .fields
            .iter()
            .map(|spec| spec.label.to_string())
            .collect(),
        rows,
        add_action: format!("{rows_path}?action=add&group={}", group.name),
        error: errors.first(group.name).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        forms::{DynamicList, FormIntake, ItemDraft},
        resources::{BarangResource, PeminjamanResource, Quantity},
    };
    use serde_json::json;

    fn service() -> AdminResourceService {
        AdminResourceService::new(Arc::new(NullBackend), AdminUiSettings::default())
    }

    struct NullBackend;

    #[async_trait::async_trait]
    impl BackendGateway for NullBackend {
        async fn fetch_props(
            &self,
            _path: &str,
            _params: &[(String, String)],
        ) -> Result<PageProps, crate::application::backend::BackendError> {
            Ok(PageProps::default())
        }

        async fn fetch_json(
            &self,
            _path: &str,
            _params: &[(String, String)],
        ) -> Result<serde_json::Value, crate::application::backend::BackendError> {
            Ok(serde_json::Value::Null)
        }

        async fn submit(
            &self,
            _method: FormMethod,
            _path: &str,
            _body: MultipartBody,
        ) -> Result<SubmitOutcome, crate::application::backend::BackendError> {
            Ok(SubmitOutcome::accepted())
        }

        async fn submit_json(
            &self,
            _method: FormMethod,
            _path: &str,
            _body: serde_json::Value,
        ) -> Result<SubmitOutcome, crate::application::backend::BackendError> {
            Ok(SubmitOutcome::accepted())
        }

        async fn delete(
            &self,
            _path: &str,
        ) -> Result<SubmitOutcome, crate::application::backend::BackendError> {
            Ok(SubmitOutcome::accepted())
        }

        fn public_url(&self, path: &str) -> String {
            format!("http://backend.test{path}")
        }
    }

    fn barang_list(props: serde_json::Value, query: ListQuery) -> ResourceList<BarangResource> {
        let props = PageProps::new(props);
        let page = props.collection("barang").expect("collection");
        ResourceList { query, page, props }
    }

    #[test]
    fn echo_overrides_the_requested_state() {
        let schema = BarangResource::schema();
        let requested = schema.defaults().with_search("kursi");
        let props = PageProps::new(json!({"filters": {"search": "meja", "perPage": 25}}));
        let applied = applied_query(schema, &requested, &props);
        assert_eq!(applied.search, "meja");
        assert_eq!(applied.per_page, 25);
        assert_eq!(applied.sort_field, "created_at");
    }

    #[test]
    fn list_view_builds_sort_and_page_actions() {
        let schema = BarangResource::schema();
        let query = schema.defaults().with_search("kursi");
        let list = barang_list(
            json!({
                "barang": {
                    "data": [{"id": 7, "nama": "Kursi Lipat", "jumlah": 4, "kondisi": "baik"}],
                    "current_page": 1, "last_page": 2, "per_page": 10, "total": 11
                }
            }),
            query,
        );
        let view = service().list_view(&list);

        let nama = view
            .headers
            .iter()
            .find(|header| header.label == "Nama Barang")
            .expect("nama header");
        assert!(nama.sortable);
        assert!(nama.action.starts_with("/barang/panel?search=kursi&sort_by=nama"));

        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].edit_href, "/barang/7/edit");
        assert!(view.rows[0].delete_confirm.contains("Kursi Lipat"));
        assert_eq!(
            view.pagination.next_action.as_deref(),
            Some(
                "/barang/panel?search=kursi&sort_by=created_at&sort_direction=desc&perPage=10&page=2"
            )
        );
        assert!(view.hidden_fields.iter().all(|field| field.name != "search"));
        assert_eq!(view.export_links.len(), 4);
        assert_eq!(view.search_action, "/barang/panel?_history=replace");
    }

    #[test]
    fn empty_search_results_say_what_was_searched() {
        let schema = BarangResource::schema();
        let list = barang_list(
            json!({"barang": {"data": [], "current_page": 1, "last_page": 1, "per_page": 10, "total": 0}}),
            schema.defaults().with_search("lemari"),
        );
        let view = service().list_view(&list);
        assert_eq!(view.empty_message, "Tidak ada barang yang cocok dengan \"lemari\".");
    }

    #[test]
    fn quantities_are_clamped_per_row() {
        let groups = vec![GroupSpec {
            name: "items",
            label: "Barang",
            fields: Vec::new(),
            quantity: Some(Quantity {
                field: "jumlah",
                source_field: "barang_id",
                available: vec![("7".into(), 3)],
            }),
        }];
        let mut row = ItemDraft::new();
        row.insert("barang_id".into(), "7".into());
        row.insert("jumlah".into(), "10".into());
        let mut blank = ItemDraft::new();
        blank.insert("jumlah".into(), "abc".into());
        let mut draft = FormDraft::new();
        draft.set_group("items", DynamicList::from_items(vec![row, blank]));

        normalize_quantities(&groups, &mut draft);

        let rows = draft.group("items");
        assert_eq!(rows.items()[0].get("jumlah").map(String::as_str), Some("3"));
        assert_eq!(rows.items()[1].get("jumlah").map(String::as_str), Some("1"));
    }

    #[test]
    fn internal_fields_stay_out_of_the_body() {
        let draft = FormDraft::new()
            .with("nama", "Proyektor")
            .with(preview_field("foto"), "4")
            .with(stored_field("foto"), "barang/lama.jpg");
        let body = multipart_body(&draft, None);
        assert_eq!(body.text_value("nama"), Some("Proyektor"));
        assert_eq!(body.parts().len(), 1);
    }

    #[test]
    fn form_view_maps_group_errors_by_dotted_key() {
        let props = PageProps::new(json!({
            "barang": [{"id": 7, "nama": "Kursi", "jumlah": 5, "jumlah_tersedia": 2, "kondisi": "baik"}]
        }));
        let mut intake = FormIntake::new();
        intake.insert("nama_peminjam", "Sari".into());
        intake.insert("items[0][barang_id]", "7".into());
        intake.insert("items[0][jumlah]", "9".into());
        let draft = intake.finish();
        let mut errors = FieldErrors::new();
        errors.push("items.0.jumlah", "Jumlah melebihi stok.");

        let view = service().form_view::<PeminjamanResource>(
            FormMode::Edit(3),
            &props,
            &draft,
            &errors,
        );

        assert_eq!(view.action, "/peminjaman/3/edit");
        let group = &view.groups[0];
        assert_eq!(group.add_action, "/peminjaman/3/form/rows?action=add&group=items");
        let jumlah = &group.rows[0].fields[1];
        assert_eq!(jumlah.name, "items[0][jumlah]");
        assert_eq!(jumlah.error.as_deref(), Some("Jumlah melebihi stok."));
        assert!(view.summary_error.is_some());
    }

    #[test]
    fn stored_files_preview_until_replaced() {
        let draft = FormDraft::new().with(stored_field("foto"), "barang/kursi.jpg");
        let view = service().form_view::<BarangResource>(
            FormMode::Edit(1),
            &PageProps::default(),
            &draft,
            &FieldErrors::new(),
        );
        let foto = view
            .fields
            .iter()
            .find(|field| field.name == "foto")
            .expect("foto field");
        let preview = foto.preview.as_ref().expect("stored preview");
        assert_eq!(preview.src, "/storage/barang/kursi.jpg");
        assert!(preview.handle.is_empty());
        assert_eq!(view.hidden_fields.len(), 1);

        let replaced = draft.with(preview_field("foto"), "12");
        let field = service()
            .file_field_view::<BarangResource>(
                FormMode::Edit(1),
                &PageProps::default(),
                &replaced,
                "foto",
            )
            .expect("file field");
        assert_eq!(field.preview.map(|preview| preview.src).as_deref(), Some("/previews/12"));
    }

    #[test]
    fn flash_keys_map_to_messages() {
        assert_eq!(
            flash_message::<BarangResource>("deleted").as_deref(),
            Some("Barang berhasil dihapus.")
        );
        assert_eq!(flash_message::<BarangResource>("unknown"), None);
    }

    #[test]
    fn status_modal_selects_its_draft() {
        let record: <PeminjamanResource as Resource>::Record = serde_json::from_value(json!({
            "id": 3, "kode": "PJM-3", "nama_peminjam": "Sari", "status": "dipinjam", "items": []
        }))
        .expect("peminjaman");
        let query = PeminjamanResource::schema().decode_query_string("status=dipinjam");
        let mut modal: StatusModal<PeminjamanResource> = Modal::open(record, |record| {
            PeminjamanResource::current_status(record)
                .unwrap_or_default()
                .to_string()
        });

        let selected = |view: &StatusModalView| {
            view.options
                .iter()
                .find(|option| option.selected)
                .map(|option| option.value.clone())
        };
        let view = service()
            .status_modal_view::<PeminjamanResource>(&modal, &query, None)
            .expect("open modal");
        assert_eq!(view.action, "/peminjaman/3/status");
        assert_eq!(selected(&view).as_deref(), Some("dipinjam"));
        assert!(view.hidden_fields.iter().any(|field| field.name == "status"));

        if let Some(draft) = modal.draft_mut() {
            *draft = "dikembalikan".to_string();
        }
        let view = service()
            .status_modal_view::<PeminjamanResource>(&modal, &query, Some("Ditolak".into()))
            .expect("open modal");
        assert_eq!(selected(&view).as_deref(), Some("dikembalikan"));
        assert_eq!(view.error.as_deref(), Some("Ditolak"));

        modal.close();
        assert!(
            service()
                .status_modal_view::<PeminjamanResource>(&modal, &query, None)
                .is_none()
        );
    }
}
