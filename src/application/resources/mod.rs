//! Per-resource descriptions driving the generic list, form and status
//! handlers.
//!
//! A resource names where its records live on the backend, how its list is
//! queried, which columns the table shows and which fields its form edits.
//! Everything else (paging, search, validation display, deletes) is shared.

pub mod barang;
pub mod dokumentasi;
pub mod peminjaman;
pub mod pelanggan;
pub mod pengguna;
pub mod rencana;
pub mod transaksi;

use chrono_tz::Tz;
use serde::de::DeserializeOwned;

use crate::application::{
    backend::PageProps,
    forms::FormDraft,
    list_query::QuerySchema,
};
use crate::domain::types::StatusKey;

pub use barang::BarangResource;
pub use dokumentasi::DokumentasiResource;
pub use peminjaman::PeminjamanResource;
pub use pelanggan::PelangganResource;
pub use pengguna::PenggunaResource;
pub use rencana::RencanaResource;
pub use transaksi::TransaksiResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
}

impl Column {
    pub const fn sortable(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: true,
        }
    }

    pub const fn plain(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: false,
        }
    }
}

/// One rendered table cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub text: String,
    /// Badge tone (`success`, `warning`, `danger`, `info`, `muted`).
    pub tone: Option<&'static str>,
    pub image: Option<String>,
    pub href: Option<String>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn optional(text: Option<&str>) -> Self {
        Self::text(
            text.map(str::trim)
                .filter(|value| !value.is_empty())
                .unwrap_or("-"),
        )
    }

    pub fn badge(text: impl Into<String>, tone: &'static str) -> Self {
        Self {
            text: text.into(),
            tone: Some(tone),
            ..Self::default()
        }
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            text: alt.into(),
            image: Some(src.into()),
            ..Self::default()
        }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
            ..Self::default()
        }
    }
}

/// Formatting context for cells.
#[derive(Debug, Clone, Copy)]
pub struct RowContext {
    pub timezone: Tz,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    pub fn from_status<S: StatusKey>() -> Vec<Self> {
        S::selectable()
            .iter()
            .map(|status| Self::new(status.key(), status.label()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Date,
    Textarea,
    Select(Vec<SelectOption>),
    File { accept: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Repeated sub-records edited as rows (`items[0][barang_id]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub fields: Vec<FieldSpec>,
    /// Quantity field clamped against `available` when both are known.
    pub quantity: Option<Quantity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantity {
    pub field: &'static str,
    /// Field naming the picked option whose availability bounds the quantity.
    pub source_field: &'static str,
    /// Option value to units available.
    pub available: Vec<(String, u64)>,
}

impl Quantity {
    pub fn available_for(&self, value: &str) -> Option<u64> {
        self.available
            .iter()
            .find(|(candidate, _)| candidate == value)
            .map(|(_, units)| *units)
    }
}

/// Extra select shown beside the search box (role, sangga, month).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraFilter {
    pub key: &'static str,
    pub label: &'static str,
    pub options: Vec<SelectOption>,
}

pub trait Resource: Send + Sync + 'static {
    type Record: DeserializeOwned + Send + Sync;

    /// Route segment, also the backend route prefix.
    const SLUG: &'static str;
    const TITLE: &'static str;
    const SINGULAR: &'static str;
    /// Props key holding the paginated collection.
    const COLLECTION_KEY: &'static str;
    /// Props key holding the record on edit pages.
    const RECORD_KEY: &'static str;

    fn schema() -> &'static QuerySchema;

    fn columns() -> &'static [Column];

    fn id(record: &Self::Record) -> u64;

    fn display_name(record: &Self::Record) -> String;

    fn row(record: &Self::Record, ctx: &RowContext) -> Vec<Cell>;

    /// Form fields; option lists may come from the create/edit props.
    fn form_fields(props: &PageProps) -> Vec<FieldSpec>;

    fn item_groups(_props: &PageProps) -> Vec<GroupSpec> {
        Vec::new()
    }

    fn draft_from(record: &Self::Record) -> FormDraft;

    /// Tabs above the table, keyed by the schema's filter parameter.
    fn filter_tabs() -> Vec<SelectOption> {
        Vec::new()
    }

    fn extra_filters(_props: &PageProps) -> Vec<ExtraFilter> {
        Vec::new()
    }

    /// Choices offered by the status modal. Empty means no status modal.
    fn status_options() -> Vec<SelectOption> {
        Vec::new()
    }

    fn current_status(_record: &Self::Record) -> Option<&'static str> {
        None
    }

    fn has_status() -> bool {
        !Self::status_options().is_empty()
    }

    fn index_path() -> &'static str {
        Self::schema().path()
    }

    /// Path of the file already stored for a record, shown until replaced.
    fn stored_file(_record: &Self::Record) -> Option<String> {
        None
    }

    /// Whether the list offers the export menu.
    fn has_exports() -> bool {
        false
    }
}

/// Backend routes derived from the slug.
pub struct Routes;

impl Routes {
    pub fn store<R: Resource>() -> String {
        format!("/{}", R::SLUG)
    }

    pub fn create_props<R: Resource>() -> String {
        format!("/{}/create", R::SLUG)
    }

    pub fn edit_props<R: Resource>(id: u64) -> String {
        format!("/{}/{id}/edit", R::SLUG)
    }

    pub fn record<R: Resource>(id: u64) -> String {
        format!("/{}/{id}", R::SLUG)
    }

    pub fn status<R: Resource>(id: u64) -> String {
        format!("/{}/{id}/status", R::SLUG)
    }
}

/// Select options read from an array in the props, e.g. `barang` on the
/// loan form. Missing or malformed entries are skipped.
pub fn props_options(
    props: &PageProps,
    key: &str,
    value_field: &str,
    label_field: &str,
) -> Vec<SelectOption> {
    let Some(items) = props.get(key).and_then(serde_json::Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let value = scalar(item.get(value_field)?)?;
            let label = item
                .get(label_field)
                .and_then(scalar)
                .unwrap_or_else(|| value.clone());
            Some(SelectOption::new(value, label))
        })
        .collect()
}

fn scalar(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Year options around `current`, newest first.
pub fn year_options(current: i32, span: i32) -> Vec<SelectOption> {
    (current - span..=current)
        .rev()
        .map(|year| SelectOption::new(year.to_string(), year.to_string()))
        .collect()
}

pub fn month_options() -> Vec<SelectOption> {
    (1..=12u32)
        .filter_map(|month| {
            crate::application::format::month_name(month)
                .map(|name| SelectOption::new(month.to_string(), name))
        })
        .collect()
}

pub fn optional_text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

pub fn optional_number<T: ToString>(value: Option<T>) -> String {
    value.map(|number| number.to_string()).unwrap_or_default()
}
