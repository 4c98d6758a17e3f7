use once_cell::sync::Lazy;

use crate::application::{
    backend::{PageProps, storage_path},
    format,
    forms::FormDraft,
    list_query::{QuerySchema, SortDirection},
};
use crate::domain::entities::Dokumentasi;

use super::{Cell, Column, FieldKind, FieldSpec, Resource, RowContext, optional_text};

static SCHEMA: Lazy<QuerySchema> = Lazy::new(|| {
    QuerySchema::new("/dokumentasi")
        .sort_fields(&["created_at", "judul", "tanggal"])
        .default_sort("created_at", SortDirection::Desc)
        .default_per_page(12)
});

const COLUMNS: &[Column] = &[
    Column::plain("file", "Berkas"),
    Column::sortable("judul", "Judul"),
    Column::plain("kategori", "Kategori"),
    Column::sortable("tanggal", "Tanggal"),
];

const ACCEPT: &str = "image/*,application/pdf,.doc,.docx,.xls,.xlsx,.ppt,.pptx";

pub struct DokumentasiResource;

impl Resource for DokumentasiResource {
    type Record = Dokumentasi;

    const SLUG: &'static str = "dokumentasi";
    const TITLE: &'static str = "Dokumentasi";
    const SINGULAR: &'static str = "Dokumentasi";
    const COLLECTION_KEY: &'static str = "dokumentasi";
    const RECORD_KEY: &'static str = "dokumentasi";

    fn schema() -> &'static QuerySchema {
        &SCHEMA
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn id(record: &Dokumentasi) -> u64 {
        record.id
    }

    fn display_name(record: &Dokumentasi) -> String {
        record.judul.clone()
    }

    fn row(record: &Dokumentasi, ctx: &RowContext) -> Vec<Cell> {
        let file = match record.file_path.as_deref() {
            Some(path) if !path.is_empty() && record.is_image() => {
                Cell::image(storage_path(path), record.judul.clone())
            }
            Some(path) if !path.is_empty() => Cell::link("Unduh", storage_path(path)),
            _ => Cell::text("-"),
        };
        vec![
            file,
            Cell::text(record.judul.clone()),
            Cell::optional(record.kategori.as_deref()),
            Cell::text(format::optional_date(record.tanggal.as_deref(), ctx.timezone)),
        ]
    }

    fn form_fields(_props: &PageProps) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("judul", "Judul", FieldKind::Text).required(),
            FieldSpec::new("kategori", "Kategori", FieldKind::Text),
            FieldSpec::new("tanggal", "Tanggal", FieldKind::Date),
            FieldSpec::new("deskripsi", "Deskripsi", FieldKind::Textarea),
            FieldSpec::new("file", "Berkas", FieldKind::File { accept: ACCEPT }),
        ]
    }

    fn draft_from(record: &Dokumentasi) -> FormDraft {
        FormDraft::new()
            .with("judul", record.judul.clone())
            .with("kategori", optional_text(record.kategori.as_deref()))
            .with(
                "tanggal",
                format::input_date(record.tanggal.as_deref().unwrap_or_default()),
            )
            .with("deskripsi", optional_text(record.deskripsi.as_deref()))
    }

    fn stored_file(record: &Dokumentasi) -> Option<String> {
        record
            .file_path
            .clone()
            .filter(|path| !path.is_empty() && record.is_image())
    }
}
