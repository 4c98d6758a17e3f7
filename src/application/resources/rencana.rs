use once_cell::sync::Lazy;

use crate::application::{
    backend::PageProps,
    format,
    forms::FormDraft,
    list_query::{ParamNames, QuerySchema, SortDirection},
};
use crate::domain::{
    entities::Rencana,
    types::{RencanaStatus, StatusKey},
};

use super::{Cell, Column, FieldKind, FieldSpec, Resource, RowContext, SelectOption, optional_text};

static SCHEMA: Lazy<QuerySchema> = Lazy::new(|| {
    QuerySchema::new("/rencana")
        .names(ParamNames::SNAKE.with_filter("status"))
        .sort_fields(&["created_at", "judul", "tanggal_mulai", "anggaran", "status"])
        .default_sort("created_at", SortDirection::Desc)
        .filter_values(RencanaStatus::selectable().iter().map(|status| status.key()))
});

const COLUMNS: &[Column] = &[
    Column::sortable("judul", "Kegiatan"),
    Column::sortable("tanggal_mulai", "Periode"),
    Column::sortable("anggaran", "Anggaran"),
    Column::plain("penanggung_jawab", "Penanggung Jawab"),
    Column::sortable("status", "Status"),
];

pub fn status_tone(status: RencanaStatus) -> &'static str {
    match status {
        RencanaStatus::Direncanakan => "muted",
        RencanaStatus::Berjalan => "info",
        RencanaStatus::Selesai => "success",
        RencanaStatus::Dibatalkan => "danger",
        RencanaStatus::Lainnya => "muted",
    }
}

pub struct RencanaResource;

impl Resource for RencanaResource {
    type Record = Rencana;

    const SLUG: &'static str = "rencana";
    const TITLE: &'static str = "Rencana Kegiatan";
    const SINGULAR: &'static str = "Rencana";
    const COLLECTION_KEY: &'static str = "rencana";
    const RECORD_KEY: &'static str = "rencana";

    fn schema() -> &'static QuerySchema {
        &SCHEMA
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn id(record: &Rencana) -> u64 {
        record.id
    }

    fn display_name(record: &Rencana) -> String {
        record.judul.clone()
    }

    fn row(record: &Rencana, ctx: &RowContext) -> Vec<Cell> {
        let start = format::optional_date(record.tanggal_mulai.as_deref(), ctx.timezone);
        let period = match record.tanggal_selesai.as_deref() {
            Some(end) if !end.is_empty() => {
                format!("{start} s.d. {}", format::date(end, ctx.timezone))
            }
            _ => start,
        };
        vec![
            Cell::text(record.judul.clone()),
            Cell::text(period),
            Cell::text(
                record
                    .anggaran
                    .map(format::rupiah)
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::optional(record.penanggung_jawab.as_deref()),
            Cell::badge(record.status.label(), status_tone(record.status)),
        ]
    }

    fn form_fields(_props: &PageProps) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("judul", "Nama Kegiatan", FieldKind::Text).required(),
            FieldSpec::new("deskripsi", "Deskripsi", FieldKind::Textarea),
            FieldSpec::new("tanggal_mulai", "Tanggal Mulai", FieldKind::Date).required(),
            FieldSpec::new("tanggal_selesai", "Tanggal Selesai", FieldKind::Date),
            FieldSpec::new("anggaran", "Anggaran (Rp)", FieldKind::Number),
            FieldSpec::new("penanggung_jawab", "Penanggung Jawab", FieldKind::Text),
            FieldSpec::new(
                "status",
                "Status",
                FieldKind::Select(SelectOption::from_status::<RencanaStatus>()),
            ),
        ]
    }

    fn draft_from(record: &Rencana) -> FormDraft {
        FormDraft::new()
            .with("judul", record.judul.clone())
            .with("deskripsi", optional_text(record.deskripsi.as_deref()))
            .with(
                "tanggal_mulai",
                format::input_date(record.tanggal_mulai.as_deref().unwrap_or_default()),
            )
            .with(
                "tanggal_selesai",
                format::input_date(record.tanggal_selesai.as_deref().unwrap_or_default()),
            )
            .with(
                "anggaran",
                record
                    .anggaran
                    .map(|value| format!("{value}"))
                    .unwrap_or_default(),
            )
            .with(
                "penanggung_jawab",
                optional_text(record.penanggung_jawab.as_deref()),
            )
            .with("status", record.status.key())
    }

    fn filter_tabs() -> Vec<SelectOption> {
        SelectOption::from_status::<RencanaStatus>()
    }

    fn status_options() -> Vec<SelectOption> {
        SelectOption::from_status::<RencanaStatus>()
    }

    fn current_status(record: &Rencana) -> Option<&'static str> {
        Some(record.status.key())
    }
}
