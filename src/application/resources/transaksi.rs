use once_cell::sync::Lazy;

use crate::application::{
    backend::PageProps,
    format,
    forms::{DynamicList, FormDraft, ItemDraft},
    list_query::{ParamNames, QuerySchema, SortDirection},
};
use crate::domain::{
    entities::Transaksi,
    types::{StatusKey, TransaksiStatus},
};

use super::{
    Cell, Column, ExtraFilter, FieldKind, FieldSpec, GroupSpec, Resource, RowContext,
    SelectOption, optional_number, props_options,
};

static SCHEMA: Lazy<QuerySchema> = Lazy::new(|| {
    QuerySchema::new("/transaksi")
        .names(ParamNames::CAMEL)
        .sort_fields(&["created_at", "tanggal", "total", "status"])
        .default_sort("created_at", SortDirection::Desc)
        .filter_values(TransaksiStatus::selectable().iter().map(|status| status.key()))
        .extra_keys(&["sesi_penjualan_id"])
});

const COLUMNS: &[Column] = &[
    Column::plain("kode", "Kode"),
    Column::plain("pelanggan", "Pelanggan"),
    Column::sortable("tanggal", "Tanggal"),
    Column::plain("items", "Item"),
    Column::sortable("total", "Total"),
    Column::sortable("status", "Status"),
];

const SESSIONS_PROP: &str = "sesiPenjualan";

pub fn status_tone(status: TransaksiStatus) -> &'static str {
    match status {
        TransaksiStatus::Pending => "warning",
        TransaksiStatus::Diproses => "info",
        TransaksiStatus::Selesai => "success",
        TransaksiStatus::Dibatalkan => "danger",
        TransaksiStatus::Lainnya => "muted",
    }
}

pub struct TransaksiResource;

impl Resource for TransaksiResource {
    type Record = Transaksi;

    const SLUG: &'static str = "transaksi";
    const TITLE: &'static str = "Transaksi";
    const SINGULAR: &'static str = "Transaksi";
    const COLLECTION_KEY: &'static str = "transaksi";
    const RECORD_KEY: &'static str = "transaksi";

    fn schema() -> &'static QuerySchema {
        &SCHEMA
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn id(record: &Transaksi) -> u64 {
        record.id
    }

    fn display_name(record: &Transaksi) -> String {
        record
            .kode
            .clone()
            .filter(|kode| !kode.is_empty())
            .unwrap_or_else(|| format!("#{}", record.id))
    }

    fn row(record: &Transaksi, ctx: &RowContext) -> Vec<Cell> {
        vec![
            Cell::text(Self::display_name(record)),
            Cell::optional(record.pelanggan.as_ref().map(|pelanggan| pelanggan.nama.as_str())),
            Cell::text(format::optional_date(record.tanggal.as_deref(), ctx.timezone)),
            Cell::text(format!("{} item", record.items.len())),
            Cell::text(format::rupiah(record.total)),
            Cell::badge(record.status.label(), status_tone(record.status)),
        ]
    }

    fn form_fields(props: &PageProps) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new(
                "pelanggan_id",
                "Pelanggan",
                FieldKind::Select(props_options(props, "pelanggan", "id", "nama")),
            )
            .required(),
            FieldSpec::new(
                "sesi_penjualan_id",
                "Sesi Penjualan",
                FieldKind::Select(props_options(props, SESSIONS_PROP, "id", "nama")),
            ),
            FieldSpec::new("tanggal", "Tanggal", FieldKind::Date).required(),
        ]
    }

    fn item_groups(_props: &PageProps) -> Vec<GroupSpec> {
        vec![GroupSpec {
            name: "items",
            label: "Menu",
            fields: vec![
                FieldSpec::new("nama_menu", "Menu", FieldKind::Text).required(),
                FieldSpec::new("jumlah", "Jumlah", FieldKind::Number).required(),
                FieldSpec::new("harga", "Harga", FieldKind::Number).required(),
            ],
            quantity: None,
        }]
    }

    fn draft_from(record: &Transaksi) -> FormDraft {
        let mut draft = FormDraft::new()
            .with("pelanggan_id", optional_number(record.pelanggan_id))
            .with("sesi_penjualan_id", optional_number(record.sesi_penjualan_id))
            .with(
                "tanggal",
                format::input_date(record.tanggal.as_deref().unwrap_or_default()),
            );
        let rows = record
            .items
            .iter()
            .map(|item| {
                let mut row = ItemDraft::new();
                row.insert("menu_id".into(), optional_number(item.menu_id));
                row.insert("nama_menu".into(), item.nama_menu.clone());
                row.insert("jumlah".into(), item.jumlah.to_string());
                row.insert("harga".into(), format!("{}", item.harga));
                row
            })
            .collect();
        draft.set_group("items", DynamicList::from_items(rows));
        draft
    }

    fn filter_tabs() -> Vec<SelectOption> {
        SelectOption::from_status::<TransaksiStatus>()
    }

    fn extra_filters(props: &PageProps) -> Vec<ExtraFilter> {
        vec![ExtraFilter {
            key: "sesi_penjualan_id",
            label: "Sesi Penjualan",
            options: props_options(props, SESSIONS_PROP, "id", "nama"),
        }]
    }

    fn status_options() -> Vec<SelectOption> {
        SelectOption::from_status::<TransaksiStatus>()
    }

    fn current_status(record: &Transaksi) -> Option<&'static str> {
        Some(record.status.key())
    }
}
