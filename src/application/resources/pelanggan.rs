use once_cell::sync::Lazy;

use crate::application::{
    backend::PageProps,
    forms::FormDraft,
    list_query::{QuerySchema, SortDirection},
};
use crate::domain::entities::Pelanggan;

use super::{
    Cell, Column, ExtraFilter, FieldKind, FieldSpec, Resource, RowContext, optional_number,
    optional_text, props_options,
};

static SCHEMA: Lazy<QuerySchema> = Lazy::new(|| {
    QuerySchema::new("/pelanggan")
        .sort_fields(&["created_at", "nama", "transaksi_count"])
        .default_sort("created_at", SortDirection::Desc)
        .extra_keys(&["sesi_penjualan_id"])
});

const COLUMNS: &[Column] = &[
    Column::sortable("nama", "Nama"),
    Column::plain("telepon", "Telepon"),
    Column::plain("alamat", "Alamat"),
    Column::plain("sesi_penjualan", "Sesi Penjualan"),
    Column::sortable("transaksi_count", "Transaksi"),
];

const SESSIONS_PROP: &str = "sesiPenjualan";

pub struct PelangganResource;

impl Resource for PelangganResource {
    type Record = Pelanggan;

    const SLUG: &'static str = "pelanggan";
    const TITLE: &'static str = "Pelanggan";
    const SINGULAR: &'static str = "Pelanggan";
    const COLLECTION_KEY: &'static str = "pelanggan";
    const RECORD_KEY: &'static str = "pelanggan";

    fn schema() -> &'static QuerySchema {
        &SCHEMA
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn id(record: &Pelanggan) -> u64 {
        record.id
    }

    fn display_name(record: &Pelanggan) -> String {
        record.nama.clone()
    }

    fn row(record: &Pelanggan, _ctx: &RowContext) -> Vec<Cell> {
        vec![
            Cell::text(record.nama.clone()),
            Cell::optional(record.telepon.as_deref()),
            Cell::optional(record.alamat.as_deref()),
            Cell::optional(record.sesi_penjualan.as_ref().map(|sesi| sesi.nama.as_str())),
            Cell::text(record.transaksi_count.to_string()),
        ]
    }

    fn form_fields(props: &PageProps) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("nama", "Nama", FieldKind::Text).required(),
            FieldSpec::new("telepon", "Telepon", FieldKind::Text),
            FieldSpec::new("alamat", "Alamat", FieldKind::Textarea),
            FieldSpec::new(
                "sesi_penjualan_id",
                "Sesi Penjualan",
                FieldKind::Select(props_options(props, SESSIONS_PROP, "id", "nama")),
            ),
        ]
    }

    fn draft_from(record: &Pelanggan) -> FormDraft {
        FormDraft::new()
            .with("nama", record.nama.clone())
            .with("telepon", optional_text(record.telepon.as_deref()))
            .with("alamat", optional_text(record.alamat.as_deref()))
            .with("sesi_penjualan_id", optional_number(record.sesi_penjualan_id))
    }

    fn extra_filters(props: &PageProps) -> Vec<ExtraFilter> {
        vec![ExtraFilter {
            key: "sesi_penjualan_id",
            label: "Sesi Penjualan",
            options: props_options(props, SESSIONS_PROP, "id", "nama"),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_extra_round_trips_through_url() {
        let schema = PelangganResource::schema();
        let query = schema.defaults().with_extra("sesi_penjualan_id", Some("3".into()));
        assert_eq!(
            schema.href(&query),
            "/pelanggan?sort_by=created_at&sort_direction=desc&sesi_penjualan_id=3&perPage=10&page=1"
        );
    }

    #[test]
    fn session_options_come_from_props() {
        let props = PageProps::new(json!({"sesiPenjualan": [{"id": 3, "nama": "Bazar Ramadhan"}]}));
        let filters = PelangganResource::extra_filters(&props);
        assert_eq!(filters[0].options[0].label, "Bazar Ramadhan");
    }
}
