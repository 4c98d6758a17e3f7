use once_cell::sync::Lazy;

use crate::application::{
    backend::PageProps,
    format,
    forms::{DynamicList, FormDraft, ItemDraft},
    list_query::{ParamNames, QuerySchema, SortDirection},
};
use crate::domain::{
    entities::{Barang, Peminjaman},
    types::{PeminjamanStatus, StatusKey},
};

use super::{
    Cell, Column, FieldKind, FieldSpec, GroupSpec, Quantity, Resource, RowContext, SelectOption,
    barang::availability_label, optional_number, optional_text,
};

static SCHEMA: Lazy<QuerySchema> = Lazy::new(|| {
    QuerySchema::new("/peminjaman")
        .names(ParamNames::CAMEL)
        .sort_fields(&["created_at", "tanggal_pinjam", "nama_peminjam", "status"])
        .default_sort("created_at", SortDirection::Desc)
        .filter_values(PeminjamanStatus::selectable().iter().map(|status| status.key()))
});

const COLUMNS: &[Column] = &[
    Column::plain("kode", "Kode"),
    Column::sortable("nama_peminjam", "Peminjam"),
    Column::sortable("tanggal_pinjam", "Tanggal Pinjam"),
    Column::plain("tanggal_kembali", "Tanggal Kembali"),
    Column::plain("items", "Jumlah Barang"),
    Column::sortable("status", "Status"),
];

pub fn status_tone(status: PeminjamanStatus) -> &'static str {
    match status {
        PeminjamanStatus::Menunggu => "warning",
        PeminjamanStatus::Disetujui => "info",
        PeminjamanStatus::Dipinjam => "info",
        PeminjamanStatus::Dikembalikan => "success",
        PeminjamanStatus::Ditolak => "danger",
        PeminjamanStatus::Lainnya => "muted",
    }
}

/// Items offered on the loan form, read from the `barang` prop.
fn lendable(props: &PageProps) -> Vec<Barang> {
    props.list::<Barang>("barang").unwrap_or_default()
}

pub struct PeminjamanResource;

impl Resource for PeminjamanResource {
    type Record = Peminjaman;

    const SLUG: &'static str = "peminjaman";
    const TITLE: &'static str = "Peminjaman Barang";
    const SINGULAR: &'static str = "Peminjaman";
    const COLLECTION_KEY: &'static str = "peminjaman";
    const RECORD_KEY: &'static str = "peminjaman";

    fn schema() -> &'static QuerySchema {
        &SCHEMA
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn id(record: &Peminjaman) -> u64 {
        record.id
    }

    fn display_name(record: &Peminjaman) -> String {
        match record.kode.as_deref() {
            Some(kode) if !kode.is_empty() => format!("{kode} ({})", record.nama_peminjam),
            _ => record.nama_peminjam.clone(),
        }
    }

    fn row(record: &Peminjaman, ctx: &RowContext) -> Vec<Cell> {
        vec![
            Cell::optional(record.kode.as_deref()),
            Cell::text(record.nama_peminjam.clone()),
            Cell::text(format::optional_date(
                record.tanggal_pinjam.as_deref(),
                ctx.timezone,
            )),
            Cell::text(format::optional_date(
                record.tanggal_kembali.as_deref(),
                ctx.timezone,
            )),
            Cell::text(format!(
                "{} unit / {} barang",
                record.total_units(),
                record.items.len()
            )),
            Cell::badge(record.status.label(), status_tone(record.status)),
        ]
    }

    fn form_fields(_props: &PageProps) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("nama_peminjam", "Nama Peminjam", FieldKind::Text).required(),
            FieldSpec::new("kontak", "Kontak", FieldKind::Text),
            FieldSpec::new("tanggal_pinjam", "Tanggal Pinjam", FieldKind::Date).required(),
            FieldSpec::new("tanggal_kembali", "Tanggal Kembali", FieldKind::Date),
            FieldSpec::new("keperluan", "Keperluan", FieldKind::Textarea),
            FieldSpec::new("catatan", "Catatan", FieldKind::Textarea),
        ]
    }

    fn item_groups(props: &PageProps) -> Vec<GroupSpec> {
        let barang = lendable(props);
        let options = barang
            .iter()
            .map(|item| SelectOption::new(item.id.to_string(), availability_label(item)))
            .collect();
        let available = barang
            .iter()
            .map(|item| (item.id.to_string(), item.available()))
            .collect();
        vec![GroupSpec {
            name: "items",
            label: "Barang Dipinjam",
            fields: vec![
                FieldSpec::new("barang_id", "Barang", FieldKind::Select(options)).required(),
                FieldSpec::new("jumlah", "Jumlah", FieldKind::Number).required(),
            ],
            quantity: Some(Quantity {
                field: "jumlah",
                source_field: "barang_id",
                available,
            }),
        }]
    }

    fn draft_from(record: &Peminjaman) -> FormDraft {
        let mut draft = FormDraft::new()
            .with("nama_peminjam", record.nama_peminjam.clone())
            .with("kontak", optional_text(record.kontak.as_deref()))
            .with(
                "tanggal_pinjam",
                format::input_date(record.tanggal_pinjam.as_deref().unwrap_or_default()),
            )
            .with(
                "tanggal_kembali",
                format::input_date(record.tanggal_kembali.as_deref().unwrap_or_default()),
            )
            .with("keperluan", optional_text(record.keperluan.as_deref()))
            .with("catatan", optional_text(record.catatan.as_deref()));
        let rows = record
            .items
            .iter()
            .map(|item| {
                let mut row = ItemDraft::new();
                row.insert("barang_id".into(), item.barang_id.to_string());
                row.insert("spesifikasi_id".into(), optional_number(item.spesifikasi_id));
                row.insert("jumlah".into(), item.jumlah.to_string());
                row
            })
            .collect();
        draft.set_group("items", DynamicList::from_items(rows));
        draft
    }

    fn filter_tabs() -> Vec<SelectOption> {
        SelectOption::from_status::<PeminjamanStatus>()
    }

    fn status_options() -> Vec<SelectOption> {
        SelectOption::from_status::<PeminjamanStatus>()
    }

    fn current_status(record: &Peminjaman) -> Option<&'static str> {
        Some(record.status.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_filter_uses_camel_names() {
        let schema = PeminjamanResource::schema();
        let query = schema.decode([("status", "dipinjam"), ("sortBy", "nama_peminjam"), ("sortDir", "asc")]);
        assert_eq!(query.filter.as_deref(), Some("dipinjam"));
        assert_eq!(query.sort_field, "nama_peminjam");
        assert_eq!(
            schema.to_query_string(&query),
            "sortBy=nama_peminjam&sortDir=asc&status=dipinjam&perPage=10&page=1"
        );
    }

    #[test]
    fn loan_items_are_bounded_by_availability() {
        let props = PageProps::new(json!({
            "barang": [
                {"id": 1, "nama": "Tenda", "jumlah": 5, "jumlah_tersedia": 3},
                {"id": 2, "nama": "Tali", "jumlah": 10}
            ]
        }));
        let groups = PeminjamanResource::item_groups(&props);
        let quantity = groups[0].quantity.as_ref().expect("quantity");
        assert_eq!(quantity.available_for("1"), Some(3));
        assert_eq!(quantity.available_for("2"), Some(10));
        assert_eq!(quantity.available_for("9"), None);
    }

    #[test]
    fn display_name_prefers_code() {
        let record: Peminjaman = serde_json::from_value(json!({
            "id": 3, "kode": "PJM-3", "nama_peminjam": "Sari", "status": "dipinjam",
            "items": [{"barang_id": 1, "jumlah": 2}, {"barang_id": "2", "jumlah": "1"}]
        }))
        .expect("peminjaman");
        assert_eq!(PeminjamanResource::display_name(&record), "PJM-3 (Sari)");
        assert_eq!(record.total_units(), 3);
        assert_eq!(PeminjamanResource::current_status(&record), Some("dipinjam"));
    }
}
