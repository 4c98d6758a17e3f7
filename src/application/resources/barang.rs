use once_cell::sync::Lazy;

use crate::application::{
    backend::{PageProps, storage_path},
    forms::{DynamicList, FormDraft, ItemDraft},
    list_query::{QuerySchema, SortDirection},
};
use crate::domain::{
    entities::Barang,
    types::{KondisiBarang, StatusKey},
};

use super::{
    Cell, Column, FieldKind, FieldSpec, GroupSpec, Resource, RowContext, SelectOption,
    optional_number, optional_text,
};

static SCHEMA: Lazy<QuerySchema> = Lazy::new(|| {
    QuerySchema::new("/barang")
        .sort_fields(&["created_at", "kode", "nama", "jumlah", "kondisi"])
        .default_sort("created_at", SortDirection::Desc)
        .filter_values(KondisiBarang::selectable().iter().map(|kondisi| kondisi.key()))
});

const COLUMNS: &[Column] = &[
    Column::plain("foto", "Foto"),
    Column::sortable("kode", "Kode"),
    Column::sortable("nama", "Nama Barang"),
    Column::plain("kategori", "Kategori"),
    Column::sortable("jumlah", "Tersedia / Total"),
    Column::sortable("kondisi", "Kondisi"),
    Column::plain("lokasi", "Lokasi"),
];

pub fn kondisi_tone(kondisi: KondisiBarang) -> &'static str {
    match kondisi {
        KondisiBarang::Baik => "success",
        KondisiBarang::RusakRingan => "warning",
        KondisiBarang::RusakBerat => "danger",
        KondisiBarang::Lainnya => "muted",
    }
}

pub struct BarangResource;

impl Resource for BarangResource {
    type Record = Barang;

    const SLUG: &'static str = "barang";
    const TITLE: &'static str = "Data Barang";
    const SINGULAR: &'static str = "Barang";
    const COLLECTION_KEY: &'static str = "barang";
    const RECORD_KEY: &'static str = "barang";

    fn schema() -> &'static QuerySchema {
        &SCHEMA
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn id(record: &Barang) -> u64 {
        record.id
    }

    fn display_name(record: &Barang) -> String {
        record.nama.clone()
    }

    fn row(record: &Barang, _ctx: &RowContext) -> Vec<Cell> {
        let foto = match record.foto.as_deref() {
            Some(path) if !path.is_empty() => Cell::image(storage_path(path), record.nama.clone()),
            _ => Cell::text("-"),
        };
        vec![
            foto,
            Cell::optional(record.kode.as_deref()),
            Cell::text(record.nama.clone()),
            Cell::optional(record.kategori.as_deref()),
            Cell::text(format!("{} / {}", record.available(), record.jumlah)),
            Cell::badge(record.kondisi.label(), kondisi_tone(record.kondisi)),
            Cell::optional(record.lokasi.as_deref()),
        ]
    }

    fn form_fields(_props: &PageProps) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("kode", "Kode Barang", FieldKind::Text),
            FieldSpec::new("nama", "Nama Barang", FieldKind::Text).required(),
            FieldSpec::new("kategori", "Kategori", FieldKind::Text),
            FieldSpec::new("jumlah", "Jumlah", FieldKind::Number).required(),
            FieldSpec::new(
                "kondisi",
                "Kondisi",
                FieldKind::Select(SelectOption::from_status::<KondisiBarang>()),
            )
            .required(),
            FieldSpec::new("lokasi", "Lokasi", FieldKind::Text),
            FieldSpec::new("deskripsi", "Deskripsi", FieldKind::Textarea),
            FieldSpec::new("foto", "Foto", FieldKind::File { accept: "image/*" }),
        ]
    }

    fn item_groups(_props: &PageProps) -> Vec<GroupSpec> {
        vec![GroupSpec {
            name: "spesifikasi",
            label: "Spesifikasi",
            fields: vec![
                FieldSpec::new("nama", "Nama", FieldKind::Text).required(),
                FieldSpec::new("nilai", "Nilai", FieldKind::Text),
                FieldSpec::new("jumlah", "Jumlah", FieldKind::Number),
            ],
            quantity: None,
        }]
    }

    fn draft_from(record: &Barang) -> FormDraft {
        let mut draft = FormDraft::new()
            .with("kode", optional_text(record.kode.as_deref()))
            .with("nama", record.nama.clone())
            .with("kategori", optional_text(record.kategori.as_deref()))
            .with("jumlah", record.jumlah.to_string())
            .with("kondisi", record.kondisi.key())
            .with("lokasi", optional_text(record.lokasi.as_deref()))
            .with("deskripsi", optional_text(record.deskripsi.as_deref()));
        let rows = record
            .spesifikasi
            .iter()
            .map(|spec| {
                let mut row = ItemDraft::new();
                if let Some(id) = spec.id {
                    row.insert("id".into(), id.to_string());
                }
                row.insert("nama".into(), spec.nama.clone());
                row.insert("nilai".into(), optional_text(spec.nilai.as_deref()));
                row.insert("jumlah".into(), optional_number(spec.jumlah));
                row
            })
            .collect();
        draft.set_group("spesifikasi", DynamicList::from_items(rows));
        draft
    }

    fn filter_tabs() -> Vec<SelectOption> {
        SelectOption::from_status::<KondisiBarang>()
    }

    fn stored_file(record: &Barang) -> Option<String> {
        record.foto.clone().filter(|path| !path.is_empty())
    }

    fn has_exports() -> bool {
        true
    }
}

/// Short availability note for a stock-bounded select.
pub fn availability_label(record: &Barang) -> String {
    format!("{} (tersedia {})", record.nama, record.available())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;
    use serde_json::json;

    fn kursi() -> Barang {
        serde_json::from_value(json!({
            "id": 4,
            "kode": "BRG-004",
            "nama": "Kursi Lipat",
            "jumlah": 20,
            "jumlah_tersedia": 12,
            "kondisi": "rusak_ringan",
            "foto": "barang/kursi.jpg",
            "spesifikasi": [{"id": 1, "nama": "Warna", "nilai": "Hitam", "jumlah": 20}]
        }))
        .expect("barang")
    }

    #[test]
    fn row_renders_availability_and_badge() {
        let ctx = RowContext { timezone: Tz::UTC };
        let cells = BarangResource::row(&kursi(), &ctx);
        assert_eq!(cells.len(), BarangResource::columns().len());
        assert_eq!(cells[0].image.as_deref(), Some("/storage/barang/kursi.jpg"));
        assert_eq!(cells[4].text, "12 / 20");
        assert_eq!(cells[5].tone, Some("warning"));
        assert_eq!(cells[6].text, "-");
    }

    #[test]
    fn draft_carries_spec_rows() {
        let draft = BarangResource::draft_from(&kursi());
        assert_eq!(draft.value("kondisi"), "rusak_ringan");
        let rows = draft.group("spesifikasi");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.items()[0].get("nilai").map(String::as_str), Some("Hitam"));
    }

    #[test]
    fn unknown_condition_filter_is_dropped() {
        let query = BarangResource::schema().decode([("filter", "hilang")]);
        assert_eq!(query.filter, None);
        let query = BarangResource::schema().decode([("filter", "baik")]);
        assert_eq!(query.filter.as_deref(), Some("baik"));
    }

    #[test]
    fn availability_label_names_units() {
        assert_eq!(availability_label(&kursi()), "Kursi Lipat (tersedia 12)");
    }
}
