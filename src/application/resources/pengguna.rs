use once_cell::sync::Lazy;

use crate::application::{
    backend::PageProps,
    forms::FormDraft,
    list_query::{QuerySchema, SortDirection},
};
use crate::domain::entities::Pengguna;

use super::{
    Cell, Column, ExtraFilter, FieldKind, FieldSpec, Resource, RowContext, optional_number,
    optional_text, props_options,
};

static SCHEMA: Lazy<QuerySchema> = Lazy::new(|| {
    QuerySchema::new("/pengguna")
        .sort_fields(&["created_at", "name", "email"])
        .default_sort("created_at", SortDirection::Desc)
        .extra_keys(&["role_id"])
});

const COLUMNS: &[Column] = &[
    Column::sortable("name", "Nama"),
    Column::sortable("email", "Email"),
    Column::plain("role", "Peran"),
];

pub struct PenggunaResource;

impl Resource for PenggunaResource {
    type Record = Pengguna;

    const SLUG: &'static str = "pengguna";
    const TITLE: &'static str = "Pengguna";
    const SINGULAR: &'static str = "Pengguna";
    const COLLECTION_KEY: &'static str = "users";
    const RECORD_KEY: &'static str = "user";

    fn schema() -> &'static QuerySchema {
        &SCHEMA
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn id(record: &Pengguna) -> u64 {
        record.id
    }

    fn display_name(record: &Pengguna) -> String {
        record.name.clone()
    }

    fn row(record: &Pengguna, _ctx: &RowContext) -> Vec<Cell> {
        vec![
            Cell::text(record.name.clone()),
            Cell::optional(record.email.as_deref()),
            match record.role.as_ref() {
                Some(role) => Cell::badge(role.nama.clone(), "info"),
                None => Cell::text("-"),
            },
        ]
    }

    /// The password stays blank on edit; the backend keeps the old one.
    fn form_fields(props: &PageProps) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("name", "Nama", FieldKind::Text).required(),
            FieldSpec::new("email", "Email", FieldKind::Email).required(),
            FieldSpec::new("password", "Kata Sandi", FieldKind::Password),
            FieldSpec::new(
                "role_id",
                "Peran",
                FieldKind::Select(props_options(props, "roles", "id", "name")),
            )
            .required(),
        ]
    }

    fn draft_from(record: &Pengguna) -> FormDraft {
        FormDraft::new()
            .with("name", record.name.clone())
            .with("email", optional_text(record.email.as_deref()))
            .with("role_id", optional_number(record.role_id))
    }

    fn extra_filters(props: &PageProps) -> Vec<ExtraFilter> {
        vec![ExtraFilter {
            key: "role_id",
            label: "Peran",
            options: props_options(props, "roles", "id", "name"),
        }]
    }
}
