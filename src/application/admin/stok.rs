//! Stock board: one page of stock rows grouped, filtered and sorted locally,
//! plus the transaction lookup and the add-stock modal.

use std::{collections::HashMap, sync::Arc};

use tracing::info;
use url::form_urlencoded;

use crate::application::{
    backend::{BackendGateway, FormMethod, SubmitOutcome, fetch_array},
    format,
    forms::{FieldErrors, FormDraft, parse_quantity},
    resources::{FieldKind, FieldSpec, SelectOption},
    uploads::MultipartBody,
};
use crate::domain::{
    entities::{StokRow, StokTransaksi},
    types::{StatusKey, StokJenis},
};
use crate::presentation::admin::views::{
    OptionView, StokAddModalView, StokBoardView, StokGroupView, StokRowView,
    StokTransactionsModalView, StokTransaksiRowView,
};

use super::{AdminUiSettings, LoadError, resources::field_view};

pub const STOK_PATH: &str = "/stok";
const ROWS_KEY: &str = "stok";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StokSort {
    #[default]
    NamaAsc,
    NamaDesc,
    StokAsc,
    StokDesc,
}

impl StokSort {
    pub const ALL: [StokSort; 4] = [
        StokSort::NamaAsc,
        StokSort::NamaDesc,
        StokSort::StokAsc,
        StokSort::StokDesc,
    ];

    pub fn key(self) -> &'static str {
        match self {
            StokSort::NamaAsc => "nama_asc",
            StokSort::NamaDesc => "nama_desc",
            StokSort::StokAsc => "stok_asc",
            StokSort::StokDesc => "stok_desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StokSort::NamaAsc => "Nama (A-Z)",
            StokSort::NamaDesc => "Nama (Z-A)",
            StokSort::StokAsc => "Stok terendah",
            StokSort::StokDesc => "Stok tertinggi",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sort| sort.key() == raw.trim())
    }
}

/// Board state kept in the address bar (`/stok?search=..&sort=..`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StokBoardQuery {
    pub search: String,
    pub sort: StokSort,
}

impl StokBoardQuery {
    /// Last occurrence wins; unknown sort keys fall back to the default.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_ref() {
                "search" => query.search = value.as_ref().trim().to_string(),
                "sort" => query.sort = StokSort::parse(value.as_ref()).unwrap_or_default(),
                _ => {}
            }
        }
        query
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn href(&self) -> String {
        if self.is_default() {
            return STOK_PATH.to_string();
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if !self.search.is_empty() {
            serializer.append_pair("search", &self.search);
        }
        if self.sort != StokSort::default() {
            serializer.append_pair("sort", self.sort.key());
        }
        format!("{STOK_PATH}?{}", serializer.finish())
    }
}

/// Rows of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct StokGroup {
    pub barang_id: u64,
    pub barang_nama: String,
    pub kode: Option<String>,
    pub total: u64,
    pub rows: Vec<StokRow>,
}

fn matches_search(row: &StokRow, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        Some(row.barang_nama.as_str()),
        row.kode.as_deref(),
        row.spesifikasi_nama.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|haystack| haystack.to_lowercase().contains(needle))
}

/// Filter by name, code or specification, group by item in first-seen
/// order, then sort the groups.
pub fn group_rows(rows: &[StokRow], query: &StokBoardQuery) -> Vec<StokGroup> {
    let needle = query.search.to_lowercase();
    let mut groups: Vec<StokGroup> = Vec::new();
    let mut positions: HashMap<u64, usize> = HashMap::new();

    for row in rows.iter().filter(|row| matches_search(row, &needle)) {
        let position = *positions.entry(row.barang_id).or_insert_with(|| {
            groups.push(StokGroup {
                barang_id: row.barang_id,
                barang_nama: row.barang_nama.clone(),
                kode: row.kode.clone(),
                total: 0,
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[position];
        group.total += row.stok;
        group.rows.push(row.clone());
    }

    let by_name = |a: &StokGroup, b: &StokGroup| {
        a.barang_nama
            .to_lowercase()
            .cmp(&b.barang_nama.to_lowercase())
    };
    match query.sort {
        StokSort::NamaAsc => groups.sort_by(by_name),
        StokSort::NamaDesc => groups.sort_by(|a, b| by_name(b, a)),
        StokSort::StokAsc => groups.sort_by(|a, b| a.total.cmp(&b.total).then_with(|| by_name(a, b))),
        StokSort::StokDesc => groups.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| by_name(a, b))),
    }
    if matches!(query.sort, StokSort::StokAsc | StokSort::StokDesc) {
        for group in &mut groups {
            group.rows.sort_by(|a, b| match query.sort {
                StokSort::StokDesc => b.stok.cmp(&a.stok),
                _ => a.stok.cmp(&b.stok),
            });
        }
    }
    groups
}

fn jenis_tone(jenis: StokJenis) -> &'static str {
    match jenis {
        StokJenis::Masuk => "success",
        StokJenis::Keluar => "danger",
        StokJenis::Lainnya => "muted",
    }
}

fn add_stock_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new(
            "jenis",
            "Jenis",
            FieldKind::Select(SelectOption::from_status::<StokJenis>()),
        )
        .required(),
        FieldSpec::new("jumlah", "Jumlah", FieldKind::Number).required(),
        FieldSpec::new("keterangan", "Keterangan", FieldKind::Textarea),
    ]
}

/// Item and optional specification a stock action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StokTarget {
    pub barang_id: u64,
    pub spesifikasi_id: Option<u64>,
}

impl StokTarget {
    fn query_string(self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("barang_id", &self.barang_id.to_string());
        if let Some(spesifikasi_id) = self.spesifikasi_id {
            serializer.append_pair("spesifikasi_id", &spesifikasi_id.to_string());
        }
        serializer.finish()
    }
}

#[derive(Clone)]
pub struct AdminStokService {
    backend: Arc<dyn BackendGateway>,
    ui: AdminUiSettings,
}

impl AdminStokService {
    pub fn new(backend: Arc<dyn BackendGateway>, ui: AdminUiSettings) -> Self {
        Self { backend, ui }
    }

    pub async fn load_rows(&self) -> Result<Vec<StokRow>, LoadError> {
        let props = self
            .backend
            .fetch_props(STOK_PATH, &[])
            .await
            .map_err(|err| LoadError::new("stok", err))?;
        props
            .list::<StokRow>(ROWS_KEY)
            .map_err(|err| LoadError::new("stok", err))
    }

    pub fn board_view(&self, rows: &[StokRow], query: &StokBoardQuery) -> StokBoardView {
        let groups = group_rows(rows, query);
        let row_count: usize = groups.iter().map(|group| group.rows.len()).sum();
        let summary = format!("{} barang, {row_count} baris stok", groups.len());

        let groups = groups
            .into_iter()
            .map(|group| StokGroupView {
                kode: group.kode.clone().unwrap_or_else(|| "-".to_string()),
                total: group.total,
                rows: group
                    .rows
                    .iter()
                    .map(|row| self.row_view(row, &group.barang_nama))
                    .collect(),
                barang_nama: group.barang_nama,
            })
            .collect();

        let empty_message = if query.search.is_empty() {
            "Belum ada data stok.".to_string()
        } else {
            format!("Tidak ada stok yang cocok dengan \"{}\".", query.search)
        };

        StokBoardView {
            panel_action: format!("{STOK_PATH}/panel"),
            search_value: query.search.clone(),
            debounce_ms: self.ui.debounce_ms(),
            sort_options: StokSort::ALL
                .into_iter()
                .map(|sort| OptionView::new(sort.key(), sort.label(), sort == query.sort))
                .collect(),
            groups,
            empty_message,
            summary,
        }
    }

    fn row_view(&self, row: &StokRow, barang_nama: &str) -> StokRowView {
        let target = StokTarget {
            barang_id: row.barang_id,
            spesifikasi_id: row.spesifikasi_id,
        };
        let label = match row.spesifikasi_nama.as_deref() {
            Some(spec) if !spec.is_empty() => format!("{barang_nama} - {spec}"),
            _ => barang_nama.to_string(),
        };
        let mut lookup = form_urlencoded::Serializer::new(String::new());
        if let Some(spesifikasi_id) = row.spesifikasi_id {
            lookup.append_pair("spesifikasi_id", &spesifikasi_id.to_string());
        }
        lookup.append_pair("label", &label);
        StokRowView {
            spesifikasi: row
                .spesifikasi_nama
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "-".to_string()),
            stok: row.stok,
            satuan: row.satuan.clone().unwrap_or_else(|| "unit".to_string()),
            updated: format::optional_date(row.updated_at.as_deref(), self.ui.timezone),
            transactions_action: format!(
                "{STOK_PATH}/{}/transactions?{}",
                row.barang_id,
                lookup.finish()
            ),
            add_action: format!("{STOK_PATH}/add?{}", target.query_string()),
        }
    }

    /// Stock movements of one item, optionally narrowed to a specification.
    pub async fn transactions(
        &self,
        target: StokTarget,
    ) -> Result<Vec<StokTransaksi>, LoadError> {
        let params: Vec<(String, String)> = target
            .spesifikasi_id
            .map(|id| vec![("spesifikasi_id".to_string(), id.to_string())])
            .unwrap_or_default();
        fetch_array(
            self.backend.as_ref(),
            &format!("{STOK_PATH}/{}/transactions", target.barang_id),
            &params,
        )
        .await
        .map_err(|err| LoadError::new("riwayat stok", err))
    }

    pub fn transactions_view(
        &self,
        label: &str,
        transactions: &[StokTransaksi],
    ) -> StokTransactionsModalView {
        StokTransactionsModalView {
            heading: if label.is_empty() {
                "Riwayat Stok".to_string()
            } else {
                format!("Riwayat Stok {label}")
            },
            rows: transactions
                .iter()
                .map(|transaction| StokTransaksiRowView {
                    jenis: transaction.jenis.label().to_string(),
                    tone: jenis_tone(transaction.jenis),
                    jumlah: transaction.jumlah,
                    keterangan: transaction
                        .keterangan
                        .clone()
                        .unwrap_or_else(|| "-".to_string()),
                    user: transaction.user.clone().unwrap_or_else(|| "-".to_string()),
                    waktu: transaction
                        .created_at
                        .as_deref()
                        .map(|raw| format::date_time(raw, self.ui.timezone))
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect(),
        }
    }

    pub fn add_modal_view(
        &self,
        target: StokTarget,
        draft: &FormDraft,
        errors: &FieldErrors,
    ) -> StokAddModalView {
        let fields = add_stock_fields()
            .iter()
            .map(|spec| {
                field_view(
                    spec,
                    spec.name.to_string(),
                    draft.value(spec.name),
                    errors.first(spec.name),
                    None,
                    String::new(),
                )
            })
            .collect();
        StokAddModalView {
            heading: "Tambah Stok".to_string(),
            action: format!("{STOK_PATH}/add"),
            barang_id: target.barang_id.to_string(),
            spesifikasi_id: target
                .spesifikasi_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            fields,
            summary_error: (!errors.is_empty()).then(|| {
                errors
                    .summary()
                    .unwrap_or("Periksa kembali isian yang ditandai.")
                    .to_string()
            }),
        }
    }

    /// Record a stock movement. The quantity is clamped to at least 1.
    pub async fn add_stock(
        &self,
        target: StokTarget,
        draft: &FormDraft,
    ) -> Result<SubmitOutcome, LoadError> {
        let jumlah = parse_quantity(draft.value("jumlah"), None);
        let body = MultipartBody::new()
            .text("barang_id", target.barang_id.to_string())
            .text(
                "spesifikasi_id",
                target
                    .spesifikasi_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
            )
            .text("jenis", draft.value("jenis"))
            .text("jumlah", jumlah.to_string())
            .text("keterangan", draft.value("keterangan"));
        let outcome = self
            .backend
            .submit(FormMethod::Post, STOK_PATH, body)
            .await
            .map_err(|err| LoadError::new("stok", err))?;
        info!(
            target = "sekretariat::application::admin::stok",
            barang_id = target.barang_id,
            jumlah,
            accepted = outcome.is_accepted(),
            "stock movement submitted"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(barang_id: u64, nama: &str, spec: Option<&str>, stok: u64) -> StokRow {
        StokRow {
            barang_id,
            barang_nama: nama.to_string(),
            kode: Some(format!("BRG-{barang_id:03}")),
            spesifikasi_id: spec.map(|_| barang_id * 10),
            spesifikasi_nama: spec.map(str::to_string),
            stok,
            satuan: None,
            updated_at: None,
        }
    }

    fn sample() -> Vec<StokRow> {
        vec![
            row(2, "Proyektor", Some("Epson"), 3),
            row(1, "kursi lipat", Some("Merah"), 10),
            row(2, "Proyektor", Some("BenQ"), 1),
            row(3, "Meja", None, 6),
        ]
    }

    #[test]
    fn rows_are_grouped_per_item() {
        let groups = group_rows(&sample(), &StokBoardQuery::default());
        let names: Vec<&str> = groups.iter().map(|group| group.barang_nama.as_str()).collect();
        assert_eq!(names, vec!["kursi lipat", "Meja", "Proyektor"]);
        assert_eq!(groups[2].total, 4);
        assert_eq!(groups[2].rows.len(), 2);
    }

    #[test]
    fn search_matches_code_and_specification() {
        let by_spec = StokBoardQuery {
            search: "benq".into(),
            ..StokBoardQuery::default()
        };
        let groups = group_rows(&sample(), &by_spec);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].rows.len(), 1);
        assert_eq!(groups[0].total, 1);

        let by_code = StokBoardQuery {
            search: "brg-003".into(),
            ..StokBoardQuery::default()
        };
        assert_eq!(group_rows(&sample(), &by_code)[0].barang_nama, "Meja");
    }

    #[test]
    fn stock_sorts_use_group_totals() {
        let query = StokBoardQuery {
            search: String::new(),
            sort: StokSort::StokDesc,
        };
        let totals: Vec<u64> = group_rows(&sample(), &query)
            .iter()
            .map(|group| group.total)
            .collect();
        assert_eq!(totals, vec![10, 6, 4]);

        let ascending = StokBoardQuery {
            sort: StokSort::StokAsc,
            ..query
        };
        let proyektor = group_rows(&sample(), &ascending).remove(0);
        assert_eq!(proyektor.rows[0].stok, 1);
    }

    #[test]
    fn board_query_round_trips_through_the_url() {
        let query = StokBoardQuery::from_pairs([("search", " kursi "), ("sort", "stok_desc")]);
        assert_eq!(query.href(), "/stok?search=kursi&sort=stok_desc");
        assert_eq!(StokBoardQuery::from_pairs([("sort", "acak")]).href(), "/stok");
    }

    #[test]
    fn target_query_omits_missing_specification() {
        let target = StokTarget {
            barang_id: 4,
            spesifikasi_id: None,
        };
        assert_eq!(target.query_string(), "barang_id=4");
    }
}
