//! Attendance recap per sangga or per class.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::application::{
    backend::{BackendError, BackendGateway, PageProps},
    format,
    list_query::{ListQuery, QuerySchema, SortDirection},
    pagination::Paginated,
    resources::{SelectOption, month_options, props_options, year_options},
};
use crate::domain::entities::RekapKehadiran;
use crate::presentation::admin::views::{
    ExtraFilterView, FilterTabView, KehadiranRekapView, OptionView, RekapRowView, RekapTotalsView,
};

use super::{AdminUiSettings, LoadError, pagination_view, resources::applied_query};

const TARGET: &str = "sekretariat::application::admin::kehadiran";
const ROWS_KEY: &str = "rekap";
const YEAR_SPAN: i32 = 4;

static SANGGA_SCHEMA: Lazy<QuerySchema> = Lazy::new(|| {
    QuerySchema::new("/kehadiran/rekap/sangga")
        .sort_fields(&["nama"])
        .default_sort("nama", SortDirection::Asc)
        .extra_keys(&["sangga_id", "bulan", "tahun"])
});

static KELAS_SCHEMA: Lazy<QuerySchema> = Lazy::new(|| {
    QuerySchema::new("/kehadiran/rekap/kelas")
        .sort_fields(&["nama"])
        .default_sort("nama", SortDirection::Asc)
        .extra_keys(&["kelas", "bulan", "tahun"])
});

/// Grouping the recap is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RekapScope {
    Sangga,
    Kelas,
}

impl RekapScope {
    pub const ALL: [RekapScope; 2] = [RekapScope::Sangga, RekapScope::Kelas];

    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "sangga" => Some(RekapScope::Sangga),
            "kelas" => Some(RekapScope::Kelas),
            _ => None,
        }
    }

    pub fn segment(self) -> &'static str {
        match self {
            RekapScope::Sangga => "sangga",
            RekapScope::Kelas => "kelas",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RekapScope::Sangga => "Per Sangga",
            RekapScope::Kelas => "Per Kelas",
        }
    }

    pub fn schema(self) -> &'static QuerySchema {
        match self {
            RekapScope::Sangga => &SANGGA_SCHEMA,
            RekapScope::Kelas => &KELAS_SCHEMA,
        }
    }

    pub fn path(self) -> &'static str {
        self.schema().path()
    }

    fn group_key(self) -> &'static str {
        match self {
            RekapScope::Sangga => "sangga_id",
            RekapScope::Kelas => "kelas",
        }
    }
}

pub struct RekapList {
    pub scope: RekapScope,
    pub query: ListQuery,
    pub page: Paginated<RekapKehadiran>,
    pub props: PageProps,
}

/// `hadir / total` as a percentage with one decimal and a decimal comma.
pub fn attendance_rate(record: &RekapKehadiran) -> String {
    let total = record.total();
    if total == 0 {
        return "0%".to_string();
    }
    let tenths = (record.hadir * 1000 + total / 2) / total;
    match tenths % 10 {
        0 => format!("{}%", tenths / 10),
        fraction => format!("{},{}%", tenths / 10, fraction),
    }
}

/// Human label of the selected month and year.
pub fn period_label(query: &ListQuery) -> String {
    let month = query
        .extra("bulan")
        .and_then(|raw| raw.parse::<u32>().ok())
        .and_then(format::month_name);
    match (month, query.extra("tahun")) {
        (Some(month), Some(year)) => format!("{month} {year}"),
        (Some(month), None) => month.to_string(),
        (None, Some(year)) => format!("Tahun {year}"),
        (None, None) => "Semua periode".to_string(),
    }
}

/// Class options arrive either as plain strings or as objects.
fn kelas_options(props: &PageProps) -> Vec<SelectOption> {
    let Some(items) = props.get("kelas").and_then(serde_json::Value::as_array) else {
        return Vec::new();
    };
    if items.iter().all(serde_json::Value::is_string) {
        return items
            .iter()
            .filter_map(serde_json::Value::as_str)
            .map(|kelas| SelectOption::new(kelas, kelas))
            .collect();
    }
    props_options(props, "kelas", "nama", "nama")
}

/// The recap may come paginated or as a bare array.
fn recap_page(props: &PageProps, per_page: u32) -> Result<Paginated<RekapKehadiran>, BackendError> {
    match props.get(ROWS_KEY) {
        Some(serde_json::Value::Array(_)) => {
            let data: Vec<RekapKehadiran> = props.list(ROWS_KEY)?;
            let total = data.len() as u64;
            Ok(Paginated {
                per_page: per_page.max(1),
                total,
                from: (total > 0).then_some(1),
                to: (total > 0).then_some(total),
                data,
                ..Paginated::empty(per_page)
            })
        }
        _ => props.collection(ROWS_KEY),
    }
}

fn select_view(
    name: &str,
    label: &str,
    all_label: &str,
    current: &str,
    options: Vec<SelectOption>,
) -> ExtraFilterView {
    let mut views = vec![OptionView::new("", all_label, current.is_empty())];
    views.extend(options.into_iter().map(|option| {
        let selected = option.value == current;
        OptionView::new(option.value, option.label, selected)
    }));
    ExtraFilterView {
        name: name.to_string(),
        label: label.to_string(),
        options: views,
    }
}

#[derive(Clone)]
pub struct AdminKehadiranService {
    backend: Arc<dyn BackendGateway>,
    ui: AdminUiSettings,
}

impl AdminKehadiranService {
    pub fn new(backend: Arc<dyn BackendGateway>, ui: AdminUiSettings) -> Self {
        Self { backend, ui }
    }

    pub async fn load(
        &self,
        scope: RekapScope,
        requested: &ListQuery,
    ) -> Result<RekapList, LoadError> {
        let schema = scope.schema();
        let props = self
            .backend
            .fetch_props(schema.path(), &schema.encode(requested))
            .await
            .map_err(|err| LoadError::new("rekap kehadiran", err))?;
        let page = recap_page(&props, requested.per_page)
            .map_err(|err| LoadError::new("rekap kehadiran", err))?;

        let mut query = applied_query(schema, requested, &props);
        query.page = page.current_page;

        debug!(
            target = TARGET,
            scope = scope.segment(),
            total = page.total,
            "attendance recap loaded"
        );
        Ok(RekapList {
            scope,
            query,
            page,
            props,
        })
    }

    pub fn view(&self, list: &RekapList) -> KehadiranRekapView {
        let scope = list.scope;
        let schema = scope.schema();
        let query = &list.query;
        let panel_href =
            |query: &ListQuery| format!("{}/panel?{}", scope.path(), schema.to_query_string(query));

        let scope_tabs = RekapScope::ALL
            .into_iter()
            .map(|candidate| FilterTabView {
                label: candidate.label().to_string(),
                action: candidate.path().to_string(),
                is_active: candidate == scope,
            })
            .collect();

        let group_filter = match scope {
            RekapScope::Sangga => select_view(
                scope.group_key(),
                "Sangga",
                "Semua sangga",
                query.extra(scope.group_key()).unwrap_or_default(),
                props_options(&list.props, "sangga", "id", "nama"),
            ),
            RekapScope::Kelas => select_view(
                scope.group_key(),
                "Kelas",
                "Semua kelas",
                query.extra(scope.group_key()).unwrap_or_default(),
                kelas_options(&list.props),
            ),
        };
        let current_year = Utc::now().with_timezone(&self.ui.timezone).year();
        let filters = vec![
            group_filter,
            select_view(
                "bulan",
                "Bulan",
                "Semua bulan",
                query.extra("bulan").unwrap_or_default(),
                month_options(),
            ),
            select_view(
                "tahun",
                "Tahun",
                "Semua tahun",
                query.extra("tahun").unwrap_or_default(),
                year_options(current_year, YEAR_SPAN),
            ),
        ];

        let mut totals = RekapTotalsView {
            hadir: 0,
            izin: 0,
            sakit: 0,
            alpha: 0,
        };
        let rows = list
            .page
            .data
            .iter()
            .map(|record| {
                totals.hadir += record.hadir;
                totals.izin += record.izin;
                totals.sakit += record.sakit;
                totals.alpha += record.alpha;
                RekapRowView {
                    nama: record.nama.clone(),
                    kelas: record.kelas.clone().unwrap_or_else(|| "-".to_string()),
                    sangga: record.sangga.clone().unwrap_or_else(|| "-".to_string()),
                    hadir: record.hadir,
                    izin: record.izin,
                    sakit: record.sakit,
                    alpha: record.alpha,
                    total: record.total(),
                    persentase: attendance_rate(record),
                }
            })
            .collect();

        let empty_message = if query.search.is_empty() {
            "Belum ada data kehadiran untuk periode ini.".to_string()
        } else {
            format!("Tidak ada siswa yang cocok dengan \"{}\".", query.search)
        };

        KehadiranRekapView {
            heading: format!("Rekap Kehadiran {}", scope.label()),
            period: period_label(query),
            panel_action: format!("{}/panel", scope.path()),
            search_value: query.search.clone(),
            debounce_ms: self.ui.debounce_ms(),
            scope_tabs,
            filters,
            rows,
            totals,
            pagination: pagination_view(&list.page, |page| {
                panel_href(&query.clone().with_page(page))
            }),
            empty_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(hadir: u64, izin: u64, sakit: u64, alpha: u64) -> RekapKehadiran {
        RekapKehadiran {
            siswa_id: 1,
            nama: "Ayu".to_string(),
            kelas: Some("7A".to_string()),
            sangga: None,
            hadir,
            izin,
            sakit,
            alpha,
        }
    }

    fn service() -> AdminKehadiranService {
        struct Unused;

        #[async_trait::async_trait]
        impl BackendGateway for Unused {
            async fn fetch_props(
                &self,
                _path: &str,
                _params: &[(String, String)],
            ) -> Result<PageProps, BackendError> {
                Err(BackendError::Timeout)
            }

            async fn fetch_json(
                &self,
                _path: &str,
                _params: &[(String, String)],
            ) -> Result<serde_json::Value, BackendError> {
                Err(BackendError::Timeout)
            }

            async fn submit(
                &self,
                _method: crate::application::backend::FormMethod,
                _path: &str,
                _body: crate::application::uploads::MultipartBody,
            ) -> Result<crate::application::backend::SubmitOutcome, BackendError> {
                Err(BackendError::Timeout)
            }

            async fn submit_json(
                &self,
                _method: crate::application::backend::FormMethod,
                _path: &str,
                _body: serde_json::Value,
            ) -> Result<crate::application::backend::SubmitOutcome, BackendError> {
                Err(BackendError::Timeout)
            }

            async fn delete(
                &self,
                _path: &str,
            ) -> Result<crate::application::backend::SubmitOutcome, BackendError> {
                Err(BackendError::Timeout)
            }

            fn public_url(&self, path: &str) -> String {
                path.to_string()
            }
        }

        AdminKehadiranService::new(Arc::new(Unused), AdminUiSettings::default())
    }

    #[test]
    fn rates_use_a_decimal_comma() {
        assert_eq!(attendance_rate(&record(5, 1, 0, 0)), "83,3%");
        assert_eq!(attendance_rate(&record(4, 0, 0, 0)), "100%");
        assert_eq!(attendance_rate(&record(0, 0, 0, 0)), "0%");
    }

    #[test]
    fn period_labels() {
        let schema = RekapScope::Kelas.schema();
        assert_eq!(period_label(&schema.defaults()), "Semua periode");
        let query = schema.decode_query_string("bulan=3&tahun=2025");
        assert_eq!(period_label(&query), "Maret 2025");
        let query = schema.decode_query_string("tahun=2024");
        assert_eq!(period_label(&query), "Tahun 2024");
    }

    #[test]
    fn scopes_parse_from_the_path() {
        assert_eq!(RekapScope::parse("sangga"), Some(RekapScope::Sangga));
        assert_eq!(RekapScope::parse("guru"), None);
        assert_eq!(RekapScope::Kelas.path(), "/kehadiran/rekap/kelas");
    }

    #[test]
    fn bare_arrays_become_a_single_page() {
        let props = PageProps::new(json!({
            "rekap": [
                {"siswa_id": 1, "nama": "Ayu", "hadir": 3},
                {"siswa_id": "2", "nama": "Bima", "hadir": "1", "alpha": 2}
            ]
        }));
        let page = recap_page(&props, 10).expect("page");
        assert_eq!(page.total, 2);
        assert_eq!(page.slice_bounds(), Some((1, 2)));
        assert_eq!(page.last_page, 1);
    }

    #[test]
    fn view_sums_counts_and_offers_scope_filters() {
        let scope = RekapScope::Kelas;
        let props = PageProps::new(json!({
            "rekap": {
                "data": [
                    {"siswa_id": 1, "nama": "Ayu", "kelas": "7A", "hadir": 5, "izin": 1},
                    {"siswa_id": 2, "nama": "Bima", "kelas": "7B", "hadir": 2, "alpha": 2}
                ],
                "current_page": 1, "last_page": 2, "per_page": 2, "total": 4
            },
            "kelas": ["7A", "7B"]
        }));
        let page = recap_page(&props, 2).expect("page");
        let query = scope.schema().decode_query_string("kelas=7A&perPage=2");
        let list = RekapList {
            scope,
            query,
            page,
            props,
        };

        let view = service().view(&list);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.totals.hadir, 7);
        assert_eq!(view.totals.alpha, 2);
        assert_eq!(view.rows[1].sangga, "-");
        assert_eq!(view.panel_action, "/kehadiran/rekap/kelas/panel");
        assert!(view.scope_tabs[1].is_active);
        assert_eq!(view.scope_tabs[0].action, "/kehadiran/rekap/sangga");

        let kelas = &view.filters[0];
        assert_eq!(kelas.name, "kelas");
        assert!(kelas.options.iter().any(|option| option.value == "7A" && option.selected));
        assert_eq!(view.filters[1].options.len(), 13);

        let next = view.pagination.next_action.expect("second page");
        assert!(next.starts_with("/kehadiran/rekap/kelas/panel?sort_by=nama&sort_direction=asc"));
        assert!(next.contains("kelas=7A"));
        assert!(next.ends_with("page=2"));
    }
}
