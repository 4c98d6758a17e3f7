//! List-query state shared by every index page.
//!
//! `ListQuery` is the single source of truth for search, sort, filter and
//! pagination. It is serialized to and from the URL through one function pair
//! on `QuerySchema` (`encode`/`decode`), so the table and the address bar
//! cannot drift apart.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;
pub const PER_PAGE_OPTIONS: &[u32] = &[10, 25, 50, 100];

/// Filter values meaning "no filter".
const FILTER_ALL_ALIASES: &[&str] = &["all", "semua"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query-string parameter names used by one backend route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamNames {
    pub search: &'static str,
    pub sort: &'static str,
    pub direction: &'static str,
    pub filter: &'static str,
    pub per_page: &'static str,
    pub page: &'static str,
}

impl ParamNames {
    /// `sort_by` / `sort_direction` / `filter`.
    pub const SNAKE: ParamNames = ParamNames {
        search: "search",
        sort: "sort_by",
        direction: "sort_direction",
        filter: "filter",
        per_page: "perPage",
        page: "page",
    };

    /// `sortBy` / `sortDir` / `status`.
    pub const CAMEL: ParamNames = ParamNames {
        search: "search",
        sort: "sortBy",
        direction: "sortDir",
        filter: "status",
        per_page: "perPage",
        page: "page",
    };

    pub fn with_filter(self, filter: &'static str) -> Self {
        Self { filter, ..self }
    }
}

/// Describes how one list page maps its state onto query parameters.
#[derive(Debug, Clone)]
pub struct QuerySchema {
    path: String,
    names: ParamNames,
    sort_fields: Vec<&'static str>,
    filter_values: Option<Vec<String>>,
    extra_keys: Vec<&'static str>,
    default_sort: &'static str,
    default_direction: SortDirection,
    default_per_page: u32,
}

impl QuerySchema {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            names: ParamNames::SNAKE,
            sort_fields: vec!["created_at"],
            filter_values: None,
            extra_keys: Vec::new(),
            default_sort: "created_at",
            default_direction: SortDirection::Desc,
            default_per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn names(mut self, names: ParamNames) -> Self {
        self.names = names;
        self
    }

    /// Allowed sort fields; the first one doubles as the default unless
    /// `default_sort` is called afterwards.
    pub fn sort_fields(mut self, fields: &[&'static str]) -> Self {
        self.sort_fields = fields.to_vec();
        if let Some(first) = fields.first()
            && !fields.contains(&self.default_sort)
        {
            self.default_sort = *first;
        }
        self
    }

    pub fn default_sort(mut self, field: &'static str, direction: SortDirection) -> Self {
        if !self.sort_fields.contains(&field) {
            self.sort_fields.push(field);
        }
        self.default_sort = field;
        self.default_direction = direction;
        self
    }

    pub fn filter_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn extra_keys(mut self, keys: &[&'static str]) -> Self {
        self.extra_keys = keys.to_vec();
        self
    }

    pub fn default_per_page(mut self, per_page: u32) -> Self {
        self.default_per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn param_names(&self) -> &ParamNames {
        &self.names
    }

    pub fn sortable(&self, field: &str) -> bool {
        self.sort_fields.iter().any(|candidate| *candidate == field)
    }

    pub fn extra_key_list(&self) -> &[&'static str] {
        &self.extra_keys
    }

    pub fn default_direction(&self) -> SortDirection {
        self.default_direction
    }

    /// The state a page starts from when the URL carries no parameters.
    pub fn defaults(&self) -> ListQuery {
        ListQuery {
            search: String::new(),
            sort_field: self.default_sort.to_string(),
            sort_direction: self.default_direction,
            filter: None,
            extras: BTreeMap::new(),
            page: 1,
            per_page: self.default_per_page,
        }
    }

    pub fn is_default(&self, query: &ListQuery) -> bool {
        *query == self.defaults()
    }

    /// Non-empty parameters in a stable order: search, sort, direction,
    /// filter, extras, per-page, page.
    pub fn encode(&self, query: &ListQuery) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(6 + self.extra_keys.len());
        let search = query.search.trim();
        if !search.is_empty() {
            pairs.push((self.names.search.to_string(), search.to_string()));
        }
        if !query.sort_field.is_empty() {
            pairs.push((self.names.sort.to_string(), query.sort_field.clone()));
            pairs.push((
                self.names.direction.to_string(),
                query.sort_direction.as_str().to_string(),
            ));
        }
        if let Some(filter) = query.filter.as_deref().filter(|value| !value.is_empty()) {
            pairs.push((self.names.filter.to_string(), filter.to_string()));
        }
        for key in &self.extra_keys {
            if let Some(value) = query.extras.get(*key).filter(|value| !value.is_empty()) {
                pairs.push(((*key).to_string(), value.clone()));
            }
        }
        pairs.push((self.names.per_page.to_string(), query.per_page.to_string()));
        pairs.push((self.names.page.to_string(), query.page.to_string()));
        pairs
    }

    /// Total decode: anything missing or invalid falls back to the defaults.
    /// When a key repeats, the last occurrence wins.
    pub fn decode<I, K, V>(&self, pairs: I) -> ListQuery
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = self.defaults();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref().trim();
            if key == self.names.search {
                query.search = value.to_string();
            } else if key == self.names.sort {
                if self.sortable(value) {
                    query.sort_field = value.to_string();
                }
            } else if key == self.names.direction {
                if let Some(direction) = SortDirection::parse(value) {
                    query.sort_direction = direction;
                }
            } else if key == self.names.filter {
                query.filter = self.normalize_filter(value);
            } else if key == self.names.per_page {
                query.per_page = parse_positive(value)
                    .map(|per_page| per_page.min(MAX_PER_PAGE))
                    .unwrap_or(self.default_per_page);
            } else if key == self.names.page {
                query.page = parse_positive(value).unwrap_or(1);
            } else if let Some(extra) = self.extra_keys.iter().find(|candidate| **candidate == key)
            {
                if value.is_empty() {
                    query.extras.remove(*extra);
                } else {
                    query.extras.insert((*extra).to_string(), value.to_string());
                }
            }
        }
        query
    }

    pub fn decode_query_string(&self, raw: &str) -> ListQuery {
        self.decode(form_urlencoded::parse(raw.trim_start_matches('?').as_bytes()))
    }

    /// Decode the `filters` echo the backend attaches to page props.
    pub fn decode_filters_echo(&self, echo: &serde_json::Value) -> Option<ListQuery> {
        echo.is_object().then(|| self.decode(echo_pairs(echo)))
    }

    pub fn to_query_string(&self, query: &ListQuery) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.encode(query) {
            serializer.append_pair(&key, &value);
        }
        serializer.finish()
    }

    /// Path plus encoded query string.
    pub fn href(&self, query: &ListQuery) -> String {
        let encoded = self.to_query_string(query);
        if encoded.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, encoded)
        }
    }

    fn normalize_filter(&self, raw: &str) -> Option<String> {
        let value = raw.trim();
        if value.is_empty() || FILTER_ALL_ALIASES.contains(&value.to_ascii_lowercase().as_str()) {
            return None;
        }
        match &self.filter_values {
            Some(allowed) if !allowed.iter().any(|candidate| candidate == value) => None,
            _ => Some(value.to_string()),
        }
    }
}

/// Scalar entries of a `filters` echo as key/value pairs.
pub fn echo_pairs(echo: &serde_json::Value) -> Vec<(String, String)> {
    let Some(object) = echo.as_object() else {
        return Vec::new();
    };
    object
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(text) => text.clone(),
                serde_json::Value::Number(number) => number.to_string(),
                _ => return None,
            };
            Some((key.clone(), text))
        })
        .collect()
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|value| *value >= 1)
}

/// Search, sort, filter and pagination state for one list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub search: String,
    pub sort_field: String,
    pub sort_direction: SortDirection,
    pub filter: Option<String>,
    pub extras: BTreeMap<String, String>,
    pub page: u32,
    pub per_page: u32,
}

impl ListQuery {
    pub fn with_search(self, search: impl Into<String>) -> Self {
        Self {
            search: search.into().trim().to_string(),
            page: 1,
            ..self
        }
    }

    /// Clicking the active column flips its direction; a new column starts
    /// from the schema's default direction. Unknown fields are ignored.
    pub fn with_sort(self, field: &str, schema: &QuerySchema) -> Self {
        if !schema.sortable(field) {
            return self;
        }
        let sort_direction = if self.sort_field == field {
            self.sort_direction.toggled()
        } else {
            schema.default_direction()
        };
        Self {
            sort_field: field.to_string(),
            sort_direction,
            page: 1,
            ..self
        }
    }

    pub fn with_filter(self, filter: Option<String>) -> Self {
        Self {
            filter: filter.filter(|value| !value.trim().is_empty()),
            page: 1,
            ..self
        }
    }

    pub fn with_extra(mut self, key: &str, value: Option<String>) -> Self {
        match value.filter(|value| !value.trim().is_empty()) {
            Some(value) => {
                self.extras.insert(key.to_string(), value);
            }
            None => {
                self.extras.remove(key);
            }
        }
        self.page = 1;
        self
    }

    pub fn with_page(self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self
        }
    }

    /// Changing the page size always returns to page 1 so the next request
    /// cannot land beyond the last page.
    pub fn with_per_page(self, per_page: u32) -> Self {
        Self {
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            page: 1,
            ..self
        }
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn barang_schema() -> QuerySchema {
        QuerySchema::new("/barang")
            .sort_fields(&["created_at", "nama", "jumlah"])
            .default_sort("created_at", SortDirection::Desc)
            .filter_values(["baik", "rusak_ringan", "rusak_berat"])
    }

    #[test]
    fn defaults_are_recognised() {
        let schema = barang_schema();
        let query = schema
            .decode_query_string("search=&sort_by=created_at&sort_direction=desc&perPage=10");
        assert!(schema.is_default(&query));
    }

    #[test]
    fn typed_search_encodes_in_documented_order() {
        let schema = barang_schema();
        let query = schema.defaults().with_search("kursi");
        assert_eq!(
            schema.href(&query),
            "/barang?search=kursi&sort_by=created_at&sort_direction=desc&perPage=10&page=1"
        );
    }

    #[test]
    fn encode_emits_only_non_empty_entries() {
        let schema = barang_schema().extra_keys(&["bulan", "tahun"]);
        let query = schema
            .defaults()
            .with_extra("tahun", Some("2024".into()))
            .with_extra("bulan", Some(" ".into()));
        let keys: Vec<String> = schema.encode(&query).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["sort_by", "sort_direction", "tahun", "perPage", "page"]
        );
    }

    #[test]
    fn decode_inverts_encode() {
        let schema = barang_schema().extra_keys(&["kelas"]);
        let query = schema
            .defaults()
            .with_search("meja lipat")
            .with_sort("nama", &schema)
            .with_filter(Some("baik".into()))
            .with_extra("kelas", Some("7A".into()))
            .with_per_page(25)
            .with_page(3);
        let decoded = schema.decode_query_string(&schema.to_query_string(&query));
        assert_eq!(decoded, query);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let schema = barang_schema();
        let query = schema.decode_query_string(
            "sort_by=password&sort_direction=sideways&perPage=NaN&page=0&filter=hilang",
        );
        assert_eq!(query, schema.defaults());
    }

    #[test]
    fn per_page_is_capped() {
        let schema = barang_schema();
        let query = schema.decode_query_string("perPage=5000");
        assert_eq!(query.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn changing_per_page_resets_page() {
        let schema = barang_schema();
        let query = schema.defaults().with_page(7).with_per_page(50);
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 50);
    }

    #[test]
    fn sorting_the_same_column_toggles_direction() {
        let schema = barang_schema();
        let query = schema.defaults().with_sort("nama", &schema);
        assert_eq!(query.sort_direction, SortDirection::Desc);
        let query = query.with_sort("nama", &schema);
        assert_eq!(query.sort_direction, SortDirection::Asc);
        let ignored = query.clone().with_sort("rahasia", &schema);
        assert_eq!(ignored, query);
    }

    #[test]
    fn camel_names_are_respected() {
        let schema = QuerySchema::new("/pelanggan")
            .names(ParamNames::CAMEL)
            .sort_fields(&["created_at", "nama"]);
        let query = schema.decode_query_string("sortBy=nama&sortDir=asc&status=aktif");
        assert_eq!(query.sort_field, "nama");
        assert_eq!(query.sort_direction, SortDirection::Asc);
        assert_eq!(query.filter.as_deref(), Some("aktif"));
    }

    #[test]
    fn filter_all_alias_clears_filter() {
        let schema = QuerySchema::new("/peminjaman");
        let query = schema.decode_query_string("filter=semua");
        assert_eq!(query.filter, None);
    }

    #[test]
    fn filters_echo_accepts_numbers() {
        let schema = QuerySchema::new("/kehadiran/rekap/sangga").extra_keys(&["sangga_id", "tahun"]);
        let echo = serde_json::json!({"sangga_id": 4, "tahun": "2024", "perPage": 25, "search": null});
        let query = schema.decode_filters_echo(&echo).expect("object echo");
        assert_eq!(query.extra("sangga_id"), Some("4"));
        assert_eq!(query.per_page, 25);
        assert!(query.search.is_empty());
    }
}
