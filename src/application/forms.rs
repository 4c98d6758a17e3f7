//! Form drafts, dynamic item lists and validation error maps.

use std::collections::BTreeMap;

use serde::Serialize;

/// Per-field validation messages as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
    message: Option<String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `{ "message": "...", "errors": { "field": ["..."] } }`.
    pub fn from_validation_payload(payload: &serde_json::Value) -> Self {
        let mut errors = FieldErrors {
            message: payload
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
            ..FieldErrors::default()
        };
        let Some(map) = payload.get("errors").and_then(serde_json::Value::as_object) else {
            return errors;
        };
        for (field, value) in map {
            let messages = match value {
                serde_json::Value::String(text) => vec![text.clone()],
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            };
            for message in messages {
                errors.push(field, message);
            }
        }
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// First message for a field; dotted keys (`items.0.jumlah`) are matched
    /// verbatim.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn summary(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter_map(|(field, messages)| {
            messages
                .first()
                .map(|message| (field.as_str(), message.as_str()))
        })
    }
}

/// Ordered repeated sub-records (loan items, menu rows, spec rows).
///
/// Every operation returns a new list; the old one is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicList<T> {
    items: Vec<T>,
}

impl<T> Default for DynamicList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Default + Clone> DynamicList<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Append one blank entry.
    pub fn add(&self) -> Self {
        self.push(T::default())
    }

    /// Append a prepared entry.
    pub fn push(&self, item: T) -> Self {
        let mut items = self.items.clone();
        items.push(item);
        Self { items }
    }

    /// Drop entry `index`, keeping the relative order of the rest.
    pub fn remove(&self, index: usize) -> Self {
        let items = self
            .items
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != index)
            .map(|(_, item)| item.clone())
            .collect();
        Self { items }
    }

    /// Replace entry `index` with `f(entry)`; other entries are unchanged.
    pub fn update<F>(&self, index: usize, f: F) -> Self
    where
        F: FnOnce(&T) -> T,
    {
        let mut items = self.items.clone();
        if let Some(slot) = items.get_mut(index) {
            *slot = f(slot);
        }
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Bound a requested quantity to `[1, available]`. Advisory only; the
/// backend enforces stock.
pub fn clamp_quantity(requested: i64, available: Option<u64>) -> u64 {
    let floor = requested.max(1) as u64;
    match available {
        Some(ceiling) if ceiling >= 1 => floor.min(ceiling),
        _ => floor,
    }
}

/// Parse a quantity typed by the user. Unparsable input becomes 1.
pub fn parse_quantity(raw: &str, available: Option<u64>) -> u64 {
    let requested = raw
        .trim()
        .parse::<i64>()
        .ok()
        .or_else(|| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|value| value.trunc() as i64)
        })
        .unwrap_or(1);
    clamp_quantity(requested, available)
}

/// One repeated sub-record, keyed by field name.
pub type ItemDraft = BTreeMap<String, String>;

/// Mutable local copy of a record being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormDraft {
    fields: BTreeMap<String, String>,
    groups: BTreeMap<String, DynamicList<ItemDraft>>,
}

impl FormDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn value(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_str()))
    }

    pub fn group(&self, name: &str) -> DynamicList<ItemDraft> {
        self.groups.get(name).cloned().unwrap_or_default()
    }

    pub fn set_group(&mut self, name: impl Into<String>, list: DynamicList<ItemDraft>) {
        self.groups.insert(name.into(), list);
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &DynamicList<ItemDraft>)> {
        self.groups.iter().map(|(name, list)| (name.as_str(), list))
    }
}

/// Collects the fields of one submitted form. Row indices come from the
/// client, so rows stay sparse until [`FormIntake::finish`] renumbers them.
#[derive(Debug, Default)]
pub struct FormIntake {
    draft: FormDraft,
    rows: BTreeMap<String, BTreeMap<usize, ItemDraft>>,
}

impl FormIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bracketed names such as `items[2][jumlah]` land in the `items`
    /// group, row 2.
    pub fn insert(&mut self, name: &str, value: String) {
        match parse_group_name(name) {
            Some((group, index, field)) => {
                self.rows
                    .entry(group.to_string())
                    .or_default()
                    .entry(index)
                    .or_default()
                    .insert(field.to_string(), value);
            }
            None => self.draft.set(name, value),
        }
    }

    /// The draft with every group's rows in submitted index order, gaps
    /// closed.
    pub fn finish(self) -> FormDraft {
        let mut draft = self.draft;
        for (group, rows) in self.rows {
            draft.set_group(group, DynamicList::from_items(rows.into_values().collect()));
        }
        draft
    }
}

fn parse_group_name(name: &str) -> Option<(&str, usize, &str)> {
    let (group, rest) = name.split_once('[')?;
    let (index, rest) = rest.split_once(']')?;
    let field = rest.strip_prefix('[')?.strip_suffix(']')?;
    let index = index.parse::<usize>().ok()?;
    if group.is_empty() || field.is_empty() {
        return None;
    }
    Some((group, index, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_appends_blank_entry() {
        let list = DynamicList::from_items(vec![1, 2]);
        let grown = list.add();
        assert_eq!(grown.items(), &[1, 2, 0]);
        assert_eq!(grown.push(5).len(), 4);
        assert_eq!(list.items(), &[1, 2]);
    }

    #[test]
    fn remove_preserves_relative_order() {
        let list = DynamicList::from_items(vec!["a", "b", "c", "d"]);
        let shrunk = list.remove(1);
        assert_eq!(shrunk.items(), &["a", "c", "d"]);
        assert_eq!(list.remove(9).items(), list.items());
    }

    #[test]
    fn update_touches_only_one_entry() {
        let list = DynamicList::from_items(vec![1, 2, 3]);
        let updated = list.update(2, |value| value * 10);
        assert_eq!(updated.items(), &[1, 2, 30]);
        assert_eq!(list.update(5, |value| value * 10), list);
    }

    #[test]
    fn quantities_are_clamped_to_availability() {
        assert_eq!(clamp_quantity(12, Some(5)), 5);
        assert_eq!(clamp_quantity(0, Some(5)), 1);
        assert_eq!(clamp_quantity(-4, None), 1);
        assert_eq!(clamp_quantity(40, None), 40);
        assert_eq!(clamp_quantity(3, Some(0)), 3);
    }

    #[test]
    fn unparsable_quantity_falls_back_to_one() {
        assert_eq!(parse_quantity("abc", Some(4)), 1);
        assert_eq!(parse_quantity("", None), 1);
        assert_eq!(parse_quantity(" 7 ", Some(4)), 4);
        assert_eq!(parse_quantity("2.9", None), 2);
    }

    #[test]
    fn validation_payload_is_mapped_per_field() {
        let errors = FieldErrors::from_validation_payload(&json!({
            "message": "Data tidak valid.",
            "errors": {
                "nama": ["Nama wajib diisi.", "Nama terlalu pendek."],
                "items.0.jumlah": "Jumlah melebihi stok."
            }
        }));
        assert_eq!(errors.first("nama"), Some("Nama wajib diisi."));
        assert_eq!(errors.first("items.0.jumlah"), Some("Jumlah melebihi stok."));
        assert_eq!(errors.summary(), Some("Data tidak valid."));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn bracketed_names_build_groups() {
        let mut intake = FormIntake::new();
        intake.insert("nama_peminjam", "Sari".into());
        intake.insert("items[1][jumlah]", "2".into());
        intake.insert("items[0][barang_id]", "7".into());
        intake.insert("items[3][jumlah]", "1".into());
        let draft = intake.finish();

        assert_eq!(draft.value("nama_peminjam"), "Sari");
        let rows = draft.group("items");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.items()[0].get("barang_id").map(String::as_str), Some("7"));
        assert_eq!(rows.items()[1].get("jumlah").map(String::as_str), Some("2"));
        assert_eq!(rows.items()[2].get("jumlah").map(String::as_str), Some("1"));
    }

    #[test]
    fn huge_row_indices_keep_only_submitted_rows() {
        let mut intake = FormIntake::new();
        intake.insert("items[18446744073709551615][jumlah]", "1".into());
        intake.insert("items[2000000][barang_id]", "4".into());
        intake.insert("items[2000000][jumlah]", "3".into());
        let rows = intake.finish().group("items");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows.items()[0].get("barang_id").map(String::as_str), Some("4"));
        assert_eq!(rows.items()[1].get("jumlah").map(String::as_str), Some("1"));
    }

    #[test]
    fn malformed_bracket_names_are_plain_fields() {
        let mut intake = FormIntake::new();
        intake.insert("items[x][jumlah]", "2".into());
        assert_eq!(intake.finish().value("items[x][jumlah]"), "2");
    }
}
