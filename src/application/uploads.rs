//! File selection, preview handles and multipart request bodies.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use crate::application::backend::FormMethod;

pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// One file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Bytes,
    ) -> Self {
        let file_name = file_name.into();
        let content_type = content_type
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });
        Self {
            field: field.into(),
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Captures at most one file per input; the first non-empty part wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    file: Option<SelectedFile>,
}

impl FileSelection {
    pub fn offer(&mut self, file: SelectedFile) -> bool {
        if self.file.is_some() || file.is_empty() || file.file_name.trim().is_empty() {
            return false;
        }
        self.file = Some(file);
        true
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn take(&mut self) -> Option<SelectedFile> {
        self.file.take()
    }
}

/// Handle to a preview held in a [`PreviewRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewHandle(u64);

impl PreviewHandle {
    pub fn id(self) -> u64 {
        self.0
    }

    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<u64>().ok().filter(|id| *id > 0).map(Self)
    }
}

/// Previews kept before the oldest is evicted.
pub const DEFAULT_PREVIEW_CAPACITY: usize = 256;

/// In-memory store of preview bytes keyed by handle.
#[derive(Debug)]
pub struct PreviewRegistry {
    next: AtomicU64,
    capacity: usize,
    entries: DashMap<u64, SelectedFile>,
}

impl PreviewRegistry {
    pub fn new() -> Arc<Self> {
        Self::with_capacity(DEFAULT_PREVIEW_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            next: AtomicU64::new(0),
            capacity: capacity.max(1),
            entries: DashMap::new(),
        })
    }

    /// Store a preview. Abandoned forms never release theirs, so the oldest
    /// entries are evicted once the registry is full.
    pub fn acquire(&self, file: SelectedFile) -> PreviewHandle {
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries.insert(id, file);
        while self.entries.len() > self.capacity {
            let oldest = self.entries.iter().map(|entry| *entry.key()).min();
            match oldest {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        PreviewHandle(id)
    }

    pub fn get(&self, handle: PreviewHandle) -> Option<SelectedFile> {
        self.entries.get(&handle.0).map(|entry| entry.value().clone())
    }

    pub fn release(&self, handle: PreviewHandle) -> bool {
        let released = self.entries.remove(&handle.0).is_some();
        if released {
            debug!(
                target = "sekretariat::uploads::preview",
                handle = handle.0,
                "released preview"
            );
        }
        released
    }

    pub fn live(&self) -> usize {
        self.entries.len()
    }
}

/// Owns the current preview of one file input. Replacing the file or
/// dropping the slot releases the previous handle.
#[derive(Debug)]
pub struct PreviewSlot {
    registry: Arc<PreviewRegistry>,
    current: Option<PreviewHandle>,
}

impl PreviewSlot {
    pub fn new(registry: Arc<PreviewRegistry>) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    /// Take ownership of a handle issued by an earlier request.
    pub fn adopt(registry: Arc<PreviewRegistry>, handle: Option<PreviewHandle>) -> Self {
        Self {
            registry,
            current: handle,
        }
    }

    /// Hand the current preview over to the client without releasing it.
    pub fn detach(mut self) -> Option<PreviewHandle> {
        self.current.take()
    }

    /// Show a new file. Non-image files clear the preview.
    pub fn replace(&mut self, file: Option<SelectedFile>) -> Option<PreviewHandle> {
        self.clear();
        let file = file.filter(SelectedFile::is_image)?;
        let handle = self.registry.acquire(file);
        self.current = Some(handle);
        Some(handle)
    }

    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            self.registry.release(previous);
        }
    }

    pub fn current(&self) -> Option<PreviewHandle> {
        self.current
    }
}

impl Drop for PreviewSlot {
    fn drop(&mut self) {
        self.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartPart {
    Text { name: String, value: String },
    File(SelectedFile),
}

/// Body of a form submission. Always sent as multipart, so file and text
/// fields travel together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    parts: Vec<MultipartPart>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append `group[index][field]` parts for every row.
    pub fn group<'a, I, R>(mut self, group: &str, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (index, row) in rows.into_iter().enumerate() {
            for (field, value) in row {
                self.parts.push(MultipartPart::Text {
                    name: format!("{group}[{index}][{field}]"),
                    value: value.to_string(),
                });
            }
        }
        self
    }

    /// Attach the selected file, replacing any file already attached.
    pub fn file(mut self, file: SelectedFile) -> Self {
        self.parts
            .retain(|part| !matches!(part, MultipartPart::File(_)));
        self.parts.push(MultipartPart::File(file));
        self
    }

    /// Inject `_method` for verbs other than POST. Any earlier override is
    /// replaced.
    pub fn with_method_override(mut self, method: FormMethod) -> Self {
        self.parts.retain(|part| {
            !matches!(part, MultipartPart::Text { name, .. } if name == METHOD_OVERRIDE_FIELD)
        });
        if let Some(value) = method.override_value() {
            self.parts.push(MultipartPart::Text {
                name: METHOD_OVERRIDE_FIELD.to_string(),
                value: value.to_string(),
            });
        }
        self
    }

    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<MultipartPart> {
        self.parts
    }

    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().rev().find_map(|part| match part {
            MultipartPart::Text { name: key, value } if key == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn attached_file(&self) -> Option<&SelectedFile> {
        self.parts.iter().find_map(|part| match part {
            MultipartPart::File(file) => Some(file),
            MultipartPart::Text { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(name: &str) -> SelectedFile {
        SelectedFile::new("foto", name, None, Bytes::from_static(b"\x89PNG"))
    }

    #[test]
    fn content_type_is_guessed_from_name() {
        assert_eq!(photo("kursi.png").content_type, "image/png");
        assert!(!SelectedFile::new("file", "notulen.pdf", None, Bytes::from_static(b"%PDF")).is_image());
    }

    #[test]
    fn selection_keeps_only_the_first_file() {
        let mut selection = FileSelection::default();
        assert!(selection.offer(photo("a.png")));
        assert!(!selection.offer(photo("b.png")));
        assert_eq!(selection.file().map(|file| file.file_name.as_str()), Some("a.png"));
    }

    #[test]
    fn empty_parts_are_not_selected() {
        let mut selection = FileSelection::default();
        let empty = SelectedFile::new("foto", "", None, Bytes::new());
        assert!(!selection.offer(empty));
        assert!(selection.file().is_none());
    }

    #[test]
    fn replacing_a_preview_releases_the_previous_handle() {
        let registry = PreviewRegistry::new();
        let mut slot = PreviewSlot::new(registry.clone());

        let first = slot.replace(Some(photo("a.png"))).expect("first preview");
        assert_eq!(registry.live(), 1);

        let second = slot.replace(Some(photo("b.png"))).expect("second preview");
        assert_ne!(first, second);
        assert_eq!(registry.live(), 1);
        assert!(registry.get(first).is_none());

        drop(slot);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn detached_previews_survive_until_adopted_and_replaced() {
        let registry = PreviewRegistry::new();
        let slot = {
            let mut slot = PreviewSlot::new(registry.clone());
            slot.replace(Some(photo("a.png")));
            slot
        };
        let handle = slot.detach().expect("handle");
        assert!(registry.get(handle).is_some());

        let raw = handle.id().to_string();
        let mut adopted = PreviewSlot::adopt(registry.clone(), PreviewHandle::parse(&raw));
        adopted.replace(None);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn full_registry_evicts_the_oldest() {
        let registry = PreviewRegistry::with_capacity(2);
        let first = registry.acquire(photo("a.png"));
        let second = registry.acquire(photo("b.png"));
        let third = registry.acquire(photo("c.png"));
        assert!(registry.get(first).is_none());
        assert!(registry.get(second).is_some());
        assert!(registry.get(third).is_some());
    }

    #[test]
    fn method_override_is_injected_once() {
        let body = MultipartBody::new()
            .text("nama", "Kursi")
            .with_method_override(FormMethod::Put)
            .with_method_override(FormMethod::Put);
        let overrides = body
            .parts()
            .iter()
            .filter(|part| matches!(part, MultipartPart::Text { name, .. } if name == METHOD_OVERRIDE_FIELD))
            .count();
        assert_eq!(overrides, 1);
        assert_eq!(body.text_value(METHOD_OVERRIDE_FIELD), Some("PUT"));

        let post = MultipartBody::new().with_method_override(FormMethod::Post);
        assert!(post.parts().is_empty());
    }

    #[test]
    fn groups_are_indexed() {
        let rows = vec![vec![("barang_id", "7"), ("jumlah", "2")]];
        let body = MultipartBody::new().group("items", rows);
        assert_eq!(body.text_value("items[0][barang_id]"), Some("7"));
        assert_eq!(body.text_value("items[0][jumlah]"), Some("2"));
    }
}
