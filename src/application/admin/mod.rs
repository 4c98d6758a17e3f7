//! Application services for the administrative surface.

pub mod chrome;
pub mod dashboard;
pub mod kehadiran;
pub mod resources;
pub mod stok;

use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

use crate::application::{
    backend::BackendError,
    pagination::{PageLinkItem, Paginated},
    ui::DEFAULT_SEARCH_DEBOUNCE,
};
use crate::presentation::admin::views::{PageLinkView, PaginationView};

pub use chrome::AdminChromeService;
pub use dashboard::AdminDashboardService;
pub use kehadiran::AdminKehadiranService;
pub use resources::AdminResourceService;
pub use stok::AdminStokService;

/// A backend read that a page could not do without.
#[derive(Debug, Error)]
#[error("failed to load {what}")]
pub struct LoadError {
    pub what: &'static str,
    #[source]
    pub source: BackendError,
}

impl LoadError {
    pub fn new(what: &'static str, source: BackendError) -> Self {
        Self { what, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.source, BackendError::Status { status: 404, .. })
    }
}

/// Display settings shared by every admin page.
#[derive(Debug, Clone, Copy)]
pub struct AdminUiSettings {
    pub timezone: Tz,
    pub search_debounce: Duration,
}

impl Default for AdminUiSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Jakarta,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl AdminUiSettings {
    pub fn debounce_ms(&self) -> u64 {
        self.search_debounce.as_millis() as u64
    }
}

/// Page-link controls for a paginated slice; `action` builds the request
/// issued for a page number.
pub(crate) fn pagination_view<T, F>(page: &Paginated<T>, action: F) -> PaginationView
where
    F: Fn(u32) -> String,
{
    let links = page.links();
    let summary = match page.slice_bounds() {
        Some((from, to)) => format!("Menampilkan {from} - {to} dari {} data", page.total),
        None => "Tidak ada data".to_string(),
    };
    let items = links
        .items
        .iter()
        .map(|item| match item {
            PageLinkItem::Page { number, is_current } => PageLinkView {
                label: number.to_string(),
                action: action(*number),
                is_current: *is_current,
                is_gap: false,
            },
            PageLinkItem::Gap => PageLinkView {
                label: "...".to_string(),
                action: String::new(),
                is_current: false,
                is_gap: true,
            },
        })
        .collect();
    PaginationView {
        summary,
        links: items,
        previous_action: links.previous.map(&action),
        next_action: links.next.map(&action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_view_disables_boundaries() {
        let page = Paginated {
            data: vec![1, 2],
            current_page: 1,
            last_page: 3,
            per_page: 2,
            total: 6,
            from: Some(1),
            to: Some(2),
        };
        let view = pagination_view(&page, |number| format!("/barang/panel?page={number}"));
        assert_eq!(view.summary, "Menampilkan 1 - 2 dari 6 data");
        assert_eq!(view.previous_action, None);
        assert_eq!(view.next_action.as_deref(), Some("/barang/panel?page=2"));
        assert_eq!(view.links.len(), 3);
        assert!(view.links[0].is_current);
    }

    #[test]
    fn empty_pages_say_so() {
        let page: Paginated<u8> = Paginated::empty(10);
        let view = pagination_view(&page, |number| number.to_string());
        assert_eq!(view.summary, "Tidak ada data");
        assert!(view.next_action.is_none());
    }
}
