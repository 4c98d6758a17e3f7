//! Page-number pagination envelope and page-link generation.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::de;

/// Pages shown without gaps before the link list switches to a window.
pub const LINK_WINDOW: u32 = 7;

fn page_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = de::lenient_u64(deserializer)?;
    Ok(u32::try_from(value).unwrap_or(u32::MAX).max(1))
}

fn first_page() -> u32 {
    1
}

/// Paginated slice as returned by the backend (`data` plus page metadata).
///
/// `from`/`to` are the 1-based bounds of `data` within `total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default = "first_page", deserialize_with = "page_number")]
    pub current_page: u32,
    #[serde(default = "first_page", deserialize_with = "page_number")]
    pub last_page: u32,
    #[serde(default = "first_page", deserialize_with = "page_number")]
    pub per_page: u32,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub total: u64,
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub from: Option<u64>,
    #[serde(default, deserialize_with = "de::lenient_opt_u64")]
    pub to: Option<u64>,
}

impl<T> Paginated<T> {
    pub fn empty(per_page: u32) -> Self {
        Self {
            data: Vec::new(),
            current_page: 1,
            last_page: 1,
            per_page: per_page.max(1),
            total: 0,
            from: None,
            to: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            last_page: self.last_page,
            per_page: self.per_page,
            total: self.total,
            from: self.from,
            to: self.to,
        }
    }

    /// Slice bounds, computed from the page metadata when the backend
    /// omitted them. Empty slices have no bounds.
    pub fn slice_bounds(&self) -> Option<(u64, u64)> {
        if self.data.is_empty() {
            return None;
        }
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => {
                let from = u64::from(self.current_page - 1) * u64::from(self.per_page) + 1;
                let to = from + self.data.len() as u64 - 1;
                Some((from, to))
            }
        }
    }

    pub fn links(&self) -> PageLinks {
        PageLinks::build(self.current_page, self.last_page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLinkItem {
    Page { number: u32, is_current: bool },
    Gap,
}

/// Page-link controls: numbered links plus previous/next targets, which are
/// `None` (disabled) at the boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub items: Vec<PageLinkItem>,
    pub previous: Option<u32>,
    pub next: Option<u32>,
}

impl PageLinks {
    pub fn build(current_page: u32, last_page: u32) -> Self {
        let last = last_page.max(1);
        let current = current_page.clamp(1, last);

        let items = if last <= LINK_WINDOW {
            (1..=last)
                .map(|number| PageLinkItem::Page {
                    number,
                    is_current: number == current,
                })
                .collect()
        } else {
            windowed(current, last)
        };

        Self {
            items,
            previous: (current > 1).then(|| current - 1),
            next: (current < last).then(|| current + 1),
        }
    }

    pub fn is_single_page(&self) -> bool {
        self.previous.is_none() && self.next.is_none()
    }
}

fn windowed(current: u32, last: u32) -> Vec<PageLinkItem> {
    let start = current.saturating_sub(1).max(2);
    let end = (current + 1).min(last - 1);

    let mut items = vec![PageLinkItem::Page {
        number: 1,
        is_current: current == 1,
    }];
    if start > 2 {
        items.push(PageLinkItem::Gap);
    }
    for number in start..=end {
        items.push(PageLinkItem::Page {
            number,
            is_current: number == current,
        });
    }
    if end < last - 1 {
        items.push(PageLinkItem::Gap);
    }
    items.push(PageLinkItem::Page {
        number: last,
        is_current: current == last,
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(links: &PageLinks) -> Vec<Option<u32>> {
        links
            .items
            .iter()
            .map(|item| match item {
                PageLinkItem::Page { number, .. } => Some(*number),
                PageLinkItem::Gap => None,
            })
            .collect()
    }

    #[test]
    fn envelope_tolerates_string_numbers() {
        let raw = r#"{"data":[1,2,3],"current_page":"2","last_page":4,"per_page":"3","total":"11","from":4,"to":6}"#;
        let page: Paginated<u32> = serde_json::from_str(raw).expect("envelope decodes");
        assert_eq!(page.current_page, 2);
        assert_eq!(page.per_page, 3);
        assert_eq!(page.total, 11);
        assert_eq!(page.slice_bounds(), Some((4, 6)));
    }

    #[test]
    fn bounds_are_computed_when_missing() {
        let page = Paginated {
            data: vec!["a", "b"],
            current_page: 3,
            last_page: 3,
            per_page: 10,
            total: 22,
            from: None,
            to: None,
        };
        assert_eq!(page.slice_bounds(), Some((21, 22)));
    }

    #[test]
    fn empty_slice_has_no_bounds() {
        let page: Paginated<u8> = Paginated::empty(10);
        assert_eq!(page.slice_bounds(), None);
        assert!(page.links().is_single_page());
    }

    #[test]
    fn short_ranges_enumerate_every_page() {
        let links = PageLinks::build(1, 4);
        assert_eq!(numbers(&links), vec![Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(links.previous, None);
        assert_eq!(links.next, Some(2));
    }

    #[test]
    fn last_page_disables_next() {
        let links = PageLinks::build(4, 4);
        assert_eq!(links.previous, Some(3));
        assert_eq!(links.next, None);
    }

    #[test]
    fn long_ranges_use_a_window_with_gaps() {
        let links = PageLinks::build(10, 20);
        assert_eq!(
            numbers(&links),
            vec![Some(1), None, Some(9), Some(10), Some(11), None, Some(20)]
        );

        let head = PageLinks::build(1, 20);
        assert_eq!(numbers(&head), vec![Some(1), Some(2), None, Some(20)]);

        let tail = PageLinks::build(20, 20);
        assert_eq!(numbers(&tail), vec![Some(1), None, Some(19), Some(20)]);
    }

    #[test]
    fn out_of_range_current_page_is_clamped() {
        let links = PageLinks::build(9, 3);
        assert_eq!(links.next, None);
        assert_eq!(links.previous, Some(2));
    }
}
