//! Turns list-query state into navigation requests.

use std::sync::Arc;

use crate::application::{
    list_query::{ListQuery, QuerySchema},
    sequence::{RequestSequence, Ticket},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitMode {
    /// Adds a history entry.
    Push,
    /// Rewrites the current entry.
    Replace,
}

/// One GET navigation carrying list-query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub path: String,
    pub params: Vec<(String, String)>,
    pub mode: VisitMode,
    pub preserve_state: bool,
    pub ticket: Ticket,
}

impl Visit {
    pub fn href(&self) -> String {
        if self.params.is_empty() {
            return self.path.clone();
        }
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            serializer.append_pair(key, value);
        }
        format!("{}?{}", self.path, serializer.finish())
    }
}

pub struct Synchronizer {
    schema: Arc<QuerySchema>,
    sequence: RequestSequence,
}

impl Synchronizer {
    pub fn new(schema: Arc<QuerySchema>) -> Self {
        Self {
            schema,
            sequence: RequestSequence::new(),
        }
    }

    pub fn schema(&self) -> &QuerySchema {
        &self.schema
    }

    pub fn visit(&self, query: &ListQuery) -> Visit {
        Visit {
            path: self.schema.path().to_string(),
            params: self.schema.encode(query),
            mode: VisitMode::Push,
            preserve_state: true,
            ticket: self.sequence.issue(),
        }
    }

    /// On first mount, a URL whose parameters all equal the defaults is
    /// rewritten to the bare path once, without a new history entry.
    pub fn mount(&self, query: &ListQuery, had_query: bool) -> Option<Visit> {
        if !had_query || !self.schema.is_default(query) {
            return None;
        }
        Some(Visit {
            path: self.schema.path().to_string(),
            params: Vec::new(),
            mode: VisitMode::Replace,
            preserve_state: true,
            ticket: self.sequence.issue(),
        })
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.sequence.is_latest(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::list_query::SortDirection;

    fn synchronizer() -> Synchronizer {
        Synchronizer::new(Arc::new(
            QuerySchema::new("/barang")
                .sort_fields(&["created_at", "nama"])
                .default_sort("created_at", SortDirection::Desc),
        ))
    }

    #[test]
    fn visit_carries_exactly_the_encoded_state() {
        let sync = synchronizer();
        let query = sync.schema().defaults().with_search("kursi");
        let visit = sync.visit(&query);
        assert_eq!(visit.mode, VisitMode::Push);
        assert!(visit.preserve_state);
        assert_eq!(
            visit.href(),
            "/barang?search=kursi&sort_by=created_at&sort_direction=desc&perPage=10&page=1"
        );
    }

    #[test]
    fn default_mount_strips_the_query_string_once() {
        let sync = synchronizer();
        let defaults = sync.schema().defaults();

        let strip = sync.mount(&defaults, true).expect("replace visit");
        assert_eq!(strip.mode, VisitMode::Replace);
        assert_eq!(strip.href(), "/barang");

        assert!(sync.mount(&defaults, false).is_none());
        assert!(sync.mount(&defaults.with_page(2), true).is_none());
    }

    #[test]
    fn newer_visits_supersede_older_ones() {
        let sync = synchronizer();
        let query = sync.schema().defaults();
        let first = sync.visit(&query);
        let second = sync.visit(&query.clone().with_page(2));
        assert!(!sync.is_latest(first.ticket));
        assert!(sync.is_latest(second.ticket));
    }
}
