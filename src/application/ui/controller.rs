//! Reusable list-page controller: search, sort, filter, paginate and keep the
//! URL in step with the state the backend actually applied.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::debug;
use url::form_urlencoded;

use crate::application::{
    backend::{BackendError, BackendGateway, PageProps},
    list_query::{ListQuery, QuerySchema, echo_pairs},
};

use super::{
    debounce::Debouncer,
    synchronizer::{Synchronizer, Visit, VisitMode},
};

/// Issues a navigation and returns the props of the page it lands on.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, visit: &Visit) -> Result<PageProps, BackendError>;
}

/// Navigator that fetches page props straight from the backend.
pub struct BackendNavigator {
    backend: Arc<dyn BackendGateway>,
}

impl BackendNavigator {
    pub fn new(backend: Arc<dyn BackendGateway>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Navigator for BackendNavigator {
    async fn navigate(&self, visit: &Visit) -> Result<PageProps, BackendError> {
        self.backend.fetch_props(&visit.path, &visit.params).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Applied { href: String, mode: VisitMode },
    /// A newer navigation was issued while this one was in flight.
    Stale,
    Unchanged,
}

pub struct ListController<N> {
    sync: Synchronizer,
    navigator: N,
    debouncer: Debouncer<String>,
    query: ListQuery,
    search_input: String,
    props: PageProps,
    location: String,
}

impl<N: Navigator> ListController<N> {
    pub fn new(schema: Arc<QuerySchema>, navigator: N, debounce: Duration) -> Self {
        let query = schema.defaults();
        let location = schema.path().to_string();
        Self {
            sync: Synchronizer::new(schema),
            navigator,
            debouncer: Debouncer::new(debounce),
            query,
            search_input: String::new(),
            props: PageProps::default(),
            location,
        }
    }

    pub fn schema(&self) -> &QuerySchema {
        self.sync.schema()
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn props(&self) -> &PageProps {
        &self.props
    }

    /// Text currently in the search box, which may be ahead of the query.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Seed state from the initial props and the URL the page was opened
    /// with. A URL that only repeats the defaults is stripped once.
    pub async fn mount(
        &mut self,
        props: PageProps,
        url_query: Option<&str>,
    ) -> Result<NavigationOutcome, BackendError> {
        let raw = url_query.unwrap_or("").trim_start_matches('?');
        let had_query = !raw.is_empty();
        self.query = self.derive_query(&props, raw);
        self.search_input = self.query.search.clone();
        self.props = props;
        self.location = if had_query {
            format!("{}?{}", self.schema().path(), raw)
        } else {
            self.schema().path().to_string()
        };

        match self.sync.mount(&self.query, had_query) {
            Some(visit) => self.run(visit).await,
            None => Ok(NavigationOutcome::Unchanged),
        }
    }

    pub fn type_search(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.search_input = text.clone();
        self.debouncer.push(text);
    }

    /// Wait for the search box to settle and navigate when the settled text
    /// differs from the applied search. `None` when nothing was typed.
    pub async fn next_settled_search(
        &mut self,
    ) -> Result<Option<NavigationOutcome>, BackendError> {
        let Some(text) = self.debouncer.settled().await else {
            return Ok(None);
        };
        if text.trim() == self.query.search {
            return Ok(Some(NavigationOutcome::Unchanged));
        }
        let query = self.query.clone().with_search(text);
        self.navigate(query).await.map(Some)
    }

    pub async fn sort_by(&mut self, field: &str) -> Result<NavigationOutcome, BackendError> {
        let query = self.query.clone().with_sort(field, self.sync.schema());
        if query == self.query {
            return Ok(NavigationOutcome::Unchanged);
        }
        self.navigate(query).await
    }

    pub async fn set_filter(
        &mut self,
        filter: Option<String>,
    ) -> Result<NavigationOutcome, BackendError> {
        let query = self.query.clone().with_filter(filter);
        self.navigate(query).await
    }

    pub async fn set_extra(
        &mut self,
        key: &str,
        value: Option<String>,
    ) -> Result<NavigationOutcome, BackendError> {
        let query = self.query.clone().with_extra(key, value);
        self.navigate(query).await
    }

    pub async fn go_to_page(&mut self, page: u32) -> Result<NavigationOutcome, BackendError> {
        let query = self.query.clone().with_page(page);
        self.navigate(query).await
    }

    pub async fn set_per_page(&mut self, per_page: u32) -> Result<NavigationOutcome, BackendError> {
        let query = self.query.clone().with_per_page(per_page);
        self.navigate(query).await
    }

    /// Re-run the current query in place, e.g. after a modal submission.
    pub async fn refresh(&mut self) -> Result<NavigationOutcome, BackendError> {
        let mut visit = self.begin(self.query.clone());
        visit.mode = VisitMode::Replace;
        self.run(visit).await
    }

    /// Adopt `query` locally and issue its visit. Pair with [`complete`].
    ///
    /// [`complete`]: ListController::complete
    pub fn begin(&mut self, query: ListQuery) -> Visit {
        self.query = query;
        self.sync.visit(&self.query)
    }

    /// Apply a navigation result unless a newer visit was issued meanwhile.
    pub fn complete(
        &mut self,
        visit: &Visit,
        result: Result<PageProps, BackendError>,
    ) -> Result<NavigationOutcome, BackendError> {
        if !self.sync.is_latest(visit.ticket) {
            debug!(
                target = "sekretariat::ui::controller",
                ticket = visit.ticket.value(),
                path = %visit.path,
                "discarding stale navigation"
            );
            return Ok(NavigationOutcome::Stale);
        }
        let props = result?;
        let href = visit.href();
        let raw = href.split_once('?').map(|(_, raw)| raw).unwrap_or("");
        self.query = self.derive_query(&props, raw);
        if !self.debouncer.is_pending() {
            self.search_input = self.query.search.clone();
        }
        self.props = props;
        self.location = href.clone();
        Ok(NavigationOutcome::Applied {
            href,
            mode: visit.mode,
        })
    }

    async fn navigate(&mut self, query: ListQuery) -> Result<NavigationOutcome, BackendError> {
        let visit = self.begin(query);
        self.run(visit).await
    }

    async fn run(&mut self, visit: Visit) -> Result<NavigationOutcome, BackendError> {
        let result = self.navigator.navigate(&visit).await;
        self.complete(&visit, result)
    }

    /// The backend's `filters` echo wins over the URL: it names the values
    /// that produced the current page.
    fn derive_query(&self, props: &PageProps, raw_query: &str) -> ListQuery {
        let url_pairs = form_urlencoded::parse(raw_query.as_bytes()).into_owned();
        let echoed = props.filters_echo().map(echo_pairs).unwrap_or_default();
        self.sync.schema().decode(url_pairs.chain(echoed))
    }
}
