//! List/filter controller.
//!
//! Records in view always come from a full fetch with the current filters.
//! A filter change or `refresh()` only marks the list stale; `sync` performs
//! the fetch. Responses are applied in the order `finish_fetch` sees them,
//! with no sequence guard: when a host runs two fetches concurrently, the
//! one applied last wins even if it was issued first.

use tracing::{debug, warn};

use crate::client::ResourceClient;
use crate::error::ApiError;
use crate::filters::Filters;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{send, Transport};
use crate::types::Record;

#[derive(Debug, Clone)]
pub struct ListController {
    client: ResourceClient,
    records: Vec<Record>,
    total: Option<u64>,
    filters: Filters,
    loading: bool,
    error: Option<String>,
    refresh_counter: u64,
    // filters and refresh counter of the last fetch started
    fetched: Option<(Filters, u64)>,
}

impl ListController {
    pub fn new(client: ResourceClient) -> Self {
        Self::with_filters(client, Filters::new())
    }

    pub fn with_filters(client: ResourceClient, filters: Filters) -> Self {
        Self {
            client,
            records: Vec::new(),
            total: None,
            filters,
            loading: false,
            error: None,
            refresh_counter: 0,
            fetched: None,
        }
    }

    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Total reported by a paginated response, if any.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn refresh_counter(&self) -> u64 {
        self.refresh_counter
    }

    /// True until a fetch has started for the current filters and refresh
    /// counter.
    pub fn is_stale(&self) -> bool {
        match &self.fetched {
            Some((filters, counter)) => {
                *filters != self.filters || *counter != self.refresh_counter
            }
            None => true,
        }
    }

    pub fn set_filter(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.filters.set(key, value);
    }

    pub fn remove_filter(&mut self, key: &str) {
        self.filters.remove(key);
    }

    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
    }

    /// Reset every filter field; the next sync fetches the unfiltered list.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        // An unfiltered list that was already current still reloads.
        self.refresh_counter += 1;
    }

    /// Re-run the fetch without touching the filters.
    pub fn refresh(&mut self) {
        self.refresh_counter += 1;
    }

    /// Start a fetch: marks the list loading and returns the request.
    pub fn begin_fetch(&mut self) -> HttpRequest {
        self.loading = true;
        self.fetched = Some((self.filters.clone(), self.refresh_counter));
        self.client.build_list(&self.filters)
    }

    /// Apply the outcome of a fetch.
    ///
    /// On success the records are replaced wholesale and the error cleared;
    /// on failure the previous records stay and the error is stored.
    pub fn finish_fetch(
        &mut self,
        outcome: Result<HttpResponse, ApiError>,
    ) -> Result<(), ApiError> {
        let result = outcome.and_then(|response| self.client.parse_list(response));
        self.loading = false;
        match result {
            Ok(page) => {
                debug!(
                    resource = self.client.resource().path(),
                    count = page.records.len(),
                    "list loaded"
                );
                self.records = page.records;
                self.total = page.total;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(resource = self.client.resource().path(), error = %e, "list fetch failed");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Fetch unconditionally.
    pub fn reload<T: Transport>(&mut self, transport: &T) -> Result<(), ApiError> {
        let request = self.begin_fetch();
        let outcome = send(transport, &request);
        self.finish_fetch(outcome)
    }

    /// Fetch if the filters or refresh counter changed since the last fetch.
    pub fn sync<T: Transport>(&mut self, transport: &T) -> Result<(), ApiError> {
        if self.is_stale() {
            self.reload(transport)
        } else {
            Ok(())
        }
    }

    /// Delete one record, then reload. The list is never spliced locally:
    /// on failure it stays exactly as it was.
    ///
    /// Once the delete succeeds the call succeeds; a failed reload is left
    /// in `error()`.
    pub fn delete_record<T: Transport>(
        &mut self,
        record: &Record,
        transport: &T,
    ) -> Result<(), ApiError> {
        let result = self
            .client
            .record_id(record)
            .and_then(|id| self.client.build_remove(&id))
            .and_then(|request| send(transport, &request))
            .and_then(|response| self.client.parse_remove(response));
        if let Err(e) = result {
            self.error = Some(e.to_string());
            return Err(e);
        }
        self.refresh();
        let _ = self.sync(transport);
        Ok(())
    }
}
