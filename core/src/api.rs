//! Round-trip operations: build, execute, parse.

use crate::client::ResourceClient;
use crate::error::ApiError;
use crate::filters::Filters;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{self, Transport};
use crate::types::{Export, Page, Record, RecordId};

/// A `ResourceClient` paired with a `Transport`.
///
/// No caching, retries or request de-duplication: every call is exactly one
/// request.
#[derive(Debug, Clone)]
pub struct ResourceApi<T> {
    client: ResourceClient,
    transport: T,
}

impl<T: Transport> ResourceApi<T> {
    pub fn new(client: ResourceClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn list(&self, filters: &Filters) -> Result<Page, ApiError> {
        let response = self.send(self.client.build_list(filters))?;
        self.client.parse_list(response)
    }

    pub fn get(&self, id: &RecordId) -> Result<Record, ApiError> {
        let response = self.send(self.client.build_get(id))?;
        self.client.parse_get(response)
    }

    pub fn create(&self, payload: &Record) -> Result<Record, ApiError> {
        let response = self.send(self.client.build_create(payload)?)?;
        self.client.parse_create(response)
    }

    pub fn update(&self, id: &RecordId, payload: &Record) -> Result<Record, ApiError> {
        let response = self.send(self.client.build_update(id, payload)?)?;
        self.client.parse_update(response)
    }

    pub fn remove(&self, id: &RecordId) -> Result<(), ApiError> {
        let response = self.send(self.client.build_remove(id)?)?;
        self.client.parse_remove(response)
    }

    pub fn bulk_delete(&self, filters: &Filters) -> Result<u64, ApiError> {
        let response = self.send(self.client.build_bulk_delete(filters)?)?;
        self.client.parse_bulk_delete(response)
    }

    pub fn export(&self, filters: &Filters) -> Result<Export, ApiError> {
        let response = self.send(self.client.build_export(filters))?;
        self.client.parse_export(response)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        transport::send(&self.transport, &request)
    }
}
