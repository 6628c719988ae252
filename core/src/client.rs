//! Stateless HTTP request builder and response parser for one resource.
//!
//! # Design
//! `ResourceClient` holds the base URL, the resource configuration and the
//! credential provider; it carries no mutable state between calls. Every
//! operation is split into a `build_*` method producing an `HttpRequest` and
//! a `parse_*` method consuming an `HttpResponse`. The caller (or
//! `ResourceApi`) executes the round-trip, so the client stays deterministic
//! and free of I/O.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::auth::{authorization_value, CredentialProvider, NoCredentials};
use crate::disposition::download_filename;
use crate::error::ApiError;
use crate::filters::Filters;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::resource::ResourceConfig;
use crate::types::{Export, Page, Record, RecordId};

#[derive(Clone)]
pub struct ResourceClient {
    base_url: String,
    resource: Arc<ResourceConfig>,
    credentials: Arc<dyn CredentialProvider>,
}

impl fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("base_url", &self.base_url)
            .field("resource", &self.resource.path())
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct BulkDeleteBody {
    deleted: u64,
}

impl ResourceClient {
    pub fn new(
        base_url: &str,
        resource: ResourceConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            resource: Arc::new(resource),
            credentials,
        }
    }

    /// Client that sends no `authorization` header.
    pub fn anonymous(base_url: &str, resource: ResourceConfig) -> Self {
        Self::new(base_url, resource, Arc::new(NoCredentials))
    }

    pub fn resource(&self) -> &ResourceConfig {
        &self.resource
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // URLs
    // -----------------------------------------------------------------------

    fn collection_url(&self, filters: Option<&Filters>) -> String {
        self.url(&format!("{}/", self.resource.path()), filters)
    }

    fn item_url(&self, id: &RecordId) -> String {
        self.url(&format!("{}/{id}/", self.resource.path()), None)
    }

    fn action_url(&self, action: &str, filters: Option<&Filters>) -> String {
        self.url(&format!("{}/{action}/", self.resource.path()), filters)
    }

    fn url(&self, path: &str, filters: Option<&Filters>) -> String {
        let query = filters.map(Filters::to_query_string).unwrap_or_default();
        if query.is_empty() {
            format!("{}/{path}", self.base_url)
        } else {
            format!("{}/{path}?{query}", self.base_url)
        }
    }

    fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(value) = self
            .credentials
            .token()
            .and_then(|raw| authorization_value(&raw))
        {
            headers.push(("authorization".to_string(), value));
        }
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    fn json_request(
        &self,
        method: HttpMethod,
        url: String,
        payload: &Value,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(self.request(method, url, Some(body)))
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    pub fn build_list(&self, filters: &Filters) -> HttpRequest {
        self.request(HttpMethod::Get, self.collection_url(Some(filters)), None)
    }

    pub fn build_get(&self, id: &RecordId) -> HttpRequest {
        self.request(HttpMethod::Get, self.item_url(id), None)
    }

    pub fn build_create(&self, payload: &Record) -> Result<HttpRequest, ApiError> {
        self.resource.ensure_writable("create")?;
        self.json_request(
            HttpMethod::Post,
            self.collection_url(None),
            &Value::Object(payload.clone()),
        )
    }

    pub fn build_update(&self, id: &RecordId, payload: &Record) -> Result<HttpRequest, ApiError> {
        self.resource.ensure_writable("update")?;
        self.json_request(
            HttpMethod::Patch,
            self.item_url(id),
            &Value::Object(payload.clone()),
        )
    }

    pub fn build_remove(&self, id: &RecordId) -> Result<HttpRequest, ApiError> {
        self.resource.ensure_writable("remove")?;
        Ok(self.request(HttpMethod::Delete, self.item_url(id), None))
    }

    pub fn build_bulk_delete(&self, filters: &Filters) -> Result<HttpRequest, ApiError> {
        self.resource.ensure_writable("bulk-delete")?;
        self.json_request(
            HttpMethod::Post,
            self.action_url("bulk-delete", None),
            &filters.to_json(),
        )
    }

    pub fn build_export(&self, filters: &Filters) -> HttpRequest {
        self.request(HttpMethod::Get, self.action_url("export", Some(filters)), None)
    }

    // -----------------------------------------------------------------------
    // Parse
    // -----------------------------------------------------------------------

    pub fn parse_list(&self, response: HttpResponse) -> Result<Page, ApiError> {
        check_status(&response)?;
        Page::from_json(&response.body)
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<Record, ApiError> {
        check_status(&response)?;
        parse_record(&response)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<Record, ApiError> {
        check_write_status(&response)?;
        parse_record(&response)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<Record, ApiError> {
        check_write_status(&response)?;
        parse_record(&response)
    }

    pub fn parse_remove(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    /// Number of records the server reports as deleted.
    pub fn parse_bulk_delete(&self, response: HttpResponse) -> Result<u64, ApiError> {
        check_write_status(&response)?;
        let body: BulkDeleteBody = serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(body.deleted)
    }

    pub fn parse_export(&self, response: HttpResponse) -> Result<Export, ApiError> {
        check_status(&response)?;
        let filename = download_filename(
            response.header("content-disposition"),
            self.resource.default_export_name(),
        );
        let content_type = response.header("content-type").map(str::to_string);
        Ok(Export {
            filename,
            content_type,
            bytes: response.body,
        })
    }

    /// Id of a record returned by this resource, read from its id field.
    pub fn record_id(&self, record: &Record) -> Result<RecordId, ApiError> {
        RecordId::from_record(record, self.resource.id_field())
    }
}

fn parse_record(response: &HttpResponse) -> Result<Record, ApiError> {
    serde_json::from_slice(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-2xx status codes to `NotFound` or `HttpError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.text(),
    })
}

/// Like `check_status`, but a JSON error document becomes `Rejected` so
/// field-level validation messages survive. 404 stays `NotFound` whatever
/// the body says.
fn check_write_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() || response.status == 404 {
        return check_status(response);
    }
    match serde_json::from_slice::<Value>(&response.body) {
        Ok(detail) if detail.is_object() || detail.is_array() => Err(ApiError::Rejected {
            status: response.status,
            detail,
        }),
        _ => check_status(response),
    }
}
