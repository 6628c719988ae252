//! Create/edit form controller.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::client::ResourceClient;
use crate::controller::list::ListController;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::resource::Field;
use crate::transport::{send, Transport};
use crate::types::{Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Closed,
    Creating,
    Editing(RecordId),
}

/// Draft state for one resource's create/edit dialog.
///
/// Draft values are always text; they are coerced per field kind only when
/// the payload is built.
#[derive(Debug, Clone)]
pub struct FormController {
    client: ResourceClient,
    mode: FormMode,
    draft: BTreeMap<String, String>,
    error: Option<String>,
}

impl FormController {
    pub fn new(client: ResourceClient) -> Self {
        Self {
            client,
            mode: FormMode::Closed,
            draft: BTreeMap::new(),
            error: None,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode != FormMode::Closed
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn field(&self, name: &str) -> &str {
        self.draft.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn draft(&self) -> &BTreeMap<String, String> {
        &self.draft
    }

    pub fn set_field(&mut self, name: &str, value: &str) {
        self.draft.insert(name.to_string(), value.to_string());
    }

    /// Open an empty draft.
    pub fn open_create(&mut self) {
        self.draft = self
            .client
            .resource()
            .fields()
            .iter()
            .map(|f| (f.name.clone(), String::new()))
            .collect();
        self.error = None;
        self.mode = FormMode::Creating;
    }

    pub fn begin_edit(&self, id: &RecordId) -> HttpRequest {
        self.client.build_get(id)
    }

    /// Populate the draft from the fetched record. On failure the form stays
    /// closed with the error stored.
    pub fn finish_edit(
        &mut self,
        id: RecordId,
        outcome: Result<HttpResponse, ApiError>,
    ) -> Result<(), ApiError> {
        match outcome.and_then(|response| self.client.parse_get(response)) {
            Ok(record) => {
                self.draft = self
                    .client
                    .resource()
                    .fields()
                    .iter()
                    .map(|f| (f.name.clone(), Field::draft_text(record.get(&f.name))))
                    .collect();
                self.error = None;
                self.mode = FormMode::Editing(id);
                Ok(())
            }
            Err(e) => {
                warn!(resource = self.client.resource().path(), error = %e, "could not load record for edit");
                self.mode = FormMode::Closed;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn open_edit<T: Transport>(&mut self, id: RecordId, transport: &T) -> Result<(), ApiError> {
        let request = self.begin_edit(&id);
        let outcome = send(transport, &request);
        self.finish_edit(id, outcome)
    }

    /// Edit the record as listed, resolving its id first.
    pub fn open_edit_record<T: Transport>(
        &mut self,
        record: &Record,
        transport: &T,
    ) -> Result<(), ApiError> {
        match self.client.record_id(record) {
            Ok(id) => self.open_edit(id, transport),
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Discard the draft without any request.
    pub fn cancel(&mut self) {
        self.mode = FormMode::Closed;
        self.draft.clear();
        self.error = None;
    }

    /// Validate and coerce the draft into the create or update request.
    pub fn build_submit(&self) -> Result<HttpRequest, ApiError> {
        let resource = self.client.resource();
        let payload = resource.payload(|name| self.draft.get(name).map(String::as_str))?;
        match &self.mode {
            FormMode::Creating => self.client.build_create(&payload),
            FormMode::Editing(id) => self.client.build_update(id, &payload),
            FormMode::Closed => Err(ApiError::Validation("form is not open".to_string())),
        }
    }

    /// Apply the submit response: close on success, stay open with the
    /// server's message otherwise.
    pub fn finish_submit(
        &mut self,
        outcome: Result<HttpResponse, ApiError>,
    ) -> Result<Record, ApiError> {
        let result = outcome.and_then(|response| match self.mode {
            FormMode::Editing(_) => self.client.parse_update(response),
            _ => self.client.parse_create(response),
        });
        match result {
            Ok(record) => {
                debug!(resource = self.client.resource().path(), "record saved");
                self.cancel();
                Ok(record)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Submit the draft; on success close and reload `list`.
    ///
    /// Local validation failures return before any request is sent.
    pub fn submit<T: Transport>(
        &mut self,
        transport: &T,
        list: &mut ListController,
    ) -> Result<Record, ApiError> {
        let request = match self.build_submit() {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e);
            }
        };
        let record = self.finish_submit(send(transport, &request))?;
        list.refresh();
        // The save went through; a failed reload is reported on the list.
        let _ = list.sync(transport);
        Ok(record)
    }
}
