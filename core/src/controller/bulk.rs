//! Bulk delete and export over the list's current filters.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::controller::list::ListController;
use crate::error::ApiError;
use crate::filters::Filters;
use crate::transport::{send, Transport};
use crate::types::Export;

/// Asks the user before a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Receives exported files.
pub trait DownloadSink {
    fn save(&mut self, export: &Export) -> Result<(), ApiError>;
}

/// Writes exports into a directory, keeping the server's filename.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            saved: Vec::new(),
        }
    }

    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, export: &Export) -> Result<(), ApiError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&export.filename);
        fs::write(&path, &export.bytes)?;
        self.saved.push(path);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOutcome {
    Cancelled,
    Deleted(u64),
}

/// Confirmation text for a bulk delete. An empty filter set gets its own
/// wording because every record is affected.
pub fn confirmation_prompt(resource: &str, filters: &Filters) -> String {
    if filters.is_empty() {
        format!(
            "No filters are applied. This will delete ALL records in {resource}. This cannot be undone. Continue?"
        )
    } else {
        let applied = filters
            .active()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Delete every record in {resource} matching the current filters ({applied})? This cannot be undone."
        )
    }
}

/// Bulk delete and export state: the last error and the last report.
#[derive(Debug, Clone, Default)]
pub struct BulkActions {
    error: Option<String>,
    notice: Option<String>,
}

impl BulkActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    // A failure replaces whatever the last success reported.
    fn fail(&mut self, error: &ApiError) {
        self.error = Some(error.to_string());
        self.notice = None;
    }

    /// Ask for confirmation, delete everything matching the list's filters,
    /// then reload the list with the same filters.
    pub fn bulk_delete<T, C>(
        &mut self,
        list: &mut ListController,
        transport: &T,
        confirm: &mut C,
    ) -> Result<BulkOutcome, ApiError>
    where
        T: Transport,
        C: Confirm + ?Sized,
    {
        let client = list.client().clone();
        let prompt = confirmation_prompt(client.resource().path(), list.filters());
        if !confirm.confirm(&prompt) {
            return Ok(BulkOutcome::Cancelled);
        }

        let result = client
            .build_bulk_delete(list.filters())
            .and_then(|request| send(transport, &request))
            .and_then(|response| client.parse_bulk_delete(response));
        let deleted = match result {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!(resource = client.resource().path(), error = %e, "bulk delete failed");
                self.fail(&e);
                return Err(e);
            }
        };

        info!(resource = client.resource().path(), deleted, "bulk delete finished");
        self.error = None;
        self.notice = Some(format!("Deleted {deleted} records"));
        list.refresh();
        // Deleted count stands even if the reload fails; the list shows that error.
        let _ = list.sync(transport);
        Ok(BulkOutcome::Deleted(deleted))
    }

    /// Export the records matching the list's filters into `sink`.
    pub fn export<T, S>(
        &mut self,
        list: &ListController,
        transport: &T,
        sink: &mut S,
    ) -> Result<Export, ApiError>
    where
        T: Transport,
        S: DownloadSink + ?Sized,
    {
        let client = list.client();
        let request = client.build_export(list.filters());
        let result = send(transport, &request)
            .and_then(|response| client.parse_export(response))
            .and_then(|export| sink.save(&export).map(|()| export));
        match result {
            Ok(export) => {
                info!(
                    resource = client.resource().path(),
                    filename = %export.filename,
                    bytes = export.bytes.len(),
                    "export saved"
                );
                self.error = None;
                self.notice = Some(format!("Downloaded {}", export.filename));
                Ok(export)
            }
            Err(e) => {
                warn!(resource = client.resource().path(), error = %e, "export failed");
                self.fail(&e);
                Err(e)
            }
        }
    }
}
