//! In-memory REST backend for dashboard resources.
//!
//! Serves any resource name under `/{resource}/` with list, get, create,
//! patch, delete, bulk-delete and export endpoints. Records are flat JSON
//! objects keyed by an auto-incremented numeric `id`.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub type Record = Map<String, Value>;

/// Backend behaviour knobs.
#[derive(Debug, Clone)]
pub struct MockOptions {
    /// When set, every request must carry `Authorization: Bearer <token>`.
    pub token: Option<String>,
    /// Fields that must be present and non-blank on create, per resource.
    pub required: HashMap<String, Vec<String>>,
    /// Page size used when a list request carries `page`.
    pub page_size: usize,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            token: None,
            required: HashMap::new(),
            page_size: 50,
        }
    }
}

impl MockOptions {
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn require(mut self, resource: &str, fields: &[&str]) -> Self {
        self.required.insert(
            resource.to_string(),
            fields.iter().map(|f| f.to_string()).collect(),
        );
        self
    }
}

#[derive(Debug, Default)]
struct Table {
    next_id: u64,
    rows: BTreeMap<u64, Record>,
}

#[derive(Debug, Default)]
struct Store {
    tables: HashMap<String, Table>,
}

#[derive(Clone)]
struct AppState {
    store: Arc<RwLock<Store>>,
    options: Arc<MockOptions>,
}

pub fn app() -> Router {
    app_with(MockOptions::default())
}

pub fn app_with(options: MockOptions) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(Store::default())),
        options: Arc::new(options),
    };
    Router::new()
        .route("/{resource}/", get(list_records).post(create_record))
        .route("/{resource}/bulk-delete/", post(bulk_delete))
        .route("/{resource}/export/", get(export_records))
        .route(
            "/{resource}/{id}/",
            get(get_record).patch(update_record).delete(delete_record),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockOptions::default()).await
}

pub async fn run_with(listener: TcpListener, options: MockOptions) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(options)).await
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.options.token.as_deref() else {
        return next.run(request).await;
    };
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if presented == Some(format!("Bearer {expected}").as_str()) {
        next.run(request).await
    } else {
        tracing::debug!(?presented, "rejected request without valid token");
        detail(
            StatusCode::UNAUTHORIZED,
            "Authentication credentials were not provided.",
        )
    }
}

/// Text used to compare a record value with a filter value.
fn filter_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(record: &Record, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(key, expected)| {
        record
            .get(key)
            .is_some_and(|value| filter_text(value) == *expected)
    })
}

fn filters_from_query(query: &HashMap<String, String>) -> Vec<(String, String)> {
    query
        .iter()
        .filter(|(k, _)| k.as_str() != "page")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

async fn list_records(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let filters = filters_from_query(&query);
    let store = state.store.read().await;
    let rows: Vec<Record> = store
        .tables
        .get(&resource)
        .map(|t| t.rows.values().filter(|r| matches(r, &filters)).cloned().collect())
        .unwrap_or_default();

    let Some(page) = query.get("page") else {
        return Json(rows).into_response();
    };
    let Ok(page) = page.parse::<usize>() else {
        return detail(StatusCode::BAD_REQUEST, "Invalid page.");
    };
    let size = state.options.page_size.max(1);
    let count = rows.len();
    let results: Vec<Record> = rows
        .into_iter()
        .skip(page.saturating_sub(1) * size)
        .take(size)
        .collect();
    let next = (page * size < count).then(|| format!("/{resource}/?page={}", page + 1));
    Json(json!({
        "count": count,
        "next": next,
        "previous": Value::Null,
        "results": results,
    }))
    .into_response()
}

async fn get_record(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, u64)>,
) -> Response {
    let store = state.store.read().await;
    match store.tables.get(&resource).and_then(|t| t.rows.get(&id)) {
        Some(record) => Json(record.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Not found."),
    }
}

fn missing_fields(required: Option<&Vec<String>>, body: &Record) -> Option<Value> {
    let errors: Map<String, Value> = required?
        .iter()
        .filter(|field| match body.get(field.as_str()) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        })
        .map(|field| (field.clone(), json!(["This field is required."])))
        .collect();
    (!errors.is_empty()).then_some(Value::Object(errors))
}

async fn create_record(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let Value::Object(mut record) = body else {
        return detail(StatusCode::BAD_REQUEST, "Expected a JSON object.");
    };
    if let Some(errors) = missing_fields(state.options.required.get(&resource), &record) {
        return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
    }

    let mut store = state.store.write().await;
    let table = store.tables.entry(resource).or_default();
    table.next_id += 1;
    let id = table.next_id;
    record.insert("id".to_string(), json!(id));
    table.rows.insert(id, record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update_record(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, u64)>,
    Json(body): Json<Value>,
) -> Response {
    let Value::Object(changes) = body else {
        return detail(StatusCode::BAD_REQUEST, "Expected a JSON object.");
    };
    let mut store = state.store.write().await;
    let Some(record) = store.tables.get_mut(&resource).and_then(|t| t.rows.get_mut(&id)) else {
        return detail(StatusCode::NOT_FOUND, "Not found.");
    };
    for (key, value) in changes {
        if key != "id" {
            record.insert(key, value);
        }
    }
    Json(record.clone()).into_response()
}

async fn delete_record(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, u64)>,
) -> Response {
    let mut store = state.store.write().await;
    match store.tables.get_mut(&resource).and_then(|t| t.rows.remove(&id)) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => detail(StatusCode::NOT_FOUND, "Not found."),
    }
}

async fn bulk_delete(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let Value::Object(filters) = body else {
        return detail(StatusCode::BAD_REQUEST, "Expected a JSON object.");
    };
    let filters: Vec<(String, String)> = filters
        .iter()
        .map(|(k, v)| (k.clone(), filter_text(v)))
        .collect();

    let mut store = state.store.write().await;
    let deleted = match store.tables.get_mut(&resource) {
        Some(table) => {
            let before = table.rows.len();
            table.rows.retain(|_, record| !matches(record, &filters));
            before - table.rows.len()
        }
        None => 0,
    };
    tracing::info!(%resource, deleted, "bulk delete");
    Json(json!({ "deleted": deleted })).into_response()
}

fn csv_cell(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(value) => filter_text(value),
    };
    if text.contains(|c: char| matches!(c, ',' | '"' | '\n')) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

async fn export_records(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let filters = filters_from_query(&query);
    let store = state.store.read().await;
    let rows: Vec<&Record> = store
        .tables
        .get(&resource)
        .map(|t| t.rows.values().filter(|r| matches(r, &filters)).collect())
        .unwrap_or_default();

    let columns: BTreeSet<&String> = rows.iter().flat_map(|r| r.keys()).collect();
    let mut csv = columns.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(",");
    csv.push('\n');
    for row in &rows {
        let line = columns
            .iter()
            .map(|c| csv_cell(row.get(c.as_str())))
            .collect::<Vec<_>>()
            .join(",");
        csv.push_str(&line);
        csv.push('\n');
    }

    let filename = format!("{} export.csv", resource.replace('/', "-"));
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn filters_compare_rendered_values() {
        let r = record(json!({"ano": 2024, "mes": "Enero", "activo": true}));
        let f = |pairs: &[(&str, &str)]| -> Vec<(String, String)> {
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };
        assert!(matches(&r, &f(&[("ano", "2024"), ("mes", "Enero")])));
        assert!(matches(&r, &f(&[("activo", "true")])));
        assert!(!matches(&r, &f(&[("mes", "Febrero")])));
        assert!(!matches(&r, &f(&[("vendedor", "x")])));
        assert!(matches(&r, &[]));
    }

    #[test]
    fn missing_fields_reports_blank_and_null() {
        let required = vec!["nombre".to_string(), "mes".to_string(), "ano".to_string()];
        let body = record(json!({"nombre": "  ", "mes": null, "ano": 2024}));
        let errors = missing_fields(Some(&required), &body).unwrap();
        assert_eq!(
            errors,
            json!({"nombre": ["This field is required."], "mes": ["This field is required."]})
        );
        assert!(missing_fields(None, &body).is_none());
    }

    #[test]
    fn csv_cells_are_quoted_when_needed() {
        assert_eq!(csv_cell(Some(&json!("a,b"))), "\"a,b\"");
        assert_eq!(csv_cell(Some(&json!("say \"hi\""))), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_cell(Some(&json!(12.5))), "12.5");
        assert_eq!(csv_cell(Some(&Value::Null)), "");
        assert_eq!(csv_cell(None), "");
    }
}
