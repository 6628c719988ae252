use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with, MockOptions};
use serde_json::{json, Value};
use tower::{Service, ServiceExt};

type App = axum::routing::RouterIntoService<String>;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn service(router: Router) -> App {
    router.into_service()
}

async fn call(app: &mut App, request: Request<String>) -> axum::response::Response {
    ServiceExt::ready(app).await.unwrap().call(request).await.unwrap()
}

// --- list ---

#[tokio::test]
async fn list_unknown_resource_is_empty() {
    let resp = app()
        .oneshot(empty_request("GET", "/tickets/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn list_filters_on_rendered_values() {
    let mut app = service(app());
    for body in [
        r#"{"ano":2024,"mes":"Enero","meta":10}"#,
        r#"{"ano":2024,"mes":"Febrero","meta":20}"#,
        r#"{"ano":2023,"mes":"Enero","meta":30}"#,
    ] {
        call(&mut app, json_request("POST", "/product15/", body)).await;
    }

    let resp = call(&mut app, empty_request("GET", "/product15/?ano=2024&mes=Enero")).await;
    let rows = body_json(resp).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["meta"], json!(10));
}

#[tokio::test]
async fn list_with_page_returns_envelope() {
    let mut app = service(app_with(MockOptions::default().page_size(2)));
    for i in 0..3 {
        call(&mut app, json_request("POST", "/ventas/", &format!(r#"{{"n":{i}}}"#))).await;
    }

    let resp = call(&mut app, empty_request("GET", "/ventas/?page=1")).await;
    let page = body_json(resp).await;
    assert_eq!(page["count"], json!(3));
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
    assert_eq!(page["next"], json!("/ventas/?page=2"));

    let resp = call(&mut app, empty_request("GET", "/ventas/?page=2")).await;
    let page = body_json(resp).await;
    assert_eq!(page["results"].as_array().unwrap().len(), 1);
    assert_eq!(page["next"], Value::Null);
}

// --- create ---

#[tokio::test]
async fn create_assigns_id_and_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/productos/", r#"{"nombre":"Taza"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await, json!({"id": 1, "nombre": "Taza"}));
}

#[tokio::test]
async fn create_missing_required_field_returns_field_errors() {
    let router = app_with(MockOptions::default().require("productos", &["nombre"]));
    let resp = router
        .oneshot(json_request("POST", "/productos/", r#"{"nombre":" ","precio":3}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({"nombre": ["This field is required."]})
    );
}

#[tokio::test]
async fn create_non_object_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/productos/", "[1,2]"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- get / update / delete ---

#[tokio::test]
async fn get_missing_record_returns_404() {
    let resp = app()
        .oneshot(empty_request("GET", "/tickets/9/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await, json!({"detail": "Not found."}));
}

#[tokio::test]
async fn get_non_numeric_id_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/tickets/abc/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_missing_record_returns_404() {
    let resp = app()
        .oneshot(json_request("PATCH", "/tickets/1/", r#"{"estado":"cerrado"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_record_returns_404() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/tickets/1/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- auth ---

#[tokio::test]
async fn token_is_enforced_when_configured() {
    let mut app = service(app_with(MockOptions::default().with_token("s3cret")));

    let resp = call(&mut app, empty_request("GET", "/tickets/")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/tickets/")
        .header(http::header::AUTHORIZATION, "Bearer s3cret")
        .body(String::new())
        .unwrap();
    let resp = call(&mut app, request).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- bulk delete / export ---

#[tokio::test]
async fn bulk_delete_removes_matching_records() {
    let mut app = service(app());
    for body in [r#"{"mes":"Enero"}"#, r#"{"mes":"Enero"}"#, r#"{"mes":"Marzo"}"#] {
        call(&mut app, json_request("POST", "/metas/", body)).await;
    }

    let resp = call(
        &mut app,
        json_request("POST", "/metas/bulk-delete/", r#"{"mes":"Enero"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"deleted": 2}));

    let resp = call(&mut app, json_request("POST", "/metas/bulk-delete/", "{}")).await;
    assert_eq!(body_json(resp).await, json!({"deleted": 1}));
}

#[tokio::test]
async fn export_returns_csv_attachment() {
    let mut app = service(app());
    call(
        &mut app,
        json_request("POST", "/ventas/", r#"{"cliente":"Pérez, Hijos","total":12.5}"#),
    )
    .await;
    call(&mut app, json_request("POST", "/ventas/", r#"{"cliente":"Otro","total":1}"#)).await;

    let resp = call(&mut app, empty_request("GET", "/ventas/export/?cliente=Otro")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[http::header::CONTENT_DISPOSITION],
        "attachment; filename=\"ventas export.csv\""
    );
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"cliente,id,total\nOtro,2,1\n");

    let resp = call(&mut app, empty_request("GET", "/ventas/export/")).await;
    let body = body_bytes(resp).await;
    assert!(std::str::from_utf8(&body).unwrap().contains("\"P\u{e9}rez, Hijos\",1,12.5"));
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let mut app = service(app());

    // create
    let resp = call(
        &mut app,
        json_request("POST", "/tickets/", r#"{"asunto":"Impresora","estado":"abierto"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    let id = created["id"].as_u64().unwrap();

    // patch merges fields, id is immutable
    let resp = call(
        &mut app,
        json_request(
            "PATCH",
            &format!("/tickets/{id}/"),
            r#"{"estado":"cerrado","id":99}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated, json!({"id": id, "asunto": "Impresora", "estado": "cerrado"}));

    // get
    let resp = call(&mut app, empty_request("GET", &format!("/tickets/{id}/"))).await;
    assert_eq!(body_json(resp).await, updated);

    // delete
    let resp = call(&mut app, empty_request("DELETE", &format!("/tickets/{id}/"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // delete again: 404
    let resp = call(&mut app, empty_request("DELETE", &format!("/tickets/{id}/"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list: empty
    let resp = call(&mut app, empty_request("GET", "/tickets/")).await;
    assert_eq!(body_json(resp).await, json!([]));
}
