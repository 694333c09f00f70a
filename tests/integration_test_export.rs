mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::TestApp;
use serde_json::{json, Map, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn export(app: &TestApp, token: &str) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/leads/export")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn get_leads(app: &TestApp, token: &str) -> Vec<Value> {
    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/leads")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    parse_body(res).await.as_array().unwrap().clone()
}

async fn post_json(app: &TestApp, uri: &str, token: &str, body: Value) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Everything that should survive an export/import cycle, i.e. every
/// persisted column except the generated id.
fn persisted_projection(lead: &Value) -> Vec<Value> {
    [
        "first_name",
        "last_name",
        "phone",
        "created_at",
        "answered_whatsapp",
        "answered_phone",
        "demo_scheduled",
        "observations",
        "assigned_to",
        "status",
    ]
    .iter()
    .map(|key| lead[*key].clone())
    .collect()
}

#[tokio::test]
async fn test_export_is_admin_only() {
    let app = TestApp::new().await;

    for username in ["boss", "sales"] {
        let token = app.login(username, &format!("{}123", username)).await;
        let res = export(&app, &token).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{} got through", username);
        assert_eq!(parse_body(res).await["error"], "Admin only");
    }

    let admin_token = app.login("admin", "admin123").await;
    let res = export(&app, &admin_token).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_export_is_a_csv_download() {
    let app = TestApp::new().await;
    let token = app.login("admin", "admin123").await;

    post_json(
        &app,
        "/api/leads",
        &token,
        json!({ "first_name": "Ana", "phone": "555" }),
    )
    .await;

    let res = export(&app, &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        res.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"leads.csv\""
    );

    let csv = body_text(res).await;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,first_name,last_name,phone,created_at,answered_whatsapp,\
         answered_phone,demo_scheduled,observations,assigned_to,status"
    );
    assert_eq!(lines.count(), 1);
    assert!(!csv.contains("temperature"));
}

#[tokio::test]
async fn test_export_of_empty_store_is_header_only() {
    let app = TestApp::new().await;
    let token = app.login("admin", "admin123").await;

    let res = export(&app, &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_text(res).await.lines().count(), 1);
}

#[tokio::test]
async fn test_export_reimport_round_trip_preserves_leads() {
    let app = TestApp::new().await;
    let token = app.login("admin", "admin123").await;

    // A plain lead, a worked lead with flags and a sold marker, and an
    // imported one with a historic date.
    post_json(
        &app,
        "/api/leads",
        &token,
        json!({ "first_name": "Ana", "phone": "555", "observations": "con, coma" }),
    )
    .await;

    let res = post_json(
        &app,
        "/api/leads",
        &token,
        json!({ "first_name": "Bea", "phone": "777" }),
    )
    .await;
    let bea_id = parse_body(res).await["id"].as_i64().unwrap();
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/leads/{}", bea_id))
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::from(
                    json!({ "answered_whatsapp": true, "demo_scheduled": true, "status": "Sold" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    post_json(
        &app,
        "/api/leads/bulk",
        &token,
        json!({ "leads": [{ "Nombre": "Vieja", "Fecha": "2024-01-15" }] }),
    )
    .await;

    let before: Vec<Vec<Value>> = {
        let mut rows: Vec<_> = get_leads(&app, &token)
            .await
            .iter()
            .map(persisted_projection)
            .collect();
        rows.sort_by_key(|row| row[0].to_string());
        rows
    };
    assert_eq!(before.len(), 3);

    // Export, then wipe the table through the API.
    let csv = body_text(export(&app, &token).await).await;

    let ids: Vec<i64> = get_leads(&app, &token)
        .await
        .iter()
        .map(|l| l["id"].as_i64().unwrap())
        .collect();
    post_json(&app, "/api/leads/delete", &token, json!({ "ids": ids })).await;
    assert_eq!(app.lead_count().await, 0);

    // Re-import the file as a spreadsheet would arrive: one JSON object
    // per row, keyed by the header line.
    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let headers = reader.headers().unwrap().clone();
    let rows: Vec<Value> = reader
        .records()
        .map(|record| {
            let record = record.unwrap();
            let mut row = Map::new();
            for (key, field) in headers.iter().zip(record.iter()) {
                row.insert(key.to_string(), Value::String(field.to_string()));
            }
            Value::Object(row)
        })
        .collect();

    let res = post_json(&app, "/api/leads/bulk", &token, json!({ "leads": rows })).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["count"], 3);

    let after: Vec<Vec<Value>> = {
        let mut rows: Vec<_> = get_leads(&app, &token)
            .await
            .iter()
            .map(persisted_projection)
            .collect();
        rows.sort_by_key(|row| row[0].to_string());
        rows
    };

    assert_eq!(before, after);
}
