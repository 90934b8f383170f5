//! Canned happy-path handlers for every endpoint the built-in suite covers.

use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "ok": false, "error": "missing or invalid bearer token" })),
    )
        .into_response()
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true, "service": "mock" }))
}

pub async fn api_status() -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "routes": ["/api/public", "/api/dealer", "/api/admin"],
    }))
}

pub async fn admin_login(Json(body): Json<serde_json::Value>) -> Response {
    let has_credentials = body.get("username").is_some() && body.get("password").is_some();
    if !has_credentials {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": "username and password required" })),
        )
            .into_response();
    }

    Json(json!({ "ok": true, "token": Uuid::new_v4().to_string() })).into_response()
}

pub async fn dealer_login(Json(body): Json<serde_json::Value>) -> Response {
    let has_credentials = body.get("dealerId").is_some() && body.get("passcode").is_some();
    if !has_credentials {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": "dealerId and passcode required" })),
        )
            .into_response();
    }

    Json(json!({ "ok": true, "token": Uuid::new_v4().to_string() })).into_response()
}

/// Always answers ok, even for unknown emails.
pub async fn request_reset() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// The mock never issues reset tokens, so every attempt is invalid.
pub async fn reset_passcode() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "ok": false, "error": "invalid or expired token" })),
    )
}

pub async fn qrcode(Path(dealer_id): Path<String>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "qrCode": "data:image/png;base64,iVBORw0KGgo=",
        "url": format!("https://storefront.example.com/d/{}", dealer_id),
    }))
}

pub async fn export(Path(collection): Path<String>, headers: HeaderMap) -> Response {
    if bearer_token(&headers).is_none() {
        return unauthorized();
    }

    let csv = match collection.as_str() {
        "dealers" => "id,name,email\nDEALER-0001,Alpha Motors,alpha@example.com\n",
        "vehicles" => "id,dealerId,make,status\nVEH-0001,DEALER-0001,Toyota,available\n",
        "requests" => "id,dealerId,vehicleId,status\nREQ-0001,DEALER-0001,VEH-0001,open\n",
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "ok": false, "error": "unknown collection" })),
            )
                .into_response()
        }
    };

    ([(header::CONTENT_TYPE, "text/csv")], csv.to_string()).into_response()
}

pub async fn bulk_update(headers: HeaderMap, Json(body): Json<serde_json::Value>) -> Response {
    if bearer_token(&headers).is_none() {
        return unauthorized();
    }

    let requested = body
        .get("vehicleIds")
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or(0);

    // Unknown vehicle ids are fine; the update just matches nothing.
    Json(json!({ "ok": true, "requested": requested, "modified": 0 })).into_response()
}

pub async fn check_alerts(headers: HeaderMap) -> Response {
    if bearer_token(&headers).is_none() {
        return unauthorized();
    }

    Json(json!({ "ok": true, "alertsSent": 0 })).into_response()
}

pub async fn dealer_profile(Path(dealer_id): Path<String>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "dealer": { "id": dealer_id, "name": "Alpha Motors" },
    }))
}

pub async fn dealer_vehicles(Path(dealer_id): Path<String>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "dealerId": dealer_id,
        "vehicles": [],
    }))
}

pub async fn checkout_session(Json(body): Json<serde_json::Value>) -> Response {
    let has_fields = body.get("dealerId").is_some() && body.get("vehicleId").is_some();
    if !has_fields {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": "dealerId and vehicleId required" })),
        )
            .into_response();
    }

    Json(json!({
        "ok": true,
        "url": format!("https://pay.example.com/session/{}", Uuid::new_v4()),
    }))
    .into_response()
}
