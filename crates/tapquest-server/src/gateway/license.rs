use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

const LICENSE_TEXT: &str = "\
This project is distributed as-is by the tapquest team.

Website:
Telegram channel for news/updates:
Source:";

/// `GET /api/license` — static license/version blob, cacheable for an hour.
pub async fn license_handler() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "public, max-age=3600")],
        Json(json!({
            "license": LICENSE_TEXT.trim(),
            "version": env!("CARGO_PKG_VERSION"),
            "lastUpdated": "2024-10-16",
        })),
    )
}
