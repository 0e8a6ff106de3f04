use actix_web::HttpResponse;

/// Handler for GET /api/health
///
/// Liveness only; does not touch the database.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "API is running",
    }))
}
