use actix_web::HttpResponse;

pub async fn ready_check() -> HttpResponse {
    tracing::debug!("Readiness endpoint called");
    HttpResponse::Ok().finish()
}
