use crate::{
    api::metrics,
    models::{StampSummary, UserProfile},
    services::{UserService, NO_LOGIN_USER_MESSAGE},
    utils::{AppError, ErrorEnvelope},
};
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, ResponseError};

#[utoipa::path(
    get,
    path = "/user",
    tag = "User",
    responses(
        (status = 200, description = "Logged-in user profile", body = UserProfile),
        (status = 400, description = "No logged-in user", body = ErrorEnvelope)
    ),
    security(("session_cookie" = []))
)]
pub async fn get_login_user(req: HttpRequest, service: web::Data<UserService>) -> HttpResponse {
    log::info!("👤 GET /user");
    metrics::increment_user_requests();

    match service.get_login_user(&req).await {
        Ok(profile) => {
            log::info!("✅ Login user retrieved: {}", profile.id);
            HttpResponse::Ok().json(profile)
        }
        Err(AppError::DatabaseError(e)) => {
            log::error!("❌ Failed to load login user: {}", e);
            AppError::DatabaseError(e).error_response()
        }
        Err(e) => {
            log::warn!("❌ No logged-in user: {}", e);
            metrics::increment_auth_failures();
            ErrorEnvelope::new(StatusCode::BAD_REQUEST, NO_LOGIN_USER_MESSAGE)
                .into_response(StatusCode::BAD_REQUEST)
        }
    }
}

#[utoipa::path(
    get,
    path = "/user/point",
    tag = "User",
    responses(
        (status = 200, description = "Current cp point balance", body = i64),
        (status = 401, description = "Missing or invalid refresh token", body = ErrorEnvelope),
        (status = 404, description = "User not found", body = ErrorEnvelope)
    ),
    security(("refresh_token" = []))
)]
pub async fn get_user_point(
    req: HttpRequest,
    service: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    log::info!("💰 GET /user/point");
    metrics::increment_user_requests();

    let user_id = service.resolve_token_user(&req).map_err(record_failure)?;
    let point = service.get_user_point(user_id).await.map_err(record_failure)?;

    log::info!("✅ Point retrieved for user {}", user_id);
    Ok(HttpResponse::Ok().json(point))
}

#[utoipa::path(
    get,
    path = "/user/stamps",
    tag = "User",
    responses(
        (status = 200, description = "Summary of earned stamps", body = StampSummary),
        (status = 401, description = "Missing or invalid refresh token", body = ErrorEnvelope),
        (status = 404, description = "User not found", body = ErrorEnvelope)
    ),
    security(("refresh_token" = []))
)]
pub async fn get_user_stamps(
    req: HttpRequest,
    service: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    log::info!("🎫 GET /user/stamps");
    metrics::increment_user_requests();

    let user_id = service.resolve_token_user(&req).map_err(record_failure)?;
    let summary = service.get_user_stamps(user_id).await.map_err(record_failure)?;

    log::info!("✅ Stamps retrieved for user {}: {} total", user_id, summary.total_stamps);
    Ok(HttpResponse::Ok().json(summary))
}

fn record_failure(e: AppError) -> AppError {
    match &e {
        AppError::Unauthenticated(_) => metrics::increment_auth_failures(),
        AppError::NotFound(msg) => {
            log::warn!("❌ {}", msg);
            metrics::increment_not_found();
        }
        AppError::DatabaseError(msg) => log::error!("❌ Store failure: {}", msg),
        _ => {}
    }
    e
}
