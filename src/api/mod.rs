pub mod health;
pub mod metrics;
pub mod swagger;
pub mod user;

use actix_web::web;

/// `/user` scope: session-resolved profile plus token-resolved point and stamps.
pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("", web::get().to(user::get_login_user))
            .route("/point", web::get().to(user::get_user_point))
            .route("/stamps", web::get().to(user::get_user_stamps)),
    );
}
