use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clearplate User API",
        version = "1.0.0",
        description = "Profile, cp point balance and stamp summary of the logged-in user.\n\n**Authentication:** `GET /user` reads the login session cookie. `GET /user/point` and `GET /user/stamps` read the refresh token cookie (or the `X-Refresh-Token` header)."
    ),
    paths(
        crate::api::user::get_login_user,
        crate::api::user::get_user_point,
        crate::api::user::get_user_stamps,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::models::UserProfile,
            crate::models::StampSummary,
            crate::models::StampCount,
            crate::utils::ErrorEnvelope,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "User", description = "Logged-in user lookups."),
        (name = "Health", description = "Health check and service counters."),
    )
)]
pub struct ApiDoc;

/// OpenAPI document whose cookie security schemes name the configured cookies.
pub fn build_openapi(session_cookie: &str, refresh_cookie: &str) -> utoipa::openapi::OpenApi {
    let mut openapi = ApiDoc::openapi();
    SecurityAddon {
        session_cookie: session_cookie.to_string(),
        refresh_cookie: refresh_cookie.to_string(),
    }
    .modify(&mut openapi);
    openapi
}

struct SecurityAddon {
    session_cookie: String,
    refresh_cookie: String,
}

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(&self.session_cookie))),
        );
        components.add_security_scheme(
            "refresh_token",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(&self.refresh_cookie))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_user_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/user", "/user/point", "/user/stamps", "/health", "/metrics"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_security_schemes_use_configured_cookie_names() {
        let doc = build_openapi("CP_SESSION", "cp_refresh");
        let schemes = &doc.components.expect("components").security_schemes;

        let session = serde_json::to_value(&schemes["session_cookie"]).unwrap();
        assert_eq!(session["in"], "cookie");
        assert_eq!(session["name"], "CP_SESSION");

        let refresh = serde_json::to_value(&schemes["refresh_token"]).unwrap();
        assert_eq!(refresh["name"], "cp_refresh");
    }
}
