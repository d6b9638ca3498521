//! Resolves the user behind an inbound request.
//!
//! Two independent strategies exist: the cookie session established at login,
//! and the refresh token the client carries. Neither ever falls back to an
//! anonymous identity.

use crate::{models::UserId, services::auth_service::RefreshTokenCodec, utils::AppError};
use actix_session::SessionExt;
use actix_web::HttpRequest;

pub const SESSION_USER_ID_KEY: &str = "user_id";
pub const REFRESH_TOKEN_HEADER: &str = "X-Refresh-Token";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("no login session attached to the request")]
    NoSession,
    #[error("login session is unreadable: {0}")]
    InvalidSession(String),
    #[error("no refresh token on the request")]
    MissingCredential,
    #[error("refresh token rejected: {0}")]
    MalformedToken(String),
    #[error("session user {session} does not match token user {token}")]
    CredentialMismatch { session: UserId, token: UserId },
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Unauthenticated(e.to_string())
    }
}

pub trait IdentityResolver: Send + Sync {
    fn resolve_user_id(&self, req: &HttpRequest) -> Result<UserId, AuthError>;
}

/// Reads the user id stored in the cookie session by the login flow.
#[derive(Debug, Default, Clone)]
pub struct SessionIdentityResolver;

impl IdentityResolver for SessionIdentityResolver {
    fn resolve_user_id(&self, req: &HttpRequest) -> Result<UserId, AuthError> {
        let raw = req
            .get_session()
            .get::<i64>(SESSION_USER_ID_KEY)
            .map_err(|e| AuthError::InvalidSession(e.to_string()))?
            .ok_or(AuthError::NoSession)?;

        UserId::new(raw).ok_or_else(|| AuthError::InvalidSession(format!("non-positive user id {}", raw)))
    }
}

/// Decodes the refresh token from its cookie, or from `X-Refresh-Token`.
#[derive(Clone)]
pub struct RefreshTokenResolver {
    codec: RefreshTokenCodec,
    cookie_name: String,
}

impl RefreshTokenResolver {
    pub fn new(codec: RefreshTokenCodec, cookie_name: impl Into<String>) -> Self {
        Self { codec, cookie_name: cookie_name.into() }
    }

    fn extract_token(&self, req: &HttpRequest) -> Option<String> {
        if let Some(cookie) = req.cookie(&self.cookie_name) {
            let value = cookie.value().trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }

        req.headers()
            .get(REFRESH_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

impl IdentityResolver for RefreshTokenResolver {
    fn resolve_user_id(&self, req: &HttpRequest) -> Result<UserId, AuthError> {
        let token = self.extract_token(req).ok_or(AuthError::MissingCredential)?;
        self.codec.decode(&token).map_err(AuthError::MalformedToken)
    }
}

/// Resolves with `primary`; if `secondary` also yields an id it must agree.
///
/// A failing `secondary` is ignored so a request carrying only the primary
/// credential still resolves.
pub struct CrossCheckResolver<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> CrossCheckResolver<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: IdentityResolver, S: IdentityResolver> IdentityResolver for CrossCheckResolver<P, S> {
    fn resolve_user_id(&self, req: &HttpRequest) -> Result<UserId, AuthError> {
        let session = self.primary.resolve_user_id(req)?;
        match self.secondary.resolve_user_id(req) {
            Ok(token) if token != session => Err(AuthError::CredentialMismatch { session, token }),
            _ => Ok(session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::session::test_session_middleware;
    use actix_session::Session;
    use actix_web::{cookie::Cookie, http::StatusCode, test as actix_test, web, App, HttpResponse};

    fn codec() -> RefreshTokenCodec {
        RefreshTokenCodec::new("test-secret", "clearplate", "clearplate-api")
    }

    fn token_resolver() -> RefreshTokenResolver {
        RefreshTokenResolver::new(codec(), "refresh_token")
    }

    fn token_for(id: i64) -> String {
        codec().encode(UserId::new(id).unwrap()).unwrap()
    }

    #[test]
    fn test_token_from_cookie() {
        let req = actix_test::TestRequest::default()
            .cookie(Cookie::new("refresh_token", token_for(7)))
            .to_http_request();
        assert_eq!(token_resolver().resolve_user_id(&req).unwrap().value(), 7);
    }

    #[test]
    fn test_token_from_header_fallback() {
        let req = actix_test::TestRequest::default()
            .insert_header((REFRESH_TOKEN_HEADER, token_for(8)))
            .to_http_request();
        assert_eq!(token_resolver().resolve_user_id(&req).unwrap().value(), 8);
    }

    #[test]
    fn test_cookie_wins_over_header() {
        let req = actix_test::TestRequest::default()
            .cookie(Cookie::new("refresh_token", token_for(1)))
            .insert_header((REFRESH_TOKEN_HEADER, token_for(2)))
            .to_http_request();
        assert_eq!(token_resolver().resolve_user_id(&req).unwrap().value(), 1);
    }

    #[test]
    fn test_missing_token() {
        let req = actix_test::TestRequest::default().to_http_request();
        assert_eq!(token_resolver().resolve_user_id(&req), Err(AuthError::MissingCredential));
    }

    #[test]
    fn test_malformed_token_is_deterministic() {
        let req = actix_test::TestRequest::default()
            .cookie(Cookie::new("refresh_token", "garbage.token.value"))
            .to_http_request();
        let resolver = token_resolver();

        let first = resolver.resolve_user_id(&req);
        let second = resolver.resolve_user_id(&req);
        assert!(matches!(first, Err(AuthError::MalformedToken(_))));
        assert_eq!(first, second);
    }

    #[test]
    fn test_auth_errors_become_unauthenticated() {
        let err: AppError = AuthError::MissingCredential.into();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    struct Fixed(Result<UserId, AuthError>);

    impl IdentityResolver for Fixed {
        fn resolve_user_id(&self, _req: &HttpRequest) -> Result<UserId, AuthError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_cross_check() {
        let req = actix_test::TestRequest::default().to_http_request();
        let one = UserId::new(1).unwrap();
        let two = UserId::new(2).unwrap();

        let agreeing = CrossCheckResolver::new(Fixed(Ok(one)), Fixed(Ok(one)));
        assert_eq!(agreeing.resolve_user_id(&req), Ok(one));

        let no_token = CrossCheckResolver::new(Fixed(Ok(one)), Fixed(Err(AuthError::MissingCredential)));
        assert_eq!(no_token.resolve_user_id(&req), Ok(one));

        let mismatch = CrossCheckResolver::new(Fixed(Ok(one)), Fixed(Ok(two)));
        assert_eq!(
            mismatch.resolve_user_id(&req),
            Err(AuthError::CredentialMismatch { session: one, token: two })
        );

        let no_session = CrossCheckResolver::new(Fixed(Err(AuthError::NoSession)), Fixed(Ok(two)));
        assert_eq!(no_session.resolve_user_id(&req), Err(AuthError::NoSession));
    }

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match SessionIdentityResolver.resolve_user_id(&req) {
            Ok(id) => HttpResponse::Ok().body(id.to_string()),
            Err(e) => HttpResponse::Unauthorized().body(e.to_string()),
        }
    }

    #[actix_web::test]
    async fn test_session_resolution_round_trip() {
        let app = actix_test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/login",
                    web::get().to(|session: Session| async move {
                        session.insert(SESSION_USER_ID_KEY, 42_i64).unwrap();
                        HttpResponse::Ok()
                    }),
                )
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let login = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = login
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie set")
            .into_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(res).await, "42");
    }

    #[actix_web::test]
    async fn test_no_session_is_rejected() {
        let app = actix_test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_session_with_non_numeric_id_is_rejected() {
        let app = actix_test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/login",
                    web::get().to(|session: Session| async move {
                        session.insert(SESSION_USER_ID_KEY, "not-a-number").unwrap();
                        HttpResponse::Ok()
                    }),
                )
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let login = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = login
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie set")
            .into_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_request_without_session_middleware_has_no_session() {
        let req = actix_test::TestRequest::default().to_http_request();
        assert_eq!(SessionIdentityResolver.resolve_user_id(&req), Err(AuthError::NoSession));
    }
}
