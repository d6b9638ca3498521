use crate::config::SessionSettings;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};

/// Signing/encryption key for the session cookie. Resolve once per process:
/// every worker must share it.
///
/// Without a configured key the session only lives as long as this process,
/// so sessions issued elsewhere will not validate.
pub fn session_key(settings: &SessionSettings) -> Key {
    match &settings.key {
        Some(bytes) => Key::from(bytes.as_slice()),
        None => {
            log::warn!("⚠️  SESSION_KEY not set, generating an ephemeral session key");
            Key::generate()
        }
    }
}

/// Cookie session carrying the logged-in user id written by the login flow.
pub fn session_middleware(settings: &SessionSettings, key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(settings.cookie_name.clone())
        .cookie_secure(settings.cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

#[cfg(test)]
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    let settings = SessionSettings {
        key: Some(vec![42u8; 64]),
        cookie_name: "session".to_string(),
        cookie_secure: false,
    };
    session_middleware(&settings, session_key(&settings))
}
