use actix_web::HttpResponse;
use std::sync::atomic::{AtomicU64, Ordering};

static USER_REQUESTS: AtomicU64 = AtomicU64::new(0);
static AUTH_FAILURES: AtomicU64 = AtomicU64::new(0);
static USER_NOT_FOUND: AtomicU64 = AtomicU64::new(0);

pub fn increment_user_requests() {
    USER_REQUESTS.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_auth_failures() {
    AUTH_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_not_found() {
    USER_NOT_FOUND.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
pub struct MetricsResponse {
    pub user_requests_total: u64,
    pub auth_failures_total: u64,
    pub user_not_found_total: u64,
}

impl MetricsResponse {
    pub fn snapshot() -> Self {
        Self {
            user_requests_total: USER_REQUESTS.load(Ordering::Relaxed),
            auth_failures_total: AUTH_FAILURES.load(Ordering::Relaxed),
            user_not_found_total: USER_NOT_FOUND.load(Ordering::Relaxed),
        }
    }

    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP user_requests_total Total number of /user requests\n\
             # TYPE user_requests_total counter\n\
             user_requests_total {}\n\
             \n\
             # HELP auth_failures_total Requests whose identity could not be resolved\n\
             # TYPE auth_failures_total counter\n\
             auth_failures_total {}\n\
             \n\
             # HELP user_not_found_total Resolved ids with no stored user\n\
             # TYPE user_not_found_total counter\n\
             user_not_found_total {}\n",
            self.user_requests_total, self.auth_failures_total, self.user_not_found_total
        )
    }
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Service counters in Prometheus text format")
    )
)]
pub async fn get_metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(MetricsResponse::snapshot().to_prometheus())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_only_grow() {
        let before = MetricsResponse::snapshot();
        increment_user_requests();
        increment_auth_failures();
        increment_not_found();
        let after = MetricsResponse::snapshot();

        assert!(after.user_requests_total > before.user_requests_total);
        assert!(after.auth_failures_total > before.auth_failures_total);
        assert!(after.user_not_found_total > before.user_not_found_total);
    }

    #[test]
    fn test_prometheus_format() {
        let text = MetricsResponse { user_requests_total: 3, auth_failures_total: 1, user_not_found_total: 0 }
            .to_prometheus();

        assert!(text.contains("user_requests_total 3\n"));
        assert!(text.contains("auth_failures_total 1\n"));
        assert!(text.contains("user_not_found_total 0\n"));
    }
}
