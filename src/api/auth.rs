use crate::api::handlers::error_response;
use crate::db::DbClient;
use crate::errors::{ApiError, ErrorMessages};
use crate::logging::ACTION_LOG_TARGET;
use crate::CONFIG;
use axum::{
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};
use uuid::Uuid;

/// Header naming the acting admin's user id
pub const ADMIN_ID_HEADER: &str = "x-admin-id";

/// The authenticated admin, placed in request extensions by [`require_admin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminUser {
    pub id: Uuid,
}

/// Validates the authorization header against the configured secret
pub fn has_service_secret(headers: &HeaderMap, secret: &str) -> bool {
    headers
        .get("AUTHORIZATION")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|header_value| header_value == secret)
}

pub fn admin_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(ADMIN_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
}

fn reject(status: StatusCode, message: impl ToString) -> Response {
    error_response::<()>(status, message).into_response()
}

/// Middleware for every resource route: the service secret must match and the caller
/// must be a user on the `admin` plan.
pub async fn require_admin<B>(
    State(db): State<DbClient>,
    mut req: Request<B>,
    next: Next<B>,
) -> Response {
    // CORS preflights carry no credentials
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let path = req.uri().path().to_string();

    if !has_service_secret(req.headers(), &CONFIG.auth_secret) {
        warn!(target: ACTION_LOG_TARGET, "Unauthorized request to {}", path);
        return reject(StatusCode::UNAUTHORIZED, ErrorMessages::Unauthorized);
    }

    let Some(admin_id) = admin_id(req.headers()) else {
        warn!(target: ACTION_LOG_TARGET, "Request to {} without an admin id", path);
        return reject(
            StatusCode::UNAUTHORIZED,
            format!("Missing or invalid {ADMIN_ID_HEADER} header"),
        );
    };

    match db.get_user(admin_id).await {
        Ok(user) if user.is_admin() => {}
        Ok(_) | Err(ApiError::Diesel(diesel::result::Error::NotFound)) => {
            warn!(target: ACTION_LOG_TARGET, "Non-admin {} denied access to {}", admin_id, path);
            return reject(StatusCode::FORBIDDEN, ErrorMessages::Forbidden);
        }
        Err(err) => {
            error!("Failed to look up admin {}: {}", admin_id, err);
            return reject(StatusCode::INTERNAL_SERVER_ERROR, ErrorMessages::DB);
        }
    }

    req.extensions_mut().insert(AdminUser { id: admin_id });
    next.run(req).await
}
