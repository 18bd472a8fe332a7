use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use super::{dto::MessageResponse, validation::ValidationErrors};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("User not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hash error: {0}")]
    Hash(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<ValidationErrors> for UserError {
    fn from(errors: ValidationErrors) -> Self {
        UserError::Validation(errors)
    }
}

#[derive(Serialize)]
struct ValidationBody<'a> {
    message: String,
    errors: &'a ValidationErrors,
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        match &self {
            UserError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationBody {
                    message: errors.summary(),
                    errors,
                }),
            )
                .into_response(),
            UserError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(MessageResponse::new("User not found")),
            )
                .into_response(),
            UserError::Database(e) => {
                error!(error = %e, "database error");
                server_error()
            }
            UserError::Hash(e) => {
                error!(error = %e, "password hash error");
                server_error()
            }
        }
    }
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageResponse::new("Server Error")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_maps_to_404_message() {
        let res = UserError::NotFound.into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(res).await,
            serde_json::json!({"message": "User not found"})
        );
    }

    #[tokio::test]
    async fn validation_maps_to_422_with_field_errors() {
        let err: UserError = ValidationErrors::single("email", "The email has already been taken.").into();
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(res).await;
        assert_eq!(body["message"], "The email has already been taken.");
        assert_eq!(body["errors"]["email"][0], "The email has already been taken.");
    }

    #[tokio::test]
    async fn database_errors_do_not_leak_details() {
        let res = UserError::Database(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(res).await, serde_json::json!({"message": "Server Error"}));
    }
}
