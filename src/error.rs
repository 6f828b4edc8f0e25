use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Erreurs métier et techniques du backend.
///
/// Chaque variante se traduit en réponse JSON `{ "success": false, "message": ... }`.
/// Les détails des erreurs de stockage sont journalisés mais jamais renvoyés au client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    NotFound(String),

    #[error("Attendance already recorded for this date")]
    DuplicateSession,

    #[error("Database error: {0}")]
    Store(#[from] DbErr),

    #[error("Password hashing error: {0}")]
    Password(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    /// Message renvoyé au client (sans détails internes)
    pub fn public_message(&self) -> String {
        match self {
            AppError::Store(_) | AppError::Password(_) | AppError::Config(_) | AppError::Io(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Vrai si l'erreur provient d'une contrainte d'unicité (clé primaire ou index unique)
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidToken => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateSession => StatusCode::CONFLICT,
            AppError::Store(_) | AppError::Password(_) | AppError::Config(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "message": self.public_message()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::DuplicateSession.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Store(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_unique_violation_detection() {
        use crate::models::{attendance_sessions, students};
        use crate::test_utils::{create_test_account, setup_test_db};
        use chrono::{NaiveDate, Utc};
        use sea_orm::{ConnectionTrait, EntityTrait, Set};

        let db = setup_test_db().await;
        let id = create_test_account(&db, "p@u.edu", "pw", "CS", "3", "OS").await;
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        // clé primaire composite
        let marker = || attendance_sessions::ActiveModel {
            account_id: Set(id.clone()),
            attendance_date: Set(date),
            recorded_at: Set(Utc::now()),
        };
        attendance_sessions::Entity::insert(marker())
            .exec_without_returning(&db)
            .await
            .unwrap();
        let err = attendance_sessions::Entity::insert(marker())
            .exec_without_returning(&db)
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));

        let student = || students::ActiveModel {
            account_id: Set(id.clone()),
            enrollment_number: Set("101".to_string()),
            student_name: Set("A".to_string()),
        };
        students::Entity::insert(student())
            .exec_without_returning(&db)
            .await
            .unwrap();
        let err = students::Entity::insert(student())
            .exec_without_returning(&db)
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));

        let other = db.execute_unprepared("SELECT * FROM missing_table").await.unwrap_err();
        assert!(!is_unique_violation(&other));
        assert!(!is_unique_violation(&DbErr::Custom("UNIQUE constraint failed".into())));
    }

    #[test]
    fn test_store_error_hides_details() {
        let err = AppError::Store(DbErr::Custom("table accounts is locked".into()));
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.to_string().contains("locked"));
    }
}
