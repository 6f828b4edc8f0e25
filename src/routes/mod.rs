pub mod health;
pub mod auth;
pub mod students;
pub mod attendance;

use actix_web::web;
use validator::Validate;

use crate::error::{AppError, AppResult};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Corps JSON / query string invalides : réponse structurée plutôt que le texte par défaut
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid payload: {}", err)).into()
    });
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid query: {}", err)).into()
    });

    cfg.service(
        web::scope("/api")
            .app_data(json_config)
            .app_data(query_config)
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(students::students_routes)
            .configure(attendance::attendance_routes)
    );
}

/// Vérification de forme (champs requis non vides) ; message volontairement générique
pub(crate) fn check_required<T: Validate>(body: &T) -> AppResult<()> {
    body.validate()
        .map_err(|_| AppError::validation("All fields required"))
}

/// Lectures en "fail soft" : une erreur interne devient la valeur par défaut (vide, 0, false)
pub(crate) fn or_default_logged<T: Default>(result: AppResult<T>, operation: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(operation, error = %e, "read failed, returning default");
            T::default()
        }
    }
}
