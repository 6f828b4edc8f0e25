use actix_web::{get, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::dto::RosterEntry;
use crate::routes::or_default_logged;
use crate::services::roster_service::RosterService;

#[derive(Deserialize)]
pub struct SaveStudentsRequest {
    #[serde(default)]
    pub students: Vec<RosterEntry>,
}

/// GET /api/accounts/{account_id}/students - Roster trié par matricule
#[get("/accounts/{account_id}/students")]
pub async fn get_students(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let students = or_default_logged(
        RosterService::list_roster(db.get_ref(), &path).await,
        "list_roster",
    );
    HttpResponse::Ok().json(students)
}

/// PUT /api/accounts/{account_id}/students - Remplace tout le roster
#[put("/accounts/{account_id}/students")]
pub async fn save_students(
    path: web::Path<String>,
    body: web::Json<SaveStudentsRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let account_id = path.into_inner();
    RosterService::replace_roster(db.get_ref(), &account_id, body.into_inner().students).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// GET /api/accounts/{account_id}/first-login - Vrai tant qu'aucun élève n'est enregistré
#[get("/accounts/{account_id}/first-login")]
pub async fn is_first_login(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let first = or_default_logged(
        RosterService::is_first_login(db.get_ref(), &path).await,
        "is_first_login",
    );
    HttpResponse::Ok().json(first)
}

pub fn students_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_students)
        .service(save_students)
        .service(is_first_login);
}
