use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::config::Config;
use crate::error::AppError;
use crate::routes::{check_required, or_default_logged};
use crate::services::account_service::{AccountService, NewAccount};
use crate::services::reset_token_service::ResetTokenService;

// DTO pour l'inscription (département et semestre facultatifs)
#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub semester: String,
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub password: String,
}

// DTO pour la connexion
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Deserialize)]
pub struct EmailQuery {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize, Validate)]
pub struct ResetTokenRequest {
    #[serde(rename = "accountId")]
    #[validate(length(min = 1))]
    pub account_id: String,
}

#[derive(Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[serde(rename = "accountId")]
    #[validate(length(min = 1))]
    pub account_id: String,
    #[validate(length(min = 1))]
    pub token: String,
    #[serde(rename = "newPassword")]
    #[validate(length(min = 1))]
    pub new_password: String,
}

/// POST /api/auth/signup - Créer un compte + sa matière
#[post("/signup")]
pub async fn signup(
    body: web::Json<SignupRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    check_required(&*body)?;
    let body = body.into_inner();

    let account_id = AccountService::create_account(
        db.get_ref(),
        config.password_iterations,
        NewAccount {
            email: body.email,
            password: body.password,
            department: body.department,
            semester: body.semester,
            subject: body.subject,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Account created successfully",
        "accountId": account_id
    })))
}

/// POST /api/auth/login - Retourne tous les comptes de l'email
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    check_required(&*body)?;

    let accounts = AccountService::verify_credentials(db.get_ref(), &body.email, &body.password).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "accounts": accounts
    })))
}

/// GET /api/auth/accounts?email= - Comptes d'un email (liste vide en cas d'erreur)
#[get("/accounts")]
pub async fn accounts_by_email(
    query: web::Query<EmailQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let accounts = or_default_logged(
        AccountService::accounts_by_email(db.get_ref(), &query.email).await,
        "accounts_by_email",
    );
    HttpResponse::Ok().json(accounts)
}

/// POST /api/auth/reset-token - Émet un token de reset (renvoyé directement, pas d'email)
#[post("/reset-token")]
pub async fn send_reset_token(
    body: web::Json<ResetTokenRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    check_required(&*body)?;

    let token = ResetTokenService::issue(db.get_ref(), body.account_id.trim()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "token": token,
        "message": "Token sent"
    })))
}

/// POST /api/auth/reset-password - Consomme le token et change le mot de passe
#[post("/reset-password")]
pub async fn reset_password(
    body: web::Json<ResetPasswordRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    check_required(&*body)?;

    ResetTokenService::consume(
        db.get_ref(),
        config.password_iterations,
        body.account_id.trim(),
        &body.token,
        &body.new_password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Password reset successful"
    })))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(signup)
            .service(login)
            .service(accounts_by_email)
            .service(send_reset_token)
            .service(reset_password)
    );
}
