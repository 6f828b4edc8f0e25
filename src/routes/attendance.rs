use actix_web::{get, post, web, HttpResponse};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::dto::{AttendanceEntry, AttendanceFilter};
use crate::routes::{check_required, or_default_logged};
use crate::services::attendance_service::AttendanceService;

#[derive(Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub date: String,
}

#[derive(Deserialize)]
pub struct SaveAttendanceRequest {
    pub date: String,      // Format: "2025-03-01"
    #[serde(default)]
    pub students: Vec<AttendanceEntry>,
}

#[derive(Deserialize, Validate)]
pub struct StudentStatusQuery {
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub semester: String,
    #[serde(rename = "enrollmentNumber")]
    #[validate(length(min = 1))]
    pub enrollment_number: String,
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation("Invalid date (expected YYYY-MM-DD)"))
}

/// GET /api/accounts/{account_id}/attendance/can-save?date=
#[get("/accounts/{account_id}/attendance/can-save")]
pub async fn can_save_attendance(
    path: web::Path<String>,
    query: web::Query<DateQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let result = match parse_date(&query.date) {
        Ok(date) => AttendanceService::can_record(db.get_ref(), &path, date).await,
        Err(e) => Err(e),
    };
    HttpResponse::Ok().json(or_default_logged(result, "can_record"))
}

/// POST /api/accounts/{account_id}/attendance - Enregistre la séance d'une date
#[post("/accounts/{account_id}/attendance")]
pub async fn save_attendance(
    path: web::Path<String>,
    body: web::Json<SaveAttendanceRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let account_id = path.into_inner();
    let body = body.into_inner();
    let date = parse_date(&body.date)?;

    AttendanceService::record(db.get_ref(), &account_id, date, body.students).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true })))
}

/// GET /api/accounts/{account_id}/attendance?search=&status= - 100 lignes max
#[get("/accounts/{account_id}/attendance")]
pub async fn get_attendance(
    path: web::Path<String>,
    filter: web::Query<AttendanceFilter>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let records = or_default_logged(
        AttendanceService::query(db.get_ref(), &path, &filter).await,
        "attendance_query",
    );
    HttpResponse::Ok().json(records)
}

/// GET /api/accounts/{account_id}/attendance/total-classes
#[get("/accounts/{account_id}/attendance/total-classes")]
pub async fn get_total_classes(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let total = or_default_logged(
        AttendanceService::count_distinct_dates(db.get_ref(), &path).await,
        "count_distinct_dates",
    );
    HttpResponse::Ok().json(total)
}

/// GET /api/students/status?department=&semester=&enrollmentNumber=
#[get("/students/status")]
pub async fn get_student_status(
    query: web::Query<StudentStatusQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    check_required(&*query)?;

    let data = AttendanceService::status_by_student(
        db.get_ref(),
        &query.department,
        &query.semester,
        &query.enrollment_number,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": data
    })))
}

pub fn attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(can_save_attendance)
        .service(get_total_classes)
        .service(save_attendance)
        .service(get_attendance)
        .service(get_student_status);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(" 2025-03-01 ").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert!(parse_date("01/03/2025").is_err());
        assert!(parse_date("").is_err());
    }
}
