use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use sea_orm::*;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use tracing::{info, warn};

use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::attendance::AttendanceStatus;
use crate::models::dto::{AttendanceEntry, AttendanceFilter, AttendanceRecord, StatusCounts};
use crate::models::{attendance, attendance_sessions};
use crate::services::subject_service::SubjectService;

/// Nombre maximum de lignes renvoyées par `query`
pub const QUERY_LIMIT: u64 = 100;

pub struct AttendanceService;

impl AttendanceService {
    /// Vrai si aucune présence n'est enregistrée pour (compte, date).
    /// Indicatif seulement : `record` refait la vérification de manière atomique.
    pub async fn can_record(
        db: &DatabaseConnection,
        account_id: &str,
        date: NaiveDate,
    ) -> AppResult<bool> {
        let count = attendance::Entity::find()
            .filter(attendance::Column::AccountId.eq(account_id))
            .filter(attendance::Column::AttendanceDate.eq(date))
            .count(db)
            .await?;
        Ok(count == 0)
    }

    /// Enregistre la séance du jour : marqueur de séance + une ligne par élève,
    /// dans une seule transaction. Une seconde séance pour la même date échoue
    /// avec `DuplicateSession`.
    pub async fn record(
        db: &DatabaseConnection,
        account_id: &str,
        date: NaiveDate,
        entries: Vec<AttendanceEntry>,
    ) -> AppResult<usize> {
        let entries = normalize_entries(entries)?;

        let subject = SubjectService::get_subject(db, account_id).await?;

        let rows: Vec<attendance::ActiveModel> = entries
            .into_iter()
            .map(|(enroll, status)| attendance::ActiveModel {
                account_id: Set(account_id.to_string()),
                enrollment_number: Set(enroll),
                attendance_date: Set(date),
                status: Set(status.as_str().to_string()),
                department: Set(subject.department.clone()),
                semester: Set(subject.semester.clone()),
                subject_name: Set(subject.subject_name.clone()),
                ..Default::default()
            })
            .collect();
        let count = rows.len();

        let txn = db.begin().await?;

        let marker = attendance_sessions::ActiveModel {
            account_id: Set(account_id.to_string()),
            attendance_date: Set(date),
            recorded_at: Set(Utc::now()),
        };
        attendance_sessions::Entity::insert(marker)
            .exec_without_returning(&txn)
            .await
            .map_err(duplicate_session)?;

        attendance::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await
            .map_err(duplicate_session)?;

        txn.commit().await?;

        info!(account_id = %account_id, date = %date, students = count, "attendance recorded");
        Ok(count)
    }

    /// Présences du compte, filtrées par matricule (sous-chaîne) et/ou statut exact,
    /// triées par date décroissante puis matricule, au plus `QUERY_LIMIT` lignes.
    pub async fn query(
        db: &DatabaseConnection,
        account_id: &str,
        filter: &AttendanceFilter,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let mut select = attendance::Entity::find()
            .filter(attendance::Column::AccountId.eq(account_id));

        if let Some(search) = filter.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                select = select.filter(enrollment_contains(search));
            }
        }

        match filter.status.as_deref() {
            None | Some("All") => {}
            Some(raw) => {
                let status: AttendanceStatus = raw.parse().map_err(AppError::Validation)?;
                select = select.filter(attendance::Column::Status.eq(status.as_str()));
            }
        }

        let rows = select
            .order_by_desc(attendance::Column::AttendanceDate)
            .order_by_asc(attendance::Column::EnrollmentNumber)
            .limit(QUERY_LIMIT)
            .all(db)
            .await?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    /// Nombre de dates distinctes enregistrées ("total classes")
    pub async fn count_distinct_dates(db: &DatabaseConnection, account_id: &str) -> AppResult<u64> {
        let total: Option<i64> = attendance::Entity::find()
            .select_only()
            .column_as(
                Expr::col(attendance::Column::AttendanceDate).count_distinct(),
                "total",
            )
            .filter(attendance::Column::AccountId.eq(account_id))
            .into_tuple()
            .one(db)
            .await?;
        Ok(total.unwrap_or(0).max(0) as u64)
    }

    /// Bilan d'un élève par matière, tous comptes confondus :
    /// un élève est identifié par (département, semestre, matricule).
    pub async fn status_by_student(
        db: &DatabaseConnection,
        department: &str,
        semester: &str,
        enroll: &str,
    ) -> AppResult<BTreeMap<String, StatusCounts>> {
        let rows: Vec<(String, String, i64)> = attendance::Entity::find()
            .select_only()
            .column(attendance::Column::SubjectName)
            .column(attendance::Column::Status)
            .column_as(Expr::col(attendance::Column::Id).count(), "records")
            .filter(attendance::Column::Department.eq(department.trim()))
            .filter(attendance::Column::Semester.eq(semester.trim()))
            .filter(attendance::Column::EnrollmentNumber.eq(enroll.trim()))
            .group_by(attendance::Column::SubjectName)
            .group_by(attendance::Column::Status)
            .into_tuple()
            .all(db)
            .await?;

        if rows.is_empty() {
            return Err(AppError::not_found("No records found"));
        }

        let mut summary: BTreeMap<String, StatusCounts> = BTreeMap::new();
        for (subject_name, status, records) in rows {
            let records = records.max(0) as u64;
            let counts = summary.entry(subject_name).or_default();
            counts.total += records;

            match status.parse::<AttendanceStatus>() {
                Ok(AttendanceStatus::Present) => counts.present += records,
                Ok(AttendanceStatus::Absent) => counts.absent += records,
                Err(_) => warn!(status = %status, records, "unexpected attendance status in store"),
            }
        }

        Ok(summary)
    }
}

/// Sous-chaîne littérale du matricule, insensible à la casse sur tous les backends.
/// `%`, `_` et `\` saisis par l'utilisateur sont échappés.
fn enrollment_contains(search: &str) -> SimpleExpr {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');

    Expr::expr(Func::lower(Expr::col(attendance::Column::EnrollmentNumber)))
        .like(LikeExpr::new(pattern).escape('\\'))
}

fn duplicate_session(err: DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::DuplicateSession
    } else {
        AppError::Store(err)
    }
}

/// Valide les entrées soumises : au moins un élève, matricule non vide,
/// statut connu. Un matricule en double garde le dernier statut.
fn normalize_entries(entries: Vec<AttendanceEntry>) -> AppResult<Vec<(String, AttendanceStatus)>> {
    if entries.is_empty() {
        return Err(AppError::validation("At least one student required"));
    }

    let mut rows: Vec<(String, AttendanceStatus)> = Vec::with_capacity(entries.len());
    for entry in entries {
        let enroll = entry.enroll.trim().to_string();
        if enroll.is_empty() {
            return Err(AppError::validation("Enrollment number required"));
        }
        let status: AttendanceStatus = entry.status.trim().parse().map_err(AppError::Validation)?;

        match rows.iter_mut().find(|(e, _)| *e == enroll) {
            Some(existing) => existing.1 = status,
            None => rows.push((enroll, status)),
        }
    }

    Ok(rows)
}
