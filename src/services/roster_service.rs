use sea_orm::*;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::dto::RosterEntry;
use crate::models::students;
use crate::services::account_service::AccountService;

pub struct RosterService;

impl RosterService {
    /// Roster d'un compte trié par matricule ; vide si aucun élève
    pub async fn list_roster(
        db: &DatabaseConnection,
        account_id: &str,
    ) -> AppResult<Vec<RosterEntry>> {
        let rows = students::Entity::find()
            .filter(students::Column::AccountId.eq(account_id))
            .order_by_asc(students::Column::EnrollmentNumber)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|s| RosterEntry {
                enroll: s.enrollment_number,
                name: Some(s.student_name),
            })
            .collect())
    }

    /// Remplace tout le roster du compte (suppression puis insertion, en une transaction).
    /// En cas d'échec l'ancien roster reste intact.
    pub async fn replace_roster(
        db: &DatabaseConnection,
        account_id: &str,
        entries: Vec<RosterEntry>,
    ) -> AppResult<usize> {
        let rows = dedup_last_wins(entries)?;

        if !AccountService::account_exists(db, account_id).await? {
            return Err(AppError::not_found("Account not found"));
        }

        let models: Vec<students::ActiveModel> = rows
            .into_iter()
            .map(|(enroll, name)| students::ActiveModel {
                account_id: Set(account_id.to_string()),
                enrollment_number: Set(enroll),
                student_name: Set(name),
            })
            .collect();
        let count = models.len();

        let txn = db.begin().await?;

        students::Entity::delete_many()
            .filter(students::Column::AccountId.eq(account_id))
            .exec(&txn)
            .await?;

        if !models.is_empty() {
            students::Entity::insert_many(models)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;

        info!(account_id = %account_id, students = count, "roster replaced");
        Ok(count)
    }

    /// Premier login = aucun élève enregistré (signal pour l'UI, pas une autorisation)
    pub async fn is_first_login(db: &DatabaseConnection, account_id: &str) -> AppResult<bool> {
        let count = students::Entity::find()
            .filter(students::Column::AccountId.eq(account_id))
            .count(db)
            .await?;
        Ok(count == 0)
    }
}

/// Normalise les entrées : matricule obligatoire, nom vide par défaut,
/// un matricule en double garde le dernier nom soumis.
fn dedup_last_wins(entries: Vec<RosterEntry>) -> AppResult<Vec<(String, String)>> {
    let mut rows: Vec<(String, String)> = Vec::with_capacity(entries.len());

    for entry in entries {
        let enroll = entry.enroll.trim().to_string();
        if enroll.is_empty() {
            return Err(AppError::validation("Enrollment number required"));
        }
        let name = entry.name.map(|n| n.trim().to_string()).unwrap_or_default();

        match rows.iter_mut().find(|(e, _)| *e == enroll) {
            Some(existing) => existing.1 = name,
            None => rows.push((enroll, name)),
        }
    }

    Ok(rows)
}
