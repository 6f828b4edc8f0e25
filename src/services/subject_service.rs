use sea_orm::*;

use crate::error::{AppError, AppResult};
use crate::models::subjects;

pub struct SubjectService;

impl SubjectService {
    /// Insère la matière d'un compte. Toujours appelée dans la transaction de création du compte.
    pub async fn create_subject<C: ConnectionTrait>(
        conn: &C,
        account_id: &str,
        department: &str,
        semester: &str,
        subject_name: &str,
    ) -> AppResult<()> {
        let subject = subjects::ActiveModel {
            account_id: Set(account_id.to_string()),
            department: Set(department.to_string()),
            semester: Set(semester.to_string()),
            subject_name: Set(subject_name.to_string()),
        };

        subjects::Entity::insert(subject)
            .exec_without_returning(conn)
            .await?;

        Ok(())
    }

    pub async fn get_subject<C: ConnectionTrait>(
        conn: &C,
        account_id: &str,
    ) -> AppResult<subjects::Model> {
        subjects::Entity::find_by_id(account_id.to_string())
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("Subject not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_account, setup_test_db};

    #[tokio::test]
    async fn test_get_subject_after_signup() {
        let db = setup_test_db().await;
        let id = create_test_account(&db, "a@school.edu", "pw", "CS", "3", "Networks").await;

        let subject = SubjectService::get_subject(&db, &id).await.unwrap();
        assert_eq!(subject.department, "CS");
        assert_eq!(subject.semester, "3");
        assert_eq!(subject.subject_name, "Networks");
    }

    #[tokio::test]
    async fn test_get_subject_unknown_account() {
        let db = setup_test_db().await;
        let result = SubjectService::get_subject(&db, "missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
