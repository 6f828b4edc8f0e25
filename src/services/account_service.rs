use chrono::Utc;
use sea_orm::*;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::dto::AccountSummary;
use crate::models::{accounts, subjects};
use crate::services::subject_service::SubjectService;
use crate::utils::{password, token};

pub struct AccountService;

/// Données d'inscription : un compte = un email + une matière
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub department: String,
    pub semester: String,
    pub subject: String,
}

impl AccountService {
    /// Crée le compte et sa matière dans une même transaction.
    /// Retourne l'identifiant du compte créé.
    pub async fn create_account(
        db: &DatabaseConnection,
        iterations: u32,
        new_account: NewAccount,
    ) -> AppResult<String> {
        let email = new_account.email.trim().to_lowercase();
        let subject = new_account.subject.trim();

        if email.is_empty() || new_account.password.is_empty() || subject.is_empty() {
            return Err(AppError::validation("All fields required"));
        }

        let password_hash = password::hash_password(&new_account.password, iterations)?;
        let account_id = token::generate_account_id();

        let txn = db.begin().await?;

        let account = accounts::ActiveModel {
            account_id: Set(account_id.clone()),
            email: Set(email),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        account.insert(&txn).await?;

        SubjectService::create_subject(
            &txn,
            &account_id,
            new_account.department.trim(),
            new_account.semester.trim(),
            subject,
        )
        .await?;

        txn.commit().await?;

        info!(account_id = %account_id, "account created");
        Ok(account_id)
    }

    /// Vérifie le mot de passe sur le PREMIER compte de l'email, puis retourne
    /// tous les comptes de cet email (un mot de passe partagé par toutes les matières).
    pub async fn verify_credentials(
        db: &DatabaseConnection,
        email: &str,
        password_plain: &str,
    ) -> AppResult<Vec<AccountSummary>> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password_plain.is_empty() {
            return Err(AppError::validation("Email and password required"));
        }

        let rows = Self::find_with_subjects(db, &email).await?;

        let Some((first, _)) = rows.first() else {
            warn!("login rejected: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        match password::verify_password(password_plain, &first.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                warn!(account_id = %first.account_id, "login rejected: wrong password");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => {
                warn!(account_id = %first.account_id, error = %e, "login rejected: unreadable password hash");
                return Err(AppError::InvalidCredentials);
            }
        }

        Ok(rows
            .into_iter()
            .map(|(account, subject)| AccountSummary::from_models(account, subject))
            .collect())
    }

    /// Liste les comptes d'un email (sans vérification du mot de passe)
    pub async fn accounts_by_email(
        db: &DatabaseConnection,
        email: &str,
    ) -> AppResult<Vec<AccountSummary>> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Self::find_with_subjects(db, &email).await?;
        Ok(rows
            .into_iter()
            .map(|(account, subject)| AccountSummary::from_models(account, subject))
            .collect())
    }

    pub async fn account_exists<C: ConnectionTrait>(conn: &C, account_id: &str) -> AppResult<bool> {
        let count = accounts::Entity::find()
            .filter(accounts::Column::AccountId.eq(account_id))
            .count(conn)
            .await?;
        Ok(count > 0)
    }

    /// Comptes d'un email dans l'ordre de création, avec leur matière (jointure gauche)
    async fn find_with_subjects(
        db: &DatabaseConnection,
        email: &str,
    ) -> AppResult<Vec<(accounts::Model, Option<subjects::Model>)>> {
        let rows = accounts::Entity::find()
            .find_also_related(subjects::Entity)
            .filter(accounts::Column::Email.eq(email))
            .order_by_asc(accounts::Column::Id)
            .all(db)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEST_ITERATIONS, create_test_account, setup_test_db};

    fn new_account(email: &str, password: &str, subject: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password: password.to_string(),
            department: "CS".to_string(),
            semester: "5".to_string(),
            subject: subject.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_creates_account_and_subject() {
        let db = setup_test_db().await;

        let id = AccountService::create_account(
            &db,
            TEST_ITERATIONS,
            new_account("  Prof@School.EDU ", "pw", "Databases"),
        )
        .await
        .unwrap();

        let account = accounts::Entity::find()
            .filter(accounts::Column::AccountId.eq(id.as_str()))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.email, "prof@school.edu");
        assert_ne!(account.password_hash, "pw");

        let subject = subjects::Entity::find_by_id(id.clone()).one(&db).await.unwrap().unwrap();
        assert_eq!(subject.subject_name, "Databases");
        assert_eq!(subject.account_id, id);
    }

    #[tokio::test]
    async fn test_signup_requires_email_password_subject() {
        let db = setup_test_db().await;

        for account in [
            new_account("", "pw", "Databases"),
            new_account("a@b.c", "", "Databases"),
            new_account("a@b.c", "pw", "   "),
        ] {
            let result = AccountService::create_account(&db, TEST_ITERATIONS, account).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }

        assert_eq!(accounts::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(subjects::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_signup_rolls_back_account_when_subject_insert_fails() {
        let db = setup_test_db().await;
        db.execute_unprepared("DROP TABLE subjects").await.unwrap();

        let result = AccountService::create_account(
            &db,
            TEST_ITERATIONS,
            new_account("a@b.c", "pw", "Databases"),
        )
        .await;

        assert!(matches!(result, Err(AppError::Store(_))));
        assert_eq!(accounts::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_login_returns_every_account_of_the_email() {
        let db = setup_test_db().await;
        let first = create_test_account(&db, "prof@uni.edu", "secret", "CS", "3", "Algebra").await;
        let second = create_test_account(&db, "PROF@uni.edu", "secret", "CS", "5", "Compilers").await;
        create_test_account(&db, "other@uni.edu", "secret", "EE", "1", "Circuits").await;

        let accounts = AccountService::verify_credentials(&db, "prof@uni.edu", "secret")
            .await
            .unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].account_id, first);
        assert_eq!(accounts[0].subject.as_deref(), Some("Algebra"));
        assert_eq!(accounts[1].account_id, second);
        assert_eq!(accounts[1].semester.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_email() {
        let db = setup_test_db().await;
        create_test_account(&db, "prof@uni.edu", "secret", "CS", "3", "Algebra").await;

        let wrong = AccountService::verify_credentials(&db, "prof@uni.edu", "nope").await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        let unknown = AccountService::verify_credentials(&db, "ghost@uni.edu", "secret").await;
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_checks_only_the_first_account_password() {
        let db = setup_test_db().await;
        create_test_account(&db, "prof@uni.edu", "first-pw", "CS", "3", "Algebra").await;
        create_test_account(&db, "prof@uni.edu", "second-pw", "CS", "5", "Compilers").await;

        let with_second = AccountService::verify_credentials(&db, "prof@uni.edu", "second-pw").await;
        assert!(matches!(with_second, Err(AppError::InvalidCredentials)));

        let with_first = AccountService::verify_credentials(&db, "prof@uni.edu", "first-pw")
            .await
            .unwrap();
        assert_eq!(with_first.len(), 2);
    }

    #[tokio::test]
    async fn test_accounts_by_email() {
        let db = setup_test_db().await;
        let id = create_test_account(&db, "prof@uni.edu", "secret", "CS", "3", "Algebra").await;

        let accounts = AccountService::accounts_by_email(&db, " Prof@Uni.edu").await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].account_id, id);
        assert_eq!(accounts[0].dept.as_deref(), Some("CS"));

        assert!(AccountService::accounts_by_email(&db, "").await.unwrap().is_empty());
        assert!(AccountService::account_exists(&db, &id).await.unwrap());
        assert!(!AccountService::account_exists(&db, "nope").await.unwrap());
    }
}
