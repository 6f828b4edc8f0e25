use chrono::{DateTime, Duration, Utc};
use sea_orm::*;
use sea_orm::sea_query::Expr;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{accounts, reset_tokens};
use crate::services::account_service::AccountService;
use crate::utils::{password, token};

/// Durée de validité d'un token de reset (1 heure)
pub const TOKEN_EXPIRY_SECS: i64 = 3600;

pub struct ResetTokenService;

impl ResetTokenService {
    /// Émet un nouveau token pour le compte ; tout token précédent est supprimé
    pub async fn issue(db: &DatabaseConnection, account_id: &str) -> AppResult<String> {
        Self::issue_at(db, account_id, Utc::now()).await
    }

    pub async fn issue_at(
        db: &DatabaseConnection,
        account_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        if !AccountService::account_exists(db, account_id).await? {
            return Err(AppError::not_found("Account not found"));
        }

        let token = token::generate_reset_token();
        let expires_at = now + Duration::seconds(TOKEN_EXPIRY_SECS);

        let txn = db.begin().await?;

        reset_tokens::Entity::delete_many()
            .filter(reset_tokens::Column::AccountId.eq(account_id))
            .exec(&txn)
            .await?;

        let row = reset_tokens::ActiveModel {
            account_id: Set(account_id.to_string()),
            token: Set(token.clone()),
            expires_at: Set(expires_at),
            used: Set(false),
            created_at: Set(now),
            ..Default::default()
        };
        reset_tokens::Entity::insert(row)
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;

        info!(account_id = %account_id, expires_at = %expires_at, "reset token issued");
        Ok(token)
    }

    /// Consomme le token et change le mot de passe.
    /// Token inconnu, expiré ou déjà utilisé : même erreur `InvalidToken`.
    pub async fn consume(
        db: &DatabaseConnection,
        iterations: u32,
        account_id: &str,
        token: &str,
        new_password: &str,
    ) -> AppResult<()> {
        Self::consume_at(db, iterations, account_id, token, new_password, Utc::now()).await
    }

    pub async fn consume_at(
        db: &DatabaseConnection,
        iterations: u32,
        account_id: &str,
        token: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if new_password.is_empty() {
            return Err(AppError::validation("New password required"));
        }

        let row = reset_tokens::Entity::find()
            .filter(reset_tokens::Column::AccountId.eq(account_id))
            .filter(reset_tokens::Column::Token.eq(token.trim()))
            .filter(reset_tokens::Column::Used.eq(false))
            .one(db)
            .await?;

        let row = match row {
            Some(row) if row.expires_at > now => row,
            _ => {
                warn!(account_id = %account_id, "password reset rejected: invalid token");
                return Err(AppError::InvalidToken);
            }
        };

        let password_hash = password::hash_password(new_password, iterations)?;

        let txn = db.begin().await?;

        accounts::Entity::update_many()
            .col_expr(accounts::Column::PasswordHash, Expr::value(password_hash))
            .filter(accounts::Column::AccountId.eq(account_id))
            .exec(&txn)
            .await?;

        // used = false dans le filtre : un seul consommateur gagne en cas de concurrence
        let marked = reset_tokens::Entity::update_many()
            .col_expr(reset_tokens::Column::Used, Expr::value(true))
            .filter(reset_tokens::Column::Id.eq(row.id))
            .filter(reset_tokens::Column::Used.eq(false))
            .exec(&txn)
            .await?;

        if marked.rows_affected != 1 {
            txn.rollback().await?;
            warn!(account_id = %account_id, "password reset rejected: token consumed concurrently");
            return Err(AppError::InvalidToken);
        }

        txn.commit().await?;

        info!(account_id = %account_id, "password reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEST_ITERATIONS, create_test_account, setup_test_db};

    async fn login_ok(db: &DatabaseConnection, password: &str) -> bool {
        AccountService::verify_credentials(db, "p@u.edu", password)
            .await
            .is_ok()
    }

    #[tokio::test]
    async fn test_issue_then_consume_changes_password() {
        let db = setup_test_db().await;
        let id = create_test_account(&db, "p@u.edu", "old-pw", "CS", "3", "OS").await;

        let token = ResetTokenService::issue(&db, &id).await.unwrap();
        assert_eq!(token.len(), 6);

        ResetTokenService::consume(&db, TEST_ITERATIONS, &id, &token, "new-pw")
            .await
            .unwrap();

        assert!(login_ok(&db, "new-pw").await);
        assert!(!login_ok(&db, "old-pw").await);

        let row = reset_tokens::Entity::find()
            .filter(reset_tokens::Column::AccountId.eq(id.as_str()))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(row.used);
    }

    #[tokio::test]
    async fn test_token_is_single_use() {
        let db = setup_test_db().await;
        let id = create_test_account(&db, "p@u.edu", "old-pw", "CS", "3", "OS").await;
        let token = ResetTokenService::issue(&db, &id).await.unwrap();

        ResetTokenService::consume(&db, TEST_ITERATIONS, &id, &token, "new-pw")
            .await
            .unwrap();
        let second = ResetTokenService::consume(&db, TEST_ITERATIONS, &id, &token, "other-pw").await;

        assert!(matches!(second, Err(AppError::InvalidToken)));
        assert!(login_ok(&db, "new-pw").await);
    }

    #[tokio::test]
    async fn test_second_issue_invalidates_first_token() {
        let db = setup_test_db().await;
        let id = create_test_account(&db, "p@u.edu", "old-pw", "CS", "3", "OS").await;

        let first = ResetTokenService::issue(&db, &id).await.unwrap();
        let mut second = ResetTokenService::issue(&db, &id).await.unwrap();
        while second == first {
            second = ResetTokenService::issue(&db, &id).await.unwrap();
        }

        let count = reset_tokens::Entity::find()
            .filter(reset_tokens::Column::AccountId.eq(id.as_str()))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let with_first = ResetTokenService::consume(&db, TEST_ITERATIONS, &id, &first, "new-pw").await;
        assert!(matches!(with_first, Err(AppError::InvalidToken)));

        ResetTokenService::consume(&db, TEST_ITERATIONS, &id, &second, "new-pw")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let db = setup_test_db().await;
        let id = create_test_account(&db, "p@u.edu", "old-pw", "CS", "3", "OS").await;

        let issued_at = Utc::now() - Duration::seconds(TOKEN_EXPIRY_SECS + 60);
        let token = ResetTokenService::issue_at(&db, &id, issued_at).await.unwrap();

        let result = ResetTokenService::consume(&db, TEST_ITERATIONS, &id, &token, "new-pw").await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
        assert!(login_ok(&db, "old-pw").await);

        // un nouveau token remplace le token expiré
        let fresh = ResetTokenService::issue(&db, &id).await.unwrap();
        ResetTokenService::consume(&db, TEST_ITERATIONS, &id, &fresh, "new-pw")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_token_is_bound_to_its_account() {
        let db = setup_test_db().await;
        let a = create_test_account(&db, "p@u.edu", "pw-a", "CS", "3", "OS").await;
        let b = create_test_account(&db, "q@u.edu", "pw-b", "CS", "3", "AI").await;

        let token = ResetTokenService::issue(&db, &a).await.unwrap();
        let result = ResetTokenService::consume(&db, TEST_ITERATIONS, &b, &token, "x").await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_lost_token_race_rolls_back_password_change() {
        let db = setup_test_db().await;
        let id = create_test_account(&db, "p@u.edu", "old-pw", "CS", "3", "OS").await;
        let token = ResetTokenService::issue(&db, &id).await.unwrap();

        // le marquage du token n'affecte aucune ligne, comme si un autre consommateur était passé avant
        db.execute_unprepared(
            "CREATE TRIGGER token_taken BEFORE UPDATE ON reset_tokens \
             BEGIN SELECT RAISE(IGNORE); END",
        )
        .await
        .unwrap();

        let result = ResetTokenService::consume(&db, TEST_ITERATIONS, &id, &token, "new-pw").await;
        assert!(matches!(result, Err(AppError::InvalidToken)));

        assert!(login_ok(&db, "old-pw").await);
        assert!(!login_ok(&db, "new-pw").await);

        let row = reset_tokens::Entity::find()
            .filter(reset_tokens::Column::AccountId.eq(id.as_str()))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(!row.used);
    }

    #[tokio::test]
    async fn test_issue_for_unknown_account_and_empty_password() {
        let db = setup_test_db().await;
        let missing = ResetTokenService::issue(&db, "missing").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let id = create_test_account(&db, "p@u.edu", "pw", "CS", "3", "OS").await;
        let token = ResetTokenService::issue(&db, &id).await.unwrap();
        let empty = ResetTokenService::consume(&db, TEST_ITERATIONS, &id, &token, "").await;
        assert!(matches!(empty, Err(AppError::Validation(_))));
    }
}
