use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::Config;
use crate::db::create_schema;
use crate::services::account_service::{AccountService, NewAccount};

/// Itérations PBKDF2 réduites pour garder les tests rapides
pub const TEST_ITERATIONS: u32 = 1000;

/// Base SQLite en mémoire avec le schéma complet.
/// Une seule connexion : la base en mémoire vit tant qu'elle reste ouverte.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("failed to open in-memory sqlite");
    create_schema(&db).await.expect("failed to create schema");
    db
}

pub async fn create_test_account(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    department: &str,
    semester: &str,
    subject: &str,
) -> String {
    AccountService::create_account(
        db,
        TEST_ITERATIONS,
        NewAccount {
            email: email.to_string(),
            password: password.to_string(),
            department: department.to_string(),
            semester: semester.to_string(),
            subject: subject.to_string(),
        },
    )
    .await
    .expect("failed to create test account")
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        password_iterations: TEST_ITERATIONS,
    }
}
