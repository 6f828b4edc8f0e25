// connexion BD + création du schéma

use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};

use crate::models::{accounts, attendance, attendance_sessions, reset_tokens, students, subjects};

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Crée les tables (si absentes) à partir des entités, dans l'ordre des clés étrangères
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    create_table(db, accounts::Entity).await?;
    create_table(db, subjects::Entity).await?;
    create_table(db, students::Entity).await?;
    create_table(db, attendance_sessions::Entity).await?;
    create_table(db, attendance::Entity).await?;
    create_table(db, reset_tokens::Entity).await?;

    // Un élève au plus une fois par (compte, date)
    let unique_entry = Index::create()
        .name("idx_attendance_account_date_enroll")
        .table(attendance::Entity)
        .col(attendance::Column::AccountId)
        .col(attendance::Column::AttendanceDate)
        .col(attendance::Column::EnrollmentNumber)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(db.get_database_backend().build(&unique_entry))
        .await?;

    Ok(())
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}
