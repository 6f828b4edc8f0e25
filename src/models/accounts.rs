// ============================================================================
// MODÈLE : ACCOUNTS
// ============================================================================
//
// Colonnes de la table accounts:
//   - id (INTEGER, PRIMARY KEY, SERIAL) - ordre de création
//   - account_id (VARCHAR, UNIQUE, NOT NULL) - 128 bits aléatoires en hexadécimal
//   - email (VARCHAR, NOT NULL) - en minuscules, PAS unique
//   - password_hash (VARCHAR, NOT NULL) - pbkdf2:sha256:iterations$salt$hash
//   - created_at (TIMESTAMP, NOT NULL)
//
// Points d'attention:
//   - Un même email possède un compte par matière enseignée
//   - Tous les comptes d'un email partagent le même mot de passe ; seul le
//     premier compte créé (plus petit id) est vérifié au login
//   - Un compte n'est jamais supprimé
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub account_id: String,

    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::subjects::Entity")]
    Subject,
}

impl Related<super::subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
