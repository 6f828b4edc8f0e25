// ============================================================================
// MODÈLE : RESET TOKENS
// ============================================================================
//
// Colonnes de la table reset_tokens:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - account_id (VARCHAR, NOT NULL, FK vers accounts.account_id)
//   - token (VARCHAR, NOT NULL) - 6 chiffres
//   - expires_at (TIMESTAMP, NOT NULL) - created_at + 1 heure
//   - used (BOOLEAN, DEFAULT FALSE, NOT NULL)
//   - created_at (TIMESTAMP, NOT NULL)
//
// Workflow:
//   1. L'enseignant demande un reset pour un compte (sendResetToken)
//   2. Les anciens tokens du compte sont supprimés, un nouveau est inséré
//   3. Le token est renvoyé directement (pas d'envoi d'email)
//   4. resetPassword vérifie: token correspond, not used, not expired
//   5. Le mot de passe est changé et used = true, dans une transaction
//
// Points d'attention:
//   - Au plus un token par compte (suppression avant insertion)
//   - Un token ne sert qu'une fois ; les tokens utilisés ne sont pas supprimés
//   - Token peu entropique (10^6 valeurs) et sans limitation de débit
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reset_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub account_id: String,

    #[serde(skip_serializing)]
    pub token: String,

    pub expires_at: DateTimeUtc,

    pub used: bool,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::AccountId"
    )]
    Account,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
