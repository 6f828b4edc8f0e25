// ============================================================================
// MODÈLE : ATTENDANCE
// ============================================================================
//
// Colonnes de la table attendance:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - account_id (VARCHAR, NOT NULL, FK vers accounts.account_id)
//   - enrollment_number (VARCHAR, NOT NULL)
//   - attendance_date (DATE, NOT NULL)
//   - status (VARCHAR, NOT NULL) - 'Present' ou 'Absent'
//   - department, semester, subject_name (VARCHAR, NOT NULL) - copiés depuis
//     subjects au moment de l'écriture
//
// Points d'attention:
//   - Index unique (account_id, attendance_date, enrollment_number), créé dans db.rs
//   - Les colonnes dénormalisées permettent d'agréger par élève
//     (département + semestre + matricule) tous comptes confondus
//   - Les lignes ne sont jamais modifiées ni supprimées
//
// ============================================================================

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub account_id: String,
    pub enrollment_number: String,
    pub attendance_date: Date,
    pub status: String,
    pub department: String,
    pub semester: String,
    pub subject_name: String,
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

/// Statut de présence. Stocké tel quel ("Present" / "Absent"), sensible à la casse.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Present" => Ok(AttendanceStatus::Present),
            "Absent" => Ok(AttendanceStatus::Absent),
            other => Err(format!("Unknown attendance status: {}", other)),
        }
    }
}
