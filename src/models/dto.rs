// Objets échangés entre services et routes (forme JSON des réponses)
use serde::{Deserialize, Serialize};

use super::{accounts, attendance, subjects};

/// Un compte tel que vu par le client : identifiant + matière
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub dept: Option<String>,
    pub semester: Option<String>,
    pub subject: Option<String>,
}

impl AccountSummary {
    pub fn from_models(account: accounts::Model, subject: Option<subjects::Model>) -> Self {
        match subject {
            Some(s) => AccountSummary {
                account_id: account.account_id,
                dept: Some(s.department),
                semester: Some(s.semester),
                subject: Some(s.subject_name),
            },
            None => AccountSummary {
                account_id: account.account_id,
                dept: None,
                semester: None,
                subject: None,
            },
        }
    }
}

/// Ligne du roster : matricule + nom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub enroll: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Présence soumise pour un élève ; le statut est validé par le service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub enroll: String,
    pub status: String,
}

/// Ligne de présence renvoyée par getAttendanceByAccount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttendanceRecord {
    pub date: chrono::NaiveDate,
    pub enroll: String,
    pub status: String,
    pub department: String,
    pub semester: String,
    pub subject: String,
}

impl From<attendance::Model> for AttendanceRecord {
    fn from(row: attendance::Model) -> Self {
        AttendanceRecord {
            date: row.attendance_date,
            enroll: row.enrollment_number,
            status: row.status,
            department: row.department,
            semester: row.semester,
            subject: row.subject_name,
        }
    }
}

/// Filtre de getAttendanceByAccount ; status absent ou "All" = pas de filtre
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceFilter {
    pub search: Option<String>,
    pub status: Option<String>,
}

/// Compteurs par matière pour un élève
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: u64,
    pub present: u64,
    pub absent: u64,
}
