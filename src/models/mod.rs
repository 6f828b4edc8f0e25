// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque entité correspond à une table créée par db::create_schema.
//
// Liste des modules:
//   - health : Health check API
//   - accounts : Comptes enseignant (un par matière, email non unique)
//   - subjects : Matière liée à chaque compte (1:1)
//   - students : Roster des élèves par compte
//   - attendance : Présences par (compte, date, élève)
//   - attendance_sessions : Marqueur d'une séance par (compte, date)
//   - reset_tokens : Tokens de reset password (expire 1h)
//   - dto : Objets de réponse API
//
// ============================================================================

pub mod health;
pub mod dto;
pub mod accounts;
pub mod subjects;
pub mod students;
pub mod attendance;
pub mod attendance_sessions;
pub mod reset_tokens;
