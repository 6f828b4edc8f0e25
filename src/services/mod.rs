pub mod account_service;
pub mod subject_service;
pub mod roster_service;
pub mod reset_token_service;
pub mod attendance_service;
