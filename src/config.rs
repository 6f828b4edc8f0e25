use std::env;

use crate::error::{AppError, AppResult};
use crate::utils::password::DEFAULT_ITERATIONS;

/// Configuration du serveur, lue depuis les variables d'environnement (.env accepté)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Nombre d'itérations PBKDF2 pour les nouveaux hashs
    pub password_iterations: u32,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL must be set".to_string()))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| AppError::Config("Invalid PORT".to_string()))?;

        let password_iterations = match env::var("PASSWORD_HASH_ITERATIONS") {
            Ok(raw) => parse_iterations(&raw)?,
            Err(_) => DEFAULT_ITERATIONS,
        };

        Ok(Config {
            database_url,
            host,
            port,
            password_iterations,
        })
    }
}

fn parse_iterations(raw: &str) -> AppResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::Config(format!(
            "Invalid PASSWORD_HASH_ITERATIONS: {}",
            raw
        ))),
    }
}
