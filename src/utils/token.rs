use rand::Rng;

/// Identifiant de compte : 128 bits aléatoires encodés en hexadécimal (32 caractères).
/// Les collisions ne sont pas vérifiées.
pub fn generate_account_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Token de reset : 6 chiffres, complété par des zéros à gauche
pub fn generate_reset_token() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_format() {
        let id = generate_account_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_account_id());
    }

    #[test]
    fn test_reset_token_format() {
        for _ in 0..200 {
            let token = generate_reset_token();
            assert_eq!(token.len(), 6);
            assert!(token.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
