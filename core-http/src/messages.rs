//! User-facing error messages.

use bridge_traits::PlatformFacts;

/// Message catalogue for [`ClassifiedError`](crate::ClassifiedError).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessages {
    /// No response inside the native shell
    pub network_native: String,
    /// No response in the browser
    pub network_web: String,
    pub unauthorized: String,
    pub forbidden: String,
    pub not_found: String,
    pub server_error: String,
    /// Fallback when the server supplied no `message`
    pub generic: String,
}

impl Default for UserMessages {
    fn default() -> Self {
        Self {
            network_native: "Check your internet connection.".to_string(),
            network_web: "Cannot reach the server.".to_string(),
            unauthorized: "Your session has expired. Please sign in again.".to_string(),
            forbidden: "You are not allowed to perform this action.".to_string(),
            not_found: "The requested resource was not found.".to_string(),
            server_error: "A server error occurred.".to_string(),
            generic: "Something went wrong.".to_string(),
        }
    }
}

impl UserMessages {
    /// The Turkish catalogue shipped with the catalog app.
    pub fn turkish() -> Self {
        Self {
            network_native: "İnternet bağlantınızı kontrol edin".to_string(),
            network_web: "Sunucuya bağlanılamıyor".to_string(),
            unauthorized: "Oturum süreniz dolmuş. Lütfen tekrar giriş yapın.".to_string(),
            forbidden: "Bu işlem için yetkiniz yok.".to_string(),
            not_found: "İstenen kaynak bulunamadı.".to_string(),
            server_error: "Sunucu hatası oluştu.".to_string(),
            generic: "Bir hata oluştu.".to_string(),
        }
    }

    pub fn network(&self, facts: PlatformFacts) -> &str {
        if facts.is_native() {
            &self.network_native
        } else {
            &self.network_web
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_message_depends_on_platform() {
        let messages = UserMessages::turkish();
        assert_eq!(
            messages.network(PlatformFacts::ANDROID),
            "İnternet bağlantınızı kontrol edin"
        );
        assert_eq!(messages.network(PlatformFacts::WEB), "Sunucuya bağlanılamıyor");
    }

    #[test]
    fn test_default_is_english() {
        let messages = UserMessages::default();
        assert_eq!(messages.generic, "Something went wrong.");
        assert_ne!(messages, UserMessages::turkish());
    }
}
