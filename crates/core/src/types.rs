//! Gemeinsame Identifikationstypen fuer Plauder
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Verbindungs-ID
///
/// Identifiziert eine lebende Transport-Verbindung. Ephemer: wird beim
/// Verbindungsaufbau vergeben und verfaellt mit der Verbindung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Erstellt eine neue zufaellige ConnectionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Durables Session-Token
///
/// Wird beim Login ausgestellt und vom Client bei jedem Reconnect
/// praesentiert. Der Inhalt ist fuer den Client opak; serverseitig ist es
/// ein UUIDv4-String. Eingehende Tokens sind beliebige Strings – die
/// Wohlgeformtheit wird erst bei der Pruefung festgestellt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub String);

impl SessionToken {
    /// Erzeugt ein neues zufaelliges Token (UUIDv4)
    pub fn generieren() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Prueft ob das Token wohlgeformt ist
    ///
    /// Wohlgeformt heisst: als UUID parsebar. Sagt nichts darueber aus ob
    /// das Token einer bekannten Session gehoert.
    pub fn ist_wohlgeformt(&self) -> bool {
        Uuid::parse_str(&self.0).is_ok()
    }

    /// Gibt den Token-String zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_eindeutig() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        assert_ne!(a, b, "Zwei neue ConnectionIds muessen verschieden sein");
    }

    #[test]
    fn connection_id_display() {
        let id = ConnectionId(Uuid::nil());
        assert!(id.to_string().starts_with("conn:"));
    }

    #[test]
    fn token_eindeutig_und_wohlgeformt() {
        let a = SessionToken::generieren();
        let b = SessionToken::generieren();
        assert_ne!(a, b, "Zwei neue Tokens muessen verschieden sein");
        assert!(a.ist_wohlgeformt());
    }

    #[test]
    fn token_wohlgeformtheit() {
        assert!(!SessionToken::from("").ist_wohlgeformt());
        assert!(!SessionToken::from("kein-uuid").ist_wohlgeformt());
        assert!(SessionToken::from("550e8400-e29b-41d4-a716-446655440000").ist_wohlgeformt());
    }

    #[test]
    fn token_serialisiert_als_string() {
        let token = SessionToken::generieren();
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, format!("\"{}\"", token.as_str()));
        let zurueck: SessionToken = serde_json::from_str(&json).unwrap();
        assert_eq!(token, zurueck);
    }
}
