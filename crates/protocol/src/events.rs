//! Ereignistypen des Chat-Protokolls
//!
//! Definiert alle Nachrichten die ueber die persistente Verbindung
//! ausgetauscht werden.
//!
//! ## Design
//! - Tagged Enums fuer typsichere Ereignistypen (Tag-Feld `event`)
//! - Feldnamen auf dem Draht in camelCase, kompatibel zum bestehenden
//!   Web-Client
//! - JSON-Serialisierung via serde (Chat ist nicht zeitkritisch)

use plauder_core::SessionToken;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Redirect-Ziele
// ---------------------------------------------------------------------------

/// Pfade auf die der Client umgeleitet werden kann
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectZiel {
    /// Chatraum-Seite
    #[serde(rename = "/chat")]
    Chat,
    /// Login-Seite
    #[serde(rename = "/login")]
    Login,
}

impl std::fmt::Display for RedirectZiel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chat => write!(f, "/chat"),
            Self::Login => write!(f, "/login"),
        }
    }
}

// ---------------------------------------------------------------------------
// Eingehende Ereignisse (Client -> Server)
// ---------------------------------------------------------------------------

/// Alle Ereignisse die ein Client senden kann
///
/// `Disconnecting` wird normalerweise von der Transportschicht beim
/// Verbindungsende erzeugt, nicht vom Client selbst.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Token-Pruefung beim Seitenaufruf
    Validate { token: SessionToken },
    /// Login-Versuch mit Anzeigename
    ///
    /// `remember` ist ein Tages-Multiplikator (z.B. Merken-Flag * 7, oder 0).
    Login { username: String, remember: u32 },
    /// Chatraum betreten
    JoinChatroom { token: SessionToken },
    /// Nachricht an den Server senden
    SendServerMessage {
        token: SessionToken,
        message: String,
    },
    /// Session beenden
    Logout { token: SessionToken },
    /// Verbindung wird getrennt (transport-erzeugt)
    Disconnecting,
}

// ---------------------------------------------------------------------------
// Ausgehende Ereignisse (Server -> Client)
// ---------------------------------------------------------------------------

/// Alle Ereignisse die der Server an Clients sendet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Client auf eine andere Seite umleiten
    Redirect { path: RedirectZiel, reason: String },
    /// Erfolgreicher Login
    LoginSuccess {
        token: SessionToken,
        /// Cookie-Lebensdauer in Tagen (remember * 7)
        exdays: u32,
        redirect: RedirectZiel,
    },
    /// Fehlgeschlagener Login
    LoginFailure { reason: String },
    /// Chat-Nachricht (Broadcast an alle Verbindungen)
    AddMessage { message: String, username: String },
}

impl ServerEvent {
    /// Erstellt ein Redirect-Ereignis
    pub fn redirect(path: RedirectZiel, reason: impl Into<String>) -> Self {
        Self::Redirect {
            path,
            reason: reason.into(),
        }
    }

    /// Erstellt ein LoginSuccess-Ereignis (Redirect immer nach /chat)
    pub fn login_erfolg(token: SessionToken, exdays: u32) -> Self {
        Self::LoginSuccess {
            token,
            exdays,
            redirect: RedirectZiel::Chat,
        }
    }

    /// Erstellt ein LoginFailure-Ereignis
    pub fn login_fehlschlag(reason: impl Into<String>) -> Self {
        Self::LoginFailure {
            reason: reason.into(),
        }
    }

    /// Erstellt ein AddMessage-Ereignis
    pub fn nachricht(message: impl Into<String>, username: impl Into<String>) -> Self {
        Self::AddMessage {
            message: message.into(),
            username: username.into(),
        }
    }
}
