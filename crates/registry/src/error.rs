//! Fehlertypen fuer die Session-Registry

use plauder_core::ConnectionId;
use thiserror::Error;

/// Alle moeglichen Fehler der Session-Registry
///
/// Kein Fehler ist fatal: jeder betrifft genau ein Ereignis und wird
/// hoechstens der ausloesenden Verbindung gemeldet. `TokenUngueltig`
/// unterscheidet fuer den Client nicht zwischen missgebildet und
/// unbekannt.
#[derive(Debug, Error)]
pub enum RegistryFehler {
    /// Token missgebildet oder keiner Session zugeordnet
    #[error("Token ungueltig oder unbekannt")]
    TokenUngueltig,

    /// Benutzername wird bereits von einer aktiven Session verwendet
    #[error("Benutzername bereits vergeben: {0}")]
    NameVergeben(String),

    /// Leerer Benutzername
    #[error("Benutzername darf nicht leer sein")]
    NameLeer,

    /// Keine Session an diese Verbindung gebunden
    #[error("Keine Session fuer Verbindung {0}")]
    VerbindungUnbekannt(ConnectionId),
}

/// Result-Typ fuer die Session-Registry
pub type RegistryResult<T> = Result<T, RegistryFehler>;
