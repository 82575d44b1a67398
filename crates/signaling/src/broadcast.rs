//! Event-Broadcaster – Verbindungstabelle und Fan-out
//!
//! Haelt die Send-Queues aller offenen Verbindungen und stellt Methoden
//! bereit, um Ereignisse gezielt oder an alle zu senden. Broadcasts gehen
//! an **jede** offene Verbindung – auch an den Absender selbst und an
//! angemeldete Verbindungen die den Chatraum nicht betreten haben. Es gibt
//! keine Raum-Eingrenzung; das Chatraum-Flag steuert nur die
//! Join/Leave-Ansagen.
//!
//! Der Broadcaster wird exklusiv vom Event-Router gehalten; alle
//! Mutationen laufen durch dessen Queue.

use std::collections::HashMap;

use plauder_core::ConnectionId;
use plauder_protocol::events::ServerEvent;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Verbindung
pub const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer offenen Verbindung
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub verbindung: ConnectionId,
    pub tx: mpsc::Sender<ServerEvent>,
}

impl ClientSender {
    /// Sendet ein Ereignis nicht-blockierend an die Verbindung
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, ereignis: ServerEvent) -> bool {
        match self.tx.try_send(ereignis) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(verbindung = %self.verbindung, "Send-Queue voll – Ereignis verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(verbindung = %self.verbindung, "Send-Queue geschlossen (Verbindung getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Verbindungstabelle mit Fan-out an alle offenen Verbindungen
#[derive(Debug, Default)]
pub struct EventBroadcaster {
    /// Alle offenen Verbindungen, indiziert nach ConnectionId
    verbindungen: HashMap<ConnectionId, ClientSender>,
}

impl EventBroadcaster {
    /// Erstellt einen neuen leeren EventBroadcaster
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert eine neue Verbindung mit ihrer Send-Queue
    ///
    /// Die `ClientConnection` liest aus der Gegenseite der Queue und
    /// schreibt auf den Socket.
    pub fn registrieren(&mut self, verbindung: ConnectionId, tx: mpsc::Sender<ServerEvent>) {
        self.verbindungen
            .insert(verbindung, ClientSender { verbindung, tx });
        tracing::debug!(verbindung = %verbindung, "Verbindung registriert");
    }

    /// Entfernt eine Verbindung aus der Tabelle
    pub fn entfernen(&mut self, verbindung: &ConnectionId) {
        self.verbindungen.remove(verbindung);
        tracing::debug!(verbindung = %verbindung, "Verbindung entfernt");
    }

    /// Sendet ein Ereignis an eine einzelne Verbindung
    ///
    /// Gibt `true` zurueck wenn die Verbindung gefunden und das Ereignis
    /// eingereiht wurde.
    pub fn an_verbindung_senden(&self, verbindung: &ConnectionId, ereignis: ServerEvent) -> bool {
        match self.verbindungen.get(verbindung) {
            Some(sender) => sender.senden(ereignis),
            None => {
                tracing::debug!(verbindung = %verbindung, "Senden an unbekannte Verbindung");
                false
            }
        }
    }

    /// Sendet ein Ereignis an alle offenen Verbindungen
    ///
    /// Gibt die Anzahl der erfolgreichen Sendungen zurueck.
    pub fn an_alle_senden(&self, ereignis: ServerEvent) -> usize {
        let mut gesendet = 0;
        for sender in self.verbindungen.values() {
            if sender.senden(ereignis.clone()) {
                gesendet += 1;
            }
        }
        gesendet
    }

    /// Prueft ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, verbindung: &ConnectionId) -> bool {
        self.verbindungen.contains_key(verbindung)
    }

    /// Gibt die Anzahl der offenen Verbindungen zurueck
    pub fn anzahl(&self) -> usize {
        self.verbindungen.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
