//! Session-Verwaltung fuer Plauder
//!
//! Sessions werden im Speicher gehalten, mit zwei gemeinsam gepflegten
//! Indizes: `token -> Session` und `verbindung -> token`. Beide werden
//! bei jeder Bindungsaenderung zusammen aktualisiert, Lookups bleiben
//! dadurch O(1).
//!
//! ## Praesenz-Zustand
//! ```text
//! Anonym -> Angemeldet -> ImChatraum
//!    ^                        |
//!    +------ entfernen -------+
//! ```
//! Der Zustand haengt an der Session selbst (`im_chatraum`), nicht an der
//! Verbindung – er ueberlebt dadurch Reconnects.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use plauder_core::{ConnectionId, SessionToken};

use crate::error::{RegistryFehler, RegistryResult};

// ---------------------------------------------------------------------------
// Praesenz-Zustand
// ---------------------------------------------------------------------------

/// Praesenz-Zustand einer Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PraesenzZustand {
    /// Keine Session gebunden
    Anonym,
    /// Session existiert, Chatraum nicht betreten
    Angemeldet,
    /// Session hat den Chatraum explizit betreten
    ImChatraum,
}

impl std::fmt::Display for PraesenzZustand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonym => write!(f, "anonym"),
            Self::Angemeldet => write!(f, "angemeldet"),
            Self::ImChatraum => write!(f, "im_chatraum"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Eine aktive Session
///
/// Entsteht bei erfolgreichem Login, verschwindet beim Logout. Die
/// Verbindung wechselt bei jedem Reconnect, Token und Name bleiben.
#[derive(Debug, Clone)]
pub struct Session {
    /// Durables Token, vom Client bei jedem Reconnect praesentiert
    pub token: SessionToken,
    /// Anzeigename, eindeutig unter den aktiven Sessions
    pub username: String,
    /// Ablaufzeitpunkt (Login-Zeit + exdays). Wird gespeichert aber
    /// nirgends geprueft; er spiegelt die Cookie-Lebensdauer des Clients.
    pub laeuft_ab_am: DateTime<Utc>,
    /// True nur solange die Session den Chatraum explizit betreten hat
    pub im_chatraum: bool,
    /// Aktuell gebundene Verbindung, None zwischen Seitenaufrufen
    pub verbindung: Option<ConnectionId>,
}

impl Session {
    /// Gibt den Praesenz-Zustand dieser Session zurueck
    pub fn zustand(&self) -> PraesenzZustand {
        if self.im_chatraum {
            PraesenzZustand::ImChatraum
        } else {
            PraesenzZustand::Angemeldet
        }
    }
}

// ---------------------------------------------------------------------------
// SessionRegistry
// ---------------------------------------------------------------------------

/// Autoritativer Speicher aller aktiven Sessions
///
/// Ein einfacher Wert ohne innere Locks – der Event-Router besitzt die
/// Registry exklusiv und serialisiert alle Mutationen. Beide Indizes
/// werden bei jeder Aenderung gemeinsam gepflegt.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// token -> Session
    sitzungen: HashMap<SessionToken, Session>,
    /// verbindung -> token
    verbindungs_index: HashMap<ConnectionId, SessionToken>,
}

impl SessionRegistry {
    /// Erstellt eine neue leere Registry
    pub fn neu() -> Self {
        Self::default()
    }

    /// Prueft ob ein Benutzername verfuegbar ist
    ///
    /// Falsch bei leerem Namen und bei jedem Namen einer existierenden
    /// Session – der Ablaufzeitpunkt wird dabei nicht betrachtet.
    pub fn ist_name_frei(&self, username: &str) -> bool {
        self.name_pruefen(username).is_ok()
    }

    /// Prueft einen Benutzernamen und benennt den Ablehnungsgrund
    pub fn name_pruefen(&self, username: &str) -> RegistryResult<()> {
        if username.is_empty() {
            return Err(RegistryFehler::NameLeer);
        }
        if self.sitzungen.values().any(|s| s.username == username) {
            return Err(RegistryFehler::NameVergeben(username.to_string()));
        }
        Ok(())
    }

    /// Erstellt eine neue Session und gibt ihr Token zurueck
    ///
    /// Vorbedingung: `name_pruefen` war erfolgreich – der Aufrufer prueft,
    /// die Registry prueft nicht erneut. `merken_tage` bestimmt nur den
    /// gespeicherten Ablaufzeitpunkt (0 = laeuft sofort ab).
    pub fn erstellen(&mut self, username: &str, merken_tage: u32) -> SessionToken {
        debug_assert!(self.ist_name_frei(username));

        let token = SessionToken::generieren();
        let session = Session {
            token: token.clone(),
            username: username.to_string(),
            laeuft_ab_am: Utc::now() + Duration::days(i64::from(merken_tage)),
            im_chatraum: false,
            verbindung: None,
        };
        self.sitzungen.insert(token.clone(), session);

        tracing::debug!(username = %username, "Neue Session erstellt");
        token
    }

    /// Gibt die Session zu einem Token zurueck
    pub fn nach_token(&self, token: &SessionToken) -> Option<&Session> {
        self.sitzungen.get(token)
    }

    /// Gibt die Session zurueck die an eine Verbindung gebunden ist
    pub fn nach_verbindung(&self, verbindung: &ConnectionId) -> Option<&Session> {
        let token = self.verbindungs_index.get(verbindung)?;
        self.sitzungen.get(token)
    }

    /// Prueft ob ein Token gueltig ist
    ///
    /// Gueltig heisst: wohlgeformt UND einer existierenden Session
    /// zugeordnet. Ein wohlgeformtes aber unbekanntes Token ist ungueltig.
    pub fn ist_token_gueltig(&self, token: &SessionToken) -> bool {
        self.sitzung_pruefen(token).is_ok()
    }

    /// Die fehlbare Form der Token-Pruefung
    ///
    /// Missgebildet und unbekannt werden nicht unterschieden.
    pub fn sitzung_pruefen(&self, token: &SessionToken) -> RegistryResult<&Session> {
        if !token.ist_wohlgeformt() {
            return Err(RegistryFehler::TokenUngueltig);
        }
        self.sitzungen
            .get(token)
            .ok_or(RegistryFehler::TokenUngueltig)
    }

    /// Die fehlbare Form der Verbindungs-Aufloesung
    pub fn verbindung_pruefen(&self, verbindung: &ConnectionId) -> RegistryResult<&Session> {
        self.nach_verbindung(verbindung)
            .ok_or(RegistryFehler::VerbindungUnbekannt(*verbindung))
    }

    /// Bindet eine Verbindung an eine Session
    ///
    /// Wird bei jedem Re-Identifizieren aufgerufen (validate nach Reconnect,
    /// joinChatroom). Ein Rebind derselben Verbindung an eine andere Session
    /// ueberschreibt den Index-Eintrag; das `verbindung`-Feld der vorherigen
    /// Session bleibt unberuehrt, aufgeloest wird nur ueber den Index.
    pub fn verbindung_binden(&mut self, token: &SessionToken, verbindung: ConnectionId) {
        let Some(session) = self.sitzungen.get_mut(token) else {
            return;
        };

        // Alten Index-Eintrag dieser Session entfernen
        if let Some(alte) = session.verbindung.take() {
            if self.verbindungs_index.get(&alte) == Some(token) {
                self.verbindungs_index.remove(&alte);
            }
        }

        session.verbindung = Some(verbindung);
        self.verbindungs_index.insert(verbindung, token.clone());
    }

    /// Setzt das Chatraum-Flag einer Session
    pub fn chatraum_setzen(&mut self, token: &SessionToken, im_chatraum: bool) {
        if let Some(session) = self.sitzungen.get_mut(token) {
            // im_chatraum == true setzt eine gebundene Verbindung voraus
            debug_assert!(!im_chatraum || session.verbindung.is_some());
            session.im_chatraum = im_chatraum;
        }
    }

    /// Entfernt eine Session samt Index-Eintrag
    ///
    /// Idempotent: ein unbekanntes Token ist ein No-op.
    pub fn entfernen(&mut self, token: &SessionToken) {
        if let Some(session) = self.sitzungen.remove(token) {
            if let Some(verbindung) = session.verbindung {
                if self.verbindungs_index.get(&verbindung) == Some(token) {
                    self.verbindungs_index.remove(&verbindung);
                }
            }
            tracing::debug!(username = %session.username, "Session entfernt");
        }
    }

    /// Gibt den Praesenz-Zustand einer Verbindung zurueck
    ///
    /// `Anonym` wenn keine Session an die Verbindung gebunden ist.
    pub fn zustand_von_verbindung(&self, verbindung: &ConnectionId) -> PraesenzZustand {
        self.nach_verbindung(verbindung)
            .map(Session::zustand)
            .unwrap_or(PraesenzZustand::Anonym)
    }

    /// Gibt die Anzahl der aktiven Sessions zurueck
    pub fn anzahl(&self) -> usize {
        self.sitzungen.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erstellen_liefert_wohlgeformtes_token() {
        let mut registry = SessionRegistry::neu();
        let token = registry.erstellen("alice", 7);

        assert!(token.ist_wohlgeformt());
        assert!(registry.ist_token_gueltig(&token));
        assert_eq!(registry.anzahl(), 1);

        let session = registry.nach_token(&token).unwrap();
        assert_eq!(session.username, "alice");
        assert!(!session.im_chatraum);
        assert!(session.verbindung.is_none());
    }

    #[test]
    fn tokens_sind_eindeutig() {
        let mut registry = SessionRegistry::neu();
        let a = registry.erstellen("alice", 0);
        let b = registry.erstellen("bob", 0);
        assert_ne!(a, b, "Session-Tokens muessen eindeutig sein");
    }

    #[test]
    fn name_pruefung() {
        let mut registry = SessionRegistry::neu();
        registry.erstellen("alice", 0);

        assert!(registry.ist_name_frei("bob"));
        assert!(!registry.ist_name_frei("alice"));
        assert!(!registry.ist_name_frei(""));
        assert!(matches!(
            registry.name_pruefen(""),
            Err(RegistryFehler::NameLeer)
        ));
        assert!(matches!(
            registry.name_pruefen("alice"),
            Err(RegistryFehler::NameVergeben(_))
        ));
    }

    #[test]
    fn abgelaufene_session_blockiert_namen_trotzdem() {
        let mut registry = SessionRegistry::neu();
        // merken_tage = 0: Ablaufzeitpunkt liegt sofort in der Vergangenheit
        registry.erstellen("alice", 0);
        assert!(!registry.ist_name_frei("alice"));
    }

    #[test]
    fn wohlgeformtes_aber_unbekanntes_token_ist_ungueltig() {
        let registry = SessionRegistry::neu();
        let fremd = SessionToken::generieren();
        assert!(fremd.ist_wohlgeformt());
        assert!(!registry.ist_token_gueltig(&fremd));
    }

    #[test]
    fn missgebildetes_token_ist_ungueltig() {
        let mut registry = SessionRegistry::neu();
        registry.erstellen("alice", 0);
        assert!(!registry.ist_token_gueltig(&SessionToken::from("kein-uuid")));
    }

    #[test]
    fn verbindung_binden_und_aufloesen() {
        let mut registry = SessionRegistry::neu();
        let token = registry.erstellen("alice", 7);
        let verbindung = ConnectionId::new();

        registry.verbindung_binden(&token, verbindung);

        let session = registry.nach_verbindung(&verbindung).unwrap();
        assert_eq!(session.token, token);
        assert_eq!(session.verbindung, Some(verbindung));
    }

    #[test]
    fn reconnect_aktualisiert_beide_indizes() {
        let mut registry = SessionRegistry::neu();
        let token = registry.erstellen("alice", 7);
        let alte = ConnectionId::new();
        let neue = ConnectionId::new();

        registry.verbindung_binden(&token, alte);
        registry.verbindung_binden(&token, neue);

        assert!(registry.nach_verbindung(&alte).is_none());
        assert_eq!(
            registry.nach_verbindung(&neue).map(|s| s.token.clone()),
            Some(token)
        );
    }

    #[test]
    fn rebind_einer_verbindung_ueberschreibt_index() {
        let mut registry = SessionRegistry::neu();
        let token_a = registry.erstellen("alice", 7);
        let token_b = registry.erstellen("bob", 7);
        let verbindung = ConnectionId::new();

        registry.verbindung_binden(&token_a, verbindung);
        registry.verbindung_binden(&token_b, verbindung);

        // Der Index loest die Verbindung jetzt auf bob auf; das alte
        // Verbindungsfeld von alice bleibt stehen
        assert_eq!(
            registry.nach_verbindung(&verbindung).map(|s| s.username.clone()),
            Some("bob".to_string())
        );
        assert_eq!(
            registry.nach_token(&token_a).unwrap().verbindung,
            Some(verbindung)
        );
    }

    #[test]
    fn chatraum_flag_und_zustand() {
        let mut registry = SessionRegistry::neu();
        let token = registry.erstellen("alice", 7);
        let verbindung = ConnectionId::new();

        assert_eq!(
            registry.nach_token(&token).unwrap().zustand(),
            PraesenzZustand::Angemeldet
        );

        registry.verbindung_binden(&token, verbindung);
        registry.chatraum_setzen(&token, true);
        assert_eq!(
            registry.nach_token(&token).unwrap().zustand(),
            PraesenzZustand::ImChatraum
        );

        registry.chatraum_setzen(&token, false);
        assert_eq!(
            registry.nach_token(&token).unwrap().zustand(),
            PraesenzZustand::Angemeldet
        );
    }

    #[test]
    fn entfernen_ist_idempotent() {
        let mut registry = SessionRegistry::neu();
        let token = registry.erstellen("alice", 7);
        let verbindung = ConnectionId::new();
        registry.verbindung_binden(&token, verbindung);

        registry.entfernen(&token);
        assert_eq!(registry.anzahl(), 0);
        assert!(registry.nach_verbindung(&verbindung).is_none());

        // Zweites Entfernen ist ein No-op
        registry.entfernen(&token);
        assert_eq!(registry.anzahl(), 0);
    }

    #[test]
    fn entfernen_gibt_namen_wieder_frei() {
        let mut registry = SessionRegistry::neu();
        let token = registry.erstellen("alice", 7);
        assert!(!registry.ist_name_frei("alice"));

        registry.entfernen(&token);
        assert!(registry.ist_name_frei("alice"));
    }

    #[test]
    fn verbindung_pruefen_unbekannte_verbindung() {
        let registry = SessionRegistry::neu();
        let verbindung = ConnectionId::new();
        assert!(matches!(
            registry.verbindung_pruefen(&verbindung),
            Err(RegistryFehler::VerbindungUnbekannt(_))
        ));
        assert_eq!(
            registry.zustand_von_verbindung(&verbindung),
            PraesenzZustand::Anonym
        );
    }

    #[test]
    fn ablaufzeitpunkt_wird_aus_merken_tagen_berechnet() {
        let mut registry = SessionRegistry::neu();
        let vorher = Utc::now();
        let token = registry.erstellen("alice", 7);
        let session = registry.nach_token(&token).unwrap();

        let mindestens = vorher + Duration::days(7) - Duration::seconds(5);
        let hoechstens = Utc::now() + Duration::days(7);
        assert!(session.laeuft_ab_am >= mindestens);
        assert!(session.laeuft_ab_am <= hoechstens);
    }
}
