//! Event-Router – Verarbeitet eingehende Ereignisse strikt nacheinander
//!
//! Der Router ist der einzige Besitzer von `SessionRegistry` und
//! `EventBroadcaster`. Alle Verbindungs-Tasks speisen ihre Ereignisse in
//! eine gemeinsame Queue; der Router verarbeitet sie einzeln bis zum
//! Abschluss. Jeder Uebergang ist dadurch atomar gegenueber allen anderen
//! Ereignissen, und Broadcasts erreichen alle Clients in derselben
//! relativen Ordnung.
//!
//! ## Uebergaenge
//! - `validate`  – Token pruefen, Verbindung neu binden, Redirect
//! - `login` – Name pruefen, Session erstellen, Verbindung binden
//! - `joinChatroom` – Chatraum-Flag setzen, Beitritt ansagen
//! - `sendServerMessage` – Nachricht an alle verteilen
//! - `logout` – Session entfernen, Abschied ansagen, immer Redirect
//! - `disconnecting` – Chatraum ggf. verlassen, Verbindung austragen

use plauder_core::{ConnectionId, SessionToken};
use plauder_protocol::events::{ClientEvent, RedirectZiel, ServerEvent};
use plauder_registry::SessionRegistry;
use tokio::sync::mpsc;

use crate::broadcast::EventBroadcaster;

/// Absendername fuer Join/Leave-Ansagen
pub const SERVER_ABSENDER: &str = "Server";

/// Grund der dem Client bei jedem Login-Fehlschlag gemeldet wird
/// (vergebener und leerer Name werden nicht unterschieden)
pub const LOGIN_FEHLSCHLAG_GRUND: &str = "Username is not valid";

/// Umrechnung des Merken-Flags in Tage (eine Woche pro Einheit)
const MERKEN_FAKTOR_TAGE: u32 = 7;

// ---------------------------------------------------------------------------
// RouterNachricht
// ---------------------------------------------------------------------------

/// Nachrichten an den Router
///
/// Auch das Oeffnen einer Verbindung laeuft durch die Queue, damit jede
/// Mutation der Verbindungstabelle vom Router-Task ausgefuehrt wird.
#[derive(Debug)]
pub enum RouterNachricht {
    /// Eine Transport-Verbindung wurde geoeffnet
    Geoeffnet {
        verbindung: ConnectionId,
        sender: mpsc::Sender<ServerEvent>,
    },
    /// Ein dekodiertes Client-Ereignis
    Eingang {
        verbindung: ConnectionId,
        ereignis: ClientEvent,
    },
}

// ---------------------------------------------------------------------------
// EventRouter
// ---------------------------------------------------------------------------

/// Zentraler Event-Router
///
/// Besitzt Registry und Broadcaster exklusiv. Kein Fehler ist fatal:
/// Fehlschlaege betreffen genau ein Ereignis und werden hoechstens der
/// ausloesenden Verbindung gemeldet.
pub struct EventRouter {
    registry: SessionRegistry,
    broadcaster: EventBroadcaster,
}

impl EventRouter {
    /// Erstellt einen neuen Router mit leerer Registry
    pub fn neu() -> Self {
        Self {
            registry: SessionRegistry::neu(),
            broadcaster: EventBroadcaster::neu(),
        }
    }

    /// Verarbeitet Nachrichten bis die Queue geschlossen wird
    pub async fn starten(mut self, mut eingang: mpsc::Receiver<RouterNachricht>) {
        tracing::info!("Event-Router gestartet");
        while let Some(nachricht) = eingang.recv().await {
            self.verarbeiten(nachricht);
        }
        tracing::info!("Event-Router beendet");
    }

    /// Verarbeitet eine einzelne Nachricht bis zum Abschluss
    pub fn verarbeiten(&mut self, nachricht: RouterNachricht) {
        match nachricht {
            RouterNachricht::Geoeffnet { verbindung, sender } => {
                self.broadcaster.registrieren(verbindung, sender);
                tracing::info!(
                    verbindung = %verbindung,
                    offen = self.broadcaster.anzahl(),
                    "Neue Verbindung"
                );
            }
            RouterNachricht::Eingang { verbindung, ereignis } => {
                self.ereignis_verarbeiten(verbindung, ereignis);
            }
        }
    }

    fn ereignis_verarbeiten(&mut self, verbindung: ConnectionId, ereignis: ClientEvent) {
        match ereignis {
            ClientEvent::Validate { token } => self.validieren(verbindung, token),
            ClientEvent::Login { username, remember } => {
                self.anmelden(verbindung, username, remember)
            }
            ClientEvent::JoinChatroom { token } => self.chatraum_beitreten(verbindung, token),
            ClientEvent::SendServerMessage { token, message } => {
                self.nachricht_weiterleiten(verbindung, token, message)
            }
            ClientEvent::Logout { token } => self.abmelden(verbindung, token),
            ClientEvent::Disconnecting => self.trennen(verbindung),
        }
    }

    // -----------------------------------------------------------------------
    // Ereignis-Handler
    // -----------------------------------------------------------------------

    /// Token-Pruefung beim Seitenaufruf
    ///
    /// Bei gueltigem Token wird die Verbindung neu gebunden (Reconnect) und
    /// der Client zum Chat geleitet; der Praesenz-Zustand haengt an der
    /// Session und bleibt dabei unveraendert. Bei ungueltigem Token wird
    /// die Registry nicht angefasst.
    fn validieren(&mut self, verbindung: ConnectionId, token: SessionToken) {
        let zustand = match self.registry.sitzung_pruefen(&token) {
            Ok(session) => Some(session.zustand()),
            Err(fehler) => {
                tracing::info!(verbindung = %verbindung, fehler = %fehler, "Validierung fehlgeschlagen");
                None
            }
        };

        match zustand {
            Some(zustand) => {
                self.registry.verbindung_binden(&token, verbindung);
                tracing::info!(
                    verbindung = %verbindung,
                    zustand = %zustand,
                    "Validierung erfolgreich"
                );
                self.broadcaster
                    .an_verbindung_senden(&verbindung, ServerEvent::redirect(RedirectZiel::Chat, ""));
            }
            None => {
                self.broadcaster
                    .an_verbindung_senden(&verbindung, ServerEvent::redirect(RedirectZiel::Login, ""));
            }
        }
    }

    /// Login-Versuch
    ///
    /// `remember` ist das Merken-Flag des Clients; `exdays` ergibt sich als
    /// `remember * 7` und bestimmt den gespeicherten Ablaufzeitpunkt sowie
    /// die Cookie-Lebensdauer in der Antwort.
    fn anmelden(&mut self, verbindung: ConnectionId, username: String, remember: u32) {
        if let Err(fehler) = self.registry.name_pruefen(&username) {
            tracing::info!(
                verbindung = %verbindung,
                username = %username,
                fehler = %fehler,
                "Login abgelehnt"
            );
            self.broadcaster.an_verbindung_senden(
                &verbindung,
                ServerEvent::login_fehlschlag(LOGIN_FEHLSCHLAG_GRUND),
            );
            return;
        }

        let exdays = remember.saturating_mul(MERKEN_FAKTOR_TAGE);
        let token = self.registry.erstellen(&username, exdays);
        self.registry.verbindung_binden(&token, verbindung);

        tracing::info!(
            verbindung = %verbindung,
            username = %username,
            aktive = self.registry.anzahl(),
            "Login erfolgreich"
        );
        self.broadcaster
            .an_verbindung_senden(&verbindung, ServerEvent::login_erfolg(token, exdays));
    }

    /// Chatraum betreten
    fn chatraum_beitreten(&mut self, verbindung: ConnectionId, token: SessionToken) {
        let username = match self.registry.sitzung_pruefen(&token) {
            Ok(session) => session.username.clone(),
            Err(fehler) => {
                tracing::info!(verbindung = %verbindung, fehler = %fehler, "Chatraum-Beitritt abgelehnt");
                self.broadcaster
                    .an_verbindung_senden(&verbindung, ServerEvent::redirect(RedirectZiel::Login, ""));
                return;
            }
        };

        self.registry.verbindung_binden(&token, verbindung);
        self.registry.chatraum_setzen(&token, true);

        tracing::info!(verbindung = %verbindung, username = %username, "Chatraum betreten");
        self.broadcaster.an_alle_senden(ServerEvent::nachricht(
            format!("{username} has joined the chat!"),
            SERVER_ABSENDER,
        ));
    }

    /// Nachricht an alle verteilen
    ///
    /// Ein ungueltiges Token verwirft die Nachricht kommentarlos – es geht
    /// kein Ereignis an den Absender zurueck.
    fn nachricht_weiterleiten(
        &mut self,
        verbindung: ConnectionId,
        token: SessionToken,
        message: String,
    ) {
        let username = match self.registry.sitzung_pruefen(&token) {
            Ok(session) => session.username.clone(),
            Err(fehler) => {
                tracing::debug!(
                    verbindung = %verbindung,
                    fehler = %fehler,
                    "Nachricht mit ungueltigem Token verworfen"
                );
                return;
            }
        };

        tracing::debug!(verbindung = %verbindung, username = %username, "Nachricht verteilt");
        self.broadcaster
            .an_alle_senden(ServerEvent::nachricht(message, username));
    }

    /// Session beenden
    ///
    /// Der Redirect zur Login-Seite geht immer an den Aufrufer, unabhaengig
    /// davon ob das Token gueltig war.
    fn abmelden(&mut self, verbindung: ConnectionId, token: SessionToken) {
        let username = self
            .registry
            .sitzung_pruefen(&token)
            .map(|session| session.username.clone())
            .ok();

        if let Some(username) = username {
            self.broadcaster.an_alle_senden(ServerEvent::nachricht(
                format!("{username} has left the chat"),
                SERVER_ABSENDER,
            ));
            self.registry.entfernen(&token);
            tracing::info!(
                verbindung = %verbindung,
                username = %username,
                aktive = self.registry.anzahl(),
                "Logout"
            );
        }

        self.broadcaster
            .an_verbindung_senden(&verbindung, ServerEvent::redirect(RedirectZiel::Login, ""));
    }

    /// Transport-Trennung
    ///
    /// Die Session bleibt bestehen (der Client kann mit seinem Token
    /// zurueckkehren); nur das Chatraum-Flag wird geloescht und der
    /// Abschied angesagt falls die Session im Chatraum war.
    fn trennen(&mut self, verbindung: ConnectionId) {
        tracing::debug!(
            verbindung = %verbindung,
            zustand = %self.registry.zustand_von_verbindung(&verbindung),
            "Verbindung wird getrennt"
        );

        let im_chatraum = match self.registry.verbindung_pruefen(&verbindung) {
            Ok(session) if session.im_chatraum => {
                Some((session.token.clone(), session.username.clone()))
            }
            Ok(_) => None,
            Err(fehler) => {
                tracing::debug!(verbindung = %verbindung, fehler = %fehler, "Trennung ohne Session");
                None
            }
        };

        if let Some((token, username)) = im_chatraum {
            self.registry.chatraum_setzen(&token, false);
            self.broadcaster.an_alle_senden(ServerEvent::nachricht(
                format!("{username} has left the chat."),
                SERVER_ABSENDER,
            ));
            tracing::info!(verbindung = %verbindung, username = %username, "Chatraum beim Trennen verlassen");
        }

        self.broadcaster.entfernen(&verbindung);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
