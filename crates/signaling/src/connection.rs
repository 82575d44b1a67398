//! Client-Connection – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede TCP-Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Der Task dekodiert eingehende Frames und reicht sie mit
//! seiner ConnectionId an den Event-Router weiter; ausgehende Ereignisse
//! kommen ueber die eigene Send-Queue vom Router zurueck.
//!
//! Beim Verbindungsende (Stream-Ende, Lesefehler oder Shutdown) wird dem
//! Router genau einmal `disconnecting` gemeldet – auch dann wenn der
//! Client das Ereignis selbst geschickt hat.

use futures_util::{SinkExt, StreamExt};
use plauder_core::ConnectionId;
use plauder_protocol::events::{ClientEvent, ServerEvent};
use plauder_protocol::wire::FrameCodec;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_util::codec::Framed;

use crate::broadcast::SEND_QUEUE_GROESSE;
use crate::router::RouterNachricht;

/// Verarbeitet eine einzelne TCP-Verbindung
///
/// Liest Frames via `FrameCodec`, reicht Ereignisse an den Router weiter
/// und schreibt Antworten und Broadcasts zurueck. Laeuft in einem eigenen
/// tokio-Task.
pub struct ClientConnection {
    verbindung: ConnectionId,
    router_tx: mpsc::Sender<RouterNachricht>,
    peer_addr: SocketAddr,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection mit frischer ConnectionId
    pub fn neu(router_tx: mpsc::Sender<RouterNachricht>, peer_addr: SocketAddr) -> Self {
        Self {
            verbindung: ConnectionId::new(),
            router_tx,
            peer_addr,
        }
    }

    /// Gibt die ConnectionId dieser Verbindung zurueck
    pub fn verbindung(&self) -> ConnectionId {
        self.verbindung
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Diese Methode laeuft bis die Verbindung getrennt wird oder ein
    /// Shutdown-Signal eingeht.
    pub async fn verarbeiten(
        self,
        stream: TcpStream,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let verbindung = self.verbindung;
        tracing::info!(peer = %self.peer_addr, verbindung = %verbindung, "Neue Verbindung");

        // Framed-Stream mit FrameCodec einrichten
        let mut framed = Framed::new(stream, FrameCodec::new());

        // Ausgehende Ereignis-Queue (Router -> TCP)
        let (sende_tx, mut sende_rx) = mpsc::channel::<ServerEvent>(SEND_QUEUE_GROESSE);
        if self
            .router_tx
            .send(RouterNachricht::Geoeffnet {
                verbindung,
                sender: sende_tx,
            })
            .await
            .is_err()
        {
            tracing::warn!(verbindung = %verbindung, "Router nicht erreichbar – Verbindung wird geschlossen");
            return;
        }

        let mut trennung_gemeldet = false;

        loop {
            tokio::select! {
                // Eingehendes Ereignis vom Client
                frame = framed.next() => {
                    match frame {
                        Some(Ok(ereignis)) => {
                            tracing::trace!(verbindung = %verbindung, ereignis = ?ereignis, "Ereignis empfangen");
                            let ist_trennung = matches!(ereignis, ClientEvent::Disconnecting);
                            if self
                                .router_tx
                                .send(RouterNachricht::Eingang { verbindung, ereignis })
                                .await
                                .is_err()
                            {
                                break;
                            }
                            if ist_trennung {
                                trennung_gemeldet = true;
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(
                                verbindung = %verbindung,
                                fehler = %e,
                                "Frame-Lesefehler"
                            );
                            break;
                        }
                        None => {
                            tracing::info!(verbindung = %verbindung, "Verbindung vom Client getrennt");
                            break;
                        }
                    }
                }

                // Ausgehendes Ereignis vom Router
                Some(ausgehend) = sende_rx.recv() => {
                    if let Err(e) = framed.send(ausgehend).await {
                        tracing::warn!(
                            verbindung = %verbindung,
                            fehler = %e,
                            "Senden fehlgeschlagen"
                        );
                        break;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(verbindung = %verbindung, "Shutdown-Signal – Verbindung wird getrennt");
                        break;
                    }
                }
            }
        }

        // Trennung genau einmal an den Router melden
        if !trennung_gemeldet {
            let _ = self
                .router_tx
                .send(RouterNachricht::Eingang {
                    verbindung,
                    ereignis: ClientEvent::Disconnecting,
                })
                .await;
        }

        tracing::info!(verbindung = %verbindung, "Verbindungs-Task beendet");
    }
}
