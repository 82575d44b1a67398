//! TCP-Listener – Bindet Socket, akzeptiert Verbindungen
//!
//! Der `ChatServer` bindet einen TCP-Socket und startet fuer jede
//! eingehende Verbindung einen eigenen tokio-Task mit einer
//! `ClientConnection`.
//!
//! ## Concurrency-Modell
//! Die Verbindungs-Tasks halten selbst keinen geteilten Zustand; sie
//! speisen nur die Router-Queue. Saemtliche Registry- und
//! Tabellen-Mutationen fuehrt der eine Router-Task nacheinander aus.

use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};

use crate::connection::ClientConnection;
use crate::router::RouterNachricht;

/// TCP-Chat-Server
///
/// Bindet einen TCP-Socket und akzeptiert Verbindungen in einer Loop.
/// Das Binden ist vom Starten getrennt, damit Tests Port 0 verwenden und
/// die tatsaechliche Adresse abfragen koennen.
pub struct ChatServer {
    listener: TcpListener,
    router_tx: mpsc::Sender<RouterNachricht>,
}

impl ChatServer {
    /// Bindet den TCP-Socket und erstellt den Server
    pub async fn binden(
        router_tx: mpsc::Sender<RouterNachricht>,
        bind_addr: SocketAddr,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(bind_addr).await?;
        tracing::info!(adresse = %listener.local_addr()?, "TCP Chat-Server gebunden");
        Ok(Self {
            listener,
            router_tx,
        })
    }

    /// Gibt die tatsaechlich gebundene Adresse zurueck
    pub fn lokale_adresse(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Akzeptiert Verbindungen bis `shutdown_rx` ein `true`-Signal empfaengt
    pub async fn starten(self, mut shutdown_rx: watch::Receiver<bool>) -> io::Result<()> {
        loop {
            tokio::select! {
                // Neue eingehende Verbindung
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            tracing::debug!(peer = %peer_addr, "Verbindung akzeptiert");

                            let verbindung = ClientConnection::neu(
                                self.router_tx.clone(),
                                peer_addr,
                            );
                            let shutdown_rx_clone = shutdown_rx.clone();

                            tokio::spawn(async move {
                                verbindung.verarbeiten(stream, shutdown_rx_clone).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        }
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Chat-Server: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        tracing::info!("TCP Chat-Server gestoppt");
        Ok(())
    }
}
