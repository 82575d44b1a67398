//! plauder-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und verdrahtet Router und TCP-Listener.

pub mod config;

use anyhow::Result;
use config::ServerConfig;
use plauder_signaling::router::{EventRouter, RouterNachricht};
use plauder_signaling::tcp::ChatServer;
use std::net::SocketAddr;
use tokio::sync::{mpsc, watch};

/// Groesse der Router-Queue (alle Verbindungen zusammen)
const ROUTER_QUEUE_GROESSE: usize = 1024;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Event-Router-Task starten (besitzt Registry + Broadcaster)
    /// 2. TCP-Listener binden und starten
    /// 3. Auf Ctrl-C warten, dann Shutdown signalisieren
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %self.config.tcp_bind_adresse(),
            "Server startet"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (router_tx, router_rx) = mpsc::channel::<RouterNachricht>(ROUTER_QUEUE_GROESSE);

        let router_task = tokio::spawn(EventRouter::neu().starten(router_rx));

        let adresse: SocketAddr = self.config.tcp_bind_adresse().parse()?;
        let listener = ChatServer::binden(router_tx, adresse).await?;
        let listener_task = tokio::spawn(listener.starten(shutdown_rx));

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");

        let _ = shutdown_tx.send(true);
        let _ = listener_task.await;
        // Mit dem Listener fallen alle Router-Sender zu; der Router endet
        // sobald die letzte Verbindung abgemeldet ist
        let _ = router_task.await;

        Ok(())
    }
}
