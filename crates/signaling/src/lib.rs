//! plauder-signaling – Verbindungs- und Broadcast-Service
//!
//! Dieser Crate implementiert den zustandsbehafteten Kern des Chat-Servers:
//! er nimmt TCP-Verbindungen an, dekodiert Client-Ereignisse, fuehrt die
//! Session-/Praesenz-Uebergaenge aus und verteilt Broadcasts an alle
//! verbundenen Clients.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (ChatServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |  dekodiert Frames, meldet Trennung genau einmal
//!     |
//!     v  eine mpsc-Queue
//! EventRouter (ein einziger Task)
//!     |  besitzt SessionRegistry + EventBroadcaster exklusiv,
//!     |  verarbeitet Ereignisse strikt nacheinander
//!     |
//!     +-- validate / login / joinChatroom / sendServerMessage /
//!         logout / disconnecting
//!
//! EventBroadcaster – Verbindungstabelle + Fan-out an alle
//! ```
//!
//! ## Concurrency-Modell
//! Die Eindeutigkeits-Invarianten der Registry sind check-then-act ueber
//! die gesamte Session-Menge und daher nicht unter nebenlaeufiger
//! Verzahnung sicher. Saemtliche Mutationen von Registry und
//! Verbindungstabelle laufen deshalb durch die eine Router-Queue und
//! werden vom Router-Task nacheinander bis zum Abschluss ausgefuehrt.
//! Ereignisse derselben Verbindung bleiben dabei in Eintreffreihenfolge,
//! und alle Clients beobachten Broadcasts in derselben relativen Ordnung.

pub mod broadcast;
pub mod connection;
pub mod router;
pub mod tcp;

// Bequeme Re-Exporte
pub use broadcast::EventBroadcaster;
pub use connection::ClientConnection;
pub use router::{EventRouter, RouterNachricht};
pub use tcp::ChatServer;
