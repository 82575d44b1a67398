//! plauder-registry – Session- und Praesenz-Registry
//!
//! Der autoritative Speicher aller Identitaets-/Session-Daten. Bindet
//! durable Tokens an Anzeigenamen und an die aktuell lebende Verbindung,
//! erzwingt Namens-Eindeutigkeit beim Login und traegt den
//! Praesenz-Zustand (angemeldet / im Chatraum) ueber Reconnects hinweg.
//!
//! Die Registry ist bewusst ein einfacher Wert ohne innere Locks: alle
//! Mutationen laufen durch den Event-Router, der sie strikt nacheinander
//! ausfuehrt (siehe plauder-signaling).

pub mod error;
pub mod session;

pub use error::{RegistryFehler, RegistryResult};
pub use session::{PraesenzZustand, Session, SessionRegistry};
