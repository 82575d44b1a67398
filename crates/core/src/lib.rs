//! plauder-core – Gemeinsame Typen fuer Plauder
//!
//! Enthaelt die Identifikationstypen die von allen Crates geteilt werden:
//! Verbindungs-IDs und Session-Tokens inklusive der Token-Faehigkeit
//! (Erzeugung + Wohlgeformtheits-Pruefung).

pub mod types;

pub use types::{ConnectionId, SessionToken};
