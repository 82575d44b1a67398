//! plauder-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert alle Ereignistypen die zwischen Client und
//! Server ausgetauscht werden, sowie das Wire-Format (laengen-praefixierte
//! JSON-Frames).

pub mod events;
pub mod wire;

pub use events::{ClientEvent, RedirectZiel, ServerEvent};
pub use wire::FrameCodec;
