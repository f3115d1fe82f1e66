//! Client-facing actor protocol
//!
//! Wire framing and message shapes for the devtools actor protocol spoken to
//! debugger clients.
//!
//! Module structure:
//! - `packet`: `<decimal length>:<JSON object>` framing over a byte stream
//! - `types`: hello announcement, tab list reply, navigation event

pub mod packet;
pub mod types;

pub use packet::{read_packet, write_packet};
pub use types::{HelloPacket, RootTraits, TabForm, TabListReply, TabNavigatedEvent};
