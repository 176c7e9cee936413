//! Wire protocol: JSON message shapes, the notification/reply codec and the
//! local turn counter.

pub mod codec;
pub mod messages;
pub mod sequence;

pub use codec::{decode_notification, decode_response, encode_response, DecodeError};
pub use messages::{ProtocolVariant, Response};
pub use sequence::TurnCounter;
