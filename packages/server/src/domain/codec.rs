//! Wire codec seam.

use super::{
    entity::{ClientIntent, RoomMessage, Session},
    error::CodecError,
};

/// Translates between domain values and the text frames carried by a transport.
///
/// The coordinator never touches a serialization format directly; the JSON
/// implementation lives in the infrastructure layer.
pub trait WireCodec: Send + Sync {
    /// Decode an inbound frame into a client intent
    fn decode_intent(&self, payload: &str) -> Result<ClientIntent, CodecError>;

    /// Encode an outbound room event
    fn encode_message(&self, message: &RoomMessage) -> Result<String, CodecError>;

    /// Encode an error addressed to a single connection
    fn encode_error(&self, code: &str, message: &str) -> Result<String, CodecError>;

    /// Serialize a session for attachment to its transport
    fn encode_session(&self, session: &Session) -> Result<String, CodecError>;

    /// Read a session back from a transport attachment
    fn decode_session(&self, attachment: &str) -> Result<Session, CodecError>;
}
