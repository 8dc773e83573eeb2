use super::Envelope;

/// Encode an envelope into its JSON wire frame.
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(envelope)
}

/// Decode a wire frame into an envelope.
///
/// Missing required fields fail the decode; unknown top-level fields are
/// ignored.
pub fn decode(frame: &[u8]) -> Result<Envelope, serde_json::Error> {
    serde_json::from_slice(frame)
}
