use bytes::Bytes;

/// ResponseSink is the port through which a dispatched response leaves the core.
///
/// The transport adapter implements it for whatever it writes to the wire.
/// `send` takes `self` by value, so a sink can be written at most once.
pub trait ResponseSink {
    /// What the transport gets back after the write (an HTTP response, `()`...).
    type Output;

    /// Write the final status, content type, extra headers and body.
    fn send(
        self,
        status: u16,
        content_type: &str,
        headers: &[(String, String)],
        body: Bytes,
    ) -> Self::Output;
}
