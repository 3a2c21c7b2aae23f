use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Successful outcome of a send call.
pub struct SendSmsResponse {
    /// Remaining account credit as reported by the gateway, when present.
    pub credit: Option<String>,
    /// One `<okay .../>` marker per accepted submission.
    pub okays: Vec<OkayMarker>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single `<okay id="..." notiflink="..."/>` marker from the response body.
pub struct OkayMarker {
    /// Raw marker id, usually `"<message id>:<msisdn>"`.
    pub id: Option<String>,
    /// Delivery status link for this submission, when present and well-formed.
    pub notiflink: Option<Url>,
}

impl OkayMarker {
    /// Gateway-side message id (the part of the marker id before `:`).
    ///
    /// Falls back to the whole id when the separator is missing.
    pub fn message_id(&self) -> Option<&str> {
        let id = self.id.as_deref()?;
        Some(id.split_once(':').map_or(id, |(message_id, _)| message_id))
    }

    /// Recipient number this marker refers to (the part of the marker id after `:`).
    pub fn msisdn(&self) -> Option<&str> {
        let id = self.id.as_deref()?;
        id.split_once(':').map(|(_, msisdn)| msisdn)
    }
}
