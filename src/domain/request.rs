use crate::domain::validation::ValidationError;
use crate::domain::value::{MessageText, Msisdn};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A prepared send request: one message text for one or more recipients.
///
/// All recipients are submitted in a single gateway call (`multimessage` mode).
pub struct SendSms {
    recipients: Vec<Msisdn>,
    message: MessageText,
}

impl SendSms {
    /// Build a request for several recipients.
    ///
    /// Fails when `recipients` is empty.
    pub fn to_many(
        recipients: Vec<Msisdn>,
        message: MessageText,
    ) -> Result<Self, ValidationError> {
        if recipients.is_empty() {
            return Err(ValidationError::Empty {
                field: Msisdn::FIELD,
            });
        }
        Ok(Self {
            recipients,
            message,
        })
    }

    /// Build a request for a single recipient.
    pub fn to_one(recipient: Msisdn, message: MessageText) -> Self {
        Self {
            recipients: vec![recipient],
            message,
        }
    }

    /// Recipients in submission order.
    pub fn recipients(&self) -> &[Msisdn] {
        &self.recipients
    }

    /// The message text.
    pub fn message(&self) -> &MessageText {
        &self.message
    }
}
