use crate::domain::validation::ValidationError;

use phonenumber::country;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// sms-club.ch account username.
///
/// Sent via HTTP Basic Authentication, never as a form field.
/// Invariant: non-empty after trimming.
pub struct Username(String);

impl Username {
    /// Create a validated [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated username.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// sms-club.ch account password.
///
/// Sent via HTTP Basic Authentication, never as a form field.
/// Invariant: must not be empty (whitespace is preserved and allowed).
pub struct Password(String);

impl Password {
    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text (`message`).
///
/// Invariant: non-empty after trimming. The original value (including whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// Form field name used by the gateway (`message`).
    pub const FIELD: &'static str = "message";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Recipient phone number as sent to the gateway (`recipient`).
///
/// Invariant: non-empty after trimming. This type does not normalize; if you want E.164
/// normalization, parse into [`PhoneNumber`] and convert it into [`Msisdn`].
pub struct Msisdn(String);

impl Msisdn {
    /// Form field name used by the gateway (`recipient`).
    pub const FIELD: &'static str = "recipient";

    /// Create a validated (non-empty) recipient number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw (trimmed) value as supplied.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl From<PhoneNumber> for Msisdn {
    /// Convert an already-parsed phone number to its normalized E.164 form.
    fn from(value: PhoneNumber) -> Self {
        Self(value.e164)
    }
}

#[derive(Debug, Clone)]
/// Parsed phone number with an E.164 representation.
///
/// Equality, ordering, and hashing are based on the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
    parsed: phonenumber::PhoneNumber,
}

impl PhoneNumber {
    /// Form field name used by the gateway (`recipient`).
    pub const FIELD: &'static str = "recipient";

    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix
    /// (for a Swiss subscriber base that is usually `country::Id::CH`).
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164, parsed })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation.
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// The parsed phone number from the `phonenumber` crate.
    pub fn parsed(&self) -> &phonenumber::PhoneNumber {
        &self.parsed
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

impl std::cmp::PartialOrd for PhoneNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for PhoneNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.e164.cmp(&other.e164)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Identifier carried by a gateway `<error id="..."/>` marker.
///
/// The raw id is preserved as-is; [`ErrorId::kind`] maps it onto the known
/// failure classes.
pub struct ErrorId(String);

impl ErrorId {
    /// Id prefix the gateway uses for recipient problems (`recipient.invalid`, ...).
    pub const RECIPIENT_PREFIX: &'static str = "recipient.";
    /// Id prefix the gateway uses for message-text problems (`message.empty`, ...).
    pub const MESSAGE_PREFIX: &'static str = "message.";
    /// Id the gateway reports when the same message was already submitted.
    pub const DUPLICATE_SMS: &'static str = "duplicate_sms";

    /// Create a validated [`ErrorId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "error id" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify this id into a known failure class.
    pub fn kind(&self) -> GatewayErrorKind {
        if self.0.starts_with(Self::RECIPIENT_PREFIX) {
            GatewayErrorKind::Recipient
        } else if self.0.starts_with(Self::MESSAGE_PREFIX) {
            GatewayErrorKind::Message
        } else if self.0 == Self::DUPLICATE_SMS {
            GatewayErrorKind::DuplicateMessage
        } else {
            GatewayErrorKind::Other
        }
    }
}

impl std::fmt::Display for ErrorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Failure classes derived from a gateway error id.
pub enum GatewayErrorKind {
    /// A recipient number was rejected (`recipient.*`).
    Recipient,
    /// The message text was rejected (`message.*`).
    Message,
    /// The gateway refused an identical resubmission (`duplicate_sms`).
    DuplicateMessage,
    /// Any other id; treated as a generic input problem.
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_newtypes_trim_or_validate() {
        let username = Username::new(" hb ").unwrap();
        assert_eq!(username.as_str(), "hb");
        assert!(Username::new("  ").is_err());

        let password = Password::new(" secret ").unwrap();
        assert_eq!(password.as_str(), " secret ");
        assert!(Password::new("").is_err());

        let msg = MessageText::new(" hi ").unwrap();
        assert_eq!(msg.as_str(), " hi ");
        assert!(MessageText::new("  ").is_err());

        let msisdn = Msisdn::new(" +41796481111 ").unwrap();
        assert_eq!(msisdn.raw(), "+41796481111");
        assert!(Msisdn::new("").is_err());
    }

    #[test]
    fn phone_number_parsing_and_equality_use_e164() {
        let p1 = PhoneNumber::parse(None, "+41796481111").unwrap();
        let p2 = PhoneNumber::parse(None, "+41 79 648 11 11").unwrap();
        assert_eq!(p1, p2);
        assert_eq!(p1.e164(), "+41796481111");
        assert_eq!(p1.raw(), "+41796481111");

        let msisdn: Msisdn = p1.clone().into();
        assert_eq!(msisdn.raw(), "+41796481111");
        assert!(PhoneNumber::parse(None, "not-a-number").is_err());
    }

    #[test]
    fn phone_number_parses_with_default_region() {
        let pn = PhoneNumber::parse(Some(phonenumber::country::Id::CH), " 079 648 11 11 ").unwrap();
        assert_eq!(pn.e164(), "+41796481111");
    }

    #[test]
    fn error_id_classifies_by_prefix() {
        let id = ErrorId::new("recipient.invalid").unwrap();
        assert_eq!(id.kind(), GatewayErrorKind::Recipient);

        let id = ErrorId::new("message.empty").unwrap();
        assert_eq!(id.kind(), GatewayErrorKind::Message);

        let id = ErrorId::new("duplicate_sms").unwrap();
        assert_eq!(id.kind(), GatewayErrorKind::DuplicateMessage);

        let id = ErrorId::new("account.locked").unwrap();
        assert_eq!(id.kind(), GatewayErrorKind::Other);
    }

    #[test]
    fn error_id_trims_and_rejects_empty() {
        let id = ErrorId::new(" message.too_long ").unwrap();
        assert_eq!(id.as_str(), "message.too_long");
        assert_eq!(id.to_string(), "message.too_long");
        assert!(ErrorId::new("   ").is_err());
    }
}
