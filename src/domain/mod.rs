//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::SendSms;
pub use response::{OkayMarker, SendSmsResponse};
pub use validation::ValidationError;
pub use value::{
    ErrorId, GatewayErrorKind, MessageText, Msisdn, Password, PhoneNumber, Username,
};
