//! Typed Rust client and messaging connector for the sms-club.ch HTTP gateway.
//!
//! The crate is layered: a domain layer of strong types, a transport layer for the
//! form encoding and the marker-based reply format, a client layer orchestrating
//! requests, and a connector layer exposing the settings/status/balance surface a
//! host application plugs in.
//!
//! ```rust,no_run
//! use smsclub::{Credentials, MessageText, Msisdn, SendSms, SmsClubClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smsclub::SmsClubError> {
//!     let client = SmsClubClient::new(Credentials::new("user", "secret")?);
//!     let recipient = Msisdn::new("+41796481111")?;
//!     let msg = MessageText::new("hello")?;
//!     let response = client.send_sms(SendSms::to_one(recipient, msg)).await?;
//!     println!("credit left: {:?}", response.credit);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod connector;
pub mod domain;
mod transport;

pub use client::{Credentials, SmsClubClient, SmsClubClientBuilder, SmsClubError};
pub use connector::{
    Capabilities, ConnectorError, ConnectorSettings, ConnectorSpec, ConnectorStatus,
    SmsClubConnector, SubConnectorSpec,
};
pub use domain::{
    ErrorId, GatewayErrorKind, MessageText, Msisdn, OkayMarker, Password, PhoneNumber, SendSms,
    SendSmsResponse, Username, ValidationError,
};
