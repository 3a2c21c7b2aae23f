//! Transport layer: wire-format details of the send endpoint.

mod send_sms;

pub use send_sms::{SendSmsReply, decode_send_sms_response, encode_send_sms_form};
