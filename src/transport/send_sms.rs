use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::domain::{ErrorId, MessageText, Msisdn, OkayMarker, SendSms};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw decoded reply, before the outcome is classified.
///
/// `credit` is extracted independently of `error`; the gateway reports the remaining
/// credit even on rejected submissions.
pub struct SendSmsReply {
    pub credit: Option<String>,
    pub error: Option<ErrorId>,
    /// Whether the body contains at least one `<okay` marker.
    pub confirmed: bool,
    pub okays: Vec<OkayMarker>,
}

pub fn encode_send_sms_form(request: &SendSms) -> Vec<(String, String)> {
    let recipient = request
        .recipients()
        .iter()
        .map(|msisdn| format_recipient(msisdn.raw()))
        .collect::<Vec<_>>()
        .join(",");

    vec![
        ("multimessage".to_owned(), "true".to_owned()),
        (
            MessageText::FIELD.to_owned(),
            request.message().as_str().to_owned(),
        ),
        (Msisdn::FIELD.to_owned(), recipient),
    ]
}

/// The gateway expects international numbers with a `00` prefix instead of `+`.
fn format_recipient(raw: &str) -> String {
    match raw.strip_prefix('+') {
        Some(rest) => format!("00{rest}"),
        None => raw.to_owned(),
    }
}

pub fn decode_send_sms_response(body: &str) -> SendSmsReply {
    static RE_ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<error id="([^"]+)"/>"#).unwrap());
    static RE_CREDIT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"credit="([0-9]+)""#).unwrap());
    static RE_OKAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"<okay\b([^>]*)>").unwrap());
    static RE_ATTR_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bid="([^"]+)""#).unwrap());
    static RE_ATTR_NOTIFLINK: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"\bnotiflink="([^"]+)""#).unwrap());

    let credit = RE_CREDIT.captures(body).map(|cap| cap[1].to_owned());
    // An unusable id (whitespace only) is treated the same as a marker the
    // pattern did not match at all.
    let error = RE_ERROR
        .captures(body)
        .and_then(|cap| ErrorId::new(&cap[1]).ok());
    let confirmed = body.contains("<okay");

    let okays = RE_OKAY
        .captures_iter(body)
        .map(|cap| {
            let attributes = &cap[1];
            OkayMarker {
                id: RE_ATTR_ID
                    .captures(attributes)
                    .map(|attr| attr[1].to_owned()),
                notiflink: RE_ATTR_NOTIFLINK
                    .captures(attributes)
                    .and_then(|attr| Url::parse(&attr[1]).ok()),
            }
        })
        .collect();

    SendSmsReply {
        credit,
        error,
        confirmed,
        okays,
    }
}
