//! Client layer: orchestrates transport calls and maps transport ↔ domain.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{
    ErrorId, GatewayErrorKind, Password, SendSms, SendSmsResponse, Username, ValidationError,
};

const DEFAULT_SEND_ENDPOINT: &str = "https://www.sms-club.ch/api/send";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        credentials: &'a Credentials,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        credentials: &'a Credentials,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .basic_auth(
                    credentials.username().as_str(),
                    Some(credentials.password().as_str()),
                )
                .form(&params)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// HTTP Basic Authentication credentials for gateway calls.
///
/// The credentials are sent in the `Authorization` header, never as form fields.
pub struct Credentials {
    username: Username,
    password: Password,
}

impl Credentials {
    /// Create validated credentials.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SmsClubClient`].
///
/// Gateway rejections ([`SmsClubError::Recipient`], [`SmsClubError::Message`],
/// [`SmsClubError::Input`]) still carry the remaining credit when the reply included
/// one; use [`SmsClubError::credit`] to read it.
pub enum SmsClubError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The server answered with an informational (1xx) status.
    #[error("unexpected HTTP status: {status}")]
    Http { status: u16 },

    /// The server rejected the credentials (HTTP 401).
    #[error("authentication rejected")]
    Password,

    /// Any other non-success HTTP status.
    #[error("server error: HTTP status {status}")]
    Server { status: u16 },

    /// The gateway rejected a recipient number (`recipient.*` error id).
    #[error("recipient rejected: {id}")]
    Recipient {
        id: ErrorId,
        credit: Option<String>,
    },

    /// The gateway rejected the message text (`message.*` or `duplicate_sms` error id).
    #[error("message text rejected: {id}")]
    Message {
        id: ErrorId,
        credit: Option<String>,
    },

    /// The gateway rejected the request for another reason; `detail` holds the error id
    /// or the raw reply body when no marker was recognized.
    #[error("request rejected: {detail:?}")]
    Input {
        detail: Option<String>,
        credit: Option<String>,
    },

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl SmsClubError {
    /// Remaining credit reported alongside the failure, when present.
    pub fn credit(&self) -> Option<&str> {
        match self {
            Self::Recipient { credit, .. }
            | Self::Message { credit, .. }
            | Self::Input { credit, .. } => credit.as_deref(),
            _ => None,
        }
    }

    /// Stable key for the failure class, suitable for localized user-facing messages.
    ///
    /// Transport and validation failures happen before the gateway is reached and
    /// have no key.
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            Self::Http { .. } => Some("error_http"),
            Self::Password => Some("error_pw"),
            Self::Server { .. } => Some("error_server"),
            Self::Recipient { .. } => Some("error_recipient"),
            Self::Message { .. } => Some("error_text"),
            Self::Input { .. } => Some("error_input"),
            Self::Transport(_) | Self::Validation(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`SmsClubClient`].
///
/// Use this when you need to customize the endpoint, timeout, user-agent, or TLS
/// verification.
pub struct SmsClubClientBuilder {
    credentials: Credentials,
    send_endpoint: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    accept_invalid_certs: bool,
}

impl SmsClubClientBuilder {
    /// Create a builder with the default endpoint and no overrides.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            send_endpoint: DEFAULT_SEND_ENDPOINT.to_owned(),
            timeout: None,
            user_agent: None,
            accept_invalid_certs: false,
        }
    }

    /// Override the send endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.send_endpoint = endpoint.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Accept TLS certificates that fail verification. Off by default.
    ///
    /// Only enable this against a test gateway with a self-signed certificate.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Build a [`SmsClubClient`].
    pub fn build(self) -> Result<SmsClubClient, SmsClubError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|err| SmsClubError::Transport(Box::new(err)))?;

        Ok(SmsClubClient {
            credentials: self.credentials,
            send_endpoint: self.send_endpoint,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// High-level sms-club.ch client.
///
/// This type orchestrates request validation, form encoding, and reply parsing.
/// By default it posts to `https://www.sms-club.ch/api/send` and authenticates every
/// call with HTTP Basic Authentication.
pub struct SmsClubClient {
    credentials: Credentials,
    send_endpoint: String,
    http: Arc<dyn HttpTransport>,
}

impl SmsClubClient {
    /// Create a client using the default endpoint.
    ///
    /// For more customization, use [`SmsClubClient::builder`].
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            send_endpoint: DEFAULT_SEND_ENDPOINT.to_owned(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> SmsClubClientBuilder {
        SmsClubClientBuilder::new(credentials)
    }

    /// Send an SMS to all recipients of the request in a single gateway call.
    ///
    /// Errors:
    /// - [`SmsClubError::Transport`] when the gateway could not be reached,
    /// - [`SmsClubError::Password`] when the credentials are rejected (HTTP 401),
    /// - [`SmsClubError::Http`] / [`SmsClubError::Server`] for other HTTP statuses,
    /// - [`SmsClubError::Recipient`] / [`SmsClubError::Message`] /
    ///   [`SmsClubError::Input`] when the gateway reports an error marker.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "SmsClubClient::send_sms",
            skip_all,
            fields(recipients = request.recipients().len())
        )
    )]
    pub async fn send_sms(&self, request: SendSms) -> Result<SendSmsResponse, SmsClubError> {
        let params = crate::transport::encode_send_sms_form(&request);

        let response = self
            .http
            .post_form(&self.send_endpoint, &self.credentials, params)
            .await
            .map_err(SmsClubError::Transport)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(status = response.status, "Gateway replied");

        match response.status {
            200 => classify_reply_body(&response.body),
            status @ 100..=199 => Err(SmsClubError::Http { status }),
            201..=299 => Err(SmsClubError::Input {
                detail: None,
                credit: None,
            }),
            401 => Err(SmsClubError::Password),
            status => Err(SmsClubError::Server { status }),
        }
    }
}

/// Map a 200 reply body onto the send outcome.
///
/// An error marker takes precedence over okay markers; a marker the error pattern
/// does not match falls through to the okay check.
fn classify_reply_body(body: &str) -> Result<SendSmsResponse, SmsClubError> {
    let body = body.trim();
    let reply = crate::transport::decode_send_sms_response(body);

    if let Some(id) = reply.error {
        #[cfg(feature = "tracing")]
        tracing::warn!(id = %id, "Gateway rejected the submission");

        return Err(match id.kind() {
            GatewayErrorKind::Recipient => SmsClubError::Recipient {
                id,
                credit: reply.credit,
            },
            GatewayErrorKind::Message | GatewayErrorKind::DuplicateMessage => {
                SmsClubError::Message {
                    id,
                    credit: reply.credit,
                }
            }
            GatewayErrorKind::Other => SmsClubError::Input {
                detail: Some(id.to_string()),
                credit: reply.credit,
            },
        });
    }

    if reply.confirmed {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            okays = reply.okays.len(),
            credit = reply.credit.as_deref(),
            "Submission confirmed"
        );

        return Ok(SendSmsResponse {
            credit: reply.credit,
            okays: reply.okays,
        });
    }

    Err(SmsClubError::Input {
        detail: Some(body.to_owned()),
        credit: reply.credit,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::domain::{MessageText, Msisdn, SendSms};

    use super::*;

    #[derive(Debug, Clone)]
    struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Debug)]
    struct FakeTransportState {
        last_url: Option<String>,
        last_auth: Option<(String, String)>,
        last_params: Vec<(String, String)>,
        response_status: u16,
        response_body: String,
    }

    impl FakeTransport {
        fn new(response_status: u16, response_body: impl Into<String>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    last_url: None,
                    last_auth: None,
                    last_params: Vec::new(),
                    response_status,
                    response_body: response_body.into(),
                })),
            }
        }

        fn last_request(&self) -> (Option<String>, Option<(String, String)>, Vec<(String, String)>)
        {
            let state = self.state.lock().unwrap();
            (
                state.last_url.clone(),
                state.last_auth.clone(),
                state.last_params.clone(),
            )
        }
    }

    impl HttpTransport for FakeTransport {
        fn post_form<'a>(
            &'a self,
            url: &'a str,
            credentials: &'a Credentials,
            params: Vec<(String, String)>,
        ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
            Box::pin(async move {
                let (status, body) = {
                    let mut state = self.state.lock().unwrap();
                    state.last_url = Some(url.to_owned());
                    state.last_auth = Some((
                        credentials.username().as_str().to_owned(),
                        credentials.password().as_str().to_owned(),
                    ));
                    state.last_params = params;
                    (state.response_status, state.response_body.clone())
                };
                Ok(HttpResponse { status, body })
            })
        }
    }

    fn assert_param(params: &[(String, String)], key: &str, value: &str) {
        assert!(
            params.iter().any(|(k, v)| k == key && v == value),
            "missing param {key}={value}; got: {params:?}"
        );
    }

    fn make_client(transport: FakeTransport) -> SmsClubClient {
        SmsClubClient {
            credentials: Credentials::new("user", "secret").unwrap(),
            send_endpoint: "https://example.invalid/api/send".to_owned(),
            http: Arc::new(transport),
        }
    }

    fn request(recipients: &[&str]) -> SendSms {
        let recipients = recipients
            .iter()
            .map(|raw| Msisdn::new(*raw).unwrap())
            .collect();
        SendSms::to_many(recipients, MessageText::new("hello").unwrap()).unwrap()
    }

    #[tokio::test]
    async fn send_sms_posts_form_with_basic_auth_and_parses_okay_reply() {
        let body = concat!(
            r#"<smsResponse credit="20000"> "#,
            r#"<okay id="53911:41796481111" notiflink="https://example.invalid/status?msgid=53911"/> "#,
            "</smsResponse>",
        );
        let transport = FakeTransport::new(200, body);
        let client = make_client(transport.clone());

        let response = client
            .send_sms(request(&["+41796481111", "0041791112233"]))
            .await
            .unwrap();

        assert_eq!(response.credit.as_deref(), Some("20000"));
        assert_eq!(response.okays.len(), 1);
        assert_eq!(response.okays[0].message_id(), Some("53911"));

        let (url, auth, params) = transport.last_request();
        assert_eq!(url.as_deref(), Some("https://example.invalid/api/send"));
        assert_eq!(auth, Some(("user".to_owned(), "secret".to_owned())));
        assert_param(&params, "multimessage", "true");
        assert_param(&params, "message", "hello");
        assert_param(&params, "recipient", "0041796481111,0041791112233");
    }

    #[tokio::test]
    async fn send_sms_maps_informational_status_to_http_error() {
        let transport = FakeTransport::new(150, "");
        let client = make_client(transport);

        let err = client.send_sms(request(&["+41796481111"])).await.unwrap_err();
        assert!(matches!(err, SmsClubError::Http { status: 150 }));
        assert_eq!(err.message_key(), Some("error_http"));
    }

    #[tokio::test]
    async fn send_sms_maps_unexpected_success_status_to_input_error() {
        let transport = FakeTransport::new(204, "");
        let client = make_client(transport);

        let err = client.send_sms(request(&["+41796481111"])).await.unwrap_err();
        assert!(matches!(
            err,
            SmsClubError::Input {
                detail: None,
                credit: None
            }
        ));
        assert_eq!(err.message_key(), Some("error_input"));
    }

    #[tokio::test]
    async fn send_sms_maps_unauthorized_to_password_error() {
        let transport = FakeTransport::new(401, "nope");
        let client = make_client(transport);

        let err = client.send_sms(request(&["+41796481111"])).await.unwrap_err();
        assert!(matches!(err, SmsClubError::Password));
        assert_eq!(err.message_key(), Some("error_pw"));
    }

    #[tokio::test]
    async fn send_sms_maps_other_statuses_to_server_error() {
        let transport = FakeTransport::new(500, "oops");
        let client = make_client(transport);

        let err = client.send_sms(request(&["+41796481111"])).await.unwrap_err();
        assert!(matches!(err, SmsClubError::Server { status: 500 }));
        assert_eq!(err.message_key(), Some("error_server"));
    }

    #[tokio::test]
    async fn send_sms_maps_recipient_error_id_and_keeps_credit() {
        let body = r#"<smsResponse credit="150"> <error id="recipient.invalid"/> </smsResponse>"#;
        let transport = FakeTransport::new(200, body);
        let client = make_client(transport);

        let err = client.send_sms(request(&["+41796481111"])).await.unwrap_err();
        match &err {
            SmsClubError::Recipient { id, credit } => {
                assert_eq!(id.as_str(), "recipient.invalid");
                assert_eq!(credit.as_deref(), Some("150"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.message_key(), Some("error_recipient"));
        assert_eq!(err.credit(), Some("150"));
    }

    #[tokio::test]
    async fn send_sms_maps_message_and_duplicate_error_ids() {
        for id in ["message.too_long", "duplicate_sms"] {
            let body = format!(r#"<error id="{id}"/>"#);
            let transport = FakeTransport::new(200, body);
            let client = make_client(transport);

            let err = client.send_sms(request(&["+41796481111"])).await.unwrap_err();
            assert!(
                matches!(err, SmsClubError::Message { .. }),
                "unexpected error for {id}: {err:?}"
            );
            assert_eq!(err.message_key(), Some("error_text"));
        }
    }

    #[tokio::test]
    async fn send_sms_maps_unknown_error_id_to_input_error() {
        let body = r#"<smsResponse credit="7"> <error id="account.locked"/> </smsResponse>"#;
        let transport = FakeTransport::new(200, body);
        let client = make_client(transport);

        let err = client.send_sms(request(&["+41796481111"])).await.unwrap_err();
        match err {
            SmsClubError::Input { detail, credit } => {
                assert_eq!(detail.as_deref(), Some("account.locked"));
                assert_eq!(credit.as_deref(), Some("7"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_sms_error_marker_takes_precedence_over_okay() {
        let body = r#"<error id="recipient.blocked"/> <okay id="1:2"/>"#;
        let transport = FakeTransport::new(200, body);
        let client = make_client(transport);

        let err = client.send_sms(request(&["+41796481111"])).await.unwrap_err();
        assert!(matches!(err, SmsClubError::Recipient { .. }));
    }

    #[tokio::test]
    async fn send_sms_unmatched_error_marker_falls_through_to_okay() {
        // No self-closing slash; the error pattern does not match this marker.
        let body = r#"<error id="recipient.invalid"></error> <okay id="1:2"/>"#;
        let transport = FakeTransport::new(200, body);
        let client = make_client(transport);

        let response = client.send_sms(request(&["+41796481111"])).await.unwrap();
        assert_eq!(response.okays.len(), 1);
    }

    #[tokio::test]
    async fn send_sms_without_markers_is_input_error_with_body() {
        let transport = FakeTransport::new(200, "  temporarily unavailable \n");
        let client = make_client(transport);

        let err = client.send_sms(request(&["+41796481111"])).await.unwrap_err();
        match err {
            SmsClubError::Input { detail, credit } => {
                assert_eq!(detail.as_deref(), Some("temporarily unavailable"));
                assert_eq!(credit, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn credentials_constructor_validates_inputs() {
        assert!(Credentials::new("", "secret").is_err());
        assert!(Credentials::new("user", "").is_err());
        assert!(Credentials::new("user", "secret").is_ok());
    }

    #[test]
    fn message_key_is_none_for_local_failures() {
        let transport_err = SmsClubError::Transport("boom".into());
        assert_eq!(transport_err.message_key(), None);
        assert_eq!(transport_err.credit(), None);

        let validation_err = SmsClubError::Validation(ValidationError::Empty { field: "x" });
        assert_eq!(validation_err.message_key(), None);
    }

    #[test]
    fn builder_overrides_are_applied() {
        let credentials = Credentials::new("user", "secret").unwrap();
        let client = SmsClubClient::builder(credentials.clone())
            .endpoint("https://example.invalid/api/send")
            .timeout(Duration::from_secs(5))
            .user_agent("smsclub-test")
            .accept_invalid_certs(true)
            .build()
            .unwrap();
        assert_eq!(client.send_endpoint, "https://example.invalid/api/send");

        let client = SmsClubClient::new(credentials);
        assert_eq!(client.send_endpoint, DEFAULT_SEND_ENDPOINT);
    }
}
