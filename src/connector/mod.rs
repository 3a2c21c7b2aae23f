//! Connector layer: the host-facing integration surface (settings, status, balance).

use serde::{Deserialize, Serialize};

use crate::client::{Credentials, SmsClubClient, SmsClubError};
use crate::domain::{SendSms, SendSmsResponse};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
/// User-facing connector preferences.
///
/// The serialized field names match the preference keys of existing installations,
/// so stored settings keep deserializing across upgrades.
pub struct ConnectorSettings {
    #[serde(rename = "enable_smsclub", default)]
    pub enabled: bool,
    #[serde(rename = "user_smsclub", default)]
    pub username: String,
    #[serde(rename = "password_smsclub", default)]
    pub password: String,
}

impl ConnectorSettings {
    /// Preference key for [`ConnectorSettings::enabled`].
    pub const KEY_ENABLED: &'static str = "enable_smsclub";
    /// Preference key for [`ConnectorSettings::username`].
    pub const KEY_USERNAME: &'static str = "user_smsclub";
    /// Preference key for [`ConnectorSettings::password`].
    pub const KEY_PASSWORD: &'static str = "password_smsclub";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Lifecycle state derived from the current settings.
pub enum ConnectorStatus {
    /// The connector is switched off.
    Inactive,
    /// Switched on, but the credentials are incomplete.
    Enabled,
    /// Switched on with credentials that pass validation; sending is allowed.
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What the connector can do for the host.
pub struct Capabilities {
    pub send: bool,
    pub preferences: bool,
    pub update: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One selectable route within the connector.
pub struct SubConnectorSpec {
    pub id: String,
    pub name: String,
    /// Whether one submission may address several recipients.
    pub multi_recipients: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Descriptor the host reads to present the connector.
pub struct ConnectorSpec {
    name: String,
    author: String,
    capabilities: Capabilities,
    sub_connectors: Vec<SubConnectorSpec>,
    status: ConnectorStatus,
    balance: Option<String>,
}

impl ConnectorSpec {
    fn new() -> Self {
        Self {
            name: "sms-club.ch".to_owned(),
            author: "Synox".to_owned(),
            capabilities: Capabilities {
                send: true,
                preferences: true,
                update: true,
            },
            sub_connectors: vec![SubConnectorSpec {
                id: "sms-club.ch".to_owned(),
                name: "sms-club.ch".to_owned(),
                multi_recipients: true,
            }],
            status: ConnectorStatus::Inactive,
            balance: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn sub_connectors(&self) -> &[SubConnectorSpec] {
        &self.sub_connectors
    }

    pub fn status(&self) -> ConnectorStatus {
        self.status
    }

    /// Last credit value reported by the gateway, if any call has seen one.
    pub fn balance(&self) -> Option<&str> {
        self.balance.as_deref()
    }

    fn set_status(&mut self, status: ConnectorStatus) {
        self.status = status;
    }

    fn set_balance(&mut self, balance: Option<String>) {
        self.balance = balance;
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SmsClubConnector`].
pub enum ConnectorError {
    /// Sending was attempted while the connector is not in the ready state.
    #[error("connector is not ready to send (status: {status:?})")]
    NotReady { status: ConnectorStatus },

    /// The underlying client call failed.
    #[error("send failed: {0}")]
    Client(#[from] SmsClubError),
}

#[derive(Debug, Clone)]
/// Stateful connector wrapping [`SmsClubClient`] for a host application.
///
/// The connector derives its lifecycle status from the settings, refuses to send
/// unless ready, and records the gateway-reported credit as the account balance
/// after every send, including rejected ones.
pub struct SmsClubConnector {
    settings: ConnectorSettings,
    spec: ConnectorSpec,
    endpoint: Option<String>,
}

impl SmsClubConnector {
    /// Create a connector with the given settings.
    pub fn new(settings: ConnectorSettings) -> Self {
        let mut connector = Self {
            settings,
            spec: ConnectorSpec::new(),
            endpoint: None,
        };
        connector.refresh_status();
        connector
    }

    /// Create a connector that posts to a custom endpoint instead of the production
    /// gateway.
    pub fn with_endpoint(settings: ConnectorSettings, endpoint: impl Into<String>) -> Self {
        let mut connector = Self::new(settings);
        connector.endpoint = Some(endpoint.into());
        connector
    }

    pub fn spec(&self) -> &ConnectorSpec {
        &self.spec
    }

    pub fn settings(&self) -> &ConnectorSettings {
        &self.settings
    }

    /// Shortcut for [`ConnectorSpec::balance`].
    pub fn balance(&self) -> Option<&str> {
        self.spec.balance()
    }

    /// Replace the settings and re-derive the lifecycle status.
    pub fn update_settings(&mut self, settings: ConnectorSettings) {
        self.settings = settings;
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        self.spec.set_status(derive_status(&self.settings));
    }

    /// Send an SMS through the gateway.
    ///
    /// Fails with [`ConnectorError::NotReady`] unless the status is
    /// [`ConnectorStatus::Ready`]. The reported credit is recorded as the new
    /// balance whether the gateway accepted or rejected the submission.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "SmsClubConnector::send",
            skip_all,
            fields(recipients = request.recipients().len())
        )
    )]
    pub async fn send(&mut self, request: SendSms) -> Result<SendSmsResponse, ConnectorError> {
        if self.spec.status() != ConnectorStatus::Ready {
            return Err(ConnectorError::NotReady {
                status: self.spec.status(),
            });
        }

        let credentials = Credentials::new(
            self.settings.username.as_str(),
            self.settings.password.as_str(),
        )
        .map_err(SmsClubError::Validation)?;

        let mut builder = SmsClubClient::builder(credentials);
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint.as_str());
        }
        let client = builder.build()?;

        match client.send_sms(request).await {
            Ok(response) => {
                self.record_credit(response.credit.as_deref());
                Ok(response)
            }
            Err(err) => {
                self.record_credit(err.credit());
                Err(ConnectorError::Client(err))
            }
        }
    }

    /// Fetch pending delivery status updates.
    ///
    /// The gateway pushes delivery status through the per-message `notiflink` URLs
    /// instead of offering a polling API, so there is nothing to fetch here.
    pub async fn update(&mut self) -> Result<(), ConnectorError> {
        Ok(())
    }

    fn record_credit(&mut self, credit: Option<&str>) {
        if let Some(credit) = credit {
            self.spec.set_balance(Some(credit.to_owned()));
        }
    }
}

fn derive_status(settings: &ConnectorSettings) -> ConnectorStatus {
    if !settings.enabled {
        return ConnectorStatus::Inactive;
    }
    if Credentials::new(settings.username.as_str(), settings.password.as_str()).is_ok() {
        ConnectorStatus::Ready
    } else {
        ConnectorStatus::Enabled
    }
}
