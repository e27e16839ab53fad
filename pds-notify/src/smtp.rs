use crate::error::{NotifyError, Result};
use crate::{AlertMessenger, DustAlert};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SmtpConfig {
    /// STARTTLS relay host, e.g. "smtp-relay.brevo.com"
    pub relay: String,
    /// Submission port; the relay default (587) when absent
    pub port: Option<u16>,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub recipients: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        SmtpConfig {
            relay: String::new(),
            port: None,
            username: String::new(),
            password: String::new(),
            sender: String::new(),
            recipients: Vec::new(),
            timeout_secs: 30,
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address.parse::<Mailbox>().map_err(|e| NotifyError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// SMTP based AlertMessenger.
/// Recipients are addressed as BCC so they do not see each other.
pub struct SmtpAlertMessenger {
    config: SmtpConfig,

    from_addr: Mailbox,
    bcc_addrs: Vec<Mailbox>,
}

impl SmtpAlertMessenger {
    /// Validate addresses up front; there is no point in detecting a bad
    /// recipient only when an alert fires.
    pub fn new(config: SmtpConfig) -> Result<Self> {
        let from_addr = parse_mailbox(&config.sender)?;
        let bcc_addrs = config
            .recipients
            .iter()
            .map(|r| parse_mailbox(r))
            .collect::<Result<Vec<Mailbox>>>()?;
        if bcc_addrs.is_empty() {
            return Err(NotifyError::NoRecipients);
        }
        if config.username.is_empty() {
            warn!("SMTP username is empty; the relay will likely refuse to send");
        }
        Ok(SmtpAlertMessenger {
            config,
            from_addr,
            bcc_addrs,
        })
    }

    pub fn build_message(&self, alert: &DustAlert) -> Result<Message> {
        let mut mb = Message::builder()
            .from(self.from_addr.clone())
            .subject(alert.subject())
            .header(ContentType::TEXT_PLAIN);
        for receiver in &self.bcc_addrs {
            mb = mb.bcc(receiver.clone());
        }
        Ok(mb.body(alert.body())?)
    }
}

#[async_trait]
impl AlertMessenger for SmtpAlertMessenger {
    async fn send_alert(&self, alert: &DustAlert) -> Result<()> {
        let config = &self.config;

        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(config.relay.as_str())?
                .credentials(creds);
        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        let mailer = builder.build();

        let message = self.build_message(alert)?;
        let response = timeout(Duration::from_secs(config.timeout_secs), mailer.send(message))
            .await
            .map_err(|_| NotifyError::Timeout(config.timeout_secs))??;

        if response.is_positive() {
            info!(
                "Alert mailed to {} recipient(s) via {}",
                self.bcc_addrs.len(),
                config.relay
            );
            Ok(())
        } else {
            Err(NotifyError::Rejected(format!("{:?}", response)))
        }
    }
}
