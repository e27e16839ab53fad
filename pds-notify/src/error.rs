/// Error types for alert delivery
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    /// Sender or recipient is not a valid mailbox
    #[error("Invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    /// No recipients configured
    #[error("No alert recipients configured")]
    NoRecipients,

    /// Message could not be assembled
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// Relay rejected the connection or the message
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Relay answered with a negative reply
    #[error("SMTP rejected message: {0}")]
    Rejected(String),

    /// Delivery did not finish within the configured timeout
    #[error("SMTP send timed out after {0} s")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, NotifyError>;
