//! Alert notifications for sites classified as dusty.
//!
//! [`AlertMessenger`] is the delivery seam. [`smtp::SmtpAlertMessenger`]
//! sends email through a STARTTLS relay, [`LogAlertMessenger`] only logs
//! what would have been sent.

pub mod error;
pub mod smtp;

use async_trait::async_trait;
use log::info;
use pds_data::alert::{AlertDecision, ClassificationPolicy, DUST_ALERT_THRESHOLD};
use pds_sentinel::{DateWindow, Location};

pub use error::{NotifyError, Result};

/// Everything a recipient needs to act on a dust alert.
#[derive(Debug, Clone, PartialEq)]
pub struct DustAlert {
    pub site: Location,
    pub window: DateWindow,
    pub decision: AlertDecision,
    pub policy: ClassificationPolicy,
}

impl DustAlert {
    pub fn subject(&self) -> String {
        format!(
            "Dust alert: {:.1}% soiling at {}",
            self.decision.soiling_percent,
            self.site.display_name()
        )
    }

    pub fn body(&self) -> String {
        format!(
            "Panel site: {}\n\
             Coordinates: {:.5}, {:.5}\n\
             Period: {} to {}\n\
             Estimated soiling ({}): {:.1}%\n\
             Alert threshold: {:.0}%\n\
             \n\
             The panels look dusty. Please schedule a cleaning.\n",
            self.site.display_name(),
            self.site.latitude,
            self.site.longitude,
            self.window.start(),
            self.window.end(),
            self.policy,
            self.decision.soiling_percent,
            DUST_ALERT_THRESHOLD,
        )
    }
}

#[async_trait]
pub trait AlertMessenger: Send + Sync {
    async fn send_alert(&self, alert: &DustAlert) -> Result<()>;
}

/// Dry-run messenger: logs the alert instead of sending it.
pub struct LogAlertMessenger;

#[async_trait]
impl AlertMessenger for LogAlertMessenger {
    async fn send_alert(&self, alert: &DustAlert) -> Result<()> {
        info!("[dry run] would send '{}'", alert.subject());
        for line in alert.body().lines() {
            info!("[dry run]   {}", line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pds_data::alert::PanelState;

    fn alert() -> DustAlert {
        DustAlert {
            site: Location::new(36.8381, -2.4597).with_label("Calle del Sol, Almería"),
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 8, 31).unwrap(),
            )
            .unwrap(),
            decision: AlertDecision {
                state: PanelState::Dusty,
                soiling_percent: 42.34,
            },
            policy: ClassificationPolicy::Maximum,
        }
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            alert().subject(),
            "Dust alert: 42.3% soiling at Calle del Sol, Almería"
        );
    }

    #[test]
    fn test_body_mentions_window_and_threshold() {
        let body = alert().body();
        assert!(body.contains("Period: 2023-06-01 to 2023-08-31"));
        assert!(body.contains("Estimated soiling (maximum): 42.3%"));
        assert!(body.contains("Alert threshold: 35%"));
        assert!(body.contains("36.83810, -2.45970"));
    }

    #[tokio::test]
    async fn test_log_messenger_succeeds() {
        assert!(LogAlertMessenger.send_alert(&alert()).await.is_ok());
    }
}
