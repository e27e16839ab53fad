use crate::series::SoilingSeries;
use log::{debug, info};
use pds_sentinel::Sample;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Soiling percentage above which a site is reported as dusty.
pub const DUST_ALERT_THRESHOLD: f64 = 35.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelState {
    Clean,
    Dusty,
}

impl fmt::Display for PanelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelState::Clean => write!(f, "CLEAN"),
            PanelState::Dusty => write!(f, "DUSTY"),
        }
    }
}

/// Which series statistic is compared against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationPolicy {
    /// Any point above the threshold makes the site dusty.
    #[default]
    Maximum,
    /// Only the most recent pass counts.
    Latest,
    /// Average over the window.
    Mean,
}

impl FromStr for ClassificationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maximum" | "max" => Ok(ClassificationPolicy::Maximum),
            "latest" => Ok(ClassificationPolicy::Latest),
            "mean" => Ok(ClassificationPolicy::Mean),
            other => Err(format!(
                "unknown policy '{}', expected maximum, latest or mean",
                other
            )),
        }
    }
}

impl fmt::Display for ClassificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationPolicy::Maximum => write!(f, "maximum"),
            ClassificationPolicy::Latest => write!(f, "latest"),
            ClassificationPolicy::Mean => write!(f, "mean"),
        }
    }
}

/// Verdict for a site plus the percentage that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlertDecision {
    pub state: PanelState,
    pub soiling_percent: f64,
}

impl AlertDecision {
    pub fn is_dusty(&self) -> bool {
        self.state == PanelState::Dusty
    }
}

/// Strictly above the threshold is dusty; exactly at it is still clean.
pub fn state_for(soiling_percent: f64) -> PanelState {
    if soiling_percent > DUST_ALERT_THRESHOLD {
        PanelState::Dusty
    } else {
        PanelState::Clean
    }
}

/// Classify by series maximum: dusty if any point exceeds the threshold.
pub fn classify(series: &SoilingSeries) -> AlertDecision {
    classify_with(series, ClassificationPolicy::Maximum)
}

pub fn classify_with(series: &SoilingSeries, policy: ClassificationPolicy) -> AlertDecision {
    let soiling_percent = match policy {
        ClassificationPolicy::Maximum => series.peak().soiling_percent,
        ClassificationPolicy::Latest => series.latest().soiling_percent,
        ClassificationPolicy::Mean => series.mean_percent(),
    };
    let state = state_for(soiling_percent);
    debug!(
        "{} soiling {:.1}% vs threshold {:.1}% -> {}",
        policy, soiling_percent, DUST_ALERT_THRESHOLD, state
    );
    AlertDecision {
        state,
        soiling_percent,
    }
}

/// Outcome of assessing one site over one window.
#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    /// No sample had a usable index value; nothing was classified.
    NoData { samples: usize },
    Assessed {
        series: SoilingSeries,
        decision: AlertDecision,
    },
}

/// Build the soiling series from raw samples and classify it.
///
/// Returns `Assessment::NoData` without classifying when no sample is usable.
pub fn assess(samples: &[Sample], policy: ClassificationPolicy) -> Assessment {
    match SoilingSeries::from_samples(samples) {
        Err(no_data) => {
            info!("{}", no_data);
            Assessment::NoData {
                samples: no_data.total,
            }
        }
        Ok(series) => {
            let decision = classify_with(&series, policy);
            Assessment::Assessed { series, decision }
        }
    }
}
