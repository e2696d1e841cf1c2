//! Tracker snapshots loaded from JSON
//!
//! A dataset holds the in-memory lists behind the sample stock, leave
//! balance and campaign screens. All sections are optional.

use crate::error::QuantityPair;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which tracker a quantity pair belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerKind {
    Stock,
    Leave,
    Campaign,
}

impl TrackerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerKind::Stock => "stock",
            TrackerKind::Leave => "leave",
            TrackerKind::Campaign => "campaign",
        }
    }
}

/// Leave categories offered by the leave application form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Casual,
    Sick,
    Earned,
    Compensatory,
    Unpaid,
}

impl LeaveType {
    pub fn label(&self) -> &'static str {
        match self {
            LeaveType::Casual => "Casual Leave",
            LeaveType::Sick => "Sick Leave",
            LeaveType::Earned => "Earned Leave",
            LeaveType::Compensatory => "Compensatory Off",
            LeaveType::Unpaid => "Leave Without Pay",
        }
    }
}

/// Sample units on hand for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleStock {
    pub product: String,
    pub current: f64,
    pub capacity: f64,
}

/// Leave days used against the yearly entitlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeaveBalance {
    pub leave_type: LeaveType,
    pub used: f64,
    pub total: f64,
}

/// Doctors reached against a campaign target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignEngagement {
    pub name: String,
    pub reached: f64,
    pub target: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    #[serde(default)]
    pub samples: Vec<SampleStock>,
    #[serde(default)]
    pub leave: Vec<LeaveBalance>,
    #[serde(default)]
    pub campaigns: Vec<CampaignEngagement>,
}

impl SampleStock {
    pub fn quantity(&self) -> QuantityPair {
        QuantityPair::new(self.current, self.capacity)
    }

    pub fn remaining_capacity(&self) -> f64 {
        remaining(self.current, self.capacity)
    }
}

impl LeaveBalance {
    pub fn quantity(&self) -> QuantityPair {
        QuantityPair::new(self.used, self.total)
    }

    /// Days still available, never negative
    pub fn remaining(&self) -> f64 {
        remaining(self.used, self.total)
    }
}

impl CampaignEngagement {
    pub fn quantity(&self) -> QuantityPair {
        QuantityPair::new(self.reached, self.target)
    }

    pub fn remaining(&self) -> f64 {
        remaining(self.reached, self.target)
    }
}

fn remaining(current: f64, capacity: f64) -> f64 {
    let left = capacity - current;
    if left.is_finite() && left > 0.0 {
        left
    } else {
        0.0
    }
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() && self.leave.is_empty() && self.campaigns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len() + self.leave.len() + self.campaigns.len()
    }
}

/// Parse a dataset from a JSON string
pub fn parse_dataset(content: &str) -> Result<Dataset> {
    serde_json::from_str(content).context("failed to parse tracker dataset")
}

/// Load a dataset from a JSON file
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset: {}", path.display()))?;
    parse_dataset(&content).with_context(|| format!("invalid dataset in: {}", path.display()))
}
