//! Donation splitting between tutors and the platform.
//!
//! The tutor's share rate depends on its reputation tier. The platform share
//! is rounded up to the next minor unit, and the tutor receives the exact
//! remainder, so no unit is ever lost or created. Rates are read as the
//! shortest decimal that round-trips the configured `f64`, and the split is
//! computed exactly on that decimal.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::reputation::Tier;
use crate::tutor::TutorProfile;
use crate::validation::{require_in_range, require_positive};

/// Fraction of each donation kept by the tutor, per tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    #[serde(default = "default_apprentice_rate")]
    pub apprentice: f64,
    #[serde(default = "default_tutor_rate")]
    pub tutor: f64,
    #[serde(default = "default_top_rate")]
    pub top: f64,
}

fn default_apprentice_rate() -> f64 {
    0.40
}
fn default_tutor_rate() -> f64 {
    0.80
}
fn default_top_rate() -> f64 {
    0.90
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            apprentice: default_apprentice_rate(),
            tutor: default_tutor_rate(),
            top: default_top_rate(),
        }
    }
}

impl FeeSchedule {
    /// Every rate must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        require_in_range(self.apprentice, 0.0, 1.0, "apprentice rate out of range")?;
        require_in_range(self.tutor, 0.0, 1.0, "tutor rate out of range")?;
        require_in_range(self.top, 0.0, 1.0, "top rate out of range")?;
        if self.apprentice > self.tutor || self.tutor > self.top {
            return Err(Error::invalid_argument(format!(
                "fee rates must not decrease with tier (apprentice {}, tutor {}, top {})",
                self.apprentice, self.tutor, self.top
            )));
        }
        Ok(())
    }

    /// The tutor's share rate for `tier`.
    pub fn rate_for(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Apprentice => self.apprentice,
            Tier::Tutor => self.tutor,
            Tier::Top => self.top,
        }
    }
}

/// How one donation is divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub tutor_share: i64,
    pub platform_share: i64,
}

/// Record of an applied donation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationReceipt {
    pub tutor_email: String,
    pub tier: Tier,
    pub rate: f64,
    pub total: i64,
    pub tutor_share: i64,
    pub platform_share: i64,
    pub tutor_balance: i64,
}

/// Splits donations and keeps the platform's running revenue.
#[derive(Debug, Clone, Default)]
pub struct DonationSplitter {
    fees: FeeSchedule,
    revenue: i64,
}

impl DonationSplitter {
    pub fn new(fees: FeeSchedule) -> Result<Self> {
        fees.validate()?;
        Ok(Self { fees, revenue: 0 })
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    pub fn rate_for(&self, tier: Tier) -> f64 {
        self.fees.rate_for(tier)
    }

    /// Divide `total` minor units for a tutor in `tier`.
    pub fn split(&self, tier: Tier, total: i64) -> Result<Split> {
        require_positive(total, "donation must be positive")?;

        // ceil(total * (1 - rate)) == total - floor(total * rate)
        let tutor_share = floor_share(self.rate_for(tier), total)?;
        Ok(Split {
            tutor_share,
            platform_share: total - tutor_share,
        })
    }

    /// Split `total` and credit both parties.
    ///
    /// Both credits are checked before either is applied.
    pub fn donate(&mut self, tutor: &mut TutorProfile, total: i64) -> Result<DonationReceipt> {
        let tier = tutor.tier();
        let split = self.split(tier, total)?;

        let revenue = self
            .revenue
            .checked_add(split.platform_share)
            .ok_or_else(|| Error::invalid_argument("platform revenue overflow"))?;
        if tutor.balance_after(split.tutor_share).is_none() {
            return Err(Error::invalid_argument("tutor balance overflow"));
        }

        tutor.credit(split.tutor_share)?;
        self.revenue = revenue;

        tracing::info!(
            email = tutor.email(),
            %tier,
            total,
            tutor_share = split.tutor_share,
            platform_share = split.platform_share,
            "donation split"
        );

        Ok(DonationReceipt {
            tutor_email: tutor.email().to_string(),
            tier,
            rate: self.rate_for(tier),
            total,
            tutor_share: split.tutor_share,
            platform_share: split.platform_share,
            tutor_balance: tutor.balance(),
        })
    }

    /// Platform revenue accumulated since the last reset.
    pub fn revenue(&self) -> i64 {
        self.revenue
    }

    /// Zero the platform revenue. Called only when all data is cleared.
    pub fn reset(&mut self) {
        tracing::debug!(revenue = self.revenue, "platform revenue reset");
        self.revenue = 0;
    }
}

/// `floor(total * rate)` for a rate in `[0, 1]`, exact on the rate's decimal
/// form.
fn floor_share(rate: f64, total: i64) -> Result<i64> {
    // f64 Display never uses exponent notation.
    let decimal = rate.to_string();
    let (whole, frac) = decimal.split_once('.').unwrap_or((decimal.as_str(), ""));
    let numerator: i128 = format!("{whole}{frac}")
        .parse()
        .map_err(|_| Error::invalid_argument(format!("unreadable fee rate {decimal}")))?;

    // At most 17 significant digits, so the product stays far below i128::MAX.
    let scaled = numerator
        .checked_mul(i128::from(total))
        .ok_or_else(|| Error::invalid_argument("donation too large"))?;
    let Some(denominator) = u32::try_from(frac.len())
        .ok()
        .and_then(|digits| 10_i128.checked_pow(digits))
    else {
        // Below 1e-38 the share of any i64 total floors to zero.
        return Ok(0);
    };
    i64::try_from(scaled / denominator).map_err(|_| Error::invalid_argument("donation too large"))
}
