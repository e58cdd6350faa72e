//! Cost estimation for a `btco` migration.

use serde::{Deserialize, Serialize};

/// Dust threshold (sats) added to every non-zero cost estimate.
pub const DUST_VALUE: u64 = 546;

/// Fee rate used when no explicit rate, fee oracle, or ordinals provider
/// estimate is available.
pub const DEFAULT_FEE_RATE: f64 = 10.0;

/// Confidence in a cost estimate's fee-rate source, ranked by how
/// authoritative the source is: a live fee oracle is
/// [`Confidence::High`]; an explicit caller-supplied rate or the ordinals
/// provider's own estimate is [`Confidence::Medium`]; the hardcoded fallback
/// is [`Confidence::Low`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Sourced from a live fee oracle.
    High,
    /// Sourced from an explicit caller override or the ordinals provider's
    /// own estimate.
    Medium,
    /// Fell back to [`DEFAULT_FEE_RATE`].
    Low,
}

/// The vbyte/fee-rate/dust breakdown behind a [`CostEstimate`]'s total.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    /// Estimated commit transaction size, in vbytes (~200 for a single
    /// commit input/output).
    pub commit_vbytes: u64,
    /// Estimated reveal transaction size, in vbytes: a 200 vbyte base plus a
    /// 122 vbyte witness overhead plus the inscription manifest's byte size.
    pub reveal_vbytes: u64,
    /// The fee rate applied, in sat/vB.
    pub fee_rate: f64,
    /// Dust value added to the total.
    pub dust_value: u64,
}

/// The result of [`crate::lifecycle::LifecycleManager::estimate_cost`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    /// Total estimated cost in satoshis.
    pub total_sats: u64,
    /// The fee rate used, in sat/vB.
    pub fee_rate: f64,
    /// The computation's breakdown.
    pub breakdown: CostBreakdown,
    /// Confidence in the fee-rate source.
    pub confidence: Confidence,
}

impl Default for Confidence {
    fn default() -> Self {
        Self::Low
    }
}
