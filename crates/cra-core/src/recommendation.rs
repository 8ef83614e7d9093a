//! Advisory text for niche agriculture
//!
//! The advisory depends on the agriculture type only. Retrieved statistic
//! values are not inspected; failed scenarios mark the advisory provisional.

use crate::sensitivity::KnownCrop;
use crate::types::ScenarioBatch;

const TRUFFLE_ADVICE: &str = "Truffle farming highly vulnerable to temperature increases. \
Consider diversification or climate-controlled environments.";

const ICE_WINE_ADVICE: &str = "Ice wine production may become unviable. \
Consider alternative grape varieties or northern relocation.";

const SAFFRON_ADVICE: &str = "Saffron cultivation may be affected by temperature changes. \
Monitor flowering periods and consider irrigation adjustments.";

const GENERIC_ADVICE: &str =
    "Monitor climate data regularly and adapt agricultural practices accordingly.";

/// Produces advisory sentences
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Create new engine
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fixed advisory for an agriculture type, ignoring case
    #[must_use]
    pub fn advice_for(agriculture_type: &str) -> &'static str {
        match KnownCrop::parse(agriculture_type) {
            Some(KnownCrop::Truffle) => TRUFFLE_ADVICE,
            Some(KnownCrop::IceWine) => ICE_WINE_ADVICE,
            Some(KnownCrop::Saffron) => SAFFRON_ADVICE,
            None => GENERIC_ADVICE,
        }
    }

    /// Advisory for an agriculture type given the aggregated outcomes
    ///
    /// When some scenarios could not be retrieved a provisional note is
    /// appended naming how many.
    #[must_use]
    pub fn recommend(&self, agriculture_type: &str, climate_risks: &ScenarioBatch) -> String {
        let advice = Self::advice_for(agriculture_type);
        let failed = climate_risks.err_count();
        if failed == 0 {
            return advice.to_string();
        }

        format!(
            "{advice} Data for {failed} of {} warming scenarios could not be retrieved; \
             treat this advisory as provisional.",
            climate_risks.len()
        )
    }
}
