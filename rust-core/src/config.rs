// Constants and tunable parameters

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::interfaces::ModelTerms;
use crate::Result;

// Tolerances
pub const DEGENERACY_TOLERANCE: f64 = 1e-12; // Relative; (m2.r)^2 - |r|^2 below this means r lies on the axis
pub const PROBABILITY_TOLERANCE: f64 = 1e-12; // Slack allowed on fractions outside [0, 1]

// Search defaults
pub const DEFAULT_CHI2P: f64 = 11.344_866_730_144_373; // chi-square, 3 dof, p = 0.99
pub const DEFAULT_MAX_SEARCH_STEPS: usize = 1000;

/// Degrees of freedom of the Mahalanobis distance in (x, y, phi) space.
const PROFILE_DOF: f64 = 3.0;

/// Parameters of the bounding box / mask search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportConfig {
    /// Chi-square acceptance threshold on the squared Mahalanobis distance.
    pub chi2p: f64,
    /// Upper bound on the number of unit steps taken along any one box face.
    pub max_search_steps: usize,
    /// Covariance terms included in the profile model.
    pub terms: ModelTerms,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            chi2p: DEFAULT_CHI2P,
            max_search_steps: DEFAULT_MAX_SEARCH_STEPS,
            terms: ModelTerms::default(),
        }
    }
}

impl SupportConfig {
    /// Config whose threshold encloses the given probability mass of the profile.
    pub fn with_probability(probability: f64) -> Result<Self> {
        ensure!(
            probability > 0.0 && probability < 1.0,
            "probability must lie in (0, 1), got {}",
            probability
        );
        let distribution = ChiSquared::new(PROFILE_DOF).map_err(|e| {
            crate::ProfileError::PreconditionViolated(format!("chi-square distribution: {}", e))
        })?;
        Ok(Self {
            chi2p: distribution.inverse_cdf(probability),
            ..Self::default()
        })
    }

    pub fn with_chi2p(mut self, chi2p: f64) -> Self {
        self.chi2p = chi2p;
        self
    }

    pub fn with_max_search_steps(mut self, steps: usize) -> Self {
        self.max_search_steps = steps;
        self
    }

    pub fn with_terms(mut self, terms: ModelTerms) -> Self {
        self.terms = terms;
        self
    }

    /// Check the invariants the support relies on.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.chi2p > 0.0, "chi2p must be positive, got {}", self.chi2p);
        ensure!(self.max_search_steps > 0, "max_search_steps must be positive");
        Ok(())
    }
}
