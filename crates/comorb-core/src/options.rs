//! Processing options for the cohort and risk pipelines.

use comorb_model::{ScoreType, WeightScheme};

use crate::error::{PipelineError, Result};

/// How the cohort pipeline treats an empty ICD subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CohortPolicy {
    /// Both ICD-9 and ICD-10 subsets must be non-empty.
    Strict,
    /// A single non-empty subset is scored on its own; both empty is an error.
    Lenient,
}

impl CohortPolicy {
    /// Charlson runs historically assumed both subsets are present; Elixhauser
    /// runs guard against either one being empty.
    pub fn for_score(score_type: ScoreType) -> Self {
        match score_type {
            ScoreType::Charlson => CohortPolicy::Strict,
            ScoreType::Elixhauser => CohortPolicy::Lenient,
        }
    }
}

/// Configuration for a scoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringOptions {
    pub score_type: ScoreType,
    pub weights: WeightScheme,
    pub cohort_policy: CohortPolicy,
}

impl ScoringOptions {
    /// Defaults for an index: its default weights and cohort policy.
    pub fn new(score_type: ScoreType) -> Self {
        Self {
            score_type,
            weights: score_type.default_weights(),
            cohort_policy: CohortPolicy::for_score(score_type),
        }
    }

    #[must_use]
    pub fn with_weights(mut self, weights: WeightScheme) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub fn with_cohort_policy(mut self, policy: CohortPolicy) -> Self {
        self.cohort_policy = policy;
        self
    }

    /// Name of the mapping handed to the scorer when computing risk.
    pub fn scoring_mapping(&self) -> String {
        self.score_type.scoring_mapping()
    }

    /// Rejects weight schemes from the other index family.
    pub fn validate(&self) -> Result<()> {
        if self.weights.is_compatible_with(self.score_type) {
            Ok(())
        } else {
            Err(PipelineError::IncompatibleWeights {
                weights: self.weights,
                score_type: self.score_type,
            })
        }
    }
}
