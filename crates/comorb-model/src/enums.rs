//! Type-safe enumerations for comorbidity scoring.
//!
//! The external scorer addresses its lookup tables and weight sets by string
//! names. These enums keep those names in one place and reject unknown
//! spellings at the edges (CLI flags, CSV cells).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Revision of the International Classification of Diseases a code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IcdVersion {
    Icd9,
    Icd10,
}

impl IcdVersion {
    /// Both versions in the order the cohort pipeline builds them.
    pub const ALL: [IcdVersion; 2] = [IcdVersion::Icd9, IcdVersion::Icd10];

    /// Numeric revision as written in the source `icd_type` column.
    pub fn number(self) -> u8 {
        match self {
            IcdVersion::Icd9 => 9,
            IcdVersion::Icd10 => 10,
        }
    }

    /// Maps a numeric revision to a version, `None` for anything but 9 or 10.
    pub fn from_number(value: i64) -> Option<Self> {
        match value {
            9 => Some(IcdVersion::Icd9),
            10 => Some(IcdVersion::Icd10),
            _ => None,
        }
    }
}

impl fmt::Display for IcdVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "icd{}", self.number())
    }
}

/// Comorbidity index family.
///
/// - **Charlson**: weighted index where category sums may exceed one.
/// - **Elixhauser**: every category is a presence/absence flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    Charlson,
    Elixhauser,
}

impl ScoreType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreType::Charlson => "charlson",
            ScoreType::Elixhauser => "elixhauser",
        }
    }

    /// Name of the quan code mapping for this index and ICD revision,
    /// e.g. `charlson_icd9_quan`.
    pub fn mapping_name(self, icd: IcdVersion) -> String {
        format!("{}_{}_quan", self.as_str(), icd)
    }

    /// Mapping used when reducing a combined matrix to a single score.
    ///
    /// Combined matrices always carry ICD-10 category semantics.
    pub fn scoring_mapping(self) -> String {
        self.mapping_name(IcdVersion::Icd10)
    }

    /// Whether combined category cells are clamped to presence flags.
    pub fn is_binary(self) -> bool {
        matches!(self, ScoreType::Elixhauser)
    }

    pub fn default_weights(self) -> WeightScheme {
        match self {
            ScoreType::Charlson => WeightScheme::Charlson,
            ScoreType::Elixhauser => WeightScheme::Swiss,
        }
    }
}

impl fmt::Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "charlson" => Ok(ScoreType::Charlson),
            "elixhauser" => Ok(ScoreType::Elixhauser),
            _ => Err(ModelError::UnknownValue {
                kind: "score type",
                value: s.to_string(),
            }),
        }
    }
}

/// Weight set applied by the external scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightScheme {
    /// Original Charlson weights.
    Charlson,
    /// Quan et al. (2011) updated Charlson weights.
    Quan,
    /// van Walraven et al. Elixhauser weights.
    #[serde(rename = "vw")]
    VanWalraven,
    /// Swiss Elixhauser weights (Moore et al.).
    Swiss,
}

impl WeightScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            WeightScheme::Charlson => "charlson",
            WeightScheme::Quan => "quan",
            WeightScheme::VanWalraven => "vw",
            WeightScheme::Swiss => "swiss",
        }
    }

    /// Index family this weight set belongs to.
    pub fn score_type(self) -> ScoreType {
        match self {
            WeightScheme::Charlson | WeightScheme::Quan => ScoreType::Charlson,
            WeightScheme::VanWalraven | WeightScheme::Swiss => ScoreType::Elixhauser,
        }
    }

    pub fn is_compatible_with(self, score_type: ScoreType) -> bool {
        self.score_type() == score_type
    }
}

impl fmt::Display for WeightScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightScheme {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "charlson" => Ok(WeightScheme::Charlson),
            "quan" => Ok(WeightScheme::Quan),
            "vw" | "van_walraven" => Ok(WeightScheme::VanWalraven),
            "swiss" => Ok(WeightScheme::Swiss),
            _ => Err(ModelError::UnknownValue {
                kind: "weight scheme",
                value: s.to_string(),
            }),
        }
    }
}
