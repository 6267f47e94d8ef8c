//! Category column sets emitted by the external scorer.
//!
//! The grouping rules behind these names live in the scorer. Only the names
//! and their order are fixed here so matrices can be checked for schema
//! agreement.

use crate::enums::ScoreType;

/// Charlson comorbidity categories.
pub const CHARLSON_CATEGORIES: [&str; 17] = [
    "ami", "chf", "pvd", "cevd", "dementia", "copd", "rheumd", "pud", "mld", "diab", "diabwc",
    "hp", "rend", "canc", "msld", "metacanc", "aids",
];

/// Elixhauser comorbidity categories.
pub const ELIXHAUSER_CATEGORIES: [&str; 31] = [
    "chf", "carit", "valv", "pcd", "pvd", "hypunc", "hypc", "para", "ond", "cpd", "diabunc",
    "diabc", "hypothy", "rf", "ld", "pud", "aids", "lymph", "metacanc", "solidtum", "rheumd",
    "coag", "obes", "wloss", "fed", "blane", "dane", "alcohol", "drug", "psycho", "depre",
];

pub fn categories_for(score_type: ScoreType) -> &'static [&'static str] {
    match score_type {
        ScoreType::Charlson => &CHARLSON_CATEGORIES,
        ScoreType::Elixhauser => &ELIXHAUSER_CATEGORIES,
    }
}

/// Human-readable label for a category code, used by listings.
pub fn category_label(code: &str) -> Option<&'static str> {
    let label = match code {
        "ami" => "Acute myocardial infarction",
        "chf" => "Congestive heart failure",
        "pvd" => "Peripheral vascular disease",
        "cevd" => "Cerebrovascular disease",
        "dementia" => "Dementia",
        "copd" => "Chronic obstructive pulmonary disease",
        "rheumd" => "Rheumatoid disease",
        "pud" => "Peptic ulcer disease",
        "mld" => "Mild liver disease",
        "diab" => "Diabetes without complications",
        "diabwc" => "Diabetes with complications",
        "hp" => "Hemiplegia or paraplegia",
        "rend" => "Renal disease",
        "canc" => "Cancer (any malignancy)",
        "msld" => "Moderate or severe liver disease",
        "metacanc" => "Metastatic solid tumour",
        "aids" => "AIDS/HIV",
        "carit" => "Cardiac arrhythmias",
        "valv" => "Valvular disease",
        "pcd" => "Pulmonary circulation disorders",
        "hypunc" => "Hypertension, uncomplicated",
        "hypc" => "Hypertension, complicated",
        "para" => "Paralysis",
        "ond" => "Other neurological disorders",
        "cpd" => "Chronic pulmonary disease",
        "diabunc" => "Diabetes, uncomplicated",
        "diabc" => "Diabetes, complicated",
        "hypothy" => "Hypothyroidism",
        "rf" => "Renal failure",
        "ld" => "Liver disease",
        "lymph" => "Lymphoma",
        "solidtum" => "Solid tumour without metastasis",
        "coag" => "Coagulopathy",
        "obes" => "Obesity",
        "wloss" => "Weight loss",
        "fed" => "Fluid and electrolyte disorders",
        "blane" => "Blood loss anaemia",
        "dane" => "Deficiency anaemia",
        "alcohol" => "Alcohol abuse",
        "drug" => "Drug abuse",
        "psycho" => "Psychoses",
        "depre" => "Depression",
        _ => return None,
    };
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_a_label() {
        for score in [ScoreType::Charlson, ScoreType::Elixhauser] {
            for code in categories_for(score) {
                assert!(category_label(code).is_some(), "missing label for {code}");
            }
        }
    }
}
