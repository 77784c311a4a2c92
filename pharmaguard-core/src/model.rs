//! Analysis Result wire model.
//!
//! The backend owns the shape of this document and the client must tolerate
//! any subset of it being absent. Every field is therefore optional, unknown
//! fields are ignored, and enumerated strings are parsed leniently through
//! accessors rather than at deserialization time, so an unrecognised label
//! degrades to `Unknown` instead of rejecting the whole document. A `null`
//! or wrongly typed value is read as absent rather than as an error.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One analysis document as returned by `POST /analyze`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub drug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::object")]
    pub risk_assessment: Option<RiskAssessment>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::object")]
    pub pharmacogenomic_profile: Option<PharmacogenomicProfile>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::object")]
    pub clinical_recommendation: Option<ClinicalRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::object")]
    pub llm_generated_explanation: Option<LlmExplanation>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::object")]
    pub quality_metrics: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskAssessment {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub risk_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::number")]
    pub confidence_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PharmacogenomicProfile {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub primary_gene: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub diplotype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub phenotype: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub detected_variants: Vec<DetectedVariant>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectedVariant {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub rsid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub impact: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalRecommendation {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub dose_adjustment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub cpic_guideline: Option<String>,
}

impl ClinicalRecommendation {
    /// True when no field carries displayable text.
    pub fn is_empty(&self) -> bool {
        [&self.action, &self.dose_adjustment, &self.cpic_guideline]
            .iter()
            .all(|f| non_empty(f).is_none())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmExplanation {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub biological_mechanism: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub clinical_context: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub variants_cited: Vec<String>,
}

/// Field deserializers that read a mistyped or `null` value as absent.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    /// Numbers, or strings holding one.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            v @ Value::Object(_) => serde_json::from_value(v).ok(),
            _ => None,
        })
    }

    /// Keeps the entries that parse; anything other than an array is empty.
    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}

/// Returns the string only if it is present and non-empty.
pub(crate) fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Risk classification reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLabel {
    Safe,
    AdjustDosage,
    Toxic,
    Ineffective,
    Unknown,
}

impl RiskLabel {
    pub const ALL: [RiskLabel; 5] = [
        RiskLabel::Safe,
        RiskLabel::AdjustDosage,
        RiskLabel::Toxic,
        RiskLabel::Ineffective,
        RiskLabel::Unknown,
    ];

    /// Parse the wire string. Anything unrecognised is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "Safe" => RiskLabel::Safe,
            "Adjust Dosage" => RiskLabel::AdjustDosage,
            "Toxic" => RiskLabel::Toxic,
            "Ineffective" => RiskLabel::Ineffective,
            _ => RiskLabel::Unknown,
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            RiskLabel::Safe => "Safe",
            RiskLabel::AdjustDosage => "Adjust Dosage",
            RiskLabel::Toxic => "Toxic",
            RiskLabel::Ineffective => "Ineffective",
            RiskLabel::Unknown => "Unknown",
        }
    }

    /// Banner headline.
    pub fn headline(self) -> &'static str {
        match self {
            RiskLabel::Safe => "SAFE",
            RiskLabel::AdjustDosage => "ADJUST DOSAGE",
            RiskLabel::Toxic => "TOXIC",
            RiskLabel::Ineffective => "INEFFECTIVE",
            RiskLabel::Unknown => "UNKNOWN",
        }
    }

    /// One-line explanation under the headline.
    pub fn sublabel(self) -> &'static str {
        match self {
            RiskLabel::Safe => "Standard dosing recommended",
            RiskLabel::AdjustDosage => "Modified dosing required",
            RiskLabel::Toxic => "High risk — avoid this drug",
            RiskLabel::Ineffective => "Drug likely will not work",
            RiskLabel::Unknown => "Insufficient variant data",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Clinical severity of the reported risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    None,
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    /// Parse the wire string. Anything unrecognised is `None`.
    pub fn parse(s: &str) -> Self {
        match s {
            "low" => Severity::Low,
            "moderate" => Severity::Moderate,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::None => "None",
            Severity::Low => "Low",
            Severity::Moderate => "Moderate",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

/// Metabolizer phenotype code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phenotype {
    Poor,
    Intermediate,
    Normal,
    Rapid,
    UltraRapid,
    Unknown,
}

impl Phenotype {
    pub fn parse(code: &str) -> Self {
        match code {
            "PM" => Phenotype::Poor,
            "IM" => Phenotype::Intermediate,
            "NM" => Phenotype::Normal,
            "RM" => Phenotype::Rapid,
            "URM" => Phenotype::UltraRapid,
            _ => Phenotype::Unknown,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Phenotype::Poor => "PM",
            Phenotype::Intermediate => "IM",
            Phenotype::Normal => "NM",
            Phenotype::Rapid => "RM",
            Phenotype::UltraRapid => "URM",
            Phenotype::Unknown => "Unknown",
        }
    }

    /// Long name, if the code is a known metabolizer class.
    pub fn long_name(self) -> Option<&'static str> {
        match self {
            Phenotype::Poor => Some("Poor Metabolizer"),
            Phenotype::Intermediate => Some("Intermediate Metabolizer"),
            Phenotype::Normal => Some("Normal Metabolizer"),
            Phenotype::Rapid => Some("Rapid Metabolizer"),
            Phenotype::UltraRapid => Some("Ultra-Rapid Metabolizer"),
            Phenotype::Unknown => None,
        }
    }
}

impl AnalysisResult {
    pub fn risk_label(&self) -> RiskLabel {
        self.risk_assessment
            .as_ref()
            .and_then(|r| non_empty(&r.risk_label))
            .map(RiskLabel::parse)
            .unwrap_or(RiskLabel::Unknown)
    }

    /// Confidence as received, `0.0` when absent or not finite.
    pub fn confidence(&self) -> f64 {
        self.risk_assessment
            .as_ref()
            .and_then(|r| r.confidence_score)
            .filter(|c| c.is_finite())
            .unwrap_or(0.0)
    }

    /// Raw severity string, `"none"` when absent.
    pub fn severity_text(&self) -> &str {
        self.risk_assessment
            .as_ref()
            .and_then(|r| non_empty(&r.severity))
            .unwrap_or("none")
    }

    pub fn severity(&self) -> Severity {
        Severity::parse(self.severity_text())
    }

    pub fn phenotype(&self) -> Phenotype {
        self.pharmacogenomic_profile
            .as_ref()
            .and_then(|p| non_empty(&p.phenotype))
            .map(Phenotype::parse)
            .unwrap_or(Phenotype::Unknown)
    }
}

/// Where a displayed result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    Backend,
    Synthetic,
}

impl Provenance {
    pub fn is_synthetic(self) -> bool {
        self == Provenance::Synthetic
    }
}

/// A result ready for display: the typed view plus the document exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub raw: serde_json::Value,
    pub provenance: Provenance,
}

impl Analysis {
    /// Build from a JSON object. Non-objects are rejected.
    pub fn from_value(raw: serde_json::Value, provenance: Provenance) -> Result<Self, String> {
        if !raw.is_object() {
            return Err(format!("expected a JSON object, got {}", json_kind(&raw)));
        }
        let result: AnalysisResult =
            serde_json::from_value(raw.clone()).map_err(|e| e.to_string())?;
        Ok(Self {
            result,
            raw,
            provenance,
        })
    }

    /// Build from a typed result (synthetic path). The raw view is its serialization.
    pub fn from_result(result: AnalysisResult, provenance: Provenance) -> Self {
        let raw = serde_json::to_value(&result)
            .unwrap_or_else(|_| serde_json::Value::Object(Default::default()));
        Self {
            result,
            raw,
            provenance,
        }
    }

    /// Drug name to headline the report with: the document's own, else the requested one.
    pub fn drug_or<'a>(&'a self, requested: &'a str) -> &'a str {
        non_empty(&self.result.drug).unwrap_or(requested)
    }
}

/// Parse a response body that is either one document or an array of documents.
pub fn parse_response(body: &str, provenance: Provenance) -> Result<Vec<Analysis>, String> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    match value {
        serde_json::Value::Array(items) => {
            if items.is_empty() {
                return Err("empty result array".into());
            }
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    Analysis::from_value(item, provenance).map_err(|e| format!("item {i}: {e}"))
                })
                .collect()
        }
        other => Analysis::from_value(other, provenance).map(|a| vec![a]),
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_parses_with_defaults() {
        let a = Analysis::from_value(json!({}), Provenance::Backend).unwrap();
        assert_eq!(a.result.risk_label(), RiskLabel::Unknown);
        assert_eq!(a.result.confidence(), 0.0);
        assert_eq!(a.result.severity_text(), "none");
        assert_eq!(a.result.phenotype(), Phenotype::Unknown);
    }

    #[test]
    fn unknown_label_degrades() {
        let a = Analysis::from_value(
            json!({"risk_assessment": {"risk_label": "Catastrophic", "severity": "extreme"}}),
            Provenance::Backend,
        )
        .unwrap();
        assert_eq!(a.result.risk_label(), RiskLabel::Unknown);
        assert_eq!(a.result.severity(), Severity::None);
        assert_eq!(a.result.severity_text(), "extreme");
    }

    #[test]
    fn nulls_are_treated_as_absent() {
        let a = Analysis::from_value(
            json!({"risk_assessment": {"risk_label": null, "confidence_score": null}}),
            Provenance::Backend,
        )
        .unwrap();
        assert_eq!(a.result.risk_label(), RiskLabel::Unknown);
        assert_eq!(a.result.confidence(), 0.0);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let a = Analysis::from_value(
            json!({"drug": "CODEINE", "variants_found": [1, 2], "clinical_recommendation": {"notes": "x"}}),
            Provenance::Backend,
        )
        .unwrap();
        assert_eq!(a.result.drug.as_deref(), Some("CODEINE"));
        assert!(a.result.clinical_recommendation.unwrap().is_empty());
    }

    #[test]
    fn response_single_or_array() {
        let one = parse_response(r#"{"drug":"WARFARIN"}"#, Provenance::Backend).unwrap();
        assert_eq!(one.len(), 1);

        let many = parse_response(
            r#"[{"drug":"WARFARIN"},{"drug":"CODEINE"}]"#,
            Provenance::Backend,
        )
        .unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].result.drug.as_deref(), Some("CODEINE"));
    }

    #[test]
    fn response_rejects_non_documents() {
        assert!(parse_response("[]", Provenance::Backend).is_err());
        assert!(parse_response("\"ok\"", Provenance::Backend).is_err());
        assert!(parse_response("[1, 2]", Provenance::Backend).is_err());
        assert!(parse_response("not json", Provenance::Backend).is_err());
    }

    #[test]
    fn raw_document_is_preserved() {
        let doc = json!({"drug": "WARFARIN", "extra": {"nested": true}});
        let a = Analysis::from_value(doc.clone(), Provenance::Backend).unwrap();
        assert_eq!(a.raw, doc);
    }

    #[test]
    fn drug_falls_back_to_requested() {
        let a = Analysis::from_value(json!({"drug": ""}), Provenance::Backend).unwrap();
        assert_eq!(a.drug_or("WARFARIN"), "WARFARIN");
    }

    #[test]
    fn null_lists_read_as_empty() {
        let a = Analysis::from_value(
            json!({
                "risk_assessment": {"risk_label": "Toxic"},
                "pharmacogenomic_profile": {"primary_gene": "CYP2C9", "detected_variants": null},
                "llm_generated_explanation": {"summary": "s", "variants_cited": null}
            }),
            Provenance::Backend,
        )
        .unwrap();
        assert_eq!(a.result.risk_label(), RiskLabel::Toxic);
        let profile = a.result.pharmacogenomic_profile.unwrap();
        assert_eq!(profile.primary_gene.as_deref(), Some("CYP2C9"));
        assert!(profile.detected_variants.is_empty());
        assert!(a.result.llm_generated_explanation.unwrap().variants_cited.is_empty());
    }

    #[test]
    fn mistyped_leaves_read_as_absent() {
        let a = Analysis::from_value(
            json!({
                "drug": 7,
                "risk_assessment": {"risk_label": "Safe", "confidence_score": "0.91", "severity": ["low"]},
                "pharmacogenomic_profile": {"detected_variants": [{"rsid": "rs4244285"}, "rs12248560", 3]},
                "clinical_recommendation": "see notes",
                "llm_generated_explanation": {"variants_cited": ["rs4244285", 5]}
            }),
            Provenance::Backend,
        )
        .unwrap();
        assert_eq!(a.result.drug, None);
        assert_eq!(a.result.risk_label(), RiskLabel::Safe);
        assert_eq!(a.result.confidence(), 0.91);
        assert_eq!(a.result.severity_text(), "none");
        assert_eq!(a.result.clinical_recommendation, None);
        let variants = &a.result.pharmacogenomic_profile.as_ref().unwrap().detected_variants;
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].rsid.as_deref(), Some("rs4244285"));
        assert_eq!(
            a.result.llm_generated_explanation.unwrap().variants_cited,
            ["rs4244285"]
        );
    }

    #[test]
    fn unparseable_confidence_string_is_zero() {
        let a = Analysis::from_value(
            json!({"risk_assessment": {"confidence_score": "high"}}),
            Provenance::Backend,
        )
        .unwrap();
        assert_eq!(a.result.confidence(), 0.0);
    }

    #[test]
    fn response_with_null_variants_still_parses() {
        let parsed = parse_response(
            r#"{"drug":"WARFARIN","risk_assessment":{"risk_label":"Toxic"},"pharmacogenomic_profile":{"detected_variants":null}}"#,
            Provenance::Backend,
        )
        .unwrap();
        assert_eq!(parsed[0].result.risk_label(), RiskLabel::Toxic);
    }

    #[test]
    fn label_wire_names_roundtrip() {
        for label in RiskLabel::ALL {
            assert_eq!(RiskLabel::parse(label.wire_name()), label);
        }
    }

    #[test]
    fn phenotype_long_names() {
        assert_eq!(Phenotype::parse("PM").long_name(), Some("Poor Metabolizer"));
        assert_eq!(Phenotype::parse("URM").long_name(), Some("Ultra-Rapid Metabolizer"));
        assert_eq!(Phenotype::parse("Unknown").long_name(), None);
    }
}
