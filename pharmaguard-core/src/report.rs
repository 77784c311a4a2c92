//! Report view models: what each report section shows for a given result.
//!
//! Built once per result and consumed by both the TUI panels and the CLI's
//! plain-text output. Every absent field resolves to a fixed placeholder here,
//! so drawing code never has to deal with missing data.

use std::fmt::Write as _;

use crate::highlight;
use crate::model::{non_empty, Analysis, Phenotype, RiskLabel, Severity};

/// Placeholder for an absent profile value.
pub const EMPTY_VALUE: &str = "—";

/// Placeholder for a variant without an rsID.
pub const EMPTY_RSID: &str = "rs—";

pub const DISCLAIMER: &str = "This AI-generated analysis is for research and educational purposes. \
Clinical decisions must be validated by a licensed healthcare professional aligned with current CPIC guidelines.";

pub const SYNTHETIC_BANNER: &str = "SYNTHETIC PLACEHOLDER: backend unavailable, not a clinical result";

/// `0.95` becomes `"95.0%"`.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// Drug to headline result `index` of `result_count` with when the document
/// does not name its own. A response with one document per submitted drug
/// pairs them by position; any other shape falls back to the first drug.
pub fn requested_drug(drugs: &[String], index: usize, result_count: usize) -> &str {
    let paired = if result_count == drugs.len() { index } else { 0 };
    drugs.get(paired).or(drugs.first()).map(String::as_str).unwrap_or("")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCell {
    pub label: &'static str,
    pub value: String,
    /// Long phenotype name, only on the phenotype cell.
    pub detail: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantChip {
    pub rsid: String,
    pub impact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationView {
    pub action: Option<String>,
    pub dose_adjustment: Option<String>,
    pub cpic_guideline: Option<String>,
}

/// Headline risk card.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskCard {
    pub label: RiskLabel,
    pub drug: String,
    pub severity: Severity,
    /// e.g. `"CRITICAL SEVERITY"`; uses the received text even if unrecognised.
    pub severity_line: String,
    pub confidence: f64,
    pub confidence_text: String,
    /// Confidence clamped to [0, 1] for the gauge.
    pub gauge_ratio: f64,
    pub profile: Vec<ProfileCell>,
    pub variants: Vec<VariantChip>,
    pub recommendation: Option<RecommendationView>,
    pub synthetic: bool,
}

impl RiskCard {
    /// `requested_drug` is shown when the document does not name its drug.
    pub fn build(analysis: &Analysis, requested_drug: &str) -> Self {
        let r = &analysis.result;
        let confidence = r.confidence();
        let profile = r.pharmacogenomic_profile.clone().unwrap_or_default();

        let cell = |label, value: &Option<String>| ProfileCell {
            label,
            value: non_empty(value).unwrap_or(EMPTY_VALUE).to_string(),
            detail: None,
        };
        let mut phenotype = cell("PHENOTYPE", &profile.phenotype);
        phenotype.detail = Phenotype::parse(&phenotype.value).long_name();

        let variants = profile
            .detected_variants
            .iter()
            .map(|v| VariantChip {
                rsid: non_empty(&v.rsid).unwrap_or(EMPTY_RSID).to_string(),
                impact: non_empty(&v.impact).map(String::from),
            })
            .collect();

        let recommendation = r
            .clinical_recommendation
            .as_ref()
            .filter(|rec| !rec.is_empty())
            .map(|rec| RecommendationView {
                action: non_empty(&rec.action).map(String::from),
                dose_adjustment: non_empty(&rec.dose_adjustment).map(String::from),
                cpic_guideline: non_empty(&rec.cpic_guideline).map(String::from),
            });

        Self {
            label: r.risk_label(),
            drug: analysis.drug_or(requested_drug).to_string(),
            severity: r.severity(),
            severity_line: format!("{} SEVERITY", r.severity_text().to_uppercase()),
            confidence,
            confidence_text: format_confidence(confidence),
            gauge_ratio: confidence.clamp(0.0, 1.0),
            profile: vec![
                cell("PRIMARY GENE", &profile.primary_gene),
                cell("DIPLOTYPE", &profile.diplotype),
                phenotype,
            ],
            variants,
            recommendation,
            synthetic: analysis.provenance.is_synthetic(),
        }
    }

    pub fn headline(&self) -> &'static str {
        self.label.headline()
    }

    pub fn sublabel(&self) -> &'static str {
        self.label.sublabel()
    }
}

/// LLM explanation section. Empty sub-sections are `None` and not drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationView {
    pub summary: Option<String>,
    pub mechanism: Option<String>,
    pub clinical_context: Option<String>,
    pub variants_cited: Vec<String>,
}

impl ExplanationView {
    pub fn build(analysis: &Analysis) -> Self {
        let llm = analysis
            .result
            .llm_generated_explanation
            .clone()
            .unwrap_or_default();
        Self {
            summary: non_empty(&llm.summary).map(String::from),
            mechanism: non_empty(&llm.biological_mechanism).map(String::from),
            clinical_context: non_empty(&llm.clinical_context).map(String::from),
            variants_cited: llm
                .variants_cited
                .into_iter()
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.mechanism.is_none()
            && self.clinical_context.is_none()
            && self.variants_cited.is_empty()
    }

    /// Summary text revealed after `chars` characters, for the typewriter.
    pub fn summary_prefix(&self, chars: usize) -> &str {
        let s = self.summary.as_deref().unwrap_or("");
        match s.char_indices().nth(chars) {
            Some((idx, _)) => &s[..idx],
            None => s,
        }
    }

    pub fn summary_len(&self) -> usize {
        self.summary.as_deref().map(|s| s.chars().count()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricState {
    Pass,
    Fail,
    Value,
}

/// One quality-metric footer entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityMetric {
    /// `vcf_parsing_success` is shown as `VCF PARSING SUCCESS`.
    pub label: String,
    pub value: String,
    pub state: MetricState,
}

/// Footer rows in document order; empty when the document has none.
pub fn quality_metrics(analysis: &Analysis) -> Vec<QualityMetric> {
    let Some(metrics) = analysis.raw.get("quality_metrics").and_then(|m| m.as_object()) else {
        return Vec::new();
    };
    metrics
        .iter()
        .map(|(key, val)| {
            let (state, value) = match val {
                serde_json::Value::Bool(true) => (MetricState::Pass, "true".to_string()),
                serde_json::Value::Bool(false) => (MetricState::Fail, "false".to_string()),
                serde_json::Value::String(s) => (MetricState::Value, s.clone()),
                other => (MetricState::Value, other.to_string()),
            };
            QualityMetric {
                label: key.replace('_', " ").to_uppercase(),
                value,
                state,
            }
        })
        .collect()
}

/// `pharmaguard_{patient}_{drug}.json`, safe to use as a file name.
pub fn export_file_name(analysis: &Analysis) -> String {
    let r = &analysis.result;
    let patient = non_empty(&r.patient_id).unwrap_or("result");
    let drug = non_empty(&r.drug).unwrap_or("analysis");
    format!(
        "pharmaguard_{}_{}.json",
        sanitize_component(patient),
        sanitize_component(drug)
    )
}

fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The exported document: the raw result, plus `"synthetic": true` when it is one.
pub fn export_value(analysis: &Analysis) -> serde_json::Value {
    let mut value = analysis.raw.clone();
    if analysis.provenance.is_synthetic() {
        if let Some(obj) = value.as_object_mut() {
            obj.insert("synthetic".to_string(), serde_json::Value::Bool(true));
        }
    }
    value
}

pub fn export_json(analysis: &Analysis) -> String {
    highlight::pretty(&export_value(analysis))
}

/// Plain-text report for terminals without the TUI.
pub fn to_text(analysis: &Analysis, requested_drug: &str) -> String {
    let card = RiskCard::build(analysis, requested_drug);
    let expl = ExplanationView::build(analysis);
    let mut out = String::new();

    if card.synthetic {
        let _ = writeln!(out, "!! {SYNTHETIC_BANNER}");
    }
    let _ = writeln!(out, "RISK ASSESSMENT  {}  ({})", card.headline(), card.sublabel());
    let _ = writeln!(out, "DRUG TARGET      {}", card.drug);
    let _ = writeln!(out, "SEVERITY         {}", card.severity_line);
    let _ = writeln!(out, "CONFIDENCE       {}", card.confidence_text);
    let _ = writeln!(out);
    let _ = writeln!(out, "PHARMACOGENOMIC PROFILE");
    for cell in &card.profile {
        match cell.detail {
            Some(detail) => {
                let _ = writeln!(out, "  {:<13} {} ({detail})", cell.label, cell.value);
            }
            None => {
                let _ = writeln!(out, "  {:<13} {}", cell.label, cell.value);
            }
        }
    }
    if !card.variants.is_empty() {
        let _ = writeln!(out, "  DETECTED VARIANTS");
        for v in &card.variants {
            match &v.impact {
                Some(impact) => {
                    let _ = writeln!(out, "    {} {impact}", v.rsid);
                }
                None => {
                    let _ = writeln!(out, "    {}", v.rsid);
                }
            }
        }
    }

    if let Some(rec) = &card.recommendation {
        let _ = writeln!(out);
        let _ = writeln!(out, "CLINICAL RECOMMENDATION");
        if let Some(action) = &rec.action {
            let _ = writeln!(out, "  {action}");
        }
        if let Some(dose) = &rec.dose_adjustment {
            let _ = writeln!(out, "  DOSE ADJUSTMENT: {dose}");
        }
        if let Some(guideline) = &rec.cpic_guideline {
            let _ = writeln!(out, "  {guideline}");
        }
    }

    if !expl.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "LLM EXPLANATION");
        if let Some(s) = &expl.summary {
            let _ = writeln!(out, "  CLINICAL SUMMARY: {s}");
        }
        if let Some(s) = &expl.mechanism {
            let _ = writeln!(out, "  BIOLOGICAL MECHANISM: {s}");
        }
        if let Some(s) = &expl.clinical_context {
            let _ = writeln!(out, "  CLINICAL CONTEXT: {s}");
        }
        if !expl.variants_cited.is_empty() {
            let _ = writeln!(out, "  VARIANTS REFERENCED: {}", expl.variants_cited.join(", "));
        }
        let _ = writeln!(out, "  {DISCLAIMER}");
    }

    let metrics = quality_metrics(analysis);
    if !metrics.is_empty() {
        let _ = writeln!(out);
        let row: Vec<String> = metrics
            .iter()
            .map(|m| format!("{}: {}", m.label, m.value))
            .collect();
        let _ = writeln!(out, "QUALITY  {}", row.join("  "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Provenance;
    use serde_json::json;

    fn analysis(v: serde_json::Value) -> Analysis {
        Analysis::from_value(v, Provenance::Backend).unwrap()
    }

    #[test]
    fn toxic_warfarin_card() {
        let a = analysis(json!({
            "risk_assessment": {"risk_label": "Toxic", "confidence_score": 0.95, "severity": "critical"}
        }));
        let card = RiskCard::build(&a, "WARFARIN");
        assert_eq!(card.headline(), "TOXIC");
        assert_eq!(card.severity_line, "CRITICAL SEVERITY");
        assert_eq!(card.confidence_text, "95.0%");
        assert_eq!(card.drug, "WARFARIN");
        assert_eq!(card.severity, Severity::Critical);
    }

    #[test]
    fn empty_document_uses_placeholders() {
        let a = analysis(json!({}));
        let card = RiskCard::build(&a, "CODEINE");
        assert_eq!(card.headline(), "UNKNOWN");
        assert_eq!(card.sublabel(), "Insufficient variant data");
        assert_eq!(card.severity_line, "NONE SEVERITY");
        assert_eq!(card.confidence_text, "0.0%");
        assert!(card.profile.iter().all(|c| c.value == EMPTY_VALUE));
        assert!(card.variants.is_empty());
        assert!(card.recommendation.is_none());
        assert!(ExplanationView::build(&a).is_empty());
        assert!(quality_metrics(&a).is_empty());
    }

    #[test]
    fn unrecognised_severity_keeps_its_text() {
        let a = analysis(json!({"risk_assessment": {"risk_label": "Toxic", "severity": "extreme"}}));
        let card = RiskCard::build(&a, "WARFARIN");
        assert_eq!(card.severity, Severity::None);
        assert_eq!(card.severity_line, "EXTREME SEVERITY");
        assert!(to_text(&a, "WARFARIN").contains("EXTREME SEVERITY"));
    }

    #[test]
    fn requested_drug_pairs_by_position() {
        let drugs = vec!["WARFARIN".to_string(), "CODEINE".to_string()];
        assert_eq!(requested_drug(&drugs, 0, 2), "WARFARIN");
        assert_eq!(requested_drug(&drugs, 1, 2), "CODEINE");
        // Counts differ: no pairing.
        assert_eq!(requested_drug(&drugs, 0, 1), "WARFARIN");
        assert_eq!(requested_drug(&drugs, 2, 3), "WARFARIN");
        assert_eq!(requested_drug(&[], 0, 0), "");
    }

    #[test]
    fn array_documents_without_drug_use_their_own_request() {
        let drugs = vec!["WARFARIN".to_string(), "CODEINE".to_string()];
        let results = [analysis(json!({})), analysis(json!({}))];
        let names: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(i, a)| RiskCard::build(a, requested_drug(&drugs, i, results.len())).drug)
            .collect();
        assert_eq!(names, ["WARFARIN", "CODEINE"]);
    }

    #[test]
    fn profile_and_variants() {
        let a = analysis(json!({
            "pharmacogenomic_profile": {
                "primary_gene": "CYP2C9",
                "diplotype": "*2/*3",
                "phenotype": "PM",
                "detected_variants": [{"rsid": "rs1799853", "impact": "decreased function"}, {"impact": ""}]
            }
        }));
        let card = RiskCard::build(&a, "WARFARIN");
        assert_eq!(card.profile[0].value, "CYP2C9");
        assert_eq!(card.profile[2].detail, Some("Poor Metabolizer"));
        assert_eq!(card.variants[0].impact.as_deref(), Some("decreased function"));
        assert_eq!(card.variants[1].rsid, EMPTY_RSID);
        assert_eq!(card.variants[1].impact, None);
    }

    #[test]
    fn gauge_is_clamped_but_readout_is_not() {
        let a = analysis(json!({"risk_assessment": {"confidence_score": 1.2}}));
        let card = RiskCard::build(&a, "X");
        assert_eq!(card.gauge_ratio, 1.0);
        assert_eq!(card.confidence_text, "120.0%");
    }

    #[test]
    fn recommendation_partial() {
        let a = analysis(json!({"clinical_recommendation": {"dose_adjustment": "Reduce 50%"}}));
        let rec = RiskCard::build(&a, "X").recommendation.unwrap();
        assert_eq!(rec.action, None);
        assert_eq!(rec.dose_adjustment.as_deref(), Some("Reduce 50%"));
    }

    #[test]
    fn metrics_in_document_order() {
        let a = analysis(json!({"quality_metrics": {
            "vcf_parsing_success": true, "gene_coverage": false, "variant_count": 3, "build": "GRCh38"
        }}));
        let m = quality_metrics(&a);
        assert_eq!(m.len(), 4);
        assert_eq!(m[0].label, "VCF PARSING SUCCESS");
        assert_eq!(m[0].state, MetricState::Pass);
        assert_eq!(m[1].state, MetricState::Fail);
        assert_eq!(m[2].value, "3");
        assert_eq!(m[3].value, "GRCh38");
    }

    #[test]
    fn export_names() {
        let a = analysis(json!({"patient_id": "PATIENT_001", "drug": "WARFARIN"}));
        assert_eq!(export_file_name(&a), "pharmaguard_PATIENT_001_WARFARIN.json");
        let a = analysis(json!({}));
        assert_eq!(export_file_name(&a), "pharmaguard_result_analysis.json");
        let a = analysis(json!({"patient_id": "../etc/passwd"}));
        assert_eq!(export_file_name(&a), "pharmaguard_.._etc_passwd_analysis.json");
    }

    #[test]
    fn synthetic_export_is_marked() {
        let mut a = analysis(json!({"drug": "WARFARIN"}));
        assert!(export_value(&a).get("synthetic").is_none());
        a.provenance = Provenance::Synthetic;
        assert_eq!(export_value(&a)["synthetic"], json!(true));
        assert!(to_text(&a, "WARFARIN").starts_with("!! SYNTHETIC"));
    }

    #[test]
    fn typewriter_prefix_respects_chars() {
        let a = analysis(json!({"llm_generated_explanation": {"summary": "Poor métaboliser"}}));
        let e = ExplanationView::build(&a);
        assert_eq!(e.summary_prefix(7), "Poor mé");
        assert_eq!(e.summary_prefix(1000), "Poor métaboliser");
        assert_eq!(e.summary_len(), 16);
    }

    #[test]
    fn text_report_has_headline() {
        let a = analysis(json!({
            "risk_assessment": {"risk_label": "Adjust Dosage", "confidence_score": 0.8, "severity": "moderate"},
            "llm_generated_explanation": {"summary": "Reduced CYP2C9 activity."}
        }));
        let text = to_text(&a, "WARFARIN");
        assert!(text.contains("ADJUST DOSAGE"));
        assert!(text.contains("MODERATE SEVERITY"));
        assert!(text.contains("80.0%"));
        assert!(text.contains("Reduced CYP2C9 activity."));
        assert!(text.contains(DISCLAIMER));
    }

    fn strip(doc: &mut serde_json::Value, path: &[&str]) {
        let (last, parents) = path.split_last().unwrap();
        let mut node = doc;
        for p in parents {
            node = &mut node[*p];
        }
        if let Some(obj) = node.as_object_mut() {
            obj.remove(*last);
        }
    }

    const FIELDS: [&[&str]; 12] = [
        &["patient_id"],
        &["drug"],
        &["risk_assessment", "risk_label"],
        &["risk_assessment", "confidence_score"],
        &["risk_assessment", "severity"],
        &["pharmacogenomic_profile", "primary_gene"],
        &["pharmacogenomic_profile", "diplotype"],
        &["pharmacogenomic_profile", "phenotype"],
        &["pharmacogenomic_profile", "detected_variants"],
        &["clinical_recommendation", "action"],
        &["llm_generated_explanation", "summary"],
        &["quality_metrics"],
    ];

    proptest::proptest! {
        #[test]
        fn any_field_subset_renders(keep in proptest::collection::vec(proptest::bool::ANY, 12)) {
            let mut doc = json!({
                "patient_id": "PATIENT_001",
                "drug": "CODEINE",
                "risk_assessment": {"risk_label": "Toxic", "confidence_score": 0.9, "severity": "high"},
                "pharmacogenomic_profile": {
                    "primary_gene": "CYP2D6",
                    "diplotype": "*4/*4",
                    "phenotype": "PM",
                    "detected_variants": [{"rsid": "rs3892097", "impact": "no function"}, {}]
                },
                "clinical_recommendation": {"action": "Avoid codeine."},
                "llm_generated_explanation": {"summary": "No CYP2D6 activity."},
                "quality_metrics": {"vcf_parsing_success": true, "variants_detected": 2}
            });
            for (path, kept) in FIELDS.iter().zip(&keep) {
                if !kept {
                    strip(&mut doc, path);
                }
            }
            let a = analysis(doc);
            let card = RiskCard::build(&a, "WARFARIN");

            proptest::prop_assert_eq!(&card.drug, if keep[1] { "CODEINE" } else { "WARFARIN" });
            proptest::prop_assert_eq!(card.headline(), if keep[2] { "TOXIC" } else { "UNKNOWN" });
            proptest::prop_assert_eq!(&card.confidence_text, if keep[3] { "90.0%" } else { "0.0%" });
            for (cell, idx, present) in [
                (&card.profile[0], 5, "CYP2D6"),
                (&card.profile[1], 6, "*4/*4"),
                (&card.profile[2], 7, "PM"),
            ] {
                proptest::prop_assert_eq!(&cell.value, if keep[idx] { present } else { EMPTY_VALUE });
            }
            if keep[8] {
                proptest::prop_assert_eq!(card.variants.len(), 2);
                proptest::prop_assert_eq!(&card.variants[1].rsid, EMPTY_RSID);
            } else {
                proptest::prop_assert!(card.variants.is_empty());
            }
            proptest::prop_assert_eq!(card.recommendation.is_some(), keep[9]);
            proptest::prop_assert_eq!(ExplanationView::build(&a).summary.is_some(), keep[10]);
            proptest::prop_assert_eq!(quality_metrics(&a).len(), if keep[11] { 2 } else { 0 });

            let text = to_text(&a, "WARFARIN");
            proptest::prop_assert!(text.contains(card.headline()));
            let exported: serde_json::Value = serde_json::from_str(&export_json(&a)).unwrap();
            proptest::prop_assert_eq!(exported.get("patient_id").is_some(), keep[0]);
            proptest::prop_assert!(export_file_name(&a).ends_with(".json"));
        }
    }
}
