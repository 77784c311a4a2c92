//! Synthetic placeholder results.
//!
//! Used only when the failure policy is `Synthesize`. Every document produced
//! here has `Provenance::Synthetic`, an `Unknown` risk label, zero confidence
//! and a `synthetic: true` quality metric. The uploaded file is scanned for
//! rsIDs tagged with the drug's primary gene so the report has something
//! concrete to show, but no risk is ever inferred locally.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::drugs::primary_gene;
use crate::model::{
    Analysis, AnalysisResult, ClinicalRecommendation, DetectedVariant, LlmExplanation,
    PharmacogenomicProfile, Provenance, RiskAssessment,
};
use crate::validation::VcfUpload;

pub const SYNTHETIC_SUMMARY: &str =
    "Synthetic placeholder generated locally because the analysis service was unavailable. \
     It contains no pharmacogenomic interpretation.";

pub const SYNTHETIC_ACTION: &str =
    "No backend analysis available. Do not use this placeholder for clinical decisions.";

/// One VCF data line reduced to what the placeholder needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfRecord {
    pub rsid: Option<String>,
    pub gene: Option<String>,
    pub star: Option<String>,
}

/// Shallow scan of VCF text: sample name plus per-line ID and GENE/STAR tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcfScan {
    pub sample: Option<String>,
    pub records: Vec<VcfRecord>,
}

impl VcfScan {
    pub fn parse(text: &str) -> Self {
        let mut scan = VcfScan::default();
        for line in text.lines() {
            if let Some(header) = line.strip_prefix("#CHROM") {
                // Columns after FORMAT are sample names.
                scan.sample = header.split('\t').nth(9).map(str::trim).filter(|s| !s.is_empty()).map(String::from);
                continue;
            }
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let cols: Vec<&str> = line.trim_end().split('\t').collect();
            if cols.len() < 8 {
                continue;
            }
            let rsid = Some(cols[2]).filter(|id| id.starts_with("rs")).map(String::from);
            let mut gene = None;
            let mut star = None;
            for item in cols[7].split(';') {
                match item.split_once('=') {
                    Some(("GENE", v)) => gene = Some(v.to_string()),
                    Some(("STAR", v)) => star = Some(v.to_string()),
                    _ => {}
                }
            }
            scan.records.push(VcfRecord { rsid, gene, star });
        }
        scan
    }

    /// rsIDs on lines tagged with `gene`, in file order, without duplicates.
    pub fn rsids_for_gene(&self, gene: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for r in &self.records {
            if r.gene.as_deref() != Some(gene) {
                continue;
            }
            if let Some(id) = &r.rsid {
                if !out.contains(id) {
                    out.push(id.clone());
                }
            }
        }
        out
    }
}

/// One synthetic document per drug, timestamped now.
pub fn synthesize(drugs: &[String], upload: &VcfUpload) -> Vec<Analysis> {
    synthesize_at(drugs, upload, Utc::now())
}

pub fn synthesize_at(drugs: &[String], upload: &VcfUpload, now: DateTime<Utc>) -> Vec<Analysis> {
    let scan = VcfScan::parse(&upload.text());
    let patient_id = scan.sample.clone().unwrap_or_else(|| {
        upload
            .name()
            .trim_end_matches(crate::validation::VCF_EXTENSION)
            .to_string()
    });
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);

    drugs
        .iter()
        .map(|drug| {
            let gene = primary_gene(drug);
            let rsids = gene.map(|g| scan.rsids_for_gene(g)).unwrap_or_default();

            let mut metrics = BTreeMap::new();
            metrics.insert(
                "vcf_parsing_success".to_string(),
                serde_json::Value::Bool(!scan.records.is_empty()),
            );
            metrics.insert("variants_detected".to_string(), serde_json::json!(rsids.len()));
            metrics.insert("synthetic".to_string(), serde_json::Value::Bool(true));

            let result = AnalysisResult {
                patient_id: Some(patient_id.clone()),
                drug: Some(drug.clone()),
                timestamp: Some(timestamp.clone()),
                risk_assessment: Some(RiskAssessment {
                    risk_label: Some("Unknown".into()),
                    confidence_score: Some(0.0),
                    severity: Some("none".into()),
                }),
                pharmacogenomic_profile: Some(PharmacogenomicProfile {
                    primary_gene: Some(gene.unwrap_or("Unknown").to_string()),
                    diplotype: Some("Unknown".into()),
                    phenotype: Some("Unknown".into()),
                    detected_variants: rsids
                        .iter()
                        .map(|id| DetectedVariant {
                            rsid: Some(id.clone()),
                            impact: Some("unverified".into()),
                        })
                        .collect(),
                }),
                clinical_recommendation: Some(ClinicalRecommendation {
                    action: Some(SYNTHETIC_ACTION.into()),
                    dose_adjustment: None,
                    cpic_guideline: None,
                }),
                llm_generated_explanation: Some(LlmExplanation {
                    summary: Some(SYNTHETIC_SUMMARY.into()),
                    biological_mechanism: None,
                    clinical_context: None,
                    variants_cited: rsids,
                }),
                quality_metrics: Some(metrics),
            };
            Analysis::from_result(result, Provenance::Synthetic)
        })
        .collect()
}
