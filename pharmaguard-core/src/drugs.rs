//! Drug catalogue and the user's target-drug selection.

use serde::{Deserialize, Serialize};

/// Drugs offered for one-key selection.
pub const SUPPORTED_DRUGS: [&str; 6] = [
    "CODEINE",
    "WARFARIN",
    "CLOPIDOGREL",
    "SIMVASTATIN",
    "AZATHIOPRINE",
    "FLUOROURACIL",
];

/// Primary pharmacogene for a catalogue drug.
pub fn primary_gene(drug: &str) -> Option<&'static str> {
    match drug {
        "CODEINE" => Some("CYP2D6"),
        "WARFARIN" => Some("CYP2C9"),
        "CLOPIDOGREL" => Some("CYP2C19"),
        "SIMVASTATIN" => Some("SLCO1B1"),
        "AZATHIOPRINE" => Some("TPMT"),
        "FLUOROURACIL" => Some("DPYD"),
        _ => None,
    }
}

pub fn is_supported(drug: &str) -> bool {
    SUPPORTED_DRUGS.contains(&drug)
}

/// Canonical form of a user-typed drug name.
pub fn normalize(name: &str) -> Option<String> {
    let d = name.trim().to_uppercase();
    if d.is_empty() {
        None
    } else {
        Some(d)
    }
}

/// Ordered, duplicate-free set of target drugs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugSelection {
    selected: Vec<String>,
}

impl DrugSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from arbitrary names, normalizing and dropping duplicates.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sel = Self::new();
        for n in names {
            sel.add_custom(n.as_ref());
        }
        sel
    }

    /// Select if absent, deselect if present.
    pub fn toggle(&mut self, drug: &str) {
        if let Some(pos) = self.selected.iter().position(|d| d == drug) {
            self.selected.remove(pos);
        } else {
            self.selected.push(drug.to_string());
        }
    }

    /// Add a free-text drug. Returns the normalized name if it was newly added.
    pub fn add_custom(&mut self, name: &str) -> Option<String> {
        let d = normalize(name)?;
        if self.contains(&d) {
            return None;
        }
        self.selected.push(d.clone());
        Some(d)
    }

    pub fn remove(&mut self, drug: &str) {
        self.selected.retain(|d| d != drug);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, drug: &str) -> bool {
        self.selected.iter().any(|d| d == drug)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Drugs in the order they were selected. This is also the order sent to
    /// the backend; the first entry is the one a single-drug request carries.
    pub fn selected(&self) -> &[String] {
        &self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut sel = DrugSelection::new();
        sel.toggle("WARFARIN");
        assert!(sel.contains("WARFARIN"));
        sel.toggle("WARFARIN");
        assert!(sel.is_empty());
    }

    #[test]
    fn custom_is_trimmed_uppercased_and_deduplicated() {
        let mut sel = DrugSelection::new();
        assert_eq!(sel.add_custom("  tamoxifen "), Some("TAMOXIFEN".into()));
        assert_eq!(sel.add_custom("Tamoxifen"), None);
        assert_eq!(sel.add_custom("   "), None);
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn selection_order_is_kept_across_custom_drugs() {
        let mut sel = DrugSelection::new();
        sel.toggle("WARFARIN");
        sel.add_custom("tamoxifen");
        sel.toggle("CODEINE");
        sel.add_custom("ondansetron");
        assert_eq!(
            sel.selected(),
            ["WARFARIN", "TAMOXIFEN", "CODEINE", "ONDANSETRON"]
        );
    }

    #[test]
    fn every_catalogue_drug_has_a_gene() {
        for d in SUPPORTED_DRUGS {
            assert!(primary_gene(d).is_some(), "{d}");
        }
        assert_eq!(primary_gene("TAMOXIFEN"), None);
    }
}
