//! In-memory collection of analyses for one synthesis run.

use std::collections::BTreeSet;

use weave_core::enums::Methodology;
use weave_core::records::StandardizedAnalysis;

/// Analyses keyed by `(methodology, source)`, kept in insertion order.
///
/// The store is filled once before synthesis and only read afterwards.
/// Independent stores can be synthesized concurrently.
#[derive(Debug, Clone, Default)]
pub struct AnalysisStore {
    analyses: Vec<StandardizedAnalysis>,
}

impl AnalysisStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            analyses: Vec::new(),
        }
    }

    /// Add an analysis. An analysis with the same methodology and source
    /// replaces the earlier one in place and is returned.
    pub fn insert(&mut self, analysis: StandardizedAnalysis) -> Option<StandardizedAnalysis> {
        let declared = analysis.metadata.confidence;
        if !(0.0..=1.0).contains(&declared) {
            tracing::warn!(
                analysis = %analysis.id(),
                confidence = declared,
                "declared confidence outside 0..=1, clamping"
            );
        }

        let existing = self.analyses.iter().position(|a| {
            a.methodology == analysis.methodology && a.metadata.source == analysis.metadata.source
        });
        match existing {
            Some(index) => {
                tracing::info!(analysis = %analysis.id(), "replacing analysis with same methodology and source");
                Some(std::mem::replace(&mut self.analyses[index], analysis))
            }
            None => {
                self.analyses.push(analysis);
                None
            }
        }
    }

    #[must_use]
    pub fn analyses(&self) -> &[StandardizedAnalysis] {
        &self.analyses
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StandardizedAnalysis> {
        self.analyses.iter().find(|a| a.id() == id)
    }

    #[must_use]
    pub fn methodologies(&self) -> BTreeSet<Methodology> {
        self.analyses.iter().map(|a| a.methodology).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }
}

impl Extend<StandardizedAnalysis> for AnalysisStore {
    fn extend<I: IntoIterator<Item = StandardizedAnalysis>>(&mut self, iter: I) {
        for analysis in iter {
            self.insert(analysis);
        }
    }
}

impl FromIterator<StandardizedAnalysis> for AnalysisStore {
    fn from_iter<I: IntoIterator<Item = StandardizedAnalysis>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use weave_core::records::Risk;

    fn analysis(methodology: Methodology, source: &str) -> StandardizedAnalysis {
        StandardizedAnalysis::new(
            methodology,
            source,
            Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn same_key_replaces_in_place() {
        let mut store = AnalysisStore::new();
        store.insert(analysis(Methodology::Stride, "a"));
        store.insert(analysis(Methodology::Pasta, "a"));
        let replaced = store.insert(
            analysis(Methodology::Stride, "a").with_risk(Risk::new("r1", "Fraud", 4.0)),
        );

        assert!(replaced.is_some());
        assert_eq!(store.len(), 2);
        assert_eq!(store.analyses()[0].methodology, Methodology::Stride);
        assert_eq!(store.analyses()[0].risks.len(), 1);
    }

    #[test]
    fn different_sources_coexist() {
        let store: AnalysisStore = [
            analysis(Methodology::Stride, "team-a"),
            analysis(Methodology::Stride, "team-b"),
        ]
        .into_iter()
        .collect();

        assert_eq!(store.len(), 2);
        assert_eq!(store.methodologies().len(), 1);
        assert!(store.get("stride:team-b").is_some());
    }
}
