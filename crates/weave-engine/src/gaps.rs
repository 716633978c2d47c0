//! Gap detection: absent methodology coverage, thin per-entity coverage,
//! missing mitigations and compliance controls, unclassified or
//! under-protected data, and incomplete threat-category coverage.
//!
//! Six independent passes feed one list, which is deduplicated by
//! `(gap type, sorted affected entities)` keeping the most severe entry and
//! then ranked by severity.

use std::collections::{BTreeMap, BTreeSet};

use weave_config::CalibrationConfig;
use weave_core::enums::{Effort, GapType, Methodology, Severity};
use weave_core::findings::Gap;
use weave_core::normalize::THREAT_CATEGORIES;
use weave_core::records::{Entity, StandardizedAnalysis};

use crate::pool::{EntityRecord, PoolIndex};
use crate::stats::ratio;
use crate::text::{mentions_any, normalize_words};

const ENCRYPTION_EVIDENCE: &[&str] = &["encrypt", "cipher", "kms", "tde"];
const ACCESS_CONTROL_EVIDENCE: &[&str] = &[
    "access control",
    "rbac",
    "role based",
    "authorization",
    "authorisation",
    "least privilege",
    "permission",
];
const SEGMENTATION_EVIDENCE: &[&str] = &[
    "segmentation",
    "segmented",
    "network isolation",
    "firewall",
    "vlan",
    "dmz",
];
const AUDIT_EVIDENCE: &[&str] = &["audit"];

const PRIVACY_REGULATIONS: &[&str] = &["GDPR", "CCPA"];

/// Detects gaps with a fixed calibration.
#[derive(Debug, Clone, Copy)]
pub struct GapDetector<'c> {
    calibration: &'c CalibrationConfig,
}

/// Detect gaps with the default calibration.
#[must_use]
pub fn detect_gaps(analyses: &[StandardizedAnalysis]) -> Vec<Gap> {
    GapDetector::new(&CalibrationConfig::default()).detect(analyses)
}

impl<'c> GapDetector<'c> {
    #[must_use]
    pub const fn new(calibration: &'c CalibrationConfig) -> Self {
        Self { calibration }
    }

    /// Deduplicated gaps, most severe first, with ids `GAP-001`, ...
    #[must_use]
    pub fn detect(&self, analyses: &[StandardizedAnalysis]) -> Vec<Gap> {
        self.detect_in(&PoolIndex::build(analyses))
    }

    pub(crate) fn detect_in(&self, index: &PoolIndex<'_>) -> Vec<Gap> {
        if index.is_empty() {
            return Vec::new();
        }

        let mut gaps = methodology_gaps(index);
        gaps.extend(self.entity_coverage_gaps(index));
        gaps.extend(control_gaps(index));
        gaps.extend(compliance_gaps(index));
        gaps.extend(self.data_gaps(index));
        gaps.extend(completeness_gaps(index));

        let detected = gaps.len();
        let gaps = rank(dedupe(gaps));
        tracing::debug!(detected, kept = gaps.len(), "gap detection complete");
        gaps
    }

    fn entity_coverage_gaps(&self, index: &PoolIndex<'_>) -> Vec<Gap> {
        let calibration = self.calibration;
        let mut gaps = Vec::new();

        for (key, record) in &index.entities {
            let critical = record.is_high_criticality();

            let threats = index.threats_on.get(key).map_or(0, BTreeSet::len);
            let threat_coverage =
                ratio(threats, calibration.threat_category_reference as usize).min(1.0);
            if threat_coverage < calibration.threat_coverage_threshold {
                gaps.push(
                    GapDraft::new(
                        GapType::InsufficientThreatCoverage,
                        if critical { Severity::High } else { Severity::Medium },
                        format!(
                            "{}: threat coverage {:.0}% ({threats} threat(s) against a reference of {})",
                            record.name,
                            threat_coverage * 100.0,
                            calibration.threat_category_reference
                        ),
                    )
                    .recommend(
                        format!("Enumerate threats for {} across every canonical category", record.name),
                        Effort::Medium,
                    )
                    .impact("Attack paths through this entity have not been examined")
                    .entities(vec![record.name.clone()])
                    .sources(record.sources.iter().cloned())
                    .build(),
                );
            }

            let controls = index.protection(key);
            let control_coverage =
                ratio(controls, calibration.expected_controls as usize).min(1.0);
            if control_coverage < calibration.control_coverage_threshold {
                gaps.push(
                    GapDraft::new(
                        GapType::InsufficientControlCoverage,
                        if critical { Severity::Critical } else { Severity::High },
                        format!(
                            "{}: control coverage {:.0}% ({controls} protecting control(s), {} expected)",
                            record.name,
                            control_coverage * 100.0,
                            calibration.expected_controls
                        ),
                    )
                    .recommend(
                        format!("Map or add protecting controls for {}", record.name),
                        Effort::Medium,
                    )
                    .impact("A compromise of this entity meets little or no resistance")
                    .entities(vec![record.name.clone()])
                    .sources(record.sources.iter().cloned())
                    .build(),
                );
            }
        }
        gaps
    }

    fn data_gaps(&self, index: &PoolIndex<'_>) -> Vec<Gap> {
        let mut gaps = Vec::new();

        let unclassified: Vec<&EntityRecord<'_>> = index
            .entities
            .values()
            .filter(|r| r.any(Entity::is_datastore) && !r.any(|e| e.properties.is_classified()))
            .collect();
        if !unclassified.is_empty() {
            gaps.push(
                GapDraft::new(
                    GapType::UnclassifiedData,
                    Severity::Medium,
                    format!(
                        "{} data store(s) carry no data classification",
                        unclassified.len()
                    ),
                )
                .recommend("Classify every data store by sensitivity", Effort::Low)
                .impact("Protection requirements for unclassified data cannot be derived")
                .records(&unclassified)
                .build(),
            );
        }

        let minimum = self.calibration.min_high_value_controls as usize;
        let underprotected: Vec<&EntityRecord<'_>> = index
            .entities
            .iter()
            .filter(|(key, record)| {
                record.any(|e| e.properties.is_high_value()) && index.protection(key) < minimum
            })
            .map(|(_, record)| record)
            .collect();
        if !underprotected.is_empty() {
            gaps.push(
                GapDraft::new(
                    GapType::UnderprotectedHighValueAssets,
                    Severity::Critical,
                    format!(
                        "{} high-value asset(s) have fewer than {minimum} distinct protecting controls",
                        underprotected.len()
                    ),
                )
                .recommend(
                    format!("Layer at least {minimum} independent controls on each high-value asset"),
                    Effort::High,
                )
                .impact("The most valuable assets are the least defended")
                .records(&underprotected)
                .build(),
            );
        }
        gaps
    }
}

fn methodology_gaps(index: &PoolIndex<'_>) -> Vec<Gap> {
    let mut gaps = Vec::new();

    let personal = records_where(index, |e| e.properties.holds_personal_data());
    if !personal.is_empty() && !index.has_methodology(Methodology::is_privacy) {
        gaps.push(
            GapDraft::new(
                GapType::MissingPrivacyAnalysis,
                Severity::High,
                format!(
                    "{} entit(ies) hold personal data but no privacy methodology was applied",
                    personal.len()
                ),
            )
            .recommend("Run a LINDDUN analysis over the personal-data flows", Effort::Medium)
            .impact("Privacy harms and regulatory exposure are unassessed")
            .compliance(PRIVACY_REGULATIONS)
            .suggest(Methodology::Linddun)
            .records(&personal)
            .build(),
        );
    }

    let ai = records_where(index, Entity::is_ai_component);
    if !ai.is_empty() && !index.has_methodology(Methodology::is_ai_specialised) {
        gaps.push(
            GapDraft::new(
                GapType::MissingAiAnalysis,
                Severity::Critical,
                format!(
                    "{} AI/ML component(s) present but no AI-specialised methodology was applied",
                    ai.len()
                ),
            )
            .recommend(
                "Run a MAESTRO analysis covering model, data and agent threats",
                Effort::Medium,
            )
            .impact("Prompt injection, poisoning and model theft are unassessed")
            .compliance(&["EU AI Act"])
            .suggest(Methodology::Maestro)
            .records(&ai)
            .build(),
        );
    }

    if !index.has_methodology(Methodology::is_quantitative) {
        gaps.push(
            GapDraft::new(
                GapType::MissingQuantitativeAnalysis,
                Severity::Medium,
                "No quantitative scoring methodology was applied".to_string(),
            )
            .recommend("Score the identified threats with DREAD", Effort::Medium)
            .impact("Risks cannot be ranked on a comparable numeric scale")
            .suggest(Methodology::Dread)
            .sources(index.analysis_ids.iter().cloned())
            .build(),
        );
    }

    if index.methodologies.iter().all(|m| m.is_technical()) {
        gaps.push(
            GapDraft::new(
                GapType::MissingBusinessAnalysis,
                Severity::Medium,
                "Only technical methodologies were applied; business context is missing"
                    .to_string(),
            )
            .recommend(
                "Run a PASTA analysis to tie threats to business impact",
                Effort::Medium,
            )
            .impact("Technical findings cannot be prioritised by business impact")
            .suggest(Methodology::Pasta)
            .sources(index.analysis_ids.iter().cloned())
            .build(),
        );
    }
    gaps
}

fn control_gaps(index: &PoolIndex<'_>) -> Vec<Gap> {
    let mut gaps = Vec::new();

    for threat_ref in &index.threats {
        let threat = threat_ref.threat;
        let affected: Vec<String> = threat_ref
            .entity
            .iter()
            .map(|key| index.display_name(key))
            .collect();

        match threat_ref.mitigators {
            0 => {
                let severity = threat.severity();
                gaps.push(
                    GapDraft::new(
                        GapType::UnmitigatedThreat,
                        severity,
                        format!(
                            "Threat '{}' ({}) has no mitigating control",
                            threat.name,
                            threat.category_key()
                        ),
                    )
                    .recommend(
                        format!("Implement a control that mitigates '{}'", threat.name),
                        Effort::Medium,
                    )
                    .impact(severity_impact(severity))
                    .entities(affected)
                    .sources([threat_ref.analysis_id.clone()])
                    .build(),
                );
            }
            1 => gaps.push(
                GapDraft::new(
                    GapType::SinglePointOfFailure,
                    Severity::Medium,
                    format!("Threat '{}' relies on a single mitigating control", threat.name),
                )
                .recommend(
                    format!("Add a second, independent control against '{}'", threat.name),
                    Effort::Medium,
                )
                .impact("One control failure leaves the threat fully open")
                .entities(affected)
                .sources([threat_ref.analysis_id.clone()])
                .build(),
            ),
            _ => {}
        }
    }

    let mut weak_names = BTreeSet::new();
    let mut weak_entities = BTreeSet::new();
    let mut weak_sources = BTreeSet::new();
    for (at, analysis) in index.analyses.iter().enumerate() {
        for control in analysis.controls.iter().filter(|c| c.is_weak()) {
            weak_names.insert(control.name.trim().to_string());
            if let Some(reference) = control.protects_entity.as_deref() {
                weak_entities.insert(index.display_name(&index.resolve(at, reference)));
            }
            weak_sources.insert(index.analysis_ids[at].clone());
        }
    }
    if !weak_names.is_empty() {
        let names: Vec<String> = weak_names.into_iter().collect();
        gaps.push(
            GapDraft::new(
                GapType::IneffectiveControls,
                Severity::High,
                format!(
                    "{} control(s) rated low or untested: {}",
                    names.len(),
                    names.join(", ")
                ),
            )
            .recommend("Test the flagged controls and strengthen or replace the weak ones", Effort::Low)
            .impact("Threats counted as mitigated may in fact be open")
            .entities(weak_entities.into_iter().collect())
            .sources(weak_sources)
            .build(),
        );
    }
    gaps
}

fn compliance_gaps(index: &PoolIndex<'_>) -> Vec<Gap> {
    let evidence: Vec<String> = index
        .analyses
        .iter()
        .flat_map(|a| &a.controls)
        .map(|c| normalize_words(&c.evidence_text()))
        .collect();
    let has_evidence = |phrases: &[&str]| evidence.iter().any(|e| mentions_any(e, phrases));

    let mut gaps = Vec::new();
    let mut require = |records: &[&EntityRecord<'_>],
                       phrases: &[&str],
                       gap_type: GapType,
                       what: &str,
                       regulations: &[&str]| {
        if records.is_empty() || has_evidence(phrases) {
            return;
        }
        gaps.push(
            GapDraft::new(
                gap_type,
                Severity::High,
                format!(
                    "No {what} control found for {} entit(ies) holding {} data",
                    records.len(),
                    regulations.join("/")
                ),
            )
            .recommend(format!("Implement and document {what}"), Effort::Medium)
            .impact(format!("Non-compliance with {}", regulations.join(", ")))
            .compliance(regulations)
            .records(records)
            .build(),
        );
    };

    let personal = records_where(index, |e| e.properties.holds_personal_data());
    require(
        &personal,
        ENCRYPTION_EVIDENCE,
        GapType::MissingEncryptionAtRest,
        "encryption at rest",
        PRIVACY_REGULATIONS,
    );
    require(
        &personal,
        ACCESS_CONTROL_EVIDENCE,
        GapType::MissingAccessControl,
        "role-based access control",
        PRIVACY_REGULATIONS,
    );

    let payment = records_where(index, |e| e.properties.holds_payment_data());
    require(
        &payment,
        SEGMENTATION_EVIDENCE,
        GapType::MissingNetworkSegmentation,
        "network segmentation",
        &["PCI-DSS"],
    );

    let health = records_where(index, |e| e.properties.holds_health_data());
    require(
        &health,
        AUDIT_EVIDENCE,
        GapType::MissingAuditLogging,
        "audit logging",
        &["HIPAA"],
    );

    gaps
}

fn completeness_gaps(index: &PoolIndex<'_>) -> Vec<Gap> {
    let mut gaps = Vec::new();

    let present: BTreeSet<String> = index
        .threats
        .iter()
        .map(|t| t.threat.category_key())
        .collect();
    let missing: Vec<&str> = THREAT_CATEGORIES
        .iter()
        .copied()
        .filter(|c| !present.contains(*c))
        .collect();
    if !missing.is_empty() {
        gaps.push(
            GapDraft::new(
                GapType::MissingThreatCategories,
                Severity::Medium,
                format!("Threat categories never considered: {}", missing.join(", ")),
            )
            .recommend(
                "Extend the threat enumeration to the missing categories",
                Effort::Low,
            )
            .impact("Whole classes of attack are absent from the model")
            .sources(index.analysis_ids.iter().cloned())
            .build(),
        );
    }

    if !index.threats.iter().any(|t| t.threat.is_adversary_sourced()) {
        gaps.push(
            GapDraft::new(
                GapType::MissingExternalThreats,
                Severity::High,
                "No threat is attributed to an external adversary".to_string(),
            )
            .recommend(
                "Model external attacker goals and entry points",
                Effort::Medium,
            )
            .impact("The model does not account for deliberate outside attack")
            .sources(index.analysis_ids.iter().cloned())
            .build(),
        );
    }

    let third_parties = records_where(index, Entity::is_third_party);
    if !third_parties.is_empty() && !index.threats.iter().any(|t| t.threat.is_supply_chain()) {
        gaps.push(
            GapDraft::new(
                GapType::MissingSupplyChainThreats,
                Severity::High,
                format!(
                    "{} third-party entit(ies) but no supply-chain threat was modelled",
                    third_parties.len()
                ),
            )
            .recommend(
                "Assess vendor compromise and dependency tampering scenarios",
                Effort::Medium,
            )
            .impact("A compromised supplier is an unexamined path into the system")
            .records(&third_parties)
            .build(),
        );
    }
    gaps
}

fn records_where<'i, 'a>(
    index: &'i PoolIndex<'a>,
    predicate: impl Fn(&Entity) -> bool,
) -> Vec<&'i EntityRecord<'a>> {
    index
        .entities
        .values()
        .filter(|record| record.any(&predicate))
        .collect()
}

const fn severity_impact(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Exploitation could cause severe financial, legal or safety damage",
        Severity::High => "Exploitation would cause significant business impact",
        Severity::Medium => "Exploitation would cause moderate, contained impact",
        Severity::Low => "Exploitation would cause minor impact",
    }
}

/// Keep the most severe gap per dedupe key, in first-seen position, and merge
/// the sources of the dropped duplicates into it.
fn dedupe(gaps: Vec<Gap>) -> Vec<Gap> {
    let mut kept: Vec<Gap> = Vec::with_capacity(gaps.len());
    let mut positions: BTreeMap<(GapType, Vec<String>), usize> = BTreeMap::new();

    for gap in gaps {
        let key = gap.dedupe_key();
        if let Some(&at) = positions.get(&key) {
            let mut sources: BTreeSet<String> = kept[at].sources.drain(..).collect();
            sources.extend(gap.sources.iter().cloned());
            if gap.severity > kept[at].severity {
                kept[at] = gap;
            }
            kept[at].sources = sources.into_iter().collect();
        } else {
            positions.insert(key, kept.len());
            kept.push(gap);
        }
    }
    kept
}

/// Stable sort by descending severity, then number the result.
fn rank(mut gaps: Vec<Gap>) -> Vec<Gap> {
    gaps.sort_by(|a, b| b.severity.cmp(&a.severity));
    for (position, gap) in gaps.iter_mut().enumerate() {
        gap.id = format!("GAP-{:03}", position + 1);
    }
    gaps
}

/// Builder for the fields every pass fills the same way.
struct GapDraft {
    gap: Gap,
}

impl GapDraft {
    fn new(gap_type: GapType, severity: Severity, description: String) -> Self {
        Self {
            gap: Gap {
                id: String::new(),
                gap_type,
                category: gap_type.category(),
                severity,
                description,
                affected_entities: Vec::new(),
                recommendation: String::new(),
                effort: Effort::Medium,
                business_impact: String::new(),
                compliance_impact: Vec::new(),
                suggested_methodology: None,
                sources: Vec::new(),
            },
        }
    }

    fn recommend(mut self, recommendation: impl Into<String>, effort: Effort) -> Self {
        self.gap.recommendation = recommendation.into();
        self.gap.effort = effort;
        self
    }

    fn impact(mut self, business_impact: impl Into<String>) -> Self {
        self.gap.business_impact = business_impact.into();
        self
    }

    fn compliance(mut self, regulations: &[&str]) -> Self {
        self.gap.compliance_impact = regulations.iter().map(ToString::to_string).collect();
        self
    }

    const fn suggest(mut self, methodology: Methodology) -> Self {
        self.gap.suggested_methodology = Some(methodology);
        self
    }

    fn entities(mut self, names: Vec<String>) -> Self {
        self.gap.affected_entities = names;
        self
    }

    fn sources(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        let ids: BTreeSet<String> = ids.into_iter().collect();
        self.gap.sources = ids.into_iter().collect();
        self
    }

    /// Affected entities and sources from a set of entity records.
    fn records(self, records: &[&EntityRecord<'_>]) -> Self {
        let names = records.iter().map(|r| r.name.clone()).collect();
        let sources: Vec<String> = records
            .iter()
            .flat_map(|r| r.sources.iter().cloned())
            .collect();
        self.entities(names).sources(sources)
    }

    fn build(self) -> Gap {
        self.gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use weave_core::records::{Control, Entity, Threat};

    fn analysis(methodology: Methodology, source: &str) -> StandardizedAnalysis {
        StandardizedAnalysis::new(
            methodology,
            source,
            Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
        )
    }

    fn of_type(gaps: &[Gap], gap_type: GapType) -> Vec<&Gap> {
        gaps.iter().filter(|g| g.gap_type == gap_type).collect()
    }

    #[test]
    fn empty_pool_has_no_gaps() {
        assert!(detect_gaps(&[]).is_empty());
    }

    #[test]
    fn personal_data_without_privacy_methodology() {
        let analyses = vec![
            analysis(Methodology::Stride, "a")
                .with_entity(Entity::new("e1", "CRM", "datastore").with_personal_data(true)),
        ];
        let gaps = detect_gaps(&analyses);
        let privacy = of_type(&gaps, GapType::MissingPrivacyAnalysis);
        assert_eq!(privacy.len(), 1);
        assert_eq!(privacy[0].severity, Severity::High);
        assert_eq!(privacy[0].suggested_methodology, Some(Methodology::Linddun));
        assert_eq!(privacy[0].affected_entities, vec!["CRM".to_string()]);
        assert_eq!(privacy[0].sources, vec!["stride:a".to_string()]);

        let with_linddun = vec![
            analyses[0].clone(),
            analysis(Methodology::Linddun, "b"),
        ];
        assert!(of_type(&detect_gaps(&with_linddun), GapType::MissingPrivacyAnalysis).is_empty());
    }

    #[test]
    fn ai_component_without_maestro_is_critical() {
        let analyses = vec![
            analysis(Methodology::Stride, "a")
                .with_entity(Entity::new("e1", "Ranker", "component").with_technology("LLM")),
        ];
        let gaps = detect_gaps(&analyses);
        let ai = of_type(&gaps, GapType::MissingAiAnalysis);
        assert_eq!(ai.len(), 1);
        assert_eq!(ai[0].severity, Severity::Critical);
    }

    #[test]
    fn business_gap_only_when_all_methodologies_are_technical() {
        let technical = vec![analysis(Methodology::Stride, "a"), analysis(Methodology::Hazop, "b")];
        assert_eq!(
            of_type(&detect_gaps(&technical), GapType::MissingBusinessAnalysis).len(),
            1
        );
        let mixed = vec![analysis(Methodology::Stride, "a"), analysis(Methodology::Octave, "b")];
        assert!(of_type(&detect_gaps(&mixed), GapType::MissingBusinessAnalysis).is_empty());
    }

    #[test]
    fn single_mitigation_is_a_single_point_of_failure() {
        let analyses = vec![
            analysis(Methodology::Stride, "a")
                .with_entity(Entity::new("e1", "API", "component"))
                .with_threat(Threat::new("t1", "Replay", "spoofing", "high").affecting("e1"))
                .with_threat(Threat::new("t2", "Forgery", "tampering", "low").affecting("e1"))
                .with_control(Control::new("c1", "Nonce").mitigating("t1"))
                .with_control(Control::new("c2", "Signatures").mitigating("t2"))
                .with_control(Control::new("c3", "HMAC").mitigating("t2")),
        ];
        let gaps = detect_gaps(&analyses);
        let spof = of_type(&gaps, GapType::SinglePointOfFailure);
        assert_eq!(spof.len(), 1);
        assert!(spof[0].description.contains("Replay"));
        assert!(of_type(&gaps, GapType::UnmitigatedThreat).is_empty());
    }

    #[test]
    fn weak_controls_aggregate_into_one_gap() {
        let analyses = vec![
            analysis(Methodology::Stride, "a")
                .with_control(Control::new("c1", "WAF").with_effectiveness("low"))
                .with_control(Control::new("c2", "IDS").with_effectiveness("untested")),
            analysis(Methodology::Dread, "b")
                .with_control(Control::new("c9", "Backups").with_effectiveness("weak")),
        ];
        let gaps = detect_gaps(&analyses);
        let weak = of_type(&gaps, GapType::IneffectiveControls);
        assert_eq!(weak.len(), 1);
        assert_eq!(weak[0].severity, Severity::High);
        assert!(weak[0].description.starts_with("3 control(s)"));
        assert_eq!(weak[0].sources.len(), 2);
    }

    #[test]
    fn compliance_evidence_is_read_from_controls() {
        let entity = Entity::new("e1", "Ledger", "datastore")
            .with_classification("PII")
            .with_tag("pci");
        let bare = vec![analysis(Methodology::Stride, "a").with_entity(entity.clone())];
        let gaps = detect_gaps(&bare);
        assert_eq!(of_type(&gaps, GapType::MissingEncryptionAtRest).len(), 1);
        assert_eq!(of_type(&gaps, GapType::MissingAccessControl).len(), 1);
        let segmentation = of_type(&gaps, GapType::MissingNetworkSegmentation);
        assert_eq!(segmentation.len(), 1);
        assert_eq!(segmentation[0].compliance_impact, vec!["PCI-DSS".to_string()]);
        assert!(of_type(&gaps, GapType::MissingAuditLogging).is_empty());

        let covered = vec![
            analysis(Methodology::Stride, "a")
                .with_entity(entity)
                .with_control(Control::new("c1", "AES-256 encrypted volumes"))
                .with_control(Control::new("c2", "Role-based access"))
                .with_control(Control::new("c3", "Cardholder network segmentation")),
        ];
        let gaps = detect_gaps(&covered);
        assert!(of_type(&gaps, GapType::MissingEncryptionAtRest).is_empty());
        assert!(of_type(&gaps, GapType::MissingAccessControl).is_empty());
        assert!(of_type(&gaps, GapType::MissingNetworkSegmentation).is_empty());
    }

    #[test]
    fn data_classification_gaps() {
        let analyses = vec![
            analysis(Methodology::Stride, "a")
                .with_entity(Entity::new("e1", "Orders", "datastore"))
                .with_entity(Entity::new("e2", "Logs", "datastore").with_classification("internal"))
                .with_entity(Entity::new("e3", "Vault", "component").with_criticality("critical"))
                .with_control(Control::new("c1", "HSM").protecting("e3"))
                .with_control(Control::new("c2", "MFA").protecting("e3")),
        ];
        let gaps = detect_gaps(&analyses);

        let unclassified = of_type(&gaps, GapType::UnclassifiedData);
        assert_eq!(unclassified.len(), 1);
        assert_eq!(unclassified[0].affected_entities, vec!["Orders".to_string()]);

        let underprotected = of_type(&gaps, GapType::UnderprotectedHighValueAssets);
        assert_eq!(underprotected.len(), 1);
        assert_eq!(underprotected[0].severity, Severity::Critical);
        assert_eq!(underprotected[0].affected_entities, vec!["Vault".to_string()]);
    }

    #[test]
    fn missing_categories_are_listed() {
        let analyses = vec![
            analysis(Methodology::Stride, "a")
                .with_threat(Threat::new("t1", "Replay", "Spoofing", "low").with_source("external"))
                .with_threat(Threat::new("t2", "Flood", "DoS", "low")),
        ];
        let gaps = detect_gaps(&analyses);
        let missing = of_type(&gaps, GapType::MissingThreatCategories);
        assert_eq!(missing.len(), 1);
        assert!(missing[0].description.contains("tampering"));
        assert!(!missing[0].description.contains("spoofing"));
        assert!(!missing[0].description.contains("denial-of-service"));
        assert!(of_type(&gaps, GapType::MissingExternalThreats).is_empty());
    }

    #[test]
    fn third_party_without_supply_chain_threat() {
        let vendor = Entity::new("e1", "Payment Processor", "third-party");
        let analyses = vec![analysis(Methodology::Pasta, "a").with_entity(vendor.clone())];
        assert_eq!(
            of_type(&detect_gaps(&analyses), GapType::MissingSupplyChainThreats).len(),
            1
        );

        let modelled = vec![
            analysis(Methodology::Pasta, "a")
                .with_entity(vendor)
                .with_threat(Threat::new("t1", "Compromised SDK", "supply chain", "high")),
        ];
        assert!(of_type(&detect_gaps(&modelled), GapType::MissingSupplyChainThreats).is_empty());
    }

    #[test]
    fn duplicates_keep_the_most_severe() {
        let analyses = vec![
            analysis(Methodology::Stride, "a")
                .with_entity(Entity::new("e1", "API", "component"))
                .with_threat(Threat::new("t1", "Replay", "spoofing", "medium").affecting("e1"))
                .with_threat(Threat::new("t2", "Injection", "tampering", "critical").affecting("e1")),
        ];
        let gaps = detect_gaps(&analyses);
        let unmitigated = of_type(&gaps, GapType::UnmitigatedThreat);
        assert_eq!(unmitigated.len(), 1);
        assert_eq!(unmitigated[0].severity, Severity::Critical);
    }

    #[test]
    fn gaps_are_ranked_and_numbered() {
        let analyses = vec![
            analysis(Methodology::Stride, "a")
                .with_entity(Entity::new("e1", "Model", "ml-model"))
                .with_entity(Entity::new("e2", "Orders", "datastore")),
        ];
        let gaps = detect_gaps(&analyses);
        assert!(gaps.windows(2).all(|w| w[0].severity >= w[1].severity));
        assert_eq!(gaps[0].id, "GAP-001");
        assert_eq!(gaps[0].severity, Severity::Critical);
        assert!(gaps.iter().all(|g| !g.sources.is_empty()));
    }
}
