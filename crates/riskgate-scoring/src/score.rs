use std::collections::BTreeSet;
use std::fmt;

use riskgate_core::{Commit, RiskConfig};
use serde::{Deserialize, Serialize};

/// Type label used when a message has no `type:` prefix.
pub const OTHER_TYPE: &str = "other";

/// Weight applied to commit types missing from `semantic_weights`.
pub const DEFAULT_SEMANTIC_WEIGHT: f64 = 0.1;

const SEMANTIC_SHARE: f64 = 0.5;
const CRITICAL_PATH_SHARE: f64 = 0.5;

/// Categorical risk derived from a score.
///
/// Lower bounds are inclusive: `>= 0.7` is high, `>= 0.4` is medium.
///
/// # Examples
///
/// ```
/// use riskgate_scoring::RiskLabel;
///
/// assert_eq!(RiskLabel::from_score(0.7), RiskLabel::High);
/// assert_eq!(RiskLabel::from_score(0.65), RiskLabel::Medium);
/// assert_eq!(RiskLabel::from_score(0.39), RiskLabel::Low);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLabel {
    /// Score 0.7–1.0.
    High,
    /// Score 0.4–0.7.
    Medium,
    /// Score below 0.4.
    Low,
}

impl RiskLabel {
    /// Map a score to its label.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            RiskLabel::High
        } else if score >= 0.4 {
            RiskLabel::Medium
        } else {
            RiskLabel::Low
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::High => write!(f, "HIGH"),
            RiskLabel::Medium => write!(f, "MEDIUM"),
            RiskLabel::Low => write!(f, "LOW"),
        }
    }
}

/// Extract the conventional-commit type from a message.
///
/// Everything before the first `:` is the type, with any `(scope)` dropped.
/// Messages without a colon have type `"other"`.
///
/// # Examples
///
/// ```
/// use riskgate_scoring::semantic_type;
///
/// assert_eq!(semantic_type("feat(api): add endpoint"), "feat");
/// assert_eq!(semantic_type("fix: bug"), "fix");
/// assert_eq!(semantic_type("random text no colon"), "other");
/// ```
pub fn semantic_type(message: &str) -> &str {
    let Some((head, _)) = message.split_once(':') else {
        return OTHER_TYPE;
    };
    match head.split_once('(') {
        Some((kind, _)) => kind,
        None => head,
    }
}

/// Score a commit in `[0, 1]`.
///
/// `score = min(0.5 * weight(type) + 0.5 * max criticality of matched prefixes, 1.0)`,
/// where unknown types weigh 0.1 and a commit touching no critical path
/// contributes 0 from paths.
///
/// # Examples
///
/// ```
/// use riskgate_core::{Commit, RiskConfig};
/// use riskgate_scoring::score_commit;
///
/// let commit = Commit {
///     sha: "abc".into(),
///     message: "docs: typo".into(),
///     files: vec!["README.md".into()],
/// };
/// let score = score_commit(&commit, &RiskConfig::default());
/// assert!((score - 0.05).abs() < 1e-12);
/// ```
pub fn score_commit(commit: &Commit, config: &RiskConfig) -> f64 {
    let kind = semantic_type(&commit.message);
    let weight = config
        .semantic_weights
        .get(kind)
        .copied()
        .unwrap_or(DEFAULT_SEMANTIC_WEIGHT);
    let semantic = weight * SEMANTIC_SHARE;

    let criticality = config
        .critical_paths
        .iter()
        .filter(|(prefix, _)| touches_prefix(commit, prefix))
        .map(|(_, meta)| meta.business_criticality)
        .fold(0.0_f64, f64::max);
    let critical = criticality * CRITICAL_PATH_SHARE;

    (semantic + critical).min(1.0)
}

/// Compliance domains of every critical path the commit touches, sorted and
/// de-duplicated.
///
/// # Examples
///
/// ```
/// use riskgate_core::{Commit, RiskConfig};
/// use riskgate_scoring::compliance_requirements;
///
/// let commit = Commit { sha: "a".into(), message: "x".into(), files: vec![] };
/// assert!(compliance_requirements(&commit, &RiskConfig::default()).is_empty());
/// ```
pub fn compliance_requirements(commit: &Commit, config: &RiskConfig) -> Vec<String> {
    let domains: BTreeSet<&str> = config
        .critical_paths
        .iter()
        .filter(|(prefix, _)| touches_prefix(commit, prefix))
        .flat_map(|(_, meta)| meta.compliance_domains.iter().map(String::as_str))
        .collect();
    domains.into_iter().map(str::to_string).collect()
}

fn touches_prefix(commit: &Commit, prefix: &str) -> bool {
    commit.files.iter().any(|f| f.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskgate_core::CriticalPath;

    fn commit(message: &str, files: &[&str]) -> Commit {
        Commit {
            sha: "0123456789".into(),
            message: message.into(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn config() -> RiskConfig {
        let mut config = RiskConfig::default();
        config.semantic_weights.insert("feat".into(), 0.6);
        config.semantic_weights.insert("fix".into(), 0.3);
        config.critical_paths.insert(
            "services/payments".into(),
            CriticalPath {
                business_criticality: 1.0,
                compliance_domains: vec!["PCI".into(), "SOX".into()],
            },
        );
        config.critical_paths.insert(
            "services/phi".into(),
            CriticalPath {
                business_criticality: 0.8,
                compliance_domains: vec!["HIPAA".into(), "PCI".into()],
            },
        );
        config
    }

    #[test]
    fn type_extraction() {
        assert_eq!(semantic_type("feat(api): add endpoint"), "feat");
        assert_eq!(semantic_type("random text no colon"), "other");
        assert_eq!(semantic_type("fix: bug"), "fix");
        assert_eq!(semantic_type("fix(a:b): nested"), "fix");
        assert_eq!(semantic_type(": empty type"), "");
        assert_eq!(semantic_type("Merge branch 'x' (pr): y"), "Merge branch 'x' ");
    }

    #[test]
    fn unknown_type_uses_default_weight() {
        let score = score_commit(&commit("wip stuff", &[]), &config());
        assert!((score - 0.05).abs() < 1e-12);
    }

    #[test]
    fn configured_other_weight_applies_to_colonless_messages() {
        let mut config = config();
        config.semantic_weights.insert("other".into(), 0.4);
        let score = score_commit(&commit("wip stuff", &[]), &config);
        assert!((score - 0.2).abs() < 1e-12);
    }

    #[test]
    fn payments_fix_scores_medium() {
        let c = commit("fix: patch", &["services/payments/x.py"]);
        let score = score_commit(&c, &config());
        assert!((score - 0.65).abs() < 1e-9);
        assert_eq!(RiskLabel::from_score(score), RiskLabel::Medium);
    }

    #[test]
    fn prefix_matching_not_equality() {
        let c = commit("chore: x", &["services/payments/handler.go"]);
        let score = score_commit(&c, &config());
        assert!((score - (0.05 + 0.5)).abs() < 1e-9);

        let outside = commit("chore: x", &["lib/services/payments/handler.go"]);
        assert!((score_commit(&outside, &config()) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn highest_criticality_wins() {
        let c = commit(
            "feat: both",
            &["services/phi/record.py", "services/payments/x.py"],
        );
        let score = score_commit(&c, &config());
        assert!((score - (0.3 + 0.5)).abs() < 1e-9);
        assert_eq!(RiskLabel::from_score(score), RiskLabel::High);
    }

    #[test]
    fn oversized_config_values_are_clamped() {
        let mut config = config();
        config.semantic_weights.insert("feat".into(), 5.0);
        let c = commit("feat: big", &["services/payments/x.py"]);
        assert_eq!(score_commit(&c, &config), 1.0);
    }

    #[test]
    fn compliance_union_is_sorted_and_unique() {
        let c = commit(
            "feat: both",
            &["services/phi/record.py", "services/payments/x.py"],
        );
        assert_eq!(
            compliance_requirements(&c, &config()),
            vec!["HIPAA", "PCI", "SOX"]
        );
    }

    #[test]
    fn no_critical_path_means_no_compliance() {
        let c = commit("feat: ui", &["web/app.tsx"]);
        assert!(compliance_requirements(&c, &config()).is_empty());
    }

    #[test]
    fn label_boundaries() {
        assert_eq!(RiskLabel::from_score(0.0), RiskLabel::Low);
        assert_eq!(RiskLabel::from_score(0.3999), RiskLabel::Low);
        assert_eq!(RiskLabel::from_score(0.4), RiskLabel::Medium);
        assert_eq!(RiskLabel::from_score(0.6999), RiskLabel::Medium);
        assert_eq!(RiskLabel::from_score(0.7), RiskLabel::High);
        assert_eq!(RiskLabel::from_score(1.0), RiskLabel::High);
    }

    #[test]
    fn label_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&RiskLabel::Medium).unwrap(), "\"MEDIUM\"");
        assert_eq!(RiskLabel::High.to_string(), "HIGH");
    }
}
