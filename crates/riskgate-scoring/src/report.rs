use std::fmt;

use riskgate_core::{Commit, RiskConfig};
use serde::{Deserialize, Serialize};

use crate::score::{compliance_requirements, score_commit, RiskLabel};

/// Scored commits plus an aggregate summary for one run.
///
/// # Examples
///
/// ```
/// use riskgate_core::RiskConfig;
/// use riskgate_scoring::{build_report, DeploymentRecommendation};
///
/// let report = build_report(&[], &RiskConfig::default());
/// assert!(report.commits.is_empty());
/// assert_eq!(report.summary.average_risk_score, 0.0);
/// assert_eq!(report.summary.deployment_recommendation, DeploymentRecommendation::Standard);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// One entry per input commit, in input order.
    pub commits: Vec<ScoredCommit>,
    /// Aggregate statistics and recommendation.
    pub summary: ReportSummary,
}

/// A commit with its score, label and compliance tags.
///
/// Equality compares the serialized fields only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCommit {
    /// Full commit hash.
    pub sha: String,
    /// Commit subject line.
    pub message: String,
    /// Risk score rounded to 4 decimals.
    pub score: f64,
    /// Label derived from the unrounded score.
    pub risk_label: RiskLabel,
    /// Paths touched by the commit.
    pub files: Vec<String>,
    /// Sorted compliance domains of the critical paths touched.
    pub compliance_requirements: Vec<String>,
    /// Score before rounding; absent on deserialized reports.
    #[serde(skip)]
    raw_score: Option<f64>,
}

impl PartialEq for ScoredCommit {
    fn eq(&self, other: &Self) -> bool {
        self.sha == other.sha
            && self.message == other.message
            && self.score == other.score
            && self.risk_label == other.risk_label
            && self.files == other.files
            && self.compliance_requirements == other.compliance_requirements
    }
}

impl ScoredCommit {
    /// Score a single commit against `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskgate_core::{Commit, CriticalPath, RiskConfig};
    /// use riskgate_scoring::{RiskLabel, ScoredCommit};
    ///
    /// let mut config = RiskConfig::default();
    /// config.semantic_weights.insert("fix".into(), 0.3);
    /// config.critical_paths.insert(
    ///     "services/payments".into(),
    ///     CriticalPath { business_criticality: 1.0, compliance_domains: vec!["PCI".into()] },
    /// );
    /// let commit = Commit {
    ///     sha: "abc".into(),
    ///     message: "fix: patch".into(),
    ///     files: vec!["services/payments/x.py".into()],
    /// };
    /// let scored = ScoredCommit::evaluate(&commit, &config);
    /// assert_eq!(scored.score, 0.65);
    /// assert_eq!(scored.risk_label, RiskLabel::Medium);
    /// assert_eq!(scored.compliance_requirements, vec!["PCI"]);
    /// ```
    pub fn evaluate(commit: &Commit, config: &RiskConfig) -> Self {
        Self::with_score(commit, config, score_commit(commit, config))
    }

    fn with_score(commit: &Commit, config: &RiskConfig, score: f64) -> Self {
        Self {
            sha: commit.sha.clone(),
            message: commit.message.clone(),
            score: round4(score),
            risk_label: RiskLabel::from_score(score),
            files: commit.files.clone(),
            compliance_requirements: compliance_requirements(commit, config),
            raw_score: Some(score),
        }
    }

    /// The unrounded score when available, otherwise the reported one.
    pub fn precise_score(&self) -> f64 {
        self.raw_score.unwrap_or(self.score)
    }

    fn short_sha(&self) -> &str {
        self.sha.get(..8).unwrap_or(&self.sha)
    }
}

/// Aggregate statistics over all scored commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Mean score rounded to 4 decimals (0 for an empty run).
    pub average_risk_score: f64,
    /// Commit counts per label.
    pub risk_distribution: RiskDistribution,
    /// Highest rounded commit score (0 for an empty run).
    pub max_score: f64,
    /// Rollout policy derived from the average score.
    pub deployment_recommendation: DeploymentRecommendation,
}

/// Number of commits per [`RiskLabel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    /// Commits labelled HIGH.
    pub high: usize,
    /// Commits labelled MEDIUM.
    pub medium: usize,
    /// Commits labelled LOW.
    pub low: usize,
}

impl RiskDistribution {
    fn record(&mut self, label: RiskLabel) {
        match label {
            RiskLabel::High => self.high += 1,
            RiskLabel::Medium => self.medium += 1,
            RiskLabel::Low => self.low += 1,
        }
    }
}

/// Rollout policy for a batch of commits.
///
/// # Examples
///
/// ```
/// use riskgate_scoring::DeploymentRecommendation;
///
/// assert_eq!(DeploymentRecommendation::from_average(0.81), DeploymentRecommendation::ManualApproval);
/// assert_eq!(DeploymentRecommendation::from_average(0.8), DeploymentRecommendation::Canary);
/// assert_eq!(DeploymentRecommendation::from_average(0.5), DeploymentRecommendation::Standard);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentRecommendation {
    /// Regular rollout.
    Standard,
    /// Staged rollout to a subset of traffic first.
    Canary,
    /// A human must approve the rollout.
    ManualApproval,
}

impl DeploymentRecommendation {
    /// Map an average score to a recommendation; thresholds are strict.
    pub fn from_average(average: f64) -> Self {
        if average > 0.8 {
            DeploymentRecommendation::ManualApproval
        } else if average > 0.5 {
            DeploymentRecommendation::Canary
        } else {
            DeploymentRecommendation::Standard
        }
    }
}

impl fmt::Display for DeploymentRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentRecommendation::Standard => write!(f, "standard"),
            DeploymentRecommendation::Canary => write!(f, "canary"),
            DeploymentRecommendation::ManualApproval => write!(f, "manual-approval"),
        }
    }
}

/// Score every commit and aggregate the results.
///
/// Commits are scored independently; the output preserves input order.
pub fn build_report(commits: &[Commit], config: &RiskConfig) -> RiskReport {
    let mut scored = Vec::with_capacity(commits.len());
    let mut distribution = RiskDistribution::default();
    let mut total = 0.0;

    for commit in commits {
        let score = score_commit(commit, config);
        total += score;
        let entry = ScoredCommit::with_score(commit, config, score);
        distribution.record(entry.risk_label);
        scored.push(entry);
    }

    let average_risk_score = round4(total / commits.len().max(1) as f64);
    let max_score = scored.iter().map(|c| c.score).fold(0.0_f64, f64::max);

    tracing::debug!(
        commits = scored.len(),
        average_risk_score,
        max_score,
        "built risk report"
    );

    RiskReport {
        commits: scored,
        summary: ReportSummary {
            average_risk_score,
            risk_distribution: distribution,
            max_score,
            deployment_recommendation: DeploymentRecommendation::from_average(
                average_risk_score,
            ),
        },
    }
}

/// Round the exact binary value to 4 decimals, ties to even.
///
/// Scaling by 10^4 first would round values stored just below a tie
/// (e.g. 0.50005) upwards.
fn round4(value: f64) -> f64 {
    format!("{value:.4}").parse().unwrap_or(value)
}

impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analyzing last {} commits...\n", self.commits.len())?;
        for c in &self.commits {
            writeln!(
                f,
                "[{}] {:.2}  {} ({})",
                c.risk_label,
                c.precise_score(),
                c.message,
                c.short_sha()
            )?;
        }
        let d = &self.summary.risk_distribution;
        writeln!(
            f,
            "\nSummary: average {:.4}, max {:.4} ({} high, {} medium, {} low); recommendation: {}",
            self.summary.average_risk_score,
            self.summary.max_score,
            d.high,
            d.medium,
            d.low,
            self.summary.deployment_recommendation
        )
    }
}

impl RiskReport {
    /// Render the report as a markdown string.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskgate_core::RiskConfig;
    /// use riskgate_scoring::build_report;
    ///
    /// let md = build_report(&[], &RiskConfig::default()).to_markdown();
    /// assert!(md.contains("# Commit Risk Report"));
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Commit Risk Report\n\n");
        out.push_str(&format!(
            "**Recommendation:** {} (average {:.4}, max {:.4})\n\n",
            self.summary.deployment_recommendation,
            self.summary.average_risk_score,
            self.summary.max_score
        ));

        if !self.commits.is_empty() {
            out.push_str("| Risk | Score | Commit | Message | Compliance |\n");
            out.push_str("|------|-------|--------|---------|------------|\n");
            for c in &self.commits {
                out.push_str(&format!(
                    "| {} | {:.4} | `{}` | {} | {} |\n",
                    c.risk_label,
                    c.score,
                    c.short_sha(),
                    c.message.replace('|', "\\|"),
                    c.compliance_requirements.join(", "),
                ));
            }
            out.push('\n');
        }

        let d = &self.summary.risk_distribution;
        out.push_str(&format!(
            "**Distribution:** {} high, {} medium, {} low\n",
            d.high, d.medium, d.low
        ));
        out
    }
}
