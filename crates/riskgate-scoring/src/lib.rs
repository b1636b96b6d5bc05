//! Commit risk scoring and deployment-readiness reports.
//!
//! Scores each commit from the semantic type of its message and the business
//! criticality of the paths it touches, then aggregates the scores into a
//! [`RiskReport`] with a deployment recommendation.

pub mod report;
pub mod score;

pub use report::{
    build_report, DeploymentRecommendation, ReportSummary, RiskDistribution, RiskReport,
    ScoredCommit,
};
pub use score::{compliance_requirements, score_commit, semantic_type, RiskLabel};
