//! Analysis report: predictions, gap analysis and follow-up links in one payload.
//!
//! This is what a UI or document renderer consumes; rendering itself lives
//! outside this service.

pub mod descriptions;
pub mod handlers;
pub mod links;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::matching::ranker::Prediction;
use crate::matching::{MatchError, MatchingService};

pub use descriptions::Descriptions;
use links::{job_links, upskill_link, JobLinks};

#[derive(Debug, Clone, Serialize)]
pub struct RankedRole {
    pub rank: usize,
    pub role: String,
    pub domain: String,
    pub confidence: f64,
    pub match_percent: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GapSkill {
    pub skill: String,
    pub upskill_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleGap {
    pub rank: usize,
    pub role: String,
    pub domain: String,
    pub role_description: String,
    pub domain_description: String,
    pub match_percent: u32,
    pub user_skills: Vec<String>,
    pub required_skills: Vec<String>,
    pub gap_skills: Vec<GapSkill>,
    /// False when the corpus has no profiles for this pair.
    pub has_reference_data: bool,
    pub job_links: JobLinks,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub skills: Vec<String>,
    pub predictions: Vec<RankedRole>,
    pub gaps: Vec<RoleGap>,
}

/// Runs prediction for `skills`, then gap analysis for the first `gap_top_n`
/// predictions.
pub fn build_report(
    matcher: &MatchingService,
    descriptions: &Descriptions,
    skills: &[String],
    top_n: usize,
    gap_top_n: usize,
) -> Result<AnalysisReport, MatchError> {
    let predictions = matcher.predict_top_roles_domains(skills, top_n)?;

    let gaps = predictions
        .iter()
        .take(gap_top_n)
        .enumerate()
        .map(|(i, p)| role_gap(matcher, descriptions, skills, i + 1, p))
        .collect();

    let mut sorted_skills = skills.to_vec();
    sorted_skills.sort();
    sorted_skills.dedup();

    Ok(AnalysisReport {
        report_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        skills: sorted_skills,
        predictions: predictions
            .iter()
            .enumerate()
            .map(|(i, p)| RankedRole {
                rank: i + 1,
                role: p.role.clone(),
                domain: p.domain.clone(),
                confidence: p.confidence,
                match_percent: p.match_percent(),
            })
            .collect(),
        gaps,
    })
}

fn role_gap(
    matcher: &MatchingService,
    descriptions: &Descriptions,
    skills: &[String],
    rank: usize,
    prediction: &Prediction,
) -> RoleGap {
    let gap = matcher.get_gap_skills(skills, &prediction.role, &prediction.domain);
    let has_reference_data = gap.has_reference_data();

    RoleGap {
        rank,
        role: prediction.role.clone(),
        domain: prediction.domain.clone(),
        role_description: descriptions.role(&prediction.role).to_string(),
        domain_description: descriptions.domain(&prediction.domain).to_string(),
        match_percent: prediction.match_percent(),
        user_skills: gap.user_skills.into_iter().collect(),
        required_skills: gap.required_skills.into_iter().collect(),
        gap_skills: gap
            .gap_skills
            .into_iter()
            .map(|skill| GapSkill {
                upskill_link: upskill_link(&skill),
                skill,
            })
            .collect(),
        has_reference_data,
        job_links: job_links(&prediction.role, &prediction.domain),
    }
}
