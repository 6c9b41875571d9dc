use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::database::store::AnalyticsScope;
use crate::models::application::{Application, ApplicationStatus};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ScopeQuery {
    pub company_id: Option<i64>,
    pub job_id: Option<i64>,
}

impl From<ScopeQuery> for AnalyticsScope {
    fn from(q: ScopeQuery) -> Self {
        AnalyticsScope {
            company_id: q.company_id,
            job_id: q.job_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendQuery {
    pub company_id: Option<i64>,
    pub job_id: Option<i64>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopApplicantsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStep {
    pub stage: ApplicationStatus,
    /// Applications currently at, or already past, this stage.
    pub count: i64,
    /// `count / count(previous stage)` as a percentage; 100 for `applied`.
    pub conversion_rate: f64,
    /// `count / count(applied)` as a percentage.
    pub overall_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionFunnel {
    pub scope: AnalyticsScope,
    pub total_applications: i64,
    pub steps: Vec<FunnelStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageTimeStat {
    pub stage: ApplicationStatus,
    pub count: i64,
    pub average_days: f64,
    pub min_days: i64,
    pub max_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total: i64,
    pub hired: i64,
    pub rejected: i64,
    /// Mean match score of the applications that arrived that day.
    pub average_match_score: f64,
    /// Mean match score of every application from the range start through this day.
    pub running_average_match_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStat {
    pub source: String,
    pub count: i64,
    pub hired: i64,
    pub conversion_rate: f64,
    pub average_match_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopApplicant {
    pub rank: usize,
    pub application: Application,
}
