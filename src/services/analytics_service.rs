//! Read-side aggregation over committed application state.
//!
//! Snapshots may trail an in-flight transition by one application; nothing
//! here takes locks or writes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::database::store::{AnalyticsScope, ApplicationSort, ApplicationStore, PageRequest, StageVisit};
use crate::dto::analytics_dto::{
    ConversionFunnel, FunnelStep, SourceStat, StageTimeStat, StatusCount, TopApplicant, TrendPoint,
};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::stage::Stage;
use crate::utils::time::start_of_day;

pub const MAX_TREND_DAYS: i64 = 366;
pub const DEFAULT_TOP_LIMIT: i64 = 10;

const SECONDS_PER_DAY: i64 = 86_400;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 * 100.0 / whole as f64)
    }
}

fn decimal_mean(sum: Decimal, count: i64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round2((sum / Decimal::from(count)).to_f64().unwrap_or(0.0))
}

/// Funnel counts from the furthest forward stage each application reached.
/// Rejected and withdrawn applications count for every stage they passed.
pub fn build_funnel(scope: AnalyticsScope, applications: &[Application], visits: &[StageVisit]) -> ConversionFunnel {
    let mut furthest: HashMap<i64, usize> = applications
        .iter()
        .map(|app| (app.id, app.status.funnel_position().unwrap_or(0)))
        .collect();
    for visit in visits {
        if let (Some(pos), Some(best)) = (visit.stage_name.funnel_position(), furthest.get_mut(&visit.application_id)) {
            *best = (*best).max(pos);
        }
    }

    let counts: Vec<i64> = (0..ApplicationStatus::FUNNEL.len())
        .map(|k| furthest.values().filter(|&&pos| pos >= k).count() as i64)
        .collect();
    let total = counts[0];

    let steps = ApplicationStatus::FUNNEL
        .iter()
        .enumerate()
        .map(|(k, stage)| {
            let conversion_rate = if k == 0 {
                if total > 0 {
                    100.0
                } else {
                    0.0
                }
            } else {
                percentage(counts[k], counts[k - 1])
            };
            FunnelStep {
                stage: *stage,
                count: counts[k],
                conversion_rate,
                overall_rate: percentage(counts[k], total),
            }
        })
        .collect();

    ConversionFunnel {
        scope,
        total_applications: total,
        steps,
    }
}

pub fn build_stage_time_stats(stages: &[Stage]) -> Vec<StageTimeStat> {
    let mut by_stage: BTreeMap<ApplicationStatus, Vec<i64>> = BTreeMap::new();
    for stage in stages {
        let Some(completed_at) = stage.completed_at else {
            continue;
        };
        let seconds = stage
            .duration_seconds
            .unwrap_or_else(|| (completed_at - stage.started_at).num_seconds())
            .max(0);
        by_stage
            .entry(stage.stage_name)
            .or_default()
            .push(seconds / SECONDS_PER_DAY);
    }

    by_stage
        .into_iter()
        .map(|(stage, days)| {
            let count = days.len() as i64;
            let sum: i64 = days.iter().sum();
            StageTimeStat {
                stage,
                count,
                average_days: round2(sum as f64 / count as f64),
                min_days: days.iter().copied().min().unwrap_or(0),
                max_days: days.iter().copied().max().unwrap_or(0),
            }
        })
        .collect()
}

/// One point per calendar day in `[from, to]`, empty days included.
pub fn build_trend(applications: &[Application], from: NaiveDate, to: NaiveDate) -> Vec<TrendPoint> {
    #[derive(Default)]
    struct Bucket {
        total: i64,
        hired: i64,
        rejected: i64,
        score_sum: Decimal,
    }

    let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
    for app in applications {
        let day = app.applied_at.date_naive();
        if day < from || day > to {
            continue;
        }
        let bucket = buckets.entry(day).or_default();
        bucket.total += 1;
        bucket.score_sum += app.match_score;
        match app.status {
            ApplicationStatus::Hired => bucket.hired += 1,
            ApplicationStatus::Rejected => bucket.rejected += 1,
            _ => {}
        }
    }

    let mut points = Vec::new();
    let mut running_sum = Decimal::ZERO;
    let mut running_count = 0i64;
    let mut next = Some(from);
    while let Some(day) = next.filter(|d| *d <= to) {
        let bucket = buckets.remove(&day).unwrap_or_default();
        running_sum += bucket.score_sum;
        running_count += bucket.total;
        points.push(TrendPoint {
            date: day,
            total: bucket.total,
            hired: bucket.hired,
            rejected: bucket.rejected,
            average_match_score: decimal_mean(bucket.score_sum, bucket.total),
            running_average_match_score: decimal_mean(running_sum, running_count),
        });
        next = day.succ_opt();
    }
    points
}

pub fn build_source_stats(applications: &[Application]) -> Vec<SourceStat> {
    let mut by_source: HashMap<&str, (i64, i64, Decimal)> = HashMap::new();
    for app in applications {
        let entry = by_source.entry(app.source.as_str()).or_insert((0, 0, Decimal::ZERO));
        entry.0 += 1;
        if app.status == ApplicationStatus::Hired {
            entry.1 += 1;
        }
        entry.2 += app.match_score;
    }

    let mut stats: Vec<SourceStat> = by_source
        .into_iter()
        .map(|(source, (count, hired, score_sum))| SourceStat {
            source: source.to_string(),
            count,
            hired,
            conversion_rate: percentage(hired, count),
            average_match_score: decimal_mean(score_sum, count),
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.source.cmp(&b.source)));
    stats
}

pub fn build_status_distribution(applications: &[Application]) -> Vec<StatusCount> {
    ApplicationStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: applications.iter().filter(|a| a.status == *status).count() as i64,
        })
        .collect()
}

#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn ApplicationStore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn ApplicationStore>) -> Self {
        Self { store }
    }

    pub async fn conversion_funnel(&self, scope: AnalyticsScope) -> Result<ConversionFunnel> {
        let applications = self.store.scan_applications(&scope.as_filter()).await?;
        let visits = self.store.stage_visits(scope).await?;
        Ok(build_funnel(scope, &applications, &visits))
    }

    pub async fn stage_time_stats(&self, scope: AnalyticsScope) -> Result<Vec<StageTimeStat>> {
        let stages = self.store.completed_stages(scope).await?;
        Ok(build_stage_time_stats(&stages))
    }

    pub async fn application_trend(
        &self,
        scope: AnalyticsScope,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TrendPoint>> {
        if to < from {
            return Err(Error::Validation("`to` must not be before `from`".to_string()));
        }
        if (to - from).num_days() >= MAX_TREND_DAYS {
            return Err(Error::Validation(format!(
                "Trend range is limited to {} days",
                MAX_TREND_DAYS
            )));
        }
        let mut filter = scope.as_filter();
        filter.applied_from = Some(start_of_day(from));
        let end = to
            .checked_add_signed(Duration::days(1))
            .ok_or_else(|| Error::Validation(format!("`to` {} is out of range", to)))?;
        filter.applied_to = Some(start_of_day(end));
        let applications = self.store.scan_applications(&filter).await?;
        Ok(build_trend(&applications, from, to))
    }

    pub async fn top_applicants(&self, job_id: i64, limit: Option<i64>) -> Result<Vec<TopApplicant>> {
        let page = PageRequest::new(Some(1), Some(limit.unwrap_or(DEFAULT_TOP_LIMIT)));
        let ranked = self
            .store
            .list_applications(
                &AnalyticsScope::for_job(job_id).as_filter(),
                ApplicationSort::BestMatch,
                page,
            )
            .await?;
        Ok(ranked
            .items
            .into_iter()
            .enumerate()
            .map(|(i, application)| TopApplicant {
                rank: i + 1,
                application,
            })
            .collect())
    }

    pub async fn source_stats(&self, scope: AnalyticsScope) -> Result<Vec<SourceStat>> {
        let applications = self.store.scan_applications(&scope.as_filter()).await?;
        Ok(build_source_stats(&applications))
    }

    pub async fn status_distribution(&self, scope: AnalyticsScope) -> Result<Vec<StatusCount>> {
        let applications = self.store.scan_applications(&scope.as_filter()).await?;
        Ok(build_status_distribution(&applications))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn app(id: i64, status: ApplicationStatus, source: &str, score: i64, day: u32) -> Application {
        let at = Utc.with_ymd_and_hms(2026, 5, day, 9, 30, 0).unwrap();
        Application {
            id,
            job_id: 1,
            user_id: id,
            company_id: Some(1),
            status,
            match_score: Decimal::from(score),
            source: source.to_string(),
            viewed_by_employer: false,
            is_bookmarked: false,
            applied_at: at,
            created_at: at,
            updated_at: at,
        }
    }

    fn visits_through(application_id: i64, last: ApplicationStatus) -> Vec<StageVisit> {
        let end = last.funnel_position().unwrap();
        ApplicationStatus::FUNNEL[..=end]
            .iter()
            .map(|s| StageVisit {
                application_id,
                stage_name: *s,
            })
            .collect()
    }

    #[test]
    fn funnel_counts_rejected_applications_at_stages_they_passed() {
        use ApplicationStatus::*;
        let apps = vec![
            app(1, Applied, "direct", 50, 1),
            app(2, Screening, "direct", 60, 1),
            app(3, Rejected, "direct", 70, 2),
            app(4, Hired, "referral", 90, 2),
        ];
        let mut visits = visits_through(1, Applied);
        visits.extend(visits_through(2, Screening));
        visits.extend(visits_through(3, Interview));
        visits.push(StageVisit {
            application_id: 3,
            stage_name: Rejected,
        });
        visits.extend(visits_through(4, Hired));

        let funnel = build_funnel(AnalyticsScope::for_job(1), &apps, &visits);
        let counts: Vec<i64> = funnel.steps.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![4, 3, 2, 2, 1, 1]);
        assert_eq!(funnel.steps[0].conversion_rate, 100.0);
        assert_eq!(funnel.steps[1].conversion_rate, 75.0);
        assert_eq!(funnel.steps[2].conversion_rate, 66.67);
        assert_eq!(funnel.steps[4].overall_rate, 25.0);
    }

    #[test]
    fn funnel_overall_rates_never_increase() {
        use ApplicationStatus::*;
        let statuses = [Applied, Screening, Shortlisted, Interview, Offered, Hired, Rejected, Withdrawn];
        let mut apps = Vec::new();
        let mut visits = Vec::new();
        for id in 0..64i64 {
            let status = statuses[(id as usize * 7 + 3) % statuses.len()];
            apps.push(app(id, status, "direct", id % 100, 1));
            let furthest = status.funnel_position().unwrap_or((id as usize) % 5);
            visits.extend(visits_through(id, ApplicationStatus::FUNNEL[furthest]));
        }

        let funnel = build_funnel(AnalyticsScope::default(), &apps, &visits);
        for pair in funnel.steps.windows(2) {
            assert!(pair[0].count >= pair[1].count);
            assert!(pair[0].overall_rate >= pair[1].overall_rate);
            assert!(pair[1].conversion_rate <= 100.0);
        }
    }

    #[test]
    fn empty_funnel_has_zero_rates() {
        let funnel = build_funnel(AnalyticsScope::default(), &[], &[]);
        assert_eq!(funnel.total_applications, 0);
        assert!(funnel.steps.iter().all(|s| s.count == 0 && s.overall_rate == 0.0));
    }

    #[test]
    fn stage_time_stats_use_whole_days() {
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let stage = |id: i64, name: ApplicationStatus, hours: i64| Stage {
            id,
            application_id: id,
            stage_name: name,
            started_at: start,
            completed_at: Some(start + Duration::hours(hours)),
            duration_seconds: Some(hours * 3600),
            handled_by: None,
            notes: None,
        };
        let stats = build_stage_time_stats(&[
            stage(1, ApplicationStatus::Applied, 30),
            stage(2, ApplicationStatus::Applied, 80),
            stage(3, ApplicationStatus::Screening, 5),
        ]);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].stage, ApplicationStatus::Applied);
        assert_eq!((stats[0].count, stats[0].min_days, stats[0].max_days), (2, 1, 3));
        assert_eq!(stats[0].average_days, 2.0);
        assert_eq!(stats[1].max_days, 0);
    }

    #[test]
    fn trend_fills_empty_days_and_tracks_running_average() {
        use ApplicationStatus::*;
        let apps = vec![
            app(1, Hired, "direct", 80, 1),
            app(2, Rejected, "direct", 40, 1),
            app(3, Applied, "direct", 90, 3),
        ];
        let from = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 5, 3).unwrap();
        let trend = build_trend(&apps, from, to);

        assert_eq!(trend.len(), 3);
        assert_eq!((trend[0].total, trend[0].hired, trend[0].rejected), (2, 1, 1));
        assert_eq!(trend[0].average_match_score, 60.0);
        assert_eq!(trend[1].total, 0);
        assert_eq!(trend[1].running_average_match_score, 60.0);
        assert_eq!(trend[2].average_match_score, 90.0);
        assert_eq!(trend[2].running_average_match_score, 70.0);
    }

    #[test]
    fn trend_stops_at_the_last_representable_day() {
        let to = NaiveDate::MAX;
        let from = to.pred_opt().unwrap();
        let trend = build_trend(&[], from, to);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[1].date, NaiveDate::MAX);
    }

    #[test]
    fn source_stats_group_and_rank_by_volume() {
        use ApplicationStatus::*;
        let apps = vec![
            app(1, Hired, "linkedin", 90, 1),
            app(2, Rejected, "linkedin", 50, 1),
            app(3, Applied, "linkedin", 70, 1),
            app(4, Hired, "referral", 85, 2),
        ];
        let stats = build_source_stats(&apps);
        assert_eq!(stats[0].source, "linkedin");
        assert_eq!((stats[0].count, stats[0].hired), (3, 1));
        assert_eq!(stats[0].conversion_rate, 33.33);
        assert_eq!(stats[0].average_match_score, 70.0);
        assert_eq!(stats[1].conversion_rate, 100.0);
    }

    #[test]
    fn status_distribution_lists_every_status() {
        let apps = vec![app(1, ApplicationStatus::Offered, "direct", 1, 1)];
        let dist = build_status_distribution(&apps);
        assert_eq!(dist.len(), ApplicationStatus::ALL.len());
        assert_eq!(dist.iter().map(|d| d.count).sum::<i64>(), 1);
    }
}
