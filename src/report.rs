//! Aggregate summaries and the analytics bundle consumed by the dashboard

use crate::data::{FeatureStats, StudentData, StudentRecord};
use crate::model::KMeansModel;
use crate::persona::{Persona, PersonaProfile, PersonaReconciliation, PERSONA_PROFILES};
use crate::risk::RiskLabel;
use chrono::{SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// JSON object wrapper that preserves entry insertion order
#[derive(Debug, Clone)]
pub struct OrderedMap<T>(pub Vec<(String, T)>);

impl<T: Serialize> Serialize for OrderedMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Global headline figures
#[derive(Debug, Serialize)]
pub struct Kpis {
    pub total: usize,
    pub avg_score: f64,
    pub avg_attend: f64,
    pub avg_hours: f64,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub top_cluster: String,
    pub top_cluster_pct: f64,
}

/// Per-persona dashboard card: profile plus member aggregates
#[derive(Debug, Serialize)]
pub struct PersonaSummary {
    pub id: usize,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub strategies: [&'static str; 5],
    pub count: usize,
    pub avg_score: f64,
    pub avg_hours: f64,
    pub avg_attend: f64,
    pub avg_tutor: f64,
    pub avg_sleep: f64,
    pub avg_prev: f64,
    pub risk_high: usize,
}

/// Exam score histogram over fixed 3-point buckets
#[derive(Debug, Serialize)]
pub struct ScoreDist {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

/// Aggregates for one categorical group; optional fields are omitted from
/// groupings that do not report them
#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub count: usize,
    pub avg_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_attend: Option<f64>,
}

/// Average score within one fixed attendance or study-hour bucket
#[derive(Debug, Serialize)]
pub struct BucketSummary {
    pub label: &'static str,
    pub avg_score: f64,
    pub count: usize,
}

/// One sampled point for the dashboard scatter chart
#[derive(Debug, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub hours: f64,
    pub persona: usize,
    pub risk: RiskLabel,
}

/// One row of the highest-risk student table
#[derive(Debug, Serialize)]
pub struct RiskRow {
    pub id: usize,
    pub gender: String,
    pub school: String,
    pub score: f64,
    pub attend: f64,
    pub hours: f64,
    pub motiv: String,
    pub risk: RiskLabel,
    pub risk_score: u32,
    pub persona: usize,
    pub internet: String,
    pub tutor: f64,
    pub prev: f64,
    pub disability: String,
    pub peer: String,
}

/// Everything the static dashboard reads
#[derive(Debug, Serialize)]
pub struct AnalyticsBundle {
    pub kpis: Kpis,
    pub clusters: Vec<PersonaSummary>,
    pub correlations: OrderedMap<f64>,
    pub score_dist: ScoreDist,
    pub by_school: OrderedMap<GroupSummary>,
    pub by_gender: OrderedMap<GroupSummary>,
    pub by_motiv: OrderedMap<GroupSummary>,
    pub by_parent: OrderedMap<GroupSummary>,
    pub by_income: OrderedMap<GroupSummary>,
    pub by_resources: OrderedMap<GroupSummary>,
    pub attend_score: Vec<BucketSummary>,
    pub hour_score: Vec<BucketSummary>,
    pub scatter: Vec<ScatterPoint>,
    pub risk_table: Vec<RiskRow>,
    pub personas: &'static [PersonaProfile; 5],
    pub feature_stats: FeatureStats,
    pub persona_centers: OrderedMap<Vec<f64>>,
}

/// Assemble the full analytics bundle from the pipeline outputs
pub fn build_bundle(
    data: &StudentData,
    model: &KMeansModel,
    personas: &[Persona],
    risks: &[(u32, RiskLabel)],
    reconciliation: &PersonaReconciliation,
    correlations: &[(String, f64)],
    sample_seed: u64,
) -> AnalyticsBundle {
    let records = &data.records;
    let clusters = persona_summaries(records, model, personas, risks, reconciliation);
    let kpis = compute_kpis(records, risks, &clusters);

    let persona_centers = OrderedMap(
        reconciliation
            .persona_centers
            .iter()
            .map(|(id, center)| (id.to_string(), center.to_vec()))
            .collect(),
    );

    AnalyticsBundle {
        kpis,
        clusters,
        correlations: OrderedMap(correlations.to_vec()),
        score_dist: score_distribution(records),
        by_school: summarize_groups(group_by(records, |r| r.school_type.as_str(), None), true, true),
        by_gender: summarize_groups(group_by(records, |r| r.gender.as_str(), None), true, false),
        by_motiv: summarize_groups(
            group_by(records, |r| r.motivation_level.as_str(), Some(&["Low", "Medium", "High"])),
            false,
            true,
        ),
        by_parent: summarize_groups(
            group_by(records, |r| r.parental_involvement.as_str(), Some(&["Low", "Medium", "High"])),
            false,
            false,
        ),
        by_income: summarize_groups(
            group_by(records, |r| r.family_income.as_str(), Some(&["Low", "Medium", "High"])),
            false,
            false,
        ),
        by_resources: summarize_groups(
            group_by(records, |r| r.access_to_resources.as_str(), Some(&["Low", "Medium", "High"])),
            false,
            false,
        ),
        attend_score: attendance_buckets(records),
        hour_score: hour_buckets(records),
        scatter: scatter_sample(records, personas, risks, sample_seed),
        risk_table: risk_table(records, personas, risks),
        personas: &PERSONA_PROFILES,
        feature_stats: data.stats.clone(),
        persona_centers,
    }
}

/// Write the bundle as a `data.js` payload for the static dashboard
pub fn write_data_js(bundle: &AnalyticsBundle, path: &str) -> crate::Result<usize> {
    let json = serde_json::to_string_pretty(bundle)?;
    let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let content = format!(
        "// Auto-generated by learnforge at {} - do not edit manually\nconst ANALYTICS = {};\n",
        stamp, json
    );
    let bytes = content.len();
    std::fs::write(path, content)?;
    Ok(bytes)
}

fn persona_summaries(
    records: &[StudentRecord],
    model: &KMeansModel,
    personas: &[Persona],
    risks: &[(u32, RiskLabel)],
    reconciliation: &PersonaReconciliation,
) -> Vec<PersonaSummary> {
    let mut summaries = Vec::new();

    for (&persona_id, &cluster) in &reconciliation.persona_clusters {
        let mut members: Vec<usize> = (0..records.len())
            .filter(|&i| personas[i].id() == persona_id)
            .collect();
        if members.is_empty() {
            // No record resolved to this persona; fall back to the raw
            // cluster that voted for it
            members = (0..records.len())
                .filter(|&i| model.labels[i] == cluster)
                .collect();
        }

        let profile = &PERSONA_PROFILES[persona_id];
        summaries.push(PersonaSummary {
            id: persona_id,
            name: profile.name,
            icon: profile.icon,
            color: profile.color,
            description: profile.description,
            strategies: profile.strategies,
            count: members.len(),
            avg_score: avg(members.iter().map(|&i| records[i].exam_score)),
            avg_hours: avg(members.iter().map(|&i| records[i].hours_studied)),
            avg_attend: avg(members.iter().map(|&i| records[i].attendance)),
            avg_tutor: avg(members.iter().map(|&i| records[i].tutoring_sessions)),
            avg_sleep: avg(members.iter().map(|&i| records[i].sleep_hours)),
            avg_prev: avg(members.iter().map(|&i| records[i].previous_scores)),
            risk_high: members
                .iter()
                .filter(|&&i| risks[i].1 == RiskLabel::High)
                .count(),
        });
    }

    summaries
}

fn compute_kpis(
    records: &[StudentRecord],
    risks: &[(u32, RiskLabel)],
    clusters: &[PersonaSummary],
) -> Kpis {
    let total = records.len();
    let mut high = 0;
    let mut medium = 0;
    let mut low = 0;
    for (_, label) in risks {
        match label {
            RiskLabel::High => high += 1,
            RiskLabel::Medium => medium += 1,
            RiskLabel::Low => low += 1,
        }
    }

    let (top_cluster, top_cluster_pct) = match clusters.first() {
        Some(first) if total > 0 => (
            first.name.to_string(),
            round1(first.count as f64 / total as f64 * 100.0),
        ),
        _ => (String::new(), 0.0),
    };

    Kpis {
        total,
        avg_score: avg(records.iter().map(|r| r.exam_score)),
        avg_attend: avg(records.iter().map(|r| r.attendance)),
        avg_hours: avg(records.iter().map(|r| r.hours_studied)),
        high_risk: high,
        medium_risk: medium,
        low_risk: low,
        top_cluster,
        top_cluster_pct,
    }
}

/// Histogram of exam scores over 3-point buckets from 55 to 100; scores
/// above the top edge land in the last bucket
pub fn score_distribution(records: &[StudentRecord]) -> ScoreDist {
    let buckets: Vec<u32> = (55..102).step_by(3).collect();
    let mut counts = vec![0usize; buckets.len()];
    for record in records {
        for (i, &bucket) in buckets.iter().enumerate() {
            if record.exam_score <= bucket as f64 || i == buckets.len() - 1 {
                counts[i] += 1;
                break;
            }
        }
    }
    ScoreDist {
        labels: buckets.iter().map(|b| b.to_string()).collect(),
        counts,
    }
}

/// Group records by a categorical key, preserving first-seen order; values
/// outside `allowed` collapse into an `Other` group
fn group_by<'a, F>(
    records: &'a [StudentRecord],
    key: F,
    allowed: Option<&[&str]>,
) -> Vec<(String, Vec<&'a StudentRecord>)>
where
    F: Fn(&StudentRecord) -> &str,
{
    let mut groups: Vec<(String, Vec<&StudentRecord>)> = Vec::new();
    for record in records {
        let mut value = key(record);
        if let Some(allowed) = allowed {
            if !allowed.contains(&value) {
                value = "Other";
            }
        }
        match groups.iter_mut().find(|(name, _)| name == value) {
            Some((_, members)) => members.push(record),
            None => groups.push((value.to_string(), vec![record])),
        }
    }
    groups
}

fn summarize_groups(
    groups: Vec<(String, Vec<&StudentRecord>)>,
    with_hours: bool,
    with_attend: bool,
) -> OrderedMap<GroupSummary> {
    OrderedMap(
        groups
            .into_iter()
            .map(|(name, members)| {
                let summary = GroupSummary {
                    count: members.len(),
                    avg_score: avg(members.iter().map(|r| r.exam_score)),
                    avg_hours: with_hours
                        .then(|| avg(members.iter().map(|r| r.hours_studied))),
                    avg_attend: with_attend
                        .then(|| avg(members.iter().map(|r| r.attendance))),
                };
                (name, summary)
            })
            .collect(),
    )
}

const ATTEND_BUCKETS: [(&str, f64, f64); 5] = [
    ("<60%", 0.0, 60.0),
    ("60-70%", 60.0, 70.0),
    ("70-80%", 70.0, 80.0),
    ("80-90%", 80.0, 90.0),
    ("90%+", 90.0, 101.0),
];

const HOUR_BUCKETS: [(&str, f64, f64); 5] = [
    ("0-10h", 0.0, 10.0),
    ("10-20h", 10.0, 20.0),
    ("20-30h", 20.0, 30.0),
    ("30-40h", 30.0, 40.0),
    ("40h+", 40.0, 999.0),
];

fn attendance_buckets(records: &[StudentRecord]) -> Vec<BucketSummary> {
    bucket_scores(records, &ATTEND_BUCKETS, |r| r.attendance)
}

fn hour_buckets(records: &[StudentRecord]) -> Vec<BucketSummary> {
    bucket_scores(records, &HOUR_BUCKETS, |r| r.hours_studied)
}

fn bucket_scores<F>(
    records: &[StudentRecord],
    buckets: &[(&'static str, f64, f64)],
    value: F,
) -> Vec<BucketSummary>
where
    F: Fn(&StudentRecord) -> f64,
{
    buckets
        .iter()
        .map(|&(label, min, max)| {
            let scores: Vec<f64> = records
                .iter()
                .filter(|r| {
                    let v = value(r);
                    min <= v && v < max
                })
                .map(|r| r.exam_score)
                .collect();
            BucketSummary {
                label,
                avg_score: avg(scores.iter().copied()),
                count: scores.len(),
            }
        })
        .collect()
}

/// Seeded sample of up to 600 records for the scatter chart
fn scatter_sample(
    records: &[StudentRecord],
    personas: &[Persona],
    risks: &[(u32, RiskLabel)],
    sample_seed: u64,
) -> Vec<ScatterPoint> {
    let amount = records.len().min(600);
    let mut rng = StdRng::seed_from_u64(sample_seed);
    rand::seq::index::sample(&mut rng, records.len(), amount)
        .into_iter()
        .map(|i| ScatterPoint {
            x: round1(records[i].attendance),
            y: round1(records[i].exam_score),
            hours: records[i].hours_studied,
            persona: personas[i].id(),
            risk: risks[i].1,
        })
        .collect()
}

/// Up to 50 High-risk students, highest composite score first
fn risk_table(
    records: &[StudentRecord],
    personas: &[Persona],
    risks: &[(u32, RiskLabel)],
) -> Vec<RiskRow> {
    let mut high: Vec<usize> = (0..records.len())
        .filter(|&i| risks[i].1 == RiskLabel::High)
        .collect();
    high.sort_by(|&a, &b| risks[b].0.cmp(&risks[a].0));
    high.truncate(50);

    high.into_iter()
        .enumerate()
        .map(|(row, i)| {
            let record = &records[i];
            RiskRow {
                id: row + 1,
                gender: record.gender.clone(),
                school: record.school_type.clone(),
                score: record.exam_score,
                attend: record.attendance,
                hours: record.hours_studied,
                motiv: record.motivation_level.clone(),
                risk: risks[i].1,
                risk_score: risks[i].0,
                persona: personas[i].id(),
                internet: record.internet_access.clone(),
                tutor: record.tutoring_sessions,
                prev: record.previous_scores,
                disability: record.learning_disabilities.clone(),
                peer: record.peer_influence.clone(),
            }
        })
        .collect()
}

fn avg(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for value in values {
        sum += value;
        n += 1;
    }
    if n == 0 {
        0.0
    } else {
        round2(sum / n as f64)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
