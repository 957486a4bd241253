//! Pearson correlation of student features against the exam score

use crate::data::StudentRecord;

/// Pearson product-moment correlation coefficient
///
/// Returns 0.0 for empty series and for series with zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if n == 0 {
        return 0.0;
    }

    let mx = xs.iter().sum::<f64>() / n as f64;
    let my = ys.iter().sum::<f64>() / n as f64;

    let num: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| (x - mx) * (y - my))
        .sum();
    let sx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum();
    let sy: f64 = ys.iter().map(|y| (y - my).powi(2)).sum();
    let den = (sx * sy).sqrt();

    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Encode categorical values as ordinal floats per a fixed value ordering;
/// unrecognized values map to 0
fn encode_cat<'a>(values: impl Iterator<Item = &'a str>, order: &[&str]) -> Vec<f64> {
    values
        .map(|v| order.iter().position(|o| *o == v).map_or(0.0, |i| i as f64))
        .collect()
}

/// Correlate every feature (numeric or ordinally encoded categorical)
/// against the exam score
///
/// Output is rounded to four decimals and stably sorted by descending
/// absolute coefficient, so tied features keep their insertion order.
pub fn compute_correlations(records: &[StudentRecord]) -> Vec<(String, f64)> {
    let scores: Vec<f64> = records.iter().map(|r| r.exam_score).collect();

    let features: Vec<(&str, Vec<f64>)> = vec![
        ("Hours Studied", records.iter().map(|r| r.hours_studied).collect()),
        ("Attendance", records.iter().map(|r| r.attendance).collect()),
        ("Sleep Hours", records.iter().map(|r| r.sleep_hours).collect()),
        ("Previous Scores", records.iter().map(|r| r.previous_scores).collect()),
        ("Tutoring Sessions", records.iter().map(|r| r.tutoring_sessions).collect()),
        ("Physical Activity", records.iter().map(|r| r.physical_activity).collect()),
        (
            "Motivation",
            encode_cat(
                records.iter().map(|r| r.motivation_level.as_str()),
                &["Low", "Medium", "High"],
            ),
        ),
        (
            "Parental Involvement",
            encode_cat(
                records.iter().map(|r| r.parental_involvement.as_str()),
                &["Low", "Medium", "High"],
            ),
        ),
        (
            "Access to Resources",
            encode_cat(
                records.iter().map(|r| r.access_to_resources.as_str()),
                &["Low", "Medium", "High"],
            ),
        ),
        (
            "Peer Influence",
            encode_cat(
                records.iter().map(|r| r.peer_influence.as_str()),
                &["Negative", "Neutral", "Positive"],
            ),
        ),
        (
            "Internet Access",
            encode_cat(records.iter().map(|r| r.internet_access.as_str()), &["No", "Yes"]),
        ),
        (
            "Teacher Quality",
            encode_cat(
                records.iter().map(|r| r.teacher_quality.as_str()),
                &["Low", "Medium", "High"],
            ),
        ),
        (
            "Family Income",
            encode_cat(
                records.iter().map(|r| r.family_income.as_str()),
                &["Low", "Medium", "High"],
            ),
        ),
        (
            "Extracurricular",
            encode_cat(
                records.iter().map(|r| r.extracurricular_activities.as_str()),
                &["No", "Yes"],
            ),
        ),
        (
            "School Type",
            encode_cat(
                records.iter().map(|r| r.school_type.as_str()),
                &["Public", "Private"],
            ),
        ),
    ];

    let mut correlations: Vec<(String, f64)> = features
        .into_iter()
        .map(|(name, values)| (name.to_string(), round4(pearson(&values, &scores))))
        .collect();
    correlations.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    correlations
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
