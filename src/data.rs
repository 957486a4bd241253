//! Data loading, row cleaning, and min-max feature normalization using Polars

use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::Serialize;

/// Features used for K-Means clustering, in vector order
pub const CLUSTER_FEATURES: [&str; 6] = [
    "Hours_Studied",
    "Attendance",
    "Sleep_Hours",
    "Previous_Scores",
    "Tutoring_Sessions",
    "Physical_Activity",
];

/// One cleaned student row. Numeric fields are guaranteed finite; categorical
/// fields are trimmed, with documented defaults filled in for blank values.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub hours_studied: f64,
    pub attendance: f64,
    pub parental_involvement: String,
    pub access_to_resources: String,
    pub extracurricular_activities: String,
    pub sleep_hours: f64,
    pub previous_scores: f64,
    pub motivation_level: String,
    pub internet_access: String,
    pub tutoring_sessions: f64,
    pub family_income: String,
    pub teacher_quality: String,
    pub school_type: String,
    pub peer_influence: String,
    pub physical_activity: f64,
    pub learning_disabilities: String,
    pub parental_education_level: String,
    pub distance_from_home: String,
    pub gender: String,
    pub exam_score: f64,
}

impl StudentRecord {
    /// Look up a clustering feature by its column name
    pub fn feature(&self, name: &str) -> crate::Result<f64> {
        let value = match name {
            "Hours_Studied" => self.hours_studied,
            "Attendance" => self.attendance,
            "Sleep_Hours" => self.sleep_hours,
            "Previous_Scores" => self.previous_scores,
            "Tutoring_Sessions" => self.tutoring_sessions,
            "Physical_Activity" => self.physical_activity,
            _ => anyhow::bail!("unknown clustering feature: {}", name),
        };
        Ok(value)
    }
}

/// Per-feature (min, range) pairs fitted over the whole dataset.
///
/// Retained after fitting so out-of-sample values can be scaled consistently
/// with the training data. A zero-variance feature gets a range of 1.0, which
/// maps every record to 0.0 for that feature.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureStats {
    pub features: Vec<String>,
    pub mins: Vec<f64>,
    pub ranges: Vec<f64>,
}

impl FeatureStats {
    /// Compute dataset-wide min and range for each named feature
    pub fn fit(records: &[StudentRecord], features: &[&str]) -> crate::Result<Self> {
        if records.is_empty() {
            anyhow::bail!("cannot fit feature stats on an empty record set");
        }

        let mut mins = Vec::with_capacity(features.len());
        let mut ranges = Vec::with_capacity(features.len());
        for &name in features {
            let mut mn = f64::INFINITY;
            let mut mx = f64::NEG_INFINITY;
            for record in records {
                let value = record.feature(name)?;
                mn = mn.min(value);
                mx = mx.max(value);
            }
            mins.push(mn);
            ranges.push(if mx == mn { 1.0 } else { mx - mn });
        }

        Ok(FeatureStats {
            features: features.iter().map(|s| s.to_string()).collect(),
            mins,
            ranges,
        })
    }

    /// Normalize one record into [0, 1] feature space
    pub fn transform(&self, record: &StudentRecord) -> crate::Result<Array1<f64>> {
        let mut values = Vec::with_capacity(self.features.len());
        for (j, name) in self.features.iter().enumerate() {
            values.push((record.feature(name)? - self.mins[j]) / self.ranges[j]);
        }
        Ok(Array1::from(values))
    }

    /// Scale raw out-of-sample feature values using the fitted statistics
    pub fn scale_new_data(&self, values: &[f64]) -> crate::Result<Array1<f64>> {
        if values.len() != self.features.len() {
            anyhow::bail!(
                "feature vector must have exactly {} values, got {}",
                self.features.len(),
                values.len()
            );
        }

        let scaled: Vec<f64> = values
            .iter()
            .zip(self.mins.iter().zip(self.ranges.iter()))
            .map(|(v, (mn, rg))| (v - mn) / rg)
            .collect();
        Ok(Array1::from(scaled))
    }
}

/// Cleaned records together with their normalized feature matrix and the
/// fitted scaler
#[derive(Debug)]
pub struct StudentData {
    pub records: Vec<StudentRecord>,
    /// Normalized clustering features as ndarray (n_students, 6)
    pub features: Array2<f64>,
    pub stats: FeatureStats,
}

/// Load the student CSV and drop rows that fail cleaning
///
/// Every column is read as a string and parsed row by row, so a row with a
/// missing or unparseable numeric field is dropped entirely rather than
/// producing a partial record. Blank `Teacher_Quality`,
/// `Parental_Education_Level`, and `Distance_from_Home` values fall back to
/// their documented defaults.
pub fn load_and_clean_data(file_path: &str) -> crate::Result<Vec<StudentRecord>> {
    let df = LazyCsvReader::new(file_path)
        .has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;

    let hours_studied = utf8_column(&df, "Hours_Studied")?;
    let attendance = utf8_column(&df, "Attendance")?;
    let parental_involvement = utf8_column(&df, "Parental_Involvement")?;
    let access_to_resources = utf8_column(&df, "Access_to_Resources")?;
    let extracurricular = utf8_column(&df, "Extracurricular_Activities")?;
    let sleep_hours = utf8_column(&df, "Sleep_Hours")?;
    let previous_scores = utf8_column(&df, "Previous_Scores")?;
    let motivation_level = utf8_column(&df, "Motivation_Level")?;
    let internet_access = utf8_column(&df, "Internet_Access")?;
    let tutoring_sessions = utf8_column(&df, "Tutoring_Sessions")?;
    let family_income = utf8_column(&df, "Family_Income")?;
    let teacher_quality = utf8_column(&df, "Teacher_Quality")?;
    let school_type = utf8_column(&df, "School_Type")?;
    let peer_influence = utf8_column(&df, "Peer_Influence")?;
    let physical_activity = utf8_column(&df, "Physical_Activity")?;
    let learning_disabilities = utf8_column(&df, "Learning_Disabilities")?;
    let parental_education = utf8_column(&df, "Parental_Education_Level")?;
    let distance_from_home = utf8_column(&df, "Distance_from_Home")?;
    let gender = utf8_column(&df, "Gender")?;
    let exam_score = utf8_column(&df, "Exam_Score")?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let row = (|| -> Option<StudentRecord> {
            Some(StudentRecord {
                hours_studied: parse_float(hours_studied.get(i))?,
                attendance: parse_float(attendance.get(i))?,
                parental_involvement: trimmed(parental_involvement.get(i)),
                access_to_resources: trimmed(access_to_resources.get(i)),
                extracurricular_activities: trimmed(extracurricular.get(i)),
                sleep_hours: parse_float(sleep_hours.get(i))?,
                previous_scores: parse_float(previous_scores.get(i))?,
                motivation_level: trimmed(motivation_level.get(i)),
                internet_access: trimmed(internet_access.get(i)),
                tutoring_sessions: parse_float(tutoring_sessions.get(i))?,
                family_income: trimmed(family_income.get(i)),
                teacher_quality: trimmed_or(teacher_quality.get(i), "Medium"),
                school_type: trimmed(school_type.get(i)),
                peer_influence: trimmed(peer_influence.get(i)),
                physical_activity: parse_float(physical_activity.get(i))?,
                learning_disabilities: trimmed(learning_disabilities.get(i)),
                parental_education_level: trimmed_or(parental_education.get(i), "High School"),
                distance_from_home: trimmed_or(distance_from_home.get(i), "Near"),
                gender: trimmed(gender.get(i)),
                exam_score: parse_float(exam_score.get(i))?,
            })
        })();
        if let Some(record) = row {
            records.push(record);
        }
    }

    if records.is_empty() {
        anyhow::bail!("no valid student rows found in {}", file_path);
    }

    Ok(records)
}

/// Normalize cleaned records into a clustering feature matrix
pub fn prepare_features(records: Vec<StudentRecord>) -> crate::Result<StudentData> {
    let stats = FeatureStats::fit(&records, &CLUSTER_FEATURES)?;

    let mut flat = Vec::with_capacity(records.len() * CLUSTER_FEATURES.len());
    for record in &records {
        flat.extend(stats.transform(record)?.into_raw_vec());
    }
    let features = Array2::from_shape_vec((records.len(), CLUSTER_FEATURES.len()), flat)?;

    Ok(StudentData {
        records,
        features,
        stats,
    })
}

/// Load CSV data, clean it, and normalize the clustering features
pub fn load_and_process_data(file_path: &str) -> crate::Result<StudentData> {
    prepare_features(load_and_clean_data(file_path)?)
}

fn utf8_column<'a>(df: &'a DataFrame, name: &str) -> crate::Result<&'a Utf8Chunked> {
    Ok(df.column(name)?.utf8()?)
}

fn parse_float(value: Option<&str>) -> Option<f64> {
    let parsed: f64 = value?.trim().parse().ok()?;
    parsed.is_finite().then_some(parsed)
}

fn trimmed(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_string()
}

fn trimmed_or(value: Option<&str>, default: &str) -> String {
    let s = value.unwrap_or("").trim();
    if s.is_empty() {
        default.to_string()
    } else {
        s.to_string()
    }
}
