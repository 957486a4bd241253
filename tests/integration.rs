//! Integration tests for LearnForge

use learnforge::{
    build_bundle, compute_correlations, compute_risk, fit_kmeans, load_and_process_data,
    reconcile_clusters, resolve_persona, write_data_js, Persona, RiskLabel,
};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

const CSV_HEADER: &str = "Hours_Studied,Attendance,Parental_Involvement,Access_to_Resources,Extracurricular_Activities,Sleep_Hours,Previous_Scores,Motivation_Level,Internet_Access,Tutoring_Sessions,Family_Income,Teacher_Quality,School_Type,Peer_Influence,Physical_Activity,Learning_Disabilities,Parental_Education_Level,Distance_from_Home,Gender,Exam_Score";

/// Create a test CSV file with a spread of student profiles
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", CSV_HEADER).unwrap();

    // High performers
    writeln!(file, "25,95,High,High,Yes,7,70,High,Yes,1,High,High,Private,Neutral,4,No,Postgraduate,Near,Female,80").unwrap();
    writeln!(file, "30,92,High,High,Yes,6,85,High,Yes,2,High,High,Public,Positive,5,No,College,Near,Male,84").unwrap();
    writeln!(file, "28,90,Medium,High,Yes,7,80,High,Yes,0,Medium,High,Public,Positive,3,No,College,Near,Female,77").unwrap();

    // Steady mid-band students
    writeln!(file, "20,86,Medium,Medium,No,7,68,Medium,Yes,1,Medium,Medium,Public,Neutral,3,No,College,Near,Male,68").unwrap();
    writeln!(file, "18,80,Medium,Medium,No,8,66,Medium,Yes,1,Medium,Medium,Public,Neutral,2,No,High School,Moderate,Female,65").unwrap();
    writeln!(file, "22,75,Medium,Medium,Yes,7,71,Medium,Yes,2,Medium,Medium,Private,Positive,3,No,College,Near,Male,72").unwrap();

    // Disengaged and at-risk students
    writeln!(file, "5,65,Low,Low,No,9,60,Low,No,0,Low,Low,Public,Negative,1,Yes,High School,Far,Male,55").unwrap();
    writeln!(file, "8,68,Low,Low,No,8,55,Low,No,0,Low,Low,Public,Negative,1,No,High School,Far,Female,58").unwrap();
    writeln!(file, "12,71,Low,Medium,No,8,62,Low,Yes,0,Low,Medium,Public,Negative,2,No,High School,Moderate,Male,61").unwrap();

    // Past strength, current slump
    writeln!(file, "15,72,Medium,Medium,No,7,88,Medium,Yes,1,Medium,Medium,Public,Neutral,2,No,College,Near,Female,60").unwrap();
    writeln!(file, "14,70,Medium,Low,No,6,85,Medium,Yes,3,Low,,Public,Neutral,2,No,,Near,Male,62").unwrap();

    // Unparseable attendance, must be dropped during cleaning
    writeln!(file, "21,unknown,Medium,Medium,No,7,70,Medium,Yes,1,Medium,Medium,Public,Neutral,3,No,College,Near,Female,70").unwrap();

    writeln!(file, "26,89,High,Medium,Yes,7,74,High,Yes,1,Medium,High,Private,Positive,4,No,Postgraduate,Near,Male,76").unwrap();

    file
}

#[test]
fn test_end_to_end_pipeline() {
    let test_file = create_test_csv();
    let file_path = test_file.path().to_str().unwrap();

    // Load and clean data; the malformed row is dropped
    let data = load_and_process_data(file_path).unwrap();
    assert_eq!(data.records.len(), 12);
    assert_eq!(data.features.shape(), &[12, 6]);

    // Blank categoricals picked up their defaults
    assert_eq!(data.records[10].teacher_quality, "Medium");
    assert_eq!(data.records[10].parental_education_level, "High School");

    // Fit K-Means
    let model = fit_kmeans(&data.features, 4, 40, 42).unwrap();
    assert_eq!(model.labels.len(), 12);
    assert_eq!(model.centroids.shape(), &[4, 6]);
    for &label in model.labels.iter() {
        assert!(label < 4);
    }

    // Resolve personas and reconcile
    let personas: Vec<Persona> = data.records.iter().map(resolve_persona).collect();
    let reconciliation = reconcile_clusters(&model, &personas);

    // Every raw cluster maps to exactly one persona
    assert_eq!(reconciliation.cluster_personas.len(), 4);
    // Persona centroids only exist for personas that won a cluster
    for persona_id in reconciliation.persona_centers.keys() {
        assert!(reconciliation.persona_clusters.contains_key(persona_id));
    }

    // Risk scores stay in bounds with consistent labels
    let risks: Vec<(u32, RiskLabel)> = data.records.iter().map(compute_risk).collect();
    for &(score, label) in &risks {
        assert!(score <= 9);
        assert_eq!(label, RiskLabel::from_score(score));
    }

    // All fifteen feature correlations, sorted by descending magnitude
    let correlations = compute_correlations(&data.records);
    assert_eq!(correlations.len(), 15);
    for pair in correlations.windows(2) {
        assert!(pair[0].1.abs() >= pair[1].1.abs());
    }
}

#[test]
fn test_known_records_resolve_as_expected() {
    let test_file = create_test_csv();
    let file_path = test_file.path().to_str().unwrap();
    let data = load_and_process_data(file_path).unwrap();

    let personas: Vec<Persona> = data.records.iter().map(resolve_persona).collect();
    let risks: Vec<(u32, RiskLabel)> = data.records.iter().map(compute_risk).collect();

    // Row 0: score 80, attendance 95 -> top persona with zero risk
    assert_eq!(personas[0], Persona::DrivenAchiever);
    assert_eq!(risks[0], (0, RiskLabel::Low));

    // Row 6: score 55, attendance 65, everything adverse -> maximum risk
    assert_eq!(personas[6], Persona::StrugglingLearner);
    assert_eq!(risks[6], (9, RiskLabel::High));

    // Row 9: score 60 with previous 88 -> recovering from past strength
    assert_eq!(personas[9], Persona::PotentialBloomer);
}

#[test]
fn test_pipeline_is_deterministic() {
    let test_file = create_test_csv();
    let file_path = test_file.path().to_str().unwrap();

    let data_a = load_and_process_data(file_path).unwrap();
    let data_b = load_and_process_data(file_path).unwrap();
    assert_eq!(data_a.features, data_b.features);

    let model_a = fit_kmeans(&data_a.features, 5, 40, 42).unwrap();
    let model_b = fit_kmeans(&data_b.features, 5, 40, 42).unwrap();
    assert_eq!(model_a.labels, model_b.labels);
    assert_eq!(model_a.centroids, model_b.centroids);
}

#[test]
fn test_bundle_round_trip() {
    let test_file = create_test_csv();
    let file_path = test_file.path().to_str().unwrap();

    let data = load_and_process_data(file_path).unwrap();
    let model = fit_kmeans(&data.features, 4, 40, 42).unwrap();
    let personas: Vec<Persona> = data.records.iter().map(resolve_persona).collect();
    let reconciliation = reconcile_clusters(&model, &personas);
    let risks: Vec<(u32, RiskLabel)> = data.records.iter().map(compute_risk).collect();
    let correlations = compute_correlations(&data.records);

    let bundle = build_bundle(
        &data,
        &model,
        &personas,
        &risks,
        &reconciliation,
        &correlations,
        0,
    );

    let out_dir = tempdir().unwrap();
    let out_path = out_dir.path().join("data.js");
    let bytes = write_data_js(&bundle, out_path.to_str().unwrap()).unwrap();
    assert!(bytes > 0);

    // The payload after the assignment prefix must be valid JSON
    let content = std::fs::read_to_string(&out_path).unwrap();
    let prefix = "const ANALYTICS = ";
    let start = content.find(prefix).unwrap() + prefix.len();
    let end = content.rfind(';').unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content[start..end]).unwrap();

    assert_eq!(parsed["kpis"]["total"], 12);
    assert_eq!(parsed["personas"].as_array().unwrap().len(), 5);
    assert_eq!(parsed["score_dist"]["labels"].as_array().unwrap().len(), 16);
    assert_eq!(
        parsed["correlations"].as_object().unwrap().len(),
        15
    );
    assert_eq!(
        parsed["feature_stats"]["features"].as_array().unwrap().len(),
        6
    );

    // Scatter covers every record on a dataset this small
    assert_eq!(parsed["scatter"].as_array().unwrap().len(), 12);

    // Risk table rows carry the High label only
    for row in parsed["risk_table"].as_array().unwrap() {
        assert_eq!(row["risk"], "High");
    }
}

#[test]
fn test_prediction_flow() {
    let test_file = create_test_csv();
    let file_path = test_file.path().to_str().unwrap();

    let data = load_and_process_data(file_path).unwrap();
    let model = fit_kmeans(&data.features, 4, 40, 42).unwrap();
    let personas: Vec<Persona> = data.records.iter().map(resolve_persona).collect();
    let reconciliation = reconcile_clusters(&model, &personas);

    // Scale out-of-sample features and match a persona centroid
    let scaled = data
        .stats
        .scale_new_data(&[24.0, 90.0, 7.0, 75.0, 1.0, 3.0])
        .unwrap();
    let persona = reconciliation.predict_persona(&scaled);
    assert!(persona.is_some());

    let cluster = model.predict(&scaled).unwrap();
    assert!(cluster < 4);
}

#[test]
fn test_insufficient_data_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", CSV_HEADER).unwrap();
    writeln!(file, "25,95,High,High,Yes,7,70,High,Yes,1,High,High,Private,Neutral,4,No,College,Near,Female,80").unwrap();
    writeln!(file, "5,65,Low,Low,No,9,60,Low,No,0,Low,Low,Public,Negative,1,Yes,High School,Far,Male,55").unwrap();

    let data = load_and_process_data(file.path().to_str().unwrap()).unwrap();
    assert!(fit_kmeans(&data.features, 5, 40, 42).is_err());
}

#[test]
fn test_all_rows_invalid_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", CSV_HEADER).unwrap();
    writeln!(file, "x,y,Low,Low,No,z,w,Low,No,v,Low,Low,Public,Negative,u,Yes,High School,Far,Male,t").unwrap();

    assert!(load_and_process_data(file.path().to_str().unwrap()).is_err());
}
