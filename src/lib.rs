//! LearnForge: A Rust CLI application for student learning analytics
//!
//! This library transforms a tabular dataset of student records into a
//! precomputed analytics bundle for a static dashboard: K-Means behavioral
//! clusters reconciled into five learner personas, composite disengagement
//! risk scores, feature-to-outcome correlations, and aggregate summaries.

pub mod cli;
pub mod data;
pub mod model;
pub mod persona;
pub mod report;
pub mod risk;
pub mod stats;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{
    load_and_clean_data, load_and_process_data, FeatureStats, StudentData, StudentRecord,
    CLUSTER_FEATURES,
};
pub use model::{fit_kmeans, KMeansModel};
pub use persona::{
    reconcile_clusters, resolve_persona, Persona, PersonaProfile, PersonaReconciliation,
    PERSONA_PROFILES,
};
pub use report::{build_bundle, write_data_js, AnalyticsBundle};
pub use risk::{compute_risk, RiskLabel};
pub use stats::compute_correlations;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
