//! Command-line interface definitions and argument parsing

use clap::Parser;

/// Student learning analytics CLI: K-Means learner personas, risk scoring,
/// and dashboard bundle generation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input student CSV file
    #[arg(short, long, default_value = "Student_data.csv")]
    pub input: String,

    /// Output path for the analytics bundle consumed by the dashboard
    #[arg(short, long, default_value = "data.js")]
    pub output: String,

    /// Output path for the persona scatter plot
    #[arg(long, default_value = "persona_plot.png")]
    pub plot: String,

    /// Number of clusters for K-Means
    #[arg(short = 'k', long, default_value_t = 5)]
    pub clusters: usize,

    /// Fixed number of K-Means iterations
    #[arg(long, default_value_t = 40)]
    pub iterations: usize,

    /// Seed for centroid initialization
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Seed for scatter chart sampling
    #[arg(long, default_value_t = 0)]
    pub sample_seed: u64,

    /// Prediction mode: provide the six clustering features as a
    /// comma-separated string, in order
    /// "hours,attendance,sleep,previous,tutoring,physical".
    /// Example: --predict "20,84,7,73,1,3"
    #[arg(short, long)]
    pub predict: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse the six raw feature values from the predict string
    pub fn parse_feature_values(&self) -> crate::Result<Option<[f64; 6]>> {
        if let Some(ref predict_str) = self.predict {
            let parts: Vec<&str> = predict_str.split(',').collect();
            if parts.len() != 6 {
                anyhow::bail!(
                    "predict values must be in format 'hours,attendance,sleep,previous,tutoring,physical'"
                );
            }

            let mut values = [0.0; 6];
            for (slot, part) in values.iter_mut().zip(parts.iter()) {
                *slot = part
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid feature value: {}", part))?;
            }

            Ok(Some(values))
        } else {
            Ok(None)
        }
    }
}
