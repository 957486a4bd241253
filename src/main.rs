//! LearnForge: Student learning analytics CLI
//!
//! This is the main entrypoint that orchestrates data loading, clustering,
//! persona resolution, risk scoring, bundle generation, and prediction.

use anyhow::Result;
use clap::Parser;
use learnforge::{
    build_bundle, compute_correlations, compute_risk, fit_kmeans, load_and_process_data,
    reconcile_clusters, resolve_persona, viz, write_data_js, Args, Persona, RiskLabel,
};
use std::time::Instant;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    if args.verbose {
        println!("LearnForge - Student Learning Analytics");
        println!("=======================================\n");
    }

    // Check if in prediction mode
    if let Some(feature_values) = args.parse_feature_values()? {
        run_prediction_mode(&args, feature_values)?;
    } else {
        run_full_pipeline(&args)?;
    }

    Ok(())
}

/// Run prediction mode for a single student
fn run_prediction_mode(args: &Args, feature_values: [f64; 6]) -> Result<()> {
    println!("=== Prediction Mode ===");
    println!(
        "Input features: hours={}, attendance={}, sleep={}, previous={}, tutoring={}, physical={}",
        feature_values[0],
        feature_values[1],
        feature_values[2],
        feature_values[3],
        feature_values[4],
        feature_values[5]
    );

    let start_time = Instant::now();

    // Fit the pipeline on the training data
    if args.verbose {
        println!("\nLoading training data from: {}", args.input);
    }
    let data = load_and_process_data(&args.input)?;

    if args.verbose {
        println!("Loaded {} students", data.records.len());
        println!("\nFitting K-Means model with {} clusters...", args.clusters);
    }

    let model = fit_kmeans(&data.features, args.clusters, args.iterations, args.seed)?;
    let personas: Vec<Persona> = data.records.iter().map(resolve_persona).collect();
    let reconciliation = reconcile_clusters(&model, &personas);

    // Scale the new values and match against persona centroids
    let scaled = data.stats.scale_new_data(&feature_values)?;
    let persona = reconciliation
        .predict_persona(&scaled)
        .ok_or_else(|| anyhow::anyhow!("no persona centroids available for prediction"))?;

    let elapsed = start_time.elapsed();
    let profile = persona.profile();

    println!("\n✓ Predicted Persona: {} {}", profile.icon, profile.name);
    println!("  {}", profile.description);
    println!("  Processing time: {:.2}s", elapsed.as_secs_f64());

    println!("\nSuggested strategies:");
    for strategy in profile.strategies.iter() {
        println!("  - {}", strategy);
    }

    if args.verbose {
        let cluster = model.predict(&scaled)?;
        let sizes = model.cluster_sizes();
        println!("\nNearest raw cluster: {} ({} students)", cluster, sizes[cluster]);
    }

    Ok(())
}

/// Run full analytics pipeline
fn run_full_pipeline(args: &Args) -> Result<()> {
    println!("=== Full Analytics Pipeline ===\n");

    let start_time = Instant::now();

    // Step 1: Load and clean data
    if args.verbose {
        println!("Step 1: Loading and cleaning data");
        println!("  Input file: {}", args.input);
    }

    let data_start = Instant::now();
    let data = load_and_process_data(&args.input)?;
    let data_time = data_start.elapsed();

    println!("✓ Data loaded: {} students", data.records.len());
    if args.verbose {
        println!("  Processing time: {:.2}s", data_time.as_secs_f64());
        println!("  Features shape: {:?}", data.features.shape());
    }

    // Step 2: Fit K-Means model
    if args.verbose {
        println!("\nStep 2: Fitting K-Means model");
        println!("  Number of clusters: {}", args.clusters);
        println!("  Iterations: {}", args.iterations);
        println!("  Seed: {}", args.seed);
    }

    let model_start = Instant::now();
    let model = fit_kmeans(&data.features, args.clusters, args.iterations, args.seed)?;
    let model_time = model_start.elapsed();

    println!("✓ Model fitted successfully");
    if args.verbose {
        println!("  Fitting time: {:.2}s", model_time.as_secs_f64());
        println!("  Inertia: {:.2}", model.inertia);
    }

    // Step 3: Resolve personas and reconcile clusters
    let personas: Vec<Persona> = data.records.iter().map(resolve_persona).collect();
    let reconciliation = reconcile_clusters(&model, &personas);
    println!("✓ Personas resolved");

    // Step 4: Risk scoring
    let risks: Vec<(u32, RiskLabel)> = data.records.iter().map(compute_risk).collect();
    println!("✓ Risk scores computed");

    // Step 5: Correlations
    let correlations = compute_correlations(&data.records);
    println!("✓ Correlations computed");

    // Step 6: Build and write the analytics bundle
    let bundle = build_bundle(
        &data,
        &model,
        &personas,
        &risks,
        &reconciliation,
        &correlations,
        args.sample_seed,
    );
    let bytes = write_data_js(&bundle, &args.output)?;
    println!("✓ Analytics bundle written to {} ({}KB)", args.output, bytes / 1024);

    // Step 7: Visualizations and console summary
    if args.verbose {
        println!("\nStep 7: Generating visualizations");
        println!("  Output file: {}", args.plot);
    }

    let viz_start = Instant::now();
    viz::generate_visualization_report(&data, &personas, &args.plot)?;
    let viz_time = viz_start.elapsed();

    if args.verbose {
        println!("  Visualization time: {:.2}s", viz_time.as_secs_f64());
    }

    viz::print_summary(&data, &model, &personas, &risks, &correlations);

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());
    println!("Bundle saved to: {}", args.output);
    println!("Persona plot saved to: {}", args.plot);
    println!(
        "Persona sizes saved to: {}",
        args.plot.replace(".png", "_sizes.png")
    );

    Ok(())
}
