//! Visualization functions using Plotters for persona analysis

use crate::data::StudentData;
use crate::model::KMeansModel;
use crate::persona::Persona;
use crate::risk::RiskLabel;
use plotters::prelude::*;

/// Persona palette, aligned with the dashboard profile colors
const PERSONA_COLORS: [RGBColor; 5] = [
    RGBColor(124, 58, 237),
    RGBColor(14, 165, 233),
    RGBColor(245, 158, 11),
    RGBColor(239, 68, 68),
    RGBColor(16, 185, 129),
];

/// Create scatter plot of attendance vs exam score colored by persona
///
/// # Arguments
/// * `data` - Cleaned student data
/// * `personas` - Resolved persona per record
/// * `output_path` - Path to save the PNG plot
/// * `plot_title` - Title for the plot
pub fn create_persona_scatter(
    data: &StudentData,
    personas: &[Persona],
    output_path: &str,
    plot_title: Option<&str>,
) -> crate::Result<()> {
    let title = plot_title.unwrap_or("Learner Personas: Attendance vs Exam Score");

    let attendance: Vec<f64> = data.records.iter().map(|r| r.attendance).collect();
    let scores: Vec<f64> = data.records.iter().map(|r| r.exam_score).collect();

    // Calculate plot bounds with some padding
    let x_min = attendance.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - 2.0;
    let x_max = attendance.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + 2.0;
    let y_min = scores.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - 2.0;
    let y_max = scores.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + 2.0;

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Attendance (%)")
        .y_desc("Exam Score")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    // One series per persona so the legend carries the persona names
    for persona in Persona::ALL {
        let color = PERSONA_COLORS[persona.id()];
        let points: Vec<(f64, f64)> = data
            .records
            .iter()
            .zip(personas.iter())
            .filter(|(_, &p)| p == persona)
            .map(|(r, _)| (r.attendance, r.exam_score))
            .collect();
        if points.is_empty() {
            continue;
        }

        chart
            .draw_series(
                points
                    .into_iter()
                    .map(move |(x, y)| Circle::new((x, y), 3, color.filled())),
            )?
            .label(persona.name())
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    println!("Persona scatter saved to: {}", output_path);

    Ok(())
}

/// Create a simple histogram of persona sizes
pub fn create_persona_size_chart(persona_counts: &[usize; 5], output_path: &str) -> crate::Result<()> {
    let max_size = *persona_counts.iter().max().unwrap_or(&1) as f64;

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Persona Sizes", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..5f64, 0f64..(max_size * 1.1).max(1.0))?;

    chart
        .configure_mesh()
        .x_desc("Persona ID")
        .y_desc("Number of Students")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (persona_id, &size) in persona_counts.iter().enumerate() {
        let color = &PERSONA_COLORS[persona_id];
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (persona_id as f64 + 0.1, 0.0),
                (persona_id as f64 + 0.9, size as f64),
            ],
            color.filled(),
        )))?;
    }

    root.present()?;
    println!("Persona size chart saved to: {}", output_path);

    Ok(())
}

/// Count records per persona id
pub fn persona_counts(personas: &[Persona]) -> [usize; 5] {
    let mut counts = [0usize; 5];
    for persona in personas {
        counts[persona.id()] += 1;
    }
    counts
}

/// Print pipeline statistics to console
pub fn print_summary(
    data: &StudentData,
    model: &KMeansModel,
    personas: &[Persona],
    risks: &[(u32, RiskLabel)],
    correlations: &[(String, f64)],
) {
    let total = data.records.len();
    println!("\n=== Persona Statistics ===");
    println!("Total students: {}", total);
    println!("Within-cluster sum of squares (inertia): {:.2}", model.inertia);

    let counts = persona_counts(personas);
    println!("\nPersona sizes:");
    for persona in Persona::ALL {
        let count = counts[persona.id()];
        let percentage = (count as f64 / total as f64) * 100.0;
        println!(
            "  {} {}: {} students ({:.1}%)",
            persona.profile().icon,
            persona.name(),
            count,
            percentage
        );
    }

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
    println!("\nRisk tiers: {} High / {} Medium / {} Low", high, medium, low);

    println!("\nStrongest correlations with exam score:");
    for (name, coefficient) in correlations.iter().take(5) {
        println!("  {:<20} {:+.4}", name, coefficient);
    }
}

/// Generate the full visualization report
pub fn generate_visualization_report(
    data: &StudentData,
    personas: &[Persona],
    base_output_path: &str,
) -> crate::Result<()> {
    create_persona_scatter(data, personas, base_output_path, None)?;

    let size_chart_path = base_output_path.replace(".png", "_sizes.png");
    create_persona_size_chart(&persona_counts(personas), &size_chart_path)?;

    Ok(())
}
