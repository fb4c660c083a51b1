use crate::api::infra::{bootstrap, load_context};
use crate::error::AppError;
use crate::segmentation::{ApplicantRecord, ClusterOverview, PredictionView, SegmentationContext};
use clap::Args;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Applicant record as an inline JSON object
    #[arg(long, conflicts_with = "input", required_unless_present = "input")]
    pub(crate) record: Option<String>,
    /// Path to a JSON file holding the applicant record
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Print the prediction as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_score(args: ScoreArgs, dataset: Option<PathBuf>) -> Result<(), AppError> {
    let config = bootstrap(dataset)?;
    let record = read_record(&args)?;
    let context = load_context(&config.model)?;

    let result = context.score(&record)?;
    let view = PredictionView::from(&result);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("Applicant assessment");
    println!(
        "  Segment: cluster {} (distance {:.4})",
        view.cluster_id, view.distance_to_centroid
    );
    println!(
        "  Segment history: {} applicants, default rate {:.1}%, approval rate {:.1}%",
        view.cluster_size,
        view.default_rate * 100.0,
        view.approval_rate * 100.0
    );
    println!(
        "  Recommendation: {} ({})",
        view.recommendation.label(),
        view.recommendation.summary()
    );
    println!(
        "  Risk level: {} [{}], confidence {:.1}%",
        view.risk_level.label(),
        view.color,
        view.confidence
    );
    Ok(())
}

pub(crate) fn run_clusters(dataset: Option<PathBuf>) -> Result<(), AppError> {
    let config = bootstrap(dataset)?;
    let context = load_context(&config.model)?;
    render_clusters(&context);
    Ok(())
}

fn read_record(args: &ScoreArgs) -> Result<ApplicantRecord, AppError> {
    let raw = match (&args.record, &args.input) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => "{}".to_string(),
    };
    let fields: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)?;
    Ok(ApplicantRecord::try_from(fields)?)
}

fn render_clusters(context: &SegmentationContext) {
    let overview = ClusterOverview::from_context(context);

    println!("Risk segments");
    println!(
        "  {} historical applicants, {} encoded columns, built {}",
        overview.total_records,
        overview.encoded_columns,
        overview.initialized_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    for cluster in &overview.clusters {
        println!(
            "  - cluster {}: {} applicants ({:.1}%), default rate {:.1}%, approval rate {:.1}%",
            cluster.id,
            cluster.size,
            cluster.percentage,
            cluster.default_rate * 100.0,
            cluster.approval_rate * 100.0
        );
    }
}
