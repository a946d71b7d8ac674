use anyhow::Context;
use researcher::cli::artifacts::RunArtifacts;
use researcher::cli::output::Output;
use researcher::cli::Cli;
use researcher::types::SourceType;
use researcher::{build_pipeline, ResearcherConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const PREVIEW_CHARS: usize = 500;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let mut config = ResearcherConfig::load(Some(cli.config.as_path()))
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    cli.apply_to(&mut config);

    init_tracing(&config.log_level, cli.verbose);

    let topic = cli.resolve_topic().context("Failed to read topic")?;
    output.banner(&topic);

    if config.deep_source.profile_path.is_none() {
        output.warning("CHROME_PROFILE_PATH not set; authenticated sources run without a session");
    }

    let pipeline = match build_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            output.error(&format!("Failed to initialise pipeline: {}", e));
            return Err(e.into());
        }
    };

    output.step(1, 4, "Planning and scouting");
    let outcome = pipeline.run(&topic).await;

    output.header("Plan");
    output.kv("Sub-tasks", &outcome.plan.sub_tasks.len().to_string());
    output.kv(
        "Open web",
        &outcome.plan.count_by_source(SourceType::OpenWeb).to_string(),
    );
    output.kv(
        "Authenticated",
        &outcome
            .plan
            .count_by_source(SourceType::Authenticated)
            .to_string(),
    );
    for task in &outcome.plan.sub_tasks {
        output.list_item(&format!("[{}] {}", task.source_type, task.description));
    }

    output.step(2, 4, &format!("{} raw findings gathered", outcome.findings.len()));
    output.step(3, 4, &format!("{} high-value findings retained", outcome.gold.len()));

    let written = RunArtifacts::new(&config.output)
        .write(&outcome, &config.llm.model)
        .context("Failed to write run artifacts")?;
    output.step(4, 4, "Report written");

    output.header("Research Complete");
    output.kv("Run ID", &written.run_id);
    output.kv("Report", &written.report_path.display().to_string());
    output.kv("Metadata", &written.metadata_path.display().to_string());
    output.kv("Latest", &written.latest_path.display().to_string());

    output.preview(&outcome.report, PREVIEW_CHARS);
    output.complete("Done");

    Ok(())
}

fn init_tracing(log_level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}
