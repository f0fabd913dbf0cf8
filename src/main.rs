mod cli;

use mediacook::{
    config,
    rate::CompressionRateCalculator,
    recipe::{Job, Recipe, RecipeRunner},
    scheduler::{PhaseScheduler, PhaseStatus},
};
use mediacook_av::{ProcessInvoker, StreamKind};
use mediacook_common::{
    paths::resolve_extension, ArtifactState, ContentKey, MediaObject, ObjectHash,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mediacook=trace,mediacook_av=trace,mediacook_common=debug".to_string()
        } else {
            "mediacook=info,mediacook_av=info,mediacook_common=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Process {
            input,
            content_type,
            hash,
            sync_only,
        } => process_file(
            &input,
            &content_type,
            hash.as_deref(),
            sync_only,
            cli.config.as_deref(),
        ),
        Commands::Rate {
            original,
            content_type,
            hash,
        } => rate_file(&original, &content_type, &hash, cli.config.as_deref()),
        Commands::Resolve { content_key } => resolve(&content_key, cli.config.as_deref()),
        Commands::Probe { file, json } => probe_file(&file, json, cli.config.as_deref()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("mediacook {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn process_file(
    input: &Path,
    content_type: &str,
    hash: Option<&str>,
    sync_only: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }

    let key = ContentKey::new(content_type);
    let recipe = config.registry().resolve(&key);
    let hash = match hash {
        Some(h) => ObjectHash::parse(h)?,
        None => ObjectHash::from_file(input)?,
    };
    let extension = resolve_extension(&key, input).unwrap_or_else(|| {
        tracing::warn!("No extension known for {} or {:?}, using .bin", key, input);
        "bin".to_string()
    });

    tracing::info!("Processing {:?} as {} ({} recipe)", input, hash, recipe);

    let invoker = ProcessInvoker::system(config.tool_paths());
    let mut job = Job::new(MediaObject::new(hash.clone(), key, input), recipe, &extension);
    if recipe == Recipe::Video {
        let probe = mediacook_av::probe_streams(&invoker, input)
            .with_context(|| format!("Failed to probe {:?}", input))?;
        tracing::debug!("Probed metadata: {:?}", probe);
        job = job.with_probe(probe);
    }

    let layout = config.storage_layout();
    let scheduler = PhaseScheduler::new(
        RecipeRunner::new(invoker, layout.clone()),
        config.processing.max_concurrent_jobs,
    )
    .with_budget_warning(config.processing.enforce_budget_warning);

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(async move {
        let handle = if sync_only {
            scheduler.submit_sync_only(job)
        } else {
            scheduler.submit(job)
        };
        tracing::info!("Waiting on {}", handle.hash());
        handle.wait().await
    })?;

    println!("Hash: {}", outcome.hash);
    println!("Recipe: {}", outcome.recipe);
    println!("Sync: {}", describe_status(&outcome.sync));
    println!("Async: {}", describe_status(&outcome.async_phase));

    println!("\nArtifacts:");
    let produced = std::iter::once(extension.as_str())
        .chain(recipe.outputs().iter().copied())
        .chain(recipe.extra_outputs().iter().copied());
    let mut seen = Vec::new();
    for ext in produced {
        if seen.contains(&ext) {
            continue;
        }
        seen.push(ext);
        if let ArtifactState::Present { size } = layout.artifact_state(&hash, ext)? {
            println!("  {} ({} bytes)", layout.artifact(&hash, ext).display(), size);
        }
    }
    let stylesheet = layout.font_stylesheet(&hash);
    if stylesheet.exists() {
        println!("  {}", stylesheet.display());
    }

    if outcome.sync.is_completed() {
        let rate = CompressionRateCalculator::new(layout).rate(input, &hash, recipe)?;
        println!("\nCompression rate: {:.2}", rate);
    }

    if !outcome.is_success() {
        anyhow::bail!("Processing {} failed", outcome.hash);
    }

    Ok(())
}

fn describe_status(status: &PhaseStatus) -> String {
    match status {
        PhaseStatus::Completed { elapsed } => format!("completed in {:.2?}", elapsed),
        PhaseStatus::Failed(error) => format!("failed: {}", error),
        PhaseStatus::Skipped => "skipped".to_string(),
    }
}

fn rate_file(
    original: &Path,
    content_type: &str,
    hash: &str,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let recipe = config.registry().resolve(&ContentKey::new(content_type));
    let hash = ObjectHash::parse(hash)?;

    let rate =
        CompressionRateCalculator::new(config.storage_layout()).rate(original, &hash, recipe)?;
    println!("{:.2}", rate);

    Ok(())
}

fn resolve(content_key: &str, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let recipe = config.registry().resolve(&ContentKey::new(content_key));

    println!("Recipe: {}", recipe);
    println!("Time budget: {}s", recipe.time_budget().as_secs());
    println!("Outputs: {}", recipe.outputs().join(", "));
    if !recipe.extra_outputs().is_empty() {
        println!("Extra outputs: {}", recipe.extra_outputs().join(", "));
    }
    println!(
        "Async phase: {}",
        if recipe.has_async_phase() { "yes" } else { "no" }
    );

    Ok(())
}

fn probe_file(file: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let invoker = ProcessInvoker::system(config.tool_paths());
    let meta = mediacook_av::probe_streams(&invoker, file)?;

    if json {
        let json_str = serde_json::to_string_pretty(&meta)?;
        println!("{}", json_str);
    } else {
        println!("File: {}", file.display());
        println!("Video: {}", meta.has_video);
        println!("Audio: {}", meta.has_audio);
        println!("Fonts: {}", meta.has_fonts);
        println!("Subtitles: {}", meta.has_subtitles);

        println!("\nStreams: {}", meta.streams.len());
        for stream in &meta.streams {
            let kind = match stream.kind {
                StreamKind::Font => "font",
                StreamKind::Subtitle => "subtitle",
                StreamKind::Other => "other",
            };
            print!("  [{}] {}", stream.index, kind);
            if let Some(ref codec) = stream.codec_name {
                print!(" {}", codec);
            }
            if stream.kind == StreamKind::Font {
                print!(" ({})", stream.attachment_name());
            }
            println!();
        }
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = mediacook_av::check_tools(&config.tool_paths());
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Recipes that need them will fail.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Storage root: {}", config.storage.expanded_root().display());
    println!(
        "  Max concurrent jobs: {}",
        config.processing.max_concurrent_jobs
    );
    println!("  Recipe overrides: {}", config.recipes.len());

    Ok(())
}
