use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::app::status::render_status;
use crate::cli::{Cli, Commands, IngestArgs, StyleCommands};
use crate::config::Config;
use crate::ingest::dates::{parse_day, today};
use crate::ingest::scrape::{ScrapeRequest, collect};
use crate::ingest::{
    DateWindow, Extracted, IngestOptions, IngestReport, ingest, load_linkedin, load_nitter,
};
use crate::pipeline::GenerationPipeline;
use crate::style::StyleStore;
use crate::types::{GenerationRequest, ResearchOptions};

/// Flags for one `generate` run, gathered from the CLI.
struct GenerateArgs {
    request: GenerationRequest,
    strict: bool,
    json: bool,
}

fn open_store(config: &Config) -> Result<Arc<StyleStore>> {
    let path = config.style_guide_path();
    let store = StyleStore::open(&path)
        .with_context(|| format!("opening style guide {}", path.display()))?;
    Ok(Arc::new(store))
}

fn optional_day(value: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
    value.map(parse_day).transpose().map_err(Into::into)
}

fn ingest_options(config: &Config, args: &IngestArgs) -> Result<IngestOptions> {
    let window = DateWindow::new(
        optional_day(args.since.as_deref())?,
        optional_day(args.until.as_deref())?,
    );
    Ok(IngestOptions {
        window,
        min_words: args.min_words.unwrap_or(config.ingest.min_words),
        out: args.out.clone().unwrap_or_else(|| config.corpus_path()),
        append: args.append,
        update_style: args.update_style || args.force_update_style,
        force_update_style: args.force_update_style,
        max_examples: config.ingest.max_examples,
    })
}

fn print_report(report: &IngestReport) {
    println!(
        "✓ {}",
        t!(
            "ingest.done",
            ingested = report.ingested,
            extracted = report.extracted,
            path = report.corpus_path
        )
    );
    println!(
        "  {}",
        t!(
            "ingest.skipped",
            short = report.skipped_short,
            duplicate = report.skipped_duplicate,
            no_date = report.skipped_no_date,
            out_of_range = report.skipped_out_of_range
        )
    );
    if let Some(version) = report.style_version {
        println!("  {}", t!("ingest.style_updated", version = version));
    }
}

async fn run_ingest(config: &Config, extracted: Extracted, args: &IngestArgs) -> Result<()> {
    let options = ingest_options(config, args)?;
    let store = open_store(config)?;
    let report = ingest(extracted, &store, &options).await?;
    print_report(&report);
    Ok(())
}

async fn run_generate(config: &Config, args: GenerateArgs) -> Result<()> {
    let store = open_store(config)?;
    let pipeline = GenerationPipeline::from_config(config, store).strict(args.strict);

    let outcome = match pipeline.run(args.request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let stage = e.stage;
            return Err(anyhow::Error::new(e).context(format!("generation failed at stage {stage}")));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("{}", outcome.render_text());
    for warning in &outcome.warnings {
        eprintln!("! {warning}");
    }
    for (i, draft) in outcome.drafts.iter().enumerate() {
        for suggestion in &draft.grammar_suggestions {
            eprintln!(
                "~ {}",
                t!(
                    "generate.grammar",
                    draft = i + 1,
                    excerpt = suggestion.excerpt,
                    message = suggestion.message
                )
            );
        }
    }
    if !outcome.metadata.sources.is_empty() {
        eprintln!("{}", t!("generate.sources"));
        for (i, source) in outcome.metadata.sources.iter().enumerate() {
            eprintln!("  [{}] {} {}", i + 1, source.title, source.url);
        }
    }
    Ok(())
}

async fn run_style(config: &Config, command: StyleCommands) -> Result<()> {
    let store = open_store(config)?;
    match command {
        StyleCommands::Show => {
            println!("{}", serde_json::to_string_pretty(store.snapshot().as_ref())?);
        }
        StyleCommands::Lock => {
            let guide = store.set_locked(true, false).await?;
            println!("✓ {}", t!("style.locked", version = guide.version));
        }
        StyleCommands::Unlock { force } => {
            let guide = store.set_locked(false, force).await?;
            println!("✓ {}", t!("style.unlocked", version = guide.version));
        }
    }
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    match cli.command {
        Commands::Generate {
            platform,
            context,
            facts,
            angle,
            cta,
            thread,
            variants,
            max_chars,
            research_query,
            no_research,
            no_auto_research,
            no_proofread,
            strict,
            json,
        } => {
            let mut request = GenerationRequest::new(platform);
            request.context = context;
            request.facts = facts;
            request.angle = angle;
            request.call_to_action = cta;
            request.thread = thread;
            request.variants = variants;
            request.max_chars = max_chars;
            request.research = ResearchOptions {
                allow: !no_research,
                query: research_query,
                auto: !no_auto_research,
            };
            request.proofread = !no_proofread;
            run_generate(
                &config,
                GenerateArgs {
                    request,
                    strict,
                    json,
                },
            )
            .await
        }

        Commands::IngestLinkedin {
            pdf,
            reference_date,
            ingest,
        } => {
            let reference = optional_day(reference_date.as_deref())?.unwrap_or_else(today);
            let extracted = load_linkedin(&pdf, &config.ingest.author_name, reference)?;
            info!(path = %pdf.display(), posts = extracted.posts.len(), "linkedin export read");
            run_ingest(&config, extracted, &ingest).await
        }

        Commands::IngestNitter { pdf, ingest } => {
            let extracted = load_nitter(&pdf, &config.ingest.author_handle)?;
            info!(path = %pdf.display(), posts = extracted.posts.len(), "nitter export read");
            run_ingest(&config, extracted, &ingest).await
        }

        Commands::Scrape {
            platform,
            profile,
            html,
            nitter_instance,
            max_posts,
            acknowledge_terms,
            acknowledge_risk,
            ingest,
        } => {
            let request = ScrapeRequest {
                platform,
                profile,
                html,
                nitter_instance,
                max_posts,
                acknowledge_terms,
                acknowledge_risk,
            };
            let extracted = collect(&request).await?;
            run_ingest(&config, extracted, &ingest).await
        }

        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            let store = open_store(&config)?;
            let pipeline = Arc::new(GenerationPipeline::from_config(&config, store));
            crate::gateway::run_gateway(&host, port, Arc::clone(&config), pipeline).await
        }

        Commands::Status => {
            let store = open_store(&config)?;
            println!("{}", render_status(&config, &store.snapshot()));
            Ok(())
        }

        Commands::Style { style_command } => run_style(&config, style_command).await,
    }
}

/// Resolve the config file: an explicit `--config` path, or the default
/// location (created on first run).
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load_or_init()?,
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
