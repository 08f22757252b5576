use clap::Parser;
use product_content_etl::core::client::DEFAULT_MODEL;
use product_content_etl::core::extractor::Trigger;
use product_content_etl::core::flavor::{FlavorProfile, ResponseShape};
use product_content_etl::core::input::read_input;
use product_content_etl::core::{ConfigProvider, Storage};
use product_content_etl::utils::error::ErrorSeverity;
use product_content_etl::utils::{logger, validation::Validate};
use product_content_etl::{ContentPipeline, EtlEngine, LocalStorage, OpenAiClient, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Content generation driven by a TOML job file")]
struct Args {
    /// Path to TOML job file
    #[arg(short, long, default_value = "content-job.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override the primer setting from the job file
    #[arg(long)]
    primer: Option<bool>,

    /// Dry run - show what would be processed without calling the API
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based content job");
    tracing::info!("📁 Loading job file from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load job file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(primer) = args.primer {
        config.content.send_primer = Some(primer);
        tracing::info!("🔧 Primer overridden to: {}", primer);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let profile = config.profile()?;
    tracing::info!("✅ Job file loaded and validated successfully");

    display_config_summary(&config, &profile, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No API calls will be made");
        perform_dry_run(&config, &profile).await;
        return Ok(());
    }

    let client = match config.llm_settings().and_then(OpenAiClient::new) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let storage = LocalStorage::current_dir();
    let pipeline = ContentPipeline::new(storage, client, config, profile);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ Content job completed!");
            println!("✅ Content job completed!");
            println!(
                "📁 {} records saved to: {} ({} rows skipped)",
                report.records_written, report.output_path, report.rows_failed
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Content job failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, profile: &FlavorProfile, args: &Args) {
    println!("📋 Job Summary:");
    println!("  Job: {}", config.job.name);
    if let Some(description) = &config.job.description {
        println!("  Description: {}", description);
    }
    println!("  Flavor: {}", profile.name);
    println!("  Input: {} (column '{}')", config.input_path(), config.name_column());
    println!("  Output: {}", config.output_path());
    println!("  Primer: {}", if config.send_primer() { "on" } else { "off" });

    if let Some(max_rows) = config.max_rows() {
        println!("  Max Rows: {}", max_rows);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: &TomlConfig, profile: &FlavorProfile) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Completion Settings:");
    println!(
        "  Model: {}",
        config.llm.model.as_deref().unwrap_or(DEFAULT_MODEL)
    );
    println!("  Max tokens: {}", profile.max_tokens);
    match profile.temperature {
        Some(t) => println!("  Temperature: {}", t),
        None => println!("  Temperature: API default"),
    }
    match config.llm_settings() {
        Ok(_) => println!("  API key: present"),
        Err(_) => println!("  ⚠️ API key: missing (set llm.api_key or OPENAI_API_KEY)"),
    }

    println!();
    println!("🧾 Output Fields:");
    match &profile.shape {
        ResponseShape::Fields(spec) => {
            println!("  {} <- product name from input", profile.name_key);
            for rule in spec.rules() {
                if rule.key == profile.name_key {
                    continue;
                }
                let triggers: Vec<String> = rule
                    .triggers
                    .iter()
                    .map(|t| match t {
                        Trigger::Prefix(p) => format!("starts with \"{}\"", p),
                        Trigger::Contains(p) => format!("contains \"{}\"", p),
                    })
                    .collect();
                println!("  {} <- line that {}", rule.key, triggers.join(" or "));
            }
        }
        ResponseShape::Verbatim { key } => {
            println!("  {} <- product name from input", profile.name_key);
            println!("  {} <- full completion text", key);
        }
    }

    println!();
    println!("📥 Input Preview:");
    let storage = LocalStorage::current_dir();
    let preview = storage
        .read_file(config.input_path())
        .await
        .and_then(|data| read_input(config.input_path(), &data, config.name_column()));
    match preview {
        Ok(rows) => {
            let limit = config.max_rows().unwrap_or(rows.len()).min(rows.len());
            println!("  {} products found, {} would be processed", rows.len(), limit);
            if let Some(first) = rows.first() {
                println!();
                println!("✉️ First prompt:");
                println!("{}", profile.prompts.user_message(&first.name));
            }
        }
        Err(e) => println!("  ⚠️ Could not read input: {}", e),
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
