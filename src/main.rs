mod api;
mod server;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pairmatch::llm::LlmClient;
use pairmatch::user::generate_synthetic_population;
use pairmatch::{
    AnalysisStore, MatchConfig, MatchEngine, NarrativeModel, UserStore,
};

#[derive(Parser)]
#[command(name = "pairmatch", about = "Dating compatibility matching engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deterministic compatibility score for two users
    Score(PairArgs),
    /// Narrative compatibility analysis for two users
    Analyze(PairArgs),
    /// Generate analyses for every eligible candidate of a user
    AnalyzeAll(UserArgs),
    /// Stored matches for a user, best first
    Matches(UserArgs),
    /// Match-generation status for a user
    Status(UserArgs),
    /// Request profile regeneration (subject to the cooldown gate)
    Regenerate(UserArgs),
    /// Seed the data directory with a synthetic population
    Seed(SeedArgs),
    /// Run the HTTP API server
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct PairArgs {
    user_a: String,
    user_b: String,
}

#[derive(Args, Debug, Clone)]
struct UserArgs {
    user_id: String,
}

#[derive(Args, Debug, Clone)]
struct SeedArgs {
    #[arg(long, default_value_t = 12)]
    count: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long, default_value = "webapp/dist")]
    web_root: String,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pairmatch=info".into()),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, _) = MatchConfig::load(None)?;
    let engine = load_engine(config).await?;

    match cli.command {
        Command::Score(args) => run_score(engine, args).await,
        Command::Analyze(args) => run_analyze(engine, args).await,
        Command::AnalyzeAll(args) => run_analyze_all(engine, args).await,
        Command::Matches(args) => run_matches(engine, args).await,
        Command::Status(args) => run_status(engine, args).await,
        Command::Regenerate(args) => run_regenerate(engine, args).await,
        Command::Seed(args) => run_seed(engine, args).await,
        Command::Serve(args) => server::serve(engine, args).await,
    }
}

async fn load_engine(config: MatchConfig) -> Result<MatchEngine, String> {
    let data_dir = PathBuf::from(&config.data.dir);
    let users = Arc::new(UserStore::load(data_dir.join("users.json")).await?);
    let profiles =
        Arc::new(pairmatch::user::ProfileStore::load(data_dir.join("profiles.json")).await?);
    let analyses = Arc::new(AnalysisStore::load(data_dir.join("analyses.json")).await?);
    let model: Option<Arc<dyn NarrativeModel>> = LlmClient::from_env(&config.llm)
        .map(|client| Arc::new(client) as Arc<dyn NarrativeModel>);
    Ok(MatchEngine::new(config, users, profiles, analyses, model))
}

async fn run_score(engine: MatchEngine, args: PairArgs) -> Result<(), String> {
    let score = engine
        .score_pair(&args.user_a, &args.user_b)
        .await
        .map_err(|err| err.to_string())?;

    println!("Compatibility: {}/100", score.overall);
    let breakdown = &score.breakdown;
    println!("  values               {}", breakdown.values);
    println!("  lifestyle            {}", breakdown.lifestyle);
    println!("  relationship style   {}", breakdown.relationship_style);
    println!("  family plans         {}", breakdown.family_plans);
    println!("  interests            {}", breakdown.interests);
    println!("  personality          {}", breakdown.personality);
    println!("  social               {}", breakdown.social);
    println!("  intimacy             {}", breakdown.intimacy);
    println!("  love philosophy      {}", breakdown.love_philosophy);
    println!("  partner preferences  {}", breakdown.partner_preferences);
    Ok(())
}

async fn run_analyze(engine: MatchEngine, args: PairArgs) -> Result<(), String> {
    let analysis = engine
        .analyze(&args.user_a, &args.user_b)
        .await
        .map_err(|err| err.to_string())?;

    println!(
        "Overall: {}/100 (raw {} with {} red flag(s))",
        analysis.overall_score,
        analysis.raw_score,
        analysis.red_flags.len()
    );
    println!("\n{}\n", analysis.summary);
    print_flags("Green flags", &analysis.green_flags);
    print_flags("Yellow flags", &analysis.yellow_flags);
    print_flags("Red flags", &analysis.red_flags);
    Ok(())
}

async fn run_analyze_all(engine: MatchEngine, args: UserArgs) -> Result<(), String> {
    let report = engine
        .analyze_all_for_user(&args.user_id, None, None)
        .await
        .map_err(|err| err.to_string())?;
    println!(
        "Analyzed {} of {} eligible candidates",
        report.analyzed, report.total
    );
    Ok(())
}

async fn run_matches(engine: MatchEngine, args: UserArgs) -> Result<(), String> {
    let matches = engine
        .matches_for_user(&args.user_id)
        .await
        .map_err(|err| err.to_string())?;

    if matches.is_empty() {
        println!("No matches yet.");
        return Ok(());
    }
    for analysis in matches {
        let counterpart = analysis.counterpart(&args.user_id).to_string();
        println!("{}  {}/100  {}", counterpart, analysis.overall_score, analysis.summary);
    }
    Ok(())
}

async fn run_status(engine: MatchEngine, args: UserArgs) -> Result<(), String> {
    let status = engine
        .generation_status(&args.user_id)
        .await
        .map_err(|err| err.to_string())?;
    println!(
        "analyzing: {} | has analyses: {}",
        status.is_analyzing, status.has_any_analyses
    );
    Ok(())
}

async fn run_regenerate(engine: MatchEngine, args: UserArgs) -> Result<(), String> {
    engine
        .try_begin_regeneration(&args.user_id, Utc::now())
        .await
        .map_err(|err| err.to_string())?;
    println!("Regeneration window opened; extraction may proceed.");
    Ok(())
}

async fn run_seed(engine: MatchEngine, args: SeedArgs) -> Result<(), String> {
    let population = generate_synthetic_population(args.count, args.seed);
    let total = population.len();
    for (user, profile) in population {
        engine.users().upsert(user).await?;
        engine.profiles().upsert(profile).await?;
    }
    println!("Seeded {} users with profiles", total);
    Ok(())
}

fn print_flags(label: &str, flags: &[String]) {
    if flags.is_empty() {
        return;
    }
    println!("{}:", label);
    for flag in flags {
        println!("- {}", flag);
    }
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
