use analytics::AnalyticsSnapshot;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::Config;
use core_types::{Mindset, MindsetEntry, NewMindsetEntry, NewRound, Round};
use database::{DbRepository, PerformanceStore, connect, run_migrations};
use engine::{AnalysisOrchestrator, AnalysisOutcome, RecomputeTrigger};
use events::RoundCreated;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// The main entry point for the Cashout round journal.
#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; DATABASE_URL may come from the environment.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = configuration::load_config_from(&cli.config).context("Failed to load configuration")?;
    let _log_guard = configuration::init_tracing(&config.logging)?;

    // Initialize the database connection and run migrations
    let pool = connect(
        config.database.url.as_deref(),
        config.database.max_connections,
        Duration::from_secs(config.database.acquire_timeout_secs),
    )
    .await
    .context("Failed to connect to the database")?;
    run_migrations(&pool).await.context("Failed to run database migrations")?;

    let store: Arc<dyn PerformanceStore> = Arc::new(DbRepository::new(pool));

    // Execute the appropriate command
    match cli.command {
        Commands::LogRound(args) => handle_log_round(args, &config, store).await,
        Commands::LogMindset(args) => handle_log_mindset(args, store).await,
        Commands::Analyze(args) => handle_analyze(args, &config, store).await,
        Commands::Show(args) => handle_show(args, store).await,
        Commands::Chat(args) => handle_chat(args, store).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Log crash-game rounds and mindset entries, and get a behavioral performance read-out.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a round and recompute the user's analytics.
    LogRound(LogRoundArgs),
    /// Record a mindset journal entry.
    LogMindset(LogMindsetArgs),
    /// Recompute analytics without logging a round.
    Analyze(AnalyzeArgs),
    /// Print the user's latest analytics snapshot.
    Show(ShowArgs),
    /// Print the user's coaching chat.
    Chat(UserArgs),
}

#[derive(Parser)]
struct UserArgs {
    /// The user whose data to use.
    #[arg(long)]
    user: String,
}

#[derive(Parser)]
struct LogRoundArgs {
    #[arg(long)]
    user: String,

    /// The stake (e.g., 25.00).
    #[arg(long)]
    amount: Decimal,

    /// The multiplier you cashed out at; 0 if you never cashed out.
    #[arg(long, default_value = "0")]
    multiplier: Decimal,

    /// The multiplier at which the round crashed.
    #[arg(long)]
    crash_point: Decimal,

    /// How you felt (Neutral, Focused, Greedy, Tilted, Disciplined).
    #[arg(long)]
    mindset: Option<Mindset>,

    #[arg(long)]
    notes: Option<String>,
}

#[derive(Parser)]
struct LogMindsetArgs {
    #[arg(long)]
    user: String,

    /// Confidence, 1-10.
    #[arg(long)]
    confidence: u8,

    /// Discipline, 1-10.
    #[arg(long)]
    discipline: u8,

    /// Self-reported emotional bias, 0-100.
    #[arg(long)]
    bias: u8,

    #[arg(long)]
    goals: Option<String>,

    #[arg(long)]
    lessons: Option<String>,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Analyze a single user.
    #[arg(long, conflicts_with = "all", required_unless_present = "all")]
    user: Option<String>,

    /// Analyze every user with at least one round.
    #[arg(long)]
    all: bool,
}

#[derive(Parser)]
struct ShowArgs {
    #[arg(long)]
    user: String,

    /// Print the raw snapshot document instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

/// Stores the round, then fires the recompute trigger exactly as the ingestion
/// flow would, with the alerter listening for the result.
async fn handle_log_round(args: LogRoundArgs, config: &Config, store: Arc<dyn PerformanceStore>) -> Result<()> {
    let round = Round::settle(
        NewRound {
            amount: args.amount,
            cash_out_multiplier: args.multiplier,
            crash_point: args.crash_point,
            mindset: args.mindset,
            notes: args.notes,
        },
        Utc::now(),
    )?;
    store.insert_round(&args.user, &round).await.context("Failed to store round")?;
    println!("Logged a {} of {} ({}).", round.outcome, round.profit.round_dp(2), round.id);

    let (events_tx, events_rx) = broadcast::channel(16);
    let sinks = alerter::build_sinks(&config.notifications, Arc::clone(&store));
    let alerter_task = tokio::spawn(alerter::run_alerter_service(sinks, events_rx));

    let orchestrator = Arc::new(AnalysisOrchestrator::new(Arc::clone(&store), &config.analysis));
    let trigger = RecomputeTrigger::new(orchestrator).with_events(events_tx);
    let outcome = trigger.on_round_created(&RoundCreated::new(args.user.as_str(), round.id)).await;

    // Dropping the trigger closes the event channel so the alerter can finish.
    drop(trigger);
    alerter_task.await.context("Alerter task failed")?;

    report_outcome(&args.user, &outcome);
    Ok(())
}

async fn handle_log_mindset(args: LogMindsetArgs, store: Arc<dyn PerformanceStore>) -> Result<()> {
    let entry = MindsetEntry::record(
        NewMindsetEntry {
            confidence: args.confidence,
            discipline_score: args.discipline,
            emotional_bias_score: args.bias,
            pre_session_goals: args.goals,
            lessons_learned: args.lessons,
        },
        Utc::now(),
    )?;
    store
        .insert_mindset_entry(&args.user, &entry)
        .await
        .context("Failed to store mindset entry")?;
    println!("Journal entry saved. It will be used from the next logged round.");
    Ok(())
}

async fn handle_analyze(args: AnalyzeArgs, config: &Config, store: Arc<dyn PerformanceStore>) -> Result<()> {
    let orchestrator = Arc::new(AnalysisOrchestrator::new(Arc::clone(&store), &config.analysis));

    if let Some(user) = args.user {
        let outcome = orchestrator.analyze_user(&user).await;
        report_outcome(&user, &outcome);
        return Ok(());
    }

    let users = store.list_users().await.context("Failed to list users")?;

    // Set up the progress bar
    let progress_bar = ProgressBar::new(users.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    // Create concurrent tasks for each user
    let tasks: Vec<_> = users
        .into_iter()
        .map(|user| {
            let orchestrator = Arc::clone(&orchestrator);
            let pb = progress_bar.clone();
            tokio::spawn(async move {
                pb.set_message(format!("Analyzing {user}..."));
                let outcome = orchestrator.analyze_user(&user).await;
                pb.inc(1);
                outcome
            })
        })
        .collect();

    let results = join_all(tasks).await;
    progress_bar.finish_with_message("Analysis complete!");

    let (mut completed, mut skipped, mut failed) = (0, 0, 0);
    for result in results {
        match result {
            Ok(AnalysisOutcome::Completed(_)) => completed += 1,
            Ok(AnalysisOutcome::InsufficientData { .. }) => skipped += 1,
            Ok(AnalysisOutcome::Failed(_)) => failed += 1,
            Err(e) => {
                failed += 1;
                tracing::error!(error = %e, "Analysis task panicked.");
            }
        }
    }
    println!("{completed} updated, {skipped} skipped (not enough rounds), {failed} failed.");
    Ok(())
}

async fn handle_show(args: ShowArgs, store: Arc<dyn PerformanceStore>) -> Result<()> {
    let Some(snapshot) = store.latest_snapshot(&args.user).await? else {
        println!("No analytics yet for {}. Log a few more rounds first.", args.user);
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", snapshot_table(&snapshot));
        println!("\n{}\n", snapshot.performance_summary);
        println!("Coach: {}", snapshot.ai_comment);
        println!("Next:  {}", snapshot.ai_suggestion);
        for insight in &snapshot.insights {
            println!("  - {insight}");
        }
    }
    Ok(())
}

async fn handle_chat(args: UserArgs, store: Arc<dyn PerformanceStore>) -> Result<()> {
    let messages = store.fetch_chat_messages(&args.user).await?;
    if messages.is_empty() {
        println!("No messages yet.");
    }
    for message in messages {
        println!(
            "[{}] {}: {}",
            message.timestamp.format("%Y-%m-%d %H:%M"),
            message.sender.as_str(),
            message.text
        );
    }
    Ok(())
}

// ==============================================================================
// Output
// ==============================================================================

fn report_outcome(user: &str, outcome: &AnalysisOutcome) {
    match outcome {
        AnalysisOutcome::Completed(snapshot) => {
            println!("{}", snapshot_table(snapshot));
            println!("Coach: {}", snapshot.ai_comment);
        }
        AnalysisOutcome::InsufficientData { rounds, required } => {
            println!("{user} has {rounds} of the {required} rounds needed for analysis.");
        }
        AnalysisOutcome::Failed(e) => {
            println!("Analysis for {user} did not run ({e}). The previous snapshot is unchanged.");
        }
    }
}

fn snapshot_table(snapshot: &AnalyticsSnapshot) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    table
        .add_row(vec!["Rounds".to_string(), snapshot.total_rounds.to_string()])
        .add_row(vec!["Win rate".to_string(), format!("{}%", snapshot.win_rate.round_dp(1))])
        .add_row(vec!["Avg. multiplier".to_string(), format!("{}x", snapshot.avg_multiplier.round_dp(2))])
        .add_row(vec!["Risk/reward".to_string(), snapshot.risk_reward_ratio.round_dp(2).to_string()])
        .add_row(vec!["Net profit".to_string(), snapshot.total_profit_loss.round_dp(2).to_string()])
        .add_row(vec!["Best range".to_string(), snapshot.best_range.to_string()])
        .add_row(vec![
            "Profit consistency".to_string(),
            snapshot.profit_consistency_score.round_dp(1).to_string(),
        ])
        .add_row(vec!["Max loss streak".to_string(), snapshot.max_loss_streak.to_string()])
        .add_row(vec!["Max win streak".to_string(), snapshot.max_win_streak.to_string()])
        .add_row(vec!["Revenge betting".to_string(), format!("{}/100", snapshot.revenge_betting_score)])
        .add_row(vec!["Emotional bias".to_string(), format!("{}/100", snapshot.emotional_bias_score)])
        .add_row(vec![
            "Last analyzed".to_string(),
            snapshot.last_analyzed.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ]);
    table
}
