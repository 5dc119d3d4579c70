use absence_digest::core::format::german_date;
use absence_digest::domain::model::{MonthKey, Reporter, Submission};
use absence_digest::domain::ports::{MessageChannel, StateStore};
use absence_digest::utils::error::{DigestError, ErrorSeverity};
use absence_digest::utils::{logger, validation::Validate};
use absence_digest::{
    parse, ChannelDayRecordStore, CliConfig, Command, DigestConfig, JsonStateStore, LocalStorage,
    MemoryChannel, MemoryStateStore, SubmissionService, WebhookChannel,
};
use chrono::{Datelike, Local};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if let Command::Parse { range } = &cli.command {
        logger::init_cli_logger(cli.verbose);
        exit_on_error(print_interval(range));
        return Ok(());
    }

    let config = match DigestConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    logger::init_logger(cli.verbose, config.log_level(), config.log_format());
    tracing::info!("Starting absence-digest");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - channels and state are kept in memory");
        run(
            &cli,
            &config,
            MemoryChannel::new(),
            MemoryChannel::new(),
            MemoryStateStore::new(),
        )
        .await
    } else {
        let storage = LocalStorage::new(config.state_directory().to_string());
        let state = JsonStateStore::new(storage, config.state_file_name());
        let announcements = WebhookChannel::new(
            config.channels.announcements.webhook_url.clone(),
            config.embed_color(),
        );
        let overview = WebhookChannel::new(
            config.channels.overview.webhook_url.clone(),
            config.embed_color(),
        );
        run(&cli, &config, announcements, overview, state).await
    };

    exit_on_error(result);
    Ok(())
}

async fn run<A, O, T>(
    cli: &CliConfig,
    config: &DigestConfig,
    announcements: A,
    overview: O,
    state: T,
) -> absence_digest::Result<()>
where
    A: MessageChannel,
    O: MessageChannel,
    T: StateStore,
{
    let mut service =
        SubmissionService::new(announcements, ChannelDayRecordStore::new(overview, state));
    if config.scaffold_current_month() {
        service = service.with_scaffold_month(MonthKey::from(Local::now().date_naive()));
    }

    match &cli.command {
        Command::Submit {
            range,
            reason,
            reporter,
        } => {
            let receipt = service
                .submit(&Submission {
                    range_text: range.clone(),
                    reporter: Reporter::new(reporter.clone()),
                    reason: reason.clone(),
                })
                .await?;

            for entry in &receipt.report.appended {
                println!("{}  {}", german_date(entry.date), entry.line);
            }
            println!("✅ {}", receipt.acknowledgement());
        }
        Command::EnsureMonth { year, month } => {
            let today = Local::now().date_naive();
            let year = year.unwrap_or(today.year());
            let month = month.unwrap_or(today.month());
            service.aggregator().ensure_month(year, month).await?;
            println!("✅ Day records for {}-{:02} are in place", year, month);
        }
        Command::Parse { range } => print_interval(range)?,
    }

    Ok(())
}

fn print_interval(range: &str) -> absence_digest::Result<()> {
    let interval = parse(range)?;
    println!("start: {}", interval.start().format("%d.%m.%Y %H:%M"));
    println!("end:   {}", interval.end().format("%d.%m.%Y %H:%M"));
    println!("explicit times: {}", interval.has_explicit_times());
    Ok(())
}

fn exit_on_error(result: absence_digest::Result<()>) {
    let Err(e) = result else {
        return;
    };

    tracing::error!("❌ absence-digest failed: {} (Severity: {:?})", e, e.severity());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    if !matches!(e, DigestError::Parse(_)) {
        eprintln!("💡 {}", e.recovery_suggestion());
    }

    // Exit code by severity
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 1,      // rejected input
        ErrorSeverity::Medium => 2,   // retryable
        ErrorSeverity::High => 1,     // processing error
        ErrorSeverity::Critical => 3, // system error
    };
    std::process::exit(exit_code);
}
