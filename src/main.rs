use clap::Parser;
use sentiment_client::config::{Command, ReportsAction, SchedulesAction};
use sentiment_client::core::batch::DryRunReport;
use sentiment_client::core::validation::ValidationOptions;
use sentiment_client::core::ConfigProvider;
use sentiment_client::domain::sentiment::{
    Cadence, NewSchedule, RepresentativeReview, ReviewKind, ReviewQuery,
};
use sentiment_client::utils::error::ErrorSeverity;
use sentiment_client::utils::logger::LogFormat;
use sentiment_client::utils::{logger, validation::validate_file_extension, validation::Validate};
use sentiment_client::{
    ApiClient, BatchEngine, ClassifierSubmitter, ClientError, CliConfig, FileKeyValueStore,
    LocalStorage, ReportBook, ResultExporter, SessionContext, Settings,
};
use std::time::Duration;

type Session = SessionContext<FileKeyValueStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let settings = match Settings::resolve(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(cli.verbose, LogFormat::from_json_flag(settings.json_logs));

    tracing::info!("Starting sentiment-client CLI");
    if cli.verbose {
        tracing::debug!("Settings: {:?}", settings);
    }

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if settings.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    if let Err(e) = run(cli.command, &settings).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(command: Command, settings: &Settings) -> sentiment_client::Result<()> {
    let api = ApiClient::with_timeout(
        settings.api_url(),
        Duration::from_secs(settings.request_timeout_secs()),
    )?;

    let mut session = SessionContext::new(FileKeyValueStore::new(settings.state_dir()));
    if session.load()?.is_some() && checks_saved_session(&command) {
        session.verify(&api).await?;
    }

    match command {
        Command::Batch { file, dry_run, .. } => run_batch(&api, &session, settings, &file, dry_run).await,
        Command::Classify { text } => {
            let result = session.api_client(&api).classify_single(&text).await?;
            println!("{} ({:.2}) [{}]", result.label, result.confidence, result.lang);
            Ok(())
        }
        Command::Dashboard { days, seed } => {
            let client = session.require_api_client(&api)?;
            let snapshot = if seed {
                client.dashboard_or_seed(days).await?
            } else {
                client.dashboard_snapshot(days).await?
            };

            let d = &snapshot.metrics.distribution;
            println!("📊 Total reviews: {}", snapshot.metrics.total_reviews);
            println!(
                "   Positive {:.1}% · Neutral {:.1}% · Negative {:.1}%",
                d.positive, d.neutral, d.negative
            );
            println!("📈 Trend ({} days):", days);
            for point in &snapshot.trend {
                println!(
                    "   {}  +{:.0} ={:.0} -{:.0}",
                    point.date, point.pos, point.neu, point.neg
                );
            }
            println!("🏆 Most praised:");
            for product in &snapshot.top_products.pos {
                println!("   {} ({}) x{}", product.name, product.brand, product.count);
            }
            println!("⚠️ Most criticised:");
            for product in &snapshot.top_products.neg {
                println!("   {} ({}) x{}", product.name, product.brand, product.count);
            }
            Ok(())
        }
        Command::Highlights { limit } => {
            let client = session.require_api_client(&api)?;
            let (pos, neg) = tokio::try_join!(
                client.representative_reviews(ReviewKind::Pos, limit),
                client.representative_reviews(ReviewKind::Neg, limit)
            )?;
            print_highlights("👍 Positive", &pos);
            print_highlights("👎 Negative", &neg);
            Ok(())
        }
        Command::Catalog { brand } => {
            let client = session.require_api_client(&api)?;
            match brand {
                Some(brand) => {
                    for product in client.products(Some(&brand)).await? {
                        println!("{}\t{}", product.id, product.name);
                    }
                }
                None => {
                    for brand in client.brands().await? {
                        println!("{}", brand);
                    }
                }
            }
            Ok(())
        }
        Command::Reviews {
            page,
            limit,
            sentiment,
            brand,
        } => {
            let client = session.require_api_client(&api)?;
            let result = client
                .reviews(&ReviewQuery {
                    page,
                    limit,
                    sentiment,
                    brand,
                })
                .await?;
            for review in &result.reviews {
                let label = review
                    .sentiment
                    .as_ref()
                    .map(|s| s.label.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("[{}] {}", label, review.text);
            }
            let p = &result.pagination;
            println!("Page {}/{} ({} reviews)", p.page, p.pages, p.total);
            Ok(())
        }
        Command::Login { email, password } => {
            let user = session.sign_in(&api, &email, &password).await?;
            println!("✅ Signed in as {} <{}>", user.name, user.email);
            Ok(())
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let user = session.sign_up(&api, &name, &email, &password).await?;
            println!("✅ Account created for {} <{}>", user.name, user.email);
            Ok(())
        }
        Command::Logout => {
            session.sign_out(&api).await?;
            println!("👋 Signed out");
            Ok(())
        }
        Command::Whoami => {
            match session.user() {
                Some(user) => println!("{} <{}>", user.name, user.email),
                None => println!("Not signed in"),
            }
            Ok(())
        }
        Command::ForgotPassword { email } => {
            api.forgot_password(&email).await?;
            println!("📧 If an account exists for {}, a reset link is on its way", email);
            Ok(())
        }
        Command::ResetPassword { token, password } => {
            match api.reset_password(&token, &password).await? {
                Some(user) => {
                    let user = session.set_user(user)?;
                    println!("✅ Password updated, signed in as {}", user.email);
                }
                None => println!("✅ Password updated, please sign in"),
            }
            Ok(())
        }
        Command::GoogleUrl => {
            println!("{}", api.google_sign_in_url());
            Ok(())
        }
        Command::Reports { action } => run_reports(&session, action),
        Command::Schedules { action } => run_schedules(&api, &session, action).await,
    }
}

/// Local-only and sign-in commands skip the `/auth/me` round trip.
fn checks_saved_session(command: &Command) -> bool {
    !matches!(
        command,
        Command::Login { .. }
            | Command::Register { .. }
            | Command::Logout
            | Command::ForgotPassword { .. }
            | Command::ResetPassword { .. }
            | Command::GoogleUrl
            | Command::Reports { .. }
    )
}

async fn run_batch(
    api: &ApiClient,
    session: &Session,
    settings: &Settings,
    file: &str,
    dry_run: bool,
) -> sentiment_client::Result<()> {
    if let Err(e) = validate_file_extension("file", file, &["csv"]) {
        tracing::warn!("⚠️ {}", e);
    }

    let engine = BatchEngine::new_with_monitoring(
        LocalStorage::new(".".to_string()),
        ClassifierSubmitter::new(session.api_client(api)),
        ResultExporter::new(
            LocalStorage::new(settings.output_path().to_string()),
            settings.output_path(),
            settings.zip_output(),
        ),
        ValidationOptions {
            per_row_schema: settings.per_row_schema(),
        },
        settings.monitor,
    );

    if dry_run {
        let report = engine.dry_run(file).await?;
        print_dry_run(&report);
        if !report.validation.is_passed() {
            return Err(ClientError::UploadRejected {
                errors: report.validation.into_errors(),
            });
        }
        println!("✅ Upload passes validation");
        return Ok(());
    }

    let report = engine.run(file).await?;
    println!("✅ Classified {} rows", report.rows_submitted);
    if report.discarded_rows > 0 {
        println!("✂️ {} rows beyond the upload limit were skipped", report.discarded_rows);
    }
    println!(
        "   Positive {} · Neutral {} · Negative {} (avg confidence {:.2})",
        report.summary.positive,
        report.summary.neutral,
        report.summary.negative,
        report.summary.average_confidence
    );
    println!("📁 Results saved to: {}", report.output_path);
    Ok(())
}

fn print_dry_run(report: &DryRunReport) {
    println!("👀 {} rows", report.rows);
    println!("{}", report.preview.columns.join("\t"));
    for row in &report.preview.rows {
        println!("{}", row.join("\t"));
    }
    if report.rows > report.preview.rows.len() {
        println!("… {} more rows", report.rows - report.preview.rows.len());
    }
}

fn print_highlights(title: &str, reviews: &[RepresentativeReview]) {
    println!("{}", title);
    for review in reviews {
        println!(
            "   \"{}\" ({}, {:.0}%)",
            review.snippet,
            review.product.name,
            review.conf * 100.0
        );
    }
}

fn run_reports(session: &Session, action: ReportsAction) -> sentiment_client::Result<()> {
    let book = ReportBook::new(session.store());
    match action {
        ReportsAction::List => {
            for report in book.list()? {
                let created = chrono::DateTime::from_timestamp_millis(report.created_at)
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{}\t{}\t{}", report.id, created, report.title);
            }
        }
        ReportsAction::Save { title } => {
            let mut extra = serde_json::Map::new();
            if let Some(user) = session.user() {
                extra.insert(
                    "author".to_string(),
                    serde_json::Value::String(user.email.clone()),
                );
            }
            let meta = book.save(&title, extra)?;
            println!("🗂️ Saved report {}", meta.id);
        }
    }
    Ok(())
}

async fn run_schedules(
    api: &ApiClient,
    session: &Session,
    action: SchedulesAction,
) -> sentiment_client::Result<()> {
    let client = session.require_api_client(api)?;
    match action {
        SchedulesAction::List => {
            for schedule in client.schedules().await? {
                let state = if schedule.active { "active" } else { "paused" };
                println!(
                    "{}\t{:?}\t{}\t{}",
                    schedule.id, schedule.cadence, schedule.email, state
                );
            }
        }
        SchedulesAction::Create {
            cadence,
            email,
            date,
            time,
        } => {
            let schedule = NewSchedule {
                cadence: cadence.parse::<Cadence>()?,
                email,
                custom_date: date,
                custom_time: time,
            };
            client.create_schedule(&schedule).await?;
            println!("📅 Schedule created");
        }
        SchedulesAction::Delete { id } => {
            client.delete_schedule(&id).await?;
            println!("🗑️ Schedule {} deleted", id);
        }
        SchedulesAction::Toggle { id } => {
            client.toggle_schedule(&id).await?;
            println!("🔁 Schedule {} toggled", id);
        }
    }
    Ok(())
}
