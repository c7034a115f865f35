use anyhow::Context;
use clap::Parser;
use quote_sync::config::{validate_provider, TomlConfig};
use quote_sync::core::ConfigProvider;
use quote_sync::domain::model::ALL_CATEGORIES;
use quote_sync::utils::error::ErrorSeverity;
use quote_sync::utils::logger::{self, LogFormat};
use quote_sync::{
    CliConfig, Command, HttpQuoteSource, LocalStorage, QuoteError, QuoteStore, StoreOptions,
    SyncScheduler,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

type Store = QuoteStore<LocalStorage, HttpQuoteSource>;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(format, cli.verbose);

    tracing::info!("Starting quote-sync");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        report_and_exit(e);
    }
}

async fn run(cli: &CliConfig) -> anyhow::Result<()> {
    let config: Box<dyn ConfigProvider> = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            Box::new(TomlConfig::from_file(path)?)
        }
        None => Box::new(cli.clone()),
    };

    // 驗證配置
    validate_provider(config.as_ref())?;

    let storage = LocalStorage::new(config.storage_path().to_string());
    let source = HttpQuoteSource::from_config(config.as_ref())?;
    let store = Arc::new(
        QuoteStore::open(storage, source, StoreOptions::from_config(config.as_ref())).await?,
    );

    match &cli.command {
        Command::Show { category } => {
            let shown = match category {
                Some(category) => store.show_random_quote_in(category).await?,
                None => store.show_random_quote().await?,
            };
            println!("{}", shown);
        }
        Command::Categories => {
            let selected = store.selected_category().await;
            for category in store.category_options().await {
                let marker = if category == selected { "*" } else { " " };
                let label = if category == ALL_CATEGORIES {
                    "All Categories"
                } else {
                    category.as_str()
                };
                println!("{} {}", marker, label);
            }
        }
        Command::Add { text, category } => {
            store.add_quote(text, category).await?;
            println!("✅ Quote added!");
            println!("{}", store.show_random_quote().await?);
            // CLI 即將結束，讓背景 POST 有機會完成
            store.wait_for_pending_posts().await;
        }
        Command::Filter { category } => {
            store.set_selected_category(category).await?;
            println!("{}", store.show_random_quote().await?);
        }
        Command::Export { output } => {
            let payload = store.export_quotes().await?;
            tokio::fs::write(output, payload)
                .await
                .with_context(|| format!("failed to write export file '{}'", output))?;
            println!("📁 Exported {} quote(s) to {}", store.len().await, output);
        }
        Command::Import { file } => {
            let payload = tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("failed to read import file '{}'", file))?;
            let count = store.import_quotes(&payload).await?;
            println!("✅ Imported {} quote(s) successfully!", count);
            println!("{}", store.show_random_quote().await?);
        }
        Command::Sync => {
            let outcome = store.sync_quotes().await?;
            println!("🔄 {}", outcome.summary());
        }
        Command::Watch => watch(store, config.as_ref()).await,
        Command::Last => match store.last_shown().await? {
            Some(last) => println!("{}", last),
            None => println!("No quote shown yet"),
        },
    }

    Ok(())
}

async fn watch(store: Arc<Store>, config: &dyn ConfigProvider) {
    let token = CancellationToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let scheduler = SyncScheduler::spawn(store, config.sync_interval(), token.clone(), Some(tx));

    println!(
        "🔄 Syncing every {}s from {} (Ctrl-C to stop)",
        config.sync_interval().as_secs(),
        config.api_endpoint()
    );

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::warn!("Failed to listen for Ctrl-C: {}", e);
                }
                break;
            }
            Some(outcome) = rx.recv() => {
                println!("🔄 {} ({} total)", outcome.summary(), outcome.total);
            }
        }
    }

    scheduler.shutdown().await;
}

fn report_and_exit(e: anyhow::Error) -> ! {
    match e.downcast_ref::<QuoteError>() {
        Some(err) => {
            tracing::error!(
                "❌ quote-sync failed: {} (Category: {:?}, Severity: {:?})",
                err,
                err.category(),
                err.severity()
            );
            eprintln!("❌ {}", err.user_friendly_message());
            eprintln!("💡 Suggestion: {}", err.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match err.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
        None => {
            tracing::error!("❌ quote-sync failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}
