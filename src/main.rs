use anyhow::Result;
use samna_salta::bot;
use samna_salta::cache::CacheManager;
use samna_salta::config::AppConfig;
use samna_salta::db;
use samna_salta::dialogue::{OrderDialogue, OrderDialogueState};
use samna_salta::localization;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::prelude::*;

/// Initialize structured logging
///
/// Pretty output when LOG_FORMAT=pretty, JSON otherwise. RUST_LOG directives
/// still apply on top of the defaults.
fn init_tracing() -> Result<()> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("samna_salta=info".parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("teloxide=warn".parse()?);

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .init();
    }

    tracing::info!(log_format = %log_format, "Tracing initialized with structured logging");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    init_tracing()?;

    // Load and validate configuration early
    let config = AppConfig::from_env()?;
    config.validate()?;
    info!("{}", config.summary());

    info!("Initializing database connection");

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect(&config.database.url)
        .await?;

    // Initialize database schema and the seed catalog
    db::init_database_schema(&pool).await?;

    // Wrap shared state in Arcs for the handler closures
    let shared_pool = Arc::new(pool);
    let shared_config = Arc::new(config);

    let cache_manager = Arc::new(parking_lot::Mutex::new(CacheManager::with_config(
        Duration::from_secs(shared_config.cache.customer_ttl_secs),
        Duration::from_secs(shared_config.cache.product_ttl_secs),
    )));
    info!("Cache manager initialized");

    // Initialize localization manager
    let localization_manager = localization::create_localization_manager()?;

    // Initialize the bot with custom client configuration for better reliability
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(shared_config.bot.http_timeout_secs))
        .build()
        .expect("Failed to create HTTP client");

    let bot = Bot::with_client(shared_config.bot.token.clone(), client);

    info!(
        http_timeout_secs = %shared_config.bot.http_timeout_secs,
        "Bot initialized, starting dispatcher"
    );

    // Create shared dialogue storage
    let dialogue_storage = InMemStorage::<OrderDialogueState>::new();

    // Set up the dispatcher with shared connection and dialogue support
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let pool = Arc::clone(&shared_pool);
            let storage = dialogue_storage.clone();
            let localization = Arc::clone(&localization_manager);
            let cache = Arc::clone(&cache_manager);
            let config = Arc::clone(&shared_config);
            move |bot: Bot, msg: Message| {
                let pool = Arc::clone(&pool);
                let storage = storage.clone();
                let localization = Arc::clone(&localization);
                let cache = Arc::clone(&cache);
                let config = Arc::clone(&config);
                let dialogue = OrderDialogue::new(storage, msg.chat.id);
                async move {
                    bot::message_handler(bot, msg, pool, dialogue, localization, cache, config)
                        .await
                }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let pool = Arc::clone(&shared_pool);
            let storage = dialogue_storage.clone();
            let localization = Arc::clone(&localization_manager);
            let cache = Arc::clone(&cache_manager);
            let config = Arc::clone(&shared_config);
            move |bot: Bot, q: CallbackQuery| {
                let pool = Arc::clone(&pool);
                let storage = storage.clone();
                let localization = Arc::clone(&localization);
                let cache = Arc::clone(&cache);
                let config = Arc::clone(&config);
                // Use the chat ID from the original message that contained the inline keyboard
                let chat_id = match &q.message {
                    Some(msg) => match msg {
                        teloxide::types::MaybeInaccessibleMessage::Regular(msg) => msg.chat.id,
                        teloxide::types::MaybeInaccessibleMessage::Inaccessible(_) => {
                            ChatId::from(q.from.id)
                        }
                    },
                    None => ChatId::from(q.from.id),
                };
                let dialogue = OrderDialogue::new(storage, chat_id);
                async move {
                    bot::callback_handler(bot, q, pool, dialogue, localization, cache, config).await
                }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
