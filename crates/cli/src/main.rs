mod signal;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::Parser,
    gembot_channels::ChannelOutbound,
    gembot_gemini::{GeminiClient, GenerativeApi},
    gembot_relay::{CommandDispatcher, MediaUploader, Relay, SessionManager},
    gembot_telegram::{BotContext, MediaGroups, TelegramConfig, TelegramOutbound},
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Debug, Parser)]
#[command(name = "gembot", about = "Gembot: Telegram relay for Google Gemini", version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Environment file to load. Defaults to `.env` in the working directory,
    /// if one exists.
    #[arg(long, env = "GEMBOT_ENV_FILE")]
    env_file: Option<PathBuf>,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load before telemetry so RUST_LOG from the file applies; a load error
    // is reported once logging is up.
    let env_file = gembot_config::load_dotenv(cli.env_file.as_deref());
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "gembot starting");
    let result = run(env_file).await;
    if let Err(e) = &result {
        error!(error = ?e, "gembot failed");
    }
    result
}

async fn run(env_file: gembot_config::Result<Option<PathBuf>>) -> anyhow::Result<()> {
    if let Some(path) = env_file.context("failed to load environment file")? {
        info!(path = %path.display(), "loaded environment file");
    }

    let config = gembot_config::from_env().context("invalid configuration")?;

    let gemini: Arc<dyn GenerativeApi> = Arc::new(
        GeminiClient::new(config.gemini_api_key.clone())
            .context("failed to build gemini client")?,
    );

    let telegram = TelegramConfig::new(config.telegram_bot_token.clone());
    let (bot, identity) = gembot_telegram::connect(&telegram)
        .await
        .context("failed to connect to telegram")?;

    let outbound: Arc<dyn ChannelOutbound> = Arc::new(TelegramOutbound::new(bot.clone()));
    let sessions = Arc::new(SessionManager::new(Arc::clone(&gemini)));
    let uploader = MediaUploader::new(gemini).context("failed to build download client")?;
    let relay = Arc::new(Relay::new(
        identity.user_id.clone(),
        Arc::clone(&sessions),
        uploader,
        Arc::clone(&outbound),
    ));
    let commands = Arc::new(CommandDispatcher::new(sessions, outbound));

    let ctx = Arc::new(BotContext {
        bot,
        identity,
        relay,
        commands,
        media_groups: MediaGroups::default(),
    });
    let cancel = gembot_telegram::start_polling(ctx, telegram.poll_timeout_secs);

    info!("gembot is running, press Ctrl-C to exit");

    tokio::select! {
        () = signal::shutdown_signal() => {},
        () = cancel.cancelled() => warn!("telegram polling ended"),
    }
    cancel.cancel();

    info!("gembot stopped");
    Ok(())
}
