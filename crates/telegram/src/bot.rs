use std::{sync::Arc, time::Duration};

use {
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, BotCommand, UpdateKind},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use gembot_relay::Command;

use crate::{Error, Result, config::TelegramConfig, handlers, state::BotContext};

/// Longer than the long-polling timeout so the HTTP client doesn't abort
/// `getUpdates` before Telegram responds.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(45);

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Who the bot is, as reported by `getMe`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub user_id: String,
    pub username: Option<String>,
}

/// Verify the token, switch the bot to long polling and register commands.
///
/// Any failure here is fatal to startup, including command registration.
pub async fn connect(config: &TelegramConfig) -> Result<(Bot, BotIdentity)> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(CLIENT_TIMEOUT)
        .build()
        .map_err(|e| Error::message(format!("failed to build telegram client: {e}")))?;
    let mut bot = Bot::with_client(config.token.expose_secret(), client);
    if let Some(api_url) = &config.api_url {
        let url = reqwest::Url::parse(api_url)
            .map_err(|e| Error::message(format!("invalid telegram api url {api_url:?}: {e}")))?;
        bot = bot.set_api_url(url);
    }

    let me = bot.get_me().await?;
    let identity = BotIdentity {
        user_id: me.id.0.to_string(),
        username: me.username.clone(),
    };

    // Delete any existing webhook so long polling works.
    bot.delete_webhook().send().await?;

    let commands: Vec<BotCommand> = Command::ALL
        .iter()
        .map(|c| BotCommand::new(c.name(), c.description()))
        .collect();
    bot.set_my_commands(commands).await?;

    info!(
        user_id = %identity.user_id,
        username = ?identity.username,
        "telegram bot connected (webhook cleared, commands registered)"
    );
    Ok((bot, identity))
}

/// Start the long-polling loop in the background.
///
/// Each message is handled in its own task. The loop runs until the returned
/// token is cancelled or another instance takes over the token.
pub fn start_polling(ctx: Arc<BotContext>, poll_timeout_secs: u32) -> CancellationToken {
    let cancel = CancellationToken::new();
    tokio::spawn(poll_updates(ctx, poll_timeout_secs, cancel.clone()));
    cancel
}

async fn poll_updates(ctx: Arc<BotContext>, poll_timeout_secs: u32, cancel: CancellationToken) {
    info!("starting telegram polling loop");
    let mut offset: i32 = 0;

    loop {
        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = ctx
                .bot
                .get_updates()
                .offset(offset)
                .timeout(poll_timeout_secs)
                .allowed_updates(vec![AllowedUpdate::Message])
                .send() => result,
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "got telegram updates");
                for update in updates {
                    offset = update.id.as_offset();
                    match update.kind {
                        UpdateKind::Message(msg) => {
                            debug!(chat_id = msg.chat.id.0, "received telegram message");
                            let ctx = Arc::clone(&ctx);
                            tokio::spawn(async move {
                                handlers::handle_message(&ctx, msg).await;
                            });
                        },
                        other => {
                            debug!("ignoring non-message update: {other:?}");
                        },
                    }
                }
            },
            Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                warn!("telegram polling stopped: another instance is already running with this token");
                cancel.cancel();
                break;
            },
            Err(e) => {
                warn!(error = %e, "telegram getUpdates failed");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(RETRY_DELAY) => {},
                }
            },
        }
    }

    info!("telegram polling stopped");
}
