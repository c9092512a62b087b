use {
    futures::future::join_all,
    gembot_channels::{ChannelAttachment, ChannelReplyTarget, IncomingMessage},
    gembot_relay::{Command, IgnoreReason, RelayOutcome},
    teloxide::{
        prelude::*,
        types::{MediaKind, MessageKind},
    },
    tracing::{debug, info, warn},
};

use crate::{media_group::media_group_id, state::BotContext};

const OCTET_STREAM: &str = "application/octet-stream";

/// What happened to one inbound Telegram message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Command(Command),
    Relayed(RelayOutcome),
    /// Album item collected into the turn of the item that opened the album.
    Grouped,
}

/// Handle a single inbound Telegram message.
///
/// `/clear` (optionally addressed as `/clear@<this bot>`) resets the
/// conversation; everything else goes through the relay. Album items are
/// buffered for [`crate::MediaGroups::window`] and relayed as one turn.
pub async fn handle_message(ctx: &BotContext, msg: Message) -> Handled {
    let chat_id = msg.chat.id.0.to_string();
    let text = extract_text(&msg).unwrap_or_default();

    if let Some(command) = parse_command(&text, ctx.identity.username.as_deref()) {
        info!(chat_id, command = command.name(), "received command");
        let target = ChannelReplyTarget {
            chat_id,
            message_id: Some(msg.id.0.to_string()),
        };
        ctx.commands.dispatch(command, &target).await;
        return Handled::Command(command);
    }

    let messages = match media_group_id(&msg) {
        Some(group_id) => {
            if !ctx.media_groups.push(&group_id, msg) {
                debug!(chat_id, group_id, "album item buffered");
                return Handled::Grouped;
            }
            tokio::time::sleep(ctx.media_groups.window()).await;
            ctx.media_groups.take(&group_id)
        },
        None => vec![msg],
    };

    relay_messages(ctx, &messages).await
}

/// Relay one message, or a whole album, as a single turn. The album's first
/// non-empty caption is the text; its sender and id identify the turn.
async fn relay_messages(ctx: &BotContext, messages: &[Message]) -> Handled {
    let Some(first) = messages.first() else {
        return Handled::Relayed(RelayOutcome::Ignored(IgnoreReason::NoContent));
    };
    let chat_id = first.chat.id.0.to_string();

    let text = messages
        .iter()
        .filter_map(extract_text)
        .find(|t| !t.is_empty())
        .unwrap_or_default();
    let files: Vec<TelegramFile> = messages.iter().flat_map(extract_files).collect();
    let attachments = resolve_attachments(&ctx.bot, &files).await;

    let incoming = IncomingMessage {
        sender_id: first
            .from
            .as_ref()
            .map(|u| u.id.0.to_string())
            .unwrap_or_default(),
        chat_id: chat_id.clone(),
        message_id: Some(first.id.0.to_string()),
        text,
        attachments,
    };

    let outcome = ctx.relay.handle(incoming).await;
    debug!(chat_id, ?outcome, "telegram message handled");
    Handled::Relayed(outcome)
}

/// Recognize a slash command at the start of `text`.
///
/// Commands addressed to another bot (`/clear@otherbot`) and unknown commands
/// yield `None` so the text is treated as an ordinary message.
pub(crate) fn parse_command(text: &str, bot_username: Option<&str>) -> Option<Command> {
    if !text.starts_with('/') {
        return None;
    }
    let invocation = text.split_whitespace().next()?.strip_prefix('/')?;

    let name = match invocation.split_once('@') {
        Some((name, mention)) => {
            if !bot_username.is_some_and(|u| u.eq_ignore_ascii_case(mention)) {
                return None;
            }
            name
        },
        None => invocation,
    };
    Command::from_name(name)
}

/// Extract text content from a message.
fn extract_text(msg: &Message) -> Option<String> {
    match &msg.kind {
        MessageKind::Common(common) => match &common.media_kind {
            MediaKind::Text(t) => Some(t.text.clone()),
            MediaKind::Photo(p) => p.caption.clone(),
            MediaKind::Document(d) => d.caption.clone(),
            MediaKind::Audio(a) => a.caption.clone(),
            MediaKind::Voice(v) => v.caption.clone(),
            MediaKind::Video(vid) => vid.caption.clone(),
            MediaKind::Animation(a) => a.caption.clone(),
            _ => None,
        },
        _ => None,
    }
}

/// A file referenced by a message, before its download URL is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TelegramFile {
    file_id: String,
    media_type: String,
    file_name: String,
}

impl TelegramFile {
    fn new(file_id: &str, media_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            file_id: file_id.to_string(),
            media_type: media_type.into(),
            file_name: file_name.into(),
        }
    }
}

fn mime_or_default<M: ToString>(mime: Option<&M>) -> String {
    mime.map_or_else(|| OCTET_STREAM.to_string(), ToString::to_string)
}

/// Files attached to a message. Telegram carries at most one media item per
/// message; for photos the largest size is used.
pub(crate) fn extract_files(msg: &Message) -> Vec<TelegramFile> {
    let MessageKind::Common(common) = &msg.kind else {
        return Vec::new();
    };
    let id = msg.id.0;

    let file = match &common.media_kind {
        MediaKind::Photo(p) => p
            .photo
            .last()
            .map(|ps| TelegramFile::new(&ps.file.id, "image/jpeg", format!("photo_{id}.jpg"))),
        MediaKind::Document(d) => Some(TelegramFile::new(
            &d.document.file.id,
            mime_or_default(d.document.mime_type.as_ref()),
            d.document
                .file_name
                .clone()
                .unwrap_or_else(|| format!("document_{id}")),
        )),
        MediaKind::Audio(a) => Some(TelegramFile::new(
            &a.audio.file.id,
            mime_or_default(a.audio.mime_type.as_ref()),
            a.audio
                .file_name
                .clone()
                .unwrap_or_else(|| format!("audio_{id}")),
        )),
        MediaKind::Voice(v) => Some(TelegramFile::new(
            &v.voice.file.id,
            mime_or_default(v.voice.mime_type.as_ref()),
            format!("voice_{id}.ogg"),
        )),
        MediaKind::Video(vid) => Some(TelegramFile::new(
            &vid.video.file.id,
            mime_or_default(vid.video.mime_type.as_ref()),
            vid.video
                .file_name
                .clone()
                .unwrap_or_else(|| format!("video_{id}.mp4")),
        )),
        MediaKind::VideoNote(vn) => Some(TelegramFile::new(
            &vn.video_note.file.id,
            "video/mp4",
            format!("video_note_{id}.mp4"),
        )),
        MediaKind::Animation(a) => Some(TelegramFile::new(
            &a.animation.file.id,
            mime_or_default(a.animation.mime_type.as_ref()),
            a.animation
                .file_name
                .clone()
                .unwrap_or_else(|| format!("animation_{id}.mp4")),
        )),
        _ => None,
    };

    file.into_iter().collect()
}

/// Resolve download URLs through `getFile`. A file that cannot be resolved is
/// logged and left out.
async fn resolve_attachments(bot: &Bot, files: &[TelegramFile]) -> Vec<ChannelAttachment> {
    let resolved = join_all(files.iter().map(|f| async move {
        match bot.get_file(f.file_id.as_str()).await {
            Ok(file) => Some(ChannelAttachment::new(
                file_download_url(bot, &file.path),
                f.media_type.as_str(),
                f.file_name.as_str(),
            )),
            Err(e) => {
                warn!(file_name = %f.file_name, error = %e, "could not resolve telegram file");
                None
            },
        }
    }))
    .await;

    resolved.into_iter().flatten().collect()
}

/// `<api base>/file/bot<token>/<file_path>`. Contains the token: never log it.
fn file_download_url(bot: &Bot, file_path: &str) -> String {
    format!(
        "{}/file/bot{}/{}",
        bot.api_url().as_str().trim_end_matches('/'),
        bot.token(),
        file_path
    )
}
