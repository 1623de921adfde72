//! Echo Bot Example
//!
//! A small LINE bot showing the Lynx router and message builders.
//!
//! # Handler Chain
//!
//! Handlers run in registration order. A handler returning
//! `Flow::Continue` lets the next one see the event; `Flow::Stop` or an
//! error ends the chain. Messages queued on the context are sent as one
//! reply after the chain finished.
//!
//! # Usage
//!
//! ```bash
//! LYNX_CHANNEL__CHANNEL_SECRET=... \
//! LYNX_CHANNEL__CHANNEL_ACCESS_TOKEN=... \
//! cargo run --package echo-bot -- --port 8080
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use lynx::prelude::*;
use serde_json::json;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(about = "Echo bot for the LINE Messaging API")]
struct Args {
    /// Configuration file; defaults to lynx.toml in the current directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. `production`.
    #[arg(short, long)]
    profile: Option<String>,
}

// ============================================================================
// Handler Functions
// ============================================================================

/// Logs every text message and lets later handlers run.
async fn log_text(ctx: Arc<BotContext>, text: String) -> HandlerResult {
    info!(user = ctx.user_id().unwrap_or("unknown"), "Received: {}", text);
    Ok(Flow::Continue)
}

/// `order <item>` - answers with a confirm dialog.
async fn order(ctx: Arc<BotContext>, _text: String) -> HandlerResult {
    let item = ctx.param("item").unwrap_or_default();
    let confirm = ConfirmBuilder::new(format!("Order {item}?"))
        .postback_action("Yes", format!("order={item}"), "Yes")
        .message_action("No", "No")
        .build("Confirm your order")?;
    ctx.append(confirm)?;
    Ok(Flow::Stop)
}

/// `menu` - answers with a carousel rendered from records.
async fn menu(ctx: Arc<BotContext>, _text: String) -> HandlerResult {
    let items = [
        json!({"id": 1, "name": "Coffee", "price": 300}),
        json!({"id": 2, "name": "Tea", "price": 250}),
        json!({"id": 3, "name": "Cake", "price": 420}),
    ];
    let template = ColumnTemplate::new()
        .title("{{name}}")
        .text("{{price}} yen")
        .postback_action("Order", "order={{id}}", "");

    let mut carousel = CarouselBuilder::new().with_template(template);
    let failures = carousel.generate_columns(&items)?;
    if !failures.is_empty() {
        error!(count = failures.len(), "Some menu items could not be rendered");
    }
    ctx.append(carousel.build("Menu")?)?;
    Ok(Flow::Stop)
}

/// `help` - answers with a button template.
async fn help(ctx: Arc<BotContext>, _text: String) -> HandlerResult {
    let buttons = ButtonBuilder::new("What can I do for you?")
        .title("Echo Bot")
        .message_action("Menu", "menu")
        .message_action("Who am I", "whoami")
        .uri_action("Docs", "https://developers.line.biz/")
        .build("Help")?;
    ctx.append(buttons)?;
    Ok(Flow::Stop)
}

/// `whoami` - fetches the sender's profile.
async fn whoami(ctx: Arc<BotContext>, _text: String) -> HandlerResult {
    let name = ctx.user().await?.display_name.clone();
    ctx.add_text(format!("You are {name}"))?;
    Ok(Flow::Stop)
}

/// Echoes any other text.
async fn echo(ctx: Arc<BotContext>, text: String) -> HandlerResult {
    ctx.add_text(text)?;
    Ok(Flow::Stop)
}

async fn image(ctx: Arc<BotContext>, content: Vec<u8>) -> HandlerResult {
    ctx.add_text(format!("Got an image of {} bytes", content.len()))?;
    Ok(Flow::Stop)
}

async fn sticker(ctx: Arc<BotContext>, sticker: Sticker) -> HandlerResult {
    ctx.append(Message::sticker(sticker.package_id, sticker.sticker_id))?;
    Ok(Flow::Stop)
}

/// Greets new friends with a tappable image map.
async fn follow(ctx: Arc<BotContext>) -> HandlerResult {
    let welcome = ImagemapBuilder::new("https://example.com/welcome", "Welcome!", 1040, 1040)
        .message_action("help", ImagemapArea::new(0, 0, 520, 1040))
        .uri_action("https://example.com", ImagemapArea::new(520, 0, 520, 1040))
        .build()?;
    ctx.append(welcome)?;
    Ok(Flow::Stop)
}

async fn postback(ctx: Arc<BotContext>, data: String) -> HandlerResult {
    match data.strip_prefix("order=") {
        Some(item) => ctx.add_text(format!("Ordered {item}"))?,
        None => ctx.add_text("Unknown action")?,
    }
    Ok(Flow::Stop)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = LynxRuntime::builder();
    if let Some(config) = &args.config {
        builder = builder.config_file(config);
    }
    if let Some(profile) = args.profile {
        builder = builder.profile(profile);
    }
    let runtime = builder.build()?;

    let order_pattern = TextPattern::new("order {{item}}")?;

    runtime
        .run(|router| {
            router
                .on_text(log_text)
                .on_text_with(order_pattern, order)
                .on_filtered_text(|text| text.trim() == "menu", menu)
                .on_filtered_text(|text| text.trim() == "help", help)
                .on_filtered_text(|text| text.trim() == "whoami", whoami)
                .on_text(echo)
                .on_image(image)
                .on_sticker(sticker)
                .on_follow(follow)
                .on_postback(postback)
                .on_error(|ctx, err| {
                    error!(event = ?ctx.event().kind, error = %err, "Handler failed");
                })
        })
        .await?;

    Ok(())
}
