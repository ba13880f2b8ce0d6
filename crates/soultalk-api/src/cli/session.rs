//! Session management CLI commands: new, list, messages, rename, delete.
//!
//! Provides session browsing with rich tables and deletion with a
//! confirmation prompt.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use soultalk_types::chat::UNCLEAR_EMOTION;

use crate::state::ConcreteChatService;

/// Create an empty session and print its ID.
pub async fn new_session(service: &ConcreteChatService, email: &str, json: bool) -> Result<()> {
    let session = service.create_session(email).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!();
        println!(
            "  {} Session created: {}",
            style("+").green().bold(),
            style(session.id).cyan()
        );
        println!();
    }

    Ok(())
}

/// List an owner's sessions with title, baseline emotion, and start time.
///
/// # Examples
///
/// ```bash
/// soultalk session list --email alice@example.com
/// soultalk session list --email alice@example.com --json
/// ```
pub async fn list_sessions(service: &ConcreteChatService, email: &str, json: bool) -> Result<()> {
    let sessions = service.list_sessions(email).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions found for '{}'. Start one with: {}",
            style("i").blue().bold(),
            style(email).cyan(),
            style(format!("soultalk session new --email {email}")).yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Emotion").fg(Color::White),
        Cell::new("Started").fg(Color::White),
    ]);

    for session in &sessions {
        let title = truncate(session.title.as_deref().unwrap_or("(untitled)"), 40);
        let emotion = session.emotion.as_deref().unwrap_or("-");
        let started = session.created_at.format("%Y-%m-%d %H:%M").to_string();

        table.add_row(vec![
            Cell::new(session.id).fg(Color::DarkGrey),
            Cell::new(title).fg(Color::Cyan),
            Cell::new(emotion).fg(Color::Yellow),
            Cell::new(started).fg(Color::White),
        ]);
    }

    println!();
    println!("  Sessions for '{}'", style(email).cyan().bold());
    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Print the message history of a session, oldest first.
pub async fn show_messages(service: &ConcreteChatService, session_id: &str, json: bool) -> Result<()> {
    let messages = service.session_messages(session_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!("  {} No messages in this session.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    println!();
    for message in &messages {
        let time = message.created_at.format("%H:%M").to_string();
        let emotion = message.emotion.as_deref().unwrap_or("-");
        let emotion = if emotion == UNCLEAR_EMOTION {
            style(emotion).red()
        } else {
            style(emotion).yellow()
        };
        let voice = if message.audio_ref.is_some() { " (voice)" } else { "" };

        println!(
            "  {} {}{} [{}]",
            style(time).dim(),
            style("You").bold(),
            style(voice).dim(),
            emotion
        );
        println!("    {}", message.user_message);
        println!("  {}", style("SoulTalk").cyan().bold());
        println!("    {}", message.bot_reply);
        println!();
    }

    Ok(())
}

/// Rename a session owned by `email`.
pub async fn rename_session(
    service: &ConcreteChatService,
    session_id: &str,
    email: &str,
    title: &str,
    json: bool,
) -> Result<()> {
    service.rename_session(email, session_id, title).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"renamed": true, "session_id": session_id, "title": title.trim()})
        );
    } else {
        println!(
            "  {} Session renamed to '{}'.",
            style("~").green().bold(),
            style(title.trim()).cyan()
        );
    }

    Ok(())
}

/// Delete a session owned by `email`, asking first unless `force` is set.
pub async fn delete_session(
    service: &ConcreteChatService,
    session_id: &str,
    email: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete session '{}' and all its messages?",
                style(session_id).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    service.delete_session(email, session_id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "session_id": session_id})
        );
    } else {
        println!(
            "  {} Session '{}' deleted.",
            style("x").red().bold(),
            session_id
        );
    }

    Ok(())
}

// --- Formatting helpers ---

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars - 3).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
