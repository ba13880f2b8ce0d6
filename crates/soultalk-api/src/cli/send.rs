//! `soultalk send`: run one text turn from the terminal.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Send `text` to a session and print the reply.
pub async fn send_message(
    state: &AppState,
    session_id: &str,
    email: &str,
    text: &str,
    json: bool,
) -> Result<()> {
    let outcome = state.turns.text_turn(email, session_id, text).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} [{}]",
        style("SoulTalk").cyan().bold(),
        style(&outcome.emotion).yellow()
    );
    println!("    {}", outcome.reply);
    if outcome.title_changed {
        println!();
        println!("  {}", style("Session title set from this message.").dim());
    }
    println!();

    Ok(())
}
