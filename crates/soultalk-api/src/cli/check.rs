//! `soultalk check`: verify the database and the LLM provider are reachable.

use anyhow::Result;
use console::style;

use soultalk_infra::config::{load_global_config, resolve_data_dir};
use soultalk_infra::llm::openai_compat::config::api_key_from_env;
use soultalk_infra::llm::{create_provider, test_provider_connection};
use soultalk_infra::sqlite::pool::{DatabasePool, database_url_in};

/// Run the health checks and report each one.
///
/// Returns an error when any check fails, so the exit status is usable in
/// scripts.
pub async fn check(json: bool) -> Result<()> {
    let data_dir = resolve_data_dir();
    tokio::fs::create_dir_all(&data_dir).await?;
    let config = load_global_config(&data_dir).await;

    let database = DatabasePool::new(&database_url_in(&data_dir))
        .await
        .map(|_| ())
        .map_err(|e| e.to_string());

    let llm = match create_provider(&config.llm, api_key_from_env()) {
        Ok(provider) => test_provider_connection(&provider)
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    let healthy = database.is_ok() && llm.is_ok();

    if json {
        let check = serde_json::json!({
            "data_dir": data_dir.display().to_string(),
            "database": database.as_ref().err(),
            "llm_provider": config.llm.provider_name,
            "llm": llm.as_ref().err(),
            "healthy": healthy,
        });
        println!("{}", serde_json::to_string_pretty(&check)?);
    } else {
        let check_mark = |ok: bool| {
            if ok {
                format!("{}", style("✓").green())
            } else {
                format!("{}", style("✗").red())
            }
        };

        println!();
        println!(
            "  {} Data directory: {}",
            style("i").blue().bold(),
            style(data_dir.display()).cyan()
        );
        println!("  {} Database opens", check_mark(database.is_ok()));
        if let Err(e) = &database {
            println!("      {}", style(e).dim());
        }
        println!(
            "  {} LLM provider '{}' answers",
            check_mark(llm.is_ok()),
            config.llm.provider_name
        );
        if let Err(e) = &llm {
            println!("      {}", style(e).dim());
        }
        println!();
    }

    if healthy {
        Ok(())
    } else {
        anyhow::bail!("health check failed")
    }
}
