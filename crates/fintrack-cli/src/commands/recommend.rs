//! Recommendation webhook command

use anyhow::{Context, Result};
use fintrack_core::{webhook::WEBHOOK_HINT, Config, RecommendationClient, RecommendationSource};

pub async fn cmd_recommend(config: &Config, user: &str) -> Result<()> {
    let Some(client) = RecommendationClient::from_config(&config.webhook)? else {
        anyhow::bail!("No recommendation webhook configured. {}", WEBHOOK_HINT);
    };

    println!("🤖 Requesting recommendations from {}...", client.endpoint());
    fetch_and_print(&client, user).await
}

/// Print whatever a recommendation source returns for `user`
pub async fn fetch_and_print(source: &dyn RecommendationSource, user: &str) -> Result<()> {
    let recs = source
        .recommendations(user)
        .await
        .context("Recommendation request failed")?;

    if recs.is_empty() {
        println!("   No recommendations returned.");
        return Ok(());
    }

    if let Some(text) = &recs.recommendations {
        println!();
        println!("💡 Recommendations");
        println!("   ─────────────────────────────────────────────────────────────");
        for line in text.lines() {
            println!("   {}", line);
        }
    }

    if let Some(text) = &recs.alert_recommendations {
        println!();
        println!("🔔 Alert Recommendations");
        println!("   ─────────────────────────────────────────────────────────────");
        for line in text.lines() {
            println!("   {}", line);
        }
    }

    Ok(())
}
