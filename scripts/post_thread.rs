//! Twitter Thread Posting Script
//!
//! This script posts a single thread to Twitter/X from a text file, one
//! message per non-empty line, using the same configuration as the bot
//! (`CONSUMER_KEY`, `CONSUMER_SECRET`, `ACCESS_TOKEN_KEY`,
//! `ACCESS_TOKEN_SECRET`, plus the optional formatting variables).
//!
//! ```bash
//! cargo run --bin post_thread -- thread.txt
//! ```

use std::io::{self, Write};

use threadcast::{AttachmentResolver, BotConfig, ThreadSession, TwitterClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    println!("🧵 Twitter Thread Posting Tool");
    println!("==============================");

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            println!("❌ Usage: post_thread <file>");
            return Err("A thread file is required".into());
        }
    };

    let contents = std::fs::read_to_string(&path)?;
    let messages: Vec<String> = contents
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();
    println!("📄 Read {} messages from {}", messages.len(), path);

    let config = BotConfig::from_env()?;
    let mut session = match ThreadSession::new(messages, &config.compose_options()) {
        Ok(session) => session,
        Err(e) => {
            println!("❌ {}", e);
            return Err(e.into());
        }
    };

    println!("\n{}\n", session);
    print!("🚀 Post this thread? [y/N]: ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
        println!("👋 Nothing posted.");
        return Ok(());
    }

    let client = TwitterClient::new(&config)?;
    let resolver = AttachmentResolver::new(config.http_timeout)?;

    let outcome = session
        .publish(&client, &resolver, config.post_delay)
        .await
        .map(|published| published.iter().map(|post| post.id.clone()).collect::<Vec<_>>());

    match outcome {
        Ok(ids) => {
            println!("\n🎉 Success! Your thread has been posted.");
            for (i, id) in ids.iter().enumerate() {
                println!("  {}. https://twitter.com/i/status/{}", i + 1, id);
            }
        }
        Err(e) => {
            println!("\n💥 Failed to post thread: {}", e);
            for post in session.published() {
                println!("  ⚠️ already posted: {}", post.id);
            }
            return Err(e.into());
        }
    }

    Ok(())
}
