use anyhow::Result;
use std::path::Path;

use relay::handler::config::RelayConfig;

pub fn run_check(config_path: &Path) -> Result<()> {
    println!("\x1b[36m\x1b[1mChecking Relay configuration...\x1b[0m");

    // 1. Load relay.toml
    let config = match RelayConfig::from_file(config_path) {
        Ok(c) => {
            println!("\x1b[32m\x1b[1m✓\x1b[0m Configuration file is valid TOML.");
            c
        }
        Err(e) => {
            println!("\x1b[31m\x1b[1m✗\x1b[0m Configuration error: {:#}", e);
            return Ok(());
        }
    };

    // 2. Resolve identity (from_file already validated, so this cannot fail;
    // destructure anyway to keep the error path honest)
    match config.partition_identity() {
        Ok(identity) => match identity.routing_key() {
            Some(key) => {
                println!("\x1b[32m\x1b[1m✓\x1b[0m Routing key resolves to '{}'.", key);
                if identity.partition_id().is_none() {
                    println!(
                        "  (no partition_id set — legacy single-identifier routing)"
                    );
                }
            }
            None => {
                println!(
                    "\x1b[33m\x1b[1m! Warning:\x1b[0m No platform_id configured; dispatches will fail with an empty target."
                );
            }
        },
        Err(e) => {
            println!("\x1b[31m\x1b[1m✗\x1b[0m Identity error: {:#}", e);
            return Ok(());
        }
    }

    // 3. Dispatch settings
    match config.dispatch.task_queue.as_deref() {
        Some(queue) => {
            println!("\x1b[32m\x1b[1m✓\x1b[0m Task queue selector: '{}'.", queue);
        }
        None => {
            println!("  No task queue selector configured (transport default).");
        }
    }
    println!(
        "\x1b[32m\x1b[1m✓\x1b[0m Stream operation: '{}'.",
        config.dispatch.stream_operation
    );

    Ok(())
}
