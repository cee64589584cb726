//! Environment information command

use clap::Args;
use mobsec_core::{Config, Environment};
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// Snapshot file to inspect instead of the local host
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn show<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unavailable".to_string())
}

fn show_list(value: Option<Vec<String>>) -> String {
    match value {
        None => "unavailable".to_string(),
        Some(items) if items.is_empty() => "none".to_string(),
        Some(items) => items.join(", "),
    }
}

pub fn run(args: InfoArgs, config: &Config) -> anyhow::Result<()> {
    let snapshot = args.snapshot.or_else(|| config.environment.snapshot.clone());
    let env = super::load_environment(snapshot.as_deref())?;

    println!("mobsec Environment Information");
    println!("==============================\n");

    println!("Environment: {}", env.name());
    if snapshot.is_none() {
        println!("Host OS: {}", mobsec_platform::os_description());
        println!(
            "Privileges: {}",
            if mobsec_platform::is_elevated() { "Elevated (root)" } else { "Normal user" }
        );
    }

    println!("\nProbes:");
    println!("  - Storage encryption: {}", show(env.storage_encryption()));
    println!("  - Debugger attached: {}", show(env.debugger_attached()));
    println!("  - Root indicators: {}", show_list(env.root_indicators()));
    println!("  - Developer mode: {}", show(env.developer_mode_enabled()));
    println!("  - Emulator indicators: {}", show_list(env.emulator_indicators()));
    println!("  - Screen lock: {}", show(env.device_lock_enabled()));
    println!("  - Backup allowed: {}", show(env.backup_allowed()));

    Ok(())
}
