//! Notification preference commands.
//!
//! - `tasktrack prefs show` - Print every flag and whether it is in effect
//! - `tasktrack prefs set <name> <on|off>` - Change a flag and re-plan

use anyhow::Result;
use clap::Subcommand;

use crate::config;
use crate::domain::{NotificationPreferences, PreferenceKey};

use super::build_tracker;

/// Preference subcommands
#[derive(Subcommand, Debug)]
pub enum PrefsCommands {
    /// Show notification preferences
    Show,

    /// Set a preference
    Set {
        /// notificationsEnabled, notifyOnDueDate, dailyDigestEnabled, weeklyDigestEnabled
        key: PreferenceKey,

        /// on/off, true/false
        #[arg(value_parser = parse_switch, action = clap::ArgAction::Set)]
        value: bool,
    },
}

/// Execute a preferences command
pub async fn execute(command: PrefsCommands) -> Result<()> {
    match command {
        PrefsCommands::Show => execute_show().await,
        PrefsCommands::Set { key, value } => execute_set(key, value).await,
    }
}

async fn execute_show() -> Result<()> {
    let cfg = config::config()?;
    let tracker = build_tracker(cfg)?;
    let prefs = tracker.preferences().await?;

    println!();
    println!("Notification Preferences");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    print_prefs(&prefs);
    println!();

    if !prefs.notifications_enabled {
        println!("ℹ️  Notifications are off; no reminders will be scheduled");
    }
    Ok(())
}

async fn execute_set(key: PreferenceKey, value: bool) -> Result<()> {
    let cfg = config::config()?;
    let tracker = build_tracker(cfg)?;
    let report = tracker.set_preference(key, value).await?;

    println!("✓ {} = {}", key, on_off(value));
    println!(
        "  Cancelled {} identifier(s), created {} notification(s)",
        report.cancelled, report.created
    );
    if report.failed > 0 {
        println!("⚠️  {} notification operation(s) failed", report.failed);
    }
    Ok(())
}

fn print_prefs(prefs: &NotificationPreferences) {
    let effective = [
        prefs.notifications_enabled,
        prefs.effective_due_date(),
        prefs.effective_daily(),
        prefs.effective_weekly(),
    ];
    println!("{:<22} {:<6} {:<10}", "PREFERENCE", "VALUE", "EFFECTIVE");
    println!("{}", "-".repeat(40));
    for (key, effective) in PreferenceKey::ALL.into_iter().zip(effective) {
        println!("{:<22} {:<6} {:<10}", key, on_off(prefs.get(key)), on_off(effective));
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on or off, got '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_switch() {
        assert_eq!(parse_switch("on"), Ok(true));
        assert_eq!(parse_switch("OFF"), Ok(false));
        assert!(parse_switch("maybe").is_err());
    }

    #[test]
    fn test_set_parses_key_names() {
        use clap::Parser;
        let cli = crate::cli::Cli::try_parse_from(["tasktrack", "prefs", "set", "dailyDigestEnabled", "on"]).unwrap();
        match cli.command {
            crate::cli::Commands::Prefs {
                command: PrefsCommands::Set { key, value },
            } => {
                assert_eq!(key, PreferenceKey::DailyDigestEnabled);
                assert!(value);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_set_accepts_off_and_requires_value() {
        use clap::{CommandFactory, Parser};
        crate::cli::Cli::command().debug_assert();

        let cli = crate::cli::Cli::try_parse_from(["tasktrack", "prefs", "set", "notificationsEnabled", "off"]).unwrap();
        assert!(matches!(
            cli.command,
            crate::cli::Commands::Prefs {
                command: PrefsCommands::Set {
                    key: PreferenceKey::NotificationsEnabled,
                    value: false,
                },
            }
        ));

        assert!(crate::cli::Cli::try_parse_from(["tasktrack", "prefs", "set", "notificationsEnabled"]).is_err());
    }
}
