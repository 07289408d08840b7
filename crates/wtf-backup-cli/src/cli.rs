//! Command line parsing and the backup / restore / config commands
//!
//! Usage:
//!   wtf-backup backup  [-wtf PATH] [-backup PATH] [-progress] [-keep N]
//!   wtf-backup restore [-wtf PATH] [-backup PATH] [-addon NAME] [-progress]
//!   wtf-backup config  [-wtf PATH] [-backup PATH] [-add-addons a,b]
//!                      [-remove-addons a,b] [-show]
//!
//! Flags may be written as `-name value`, `--name value` or `-name=value`.
//! Boolean flags only take a value in the `-name=value` form.

use std::path::Path;

use anyhow::{bail, Context};
use tracing::{error, info, warn};
use wtf_backup_core::{normalize_path, BackupManager, Config};

/// Snapshots kept after a backup unless `-keep` says otherwise
pub const DEFAULT_KEEP: usize = 5;

/// Path overrides shared by every command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathArgs {
    pub wtf: Option<String>,
    pub backup: Option<String>,
}

/// CLI command to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Help,
    Backup {
        paths: PathArgs,
        progress: bool,
        keep: usize,
    },
    Restore {
        paths: PathArgs,
        addon: Option<String>,
        progress: bool,
    },
    Config {
        paths: PathArgs,
        add_addons: Vec<String>,
        remove_addons: Vec<String>,
        show: bool,
    },
}

/// Parse the arguments following the program name
pub fn parse_args(args: &[String]) -> Result<CliCommand, String> {
    let Some(name) = args.first() else {
        return Err("No command specified. Use: backup, restore or config".to_string());
    };

    let mut flags = Flags::new(&args[1..]);
    let mut paths = PathArgs::default();

    match name.as_str() {
        "-h" | "--help" | "help" => Ok(CliCommand::Help),
        "backup" => {
            let mut progress = true;
            let mut keep = DEFAULT_KEEP;

            while let Some((flag, inline)) = flags.next_flag()? {
                match flag {
                    "h" | "help" => return Ok(CliCommand::Help),
                    "wtf" => paths.wtf = Some(flags.value(flag, inline)?),
                    "backup" => paths.backup = Some(flags.value(flag, inline)?),
                    "progress" => progress = parse_bool(flag, inline)?,
                    "keep" => keep = parse_keep(&flags.value(flag, inline)?)?,
                    _ => return Err(format!("Unknown flag for backup: -{}", flag)),
                }
            }

            Ok(CliCommand::Backup {
                paths,
                progress,
                keep,
            })
        }
        "restore" => {
            let mut addon = None;
            let mut progress = true;

            while let Some((flag, inline)) = flags.next_flag()? {
                match flag {
                    "h" | "help" => return Ok(CliCommand::Help),
                    "wtf" => paths.wtf = Some(flags.value(flag, inline)?),
                    "backup" => paths.backup = Some(flags.value(flag, inline)?),
                    "addon" => addon = Some(flags.value(flag, inline)?),
                    "progress" => progress = parse_bool(flag, inline)?,
                    _ => return Err(format!("Unknown flag for restore: -{}", flag)),
                }
            }

            Ok(CliCommand::Restore {
                paths,
                addon: addon.filter(|a| !a.is_empty()),
                progress,
            })
        }
        "config" => {
            let mut add_addons = Vec::new();
            let mut remove_addons = Vec::new();
            let mut show = false;

            while let Some((flag, inline)) = flags.next_flag()? {
                match flag {
                    "h" | "help" => return Ok(CliCommand::Help),
                    "wtf" => paths.wtf = Some(flags.value(flag, inline)?),
                    "backup" => paths.backup = Some(flags.value(flag, inline)?),
                    "add-addons" => add_addons.extend(parse_list(&flags.value(flag, inline)?)),
                    "remove-addons" => {
                        remove_addons.extend(parse_list(&flags.value(flag, inline)?))
                    }
                    "show" => show = parse_bool(flag, inline)?,
                    _ => return Err(format!("Unknown flag for config: -{}", flag)),
                }
            }

            Ok(CliCommand::Config {
                paths,
                add_addons,
                remove_addons,
                show,
            })
        }
        other => Err(format!("Unknown command: {}", other)),
    }
}

/// Cursor over the flags of one subcommand
struct Flags<'a> {
    args: &'a [String],
    pos: usize,
}

impl<'a> Flags<'a> {
    fn new(args: &'a [String]) -> Self {
        Self { args, pos: 0 }
    }

    /// Next flag name plus its `=value` part, if any
    fn next_flag(&mut self) -> Result<Option<(&'a str, Option<&'a str>)>, String> {
        let Some(arg) = self.args.get(self.pos) else {
            return Ok(None);
        };
        self.pos += 1;

        let name = arg
            .strip_prefix("--")
            .or_else(|| arg.strip_prefix('-'))
            .filter(|n| !n.is_empty() && !n.starts_with('-'))
            .ok_or_else(|| format!("Unexpected argument: {}", arg))?;

        Ok(Some(match name.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (name, None),
        }))
    }

    /// Value of a flag: the inline part or the following argument
    fn value(&mut self, flag: &str, inline: Option<&str>) -> Result<String, String> {
        if let Some(value) = inline {
            return Ok(value.to_string());
        }
        let value = self
            .args
            .get(self.pos)
            .ok_or_else(|| format!("-{} requires a value", flag))?;
        self.pos += 1;
        Ok(value.clone())
    }
}

fn parse_bool(flag: &str, inline: Option<&str>) -> Result<bool, String> {
    match inline {
        None => Ok(true),
        Some("1" | "t" | "T" | "true" | "TRUE" | "True") => Ok(true),
        Some("0" | "f" | "F" | "false" | "FALSE" | "False") => Ok(false),
        Some(other) => Err(format!("Invalid value '{}' for -{}", other, flag)),
    }
}

/// Zero or a negative count disables pruning
fn parse_keep(s: &str) -> Result<usize, String> {
    let keep = s
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("Invalid value '{}' for -keep", s))?;
    Ok(usize::try_from(keep).unwrap_or(0))
}

fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run CLI command against `config.yaml` in the working directory
pub fn run(command: CliCommand) -> anyhow::Result<()> {
    run_with_config(command, &Config::default_path())
}

/// Run CLI command against the config file at `config_path`
pub fn run_with_config(command: CliCommand, config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("Failed to load config")?;

    match command {
        CliCommand::Help => {
            print_help();
            Ok(())
        }
        CliCommand::Backup {
            paths,
            progress,
            keep,
        } => run_backup(config_path, config, paths, progress, keep),
        CliCommand::Restore {
            paths,
            addon,
            progress,
        } => run_restore(config_path, config, paths, addon, progress),
        CliCommand::Config {
            paths,
            add_addons,
            remove_addons,
            show,
        } => run_config(config_path, config, paths, add_addons, remove_addons, show),
    }
}

/// Apply path overrides and persist them; a failed save is only logged
fn apply_overrides(config_path: &Path, config: &mut Config, paths: &PathArgs) -> anyhow::Result<()> {
    if let Some(wtf) = paths.wtf.as_deref().filter(|p| !p.is_empty()) {
        config.wtf_path = normalize_path(wtf);
    }
    if let Some(backup) = paths.backup.as_deref().filter(|p| !p.is_empty()) {
        config.backup_dir = normalize_path(backup);
    }

    if let Err(e) = config.save(config_path) {
        error!("Failed to save config: {}", e);
    }

    if !config.is_complete() {
        bail!("Both the WTF folder and the backup folder must be set, via -wtf / -backup or config.yaml");
    }
    Ok(())
}

fn run_backup(
    config_path: &Path,
    mut config: Config,
    paths: PathArgs,
    progress: bool,
    keep: usize,
) -> anyhow::Result<()> {
    apply_overrides(config_path, &mut config, &paths)?;

    info!("Starting backup of {}", config.wtf_path.display());
    let manager = BackupManager::new(&config.backup_dir);
    let backup = manager
        .create_backup(&config.wtf_path, progress)
        .context("Backup failed")?;
    info!("Backup complete: {}", backup.path.display());

    if keep > 0 {
        info!("Pruning old backups, keeping {}", keep);
        match manager.prune(keep) {
            Ok(outcome) if !outcome.failed.is_empty() => {
                warn!("{} old backup(s) could not be removed", outcome.failed.len())
            }
            Ok(_) => {}
            Err(e) => error!("Failed to prune old backups: {}", e),
        }
    }

    Ok(())
}

fn run_restore(
    config_path: &Path,
    mut config: Config,
    paths: PathArgs,
    addon: Option<String>,
    progress: bool,
) -> anyhow::Result<()> {
    apply_overrides(config_path, &mut config, &paths)?;
    let manager = BackupManager::new(&config.backup_dir);

    if let Some(addon) = addon {
        info!("Restoring addon {}", addon);
        manager
            .restore_addon(&config.wtf_path, &addon, progress)
            .with_context(|| format!("Failed to restore {}", addon))?;
        info!("Restored {}", addon);
        return Ok(());
    }

    if config.addons.is_empty() {
        bail!("Name an addon with -addon or add addons to config.yaml with `config -add-addons`");
    }

    info!("Restoring {} configured addon(s)", config.addons.len());
    let mut failed = Vec::new();
    for addon in &config.addons {
        info!("Restoring addon {}", addon);
        match manager.restore_addon(&config.wtf_path, addon, progress) {
            Ok(_) => info!("Restored {}", addon),
            Err(e) => {
                error!("Failed to restore {}: {}", addon, e);
                failed.push(addon.as_str());
            }
        }
    }

    if !failed.is_empty() {
        bail!(
            "{} of {} addon(s) failed to restore: {}",
            failed.len(),
            config.addons.len(),
            failed.join(", ")
        );
    }
    info!("All addons restored");
    Ok(())
}

fn run_config(
    config_path: &Path,
    mut config: Config,
    paths: PathArgs,
    add_addons: Vec<String>,
    remove_addons: Vec<String>,
    show: bool,
) -> anyhow::Result<()> {
    let unchanged = paths == PathArgs::default() && add_addons.is_empty() && remove_addons.is_empty();

    if let Some(wtf) = paths.wtf.as_deref().filter(|p| !p.is_empty()) {
        config.wtf_path = normalize_path(wtf);
        info!("WTF folder set to {}", config.wtf_path.display());
    }
    if let Some(backup) = paths.backup.as_deref().filter(|p| !p.is_empty()) {
        config.backup_dir = normalize_path(backup);
        info!("Backup folder set to {}", config.backup_dir.display());
    }

    if !add_addons.is_empty() {
        let added = config.add_addons(&add_addons);
        for name in &add_addons {
            if added.contains(name) {
                info!("Added addon {}", name);
            } else {
                info!("Addon {} is already listed", name);
            }
        }
    }

    for name in config.remove_addons(&remove_addons) {
        info!("Removed addon {}", name);
    }

    config
        .save(config_path)
        .context("Failed to save config")?;

    if show || unchanged {
        print_config(config_path, &config);
    }
    Ok(())
}

fn print_config(config_path: &Path, config: &Config) {
    info!("Current configuration:");
    info!("  Config file:   {}", config_path.display());
    info!("  WTF folder:    {}", config.wtf_path.display());
    info!("  Backup folder: {}", config.backup_dir.display());
    info!("  Addons:");
    if config.addons.is_empty() {
        info!("    (none)");
    }
    for addon in &config.addons {
        info!("    - {}", addon);
    }
}

/// Print CLI help
pub fn print_help() {
    println!("wtf-backup v{}", env!("CARGO_PKG_VERSION"));
    println!("Back up the World of Warcraft WTF folder and restore addon settings");
    println!();
    println!("USAGE:");
    println!("    wtf-backup <command> [options]");
    println!();
    println!("COMMANDS:");
    println!("    backup      Copy the WTF folder into a new timestamped backup");
    println!("    restore     Restore addon settings from the latest backup");
    println!("    config      Show or change config.yaml");
    println!();
    println!("BACKUP OPTIONS:");
    println!("    -wtf <path>               WTF folder (default: from config)");
    println!("    -backup <path>            Backup folder (default: from config)");
    println!("    -progress[=false]         Show per-file progress (default: true)");
    println!("    -keep <n>                 Backups to keep, 0 keeps all (default: {})", DEFAULT_KEEP);
    println!();
    println!("RESTORE OPTIONS:");
    println!("    -wtf <path>               WTF folder to restore into");
    println!("    -backup <path>            Backup folder");
    println!("    -addon <name>             Addon to restore (default: every configured addon)");
    println!("    -progress[=false]         Show per-file progress (default: true)");
    println!();
    println!("CONFIG OPTIONS:");
    println!("    -wtf <path>               Set the WTF folder");
    println!("    -backup <path>            Set the backup folder");
    println!("    -add-addons <a,b,...>     Add addons to the restore list");
    println!("    -remove-addons <a,b,...>  Remove addons from the restore list");
    println!("    -show                     Show the current config");
    println!();
    println!("EXAMPLES:");
    println!("    wtf-backup config -wtf \"C:/Games/World of Warcraft/_retail_/WTF\" -backup D:/WTF-Backups");
    println!("    wtf-backup config -add-addons Details,WeakAuras");
    println!("    wtf-backup backup -keep 10");
    println!("    wtf-backup restore -addon Details");
}
