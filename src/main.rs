//! `mediakit`: dump SD cards and mirror directories, driven by `mediakit.toml`.
//!
//! # Usage
//!
//! ```text
//! mediakit init                                    # scaffold mediakit.toml
//! mediakit --print-config                          # show the merged config
//! mediakit dump --volume EOS_DIGITAL --collection ~/Pictures/2024
//! mediakit dump --volume /media/card --collection . --date yesterday --dry-run
//! mediakit backup --source ~/Pictures --target /mnt/backup/photos --prompt
//! ```

use anyhow::Result;
use clap::Parser;
use mediakit::{
    cli::{Cli, Subcommand},
    commands, config, logging,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    // ── mediakit init ─────────────────────────────────────────────────────────
    if let Some(Subcommand::Init) = cli.command {
        return commands::init::run(&cli.config);
    }

    let global_path = dirs_next::config_dir().map(|d| d.join("mediakit").join("config.toml"));
    let cfg = config::load_merged(global_path.as_deref(), &cli.config)?;

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&cfg)?);
        return Ok(());
    }

    match &cli.command {
        // ── mediakit dump ─────────────────────────────────────────────────────
        Some(Subcommand::Dump(args)) => commands::dump::run(args, &cfg.dump),

        // ── mediakit backup ───────────────────────────────────────────────────
        Some(Subcommand::Backup(args)) => commands::backup::run(args, &cfg.backup),

        Some(Subcommand::Init) | None => {
            anyhow::bail!("no command given; run `mediakit --help`")
        },
    }
}
