use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use flatpages::cli::handlers::{self, CommandContext};
use flatpages::cli::{Cli, Commands};
use flatpages::config::FlatPagesConfig;
use flatpages::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.clone());

    match cli.command {
        Commands::Init {
            pages_dir,
            extension,
        } => handlers::handle_init(pages_dir, extension),
        Commands::List { json } => {
            let ctx = load_context(cli.config.as_deref(), cli.root)?;
            handlers::handle_list(&ctx, json)
        }
        Commands::Show { path, json } => {
            let ctx = load_context(cli.config.as_deref(), cli.root)?;
            handlers::handle_show(&ctx, path, json)
        }
        Commands::Render { path } => {
            let ctx = load_context(cli.config.as_deref(), cli.root)?;
            handlers::handle_render(&ctx, path)
        }
        Commands::Check => {
            let ctx = load_context(cli.config.as_deref(), cli.root)?;
            handlers::handle_check(&ctx)
        }
        Commands::New { path, meta, body } => {
            let ctx = load_context(cli.config.as_deref(), cli.root)?;
            handlers::handle_create(&ctx, path, meta, body)
        }
        Commands::Delete { path, force } => {
            let ctx = load_context(cli.config.as_deref(), cli.root)?;
            handlers::handle_delete(&ctx, path, force)
        }
    }
}

/// Load the config named by `--config`, or search upward from the current
/// directory. `--root` overrides the configured page root; with `--root`
/// and no config file anywhere, defaults are used.
fn load_context(config: Option<&Path>, root: Option<PathBuf>) -> Result<CommandContext> {
    let cwd = std::env::current_dir()?;

    let (mut config, project_root) = match (config, &root) {
        (Some(path), _) => FlatPagesConfig::load_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        (None, Some(_)) => match FlatPagesConfig::load(&cwd) {
            Ok(loaded) => loaded,
            Err(flatpages::error::FlatPagesError::NotInitialized) => {
                (FlatPagesConfig::default(), cwd.clone())
            }
            Err(e) => return Err(e).context("Failed to load flatpages configuration"),
        },
        (None, None) => {
            FlatPagesConfig::load(&cwd).context("Failed to load flatpages configuration")?
        }
    };

    // A --root given on the command line is relative to where we run.
    if let Some(root) = root {
        config.root = cwd.join(root);
    }

    Ok(CommandContext::new(config, project_root))
}
