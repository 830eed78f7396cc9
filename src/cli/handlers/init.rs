use crate::config::{CONFIG_FILE, ExtensionSetting, FlatPagesConfig};
use crate::error::FlatPagesError;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn handle_init(pages_dir: String, extension: String) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config_path = cwd.join(CONFIG_FILE);

    if config_path.exists() {
        return Err(FlatPagesError::AlreadyInitialized(config_path.display().to_string()).into());
    }

    let config = FlatPagesConfig {
        root: PathBuf::from(&pages_dir),
        extension: ExtensionSetting::One(extension),
        ..FlatPagesConfig::default()
    };
    // Reject a bad extension before anything is written.
    config.extensions()?;

    let pages_path = config.root_path(&cwd);
    std::fs::create_dir_all(&pages_path)?;
    config.save(&config_path)?;

    println!(
        "{} flatpages project in {}",
        "Initialized".green(),
        cwd.display()
    );
    println!("  Config: {}", config_path.display());
    println!("  Pages:  {}", pages_path.display());

    Ok(())
}
