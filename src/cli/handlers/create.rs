use anyhow::{Context, Result};
use colored::Colorize;

use super::CommandContext;
use super::utils::resolve_body;
use crate::config::MetaFormat;
use crate::metadata::{Metadata, decode_toml, decode_yaml};

pub fn handle_create(
    ctx: &CommandContext,
    path: String,
    meta: Option<String>,
    body: Option<String>,
) -> Result<()> {
    let extensions = ctx.pages.config().extensions()?;
    let format = extensions
        .first()
        .map(|ext| ctx.pages.config().meta_format_for(ext))
        .unwrap_or_default();

    let meta = match meta {
        Some(text) => {
            let decoded = match format {
                MetaFormat::Yaml => decode_yaml(&text, &path),
                MetaFormat::Toml => decode_toml(&text, &path),
            };
            decoded.with_context(|| format!("Invalid --meta for {}", path))?
        }
        None => Metadata::new(),
    };
    let body = resolve_body(body)?.unwrap_or_default();

    let file = ctx.pages.store(&path, &meta, &body)?;
    let shown = file.strip_prefix(&ctx.project_root).unwrap_or(&file);
    println!("{} {} {}", "Created".green(), path.cyan(), shown.display());
    Ok(())
}
