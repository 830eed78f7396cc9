use anyhow::{Context, Result};
use colored::Colorize;

use super::CommandContext;

/// Build the page table, then decode and render every page once.
pub fn handle_check(ctx: &CommandContext) -> Result<()> {
    let pages = ctx
        .pages
        .pages()
        .with_context(|| format!("Failed to load pages from {}", ctx.pages.root().display()))?;

    for page in &pages {
        page.meta()
            .with_context(|| format!("Failed to read metadata of {}", page.path()))?;
        page.html(&ctx.pages)
            .with_context(|| format!("Failed to render {}", page.path()))?;
    }

    println!(
        "{} {} page(s) in {}",
        "OK".green(),
        pages.len(),
        ctx.pages.root().display()
    );
    Ok(())
}
