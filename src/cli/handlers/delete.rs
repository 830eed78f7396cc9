use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};

use super::CommandContext;

pub fn handle_delete(ctx: &CommandContext, path: String, force: bool) -> Result<()> {
    let page = ctx.pages.get_or_fail(&path)?;

    if !force {
        print!(
            "Delete {} ({}) permanently? [y/N] ",
            path.cyan(),
            page.location().display()
        );
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    ctx.pages.delete(&path)?;
    println!("{} {}", "Deleted".red(), path.cyan());
    Ok(())
}
