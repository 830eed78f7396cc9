use anyhow::Result;
use colored::Colorize;

use super::CommandContext;
use crate::page::Page;

pub fn handle_show(ctx: &CommandContext, path: String, json: bool) -> Result<()> {
    let page = ctx.pages.get_or_fail(&path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page.summary()?)?);
    } else {
        print_page(&page)?;
    }
    Ok(())
}

fn print_page(page: &Page) -> Result<()> {
    println!("{}", page.path().cyan().bold());
    println!("File:     {}", page.location().display().to_string().dimmed());
    println!("Format:   {}", page.format().to_string().blue());
    println!("Renderer: {}", page.renderer_name().blue());

    let meta = page.meta()?;
    if !meta.is_empty() {
        println!();
        let width = meta.keys().map(|k| k.len()).max().unwrap_or(0);
        for (key, value) in meta {
            let key = format!("{:width$}", key, width = width);
            println!("{}  {}", key.magenta(), value);
        }
    }

    if !page.body().is_empty() {
        println!("\n{}", page.body());
    }
    Ok(())
}
