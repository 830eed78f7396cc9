use anyhow::Result;

use super::CommandContext;
use super::utils::print_page_list;

pub fn handle_list(ctx: &CommandContext, json: bool) -> Result<()> {
    let pages = ctx.pages.pages()?;

    if json {
        let summaries = pages
            .iter()
            .map(|page| page.summary())
            .collect::<crate::error::Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print_page_list(&pages);
    }
    Ok(())
}
