use anyhow::Result;

use super::CommandContext;

pub fn handle_render(ctx: &CommandContext, path: String) -> Result<()> {
    let page = ctx.pages.get_or_fail(&path)?;
    println!("{}", page.html(&ctx.pages)?);
    Ok(())
}
