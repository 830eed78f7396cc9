use anyhow::Result;
use colored::Colorize;
use std::io::{self, Read};
use std::rc::Rc;

use crate::page::Page;

/// Resolve body content from the CLI argument or stdin
pub fn resolve_body(body: Option<String>) -> Result<Option<String>> {
    match body {
        Some(b) if b == "-" => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            Ok(Some(content))
        }
        other => Ok(other),
    }
}

pub fn print_page_list(pages: &[Rc<Page>]) {
    if pages.is_empty() {
        println!("No pages found.");
        return;
    }

    for page in pages {
        match page.title() {
            Some(title) => println!("{}  {}", page.path().cyan(), title),
            None => println!("{}", page.path().cyan()),
        }
    }
}
