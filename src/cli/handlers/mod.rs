mod check;
mod create;
mod delete;
mod init;
mod list;
mod render;
mod show;
mod utils;

pub use check::handle_check;
pub use create::handle_create;
pub use delete::handle_delete;
pub use init::handle_init;
pub use list::handle_list;
pub use render::handle_render;
pub use show::handle_show;

use crate::config::FlatPagesConfig;
use crate::pages::FlatPages;
use std::path::PathBuf;

/// Common context passed to all command handlers
pub struct CommandContext {
    pub project_root: PathBuf,
    pub pages: FlatPages,
}

impl CommandContext {
    pub fn new(config: FlatPagesConfig, project_root: PathBuf) -> Self {
        let pages = FlatPages::new(config, &project_root);
        Self {
            project_root,
            pages,
        }
    }
}
