//! Command implementations

mod apply;
mod init;
mod render;

pub use apply::run_apply;
pub use init::run_init;
pub use render::run_render;
