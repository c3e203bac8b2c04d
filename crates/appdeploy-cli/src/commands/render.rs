//! The render command: preview one template

use std::path::Path;

use colored::Colorize;

use appdeploy_core::{FolderSource, Renderer, render_resource};

use crate::error::Result;

/// Run the render command
///
/// Prints the trimmed manifest, or a note when the template renders empty.
pub fn run_render(cwd: &Path, source: &Path, name: &str) -> Result<()> {
    let source = FolderSource::new(cwd.join(source));

    match render_resource(&Renderer::new(), &source, name)? {
        Some(rendered) => {
            println!("# {}", rendered.manifest.identifier());
            println!("{}", rendered.content);
        }
        None => {
            println!("{} {} renders empty; it would be skipped.", "=>".blue().bold(), name);
        }
    }
    Ok(())
}
