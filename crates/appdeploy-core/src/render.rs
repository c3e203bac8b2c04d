//! Template rendering
//!
//! Templates are executed without external data: the only context a caller
//! can pass is [`Context::empty`], and undefined variables are errors. Control
//! constructs and literal text are all a template can use.

use minijinja::{Environment, UndefinedBehavior, Value};

use crate::{Error, Result};

/// Execution context handed to a template. Always empty.
#[derive(Debug, Clone)]
pub struct Context {
    value: Value,
}

impl Context {
    pub fn empty() -> Self {
        Self {
            value: minijinja::context! {},
        }
    }
}

/// Renders resource templates.
#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Execute `raw` as a template identified by `name`.
    ///
    /// Returns the exact output; trimming is left to [`trimmed`].
    pub fn render(&self, name: &str, raw: &[u8], context: &Context) -> Result<String> {
        let source = std::str::from_utf8(raw).map_err(|source| Error::Encoding {
            name: name.to_string(),
            source,
        })?;

        self.env
            .render_named_str(name, source, &context.value)
            .map_err(|source| Error::Render {
                name: name.to_string(),
                source,
            })
    }
}

/// Trim surrounding whitespace; `None` means the template rendered to nothing.
pub fn trimmed(rendered: &str) -> Option<&str> {
    let trimmed = rendered.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
