//! Manifest templating
//!
//! Large static payloads such as Grafana dashboard JSON are kept as template
//! assets and filled in with a handful of values (usually just a namespace).
//! Templates use `${...}` placeholders so that JSON braces never collide with
//! the template syntax:
//!
//! - `${namespace}` - variable substitution
//! - `$${...}` - literal `${...}` (Grafana's own variable syntax)
//! - `{% if %}...{% endif %}` - conditionals

mod engine;
mod error;

pub use engine::TemplateEngine;
pub use error::TemplateError;
