//! Herald content: what travels on the queue and what gets posted.
//!
//! This crate owns the event wire model and the rules that turn an event
//! into outbound text:
//!
//! - [`Event`] / [`EventKind`]: the JSON records producers push onto the queue
//! - [`validate`]: kind-specific required-field checks
//! - [`Renderer`] / [`Template`]: placeholder substitution with an explicit
//!   field-default table
//! - [`format_amount`]: numeric formatting for token amounts
//!
//! Nothing here performs I/O except [`Template::from_file`]. Length limits are
//! a property of the destination and are applied by the posting gateway, not
//! by the renderer.

pub mod amount;
pub mod error;
pub mod event;
pub mod render;
pub mod validate;

pub use amount::{format_amount, format_number};
pub use error::{ContentError, ContentResult, ParseError, TemplateError, ValidationError};
pub use event::{classify, parse, Amount, Event, EventKind};
pub use render::{render, Renderer, Template, FIELD_DEFAULTS};
pub use validate::{validate, ValidationReport, ValidationWarning, ALPHA_REQUIRED_FIELDS};
