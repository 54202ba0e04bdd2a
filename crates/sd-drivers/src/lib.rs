//! Front-end drivers for smalldoc.
//!
//! A [`Driver`] turns one input representation into elements of a shared
//! [`sd_model::Documenter`]. Three drivers are built in:
//!
//! - `reflect`: JSON object-graph snapshots of a live runtime (`*.objgraph`
//!   or a dotted module name resolved through the search paths)
//! - `rust`: Rust source files, parsed with `syn`
//! - `markdown`: Markdown documents, split into nested sections
//!
//! [`DriverRegistry`] maps inputs onto drivers and [`Session`] runs a list of
//! inputs, isolating per-input failures.

mod driver;
mod error;
mod markdown;
mod params;
mod reflect;
mod registry;
mod resolve;
mod rust;
mod scope;
mod session;

pub use driver::{Driver, DriverContext};
pub use error::DriverError;
pub use markdown::MarkdownDriver;
pub use params::{Parameter, Variadic, format_parameters};
pub use reflect::ReflectDriver;
pub use registry::{DriverFactory, DriverRegistry, Selection};
pub use rust::RustDriver;
pub use scope::{ScopeStack, unique_id};
pub use session::{InputFailure, RunReport, Session};
