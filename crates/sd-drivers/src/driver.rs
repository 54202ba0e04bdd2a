//! The driver contract.

use std::path::PathBuf;

use sd_markup::Markup;
use sd_model::{Documenter, ElementRef, RelationObject, SourceRange, verbs};

use crate::error::DriverError;

/// Settings shared by every driver of a run.
#[derive(Debug, Clone, Default)]
pub struct DriverContext {
    /// Directories searched for inputs that are not found as given.
    pub search_paths: Vec<PathBuf>,
    /// Markup of documentation text in reflected snapshots.
    pub markup: Markup,
}

/// A front-end that populates the model from one input representation.
///
/// `parse` receives the run's documenter and adds whatever the input
/// describes, registering its top-level elements with
/// [`Documenter::add_element`]. Input problems are returned as recoverable
/// [`DriverError`]s; the caller logs them and moves on.
pub trait Driver {
    /// Canonical driver name, as used in `path@name` selection.
    fn name(&self) -> &'static str;

    /// Parse one input and add its elements to `documenter`.
    fn parse(&mut self, documenter: &mut Documenter, identifier: &str) -> Result<(), DriverError>;
}

/// Record provenance on `handle`: the `source`/`range` fields and a
/// `source` relation carrying `(path, [start, end])`.
pub(crate) fn record_source(
    documenter: &mut Documenter,
    handle: ElementRef,
    path: &str,
    range: SourceRange,
) {
    documenter
        .element_mut(handle)
        .set_source(path, Some(range))
        .add_relation(verbs::SOURCE, [RelationObject::from(path), RelationObject::from(range)]);
}
