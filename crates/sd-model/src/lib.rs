//! Generic documentation model for smalldoc.
//!
//! Drivers populate a [`Documenter`] with [`Element`]s describing modules,
//! classes, functions and documents. The documenter owns every element in an
//! arena; elements reference each other through [`ElementRef`] handles, which
//! allows shared children and cyclic relations without reference counting.
//!
//! # Example
//!
//! ```
//! use sd_model::{Documenter, ElementAttrs, verbs};
//!
//! let mut doc = Documenter::new();
//! let module = doc.create_module("pkg", ElementAttrs::new().id("pkg"));
//! let f = doc.create_function("f", ElementAttrs::new().id("pkg.f"));
//! doc.element_mut(f)
//!     .add_relation(verbs::ARGUMENTS, [vec!["a".to_owned(), "b=1".to_owned()]]);
//! doc.element_mut(module).set_slot("f", f);
//! doc.add_element(module);
//!
//! let json = doc.to_json();
//! assert_eq!(json["children"][0][0], "pkg");
//! ```

mod documenter;
mod element;
mod serialize;

pub use documenter::{Documenter, ElementMut};
pub use element::{
    Element, ElementAttrs, ElementRef, ElementType, ParseElementTypeError, Relation,
    RelationObject, SourceRange, verbs,
};
pub use serialize::{DocumentView, ElementView};
