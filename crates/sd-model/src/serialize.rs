//! Structured-data serialization of the element graph.
//!
//! Children are inlined at every occurrence, so an element shared between
//! two slots appears in full under both. An element that is already being
//! serialized further up the current path is written as its id instead,
//! which keeps cyclic graphs finite. Relation objects that are elements are
//! always reduced to their id.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::documenter::Documenter;
use crate::element::{Element, ElementRef, Relation, RelationObject};

/// Serializable view of a [`Documenter`]: `{"children": [[label, element], ...]}`.
pub struct DocumentView<'a> {
    documenter: &'a Documenter,
}

impl<'a> DocumentView<'a> {
    pub(crate) fn new(documenter: &'a Documenter) -> Self {
        Self { documenter }
    }
}

impl Serialize for DocumentView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let roots = RootsView {
            documenter: self.documenter,
        };
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("children", &roots)?;
        map.end()
    }
}

struct RootsView<'a> {
    documenter: &'a Documenter,
}

impl Serialize for RootsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let roots = self.documenter.elements();
        let mut seq = serializer.serialize_seq(Some(roots.len()))?;
        for &handle in roots {
            let label = self.documenter.element(handle).label();
            seq.serialize_element(&(label, ElementView::root(self.documenter, handle)))?;
        }
        seq.end()
    }
}

/// Elements currently open on the serialization path, innermost first.
struct Path<'p> {
    handle: ElementRef,
    up: Option<&'p Path<'p>>,
}

impl Path<'_> {
    fn contains(&self, handle: ElementRef) -> bool {
        let mut node = Some(self);
        while let Some(current) = node {
            if current.handle == handle {
                return true;
            }
            node = current.up;
        }
        false
    }
}

/// Serializable view of one element and everything nested under it.
pub struct ElementView<'a, 'p> {
    documenter: &'a Documenter,
    handle: ElementRef,
    path: Option<&'p Path<'p>>,
}

impl<'a> ElementView<'a, '_> {
    /// View of `handle` serialized as the root of a new path.
    #[must_use]
    pub fn root(documenter: &'a Documenter, handle: ElementRef) -> Self {
        Self {
            documenter,
            handle,
            path: None,
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

impl Serialize for ElementView<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let element = self.documenter.element(self.handle);
        let parent_id = element
            .parent
            .and_then(|p| self.documenter.element(p).id());
        let relations: Vec<&Relation> = element
            .relations
            .iter()
            .filter(|r| !r.is_structural())
            .collect();

        let mut map = serializer.serialize_map(None)?;
        if let Some(id) = element.id().filter(|s| !s.is_empty()) {
            map.serialize_entry("id", id)?;
        }
        if let Some(name) = element.name().filter(|s| !s.is_empty()) {
            map.serialize_entry("name", name)?;
        }
        if let Some(element_type) = element.element_type {
            map.serialize_entry("type", &element_type)?;
        }
        if !element.tags.is_empty() {
            map.serialize_entry("tags", &element.tags)?;
        }
        if let Some(parent) = parent_id.filter(|s| !s.is_empty()) {
            map.serialize_entry("parent", parent)?;
        }
        if !is_blank(element.documentation()) {
            map.serialize_entry("documentation", &element.documentation)?;
        }
        if !is_blank(element.representation()) {
            map.serialize_entry("representation", &element.representation)?;
        }
        if !is_blank(element.source()) {
            map.serialize_entry("source", &element.source)?;
        }
        if let Some(range) = element.range {
            map.serialize_entry("range", &range)?;
        }
        if !element.children.is_empty() {
            let path = Path {
                handle: self.handle,
                up: self.path,
            };
            let children = ChildrenView {
                documenter: self.documenter,
                element,
                path: &path,
            };
            map.serialize_entry("children", &children)?;
        }
        if !relations.is_empty() {
            let relations = RelationsView {
                documenter: self.documenter,
                relations,
            };
            map.serialize_entry("relations", &relations)?;
        }
        map.end()
    }
}

struct ChildrenView<'a, 'p> {
    documenter: &'a Documenter,
    element: &'a Element,
    path: &'p Path<'p>,
}

impl Serialize for ChildrenView<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.element.children.len()))?;
        for (slot, child) in &self.element.children {
            if self.path.contains(*child) {
                let id = self.documenter.element(*child).id();
                seq.serialize_element(&(slot, id))?;
            } else {
                let view = ElementView {
                    documenter: self.documenter,
                    handle: *child,
                    path: Some(self.path),
                };
                seq.serialize_element(&(slot, view))?;
            }
        }
        seq.end()
    }
}

struct RelationsView<'a> {
    documenter: &'a Documenter,
    relations: Vec<&'a Relation>,
}

impl Serialize for RelationsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.relations.len()))?;
        for relation in &self.relations {
            seq.serialize_element(&RelationView {
                documenter: self.documenter,
                relation,
            })?;
        }
        seq.end()
    }
}

struct RelationView<'a> {
    documenter: &'a Documenter,
    relation: &'a Relation,
}

impl Serialize for RelationView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let objects = self.relation.objects();
        let mut seq = serializer.serialize_seq(Some(objects.len() + 1))?;
        seq.serialize_element(self.relation.verb())?;
        for object in objects {
            match object {
                RelationObject::Element(handle) => {
                    seq.serialize_element(&self.documenter.element(*handle).id())?;
                }
                RelationObject::Value(value) => seq.serialize_element(value)?,
            }
        }
        seq.end()
    }
}
