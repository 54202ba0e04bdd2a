//! Root registry of a documentation run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::Value;

use crate::element::{Element, ElementAttrs, ElementRef, ElementType, Relation, RelationObject};
use crate::element::{SourceRange, verbs};
use crate::serialize::DocumentView;

static NEXT_DOCUMENTER: AtomicU32 = AtomicU32::new(0);

/// Arena owning every element created during one run.
///
/// [`elements`](Self::elements) lists the top-level roots in the order they
/// were added. The registry is append-only and has no notion of a current
/// scope; drivers track their own nesting.
#[derive(Debug)]
pub struct Documenter {
    /// Stamp carried by every handle this documenter issues.
    stamp: u32,
    arena: Vec<Element>,
    elements: Vec<ElementRef>,
    /// First element created with each id.
    ids: HashMap<String, ElementRef>,
}

impl Default for Documenter {
    fn default() -> Self {
        Self {
            stamp: NEXT_DOCUMENTER.fetch_add(1, Ordering::Relaxed),
            arena: Vec::new(),
            elements: Vec::new(),
            ids: HashMap::new(),
        }
    }
}

impl Documenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an element without registering it as a root.
    pub fn create_element(&mut self, attrs: ElementAttrs) -> ElementRef {
        let handle = ElementRef {
            documenter: self.stamp,
            index: self.arena.len(),
        };
        if let Some(id) = &attrs.id {
            self.ids.entry(id.clone()).or_insert(handle);
        }
        self.arena.push(Element::from(attrs));
        handle
    }

    pub fn create_module(&mut self, name: impl Into<String>, attrs: ElementAttrs) -> ElementRef {
        self.create_typed(ElementType::Module, name.into(), attrs)
    }

    pub fn create_function(&mut self, name: impl Into<String>, attrs: ElementAttrs) -> ElementRef {
        self.create_typed(ElementType::Function, name.into(), attrs)
    }

    pub fn create_class(&mut self, name: impl Into<String>, attrs: ElementAttrs) -> ElementRef {
        self.create_typed(ElementType::Class, name.into(), attrs)
    }

    fn create_typed(
        &mut self,
        element_type: ElementType,
        name: String,
        attrs: ElementAttrs,
    ) -> ElementRef {
        self.create_element(attrs.element_type(element_type).name(name))
    }

    /// Register `handle` as a top-level root and return it unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was not created by this documenter or if the
    /// element has no id. Both indicate a defect in the calling driver.
    pub fn add_element(&mut self, handle: ElementRef) -> ElementRef {
        self.assert_owned(handle);
        assert!(
            self.arena[handle.index].id.is_some(),
            "top-level element {} has no id",
            handle.index
        );
        self.elements.push(handle);
        handle
    }

    /// Top-level roots, in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[ElementRef] {
        &self.elements
    }

    /// Borrow an element.
    ///
    /// # Panics
    ///
    /// Panics if `handle` belongs to another documenter.
    #[must_use]
    pub fn element(&self, handle: ElementRef) -> &Element {
        self.assert_owned(handle);
        &self.arena[handle.index]
    }

    /// Non-panicking lookup. `None` for handles of another documenter.
    #[must_use]
    pub fn get(&self, handle: ElementRef) -> Option<&Element> {
        if handle.documenter != self.stamp {
            return None;
        }
        self.arena.get(handle.index)
    }

    /// Mutable access to an element through the chainable [`ElementMut`] API.
    pub fn element_mut(&mut self, handle: ElementRef) -> ElementMut<'_> {
        self.assert_owned(handle);
        ElementMut {
            documenter: self,
            handle,
        }
    }

    /// First element that was given `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<ElementRef> {
        self.ids.get(id).copied()
    }

    /// Number of elements created so far, registered or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Children of `handle` ordered for display: by type group, then by
    /// label. The element itself keeps its insertion order.
    #[must_use]
    pub fn grouped_children(&self, handle: ElementRef) -> Vec<(&str, ElementRef)> {
        let mut children: Vec<(&str, ElementRef)> = self
            .element(handle)
            .children
            .iter()
            .map(|(slot, child)| (slot.as_str(), *child))
            .collect();
        children.sort_by(|(a_slot, a), (b_slot, b)| {
            let a_el = &self.arena[a.index];
            let b_el = &self.arena[b.index];
            let rank = |e: &Element| {
                e.element_type
                    .map_or(ElementType::ALL.len(), ElementType::group_rank)
            };
            rank(a_el).cmp(&rank(b_el)).then_with(|| {
                a_el.label()
                    .unwrap_or(*a_slot)
                    .cmp(b_el.label().unwrap_or(*b_slot))
            })
        });
        children
    }

    /// Serializable view of the whole document.
    #[must_use]
    pub fn view(&self) -> DocumentView<'_> {
        DocumentView::new(self)
    }

    /// Canonical structured value: `{"children": [[label, element], ...]}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.view()).expect("element graph serializes to JSON")
    }

    fn assert_owned(&self, handle: ElementRef) {
        assert!(
            handle.documenter == self.stamp && handle.index < self.arena.len(),
            "element handle {} does not belong to this documenter",
            handle.index
        );
    }
}

/// Chainable mutable access to one element.
///
/// Holds the whole documenter so that [`set_slot`](Self::set_slot) can update
/// both ends of the slot link.
pub struct ElementMut<'a> {
    documenter: &'a mut Documenter,
    handle: ElementRef,
}

impl ElementMut<'_> {
    #[must_use]
    pub fn handle(&self) -> ElementRef {
        self.handle
    }

    fn element(&mut self) -> &mut Element {
        &mut self.documenter.arena[self.handle.index]
    }

    /// Append a relation. The verb is not validated.
    ///
    /// # Panics
    ///
    /// Panics if an element object belongs to another documenter.
    pub fn add_relation<I>(&mut self, verb: impl Into<String>, objects: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<RelationObject>,
    {
        let relation = Relation::new(verb, objects);
        for handle in relation.elements() {
            self.documenter.assert_owned(handle);
        }
        self.element().relations.push(relation);
        self
    }

    /// Attach `value` under slot `name`.
    ///
    /// The slot is appended after the existing children, and `value` gains a
    /// `defined` relation to this element plus a `slot` relation carrying
    /// `name`.
    ///
    /// # Panics
    ///
    /// Panics if `value` belongs to another documenter.
    pub fn set_slot(&mut self, name: impl Into<String>, value: ElementRef) -> &mut Self {
        self.documenter.assert_owned(value);
        let name = name.into();
        let owner = self.handle;
        self.element().children.push((name.clone(), value));
        let child = &mut self.documenter.arena[value.index];
        child
            .relations
            .push(Relation::new(verbs::DEFINED, [owner]));
        child.relations.push(Relation::new(verbs::SLOT, [name]));
        self
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        self.documenter
            .ids
            .entry(id.clone())
            .or_insert(self.handle);
        self.element().id = Some(id);
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.element().name = Some(name.into());
        self
    }

    pub fn set_type(&mut self, element_type: ElementType) -> &mut Self {
        self.element().element_type = Some(element_type);
        self
    }

    /// Add a tag unless it is already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        let tag = tag.into();
        let element = self.element();
        if !element.tags.contains(&tag) {
            element.tags.push(tag);
        }
        self
    }

    pub fn set_parent(&mut self, parent: ElementRef) -> &mut Self {
        self.documenter.assert_owned(parent);
        self.element().parent = Some(parent);
        self
    }

    pub fn set_documentation(&mut self, documentation: Option<String>) -> &mut Self {
        self.element().documentation = documentation;
        self
    }

    pub fn set_representation(&mut self, representation: impl Into<String>) -> &mut Self {
        self.element().representation = Some(representation.into());
        self
    }

    pub fn set_source(&mut self, path: impl Into<String>, range: Option<SourceRange>) -> &mut Self {
        let element = self.element();
        element.source = Some(path.into());
        element.range = range;
        self
    }
}
