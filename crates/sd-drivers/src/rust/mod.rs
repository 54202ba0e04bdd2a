//! Parser-based driver for Rust source files.
//!
//! Each file becomes a module element. Items map onto the model as follows:
//! functions become functions, `struct`/`enum`/`union`/`trait` become classes
//! (tagged with their keyword), fields become attributes and enum variants
//! class attributes. `impl` blocks attach their items to the class of the
//! same module, and `mod` items recurse, loading out-of-line modules from
//! disk the way rustc locates them.

mod line_index;
mod tokens;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{
    Attribute, Expr, Fields, FnArg, ImplItem, Item, ItemImpl, ItemMod, Lit, Meta, Signature,
    TraitItem, Type, TypeParamBound, Visibility,
};

use sd_markup::Markup;
use sd_model::{Documenter, ElementAttrs, ElementRef, ElementType, SourceRange, verbs};

use crate::driver::{Driver, DriverContext, record_source};
use crate::error::DriverError;
use crate::params::{Parameter, Variadic, format_parameters};
use crate::resolve::{file_stem, read_source, resolve};
use crate::scope::ScopeStack;

use line_index::LineIndex;
use tokens::compact;

/// Driver name.
pub const NAME: &str = "rust";

/// Tag of items declared `pub`.
pub const TAG_PUBLIC: &str = "public";

/// Driver for `*.rs` files.
pub struct RustDriver {
    search_paths: Vec<PathBuf>,
}

impl RustDriver {
    #[must_use]
    pub fn new(context: &DriverContext) -> Self {
        Self {
            search_paths: context.search_paths.clone(),
        }
    }
}

impl Driver for RustDriver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn parse(&mut self, documenter: &mut Documenter, identifier: &str) -> Result<(), DriverError> {
        let path = resolve(identifier, &[PathBuf::from(identifier)], &self.search_paths)?;
        let name = module_name(&path)
            .ok_or_else(|| DriverError::parse(identifier, "path has no file name"))?;
        let text = read_source(&path)?;
        let file = syn::parse_file(&text).map_err(|e| parse_error(identifier, &e))?;
        tracing::debug!(identifier = %identifier, module = %name, items = file.items.len(), "Parsed Rust source");

        let src = SourceFile::new(&path, &text);
        let mut walker = Walker {
            documenter,
            open: vec![canonical(&path)],
        };
        let id = ScopeStack::new().claim_id(walker.documenter, &name);
        let module = walker.documenter.create_module(
            name,
            ElementAttrs::new().id(id.clone()).documentation(docs(&file.attrs)),
        );
        record_source(
            walker.documenter,
            module,
            &src.path,
            SourceRange::new(0, text.len()),
        );
        walker.items(&src, module, &ScopeStack::rooted(&id), &file.items);
        walker.documenter.add_element(module);
        Ok(())
    }
}

fn parse_error(identifier: &str, error: &syn::Error) -> DriverError {
    let start = error.span().start();
    DriverError::parse(
        identifier,
        format!("{error} at line {}, column {}", start.line, start.column + 1),
    )
}

/// Module name of a file: its stem, or the crate/directory name for
/// `lib.rs`, `main.rs` and `mod.rs`.
fn module_name(path: &Path) -> Option<String> {
    let stem = file_stem(path)?;
    if !matches!(stem.as_str(), "lib" | "main" | "mod") {
        return Some(stem);
    }
    let dir = path.parent()?;
    let dir = if dir.file_name().is_some_and(|n| n == "src") {
        dir.parent()?
    } else {
        dir
    };
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(stem, |n| n.replace('-', "_"));
    Some(name)
}

/// Rendered `///` and `//!` documentation of an item.
fn docs<'a>(attrs: impl IntoIterator<Item = &'a Attribute>) -> Option<String> {
    let lines: Vec<String> = attrs
        .into_iter()
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) if nv.path.is_ident("doc") => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect();
    if lines.is_empty() {
        return None;
    }
    Markup::Markdown.render_doc(Some(&lines.join("\n")))
}

/// `#[path = "..."]` override of an out-of-line module.
fn path_attribute(attrs: &[Attribute]) -> Option<String> {
    attrs.iter().find_map(|attr| match &attr.meta {
        Meta::NameValue(nv) if nv.path.is_ident("path") => match &nv.value {
            Expr::Lit(expr) => match &expr.lit {
                Lit::Str(s) => Some(s.value()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    })
}

fn is_public(vis: &Visibility) -> bool {
    matches!(vis, Visibility::Public(_))
}

/// Element type of a function declared in a type's scope.
fn method_type(sig: &Signature) -> ElementType {
    if sig.receiver().is_some() {
        ElementType::Method
    } else if sig.ident == "new" {
        ElementType::Constructor
    } else {
        ElementType::ClassMethod
    }
}

fn parameters(sig: &Signature) -> Vec<Parameter> {
    let mut params: Vec<Parameter> = sig
        .inputs
        .iter()
        .map(|arg| match arg {
            FnArg::Receiver(receiver) if receiver.colon_token.is_some() => {
                Parameter::new("self").with_type(compact(&*receiver.ty))
            }
            FnArg::Receiver(receiver) => Parameter::new(compact(receiver)),
            FnArg::Typed(typed) => {
                Parameter::new(compact(&*typed.pat)).with_type(compact(&*typed.ty))
            }
        })
        .collect();
    if let Some(variadic) = &sig.variadic {
        let name = variadic
            .pat
            .as_ref()
            .map_or_else(|| "args".to_owned(), |(pat, _)| compact(&**pat));
        params.push(Parameter::new(name).variadic(Variadic::Positional));
    }
    params
}

fn literal_tag(expr: &Expr) -> Option<&'static str> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Int(_) | Lit::Float(_) => Some("number"),
            Lit::Str(_) | Lit::ByteStr(_) | Lit::CStr(_) | Lit::Char(_) | Lit::Byte(_) => {
                Some("string")
            }
            Lit::Bool(_) => Some("boolean"),
            _ => None,
        },
        Expr::Array(_) | Expr::Repeat(_) => Some("list"),
        Expr::Reference(reference) => literal_tag(&reference.expr),
        Expr::Unary(unary) => literal_tag(&unary.expr),
        _ => None,
    }
}

fn type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        Type::Paren(inner) => type_name(&inner.elem),
        _ => None,
    }
}

/// A parsed file being walked.
struct SourceFile<'a> {
    path: String,
    lines: LineIndex<'a>,
    /// Directory of the file, base of `#[path]` attributes.
    dir: PathBuf,
    /// Directory holding the files of out-of-line child modules.
    module_dir: PathBuf,
}

impl<'a> SourceFile<'a> {
    fn new(path: &Path, text: &'a str) -> Self {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let module_dir = match file_stem(path) {
            Some(stem) if !matches!(stem.as_str(), "lib" | "main" | "mod") => dir.join(stem),
            _ => dir.clone(),
        };
        Self {
            path: path.display().to_string(),
            lines: LineIndex::new(text),
            dir,
            module_dir,
        }
    }

    fn range(&self, span: Span) -> SourceRange {
        SourceRange::new(self.lines.offset(span.start()), self.lines.offset(span.end()))
    }

    fn child_module_path(&self, name: &str, attrs: &[Attribute]) -> Option<PathBuf> {
        if let Some(path) = path_attribute(attrs) {
            let path = self.dir.join(path);
            return path.is_file().then_some(path);
        }
        [
            self.module_dir.join(format!("{name}.rs")),
            self.module_dir.join(name).join("mod.rs"),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }
}

struct Walker<'d> {
    documenter: &'d mut Documenter,
    /// Files currently being walked, outermost first.
    open: Vec<PathBuf>,
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

impl Walker<'_> {
    /// Create the element of one item, slot it into `owner` and record
    /// where it was declared.
    #[allow(clippy::too_many_arguments)]
    fn attach(
        &mut self,
        src: &SourceFile<'_>,
        owner: ElementRef,
        scope: &ScopeStack,
        name: &str,
        element_type: ElementType,
        attrs: &[Attribute],
        span: Span,
    ) -> ElementRef {
        let id = scope.claim_id(self.documenter, name);
        let handle = self.documenter.create_element(
            ElementAttrs::new()
                .id(id)
                .name(name)
                .element_type(element_type)
                .parent(owner)
                .documentation(docs(attrs)),
        );
        record_source(self.documenter, handle, &src.path, src.range(span));
        self.documenter.element_mut(owner).set_slot(name, handle);
        handle
    }

    fn scope_of(&self, handle: ElementRef) -> ScopeStack {
        ScopeStack::rooted(self.documenter.element(handle).id().unwrap_or_default())
    }

    fn tag(&mut self, handle: ElementRef, tag: &str, when: bool) {
        if when {
            self.documenter.element_mut(handle).add_tag(tag);
        }
    }

    fn items(&mut self, src: &SourceFile<'_>, owner: ElementRef, scope: &ScopeStack, items: &[Item]) {
        let mut types: HashMap<String, ElementRef> = HashMap::new();
        let mut impls: Vec<&ItemImpl> = Vec::new();

        for item in items {
            match item {
                Item::Fn(f) => {
                    self.function(
                        src,
                        owner,
                        scope,
                        &f.attrs,
                        is_public(&f.vis),
                        &f.sig,
                        item.span(),
                        ElementType::Function,
                    );
                }
                Item::Struct(s) => {
                    let class = self.class(src, owner, scope, &s.ident, &s.attrs, item.span(), "struct");
                    self.tag(class, TAG_PUBLIC, is_public(&s.vis));
                    self.fields(src, class, &s.fields);
                    types.insert(s.ident.to_string(), class);
                }
                Item::Union(u) => {
                    let class = self.class(src, owner, scope, &u.ident, &u.attrs, item.span(), "union");
                    self.tag(class, TAG_PUBLIC, is_public(&u.vis));
                    self.fields(src, class, &Fields::Named(u.fields.clone()));
                    types.insert(u.ident.to_string(), class);
                }
                Item::Enum(e) => {
                    let class = self.class(src, owner, scope, &e.ident, &e.attrs, item.span(), "enum");
                    self.tag(class, TAG_PUBLIC, is_public(&e.vis));
                    let variants = self.scope_of(class);
                    for variant in &e.variants {
                        let name = variant.ident.to_string();
                        let handle = self.attach(
                            src,
                            class,
                            &variants,
                            &name,
                            ElementType::ClassAttribute,
                            &variant.attrs,
                            variant.span(),
                        );
                        let ident = &variant.ident;
                        let fields = &variant.fields;
                        let mut repr = compact(&quote::quote!(#ident #fields));
                        if let Some((_, discriminant)) = &variant.discriminant {
                            repr = format!("{repr} = {}", compact(discriminant));
                        }
                        self.documenter
                            .element_mut(handle)
                            .add_tag("variant")
                            .set_representation(repr);
                        if matches!(variant.fields, Fields::Named(_)) {
                            self.fields(src, handle, &variant.fields);
                        }
                    }
                    types.insert(e.ident.to_string(), class);
                }
                Item::Trait(t) => {
                    let class = self.class(src, owner, scope, &t.ident, &t.attrs, item.span(), "trait");
                    let public = is_public(&t.vis);
                    self.tag(class, TAG_PUBLIC, public);
                    for bound in &t.supertraits {
                        if let TypeParamBound::Trait(bound) = bound {
                            self.documenter
                                .element_mut(class)
                                .add_relation(verbs::EXTENDS, [compact(&bound.path)]);
                        }
                    }
                    self.trait_items(src, class, public, &t.items);
                    types.insert(t.ident.to_string(), class);
                }
                Item::Const(c) => {
                    let handle = self.value(src, owner, scope, &c.ident, &c.attrs, item.span(), "const");
                    self.tag(handle, TAG_PUBLIC, is_public(&c.vis));
                    self.literal(handle, &c.expr);
                }
                Item::Static(s) => {
                    let handle = self.value(src, owner, scope, &s.ident, &s.attrs, item.span(), "static");
                    self.tag(handle, "mut", matches!(s.mutability, syn::StaticMutability::Mut(_)));
                    self.tag(handle, TAG_PUBLIC, is_public(&s.vis));
                    self.literal(handle, &s.expr);
                }
                Item::Type(t) => {
                    let handle = self.value(src, owner, scope, &t.ident, &t.attrs, item.span(), "alias");
                    self.tag(handle, TAG_PUBLIC, is_public(&t.vis));
                    self.documenter
                        .element_mut(handle)
                        .set_representation(compact(&*t.ty));
                }
                Item::Mod(m) => self.module(src, owner, scope, m),
                Item::Impl(i) => impls.push(i),
                _ => {}
            }
        }

        for imp in impls {
            self.implementation(src, &types, imp);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn function(
        &mut self,
        src: &SourceFile<'_>,
        owner: ElementRef,
        scope: &ScopeStack,
        attrs: &[Attribute],
        public: bool,
        sig: &Signature,
        span: Span,
        element_type: ElementType,
    ) -> ElementRef {
        let name = sig.ident.to_string();
        let handle = self.attach(src, owner, scope, &name, element_type, attrs, span);
        self.documenter
            .element_mut(handle)
            .add_relation(verbs::ARGUMENTS, [format_parameters(&parameters(sig))])
            .set_representation(compact(sig));
        self.tag(handle, "async", sig.asyncness.is_some());
        self.tag(handle, "unsafe", sig.unsafety.is_some());
        self.tag(handle, "const", sig.constness.is_some());
        self.tag(handle, TAG_PUBLIC, public);
        handle
    }

    #[allow(clippy::too_many_arguments)]
    fn class(
        &mut self,
        src: &SourceFile<'_>,
        owner: ElementRef,
        scope: &ScopeStack,
        ident: &syn::Ident,
        attrs: &[Attribute],
        span: Span,
        keyword: &str,
    ) -> ElementRef {
        let handle = self.attach(src, owner, scope, &ident.to_string(), ElementType::Class, attrs, span);
        self.documenter
            .element_mut(handle)
            .add_tag(keyword)
            .set_representation(format!("{keyword} {ident}"));
        handle
    }

    #[allow(clippy::too_many_arguments)]
    fn value(
        &mut self,
        src: &SourceFile<'_>,
        owner: ElementRef,
        scope: &ScopeStack,
        ident: &syn::Ident,
        attrs: &[Attribute],
        span: Span,
        keyword: &str,
    ) -> ElementRef {
        let handle = self.attach(src, owner, scope, &ident.to_string(), ElementType::Value, attrs, span);
        self.documenter.element_mut(handle).add_tag(keyword);
        handle
    }

    /// Literal kind tag and source text of a constant initializer.
    fn literal(&mut self, handle: ElementRef, expr: &Expr) {
        let mut element = self.documenter.element_mut(handle);
        if let Some(tag) = literal_tag(expr) {
            element.add_tag(tag);
        }
        element.set_representation(compact(expr));
    }

    fn fields(&mut self, src: &SourceFile<'_>, owner: ElementRef, fields: &Fields) {
        let scope = self.scope_of(owner);
        for (index, field) in fields.iter().enumerate() {
            let name = field
                .ident
                .as_ref()
                .map_or_else(|| index.to_string(), ToString::to_string);
            let handle = self.attach(
                src,
                owner,
                &scope,
                &name,
                ElementType::Attribute,
                &field.attrs,
                field.span(),
            );
            self.documenter
                .element_mut(handle)
                .set_representation(compact(&field.ty));
            self.tag(handle, TAG_PUBLIC, is_public(&field.vis));
        }
    }

    fn trait_items(&mut self, src: &SourceFile<'_>, class: ElementRef, public: bool, items: &[TraitItem]) {
        let scope = self.scope_of(class);
        for item in items {
            match item {
                TraitItem::Fn(f) => {
                    let handle = self.function(
                        src,
                        class,
                        &scope,
                        &f.attrs,
                        public,
                        &f.sig,
                        item.span(),
                        method_type(&f.sig),
                    );
                    self.tag(handle, "provided", f.default.is_some());
                }
                TraitItem::Const(c) => {
                    let name = c.ident.to_string();
                    let handle = self.attach(
                        src,
                        class,
                        &scope,
                        &name,
                        ElementType::ClassAttribute,
                        &c.attrs,
                        item.span(),
                    );
                    self.documenter
                        .element_mut(handle)
                        .set_representation(compact(&c.ty));
                }
                TraitItem::Type(t) => {
                    let name = t.ident.to_string();
                    let handle = self.attach(
                        src,
                        class,
                        &scope,
                        &name,
                        ElementType::ClassAttribute,
                        &t.attrs,
                        item.span(),
                    );
                    self.documenter
                        .element_mut(handle)
                        .add_tag("associated-type");
                }
                _ => {}
            }
        }
    }

    fn implementation(
        &mut self,
        src: &SourceFile<'_>,
        types: &HashMap<String, ElementRef>,
        imp: &ItemImpl,
    ) {
        let Some(target) = type_name(&imp.self_ty) else {
            tracing::debug!(file = %src.path, "Skipping impl for unnamed type");
            return;
        };
        let Some(&class) = types.get(&target) else {
            tracing::debug!(file = %src.path, target = %target, "Skipping impl for type declared elsewhere");
            return;
        };
        let trait_path = imp.trait_.as_ref().map(|(_, path, _)| compact(path));
        if let Some(path) = &trait_path {
            self.documenter
                .element_mut(class)
                .add_relation(verbs::IMPLEMENTS, [path.as_str()]);
        }

        let scope = self.scope_of(class);
        for item in &imp.items {
            match item {
                ImplItem::Fn(f) => {
                    let public = trait_path.is_some() || is_public(&f.vis);
                    let handle = self.function(
                        src,
                        class,
                        &scope,
                        &f.attrs,
                        public,
                        &f.sig,
                        item.span(),
                        method_type(&f.sig),
                    );
                    self.tag(handle, "trait-impl", trait_path.is_some());
                }
                ImplItem::Const(c) => {
                    let name = c.ident.to_string();
                    let handle = self.attach(
                        src,
                        class,
                        &scope,
                        &name,
                        ElementType::ClassAttribute,
                        &c.attrs,
                        item.span(),
                    );
                    self.literal(handle, &c.expr);
                    self.tag(handle, TAG_PUBLIC, is_public(&c.vis));
                }
                ImplItem::Type(t) => {
                    let name = t.ident.to_string();
                    let handle = self.attach(
                        src,
                        class,
                        &scope,
                        &name,
                        ElementType::ClassAttribute,
                        &t.attrs,
                        item.span(),
                    );
                    self.documenter
                        .element_mut(handle)
                        .add_tag("alias")
                        .set_representation(compact(&t.ty));
                }
                _ => {}
            }
        }
    }

    fn module(&mut self, src: &SourceFile<'_>, owner: ElementRef, scope: &ScopeStack, m: &ItemMod) {
        let name = m.ident.to_string();
        let handle = self.attach(src, owner, scope, &name, ElementType::Module, &m.attrs, m.span());
        self.tag(handle, TAG_PUBLIC, is_public(&m.vis));
        let inner = self.scope_of(handle);

        if let Some((_, items)) = &m.content {
            self.items(src, handle, &inner, items);
            return;
        }

        let Some(path) = src.child_module_path(&name, &m.attrs) else {
            tracing::warn!(file = %src.path, module = %name, "Module file not found");
            return;
        };
        let key = canonical(&path);
        if self.open.contains(&key) {
            tracing::warn!(file = %src.path, module = %name, path = %path.display(), "Module file includes itself");
            return;
        }
        let text = match read_source(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping module");
                return;
            }
        };
        let file = match syn::parse_file(&text) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %parse_error(&name, &e), "Skipping module");
                return;
            }
        };

        let child = SourceFile::new(&path, &text);
        if let Some(documentation) = docs(m.attrs.iter().chain(&file.attrs)) {
            self.documenter
                .element_mut(handle)
                .set_documentation(Some(documentation));
        }
        record_source(
            self.documenter,
            handle,
            &child.path,
            SourceRange::new(0, text.len()),
        );
        self.open.push(key);
        self.items(&child, handle, &inner, &file.items);
        self.open.pop();
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    const LIB: &str = r#"//! Geometry helpers.

/// A point.
pub struct Point {
    /// Horizontal.
    pub x: f64,
    y: f64,
}

impl Point {
    /// Make a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn norm(&self) -> f64 {
        0.0
    }

    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    pub const ZERO: f64 = 0.0;
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Ok(())
    }
}

pub enum Shape {
    Circle(f64),
    Rect { w: f64, h: f64 },
}

pub trait Area: Clone {
    fn area(&self) -> f64;
}

pub const LIMIT: u32 = 10;

pub type Pair = (Point, Point);

pub mod inner {
    pub fn helper(count: usize) {}
}

mod extra;

use std::fmt;

macro_rules! noop {
    () => {};
}
"#;

    const EXTRA: &str = "//! Extra.\n\npub fn more() {}\n";

    struct Fixture {
        _temp: TempDir,
        lib: PathBuf,
        doc: Documenter,
    }

    fn parse_fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("geometry/src");
        fs::create_dir_all(&src).unwrap();
        let lib = src.join("lib.rs");
        fs::write(&lib, LIB).unwrap();
        fs::write(src.join("extra.rs"), EXTRA).unwrap();

        let mut doc = Documenter::new();
        RustDriver::new(&DriverContext::default())
            .parse(&mut doc, lib.to_str().unwrap())
            .unwrap();
        Fixture {
            _temp: temp,
            lib,
            doc,
        }
    }

    fn get<'a>(doc: &'a Documenter, id: &str) -> &'a sd_model::Element {
        doc.element(doc.find(id).unwrap_or_else(|| panic!("missing element {id}")))
    }

    fn slots(doc: &Documenter, id: &str) -> Vec<String> {
        get(doc, id)
            .children()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn arguments(element: &sd_model::Element) -> serde_json::Value {
        match element.relations_with(verbs::ARGUMENTS).next().unwrap().objects() {
            [sd_model::RelationObject::Value(value)] => value.clone(),
            other => panic!("unexpected arguments {other:?}"),
        }
    }

    // ===== modules =====

    #[test]
    fn test_module_named_after_crate_directory() {
        let fixture = parse_fixture();
        let doc = &fixture.doc;

        assert_eq!(doc.elements().len(), 1);
        let root = get(doc, "geometry");
        assert_eq!(root.element_type(), Some(ElementType::Module));
        assert_eq!(root.documentation(), Some("<p>Geometry helpers.</p>"));
        assert_eq!(root.range(), Some(SourceRange::new(0, LIB.len())));
    }

    #[test]
    fn test_module_items_in_declaration_order() {
        let fixture = parse_fixture();
        assert_eq!(
            slots(&fixture.doc, "geometry"),
            vec!["Point", "Shape", "Area", "LIMIT", "Pair", "inner", "extra"]
        );
    }

    #[test]
    fn test_inline_and_file_modules() {
        let fixture = parse_fixture();
        let doc = &fixture.doc;

        let helper = get(doc, "geometry.inner.helper");
        assert_eq!(helper.element_type(), Some(ElementType::Function));
        assert_eq!(helper.parent(), doc.find("geometry.inner"));
        assert_eq!(arguments(helper), serde_json::json!(["count:usize"]));

        let extra = get(doc, "geometry.extra");
        assert_eq!(extra.documentation(), Some("<p>Extra.</p>"));
        assert!(extra.source().unwrap().ends_with("extra.rs"));
        let more = get(doc, "geometry.extra.more");
        assert!(more.source().unwrap().ends_with("extra.rs"));
    }

    #[test]
    fn test_self_including_module_is_skipped() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.rs");
        fs::write(&a, "#[path = \"a.rs\"]\nmod again;\npub fn f() {}\n").unwrap();
        fs::write(temp.path().join("b.rs"), "#[path = \"a.rs\"]\nmod back;\n").unwrap();
        let top = temp.path().join("top.rs");
        fs::write(&top, "#[path = \"b.rs\"]\nmod b;\n").unwrap();

        let mut doc = Documenter::new();
        let mut driver = RustDriver::new(&DriverContext::default());
        driver.parse(&mut doc, a.to_str().unwrap()).unwrap();

        assert_eq!(slots(&doc, "a"), vec!["again", "f"]);
        assert!(slots(&doc, "a.again").is_empty());

        driver.parse(&mut doc, top.to_str().unwrap()).unwrap();
        assert_eq!(slots(&doc, "top.b.back"), vec!["again", "f"]);
        assert!(slots(&doc, "top.b.back.again").is_empty());
    }

    // ===== types =====

    #[test]
    fn test_struct_fields_and_impl_members() {
        let fixture = parse_fixture();
        let doc = &fixture.doc;

        let point = get(doc, "geometry.Point");
        assert_eq!(point.element_type(), Some(ElementType::Class));
        assert!(point.has_tag("struct"));
        assert!(point.has_tag(TAG_PUBLIC));
        assert_eq!(point.documentation(), Some("<p>A point.</p>"));
        assert_eq!(
            slots(doc, "geometry.Point"),
            vec!["x", "y", "new", "norm", "origin", "ZERO", "fmt"]
        );

        let x = get(doc, "geometry.Point.x");
        assert_eq!(x.element_type(), Some(ElementType::Attribute));
        assert_eq!(x.representation(), Some("f64"));
        assert_eq!(x.documentation(), Some("<p>Horizontal.</p>"));
        assert!(x.has_tag(TAG_PUBLIC));
        assert!(!get(doc, "geometry.Point.y").has_tag(TAG_PUBLIC));

        let new = get(doc, "geometry.Point.new");
        assert_eq!(new.element_type(), Some(ElementType::Constructor));
        assert_eq!(new.representation(), Some("fn new(x: f64, y: f64) -> Self"));
        assert_eq!(arguments(new), serde_json::json!(["x:f64", "y:f64"]));

        let norm = get(doc, "geometry.Point.norm");
        assert_eq!(norm.element_type(), Some(ElementType::Method));
        assert_eq!(arguments(norm), serde_json::json!(["&self"]));

        let origin = get(doc, "geometry.Point.origin");
        assert_eq!(origin.element_type(), Some(ElementType::ClassMethod));

        let zero = get(doc, "geometry.Point.ZERO");
        assert_eq!(zero.element_type(), Some(ElementType::ClassAttribute));
        assert!(zero.has_tag("number"));

        let fmt = get(doc, "geometry.Point.fmt");
        assert_eq!(fmt.element_type(), Some(ElementType::Method));
        assert!(fmt.has_tag("trait-impl"));
    }

    #[test]
    fn test_trait_impl_adds_implements_relation() {
        let fixture = parse_fixture();
        let doc = &fixture.doc;
        let point = doc.find("geometry.Point").unwrap();
        let json = serde_json::to_value(sd_model::ElementView::root(doc, point)).unwrap();

        let relations = json["relations"].as_array().unwrap();
        assert!(relations.contains(&serde_json::json!(["implements", "std::fmt::Display"])));
    }

    #[test]
    fn test_enum_variants() {
        let fixture = parse_fixture();
        let doc = &fixture.doc;

        assert!(get(doc, "geometry.Shape").has_tag("enum"));
        let circle = get(doc, "geometry.Shape.Circle");
        assert_eq!(circle.element_type(), Some(ElementType::ClassAttribute));
        assert!(circle.has_tag("variant"));
        assert_eq!(circle.representation(), Some("Circle(f64)"));

        let w = get(doc, "geometry.Shape.Rect.w");
        assert_eq!(w.element_type(), Some(ElementType::Attribute));
    }

    #[test]
    fn test_trait_supertraits_and_methods() {
        let fixture = parse_fixture();
        let doc = &fixture.doc;
        let area = doc.find("geometry.Area").unwrap();
        let json = serde_json::to_value(sd_model::ElementView::root(doc, area)).unwrap();

        assert!(get(doc, "geometry.Area").has_tag("trait"));
        assert_eq!(json["relations"][0], serde_json::json!(["extends", "Clone"]));
        let method = get(doc, "geometry.Area.area");
        assert_eq!(method.element_type(), Some(ElementType::Method));
        assert!(!method.has_tag("provided"));
    }

    // ===== values =====

    #[test]
    fn test_const_and_alias_values() {
        let fixture = parse_fixture();
        let doc = &fixture.doc;

        let limit = get(doc, "geometry.LIMIT");
        assert_eq!(limit.element_type(), Some(ElementType::Value));
        assert!(limit.has_tag("const"));
        assert!(limit.has_tag("number"));
        assert_eq!(limit.representation(), Some("10"));

        let pair = get(doc, "geometry.Pair");
        assert!(pair.has_tag("alias"));
        assert_eq!(pair.representation(), Some("(Point, Point)"));
    }

    #[test]
    fn test_item_ranges_point_at_source() {
        let fixture = parse_fixture();
        let doc = &fixture.doc;
        let text = fs::read_to_string(&fixture.lib).unwrap();

        let range = get(doc, "geometry.LIMIT").range().unwrap();
        assert_eq!(&text[range.start..range.end], "pub const LIMIT: u32 = 10;");
    }

    // ===== failures =====

    #[test]
    fn test_syntax_error_is_recoverable_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.rs");
        fs::write(&path, "fn (").unwrap();

        let mut doc = Documenter::new();
        let err = RustDriver::new(&DriverContext::default())
            .parse(&mut doc, path.to_str().unwrap())
            .unwrap_err();

        assert!(matches!(err, DriverError::Parse { .. }));
        assert!(!err.is_fatal());
        assert!(doc.elements().is_empty());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let mut doc = Documenter::new();
        let err = RustDriver::new(&DriverContext::default())
            .parse(&mut doc, "no/such/file.rs")
            .unwrap_err();
        assert!(matches!(err, DriverError::NotFound { .. }));
    }

    #[test]
    fn test_duplicate_methods_get_suffixed_ids() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dup.rs");
        fs::write(
            &path,
            "struct S;\nimpl S { fn run(&self) {} }\nimpl S { fn run(&self) {} }\n",
        )
        .unwrap();

        let mut doc = Documenter::new();
        RustDriver::new(&DriverContext::default())
            .parse(&mut doc, path.to_str().unwrap())
            .unwrap();

        assert!(doc.find("dup.S.run").is_some());
        assert!(doc.find("dup.S.run~2").is_some());
    }
}
