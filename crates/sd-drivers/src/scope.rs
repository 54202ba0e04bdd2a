//! Scope-path identity derivation.

use sd_model::Documenter;

/// Stack of enclosing scope names, outermost first.
///
/// Ids are the dotted path of the stack plus the local name, so the same
/// entity always derives the same id and equal local names under different
/// scopes never collide.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    segments: Vec<String>,
}

impl ScopeStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack rooted at an already-derived id such as `pkg.module`.
    #[must_use]
    pub fn rooted(id: &str) -> Self {
        Self {
            segments: id.split('.').map(str::to_owned).collect(),
        }
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Id of the innermost scope, `None` at the top level.
    #[must_use]
    pub fn current_id(&self) -> Option<String> {
        (!self.segments.is_empty()).then(|| self.segments.join("."))
    }

    /// Id of `name` inside the current scope.
    #[must_use]
    pub fn derive_id(&self, name: &str) -> String {
        match self.current_id() {
            Some(scope) => format!("{scope}.{name}"),
            None => name.to_owned(),
        }
    }

    /// Derive the id of a new entity, suffixing `~2`, `~3`, ... when the
    /// documenter already holds an element with that id.
    #[must_use]
    pub fn claim_id(&self, documenter: &Documenter, name: &str) -> String {
        unique_id(documenter, self.derive_id(name))
    }
}

/// `candidate`, or the first free `candidate~N` with `N >= 2`.
#[must_use]
pub fn unique_id(documenter: &Documenter, candidate: String) -> String {
    if documenter.find(&candidate).is_none() {
        return candidate;
    }
    let mut n = 2;
    loop {
        let id = format!("{candidate}~{n}");
        if documenter.find(&id).is_none() {
            return id;
        }
        n += 1;
    }
}
