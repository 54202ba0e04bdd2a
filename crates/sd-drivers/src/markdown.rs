//! Markup-based driver for Markdown documents.
//!
//! A file becomes one `document` element whose documentation is the text
//! before the first heading. Every heading opens a `section` nested under the
//! closest preceding heading of a lower level. Sections are linked with
//! `next`/`previous` relations in document order.

use std::ops::Range;
use std::path::PathBuf;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use sd_markup::{Markup, slugify};
use sd_model::{Documenter, ElementAttrs, ElementRef, ElementType, SourceRange, verbs};

use crate::driver::{Driver, DriverContext, record_source};
use crate::error::DriverError;
use crate::resolve::{file_stem, read_source, resolve};
use crate::scope::ScopeStack;

/// Driver name.
pub const NAME: &str = "markdown";

/// Tag of document elements produced by this driver.
pub const TAG_MARKDOWN: &str = "markdown";

/// Driver for `*.md` and `*.markdown` files.
pub struct MarkdownDriver {
    search_paths: Vec<PathBuf>,
}

impl MarkdownDriver {
    #[must_use]
    pub fn new(context: &DriverContext) -> Self {
        Self {
            search_paths: context.search_paths.clone(),
        }
    }
}

/// A heading found in the source.
#[derive(Debug)]
struct Heading {
    level: u8,
    title: String,
    /// Byte range of the heading itself.
    span: Range<usize>,
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: pulldown_cmark::HeadingLevel) -> u8 {
    use pulldown_cmark::HeadingLevel;
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn headings(text: &str) -> Vec<Heading> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut result = Vec::new();
    let mut current: Option<Heading> = None;

    for (event, range) in Parser::new_ext(text, options).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some(Heading {
                    level: heading_level_to_num(level),
                    title: String::new(),
                    span: range,
                });
            }
            Event::Text(s) | Event::Code(s) => {
                if let Some(heading) = current.as_mut() {
                    heading.title.push_str(&s);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(mut heading) = current.take() {
                    heading.title = heading.title.trim().to_owned();
                    result.push(heading);
                }
            }
            _ => {}
        }
    }
    result
}

fn render_body(body: &str) -> Option<String> {
    (!body.trim().is_empty()).then(|| Markup::Markdown.render(body))
}

impl Driver for MarkdownDriver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn parse(&mut self, documenter: &mut Documenter, identifier: &str) -> Result<(), DriverError> {
        let path = resolve(identifier, &[PathBuf::from(identifier)], &self.search_paths)?;
        let name = file_stem(&path)
            .ok_or_else(|| DriverError::parse(identifier, "path has no file name"))?;
        let text = read_source(&path)?;
        let source = path.display().to_string();
        let headings = headings(&text);
        tracing::debug!(identifier = %identifier, sections = headings.len(), "Parsed Markdown document");

        let preamble_end = headings.first().map_or(text.len(), |h| h.span.start);
        let document = documenter.create_element(
            ElementAttrs::new()
                .id(ScopeStack::new().claim_id(documenter, &name))
                .name(name)
                .element_type(ElementType::Document)
                .tag(TAG_MARKDOWN)
                .documentation(render_body(&text[..preamble_end])),
        );
        record_source(documenter, document, &source, SourceRange::new(0, text.len()));

        let mut open: Vec<(u8, ElementRef)> = Vec::new();
        let mut previous: Option<ElementRef> = None;
        for (index, heading) in headings.iter().enumerate() {
            while open.last().is_some_and(|(level, _)| *level >= heading.level) {
                open.pop();
            }
            let owner = open.last().map_or(document, |(_, handle)| *handle);

            let rest = &headings[index + 1..];
            let body_end = rest.first().map_or(text.len(), |h| h.span.start);
            let end = rest
                .iter()
                .find(|h| h.level <= heading.level)
                .map_or(text.len(), |h| h.span.start);

            let slug = match slugify(&heading.title) {
                s if s.is_empty() => "section".to_owned(),
                s => s,
            };
            let scope = ScopeStack::rooted(documenter.element(owner).id().unwrap_or_default());
            let section = documenter.create_element(
                ElementAttrs::new()
                    .id(scope.claim_id(documenter, &slug))
                    .name(heading.title.clone())
                    .element_type(ElementType::Section)
                    .parent(owner)
                    .documentation(render_body(&text[heading.span.end..body_end])),
            );
            record_source(documenter, section, &source, SourceRange::new(heading.span.start, end));
            documenter
                .element_mut(owner)
                .set_slot(heading.title.as_str(), section);

            if let Some(previous) = previous {
                documenter
                    .element_mut(previous)
                    .add_relation(verbs::NEXT, [section]);
                documenter
                    .element_mut(section)
                    .add_relation(verbs::PREVIOUS, [previous]);
            }
            previous = Some(section);
            open.push((heading.level, section));
        }

        documenter.add_element(document);
        Ok(())
    }
}
