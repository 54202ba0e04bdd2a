//! Static outline of the top-level elements, shown when scripts are off.

use std::fmt::Write;

use sd_markup::escape_html;
use sd_model::{Documenter, ElementRef, ElementType};

/// Levels of nesting listed under each top-level element.
const OUTLINE_DEPTH: usize = 2;

/// Anchor of an element, shared with the client library.
pub(crate) fn anchor(id: &str) -> String {
    let safe: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '~' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("sd-{safe}")
}

fn rank(documenter: &Documenter, handle: ElementRef) -> usize {
    documenter
        .element(handle)
        .element_type()
        .map_or(ElementType::ALL.len(), ElementType::group_rank)
}

/// Render the outline as nested lists grouped by element type.
pub(crate) fn render(documenter: &Documenter) -> String {
    let mut roots: Vec<(&str, ElementRef)> = documenter
        .elements()
        .iter()
        .map(|&h| (documenter.element(h).label().unwrap_or_default(), h))
        .collect();
    roots.sort_by_key(|&(label, handle)| (rank(documenter, handle), label));

    let mut html = String::from("<div class=\"sd-outline\">\n");
    let mut current: Option<Option<ElementType>> = None;
    for (label, handle) in roots {
        let element_type = documenter.element(handle).element_type();
        if current != Some(element_type) {
            if current.is_some() {
                html.push_str("</ul>\n");
            }
            let heading = element_type.map_or("Other", ElementType::display_name);
            let _ = writeln!(html, "<h2>{}</h2>\n<ul>", escape_html(heading));
            current = Some(element_type);
        }
        render_item(&mut html, documenter, label, handle, 1);
    }
    if current.is_some() {
        html.push_str("</ul>\n");
    }
    html.push_str("</div>");
    html
}

fn render_item(html: &mut String, documenter: &Documenter, label: &str, handle: ElementRef, depth: usize) {
    let element = documenter.element(handle);
    let type_name = element.element_type().map_or("", ElementType::as_str);
    match element.id() {
        Some(id) => {
            let _ = write!(
                html,
                "<li><a href=\"#{}\">{}</a> <span class=\"sd-type\">{}</span>",
                escape_html(&anchor(id)),
                escape_html(label),
                type_name,
            );
        }
        None => {
            let _ = write!(
                html,
                "<li>{} <span class=\"sd-type\">{}</span>",
                escape_html(label),
                type_name,
            );
        }
    }

    if depth < OUTLINE_DEPTH && !element.children().is_empty() {
        html.push_str("\n<ul>\n");
        for (slot, child) in documenter.grouped_children(handle) {
            let child_label = documenter.element(child).label().unwrap_or(slot);
            render_item(html, documenter, child_label, child, depth + 1);
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</li>\n");
}
