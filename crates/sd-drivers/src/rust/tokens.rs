//! Compact, human-readable rendering of token streams.
//!
//! `TokenStream`'s own `Display` separates every token with a space
//! (`Vec < u8 >`). Signatures and types shown in the documentation are
//! re-spaced the way rustfmt would lay them out on one line.

use proc_macro2::{Delimiter, Spacing, TokenStream, TokenTree};
use quote::ToTokens;

/// Render `node` as compact source text.
pub(crate) fn compact(node: &impl ToTokens) -> String {
    let mut pieces = Vec::new();
    flatten(node.to_token_stream(), &mut pieces);

    let mut out = String::new();
    let mut prev: Option<&str> = None;
    for piece in &pieces {
        if let Some(prev) = prev
            && needs_space(prev, piece)
        {
            out.push(' ');
        }
        out.push_str(piece);
        prev = Some(piece.as_str());
    }
    out
}

/// Split a stream into pieces, gluing joint punctuation (`->`, `::`) and
/// lifetimes (`'a`) into single pieces.
fn flatten(stream: TokenStream, pieces: &mut Vec<String>) {
    let mut glue = false;
    for tree in stream {
        match tree {
            TokenTree::Group(group) => {
                let (open, close) = match group.delimiter() {
                    Delimiter::Parenthesis => ("(", ")"),
                    Delimiter::Bracket => ("[", "]"),
                    Delimiter::Brace => ("{", "}"),
                    Delimiter::None => ("", ""),
                };
                if !open.is_empty() {
                    pieces.push(open.to_owned());
                }
                flatten(group.stream(), pieces);
                if !close.is_empty() {
                    pieces.push(close.to_owned());
                }
                glue = false;
            }
            TokenTree::Punct(punct) => {
                match pieces.last_mut() {
                    Some(last) if glue => last.push(punct.as_char()),
                    _ => pieces.push(punct.as_char().to_string()),
                }
                glue = punct.spacing() == Spacing::Joint;
            }
            TokenTree::Ident(ident) => {
                match pieces.last_mut() {
                    Some(last) if glue && last.as_str() == "'" => last.push_str(&ident.to_string()),
                    _ => pieces.push(ident.to_string()),
                }
                glue = false;
            }
            TokenTree::Literal(literal) => {
                pieces.push(literal.to_string());
                glue = false;
            }
        }
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '"' | '\'')
}

fn ends_word(s: &str) -> bool {
    s.chars().next_back().is_some_and(is_word)
}

fn needs_space(prev: &str, next: &str) -> bool {
    if matches!(next, "," | ";" | ")" | "]" | ":" | "::" | "?" | "." | ">") {
        return false;
    }
    if matches!(prev, "(" | "[" | "<" | "&" | "::" | "#" | "!" | "?" | "." | "'") {
        return false;
    }
    if next == "<" {
        return !ends_word(prev);
    }
    if matches!(next, "(" | "[") {
        let keyword = matches!(prev, "mut" | "dyn" | "impl" | "const" | "as" | "in" | "where");
        return keyword || !(ends_word(prev) || matches!(prev, ")" | "]" | ">"));
    }
    true
}
