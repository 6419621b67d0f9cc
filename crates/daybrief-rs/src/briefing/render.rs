//! Mustache-subset template renderer — the core of the briefing pipeline.
//!
//! [`render`] is a pure function from (template, [`Context`]) to the output
//! string. The grammar is the subset the briefing template actually uses:
//!
//! - `{{NAME}}` — variable interpolation
//! - `{{#NAME}} body {{/NAME}}` — conditional section (truthy scalar) or
//!   iteration (sequence value, body rendered once per item)
//! - `{{^NAME}} body {{/NAME}}` — inverted section (shown when falsy)
//!
//! Rendering applies three ordered passes over the whole input — inverted
//! sections, then conditional/iteration sections, then variables — each pass
//! recursing into section bodies. Section tags must resolve before variable
//! scanning so a variable nested in a section body interpolates exactly once,
//! against the correct (possibly per-item) scope. The engine is an explicit
//! scan over tag boundaries, not a regex substitution, so unclosed and
//! mismatched tags surface as [`TemplateError`] instead of leaking raw tag
//! text into the output.

// Every slice offset below comes from `find()` on ASCII tag delimiters, so
// all cuts sit on char boundaries.
#![allow(clippy::string_slice)]

use thiserror::Error;

use super::context::Context;

/// Malformed-template conditions. Fatal for the render call that hits them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A `{{#NAME}}` or `{{^NAME}}` with no matching `{{/NAME}}` in its span.
    #[error("template section '{name}' is never closed")]
    UnclosedSection { name: String },
    /// A section tag left over after section expansion — a close tag with no
    /// matching open, or a sigil tag that could not pair up.
    #[error("stray section tag '{tag}' in template")]
    StraySectionTag { tag: String },
}

/// Render `template` against `ctx`.
///
/// Deterministic and total over well-formed templates: same inputs produce
/// the identical output string, nothing is mutated, and no I/O occurs. A
/// lookup miss in any tag kind behaves as falsy/empty rather than an error —
/// the template data never distinguishes "absent" from "present but empty".
pub fn render(template: &str, ctx: &Context) -> Result<String, TemplateError> {
    let expanded = expand_sections(template, '^', ctx)?;
    let expanded = expand_sections(&expanded, '#', ctx)?;
    interpolate(&expanded, ctx)
}

/// One matched `{{<sigil>NAME}} body {{/NAME}}` span, split into parts.
struct Section<'a> {
    /// Literal text before the opening tag.
    prefix: &'a str,
    name: &'a str,
    body: &'a str,
    /// Everything after the closing tag.
    rest: &'a str,
}

/// Locate the next section span for `sigil` in `input`.
///
/// The body is matched non-greedily: it ends at the first `{{/NAME}}` after
/// the opening tag. Returns `Ok(None)` when no further opening tag exists.
fn next_section(input: &str, sigil: char) -> Result<Option<Section<'_>>, TemplateError> {
    let open_marker = match sigil {
        '^' => "{{^",
        _ => "{{#",
    };
    let Some(open) = input.find(open_marker) else {
        return Ok(None);
    };
    let name_start = open + open_marker.len();
    let Some(name_len) = input[name_start..].find("}}") else {
        // A sigil with no closing `}}` is not a tag at all; leave it alone.
        return Ok(None);
    };
    let name = &input[name_start..name_start + name_len];
    let body_start = name_start + name_len + 2;
    let close_tag = format!("{{{{/{name}}}}}");
    let Some(body_len) = input[body_start..].find(close_tag.as_str()) else {
        return Err(TemplateError::UnclosedSection {
            name: name.to_string(),
        });
    };
    Ok(Some(Section {
        prefix: &input[..open],
        name,
        body: &input[body_start..body_start + body_len],
        rest: &input[body_start + body_len + close_tag.len()..],
    }))
}

/// Expand every section tagged with `sigil` in `input`, left to right.
///
/// Each matched body is rendered with a full recursive [`render`] call on a
/// strictly smaller string, which is what makes nesting (and re-entrant
/// section names at different depths) resolve independently.
fn expand_sections(input: &str, sigil: char, ctx: &Context) -> Result<String, TemplateError> {
    use super::context::Value;

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(section) = next_section(rest, sigil)? {
        out.push_str(section.prefix);
        if sigil == '^' {
            // Inverted: body shows when the lookup is falsy, and always
            // against the unchanged outer context — inverted sections never
            // introduce bindings.
            if !ctx.is_truthy(section.name) {
                out.push_str(&render(section.body, ctx)?);
            }
        } else {
            match ctx.get(section.name) {
                Some(Value::List(items)) => {
                    // Iteration: once per element, each against that
                    // element's own context only. Outer fields are not
                    // visible inside the body.
                    for item in items {
                        out.push_str(&render(section.body, item)?);
                    }
                }
                Some(value) if value.is_truthy() => {
                    out.push_str(&render(section.body, ctx)?);
                }
                _ => {}
            }
        }
        rest = section.rest;
    }
    out.push_str(rest);
    Ok(out)
}

/// Substitute every `{{NAME}}` variable tag in `input`.
///
/// Runs after both section passes, so any section sigil still present here
/// is malformed. A lookup miss substitutes the empty string.
fn interpolate(input: &str, ctx: &Context) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(name_len) = after.find("}}") else {
            // A dangling `{{` with no brace pair to close it is literal text.
            out.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let name = &after[..name_len];
        if name.starts_with('#') || name.starts_with('^') || name.starts_with('/') {
            return Err(TemplateError::StraySectionTag {
                tag: name.to_string(),
            });
        }
        if let Some(value) = ctx.get(name) {
            out.push_str(&value.display());
        }
        rest = &after[name_len + 2..];
    }
    out.push_str(rest);
    Ok(out)
}
