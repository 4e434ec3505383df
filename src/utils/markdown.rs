use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{Entity, EntityKind};
use crate::utils::text::{clamp_range, from_units, push_str, splice, to_units, utf16_len};

static MARKDOWN_LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!?\[([^\]]*)\]\([^)]+\)").expect("Failed to compile markdown link regex")
});

/// How far around a position the link check looks, in UTF-16 code units.
/// URLs longer than this can be missed.
pub const LINK_CONTEXT_RADIUS: usize = 100;

/// Renders Telegram formatting entities into Markdown.
///
/// Entities are applied right to left by descending offset, so splicing markup
/// for one entity never moves the start of an entity still waiting. Ties keep
/// their input order. Each entity slices the partially rendered text, and
/// out-of-range offsets are clamped to the text bounds.
///
/// Link entities are skipped when they start inside the URL of a Markdown link
/// already present in the text, or when they overlap a link rendered earlier
/// in this pass.
pub fn format_entities(text: &str, entities: Option<&[Entity]>) -> String {
    let entities = match entities {
        Some(entities) if !entities.is_empty() => entities,
        _ => return text.to_string(),
    };

    let mut ordered: Vec<&Entity> = entities.iter().collect();
    ordered.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut result = to_units(text);
    let mut rendered_links: Vec<usize> = Vec::new();

    for entity in ordered {
        let (start, end) = clamp_range(entity.offset, entity.length, result.len());

        if entity.kind.is_link() {
            if url_portion_contains(start, &result) {
                debug!(offset = start, "Link entity already inside markdown link, skipping");
                continue;
            }
            if overlaps_rendered_link(start, end, &rendered_links) {
                debug!(offset = start, "Link entity overlaps rendered link, skipping");
                continue;
            }
        }

        let Some(markup) = render_entity(&entity.kind, &result[start..end]) else {
            continue;
        };

        result = splice(&result, start, end, &markup);

        if entity.kind.is_link() {
            rendered_links.push(start);
        }
    }

    from_units(&result)
}

fn overlaps_rendered_link(start: usize, end: usize, rendered_links: &[usize]) -> bool {
    rendered_links
        .iter()
        .any(|&link_start| start == link_start || (start < link_start && end > link_start))
}

fn render_entity(kind: &EntityKind, segment: &[u16]) -> Option<Vec<u16>> {
    let mut out = Vec::with_capacity(segment.len() * 2 + 8);

    match kind {
        EntityKind::Bold => wrap(&mut out, "**", segment, "**"),
        EntityKind::Strikethrough => wrap(&mut out, "~~", segment, "~~"),
        EntityKind::Code => wrap(&mut out, "`", segment, "`"),
        EntityKind::Blockquote => wrap(&mut out, "> ", segment, ""),
        EntityKind::TextUrl { url } => {
            wrap(&mut out, "[", segment, "](");
            push_str(&mut out, url);
            push_str(&mut out, ")");
        }
        EntityKind::Url => {
            wrap(&mut out, "[", segment, "](");
            out.extend_from_slice(segment);
            push_str(&mut out, ")");
        }
        EntityKind::Pre { language } => {
            push_str(&mut out, "```");
            push_str(&mut out, language);
            wrap(&mut out, "\n", segment, "\n```");
        }
        // Markdown has no underline.
        EntityKind::Underline => return None,
    }

    Some(out)
}

fn wrap(out: &mut Vec<u16>, prefix: &str, segment: &[u16], suffix: &str) {
    push_str(out, prefix);
    out.extend_from_slice(segment);
    push_str(out, suffix);
}

/// Reports whether `position` (a UTF-16 offset into `text`) falls in the URL
/// part of a Markdown link or image, e.g. anywhere in `http://x.io` for
/// `[docs](http://x.io)`. Positions inside the link text are not reported.
///
/// Only [`LINK_CONTEXT_RADIUS`] code units on either side of `position` are
/// scanned.
pub fn is_inside_markdown_link(position: usize, text: &str) -> bool {
    url_portion_contains(position, &to_units(text))
}

fn url_portion_contains(position: usize, units: &[u16]) -> bool {
    let context_start = position.saturating_sub(LINK_CONTEXT_RADIUS);
    let context_end = position.saturating_add(LINK_CONTEXT_RADIUS).min(units.len());
    if context_start >= context_end {
        return false;
    }

    // Lone surrogates at the window edges decode to U+FFFD, which is still one
    // code unit, so offsets measured on `context` line up with `units`.
    let context = from_units(&units[context_start..context_end]);
    let relative = position - context_start;

    for captures in MARKDOWN_LINK_REGEX.captures_iter(&context) {
        let Some(whole) = captures.get(0) else {
            continue;
        };

        let match_start = utf16_len(&context[..whole.start()]);
        let match_end = match_start + utf16_len(whole.as_str());
        let label_len = captures.get(1).map_or(0, |label| utf16_len(label.as_str()));
        let text_part_end = match_start + 2 + label_len;

        if relative >= match_start && relative <= match_end && relative > text_part_end {
            return true;
        }
    }

    false
}
