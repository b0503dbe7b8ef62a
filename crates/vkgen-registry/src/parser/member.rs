//! Shared grammar of struct members and command parameters.
//!
//! Mixed content, in order:
//!
//! ```text
//! [const | struct | const struct] <type>T</type> [* | ** | * const*] <name>N</name> [array]
//! ```
//!
//! where the array extent is either written inline (`<name>N[4]</name>`),
//! as trailing text (`[4]`), or as `[` `<enum>VK_UUID_SIZE</enum>` `]`.

use crate::model::Member;
use regex::Regex;
use roxmltree::Node;
use std::sync::LazyLock;

const QUALIFIERS: &[&str] = &["const", "struct", "const struct"];

static RE_POINTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*(\s*const\s*\*|\*)?$").unwrap());
static RE_INLINE_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\[(\w+)\]$").unwrap());
static RE_ARRAY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[(\w+)\]$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    /// `(tag, text)`
    Element(&'a str, &'a str),
}

fn tokens<'a>(node: Node<'a, '_>) -> Vec<Token<'a>> {
    node.children()
        .filter_map(|child| {
            if child.is_text() {
                child.text().map(str::trim).filter(|t| !t.is_empty()).map(Token::Text)
            } else if child.is_element() && !child.has_tag_name("comment") {
                Some(Token::Element(
                    child.tag_name().name(),
                    child.text().unwrap_or("").trim(),
                ))
            } else {
                None
            }
        })
        .collect()
}

/// Parse one `<member>` or `<param>` element. Errors carry only the reason;
/// the caller knows which entity is being read.
pub(crate) fn read_member(node: Node, type_prefix: &str) -> Result<Member, String> {
    let tokens = tokens(node);
    let mut pos = 0;

    let qualifier = match tokens.get(pos) {
        Some(Token::Text(t)) if QUALIFIERS.contains(t) => {
            pos += 1;
            Some(*t)
        }
        Some(Token::Text(t)) => return Err(format!("unexpected `{}` before <type>", t)),
        _ => None,
    };

    let type_text = match tokens.get(pos) {
        Some(Token::Element("type", t)) if !t.is_empty() => {
            pos += 1;
            *t
        }
        _ => return Err("expected a <type> element".to_string()),
    };

    let pointer = match tokens.get(pos) {
        Some(Token::Text(t)) if RE_POINTER.is_match(t) => {
            pos += 1;
            Some(*t)
        }
        Some(Token::Text(t)) => return Err(format!("unexpected `{}` after <type>", t)),
        _ => None,
    };

    let name_text = match tokens.get(pos) {
        Some(Token::Element("name", t)) if !t.is_empty() => {
            pos += 1;
            *t
        }
        _ => return Err("expected a <name> element".to_string()),
    };

    let (name, mut array_size) = match RE_INLINE_ARRAY.captures(name_text) {
        Some(caps) => (caps[1].to_string(), Some(caps[2].to_string())),
        None => (name_text.to_string(), None),
    };

    match &tokens[pos..] {
        [] => {}
        [Token::Text(t)] if array_size.is_none() => match RE_ARRAY_SUFFIX.captures(t) {
            Some(caps) => array_size = Some(caps[1].to_string()),
            None => return Err(format!("unexpected `{}` after <name>", t)),
        },
        [Token::Text("["), Token::Element("enum", size), Token::Text("]")]
            if array_size.is_none() && !size.is_empty() =>
        {
            array_size = Some(size.to_string())
        }
        _ => return Err(format!("unexpected content after <name>{}</name>", name)),
    }

    let pure_type = type_text.strip_prefix(type_prefix).unwrap_or(type_text);
    let mut raw_type = String::new();
    if let Some(q) = qualifier {
        raw_type.push_str(q);
        raw_type.push(' ');
    }
    raw_type.push_str(pure_type);
    if let Some(p) = pointer {
        raw_type.push_str(p);
    }

    Ok(Member {
        raw_type,
        pure_type: pure_type.to_string(),
        name,
        array_size,
        length_expr: node.attribute("len").map(str::to_string),
        optional: node
            .attribute("optional")
            .and_then(|o| o.split(',').next())
            == Some("true"),
    })
}
