//! GitHub-flavored markdown anchors for entity headings.

/// Link to the heading of an entity.
pub fn render_toc_link(name: &str) -> String {
    format!("[{}](#{})", name, github_slug(name))
}

/// Generate a TOC list item.
pub fn render_toc_item(name: &str) -> String {
    format!("* {}", render_toc_link(name))
}

/// GitHub heading anchor slug generation.
///
/// - lowercase
/// - drop everything that isn't alphanumeric, space or hyphen
/// - replace spaces with hyphens
fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_camel_case() {
        assert_eq!(github_slug("createInstance"), "createinstance");
        assert_eq!(github_slug("SurfaceCapabilitiesKHR"), "surfacecapabilitieskhr");
    }

    #[test]
    fn slug_drops_underscores() {
        assert_eq!(github_slug("PFN_vkVoidFunction"), "pfnvkvoidfunction");
        assert_eq!(github_slug("uint32_t"), "uint32t");
    }

    #[test]
    fn slug_with_spaces() {
        assert_eq!(github_slug("API Constants"), "api-constants");
    }

    #[test]
    fn toc_item() {
        assert_eq!(render_toc_item("Instance"), "* [Instance](#instance)");
    }
}
