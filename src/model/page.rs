use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

impl Rendered {
    pub fn new(text: &str) -> Self {
        Rendered {
            rendered: text.to_string(),
        }
    }
}

/// WordPress page, passed through as the CMS serves it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Page {
    pub id: u64,
    pub slug: String,
    pub title: Rendered,
    pub content: Rendered,
    pub excerpt: Rendered,
    pub status: String,
    pub link: String,
    pub date: String,
}

/// Footer links used when the CMS has no pages to offer.
pub fn default_pages() -> Vec<Page> {
    [
        (1, "over-ons", "Over Ons"),
        (2, "contact", "Contact"),
        (3, "privacy-policy", "Privacybeleid"),
        (4, "algemene-voorwaarden", "Algemene Voorwaarden"),
        (5, "veelgestelde-vragen", "Veelgestelde Vragen"),
        (6, "blog", "Blog"),
    ]
    .into_iter()
    .map(|(id, slug, title)| Page {
        id,
        slug: slug.to_string(),
        title: Rendered::new(title),
        ..Page::default()
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let page: Page = serde_json::from_str(r#"{"id": 7, "slug": "over-ons",
            "title": {"rendered": "Over Ons"}, "guid": {"rendered": "x"}}"#)
        .unwrap();
        assert_eq!(page.id, 7);
        assert_eq!(page.title.rendered, "Over Ons");
        assert_eq!(page.content.rendered, "");
        assert_eq!(page.status, "");
    }
}
