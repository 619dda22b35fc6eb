use serde::{Deserialize, Serialize};

/// A menu item. `section` is free text matched against the owning
/// category's declared sections at display time only.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub restaurant_id: String,
    pub category_id: String,
    pub name_ar: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub description_ar: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub display_order: i32,
}

impl Product {
    /// Section name, treating null and empty as "no section".
    /// Names are kept verbatim, whitespace included.
    pub fn section_name(&self) -> Option<&str> {
        self.section.as_deref().filter(|s| !s.is_empty())
    }

    /// Case-insensitive match against the Arabic name, English name
    /// and Arabic description.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let contains = |s: &str| s.to_lowercase().contains(&query);
        contains(&self.name_ar)
            || self.name_en.as_deref().is_some_and(contains)
            || self.description_ar.as_deref().is_some_and(contains)
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name_ar: &str, name_en: Option<&str>, section: Option<&str>) -> Product {
        Product {
            id: "p-1".to_string(),
            category_id: "c-1".to_string(),
            name_ar: name_ar.to_string(),
            name_en: name_en.map(String::from),
            section: section.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_section_name_treats_empty_as_none() {
        assert_eq!(product("x", None, Some("Mains")).section_name(), Some("Mains"));
        assert_eq!(product("x", None, Some("Mains ")).section_name(), Some("Mains "));
        assert_eq!(product("x", None, Some("")).section_name(), None);
        assert_eq!(product("x", None, None).section_name(), None);
    }

    #[test]
    fn test_matches_search() {
        let mut p = product("شاي بالنعناع", Some("Mint Tea"), None);
        p.description_ar = Some("ساخن".to_string());

        assert!(p.matches_search("mint"));
        assert!(p.matches_search("TEA"));
        assert!(p.matches_search("نعناع"));
        assert!(p.matches_search("ساخن"));
        assert!(p.matches_search(""));
        assert!(!p.matches_search("coffee"));
    }

    #[test]
    fn test_defaults_on_sparse_rows() {
        let p: Product =
            serde_json::from_str(r#"{"id":"p-1","category_id":"c-1","name_ar":"x","price":12.5}"#)
                .unwrap();
        assert!(p.is_available);
        assert!(!p.is_featured);
        assert_eq!(p.price, 12.5);
    }
}
