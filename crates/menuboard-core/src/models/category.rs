use serde::{Deserialize, Deserializer, Serialize};

/// A menu category with its ordered list of declared sections.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub restaurant_id: String,
    pub name_ar: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub description_ar: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Section names in display order. Older rows store `{ "name": ... }`
    /// objects instead of plain strings.
    #[serde(default, deserialize_with = "deserialize_sections")]
    pub sections: Vec<String>,
}

impl Category {
    pub fn display_name(&self) -> &str {
        &self.name_ar
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s == name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SectionEntry {
    Name(String),
    Named { name: String },
}

impl SectionEntry {
    fn into_name(self) -> String {
        match self {
            SectionEntry::Name(name) | SectionEntry::Named { name } => name,
        }
    }
}

fn deserialize_sections<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<Vec<SectionEntry>> = Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(SectionEntry::into_name)
        .filter(|name| !name.trim().is_empty())
        .collect())
}

fn default_true() -> bool {
    true
}
