//! Resume document model.
//!
//! One `Resume` is the complete data for a single resume. The struct is the
//! schema; the only behavior here is `normalize`, which every document loaded
//! from outside the process (local slot file, remote store payload) passes
//! through before it may enter the collection.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Title of last resort when neither `displayTitle` nor `headerName` is set.
pub const FALLBACK_TITLE: &str = "Untitled Resume";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub location: String,
    pub phone: String,
    pub email: String,
    pub linkedin_url: String,
}

/// One position in the experience section. Entry order is display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageEntry {
    pub language: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicationEntry {
    pub title: String,
    pub url: String,
}

/// One resume. `id` is assigned at creation and never changes; it is the join
/// key across the local slot and the remote mirror. Skill groups keep their
/// insertion order; category order is display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: Uuid,
    pub display_title: String,
    pub header_name: String,
    pub header_role: String,
    pub contact: Contact,
    pub summary: String,
    pub experience_entries: Vec<ExperienceEntry>,
    pub education_entries: Vec<EducationEntry>,
    pub skill_groups: IndexMap<String, Vec<String>>,
    pub languages: Vec<LanguageEntry>,
    pub certifications: Vec<String>,
    pub publications: Vec<PublicationEntry>,
    pub last_modified_at: DateTime<Utc>,
}

impl Resume {
    /// The blank template: every field empty, a fresh identity, stamped now.
    pub fn blank() -> Self {
        Resume {
            id: Uuid::new_v4(),
            display_title: String::new(),
            header_name: String::new(),
            header_role: String::new(),
            contact: Contact::default(),
            summary: String::new(),
            experience_entries: Vec::new(),
            education_entries: Vec::new(),
            skill_groups: IndexMap::new(),
            languages: Vec::new(),
            certifications: Vec::new(),
            publications: Vec::new(),
            last_modified_at: Utc::now(),
        }
    }
}

/// Builds a well-formed `Resume` out of untrusted JSON.
///
/// Each top-level field is decoded on its own: a missing or wrong-typed field
/// falls back to the template's value instead of failing the whole document,
/// so documents written by older schema versions gain the fields they lack.
/// A missing or invalid `id` gets a fresh one, never the template's. The
/// display title is guaranteed non-empty afterwards: it falls back to the
/// header name, then to [`FALLBACK_TITLE`].
pub fn normalize(raw: &Value, template: &Resume) -> Resume {
    let empty = Map::new();
    let map = raw.as_object().unwrap_or(&empty);

    let mut doc = Resume {
        id: field(map, "id").unwrap_or_else(Uuid::new_v4),
        display_title: field(map, "displayTitle")
            .unwrap_or_else(|| template.display_title.clone()),
        header_name: field(map, "headerName").unwrap_or_else(|| template.header_name.clone()),
        header_role: field(map, "headerRole").unwrap_or_else(|| template.header_role.clone()),
        contact: field(map, "contact").unwrap_or_else(|| template.contact.clone()),
        summary: field(map, "summary").unwrap_or_else(|| template.summary.clone()),
        experience_entries: field(map, "experienceEntries")
            .unwrap_or_else(|| template.experience_entries.clone()),
        education_entries: field(map, "educationEntries")
            .unwrap_or_else(|| template.education_entries.clone()),
        skill_groups: field(map, "skillGroups").unwrap_or_else(|| template.skill_groups.clone()),
        languages: field(map, "languages").unwrap_or_else(|| template.languages.clone()),
        certifications: field(map, "certifications")
            .unwrap_or_else(|| template.certifications.clone()),
        publications: field(map, "publications").unwrap_or_else(|| template.publications.clone()),
        last_modified_at: field(map, "lastModifiedAt").unwrap_or(template.last_modified_at),
    };

    if doc.display_title.is_empty() {
        doc.display_title = if doc.header_name.is_empty() {
            FALLBACK_TITLE.to_string()
        } else {
            doc.header_name.clone()
        };
    }
    doc
}

fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    map.get(key)
        .cloned()
        .and_then(|value| serde_json::from_value(value).ok())
}
