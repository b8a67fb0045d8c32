use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::core::ShelfError;

/// Field names accepted by [`Metadata::set`], in package order
pub const METADATA_FIELDS: [&str; 10] = [
    "title",
    "lang",
    "ident",
    "subject",
    "description",
    "relation",
    "creator",
    "publisher",
    "date",
    "rights",
];

pub const SUBJECT_SEPARATOR: &str = ", ";
pub const DEFAULT_LANGUAGE: &str = "en";

/// W3CDTF profile used for `dc:date`
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

/// Dublin Core fields of the package; every one of them may be missing
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub lang: Option<String>,
    pub ident: Option<String>,
    pub subject: Vec<String>,
    pub description: Option<String>,
    pub relation: Option<String>,
    pub creator: Option<String>,
    pub publisher: Option<String>,
    pub date: Option<String>,
    pub rights: Option<String>,
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl Metadata {
    /// Sets a field by name, replacing whatever the crawl gathered
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), ShelfError> {
        match field {
            "title" => self.title = non_empty(value),
            "lang" => self.lang = non_empty(value),
            "ident" => self.ident = non_empty(value),
            "subject" => {
                self.subject = value.split(',').filter_map(non_empty).collect();
            }
            "description" => self.description = non_empty(value),
            "relation" => self.relation = non_empty(value),
            "creator" => self.creator = non_empty(value),
            "publisher" => self.publisher = non_empty(value),
            "date" => self.date = non_empty(value),
            "rights" => self.rights = non_empty(value),
            _ => {
                return Err(ShelfError::Config(format!(
                    "unknown metadata field \"{field}\" (expected one of: {})",
                    METADATA_FIELDS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Rendered value of a field by name; missing values render empty
    pub fn get(&self, field: &str) -> String {
        let value = match field {
            "title" => &self.title,
            "lang" => &self.lang,
            "ident" => &self.ident,
            "subject" => return self.subject.join(SUBJECT_SEPARATOR),
            "description" => &self.description,
            "relation" => &self.relation,
            "creator" => &self.creator,
            "publisher" => &self.publisher,
            "date" => &self.date,
            "rights" => &self.rights,
            _ => return String::new(),
        };
        value.clone().unwrap_or_default()
    }

    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, String>) -> Result<(), ShelfError> {
        for (field, value) in overrides {
            self.set(field, value)?;
        }
        Ok(())
    }

    /// Keeps the first title seen
    pub fn note_title(&mut self, title: &str) {
        if self.title.is_none() {
            self.title = non_empty(title);
        }
    }

    /// Keeps the first identifier seen
    pub fn note_ident(&mut self, ident: &str) {
        if self.ident.is_none() {
            self.ident = non_empty(ident);
        }
    }

    pub fn note_creator(&mut self, creator: &str) {
        if self.creator.is_none() {
            self.creator = non_empty(creator);
        }
    }

    pub fn add_subject(&mut self, subject: &str) {
        if let Some(subject) = non_empty(subject) {
            if !self.subject.contains(&subject) {
                self.subject.push(subject);
            }
        }
    }

    /// Fills the language and date when nothing provided them
    pub fn fill_defaults(&mut self, started_at: &DateTime<Utc>) {
        if self.lang.is_none() {
            self.lang = Some(DEFAULT_LANGUAGE.to_string());
        }
        if self.date.is_none() {
            self.date = Some(format_date(started_at));
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_missing_fields_render_empty() {
        let metadata = Metadata::default();
        for field in METADATA_FIELDS {
            assert_eq!(metadata.get(field), "");
        }
    }

    #[test]
    fn test_subject_is_joined() {
        let mut metadata = Metadata::default();
        metadata.add_subject("Fantasy");
        metadata.add_subject("Adventure");
        metadata.add_subject("Fantasy");
        assert_eq!(metadata.get("subject"), "Fantasy, Adventure");

        metadata.set("subject", "a, b,,c").unwrap();
        assert_eq!(metadata.subject, ["a", "b", "c"]);
    }

    #[test]
    fn test_first_title_wins_but_overrides_replace() {
        let mut metadata = Metadata::default();
        metadata.note_title("First");
        metadata.note_title("Second");
        assert_eq!(metadata.get("title"), "First");

        let overrides = BTreeMap::from([("title".to_string(), "Chosen".to_string())]);
        metadata.apply_overrides(&overrides).unwrap();
        assert_eq!(metadata.get("title"), "Chosen");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut metadata = Metadata::default();
        assert!(matches!(
            metadata.set("colour", "red"),
            Err(ShelfError::Config(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let mut metadata = Metadata::default();
        let started_at = Utc.with_ymd_and_hms(2009, 12, 9, 8, 30, 5).unwrap();
        metadata.fill_defaults(&started_at);

        assert_eq!(metadata.get("lang"), "en");
        assert_eq!(metadata.get("date"), "2009-12-09T08:30:05+00:00");
    }
}
