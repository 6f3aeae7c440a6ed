//! The team catalog: entries plus their alias index.

use std::collections::HashMap;

use super::alias_index::AliasIndex;
use super::entry::CatalogEntry;
use super::errors::CatalogError;
use crate::domain::foundation::Slug;

/// Static, versioned list of teams, indexed for lookup.
///
/// Built once at startup and shared by reference (`Arc<Catalog>`).
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_slug: HashMap<Slug, usize>,
    index: AliasIndex,
}

impl Catalog {
    /// Validates and indexes the entries.
    pub fn build(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let index = AliasIndex::build(&entries)?;
        let by_slug = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.slug.clone(), position))
            .collect();

        Ok(Self {
            entries,
            by_slug,
            index,
        })
    }

    /// Parses a JSON array of entries and builds the catalog.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(json).map_err(|e| CatalogError::parse(e.to_string()))?;
        Self::build(entries)
    }

    /// Parses a YAML sequence of entries and builds the catalog.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> =
            serde_yaml::from_str(yaml).map_err(|e| CatalogError::parse(e.to_string()))?;
        Self::build(entries)
    }

    /// The alias index.
    pub fn index(&self) -> &AliasIndex {
        &self.index
    }

    /// All entries in registration order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a built catalog.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry by slug.
    pub fn entry(&self, slug: &Slug) -> Option<&CatalogEntry> {
        self.by_slug.get(slug).map(|&position| &self.entries[position])
    }

    /// Closed-catalog membership check.
    pub fn contains(&self, slug: &Slug) -> bool {
        self.by_slug.contains_key(slug)
    }

    /// Display name for a slug, or the slug itself when unknown.
    pub fn display_name(&self, slug: &Slug) -> String {
        self.entry(slug)
            .map(|entry| entry.canonical_name.clone())
            .unwrap_or_else(|| slug.to_string())
    }

    /// `(slug, display name)` for every entry, in registration order.
    pub fn available_teams(&self) -> Vec<(&Slug, &str)> {
        self.entries
            .iter()
            .map(|entry| (&entry.slug, entry.canonical_name.as_str()))
            .collect()
    }

    /// Renders the catalog as `display (slug)` pairs for AI prompts.
    pub fn render_choices(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{} ({})", entry.canonical_name, entry.slug))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Builds the downstream search key `"<home>-vs-<away>"`.
    ///
    /// Returns `None` unless at least two slugs are given.
    pub fn match_slug(slugs: &[Slug]) -> Option<String> {
        match slugs {
            [home, away, ..] => Some(format!("{}-vs-{}", home, away)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"id": "1", "name_he": "ארסנל", "slug": "arsenal", "aliases": ["גאנרס"]},
        {"id": "2", "name_he": "ליברפול", "slug": "liverpool", "aliases": []}
    ]"#;

    fn slug(s: &str) -> Slug {
        Slug::new(s).unwrap()
    }

    #[test]
    fn builds_from_json() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&slug("arsenal")));
        assert!(!catalog.contains(&slug("chelsea")));
    }

    #[test]
    fn builds_from_yaml() {
        let yaml = "- id: '1'\n  name_he: ארסנל\n  slug: arsenal\n  aliases: [גאנרס]\n";
        let catalog = Catalog::from_yaml(yaml).unwrap();
        assert_eq!(catalog.display_name(&slug("arsenal")), "ארסנל");
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(Catalog::from_json("[]"), Err(CatalogError::EmptyCatalog)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(Catalog::from_json("{"), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn display_name_falls_back_to_slug() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.display_name(&slug("liverpool")), "ליברפול");
        assert_eq!(catalog.display_name(&slug("chelsea")), "chelsea");
    }

    #[test]
    fn render_choices_lists_display_and_slug() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.render_choices(), "ארסנל (arsenal), ליברפול (liverpool)");
    }

    #[test]
    fn match_slug_requires_two_slugs() {
        assert_eq!(
            Catalog::match_slug(&[slug("arsenal"), slug("liverpool")]),
            Some("arsenal-vs-liverpool".to_string())
        );
        assert_eq!(Catalog::match_slug(&[slug("arsenal")]), None);
    }

    #[test]
    fn available_teams_preserves_order() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let teams = catalog.available_teams();
        assert_eq!(teams[0].0, &slug("arsenal"));
        assert_eq!(teams[1].1, "ליברפול");
    }
}
