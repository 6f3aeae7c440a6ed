//! File-based catalog loading.
//!
//! Reads the static team list once at startup. The format follows the file
//! extension: `.json`, or `.yaml`/`.yml`.

use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::domain::catalog::{Catalog, CatalogError};

/// Loads and validates a catalog file.
///
/// # Errors
///
/// - `Io` if the file cannot be read
/// - `Parse` for malformed content or an unsupported extension
/// - any build error (alias collision, duplicate slug, empty catalog)
pub async fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).await?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let catalog = match extension.as_str() {
        "json" => Catalog::from_json(&raw)?,
        "yaml" | "yml" => Catalog::from_yaml(&raw)?,
        other => {
            return Err(CatalogError::parse(format!(
                "unsupported catalog format '{}' for {}",
                other,
                path.display()
            )))
        }
    };

    info!(path = %path.display(), teams = catalog.len(), "catalog loaded");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Slug;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn loads_json_catalog() {
        let file = write_temp(
            ".json",
            r#"[{"id": "1", "name_he": "ארסנל", "slug": "arsenal", "aliases": ["גאנרס"]}]"#,
        );

        let catalog = load_catalog(file.path()).await.unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.display_name(&Slug::new("arsenal").unwrap()), "ארסנל");
    }

    #[tokio::test]
    async fn loads_yaml_catalog() {
        let file = write_temp(
            ".yaml",
            "- id: '1'\n  canonical_name: ליברפול\n  slug: liverpool\n  aliases: [liverpool]\n",
        );

        let catalog = load_catalog(file.path()).await.unwrap();

        assert!(catalog.contains(&Slug::new("liverpool").unwrap()));
    }

    #[tokio::test]
    async fn rejects_unknown_extension() {
        let file = write_temp(".toml", "");
        let err = load_catalog(file.path()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = load_catalog("/definitely/not/here.json").await.unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[tokio::test]
    async fn alias_collisions_fail_the_load() {
        let file = write_temp(
            ".json",
            r#"[
                {"id": "1", "name_he": "הפועל", "slug": "hapoel-tel-aviv", "aliases": []},
                {"id": "2", "name_he": "הפועל", "slug": "hapoel-beer-sheva", "aliases": []}
            ]"#,
        );
        let err = load_catalog(file.path()).await.unwrap_err();
        assert!(matches!(err, CatalogError::AliasCollision { .. }));
    }

    #[tokio::test]
    async fn bundled_team_file_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/teams.json");
        let catalog = load_catalog(path).await.unwrap();
        assert!(catalog.len() > 20);
    }
}
