//! Catalog manifest loading.
//!
//! Parses the YAML manifest into a [`Catalog`] and rejects it in full when
//! anything is wrong. Error precedence: NotFound, Empty, Parse (with a line
//! hint when the parser supplies one), MissingSection, then Validation with
//! the complete offender list.

use super::{validator, Catalog, Category, Skill, Task};
use crate::error::CatalogError;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;

/// Load and validate the manifest at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CatalogError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

/// Load and validate a manifest from YAML text.
pub fn load_from_str(content: &str) -> Result<Catalog, CatalogError> {
    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(parse_error)?;

    if value.is_null() {
        return Err(CatalogError::Empty);
    }

    let mapping = match value.as_mapping() {
        Some(mapping) => mapping,
        None => {
            return Err(CatalogError::Parse {
                message: "manifest top level must be a mapping".to_string(),
                line: None,
            })
        }
    };

    if section_value(mapping, "skills").is_none() {
        return Err(CatalogError::MissingSection("skills"));
    }

    let skills = parse_section::<Skill>(mapping, "skills")?;
    let tasks = parse_section::<Task>(mapping, "tasks")?;
    let categories = parse_section::<Category>(mapping, "categories")?;

    let catalog = Catalog {
        skills: with_names(skills, |skill, name| skill.name = name),
        tasks: with_names(tasks, |task, name| task.name = name),
        categories: with_names(categories, |category, name| category.name = name),
    };

    let errors = validator::validate(&catalog);
    if !errors.is_empty() {
        return Err(CatalogError::Validation { errors });
    }

    Ok(catalog)
}

/// Parse one top-level section. An absent or explicitly-null section (other
/// than `skills`, checked by the caller) defaults to empty.
fn parse_section<T: DeserializeOwned>(
    mapping: &serde_yaml::Mapping,
    section: &'static str,
) -> Result<BTreeMap<String, T>, CatalogError> {
    match section_value(mapping, section) {
        None | Some(serde_yaml::Value::Null) => Ok(BTreeMap::new()),
        Some(value) => serde_yaml::from_value(value.clone()).map_err(|e| CatalogError::Parse {
            message: format!("invalid '{}' section: {}", section, e),
            line: e.location().map(|loc| loc.line()),
        }),
    }
}

fn section_value<'a>(
    mapping: &'a serde_yaml::Mapping,
    section: &str,
) -> Option<&'a serde_yaml::Value> {
    mapping
        .iter()
        .find(|(key, _)| key.as_str() == Some(section))
        .map(|(_, value)| value)
}

/// Entries are keyed by name in the manifest; copy the key into each record.
fn with_names<T>(entries: BTreeMap<String, T>, set: impl Fn(&mut T, String)) -> BTreeMap<String, T> {
    entries
        .into_iter()
        .map(|(name, mut entry)| {
            set(&mut entry, name.clone());
            (name, entry)
        })
        .collect()
}

fn parse_error(err: serde_yaml::Error) -> CatalogError {
    CatalogError::Parse {
        line: err.location().map(|loc| loc.line()),
        message: err.to_string(),
    }
}
