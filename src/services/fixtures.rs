//! JSON fixture loading for the tag and ingredient catalogues
//!
//! Loading is idempotent: every entry goes through get-or-create, so running
//! the same file twice only reports existing rows the second time.

use std::path::Path;

use serde::de::DeserializeOwned;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::constants::{MAX_LENGTH_INGREDIENT_NAME, MAX_LENGTH_MEASUREMENT_UNIT, MAX_LENGTH_TAG};
use crate::error::{FoodgramError, Result};
use crate::models::{Ingredient, NewIngredient, NewTag, Tag};

/// Outcome of a fixture load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub created: usize,
    pub existing: usize,
}

impl LoadReport {
    fn record(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.existing += 1;
        }
    }
}

async fn read_fixture<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let contents = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&contents)
        .map_err(|e| FoodgramError::fixture(format!("{}: {e}", path.display())))
}

fn check_length(kind: &str, field: &str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FoodgramError::fixture(format!("{kind} has an empty {field}")));
    }
    if value.chars().count() > max {
        return Err(FoodgramError::fixture(format!(
            "{kind} {field} '{value}' is longer than {max} characters"
        )));
    }
    Ok(())
}

/// Validate one tag entry before it reaches the database
pub fn check_tag(tag: &NewTag) -> Result<()> {
    check_length("Tag", "name", &tag.name, MAX_LENGTH_TAG)?;
    check_length("Tag", "slug", &tag.slug, MAX_LENGTH_TAG)?;
    if !tag
        .slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(FoodgramError::fixture(format!(
            "Tag slug '{}' may only contain letters, digits, hyphens and underscores",
            tag.slug
        )));
    }
    Ok(())
}

/// Validate one ingredient entry before it reaches the database
pub fn check_ingredient(ingredient: &NewIngredient) -> Result<()> {
    check_length("Ingredient", "name", &ingredient.name, MAX_LENGTH_INGREDIENT_NAME)?;
    check_length(
        "Ingredient",
        "measurement_unit",
        &ingredient.measurement_unit,
        MAX_LENGTH_MEASUREMENT_UNIT,
    )
}

/// Load `[{"name": .., "slug": ..}]`
pub async fn load_tags(pool: &PgPool, path: &Path) -> Result<LoadReport> {
    let tags: Vec<NewTag> = read_fixture(path).await?;
    tags.iter().try_for_each(check_tag)?;

    let mut report = LoadReport::default();
    for tag in &tags {
        let (stored, created) = Tag::get_or_create(pool, tag).await?;
        debug!(tag_id = stored.id, slug = %stored.slug, created, "Loaded tag");
        report.record(created);
    }

    info!(
        path = %path.display(),
        created = report.created,
        existing = report.existing,
        "Tag fixture loaded"
    );
    Ok(report)
}

/// Load `[{"name": .., "measurement_unit": ..}]`
pub async fn load_ingredients(pool: &PgPool, path: &Path) -> Result<LoadReport> {
    let ingredients: Vec<NewIngredient> = read_fixture(path).await?;
    ingredients.iter().try_for_each(check_ingredient)?;

    let mut report = LoadReport::default();
    for ingredient in &ingredients {
        let (_, created) = Ingredient::get_or_create(pool, ingredient).await?;
        report.record(created);
    }

    info!(
        path = %path.display(),
        created = report.created,
        existing = report.existing,
        "Ingredient fixture loaded"
    );
    Ok(report)
}
