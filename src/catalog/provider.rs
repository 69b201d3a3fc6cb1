use std::path::Path;

use anyhow::Context;
use tracing::info;

use super::model::{ActivityTip, CatalogData, Dietician, MealPlan, Quote};

const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Read-only source of reference data. Core code never mutates it.
pub trait CatalogProvider: Send + Sync {
    fn meal_plans(&self) -> &[MealPlan];
    fn dieticians(&self) -> &[Dietician];
    fn quotes(&self) -> &[Quote];
    fn activity_tips(&self) -> &[ActivityTip];
}

/// Catalog held fully in memory, loaded once at startup.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    data: CatalogData,
}

impl StaticCatalog {
    pub fn new(data: CatalogData) -> Self {
        Self { data }
    }

    /// Dataset compiled into the binary.
    pub fn bundled() -> anyhow::Result<Self> {
        let data: CatalogData =
            serde_json::from_str(BUNDLED_CATALOG).context("parse bundled catalog")?;
        Ok(Self::new(data))
    }

    pub async fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read catalog {}", path.display()))?;
        let data: CatalogData = serde_json::from_str(&raw)
            .with_context(|| format!("parse catalog {}", path.display()))?;
        info!(
            path = %path.display(),
            plans = data.meal_plans.len(),
            dieticians = data.dieticians.len(),
            "catalog loaded"
        );
        Ok(Self::new(data))
    }
}

impl CatalogProvider for StaticCatalog {
    fn meal_plans(&self) -> &[MealPlan] {
        &self.data.meal_plans
    }
    fn dieticians(&self) -> &[Dietician] {
        &self.data.dieticians
    }
    fn quotes(&self) -> &[Quote] {
        &self.data.quotes
    }
    fn activity_tips(&self) -> &[ActivityTip] {
        &self.data.activity_tips
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundled_catalog_parses() {
        let catalog = StaticCatalog::bundled().expect("bundled catalog");
        assert_eq!(catalog.meal_plans().len(), 3);
        assert_eq!(catalog.dieticians().len(), 4);
        assert_eq!(catalog.quotes().len(), 5);
        assert_eq!(catalog.activity_tips().len(), 4);
        assert!(catalog.meal_plans().iter().all(|p| p.meals.len() == 4));
    }

    #[tokio::test]
    async fn loads_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"quotes":[{{"text":"Eat well.","author":"Someone"}}]}}"#
        )
        .unwrap();

        let catalog = StaticCatalog::from_json_file(file.path()).await.unwrap();
        assert_eq!(catalog.quotes().len(), 1);
        assert!(catalog.meal_plans().is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = StaticCatalog::from_json_file(Path::new("/nonexistent/catalog.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("read catalog"));
    }
}
