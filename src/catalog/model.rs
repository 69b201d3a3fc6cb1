use serde::{Deserialize, Serialize};

use crate::nutrition::goals::Goal;

/// Catalog meal. Nutrient values are per serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: String,
    pub title: String,
    pub description: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub image_url: String,
    pub meals: Vec<Meal>,
    pub suitable_for: Vec<Goal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dietician {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub experience: u32, // years
    pub image_url: String,
    pub expertise: Vec<String>,
    pub contact_info: ContactInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTip {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub calories_burned: u32,
    pub duration_minutes: u32,
    pub intensity: Intensity,
}

/// Whole reference dataset, as stored in `data/catalog.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub meal_plans: Vec<MealPlan>,
    #[serde(default)]
    pub dieticians: Vec<Dietician>,
    #[serde(default)]
    pub quotes: Vec<Quote>,
    #[serde(default)]
    pub activity_tips: Vec<ActivityTip>,
}
