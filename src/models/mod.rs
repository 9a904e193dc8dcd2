use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

/// Raw image bytes plus declared MIME type.
///
/// Created once per analysis from user input and discarded when the caller
/// consumes the result; nothing is shared between invocations.
#[derive(Debug, Clone)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Guess the MIME type from a file extension (JPEG when unknown).
    pub fn mime_from_path(path: &str) -> &'static str {
        let lower = path.to_lowercase();
        if lower.ends_with(".png") {
            "image/png"
        } else if lower.ends_with(".webp") {
            "image/webp"
        } else if lower.ends_with(".gif") {
            "image/gif"
        } else {
            "image/jpeg"
        }
    }

    /// Inline `data:` URL encoding of the image, accepted by the vision
    /// endpoint's image-input format when no remote host is available.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// A URL the vision endpoint can dereference: either a remote hosted URL or
/// an inline data URL standing in for one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImageRef(pub String);

impl HostedImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_url(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl std::fmt::Display for HostedImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Estimated nutrition for a single detected food item.
///
/// Numeric fields are never negative; the interpreter coerces absent or
/// non-numeric source values to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionItem {
    pub name: String,
    pub calories: f64,
    pub protein_grams: f64,
    pub carbs_grams: f64,
    pub fats_grams: f64,
}

/// Outcome of one analysis: either nothing edible was found, or a non-empty
/// list of detected items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalysisResult {
    NoFood,
    Items(Vec<NutritionItem>),
}

impl AnalysisResult {
    /// An empty item list collapses to `NoFood`, so `Items` is never empty.
    pub fn from_items(items: Vec<NutritionItem>) -> Self {
        if items.is_empty() {
            AnalysisResult::NoFood
        } else {
            AnalysisResult::Items(items)
        }
    }

    pub fn has_food(&self) -> bool {
        matches!(self, AnalysisResult::Items(_))
    }

    pub fn items(&self) -> &[NutritionItem] {
        match self {
            AnalysisResult::NoFood => &[],
            AnalysisResult::Items(items) => items,
        }
    }

    /// Field-wise sums across all items, for the caller's summary view.
    pub fn totals(&self) -> NutritionTotals {
        let mut totals = NutritionTotals::default();
        for item in self.items() {
            totals.calories += item.calories;
            totals.protein_grams += item.protein_grams;
            totals.carbs_grams += item.carbs_grams;
            totals.fats_grams += item.fats_grams;
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein_grams: f64,
    pub carbs_grams: f64,
    pub fats_grams: f64,
}
