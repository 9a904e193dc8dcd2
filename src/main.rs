mod config;
mod error;
mod models;
mod pipeline;
mod services;

use anyhow::Result;
use dotenv::dotenv;
use std::fs;

use config::AppConfig;
use models::{AnalysisResult, ImageBlob, NutritionItem};
use pipeline::AnalysisPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting food photo analyzer...");

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: calorie-vision <image-file>"))?;

    let config = AppConfig::from_env();
    if config.groq_api_key.is_none() {
        log::warn!("⚠️ GROQ_API_KEY not set, analysis will report no food");
    }

    let bytes = fs::read(&path)?;
    let blob = ImageBlob::new(bytes, ImageBlob::mime_from_path(&path));
    log::info!("📸 Loaded {} ({} bytes, {})", path, blob.bytes.len(), blob.mime_type);

    let pipeline = AnalysisPipeline::from_config(&config);

    let result = pipeline
        .analyze_or_no_food(&blob, |stage| {
            println!(
                "{} {}... ({}%)",
                create_progress_bar(stage.percent()),
                stage.label(),
                stage.percent()
            );
        })
        .await;

    print!("{}", format_report(&result));
    Ok(())
}

fn create_progress_bar(percent: u8) -> String {
    let filled = (percent / 10) as usize;
    let empty = 10 - filled;

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

fn format_item_line(item: &NutritionItem) -> String {
    let name = if item.name.trim().is_empty() {
        "Unknown food"
    } else {
        item.name.as_str()
    };

    format!(
        "🍽️ {}\n   🔥 {:.0} kcal | 🥩 {:.1}g protein | 🍞 {:.1}g carbs | 🧈 {:.1}g fats\n",
        name, item.calories, item.protein_grams, item.carbs_grams, item.fats_grams
    )
}

fn format_report(result: &AnalysisResult) -> String {
    match result {
        AnalysisResult::NoFood => {
            "\n❌ No food detected\nWe couldn't identify any food items in your image.\n".to_string()
        }
        AnalysisResult::Items(items) => {
            let mut report = String::from("\n📋 *Nutrition Report*\n\n");
            for item in items {
                report.push_str(&format_item_line(item));
            }

            if items.len() > 1 {
                let totals = result.totals();
                report.push_str(&format!(
                    "\n📊 Total: {:.0} kcal | {:.1}g protein | {:.1}g carbs | {:.1}g fats\n",
                    totals.calories,
                    totals.protein_grams,
                    totals.carbs_grams,
                    totals.fats_grams
                ));
            }

            report
        }
    }
}
