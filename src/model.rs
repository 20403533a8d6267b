use serde::{Deserialize, Serialize};

/// A single brewing recipe.
///
/// All quantities are metric: masses in kilograms, volumes in litres,
/// temperatures in degrees Celsius and times in minutes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BeerRecipe {
    pub name: String,
    /// "All Grain", "Partial Mash" or "Extract"
    pub recipe_type: Option<String>,
    pub brewer: Option<String>,
    pub batch_size: Option<f64>,
    pub boil_size: Option<f64>,
    pub boil_time: Option<f64>,
    /// Brewhouse efficiency in percent
    pub efficiency: Option<f64>,
    pub original_gravity: Option<f64>,
    pub final_gravity: Option<f64>,
    pub style: Option<Style>,
    pub fermentables: Vec<Fermentable>,
    pub hops: Vec<Hop>,
    pub yeasts: Vec<Yeast>,
    pub miscs: Vec<Misc>,
    pub mash_steps: Vec<MashStep>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Style {
    pub name: String,
    pub category: Option<String>,
    pub style_guide: Option<String>,
    pub style_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fermentable {
    pub name: String,
    pub fermentable_type: Option<String>,
    pub amount: f64,
    /// Yield as percent of dry weight
    pub yield_pct: Option<f64>,
    /// Colour in SRM
    pub color: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hop {
    pub name: String,
    /// Alpha acids in percent
    pub alpha: Option<f64>,
    pub amount: f64,
    /// "Boil", "Dry Hop", "Mash", "First Wort" or "Aroma"
    pub hop_use: Option<String>,
    pub time: Option<f64>,
    pub form: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Yeast {
    pub name: String,
    pub yeast_type: Option<String>,
    pub form: Option<String>,
    pub laboratory: Option<String>,
    pub product_id: Option<String>,
    /// Kilograms when `amount_is_weight`, litres otherwise
    pub amount: Option<f64>,
    pub amount_is_weight: bool,
    pub attenuation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Misc {
    pub name: String,
    pub misc_type: Option<String>,
    pub misc_use: Option<String>,
    pub time: Option<f64>,
    /// Kilograms when `amount_is_weight`, litres otherwise
    pub amount: Option<f64>,
    pub amount_is_weight: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MashStep {
    pub name: String,
    /// "Infusion", "Temperature" or "Decoction"
    pub step_type: Option<String>,
    pub step_temp: Option<f64>,
    pub step_time: Option<f64>,
    pub infuse_amount: Option<f64>,
}

impl BeerRecipe {
    /// Total grain bill in kilograms
    pub fn total_fermentables(&self) -> f64 {
        self.fermentables.iter().map(|f| f.amount).sum()
    }

    /// One-line description used by the CLI
    pub fn summary(&self) -> String {
        let mut parts = vec![self.name.clone()];
        if let Some(style) = &self.style {
            parts.push(style.name.clone());
        }
        if let Some(batch) = self.batch_size {
            parts.push(format!("{:.1} L", batch));
        }
        if let Some(og) = self.original_gravity {
            parts.push(format!("OG {:.3}", og));
        }
        parts.push(format!(
            "{} fermentables, {} hops, {} yeasts",
            self.fermentables.len(),
            self.hops.len(),
            self.yeasts.len()
        ));
        parts.join(" | ")
    }
}
