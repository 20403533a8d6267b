use log::debug;
use serde::Deserialize;

use crate::decoder::BeerRecipeDecoder;
use crate::error::{DecodeOutcome, FormatError};
use crate::model::{BeerRecipe, Fermentable, Hop, MashStep, Misc, Style, Yeast};

/// Decoder for BeerJSON 1.0 documents.
///
/// Unit-tagged quantities are normalized to the metric units used by
/// [`BeerRecipe`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BeerJsonDecoder;

impl BeerRecipeDecoder for BeerJsonDecoder {
    fn decode(&self, data: &[u8]) -> DecodeOutcome {
        let data = data.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(data);
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let document: Document = serde_json::from_slice(data).map_err(FormatError::Json)?;
        if let Some(version) = document.beerjson.version {
            debug!("BeerJSON document version {}", version);
        }

        let recipes = document
            .beerjson
            .recipes
            .into_iter()
            .map(RecipeJson::into_recipe)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Decoded {} BeerJSON recipe(s)", recipes.len());
        Ok(recipes)
    }
}

#[derive(Debug, Deserialize)]
struct Document {
    beerjson: BeerJson,
}

#[derive(Debug, Deserialize)]
struct BeerJson {
    version: Option<f64>,
    #[serde(default)]
    recipes: Vec<RecipeJson>,
}

#[derive(Debug, Deserialize)]
struct Quantity {
    unit: String,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct RecipeJson {
    name: String,
    #[serde(rename = "type")]
    recipe_type: Option<String>,
    author: Option<String>,
    batch_size: Option<Quantity>,
    efficiency: Option<EfficiencyJson>,
    style: Option<StyleJson>,
    #[serde(default)]
    ingredients: IngredientsJson,
    mash: Option<MashJson>,
    boil: Option<BoilJson>,
    original_gravity: Option<Quantity>,
    final_gravity: Option<Quantity>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EfficiencyJson {
    brewhouse: Option<Quantity>,
}

#[derive(Debug, Deserialize)]
struct StyleJson {
    name: String,
    category: Option<String>,
    style_guide: Option<String>,
    #[serde(rename = "type")]
    style_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IngredientsJson {
    #[serde(default)]
    fermentable_additions: Vec<FermentableJson>,
    #[serde(default)]
    hop_additions: Vec<HopJson>,
    #[serde(default)]
    culture_additions: Vec<CultureJson>,
    #[serde(default)]
    miscellaneous_additions: Vec<MiscJson>,
}

#[derive(Debug, Deserialize)]
struct FermentableJson {
    name: String,
    #[serde(rename = "type")]
    fermentable_type: Option<String>,
    amount: Quantity,
    color: Option<Quantity>,
    #[serde(rename = "yield")]
    yield_info: Option<YieldJson>,
}

#[derive(Debug, Deserialize)]
struct YieldJson {
    fine_grind: Option<Quantity>,
}

#[derive(Debug, Deserialize)]
struct TimingJson {
    #[serde(rename = "use")]
    usage: Option<String>,
    time: Option<Quantity>,
}

#[derive(Debug, Deserialize)]
struct HopJson {
    name: String,
    alpha_acid: Option<Quantity>,
    amount: Quantity,
    timing: Option<TimingJson>,
    form: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CultureJson {
    name: String,
    #[serde(rename = "type")]
    culture_type: Option<String>,
    form: Option<String>,
    producer: Option<String>,
    product_id: Option<String>,
    amount: Option<Quantity>,
    attenuation: Option<Quantity>,
}

#[derive(Debug, Deserialize)]
struct MiscJson {
    name: String,
    #[serde(rename = "type")]
    misc_type: Option<String>,
    amount: Option<Quantity>,
    timing: Option<TimingJson>,
}

#[derive(Debug, Deserialize)]
struct MashJson {
    #[serde(default)]
    mash_steps: Vec<MashStepJson>,
}

#[derive(Debug, Deserialize)]
struct MashStepJson {
    name: String,
    #[serde(rename = "type")]
    step_type: Option<String>,
    step_temperature: Option<Quantity>,
    step_time: Option<Quantity>,
    amount: Option<Quantity>,
}

#[derive(Debug, Deserialize)]
struct BoilJson {
    pre_boil_size: Option<Quantity>,
    boil_time: Option<Quantity>,
}

impl RecipeJson {
    fn into_recipe(self) -> Result<BeerRecipe, FormatError> {
        let ingredients = self.ingredients;

        Ok(BeerRecipe {
            name: self.name,
            recipe_type: self.recipe_type,
            brewer: self.author,
            batch_size: convert(self.batch_size.as_ref(), litres)?,
            boil_size: convert(
                self.boil.as_ref().and_then(|b| b.pre_boil_size.as_ref()),
                litres,
            )?,
            boil_time: convert(
                self.boil.as_ref().and_then(|b| b.boil_time.as_ref()),
                minutes,
            )?,
            efficiency: convert(
                self.efficiency.as_ref().and_then(|e| e.brewhouse.as_ref()),
                percent,
            )?,
            original_gravity: convert(self.original_gravity.as_ref(), specific_gravity)?,
            final_gravity: convert(self.final_gravity.as_ref(), specific_gravity)?,
            style: self.style.map(|s| Style {
                name: s.name,
                category: s.category,
                style_guide: s.style_guide,
                style_type: s.style_type,
            }),
            fermentables: ingredients
                .fermentable_additions
                .into_iter()
                .map(FermentableJson::into_model)
                .collect::<Result<_, _>>()?,
            hops: ingredients
                .hop_additions
                .into_iter()
                .map(HopJson::into_model)
                .collect::<Result<_, _>>()?,
            yeasts: ingredients
                .culture_additions
                .into_iter()
                .map(CultureJson::into_model)
                .collect::<Result<_, _>>()?,
            miscs: ingredients
                .miscellaneous_additions
                .into_iter()
                .map(MiscJson::into_model)
                .collect::<Result<_, _>>()?,
            mash_steps: self
                .mash
                .map(|m| m.mash_steps)
                .unwrap_or_default()
                .into_iter()
                .map(MashStepJson::into_model)
                .collect::<Result<_, _>>()?,
            notes: self.notes,
        })
    }
}

impl FermentableJson {
    fn into_model(self) -> Result<Fermentable, FormatError> {
        Ok(Fermentable {
            name: self.name,
            fermentable_type: self.fermentable_type,
            amount: kilograms(&self.amount)?,
            yield_pct: convert(
                self.yield_info.as_ref().and_then(|y| y.fine_grind.as_ref()),
                percent,
            )?,
            color: convert(self.color.as_ref(), srm)?,
        })
    }
}

impl HopJson {
    fn into_model(self) -> Result<Hop, FormatError> {
        let (hop_use, time_q) = split_timing(self.timing);
        Ok(Hop {
            name: self.name,
            alpha: convert(self.alpha_acid.as_ref(), percent)?,
            amount: kilograms(&self.amount)?,
            hop_use,
            time: convert(time_q.as_ref(), minutes)?,
            form: self.form,
        })
    }
}

impl CultureJson {
    fn into_model(self) -> Result<Yeast, FormatError> {
        let (amount, amount_is_weight) = match &self.amount {
            Some(q) => metric_amount(q)?,
            None => (None, false),
        };
        Ok(Yeast {
            name: self.name,
            yeast_type: self.culture_type,
            form: self.form,
            laboratory: self.producer,
            product_id: self.product_id,
            amount,
            amount_is_weight,
            attenuation: convert(self.attenuation.as_ref(), percent)?,
        })
    }
}

impl MiscJson {
    fn into_model(self) -> Result<Misc, FormatError> {
        let (amount, amount_is_weight) = match &self.amount {
            Some(q) => metric_amount(q)?,
            None => (None, false),
        };
        let (misc_use, time_q) = split_timing(self.timing);
        Ok(Misc {
            name: self.name,
            misc_type: self.misc_type,
            misc_use,
            time: convert(time_q.as_ref(), minutes)?,
            amount,
            amount_is_weight,
        })
    }
}

impl MashStepJson {
    fn into_model(self) -> Result<MashStep, FormatError> {
        Ok(MashStep {
            name: self.name,
            step_type: self.step_type,
            step_temp: convert(self.step_temperature.as_ref(), celsius)?,
            step_time: convert(self.step_time.as_ref(), minutes)?,
            infuse_amount: convert(self.amount.as_ref(), litres)?,
        })
    }
}

fn split_timing(timing: Option<TimingJson>) -> (Option<String>, Option<Quantity>) {
    match timing {
        Some(t) => (t.usage, t.time),
        None => (None, None),
    }
}

fn convert(
    quantity: Option<&Quantity>,
    to_metric: fn(&Quantity) -> Result<f64, FormatError>,
) -> Result<Option<f64>, FormatError> {
    quantity.map(to_metric).transpose()
}

const MASS_KG: &[(&str, f64)] = &[
    ("kg", 1.0),
    ("g", 1e-3),
    ("mg", 1e-6),
    ("lb", 0.453_592_37),
    ("oz", 0.028_349_523_125),
];

const VOLUME_L: &[(&str, f64)] = &[
    ("l", 1.0),
    ("ml", 1e-3),
    ("gal", 3.785_411_784),
    ("qt", 0.946_352_946),
    ("pt", 0.473_176_473),
    ("cup", 0.236_588_236_5),
    ("floz", 0.029_573_529_562_5),
    ("tbsp", 0.014_786_764_781_25),
    ("tsp", 0.004_928_921_593_75),
    ("bbl", 117.347_765_304),
    ("ifloz", 0.028_413_062_5),
    ("ipt", 0.568_261_25),
    ("iqt", 1.136_522_5),
    ("igal", 4.546_09),
    ("ibbl", 163.659_24),
];

const TIME_MIN: &[(&str, f64)] = &[
    ("sec", 1.0 / 60.0),
    ("min", 1.0),
    ("hr", 60.0),
    ("day", 1440.0),
    ("week", 10080.0),
];

const COUNT_UNITS: &[&str] = &["1", "each", "unit", "pkg", "dimensionless"];

fn factor_for(q: &Quantity, table: &[(&str, f64)]) -> Option<f64> {
    let unit = q.unit.to_ascii_lowercase();
    table
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, factor)| *factor)
}

fn scaled(q: &Quantity, quantity: &'static str, table: &[(&str, f64)]) -> Result<f64, FormatError> {
    let factor = factor_for(q, table).ok_or_else(|| unsupported(quantity, q))?;
    finite(quantity, q, q.value * factor)
}

/// Rejects conversions that overflowed, so every decoded number is finite.
fn finite(quantity: &'static str, q: &Quantity, value: f64) -> Result<f64, FormatError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormatError::InvalidNumber {
            field: quantity.to_string(),
            value: format!("{} {}", q.value, q.unit),
        })
    }
}

fn unsupported(quantity: &'static str, q: &Quantity) -> FormatError {
    FormatError::UnsupportedUnit {
        quantity,
        unit: q.unit.clone(),
    }
}

fn kilograms(q: &Quantity) -> Result<f64, FormatError> {
    scaled(q, "mass", MASS_KG)
}

fn litres(q: &Quantity) -> Result<f64, FormatError> {
    scaled(q, "volume", VOLUME_L)
}

fn minutes(q: &Quantity) -> Result<f64, FormatError> {
    scaled(q, "time", TIME_MIN)
}

fn percent(q: &Quantity) -> Result<f64, FormatError> {
    match q.unit.as_str() {
        "%" => finite("percent", q, q.value),
        _ => Err(unsupported("percent", q)),
    }
}

fn celsius(q: &Quantity) -> Result<f64, FormatError> {
    let value = match q.unit.to_ascii_lowercase().as_str() {
        "c" => q.value,
        "f" => (q.value - 32.0) * 5.0 / 9.0,
        _ => return Err(unsupported("temperature", q)),
    };
    finite("temperature", q, value)
}

/// Specific gravity. Plato and Brix share the same polynomial approximation.
fn specific_gravity(q: &Quantity) -> Result<f64, FormatError> {
    let value = match q.unit.to_ascii_lowercase().as_str() {
        "sg" => q.value,
        "plato" | "brix" => 1.0 + q.value / (258.6 - (q.value / 258.2) * 227.1),
        _ => return Err(unsupported("gravity", q)),
    };
    finite("gravity", q, value)
}

/// Colour in SRM
fn srm(q: &Quantity) -> Result<f64, FormatError> {
    let value = match q.unit.to_ascii_lowercase().as_str() {
        "srm" => q.value,
        "ebc" => q.value / 1.97,
        "lovi" => 1.3546 * q.value - 0.76,
        _ => return Err(unsupported("color", q)),
    };
    finite("color", q, value)
}

/// Mass or volume amount; counted amounts (packages, units) carry no metric value.
fn metric_amount(q: &Quantity) -> Result<(Option<f64>, bool), FormatError> {
    if factor_for(q, MASS_KG).is_some() {
        return Ok((Some(kilograms(q)?), true));
    }
    if factor_for(q, VOLUME_L).is_some() {
        return Ok((Some(litres(q)?), false));
    }
    if COUNT_UNITS.contains(&q.unit.to_ascii_lowercase().as_str()) {
        return Ok((None, false));
    }
    Err(unsupported("amount", q))
}
