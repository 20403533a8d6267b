use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::decoder::BeerRecipeDecoder;
use crate::error::{DecodeOutcome, FormatError};
use crate::model::{BeerRecipe, Fermentable, Hop, MashStep, Misc, Style, Yeast};

/// Decoder for BeerXML 1.0 documents.
///
/// Accepts a `<RECIPES>` root holding any number of `<RECIPE>` records, or a
/// lone `<RECIPE>` root. Tag names are matched case-insensitively and
/// unknown elements are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeerXmlDecoder;

impl BeerRecipeDecoder for BeerXmlDecoder {
    fn decode(&self, data: &[u8]) -> DecodeOutcome {
        let root = match parse_tree(data)? {
            Some(root) => root,
            None => return Ok(Vec::new()),
        };

        let recipes = match root.name.as_str() {
            "RECIPES" => root
                .children_named("RECIPE")
                .map(recipe_from)
                .collect::<Result<Vec<_>, _>>()?,
            "RECIPE" => vec![recipe_from(&root)?],
            other => return Err(FormatError::UnexpectedRoot(other.to_string()).into()),
        };

        debug!("Decoded {} BeerXML recipe(s)", recipes.len());
        Ok(recipes)
    }
}

/// Minimal element tree; BeerXML carries no data in attributes.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: &[u8]) -> Self {
        Element {
            name: String::from_utf8_lossy(name).to_ascii_uppercase(),
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Children of the `<{list}>` wrapper that are named `item`
    fn list<'a>(&'a self, list: &str, item: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.child(list)
            .into_iter()
            .flat_map(move |l| l.children_named(item))
    }

    fn text_of(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(|c| c.text.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    fn required_text(&self, element: &'static str, field: &'static str) -> Result<String, FormatError> {
        self.text_of(field)
            .ok_or(FormatError::MissingField { element, field })
    }

    fn number_of(&self, name: &str) -> Result<Option<f64>, FormatError> {
        match self.text_of(name) {
            None => Ok(None),
            Some(value) => match value.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(FormatError::InvalidNumber {
                    field: name.to_string(),
                    value,
                }),
            },
        }
    }

    fn required_number(&self, element: &'static str, field: &'static str) -> Result<f64, FormatError> {
        self.number_of(field)?
            .ok_or(FormatError::MissingField { element, field })
    }

    fn flag_of(&self, name: &str) -> bool {
        self.text_of(name)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Build the element tree. `Ok(None)` means the document holds no element at all.
fn parse_tree(data: &[u8]) -> Result<Option<Element>, FormatError> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(data);
    let mut reader = Reader::from_reader(data);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| FormatError::Xml {
                position: reader.buffer_position(),
                source,
            })?;

        match event {
            Event::Start(e) => stack.push(Element::new(e.local_name().as_ref())),
            Event::Empty(e) => {
                attach(&mut stack, &mut root, Element::new(e.local_name().as_ref()))?
            }
            Event::End(e) => {
                let element = stack.pop().ok_or_else(|| {
                    FormatError::UnmatchedEnd(
                        String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_uppercase(),
                    )
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|source| FormatError::Xml {
                    position: reader.buffer_position(),
                    source,
                })?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(c) => {
                let text = reader
                    .decoder()
                    .decode(&c)
                    .map_err(|source| FormatError::Xml {
                        position: reader.buffer_position(),
                        source,
                    })?;
                push_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no recipe data
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.pop() {
        return Err(FormatError::Truncated(open.name));
    }

    Ok(root)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), FormatError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err(FormatError::MultipleRoots),
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), FormatError> {
    match stack.last_mut() {
        Some(current) => current.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(FormatError::StrayText(text.trim().to_string())),
    }
    Ok(())
}

fn recipe_from(el: &Element) -> Result<BeerRecipe, FormatError> {
    let style = match el.child("STYLE") {
        Some(style) => Some(Style {
            name: style.required_text("STYLE", "NAME")?,
            category: style.text_of("CATEGORY"),
            style_guide: style.text_of("STYLE_GUIDE"),
            style_type: style.text_of("TYPE"),
        }),
        None => None,
    };

    let mash_steps = match el.child("MASH") {
        Some(mash) => mash
            .list("MASH_STEPS", "MASH_STEP")
            .map(mash_step_from)
            .collect::<Result<_, _>>()?,
        None => Vec::new(),
    };

    Ok(BeerRecipe {
        name: el.required_text("RECIPE", "NAME")?,
        recipe_type: el.text_of("TYPE"),
        brewer: el.text_of("BREWER"),
        batch_size: el.number_of("BATCH_SIZE")?,
        boil_size: el.number_of("BOIL_SIZE")?,
        boil_time: el.number_of("BOIL_TIME")?,
        efficiency: el.number_of("EFFICIENCY")?,
        original_gravity: el.number_of("OG")?,
        final_gravity: el.number_of("FG")?,
        style,
        fermentables: el
            .list("FERMENTABLES", "FERMENTABLE")
            .map(fermentable_from)
            .collect::<Result<_, _>>()?,
        hops: el.list("HOPS", "HOP").map(hop_from).collect::<Result<_, _>>()?,
        yeasts: el
            .list("YEASTS", "YEAST")
            .map(yeast_from)
            .collect::<Result<_, _>>()?,
        miscs: el.list("MISCS", "MISC").map(misc_from).collect::<Result<_, _>>()?,
        mash_steps,
        notes: el.text_of("NOTES"),
    })
}

fn fermentable_from(el: &Element) -> Result<Fermentable, FormatError> {
    Ok(Fermentable {
        name: el.required_text("FERMENTABLE", "NAME")?,
        fermentable_type: el.text_of("TYPE"),
        amount: el.required_number("FERMENTABLE", "AMOUNT")?,
        yield_pct: el.number_of("YIELD")?,
        color: el.number_of("COLOR")?,
    })
}

fn hop_from(el: &Element) -> Result<Hop, FormatError> {
    Ok(Hop {
        name: el.required_text("HOP", "NAME")?,
        alpha: el.number_of("ALPHA")?,
        amount: el.required_number("HOP", "AMOUNT")?,
        hop_use: el.text_of("USE"),
        time: el.number_of("TIME")?,
        form: el.text_of("FORM"),
    })
}

fn yeast_from(el: &Element) -> Result<Yeast, FormatError> {
    Ok(Yeast {
        name: el.required_text("YEAST", "NAME")?,
        yeast_type: el.text_of("TYPE"),
        form: el.text_of("FORM"),
        laboratory: el.text_of("LABORATORY"),
        product_id: el.text_of("PRODUCT_ID"),
        amount: el.number_of("AMOUNT")?,
        amount_is_weight: el.flag_of("AMOUNT_IS_WEIGHT"),
        attenuation: el.number_of("ATTENUATION")?,
    })
}

fn misc_from(el: &Element) -> Result<Misc, FormatError> {
    Ok(Misc {
        name: el.required_text("MISC", "NAME")?,
        misc_type: el.text_of("TYPE"),
        misc_use: el.text_of("USE"),
        time: el.number_of("TIME")?,
        amount: el.number_of("AMOUNT")?,
        amount_is_weight: el.flag_of("AMOUNT_IS_WEIGHT"),
    })
}

fn mash_step_from(el: &Element) -> Result<MashStep, FormatError> {
    Ok(MashStep {
        name: el.required_text("MASH_STEP", "NAME")?,
        step_type: el.text_of("TYPE"),
        step_temp: el.number_of("STEP_TEMP")?,
        step_time: el.number_of("STEP_TIME")?,
        infuse_amount: el.number_of("INFUSE_AMOUNT")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, DecodeErrorKind};

    const DRY_STOUT: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<RECIPES>
  <RECIPE>
    <NAME>Dry Stout</NAME>
    <VERSION>1</VERSION>
    <TYPE>All Grain</TYPE>
    <BREWER>Brad Smith</BREWER>
    <BATCH_SIZE>18.93</BATCH_SIZE>
    <BOIL_SIZE>20.82</BOIL_SIZE>
    <BOIL_TIME>60.0</BOIL_TIME>
    <EFFICIENCY>72.0</EFFICIENCY>
    <OG>1.036</OG>
    <STYLE>
      <NAME>Dry Stout</NAME>
      <CATEGORY>Stout</CATEGORY>
      <STYLE_GUIDE>BJCP</STYLE_GUIDE>
      <TYPE>Ale</TYPE>
    </STYLE>
    <HOPS>
      <HOP>
        <NAME>Goldings, East Kent</NAME>
        <ALPHA>4.5</ALPHA>
        <AMOUNT>0.0638</AMOUNT>
        <USE>Boil</USE>
        <TIME>60.0</TIME>
        <FORM>Pellet</FORM>
      </HOP>
    </HOPS>
    <FERMENTABLES>
      <FERMENTABLE>
        <NAME>Pale Malt (2 row) UK</NAME>
        <TYPE>Grain</TYPE>
        <AMOUNT>2.27</AMOUNT>
        <YIELD>78.0</YIELD>
        <COLOR>3.0</COLOR>
      </FERMENTABLE>
      <FERMENTABLE>
        <NAME>Barley, Flaked</NAME>
        <TYPE>Grain</TYPE>
        <AMOUNT>0.91</AMOUNT>
        <YIELD>70.0</YIELD>
        <COLOR>2.0</COLOR>
      </FERMENTABLE>
    </FERMENTABLES>
    <MISCS>
      <MISC>
        <NAME>Irish Moss</NAME>
        <TYPE>Fining</TYPE>
        <USE>Boil</USE>
        <TIME>10.0</TIME>
        <AMOUNT>0.005</AMOUNT>
        <AMOUNT_IS_WEIGHT>TRUE</AMOUNT_IS_WEIGHT>
      </MISC>
    </MISCS>
    <YEASTS>
      <YEAST>
        <NAME>Irish Ale</NAME>
        <TYPE>Ale</TYPE>
        <FORM>Liquid</FORM>
        <AMOUNT>0.250</AMOUNT>
        <LABORATORY>Wyeast Labs</LABORATORY>
        <PRODUCT_ID>1084</PRODUCT_ID>
        <ATTENUATION>73.0</ATTENUATION>
      </YEAST>
    </YEASTS>
    <MASH>
      <NAME>Single Step Infusion, 68 C</NAME>
      <MASH_STEPS>
        <MASH_STEP>
          <NAME>Conversion Step, 68C</NAME>
          <TYPE>Infusion</TYPE>
          <STEP_TEMP>68.0</STEP_TEMP>
          <STEP_TIME>60.0</STEP_TIME>
          <INFUSE_AMOUNT>10.0</INFUSE_AMOUNT>
        </MASH_STEP>
      </MASH_STEPS>
    </MASH>
    <NOTES>Roast &amp; flaked barley give the dry finish.</NOTES>
  </RECIPE>
</RECIPES>"#;

    fn format_error(result: DecodeOutcome) -> FormatError {
        match result {
            Err(DecodeError::Format(e)) => e,
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_decodes_full_recipe() {
        let recipes = BeerXmlDecoder.decode_str(DRY_STOUT).unwrap();
        assert_eq!(recipes.len(), 1);

        let recipe = &recipes[0];
        assert_eq!(recipe.name, "Dry Stout");
        assert_eq!(recipe.recipe_type.as_deref(), Some("All Grain"));
        assert_eq!(recipe.brewer.as_deref(), Some("Brad Smith"));
        assert_eq!(recipe.batch_size, Some(18.93));
        assert_eq!(recipe.boil_time, Some(60.0));
        assert_eq!(recipe.original_gravity, Some(1.036));
        assert_eq!(recipe.final_gravity, None);

        let style = recipe.style.as_ref().unwrap();
        assert_eq!(style.category.as_deref(), Some("Stout"));
        assert_eq!(style.style_type.as_deref(), Some("Ale"));

        assert_eq!(recipe.fermentables.len(), 2);
        assert_eq!(recipe.fermentables[0].name, "Pale Malt (2 row) UK");
        assert_eq!(recipe.fermentables[1].amount, 0.91);

        assert_eq!(recipe.hops[0].alpha, Some(4.5));
        assert_eq!(recipe.hops[0].hop_use.as_deref(), Some("Boil"));

        assert_eq!(recipe.yeasts[0].product_id.as_deref(), Some("1084"));
        assert!(!recipe.yeasts[0].amount_is_weight);
        assert!(recipe.miscs[0].amount_is_weight);

        assert_eq!(recipe.mash_steps.len(), 1);
        assert_eq!(recipe.mash_steps[0].step_temp, Some(68.0));

        assert_eq!(
            recipe.notes.as_deref(),
            Some("Roast & flaked barley give the dry finish.")
        );
    }

    #[test]
    fn test_lone_recipe_root_and_lowercase_tags() {
        let xml = "<recipe><name>Kölsch</name><batch_size>20</batch_size></recipe>";
        let recipes = BeerXmlDecoder.decode_str(xml).unwrap();
        assert_eq!(recipes[0].name, "Kölsch");
        assert_eq!(recipes[0].batch_size, Some(20.0));
    }

    #[test]
    fn test_declared_latin1_encoding() {
        let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n\
            <RECIPES><RECIPE><NAME>K\xF6lsch</NAME>\
            <NOTES>M\xE4rzen &amp; pils malt</NOTES></RECIPE></RECIPES>";
        let recipes = BeerXmlDecoder.decode(xml).unwrap();
        assert_eq!(recipes[0].name, "Kölsch");
        assert_eq!(recipes[0].notes.as_deref(), Some("Märzen & pils malt"));
    }

    #[test]
    fn test_cdata_notes() {
        let xml = "<RECIPE><NAME>Saison</NAME><NOTES><![CDATA[Ferment <warm> & dry]]></NOTES></RECIPE>";
        let recipes = BeerXmlDecoder.decode_str(xml).unwrap();
        assert_eq!(recipes[0].notes.as_deref(), Some("Ferment <warm> & dry"));
    }

    #[test]
    fn test_empty_documents() {
        assert!(BeerXmlDecoder.decode_str("<RECIPES/>").unwrap().is_empty());
        assert!(BeerXmlDecoder
            .decode_str("<?xml version=\"1.0\"?>\n<RECIPES>\n</RECIPES>")
            .unwrap()
            .is_empty());
        assert!(BeerXmlDecoder.decode(b"").unwrap().is_empty());
    }

    #[test]
    fn test_truncated_document() {
        let truncated = &DRY_STOUT[..DRY_STOUT.len() / 2];
        let err = BeerXmlDecoder.decode_str(truncated).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::Format);

        let err = format_error(BeerXmlDecoder.decode_str("<RECIPES><RECIPE><NAME>A</NAME>"));
        assert!(matches!(err, FormatError::Truncated(name) if name == "RECIPE"));
    }

    #[test]
    fn test_mismatched_tags() {
        let err = format_error(BeerXmlDecoder.decode_str("<RECIPES><RECIPE></HOPS></RECIPES>"));
        assert!(matches!(err, FormatError::Xml { .. }));
    }

    #[test]
    fn test_closing_tag_without_opening_tag() {
        let err = format_error(BeerXmlDecoder.decode_str("<RECIPES/></RECIPE>"));
        assert!(
            matches!(err, FormatError::Xml { .. } | FormatError::UnmatchedEnd(_)),
            "unexpected error {err:?}"
        );
    }

    #[test]
    fn test_rejects_unexpected_root() {
        let err = format_error(BeerXmlDecoder.decode_str("<HOPS><HOP/></HOPS>"));
        assert!(matches!(err, FormatError::UnexpectedRoot(name) if name == "HOPS"));
    }

    #[test]
    fn test_rejects_multiple_roots_and_stray_text() {
        let err = format_error(BeerXmlDecoder.decode_str("<RECIPES/><RECIPES/>"));
        assert!(matches!(err, FormatError::MultipleRoots));

        let err = format_error(BeerXmlDecoder.decode_str("<RECIPES/>trailing"));
        assert!(matches!(err, FormatError::StrayText(_)));
    }

    #[test]
    fn test_missing_name() {
        let err = format_error(BeerXmlDecoder.decode_str("<RECIPES><RECIPE><OG>1.050</OG></RECIPE></RECIPES>"));
        assert!(matches!(
            err,
            FormatError::MissingField {
                element: "RECIPE",
                field: "NAME"
            }
        ));
    }

    #[test]
    fn test_invalid_numbers() {
        let err = format_error(BeerXmlDecoder.decode_str(
            "<RECIPE><NAME>IPA</NAME><OG>one point oh six</OG></RECIPE>",
        ));
        assert!(matches!(err, FormatError::InvalidNumber { field, .. } if field == "OG"));

        let err = format_error(
            BeerXmlDecoder.decode_str("<RECIPE><NAME>IPA</NAME><BOIL_TIME>NaN</BOIL_TIME></RECIPE>"),
        );
        assert!(matches!(err, FormatError::InvalidNumber { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_format_error() {
        let err = BeerXmlDecoder
            .decode(b"<RECIPE><NAME>\xFF\xFE</NAME></RECIPE>")
            .unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::Format);
    }
}
