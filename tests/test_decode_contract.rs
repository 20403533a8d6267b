use beer_recipe_io::{
    AutoDecoder, BeerJsonDecoder, BeerRecipeDecoder, BeerXmlDecoder, DecodeErrorKind,
    DecodeOutcome,
};

const TWO_RECIPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<RECIPES>
  <RECIPE>
    <NAME>Burton Ale</NAME>
    <VERSION>1</VERSION>
    <TYPE>All Grain</TYPE>
    <BATCH_SIZE>18.93</BATCH_SIZE>
    <BOIL_TIME>60</BOIL_TIME>
    <FERMENTABLES>
      <FERMENTABLE><NAME>Pale Malt</NAME><AMOUNT>5.44</AMOUNT></FERMENTABLE>
    </FERMENTABLES>
    <HOPS>
      <HOP><NAME>Northern Brewer</NAME><ALPHA>7.5</ALPHA><AMOUNT>0.0283</AMOUNT><USE>Boil</USE><TIME>60</TIME></HOP>
      <HOP><NAME>Goldings</NAME><ALPHA>5.0</ALPHA><AMOUNT>0.0142</AMOUNT><USE>Aroma</USE><TIME>0</TIME></HOP>
    </HOPS>
  </RECIPE>
  <RECIPE>
    <NAME>Dry Stout</NAME>
    <VERSION>1</VERSION>
    <TYPE>All Grain</TYPE>
    <OG>1.036</OG>
  </RECIPE>
</RECIPES>"#;

const TWO_RECIPES_JSON: &str = r#"{
  "beerjson": {
    "version": 1.0,
    "recipes": [
      {"name": "Burton Ale", "batch_size": {"unit": "l", "value": 18.93}},
      {"name": "Dry Stout", "original_gravity": {"unit": "sg", "value": 1.036}}
    ]
  }
}"#;

fn decoders() -> Vec<(&'static str, Box<dyn BeerRecipeDecoder>)> {
    vec![
        ("beerxml", Box::new(BeerXmlDecoder) as Box<dyn BeerRecipeDecoder>),
        ("beerjson", Box::new(BeerJsonDecoder) as Box<dyn BeerRecipeDecoder>),
        ("auto", Box::new(AutoDecoder) as Box<dyn BeerRecipeDecoder>),
    ]
}

fn same_outcome(a: &DecodeOutcome, b: &DecodeOutcome) -> bool {
    match (a, b) {
        (Ok(x), Ok(y)) => x == y,
        (Err(x), Err(y)) => x.kind() == y.kind(),
        _ => false,
    }
}

#[test]
fn test_decoding_is_deterministic() {
    let inputs: [&[u8]; 5] = [
        TWO_RECIPES_XML.as_bytes(),
        TWO_RECIPES_JSON.as_bytes(),
        b"",
        b"<RECIPES><RECIPE>",
        b"\x00\x01garbage",
    ];

    for (name, decoder) in decoders() {
        for input in inputs {
            let first = decoder.decode(input);
            let second = decoder.decode(input);
            assert!(
                same_outcome(&first, &second),
                "{name} decoder is not deterministic for {input:?}"
            );
        }
    }
}

#[test]
fn test_text_adapter_matches_byte_decoding() {
    for text in [TWO_RECIPES_XML, TWO_RECIPES_JSON, "   ", "<RECIPES>"] {
        for (name, decoder) in decoders() {
            let from_text = decoder.decode_str(text);
            let from_bytes = decoder.decode(text.as_bytes());
            assert!(
                same_outcome(&from_text, &from_bytes),
                "{name} decoder disagrees between text and bytes"
            );
        }
    }
}

#[test]
fn test_unencodable_text_is_encoding_error() {
    let mut units: Vec<u16> = TWO_RECIPES_XML.encode_utf16().collect();
    // Unpaired low surrogate in the middle of the document
    units.insert(40, 0xDC00);

    for (name, decoder) in decoders() {
        let err = decoder.decode_utf16(&units).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::Encoding, "{name} decoder");
    }
}

#[test]
fn test_utf16_text_decodes_like_utf8() {
    let units: Vec<u16> = TWO_RECIPES_XML.encode_utf16().collect();
    let from_utf16 = BeerXmlDecoder.decode_utf16(&units).unwrap();
    let from_utf8 = BeerXmlDecoder.decode_str(TWO_RECIPES_XML).unwrap();
    assert_eq!(from_utf16, from_utf8);
}

#[test]
fn test_two_recipes_in_document_order() {
    for (format, document) in [("xml", TWO_RECIPES_XML), ("json", TWO_RECIPES_JSON)] {
        let recipes = AutoDecoder.decode_str(document).unwrap();
        assert_eq!(recipes.len(), 2, "{format}");
        assert_eq!(recipes[0].name, "Burton Ale", "{format}");
        assert_eq!(recipes[1].name, "Dry Stout", "{format}");
        assert_eq!(recipes[0].batch_size, Some(18.93), "{format}");
        assert_eq!(recipes[1].original_gravity, Some(1.036), "{format}");
    }

    let recipes = BeerXmlDecoder.decode_str(TWO_RECIPES_XML).unwrap();
    let hops: Vec<&str> = recipes[0].hops.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(hops, ["Northern Brewer", "Goldings"]);
}

#[test]
fn test_zero_recipe_documents_succeed() {
    let empty_documents = [
        (BeerXmlDecoder.decode_str("<RECIPES></RECIPES>"), "empty RECIPES"),
        (
            BeerXmlDecoder.decode_str("<?xml version=\"1.0\"?><RECIPES/>"),
            "self-closing RECIPES",
        ),
        (BeerXmlDecoder.decode_str(""), "blank xml"),
        (
            BeerJsonDecoder.decode_str(r#"{"beerjson": {"version": 1.0, "recipes": []}}"#),
            "empty recipes array",
        ),
        (BeerJsonDecoder.decode_str("\n"), "blank json"),
        (AutoDecoder.decode_str(""), "blank auto"),
    ];

    for (outcome, case) in empty_documents {
        let recipes = outcome.unwrap_or_else(|e| panic!("{case}: {e}"));
        assert!(recipes.is_empty(), "{case}");
    }
}

#[test]
fn test_malformed_documents_are_format_errors() {
    let xml_cut = &TWO_RECIPES_XML[..TWO_RECIPES_XML.len() - 30];
    let json_cut = &TWO_RECIPES_JSON[..TWO_RECIPES_JSON.len() - 10];

    let malformed: [(&dyn BeerRecipeDecoder, &[u8]); 6] = [
        (&BeerXmlDecoder, xml_cut.as_bytes()),
        (&BeerXmlDecoder, b"<RECIPES><RECIPE><NAME>X</NAME></RECIPE>"),
        (&BeerXmlDecoder, b"<RECIPES><RECIPE><NAME>\xC3\x28</NAME></RECIPE></RECIPES>"),
        (&BeerJsonDecoder, json_cut.as_bytes()),
        (&BeerJsonDecoder, b"{\"beerjson\": {\"recipes\": [{\"name\": 7}]}}"),
        (&AutoDecoder, b"\x89PNG\r\n\x1a\n"),
    ];

    for (decoder, bytes) in malformed {
        match decoder.decode(bytes) {
            Err(e) => assert_eq!(e.kind(), DecodeErrorKind::Format, "{bytes:?}"),
            Ok(recipes) => panic!("expected failure for {bytes:?}, got {} recipes", recipes.len()),
        }
    }
}
