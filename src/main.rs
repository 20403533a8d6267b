use beer_recipe_io::{
    decode_url, decode_url_blocking, load_config, resolve_location, BeerRecipe, DecoderConfig,
    Format, HttpTransport,
};
use log::{debug, error, warn};
use std::env;

const USAGE: &str =
    "Usage: beer-recipe-io <url-or-path> [--format auto|beerxml|beerjson] [--blocking] [--json]";

#[derive(Debug, PartialEq)]
struct Args {
    location: String,
    format: Option<Format>,
    blocking: bool,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut location = None;
    let mut format = None;
    let mut blocking = false;
    let mut json = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--format" => {
                let value = iter
                    .next()
                    .ok_or("--format requires a value (auto, beerxml or beerjson)")?;
                format = Some(value.parse::<Format>()?);
            }
            "--blocking" => blocking = true,
            "--json" => json = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            value if location.is_none() => location = Some(value.to_string()),
            value => return Err(format!("Unexpected argument: {}", value)),
        }
    }

    let location = location.ok_or_else(|| format!("Please provide a URL or path\n{}", USAGE))?;
    Ok(Args {
        location,
        format,
        blocking,
        json,
    })
}

fn print_recipes(recipes: &[BeerRecipe], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(recipes)?);
    } else if recipes.is_empty() {
        println!("No recipes found.");
    } else {
        for recipe in recipes {
            println!("{}", recipe.summary());
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&raw)?;
    debug!("{:?}", args);

    let config = load_config().unwrap_or_else(|e| {
        warn!("Ignoring invalid configuration: {}", e);
        DecoderConfig::default()
    });
    let decoder = args.format.unwrap_or(config.format).decoder();
    let transport = HttpTransport::from_config(&config.http)?;
    let url = resolve_location(&args.location)?;

    let outcome = if args.blocking {
        decode_url_blocking(&decoder, &transport, &url)
    } else {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(decode_url(&decoder, &transport, &url))
    };

    match outcome {
        Ok(recipes) => print_recipes(&recipes, args.json),
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}
