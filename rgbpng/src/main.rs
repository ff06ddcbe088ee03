use log::{info, error};
use rgbpng::image::{decode_with_options, DecodeOptions};

use std::process::exit;

const MAX_DIMENSION_VAR: &str = "RGBPNG_MAX_DIMENSION";

fn options_from_env() -> DecodeOptions {
    let mut opts = DecodeOptions::default();
    if let Ok(v) = std::env::var(MAX_DIMENSION_VAR) {
        match v.parse() {
            Ok(n) => opts.max_dimension = n,
            Err(e) => error!("ignoring {}={:?}: {}", MAX_DIMENSION_VAR, v, e),
        }
    }
    opts
}

fn run(input: &str, output: &str) -> rgbpng::image::Result<()> {
    let bytes = std::fs::read(input)?;
    let img = decode_with_options(&bytes, &options_from_env())?;
    drop(bytes);
    info!("{}: {}x{}", input, img.width(), img.height());

    // Save data as a raw bitmap.
    std::fs::write(output, img.as_raw())?;
    Ok(())
}

fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: {} <input.png> <output.raw>", args.get(0).map(|s| s.as_str()).unwrap_or("rgbpng"));
        exit(2);
    }

    if let Err(e) = run(&args[1], &args[2]) {
        error!("{}: {}", args[1], e);
        exit(1);
    }
}
