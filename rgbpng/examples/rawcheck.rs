// cargo r --example rawcheck -- 'tests/pngsuite/**/*.png'
use log::{info, error, trace};
use rgbpng::image::*;

fn display_arr(r: &[u8]) -> Vec<f32> {
    let n = r.len();
    let step = (n / 10) + if n % 10 == 0 { 0 } else { 1 };
    let mut out = vec![];
    for chunk in r.chunks(step.max(1)) {
        let len = chunk.len() as f32;
        let mean: f32 = chunk.iter().map(|&i| i as f32 / len).sum();
        out.push(mean.round());
    }

    out
}

fn display_result(r: &Result<RasterGrid>) -> String {
    match r {
        Ok(img) => {
            format!("{}x{}x{} ({}): {:?}", img.width(), img.height(), RasterGrid::CHANNELS, img.as_raw().len(), &display_arr(img.as_raw()))
        },
        Err(e) => {
            e.to_string()
        }
    }
}

pub fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let pattern = match std::env::args().nth(1) {
        Some(p) => p,
        None => {
            eprintln!("usage: rawcheck <glob pattern>");
            std::process::exit(2);
        }
    };

    let (mut ok, mut failed) = (0usize, 0usize);
    for entry in glob::glob(&pattern).expect("Fail to read glob pattern") {
        let fpath = &entry.expect("entry list failed");
        trace!("check... {}", fpath.display());

        let img = RasterGrid::load(fpath);
        match &img {
            Ok(_) => {
                ok += 1;
                info!("OK {}: {}", fpath.display(), display_result(&img));
            },
            Err(e) => {
                failed += 1;
                match e.kind() {
                    ErrorKind::UnsupportedVariant { .. } => info!("SKIP {}: {}", fpath.display(), e),
                    _ => error!("ERR {}: {}", fpath.display(), display_result(&img)),
                }
            },
        }
    }

    info!("{} decoded, {} rejected", ok, failed);
}
