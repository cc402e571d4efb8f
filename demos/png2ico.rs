use clap::{App, Arg, SubCommand};
use log::LevelFilter;
use std::fs;
use std::path::Path;
use std::process;

//===========================================================================//

fn main() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let matches = App::new("png2ico")
        .version("0.1")
        .about("Converts PNG files into multi-resolution ICO files")
        .arg(
            Arg::with_name("input")
                .takes_value(true)
                .value_name("DIR")
                .short("f")
                .help("Directory containing .png files to convert"),
        )
        .arg(
            Arg::with_name("output")
                .takes_value(true)
                .value_name("DIR")
                .short("o")
                .help("Output directory for .ico files"),
        )
        .arg(
            Arg::with_name("alpha-mask")
                .long("alpha-mask")
                .help("Derives each mask from the alpha channel"),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Lists the entries in an ICO file")
                .arg(Arg::with_name("ico").required(true)),
        )
        .get_matches();

    if let Some(submatches) = matches.subcommand_matches("list") {
        let path = submatches.value_of("ico").unwrap();
        let file = fs::File::open(path).unwrap();
        let icondir = pngico::IconDir::read(file).unwrap();
        for (index, entry) in icondir.entries().iter().enumerate() {
            println!(
                "{:5}: {}x{} {} bpp, {} bytes at offset {}",
                index,
                entry.width(),
                entry.height(),
                entry.bits_per_pixel(),
                entry.data_size(),
                entry.data_offset()
            );
        }
        return;
    }

    let (input_dir, output_dir) =
        match (matches.value_of("input"), matches.value_of("output")) {
            (Some(input), Some(output)) => (input, output),
            _ => {
                eprintln!("Usage: png2ico -f <input dir> -o <output dir>");
                process::exit(2);
            }
        };
    let mut encoder = pngico::IconEncoder::new();
    if matches.is_present("alpha-mask") {
        encoder =
            encoder.with_mask_policy(pngico::MaskPolicy::AlphaThreshold(0x80));
    }
    let report = match pngico::convert_dir(
        Path::new(input_dir),
        Path::new(output_dir),
        &encoder,
    ) {
        Ok(report) => report,
        Err(error) => {
            log::error!("{}", error);
            process::exit(1);
        }
    };
    log::info!(
        "Conversion completed: {} converted, {} failed",
        report.converted().len(),
        report.failed().len()
    );
    if !report.failed().is_empty() {
        process::exit(1);
    }
}

//===========================================================================//
