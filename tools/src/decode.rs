use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::io::Write;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Inverts a BWT file produced by the bwt tool (four little-endian \
                  primary-index bytes followed by the transformed data)."
)]
struct Args {
    #[arg(short = 'i', long)]
    input_file: String,

    #[arg(short = 'o', long)]
    output_file: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let raw = read_text(&args.input_file)?;
    if raw.len() < 4 {
        return Err("input file is too short to hold a primary index header".into());
    }

    let primary_index = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
    let text = divbwt::decode_bwt(&raw[4..], primary_index)?;

    let mut writer = File::create(&args.output_file)?;
    writer.write_all(&text)?;

    Ok(())
}

fn read_text(input_file: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut file: File = File::open(input_file)?;
    let mut text = Vec::new();
    file.read_to_end(&mut text)?;
    Ok(text)
}
