use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::time::Instant;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Constructs the BWT of the given file. The output starts with the \
                  primary index as four little-endian bytes, followed by the \
                  transformed data."
)]
struct Args {
    #[arg(short = 'i', long, help = "Path to an input file")]
    input_file: String,

    #[arg(
        short = 'o',
        long,
        help = "Path to an output bwt file (if none, verification mode will be activated)"
    )]
    output_file: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let text = read_text(&args.input_file)?;

    let elapsed_ms = if let Some(output_file) = args.output_file.as_ref() {
        let now = Instant::now();
        let (bwt, primary_index) = divbwt::bwt(&text)?;
        let elapsed_ms = now.elapsed().as_millis();
        let mut writer = BufWriter::new(File::create(output_file)?);
        writer.write_all(&(primary_index as u32).to_le_bytes())?;
        writer.write_all(&bwt)?;
        elapsed_ms
    } else {
        eprintln!("VERIFICATION MODE: The BWT will not be saved.");
        let now = Instant::now();
        let (bwt, primary_index) = divbwt::bwt(&text)?;
        let elapsed_ms = now.elapsed().as_millis();
        let decoded = divbwt::decode_bwt(&bwt, primary_index)?;
        if decoded != text {
            eprintln!("ERROR: The decoded text is different from the original text.");
        } else {
            eprintln!("NO PROBLEM: The decoded text is the same as the original text.");
        }
        elapsed_ms
    };
    println!("Elapsed sec: {}", elapsed_ms as f64 / 1000.0);

    Ok(())
}

fn read_text(input_file: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut file: File = File::open(input_file)?;
    let n_bytes = file.metadata()?.len();
    let mut text = Vec::with_capacity(n_bytes as usize);
    file.read_to_end(&mut text)?;
    Ok(text)
}
