use std::io::{Read, Write};

use clap::Parser;

/// Encode or decode FontForge SFD UTF-7, reading standard input
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Decode, not encode
    #[arg(short, long)]
    decode: bool,

    /// Quote string for storing in .sfd (or unquote quoted string)
    #[arg(short, long)]
    quote: bool,

    /// Replace characters not allowed in XML after decoding
    #[arg(short = 'x', long, requires = "decode")]
    xml_safe: bool,

    /// Set the level of verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: &Args) -> Result<Vec<u8>, String> {
    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .map_err(|e| format!("Could not read standard input: {}", e))?;
    log::debug!("Read {} bytes", input.len());

    if args.decode {
        let decoded = sfdutf7::decode(&input, args.quote).map_err(|e| e.to_string())?;
        let decoded = if args.xml_safe {
            sfdutf7::xml::force_xml_text(&decoded).into_owned()
        } else {
            decoded
        };
        Ok(decoded.into_bytes())
    } else {
        let text = String::from_utf8(input).map_err(|e| format!("Input is not UTF-8: {}", e))?;
        Ok(sfdutf7::encode(&text, args.quote))
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    let output = match run(&args) {
        Ok(output) => output,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(&output).and_then(|_| stdout.flush()) {
        log::error!("Could not write standard output: {}", e);
        std::process::exit(1);
    }
}
