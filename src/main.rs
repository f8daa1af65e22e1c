use clap::Parser;
use std::path::PathBuf;
use std::process;
use tail_reader::{TailEvent, TailOptions, tail_with};
use tokio_stream::StreamExt;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "tail-reader", about = "Follow a file and print each complete record")]
struct Cli {
    /// File to follow
    path: PathBuf,

    /// Record delimiter; accepts \n, \r, \t, \0 and \\ escapes
    #[arg(short, long, default_value = "\\n")]
    delimiter: String,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("TAIL_READER_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Expands backslash escapes so control characters can be passed on the command line.
fn unescape_delimiter(raw: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => out.push(b'\n'),
            Some('r') => out.push(b'\r'),
            Some('t') => out.push(b'\t'),
            Some('0') => out.push(0),
            Some('\\') => out.push(b'\\'),
            Some(other) => {
                out.push(b'\\');
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => out.push(b'\\'),
        }
    }
    out
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = TailOptions::default().delimiter(unescape_delimiter(&cli.delimiter));
    let mut stream = match tail_with(&cli.path, options) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("Error setting up tail: {}", e);
            process::exit(1);
        }
    };
    info!(path = %cli.path.display(), "following file");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                stream.close().await;
                break;
            }
            event = stream.next() => match event {
                Some(TailEvent::Line(line)) => println!("{}", line.to_string_lossy()),
                Some(TailEvent::Truncated) => eprintln!("tail-reader: {}: file truncated", cli.path.display()),
                Some(TailEvent::Error(e)) => eprintln!("tail-reader: {}: {}", cli.path.display(), e),
                None => break,
            },
        }
    }
}
