use std::error::Error;
use std::fs;
use std::io::{self, BufReader, Write};
use std::path::Path;

use clap::{ArgAction, Parser};
use nestedtext::{DecodeOptions, EncodeOptions, TopLevel, Value};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nt", version, about = "NestedText to JSON converter (and back)")]
struct Args {
    /// Input file path (.json or .nt). Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Force encode mode: JSON in, NestedText out.
    #[arg(short = 'e', long, conflicts_with = "decode")]
    encode: bool,

    /// Force decode mode: NestedText in, JSON out.
    #[arg(short = 'd', long)]
    decode: bool,

    /// Required shape of the decoded document: list, dict or dict.<key>.
    #[arg(long = "top-level", value_name = "mode", value_parser = parse_top_level)]
    top_level: Option<TopLevel>,

    /// Indentation size for the output (default: 2).
    #[arg(long, value_name = "number", default_value_t = 2)]
    indent: usize,

    /// Longest inline list the encoder may write, in bytes (0 disables).
    #[arg(long = "inline-limit", value_name = "number")]
    inline_limit: Option<usize>,

    /// Write JSON on a single line.
    #[arg(long)]
    compact: bool,

    /// Log more detail to stderr (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Encode,
    Decode,
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(String),
}

impl InputSource {
    fn from_arg(input: Option<&str>) -> Self {
        match input {
            None | Some("-") => InputSource::Stdin,
            Some(path) => InputSource::File(path.to_string()),
        }
    }

    fn label(&self) -> &str {
        match self {
            InputSource::Stdin => "stdin",
            InputSource::File(path) => path,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let input_source = InputSource::from_arg(args.input.as_deref());
    let mode = resolve_mode(&args, &input_source)?;
    debug!(?mode, input = input_source.label(), "starting conversion");

    match mode {
        Mode::Encode => run_encode(&args, &input_source),
        Mode::Decode => run_decode(&args, &input_source),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_encode(args: &Args, input_source: &InputSource) -> Result<(), Box<dyn Error>> {
    let json: serde_json::Value = match input_source {
        InputSource::Stdin => serde_json::from_reader(io::stdin().lock())?,
        InputSource::File(path) => serde_json::from_reader(BufReader::new(fs::File::open(path)?))?,
    };
    let value = Value::try_from(json)?;

    let mut options = EncodeOptions::new().with_indent_by(args.indent);
    if let Some(limit) = args.inline_limit {
        options = options.with_inline_limit(limit);
    }

    let output_target = OutputTarget::from_arg(args.output.as_deref());
    let written = with_output_writer(output_target.path(), |writer| {
        Ok(nestedtext::encode(&value, writer, &options)?)
    })?;
    debug!(bytes = written, "wrote NestedText");
    if let OutputTarget::File(path) = &output_target {
        report_status(Mode::Encode, input_source, path);
    }
    Ok(())
}

fn run_decode(args: &Args, input_source: &InputSource) -> Result<(), Box<dyn Error>> {
    let mut options = DecodeOptions::new();
    if let Some(top_level) = &args.top_level {
        options = options.with_top_level(top_level.clone());
    }

    let value = match input_source {
        InputSource::Stdin => nestedtext::parse_buffered(io::stdin().lock(), &options)?,
        InputSource::File(path) => nestedtext::parse(fs::File::open(path)?, &options)?,
    };
    let json = value.map_or(serde_json::Value::Null, serde_json::Value::from);

    let output_target = OutputTarget::from_arg(args.output.as_deref());
    let indent = if args.compact { 0 } else { args.indent };
    with_output_writer(output_target.path(), |writer| {
        write_json(writer, &json, indent)?;
        writer.write_all(b"\n")?;
        Ok(())
    })?;
    if let OutputTarget::File(path) = &output_target {
        report_status(Mode::Decode, input_source, path);
    }
    Ok(())
}

fn resolve_mode(args: &Args, input_source: &InputSource) -> Result<Mode, Box<dyn Error>> {
    if args.encode {
        return Ok(Mode::Encode);
    }

    if args.decode {
        return Ok(Mode::Decode);
    }

    match input_source {
        InputSource::Stdin => Ok(Mode::Decode),
        InputSource::File(path) => match Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(Mode::Encode),
            Some("nt") => Ok(Mode::Decode),
            _ => Err("unable to auto-detect mode; use --encode or --decode".into()),
        },
    }
}

fn parse_top_level(raw: &str) -> Result<TopLevel, String> {
    raw.parse::<TopLevel>().map_err(|err| err.to_string())
}

#[derive(Clone, Debug)]
enum OutputTarget {
    Stdout,
    File(String),
}

impl OutputTarget {
    fn from_arg(output: Option<&str>) -> Self {
        match output {
            Some(path) if path != "-" => OutputTarget::File(path.to_string()),
            _ => OutputTarget::Stdout,
        }
    }

    fn path(&self) -> Option<&str> {
        match self {
            OutputTarget::Stdout => None,
            OutputTarget::File(path) => Some(path.as_str()),
        }
    }
}

fn with_output_writer<T, F>(path: Option<&str>, f: F) -> Result<T, Box<dyn Error>>
where
    F: FnOnce(&mut dyn Write) -> Result<T, Box<dyn Error>>,
{
    match path {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            f(&mut file)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            f(&mut handle)
        }
    }
}

fn write_json(
    writer: &mut dyn Write,
    value: &serde_json::Value,
    indent: usize,
) -> Result<(), Box<dyn Error>> {
    if indent == 0 {
        serde_json::to_writer(writer, value)?;
        return Ok(());
    }

    let indent_bytes = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

fn report_status(mode: Mode, input_source: &InputSource, output_path: &str) {
    let verb = match mode {
        Mode::Encode => "Encoded",
        Mode::Decode => "Decoded",
    };
    println!("✔ {verb} {} → {output_path}", input_source.label());
}
