// Command-line front end for lcwpack.
//
// Raw LCW streams are handled by `compress`, `decompress` and `commands`;
// the chunked container by `pack`, `unpack` and `blocks`. Inputs default to
// stdin and outputs to stdout.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::container::{self, CodecKind, DEFAULT_BLOCK_SIZE, MAX_CHUNK_LEN, PackOptions};
use crate::io::{hex, sha256};
use crate::lcw::{self, AddressMode, CommandIter};
use crate::text;

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// LCW (Format80) codec and chunked container tool.
#[derive(Parser, Debug)]
#[command(
    name = "lcwpack",
    version,
    about = "LCW/Format80 codec and chunked map-section container",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress input into a raw LCW stream.
    Compress(StreamArgs),
    /// Decompress a raw LCW stream.
    Decompress(DecompressArgs),
    /// Pack input into a chunked container.
    Pack(PackArgs),
    /// Unpack a chunked container.
    Unpack(UnpackArgs),
    /// Print the chunk table of a container.
    Blocks(BlocksArgs),
    /// Print the command listing of a raw LCW stream.
    Commands(PrintArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CodecArg {
    Lcw,
    Lzo,
    Store,
}

#[derive(Args, Debug)]
struct StreamArgs {
    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecompressArgs {
    /// Expected output size (supports K/M/G suffix).
    #[arg(long, short = 's', value_parser = parse_byte_size)]
    size: u64,

    /// Fail instead of warning when the stream decodes short.
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    io: StreamArgs,
}

#[derive(Args, Debug)]
struct PackArgs {
    /// Chunk codec.
    #[arg(long, value_enum, default_value_t = CodecArg::Lcw)]
    codec: CodecArg,

    /// Uncompressed bytes per chunk (supports K suffix, at most 65535).
    #[arg(long = "block-size", value_parser = parse_byte_size, default_value_t = DEFAULT_BLOCK_SIZE as u64)]
    block_size: u64,

    /// Write numbered Base64 section lines instead of binary.
    #[arg(long)]
    text: bool,

    #[command(flatten)]
    io: StreamArgs,
}

#[derive(Args, Debug)]
struct UnpackArgs {
    /// Expected output size (supports K/M/G suffix).
    #[arg(long, short = 's', value_parser = parse_byte_size)]
    size: u64,

    /// Chunk codec.
    #[arg(long, value_enum, default_value_t = CodecArg::Lcw)]
    codec: CodecArg,

    /// Read numbered Base64 section lines instead of binary.
    #[arg(long)]
    text: bool,

    #[command(flatten)]
    io: StreamArgs,
}

#[derive(Args, Debug)]
struct BlocksArgs {
    /// Read numbered Base64 section lines instead of binary.
    #[arg(long)]
    text: bool,

    /// Container file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct PrintArgs {
    /// Raw LCW stream file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    Pack,
    Unpack,
    Blocks,
    Commands,
    Config,
}

struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    codec: CodecArg,
    block_size: u64,
    size: u64,
    strict: bool,
    text: bool,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        codec: CodecArg::Lcw,
        block_size: DEFAULT_BLOCK_SIZE as u64,
        size: 0,
        strict: false,
        text: false,
        input_file: None,
        output_file: None,
    };

    match cli.command {
        Cmd::Compress(args) => {
            opts.command = Command::Compress;
            opts.input_file = args.input;
            opts.output_file = args.output;
        }
        Cmd::Decompress(args) => {
            opts.command = Command::Decompress;
            opts.size = args.size;
            opts.strict = args.strict;
            opts.input_file = args.io.input;
            opts.output_file = args.io.output;
        }
        Cmd::Pack(args) => {
            opts.command = Command::Pack;
            opts.codec = args.codec;
            opts.block_size = args.block_size;
            opts.text = args.text;
            opts.input_file = args.io.input;
            opts.output_file = args.io.output;
        }
        Cmd::Unpack(args) => {
            opts.command = Command::Unpack;
            opts.size = args.size;
            opts.codec = args.codec;
            opts.text = args.text;
            opts.input_file = args.io.input;
            opts.output_file = args.io.output;
        }
        Cmd::Blocks(args) => {
            opts.command = Command::Blocks;
            opts.text = args.text;
            opts.input_file = Some(args.input);
        }
        Cmd::Commands(args) => {
            opts.command = Command::Commands;
            opts.input_file = Some(args.input);
        }
        Cmd::Config => {}
    }
    opts
}

/// Default log filter for the verbosity flags; `RUST_LOG` still wins.
fn log_filter(opts: &Options) -> &'static str {
    if opts.quiet {
        return "error";
    }
    match opts.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("lcwpack".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let opts = resolve_options(cli);
        let _ = log_filter(&opts);
        let _ = build_pack_options(&opts);
    }
}

// ---------------------------------------------------------------------------
// Build PackOptions from CLI options
// ---------------------------------------------------------------------------

fn codec_kind(codec: CodecArg) -> CodecKind {
    match codec {
        CodecArg::Lcw => CodecKind::Lcw,
        CodecArg::Lzo => CodecKind::Lzo,
        CodecArg::Store => CodecKind::Store,
    }
}

fn build_pack_options(opts: &Options) -> Result<PackOptions, String> {
    if opts.block_size == 0 || opts.block_size > MAX_CHUNK_LEN as u64 {
        return Err(format!(
            "--block-size: {} is outside 1..={MAX_CHUNK_LEN}",
            opts.block_size
        ));
    }
    Ok(PackOptions {
        block_size: opts.block_size as usize,
        codec: codec_kind(opts.codec),
    })
}

fn expected_size(opts: &Options) -> Result<usize, String> {
    usize::try_from(opts.size).map_err(|_| format!("--size: {} is too large", opts.size))
}

// ---------------------------------------------------------------------------
// Input / output helpers
// ---------------------------------------------------------------------------

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, String> {
    match path {
        Some(path) => std::fs::read(path).map_err(|e| format!("input file: {}: {e}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .map_err(|e| format!("read error: {e}"))?;
            Ok(buf)
        }
    }
}

fn write_output(opts: &Options, bytes: &[u8]) -> Result<(), String> {
    let mut writer: Box<dyn Write> = match &opts.output_file {
        None => Box::new(BufWriter::with_capacity(BUF_SIZE, io::stdout().lock())),
        Some(path) => {
            if path.exists() && !opts.force {
                return Err(format!(
                    "output file exists, use -f to overwrite: {}",
                    path.display()
                ));
            }
            let file = File::create(path)
                .map_err(|e| format!("output file: {}: {e}", path.display()))?;
            Box::new(BufWriter::with_capacity(BUF_SIZE, file))
        }
    };
    writer
        .write_all(bytes)
        .and_then(|()| writer.flush())
        .map_err(|e| format!("write error: {e}"))
}

/// Container bytes from a numbered Base64 section body.
fn section_stream(input: &[u8]) -> Result<Vec<u8>, String> {
    let body = std::str::from_utf8(input).map_err(|e| format!("section text: {e}"))?;
    let lines = text::from_section_body(body).map_err(|e| format!("section text: {e}"))?;
    text::decode_lines(&lines).map_err(|e| format!("section text: {e}"))
}

fn digest_hex(bytes: &[u8]) -> Option<String> {
    sha256(bytes).map(|d| hex(&d))
}

fn fail(msg: impl std::fmt::Display) -> i32 {
    eprintln!("lcwpack: {msg}");
    1
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("lcwpack version {version}");

    let lzo = cfg!(feature = "lzo") as u8;
    let text_lines = cfg!(feature = "text") as u8;
    let file_io = cfg!(feature = "file-io") as u8;
    let parallel = cfg!(feature = "parallel") as u8;

    eprintln!("CODEC_LZO={lzo}");
    eprintln!("TEXT={text_lines}");
    eprintln!("FILE_IO={file_io}");
    eprintln!("PARALLEL={parallel}");
    eprintln!("DEFAULT_BLOCK_SIZE={DEFAULT_BLOCK_SIZE}");
    eprintln!("MAX_CHUNK_LEN={MAX_CHUNK_LEN}");
    eprintln!("TEXT_LINE_WIDTH={}", text::LINE_WIDTH);

    0
}

// ---------------------------------------------------------------------------
// Raw stream commands
// ---------------------------------------------------------------------------

fn cmd_compress(opts: &Options) -> i32 {
    let raw = match read_input(opts.input_file.as_deref()) {
        Ok(raw) => raw,
        Err(e) => return fail(e),
    };
    let stream = lcw::encode(&raw);
    log::info!(
        "compressed {} bytes into {} bytes ({} addressing)",
        raw.len(),
        stream.len(),
        AddressMode::for_source_len(raw.len()).name()
    );
    if let Err(e) = write_output(opts, &stream) {
        return fail(e);
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "compress",
            "input_size": raw.len(),
            "output_size": stream.len(),
            "relative": AddressMode::for_source_len(raw.len()).is_relative(),
        });
        eprintln!("{json:#}");
    }
    0
}

fn cmd_decompress(opts: &Options) -> i32 {
    let expected = match expected_size(opts) {
        Ok(n) => n,
        Err(e) => return fail(e),
    };
    let stream = match read_input(opts.input_file.as_deref()) {
        Ok(stream) => stream,
        Err(e) => return fail(e),
    };

    let mut out = vec![0u8; expected];
    let report = lcw::decode_detailed(&stream, &mut out);
    out.truncate(report.written);
    log::debug!(
        "decode stopped after {} input bytes: {:?}",
        report.consumed,
        report.stop
    );

    if report.written < expected {
        if opts.strict {
            return fail(format!(
                "decode error: {}",
                lcw::DecodeError::ShortOutput {
                    expected,
                    written: report.written,
                    stop: report.stop,
                }
            ));
        }
        log::warn!(
            "stream decoded to {} of {} bytes ({:?})",
            report.written,
            expected,
            report.stop
        );
    }

    if let Err(e) = write_output(opts, &out) {
        return fail(e);
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "decompress",
            "input_size": stream.len(),
            "consumed": report.consumed,
            "output_size": report.written,
            "expected_size": expected,
            "mode": report.mode.name(),
            "stop": format!("{:?}", report.stop),
        });
        eprintln!("{json:#}");
    }
    0
}

fn cmd_commands(opts: &Options) -> i32 {
    let stream = match read_input(opts.input_file.as_deref()) {
        Ok(stream) => stream,
        Err(e) => return fail(e),
    };

    let (mode, header_len) = AddressMode::detect(&stream);
    println!("LCW stream size:    {}", stream.len());
    println!("Addressing:         {}", mode.name());

    let mut iter = CommandIter::new(&stream[header_len..]);
    let mut output = 0usize;
    let mut count = 0usize;
    loop {
        let at = header_len + iter.position();
        match iter.next() {
            Some(Ok(cmd)) => {
                println!("  {at:08}  out={output:<8} {cmd}");
                output += cmd.output_len();
                count += 1;
            }
            Some(Err(e)) => return fail(e),
            None => break,
        }
    }
    if !iter.terminated() {
        log::warn!("stream has no terminator");
    }

    println!("Commands:           {count}");
    println!("Output size:        {output}");
    0
}

// ---------------------------------------------------------------------------
// Container commands
// ---------------------------------------------------------------------------

fn cmd_pack(opts: &Options) -> i32 {
    let pack_opts = match build_pack_options(opts) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let raw = match read_input(opts.input_file.as_deref()) {
        Ok(raw) => raw,
        Err(e) => return fail(e),
    };

    #[cfg(feature = "parallel")]
    let packed = container::pack_parallel(&raw, &pack_opts);
    #[cfg(not(feature = "parallel"))]
    let packed = container::pack_with(&raw, &pack_opts);

    let stream = match packed {
        Ok(stream) => stream,
        Err(e) => return fail(format!("pack error: {e}")),
    };
    let chunks = raw.len().div_ceil(pack_opts.block_size);
    log::info!(
        "packed {} bytes into {} chunks, {} bytes",
        raw.len(),
        chunks,
        stream.len()
    );

    let output = if opts.text {
        text::to_section_body(&text::encode_lines(&stream)).into_bytes()
    } else {
        stream
    };
    if let Err(e) = write_output(opts, &output) {
        return fail(e);
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "pack",
            "codec": pack_opts.codec.name(),
            "block_size": pack_opts.block_size,
            "input_size": raw.len(),
            "output_size": output.len(),
            "chunks": chunks,
            "raw_sha256": digest_hex(&raw),
        });
        eprintln!("{json:#}");
    }
    0
}

fn cmd_unpack(opts: &Options) -> i32 {
    let expected = match expected_size(opts) {
        Ok(n) => n,
        Err(e) => return fail(e),
    };
    let input = match read_input(opts.input_file.as_deref()) {
        Ok(input) => input,
        Err(e) => return fail(e),
    };
    let stream = if opts.text {
        match section_stream(&input) {
            Ok(stream) => stream,
            Err(e) => return fail(e),
        }
    } else {
        input
    };

    let codec = codec_kind(opts.codec);
    let raw = match container::unpack_with(&stream, expected, &codec) {
        Ok(raw) => raw,
        Err(e) => return fail(format!("unpack error: {e}")),
    };
    if raw.len() < expected {
        log::warn!(
            "container ended after {} of {} bytes",
            raw.len(),
            expected
        );
    }
    log::info!("unpacked {} bytes", raw.len());

    if let Err(e) = write_output(opts, &raw) {
        return fail(e);
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "unpack",
            "codec": codec.name(),
            "input_size": stream.len(),
            "output_size": raw.len(),
            "expected_size": expected,
            "raw_sha256": digest_hex(&raw),
        });
        eprintln!("{json:#}");
    }
    0
}

fn cmd_blocks(opts: &Options) -> i32 {
    let input = match read_input(opts.input_file.as_deref()) {
        Ok(input) => input,
        Err(e) => return fail(e),
    };
    let stream = if opts.text {
        match section_stream(&input) {
            Ok(stream) => stream,
            Err(e) => return fail(e),
        }
    } else {
        input
    };

    println!("Container size:     {}", stream.len());
    println!("  chunk    offset  compressed  uncompressed  output");

    let mut iter = container::chunks(&stream);
    for chunk in iter.by_ref() {
        match chunk {
            Ok(c) => println!(
                "  {:>5}  {:>8}  {:>10}  {:>12}  {:>6}",
                c.index,
                c.offset,
                c.header.compressed_len(),
                c.header.uncompressed_len(),
                c.output_offset
            ),
            Err(e) => return fail(e),
        }
    }

    if iter.terminated() {
        println!("Terminator at:      {}", iter.position() - container::CHUNK_HEADER_LEN);
    }
    if iter.trailing() > 0 {
        log::warn!("{} trailing bytes after the container", iter.trailing());
    }
    println!("Declared output:    {}", iter.output_len());
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match opts.command {
        Command::Compress => cmd_compress(&opts),
        Command::Decompress => cmd_decompress(&opts),
        Command::Pack => cmd_pack(&opts),
        Command::Unpack => cmd_unpack(&opts),
        Command::Blocks => cmd_blocks(&opts),
        Command::Commands => cmd_commands(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
