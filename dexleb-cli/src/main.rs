use clap::{Args, Parser, Subcommand, ValueEnum};
use dexleb::{Leb128Reader, MAX_LEB128_LEN};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dexleb", about = "Encode, decode and dump DEX LEB128 values")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the LEB128 encoding of each value as hex bytes
    Encode {
        #[command(flatten)]
        form: FormArgs,
        /// Values to encode (decimal, or 0x-prefixed hex)
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<String>,
    },
    /// Decode every LEB128 value in a hex string
    Decode {
        #[command(flatten)]
        form: FormArgs,
        /// Use the tolerant decoder, ignoring high bits in a fifth byte
        #[arg(long)]
        lenient: bool,
        /// Hex bytes, whitespace allowed (e.g. "80 01 7f")
        hex: String,
    },
    /// Print the encoded size of each value
    Size {
        #[command(flatten)]
        form: FormArgs,
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<String>,
    },
    /// Decode consecutive LEB128 values from a file
    Dump {
        /// Path to the input file
        input: PathBuf,
        #[command(flatten)]
        form: FormArgs,
        /// Byte offset to start at
        #[arg(long, default_value = "0", value_parser = parse_offset)]
        offset: usize,
        /// Stop after this many values
        #[arg(long)]
        count: Option<usize>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Args, Clone, Copy)]
struct FormArgs {
    /// Signed LEB128 (sleb128)
    #[arg(long, conflicts_with = "p1")]
    signed: bool,
    /// Unsigned LEB128 holding value + 1 (uleb128p1)
    #[arg(long)]
    p1: bool,
}

impl FormArgs {
    fn form(self) -> Form {
        if self.signed {
            Form::Signed
        } else if self.p1 {
            Form::P1
        } else {
            Form::Unsigned
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Yaml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Form {
    Unsigned,
    Signed,
    P1,
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Form::Unsigned => "uleb128",
            Form::Signed => "sleb128",
            Form::P1 => "uleb128p1",
        })
    }
}

impl Form {
    fn decode_checked(self, data: &[u8], offset: usize) -> Result<(i64, usize), CliError> {
        Ok(match self {
            Form::Unsigned => {
                let (v, end) = dexleb::decode_unsigned_checked(data, offset, None)?;
                (i64::from(v), end)
            }
            Form::Signed => {
                let (v, end) = dexleb::decode_signed_checked(data, offset, None)?;
                (i64::from(v), end)
            }
            Form::P1 => {
                let (v, end) = dexleb::decode_unsigned_p1_checked(data, offset, None)?;
                (i64::from(v), end)
            }
        })
    }

    /// Caller must make sure the encoding at `offset` ends inside `data`.
    fn decode_lenient(self, data: &[u8], offset: usize) -> (i64, usize) {
        match self {
            Form::Unsigned => {
                let (v, end) = dexleb::decode_unsigned(data, offset);
                (i64::from(v), end)
            }
            Form::Signed => {
                let (v, end) = dexleb::decode_signed(data, offset);
                (i64::from(v), end)
            }
            Form::P1 => {
                let (v, end) = dexleb::decode_unsigned_p1(data, offset);
                (i64::from(v), end)
            }
        }
    }

    fn read(self, reader: &mut Leb128Reader<'_>) -> dexleb::Result<i64> {
        Ok(match self {
            Form::Unsigned => i64::from(reader.read_unsigned()?),
            Form::Signed => i64::from(reader.read_signed()?),
            Form::P1 => i64::from(reader.read_unsigned_p1()?),
        })
    }

    fn encode(self, value: i64) -> Result<Vec<u8>, CliError> {
        let mut out = Vec::with_capacity(MAX_LEB128_LEN);
        match self {
            Form::Unsigned => dexleb::push_unsigned(&mut out, self.unsigned(value)?),
            Form::Signed => dexleb::push_signed(&mut out, self.signed(value)?),
            Form::P1 => {
                let value = self.signed(value)?;
                out.resize(dexleb::unsigned_p1_size(value), 0);
                dexleb::encode_unsigned_p1(&mut out, 0, value);
            }
        }
        Ok(out)
    }

    fn size(self, value: i64) -> Result<usize, CliError> {
        Ok(match self {
            Form::Unsigned => dexleb::unsigned_size(self.unsigned(value)?),
            Form::Signed => dexleb::signed_size(self.signed(value)?),
            Form::P1 => dexleb::unsigned_p1_size(self.signed(value)?),
        })
    }

    fn unsigned(self, value: i64) -> Result<u32, CliError> {
        u32::try_from(value).map_err(|_| CliError::OutOfRange { value, form: self })
    }

    fn signed(self, value: i64) -> Result<i32, CliError> {
        i32::try_from(value).map_err(|_| CliError::OutOfRange { value, form: self })
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Leb128(#[from] dexleb::Error),

    #[error("Invalid hex input: {0}")]
    InvalidHex(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("{value} does not fit in a {form} value")]
    OutOfRange { value: i64, form: Form },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// One decoded value and where it sits in the input.
#[derive(Debug, PartialEq, Eq, Serialize)]
struct Record {
    offset: usize,
    value: i64,
    len: usize,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encode { form, values } => cmd_encode(form.form(), &values),
        Commands::Decode { form, lenient, hex } => cmd_decode(form.form(), lenient, &hex),
        Commands::Size { form, values } => cmd_size(form.form(), &values),
        Commands::Dump {
            input,
            form,
            offset,
            count,
            format,
        } => cmd_dump(&input, form.form(), offset, count, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_encode(form: Form, values: &[String]) -> Result<(), CliError> {
    for text in values {
        let bytes = form.encode(parse_number(text)?)?;
        println!("{text}: {}", format_hex(&bytes));
    }
    Ok(())
}

fn cmd_size(form: Form, values: &[String]) -> Result<(), CliError> {
    for text in values {
        println!("{text}: {}", form.size(parse_number(text)?)?);
    }
    Ok(())
}

fn cmd_decode(form: Form, lenient: bool, hex: &str) -> Result<(), CliError> {
    let data = parse_hex(hex)?;
    let records = decode_all(&data, form, lenient)?;
    print_text(&data, &records);
    Ok(())
}

fn cmd_dump(
    path: &Path,
    form: Form,
    offset: usize,
    count: Option<usize>,
    format: Format,
) -> Result<(), CliError> {
    let io_err = |source| CliError::Io {
        path: path.display().to_string(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    // SAFETY: the mapping is read-only and dropped before returning. Another
    // process truncating the file underneath us is not guarded against.
    let map = unsafe { memmap2::Mmap::map(&file) }.map_err(io_err)?;
    log::info!("Mapped {} ({} bytes)", path.display(), map.len());

    let records = dump_records(&map, form, offset, count);
    match format {
        Format::Text => print_text(&map, &records),
        Format::Yaml => print!("{}", serde_yaml::to_string(&records)?),
    }
    Ok(())
}

/// Decode back-to-back values covering the whole of `data`.
fn decode_all(data: &[u8], form: Form, lenient: bool) -> Result<Vec<Record>, CliError> {
    let mut records = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let (value, next) = if lenient && terminates_in(data, offset) {
            form.decode_lenient(data, offset)
        } else {
            form.decode_checked(data, offset)?
        };
        records.push(Record {
            offset,
            value,
            len: next - offset,
        });
        offset = next;
    }
    Ok(records)
}

/// Decode from `offset` until the data runs out, `count` values have been
/// read, or an invalid encoding is hit.
fn dump_records(data: &[u8], form: Form, offset: usize, count: Option<usize>) -> Vec<Record> {
    let mut reader = Leb128Reader::at(data, offset);
    let mut records = Vec::new();
    while !reader.is_empty() && count.is_none_or(|count| records.len() < count) {
        let start = reader.position();
        match form.read(&mut reader) {
            Ok(value) => records.push(Record {
                offset: start,
                value,
                len: reader.position() - start,
            }),
            Err(e) => {
                log::warn!("Stopped after {} values: {e}", records.len());
                break;
            }
        }
    }
    records
}

/// Whether the tolerant decoders can read the value at `offset` without
/// running off the end of `data`.
fn terminates_in(data: &[u8], offset: usize) -> bool {
    let rest = &data[offset..];
    rest.len() >= MAX_LEB128_LEN || rest.iter().any(|b| b & 0x80 == 0)
}

fn print_text(data: &[u8], records: &[Record]) {
    for r in records {
        println!(
            "{:#010x}  {:<12} {}",
            r.offset,
            r.value,
            format_hex(&data[r.offset..r.offset + r.len])
        );
    }
}

fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_hex(text: &str) -> Result<Vec<u8>, CliError> {
    let digits: Vec<char> = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(CliError::InvalidHex(format!(
            "odd number of digits ({})",
            digits.len()
        )));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair: String = pair.iter().collect();
            u8::from_str_radix(&pair, 16).map_err(|_| CliError::InvalidHex(pair))
        })
        .collect()
}

fn parse_number(text: &str) -> Result<i64, CliError> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    }
    .map_err(|_| CliError::InvalidNumber(text.to_string()))?;
    Ok(if negative { -magnitude } else { magnitude })
}

fn parse_offset(text: &str) -> Result<usize, String> {
    parse_number(text)
        .ok()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| format!("invalid offset: {text}"))
}
