use std::{
    fs,
    io::{self, Read, Write},
    path::{Component, Path, PathBuf},
};

use bytekit_core::{
    archive::ArchiveWriter,
    base58, base64url, bigint,
    crc32::Crc32,
    ecc::{self, CurveParams, Point},
    frame::{pack_named_with, unpack_named_with, FrameLayout, NamedEntry},
    hex::{from_hex, to_hex},
    random::{random_hex_string, DEFAULT_HEX_LEN},
    BytekitError,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

//==================== Общие структуры/утилиты ====================//

#[derive(Parser)]
#[command(name = "bytekit", about = "Byte codecs, frames, store-only zip and compressed EC points")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file (or stdin) as text
    Encode {
        codec: Codec,
        /// Input file; stdin when omitted
        input: Option<PathBuf>,
    },

    /// Decode text (argument or stdin) back into bytes
    Decode {
        codec: Codec,
        /// Encoded text; stdin when omitted
        text: Option<String>,
        /// Write bytes to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the CRC-32 of each file
    Crc32 { files: Vec<PathBuf> },

    /// Store files (directories recursively) in a zip archive
    Zip {
        output: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Pack files into one named frame keyed by file name
    FramePack {
        output: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Unpack a named frame into a directory
    FrameUnpack {
        input: PathBuf,
        out_dir: PathBuf,
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Compress a P-256 point given as hex coordinates
    PointCompress { x: String, y: String },

    /// Decompress a 33-byte P-256 point given as hex
    PointDecompress { point: String },

    /// Print a random hex string
    Random {
        /// Number of hex digits
        #[arg(long, default_value_t = DEFAULT_HEX_LEN)]
        len: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Codec {
    Hex,
    Base64,
    Base64url,
    Base58,
}

#[derive(Args)]
struct LayoutArgs {
    /// JSON file with {"name_slot": N, "payload_slot": M}
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Width in bytes of the name size fields
    #[arg(long)]
    name_slot: Option<usize>,
    /// Width in bytes of the payload size fields
    #[arg(long)]
    payload_slot: Option<usize>,
}

impl LayoutArgs {
    /// Defaults, overridden by the JSON file, overridden by explicit flags.
    fn resolve(&self) -> Result<FrameLayout, CliError> {
        let mut layout = match &self.layout {
            Some(path) => serde_json::from_slice(&fs::read(path)?)?,
            None => FrameLayout::default(),
        };
        if let Some(slot) = self.name_slot {
            layout.name_slot = slot;
        }
        if let Some(slot) = self.payload_slot {
            layout.payload_slot = slot;
        }
        debug!(?layout, "frame layout");
        Ok(layout.validate()?)
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] BytekitError),
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

fn read_input(input: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match input {
        Some(path) => Ok(fs::read(path)?),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_all(p: &Path, bytes: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = p.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(p, bytes)?;
    Ok(())
}

fn file_name(p: &Path) -> String {
    p.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("input.bin")
        .to_string()
}

//==================== Кодеки: encode/decode ====================//

fn encode_cmd(codec: Codec, input: Option<&Path>) -> Result<(), CliError> {
    let bytes = read_input(input)?;
    let text = match codec {
        Codec::Hex => to_hex(&bytes),
        Codec::Base64 => base64url::encode_bytes(&bytes),
        Codec::Base64url => base64url::encode_url_bytes(&bytes),
        Codec::Base58 => base58::encode(&bytes),
    };
    println!("{text}");
    Ok(())
}

fn decode_cmd(codec: Codec, text: Option<String>, out: Option<&Path>) -> Result<(), CliError> {
    let text = match text {
        Some(t) => t,
        None => String::from_utf8_lossy(&read_input(None)?).into_owned(),
    };
    let text = text.trim();
    let bytes = match codec {
        Codec::Hex => from_hex(text)?,
        Codec::Base64 => base64url::decode_bytes(text)?,
        Codec::Base64url => base64url::decode_url_bytes(text)?,
        Codec::Base58 => base58::decode(text)?,
    };
    match out {
        Some(path) => {
            write_all(path, &bytes)?;
            info!(path = %path.display(), size = bytes.len(), "decoded");
        }
        None => io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

//==================== CRC-32 и zip ====================//

fn crc32_cmd(files: &[PathBuf]) -> Result<(), CliError> {
    if files.is_empty() {
        println!("{:08x}", Crc32::checksum(&read_input(None)?));
        return Ok(());
    }
    for path in files {
        println!("{:08x}  {}", Crc32::checksum(&fs::read(path)?), path.display());
    }
    Ok(())
}

fn zip_cmd(output: &Path, inputs: &[PathBuf]) -> Result<(), CliError> {
    let mut writer = ArchiveWriter::new();
    for input in inputs {
        add_path(&mut writer, input, &file_name(input))?;
    }
    let bytes = writer.serialize()?;
    write_all(output, bytes)?;
    info!(entries = writer.len(), "archive written");
    println!("Zipped {} entries → {}", writer.len(), output.display());
    Ok(())
}

fn add_path(writer: &mut ArchiveWriter, path: &Path, name: &str) -> Result<(), CliError> {
    if path.is_dir() {
        writer.add(&format!("{name}/"), &[], None)?;
        let mut children: Vec<PathBuf> = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        children.sort();
        for child in children {
            add_path(writer, &child, &format!("{name}/{}", file_name(&child)))?;
        }
    } else {
        writer.add(name, &fs::read(path)?, Some(fs::metadata(path)?.modified()?.into()))?;
    }
    Ok(())
}

//==================== Фреймы: pack/unpack ====================//

fn frame_pack_cmd(output: &Path, inputs: &[PathBuf], layout: FrameLayout) -> Result<(), CliError> {
    let entries = inputs
        .iter()
        .map(|path| -> Result<NamedEntry, CliError> {
            Ok(NamedEntry::new(file_name(path), fs::read(path)?))
        })
        .collect::<Result<Vec<_>, CliError>>()?;
    let packed = pack_named_with(&entries, layout)?;
    write_all(output, &packed)?;
    println!("Packed {} entries → {}", entries.len(), output.display());
    Ok(())
}

fn frame_unpack_cmd(input: &Path, out_dir: &Path, layout: FrameLayout) -> Result<(), CliError> {
    let entries = unpack_named_with(&fs::read(input)?, layout)?;
    for entry in &entries {
        let relative = Path::new(&entry.name);
        if entry.name.is_empty()
            || !relative.components().all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(CliError::Usage(format!(
                "refusing to write entry with unsafe name {:?}",
                entry.name
            )));
        }
        write_all(&out_dir.join(relative), &entry.payload)?;
        debug!(name = %entry.name, size = entry.payload.len(), "entry written");
    }
    println!("Unpacked {} entries → {}", entries.len(), out_dir.display());
    Ok(())
}

//==================== Точки P-256 ====================//

fn point_compress_cmd(x: &str, y: &str) -> Result<(), CliError> {
    let params = CurveParams::p256();
    let point = Point::new(
        bigint::from_bytes(&from_hex(x)?),
        bigint::from_bytes(&from_hex(y)?),
    );
    if !point.is_on_curve(&params) {
        return Err(CliError::Usage("point is not on P-256".into()));
    }
    println!("{}", to_hex(&ecc::compress(&point, &params)));
    Ok(())
}

fn point_decompress_cmd(point: &str) -> Result<(), CliError> {
    let params = CurveParams::p256();
    let bytes = from_hex(point.trim())?;
    if bytes.len() != 1 + params.coordinate_size() {
        return Err(CliError::Usage(format!(
            "compressed point must be {} bytes, got {}",
            1 + params.coordinate_size(),
            bytes.len()
        )));
    }
    let recovered = ecc::decompress(&bytes, &params)?;
    if !recovered.is_on_curve(&params) {
        return Err(CliError::Usage("x is not the abscissa of a P-256 point".into()));
    }
    let size = params.coordinate_size();
    println!("x={}", to_hex(&bigint::to_bytes_fixed(&recovered.x, size)));
    println!("y={}", to_hex(&bigint::to_bytes_fixed(&recovered.y, size)));
    Ok(())
}

//==================== main ====================//

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encode { codec, input } => encode_cmd(codec, input.as_deref()),
        Commands::Decode { codec, text, out } => decode_cmd(codec, text, out.as_deref()),
        Commands::Crc32 { files } => crc32_cmd(&files),
        Commands::Zip { output, inputs } => zip_cmd(&output, &inputs),
        Commands::FramePack {
            output,
            inputs,
            layout,
        } => layout
            .resolve()
            .and_then(|layout| frame_pack_cmd(&output, &inputs, layout)),
        Commands::FrameUnpack {
            input,
            out_dir,
            layout,
        } => layout
            .resolve()
            .and_then(|layout| frame_unpack_cmd(&input, &out_dir, layout)),
        Commands::PointCompress { x, y } => point_compress_cmd(&x, &y),
        Commands::PointDecompress { point } => point_decompress_cmd(&point),
        Commands::Random { len } => {
            println!("{}", random_hex_string(len));
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(2);
    }
}
