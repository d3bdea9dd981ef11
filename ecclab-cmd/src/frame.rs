use std::fs::File;
use std::io::{stdin, stdout, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use ecclab::bits::read_frame;
use ecclab::{Algorithm, BitSequence, Report, Status};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

/// Read the first non-blank line of the input, which may be given inline, as a
/// file path, or on stdin (`None` or `-`).
fn read_input(input: Option<&str>) -> Result<String> {
    let line = match input {
        None | Some("-") => first_line(stdin().lock()).context("reading stdin")?,
        Some(path) if Path::new(path).is_file() => {
            debug!("reading input from {path}");
            let file = File::open(path).with_context(|| format!("opening {path}"))?;
            first_line(BufReader::new(file)).with_context(|| format!("reading {path}"))?
        }
        Some(inline) => inline.to_string(),
    };
    Ok(line)
}

fn first_line<R: BufRead>(reader: R) -> std::io::Result<String> {
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            return Ok(line);
        }
    }
    Ok(String::new())
}

/// Read a frame the same way as [read_input], parsing it as 0/1 text.
fn read_bits(input: Option<&str>) -> Result<BitSequence> {
    match input {
        Some(path) if path != "-" && Path::new(path).is_file() => {
            let file = File::open(path).with_context(|| format!("opening {path}"))?;
            read_frame(BufReader::new(file)).with_context(|| format!("invalid frame in {path}"))
        }
        _ => BitSequence::parse(&read_input(input)?).context("invalid frame"),
    }
}

/// Bits of an ASCII message, 8 per character.
fn text_payload(text: &str) -> Result<BitSequence> {
    if let Some(c) = text.chars().find(|c| !c.is_ascii()) {
        bail!("message contains non-ASCII character {c:?}; only ASCII text can be encoded");
    }
    Ok(BitSequence::from_ascii(text))
}

pub fn encode(algorithm: Algorithm, input: Option<&str>, text: bool) -> Result<()> {
    let payload = if text {
        text_payload(&read_input(input)?)?
    } else {
        read_bits(input)?
    };
    let frame = algorithm
        .encode(&payload)
        .with_context(|| format!("encoding with {algorithm}"))?;
    info!(
        "encoded {} payload bits into {} frame bits with {algorithm}",
        payload.len(),
        frame.len()
    );
    writeln!(stdout(), "{frame}").context("writing to stdout")
}

#[derive(Debug, Serialize)]
struct Decoded {
    algorithm: String,
    #[serde(flatten)]
    report: Report,
    message: Option<String>,
}

impl Decoded {
    fn new(algorithm: Algorithm, report: Report) -> Self {
        let message = match report.status {
            Status::Ok | Status::Fix => report
                .data_bits
                .as_deref()
                .and_then(|bits| BitSequence::parse(bits).ok())
                .map(|bits| bits.to_ascii()),
            _ => None,
        };
        Self {
            algorithm: algorithm.to_string(),
            report,
            message,
        }
    }

    fn render_text(&self) -> String {
        let mut lines = vec![
            format!("Algorithm:  {}", self.algorithm),
            format!("Status:     {}", self.report.status),
        ];
        if let Some(bits) = &self.report.data_bits {
            lines.push(format!("Data:       {bits}"));
        }
        if let Some(message) = &self.message {
            lines.push(format!("Message:    {message:?}"));
        }
        if let (Some(n), Some(r), Some(syndrome)) =
            (self.report.n, self.report.r, self.report.syndrome)
        {
            lines.push(format!("Codeword:   n={n} r={r} syndrome={syndrome}"));
        }
        if let Some(fix) = &self.report.fix {
            lines.push(format!("Corrected:  position {}", fix.position));
            lines.push(format!("Codeword:   {}", fix.corrected_codeword));
        }
        if let Some(diagnostic) = &self.report.diagnostic {
            lines.push(format!("Diagnostic: {diagnostic}"));
        }
        lines.join("\n")
    }
}

pub fn decode(algorithm: Algorithm, input: Option<&str>, format: &Format) -> Result<()> {
    let frame = read_bits(input)?;
    let decoded = Decoded::new(algorithm, algorithm.report(&frame));
    debug!("decoded {} bits: {}", frame.len(), decoded.report.status);

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &decoded).context("serializing to json")?;
            writeln!(stdout()).context("writing to stdout")
        }
        Format::Text => writeln!(stdout(), "{}", decoded.render_text()).context("writing to stdout"),
    }
}
