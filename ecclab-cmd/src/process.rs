use std::io::{stdin, stdout, BufRead, BufWriter, Write};

use anyhow::{Context, Result};
use ecclab::request::handle_json;
use tracing::{info, warn};

/// Handle one JSON request per line of `reader`, writing one JSON response per
/// request to `writer`. Blank lines are skipped. Lines that are not valid
/// requests get an `ERROR` response so every request is answered.
///
/// Returns the number of requests handled and how many of those were invalid.
pub fn process<R: BufRead, W: Write>(reader: R, mut writer: W) -> Result<(usize, usize)> {
    let mut handled = 0;
    let mut invalid = 0;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.context("reading request")?;
        if line.trim().is_empty() {
            continue;
        }
        handled += 1;
        let response = match handle_json(&line) {
            Ok(response) => response,
            Err(err) => {
                warn!("invalid request on line {}: {err}", lineno + 1);
                invalid += 1;
                serde_json::json!({
                    "status": "ERROR",
                    "diagnostic": format!("invalid request: {err}"),
                })
                .to_string()
            }
        };
        writeln!(writer, "{response}").context("writing response")?;
        writer.flush().context("writing response")?;
    }
    Ok((handled, invalid))
}

pub fn process_stdin() -> Result<()> {
    let (handled, invalid) = process(stdin().lock(), BufWriter::new(stdout().lock()))?;
    info!("handled {handled} requests, {invalid} invalid");
    Ok(())
}
