use std::io::{stdout, Write};

use anyhow::{bail, Context, Result};
use ecclab::{Algorithm, BitSequence, Status};
use handlebars::handlebars_helper;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::frame::Format;

pub struct Options {
    pub algorithms: Vec<Algorithm>,
    pub messages: usize,
    pub length: usize,
    pub noise: Vec<f64>,
    pub seed: u64,
}

impl Options {
    /// Reject options that would fail every trial.
    pub fn validate(&self) -> Result<()> {
        if self.length == 0 {
            bail!("message length must be at least 1 character");
        }
        if let Some(p) = self.noise.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            bail!("noise level {p} is not a probability");
        }
        Ok(())
    }
}

/// Tally for one algorithm at one noise level.
#[derive(Default, Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub algorithm: String,
    pub noise: f64,
    pub total: usize,
    pub ok: usize,
    pub fix: usize,
    pub drop: usize,
    pub error: usize,
    /// Decoded as OK or FIX and the recovered text equals the message sent.
    pub success: usize,
    pub success_rate: f64,
}

impl Cell {
    fn add(&mut self, status: Status, success: bool) {
        self.total += 1;
        match status {
            Status::Ok => self.ok += 1,
            Status::Fix => self.fix += 1,
            Status::Drop => self.drop += 1,
            Status::Error => self.error += 1,
        }
        if success {
            self.success += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub seed: u64,
    pub messages: usize,
    pub length: usize,
    pub cells: Vec<Cell>,
}

/// Flip each bit of `frame` independently with probability `p`.
pub fn apply_noise<R: Rng>(frame: &BitSequence, p: f64, rng: &mut R) -> BitSequence {
    frame.iter().map(|bit| bit ^ rng.gen_bool(p)).collect()
}

pub fn random_message<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

/// Run a single trial, returning the decode status and whether the original
/// message was recovered.
///
/// Trials seeded alike send the same message, so every algorithm and noise
/// level is measured against the same traffic.
fn trial(algorithm: &Algorithm, noise: f64, length: usize, seed: u64) -> Result<(Status, bool)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let message = random_message(&mut rng, length);
    let frame = algorithm
        .encode(&BitSequence::from_ascii(&message))
        .with_context(|| format!("encoding with {algorithm}"))?;
    let received = apply_noise(&frame, noise, &mut rng);

    let zult = algorithm.decode(&received);
    // block padding decodes as trailing NULs
    let success = zult.is_ok()
        && zult
            .payload()
            .is_some_and(|payload| payload.to_ascii().trim_end_matches('\0') == message);
    Ok((zult.status(), success))
}

fn run_cell(algorithm: &Algorithm, noise: f64, opts: &Options) -> Result<Cell> {
    let outcomes = (0..opts.messages)
        .into_par_iter()
        .map(|idx| trial(algorithm, noise, opts.length, opts.seed.wrapping_add(idx as u64)))
        .collect::<Result<Vec<_>>>()?;

    let mut cell = Cell {
        algorithm: algorithm.to_string(),
        noise,
        ..Default::default()
    };
    for (status, success) in outcomes {
        cell.add(status, success);
    }
    if cell.total > 0 {
        cell.success_rate = cell.success as f64 / cell.total as f64;
    }
    debug!(
        algorithm = %algorithm,
        noise,
        ok = cell.ok,
        fix = cell.fix,
        drop = cell.drop,
        error = cell.error,
        "cell complete"
    );
    Ok(cell)
}

pub fn run(opts: &Options) -> Result<Summary> {
    let mut cells = Vec::with_capacity(opts.algorithms.len() * opts.noise.len());
    for algorithm in &opts.algorithms {
        for &noise in &opts.noise {
            cells.push(run_cell(algorithm, noise, opts)?);
        }
    }
    Ok(Summary {
        seed: opts.seed,
        messages: opts.messages,
        length: opts.length,
        cells,
    })
}

pub fn simulate(opts: &Options, format: &Format) -> Result<()> {
    opts.validate()?;
    info!(
        "simulating {} messages of {} chars per cell, seed {}",
        opts.messages, opts.length, opts.seed
    );
    let summary = run(opts)?;

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &summary).context("serializing to json")?;
            writeln!(stdout()).context("writing to stdout")
        }
        Format::Text => {
            let data = render_text(&summary).context("rendering summary")?;
            stdout()
                .write_all(data.as_bytes())
                .context("writing to stdout")
        }
    }
}

fn render_text(summary: &Summary) -> Result<String> {
    handlebars_helper!(left_pad: |num: u64, v: Json| {
        let v = match v {
            serde_json::Value::String(s) => s.to_owned(),
            serde_json::Value::Null => String::new(),
            _ => v.to_string()
        };
        let width = usize::try_from(num).unwrap_or_default().max(v.len());
        format!("{v:>width$}")
    });
    handlebars_helper!(percent: |v: f64| format!("{:.1}%", v * 100.0));

    let mut hb = handlebars::Handlebars::new();
    hb.register_helper("lpad", Box::new(left_pad));
    hb.register_helper("pct", Box::new(percent));
    hb.register_template_string("summary", TEXT_TEMPLATE)
        .context("registering template")?;

    hb.render("summary", summary).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"Messages: {{ messages }} x {{ length }} chars
Seed:     {{ seed }}
---------------------------------------------------------------------------
   Algorithm    Noise     Total        OK       FIX      DROP     ERROR   Success
---------------------------------------------------------------------------
{{ #each cells }}{{ lpad 12 algorithm }}  {{ lpad 7 noise }}  {{ lpad 8 total }}  {{ lpad 8 ok }}  {{ lpad 8 fix }}  {{ lpad 8 drop }}  {{ lpad 8 error }}  {{ lpad 8 (pct success_rate) }}
{{/each }}
";
