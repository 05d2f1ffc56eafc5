//! Subprocess runner for a CmdStan-style sampler executable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::{PosteriorDraws, Sampler, SamplerData};
use crate::error::{HolidayError, Result};

/// Runs a compiled sampler binary over the assembled payload.
///
/// The payload is written as a JSON data file, the executable invoked
/// once per chain (sequentially, blocking), and the draw CSV files
/// parsed back into [`PosteriorDraws`] with chains concatenated.
#[derive(Debug, Clone)]
pub struct CmdStanRunner {
    model_exe: PathBuf,
    output_dir: PathBuf,
    chains: usize,
    num_warmup: u32,
    num_samples: u32,
    max_treedepth: u32,
    adapt_delta: f64,
    seed: Option<u64>,
}

impl CmdStanRunner {
    /// Runner with the original fit defaults: 4 chains, 250 warmup,
    /// 250 sampling iterations, treedepth 10, `adapt_delta` 0.8.
    pub fn new(model_exe: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_exe: model_exe.into(),
            output_dir: output_dir.into(),
            chains: 4,
            num_warmup: 250,
            num_samples: 250,
            max_treedepth: 10,
            adapt_delta: 0.8,
            seed: None,
        }
    }

    pub fn chains(mut self, chains: usize) -> Self {
        self.chains = chains;
        self
    }

    pub fn iterations(mut self, warmup: u32, sampling: u32) -> Self {
        self.num_warmup = warmup;
        self.num_samples = sampling;
        self
    }

    pub fn max_treedepth(mut self, depth: u32) -> Self {
        self.max_treedepth = depth;
        self
    }

    pub fn adapt_delta(mut self, delta: f64) -> Self {
        self.adapt_delta = delta;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn chain_args(&self, chain: usize, data_file: &Path, output_file: &Path) -> Vec<String> {
        let mut args = vec![
            format!("id={chain}"),
            "sample".to_string(),
            format!("num_samples={}", self.num_samples),
            format!("num_warmup={}", self.num_warmup),
            "adapt".to_string(),
            format!("delta={}", self.adapt_delta),
            "algorithm=hmc".to_string(),
            "engine=nuts".to_string(),
            format!("max_depth={}", self.max_treedepth),
        ];
        if let Some(seed) = self.seed {
            args.push("random".to_string());
            args.push(format!("seed={seed}"));
        }
        args.push("data".to_string());
        args.push(format!("file={}", data_file.display()));
        args.push("output".to_string());
        args.push(format!("file={}", output_file.display()));
        args
    }
}

impl Sampler for CmdStanRunner {
    fn sample(&self, data: &SamplerData) -> Result<PosteriorDraws> {
        std::fs::create_dir_all(&self.output_dir)?;
        let data_file = self.output_dir.join("data.json");
        std::fs::write(&data_file, serde_json::to_vec(data)?)?;
        debug!(path = %data_file.display(), "wrote sampler data file");

        let mut merged: HashMap<String, Vec<Vec<f64>>> = HashMap::new();
        for chain in 1..=self.chains {
            let output_file = self.output_dir.join(format!("chain_{chain}.csv"));
            let args = self.chain_args(chain, &data_file, &output_file);
            info!(chain, exe = %self.model_exe.display(), "launching sampler chain");
            let output = Command::new(&self.model_exe).args(&args).output()?;
            if !output.status.success() {
                return Err(HolidayError::Sampler(format!(
                    "chain {chain} exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }

            let chain_draws = parse_draw_csv(&output_file)?;
            for (name, mut draws) in chain_draws {
                merged.entry(name).or_default().append(&mut draws);
            }
            info!(chain, "sampler chain finished");
        }

        if merged.is_empty() {
            return Err(HolidayError::Sampler(
                "sampler produced no draws".to_string(),
            ));
        }
        Ok(PosteriorDraws::new(merged))
    }
}

/// Parse one Stan draw CSV into `name -> num_draws x dim` arrays.
///
/// Comment lines start with `#`. Array variables arrive as dotted
/// columns (`h_scale.1`, `h_scale.2`, ...) which are grouped back into
/// one variable in column order; sampler diagnostics (`lp__` and
/// friends) are dropped.
pub(crate) fn parse_draw_csv(path: &Path) -> Result<HashMap<String, Vec<Vec<f64>>>> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .has_headers(true)
        .flexible(false)
        .from_path(path)?;

    // Group columns by base variable name, preserving column order.
    let headers = reader.headers()?.clone();
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (idx, column) in headers.iter().enumerate() {
        let base = column.split('.').next().unwrap_or(column);
        if base.ends_with("__") {
            continue;
        }
        match groups.iter_mut().find(|(name, _)| name == base) {
            Some((_, indices)) => indices.push(idx),
            None => groups.push((base.to_string(), vec![idx])),
        }
    }

    let mut draws: Vec<Vec<Vec<f64>>> = vec![Vec::new(); groups.len()];
    for record in reader.records() {
        let record = record?;
        let fields: Vec<f64> = record
            .iter()
            .map(|field| {
                field.trim().parse::<f64>().map_err(|e| {
                    HolidayError::Parse(format!("bad draw value {field:?}: {e}"))
                })
            })
            .collect::<Result<_>>()?;
        for ((_, indices), rows) in groups.iter().zip(&mut draws) {
            rows.push(indices.iter().map(|&i| fields[i]).collect());
        }
    }
    Ok(groups
        .into_iter()
        .map(|(name, _)| name)
        .zip(draws)
        .collect())
}
