use anyhow::{anyhow, bail, Context, Result};
use bpaf::Bpaf;
use log::*;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use weighted_variance::{Summary, WeightedVariance};

#[derive(Debug, Clone, Bpaf)]
pub struct Options {
    /// Resume from this checkpoint file (if it exists) and write the final
    /// state back to it
    #[bpaf(long, short, argument("FILE"))]
    pub state: Option<PathBuf>,
    /// Print the running summary after every N observations
    #[bpaf(long, short, argument("N"), fallback(0))]
    pub every: usize,
    /// Fail on negative weights and non-finite numbers instead of letting
    /// them through
    #[bpaf(long)]
    pub strict: bool,
}

pub fn track(opts: Options) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run(stdin.lock(), stdout.lock(), &opts)
}

fn run(input: impl BufRead, mut out: impl Write, opts: &Options) -> Result<()> {
    let mut acc = match &opts.state {
        Some(path) if path.exists() => {
            let acc = load_checkpoint(path)?;
            info!(
                "Resuming from {} (total weight {})",
                path.display(),
                acc.total_weight()
            );
            acc
        }
        _ => WeightedVariance::new(),
    };
    // The checkpoint is only written once the whole input has gone in
    let n = feed(input, &mut out, &mut acc, opts)?;
    debug!("Read {} observations", n);
    writeln!(out, "{}", serde_json::to_string(&Summary::from(acc))?)?;
    if let Some(path) = &opts.state {
        save_checkpoint(path, acc)?;
        info!("Saved state to {}", path.display());
    }
    Ok(())
}

/// Returns the number of observations read
fn feed(
    input: impl BufRead,
    mut out: impl Write,
    acc: &mut WeightedVariance,
    opts: &Options,
) -> Result<usize> {
    let mut n = 0;
    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (value, weight) =
            parse_observation(line).with_context(|| format!("line {}", lineno + 1))?;
        if opts.strict {
            acc.try_add_observation(value, weight)
                .with_context(|| format!("line {}", lineno + 1))?;
        } else {
            if !value.is_finite() || !weight.is_finite() || weight < 0. {
                warn!(
                    "line {}: degenerate observation ({}, weight {})",
                    lineno + 1,
                    value,
                    weight
                );
            }
            acc.add_observation(value, weight);
        }
        n += 1;
        if opts.every != 0 && n % opts.every == 0 {
            writeln!(out, "{}", serde_json::to_string(&Summary::from(*acc))?)?;
        }
    }
    Ok(n)
}

/// `value` or `value,weight`.  Whitespace works as a separator too.
fn parse_observation(line: &str) -> Result<(f64, f64)> {
    let mut fields = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|x| !x.is_empty());
    let value = fields
        .next()
        .ok_or_else(|| anyhow!("Missing value"))?
        .parse::<f64>()
        .context("Couldn't parse the value")?;
    let weight = match fields.next() {
        Some(w) => w.parse::<f64>().context("Couldn't parse the weight")?,
        None => 1.,
    };
    if let Some(extra) = fields.next() {
        bail!("Unexpected trailing field: \"{}\"", extra);
    }
    Ok((value, weight))
}

fn load_checkpoint(path: &Path) -> Result<WeightedVariance> {
    let file = File::open(path).with_context(|| format!("Opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Reading checkpoint from {}", path.display()))
}

/// Leaves the existing file alone if `acc` can't be reloaded
fn save_checkpoint(path: &Path, acc: WeightedVariance) -> Result<()> {
    let (total_weight, mean, sum_sq_dev) = acc.into_parts();
    if !total_weight.is_finite() || !mean.is_finite() || !sum_sq_dev.is_finite() {
        bail!(
            "Not saving state to {}: it isn't finite (total weight {}, mean {}); \
             use --strict to reject bad observations",
            path.display(),
            total_weight,
            mean
        );
    }
    let file = File::create(path).with_context(|| format!("Creating {}", path.display()))?;
    let mut file = BufWriter::new(file);
    serde_json::to_writer(&mut file, &acc)?;
    file.flush()?;
    Ok(())
}
