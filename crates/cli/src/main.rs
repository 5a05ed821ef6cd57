// This software is licensed under a dual license model:
//
// GNU Affero General Public License v3 (AGPLv3): You may use, modify, and
// distribute this software under the terms of the AGPLv3.
//
// Elastic License v2 (ELv2): You may also use, modify, and distribute this
// software under the Elastic License v2, which has specific restrictions.
//
// We welcome any commercial collaboration or support. For inquiries
// regarding the licenses, please contact us at:
// vectorchord-inquiry@tensorchord.ai
//
// Copyright (c) 2025 TensorChord Inc.

use anyhow::Context;
use clap::Parser;
use fastfood::{KernelEnsemble, KernelOptions, Precision};
use reader::{LineReader, ReadState, parse_vector};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Maps vectors, one per record, to random Fourier features of the Gaussian kernel.
#[derive(Parser)]
#[command(name = "fastfood")]
struct Cli {
    /// Input file; `.gz`, `.bz2` and `.zst` are decompressed on the fly
    input: PathBuf,
    /// TOML file with kernel options
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    stacked_size: Option<usize>,
    #[arg(long)]
    sigma: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    low_precision: bool,
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long, default_value_t = '\n')]
    delimiter: char,
}

impl Cli {
    fn options(&self, input_size: usize) -> anyhow::Result<KernelOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let options = KernelOptions::from_toml(&text)?;
                if options.input_size != input_size {
                    anyhow::bail!(
                        "the config expects vectors of {} values, but the input has {input_size}",
                        options.input_size
                    );
                }
                options
            }
            None => KernelOptions::new(input_size),
        };
        if let Some(stacked_size) = self.stacked_size {
            options.stacked_size = Some(stacked_size);
        }
        if let Some(sigma) = self.sigma {
            options.sigma = sigma;
        }
        if let Some(seed) = self.seed {
            options.seed = seed;
        }
        if self.low_precision {
            options.precision = Precision::Low;
        }
        if let Some(threads) = self.threads {
            options.threads = threads;
        }
        options.check()?;
        Ok(options)
    }
}

fn delimiter_byte(delimiter: char) -> anyhow::Result<u8> {
    if !delimiter.is_ascii() {
        anyhow::bail!("the delimiter must be an ASCII character, but it is {delimiter:?}");
    }
    Ok(delimiter as u8)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let delimiter = delimiter_byte(cli.delimiter)?;
    let mut reader = LineReader::open(&cli.input, delimiter)?;
    log::debug!(
        "reading {} with compression {:?}",
        cli.input.display(),
        reader.compression()
    );
    let stdout = std::io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let mut ensemble: Option<(KernelEnsemble<f64>, KernelOptions)> = None;
    let mut out = Vec::new();
    let mut record = 0_usize;
    loop {
        match reader.advance() {
            ReadState::Record => (),
            ReadState::Eof => break,
            ReadState::Error => {
                return Err(reader
                    .take_error()
                    .map(anyhow::Error::from)
                    .unwrap_or_else(|| anyhow::anyhow!("failed to read record {record}")));
            }
        }
        record += 1;
        let input = parse_vector::<f64>(record, reader.data())?;
        if input.is_empty() {
            continue;
        }
        if ensemble.is_none() {
            let options = cli.options(input.len())?;
            log::info!(
                "input size {}, stacked size {}, sigma {}, seed {}",
                options.input_size,
                options.stacked_size(),
                options.sigma,
                options.seed
            );
            ensemble = Some((KernelEnsemble::from_options(&options)?, options));
        }
        let Some((ensemble, options)) = &ensemble else {
            unreachable!("the ensemble is built from the first record")
        };
        if input.len() != options.input_size {
            anyhow::bail!(
                "record {record} has {} values, but {} are expected",
                input.len(),
                options.input_size
            );
        }
        if options.threads > 1 {
            ensemble.apply_parallel(&mut out, &input, options.threads)?;
        } else {
            ensemble.apply(&mut out, &input)?;
        }
        let mut first = true;
        for x in out.iter() {
            if !first {
                writer.write_all(b" ")?;
            }
            first = false;
            write!(writer, "{x}")?;
        }
        writer.write_all(b"\n")?;
    }
    if let Some(e) = reader.take_error() {
        return Err(e.into());
    }
    writer.flush()?;
    log::info!("mapped {record} records");
    Ok(())
}

#[test]
fn delimiter_must_be_ascii() {
    assert_eq!(delimiter_byte('\n').unwrap(), b'\n');
    assert_eq!(delimiter_byte(';').unwrap(), b';');
    assert!(delimiter_byte('\u{e9}').is_err());
    assert!(delimiter_byte('\u{80}').is_err());
    assert!(delimiter_byte('\u{2028}').is_err());
}
