use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::config;
use crate::raster::io::load_image;

/// Suffix a stego file carries relative to its cover, before the extension.
pub const STEGO_SUFFIX: &str = "_stego";

/// Header row of the results file written by [`BatchReport::write_csv`].
pub const CSV_HEADER: &str = "image_name,image_size,psnr,mse,ssim";

/// A cover image and the stego image produced from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub name: String,
    pub cover: PathBuf,
    pub stego: PathBuf,
}

/// Quality metrics for one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairMetrics {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub mse: f64,
    pub psnr: f64,
    pub ssim: f64,
}

/// Metrics for every analysable pair plus their averages.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub pairs: Vec<PairMetrics>,
    /// Pairs that could not be loaded or compared.
    pub skipped: usize,
    pub mean_mse: f64,
    pub mean_psnr: f64,
    pub mean_ssim: f64,
}

fn lossless_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        let lossless = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| config::LOSSLESS_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if lossless && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

/// Match `<name>.png|bmp` in `cover_dir` with `<name>_stego.png|bmp` in `stego_dir`.
/// Each cover name appears at most once, sorted by name.
pub fn find_image_pairs(cover_dir: &Path, stego_dir: &Path) -> Result<Vec<ImagePair>> {
    let covers = lossless_images(cover_dir)?;
    let stegos = lossless_images(stego_dir)?;
    info!(
        "found {} cover images and {} stego images",
        covers.len(),
        stegos.len()
    );

    let mut seen = HashSet::new();
    let mut pairs = Vec::new();

    for cover in covers {
        let Some(name) = file_stem(&cover) else {
            continue;
        };
        let wanted = format!("{}{}", name, STEGO_SUFFIX);
        let Some(stego) = stegos.iter().find(|s| file_stem(s) == Some(wanted.as_str())) else {
            warn!("no stego image for {}", cover.display());
            continue;
        };
        if !seen.insert(name.to_string()) {
            warn!("skipping duplicate pair for {}", name);
            continue;
        }
        pairs.push(ImagePair {
            name: name.to_string(),
            cover: cover.clone(),
            stego: stego.clone(),
        });
    }

    info!("matched {} image pairs", pairs.len());
    Ok(pairs)
}

/// Load both images of a pair and compute MSE, PSNR and SSIM.
pub fn analyze_pair(pair: &ImagePair) -> Result<PairMetrics> {
    let cover = load_image(&pair.cover)?;
    let stego = load_image(&pair.stego)?;

    Ok(PairMetrics {
        name: pair.name.clone(),
        width: cover.width(),
        height: cover.height(),
        mse: super::mse(&cover, &stego)?,
        psnr: super::psnr(&cover, &stego)?,
        ssim: super::ssim(&cover, &stego)?,
    })
}

/// Analyse every cover/stego pair found in the two directories.
pub fn analyze_directory(cover_dir: &Path, stego_dir: &Path) -> Result<BatchReport> {
    let pairs = find_image_pairs(cover_dir, stego_dir)?;
    if pairs.is_empty() {
        anyhow::bail!(
            "no image pairs found in {} and {}",
            cover_dir.display(),
            stego_dir.display()
        );
    }

    let progress = ProgressBar::new(pairs.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} pairs ({eta})")?
            .progress_chars("##-"),
    );

    let mut metrics = Vec::with_capacity(pairs.len());
    let mut skipped = 0usize;
    for pair in &pairs {
        match analyze_pair(pair) {
            Ok(m) => metrics.push(m),
            Err(e) => {
                warn!("skipping {}: {:#}", pair.name, e);
                skipped += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_with_message("analysis complete");

    Ok(BatchReport::from_metrics(metrics, skipped))
}

impl BatchReport {
    /// Collect per-pair metrics and average them. Rows repeating an image
    /// name already seen are dropped.
    pub fn from_metrics(metrics: Vec<PairMetrics>, skipped: usize) -> Self {
        let mut seen = HashSet::new();
        let pairs: Vec<PairMetrics> = metrics
            .into_iter()
            .filter(|m| seen.insert(m.name.clone()))
            .collect();

        let mean = |f: fn(&PairMetrics) -> f64| {
            if pairs.is_empty() {
                f64::NAN
            } else {
                pairs.iter().map(f).sum::<f64>() / pairs.len() as f64
            }
        };
        let mean_mse = mean(|m| m.mse);
        let mean_psnr = mean(|m| m.psnr);
        let mean_ssim = mean(|m| m.ssim);

        BatchReport {
            pairs,
            skipped,
            mean_mse,
            mean_psnr,
            mean_ssim,
        }
    }

    /// Write one row per pair followed by an `AVERAGE` row.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create report {}", path.display()))?;
        let mut out = BufWriter::new(file);

        writeln!(out, "{}", CSV_HEADER)?;
        for m in &self.pairs {
            writeln!(
                out,
                "{},{}x{},{:.4},{:.6},{:.6}",
                csv_field(&m.name),
                m.width,
                m.height,
                m.psnr,
                m.mse,
                m.ssim
            )?;
        }
        writeln!(
            out,
            "AVERAGE,,{:.4},{:.6},{:.6}",
            self.mean_psnr, self.mean_mse, self.mean_ssim
        )?;
        out.flush()
            .with_context(|| format!("failed to write report {}", path.display()))?;

        info!("wrote {} result rows to {}", self.pairs.len(), path.display());
        Ok(())
    }
}

/// Quote a field that contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
