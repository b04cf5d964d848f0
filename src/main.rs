use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use pvdsteg::analysis::{self, batch};
use pvdsteg::config::DEFAULT_NOISE_LEVEL;
use pvdsteg::{
    load_image, save_image, Algorithm, ConfigOptions, EncryptionMode, LogObserver,
    Steganography, StegoConfig, StegoError, UniformNoise,
};

/// pvdsteg: hide payloads in lossless images with pixel-value differencing.
#[derive(Parser)]
#[command(name = "pvdsteg", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Payload transform options shared by embed and extract.
#[derive(Args)]
struct CipherArgs {
    /// Embedding algorithm (PVD)
    #[arg(long, default_value = "PVD")]
    algorithm: String,

    /// Payload transform: none, base64 or aes
    #[arg(short, long, default_value = "none")]
    encryption: String,

    /// AES key (16, 24 or 32 bytes)
    #[arg(long)]
    key: Option<String>,

    /// AES IV (16 bytes)
    #[arg(long)]
    iv: Option<String>,
}

impl CipherArgs {
    fn options(&self) -> Result<ConfigOptions> {
        Ok(ConfigOptions {
            algorithm: self.algorithm.parse::<Algorithm>()?,
            encryption: self.encryption.parse::<EncryptionMode>()?,
            key: self.key.as_ref().map(|k| k.as_bytes().to_vec()),
            iv: self.iv.as_ref().map(|v| v.as_bytes().to_vec()),
            ..Default::default()
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a message or file inside a cover image
    Embed {
        /// Cover image path
        #[arg(short, long)]
        input: PathBuf,

        /// Stego image path (.png or .bmp)
        #[arg(short, long)]
        output: PathBuf,

        /// Text message to hide
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        message: Option<String>,

        /// File whose bytes to hide
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        cipher: CipherArgs,

        /// Noise intensity for pixels that carry no payload (0 disables)
        #[arg(long, default_value_t = DEFAULT_NOISE_LEVEL)]
        noise_level: u8,

        /// Seed for reproducible noise
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Recover a hidden payload from a stego image
    Extract {
        /// Stego image path
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        cipher: CipherArgs,
    },

    /// Report how many payload bytes an image can carry
    Capacity {
        /// Image path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Compare cover and stego images (MSE, PSNR, SSIM)
    Analyze {
        /// Cover image
        #[arg(long, requires = "stego", conflicts_with = "cover_dir")]
        cover: Option<PathBuf>,

        /// Stego image
        #[arg(long)]
        stego: Option<PathBuf>,

        /// Directory of cover images (`name.png`)
        #[arg(long, requires = "stego_dir", required_unless_present = "cover")]
        cover_dir: Option<PathBuf>,

        /// Directory of stego images (`name_stego.png`)
        #[arg(long)]
        stego_dir: Option<PathBuf>,

        /// Also write the results table (with an average row) to this CSV file
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn build_stego(options: ConfigOptions, seed: Option<u64>) -> Result<Steganography> {
    let config: StegoConfig = options.validate()?;
    let noise = match seed {
        Some(s) => UniformNoise::seeded(s),
        None => UniformNoise::new(),
    };
    Ok(Steganography::with_noise(config, noise)?)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Embed {
            input,
            output,
            message,
            file,
            cipher,
            noise_level,
            seed,
        } => {
            let payload = match (message, file) {
                (Some(text), _) => text.into_bytes(),
                (None, Some(path)) => fs::read(&path)
                    .with_context(|| format!("failed to read payload {}", path.display()))?,
                (None, None) => anyhow::bail!("either --message or --file is required"),
            };

            let options = ConfigOptions {
                noise_level,
                ..cipher.options()?
            };
            let stego = build_stego(options, seed)?;
            info!(
                "transform {}, noise level {}",
                stego.config().cipher.mode(),
                stego.config().noise_level
            );

            // Fail on a lossy output path before doing any work.
            pvdsteg::raster::io::lossless_format(&output)?;

            info!("embedding {} bytes into {}", payload.len(), input.display());
            let mut image = load_image(&input)?;
            let report = stego.encode(&mut image, &payload, &LogObserver)?;
            save_image(&image, &output)?;

            info!(
                "used {} of {} bits ({} pixel-pair steps)",
                report.embed.bits_embedded, report.embed.capacity_bits, report.embed.steps_used
            );
        }

        Commands::Extract {
            input,
            output,
            cipher,
        } => {
            let stego = build_stego(cipher.options()?, None)?;
            info!("decoding with transform {}", stego.config().cipher.mode());
            let image = load_image(&input)?;

            let payload = match stego.decode(&image, &LogObserver) {
                Ok(bytes) => bytes,
                Err(StegoError::DecodeIncomplete { partial }) => {
                    warn!(
                        "end marker not found; writing {} raw bytes recovered before the image ran out",
                        partial.len()
                    );
                    partial
                }
                Err(e) => return Err(e.into()),
            };

            match output {
                Some(path) => {
                    fs::write(&path, &payload)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("wrote {} bytes to {}", payload.len(), path.display());
                }
                None => {
                    let mut stdout = io::stdout().lock();
                    stdout.write_all(&payload)?;
                    stdout.write_all(b"\n")?;
                    stdout.flush()?;
                }
            }
        }

        Commands::Capacity { input } => {
            let image = load_image(&input)?;
            let report = analysis::capacity_report(&image);
            println!("image:         {}x{}", image.width(), image.height());
            println!("pair steps:    {}", report.steps);
            println!("capacity:      {} bits", report.total_bits);
            println!("max payload:   {} bytes (after end marker)", report.payload_bytes);
            println!(
                "estimate:      {} bits (5 bits/pair heuristic)",
                analysis::estimated_capacity_bits(image.width(), image.height())
            );
        }

        Commands::Analyze {
            cover,
            stego,
            cover_dir,
            stego_dir,
            report: report_path,
        } => {
            let report = match (cover, stego, cover_dir, stego_dir) {
                (Some(cover), Some(stego), _, _) => {
                    let pair = batch::ImagePair {
                        name: cover
                            .file_stem()
                            .map(|s| s.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        cover,
                        stego,
                    };
                    batch::BatchReport::from_metrics(vec![batch::analyze_pair(&pair)?], 0)
                }
                (_, _, Some(cover_dir), Some(stego_dir)) => {
                    batch::analyze_directory(&cover_dir, &stego_dir)?
                }
                _ => anyhow::bail!("use --cover/--stego or --cover-dir/--stego-dir"),
            };

            println!("{:<20} {:<10} {:>10} {:>10} {:>8}", "image", "size", "PSNR", "MSE", "SSIM");
            for m in &report.pairs {
                print_metrics(m);
            }
            if report.pairs.len() > 1 {
                println!(
                    "{:<20} {:<10} {:>10.2} {:>10.4} {:>8.4}",
                    "AVERAGE", "", report.mean_psnr, report.mean_mse, report.mean_ssim
                );
            }
            if report.skipped > 0 {
                warn!("{} pairs skipped", report.skipped);
            }

            if let Some(path) = report_path {
                report.write_csv(&path)?;
            }
        }
    }

    Ok(())
}

fn print_metrics(m: &batch::PairMetrics) {
    println!(
        "{:<20} {:<10} {:>10.2} {:>10.4} {:>8.4}",
        m.name,
        format!("{}x{}", m.width, m.height),
        m.psnr,
        m.mse,
        m.ssim
    );
}
