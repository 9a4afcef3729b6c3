//! Texel CLI - Command-line tool for inspecting and decoding textures.
//!
//! This is the main entry point for the Texel command-line application.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use memmap2::Mmap;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use texel::bcn::{self, TextureDescriptor};
use texel::prelude::*;

/// Texel - DDS/KTX texture inspection and decoding tool
#[derive(Parser)]
#[command(name = "texel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the container header of texture files
    Info {
        /// Texture files or directories to scan
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Only consider files whose name matches this glob pattern
        #[arg(short, long)]
        filter: Option<String>,

        /// Print one JSON object per file
        #[arg(long)]
        json: bool,
    },

    /// Decode texture files and report the result
    Decode {
        /// Texture files or directories to scan
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Only consider files whose name matches this glob pattern
        #[arg(short, long)]
        filter: Option<String>,

        /// Number of worker threads (defaults to the number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// When to convert color channels from sRGB to linear (always, srgb-flag)
        #[arg(long, env = "TEXEL_LINEARIZE", default_value_t = LinearizePolicy::Always)]
        linearize: LinearizePolicy,

        /// How to interpret BC6H blocks (signed, container)
        #[arg(long, env = "TEXEL_BC6H", default_value_t = Bc6hSignedness::AssumeSigned)]
        bc6h: Bc6hSignedness,

        /// Print per-channel min/max/mean for every decoded part
        #[arg(long)]
        stats: bool,

        /// Stop scheduling new files after the first failure
        #[arg(long)]
        fail_fast: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { inputs, filter, json } => {
            cmd_info(&inputs, filter.as_deref(), json)?;
        }
        Commands::Decode {
            inputs,
            filter,
            jobs,
            linearize,
            bc6h,
            stats,
            fail_fast,
        } => {
            let options = DecodeOptions { linearize, bc6h };
            cmd_decode(&inputs, filter.as_deref(), jobs, options, stats, fail_fast)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Header summary printed by `texel info --json`.
#[derive(Serialize)]
struct TextureInfo {
    path: String,
    container: String,
    format: String,
    width: u32,
    height: u32,
    depth: u32,
    mips: u32,
    layers: u32,
    faces: u32,
    flags: Vec<&'static str>,
    decodable: bool,
}

impl TextureInfo {
    fn new(path: &Path, descriptor: &TextureDescriptor) -> Self {
        Self {
            path: path.display().to_string(),
            container: descriptor.container.to_string(),
            format: descriptor.format.to_string(),
            width: descriptor.width,
            height: descriptor.height,
            depth: descriptor.depth,
            mips: descriptor.mip_count,
            layers: descriptor.layer_count,
            faces: descriptor.face_count(),
            flags: descriptor.flags.iter_names().map(|(name, _)| name).collect(),
            decodable: bcn::lookup(descriptor.format).is_ok(),
        }
    }
}

fn cmd_info(inputs: &[PathBuf], filter: Option<&str>, json: bool) -> Result<()> {
    let files = collect_inputs(inputs, filter)?;
    let mut errors = 0;

    for path in &files {
        let result = map_file(path).and_then(|data| {
            bcn::parse_header(&data).with_context(|| format!("Failed to parse {}", path.display()))
        });

        let descriptor = match result {
            Ok(descriptor) => descriptor,
            Err(e) => {
                eprintln!("{}: {:#}", path.display(), e);
                errors += 1;
                continue;
            }
        };

        let info = TextureInfo::new(path, &descriptor);
        if json {
            println!("{}", serde_json::to_string(&info)?);
        } else {
            println!(
                "{}: {} {} {}x{}x{}, {} mips, {} layers, {} faces [{}]{}",
                info.path,
                info.container,
                info.format,
                info.width,
                info.height,
                info.depth,
                info.mips,
                info.layers,
                info.faces,
                info.flags.join(" | "),
                if info.decodable { "" } else { " (not decodable)" }
            );
        }
    }

    if errors > 0 {
        anyhow::bail!("{} of {} files could not be read", errors, files.len());
    }

    Ok(())
}

fn cmd_decode(
    inputs: &[PathBuf],
    filter: Option<&str>,
    jobs: Option<usize>,
    options: DecodeOptions,
    stats: bool,
    fail_fast: bool,
) -> Result<()> {
    let files = collect_inputs(inputs, filter)?;
    println!("Decoding {} files ({}, bc6h {})...", files.len(), options.linearize, options.bc6h);

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = jobs {
        pool = pool.num_threads(jobs);
    }
    let pool = pool.build().context("Failed to build worker pool")?;

    let registry = LoaderRegistry::with_options(options);
    let cancel = CancellationToken::new();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let decoded = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);
    let failures = Mutex::new(Vec::new());

    let start = Instant::now();
    pool.install(|| {
        files.par_iter().for_each(|path| {
            if cancel.is_cancelled() {
                skipped.fetch_add(1, Ordering::Relaxed);
                pb.inc(1);
                return;
            }

            match decode_file(&registry, path, &cancel) {
                Ok(parts) => {
                    decoded.fetch_add(1, Ordering::Relaxed);
                    pb.println(summarize(path, &parts, stats));
                }
                Err(e) => {
                    if fail_fast {
                        cancel.cancel();
                    }
                    failures.lock().push((path.clone(), format!("{:#}", e)));
                }
            }

            pb.inc(1);
        });
    });
    pb.finish_with_message("Done");

    let mut failures = failures.into_inner();
    failures.sort();
    for (path, error) in &failures {
        eprintln!("Error decoding {}: {}", path.display(), error);
    }

    println!(
        "Decoded {} files in {:?} ({} errors, {} skipped)",
        decoded.load(Ordering::Relaxed),
        start.elapsed(),
        failures.len(),
        skipped.load(Ordering::Relaxed)
    );

    if !failures.is_empty() {
        anyhow::bail!("{} files failed to decode", failures.len());
    }

    Ok(())
}

fn decode_file(registry: &LoaderRegistry, path: &Path, cancel: &CancellationToken) -> Result<Vec<ImagePart>> {
    let data = map_file(path)?;
    let parts = registry.load(&data, path, "", 0, cancel)?;
    debug!("{}: {} parts", path.display(), parts.len());
    Ok(parts)
}

/// One line per file, plus one line per channel with `stats`.
fn summarize(path: &Path, parts: &[ImagePart], stats: bool) -> String {
    let channels: usize = parts.iter().map(|p| p.channels.len()).sum();
    let mut out = format!("{}: {} parts, {} channels", path.display(), parts.len(), channels);

    if let Some(first) = parts.first().and_then(|p| p.channels.first()) {
        out.push_str(&format!(", {}x{}", first.width(), first.height()));
    }
    if parts.iter().any(|p| p.has_premultiplied_alpha) {
        out.push_str(", premultiplied");
    }

    if stats {
        for part in parts {
            if part.groups.is_empty() {
                push_channel_stats(&mut out, &part.part_name, part.channels.iter());
            }
            for group in &part.groups {
                let label = format!("{} {group}", part.part_name);
                push_channel_stats(&mut out, &label, part.group_channels(group));
            }
        }
    }

    out
}

fn push_channel_stats<'a>(out: &mut String, label: &str, channels: impl Iterator<Item = &'a Channel>) {
    for channel in channels {
        let (min, max, mean) = channel_stats(channel.data());
        out.push_str(&format!(
            "\n  {:<20} {:<2} min {:>10.4} max {:>10.4} mean {:>10.4}",
            label,
            channel.short_name(),
            min,
            max,
            mean
        ));
    }
}

fn channel_stats(samples: &[f32]) -> (f32, f32, f32) {
    if samples.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let (min, max, sum) = samples.iter().fold((f32::MAX, f32::MIN, 0.0f64), |(lo, hi, sum), &v| {
        (lo.min(v), hi.max(v), sum + f64::from(v))
    });
    (min, max, (sum / samples.len() as f64) as f32)
}

/// Map a file read-only.
fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    // SAFETY: the mapping is read-only and only lives for one decode
    let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("Failed to map {}", path.display()))?;
    Ok(mmap)
}

/// Expand directories into the texture files below them.
///
/// Files named explicitly are kept as given; files found by walking a
/// directory must have a `.dds` or `.ktx` extension and match `filter`.
fn collect_inputs(inputs: &[PathBuf], filter: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = filter
        .map(glob::Pattern::new)
        .transpose()
        .context("Invalid filter pattern")?;

    let matches = |path: &Path| {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        pattern.as_ref().map_or(true, |p| p.matches(name))
    };

    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            if matches(input) {
                files.push(input.clone());
            }
            continue;
        }

        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {}", input.display()))?;
            let path = entry.path();
            if entry.file_type().is_file() && has_texture_extension(path) && matches(path) {
                files.push(entry.into_path());
            }
        }
    }

    if files.is_empty() {
        warn!("no texture files found");
    }
    Ok(files)
}

fn has_texture_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("dds") || e.eq_ignore_ascii_case("ktx"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_stats() {
        assert_eq!(channel_stats(&[0.0, 0.5, 1.0]), (0.0, 1.0, 0.5));
        assert_eq!(channel_stats(&[]), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_stats_are_listed_per_group() {
        use texel::common::make_channels;

        let mut part = ImagePart::new("Mip 0");
        part.push_group("Face +X", make_channels("Face +X.", 2, 1, 1));
        part.push_group("Face -X", make_channels("Face -X.", 2, 1, 1));
        part.channels[3].data_mut()[0] = 0.25;

        let text = summarize(Path::new("cube.dds"), &[part], true);
        let lines: Vec<Vec<&str>> = text.lines().skip(1).map(|l| l.split_whitespace().collect()).collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0][..4], ["Mip", "0", "Face", "+X"]);
        assert_eq!(lines[0][4], "R");
        assert_eq!(lines[3][..5], ["Mip", "0", "Face", "-X", "G"]);
        // min of the -X green channel
        assert_eq!(lines[3][6], "0.2500");
    }

    #[test]
    fn test_texture_extension() {
        assert!(has_texture_extension(Path::new("a/b/sky.DDS")));
        assert!(has_texture_extension(Path::new("font.ktx")));
        assert!(!has_texture_extension(Path::new("font.ktx2")));
        assert!(!has_texture_extension(Path::new("README")));
    }

    #[test]
    fn test_cli_parses_policies() {
        let cli = Cli::try_parse_from(["texel", "decode", "--linearize", "srgb-flag", "--bc6h", "container", "x.dds"])
            .unwrap();
        match cli.command {
            Commands::Decode { linearize, bc6h, .. } => {
                assert_eq!(linearize, LinearizePolicy::RespectSrgbFlag);
                assert_eq!(bc6h, Bc6hSignedness::FromContainer);
            }
            Commands::Info { .. } => panic!("expected decode"),
        }
    }
}
