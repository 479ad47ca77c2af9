use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use microrobot_dataset::core::encoder::DEFAULT_PREFIX;
use microrobot_dataset::logging::setup_logging;
use microrobot_dataset::{
    encode_dataset, normalized_to_corners, DatasetSplit, DetectionDataset, EncodeOptions,
};

#[derive(Debug, Parser)]
#[command(name = "microrobot-dataset", version, about = "Ultrasound microrobot dataset tools")]
struct Opts {
    /// also write logs to a timestamped file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encode the train and test splits into .amat matrix files
    Encode {
        /// dataset root containing data.yaml
        root: PathBuf,
        /// maximum number of images per split
        #[arg(long)]
        max_images: Option<usize>,
        /// output file name prefix
        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,
        /// output directory, defaults to the dataset root
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// write the run summary as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Convert a normalized center/size box to pixel corners
    #[command(allow_negative_numbers = true)]
    Bbox {
        x_center: f64,
        y_center: f64,
        box_width: f64,
        box_height: f64,
        /// image width in pixels
        #[arg(long)]
        width: u32,
        /// image height in pixels
        #[arg(long)]
        height: u32,
    },
    /// Print the detection targets of one source split
    Targets {
        /// dataset root containing data.yaml
        root: PathBuf,
        /// source split: train, val or test
        #[arg(long, default_value = "train")]
        split: DatasetSplit,
        /// print at most this many samples
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    setup_logging(opts.log_dir.as_deref()).context("failed to initialize logging")?;

    match opts.command {
        Command::Encode {
            root,
            max_images,
            prefix,
            output_dir,
            report,
        } => {
            let options = EncodeOptions {
                max_images,
                prefix,
                output_dir,
            };
            encode(&root, &options, report.as_deref())?;
        }
        Command::Bbox {
            x_center,
            y_center,
            box_width,
            box_height,
            width,
            height,
        } => {
            let [xmin, ymin, xmax, ymax] =
                normalized_to_corners(&[x_center, y_center, box_width, box_height], width, height)?;
            println!("{} {} {} {}", xmin, ymin, xmax, ymax);
        }
        Command::Targets { root, split, limit } => {
            targets(&root, split, limit)?;
        }
    }

    Ok(())
}

fn encode(root: &Path, options: &EncodeOptions, report_path: Option<&Path>) -> Result<()> {
    let report = encode_dataset(root, options)
        .with_context(|| format!("failed to encode dataset at {}", root.display()))?;

    for summary in &report.splits {
        match &summary.output {
            Some(path) => println!(
                "{}: {} rows x {} columns -> {}",
                summary.split,
                summary.rows,
                summary.columns,
                path.display()
            ),
            None => println!("{}: no images found", summary.split),
        }
    }

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!("Report saved to: {:?}", path);
    }

    Ok(())
}

fn targets(root: &Path, split: DatasetSplit, limit: Option<usize>) -> Result<()> {
    let dataset = DetectionDataset::open(root, split)
        .with_context(|| format!("failed to open dataset at {}", root.display()))?;
    let count = limit.map_or(dataset.len(), |limit| limit.min(dataset.len()));

    for index in 0..count {
        let sample = dataset.get(index)?;
        let image_path = &dataset.sample_refs()[index].image_path;
        for (tlbr, label) in sample.target.boxes.iter().zip(&sample.target.labels) {
            println!(
                "{} label={} xmin={:.3} ymin={:.3} xmax={:.3} ymax={:.3} area={:.3}",
                image_path.display(),
                label,
                tlbr.xmin(),
                tlbr.ymin(),
                tlbr.xmax(),
                tlbr.ymax(),
                tlbr.area()
            );
        }
    }

    Ok(())
}
