use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use varblock::rates::{IndelErrorModel, RateType};
use varblock::{BlockOptions, GvcfBlockSiteRecord, SiteKind, SiteRecord};

#[derive(Parser, Debug)]
#[command(name = "varblock", about = "Indel error model and gVCF block compression tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dump the finalized rate table of an indel error model as TSV.
    Rates {
        /// Model name (built-in: logLinear, adaptiveDefault; otherwise a
        /// name inside the parameter file).
        model: String,
        /// External JSON parameter file.
        #[arg(long)]
        model_file: Option<PathBuf>,
        /// Dump the fixed candidate-generation table instead of the
        /// scoring table.
        #[arg(long)]
        candidate: bool,
    },
    /// Compress a stream of block-eligible sites into gVCF block summaries.
    ///
    /// Input is one site per line:
    /// `<pos>\t<kind d|c>\t<nonref 0|1>\t<gqx or .>\t<dpu>\t<dpf>\t<filters>`.
    Compress {
        /// Site stream file.
        sites: PathBuf,
        /// Relative GQX tolerance as a percentage of the block mean.
        #[arg(long, default_value_t = 30)]
        percent_tol: u32,
        /// Absolute GQX tolerance floor.
        #[arg(long, default_value_t = 3.0)]
        abs_tol: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rates {
            model,
            model_file,
            candidate,
        } => run_rates(model, model_file, candidate)?,
        Commands::Compress {
            sites,
            percent_tol,
            abs_tol,
        } => run_compress(sites, percent_tol, abs_tol)?,
    }

    Ok(())
}

fn run_rates(model_name: String, model_file: Option<PathBuf>, candidate: bool) -> Result<()> {
    let model = IndelErrorModel::new(&model_name, model_file.as_deref())
        .context("failed to construct indel error model")?;
    let rates = if candidate {
        model.candidate_error_rates()
    } else {
        model.error_rates()
    };

    println!("pattern_size\trepeat_count\tinsert_rate\tdelete_rate");
    for pattern_size in 1..=rates.max_pattern_size() {
        for repeat_count in 1..=rates.max_repeat_count(pattern_size) {
            println!(
                "{}\t{}\t{:.6e}\t{:.6e}",
                pattern_size,
                repeat_count,
                rates.rate(pattern_size, repeat_count, RateType::Insert),
                rates.rate(pattern_size, repeat_count, RateType::Delete)
            );
        }
    }
    Ok(())
}

fn run_compress(sites_path: PathBuf, percent_tol: u32, abs_tol: f64) -> Result<()> {
    let reader = BufReader::new(File::open(&sites_path).with_context(|| {
        format!("failed to open site stream {}", sites_path.display())
    })?);

    let mut block = GvcfBlockSiteRecord::new(BlockOptions {
        block_percent_tol: percent_tol,
        block_abs_tol: abs_tol,
    });

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let site = parse_site(line).with_context(|| format!("bad site record on line {}", idx + 1))?;

        if !block.test_can_site_join_sample_block(&site) {
            flush_block(&mut block);
        }
        block.join_site_to_sample_block(&site);
    }
    flush_block(&mut block);

    Ok(())
}

fn flush_block(block: &mut GvcfBlockSiteRecord) {
    if let Some(summary) = block.summary() {
        let gqx = summary
            .gqx
            .map(|s| format!("{:.1}/{:.1}/{:.1}", s.mean, s.min, s.max))
            .unwrap_or_else(|| ".".to_string());
        println!(
            "block\t{}\t{}\tcount={}\tnonref={}\tgqx={}\tdpu_mean={:.1}\tdpf_mean={:.1}",
            summary.pos,
            summary.end_pos,
            summary.count,
            summary.is_non_ref,
            gqx,
            summary.depth_unfiltered.mean,
            summary.depth_filtered.mean
        );
    }
    block.reset();
}

fn parse_site(line: &str) -> Result<SiteRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 7 {
        return Err(anyhow!("expected 7 tab-separated fields, got {}", fields.len()));
    }

    let kind = match fields[1] {
        "d" => SiteKind::Diploid,
        "c" => SiteKind::Continuous,
        other => return Err(anyhow!("unknown site kind '{}'", other)),
    };
    let gqx = match fields[3] {
        "." => None,
        value => Some(value.parse::<f64>().context("bad gqx value")?),
    };

    Ok(SiteRecord {
        pos: fields[0].parse().context("bad position")?,
        kind,
        is_non_ref: fields[2] == "1",
        gqx,
        depth_unfiltered: fields[4].parse().context("bad unfiltered depth")?,
        depth_filtered: fields[5].parse().context("bad filtered depth")?,
        filters: varblock::gvcf::SiteFilters(fields[6].parse().context("bad filter bits")?),
    })
}
