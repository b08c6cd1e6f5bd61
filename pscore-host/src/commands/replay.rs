//! Replay command orchestration.
//!
//! Runs a packet file through the pipeline. Packets are grouped into control
//! cycles by `ts_ms / period_ms`; each cycle is classified under the
//! thresholds published at the end of the previous one, then the controller
//! closes the cycle against the shared counters.

use std::path::PathBuf;
use std::sync::Arc;

use pscore_control::{ControlConfig, CycleSummary, Thresholds, ThresholdController};
use pscore_plugin::{CounterSnapshot, ScorePlugin, TierCounters};

use crate::cli::ReplayArgs;
use crate::fs::Filesystem;
use crate::io::{load_packets, OutputWriter, PacketRecord, StatusWriter};
use crate::logger::Logger;
use crate::pipeline::{HostPipeline, PacketOutcome};

use super::{CommandError, CommandResult};

/// Result of replay command execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayResult {
    /// Packets classified.
    pub packets: usize,
    /// Control cycles closed (0 with control disabled).
    pub cycles: u64,
    /// Final tier counters.
    pub counters: CounterSnapshot,
    /// Whether the controller engaged filtering at any point.
    pub filter_engaged: bool,
    /// Thresholds in force for packets without rule thresholds at the end.
    pub thresholds: Thresholds,
    pub verdicts_path: PathBuf,
    pub status_path: PathBuf,
    pub counters_path: PathBuf,
}

/// Execute the replay command.
pub fn execute_replay<F, L>(args: &ReplayArgs, fs: &F, logger: &L) -> CommandResult<ReplayResult>
where
    F: Filesystem,
    L: Logger,
{
    args.validate()?;

    let config = load_config(args, fs)?;
    let records = load_packets(fs, &args.input)?;
    if records.is_empty() {
        return Err(CommandError::NoPackets(args.input.display().to_string()));
    }

    logger.verbose(&format!(
        "Starting replay: input={}, packets={}, workers={}, period_ms={}, control={}, score_source={:?}",
        args.input.display(),
        records.len(),
        args.workers,
        config.period_ms,
        if args.no_control { "off" } else { "on" },
        args.score_source
    ));

    if fs.exists(&args.out_dir) {
        logger.verbose(&format!(
            "Output directory {} exists, replacing previous artifacts",
            args.out_dir.display()
        ));
    }
    let output = OutputWriter::new(fs, &args.out_dir);
    output.ensure_dir()?;
    let status = StatusWriter::new(fs, output.status_path());
    status.reset()?;

    let counters = Arc::new(TierCounters::new());
    let pipeline = HostPipeline::new(ScorePlugin::new(Arc::clone(&counters)), args.score_source);

    let run = if args.no_control {
        let fallback = match (args.high, args.low) {
            (Some(high), Some(low)) => Thresholds::new(high, low),
            _ => Thresholds::pass_all(),
        };
        logger.verbose(&format!("Control disabled, static thresholds {}", describe(fallback)));
        ControlRun {
            outcomes: pipeline.process_batch(&records, fallback, args.workers),
            cycles: 0,
            filter_engaged: false,
            thresholds: fallback,
        }
    } else {
        let reporter = CycleReporter::new(status, logger);
        run_controlled(&records, &pipeline, config, args.workers, reporter)?
    };

    let verdicts_path = output.write_verdicts(&run.outcomes)?;
    let snapshot = counters.snapshot();
    let counters_path = output.write_counters(&snapshot)?;

    Ok(ReplayResult {
        packets: run.outcomes.len(),
        cycles: run.cycles,
        counters: snapshot,
        filter_engaged: run.filter_engaged,
        thresholds: run.thresholds,
        verdicts_path,
        status_path: output.status_path(),
        counters_path,
    })
}

/// Defaults, overlaid by the config file, overlaid by `--period-ms`.
fn load_config<F: Filesystem>(args: &ReplayArgs, fs: &F) -> CommandResult<ControlConfig> {
    let mut config = match &args.config {
        Some(path) => ControlConfig::from_json(&fs.read_file(path)?)?,
        None => ControlConfig::default(),
    };
    if let Some(period_ms) = args.period_ms {
        config = config.with_period_ms(period_ms);
    }
    config.validate()?;
    Ok(config)
}

struct ControlRun {
    outcomes: Vec<PacketOutcome>,
    cycles: u64,
    filter_engaged: bool,
    thresholds: Thresholds,
}

fn run_controlled<F, L>(
    records: &[PacketRecord],
    pipeline: &HostPipeline,
    config: ControlConfig,
    workers: usize,
    mut reporter: CycleReporter<'_, F, L>,
) -> CommandResult<ControlRun>
where
    F: Filesystem,
    L: Logger,
{
    let period_ms = config.period_ms;
    // Past one rotation period, further idle cycles change nothing but the count
    let max_idle = config.cdf_rotation_cycles;
    let counters = pipeline.plugin().counters();
    let mut controller = ThresholdController::new(config, counters.snapshot());
    let mut outcomes = Vec::with_capacity(records.len());
    let mut last_index: Option<u64> = None;

    for batch in cycle_batches(records, period_ms) {
        let index = batch[0].ts_ms / period_ms;

        if let Some(last) = last_index {
            let idle = index - last - 1;
            if idle > max_idle {
                reporter.logger.debug(&format!(
                    "Skipping {} idle cycles before ts_ms={}",
                    idle - max_idle,
                    batch[0].ts_ms
                ));
            }
            for _ in 0..idle.min(max_idle) {
                let summary = controller.close_cycle(counters.snapshot());
                reporter.report(&summary)?;
            }
        }
        last_index = Some(index);

        let thresholds = controller.thresholds();
        reporter.logger.debug(&format!(
            "Classifying {} packets from ts_ms={} with {}",
            batch.len(),
            batch[0].ts_ms,
            describe(thresholds)
        ));

        let classified = pipeline.process_batch(batch, thresholds, workers);
        for outcome in &classified {
            controller.observe_score(outcome.score);
        }
        outcomes.extend(classified);

        let summary = controller.close_cycle(counters.snapshot());
        reporter.report(&summary)?;
    }

    Ok(ControlRun {
        outcomes,
        cycles: controller.cycle(),
        filter_engaged: controller.filter_on(),
        thresholds: controller.thresholds(),
    })
}

/// Split time-ordered records into runs sharing the same control cycle.
fn cycle_batches(records: &[PacketRecord], period_ms: u64) -> Vec<&[PacketRecord]> {
    let mut batches = Vec::new();
    let mut start = 0;
    for end in 1..=records.len() {
        let boundary = end == records.len()
            || records[end].ts_ms / period_ms != records[start].ts_ms / period_ms;
        if boundary {
            batches.push(&records[start..end]);
            start = end;
        }
    }
    batches
}

/// Writes cycle summaries to status.jsonl and logs the notable ones.
struct CycleReporter<'a, F: Filesystem, L: Logger> {
    status: StatusWriter<'a, F>,
    logger: &'a L,
    filtering: bool,
}

impl<'a, F: Filesystem, L: Logger> CycleReporter<'a, F, L> {
    fn new(status: StatusWriter<'a, F>, logger: &'a L) -> Self {
        Self {
            status,
            logger,
            filtering: false,
        }
    }

    fn report(&mut self, summary: &CycleSummary) -> CommandResult<()> {
        self.status.append(summary)?;

        self.logger.verbose(&format!(
            "cycle={} white={} grey={} black={} filter={} psi_white={:.3} psi_grey={:.3}",
            summary.cycle,
            summary.counts.white_flows,
            summary.counts.grey_flows,
            summary.counts.black_flows,
            summary.filter_on,
            summary.psi_white,
            summary.psi_grey
        ));

        if summary.filter_on && !self.filtering {
            self.filtering = true;
            self.logger.info(&format!(
                "cycle={} overload at {:.0} fps, filtering engaged",
                summary.cycle,
                summary.rates.total_fps()
            ));
        }
        if summary.thresholds_changed() {
            self.logger.info(&format!(
                "cycle={} thresholds {} -> {}",
                summary.cycle,
                describe(summary.previous),
                describe(summary.current)
            ));
        }
        Ok(())
    }
}

fn describe(thresholds: Thresholds) -> String {
    if thresholds.is_pass_all() {
        "pass-all".to_string()
    } else {
        format!("high={} low={}", thresholds.high, thresholds.low)
    }
}
