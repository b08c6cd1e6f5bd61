//! Classify command orchestration.
//!
//! Runs one packet, given on the command line, through both stages with a
//! private counters handle.

use std::sync::Arc;

use pscore_control::Thresholds;
use pscore_plugin::{ScorePlugin, TierCounters};

use crate::cli::ClassifyArgs;
use crate::io::PacketRecord;
use crate::logger::Logger;
use crate::pipeline::{HostPipeline, PacketOutcome};

use super::CommandResult;

/// Execute the classify command.
pub fn execute_classify<L: Logger>(args: &ClassifyArgs, logger: &L) -> CommandResult<PacketOutcome> {
    args.validate()?;

    logger.verbose(&format!(
        "Classifying packet: factor={} score={} high={} low={} score_source={:?}",
        args.factor, args.score, args.high, args.low, args.score_source
    ));

    let plugin = ScorePlugin::new(Arc::new(TierCounters::new()));
    let pipeline = HostPipeline::new(plugin, args.score_source);

    let record = PacketRecord::new(args.factor, args.score)
        .with_thresholds(args.high, args.low)
        .with_egress_spec(args.egress);
    let outcome = pipeline.process(&record, Thresholds::pass_all());

    logger.debug(&format!(
        "counters after classify: {:?}",
        pipeline.plugin().counters().snapshot()
    ));

    Ok(outcome)
}
