//! Exit codes for the pscore CLI.

use crate::commands::CommandError;
use crate::io::PacketLoadError;

/// Exit code constants.
pub mod codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Invalid arguments.
    pub const INVALID_ARGS: i32 = 1;
    /// IO error.
    pub const IO_ERROR: i32 = 2;
    /// Malformed packet file.
    pub const PACKET_ERROR: i32 = 3;
    /// Invalid controller config.
    pub const CONFIG_ERROR: i32 = 4;
    /// Failed to write an output artifact.
    pub const OUTPUT_ERROR: i32 = 5;
    /// Packet file had no records.
    pub const NO_PACKETS: i32 = 6;
}

/// Map a CommandError to an exit code.
pub fn exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::InvalidArgument(_) => codes::INVALID_ARGS,
        CommandError::Filesystem(_) => codes::IO_ERROR,
        CommandError::Packets(PacketLoadError::Read(_)) => codes::IO_ERROR,
        CommandError::Packets(_) => codes::PACKET_ERROR,
        CommandError::Config(_) => codes::CONFIG_ERROR,
        CommandError::Output(_) | CommandError::Status(_) => codes::OUTPUT_ERROR,
        CommandError::NoPackets(_) => codes::NO_PACKETS,
    }
}
