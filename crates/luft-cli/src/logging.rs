//! Console and file logging for the `luft` binary.

use luft_core::{Telemetry, TelemetryError};

use crate::config::LoggingSection;

/// Build the telemetry handle from the `logging` section.
///
/// `-v` raises the level to `DEBUG`, `-vv` and above to `TRACE`. Console
/// output goes to stderr so command output on stdout stays clean.
pub fn telemetry_from(section: &LoggingSection, verbose: u8) -> Result<Telemetry, TelemetryError> {
    let level = match verbose {
        0 => section.level.as_str(),
        1 => "DEBUG",
        _ => "TRACE",
    };
    let mut builder = Telemetry::builder().level(level).stdout(false).stderr(true);
    if let Some(file) = &section.file {
        builder = builder.file(file);
    }
    builder.build()
}
