//! Constants and default values for the launcher.
//!
//! Centralizes the names, paths and defaults shared by the CLI, the
//! configuration loader and the worker spawner.

// ============================================================================
// Network Defaults
// ============================================================================

/// Hostname handed to the worker when none is configured.
pub const DEFAULT_HOSTNAME: &str = "127.0.0.1";

/// Port handed to the worker when none is configured.
pub const DEFAULT_PORT: u16 = 3030;

// ============================================================================
// Worker Defaults
// ============================================================================

/// Name of the rendering worker, used in log lines and error messages.
pub const WORKER_NAME: &str = "highcharts-convert";

/// Headless engine executable, resolved through `PATH`.
pub const DEFAULT_WORKER_PROGRAM: &str = "phantomjs";

/// Directory next to the launcher executable that holds the worker script.
pub const WORKER_SCRIPT_DIR: &str = "lib";

/// File name of the worker's entry script.
pub const WORKER_SCRIPT_FILE: &str = "highcharts-convert.js";

// ============================================================================
// Worker Argument Flags
// ============================================================================

/// Flag preceding the port in the worker's argument vector.
pub const WORKER_PORT_FLAG: &str = "-port";

/// Flag preceding the hostname in the worker's argument vector.
pub const WORKER_HOST_FLAG: &str = "-host";

// ============================================================================
// Environment Variables
// ============================================================================

/// Overrides the worker executable.
pub const ENV_WORKER_PROGRAM: &str = "CHART_EXPORT_WORKER_PROGRAM";

/// Overrides the worker entry script.
pub const ENV_WORKER_SCRIPT: &str = "CHART_EXPORT_WORKER_SCRIPT";

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit status after a signal-triggered shutdown.
pub const EXIT_SHUTDOWN: i32 = 0;

/// Exit status for configuration or startup failures.
pub const EXIT_FAILURE: i32 = 1;

/// Code reported for a child that exited without one (e.g. killed by a signal).
pub const FALLBACK_EXIT_CODE: i32 = 0;
