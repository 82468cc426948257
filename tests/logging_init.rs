//! Global subscriber installation.
//!
//! Lives in its own test binary: installing the global subscriber would
//! otherwise clash with `#[traced_test]` in the library's unit tests.

use segtemp::config::MonitorConfig;
use segtemp::logging::{self, OutputFormat, TracingConfig};
use tracing::Level;

#[test]
fn test_init_is_idempotent() {
    let mut config = MonitorConfig::default();
    config.application.log_format = "compact".to_string();

    assert!(logging::init_from_config(&config).is_ok());
    assert!(tracing::dispatcher::has_been_set());

    // A second install, even with different settings, is a no-op
    let again = TracingConfig::new(Level::ERROR).with_format(OutputFormat::Json);
    assert!(logging::init(again).is_ok());
}

#[test]
fn test_invalid_level_is_rejected_before_install() {
    let mut config = MonitorConfig::default();
    config.application.log_level = "chatty".to_string();
    assert!(logging::init_from_config(&config).is_err());
}
