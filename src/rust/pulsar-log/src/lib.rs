// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Logging helpers for the AWG sequence packing crates.
//!
//! All records are emitted through the `log` facade under the target
//! `pulsar.awg::<module path>`, so the host application decides which logger
//! receives them and can filter the packing crates by that prefix.

use std::sync::atomic::{AtomicBool, Ordering};

#[doc(hidden)]
pub use log as _log;

/// Prefix of every log target written by these macros.
pub const TARGET_PREFIX: &str = "pulsar.awg::";

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:ident, $($arg:tt)+) => {
        $crate::_log::$level!(target: concat!("pulsar.awg::", module_path!()), $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::__log!(info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::__log!(warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::__log!(debug, $($arg)+)
    };
}

/// Log a per-waveform diagnostic at debug level if diagnostics are enabled.
///
/// Packing emits one record per channel slice, which is too chatty to leave
/// on by default.
#[macro_export]
macro_rules! diagnostic {
    ($($arg:tt)+) => {
        if $crate::is_diagnostics_enabled() {
            $crate::__log!(debug, $($arg)+);
        }
    };
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn is_diagnostics_enabled() -> bool {
    DIAGNOSTICS_ENABLED.load(Ordering::Acquire)
}

/// Toggle whether diagnostic records are produced.
///
/// No concrete logger is installed here; the application picks one
/// (e.g. `env_logger`).
pub fn init_logging(with_diagnostics: bool) {
    DIAGNOSTICS_ENABLED.store(with_diagnostics, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::Mutex;

    struct Capture(Mutex<Vec<(Level, String, String)>>);

    impl Log for Capture {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            if let Ok(mut records) = self.0.lock() {
                records.push((
                    record.level(),
                    record.target().to_string(),
                    record.args().to_string(),
                ));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

    // Single test: the logger and the diagnostics switch are process-wide.
    #[test]
    fn test_targets_and_diagnostics_switch() {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Trace);

        init_logging(false);
        assert!(!is_diagnostics_enabled());
        info!("packed {} elements", 3);
        warn!("not loading");
        debug!("rate {}", 1.2e9);
        diagnostic!("dropped");

        init_logging(true);
        assert!(is_diagnostics_enabled());
        diagnostic!("slice {}", "wf-0000_ch1");
        init_logging(false);

        let records = CAPTURE.0.lock().unwrap();
        let target = format!("{TARGET_PREFIX}{}", module_path!());
        assert_eq!(
            *records,
            [
                (Level::Info, target.clone(), "packed 3 elements".to_string()),
                (Level::Warn, target.clone(), "not loading".to_string()),
                (Level::Debug, target.clone(), "rate 1200000000".to_string()),
                (Level::Debug, target, "slice wf-0000_ch1".to_string()),
            ]
        );
    }
}
