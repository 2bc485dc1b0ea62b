// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::driver::AwgDriver;
use crate::packer::{DEFAULT_PREFIX, pack_sequence};
use crate::sequence::{SequenceElement, SequenceSpec};
use crate::settings::DeviceSettings;
use crate::Result;

/// Directory on the instrument that receives sequence files.
pub const AWGFILE_LOC: &str = "c:\\users\\oem\\documents\\";
/// File name used when no explicit path is given.
pub const AWGFILE_FN: &str = "myawesomeawgfile.awg";

pub fn default_awg_file_path() -> String {
    format!("{AWGFILE_LOC}{AWGFILE_FN}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramOptions {
    /// Transfer the generated file to the instrument.
    pub send: bool,
    /// Load the transferred file. Ignored unless `send` is set.
    pub load: bool,
    /// Target path on the instrument, [`default_awg_file_path`] if unset.
    pub filepath: Option<String>,
    pub sequence: Option<SequenceSpec>,
    pub prefix: String,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        ProgramOptions {
            send: true,
            load: true,
            filepath: None,
            sequence: None,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl ProgramOptions {
    pub fn send(mut self, send: bool) -> Self {
        self.send = send;
        self
    }

    pub fn load(mut self, load: bool) -> Self {
        self.load = load;
        self
    }

    pub fn filepath(mut self, path: impl Into<String>) -> Self {
        self.filepath = Some(path.into());
        self
    }

    pub fn sequence(mut self, sequence: SequenceSpec) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

/// What [`program_awg`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramReport {
    pub elements: usize,
    pub file_size: usize,
    /// Where the file was sent, `None` if it was not sent.
    pub path: Option<String>,
    pub loaded: bool,
}

/// Pack the elements, generate the sequence file and optionally send and load it.
///
/// Driver failures abort immediately; nothing is retried.
pub fn program_awg<D: AwgDriver>(
    driver: &mut D,
    settings: &DeviceSettings,
    elements: &[SequenceElement],
    options: &ProgramOptions,
) -> Result<ProgramReport> {
    let descriptor = pack_sequence(
        driver,
        settings,
        elements,
        options.sequence.as_ref(),
        &options.prefix,
    )?;
    let file = driver.generate_awg_file(&descriptor)?;
    let mut report = ProgramReport {
        elements: descriptor.len(),
        file_size: file.len(),
        path: None,
        loaded: false,
    };
    if !options.send {
        if options.load {
            pulsar_log::warn!("Not loading the sequence file, since it was not sent");
        }
        return Ok(report);
    }

    let path = options
        .filepath
        .clone()
        .unwrap_or_else(default_awg_file_path);
    pulsar_log::info!("Sending {} byte sequence file to '{}'", file.len(), path);
    driver.send_awg_file(&path, &file)?;
    if options.load {
        pulsar_log::info!("Loading sequence file '{}'", path);
        driver.load_awg_file(&path)?;
        report.loaded = true;
    }
    report.path = Some(path);
    Ok(report)
}
