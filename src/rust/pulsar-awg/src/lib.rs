// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Waveform-to-sequence packing for the Tektronix AWG5014.
//!
//! The crate turns a list of waveform elements and a [`DeviceSettings`] store
//! into the [`SequenceDescriptor`] a device driver needs to build an `.awg`
//! sequence file, and drives the driver through file generation, transfer and
//! loading. The driver itself is supplied by the caller through the
//! [`AwgDriver`] trait.

pub mod channel;
pub mod conversion;
pub mod driver;
pub mod handler;
pub mod layout;
pub mod packer;
pub mod program;
pub mod sequence;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use channel::Channel;
pub use driver::AwgDriver;
pub use handler::Awg5014Handler;
pub use layout::{
    ChannelSamples, Field, FieldType, SampleRecord, WaveformBuffer, empty_waveform,
    waveform_layout,
};
pub use program::{AWGFILE_FN, AWGFILE_LOC, ProgramOptions, ProgramReport};
pub use sequence::{NameTable, SequenceDescriptor, SequenceElement, SequenceEntry, SequenceSpec};
pub use settings::{
    ChannelConfig, ChannelSettings, DeviceConfig, DeviceSettings, SettingValue, settings2cfg,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Not supported: {0}")]
    NotSupported(String),
    #[error("Invalid settings shape: {0}")]
    InvalidSettingsShape(String),
    #[error("Division by zero: analog amplitude of channel {channel} is zero")]
    DivideByZero { channel: Channel },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Channel index {0} is outside of 1..=4")]
    InvalidChannel(u8),
    #[error("Invalid waveform: {0}")]
    InvalidWaveform(String),
    #[error(
        "Element {element} uses channels {found:?}, but the sequence uses channels {expected:?}"
    )]
    InconsistentChannels {
        element: usize,
        expected: Vec<u8>,
        found: Vec<u8>,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Failure reported by the instrument driver, passed through unchanged.
    #[error(transparent)]
    Driver(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
