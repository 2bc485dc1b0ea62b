// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Front end for programming an AWG5014 through its driver.
use pulsar_units::{seconds, volts};

use crate::Result;
use crate::channel::Channel;
use crate::conversion;
use crate::driver::AwgDriver;
use crate::layout::{self, Field, WaveformBuffer};
use crate::packer::{self, DEFAULT_PREFIX};
use crate::program::{self, ProgramOptions, ProgramReport};
use crate::sequence::{SequenceDescriptor, SequenceElement, SequenceSpec};
use crate::settings::{self, ChannelConfig, DeviceConfig, DeviceSettings};

/// Owns the driver of one instrument together with the settings it is
/// programmed with.
///
/// The settings are fixed at construction. To program with different
/// settings, build a new handler from a modified clone.
#[derive(Debug)]
pub struct Awg5014Handler<D: AwgDriver> {
    driver: D,
    settings: DeviceSettings,
}

impl<D: AwgDriver> Awg5014Handler<D> {
    pub fn new(driver: D) -> Self {
        Self::with_settings(driver, DeviceSettings::default())
    }

    pub fn with_settings(driver: D, settings: DeviceSettings) -> Self {
        pulsar_log::debug!(
            "AWG5014 handler at {} Sa/s, amplitudes {:?} Vpp",
            settings.sampling_rate,
            settings
                .channels()
                .map(|(_, c)| c.analog_amplitude)
                .collect::<Vec<_>>()
        );
        Awg5014Handler { driver, settings }
    }

    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Flatten `settings` into the device config and the channel config.
    pub fn settings2cfg(settings: &DeviceSettings) -> (DeviceConfig, ChannelConfig) {
        settings::settings2cfg(settings)
    }

    /// Record layout for `chans`, all four channels if `None`.
    pub fn get_awg_wf_dtype(chans: Option<&[u8]>) -> Vec<Field> {
        layout::waveform_layout(chans)
    }

    /// Empty buffer with the record layout for `chans`.
    pub fn get_awg_wf_buffer(chans: Option<&[u8]>) -> WaveformBuffer {
        layout::empty_waveform(chans)
    }

    /// Waveform scale per channel for an output of `voltage` volts.
    pub fn voltage_to_wfscale(&self, voltage: f64) -> Result<[f64; Channel::COUNT]> {
        conversion::voltage_to_wfscale(&self.settings, volts(voltage))
    }

    /// Sample count of `time` seconds.
    pub fn time_to_samples(&self, time: f64) -> Result<i64> {
        conversion::time_to_samples(&self.settings, seconds(time))
    }

    /// Pack a single channel's samples and markers.
    pub fn pack_awg_wf(
        &mut self,
        samples: &[f32],
        marker1: &[bool],
        marker2: &[bool],
    ) -> Result<D::Packed> {
        Ok(self.driver.pack_waveform(samples, marker1, marker2)?)
    }

    /// Pack `wfs` for sequence file generation. `autoprefix` defaults to `"wf"`.
    pub fn pack_awg_wfs(
        &mut self,
        wfs: &[SequenceElement],
        seq: Option<&SequenceSpec>,
        autoprefix: Option<&str>,
    ) -> Result<SequenceDescriptor<D::Packed>> {
        packer::pack_sequence(
            &mut self.driver,
            &self.settings,
            wfs,
            seq,
            autoprefix.unwrap_or(DEFAULT_PREFIX),
        )
    }

    /// Pack `wfs`, generate the sequence file and, as `options` say, send and load it.
    pub fn program_awg(
        &mut self,
        wfs: &[SequenceElement],
        options: &ProgramOptions,
    ) -> Result<ProgramReport> {
        program::program_awg(&mut self.driver, &self.settings, wfs, options)
    }
}
