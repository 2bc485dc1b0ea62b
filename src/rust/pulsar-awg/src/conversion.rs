// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Conversion from physical units to device-native units.
use pulsar_units::{Duration, Seconds, Voltage, Volts};

use crate::channel::Channel;
use crate::settings::DeviceSettings;
use crate::{Error, Result};

/// Waveform scale factor that makes each channel output `voltage`.
///
/// Waveform samples span [-1, 1] over the peak-to-peak amplitude of the
/// channel, hence the factor 2.
pub fn voltage_to_wfscale(
    settings: &DeviceSettings,
    voltage: Voltage<Volts>,
) -> Result<[f64; Channel::COUNT]> {
    let mut scales = [0.0; Channel::COUNT];
    for (channel, record) in settings.channels() {
        let amplitude = record.analog_amplitude;
        if amplitude == 0.0 {
            return Err(Error::DivideByZero { channel });
        }
        if !amplitude.is_finite() {
            return Err(Error::InvalidConfiguration(format!(
                "Analog amplitude of channel {channel} is {amplitude}"
            )));
        }
        scales[channel.slot()] = voltage.value() * 2.0 / amplitude;
    }
    Ok(scales)
}

/// Number of samples covering `time` at the configured sampling rate.
///
/// Exact ties round to the even sample count (IEEE round-half-to-even), so
/// 2.5 samples become 2 and 3.5 samples become 4.
pub fn time_to_samples(settings: &DeviceSettings, time: Duration<Seconds>) -> Result<i64> {
    let samples = time.value() * f64::from(settings.sampling_rate);
    if !samples.is_finite() || samples.abs() >= i64::MAX as f64 {
        return Err(Error::InvalidConfiguration(format!(
            "{time} is not representable in samples at {} Sa/s",
            settings.sampling_rate
        )));
    }
    Ok(samples.round_ties_even() as i64)
}
