// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Device settings of the AWG and their flattening into driver configs.
//!
//! The settings form a fixed two-level schema: a set of global scalars and
//! one sub-record per channel. The driver wants them as two flat maps,
//! `UPPERCASE(name)` for the globals and `UPPERCASE(name)_<channel>` for the
//! channel fields, see [`settings2cfg`].
//!
//! The same nested shape is used for JSON overrides:
//!
//! ```json
//! { "sampling_rate": 1200000000, "channel_2": { "analog_amplitude": 1.0 } }
//! ```
use std::fmt;

use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::channel::Channel;
use crate::{Error, Result};

/// Names of the global scalar settings, in declaration order.
pub const DEVICE_FIELDS: [&str; 9] = [
    "sampling_rate",
    "clock_source",
    "reference_source",
    "external_reference_type",
    "trigger_source",
    "trigger_input_impedance",
    "trigger_input_threshold",
    "run_mode",
    "run_state",
];

/// Names of the per-channel settings, in declaration order.
pub const CHANNEL_FIELDS: [&str; 3] = ["channel_state", "analog_amplitude", "analog_offset"];

const CHANNEL_KEY_PREFIX: &str = "channel_";

/// Flat config of the global settings, keyed `UPPERCASE(name)`.
pub type DeviceConfig = IndexMap<String, SettingValue>;
/// Flat config of the channel settings, keyed `UPPERCASE(name)_<channel>`.
pub type ChannelConfig = IndexMap<String, SettingValue>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Integer(i64),
    Float(f64),
}

impl SettingValue {
    pub fn as_f64(self) -> f64 {
        match self {
            SettingValue::Integer(v) => v as f64,
            SettingValue::Float(v) => v,
        }
    }

    /// Integral value, accepting floats without fractional part.
    fn as_integer(self) -> Option<i64> {
        match self {
            SettingValue::Integer(v) => Some(v),
            SettingValue::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                Some(v as i64)
            }
            SettingValue::Float(_) => None,
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(SettingValue::Integer)
                .or_else(|| n.as_f64().map(SettingValue::Float)),
            _ => None,
        }
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Integer(value)
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        SettingValue::Integer(value.into())
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Integer(v) => write!(f, "{v}"),
            SettingValue::Float(v) => write!(f, "{v:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSettings {
    pub channel_state: i64,
    /// Peak-to-peak amplitude in volts.
    pub analog_amplitude: f64,
    /// Offset in volts.
    pub analog_offset: f64,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        ChannelSettings {
            channel_state: 2,
            analog_amplitude: 2.0,
            analog_offset: 0.0,
        }
    }
}

impl ChannelSettings {
    pub fn fields(&self) -> [(&'static str, SettingValue); CHANNEL_FIELDS.len()] {
        [
            (CHANNEL_FIELDS[0], self.channel_state.into()),
            (CHANNEL_FIELDS[1], self.analog_amplitude.into()),
            (CHANNEL_FIELDS[2], self.analog_offset.into()),
        ]
    }

    fn set_field(&mut self, name: &str, value: SettingValue) -> Result<()> {
        match name {
            "channel_state" => self.channel_state = integer_field(name, value)?,
            "analog_amplitude" => self.analog_amplitude = value.as_f64(),
            "analog_offset" => self.analog_offset = value.as_f64(),
            _ => {
                return Err(Error::InvalidSettingsShape(format!(
                    "Unknown channel setting '{name}'"
                )));
            }
        }
        Ok(())
    }
}

/// Settings of the whole instrument.
///
/// There are always exactly four channel records. The default value matches
/// the instrument's power-on configuration used in the lab; clone it and
/// override fields before handing it to a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSettings {
    /// Samples per second.
    pub sampling_rate: u32,
    pub clock_source: i64,
    pub reference_source: i64,
    pub external_reference_type: i64,
    pub trigger_source: i64,
    pub trigger_input_impedance: i64,
    /// Trigger threshold in volts.
    pub trigger_input_threshold: f64,
    pub run_mode: i64,
    pub run_state: i64,
    channels: [ChannelSettings; Channel::COUNT],
}

impl Default for DeviceSettings {
    fn default() -> Self {
        DeviceSettings {
            sampling_rate: 1_000_000_000,
            clock_source: 1,
            reference_source: 2,
            external_reference_type: 1,
            trigger_source: 1,
            trigger_input_impedance: 1,
            trigger_input_threshold: 0.5,
            run_mode: 4,
            run_state: 0,
            channels: Default::default(),
        }
    }
}

impl DeviceSettings {
    pub fn channel(&self, channel: Channel) -> &ChannelSettings {
        &self.channels[channel.slot()]
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut ChannelSettings {
        &mut self.channels[channel.slot()]
    }

    /// Channel records paired with their channel, in ascending order.
    pub fn channels(&self) -> impl Iterator<Item = (Channel, &ChannelSettings)> {
        Channel::ALL.into_iter().zip(self.channels.iter())
    }

    pub fn with_sampling_rate(mut self, sampling_rate: u32) -> Self {
        self.sampling_rate = sampling_rate;
        self
    }

    pub fn with_channel(mut self, channel: Channel, settings: ChannelSettings) -> Self {
        self.channels[channel.slot()] = settings;
        self
    }

    pub fn with_amplitude(mut self, channel: Channel, amplitude: f64) -> Self {
        self.channel_mut(channel).analog_amplitude = amplitude;
        self
    }

    /// The global scalars, in [`DEVICE_FIELDS`] order.
    pub fn scalars(&self) -> [(&'static str, SettingValue); DEVICE_FIELDS.len()] {
        [
            (DEVICE_FIELDS[0], self.sampling_rate.into()),
            (DEVICE_FIELDS[1], self.clock_source.into()),
            (DEVICE_FIELDS[2], self.reference_source.into()),
            (DEVICE_FIELDS[3], self.external_reference_type.into()),
            (DEVICE_FIELDS[4], self.trigger_source.into()),
            (DEVICE_FIELDS[5], self.trigger_input_impedance.into()),
            (DEVICE_FIELDS[6], self.trigger_input_threshold.into()),
            (DEVICE_FIELDS[7], self.run_mode.into()),
            (DEVICE_FIELDS[8], self.run_state.into()),
        ]
    }

    fn set_scalar(&mut self, name: &str, value: SettingValue) -> Result<()> {
        match name {
            "sampling_rate" => {
                self.sampling_rate = integer_field(name, value)?.try_into().map_err(|_| {
                    Error::InvalidSettingsShape(format!(
                        "'{name}' must be within 0..={}, got {value}",
                        u32::MAX
                    ))
                })?
            }
            "clock_source" => self.clock_source = integer_field(name, value)?,
            "reference_source" => self.reference_source = integer_field(name, value)?,
            "external_reference_type" => {
                self.external_reference_type = integer_field(name, value)?
            }
            "trigger_source" => self.trigger_source = integer_field(name, value)?,
            "trigger_input_impedance" => {
                self.trigger_input_impedance = integer_field(name, value)?
            }
            "trigger_input_threshold" => self.trigger_input_threshold = value.as_f64(),
            "run_mode" => self.run_mode = integer_field(name, value)?,
            "run_state" => self.run_state = integer_field(name, value)?,
            _ => {
                return Err(Error::InvalidSettingsShape(format!(
                    "Unknown device setting '{name}'"
                )));
            }
        }
        Ok(())
    }

    /// Parse settings in the nested JSON shape, starting from the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings = DeviceSettings::default();
        settings.merge_json(json)?;
        Ok(settings)
    }

    /// Override fields from a JSON document in the nested shape.
    ///
    /// Either all overrides are applied or, on error, none.
    pub fn merge_json(&mut self, json: &str) -> Result<()> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(tree) = value else {
            return Err(Error::InvalidSettingsShape(
                "Settings must be a JSON object".to_string(),
            ));
        };
        let mut merged = self.clone();
        merged.merge_tree(&tree)?;
        *self = merged;
        Ok(())
    }

    fn merge_tree(&mut self, tree: &Map<String, Value>) -> Result<()> {
        for (key, value) in tree {
            match value {
                Value::Object(fields) => {
                    let channel = channel_from_key(key)?;
                    for (name, value) in fields {
                        let value = scalar_from_json(name, value)?;
                        pulsar_log::diagnostic!("Channel {} override: {} = {}", channel, name, value);
                        self.channel_mut(channel).set_field(name, value)?;
                    }
                }
                _ if key.starts_with(CHANNEL_KEY_PREFIX) => {
                    return Err(Error::InvalidSettingsShape(format!(
                        "'{key}' must hold a channel record"
                    )));
                }
                value => {
                    let value = scalar_from_json(key, value)?;
                    pulsar_log::diagnostic!("Device override: {} = {}", key, value);
                    self.set_scalar(key, value)?;
                }
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for DeviceSettings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(DEVICE_FIELDS.len() + Channel::COUNT))?;
        for (name, value) in self.scalars() {
            map.serialize_entry(name, &value)?;
        }
        for (channel, settings) in self.channels() {
            map.serialize_entry(&format!("{CHANNEL_KEY_PREFIX}{channel}"), settings)?;
        }
        map.end()
    }
}

fn integer_field(name: &str, value: SettingValue) -> Result<i64> {
    value.as_integer().ok_or_else(|| {
        Error::InvalidSettingsShape(format!("'{name}' expects an integer, got {value}"))
    })
}

fn scalar_from_json(name: &str, value: &Value) -> Result<SettingValue> {
    SettingValue::from_json(value).ok_or_else(|| {
        Error::InvalidSettingsShape(format!("'{name}' expects a number, got {value}"))
    })
}

/// A nested record is only valid under a key ending in its channel digit.
fn channel_from_key(key: &str) -> Result<Channel> {
    let invalid = || {
        Error::InvalidSettingsShape(format!(
            "Nested record under '{key}', expected '{CHANNEL_KEY_PREFIX}<1..4>'"
        ))
    };
    let digit = key.strip_prefix(CHANNEL_KEY_PREFIX).ok_or_else(invalid)?;
    let index: u8 = digit.parse().map_err(|_| invalid())?;
    Channel::new(index).map_err(|_| invalid())
}

/// Flatten the settings into the device config and the channel config.
pub fn settings2cfg(settings: &DeviceSettings) -> (DeviceConfig, ChannelConfig) {
    let device_cfg = settings
        .scalars()
        .into_iter()
        .map(|(name, value)| (name.to_uppercase(), value))
        .collect();
    let channel_cfg = settings
        .channels()
        .flat_map(|(channel, record)| {
            record
                .fields()
                .into_iter()
                .map(move |(name, value)| (format!("{}_{channel}", name.to_uppercase()), value))
        })
        .collect();
    (device_cfg, channel_cfg)
}
