// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Record layout of one waveform element.
//!
//! Every channel contributes three fields to a sample record: the analog
//! value `ch{c}_wf` and the marker bits `ch{c}_m1` and `ch{c}_m2`. The
//! [`WaveformBuffer`] stores these fields column-wise, one
//! [`ChannelSamples`] per present channel.
use std::collections::BTreeMap;

use crate::channel::Channel;
use crate::{Error, Result};

const DEFAULT_CHANNELS: [u8; Channel::COUNT] = [1, 2, 3, 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Half precision analog sample. The device quantizes to 14 bits, so
    /// 16 bits is all the buffer needs to carry.
    Float16,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub kind: FieldType,
}

impl Field {
    fn new(name: String, kind: FieldType) -> Self {
        Field { name, kind }
    }
}

/// Field layout of a sample record for the given channels (default: 1 to 4).
///
/// Indices outside 1 to 4 are not rejected; the resulting field names simply
/// never match a channel during packing.
pub fn waveform_layout(channels: Option<&[u8]>) -> Vec<Field> {
    let channels = channels.unwrap_or(&DEFAULT_CHANNELS);
    let mut layout = Vec::with_capacity(3 * channels.len());
    for c in channels {
        layout.push(Field::new(format!("ch{c}_wf"), FieldType::Float16));
        layout.push(Field::new(format!("ch{c}_m1"), FieldType::Bool));
        layout.push(Field::new(format!("ch{c}_m2"), FieldType::Bool));
    }
    layout
}

/// Allocate an empty buffer with the layout of [`waveform_layout`].
///
/// Indices outside 1 to 4 cannot be packed and are left out.
pub fn empty_waveform(channels: Option<&[u8]>) -> WaveformBuffer {
    let channels = channels.unwrap_or(&DEFAULT_CHANNELS);
    let mut buffer = WaveformBuffer::new();
    for channel in channels.iter().filter_map(|&c| Channel::new(c).ok()) {
        buffer.channels.insert(channel, ChannelSamples::default());
    }
    buffer
}

/// One sample of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleRecord {
    pub wf: f32,
    pub m1: bool,
    pub m2: bool,
}

impl SampleRecord {
    pub fn new(wf: f32, m1: bool, m2: bool) -> Self {
        SampleRecord { wf, m1, m2 }
    }
}

/// The sample stream of a single channel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelSamples {
    wf: Vec<f32>,
    m1: Vec<bool>,
    m2: Vec<bool>,
}

impl ChannelSamples {
    pub fn new(wf: Vec<f32>, m1: Vec<bool>, m2: Vec<bool>) -> Result<Self> {
        if wf.len() != m1.len() || wf.len() != m2.len() {
            return Err(Error::InvalidWaveform(format!(
                "Analog and marker streams differ in length: {} / {} / {}",
                wf.len(),
                m1.len(),
                m2.len()
            )));
        }
        Ok(ChannelSamples { wf, m1, m2 })
    }

    /// Analog samples with both markers held low.
    pub fn from_analog(wf: Vec<f32>) -> Self {
        let len = wf.len();
        ChannelSamples {
            wf,
            m1: vec![false; len],
            m2: vec![false; len],
        }
    }

    pub fn wf(&self) -> &[f32] {
        &self.wf
    }

    pub fn m1(&self) -> &[bool] {
        &self.m1
    }

    pub fn m2(&self) -> &[bool] {
        &self.m2
    }

    pub fn len(&self) -> usize {
        self.wf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wf.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = SampleRecord> + '_ {
        self.wf
            .iter()
            .zip(&self.m1)
            .zip(&self.m2)
            .map(|((&wf, &m1), &m2)| SampleRecord { wf, m1, m2 })
    }

    fn push(&mut self, record: SampleRecord) {
        self.wf.push(record.wf);
        self.m1.push(record.m1);
        self.m2.push(record.m2);
    }
}

impl FromIterator<SampleRecord> for ChannelSamples {
    fn from_iter<I: IntoIterator<Item = SampleRecord>>(iter: I) -> Self {
        let mut samples = ChannelSamples::default();
        for record in iter {
            samples.push(record);
        }
        samples
    }
}

/// Samples of one waveform element for every present channel.
///
/// All channel streams have the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaveformBuffer {
    channels: BTreeMap<Channel, ChannelSamples>,
}

impl WaveformBuffer {
    pub fn new() -> Self {
        WaveformBuffer {
            channels: BTreeMap::new(),
        }
    }

    pub fn from_channels(
        channels: impl IntoIterator<Item = (Channel, ChannelSamples)>,
    ) -> Result<Self> {
        let mut buffer = WaveformBuffer::new();
        for (channel, samples) in channels {
            buffer.insert_channel(channel, samples)?;
        }
        Ok(buffer)
    }

    /// Add the stream of a channel that is not yet present.
    pub fn insert_channel(&mut self, channel: Channel, samples: ChannelSamples) -> Result<()> {
        if self.channels.contains_key(&channel) {
            return Err(Error::InvalidWaveform(format!(
                "Channel {channel} is already present"
            )));
        }
        if let Some(len) = self.channel_len()
            && samples.len() != len
        {
            return Err(Error::InvalidWaveform(format!(
                "Channel {channel} has {} samples, other channels have {len}",
                samples.len()
            )));
        }
        self.channels.insert(channel, samples);
        Ok(())
    }

    /// Append one record to every present channel.
    ///
    /// The row must name exactly the present channels, each once. Nothing is
    /// appended if it does not.
    pub fn push_row(
        &mut self,
        row: impl IntoIterator<Item = (Channel, SampleRecord)>,
    ) -> Result<()> {
        let row: BTreeMap<Channel, SampleRecord> = row.into_iter().collect();
        if !row.keys().eq(self.channels.keys()) {
            return Err(Error::InvalidWaveform(format!(
                "Row covers channels {:?}, buffer has channels {:?}",
                row.keys().map(|c| c.index()).collect::<Vec<_>>(),
                self.channel_indices(),
            )));
        }
        for (channel, record) in row {
            if let Some(samples) = self.channels.get_mut(&channel) {
                samples.push(record);
            }
        }
        Ok(())
    }

    pub fn channel(&self, channel: Channel) -> Option<&ChannelSamples> {
        self.channels.get(&channel)
    }

    /// Present channels in ascending order.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.channels.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &ChannelSamples)> {
        self.channels.iter().map(|(c, s)| (*c, s))
    }

    pub(crate) fn channel_indices(&self) -> Vec<u8> {
        self.channels().map(Channel::index).collect()
    }

    fn channel_len(&self) -> Option<usize> {
        self.channels.values().next().map(ChannelSamples::len)
    }

    /// Number of sample records per channel.
    pub fn len(&self) -> usize {
        self.channel_len().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn field_names(&self) -> Vec<String> {
        waveform_layout(Some(&self.channel_indices()))
            .into_iter()
            .map(|field| field.name)
            .collect()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.channels()
            .any(|c| waveform_layout(Some(&[c.index()])).iter().any(|f| f.name == name))
    }
}
