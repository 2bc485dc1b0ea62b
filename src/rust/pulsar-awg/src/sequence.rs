// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::channel::Channel;
use crate::layout::WaveformBuffer;
use crate::settings::{ChannelConfig, DeviceConfig};

/// An element handed to the packer.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceElement {
    /// Samples packed under a generated name.
    Waveform(WaveformBuffer),
    /// Samples packed under a user-chosen name.
    ///
    /// Reserved for sequences that reference one element several times;
    /// the packer rejects it.
    Named {
        name: String,
        waveform: WaveformBuffer,
    },
}

impl From<WaveformBuffer> for SequenceElement {
    fn from(waveform: WaveformBuffer) -> Self {
        SequenceElement::Waveform(waveform)
    }
}

/// One row of an explicit sequence table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEntry {
    pub element: usize,
    pub repetitions: u32,
    pub wait_for_trigger: bool,
    pub goto_first: bool,
    pub jump_to: u32,
}

/// Explicit sequence table.
///
/// Packing only supports the implicit sequence (every element once, in
/// order); a non-empty table is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceSpec {
    entries: Vec<SequenceEntry>,
}

impl SequenceSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: SequenceEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[SequenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<SequenceEntry>> for SequenceSpec {
    fn from(entries: Vec<SequenceEntry>) -> Self {
        SequenceSpec { entries }
    }
}

/// Waveform names per (element, channel).
///
/// Rows are elements in sequence order. Every row uses the same channel set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameTable {
    names: BTreeMap<(usize, Channel), String>,
    rows: usize,
}

impl NameTable {
    pub(crate) fn with_rows(rows: usize) -> Self {
        NameTable {
            names: BTreeMap::new(),
            rows,
        }
    }

    pub(crate) fn insert(&mut self, element: usize, channel: Channel, name: String) {
        self.names.insert((element, channel), name);
    }

    pub fn get(&self, element: usize, channel: Channel) -> Option<&str> {
        self.names.get(&(element, channel)).map(String::as_str)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Channels that carry a waveform, ascending.
    pub fn channels(&self) -> Vec<Channel> {
        let channels: BTreeSet<Channel> = self.names.keys().map(|(_, c)| *c).collect();
        channels.into_iter().collect()
    }

    /// Names of one element, by ascending channel.
    pub fn row(&self, element: usize) -> Vec<&str> {
        self.names
            .range((element, Channel::ALL[0])..=(element, Channel::ALL[Channel::COUNT - 1]))
            .map(|(_, name)| name.as_str())
            .collect()
    }

    /// Element-major view: one row of names per element.
    pub fn rows(&self) -> Vec<Vec<&str>> {
        (0..self.rows).map(|element| self.row(element)).collect()
    }

    /// Channel-major view: per channel, the names of all elements in order.
    ///
    /// This is the orientation the sequence file generator consumes.
    pub fn by_channel(&self) -> Vec<(Channel, Vec<&str>)> {
        self.channels()
            .into_iter()
            .map(|channel| {
                let names = (0..self.rows)
                    .filter_map(|element| self.get(element, channel))
                    .collect();
                (channel, names)
            })
            .collect()
    }
}

/// Everything the driver needs to generate a sequence file.
///
/// Field names follow the driver's `generate_awg_file` arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDescriptor<P> {
    pub packed_waveforms: IndexMap<String, P>,
    pub wfname_l: NameTable,
    pub nrep: Vec<u32>,
    pub trig_wait: Vec<bool>,
    pub goto_state: Vec<bool>,
    pub jump_to: Vec<u32>,
    pub channel_cfg: ChannelConfig,
    pub sequence_cfg: DeviceConfig,
}

impl<P> SequenceDescriptor<P> {
    /// Number of sequence elements.
    pub fn len(&self) -> usize {
        self.nrep.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nrep.is_empty()
    }
}
