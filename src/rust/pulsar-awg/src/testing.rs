// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use anyhow::bail;

use crate::channel::Channel;
use crate::driver::AwgDriver;
use crate::layout::{ChannelSamples, SampleRecord, WaveformBuffer};
use crate::sequence::{SequenceDescriptor, SequenceElement};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Pack { len: usize },
    Generate { elements: usize },
    Send { path: String, size: usize },
    Load { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FailAt {
    Pack(usize),
    Generate,
    Send,
    Load,
}

/// Driver that records every call and packs samples as their byte image.
#[derive(Debug, Default)]
pub(crate) struct RecordingDriver {
    pub calls: Vec<Call>,
    pub fail_at: Option<FailAt>,
    /// Waveform names of the last generated file.
    pub generated_names: Vec<String>,
    packed: usize,
}

impl RecordingDriver {
    pub fn failing(fail_at: FailAt) -> Self {
        RecordingDriver {
            fail_at: Some(fail_at),
            ..Default::default()
        }
    }

    pub fn pack_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Pack { .. }))
            .count()
    }
}

impl AwgDriver for RecordingDriver {
    type Packed = Vec<u8>;

    fn pack_waveform(
        &mut self,
        samples: &[f32],
        marker1: &[bool],
        marker2: &[bool],
    ) -> anyhow::Result<Vec<u8>> {
        if self.fail_at == Some(FailAt::Pack(self.packed)) {
            bail!("pack failed at call {}", self.packed);
        }
        self.packed += 1;
        self.calls.push(Call::Pack { len: samples.len() });
        let mut packed = Vec::with_capacity(samples.len() * 5);
        for ((wf, m1), m2) in samples.iter().zip(marker1).zip(marker2) {
            packed.extend_from_slice(&wf.to_le_bytes());
            packed.push((u8::from(*m1) << 6) | (u8::from(*m2) << 7));
        }
        Ok(packed)
    }

    fn generate_awg_file(
        &mut self,
        sequence: &SequenceDescriptor<Vec<u8>>,
    ) -> anyhow::Result<Vec<u8>> {
        if self.fail_at == Some(FailAt::Generate) {
            bail!("generate failed");
        }
        self.calls.push(Call::Generate {
            elements: sequence.len(),
        });
        self.generated_names = sequence.packed_waveforms.keys().cloned().collect();
        Ok(sequence.packed_waveforms.values().flatten().copied().collect())
    }

    fn send_awg_file(&mut self, path: &str, file: &[u8]) -> anyhow::Result<()> {
        if self.fail_at == Some(FailAt::Send) {
            bail!("send failed");
        }
        self.calls.push(Call::Send {
            path: path.to_string(),
            size: file.len(),
        });
        Ok(())
    }

    fn load_awg_file(&mut self, path: &str) -> anyhow::Result<()> {
        if self.fail_at == Some(FailAt::Load) {
            bail!("load failed");
        }
        self.calls.push(Call::Load {
            path: path.to_string(),
        });
        Ok(())
    }
}

/// A ramp of `len` samples on each of `channels`, marker 1 high on the first sample.
pub(crate) fn ramp(channels: &[u8], len: usize) -> SequenceElement {
    let channels = channels.iter().map(|&c| {
        let samples: ChannelSamples = (0..len)
            .map(|i| SampleRecord::new(i as f32 / len as f32, i == 0, false))
            .collect();
        (Channel::new(c).unwrap(), samples)
    });
    WaveformBuffer::from_channels(channels).unwrap().into()
}
