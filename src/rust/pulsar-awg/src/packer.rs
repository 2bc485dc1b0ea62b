// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Packing of waveform elements into a sequence descriptor.
//!
//! Each element is played once, in order. The sequencer waits for a trigger
//! before the first element and jumps back to the first element after the
//! last one.
use indexmap::IndexMap;

use crate::channel::Channel;
use crate::driver::AwgDriver;
use crate::layout::WaveformBuffer;
use crate::sequence::{NameTable, SequenceDescriptor, SequenceElement, SequenceSpec};
use crate::settings::{DeviceSettings, settings2cfg};
use crate::{Error, Result};

pub const DEFAULT_PREFIX: &str = "wf";

/// Name of the packed waveform of `channel` in element `index`.
pub fn element_name(prefix: &str, index: usize, channel: Channel) -> String {
    format!("{prefix}-{index:04}_ch{channel}")
}

/// Check the input before the driver sees any of it.
fn validate<'a>(
    elements: &'a [SequenceElement],
    sequence: Option<&SequenceSpec>,
) -> Result<Vec<&'a WaveformBuffer>> {
    if sequence.is_some_and(|s| !s.is_empty()) {
        return Err(Error::NotSupported(
            "Explicit sequence tables are not available, elements are played once in order"
                .to_string(),
        ));
    }
    let mut waveforms = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        match element {
            SequenceElement::Waveform(waveform) => waveforms.push(waveform),
            SequenceElement::Named { name, .. } => {
                return Err(Error::NotSupported(format!(
                    "Element {index} is named '{name}', named elements are not available"
                )));
            }
        }
    }
    if let Some((first, rest)) = waveforms.split_first() {
        let expected = first.channel_indices();
        for (index, waveform) in rest.iter().enumerate() {
            let found = waveform.channel_indices();
            if found != expected {
                return Err(Error::InconsistentChannels {
                    element: index + 1,
                    expected,
                    found,
                });
            }
        }
    }
    Ok(waveforms)
}

/// Pack all elements and assemble the sequencing metadata.
///
/// Fails without output if a non-empty `sequence` is given, if an element
/// is [`SequenceElement::Named`], if the elements do not all use the same
/// channels, or if the driver fails to pack a waveform.
pub fn pack_sequence<D: AwgDriver>(
    driver: &mut D,
    settings: &DeviceSettings,
    elements: &[SequenceElement],
    sequence: Option<&SequenceSpec>,
    prefix: &str,
) -> Result<SequenceDescriptor<D::Packed>> {
    let waveforms = validate(elements, sequence)?;
    let count = waveforms.len();

    let mut packed_waveforms = IndexMap::with_capacity(count * Channel::COUNT);
    let mut wfname_l = NameTable::with_rows(count);
    let mut nrep = Vec::with_capacity(count);
    let mut trig_wait = Vec::with_capacity(count);
    let mut goto_state = Vec::with_capacity(count);
    let mut jump_to = Vec::with_capacity(count);

    for (index, waveform) in waveforms.into_iter().enumerate() {
        for (channel, samples) in waveform.iter() {
            let package = driver.pack_waveform(samples.wf(), samples.m1(), samples.m2())?;
            let name = element_name(prefix, index, channel);
            pulsar_log::diagnostic!("Packed {} samples as '{}'", samples.len(), name);
            packed_waveforms.insert(name.clone(), package);
            wfname_l.insert(index, channel, name);
        }
        nrep.push(1);
        trig_wait.push(index == 0);
        goto_state.push(index + 1 == count);
        jump_to.push(0);
    }

    let (sequence_cfg, channel_cfg) = settings2cfg(settings);
    pulsar_log::info!(
        "Packed {} sequence elements on channels {:?}",
        count,
        wfname_l.channels().iter().map(|c| c.index()).collect::<Vec<_>>()
    );
    Ok(SequenceDescriptor {
        packed_waveforms,
        wfname_l,
        nrep,
        trig_wait,
        goto_state,
        jump_to,
        channel_cfg,
        sequence_cfg,
    })
}
