// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::sequence::SequenceDescriptor;

/// The instrument driver the packer and the orchestrator talk to.
///
/// Errors are driver-defined and reach the caller unchanged as
/// [`crate::Error::Driver`].
pub trait AwgDriver {
    /// Device-native encoding of one channel's samples and markers.
    type Packed;

    fn pack_waveform(
        &mut self,
        samples: &[f32],
        marker1: &[bool],
        marker2: &[bool],
    ) -> anyhow::Result<Self::Packed>;

    /// Build the binary `.awg` sequence file.
    fn generate_awg_file(
        &mut self,
        sequence: &SequenceDescriptor<Self::Packed>,
    ) -> anyhow::Result<Vec<u8>>;

    /// Transfer a file to `path` on the instrument.
    fn send_awg_file(&mut self, path: &str, file: &[u8]) -> anyhow::Result<()>;

    /// Make the instrument load the sequence file at `path`.
    fn load_awg_file(&mut self, path: &str) -> anyhow::Result<()>;
}

impl<D: AwgDriver + ?Sized> AwgDriver for &mut D {
    type Packed = D::Packed;

    fn pack_waveform(
        &mut self,
        samples: &[f32],
        marker1: &[bool],
        marker2: &[bool],
    ) -> anyhow::Result<Self::Packed> {
        (**self).pack_waveform(samples, marker1, marker2)
    }

    fn generate_awg_file(
        &mut self,
        sequence: &SequenceDescriptor<Self::Packed>,
    ) -> anyhow::Result<Vec<u8>> {
        (**self).generate_awg_file(sequence)
    }

    fn send_awg_file(&mut self, path: &str, file: &[u8]) -> anyhow::Result<()> {
        (**self).send_awg_file(path, file)
    }

    fn load_awg_file(&mut self, path: &str) -> anyhow::Result<()> {
        (**self).load_awg_file(path)
    }
}
