// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pulsar_awg::{
    AwgDriver, Channel, ChannelSamples, DeviceSettings, SequenceDescriptor, SequenceElement,
    WaveformBuffer, packer,
};
use std::f32::consts::TAU;
use std::hint::black_box;

/// Packs into 14 bit codes, the sequence file is discarded.
struct NullDriver;

impl AwgDriver for NullDriver {
    type Packed = Vec<u16>;

    fn pack_waveform(
        &mut self,
        samples: &[f32],
        marker1: &[bool],
        marker2: &[bool],
    ) -> anyhow::Result<Vec<u16>> {
        Ok(samples
            .iter()
            .zip(marker1.iter().zip(marker2))
            .map(|(&wf, (&m1, &m2))| {
                ((wf + 1.0) * 8191.5) as u16 | (u16::from(m1) << 14) | (u16::from(m2) << 15)
            })
            .collect())
    }

    fn generate_awg_file(&mut self, _: &SequenceDescriptor<Vec<u16>>) -> anyhow::Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn send_awg_file(&mut self, _: &str, _: &[u8]) -> anyhow::Result<()> {
        Ok(())
    }

    fn load_awg_file(&mut self, _: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

fn create_elements(count: usize, samples: usize) -> Vec<SequenceElement> {
    (0..count)
        .map(|_| {
            let channels = Channel::ALL.into_iter().map(|channel| {
                let wf = (0..samples)
                    .map(|i| (i as f32 / samples as f32 * TAU).sin())
                    .collect();
                (channel, ChannelSamples::from_analog(wf))
            });
            WaveformBuffer::from_channels(channels).unwrap().into()
        })
        .collect()
}

fn bench_pack_sequence(c: &mut Criterion) {
    let settings = DeviceSettings::default();
    let mut group = c.benchmark_group("pack_sequence");

    for &count in &[1, 16, 128] {
        let elements = create_elements(count, 1024);
        group.bench_with_input(BenchmarkId::new("elements", count), &count, |b, &_count| {
            b.iter(|| {
                black_box(
                    packer::pack_sequence(
                        &mut NullDriver,
                        &settings,
                        &elements,
                        None,
                        packer::DEFAULT_PREFIX,
                    )
                    .unwrap(),
                );
            });
        });
    }

    group.finish();
}

fn bench_settings2cfg(c: &mut Criterion) {
    let settings = DeviceSettings::default();
    c.bench_function("settings2cfg", |b| {
        b.iter(|| black_box(pulsar_awg::settings2cfg(black_box(&settings))))
    });
}

criterion_group!(benches, bench_pack_sequence, bench_settings2cfg);
criterion_main!(benches);
