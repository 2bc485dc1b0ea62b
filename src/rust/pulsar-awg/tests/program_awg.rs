// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use anyhow::{Context, anyhow};
use pulsar_awg::{
    AWGFILE_FN, AWGFILE_LOC, Awg5014Handler, AwgDriver, Channel, ChannelSamples, DeviceSettings,
    Error, ProgramOptions, SampleRecord, SequenceDescriptor, SequenceElement, SettingValue,
    WaveformBuffer, empty_waveform,
};

/// Instrument stand-in with a file system and a loaded sequence.
#[derive(Default)]
struct FakeAwg {
    files: HashMap<String, Vec<u8>>,
    loaded: Option<String>,
    loaded_names: Vec<Vec<String>>,
    generated: Vec<(Vec<bool>, Vec<bool>)>,
    sampling_rate: Option<SettingValue>,
}

impl AwgDriver for FakeAwg {
    type Packed = Vec<i16>;

    fn pack_waveform(
        &mut self,
        samples: &[f32],
        marker1: &[bool],
        marker2: &[bool],
    ) -> anyhow::Result<Vec<i16>> {
        // 14 bit DAC code in the low bits, markers in bits 14 and 15
        samples
            .iter()
            .zip(marker1.iter().zip(marker2))
            .map(|(&wf, (&m1, &m2))| {
                if !(-1.0..=1.0).contains(&wf) {
                    return Err(anyhow!("Sample {wf} outside of [-1, 1]"));
                }
                let code = ((wf + 1.0) * 8191.5).round() as i16;
                Ok(code | (i16::from(m1) << 14) | (i16::from(m2) << 15))
            })
            .collect()
    }

    fn generate_awg_file(&mut self, sequence: &SequenceDescriptor<Vec<i16>>) -> anyhow::Result<Vec<u8>> {
        self.generated
            .push((sequence.trig_wait.clone(), sequence.goto_state.clone()));
        self.sampling_rate = sequence.sequence_cfg.get("SAMPLING_RATE").copied();
        let mut file = Vec::new();
        for (channel, names) in sequence.wfname_l.by_channel() {
            file.push(channel.index());
            for name in names {
                let packed = sequence
                    .packed_waveforms
                    .get(name)
                    .with_context(|| format!("missing waveform {name}"))?;
                file.extend(packed.iter().flat_map(|code| code.to_le_bytes()));
            }
        }
        self.loaded_names = sequence
            .wfname_l
            .rows()
            .into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect();
        Ok(file)
    }

    fn send_awg_file(&mut self, path: &str, file: &[u8]) -> anyhow::Result<()> {
        self.files.insert(path.to_string(), file.to_vec());
        Ok(())
    }

    fn load_awg_file(&mut self, path: &str) -> anyhow::Result<()> {
        if !self.files.contains_key(path) {
            return Err(anyhow!("No such file: {path}"));
        }
        self.loaded = Some(path.to_string());
        Ok(())
    }
}

fn pulse(channels: &[u8], len: usize, amplitude: f32) -> SequenceElement {
    let mut buffer = empty_waveform(Some(channels));
    for i in 0..len {
        let value = if i < len / 2 { amplitude } else { 0.0 };
        let row = channels
            .iter()
            .map(|&c| (Channel::new(c).unwrap(), SampleRecord::new(value, i == 0, false)));
        buffer.push_row(row).unwrap();
    }
    buffer.into()
}

#[test]
fn program_three_elements() {
    let mut awg = FakeAwg::default();
    let settings = DeviceSettings::from_json(r#"{"sampling_rate": 1200000000}"#).unwrap();
    let mut handler = Awg5014Handler::with_settings(&mut awg, settings);

    let elements = [
        pulse(&[1, 2], 64, 0.5),
        pulse(&[1, 2], 64, 1.0),
        pulse(&[1, 2], 128, -0.5),
    ];
    let report = handler
        .program_awg(&elements, &ProgramOptions::default())
        .unwrap();

    let path = format!("{AWGFILE_LOC}{AWGFILE_FN}");
    assert_eq!(report.path.as_deref(), Some(path.as_str()));
    assert!(report.loaded);
    assert_eq!(report.elements, 3);
    // 2 channel tags plus 2 bytes per sample
    assert_eq!(report.file_size, 2 + 2 * 2 * (64 + 64 + 128));

    assert_eq!(awg.loaded.as_deref(), Some(path.as_str()));
    assert_eq!(awg.files[&path].len(), report.file_size);
    assert_eq!(
        awg.generated,
        vec![(vec![true, false, false], vec![false, false, true])]
    );
    assert_eq!(awg.sampling_rate, Some(SettingValue::Integer(1_200_000_000)));
    assert_eq!(awg.loaded_names[1], ["wf-0001_ch1", "wf-0001_ch2"]);
}

#[test]
fn driver_error_is_passed_through() {
    let mut handler = Awg5014Handler::new(FakeAwg::default());
    let elements = [pulse(&[3], 8, 0.5), pulse(&[3], 8, 1.5)];
    let err = handler
        .program_awg(&elements, &ProgramOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Driver(_)));
    assert_eq!(err.to_string(), "Sample 1.5 outside of [-1, 1]");

    let awg = handler.into_driver();
    assert!(awg.generated.is_empty());
    assert!(awg.files.is_empty());
}

#[test]
fn pack_without_sending() {
    let mut handler = Awg5014Handler::new(FakeAwg::default());
    let samples = ChannelSamples::new(vec![0.0, 1.0, -1.0], vec![true; 3], vec![false; 3]).unwrap();
    let element = WaveformBuffer::from_channels([(Channel::ALL[3], samples)]).unwrap();
    let report = handler
        .program_awg(&[element.into()], &ProgramOptions::default().send(false))
        .unwrap();
    assert_eq!(report.path, None);

    let awg = handler.into_driver();
    assert!(awg.files.is_empty());
    assert!(awg.loaded.is_none());
    assert_eq!(awg.generated, vec![(vec![true], vec![true])]);
}

#[test]
fn descriptor_matches_driver_contract() {
    let mut handler = Awg5014Handler::new(FakeAwg::default());
    let descriptor = handler
        .pack_awg_wfs(&[pulse(&[1, 4], 4, 1.0)], None, Some("cal"))
        .unwrap();
    assert_eq!(
        descriptor.packed_waveforms["cal-0000_ch4"],
        // Marker 1 is set on the first sample only
        vec![16383 | (1 << 14), 16383, 8192, 8192]
    );
    assert_eq!(descriptor.channel_cfg.len(), 12);
    assert_eq!(descriptor.sequence_cfg.len(), 9);
    assert_eq!(
        descriptor.sequence_cfg["TRIGGER_INPUT_THRESHOLD"],
        SettingValue::Float(0.5)
    );
}
