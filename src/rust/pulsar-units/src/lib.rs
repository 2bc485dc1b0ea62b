// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Typed physical quantities used at the boundary between user code and
//! device-native units.

pub mod duration;
pub mod unit;
pub mod voltage;

pub use duration::{Duration, Seconds, nanoseconds, seconds};
pub use voltage::{Voltage, Volts, millivolts, volts};
