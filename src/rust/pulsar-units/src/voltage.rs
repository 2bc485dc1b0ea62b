// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{self, Display, Formatter};

use crate::quantity;

quantity!(Voltage);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volts;

impl Display for Volts {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "V")
    }
}

pub const fn volts<T>(value: T) -> Voltage<Volts, T> {
    Voltage { value, unit: Volts }
}

pub fn millivolts(value: f64) -> Voltage<Volts> {
    volts(value * 1e-3)
}
