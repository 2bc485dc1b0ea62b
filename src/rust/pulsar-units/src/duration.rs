// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{self, Display, Formatter};

use crate::quantity;

quantity!(Duration);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seconds;

impl Display for Seconds {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "s")
    }
}

pub const fn seconds<T>(value: T) -> Duration<Seconds, T> {
    Duration {
        value,
        unit: Seconds,
    }
}

pub fn nanoseconds(value: f64) -> Duration<Seconds> {
    seconds(value * 1e-9)
}
