// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use serde::Serialize;

use crate::{Error, Result};

/// An analog output channel of the AWG, numbered 1 to 4 as on the front panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Channel(u8);

impl Channel {
    pub const COUNT: usize = 4;
    pub const ALL: [Channel; Channel::COUNT] = [Channel(1), Channel(2), Channel(3), Channel(4)];

    pub fn new(index: u8) -> Result<Self> {
        if (1..=Self::COUNT as u8).contains(&index) {
            Ok(Channel(index))
        } else {
            Err(Error::InvalidChannel(index))
        }
    }

    /// The front-panel number, 1 to 4.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Zero-based position, for indexing per-channel arrays.
    pub(crate) const fn slot(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<u8> for Channel {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self> {
        Channel::new(index)
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
