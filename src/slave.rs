// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

pub type SlaveId = u8;

/// A single byte for addressing Modbus slave devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slave(pub SlaveId);

impl Slave {
    /// The special address for sending a broadcast message to all
    /// connected Modbus slave devices at once. Broadcast messages
    /// are one-way: writes are applied but never answered.
    ///
    /// A slave only ever receives on this address, it never claims it.
    #[must_use]
    pub const fn broadcast() -> Self {
        Slave(0)
    }

    /// The minimum address of a single Modbus slave device.
    #[must_use]
    pub const fn min_device() -> Self {
        Slave(1)
    }

    /// The maximum address of a single Modbus slave device.
    #[must_use]
    pub const fn max_device() -> Self {
        Slave(247)
    }

    #[must_use]
    pub fn is_broadcast(self) -> bool {
        self == Self::broadcast()
    }

    #[must_use]
    pub fn is_single_device(self) -> bool {
        self >= Self::min_device() && self <= Self::max_device()
    }

    #[must_use]
    pub fn is_reserved(self) -> bool {
        self > Self::max_device()
    }

    /// Whether a request sent to `target` must be processed by this slave.
    #[must_use]
    pub fn accepts(self, target: Slave) -> bool {
        target.is_broadcast() || target == self
    }
}

impl From<SlaveId> for Slave {
    fn from(from: SlaveId) -> Self {
        Slave(from)
    }
}

impl From<Slave> for SlaveId {
    fn from(from: Slave) -> Self {
        from.0
    }
}

impl fmt::Display for Slave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:0>2X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_classes() {
        assert!(Slave(0).is_broadcast());
        assert!(!Slave(0).is_single_device());
        assert!(Slave(1).is_single_device());
        assert!(Slave(247).is_single_device());
        assert!(Slave(248).is_reserved());
        assert!(!Slave(247).is_reserved());
    }

    #[test]
    fn accepts_own_and_broadcast_address() {
        let slave = Slave(0x11);
        assert!(slave.accepts(Slave(0x11)));
        assert!(slave.accepts(Slave::broadcast()));
        assert!(!slave.accepts(Slave(0x12)));
    }

    #[test]
    fn display_as_hex() {
        assert_eq!(Slave(0x0A).to_string(), "0x0A");
        assert_eq!(Slave(247).to_string(), "0xF7");
    }
}
