// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{error::ConfigError, frame::Quantity, Slave, SlaveId};

/// Static configuration of a slave device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaveConfig {
    slave: Slave,
    coil_count: Quantity,
}

impl SlaveConfig {
    /// Configure a slave listening on `slave_id` with `coil_count` coils.
    pub fn new(slave_id: SlaveId, coil_count: Quantity) -> Result<Self, ConfigError> {
        let slave = Slave(slave_id);
        if slave.is_broadcast() {
            return Err(ConfigError::Broadcast);
        }
        if slave.is_reserved() {
            return Err(ConfigError::Reserved(slave));
        }
        if coil_count == 0 {
            return Err(ConfigError::NoCoils);
        }
        Ok(Self { slave, coil_count })
    }

    #[must_use]
    pub const fn slave(&self) -> Slave {
        self.slave
    }

    #[must_use]
    pub const fn slave_id(&self) -> SlaveId {
        self.slave.0
    }

    #[must_use]
    pub const fn coil_count(&self) -> Quantity {
        self.coil_count
    }
}
