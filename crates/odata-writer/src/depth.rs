// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Entry nesting depth quota.

use crate::error::WriterError;

/// Counts entries currently open and enforces the nesting quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthGuard {
    current: u32,
    max: u32,
}

impl DepthGuard {
    /// Guard allowing at most `max` nested entries.
    pub const fn new(max: u32) -> Self {
        Self { current: 0, max }
    }

    /// Entries currently open.
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Configured maximum.
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Account for one more open entry. A refused increment leaves the count unchanged.
    pub fn increment(&mut self) -> Result<(), WriterError> {
        if self.current >= self.max {
            return Err(WriterError::MaxNestingDepthExceeded { max: self.max });
        }
        self.current += 1;
        Ok(())
    }

    /// Account for one closed entry.
    pub fn decrement(&mut self) -> Result<(), WriterError> {
        self.current = self
            .current
            .checked_sub(1)
            .ok_or(WriterError::Internal("entry depth decremented below zero"))?;
        Ok(())
    }
}
