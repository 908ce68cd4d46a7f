// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Configuration for a space: the tolerance every entity shares and the SAM
//! node fill bounds. Built once by the caller and passed explicitly.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    numeric::tolerance::Tolerance,
};

/// Hard upper bound on SAM node fan-out.
pub const MAX_FAN_OUT: usize = 8;

/// Fill bounds of SAM nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamConfig {
    /// Entries (leaf) or children (interior) before a node splits.
    /// Default: 8, at most [`MAX_FAN_OUT`].
    pub max_entries: usize,

    /// Fill below which a non-root node merges with or borrows from a
    /// sibling. Default: 3, at most `max_entries / 2`.
    pub min_entries: usize,
}

impl Default for SamConfig {
    fn default() -> Self {
        Self {
            max_entries: MAX_FAN_OUT,
            min_entries: 3,
        }
    }
}

impl SamConfig {
    pub fn validate(&self) -> Result<()> {
        if !(2..=MAX_FAN_OUT).contains(&self.max_entries) {
            return Err(Error::Config(format!(
                "max_entries must be in 2..={MAX_FAN_OUT}, got {}",
                self.max_entries
            )));
        }
        if self.min_entries == 0 || self.min_entries > self.max_entries / 2 {
            return Err(Error::Config(format!(
                "min_entries must be in 1..={}, got {}",
                self.max_entries / 2,
                self.min_entries
            )));
        }
        Ok(())
    }
}

/// Tolerance settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    /// Base epsilon for coordinate comparisons. Lengths, areas and volumes
    /// scale it by 10, 20 and 40.
    pub epsilon: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            epsilon: Tolerance::DEFAULT_EPSILON,
        }
    }
}

/// Configuration of one space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpaceConfig {
    pub tolerance: ToleranceConfig,
    pub sam: SamConfig,
}

impl SpaceConfig {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.tolerance.epsilon = epsilon;
        self
    }

    pub fn with_sam_config(mut self, sam: SamConfig) -> Self {
        self.sam = sam;
        self
    }

    pub fn validate(&self) -> Result<()> {
        Tolerance::new(self.tolerance.epsilon)?;
        self.sam.validate()
    }

    /// The tolerance value shared by everything built from this config.
    pub fn build_tolerance(&self) -> Result<Tolerance> {
        Tolerance::new(self.tolerance.epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SpaceConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.sam.max_entries, 8);
        assert_eq!(cfg.build_tolerance().unwrap().epsilon(), Tolerance::DEFAULT_EPSILON);
    }

    #[test]
    fn rejects_out_of_range_fill() {
        let too_wide = SamConfig {
            max_entries: 9,
            min_entries: 3,
        };
        assert!(matches!(too_wide.validate(), Err(Error::Config(_))));
        let too_full = SamConfig {
            max_entries: 8,
            min_entries: 5,
        };
        assert!(too_full.validate().is_err());
        assert!(SpaceConfig::default().with_epsilon(-1.0).validate().is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = SpaceConfig::default().with_epsilon(1e-5);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SpaceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
