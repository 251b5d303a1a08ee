// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Lane Abstraction
//!
//! A **Lane** is one swappable per-tick strategy run by an agent against a
//! single letter: the settling state machine, each heuristic monitor and the
//! learned control policy are all lanes.
//!
//! This trait carries identity and classification only. The execution method
//! lives in the domain trait of `letterfall-lanes`, which borrows the physics
//! world and the letter's control record for the duration of one call.

use std::fmt;

use crate::inference::InferenceError;

/// Error type for lane operations.
#[derive(Debug)]
pub enum LaneError {
    /// The network behind a policy lane rejected its input.
    Inference(InferenceError),
    /// A domain-specific error occurred during execution.
    ExecutionFailed(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for LaneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneError::Inference(e) => write!(f, "Inference failed: {e}"),
            LaneError::ExecutionFailed(e) => write!(f, "Lane execution failed: {e}"),
        }
    }
}

impl std::error::Error for LaneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LaneError::Inference(e) => Some(e),
            LaneError::ExecutionFailed(e) => Some(e.as_ref()),
        }
    }
}

impl From<InferenceError> for LaneError {
    fn from(e: InferenceError) -> Self {
        LaneError::Inference(e)
    }
}

/// Classification of lane types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// Lifecycle transitions (search, settle, lock).
    Settle,
    /// Corrective monitors running before the policy.
    Heuristic,
    /// Learned impulse policy.
    Policy,
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKind::Settle => write!(f, "Settle"),
            LaneKind::Heuristic => write!(f, "Heuristic"),
            LaneKind::Policy => write!(f, "Policy"),
        }
    }
}

/// Common interface shared by all lanes.
pub trait Lane: Send + Sync {
    /// Human-readable strategy name, used in logs.
    fn strategy_name(&self) -> &'static str;

    /// Which family this lane belongs to.
    fn lane_kind(&self) -> LaneKind;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn inference_errors_keep_their_source() {
        let err: LaneError = InferenceError::InputMismatch {
            expected: 4,
            found: 3,
        }
        .into();
        assert!(err.to_string().contains("expects 4"));
        assert!(err.source().is_some());
    }
}
