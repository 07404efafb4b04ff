// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

/// Helpers that adapt user functions into stream specs
pub mod factory;
/// Spec for operators emitting zero or more records per input
pub mod stream;

pub use factory::OperatorSpecs;
pub use stream::StreamOperatorSpec;

use crate::{
    data::ArconType,
    error::ArconResult,
    function::{TimerFunction, WatermarkFunction},
};
use std::{fmt, sync::Arc};

/// Identifies what kind of transformation an operator performs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpCode {
    Input,
    Map,
    FlatMap,
    Filter,
    Merge,
    PartitionBy,
    Broadcast,
    SendTo,
    Sink,
    Output,
    Window,
    Join,
}

impl OpCode {
    /// Whether a [StreamOperatorSpec] may carry this code
    pub fn is_stream_op(&self) -> bool {
        matches!(
            self,
            OpCode::Map | OpCode::FlatMap | OpCode::Filter | OpCode::Merge
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OpCode::Input => "input",
            OpCode::Map => "map",
            OpCode::FlatMap => "flatmap",
            OpCode::Filter => "filter",
            OpCode::Merge => "merge",
            OpCode::PartitionBy => "partition_by",
            OpCode::Broadcast => "broadcast",
            OpCode::SendTo => "send_to",
            OpCode::Sink => "sink",
            OpCode::Output => "output",
            OpCode::Window => "window",
            OpCode::Join => "join",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of an operator, unique within its graph
///
/// Uniqueness is up to the graph builder.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperatorId(String);

impl OperatorId {
    /// Creates an OperatorId, rejecting empty or blank ids
    pub fn new(id: impl Into<String>) -> ArconResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return crate::invalid_argument!("operator id must not be empty, got {:?}", id);
        }
        Ok(OperatorId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OperatorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Common view of an operator node
///
/// Identity plus the optional capabilities detected for it. Specs without
/// a user function keep the default "absent" answers.
pub trait OperatorSpec: Send + Sync {
    /// Output record type
    type OUT: ArconType;

    fn op_code(&self) -> OpCode;

    fn op_id(&self) -> &OperatorId;

    /// The watermark capability, if the user function has one
    fn watermark_fn(&self) -> Option<&Arc<dyn WatermarkFunction<Self::OUT>>> {
        None
    }

    /// The timer capability, if the user function has one
    fn timer_fn(&self) -> Option<&Arc<dyn TimerFunction<Self::OUT>>> {
        None
    }
}
