// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

//! Operator specs for Arcon streams.
//!
//! A [StreamOperatorSpec](spec::StreamOperatorSpec) describes a stream operator
//! that emits zero or more records per input. Timer and watermark support is
//! detected on the user function when the spec is created, so functions only
//! implement the hooks they need.

// Public Interface

/// Configuration and logging
pub mod conf;
/// Stream data types
pub mod data;
/// Error types
pub mod error;
/// User function contracts and adapters
pub mod function;
/// Operator specs
pub mod spec;
/// Nodes driving operator specs
pub mod stream;

/// Test module containing shared user functions
#[cfg(test)]
mod test;

/// Helper module that imports everything needed to build operator specs
pub mod prelude {
    pub use crate::{
        conf::{logger::ArconLogger, ArconConf},
        data::{ArconElement, ArconEvent, ArconType, Watermark},
        error::{ArconResult, Error},
        expose_timer_fn, expose_watermark_fn,
        function::{
            from_fn, ArconFunction, FilterFunction, FlatMapFunction, MapFunction, TimerFunction,
            TimerRegistry, UserFn, WatermarkFunction,
        },
        spec::{OpCode, OperatorId, OperatorSpec, OperatorSpecs, StreamOperatorSpec},
        stream::{node::StreamNode, timer::TimerQueue},
    };
}
