// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

use super::{OpCode, OperatorId, OperatorSpec};
use crate::{
    data::ArconType,
    error::ArconResult,
    function::{ArconFunction, FlatMapFunction, TimerFunction, WatermarkFunction},
};
use std::{fmt, sync::Arc};

/// Spec of a stream operator that outputs zero or more records per input
///
/// Besides the transform, the spec keeps the user function as it was
/// before adaptation. The adapted transform may hide capabilities the
/// user function has, so timer and watermark support is detected on the
/// original function, once, when the spec is created.
pub struct StreamOperatorSpec<IN, OUT>
where
    IN: ArconType,
    OUT: ArconType,
{
    op_code: OpCode,
    op_id: OperatorId,
    transform: Box<dyn FlatMapFunction<IN, OUT>>,
    original_fn: Arc<dyn ArconFunction<OUT>>,
    watermark_fn: Option<Arc<dyn WatermarkFunction<OUT>>>,
    timer_fn: Option<Arc<dyn TimerFunction<OUT>>>,
}

impl<IN, OUT> StreamOperatorSpec<IN, OUT>
where
    IN: ArconType,
    OUT: ArconType,
{
    /// Creates a spec from an adapted transform and the user function it came from
    ///
    /// Fails with [crate::error::Error::InvalidArgument] if `op_id` is blank
    /// or `op_code` is not a stream operator code.
    pub fn new(
        transform: Box<dyn FlatMapFunction<IN, OUT>>,
        original_fn: Arc<dyn ArconFunction<OUT>>,
        op_code: OpCode,
        op_id: impl Into<String>,
    ) -> ArconResult<Self> {
        let op_id = OperatorId::new(op_id)?;
        if !op_code.is_stream_op() {
            return crate::invalid_argument!(
                "{} is not a stream operator code (operator {})",
                op_code,
                op_id
            );
        }

        let watermark_fn = original_fn.clone().as_watermark_fn();
        let timer_fn = original_fn.clone().as_timer_fn();

        Ok(StreamOperatorSpec {
            op_code,
            op_id,
            transform,
            original_fn,
            watermark_fn,
            timer_fn,
        })
    }

    /// The transform to run for every input record
    #[inline]
    pub fn transform(&self) -> &dyn FlatMapFunction<IN, OUT> {
        self.transform.as_ref()
    }

    /// The user function as supplied before adaptation
    #[inline]
    pub fn original_fn(&self) -> &Arc<dyn ArconFunction<OUT>> {
        &self.original_fn
    }
}

impl<IN, OUT> OperatorSpec for StreamOperatorSpec<IN, OUT>
where
    IN: ArconType,
    OUT: ArconType,
{
    type OUT = OUT;

    #[inline]
    fn op_code(&self) -> OpCode {
        self.op_code
    }

    #[inline]
    fn op_id(&self) -> &OperatorId {
        &self.op_id
    }

    #[inline]
    fn watermark_fn(&self) -> Option<&Arc<dyn WatermarkFunction<OUT>>> {
        self.watermark_fn.as_ref()
    }

    #[inline]
    fn timer_fn(&self) -> Option<&Arc<dyn TimerFunction<OUT>>> {
        self.timer_fn.as_ref()
    }
}

impl<IN, OUT> fmt::Debug for StreamOperatorSpec<IN, OUT>
where
    IN: ArconType,
    OUT: ArconType,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamOperatorSpec")
            .field("op_code", &self.op_code)
            .field("op_id", &self.op_id)
            .field("watermark_fn", &self.watermark_fn.is_some())
            .field("timer_fn", &self.timer_fn.is_some())
            .finish()
    }
}
