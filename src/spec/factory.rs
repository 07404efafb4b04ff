// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

use super::{OpCode, StreamOperatorSpec};
use crate::{
    data::ArconType,
    error::ArconResult,
    function::{
        flatmap::{FilterAdapter, Identity, MapAdapter, SharedFlatMap},
        ArconFunction, FilterFunction, FlatMapFunction, MapFunction,
    },
};
use std::sync::Arc;

/// Creates [StreamOperatorSpec]s from user functions
///
/// Each helper adapts the user function to the flat map transform and
/// keeps the unadapted function around for capability detection.
pub struct OperatorSpecs;

impl OperatorSpecs {
    /// Spec for a user [FlatMapFunction], which serves as its own transform
    pub fn flat_map<IN, OUT, F>(
        op_id: impl Into<String>,
        udf: F,
    ) -> ArconResult<StreamOperatorSpec<IN, OUT>>
    where
        IN: ArconType,
        OUT: ArconType,
        F: FlatMapFunction<IN, OUT> + ArconFunction<OUT>,
    {
        let udf = Arc::new(udf);
        StreamOperatorSpec::new(
            Box::new(SharedFlatMap::new(udf.clone())),
            udf,
            OpCode::FlatMap,
            op_id,
        )
    }

    /// Spec for a user [MapFunction]
    pub fn map<IN, OUT, F>(op_id: impl Into<String>, udf: F) -> ArconResult<StreamOperatorSpec<IN, OUT>>
    where
        IN: ArconType,
        OUT: ArconType,
        F: MapFunction<IN, OUT> + ArconFunction<OUT>,
    {
        let udf = Arc::new(udf);
        StreamOperatorSpec::new(
            Box::new(MapAdapter::new(udf.clone())),
            udf,
            OpCode::Map,
            op_id,
        )
    }

    /// Spec for a user [FilterFunction]
    pub fn filter<A, F>(op_id: impl Into<String>, udf: F) -> ArconResult<StreamOperatorSpec<A, A>>
    where
        A: ArconType,
        F: FilterFunction<A> + ArconFunction<A>,
    {
        let udf = Arc::new(udf);
        StreamOperatorSpec::new(
            Box::new(FilterAdapter::new(udf.clone())),
            udf,
            OpCode::Filter,
            op_id,
        )
    }

    /// Spec for merging streams, passing every record through
    pub fn merge<A: ArconType>(op_id: impl Into<String>) -> ArconResult<StreamOperatorSpec<A, A>> {
        let identity = Arc::new(Identity::<A>::default());
        StreamOperatorSpec::new(
            Box::new(SharedFlatMap::new(identity.clone())),
            identity,
            OpCode::Merge,
            op_id,
        )
    }
}
