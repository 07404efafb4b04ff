// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

use super::UserFn;
use crate::{data::ArconType, error::ArconResult};
use std::{marker::PhantomData, sync::Arc};

/// The transform every stream operator runs once per input record
///
/// Produces zero or more outputs. The order of the returned records is
/// kept as is by everything downstream in this crate, and errors are
/// handed back to the caller untouched.
pub trait FlatMapFunction<IN, OUT>: Send + Sync {
    fn apply(&self, input: IN) -> ArconResult<Vec<OUT>>;
}

/// One output per input
pub trait MapFunction<IN, OUT>: Send + Sync {
    fn apply(&self, input: IN) -> ArconResult<OUT>;
}

/// Keep or drop an input
pub trait FilterFunction<IN>: Send + Sync {
    fn apply(&self, input: &IN) -> ArconResult<bool>;
}

impl<IN, OUT, F> FlatMapFunction<IN, OUT> for UserFn<F>
where
    IN: ArconType,
    OUT: ArconType,
    F: Fn(IN) -> Vec<OUT> + Send + Sync,
{
    fn apply(&self, input: IN) -> ArconResult<Vec<OUT>> {
        Ok((self.0)(input))
    }
}

impl<IN, OUT, F> MapFunction<IN, OUT> for UserFn<F>
where
    IN: ArconType,
    OUT: ArconType,
    F: Fn(IN) -> OUT + Send + Sync,
{
    fn apply(&self, input: IN) -> ArconResult<OUT> {
        Ok((self.0)(input))
    }
}

impl<IN, F> FilterFunction<IN> for UserFn<F>
where
    IN: ArconType,
    F: Fn(&IN) -> bool + Send + Sync,
{
    fn apply(&self, input: &IN) -> ArconResult<bool> {
        Ok((self.0)(input))
    }
}

/// Runs a shared user [FlatMapFunction] as the transform
pub struct SharedFlatMap<IN, OUT, F> {
    udf: Arc<F>,
    _marker: PhantomData<fn(IN) -> OUT>,
}

impl<IN, OUT, F> SharedFlatMap<IN, OUT, F>
where
    F: FlatMapFunction<IN, OUT>,
{
    pub fn new(udf: Arc<F>) -> Self {
        SharedFlatMap {
            udf,
            _marker: PhantomData,
        }
    }
}

impl<IN, OUT, F> FlatMapFunction<IN, OUT> for SharedFlatMap<IN, OUT, F>
where
    F: FlatMapFunction<IN, OUT>,
{
    #[inline]
    fn apply(&self, input: IN) -> ArconResult<Vec<OUT>> {
        self.udf.apply(input)
    }
}

/// Adapts a [MapFunction] to the flat map shape
pub struct MapAdapter<IN, OUT, F> {
    udf: Arc<F>,
    _marker: PhantomData<fn(IN) -> OUT>,
}

impl<IN, OUT, F> MapAdapter<IN, OUT, F>
where
    F: MapFunction<IN, OUT>,
{
    pub fn new(udf: Arc<F>) -> Self {
        MapAdapter {
            udf,
            _marker: PhantomData,
        }
    }
}

impl<IN, OUT, F> FlatMapFunction<IN, OUT> for MapAdapter<IN, OUT, F>
where
    F: MapFunction<IN, OUT>,
{
    fn apply(&self, input: IN) -> ArconResult<Vec<OUT>> {
        let output = self.udf.apply(input)?;
        Ok(vec![output])
    }
}

/// Adapts a [FilterFunction] to the flat map shape
pub struct FilterAdapter<IN, F> {
    udf: Arc<F>,
    _marker: PhantomData<fn(IN)>,
}

impl<IN, F> FilterAdapter<IN, F>
where
    F: FilterFunction<IN>,
{
    pub fn new(udf: Arc<F>) -> Self {
        FilterAdapter {
            udf,
            _marker: PhantomData,
        }
    }
}

impl<IN, F> FlatMapFunction<IN, IN> for FilterAdapter<IN, F>
where
    F: FilterFunction<IN>,
{
    fn apply(&self, input: IN) -> ArconResult<Vec<IN>> {
        if self.udf.apply(&input)? {
            Ok(vec![input])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Passes every input through unchanged
pub struct Identity<A>(PhantomData<fn(A) -> A>);

impl<A> Default for Identity<A> {
    fn default() -> Self {
        Identity(PhantomData)
    }
}

impl<A: ArconType> FlatMapFunction<A, A> for Identity<A> {
    fn apply(&self, input: A) -> ArconResult<Vec<A>> {
        Ok(vec![input])
    }
}

impl<A: ArconType> super::ArconFunction<A> for Identity<A> {}
