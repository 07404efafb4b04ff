// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

/// Transform contract and the adapters onto it
pub mod flatmap;
/// Optional timer capability
pub mod timer;
/// Optional watermark capability
pub mod watermark;

pub use flatmap::{FilterFunction, FlatMapFunction, MapFunction};
pub use timer::{TimerFunction, TimerRegistry};
pub use watermark::WatermarkFunction;

use crate::data::ArconType;
use std::sync::Arc;

/// A user function as handed to graph construction, before any adaptation.
///
/// Besides its main contract, a user function may also react to timers
/// and watermarks. Those capabilities are discovered through the query
/// methods below, which answer "absent" unless the implementor exposes
/// the capability with [expose_timer_fn] or [expose_watermark_fn].
/// Queries must be pure and must not invoke the capability.
pub trait ArconFunction<OUT: ArconType>: Send + Sync + 'static {
    /// Returns this instance as a [WatermarkFunction] if it is one
    fn as_watermark_fn(self: Arc<Self>) -> Option<Arc<dyn WatermarkFunction<OUT>>> {
        None
    }

    /// Returns this instance as a [TimerFunction] if it is one
    fn as_timer_fn(self: Arc<Self>) -> Option<Arc<dyn TimerFunction<OUT>>> {
        None
    }
}

/// Exposes the [WatermarkFunction] implementation of `Self` inside an `impl ArconFunction` block
#[macro_export]
macro_rules! expose_watermark_fn {
    ($out:ty) => {
        fn as_watermark_fn(
            self: ::std::sync::Arc<Self>,
        ) -> Option<::std::sync::Arc<dyn $crate::function::WatermarkFunction<$out>>> {
            Some(self)
        }
    };
}

/// Exposes the [TimerFunction] implementation of `Self` inside an `impl ArconFunction` block
#[macro_export]
macro_rules! expose_timer_fn {
    ($out:ty) => {
        fn as_timer_fn(
            self: ::std::sync::Arc<Self>,
        ) -> Option<::std::sync::Arc<dyn $crate::function::TimerFunction<$out>>> {
            Some(self)
        }
    };
}

/// Wraps a plain closure into a user function without optional capabilities
///
/// Depending on the closure shape it acts as a [MapFunction],
/// [FlatMapFunction] or [FilterFunction].
#[derive(Clone)]
pub struct UserFn<F>(pub F);

impl<OUT, F> ArconFunction<OUT> for UserFn<F>
where
    OUT: ArconType,
    F: Send + Sync + 'static,
{
}

/// Helper to create a [UserFn]
pub fn from_fn<F>(f: F) -> UserFn<F> {
    UserFn(f)
}
