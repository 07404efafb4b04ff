// Copyright (c) 2020, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

use prost::Message as PMessage;
use std::fmt;

/// Bounds every record flowing through an operator must satisfy
pub trait ArconType: Clone + fmt::Debug + Sync + Send + PMessage + Default + 'static {}
impl<T> ArconType for T where T: Clone + fmt::Debug + Sync + Send + PMessage + Default + 'static {}

/// An Enum containing the stream events an operator node reacts to
#[derive(Clone, Debug)]
pub enum ArconEvent<A: ArconType> {
    /// A stream element containing some data of type [ArconType] and an optional timestamp [u64]
    Element(ArconElement<A>),
    /// A [Watermark] message
    Watermark(Watermark),
}

/// A Stream element containing some data and timestamp
#[derive(Clone, Debug, PartialEq)]
pub struct ArconElement<A: ArconType> {
    pub data: A,
    pub timestamp: Option<u64>,
}

impl<A: ArconType> ArconElement<A> {
    /// Creates an ArconElement without a timestamp
    pub fn new(data: A) -> Self {
        ArconElement {
            data,
            timestamp: None,
        }
    }

    /// Creates an ArconElement with a timestamp
    pub fn with_timestamp(data: A, ts: Option<u64>) -> Self {
        ArconElement {
            data,
            timestamp: ts,
        }
    }
}

/// Watermark message containing a [u64] timestamp
#[derive(PMessage, Clone, Copy, Ord, PartialOrd, Eq, PartialEq)]
pub struct Watermark {
    #[prost(uint64, tag = "1")]
    pub timestamp: u64,
}

impl Watermark {
    pub fn new(timestamp: u64) -> Self {
        Watermark { timestamp }
    }
}
