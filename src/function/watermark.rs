// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

use crate::{data::Watermark, error::ArconResult};

/// Optional capability for functions that react to watermark progress
pub trait WatermarkFunction<OUT>: Send + Sync {
    /// Called when the input watermark of the hosting node advances
    fn process_watermark(&self, watermark: Watermark) -> ArconResult<Vec<OUT>>;

    /// Watermark to forward after [WatermarkFunction::process_watermark]
    ///
    /// `None` forwards the input watermark unchanged.
    fn output_watermark(&self) -> Option<Watermark> {
        None
    }
}
