// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

use crate::{
    conf::logger::ArconLogger,
    data::{ArconElement, ArconEvent, ArconType, Watermark},
    error::ArconResult,
    spec::{OperatorSpec, StreamOperatorSpec},
    stream::timer::TimerQueue,
};
use slog::{debug, o, trace};
use std::sync::Arc;

/// Hosts a [StreamOperatorSpec] and dispatches stream events to it
///
/// The spec itself is shared and read only. Everything that changes while
/// the operator runs (current watermark, pending timers, timer outputs not
/// yet handed out) lives here.
pub struct StreamNode<IN, OUT>
where
    IN: ArconType,
    OUT: ArconType,
{
    spec: Arc<StreamOperatorSpec<IN, OUT>>,
    timers: TimerQueue,
    watermark: Option<Watermark>,
    /// Outputs of timers that fired before a later timer failed
    fired: Vec<ArconElement<OUT>>,
    logger: ArconLogger,
}

impl<IN, OUT> StreamNode<IN, OUT>
where
    IN: ArconType,
    OUT: ArconType,
{
    pub fn new(spec: Arc<StreamOperatorSpec<IN, OUT>>, logger: ArconLogger) -> Self {
        let logger = logger.new(o!(
            "op_id" => spec.op_id().to_string(),
            "op_code" => spec.op_code().as_str()
        ));
        StreamNode {
            spec,
            timers: TimerQueue::default(),
            watermark: None,
            fired: Vec::new(),
            logger,
        }
    }

    /// Prepares the node before any event is handled
    ///
    /// Lets a timer capable function register its initial timers.
    pub fn on_start(&mut self) -> ArconResult<()> {
        debug!(
            self.logger,
            "Starting node";
            "watermark_fn" => self.spec.watermark_fn().is_some(),
            "timer_fn" => self.spec.timer_fn().is_some()
        );
        if let Some(timer_fn) = self.spec.timer_fn() {
            timer_fn.register_timers(&mut self.timers)?;
        }
        Ok(())
    }

    /// Runs the transform on a single element
    ///
    /// Outputs keep the timestamp of the input and the order the transform gave them.
    pub fn handle_element(&mut self, element: ArconElement<IN>) -> ArconResult<Vec<ArconElement<OUT>>> {
        let timestamp = element.timestamp;
        let outputs = self.spec.transform().apply(element.data)?;
        Ok(outputs
            .into_iter()
            .map(|data| ArconElement::with_timestamp(data, timestamp))
            .collect())
    }

    /// Advances the node watermark
    ///
    /// A watermark that does not move time forward is dropped. Otherwise the
    /// watermark capability, if present, runs first and its outputs are
    /// emitted ahead of the forwarded watermark, stamped with its timestamp.
    /// The node watermark only moves once the capability succeeded.
    pub fn handle_watermark(&mut self, watermark: Watermark) -> ArconResult<Vec<ArconEvent<OUT>>> {
        if let Some(current) = self.watermark {
            if watermark <= current {
                trace!(
                    self.logger,
                    "Ignoring stale watermark {} (current {})",
                    watermark.timestamp,
                    current.timestamp
                );
                return Ok(Vec::new());
            }
        }

        let mut events = Vec::new();
        let mut output_watermark = watermark;
        if let Some(watermark_fn) = self.spec.watermark_fn() {
            let outputs = watermark_fn.process_watermark(watermark)?;
            let timestamp = Some(watermark.timestamp);
            events.extend(outputs.into_iter().map(|data| {
                ArconEvent::Element(ArconElement::with_timestamp(data, timestamp))
            }));
            if let Some(wm) = watermark_fn.output_watermark() {
                output_watermark = wm;
            }
        }
        self.watermark = Some(watermark);
        events.push(ArconEvent::Watermark(output_watermark));
        Ok(events)
    }

    /// Dispatches an [ArconEvent]
    pub fn handle_event(&mut self, event: ArconEvent<IN>) -> ArconResult<Vec<ArconEvent<OUT>>> {
        match event {
            ArconEvent::Element(element) => Ok(self
                .handle_element(element)?
                .into_iter()
                .map(ArconEvent::Element)
                .collect()),
            ArconEvent::Watermark(watermark) => self.handle_watermark(watermark),
        }
    }

    /// Fires the timers due at or before `now`, in time then key order
    ///
    /// Only timers due when the call starts fire. Timers registered while
    /// firing wait for the next call, even if they are already due.
    ///
    /// If a timer fails, it stays pending and the error is returned. Outputs
    /// of the timers that fired before it are kept and handed out first by
    /// the next call.
    pub fn handle_timeout(&mut self, now: u64) -> ArconResult<Vec<ArconElement<OUT>>> {
        let timer_fn = match self.spec.timer_fn() {
            Some(timer_fn) => timer_fn.clone(),
            None => return Ok(Vec::new()),
        };

        let mut outputs = std::mem::take(&mut self.fired);
        for (key, time) in self.timers.advance_to(now)? {
            if !self.timers.take(key, time) {
                continue;
            }
            trace!(self.logger, "Firing timer"; "key" => key, "time" => time);
            match timer_fn.on_timer(key, time, &mut self.timers) {
                Ok(fired) => outputs.extend(
                    fired
                        .into_iter()
                        .map(|data| ArconElement::with_timestamp(data, Some(time))),
                ),
                Err(err) => {
                    debug!(
                        self.logger,
                        "Timer failed, keeping it pending";
                        "key" => key,
                        "time" => time
                    );
                    self.timers.restore(key, time);
                    self.fired = outputs;
                    return Err(err);
                }
            }
        }
        Ok(outputs)
    }

    /// Current watermark of the node, if any arrived yet
    pub fn watermark(&self) -> Option<Watermark> {
        self.watermark
    }

    /// Pending timers
    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn spec(&self) -> &Arc<StreamOperatorSpec<IN, OUT>> {
        &self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Error,
        function::from_fn,
        spec::OperatorSpecs,
        test::functions::*,
    };
    use slog::Discard;

    fn node<IN: ArconType, OUT: ArconType>(spec: StreamOperatorSpec<IN, OUT>) -> StreamNode<IN, OUT> {
        let logger = slog::Logger::root(Discard, o!());
        let mut node = StreamNode::new(Arc::new(spec), logger);
        node.on_start().unwrap();
        node
    }

    #[test]
    fn elements_keep_timestamp_and_order() {
        let mut node = node(OperatorSpecs::flat_map("dup", Duplicate).unwrap());
        let out = node
            .handle_element(ArconElement::with_timestamp("a".to_string(), Some(3)))
            .unwrap();
        assert_eq!(
            out,
            vec![
                ArconElement::with_timestamp("a".to_string(), Some(3)),
                ArconElement::with_timestamp("a".to_string(), Some(3)),
            ]
        );
    }

    #[test]
    fn flat_map_outputs_across_elements() {
        let spec = OperatorSpecs::flat_map("range", from_fn(|x: u64| (0..x).collect::<Vec<u64>>()))
            .unwrap();
        let mut node = node(spec);
        let mut collected = Vec::new();
        for i in 0..5u64 {
            collected.extend(node.handle_element(ArconElement::new(i)).unwrap());
        }
        assert_eq!(collected.len(), 10);
        let sum: u64 = collected.iter().map(|elem| elem.data).sum();
        assert_eq!(sum, 10);
    }

    #[test]
    fn watermark_without_capability_is_forwarded() {
        let mut node = node(OperatorSpecs::flat_map("dup", Duplicate).unwrap());
        let events = node.handle_watermark(Watermark::new(10)).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ArconEvent::Watermark(wm) if wm.timestamp == 10));
        assert_eq!(node.watermark(), Some(Watermark::new(10)));
    }

    #[test]
    fn watermark_capability_emits_before_watermark() {
        let mut node = node(OperatorSpecs::flat_map("counter", WatermarkCounter::default()).unwrap());
        for s in ["a", "b", "c"].iter() {
            assert!(node
                .handle_event(ArconEvent::Element(ArconElement::new(s.to_string())))
                .unwrap()
                .is_empty());
        }

        let events = node.handle_event(ArconEvent::Watermark(Watermark::new(5))).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], ArconEvent::Element(e) if e.data == 3 && e.timestamp == Some(5)));
        assert!(matches!(events[1], ArconEvent::Watermark(wm) if wm.timestamp == 5));
    }

    #[test]
    fn stale_watermarks_are_ignored() {
        let mut node = node(OperatorSpecs::flat_map("counter", WatermarkCounter::default()).unwrap());
        node.handle_watermark(Watermark::new(10)).unwrap();
        assert!(node.handle_watermark(Watermark::new(10)).unwrap().is_empty());
        assert!(node.handle_watermark(Watermark::new(4)).unwrap().is_empty());
        assert_eq!(node.watermark(), Some(Watermark::new(10)));
        assert_eq!(node.handle_watermark(Watermark::new(11)).unwrap().len(), 2);
    }

    #[test]
    fn output_watermark_from_function() {
        let mut node = node(OperatorSpecs::flat_map("lagging", Lagging::new(3)).unwrap());
        let events = node.handle_watermark(Watermark::new(10)).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ArconEvent::Watermark(wm) if wm.timestamp == 7));
    }

    #[test]
    fn timers_fire_in_order() {
        let mut node = node(OperatorSpecs::flat_map("echo", TimerEcho).unwrap());
        assert_eq!(node.timers().get(1), Some(10));

        assert!(node.handle_timeout(9).unwrap().is_empty());
        // key 1 fires at 10 and schedules key 2 at 15
        let fired = node.handle_timeout(20).unwrap();
        assert_eq!(fired, vec![ArconElement::with_timestamp(10, Some(10))]);
        assert_eq!(node.timers().get(2), Some(15));

        // key 2 was already due when registered, it fires on the next call
        let fired = node.handle_timeout(20).unwrap();
        assert_eq!(fired, vec![ArconElement::with_timestamp(15, Some(15))]);
        assert!(node.timers().is_empty());
    }

    #[test]
    fn zero_delay_timer_fires_once_per_call() {
        let mut node = node(OperatorSpecs::flat_map("periodic", Periodic).unwrap());
        for now in 1..4u64 {
            let fired = node.handle_timeout(now).unwrap();
            assert_eq!(fired, vec![ArconElement::with_timestamp(1, Some(1))]);
            assert_eq!(node.timers().get(0), Some(1));
        }
    }

    #[test]
    fn failed_watermark_can_be_retried() {
        let mut node = node(OperatorSpecs::flat_map("flaky", Flaky::default()).unwrap());
        match node.handle_watermark(Watermark::new(5)) {
            Err(Error::Unsupported { msg }) => assert_eq!(msg, "watermark 5 rejected"),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(node.watermark(), None);

        let events = node.handle_watermark(Watermark::new(5)).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], ArconEvent::Element(e) if e.data == 5));
        assert!(matches!(events[1], ArconEvent::Watermark(wm) if wm.timestamp == 5));
        assert_eq!(node.watermark(), Some(Watermark::new(5)));
    }

    #[test]
    fn failed_timer_keeps_earlier_outputs() {
        let mut node = node(OperatorSpecs::flat_map("flaky", Flaky::default()).unwrap());
        match node.handle_timeout(30) {
            Err(Error::Unsupported { msg }) => assert_eq!(msg, "timer 2 rejected"),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(node.timers().get(1), None);
        assert_eq!(node.timers().get(2), Some(20));

        let fired = node.handle_timeout(30).unwrap();
        assert_eq!(
            fired,
            vec![
                ArconElement::with_timestamp(10, Some(10)),
                ArconElement::with_timestamp(20, Some(20)),
            ]
        );
        assert!(node.timers().is_empty());
        assert!(node.handle_timeout(30).unwrap().is_empty());
    }

    #[test]
    fn timeout_without_capability_is_noop() {
        let mut node = node(OperatorSpecs::flat_map("dup", Duplicate).unwrap());
        assert!(node.handle_timeout(u64::MAX).unwrap().is_empty());
    }

    #[test]
    fn transform_errors_reach_caller() {
        let mut node = node(OperatorSpecs::flat_map("reject", Rejecting).unwrap());
        let res = node.handle_element(ArconElement::new(1));
        assert!(matches!(res, Err(Error::Unsupported { .. })));
    }
}
