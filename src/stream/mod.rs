// Copyright (c) 2021, KTH Royal Institute of Technology.
// SPDX-License-Identifier: AGPL-3.0-only

/// Node hosting a single stream operator spec
pub mod node;
/// Timer bookkeeping for nodes
pub mod timer;
