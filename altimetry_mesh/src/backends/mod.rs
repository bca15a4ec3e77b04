// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different raycast strategies.
//!
//! - `flatscan`: tests every triangle (no state, no build cost).
//! - `bvh`: binary bounding hierarchy with SAH-like splits.
//!
//! SAH note
//! --------
//! For a split point `k` along a sorted axis we minimize:
//!
//! `cost(k) = area(LB_k) * k + area(RB_k) * (n - k)`
//!
//! where `LB_k` and `RB_k` are the bounding boxes of the first `k` and remaining `n - k` triangles,
//! and `area` is the box surface area.
//! All `k` are evaluated in O(n) per axis using prefix/suffix bounding boxes; the lowest cost
//! over the three axes wins.

pub mod bvh;
pub mod flatscan;
