// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine error types.

use altimetry_mesh::MeshError;
use thiserror::Error;

use crate::types::ShapeId;

/// Errors reported by engine operations. None of them leave partial state behind.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The handle is not (or no longer) registered.
    #[error("unknown shape {0:?}")]
    UnknownShape(ShapeId),
    /// Geometry failed validation, either as supplied or after transformation.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(#[from] MeshError),
    /// A shape direction was zero-length or not finite.
    #[error("shape direction must be a finite, non-zero vector")]
    InvalidDirection,
    /// A root transform could not be inverted.
    #[error("root transform is singular or not finite")]
    SingularTransform,
}
