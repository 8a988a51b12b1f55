//! Geometric image transformations with automatic canvas fitting.
//!
//! This module provides functions for applying 2D transformations to images:
//!
//! - Rotation around an arbitrary pivot with an auto-expanded output canvas
//! - Affine transformations derived from three point correspondences
//! - Rotation matrix generation and affine transform inversion
//!
//! The two transformation paths intentionally resample differently. The
//! rotation routine forward-maps every source pixel onto the canvas and
//! leaves unwritten destinations black, so non-axis-aligned angles show
//! visible holes. The affine routine inverse-maps every destination pixel
//! and interpolates, producing a dense output. See [`rotate`] and
//! [`warp_affine_fit`] for details.

mod affine;
mod rotate;

pub use affine::{
    get_affine_transform, get_rotation_matrix2d, invert_affine_transform, warp_affine,
    warp_affine_fit,
};
pub use rotate::rotate;
