/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! In-memory representation of a KPOINTS specification

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaspIoError};

/// Centering convention for an automatic k-point mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshStyle {
    /// Gamma-centered mesh ("G" mode line)
    Gamma,
    /// Monkhorst-Pack mesh ("M" mode line)
    MonkhorstPack,
}

/// Coordinate system for explicitly listed k-points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordSystem {
    /// Fractional coordinates relative to the reciprocal lattice
    /// ("Reciprocal"/"Direct" mode line)
    Reciprocal,
    /// Absolute Cartesian coordinates ("Cartesian"/"Kartesian" mode line)
    Cartesian,
}

/// The sampling payload: exactly one of the two modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sampling {
    /// Automatic mesh: grid dimensions plus an origin shift
    Mesh {
        dims: [u32; 3],
        shift: [f64; 3],
        style: MeshStyle,
    },
    /// Explicit list of k-points with per-point weights
    List {
        coords: CoordSystem,
        points: Vec<[f64; 3]>,
        weights: Vec<f64>,
        /// Optional per-point labels, same length as `points` when present
        tags: Option<Vec<String>>,
    },
}

/// An immutable k-point specification.
///
/// Constructed either programmatically via [`KpointsSpec::mesh`] /
/// [`KpointsSpec::list`] / [`KpointsBuilder`], or by parsing a file with
/// [`parse_kpoints`](super::parse_kpoints). Writers consume it read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpointsSpec {
    /// Title line carried through serialization, not semantically meaningful
    pub comment: String,
    /// Lattice cell the fractional coordinates refer to. Carried for
    /// callers; the codec never transforms coordinates with it.
    pub cell: Option<[[f64; 3]; 3]>,
    sampling: Sampling,
}

impl KpointsSpec {
    /// Create a mesh-mode spec. Dimensions must be strictly positive and
    /// shift components must lie in [0, 1).
    pub fn mesh(dims: [u32; 3], shift: [f64; 3], style: MeshStyle) -> Result<Self> {
        validate_mesh(&dims, &shift)?;
        Ok(Self {
            comment: "Automatic mesh".to_string(),
            cell: None,
            sampling: Sampling::Mesh { dims, shift, style },
        })
    }

    /// Create a list-mode spec with fractional coordinates. Weights default
    /// to 1.0 per point when `None`; tags, when given, must match the
    /// number of points.
    pub fn list(
        points: Vec<[f64; 3]>,
        weights: Option<Vec<f64>>,
        tags: Option<Vec<String>>,
    ) -> Result<Self> {
        Self::list_with_coords(CoordSystem::Reciprocal, points, weights, tags)
    }

    /// Create a list-mode spec with an explicit coordinate system.
    pub fn list_with_coords(
        coords: CoordSystem,
        points: Vec<[f64; 3]>,
        weights: Option<Vec<f64>>,
        tags: Option<Vec<String>>,
    ) -> Result<Self> {
        let weights = weights.unwrap_or_else(|| vec![1.0; points.len()]);
        validate_list(&points, &weights, tags.as_deref())?;
        Ok(Self {
            comment: "Explicit k-points".to_string(),
            cell: None,
            sampling: Sampling::List {
                coords,
                points,
                weights,
                tags,
            },
        })
    }

    pub(crate) fn from_sampling(comment: String, sampling: Sampling) -> Result<Self> {
        match &sampling {
            Sampling::Mesh { dims, shift, .. } => validate_mesh(dims, shift)?,
            Sampling::List {
                points,
                weights,
                tags,
                ..
            } => validate_list(points, weights, tags.as_deref())?,
        }
        Ok(Self {
            comment,
            cell: None,
            sampling,
        })
    }

    /// Attach the lattice cell the fractional coordinates refer to.
    pub fn with_cell(mut self, cell: [[f64; 3]; 3]) -> Self {
        self.cell = Some(cell);
        self
    }

    /// Set the title line used on serialization.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// The sampling payload.
    pub fn sampling(&self) -> &Sampling {
        &self.sampling
    }

    /// Mesh dimensions and shift, when in mesh mode.
    pub fn get_kpoints_mesh(&self) -> Option<([u32; 3], [f64; 3])> {
        match &self.sampling {
            Sampling::Mesh { dims, shift, .. } => Some((*dims, *shift)),
            Sampling::List { .. } => None,
        }
    }

    /// The explicit k-point coordinates, when in list mode.
    pub fn get_kpoints(&self) -> Option<&[[f64; 3]]> {
        match &self.sampling {
            Sampling::Mesh { .. } => None,
            Sampling::List { points, .. } => Some(points),
        }
    }

    /// Per-point weights, when in list mode.
    pub fn weights(&self) -> Option<&[f64]> {
        match &self.sampling {
            Sampling::Mesh { .. } => None,
            Sampling::List { weights, .. } => Some(weights),
        }
    }

    /// Per-point labels, when in list mode and labeled.
    pub fn tags(&self) -> Option<&[String]> {
        match &self.sampling {
            Sampling::Mesh { .. } => None,
            Sampling::List { tags, .. } => tags.as_deref(),
        }
    }

    /// Number of explicitly listed points (0 in mesh mode).
    pub fn num_points(&self) -> usize {
        match &self.sampling {
            Sampling::Mesh { .. } => 0,
            Sampling::List { points, .. } => points.len(),
        }
    }
}

fn validate_mesh(dims: &[u32; 3], shift: &[f64; 3]) -> Result<()> {
    if dims.iter().any(|&d| d == 0) {
        return Err(VaspIoError::Validation(format!(
            "mesh dimensions must be strictly positive, got {:?}",
            dims
        )));
    }
    for &s in shift {
        if !s.is_finite() || !(0.0..1.0).contains(&s) {
            return Err(VaspIoError::Validation(format!(
                "mesh shift components must lie in [0, 1), got {:?}",
                shift
            )));
        }
    }
    Ok(())
}

fn validate_list(points: &[[f64; 3]], weights: &[f64], tags: Option<&[String]>) -> Result<()> {
    if points.is_empty() {
        return Err(VaspIoError::Validation(
            "explicit k-point list must not be empty".to_string(),
        ));
    }
    if weights.len() != points.len() {
        return Err(VaspIoError::Validation(format!(
            "got {} weights for {} k-points",
            weights.len(),
            points.len()
        )));
    }
    if let Some(tags) = tags {
        if tags.len() != points.len() {
            return Err(VaspIoError::Validation(format!(
                "got {} tags for {} k-points",
                tags.len(),
                points.len()
            )));
        }
    }
    for point in points {
        if point.iter().any(|c| !c.is_finite()) {
            return Err(VaspIoError::Validation(format!(
                "k-point coordinates must be finite, got {:?}",
                point
            )));
        }
    }
    Ok(())
}

/// Incremental builder for callers that assemble a spec field by field.
///
/// Unlike the direct constructors, the builder lets mesh and list fields
/// be set independently and defers the exactly-one-mode check to
/// [`build`](KpointsBuilder::build).
#[derive(Debug, Default, Clone)]
pub struct KpointsBuilder {
    comment: Option<String>,
    cell: Option<[[f64; 3]; 3]>,
    mesh_dims: Option<[u32; 3]>,
    mesh_shift: Option<[f64; 3]>,
    style: Option<MeshStyle>,
    coords: Option<CoordSystem>,
    points: Option<Vec<[f64; 3]>>,
    weights: Option<Vec<f64>>,
    tags: Option<Vec<String>>,
}

impl KpointsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn cell(mut self, cell: [[f64; 3]; 3]) -> Self {
        self.cell = Some(cell);
        self
    }

    pub fn mesh_dims(mut self, dims: [u32; 3]) -> Self {
        self.mesh_dims = Some(dims);
        self
    }

    pub fn mesh_shift(mut self, shift: [f64; 3]) -> Self {
        self.mesh_shift = Some(shift);
        self
    }

    pub fn mesh_style(mut self, style: MeshStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn coords(mut self, coords: CoordSystem) -> Self {
        self.coords = Some(coords);
        self
    }

    pub fn points(mut self, points: Vec<[f64; 3]>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Build the spec, rejecting inconsistent field combinations before
    /// any serialization can be attempted.
    pub fn build(self) -> Result<KpointsSpec> {
        let sampling = match (self.mesh_dims, self.points) {
            (Some(_), Some(_)) => {
                return Err(VaspIoError::Validation(
                    "both mesh dimensions and an explicit k-point list were set".to_string(),
                ))
            }
            (None, None) => {
                return Err(VaspIoError::Validation(
                    "neither mesh dimensions nor an explicit k-point list was set".to_string(),
                ))
            }
            (Some(dims), None) => {
                if self.weights.is_some() || self.tags.is_some() {
                    return Err(VaspIoError::Validation(
                        "weights and tags apply to list mode only".to_string(),
                    ));
                }
                Sampling::Mesh {
                    dims,
                    shift: self.mesh_shift.unwrap_or([0.0; 3]),
                    style: self.style.unwrap_or(MeshStyle::Gamma),
                }
            }
            (None, Some(points)) => {
                let weights = self.weights.unwrap_or_else(|| vec![1.0; points.len()]);
                Sampling::List {
                    coords: self.coords.unwrap_or(CoordSystem::Reciprocal),
                    points,
                    weights,
                    tags: self.tags,
                }
            }
        };
        let comment = self.comment.unwrap_or_else(|| match sampling {
            Sampling::Mesh { .. } => "Automatic mesh".to_string(),
            Sampling::List { .. } => "Explicit k-points".to_string(),
        });
        let mut spec = KpointsSpec::from_sampling(comment, sampling)?;
        spec.cell = self.cell;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_constructor_validates_dims() {
        let result = KpointsSpec::mesh([4, 0, 4], [0.0; 3], MeshStyle::Gamma);
        assert!(matches!(result, Err(VaspIoError::Validation(_))));
    }

    #[test]
    fn test_mesh_constructor_validates_shift_range() {
        let result = KpointsSpec::mesh([2, 2, 2], [0.5, 1.0, 0.0], MeshStyle::Gamma);
        assert!(matches!(result, Err(VaspIoError::Validation(_))));
    }

    #[test]
    fn test_list_defaults_uniform_weights() {
        let spec = KpointsSpec::list(vec![[0.0; 3], [0.5, 0.5, 0.5]], None, None).unwrap();
        assert_eq!(spec.weights().unwrap(), &[1.0, 1.0]);
        assert_eq!(spec.num_points(), 2);
        assert!(spec.get_kpoints_mesh().is_none());
    }

    #[test]
    fn test_list_rejects_mismatched_weights() {
        let result = KpointsSpec::list(vec![[0.0; 3], [0.5; 3]], Some(vec![1.0]), None);
        assert!(matches!(result, Err(VaspIoError::Validation(_))));
    }

    #[test]
    fn test_list_rejects_mismatched_tags() {
        let result = KpointsSpec::list(
            vec![[0.0; 3]],
            None,
            Some(vec!["GAMMA".to_string(), "X".to_string()]),
        );
        assert!(matches!(result, Err(VaspIoError::Validation(_))));
    }

    #[test]
    fn test_builder_rejects_both_modes() {
        let result = KpointsBuilder::new()
            .mesh_dims([4, 4, 4])
            .points(vec![[0.0; 3]])
            .build();
        assert!(matches!(result, Err(VaspIoError::Validation(_))));
    }

    #[test]
    fn test_builder_rejects_neither_mode() {
        let result = KpointsBuilder::new().comment("empty").build();
        assert!(matches!(result, Err(VaspIoError::Validation(_))));
    }

    #[test]
    fn test_builder_mesh_defaults() {
        let spec = KpointsBuilder::new().mesh_dims([3, 3, 3]).build().unwrap();
        let (dims, shift) = spec.get_kpoints_mesh().unwrap();
        assert_eq!(dims, [3, 3, 3]);
        assert_eq!(shift, [0.0; 3]);
        match spec.sampling() {
            Sampling::Mesh { style, .. } => assert_eq!(*style, MeshStyle::Gamma),
            _ => panic!("expected mesh sampling"),
        }
    }
}
