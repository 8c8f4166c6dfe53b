//! Mesh topology construction from generator output.
//!
//! Stages, in order:
//! 1. shape checks on every generator array (fatal);
//! 2. per-face slicing, sentinel removal, de-duplication and
//!    counter-clockwise ordering; degenerate faces are excluded and reported;
//! 3. optional simplicity policy;
//! 4. node elevations from bathymetry, interpolated in a metric CRS;
//! 5. edge → face adjacency over the surviving faces (a third face on an
//!    edge aborts the build);
//! 6. rendering coordinates and final validation.
//!
//! Nothing is published unless every stage succeeds.

use crate::algs::interpolate::interpolate_across_crs;
use crate::geometry::crs::{Crs, select_metric_crs};
use crate::mesh_error::MeshError;
use crate::mesh_generation::{BathymetrySource, GeneratorOutput, MeshBuildOptions};
use crate::topology::adjacency::EdgeFaceAdjacencyResolver;
use crate::topology::mesh::{Edge, Face, MeshTopology, Node};
use crate::topology::orientation::FaceNodeOrderer;
use crate::topology::validation::{SimplicityHandling, face_is_simple};
use std::sync::Arc;
use std::time::Instant;

/// Why a face was left out of the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Fewer than three unique nodes.
    Degenerate,
    /// Self-intersecting boundary under [`SimplicityHandling::Exclude`].
    NonSimple,
}

/// One excluded generator face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceExclusion {
    /// Index in the generator output.
    pub face: usize,
    pub unique_nodes: usize,
    pub reason: ExclusionReason,
}

impl FaceExclusion {
    pub fn to_error(&self) -> MeshError {
        match self.reason {
            ExclusionReason::Degenerate => MeshError::DegenerateFace {
                face: self.face,
                unique_nodes: self.unique_nodes,
            },
            ExclusionReason::NonSimple => MeshError::InputShape(format!(
                "face {} has a self-intersecting boundary",
                self.face
            )),
        }
    }
}

/// Warnings attached to an otherwise valid mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub excluded_faces: Vec<FaceExclusion>,
    /// Generator indices of kept faces that failed the simplicity check.
    pub non_simple_faces: Vec<usize>,
    /// Edges were derived from faces rather than supplied.
    pub derived_edges: bool,
    /// CRS used for bathymetry distances, when bathymetry was supplied.
    pub metric_crs: Option<Crs>,
}

impl BuildReport {
    pub fn excluded_count(&self) -> usize {
        self.excluded_faces.len()
    }

    pub fn degenerate_count(&self) -> usize {
        self.excluded_faces
            .iter()
            .filter(|e| e.reason == ExclusionReason::Degenerate)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.excluded_faces.is_empty() && self.non_simple_faces.is_empty()
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} face(s) excluded ({} degenerate), {} non-simple face(s) kept",
            self.excluded_count(),
            self.degenerate_count(),
            self.non_simple_faces.len()
        )
    }
}

/// A successfully built mesh.
#[derive(Debug, Clone)]
pub struct BuiltMesh {
    pub topology: Arc<MeshTopology>,
    pub report: BuildReport,
}

/// Builds [`MeshTopology`] values from [`GeneratorOutput`].
#[derive(Debug, Clone, Default)]
pub struct MeshTopologyBuilder {
    options: MeshBuildOptions,
}

impl MeshTopologyBuilder {
    pub fn new(options: MeshBuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MeshBuildOptions {
        &self.options
    }

    /// Run a full build. `bathymetry`, when given, fills every node's `z`.
    pub fn build(
        &self,
        input: &GeneratorOutput,
        bathymetry: Option<&dyn BathymetrySource>,
    ) -> Result<BuiltMesh, MeshError> {
        let started = Instant::now();
        check_shapes(input)?;
        let mut report = BuildReport::default();

        let orderer = FaceNodeOrderer::new(&input.node_x, &input.node_y)?;
        let node_count = orderer.node_count();
        let mut kept: Vec<(usize, Vec<usize>)> = Vec::with_capacity(input.face_count());
        for (face, raw) in input.face_slices()?.into_iter().enumerate() {
            let entries = face_entries(face, raw, input.start_index, node_count)?;
            let ordered = match orderer.order(face, &entries) {
                Ok(ordered) => ordered,
                Err(MeshError::DegenerateFace { unique_nodes, .. }) => {
                    log::warn!(
                        "face {face}: {unique_nodes} unique node(s) after de-duplication, excluded"
                    );
                    report.excluded_faces.push(FaceExclusion {
                        face,
                        unique_nodes,
                        reason: ExclusionReason::Degenerate,
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };
            if self.options.simplicity != SimplicityHandling::Ignore
                && !face_is_simple(&input.node_x, &input.node_y, &ordered)
            {
                if self.options.simplicity == SimplicityHandling::Exclude {
                    log::warn!("face {face}: self-intersecting boundary, excluded");
                    report.excluded_faces.push(FaceExclusion {
                        face,
                        unique_nodes: ordered.len(),
                        reason: ExclusionReason::NonSimple,
                    });
                    continue;
                }
                log::warn!("face {face}: self-intersecting boundary");
                report.non_simple_faces.push(face);
            }
            kept.push((face, ordered));
        }
        log::debug!(
            "faces normalized: {} kept, {} excluded in {:?}",
            kept.len(),
            report.excluded_count(),
            started.elapsed()
        );

        let node_z = match bathymetry {
            Some(source) => {
                let stage = Instant::now();
                let sources = source.to_point_set()?;
                let metric = select_metric_crs(
                    input.crs,
                    &input.node_x,
                    &input.node_y,
                    self.options.metric_crs,
                )?;
                let z = interpolate_across_crs(
                    &input.node_x,
                    &input.node_y,
                    input.crs,
                    &sources,
                    metric,
                    self.options.idw_config(),
                )?;
                log::debug!("node elevations interpolated in {metric} in {:?}", stage.elapsed());
                report.metric_crs = Some(metric);
                z.into_iter().map(Some).collect()
            }
            None => vec![None; node_count],
        };

        let stage = Instant::now();
        let resolver = if !input.edge_nodes.is_empty() {
            EdgeFaceAdjacencyResolver::new(edge_list(input, node_count)?)?
        } else if self.options.derive_missing_edges {
            report.derived_edges = true;
            EdgeFaceAdjacencyResolver::from_faces(kept.iter().map(|(_, nodes)| nodes.as_slice()))
        } else if kept.is_empty() {
            EdgeFaceAdjacencyResolver::new(Vec::new())?
        } else {
            return Err(MeshError::InputShape(
                "no edges supplied and edge derivation is disabled".into(),
            ));
        };
        let (edge_nodes, slots) =
            resolver.resolve(kept.iter().map(|(_, nodes)| nodes.as_slice()))?;
        log::debug!(
            "adjacency resolved for {} edges in {:?}",
            edge_nodes.len(),
            stage.elapsed()
        );

        let explicit_edge_xy = !report.derived_edges && !input.edge_x.is_empty();
        if report.derived_edges && !input.edge_x.is_empty() {
            log::warn!("edge coordinates ignored: edges were derived from faces");
        }
        let edges = edge_nodes
            .into_iter()
            .zip(slots)
            .enumerate()
            .map(|(e, (nodes, faces))| {
                let (x, y) = if explicit_edge_xy {
                    (input.edge_x[e], input.edge_y[e])
                } else {
                    let [a, b] = nodes;
                    (
                        0.5 * (input.node_x[a] + input.node_x[b]),
                        0.5 * (input.node_y[a] + input.node_y[b]),
                    )
                };
                Edge { nodes, faces, x, y }
            })
            .collect();

        let faces = kept
            .into_iter()
            .map(|(source_index, nodes)| {
                let [x, y] = if input.face_x.is_empty() {
                    orderer.centroid(&nodes).unwrap_or([f64::NAN, f64::NAN])
                } else {
                    [input.face_x[source_index], input.face_y[source_index]]
                };
                Face {
                    nodes,
                    x,
                    y,
                    source_index,
                }
            })
            .collect();

        let nodes = input
            .node_x
            .iter()
            .zip(&input.node_y)
            .zip(node_z)
            .map(|((&x, &y), z)| Node { x, y, z })
            .collect();

        let topology = MeshTopology::try_new(nodes, edges, faces, input.crs)?;
        log::info!(
            "mesh built: {} nodes, {} edges, {} faces; {} in {:?}",
            topology.node_count(),
            topology.edge_count(),
            topology.face_count(),
            report.summary(),
            started.elapsed()
        );
        Ok(BuiltMesh {
            topology: Arc::new(topology),
            report,
        })
    }
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), MeshError> {
    if expected != found {
        return Err(MeshError::LengthMismatch {
            field,
            expected,
            found,
        });
    }
    Ok(())
}

fn check_shapes(input: &GeneratorOutput) -> Result<(), MeshError> {
    let n = input.node_count();
    check_len("node_y", n, input.node_y.len())?;
    if let Some(i) = input
        .node_x
        .iter()
        .zip(&input.node_y)
        .position(|(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(MeshError::InputShape(format!(
            "node {i} has a non-finite coordinate"
        )));
    }
    if input.start_index < 0 {
        return Err(MeshError::InputShape(format!(
            "start_index must be non-negative, got {}",
            input.start_index
        )));
    }
    let f = input.face_count();
    if !input.face_x.is_empty() || !input.face_y.is_empty() {
        check_len("face_x", f, input.face_x.len())?;
        check_len("face_y", f, input.face_y.len())?;
    }
    if !input.edge_nodes.is_empty() && (!input.edge_x.is_empty() || !input.edge_y.is_empty()) {
        let e = input.edge_nodes.len();
        check_len("edge_x", e, input.edge_x.len())?;
        check_len("edge_y", e, input.edge_y.len())?;
    }
    Ok(())
}

/// Zero-based node indices of one face; sentinels are dropped.
fn face_entries(
    face: usize,
    raw: &[i64],
    start_index: i64,
    node_count: usize,
) -> Result<Vec<usize>, MeshError> {
    let mut out = Vec::with_capacity(raw.len());
    for &r in raw {
        let n = r - start_index;
        if n < 0 {
            continue;
        }
        if n as usize >= node_count {
            return Err(MeshError::NodeIndexOutOfRange {
                face,
                node: r,
                node_count,
            });
        }
        out.push(n as usize);
    }
    Ok(out)
}

fn edge_list(input: &GeneratorOutput, node_count: usize) -> Result<Vec<[usize; 2]>, MeshError> {
    input
        .edge_nodes
        .iter()
        .enumerate()
        .map(|(edge, raw)| {
            let mut ends = [0usize; 2];
            for (k, &r) in raw.iter().enumerate() {
                let n = r - input.start_index;
                if n < 0 || n as usize >= node_count {
                    return Err(MeshError::EdgeNodeOutOfRange {
                        edge,
                        node: r,
                        node_count,
                    });
                }
                ends[k] = n as usize;
            }
            Ok(ends)
        })
        .collect()
}
