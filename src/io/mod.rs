//! Mesh I/O: the storage container, its readers/writers and the
//! visualization output.
//!
//! This module provides trait-based readers and writers for persisting a
//! [`UgridDataset`], a plain lookup table between friendly and raw variable
//! names, and a JSON backend.

pub mod geojson;
pub mod present;
pub mod ugrid;

use crate::mesh_error::MeshError;
use crate::io::ugrid::UgridDataset;
use std::io::{Read, Write};

/// Arrays of the storage container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableName {
    NodeX,
    NodeY,
    NodeZ,
    EdgeNodes,
    EdgeX,
    EdgeY,
    EdgeFaces,
    FaceNodes,
    FaceX,
    FaceY,
    FaceXBnd,
    FaceYBnd,
}

/// `(variable, friendly name, raw storage name)`.
const VARIABLE_TABLE: [(VariableName, &str, &str); 12] = [
    (VariableName::NodeX, "node_x", "mesh2d_node_x"),
    (VariableName::NodeY, "node_y", "mesh2d_node_y"),
    (VariableName::NodeZ, "node_z", "mesh2d_node_z"),
    (VariableName::EdgeNodes, "edge_nodes", "mesh2d_edge_nodes"),
    (VariableName::EdgeX, "edge_x", "mesh2d_edge_x"),
    (VariableName::EdgeY, "edge_y", "mesh2d_edge_y"),
    (VariableName::EdgeFaces, "edge_faces", "mesh2d_edge_faces"),
    (VariableName::FaceNodes, "face_nodes", "mesh2d_face_nodes"),
    (VariableName::FaceX, "face_x", "mesh2d_face_x"),
    (VariableName::FaceY, "face_y", "mesh2d_face_y"),
    (VariableName::FaceXBnd, "face_x_bnd", "mesh2d_face_x_bnd"),
    (VariableName::FaceYBnd, "face_y_bnd", "mesh2d_face_y_bnd"),
];

impl VariableName {
    /// Every variable, in table order.
    pub fn all() -> impl Iterator<Item = VariableName> {
        VARIABLE_TABLE.iter().map(|&(v, _, _)| v)
    }

    // Table rows are in declaration order.
    fn row(self) -> &'static (VariableName, &'static str, &'static str) {
        &VARIABLE_TABLE[self as usize]
    }

    /// Name used by callers, e.g. `node_x`.
    pub fn friendly(self) -> &'static str {
        self.row().1
    }

    /// Name used in storage, e.g. `mesh2d_node_x`.
    pub fn raw(self) -> &'static str {
        self.row().2
    }

    pub fn from_friendly(name: &str) -> Option<Self> {
        VARIABLE_TABLE
            .iter()
            .find(|(_, friendly, _)| *friendly == name)
            .map(|&(v, _, _)| v)
    }

    pub fn from_raw(name: &str) -> Option<Self> {
        VARIABLE_TABLE
            .iter()
            .find(|(_, _, raw)| *raw == name)
            .map(|&(v, _, _)| v)
    }
}

/// Trait for readers that load a mesh container.
pub trait UgridReader {
    /// Parse and validate a dataset.
    fn read<R: Read>(&self, reader: R) -> Result<UgridDataset, MeshError>;
}

/// Trait for writers that persist a mesh container.
pub trait UgridWriter {
    fn write<W: Write>(&self, writer: W, dataset: &UgridDataset) -> Result<(), MeshError>;
}

/// JSON backend for the mesh container.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonUgrid {
    /// Indent output.
    pub pretty: bool,
}

impl UgridReader for JsonUgrid {
    fn read<R: Read>(&self, reader: R) -> Result<UgridDataset, MeshError> {
        let dataset: UgridDataset = serde_json::from_reader(reader)?;
        dataset.validate()?;
        Ok(dataset)
    }
}

impl UgridWriter for JsonUgrid {
    fn write<W: Write>(&self, mut writer: W, dataset: &UgridDataset) -> Result<(), MeshError> {
        dataset.validate()?;
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, dataset)?;
        } else {
            serde_json::to_writer(&mut writer, dataset)?;
        }
        writer.flush()?;
        Ok(())
    }
}
