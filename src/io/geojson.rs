//! GeoJSON output for visualization consumers.
//!
//! One `Polygon` feature per face, keyed by its face index, plus a `values`
//! array aligned with the features. Coordinates are always EPSG:4326; build
//! the polygons with [`crate::algs::reconstruct::PolygonReconstructor`].

use crate::algs::reconstruct::FacePolygon;
use crate::io::present::{PresentationOptions, present_value};
use crate::mesh_error::MeshError;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// GeoJSON polygon geometry with a single closed exterior ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub face_index: usize,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceFeature {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: usize,
    pub geometry: PolygonGeometry,
    pub properties: FeatureProperties,
}

/// Feature collection of face polygons with aligned presented values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceFeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<FaceFeature>,
    /// `values[i]` belongs to `features[i]`.
    pub values: Vec<Option<f64>>,
}

impl FaceFeatureCollection {
    /// Pair polygons with values. `values[i]` belongs to `polygons[i]`, so
    /// both slices must have the same length.
    pub fn new(
        polygons: &[FacePolygon],
        values: &[f64],
        options: PresentationOptions,
    ) -> Result<Self, MeshError> {
        if values.len() != polygons.len() {
            return Err(MeshError::InputShape(format!(
                "{} values supplied for {} features",
                values.len(),
                polygons.len()
            )));
        }
        let (features, presented): (Vec<_>, Vec<_>) = polygons
            .iter()
            .zip(values)
            .map(|(polygon, &raw)| {
                let value = present_value(raw, options.decimals);
                (feature(polygon, value), value)
            })
            .unzip();
        Ok(Self {
            kind: "FeatureCollection".into(),
            features,
            values: presented,
        })
    }

    /// Collection without attached values.
    pub fn geometries_only(polygons: &[FacePolygon]) -> Self {
        Self {
            kind: "FeatureCollection".into(),
            features: polygons.iter().map(|p| feature(p, None)).collect(),
            values: vec![None; polygons.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), MeshError> {
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, MeshError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn feature(polygon: &FacePolygon, value: Option<f64>) -> FaceFeature {
    FaceFeature {
        kind: "Feature".into(),
        id: polygon.face,
        geometry: PolygonGeometry {
            kind: "Polygon".into(),
            coordinates: vec![polygon.closed_ring()],
        },
        properties: FeatureProperties {
            face_index: polygon.face,
            value,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(face: usize) -> FacePolygon {
        FacePolygon {
            face,
            exterior: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
        }
    }

    #[test]
    fn rings_are_closed_and_values_aligned() {
        let polys = vec![triangle(0), triangle(2)];
        let fc = FaceFeatureCollection::new(
            &polys,
            &[1.23456, f64::NAN],
            PresentationOptions { decimals: 2 },
        )
        .unwrap();
        assert_eq!(fc.len(), 2);
        let ring = &fc.features[0].geometry.coordinates[0];
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring.len(), 4);
        assert_eq!(fc.values, vec![Some(1.23), None]);
        assert_eq!(fc.features[1].properties.face_index, 2);
        assert_eq!(fc.features[1].properties.value, None);
    }

    #[test]
    fn value_count_must_match_features() {
        let polys = [triangle(0), triangle(1)];
        for values in [&[1.0][..], &[1.0, 2.0, 3.0][..]] {
            let err = FaceFeatureCollection::new(&polys, values, PresentationOptions::default())
                .unwrap_err();
            assert!(matches!(err, MeshError::InputShape(_)));
        }
    }

    #[test]
    fn serializes_as_geojson() {
        let fc = FaceFeatureCollection::geometries_only(&[triangle(0)]);
        let json: serde_json::Value = serde_json::from_str(&fc.to_json_string().unwrap()).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["geometry"]["type"], "Polygon");
        assert!(json["values"][0].is_null());
    }

    #[test]
    fn writer_output_reads_back() {
        let fc = FaceFeatureCollection::new(
            &[triangle(0), triangle(5)],
            &[-12.5, 0.25],
            PresentationOptions { decimals: 1 },
        )
        .unwrap();
        let mut buf = Vec::new();
        fc.to_writer(&mut buf).unwrap();
        let back: FaceFeatureCollection = serde_json::from_slice(&buf).unwrap();
        assert_eq!(back, fc);
        assert_eq!(back.features[1].id, 5);
        assert_eq!(buf, fc.to_json_string().unwrap().into_bytes());
    }
}
