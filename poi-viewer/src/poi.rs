//! The points of interest shown in the viewer.

use anyhow::Context;
use cloud_render::renderer::viewer::Marker;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A labeled location in the scan.
///
/// The set of points of interest is fixed at startup and never changes
/// afterwards. Each one becomes exactly one marker in the viewer window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    /// Short name, used to label the sidebar button.
    pub name: String,

    /// Longer text, shown in the info panel when the point is selected.
    pub description: String,

    /// World space position.
    pub position: Vector3<f64>,
}

impl Poi {
    pub fn to_marker(&self) -> Marker {
        Marker {
            label: self.name.clone(),
            description: self.description.clone(),
            position: self.position,
        }
    }
}

/// The points of interest, that are used if no POI file is given.
pub fn default_pois() -> Vec<Poi> {
    vec![
        Poi {
            name: "POI 1".to_string(),
            description: "This is point of interest #1".to_string(),
            position: Vector3::new(0.0, 0.0, 0.0),
        },
        Poi {
            name: "POI 2".to_string(),
            description: "This is point of interest #2".to_string(),
            position: Vector3::new(1.0, 1.0, 1.0),
        },
    ]
}

/// Reads the points of interest from a JSON file.
pub fn load_pois(path: &Path) -> anyhow::Result<Vec<Poi>> {
    let file = File::open(path)
        .with_context(|| format!("Could not open POI file `{}`.", path.display()))?;
    let pois = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Could not parse POI file `{}`.", path.display()))?;
    Ok(pois)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn there_are_two_default_pois() {
        let pois = default_pois();
        assert_eq!(pois.len(), 2);
        assert_eq!(pois[0].position, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(pois[1].position, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn pois_parse_from_json() {
        let json = r#"[
            {
                "name": "Entrance",
                "description": "The main entrance of the scanned building",
                "position": [1.0, 0.5, -2.0]
            }
        ]"#;
        let pois: Vec<Poi> = serde_json::from_str(json).unwrap();
        assert_eq!(
            pois,
            vec![Poi {
                name: "Entrance".to_string(),
                description: "The main entrance of the scanned building".to_string(),
                position: Vector3::new(1.0, 0.5, -2.0),
            }]
        );
    }

    #[test]
    fn a_poi_becomes_a_marker_with_the_same_data() {
        let poi = Poi {
            name: "POI 1".to_string(),
            description: "This is point of interest #1".to_string(),
            position: Vector3::new(3.0, 2.0, 1.0),
        };
        let marker = poi.to_marker();
        assert_eq!(marker.label, poi.name);
        assert_eq!(marker.description, poi.description);
        assert_eq!(marker.position, poi.position);
    }
}
