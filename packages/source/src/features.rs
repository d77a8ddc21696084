//! Municipality polygons from `GeoJSON` feature collections.
//!
//! INEGI files name municipalities under `NOMGEO`; older simplified files
//! use `nom_mun` or `NOM_MUN`. Each feature is reduced to a
//! [`GeoFeature`] carrying its name, bounding-box center and raw geometry.

use geo::BoundingRect;
use geojson::GeoJson;
use sinaloa_report_geography_models::LatLng;
use sinaloa_report_source_models::GeoFeature;

use crate::SourceError;

/// Property names checked, in order, for a feature's municipality name.
pub const NAME_PROPERTIES: &[&str] = &["NOMGEO", "nom_mun", "NOM_MUN"];

/// Parses a `GeoJSON` document into named features.
///
/// Features without a recognizable name property are skipped. A bare
/// `Feature` or `Geometry` document yields at most one feature.
///
/// # Errors
///
/// Returns [`SourceError::GeoJson`] if the text is not valid `GeoJSON`.
pub fn parse_features(text: &str) -> Result<Vec<GeoFeature>, SourceError> {
    let geojson: GeoJson = text.parse()?;

    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => Vec::new(),
    };

    let total = features.len();
    let parsed: Vec<GeoFeature> = features.iter().filter_map(summarize).collect();

    if parsed.len() < total {
        log::warn!(
            "Skipped {} of {total} features without a name property",
            total - parsed.len()
        );
    }

    Ok(parsed)
}

fn feature_name(feature: &geojson::Feature) -> Option<String> {
    NAME_PROPERTIES
        .iter()
        .find_map(|key| feature.property(key)?.as_str())
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
}

fn summarize(feature: &geojson::Feature) -> Option<GeoFeature> {
    let name = feature_name(feature)?;

    let center = feature.geometry.as_ref().and_then(|geometry| {
        let geometry: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
        let rect = geometry.bounding_rect()?;
        let center = rect.center();
        Some(LatLng::new(center.y, center.x))
    });

    let geometry = feature
        .geometry
        .as_ref()
        .and_then(|g| serde_json::to_value(g).ok());

    Some(GeoFeature {
        name,
        center,
        geometry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"NOMGEO": "Culiacán"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-108.0, 24.0], [-106.0, 24.0], [-106.0, 26.0], [-108.0, 26.0], [-108.0, 24.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"nom_mun": " Navolato "},
                "geometry": null
            },
            {
                "type": "Feature",
                "properties": {"CVEGEO": "25001"},
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn reads_names_from_known_properties() {
        let features = parse_features(COLLECTION).unwrap();
        let names: Vec<&str> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Culiacán", "Navolato"]);
    }

    #[test]
    fn computes_bounding_box_center() {
        let features = parse_features(COLLECTION).unwrap();
        let center = features[0].center.unwrap();
        assert!((center.lat - 25.0).abs() < 1e-9);
        assert!((center.lng - -107.0).abs() < 1e-9);
        assert!(features[0].geometry.is_some());
        assert!(features[1].center.is_none());
    }

    #[test]
    fn rejects_invalid_geojson() {
        assert!(parse_features("{\"type\": \"Nope\"}").is_err());
    }
}
