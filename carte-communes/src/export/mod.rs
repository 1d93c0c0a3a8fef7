//! Export des sorties de rendu

pub mod geojson;
