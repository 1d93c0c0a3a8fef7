//! # choropleth
//!
//! Moteur de jointure géographique et de classification choroplèthe :
//! réconcilie une table de valeurs externe (nom/code d'entité → niveau
//! numérique) avec une collection de géométries administratives, puis
//! produit une classification par paliers de couleurs et un style par
//! feature, consommés par un collaborateur de rendu.
//!
//! ## Features
//!
//! - Normalisation obligatoire des clés de jointure (trim + pliage de casse)
//! - Agrégation des clés dupliquées (max, sum, first, mean)
//! - Jointure gauche totale : aucune géométrie perdue faute de match
//! - Transformation monotone optionnelle (log1p) avant classification
//! - Échelles par paliers sur les rampes ColorBrewer à 9 niveaux
//! - Distinction explicite « pas de donnée » / « valeur 0 présente »
//!
//! ## Usage
//!
//! ```rust
//! use choropleth::{run, GeometryFeature, PipelineParams, ValueRecord};
//! use geo::{polygon, Geometry};
//!
//! let features = vec![GeometryFeature {
//!     id: "67482".into(),
//!     name: "Strasbourg".into(),
//!     code: Some("67482".into()),
//!     boundary: Geometry::Polygon(polygon![
//!         (x: 7.68, y: 48.53),
//!         (x: 7.84, y: 48.53),
//!         (x: 7.84, y: 48.65),
//!         (x: 7.68, y: 48.65),
//!     ]),
//! }];
//! let records = vec![ValueRecord::new("strasbourg", 10.0)];
//!
//! let pass = run(&features, &records, &PipelineParams::default())?;
//! assert_eq!(pass.styles.len(), features.len());
//! # Ok::<(), choropleth::ChoroplethError>(())
//! ```
//!
//! Toutes les étapes sont des fonctions pures sans I/O : le chargement des
//! sources de géométries et des tables appartient aux crates appelants.

pub mod aggregate;
pub mod error;
pub mod join;
pub mod normalize;
pub mod palette;
pub mod pipeline;
pub mod scale;
pub mod style;
pub mod transform;
pub mod types;

pub use aggregate::{aggregate, AggregatePolicy};
pub use error::ChoroplethError;
pub use join::{join, MatchField, UNMATCHED_VALUE};
pub use normalize::{canonicalize_code, normalize, NormalizedKey};
pub use palette::{palette, Color, ColorRamp, PALETTES};
pub use pipeline::{run, PipelineParams};
pub use scale::{build_scale, ClassificationScale};
pub use style::style;
pub use transform::Transform;
pub use types::{
    CellValue, DataWarning, GeometryFeature, JoinedFeature, Legend, MatchStats, RenderPass,
    StyleDescriptor, ValueRecord,
};
