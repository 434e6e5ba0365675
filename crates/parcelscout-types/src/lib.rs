// crates/parcelscout-types/src/lib.rs
// Shared types for ParcelScout (native + WASM compatible)
// No native-only dependencies allowed here

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ═══════════════════════════════════════
// QUERY TYPES
// ═══════════════════════════════════════

/// How a raw search string was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryClassification {
    /// Parcel/account identifier, e.g. "123-456-789"
    Identifier,
    /// Street address, e.g. "306 Cedar Lane"
    Address,
    /// Everything else — routed through AI translation
    Freeform,
}

/// A predicate expression plus optional ordering and result cap,
/// intended for direct execution against a feature layer.
///
/// A filter that is about to be executed must have passed the safety
/// validator; only validated filters reach the query service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredFilter {
    pub where_clause: String,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
}

impl StructuredFilter {
    pub fn new(where_clause: impl Into<String>) -> Self {
        Self {
            where_clause: where_clause.into(),
            order_by: None,
            limit: None,
        }
    }
}

/// A resolved coordinate, optionally carrying the canonicalized
/// address label returned by a geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
    pub label: Option<String>,
}

impl GeoPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, label: None }
    }

    pub fn labeled(x: f64, y: f64, label: impl Into<String>) -> Self {
        Self {
            x,
            y,
            label: Some(label.into()),
        }
    }
}

// ═══════════════════════════════════════
// FEATURE TYPES
// ═══════════════════════════════════════

/// Feature geometry, expressed generically as coordinate arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Geometry {
    Point { x: f64, y: f64 },
    Polyline { paths: Vec<Vec<[f64; 2]>> },
    Polygon { rings: Vec<Vec<[f64; 2]>> },
}

impl Geometry {
    /// Representative center point for display. The pipeline never
    /// interprets geometry beyond this.
    pub fn center(&self) -> Option<(f64, f64)> {
        match self {
            Geometry::Point { x, y } => Some((*x, *y)),
            Geometry::Polyline { paths } => vertex_average(paths.first()?),
            Geometry::Polygon { rings } => vertex_average(rings.first()?),
        }
    }
}

fn vertex_average(vertices: &[[f64; 2]]) -> Option<(f64, f64)> {
    if vertices.is_empty() {
        return None;
    }
    let n = vertices.len() as f64;
    let (sx, sy) = vertices
        .iter()
        .fold((0.0, 0.0), |(sx, sy), [x, y]| (sx + x, sy + y));
    Some((sx / n, sy / n))
}

/// One queryable geographic record: an attribute map plus optional geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl FeatureRecord {
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Attribute rendered for display (strings unquoted).
    pub fn display_value(&self, name: &str) -> Option<String> {
        self.attributes.get(name).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn center(&self) -> Option<(f64, f64)> {
        self.geometry.as_ref().and_then(|g| g.center())
    }
}

// ═══════════════════════════════════════
// OUTCOME TYPES
// ═══════════════════════════════════════

/// Terminal artifact of one resolution, handed to the UI layer.
/// Owns copies of whatever records it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    NoMatch,
    SingleMatch { record: FeatureRecord },
    MultiMatch { records: Vec<FeatureRecord> },
    Failure { reason: String },
}

impl ResolutionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ResolutionOutcome::Failure { .. })
    }

    pub fn record_count(&self) -> usize {
        match self {
            ResolutionOutcome::NoMatch | ResolutionOutcome::Failure { .. } => 0,
            ResolutionOutcome::SingleMatch { .. } => 1,
            ResolutionOutcome::MultiMatch { records } => records.len(),
        }
    }
}

// ═══════════════════════════════════════
// FIELD CATALOGUE
// ═══════════════════════════════════════

/// Declared type of a queryable field, as exposed to the translation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Number => write!(f, "number"),
            FieldType::Date => write!(f, "date"),
        }
    }
}

/// One entry in the queryable-field catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}
