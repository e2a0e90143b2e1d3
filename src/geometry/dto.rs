use serde::{Deserialize, Serialize};

/// A single map pin. Doubles as the row type: the markers table stores
/// exactly these two columns per user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct MarkerDto {
    pub lat: f64,
    pub lng: f64,
}

/// A labelled polygon; `coords` is the ordered ring of [lat, lng] vertices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolygonDto {
    pub coords: Vec<[f64; 2]>,
    #[serde(default)]
    pub label: String,
}

/// Request body for the full-replace marker save.
#[derive(Debug, Deserialize)]
pub struct SaveMarkersRequest {
    pub markers: Vec<MarkerDto>,
}

/// Request body for the full-replace polygon save.
#[derive(Debug, Deserialize)]
pub struct SavePolygonsRequest {
    pub polygons: Vec<PolygonDto>,
}
