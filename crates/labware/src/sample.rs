use serde_with::skip_serializing_none;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub donor_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TissueType {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialLocation {
    pub code: i32,
    pub name: String,
    pub tissue_type: TissueType,
}

/// Used for both the fixative and medium of a tissue, and the bio-state of a sample.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Named {
    pub name: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tissue {
    pub external_name: Option<String>,
    pub replicate: Option<String>,
    pub donor: Donor,
    pub spatial_location: SpatialLocation,
    pub fixative: Named,
    pub medium: Named,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub id: i64,
    pub section: Option<i32>,
    pub bio_state: Named,
    pub tissue: Tissue,
}
