use serde::{Deserialize, Serialize};
use std::fmt;

/// Vsync identifier shared by compositor frames and the transactions applied in them
pub type VsyncId = i64;

/// Parser-specific extraction that avoids decoding each entry's full payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomQueryType {
    VsyncId,
    LayersIdAndName,
}

impl fmt::Display for CustomQueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomQueryType::VsyncId => write!(f, "vsync_id"),
            CustomQueryType::LayersIdAndName => write!(f, "layers_id_and_name"),
        }
    }
}

/// Custom query request handed to a parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomQuery {
    /// One vsync id per entry of the queried range
    VsyncId,
    /// Every layer (id, name) appearing in the queried range
    LayersIdAndName,
}

impl CustomQuery {
    pub fn query_type(&self) -> CustomQueryType {
        match self {
            CustomQuery::VsyncId => CustomQueryType::VsyncId,
            CustomQuery::LayersIdAndName => CustomQueryType::LayersIdAndName,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerIdAndName {
    pub id: i32,
    pub name: String,
}

/// Parser answer to a [`CustomQuery`]; one variant per query type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
#[serde(rename_all = "snake_case")]
pub enum CustomQueryResult {
    VsyncIds(Vec<VsyncId>),
    LayersIdAndName(Vec<LayerIdAndName>),
}

impl CustomQueryResult {
    pub fn query_type(&self) -> CustomQueryType {
        match self {
            CustomQueryResult::VsyncIds(_) => CustomQueryType::VsyncId,
            CustomQueryResult::LayersIdAndName(_) => CustomQueryType::LayersIdAndName,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_reports_its_query_type() {
        assert_eq!(
            CustomQueryResult::VsyncIds(vec![1, 2]).query_type(),
            CustomQuery::VsyncId.query_type()
        );
        assert_eq!(
            CustomQueryResult::LayersIdAndName(Vec::new()).query_type(),
            CustomQueryType::LayersIdAndName
        );
    }

    #[test]
    fn test_result_serialization() {
        let result = CustomQueryResult::LayersIdAndName(vec![LayerIdAndName {
            id: 3,
            name: "StatusBar".to_string(),
        }]);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"type":"layers_id_and_name","content":[{"id":3,"name":"StatusBar"}]}"#
        );
    }
}
