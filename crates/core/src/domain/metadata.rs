use serde::{Deserialize, Serialize};

use super::property::Property;

/// Image shown for every minted property token unless configured otherwise.
pub const DEFAULT_TOKEN_IMAGE: &str =
    "https://ipfs.io/ipfs/bafkreie54wce72ohazvk7fvanaziuawf7yikzvezdtd5adxtz25md5rxjm";

/// Off-chain metadata document referenced by a minted token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<MetadataAttribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataAttribute {
    pub trait_type: String,
    pub value: String,
}

impl MetadataAttribute {
    pub fn new(trait_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            trait_type: trait_type.into(),
            value: value.into(),
        }
    }
}

impl TokenMetadata {
    pub fn for_property(property: &Property, image: impl Into<String>) -> Self {
        Self {
            name: format!("Property #{}", property.id),
            description: format!(
                "Real Estate Property Token - {} located in {}. This NFT represents fractional ownership of the property.",
                property.name, property.location
            ),
            image: image.into(),
            attributes: vec![
                MetadataAttribute::new("Property Name", &property.name),
                MetadataAttribute::new("Location", &property.location),
                MetadataAttribute::new("Property Value", &property.price),
                MetadataAttribute::new("Monthly Rent", &property.rent),
            ],
        }
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PropertyId, PropertyStatus};

    fn property() -> Property {
        Property {
            id: PropertyId::new(12),
            name: "Lake House".to_string(),
            location: "Pune".to_string(),
            owner_id: "OWN-9".to_string(),
            price: "1000".to_string(),
            rent: "10".to_string(),
            tenant_code: None,
            status: PropertyStatus::DataReady,
        }
    }

    #[test]
    fn test_metadata_for_property() {
        let metadata = TokenMetadata::for_property(&property(), DEFAULT_TOKEN_IMAGE);

        assert_eq!(metadata.name, "Property #12");
        assert!(metadata
            .description
            .starts_with("Real Estate Property Token - Lake House located in Pune."));
        assert_eq!(metadata.attributes.len(), 4);
        assert_eq!(metadata.attributes[2], MetadataAttribute::new("Property Value", "1000"));
        assert_eq!(metadata.attributes[3], MetadataAttribute::new("Monthly Rent", "10"));
    }

    #[test]
    fn test_metadata_json_shape() {
        let json = TokenMetadata::for_property(&property(), "ipfs://image")
            .to_pretty_json()
            .unwrap();
        assert!(json.contains("\"trait_type\": \"Location\""));
        assert!(json.contains("\"image\": \"ipfs://image\""));
    }
}
