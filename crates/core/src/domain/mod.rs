mod metadata;
mod property;
mod units;

pub use metadata::{MetadataAttribute, TokenMetadata, DEFAULT_TOKEN_IMAGE};
pub use property::{Property, PropertyId, PropertyStatus, RegistrationRequest};
pub use units::{format_wei_as_eth, sum_wei};
