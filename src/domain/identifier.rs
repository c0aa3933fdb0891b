use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::fmt;

const ORGANISATION_FORMAT: &str = r"^[a-z][a-z0-9]{2,7}$";
const PRODUCT_FORMAT: &str = r"^[a-z][a-z0-9]{2,7}\.[a-z]{2}$";
const NEURON_FORMAT: &str = r"^[a-z][a-z0-9]{2,7}\.[a-z]{2}\.(resources|services)-[a-z]+-v[0-9]+$";
const ANY_FORMAT: &str =
    r"^([a-z][a-z0-9]{2,7})(\.[a-z]{2})?(\.(resources|services)-[a-z]+-v[0-9]+)?$";

/// Level of the resource hierarchy an identifier points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Organisation,
    Product,
    Neuron,
}

/// A dotted resource identifier such as `alis.in.resources-events-v1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub organisation: String,
    pub product: Option<String>,
    pub neuron: Option<String>,
}

fn validate(value: &str, format: &str) -> Result<()> {
    let re = Regex::new(format)
        .map_err(|e| ReleaseError::invalid_argument(format!("bad pattern {}: {}", format, e)))?;
    if re.is_match(value) {
        Ok(())
    } else {
        Err(ReleaseError::invalid_argument(format!(
            "argument ({}) is not of the right format: {}",
            value, format
        )))
    }
}

impl ResourceId {
    /// Parse an organisation, product or neuron identifier
    pub fn parse(value: &str) -> Result<Self> {
        validate(value, ANY_FORMAT)?;

        let mut parts = value.splitn(3, '.');
        let organisation = parts.next().unwrap_or_default().to_string();
        let product = parts.next().map(str::to_string);
        let neuron = parts.next().map(str::to_string);

        Ok(ResourceId {
            organisation,
            product,
            neuron,
        })
    }

    /// Parse an identifier that must be exactly `org`
    pub fn parse_organisation(value: &str) -> Result<Self> {
        validate(value, ORGANISATION_FORMAT)?;
        Self::parse(value)
    }

    /// Parse an identifier that must be exactly `org.product`
    pub fn parse_product(value: &str) -> Result<Self> {
        validate(value, PRODUCT_FORMAT)?;
        Self::parse(value)
    }

    /// Parse an identifier that must be exactly `org.product.neuron`
    pub fn parse_neuron(value: &str) -> Result<Self> {
        validate(value, NEURON_FORMAT)?;
        Self::parse(value)
    }

    pub fn kind(&self) -> ResourceKind {
        match (&self.product, &self.neuron) {
            (Some(_), Some(_)) => ResourceKind::Neuron,
            (Some(_), None) => ResourceKind::Product,
            _ => ResourceKind::Organisation,
        }
    }

    /// Resource name as used by the remote API
    pub fn resource_name(&self) -> String {
        let mut name = format!("organisations/{}", self.organisation);
        if let Some(product) = &self.product {
            name.push_str("/products/");
            name.push_str(product);
        }
        if let Some(neuron) = &self.neuron {
            name.push_str("/neurons/");
            name.push_str(neuron);
        }
        name
    }

    /// Neuron id as a relative path: `resources-events-v1` -> `resources/events/v1`
    pub fn neuron_path(&self) -> Option<String> {
        self.neuron.as_ref().map(|n| n.replace('-', "/"))
    }

    /// Major version encoded in the neuron id suffix (`-v2` -> 2)
    pub fn neuron_major(&self) -> Option<u64> {
        self.neuron
            .as_ref()
            .and_then(|n| n.rsplit('-').next())
            .and_then(|suffix| suffix.strip_prefix('v'))
            .and_then(|digits| digits.parse().ok())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.organisation)?;
        if let Some(product) = &self.product {
            write!(f, ".{}", product)?;
        }
        if let Some(neuron) = &self.neuron {
            write!(f, ".{}", neuron)?;
        }
        Ok(())
    }
}
