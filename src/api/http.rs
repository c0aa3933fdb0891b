use crate::api::{CreateVersionRequest, Operation, ResourceApi};
use crate::domain::{ResourceId, ResourceKind, Version};
use crate::error::{ReleaseError, Result};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ProductResource {
    #[serde(default)]
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NeuronVersionList {
    #[serde(default)]
    neuron_versions: Vec<NeuronVersionResource>,
}

#[derive(Debug, Deserialize)]
struct NeuronVersionResource {
    #[serde(default)]
    version: String,
}

#[derive(Debug, Serialize)]
struct ProductVersionPatch<'a> {
    name: &'a str,
    version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NeuronVersionBody<'a> {
    commit_sha: &'a str,
    proto_commit_sha: &'a str,
}

/// Blocking JSON client for the Products and Operations services
pub struct HttpResourceApi {
    client: Client,
    products_endpoint: String,
    operations_endpoint: String,
    token: Option<String>,
}

impl HttpResourceApi {
    pub fn new(
        products_endpoint: impl Into<String>,
        operations_endpoint: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(HttpResourceApi {
            client,
            products_endpoint: normalize(products_endpoint.into()),
            operations_endpoint: normalize(operations_endpoint.into()),
            token,
        })
    }

    fn products_url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.products_endpoint, path)
    }

    fn operations_url(&self, name: &str) -> String {
        format!("{}/v1/{}", self.operations_endpoint, name)
    }

    fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send()?;
        let status = response.status();
        let url = response.url().to_string();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReleaseError::transport(format!(
                "{} returned {}: {}",
                url,
                status,
                body.trim()
            )));
        }

        let body = response.text()?;
        log::debug!("{} -> {}", url, body);
        serde_json::from_str(&body).map_err(|e| {
            ReleaseError::transport(format!("unexpected response from {}: {}", url, e))
        })
    }
}

fn normalize(endpoint: String) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Highest version in a listing, by semantic-version ordering
fn latest<'a>(versions: impl IntoIterator<Item = &'a str>) -> Result<Option<Version>> {
    let mut parsed = Vec::new();
    for raw in versions {
        parsed.push(Version::parse(raw)?);
    }
    Ok(parsed
        .into_iter()
        .max_by(|a, b| semver::Version::from(*a).cmp(&semver::Version::from(*b))))
}

impl ResourceApi for HttpResourceApi {
    fn current_version(&self, resource: &ResourceId) -> Result<Option<Version>> {
        let name = resource.resource_name();
        match resource.kind() {
            ResourceKind::Product => {
                let product: ProductResource =
                    self.execute(self.client.get(self.products_url(&name)))?;
                if product.version.is_empty() {
                    Ok(None)
                } else {
                    Version::parse(&product.version).map(Some)
                }
            }
            ResourceKind::Neuron => {
                let url = self.products_url(&format!("{}/versions", name));
                let list: NeuronVersionList = self.execute(self.client.get(url))?;
                latest(list.neuron_versions.iter().map(|v| v.version.as_str()))
            }
            ResourceKind::Organisation => Err(ReleaseError::invalid_argument(format!(
                "{} is not versioned",
                name
            ))),
        }
    }

    fn create_version(&self, request: &CreateVersionRequest) -> Result<Operation> {
        let name = request.resource.resource_name();
        let version = request.version.to_string();

        match request.resource.kind() {
            ResourceKind::Product => {
                let body = ProductVersionPatch {
                    name: &name,
                    version,
                };
                let builder = self
                    .client
                    .patch(self.products_url(&name))
                    .query(&[("updateMask", "version")])
                    .json(&body);
                self.execute(builder)
            }
            ResourceKind::Neuron => {
                let hash = |i: usize| request.commit_hashes.get(i).map(String::as_str).unwrap_or("");
                let body = NeuronVersionBody {
                    commit_sha: hash(0),
                    proto_commit_sha: hash(1),
                };
                let builder = self
                    .client
                    .post(self.products_url(&format!("{}/versions", name)))
                    .query(&[("neuronVersionId", version.as_str())])
                    .json(&body);
                self.execute(builder)
            }
            ResourceKind::Organisation => Err(ReleaseError::invalid_argument(format!(
                "{} is not versioned",
                name
            ))),
        }
    }

    fn get_operation(&self, name: &str) -> Result<Operation> {
        self.execute(self.client.get(self.operations_url(name)))
    }
}
