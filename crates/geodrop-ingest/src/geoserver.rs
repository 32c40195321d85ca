//! GeoServer REST client
//!
//! Publishes a zipped shapefile as a layer through four REST calls against
//! a fixed workspace and datastore:
//!
//! 1. Delete the layer if it already exists (republish replaces, never errors)
//! 2. Create the shapefile datastore unless it is already there
//! 3. PUT the zip archive into the datastore
//! 4. Register the feature type unless GeoServer already did it implicitly
//!
//! Every step must succeed before the next runs; the first failure aborts
//! the publish. Request and response bodies are XML, authentication is
//! HTTP basic.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::config::GeoServerConfig;

/// Failure at one step of the publish protocol.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("{step} request failed: {source}")]
    Request {
        step: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// GeoServer answered with a status the protocol does not accept.
    #[error("{step} returned HTTP {status}: {body}")]
    UnexpectedStatus {
        step: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The archive could not be opened for streaming.
    #[error("could not read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize request body: {0}")]
    Body(String),
}

/// Client bound to one GeoServer instance, workspace and datastore.
pub struct GeoServerClient {
    http: Client,
    base_url: String,
    workspace: String,
    datastore: String,
    username: String,
    password: String,
    srs: String,
}

impl GeoServerClient {
    pub fn new(config: &GeoServerConfig) -> Result<Self, PublishError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| PublishError::Request {
                step: "client setup",
                source,
            })?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            workspace: config.workspace.clone(),
            datastore: config.datastore.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            srs: config.srs.clone(),
        })
    }

    /// Publish `archive_path` as `layer_name`, replacing any previous
    /// version of the layer. Steps run strictly in order and the first
    /// failure aborts the rest.
    pub async fn publish_layer(
        &self,
        archive_path: &Path,
        layer_name: &str,
    ) -> Result<(), PublishError> {
        info!(layer = layer_name, archive = %archive_path.display(), "publishing layer");

        self.remove_existing_layer(layer_name).await?;
        self.ensure_datastore(archive_path).await?;
        self.upload_archive(archive_path).await?;
        self.register_feature_type(layer_name).await?;

        info!(layer = layer_name, "layer published");
        Ok(())
    }

    /// Step 1: drop the layer if a previous publish left one behind.
    async fn remove_existing_layer(&self, layer_name: &str) -> Result<(), PublishError> {
        let url = self.layer_url(layer_name);
        let response = self.send("layer lookup", self.request(Method::GET, &url)).await?;

        match response.status() {
            StatusCode::OK => {
                info!(layer = layer_name, "existing layer found, removing before republish");
                let deleted = self
                    .send("layer removal", self.request(Method::DELETE, &url))
                    .await?;
                if deleted.status().is_success() {
                    info!(layer = layer_name, "existing layer removed");
                    Ok(())
                } else {
                    Err(Self::unexpected_status("layer removal", deleted).await)
                }
            }
            StatusCode::NOT_FOUND => {
                debug!(layer = layer_name, "no existing layer");
                Ok(())
            }
            _ => Err(Self::unexpected_status("layer lookup", response).await),
        }
    }

    /// Step 2: make sure the shapefile datastore exists.
    async fn ensure_datastore(&self, archive_path: &Path) -> Result<(), PublishError> {
        let url = self.datastore_url();
        let response = self
            .send("datastore lookup", self.request(Method::GET, &url))
            .await?;

        match response.status() {
            StatusCode::OK => {
                debug!(datastore = %self.datastore, "datastore already exists");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                info!(datastore = %self.datastore, "datastore not found, creating");
                let body = self.datastore_body(archive_path)?;
                let created = self
                    .send(
                        "datastore creation",
                        self.request(Method::POST, &url)
                            .header(header::CONTENT_TYPE, "application/xml")
                            .body(body),
                    )
                    .await?;
                if created.status().is_success() {
                    info!(datastore = %self.datastore, "datastore created");
                    Ok(())
                } else {
                    Err(Self::unexpected_status("datastore creation", created).await)
                }
            }
            _ => Err(Self::unexpected_status("datastore lookup", response).await),
        }
    }

    /// Step 3: stream the zip into the datastore.
    async fn upload_archive(&self, archive_path: &Path) -> Result<(), PublishError> {
        let file = tokio::fs::File::open(archive_path)
            .await
            .map_err(|source| PublishError::Archive {
                path: archive_path.to_path_buf(),
                source,
            })?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let response = self
            .send(
                "archive upload",
                self.request(Method::PUT, &self.upload_url())
                    .header(header::CONTENT_TYPE, "application/zip")
                    .body(body),
            )
            .await?;

        if response.status().is_success() {
            info!(archive = %archive_path.display(), "archive uploaded to datastore");
            Ok(())
        } else {
            Err(Self::unexpected_status("archive upload", response).await)
        }
    }

    /// Step 4: register the feature type unless the upload already did.
    ///
    /// GeoServer usually creates the feature type as a side effect of the
    /// zip upload, so a 200 on the lookup means there is nothing left to
    /// do. Any other answer falls through to an explicit create.
    async fn register_feature_type(&self, layer_name: &str) -> Result<(), PublishError> {
        let lookup_url = format!("{}/{}", self.feature_types_url(), layer_name);
        let response = self
            .send("feature type lookup", self.request(Method::GET, &lookup_url))
            .await?;

        if response.status() == StatusCode::OK {
            info!(layer = layer_name, "feature type already registered");
            return Ok(());
        }
        debug!(layer = layer_name, status = %response.status(), "feature type not registered yet");

        let body = self.feature_type_body(layer_name)?;
        let created = self
            .send(
                "feature type creation",
                self.request(Method::POST, &self.feature_types_url())
                    .header(header::CONTENT_TYPE, "application/xml")
                    .body(body),
            )
            .await?;

        if created.status().is_success() {
            info!(layer = layer_name, "feature type registered");
            Ok(())
        } else {
            Err(Self::unexpected_status("feature type creation", created).await)
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
    }

    async fn send(
        &self,
        step: &'static str,
        builder: RequestBuilder,
    ) -> Result<Response, PublishError> {
        builder
            .send()
            .await
            .map_err(|source| PublishError::Request { step, source })
    }

    async fn unexpected_status(step: &'static str, response: Response) -> PublishError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        PublishError::UnexpectedStatus { step, status, body }
    }

    fn layer_url(&self, layer_name: &str) -> String {
        format!(
            "{}/workspaces/{}/layers/{}:{}",
            self.base_url, self.workspace, self.workspace, layer_name
        )
    }

    fn datastore_url(&self) -> String {
        format!(
            "{}/workspaces/{}/datastores/{}",
            self.base_url, self.workspace, self.datastore
        )
    }

    fn upload_url(&self) -> String {
        format!("{}/file.shp", self.datastore_url())
    }

    fn feature_types_url(&self) -> String {
        format!("{}/featuretypes", self.datastore_url())
    }

    fn datastore_body(&self, archive_path: &Path) -> Result<String, PublishError> {
        let body = DataStoreBody {
            name: self.datastore.clone(),
            connection_parameters: ConnectionParameters {
                entry: vec![
                    ConnectionEntry {
                        key: "url",
                        value: format!("file:{}", archive_path.display()),
                    },
                    ConnectionEntry {
                        key: "usePreparedStatements",
                        value: "true".to_string(),
                    },
                    ConnectionEntry {
                        key: "dbtype",
                        value: "shapefile".to_string(),
                    },
                ],
            },
        };
        quick_xml::se::to_string(&body).map_err(|e| PublishError::Body(e.to_string()))
    }

    fn feature_type_body(&self, layer_name: &str) -> Result<String, PublishError> {
        let body = FeatureTypeBody {
            name: layer_name.to_string(),
            native_name: layer_name.to_string(),
            srs: self.srs.clone(),
        };
        quick_xml::se::to_string(&body).map_err(|e| PublishError::Body(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "dataStore")]
struct DataStoreBody {
    name: String,
    #[serde(rename = "connectionParameters")]
    connection_parameters: ConnectionParameters,
}

#[derive(Debug, Serialize)]
struct ConnectionParameters {
    entry: Vec<ConnectionEntry>,
}

#[derive(Debug, Serialize)]
struct ConnectionEntry {
    #[serde(rename = "@key")]
    key: &'static str,
    #[serde(rename = "$text")]
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename = "featureType")]
struct FeatureTypeBody {
    name: String,
    #[serde(rename = "nativeName")]
    native_name: String,
    srs: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::GeoServerConfig;

    fn test_config() -> GeoServerConfig {
        GeoServerConfig {
            url: "http://localhost:8080/geoserver/rest/".to_string(),
            workspace: "pvlayer".to_string(),
            datastore: "pvlayer".to_string(),
            username: "admin".to_string(),
            password: "geoserver".to_string(),
            srs: "EPSG:4326".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_urls_follow_rest_layout() {
        let client = GeoServerClient::new(&test_config()).unwrap();

        assert_eq!(
            client.layer_url("roof_a"),
            "http://localhost:8080/geoserver/rest/workspaces/pvlayer/layers/pvlayer:roof_a"
        );
        assert_eq!(
            client.datastore_url(),
            "http://localhost:8080/geoserver/rest/workspaces/pvlayer/datastores/pvlayer"
        );
        assert_eq!(
            client.upload_url(),
            "http://localhost:8080/geoserver/rest/workspaces/pvlayer/datastores/pvlayer/file.shp"
        );
        assert_eq!(
            client.feature_types_url(),
            "http://localhost:8080/geoserver/rest/workspaces/pvlayer/datastores/pvlayer/featuretypes"
        );
    }

    #[test]
    fn test_datastore_body_matches_rest_contract() {
        let client = GeoServerClient::new(&test_config()).unwrap();
        let xml = client.datastore_body(Path::new("/tmp/roof_a.zip")).unwrap();

        assert_eq!(
            xml,
            "<dataStore><name>pvlayer</name><connectionParameters>\
             <entry key=\"url\">file:/tmp/roof_a.zip</entry>\
             <entry key=\"usePreparedStatements\">true</entry>\
             <entry key=\"dbtype\">shapefile</entry>\
             </connectionParameters></dataStore>"
        );
    }

    #[test]
    fn test_feature_type_body_carries_srs() {
        let client = GeoServerClient::new(&test_config()).unwrap();
        let xml = client.feature_type_body("roof_a").unwrap();

        assert_eq!(
            xml,
            "<featureType><name>roof_a</name><nativeName>roof_a</nativeName>\
             <srs>EPSG:4326</srs></featureType>"
        );
    }
}
