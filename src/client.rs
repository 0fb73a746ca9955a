use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, TransportError};

/// Something that can perform a GET and report the response status.
///
/// Each worker owns its own instance, so implementations need not be shareable.
#[async_trait]
pub trait HttpCapability: Send + 'static {
    async fn get(&mut self, url: &str) -> Result<u16, TransportError>;
}

/// [`HttpCapability`] backed by a dedicated `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(Error::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpCapability for ReqwestClient {
    async fn get(&mut self, url: &str) -> Result<u16, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();

        // Releases the connection without reading the body.
        drop(response);

        Ok(status)
    }
}
