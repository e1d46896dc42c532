/*
 *  Copyright 2025 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Outbound Notification Client
//!
//! The greeting endpoint is an external collaborator reached over HTTP. The
//! [`GreetingClient`] trait is the seam the greeter depends on; tests
//! substitute recording or failing doubles.

use async_trait::async_trait;
use url::Url;

use crate::error::ClientError;
use crate::models::greeting::GreetingPayload;

/// Side-effecting client that delivers one greeting payload.
#[async_trait]
pub trait GreetingClient: Send + Sync {
    async fn send(&self, payload: &GreetingPayload) -> Result<(), ClientError>;
}

/// HTTP implementation posting the payload as JSON to a webhook endpoint.
pub struct HttpGreetingClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpGreetingClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl GreetingClient for HttpGreetingClient {
    async fn send(&self, payload: &GreetingPayload) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Rejected(format!(
                "status {}",
                response.status()
            )));
        }

        Ok(())
    }
}
