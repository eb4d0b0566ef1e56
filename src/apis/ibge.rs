use crate::error::Result;
use crate::geo::{GeoSource, StateEntry};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument};

/// Client for the IBGE localities service.
pub struct IbgeClient {
    client: reqwest::Client,
    base_url: String,
}

impl IbgeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn states_url(&self) -> String {
        format!("{}/estados?orderBy=nome", self.base_url)
    }

    fn municipalities_url(&self) -> String {
        format!("{}/municipios", self.base_url)
    }
}

#[async_trait::async_trait]
impl GeoSource for IbgeClient {
    #[instrument(skip(self))]
    async fn fetch_states(&self) -> Result<Vec<StateEntry>> {
        let states: Vec<StateEntry> = self
            .client
            .get(self.states_url())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!("Fetched {} states", states.len());
        Ok(states)
    }

    #[instrument(skip(self))]
    async fn fetch_municipalities(&self) -> Result<Vec<Value>> {
        let municipalities: Vec<Value> = self
            .client
            .get(self.municipalities_url())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!("Fetched {} municipalities", municipalities.len());
        Ok(municipalities)
    }
}
