//! Balance service client: one GET per lookup against the
//! environment-selected endpoint.

use crate::balance::record::{parse_balance_body, BalanceRecord};
use crate::config::{BalanceServiceConfig, Environment};
use reqwest::header::{ACCEPT, CONTENT_TYPE};

#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    #[error("balance request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("balance service error: {0}")]
    Api(String),
    #[error("balance response parse error: {0}")]
    Parse(String),
}

/// Client for the hour-bank balance HTTP service.
#[derive(Clone)]
pub struct BalanceClient {
    environment: Environment,
    prod_base_url: String,
    dev_base_url: String,
    client: reqwest::Client,
}

impl BalanceClient {
    pub fn new(environment: Environment, config: &BalanceServiceConfig) -> Self {
        Self {
            environment,
            prod_base_url: config.prod_base_url.trim_end_matches('/').to_string(),
            dev_base_url: config.dev_base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Endpoint for one employee id: prod appends the id as a path segment,
    /// dev passes it as the `matricula` query parameter.
    fn lookup_url(&self, employee_id: &str) -> String {
        match self.environment {
            Environment::Prod => format!("{}/{}", self.prod_base_url, employee_id),
            Environment::Dev => format!("{}?matricula={}", self.dev_base_url, employee_id),
        }
    }

    /// Fetch the balance for one employee id (matrícula).
    pub async fn fetch_balance(&self, employee_id: &str) -> Result<BalanceRecord, BalanceError> {
        let url = self.lookup_url(employee_id);
        log::debug!("balance lookup: GET {}", url);
        let res = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json, text/plain, */*")
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(BalanceError::Api(format!("{} {}", status, body)));
        }
        let body = res.text().await?;
        parse_balance_body(&body).map_err(BalanceError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_config() -> BalanceServiceConfig {
        BalanceServiceConfig {
            prod_base_url: "https://horas.example.test/api/saldo".to_string(),
            dev_base_url: "http://127.0.0.1:3000/saldo".to_string(),
        }
    }

    #[test]
    fn prod_url_appends_path_segment() {
        let c = BalanceClient::new(Environment::Prod, &service_config());
        assert_eq!(
            c.lookup_url("12345"),
            "https://horas.example.test/api/saldo/12345"
        );
    }

    #[test]
    fn dev_url_uses_matricula_query() {
        let c = BalanceClient::new(Environment::Dev, &service_config());
        assert_eq!(c.lookup_url("12345"), "http://127.0.0.1:3000/saldo?matricula=12345");
    }

    #[test]
    fn trailing_slash_in_base_url_is_trimmed() {
        let mut cfg = service_config();
        cfg.prod_base_url.push('/');
        let c = BalanceClient::new(Environment::Prod, &cfg);
        assert_eq!(
            c.lookup_url("7"),
            "https://horas.example.test/api/saldo/7"
        );
    }
}
