// Network template binding endpoints
//
// Unbind/bind are the only two calls in the whole surface whose failure is
// fatal to an orchestration run, so they stay small and obvious.

use tracing::debug;

use crate::client::DashboardClient;
use crate::error::Error;
use crate::models::{BindRequest, UnbindRequest};

impl DashboardClient {
    /// Unbind a network from its configuration template.
    ///
    /// `POST /networks/{networkId}/unbind`
    pub async fn unbind_network(
        &self,
        network_id: &str,
        retain_configs: bool,
    ) -> Result<(), Error> {
        let url = self.url(&format!("networks/{network_id}/unbind"))?;
        debug!(network_id, retain_configs, "unbinding network from template");
        self.post(url, &UnbindRequest { retain_configs }).await
    }

    /// Bind a network to a configuration template.
    ///
    /// `POST /networks/{networkId}/bind`
    pub async fn bind_network(&self, network_id: &str, template_id: &str) -> Result<(), Error> {
        let url = self.url(&format!("networks/{network_id}/bind"))?;
        debug!(network_id, template_id, "binding network to template");
        let body = BindRequest {
            config_template_id: template_id.to_owned(),
        };
        self.post(url, &body).await
    }
}
