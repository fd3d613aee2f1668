use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use rusoto_core::Region;
use tracing::{error, info};

use crate::config::{Config, RegionScope};
use crate::ec2_instance_client::ManageInstances;
use crate::error::InstanceSchedulerError;
use crate::instance::InstanceSummary;
use crate::request::{Action, ActionRequest};
use crate::response::ResponseEnvelope;

pub struct Dispatcher<'a, C> {
    client: &'a C,
    config: &'a Config,
}

impl<'a, C: ManageInstances> Dispatcher<'a, C> {
    pub fn new(client: &'a C, config: &'a Config) -> Self {
        Dispatcher { client, config }
    }

    /// Runs one request to completion. Failures become 400/500 responses.
    pub async fn handle(&self, request: &ApiGatewayProxyRequest) -> ApiGatewayProxyResponse {
        let response = match self.dispatch(request).await {
            Ok(response) => response,
            Err(error) => {
                error!(status = error.status_code(), %error, "request failed");
                ResponseEnvelope::from(&error)
            }
        };
        response.into_proxy_response(&self.config.headers)
    }

    async fn dispatch(
        &self,
        request: &ApiGatewayProxyRequest,
    ) -> Result<ResponseEnvelope, InstanceSchedulerError> {
        let action_request = ActionRequest::parse(request)?;
        info!(
            action = ?action_request.action,
            instance_ids = ?action_request.instance_ids,
            region = ?action_request.region,
            "dispatching request"
        );

        let ids = &action_request.instance_ids;
        let region = action_request.region.as_ref();
        let suffix = region
            .map(|region| format!(" in {}", region.name()))
            .unwrap_or_default();
        match action_request.action {
            Action::List => {
                let instances = self.list_instances().await?;
                info!(count = instances.len(), "returning instances");
                ResponseEnvelope::json(&instances)
            }
            Action::Start => {
                self.client.start_instances(region, ids).await?;
                Ok(ResponseEnvelope::message(&format!(
                    "Started instances {}{}",
                    ids.join(", "),
                    suffix
                )))
            }
            Action::Stop => {
                self.client.stop_instances(region, ids).await?;
                Ok(ResponseEnvelope::message(&format!(
                    "Stopped instances {}{}",
                    ids.join(", "),
                    suffix
                )))
            }
            Action::Tag => {
                let key = &self.config.tag_key;
                let value = action_request.tag_value.as_deref().unwrap_or("None");
                self.client.tag_instances(region, ids, key, value).await?;
                Ok(ResponseEnvelope::message(&format!(
                    "Successfully tagged instances with {}={}",
                    key, value
                )))
            }
        }
    }

    async fn list_instances(&self) -> Result<Vec<InstanceSummary>, InstanceSchedulerError> {
        match self.config.regions {
            RegionScope::Home => self.client.list_instances(None).await,
            RegionScope::Listed(ref regions) => self.list_instances_in(regions).await,
            RegionScope::All => {
                let regions = self.client.list_regions().await?;
                self.list_instances_in(&regions).await
            }
        }
    }

    // Sequential; the first failing region aborts the whole listing.
    async fn list_instances_in(
        &self,
        regions: &[Region],
    ) -> Result<Vec<InstanceSummary>, InstanceSchedulerError> {
        let mut instances = Vec::new();
        for region in regions {
            info!(region = region.name(), "listing instances");
            instances.extend(self.client.list_instances(Some(region)).await?);
        }
        Ok(instances)
    }
}
