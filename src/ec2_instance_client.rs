use async_trait::async_trait;
use rusoto_core::Region;
use rusoto_ec2::{
    CreateTagsRequest, DescribeInstancesRequest, DescribeRegionsRequest, Ec2, Ec2Client,
    StartInstancesRequest, StopInstancesRequest, Tag,
};
use std::convert::TryFrom;
use std::str::FromStr;
use tracing::info;

use crate::error::InstanceSchedulerError;
use crate::instance::InstanceSummary;

/// Compute management operations the dispatcher relies on. A `None` region
/// means the client's own region.
#[async_trait]
pub trait ManageInstances {
    async fn list_instances(
        &self,
        region: Option<&Region>,
    ) -> Result<Vec<InstanceSummary>, InstanceSchedulerError>;
    async fn list_regions(&self) -> Result<Vec<Region>, InstanceSchedulerError>;
    async fn start_instances(
        &self,
        region: Option<&Region>,
        instance_ids: &[String],
    ) -> Result<(), InstanceSchedulerError>;
    async fn stop_instances(
        &self,
        region: Option<&Region>,
        instance_ids: &[String],
    ) -> Result<(), InstanceSchedulerError>;
    async fn tag_instances(
        &self,
        region: Option<&Region>,
        instance_ids: &[String],
        key: &str,
        value: &str,
    ) -> Result<(), InstanceSchedulerError>;
}

pub struct Ec2InstanceClient {
    client: Ec2Client,
    connect: fn(Region) -> Ec2Client,
}

#[async_trait]
impl ManageInstances for Ec2InstanceClient {
    async fn list_instances(
        &self,
        region: Option<&Region>,
    ) -> Result<Vec<InstanceSummary>, InstanceSchedulerError> {
        let instances = describe_all_instances(&self.regional_client(region)).await?;
        Ok(match region {
            None => instances,
            Some(region) => instances
                .into_iter()
                .map(|instance| instance.in_region(region.name()))
                .collect(),
        })
    }

    async fn list_regions(&self) -> Result<Vec<Region>, InstanceSchedulerError> {
        let result = self
            .client
            .describe_regions(DescribeRegionsRequest::default())
            .await?;
        Ok(result
            .regions
            .unwrap_or_default()
            .into_iter()
            .filter_map(|region| region.region_name)
            .map(|name| region_from_name(&name))
            .collect())
    }

    async fn start_instances(
        &self,
        region: Option<&Region>,
        instance_ids: &[String],
    ) -> Result<(), InstanceSchedulerError> {
        self.regional_client(region)
            .start_instances(StartInstancesRequest {
                instance_ids: instance_ids.to_vec(),
                ..StartInstancesRequest::default()
            })
            .await?;
        info!(?instance_ids, ?region, "started instances");
        Ok(())
    }

    async fn stop_instances(
        &self,
        region: Option<&Region>,
        instance_ids: &[String],
    ) -> Result<(), InstanceSchedulerError> {
        self.regional_client(region)
            .stop_instances(StopInstancesRequest {
                instance_ids: instance_ids.to_vec(),
                ..StopInstancesRequest::default()
            })
            .await?;
        info!(?instance_ids, ?region, "stopped instances");
        Ok(())
    }

    async fn tag_instances(
        &self,
        region: Option<&Region>,
        instance_ids: &[String],
        key: &str,
        value: &str,
    ) -> Result<(), InstanceSchedulerError> {
        self.regional_client(region)
            .create_tags(CreateTagsRequest {
                resources: instance_ids.to_vec(),
                tags: vec![Tag {
                    key: Some(key.to_string()),
                    value: Some(value.to_string()),
                }],
                ..CreateTagsRequest::default()
            })
            .await?;
        info!(?instance_ids, ?region, key, value, "tagged instances");
        Ok(())
    }
}

impl Ec2InstanceClient {
    pub fn new(region: Region) -> Self {
        Ec2InstanceClient::new_with_client(Ec2Client::new(region), Ec2Client::new)
    }

    pub fn new_with_client(client: Ec2Client, connect: fn(Region) -> Ec2Client) -> Self {
        Ec2InstanceClient { client, connect }
    }

    fn regional_client(&self, region: Option<&Region>) -> Ec2Client {
        match region {
            None => self.client.clone(),
            Some(region) => (self.connect)(region.clone()),
        }
    }
}

async fn describe_all_instances(
    client: &Ec2Client,
) -> Result<Vec<InstanceSummary>, InstanceSchedulerError> {
    let mut summaries = Vec::<InstanceSummary>::new();
    let mut next_token: Option<String> = None;
    loop {
        let request = DescribeInstancesRequest {
            next_token: next_token.take(),
            ..DescribeInstancesRequest::default()
        };
        let result = client.describe_instances(request).await?;

        for reservation in result.reservations.unwrap_or_default() {
            for instance in reservation.instances.unwrap_or_default() {
                summaries.push(InstanceSummary::try_from(instance)?);
            }
        }

        match result.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => return Ok(summaries),
        }
    }
}

/// Resolves a region name, falling back to the standard EC2 endpoint for
/// regions this SDK release does not know about.
pub fn region_from_name(name: &str) -> Region {
    Region::from_str(name).unwrap_or_else(|_| Region::Custom {
        name: name.to_string(),
        endpoint: format!("https://ec2.{}.amazonaws.com", name),
    })
}

#[cfg(test)]
mod tests {
    use crate::ec2_instance_client::{region_from_name, Ec2InstanceClient, ManageInstances};
    use crate::instance::InstanceSummary;
    use rusoto_core::Region;
    use rusoto_ec2::Ec2Client;
    use rusoto_mock::{
        MockCredentialsProvider, MockRequestDispatcher, MockResponseReader,
        MultipleMockRequestDispatcher, ReadMockResponse,
    };

    fn mock_client(status: u16, directory: &str, file: &str) -> Ec2Client {
        Ec2Client::new_with(
            MockRequestDispatcher::with_status(status)
                .with_body(&*MockResponseReader::read_response(directory, file)),
            MockCredentialsProvider,
            Region::UsEast1,
        )
    }

    fn describe_instances_client(_: Region) -> Ec2Client {
        mock_client(200, "test_resources/valid", "describe_instances.xml")
    }

    fn start_instances_client(_: Region) -> Ec2Client {
        mock_client(200, "test_resources/valid", "start_instances.xml")
    }

    fn unreachable_client(_: Region) -> Ec2Client {
        mock_client(500, "test_resources/error", "ec2_error.xml")
    }

    #[tokio::test]
    async fn test_list_instances() {
        let client = Ec2InstanceClient::new_with_client(
            describe_instances_client(Region::UsEast1),
            unreachable_client,
        );
        let result = client.list_instances(None).await;

        assert_eq!(
            result.unwrap(),
            [
                InstanceSummary {
                    id: "i-1234567890abcdef0".to_string(),
                    name: "web-1".to_string(),
                    instance_type: "t2.micro".to_string(),
                    state: "running".to_string(),
                    region: None,
                },
                InstanceSummary {
                    id: "i-0598c7d356eba48d7".to_string(),
                    name: "Unnamed".to_string(),
                    instance_type: "t3.small".to_string(),
                    state: "stopped".to_string(),
                    region: None,
                }
            ]
        );
    }

    #[tokio::test]
    async fn test_list_instances_follows_next_token() {
        let pages = MultipleMockRequestDispatcher::new(vec![
            MockRequestDispatcher::default().with_body(&*MockResponseReader::read_response(
                "test_resources/valid",
                "describe_instances_first_page.xml",
            )),
            MockRequestDispatcher::default().with_body(&*MockResponseReader::read_response(
                "test_resources/valid",
                "describe_instances.xml",
            )),
        ]);
        let client = Ec2InstanceClient::new_with_client(
            Ec2Client::new_with(pages, MockCredentialsProvider, Region::UsEast1),
            unreachable_client,
        );
        let result = client.list_instances(None).await.unwrap();

        assert_eq!(
            result
                .iter()
                .map(|instance| instance.id.as_str())
                .collect::<Vec<_>>(),
            vec![
                "i-0a1b2c3d4e5f60718",
                "i-1234567890abcdef0",
                "i-0598c7d356eba48d7"
            ]
        );
        assert_eq!(result[0].name, "batch-1");
    }

    #[tokio::test]
    async fn test_list_instances_in_region() {
        let client = Ec2InstanceClient::new_with_client(
            unreachable_client(Region::UsEast1),
            describe_instances_client,
        );
        let result = client.list_instances(Some(&Region::EuWest1)).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result
            .iter()
            .all(|instance| instance.region.as_deref() == Some("eu-west-1")));
    }

    #[tokio::test]
    async fn test_list_instances_error() {
        let client = Ec2InstanceClient::new_with_client(
            unreachable_client(Region::UsEast1),
            unreachable_client,
        );
        let result = client.list_instances(None).await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().status_code(), 500);
    }

    #[tokio::test]
    async fn test_list_regions() {
        let client = Ec2InstanceClient::new_with_client(
            mock_client(200, "test_resources/valid", "describe_regions.xml"),
            unreachable_client,
        );
        let result = client.list_regions().await;

        assert_eq!(
            result.unwrap(),
            vec![
                Region::ApNortheast1,
                Region::UsEast1,
                region_from_name("mars-north-1")
            ]
        );
    }

    #[tokio::test]
    async fn test_start_instances() {
        let client = Ec2InstanceClient::new_with_client(
            mock_client(200, "test_resources/valid", "start_instances.xml"),
            unreachable_client,
        );
        let result = client
            .start_instances(None, &["i-1234567890abcdef0".to_string()])
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_start_instances_in_region() {
        let client = Ec2InstanceClient::new_with_client(
            unreachable_client(Region::UsEast1),
            start_instances_client,
        );
        let result = client
            .start_instances(Some(&Region::EuWest1), &["i-1234567890abcdef0".to_string()])
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_stop_instances() {
        let client = Ec2InstanceClient::new_with_client(
            mock_client(200, "test_resources/valid", "stop_instances.xml"),
            unreachable_client,
        );
        let result = client
            .stop_instances(None, &["i-1234567890abcdef0".to_string()])
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_stop_instances_error() {
        let client = Ec2InstanceClient::new_with_client(
            mock_client(400, "test_resources/error", "ec2_error.xml"),
            unreachable_client,
        );
        let result = client.stop_instances(None, &["i-missing".to_string()]).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_tag_instances() {
        let client = Ec2InstanceClient::new_with_client(
            mock_client(200, "test_resources/valid", "create_tags.xml"),
            unreachable_client,
        );
        let result = client
            .tag_instances(
                None,
                &["i-1234567890abcdef0".to_string()],
                "Shift",
                "night",
            )
            .await;

        assert!(result.is_ok());
    }

    #[test]
    fn test_region_from_name() {
        assert_eq!(region_from_name("ap-northeast-1"), Region::ApNortheast1);
        assert_eq!(
            region_from_name("mars-north-1"),
            Region::Custom {
                name: "mars-north-1".to_string(),
                endpoint: "https://ec2.mars-north-1.amazonaws.com".to_string(),
            }
        );
    }
}
