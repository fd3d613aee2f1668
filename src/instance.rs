use std::convert::TryFrom;

use rusoto_ec2::{Instance, Tag};
use serde::Serialize;

use crate::error::InstanceSchedulerError;

const NAME_TAG_KEY: &str = "Name";
const UNNAMED: &str = "Unnamed";
const UNKNOWN: &str = "unknown";

#[derive(Debug, PartialEq, Serialize)]
pub struct InstanceSummary {
    #[serde(rename = "InstanceId")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "InstanceType")]
    pub instance_type: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Region", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl TryFrom<Instance> for InstanceSummary {
    type Error = InstanceSchedulerError;

    fn try_from(instance: Instance) -> Result<Self, Self::Error> {
        let id = instance
            .instance_id
            .filter(|id| !id.is_empty())
            .ok_or(InstanceSchedulerError::NoneValue)?;
        Ok(InstanceSummary {
            id,
            name: display_name(instance.tags.as_deref()),
            instance_type: instance
                .instance_type
                .unwrap_or_else(|| UNKNOWN.to_string()),
            state: instance
                .state
                .and_then(|state| state.name)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            region: None,
        })
    }
}

impl InstanceSummary {
    pub fn in_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }
}

/// Value of the first `Name` tag, or `"Unnamed"`.
pub fn display_name(tags: Option<&[Tag]>) -> String {
    tags.unwrap_or_default()
        .iter()
        .find(|tag| tag.key.as_deref() == Some(NAME_TAG_KEY))
        .and_then(|tag| tag.value.clone())
        .unwrap_or_else(|| UNNAMED.to_string())
}
