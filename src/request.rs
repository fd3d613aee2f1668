use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use http::Method;
use rusoto_core::Region;
use serde::Deserialize;

use crate::ec2_instance_client::region_from_name;
use crate::error::InstanceSchedulerError;

const DEFAULT_TAG_VALUE: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    List,
    Start,
    Stop,
    Tag,
}

/// Normalized request. `region` targets a region other than the client's own.
#[derive(Debug, PartialEq)]
pub struct ActionRequest {
    pub action: Action,
    pub instance_ids: Vec<String>,
    pub tag_value: Option<String>,
    pub region: Option<Region>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionBody {
    #[serde(default)]
    instance_ids: Option<Vec<Option<String>>>,
    #[serde(default)]
    instance_id: Option<String>,
    #[serde(default)]
    shift: Option<String>,
    #[serde(default)]
    region: Option<String>,
}

impl Action {
    fn from_path(path: &str) -> Result<Self, InstanceSchedulerError> {
        let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
        match segment {
            "start" => Ok(Action::Start),
            "stop" => Ok(Action::Stop),
            "tag" => Ok(Action::Tag),
            other => Err(InstanceSchedulerError::InvalidAction(other.to_string())),
        }
    }
}

impl ActionRequest {
    pub fn parse(request: &ApiGatewayProxyRequest) -> Result<Self, InstanceSchedulerError> {
        if request.http_method == Method::GET {
            return Ok(ActionRequest {
                action: Action::List,
                instance_ids: vec![],
                tag_value: None,
                region: None,
            });
        }
        if request.http_method != Method::POST {
            return Err(InstanceSchedulerError::UnsupportedMethod(
                request.http_method.to_string(),
            ));
        }

        let action = Action::from_path(request.path.as_deref().unwrap_or(""))?;
        let body = parse_body(request.body.as_deref())?;
        let instance_ids = normalize_instance_ids(body.instance_ids, body.instance_id);
        if instance_ids.is_empty() {
            return Err(InstanceSchedulerError::MissingInstanceIds);
        }
        let tag_value = match action {
            Action::Tag => Some(body.shift.unwrap_or_else(|| DEFAULT_TAG_VALUE.to_string())),
            _ => None,
        };
        let region = body
            .region
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(region_from_name);
        Ok(ActionRequest {
            action,
            instance_ids,
            tag_value,
            region,
        })
    }
}

fn parse_body(body: Option<&str>) -> Result<ActionBody, InstanceSchedulerError> {
    match body.map(str::trim) {
        None | Some("") => Ok(ActionBody::default()),
        Some(body) => Ok(serde_json::from_str(body)?),
    }
}

/// Prefers a non-empty `instanceIds` list over a single `instanceId`, dropping blank entries.
fn normalize_instance_ids(
    instance_ids: Option<Vec<Option<String>>>,
    instance_id: Option<String>,
) -> Vec<String> {
    let candidates = match instance_ids {
        Some(ids) if !ids.is_empty() => ids,
        _ => vec![instance_id],
    };
    candidates
        .into_iter()
        .flatten()
        .filter(|id| !id.is_empty())
        .collect()
}
