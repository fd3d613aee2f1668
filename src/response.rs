use aws_lambda_events::apigw::ApiGatewayProxyResponse;
use aws_lambda_events::encodings::Body;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use serde_json::json;

use crate::error::{InstanceSchedulerError, STATUS_OK};

/// Status and JSON body of a response, before it becomes a proxy response.
#[derive(Debug, PartialEq)]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: String,
}

impl ResponseEnvelope {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, InstanceSchedulerError> {
        Ok(ResponseEnvelope {
            status_code: STATUS_OK,
            body: serde_json::to_string(value)?,
        })
    }

    pub fn message(message: &str) -> Self {
        ResponseEnvelope {
            status_code: STATUS_OK,
            body: json!({ "message": message }).to_string(),
        }
    }

    pub fn error(status_code: u16, error: &str) -> Self {
        ResponseEnvelope {
            status_code,
            body: json!({ "error": error }).to_string(),
        }
    }

    /// Always sets `Content-Type: application/json`, then applies `headers`.
    pub fn into_proxy_response(self, headers: &HeaderMap) -> ApiGatewayProxyResponse {
        let mut response = ApiGatewayProxyResponse::default();
        response.status_code = i64::from(self.status_code);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
            .headers
            .extend(headers.iter().map(|(name, value)| (name.clone(), value.clone())));
        response.body = Some(Body::Text(self.body));
        response
    }
}

impl From<&InstanceSchedulerError> for ResponseEnvelope {
    fn from(error: &InstanceSchedulerError) -> Self {
        ResponseEnvelope::error(error.status_code(), &error.to_string())
    }
}
