use anyhow::{bail, Context, Result};
use http::header::{HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN};
use rusoto_core::Region;
use std::env;

use crate::ec2_instance_client::region_from_name;

const REGIONS_VAR: &str = "INSTANCE_REGIONS";
const TAG_KEY_VAR: &str = "SHIFT_TAG_KEY";
const ALLOWED_ORIGIN_VAR: &str = "ALLOWED_ORIGIN";
const DEFAULT_TAG_KEY: &str = "Shift";
const ALL_REGIONS: &str = "all";

/// Which regions a list request covers.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionScope {
    Home,
    Listed(Vec<Region>),
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub regions: RegionScope,
    pub tag_key: String,
    pub headers: HeaderMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            regions: RegionScope::Home,
            tag_key: DEFAULT_TAG_KEY.to_string(),
            headers: HeaderMap::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let regions = match value(REGIONS_VAR) {
            None => RegionScope::Home,
            Some(regions) if regions.eq_ignore_ascii_case(ALL_REGIONS) => RegionScope::All,
            Some(regions) => RegionScope::Listed(
                parse_regions(&regions).with_context(|| format!("invalid {}", REGIONS_VAR))?,
            ),
        };

        let tag_key = value(TAG_KEY_VAR).unwrap_or_else(|| DEFAULT_TAG_KEY.to_string());

        let mut headers = HeaderMap::new();
        if let Some(origin) = value(ALLOWED_ORIGIN_VAR) {
            let origin = HeaderValue::from_str(&origin)
                .with_context(|| format!("invalid {}: {:?}", ALLOWED_ORIGIN_VAR, origin))?;
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }

        Ok(Config {
            regions,
            tag_key,
            headers,
        })
    }
}

fn parse_regions(regions: &str) -> Result<Vec<Region>> {
    let mut parsed = Vec::new();
    for name in regions.split(',').map(str::trim) {
        if name.is_empty() || name.contains(char::is_whitespace) {
            bail!("region name {:?} is not valid", name);
        }
        parsed.push(region_from_name(name));
    }
    Ok(parsed)
}
