// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::Config;
use keycheck_core::{Error, Result};
use log::debug;

/// StsEndpoint is where the identity lookup is sent and which region it's
/// signed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StsEndpoint {
    /// Base url without trailing slash, like `https://sts.us-east-1.amazonaws.com`.
    pub url: String,
    /// Region used in the SigV4 credential scope.
    pub signing_region: String,
}

impl StsEndpoint {
    /// Resolve the endpoint for `region` following `config`.
    ///
    /// - `config.endpoint_url` wins if set, signed for `region`.
    /// - Regional: `sts.{region}.amazonaws.com`, or `sts.{region}.amazonaws.com.cn`
    ///   for `cn-` regions.
    /// - Global: `sts.amazonaws.com` signed for `us-east-1`. China has no
    ///   global endpoint, so `cn-` regions always go regional.
    ///
    /// ref: <https://docs.aws.amazon.com/sdkref/latest/guide/feature-sts-regionalized-endpoints.html>
    pub fn resolve(region: &str, config: &Config) -> Result<Self> {
        check_region(region)?;

        let endpoint = if let Some(url) = &config.endpoint_url {
            Self {
                url: url.trim_end_matches('/').to_string(),
                signing_region: region.to_string(),
            }
        } else if region.starts_with("cn-") {
            Self {
                url: format!("https://sts.{region}.amazonaws.com.cn"),
                signing_region: region.to_string(),
            }
        } else if config.use_regional_sts_endpoint {
            Self {
                url: format!("https://sts.{region}.amazonaws.com"),
                signing_region: region.to_string(),
            }
        } else {
            Self {
                url: "https://sts.amazonaws.com".to_string(),
                signing_region: "us-east-1".to_string(),
            }
        };

        debug!("resolved sts endpoint: {endpoint:?}");
        Ok(endpoint)
    }
}

/// Regions end up in a host name, so only `[a-z0-9-]` is accepted.
///
/// A well formed but unknown region (like `us-west-3`) passes here and fails
/// later at DNS resolution.
fn check_region(region: &str) -> Result<()> {
    if region.is_empty() {
        return Err(Error::config_invalid("region is empty"));
    }

    if !region
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err(Error::config_invalid("region contains invalid characters")
            .with_context(format!("region: {region:?}")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keycheck_core::ErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("us-east-1", true, "https://sts.us-east-1.amazonaws.com", "us-east-1"; "regional")]
    #[test_case("eu-west-3", true, "https://sts.eu-west-3.amazonaws.com", "eu-west-3"; "regional europe")]
    #[test_case("ap-south-1", false, "https://sts.amazonaws.com", "us-east-1"; "global")]
    #[test_case("cn-north-1", true, "https://sts.cn-north-1.amazonaws.com.cn", "cn-north-1"; "china regional")]
    #[test_case("cn-northwest-1", false, "https://sts.cn-northwest-1.amazonaws.com.cn", "cn-northwest-1"; "china never global")]
    fn test_resolve(region: &str, regional: bool, url: &str, signing_region: &str) {
        let config = Config {
            use_regional_sts_endpoint: regional,
            ..Default::default()
        };

        let endpoint = StsEndpoint::resolve(region, &config).expect("must resolve");
        assert_eq!(endpoint.url, url);
        assert_eq!(endpoint.signing_region, signing_region);
    }

    #[test]
    fn test_resolve_with_endpoint_url() {
        let config = Config {
            endpoint_url: Some("http://127.0.0.1:4566/".to_string()),
            ..Default::default()
        };

        let endpoint = StsEndpoint::resolve("eu-west-1", &config).expect("must resolve");
        assert_eq!(
            endpoint,
            StsEndpoint {
                url: "http://127.0.0.1:4566".to_string(),
                signing_region: "eu-west-1".to_string(),
            }
        );
    }

    #[test_case(""; "empty")]
    #[test_case("us east 1"; "spaces")]
    #[test_case("US-EAST-1"; "upper case")]
    #[test_case("us-east-1/evil"; "slash")]
    fn test_resolve_malformed_region(region: &str) {
        let err = StsEndpoint::resolve(region, &Config::default()).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
