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

use crate::constants::*;
use keycheck_core::Context;

/// Config decides where the STS call goes.
///
/// The keys under test are not part of it, they come from a
/// [`ProvideCredential`](keycheck_core::ProvideCredential) instead. Fields
/// left as `None` can be filled from the environment with
/// [`Config::from_env`], values already set always win.
#[derive(Clone, Debug)]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`]
    /// - env value: [`AWS_DEFAULT_REGION`]
    pub region: Option<String>,
    /// Send the call to `sts.{region}.amazonaws.com` instead of the global
    /// `sts.amazonaws.com`.
    ///
    /// Defaults to `true`. `AWS_STS_REGIONAL_ENDPOINTS=legacy` turns it off.
    pub use_regional_sts_endpoint: bool,
    /// Full endpoint url overriding the resolved STS endpoint, like
    /// `http://127.0.0.1:4566`.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_ENDPOINT_URL_STS`]
    pub endpoint_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            use_regional_sts_endpoint: true,
            endpoint_url: None,
        }
    }
}

impl Config {
    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.region.is_none() {
            self.region = envs
                .get(AWS_REGION)
                .filter(|v| !v.is_empty())
                .or_else(|| envs.get(AWS_DEFAULT_REGION).filter(|v| !v.is_empty()))
                .cloned();
        }
        if let Some(v) = envs.get(AWS_STS_REGIONAL_ENDPOINTS) {
            self.use_regional_sts_endpoint = !v.eq_ignore_ascii_case("legacy");
        }
        if self.endpoint_url.is_none() {
            self.endpoint_url = envs
                .get(AWS_ENDPOINT_URL_STS)
                .filter(|v| !v.is_empty())
                .cloned();
        }

        self
    }

    /// Region to use, falling back to [`DEFAULT_REGION`].
    pub fn region_or_default(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }
}
