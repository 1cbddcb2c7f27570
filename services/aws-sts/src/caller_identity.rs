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

use crate::constants::{
    EMPTY_STRING_SHA256, GET_CALLER_IDENTITY, STS_API_VERSION, X_AMZ_CONTENT_SHA_256,
};
use crate::StsEndpoint;
use bytes::Bytes;
use http::StatusCode;
use keycheck_core::{Error, Result};
use quick_xml::de;
use serde::Deserialize;
use std::fmt::{self, Display, Formatter};

/// Identity returned by STS `GetCallerIdentity` for the authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// ARN of the caller, like `arn:aws:iam::123456789012:user/Alice`.
    pub arn: String,
    /// Unique id of the caller.
    pub user_id: String,
    /// Account the caller belongs to.
    pub account: String,
}

/// ServiceError is STS declining the call.
///
/// Bad keys, bad signatures and missing permissions all land here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// HTTP status returned by STS.
    pub status: StatusCode,
    /// Error code, like `InvalidClientTokenId` or `SignatureDoesNotMatch`.
    pub code: String,
    /// Human readable message from STS.
    pub message: String,
    /// Request id for support cases.
    pub request_id: Option<String>,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "An error occurred ({}) when calling the {GET_CALLER_IDENTITY} operation: {}",
            self.code, self.message
        )
    }
}

/// Build the unsigned `GetCallerIdentity` request.
pub fn build_request(endpoint: &StsEndpoint) -> Result<http::Request<Bytes>> {
    let url = format!(
        "{}/?Action={GET_CALLER_IDENTITY}&Version={STS_API_VERSION}",
        endpoint.url
    );

    http::Request::builder()
        .method(http::Method::GET)
        .uri(url.as_str())
        // Set content sha to empty string.
        .header(X_AMZ_CONTENT_SHA_256, EMPTY_STRING_SHA256)
        .body(Bytes::new())
        .map_err(|e| {
            Error::request_invalid("failed to build STS GetCallerIdentity request")
                .with_source(e)
                .with_context(format!("endpoint: {}", endpoint.url))
        })
}

/// Parse the body of a successful `GetCallerIdentity` response.
pub fn parse_identity(body: &str) -> Result<Identity> {
    let resp: GetCallerIdentityResponse = de::from_str(body).map_err(|e| {
        Error::unexpected("failed to parse STS GetCallerIdentity response")
            .with_source(e)
            .with_context(format!("response_length: {}", body.len()))
    })?;

    let result = resp.result;
    if result.arn.is_empty() {
        return Err(Error::unexpected(
            "STS GetCallerIdentity response has no Arn",
        ));
    }

    Ok(Identity {
        arn: result.arn,
        user_id: result.user_id,
        account: result.account,
    })
}

/// Parse a non-2xx STS response into a [`ServiceError`].
///
/// Bodies that aren't STS error documents (proxies, load balancers) keep
/// the status reason as code and the raw body as message.
pub fn parse_service_error(
    status: StatusCode,
    body: &str,
    request_id: Option<&str>,
) -> ServiceError {
    match de::from_str::<ErrorResponse>(body) {
        Ok(resp) if !resp.error.code.is_empty() => ServiceError {
            status,
            code: resp.error.code,
            message: resp.error.message,
            request_id: request_id
                .map(|v| v.to_string())
                .or(Some(resp.request_id).filter(|v| !v.is_empty())),
        },
        _ => ServiceError {
            status,
            code: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .replace(' ', ""),
            message: body.trim().to_string(),
            request_id: request_id.map(|v| v.to_string()),
        },
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct GetCallerIdentityResponse {
    #[serde(rename = "GetCallerIdentityResult")]
    result: GetCallerIdentityResult,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct GetCallerIdentityResult {
    arn: String,
    user_id: String,
    account: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorResponse {
    error: ErrorDetail,
    request_id: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorDetail {
    code: String,
    message: String,
}
