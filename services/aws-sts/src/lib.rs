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

//! Check AWS access keys with a single STS `GetCallerIdentity` call.
//!
//! The call is signed with AWS SigV4 and sent through the HTTP client held by
//! [`keycheck_core::Context`].

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::RequestSigner;

mod endpoint;
pub use endpoint::StsEndpoint;

mod caller_identity;
pub use caller_identity::{Identity, ServiceError};

mod validate;
pub use validate::{test_keys, InvalidReason, KeyValidator, Validation};
