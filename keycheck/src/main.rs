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

use keycheck::aws::{Config, EnvCredentialProvider, KeyValidator};
use keycheck::default_context;
use log::debug;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let ctx = default_context();
    let config = Config::default().from_env(&ctx);
    debug!("loaded config: {config:?}");

    let validator = KeyValidator::new(ctx).with_config(config);
    match validator.validate_with(EnvCredentialProvider::new(), None).await {
        Ok(validation) => {
            println!("{validation}");
            if validation.is_valid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(err) => {
            eprintln!("Failed to check AWS keys: {:?}", anyhow::Error::from(err));
            ExitCode::from(2)
        }
    }
}
