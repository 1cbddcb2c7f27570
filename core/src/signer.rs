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

use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the context this signer works with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Load the credential, or return the cached one if it's still valid.
    ///
    /// Returns `None` if the provider has nothing or what it has is not usable.
    pub async fn credential(&self) -> Result<Option<K>> {
        let cached = self.credential.lock().expect("lock poisoned").clone();
        if cached.is_valid() {
            return Ok(cached);
        }

        let loaded = self
            .loader
            .provide_credential(&self.ctx)
            .await?
            .filter(|cred| cred.is_valid());
        *self.credential.lock().expect("lock poisoned") = loaded.clone();
        Ok(loaded)
    }

    /// Signing request.
    pub async fn sign(&self, req: &mut http::request::Parts) -> Result<()> {
        let Some(cred) = self.credential().await? else {
            return Err(Error::credential_invalid(
                "no valid credential available to sign the request",
            ));
        };

        self.builder.sign_request(&self.ctx, req, &cred).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use async_trait::async_trait;
    use http::request::Parts;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug)]
    struct TestCredential(String);

    impl SigningCredential for TestCredential {
        fn is_valid(&self) -> bool {
            !self.0.is_empty()
        }
    }

    #[derive(Debug, Default)]
    struct CountingLoader {
        value: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProvideCredential for CountingLoader {
        type Credential = TestCredential;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(TestCredential(self.value.clone())))
        }
    }

    #[derive(Debug)]
    struct HeaderSigner;

    #[async_trait]
    impl SignRequest for HeaderSigner {
        type Credential = TestCredential;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut Parts,
            cred: &Self::Credential,
        ) -> Result<()> {
            req.headers.insert("x-test-signature", cred.0.parse()?);
            Ok(())
        }
    }

    fn parts() -> Parts {
        http::Request::builder()
            .uri("https://example.com")
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn test_signer_caches_valid_credential() -> Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = CountingLoader {
            value: "abc".to_string(),
            calls: calls.clone(),
        };
        let signer = Signer::new(Context::new(), loader, HeaderSigner);

        let mut req = parts();
        signer.sign(&mut req).await?;
        signer.sign(&mut req).await?;

        assert_eq!(req.headers["x-test-signature"], "abc");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_signer_rejects_invalid_credential() {
        let loader = CountingLoader::default();
        let signer = Signer::new(Context::new(), loader, HeaderSigner);

        assert!(signer
            .credential()
            .await
            .expect("load must succeed")
            .is_none());

        let mut req = parts();
        let err = signer.sign(&mut req).await.expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        assert!(req.headers.get("x-test-signature").is_none());
    }
}
