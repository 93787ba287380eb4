//! Orchestrates structural validation, signatory recovery, ACC consultation,
//! per-method authorization, and DataServer dispatch for a single RPC.

use bubble_guardian_types::{BubbleError, ContentId, Hex20, Method, RequestParams, SignableRequest};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::chain_view::{ChainView, ChainViewError};
use crate::data_server::{DataServer, DataServerError, SubscriptionListener};
use crate::sig;
use crate::subscription::ProtectedSubscription;

/// Configuration a `Guardian` is constructed with: its two collaborators
/// and the provider identifier matched against `bubble`-type delegations.
pub struct Guardian<C: ChainView, D: DataServer> {
    chain_view: Arc<C>,
    data_server: Arc<D>,
    host_domain: String,
}

impl<C: ChainView + 'static, D: DataServer> Guardian<C, D> {
    pub fn new(chain_view: Arc<C>, data_server: Arc<D>, host_domain: impl Into<String>) -> Self {
        Guardian {
            chain_view,
            data_server,
            host_domain: host_domain.into(),
        }
    }

    fn validate_structure(method: Method, params: &RequestParams) -> Result<(), BubbleError> {
        if params.nonce.is_empty() {
            return Err(BubbleError::invalid_method_params("nonce must not be empty"));
        }
        if matches!(method, Method::Write | Method::Append) && params.data.is_none() {
            return Err(BubbleError::invalid_method_params(format!(
                "{method} requires \"data\""
            )));
        }
        if method == Method::Unsubscribe && params.subscription_id.is_none() {
            return Err(BubbleError::invalid_method_params(
                "unsubscribe requires \"subscriptionId\"",
            ));
        }
        Ok(())
    }

    fn build_signable_request(method: Method, params: &RequestParams) -> SignableRequest {
        SignableRequest {
            version: params.version.unwrap_or(0),
            method: method.as_wire_str().to_string(),
            timestamp: params.timestamp,
            nonce: params.nonce.clone(),
            chain_id: params.chain_id,
            contract: params.contract,
            file: params.file.clone().unwrap_or_default(),
            data: params.data.clone().unwrap_or_default(),
            options: params
                .options
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "{}".to_string()),
        }
    }

    fn map_chain_view_error(err: ChainViewError) -> BubbleError {
        match err {
            ChainViewError::Reverted => {
                BubbleError::MethodFailed("Blockchain reverted. Is this an Access Control Contract?".into())
            }
            ChainViewError::Unavailable(_) => {
                BubbleError::InternalError("Blockchain unavailable - please try again later.".into())
            }
        }
    }

    /// Runs the full pipeline for one RPC. `raw_signature` is the request's
    /// `signature` field, still in its wire shape (possibly legacy v0).
    #[tracing::instrument(skip_all, err, fields(method = %method, chain_id = params.chain_id))]
    pub async fn post(
        &self,
        method: Method,
        params: RequestParams,
        raw_signature: Value,
        subscription_listener: Option<Arc<dyn SubscriptionListener>>,
    ) -> Result<Value, BubbleError> {
        // Step 1: structural validation.
        Self::validate_structure(method, &params)?;

        // `ping` needs no authorization and no collaborator I/O: a pure
        // liveness probe, the one method the dispatch table never lists.
        if method == Method::Ping {
            return Ok(json!({ "pong": true }));
        }

        // Step 2: `unsubscribe` returns immediately, no chain consultation.
        if method == Method::Unsubscribe {
            let subscription_id = params
                .subscription_id
                .clone()
                .expect("validated non-empty above");
            return self
                .data_server
                .unsubscribe(subscription_id, params.options.clone())
                .await
                .map_err(DataServerError::into_bubble_error);
        }

        // Step 3: canonicalize + validate the contract address.
        let contract: Hex20 = params.contract;
        if !self.chain_view.validate_contract(&contract.to_lowercase_hex()) {
            return Err(BubbleError::invalid_method_params("invalid contract address"));
        }

        // Step 4: parse the filename.
        let mut filename = bubble_guardian_types::BubbleFilename::parse(params.file_or_root())
            .map_err(|e| BubbleError::invalid_method_params_with_cause("malformed file", e))?;

        // Step 5: chain id must match.
        if params.chain_id != self.chain_view.get_chain_id() {
            return Err(BubbleError::BlockchainNotSupported);
        }

        // Step 6: recover the effective signatory (outer signer, or the
        // delegator behind a valid, relevant, non-revoked delegation).
        let signable = Self::build_signable_request(method, &params);
        let content_id = ContentId::new(params.chain_id, contract, self.host_domain.clone());
        // Delegation expiry is judged against wall-clock now, never the
        // request's own (client-chosen, signed) timestamp: a delegate
        // holding an expired delegation could otherwise backdate
        // `params.timestamp` to keep it looking relevant forever.
        let now_secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock is after the unix epoch")
            .as_secs();
        let signer = sig::resolve_effective_signatory(
            &signable,
            params.version.is_some(),
            &raw_signature,
            params.signature_prefix.as_deref(),
            self.chain_view.as_ref(),
            &content_id,
            now_secs,
        )
        .await?;

        // Step 7: consult the ACC.
        let permission_bits = self
            .chain_view
            .get_permissions(contract, signer, filename.permissioned_part())
            .await
            .map_err(Self::map_chain_view_error)?;

        // Step 8: `getPermissions` bypasses every other rule.
        if method == Method::GetPermissions {
            return Ok(Value::String(permission_bits.to_lowercase_hex()));
        }

        // Step 9: attach permissions.
        filename.set_permissions(permission_bits);

        // Step 10: termination bit branch.
        if permission_bits.bubble_terminated() {
            if method == Method::Terminate {
                return self
                    .data_server
                    .terminate(contract, params.options.clone())
                    .await
                    .map_err(DataServerError::into_bubble_error);
            }
            // Best-effort teardown; outcome is irrelevant to the caller.
            let _ = self.data_server.terminate(contract, None).await;
            return Err(BubbleError::BubbleTerminated);
        }

        // Step 11: re-validate now that permissions are attached.
        if !filename.is_valid() {
            return Err(BubbleError::PermissionDenied("malformed file".into()));
        }

        // Step 12: per-method dispatch.
        let full_filename = filename.full_filename();
        let options = params.options.clone();

        let result = match method {
            Method::Create => {
                if !filename.is_root() || !permission_bits.can_write() {
                    return Err(BubbleError::PermissionDenied("create denied".into()));
                }
                self.data_server.create(contract, options).await
            }
            Method::Write => {
                let data = params.data.clone().expect("validated above");
                if !filename.is_file() || !permission_bits.can_write() {
                    return Err(BubbleError::PermissionDenied("write denied".into()));
                }
                self.data_server.write(contract, full_filename, data, options).await
            }
            Method::Append => {
                let data = params.data.clone().expect("validated above");
                if !filename.is_file() || !(permission_bits.can_append() || permission_bits.can_write()) {
                    return Err(BubbleError::PermissionDenied("append denied".into()));
                }
                self.data_server.append(contract, full_filename, data, options).await
            }
            Method::Read => {
                if !permission_bits.can_read() {
                    return Err(BubbleError::PermissionDenied("read denied".into()));
                }
                if filename.is_directory() {
                    self.data_server.list(contract, full_filename, options).await
                } else {
                    self.data_server.read(contract, full_filename, options).await
                }
            }
            Method::Delete => {
                if filename.is_root() || !permission_bits.can_write() {
                    return Err(BubbleError::PermissionDenied("delete denied".into()));
                }
                self.data_server.delete(contract, full_filename, options).await
            }
            Method::Mkdir => {
                if filename.is_root() || !filename.is_directory() || !permission_bits.can_write() {
                    return Err(BubbleError::PermissionDenied("mkdir denied".into()));
                }
                self.data_server.mkdir(contract, full_filename, options).await
            }
            Method::List => {
                if !permission_bits.can_read() {
                    return Err(BubbleError::PermissionDenied("list denied".into()));
                }
                self.data_server.list(contract, full_filename, options).await
            }
            Method::Subscribe => {
                if !permission_bits.can_read() {
                    return Err(BubbleError::PermissionDenied("subscribe denied".into()));
                }
                let inner = subscription_listener
                    .ok_or_else(|| BubbleError::invalid_method_params("subscribe requires a listener"))?;
                let wrapped: Arc<dyn SubscriptionListener> = Arc::new(ProtectedSubscription::new(
                    self.chain_view.clone(),
                    contract,
                    filename.permissioned_part(),
                    signer,
                    inner,
                ));
                self.data_server
                    .subscribe(contract, full_filename, wrapped, options)
                    .await
            }
            Method::Terminate => {
                // Reached only when the termination bit is unset.
                return Err(BubbleError::PermissionDenied("not terminated".into()));
            }
            Method::GetPermissions | Method::Unsubscribe | Method::Ping => {
                unreachable!("handled earlier in the pipeline")
            }
        };

        result.map_err(DataServerError::into_bubble_error)
    }
}
