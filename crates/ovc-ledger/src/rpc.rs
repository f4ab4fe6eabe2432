//! HTTP RPC transport to a real ledger gateway.
//!
//! The gateway exposes the same narrow surface the trait defines: submit a
//! mutating call, look up a transaction's effects, run a read simulation.
//! Addresses and payload bytes travel as hex strings.

use async_trait::async_trait;
use ovc_types::Address;
use ovc_wire::ReturnValue;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::call::{CallArg, CreatedObject, MutationCall, ReadQuery, TxEffects, TxHandle};
use crate::error::{LedgerError, LedgerResult};
use crate::traits::LedgerTransport;

/// Ledger transport over an HTTP RPC gateway.
pub struct RpcTransport {
    base: String,
    sender: Address,
    http: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest {
    sender: String,
    entry: String,
    args: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct SubmitResponse {
    digest: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EffectsResponse {
    status: String,
    #[serde(default)]
    created: Vec<CreatedDto>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDto {
    address: String,
    type_tag: String,
}

#[derive(Deserialize)]
struct SimulateResponse {
    results: Vec<TupleDto>,
}

#[derive(Deserialize)]
struct TupleDto {
    bytes: String,
    tag: String,
}

impl RpcTransport {
    /// Create a transport against `base`, signing as `sender`.
    pub fn new(base: impl Into<String>, sender: Address) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self {
            base,
            sender,
            http: reqwest::Client::new(),
        }
    }

    fn wire_arg(arg: &CallArg) -> serde_json::Value {
        match arg {
            CallArg::Str(s) => json!({ "type": "string", "value": s }),
            CallArg::Object(a) => json!({ "type": "object", "value": a.to_hex() }),
            CallArg::Objects(v) => json!({
                "type": "objects",
                "value": v.iter().map(Address::to_hex).collect::<Vec<_>>(),
            }),
        }
    }

    fn wire_query(query: &ReadQuery) -> serde_json::Value {
        match query {
            ReadQuery::Repository { repo } => {
                json!({ "kind": "repository", "repo": repo.to_hex() })
            }
            ReadQuery::BranchHead { repo, branch } => {
                json!({ "kind": "branchHead", "repo": repo.to_hex(), "branch": branch })
            }
            ReadQuery::Version { commit } => {
                json!({ "kind": "version", "commit": commit.to_hex() })
            }
            ReadQuery::RepositoriesByOwner { owner } => {
                json!({ "kind": "repositoriesByOwner", "owner": owner.to_hex() })
            }
        }
    }
}

#[async_trait]
impl LedgerTransport for RpcTransport {
    async fn submit(&self, call: MutationCall) -> LedgerResult<TxHandle> {
        let body = SubmitRequest {
            sender: self.sender.to_hex(),
            entry: call.entry.clone(),
            args: call.args.iter().map(Self::wire_arg).collect(),
        };
        let response = self
            .http
            .post(format!("{}/v1/transactions", self.base))
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::FORBIDDEN {
            let reason = response.text().await.unwrap_or_default();
            return Err(LedgerError::PermissionDenied(reason));
        }
        if response.status().is_client_error() {
            let reason = response.text().await.unwrap_or_default();
            return Err(LedgerError::Rejected(reason));
        }
        if !response.status().is_success() {
            return Err(LedgerError::Transport(format!(
                "gateway returned {}",
                response.status()
            )));
        }
        let reply: SubmitResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        Ok(TxHandle::new(reply.digest))
    }

    async fn effects(&self, handle: &TxHandle) -> LedgerResult<Option<TxEffects>> {
        let response = self
            .http
            .get(format!(
                "{}/v1/transactions/{}/effects",
                self.base, handle.digest
            ))
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(LedgerError::Transport(format!(
                "gateway returned {}",
                response.status()
            )));
        }
        let reply: EffectsResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        match reply.status.as_str() {
            "pending" => Ok(None),
            "rejected" => Err(LedgerError::Rejected(
                reply.error.unwrap_or_else(|| "unspecified".into()),
            )),
            "executed" => {
                let created = reply
                    .created
                    .into_iter()
                    .map(|c| {
                        Ok(CreatedObject {
                            address: Address::from_hex(&c.address).map_err(|e| {
                                LedgerError::Transport(format!("bad effect address: {e}"))
                            })?,
                            type_tag: c.type_tag,
                        })
                    })
                    .collect::<LedgerResult<Vec<_>>>()?;
                Ok(Some(TxEffects { created }))
            }
            other => Err(LedgerError::Transport(format!(
                "unknown transaction status {other:?}"
            ))),
        }
    }

    async fn simulate(&self, query: ReadQuery) -> LedgerResult<Vec<ReturnValue>> {
        let response = self
            .http
            .post(format!("{}/v1/simulate", self.base))
            .json(&Self::wire_query(&query))
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::NotFound(format!("{query:?}")));
        }
        if !response.status().is_success() {
            return Err(LedgerError::Transport(format!(
                "gateway returned {}",
                response.status()
            )));
        }
        let reply: SimulateResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        reply
            .results
            .into_iter()
            .map(|t| {
                let bytes = hex::decode(t.bytes.trim_start_matches("0x"))
                    .map_err(|e| LedgerError::Transport(format!("bad tuple bytes: {e}")))?;
                Ok(ReturnValue::new(bytes, t.tag))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_args_render_hex_addresses() {
        let arg = RpcTransport::wire_arg(&CallArg::Object(Address::from_raw([0xab; 32])));
        assert_eq!(arg["type"], "object");
        assert!(arg["value"].as_str().unwrap().starts_with("0xabab"));
    }

    #[test]
    fn effects_response_parses_all_statuses() {
        let pending: EffectsResponse = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert_eq!(pending.status, "pending");
        assert!(pending.created.is_empty());

        let executed: EffectsResponse = serde_json::from_str(
            r#"{"status":"executed","created":[{"address":"0x00","typeTag":"t"}]}"#,
        )
        .unwrap();
        assert_eq!(executed.created.len(), 1);

        let rejected: EffectsResponse =
            serde_json::from_str(r#"{"status":"rejected","error":"no"}"#).unwrap();
        assert_eq!(rejected.error.as_deref(), Some("no"));
    }

    #[test]
    fn base_url_is_normalized() {
        let t = RpcTransport::new("http://rpc.example///", Address::null());
        assert_eq!(t.base, "http://rpc.example");
    }
}
