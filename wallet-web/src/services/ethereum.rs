//! Injected Ethereum Provider (EIP-1193) via wasm-bindgen
//!
//! Implements [`ProviderGateway`] over `window.ethereum`. Requests go through
//! `ethereum.request({ method, params })`; events are delivered through
//! `ethereum.on` and released with `ethereum.removeListener` using the exact
//! function object that was registered.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Function, Promise, Reflect};
use lib_session::provider::{
    EventListener, ListenerId, TransactionReceipt, TransactionRequest,
};
use lib_session::{ProviderError, ProviderEvent, ProviderEventKind, ProviderGateway};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

type JsListener = Closure<dyn FnMut(JsValue)>;

/// `window.ethereum` as a [`ProviderGateway`].
pub struct BrowserProvider {
    ethereum: JsValue,
    receipt_poll_interval_ms: u32,
    listeners: RefCell<HashMap<ListenerId, JsListener>>,
    next_listener_id: Cell<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    status: Option<String>,
}

impl BrowserProvider {
    /// The injected provider, or `None` when no wallet extension is installed.
    pub fn detect(receipt_poll_interval_ms: u32) -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_null() || ethereum.is_undefined() {
            log::warn!("window.ethereum not found");
            return None;
        }

        Some(Self {
            ethereum,
            receipt_poll_interval_ms,
            listeners: RefCell::new(HashMap::new()),
            next_listener_id: Cell::new(1),
        })
    }

    fn method(&self, name: &str) -> Result<Function, ProviderError> {
        Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| ProviderError::new(format!("ethereum.{} is unavailable", name)))
    }

    async fn request(&self, method: &str, params: Value) -> Result<JsValue, ProviderError> {
        let request = json!({ "method": method, "params": params });
        // Objects must reach the provider as plain JS objects, not Maps.
        let request = request
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| ProviderError::new(format!("Failed to encode {}: {}", method, e)))?;

        let promise = self
            .method("request")?
            .call1(&self.ethereum, &request)
            .map_err(js_error)?
            .dyn_into::<Promise>()
            .map_err(|_| ProviderError::new(format!("{} did not return a Promise", method)))?;

        JsFuture::from(promise).await.map_err(js_error)
    }

    async fn request_as<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ProviderError> {
        let result = self.request(method, params).await?;
        serde_wasm_bindgen::from_value(result)
            .map_err(|e| ProviderError::new(format!("Unexpected {} response: {}", method, e)))
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt, ProviderError> {
        loop {
            let receipt: Option<RawReceipt> = self
                .request_as("eth_getTransactionReceipt", json!([hash]))
                .await?;

            match receipt {
                Some(receipt) => {
                    let transaction_hash = receipt
                        .transaction_hash
                        .parse()
                        .map_err(|e| ProviderError::new(format!("Invalid transaction hash: {}", e)))?;
                    return Ok(TransactionReceipt {
                        transaction_hash,
                        status: receipt.status.as_deref() == Some("0x1"),
                    });
                }
                None => TimeoutFuture::new(self.receipt_poll_interval_ms).await,
            }
        }
    }
}

#[async_trait(?Send)]
impl ProviderGateway for BrowserProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.request_as("eth_requestAccounts", json!([])).await
    }

    async fn network_id(&self) -> Result<u64, ProviderError> {
        let raw: String = self.request_as("net_version", json!([])).await?;
        parse_network_id(&raw)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ProviderError> {
        let raw: String = self
            .request_as("eth_getBalance", json!([address, "latest"]))
            .await?;
        raw.parse()
            .map_err(|e| ProviderError::new(format!("Invalid balance {:?}: {}", raw, e)))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        let raw: String = self
            .request_as("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await?;
        raw.parse()
            .map_err(|e| ProviderError::new(format!("Invalid call result {:?}: {}", raw, e)))
    }

    async fn send(&self, request: TransactionRequest) -> Result<TransactionReceipt, ProviderError> {
        let raw: String = self
            .request_as("eth_sendTransaction", json!([request]))
            .await?;
        let hash: B256 = raw
            .parse()
            .map_err(|e| ProviderError::new(format!("Invalid transaction hash {:?}: {}", raw, e)))?;
        log::info!("Transaction {} submitted, waiting for receipt", hash);
        self.wait_for_receipt(hash).await
    }

    fn add_listener(
        &self,
        kind: ProviderEventKind,
        listener: EventListener,
    ) -> Result<ListenerId, ProviderError> {
        let closure = JsListener::new(move |value: JsValue| {
            let event = match kind {
                ProviderEventKind::AccountsChanged => ProviderEvent::AccountsChanged(accounts_from_js(&value)),
                ProviderEventKind::ChainChanged => ProviderEvent::ChainChanged,
            };
            listener(event);
        });

        self.method("on")?
            .call2(
                &self.ethereum,
                &JsValue::from_str(kind.as_str()),
                closure.as_ref().unchecked_ref(),
            )
            .map_err(js_error)?;

        let id = ListenerId(self.next_listener_id.get());
        self.next_listener_id.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, closure);
        log::debug!("Registered {} listener {:?}", kind.as_str(), id);
        Ok(id)
    }

    fn remove_listener(&self, kind: ProviderEventKind, id: ListenerId) {
        let Some(closure) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };

        let removed = self.method("removeListener").and_then(|remove| {
            remove
                .call2(
                    &self.ethereum,
                    &JsValue::from_str(kind.as_str()),
                    closure.as_ref().unchecked_ref(),
                )
                .map_err(js_error)
        });
        if let Err(e) = removed {
            log::warn!("Failed to remove {} listener: {}", kind.as_str(), e);
        }
    }
}

/// Parse a network id given in decimal or `0x` hex.
pub fn parse_network_id(raw: &str) -> Result<u64, ProviderError> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| ProviderError::new(format!("Invalid network id {:?}: {}", raw, e)))
}

fn accounts_from_js(value: &JsValue) -> Vec<String> {
    if !Array::is_array(value) {
        return Vec::new();
    }
    Array::from(value).iter().filter_map(|item| item.as_string()).collect()
}

/// Convert a rejected request into a [`ProviderError`], keeping the EIP-1193 code.
fn js_error(value: JsValue) -> ProviderError {
    let code = Reflect::get(&value, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64);
    let message = Reflect::get(&value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value));

    match code {
        Some(code) => ProviderError::with_code(code, message),
        None => ProviderError::new(message),
    }
}
