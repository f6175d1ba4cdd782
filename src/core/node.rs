//! Host-facing item loop
//!
//! The workflow host exposes its parameters through [`NodeParameters`] and
//! receives one [`ItemOutput`] per input item, tagged with the item index.

use std::collections::HashMap;

use log::{error, warn};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::client::{DownloadClient, UploadClient};
use crate::core::engine::TransferEngine;
use crate::core::error::Result;
use crate::core::request::TransferRequest;
use crate::core::result::TransferResult;

/// Per-item parameter accessor provided by the host
pub trait NodeParameters {
    /// Value of parameter `name` for item `item_index`, if set
    fn get(&self, name: &str, item_index: usize) -> Option<Value>;
}

/// The same parameters for every item
impl NodeParameters for HashMap<String, Value> {
    fn get(&self, name: &str, _item_index: usize) -> Option<Value> {
        HashMap::get(self, name).cloned()
    }
}

/// One parameter object per item
impl NodeParameters for [Map<String, Value>] {
    fn get(&self, name: &str, item_index: usize) -> Option<Value> {
        <[Map<String, Value>]>::get(self, item_index)
            .and_then(|item| item.get(name))
            .cloned()
    }
}

impl NodeParameters for Vec<Map<String, Value>> {
    fn get(&self, name: &str, item_index: usize) -> Option<Value> {
        NodeParameters::get(self.as_slice(), name, item_index)
    }
}

/// Which input item an output belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairedItem {
    pub item: usize,
}

/// Payload of an item output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemPayload {
    Transfer(TransferResult),
    /// Raised error captured because the host continues on failure
    Failed { error: String },
}

/// Output record for one input item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutput {
    pub json: ItemPayload,
    #[serde(rename = "pairedItem")]
    pub paired_item: PairedItem,
}

impl ItemOutput {
    pub fn new(json: ItemPayload, item_index: usize) -> Self {
        Self {
            json,
            paired_item: PairedItem { item: item_index },
        }
    }
}

/// Run every item through the engine, one after the other.
///
/// A raised error stops the run unless `continue_on_fail` is set, in which case
/// it is recorded as `{ "error": ... }` for that item and the loop moves on.
pub async fn execute_items<D, U, P>(
    engine: &TransferEngine<D, U>,
    params: &P,
    item_count: usize,
    continue_on_fail: bool,
) -> Result<Vec<ItemOutput>>
where
    D: DownloadClient,
    U: UploadClient,
    P: NodeParameters + ?Sized,
{
    let mut outputs = Vec::with_capacity(item_count);

    for item_index in 0..item_count {
        let outcome = match TransferRequest::from_parameters(params, item_index) {
            Ok(request) => engine.execute(&request).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => outputs.push(ItemOutput::new(ItemPayload::Transfer(result), item_index)),
            Err(e) if continue_on_fail => {
                warn!("Item {item_index} failed, continuing: {e}");
                outputs.push(ItemOutput::new(
                    ItemPayload::Failed {
                        error: e.to_string(),
                    },
                    item_index,
                ));
            }
            Err(e) => {
                error!("Item {item_index} failed: {e}");
                return Err(e);
            }
        }
    }

    Ok(outputs)
}
