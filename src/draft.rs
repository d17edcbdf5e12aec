//! Autosaved contents of the half-filled "new schedule" form.
//!
//! The draft is written on every edit, offered back when the form is opened
//! again, and cleared once the form is submitted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::Store;

/// Store key for the form draft.
pub const FORM_DRAFT_KEY: &str = "formDraft";

/// Raw, unvalidated form fields as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDraft {
    #[serde(default)]
    pub machine_name: String,
    #[serde(default)]
    pub last_serviced_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_frequency: Option<String>,
}

impl FormDraft {
    pub fn is_empty(&self) -> bool {
        self.machine_name.is_empty()
            && self.last_serviced_date.is_empty()
            && self.usage_frequency.as_deref().map_or(true, str::is_empty)
    }
}

#[derive(Debug)]
pub struct DraftSlot<S> {
    store: S,
}

impl<S: Store> DraftSlot<S> {
    pub fn new(store: S) -> Self {
        DraftSlot { store }
    }

    /// The stored draft, if any. A cleared slot reads as `None`.
    pub fn load(&self) -> Result<Option<FormDraft>> {
        match self.store.get(FORM_DRAFT_KEY)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => {
                let draft = serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
                    key: FORM_DRAFT_KEY.to_string(),
                    message: e.to_string(),
                })?;
                Ok(Some(draft))
            }
        }
    }

    /// Stores `draft`. An empty draft clears the slot.
    pub fn save(&mut self, draft: &FormDraft) -> Result<()> {
        if draft.is_empty() {
            return self.clear();
        }
        let value = serde_json::to_value(draft).map_err(StoreError::from)?;
        self.store.set(FORM_DRAFT_KEY, &value)?;
        debug!(machine = %draft.machine_name, "form draft saved");
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.set(FORM_DRAFT_KEY, &Value::Null)?;
        Ok(())
    }
}
