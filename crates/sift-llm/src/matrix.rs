//! Credential/model matrix
//!
//! The orchestrator walks a grid of `models × credentials` in a fixed order:
//! every key on the most capable model first, then every key on the next
//! model, and so on.
//!
//! ```text
//!            k0      k1      k2
//!   m0   ─► (0,0) ─► (0,1) ─► (0,2) ─┐
//!   m1   ┌─ (1,0) ◄──────────────────┘
//!        └► (1,1) ─► (1,2) ─► wraps to (0,0)
//! ```

use crate::{LlmConfig, LlmError};
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An API key plus its position in the rotation
#[derive(Debug)]
pub struct ProviderCredential {
    index: usize,
    secret: SecretString,
}

impl ProviderCredential {
    /// Wrap a raw key
    pub fn new(index: usize, secret: impl Into<String>) -> Self {
        Self {
            index,
            secret: SecretString::from(secret.into()),
        }
    }

    /// Position in the rotation
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw key, for the provider call only
    pub fn expose(&self) -> &str {
        self.secret.expose_secret()
    }
}

/// Name of a model tier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Create a new model id
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The model name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Size of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixDims {
    /// Number of credentials
    pub credentials: usize,
    /// Number of models
    pub models: usize,
}

impl MatrixDims {
    /// Total cells, i.e. attempts in one cycle
    pub fn cells(&self) -> usize {
        self.credentials * self.models
    }
}

/// Position in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatrixCursor {
    /// Index into the credential list
    pub key_index: usize,
    /// Index into the model list
    pub model_index: usize,
}

impl MatrixCursor {
    /// The first cell: best model, first key
    pub fn origin() -> Self {
        Self::default()
    }

    /// Step to the next cell in traversal order.
    ///
    /// Returns `true` when the step wrapped from the last cell back to the
    /// origin.
    pub fn advance(&mut self, dims: MatrixDims) -> bool {
        if dims.cells() == 0 {
            return true;
        }
        self.key_index += 1;
        if self.key_index < dims.credentials {
            return false;
        }
        self.advance_model(dims)
    }

    /// Skip to the next model, first key. Returns `true` on wrap-around.
    pub fn advance_model(&mut self, dims: MatrixDims) -> bool {
        self.key_index = 0;
        self.model_index += 1;
        if self.model_index < dims.models {
            return false;
        }
        self.model_index = 0;
        true
    }

    /// Clamp a cursor that no longer fits the grid back to the origin
    pub fn normalized(self, dims: MatrixDims) -> Self {
        if self.key_index < dims.credentials && self.model_index < dims.models {
            self
        } else {
            Self::origin()
        }
    }
}

/// The grid of credentials and models, plus the shared cursor
///
/// Credentials and models are immutable after construction. The cursor is
/// the only mutable state; sweeps copy it out with [`snapshot`] and write
/// their final position back with [`publish`].
///
/// [`snapshot`]: ProviderMatrix::snapshot
/// [`publish`]: ProviderMatrix::publish
#[derive(Debug)]
pub struct ProviderMatrix {
    credentials: Vec<ProviderCredential>,
    models: Vec<ModelId>,
    cursor: Mutex<MatrixCursor>,
}

impl ProviderMatrix {
    /// Build a matrix from raw keys and model names
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if either list is empty.
    pub fn new(keys: Vec<String>, models: Vec<String>) -> Result<Self, LlmError> {
        if keys.is_empty() {
            return Err(LlmError::Config("at least one API key is required".to_string()));
        }
        if models.is_empty() {
            return Err(LlmError::Config("at least one model is required".to_string()));
        }

        Ok(Self {
            credentials: keys
                .into_iter()
                .enumerate()
                .map(|(i, k)| ProviderCredential::new(i, k))
                .collect(),
            models: models.into_iter().map(ModelId::from).collect(),
            cursor: Mutex::new(MatrixCursor::origin()),
        })
    }

    /// Build a matrix from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Self::new(config.api_keys.clone(), config.models.clone())
    }

    /// Grid size
    pub fn dims(&self) -> MatrixDims {
        MatrixDims {
            credentials: self.credentials.len(),
            models: self.models.len(),
        }
    }

    /// Models in traversal order
    pub fn models(&self) -> &[ModelId] {
        &self.models
    }

    /// The cell under the shared cursor
    pub fn current(&self) -> (&ProviderCredential, &ModelId) {
        self.cell(self.snapshot())
    }

    /// The cell under an arbitrary cursor
    pub fn cell(&self, cursor: MatrixCursor) -> (&ProviderCredential, &ModelId) {
        let cursor = cursor.normalized(self.dims());
        (
            &self.credentials[cursor.key_index],
            &self.models[cursor.model_index],
        )
    }

    /// Move the shared cursor to the next key (or next model)
    pub fn advance_credential(&self) {
        let dims = self.dims();
        self.cursor.lock().advance(dims);
    }

    /// Move the shared cursor to the next model, first key
    pub fn advance_model(&self) {
        let dims = self.dims();
        self.cursor.lock().advance_model(dims);
    }

    /// Copy of the shared cursor
    pub fn snapshot(&self) -> MatrixCursor {
        *self.cursor.lock()
    }

    /// Replace the shared cursor
    pub fn publish(&self, cursor: MatrixCursor) {
        *self.cursor.lock() = cursor.normalized(self.dims());
    }

    /// Return the shared cursor to the origin
    pub fn reset(&self) {
        self.publish(MatrixCursor::origin());
    }
}
