use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::Event;

/// Storage keys are namespaced so the shell can map them onto whatever the
/// platform offers (localStorage, keystore, a table) without collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyNamespace {
    Session,
    Settings,
}

impl KeyNamespace {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Settings => "settings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KvKey {
    namespace: KeyNamespace,
    key: String,
}

impl KvKey {
    #[must_use]
    pub fn new(namespace: KeyNamespace, key: impl Into<String>) -> Self {
        Self {
            namespace,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn raw(&self) -> String {
        format!("{}:{}", self.namespace.prefix(), self.key)
    }

    #[must_use]
    pub const fn namespace(&self) -> KeyNamespace {
        self.namespace
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvOperation {
    Get { key: KvKey },
    Set { key: KvKey, value: Vec<u8> },
    Delete { key: KvKey },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvOutput {
    Value(Option<Vec<u8>>),
    Written,
    Deleted { existed: bool },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("storage quota exceeded")]
    QuotaExceeded,
}

pub type KvResult = Result<KvOutput, KvError>;

impl Operation for KvOperation {
    type Output = KvResult;
}

pub struct KeyValue<Ev> {
    context: CapabilityContext<KvOperation, Ev>,
}

impl<Ev> Capability<Ev> for KeyValue<Ev> {
    type Operation = KvOperation;
    type MappedSelf<MappedEv> = KeyValue<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        KeyValue::new(self.context.map_event(f))
    }
}

impl<Ev> KeyValue<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<KvOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn get<F>(&self, key: KvKey, make_event: F)
    where
        F: FnOnce(KvResult) -> Ev + Send + 'static,
    {
        self.request(KvOperation::Get { key }, make_event);
    }

    pub fn set<F>(&self, key: KvKey, value: Vec<u8>, make_event: F)
    where
        F: FnOnce(KvResult) -> Ev + Send + 'static,
    {
        self.request(KvOperation::Set { key, value }, make_event);
    }

    pub fn delete<F>(&self, key: KvKey, make_event: F)
    where
        F: FnOnce(KvResult) -> Ev + Send + 'static,
    {
        self.request(KvOperation::Delete { key }, make_event);
    }

    fn request<F>(&self, operation: KvOperation, make_event: F)
    where
        F: FnOnce(KvResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(operation).await;
            context.update_app(make_event(result));
        });
    }
}

pub type KvCapability = KeyValue<Event>;
