mod http;
mod kv;
mod navigate;

pub use self::http::{
    Http, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpResult, DEFAULT_TIMEOUT_MS,
};
pub use self::kv::{KeyNamespace, KeyValue, KvError, KvKey, KvOperation, KvOutput, KvResult};
pub use self::navigate::{Navigate, NavigateOperation};

// Crux's built-in Render capability is used directly; it already does
// everything needed to trigger view updates.
pub use crux_core::render::Render;

use crate::event::Event;

pub type AppHttp = Http<Event>;
pub type AppKv = KeyValue<Event>;
pub type AppNavigate = Navigate<Event>;
pub type AppRender = Render<Event>;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub kv: KeyValue<Event>,
    pub navigate: Navigate<Event>,
    pub render: Render<Event>,
}
