#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod gradio;
pub mod replies;
pub mod scripted;

pub use client::PredictClient;
pub use config::RemoteConfig;
pub use endpoint::Endpoint;
pub use error::{MalformedReply, RpcError};
pub use gradio::GradioClient;
pub use scripted::{RecordedCall, ScriptedClient};
