//! Infrastructure layer: WebSocket transport, session state and config files.

pub mod channel_sink;
pub mod session;
pub mod storage;
pub mod transport;

pub use channel_sink::ChannelSink;
pub use session::{FrameSink, SessionController, SessionState};
pub use storage::{load_config, ConfigError};
pub use transport::{build_request, connect_and_run, run_receive_loop, ReceiveOptions, WsSink, AUTH_HEADER};
