//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod command_rx;
pub mod controller;
pub mod settings;
pub mod telemetry_tx;

pub use command_rx::command_rx_task;
pub use controller::controller_task;
pub use settings::settings_task;
pub use telemetry_tx::telemetry_tx_task;
