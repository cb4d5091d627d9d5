//! Request coordinator for the Frontline pipeline.
//!
//! The coordinator is the entry point the HTTP layer talks to. It:
//! 1. Loads the reference directory once at start-up
//! 2. Selects the operating mode
//! 3. Normalizes each request into a case
//! 4. Dispatches the requested action to the stage workflow
//!
//! # Architecture
//!
//! ```text
//! EmergencyRequest { action, case_data }
//!      │
//!      ▼
//! ┌─────────────────┐
//! │   Coordinator   │  ◄── ModeSelector, ServiceDirectory
//! │   (this crate)  │
//! └────────┬────────┘
//!          │ Normalizer
//!          ▼
//!   EmergencyWorkflow
//!   triage ─▶ guidance ─▶ booking ─▶ followup
//! ```

pub mod config;
pub mod coordinator;
pub mod data_loader;
pub mod mode;
pub mod routing;

pub use config::{CoordinatorConfig, DataConfig, ModeConfig};
pub use coordinator::{AgentCheck, Coordinator, SelfTestReport};
pub use data_loader::load_directory;
pub use mode::{ModeSelector, ModeSetting, OperatingMode, SystemStatus};
pub use routing::{Action, CaseData, EmergencyRequest, EmergencyResponse, ParseRequest, ParseResponse};
