#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod sessions;

pub use interview_core::Clock;

pub use app_services::AppServices;
pub use config::ServiceConfig;
pub use error::{
    AppServicesError, ConfigError, ControllerError, GatewayError, LogicError, ReaderError,
    ServiceError,
};
pub use gateway::{GatewayOp, HttpGateway, InMemoryGateway, InterviewGateway};
pub use identity::IdentityResolver;

pub use sessions::{
    Affordances, InterviewController, InterviewPhase, InterviewView, RoundOutcome,
    SessionListItem, SessionReader, SessionReport, StoreSnapshot,
};
