use std::sync::Arc;

use auth::{SecurityProvider, SessionManager};
use config::Config;
use services::{CategoryService, InvitationService, RsvpService};
use sms::SmsSender;

pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod sms;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionManager>,
    pub security: Arc<dyn SecurityProvider>,
    pub sms: Arc<dyn SmsSender>,
    pub categories: Arc<CategoryService>,
    pub invitations: Arc<InvitationService>,
    pub rsvps: Arc<RsvpService>,
}
