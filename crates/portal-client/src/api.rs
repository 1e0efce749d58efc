//! One handle for every portal API.

use std::sync::Arc;

use portal_auth::Session;

use crate::auth::AuthApi;
use crate::config::{ClientConfig, ConfigError};
use crate::resources::{
    CategoriesApi, ComplaintsApi, DepartmentsApi, InquiriesApi, LeadershipApi, NotificationsApi,
    UsersApi, VisitsApi,
};
use crate::transport::Transport;

/// Owns one [`Transport`] and hands out the per-resource APIs over it.
#[derive(Debug, Clone)]
pub struct PortalApi {
    transport: Transport,
}

impl PortalApi {
    /// Create the facade for `config` bound to `session`.
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Result<Self, ConfigError> {
        Ok(Self::from_transport(Transport::new(config, session)?))
    }

    /// Create the facade configured from the environment.
    pub fn from_env(session: Arc<Session>) -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env(), session)
    }

    /// Wrap an existing transport.
    pub fn from_transport(transport: Transport) -> Self {
        Self { transport }
    }

    /// The shared transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// The session requests authenticate with.
    pub fn session(&self) -> &Arc<Session> {
        self.transport.session()
    }

    /// `/auth`.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.transport.clone())
    }

    /// `/departments`.
    pub fn departments(&self) -> DepartmentsApi {
        DepartmentsApi::new(self.transport.clone())
    }

    /// `/categories`.
    pub fn categories(&self) -> CategoriesApi {
        CategoriesApi::new(self.transport.clone())
    }

    /// `/users`.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.transport.clone())
    }

    /// `/leadership`.
    pub fn leadership(&self) -> LeadershipApi {
        LeadershipApi::new(self.transport.clone())
    }

    /// `/complaints`.
    pub fn complaints(&self) -> ComplaintsApi {
        ComplaintsApi::new(self.transport.clone())
    }

    /// `/inquiries`.
    pub fn inquiries(&self) -> InquiriesApi {
        InquiriesApi::new(self.transport.clone())
    }

    /// `/visits`.
    pub fn visits(&self) -> VisitsApi {
        VisitsApi::new(self.transport.clone())
    }

    /// `/notifications`.
    pub fn notifications(&self) -> NotificationsApi {
        NotificationsApi::new(self.transport.clone())
    }
}
