//! Connection context for a single Active Directory connection.
//!
//! The context carries server identity, authentication mode and session
//! tuning. Transport code fills in further fields once it connects; nothing
//! here touches the network.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::errors::{AdsError, Result};
use crate::path::{build_dn, build_domain};
use crate::policy::PolicySource;

bitflags! {
    /// Authentication mode and SASL wrap flags of a connection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct AuthFlags: u32 {
        const DISABLE_KERBEROS = 0x0001;
        const NO_BIND = 0x0002;
        const ANON_BIND = 0x0004;
        const SIMPLE_BIND = 0x0008;
        const ALLOW_NTLMSSP = 0x0010;
        const SASL_SIGN = 0x0020;
        const SASL_SEAL = 0x0040;
        const SASL_FORCE = 0x0080;
        const USER_CREDS = 0x0100;

        const SASL_WRAP = Self::SASL_SIGN.bits() | Self::SASL_SEAL.bits();
    }
}

/// Protection requested by the caller on top of the configured wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaslState {
    #[default]
    Plain,
    Sign,
    Seal,
}

impl SaslState {
    pub fn flags(self) -> AuthFlags {
        match self {
            SaslState::Plain => AuthFlags::empty(),
            SaslState::Sign => AuthFlags::SASL_SIGN,
            SaslState::Seal => AuthFlags::SASL_SEAL,
        }
    }
}

impl FromStr for SaslState {
    type Err = AdsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(SaslState::Plain),
            "sign" => Ok(SaslState::Sign),
            "seal" => Ok(SaslState::Seal),
            other => Err(AdsError::InvalidInput(format!("unknown sasl state `{other}`"))),
        }
    }
}

/// Transport-layer state attached by the code that actually connects.
pub trait LdapSession {
    /// Closes the connection. Called once, before the context is released.
    fn disconnect(&mut self);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub realm: Option<String>,
    pub workgroup: Option<String>,
    pub ldap_server: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthInfo {
    pub flags: AuthFlags,
    pub realm: Option<String>,
    #[serde(serialize_with = "redact")]
    pub password: Option<String>,
    pub user_name: Option<String>,
    pub kdc_server: Option<String>,
    pub ccache_name: Option<String>,
}

impl fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInfo")
            .field("flags", &self.flags)
            .field("realm", &self.realm)
            .field("password", &self.password.as_ref().map(|_| "***REDACTED***"))
            .field("user_name", &self.user_name)
            .field("kdc_server", &self.kdc_server)
            .field("ccache_name", &self.ccache_name)
            .finish()
    }
}

fn redact<S: Serializer>(value: &Option<String>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(_) => serializer.serialize_some("***REDACTED***"),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigInfo {
    pub ldap_page_size: i32,
    pub bind_path: Option<String>,
    pub realm: Option<String>,
    pub ldap_server_name: Option<String>,
    pub server_site_name: Option<String>,
    pub client_site_name: Option<String>,
    pub schema_path: Option<String>,
    pub config_path: Option<String>,
}

/// Who owns the storage of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    /// Allocated by [`ConnectionContext::init`], released by [`destroy`].
    Owned,
    /// Caller storage filled by [`ConnectionContext::init_in`]; only reset by [`destroy`].
    Borrowed,
}

#[derive(Default, Serialize)]
pub struct ConnectionContext {
    pub server: ServerInfo,
    pub auth: AuthInfo,
    pub config: ConfigInfo,
    #[serde(skip)]
    session: Option<Box<dyn LdapSession>>,
}

impl fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("server", &self.server)
            .field("auth", &self.auth)
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl ConnectionContext {
    /// Allocates a fresh context owned by the returned handle.
    pub fn init(
        realm: Option<&str>,
        workgroup: Option<&str>,
        ldap_server: Option<&str>,
        sasl_state: SaslState,
        policy: &dyn PolicySource,
    ) -> ContextHandle<'static> {
        let mut ctx = Box::<ConnectionContext>::default();
        ctx.populate(realm, workgroup, ldap_server, sasl_state, policy);
        ContextHandle::Owned(ctx)
    }

    /// Resets `storage` and fills it in place. The caller keeps the storage.
    pub fn init_in<'a>(
        storage: &'a mut ConnectionContext,
        realm: Option<&str>,
        workgroup: Option<&str>,
        ldap_server: Option<&str>,
        sasl_state: SaslState,
        policy: &dyn PolicySource,
    ) -> ContextHandle<'a> {
        *storage = ConnectionContext::default();
        storage.populate(realm, workgroup, ldap_server, sasl_state, policy);
        ContextHandle::Borrowed(storage)
    }

    fn populate(
        &mut self,
        realm: Option<&str>,
        workgroup: Option<&str>,
        ldap_server: Option<&str>,
        sasl_state: SaslState,
        policy: &dyn PolicySource,
    ) {
        self.server = ServerInfo {
            realm: realm.map(str::to_owned),
            workgroup: workgroup.map(str::to_owned),
            ldap_server: ldap_server.map(str::to_owned),
        };

        let base = policy.sasl_wrapping().unwrap_or_else(|e| {
            warn!(error = %e, "sasl wrapping policy unavailable, starting without wrap flags");
            AuthFlags::empty()
        });
        self.auth.flags = base | sasl_state.flags();

        // halved by the search code on timeouts, see shrink_page_size
        self.config.ldap_page_size = policy.ldap_page_size();

        debug!(
            realm = ?self.server.realm,
            ldap_server = ?self.server.ldap_server,
            flags = ?self.auth.flags,
            page_size = self.config.ldap_page_size,
            "initialised connection context"
        );
    }

    /// Replaces the sign and seal bits with `flags`, keeping every other bit.
    pub fn set_sasl_wrap_flags(&mut self, flags: AuthFlags) {
        self.auth.flags = self.auth.flags.difference(AuthFlags::SASL_WRAP).union(flags);
    }

    pub fn attach_session(&mut self, session: Box<dyn LdapSession>) {
        if let Some(mut previous) = self.session.replace(session) {
            previous.disconnect();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn disconnect(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.disconnect();
        }
    }

    /// Sets `config.bind_path` to the DN of the configured realm, falling back
    /// to the server realm.
    pub fn derive_bind_path(&mut self) -> Result<&str> {
        let realm = [&self.config.realm, &self.server.realm]
            .into_iter()
            .flatten()
            .find(|r| !r.is_empty())
            .ok_or_else(|| AdsError::InvalidInput("no realm to derive a bind path from".into()))?;
        let dn = build_dn(realm)?;
        Ok(self.config.bind_path.insert(dn).as_str())
    }

    pub fn dns_domain(&self) -> Option<String> {
        self.config.bind_path.as_deref().map(build_domain)
    }

    /// Halves the page size after a search timeout. Never drops below one.
    pub fn shrink_page_size(&mut self) -> i32 {
        self.config.ldap_page_size = (self.config.ldap_page_size / 2).max(1);
        debug!(page_size = self.config.ldap_page_size, "reduced ldap page size");
        self.config.ldap_page_size
    }

    fn release(&mut self) {
        self.disconnect();
        *self = ConnectionContext::default();
    }
}

impl Drop for ConnectionContext {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// A live context together with who owns its storage.
#[derive(Debug)]
pub enum ContextHandle<'a> {
    Owned(Box<ConnectionContext>),
    Borrowed(&'a mut ConnectionContext),
}

impl ContextHandle<'_> {
    pub fn ownership(&self) -> Ownership {
        match self {
            ContextHandle::Owned(_) => Ownership::Owned,
            ContextHandle::Borrowed(_) => Ownership::Borrowed,
        }
    }
}

impl Deref for ContextHandle<'_> {
    type Target = ConnectionContext;

    fn deref(&self) -> &ConnectionContext {
        match self {
            ContextHandle::Owned(ctx) => ctx,
            ContextHandle::Borrowed(ctx) => ctx,
        }
    }
}

impl DerefMut for ContextHandle<'_> {
    fn deref_mut(&mut self) -> &mut ConnectionContext {
        match self {
            ContextHandle::Owned(ctx) => ctx,
            ContextHandle::Borrowed(ctx) => ctx,
        }
    }
}

/// Replaces the wrap bits of `ctx`. Returns false when there is no context.
pub fn set_sasl_wrap_flags(ctx: Option<&mut ConnectionContext>, flags: AuthFlags) -> bool {
    match ctx {
        Some(ctx) => {
            ctx.set_sasl_wrap_flags(flags);
            true
        }
        None => false,
    }
}

/// Disconnects and releases the context behind `handle`, leaving `None`.
///
/// Owned storage is freed; borrowed storage is reset to an empty context and
/// stays with the caller. Calling it again on the same handle does nothing.
pub fn destroy(handle: &mut Option<ContextHandle<'_>>) {
    let Some(handle) = handle.take() else {
        return;
    };
    let ownership = handle.ownership();
    match handle {
        ContextHandle::Owned(mut ctx) => ctx.release(),
        ContextHandle::Borrowed(ctx) => ctx.release(),
    }
    debug!(?ownership, "destroyed connection context");
}
