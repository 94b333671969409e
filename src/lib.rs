pub mod errors;
pub mod context;
pub mod path;
pub mod policy;
mod tokenizer;

pub use context::{
    destroy, set_sasl_wrap_flags, AuthFlags, AuthInfo, ConfigInfo, ConnectionContext,
    ContextHandle, LdapSession, Ownership, SaslState, ServerInfo,
};
pub use errors::{AdsError, Result};
pub use path::{build_dn, build_domain, build_path, DC_PREFIX};
pub use policy::{Policy, PolicySource, SaslWrapping};
