use std::path::PathBuf;
use std::process::ExitCode;

use ads_context::{
    build_domain, build_dn, build_path, destroy, AdsError, ConnectionContext, Policy, SaslState,
};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Directory path and connection context helper.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a distinguished name from a realm, e.g. example.com
    Dn { realm: String },
    /// Build a DNS domain from a dc= distinguished name
    Domain { dn: String },
    /// Build an LDAP path with custom separators and prefix
    Path {
        name: String,
        #[arg(long, default_value = ".")]
        sep: String,
        #[arg(long, default_value = "dc=")]
        prefix: String,
        #[arg(long)]
        reverse: bool,
    },
    /// Initialise a connection context and print it as JSON
    Context {
        #[arg(long)]
        realm: Option<String>,
        #[arg(long)]
        workgroup: Option<String>,
        #[arg(long)]
        server: Option<String>,
        /// plain, sign or seal
        #[arg(long, default_value = "plain")]
        sasl: SaslState,
        /// JSON policy file; built-in defaults when absent
        #[arg(long)]
        policy: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args.command) {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<String, AdsError> {
    match command {
        Command::Dn { realm } => build_dn(&realm),
        Command::Domain { dn } => Ok(build_domain(&dn)),
        Command::Path { name, sep, prefix, reverse } => build_path(&name, &sep, &prefix, reverse),
        Command::Context { realm, workgroup, server, sasl, policy } => {
            let policy = match policy {
                Some(file) => {
                    let text = std::fs::read_to_string(&file).map_err(|e| {
                        AdsError::Policy(format!("reading {}: {e}", file.display()))
                    })?;
                    Policy::from_json(&text)?
                }
                None => Policy::default(),
            };

            let mut ctx = ConnectionContext::init(
                realm.as_deref(),
                workgroup.as_deref(),
                server.as_deref(),
                sasl,
                &policy,
            );
            // a context without a realm is still printable
            let bind_path = ctx.derive_bind_path().map(str::to_owned).ok();
            let summary = json!({
                "ownership": ctx.ownership(),
                "bind_path": bind_path,
                "dns_domain": ctx.dns_domain(),
                "context": &*ctx,
            });
            destroy(&mut Some(ctx));

            Ok(format!("{summary:#}"))
        }
    }
}
