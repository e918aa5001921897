use axl::cli::{as_str_pairs, resolve_connection, ArgumentParser, ConnectionFlags, DefaultProfileLoader};
use axl::error::Result;
use axl::output::OutputEnvelope;
use axl::sql::SqlStatement;
use axl::{soap, AxlOperations, AxlResult, AxlTransport};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "axl")]
#[command(about = "Cisco Unified CM AXL client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    /// CUCM publisher host name or address
    #[arg(long, global = true)]
    host: Option<String>,

    /// AXL user
    #[arg(long, global = true)]
    user: Option<String>,

    /// AXL password
    #[arg(long, global = true)]
    pass: Option<String>,

    /// AXL schema version, e.g. 12.5
    #[arg(long = "axl-version", global = true)]
    axl_version: Option<String>,

    /// Profile from ~/.axl/profiles.toml
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Full endpoint URL instead of https://{host}:8443/axl/
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Accept self-signed server certificates
    #[arg(long, global = true)]
    insecure: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run any AXL operation with a raw inner body
    Run {
        /// Verb, e.g. get, list, add
        method: String,
        /// Entity, e.g. line, phone
        #[arg(value_name = "TYPE")]
        entity: String,
        /// Inner XML body
        #[arg(long, default_value = "")]
        body: String,
    },

    /// Add a record from a JSON object
    Add {
        #[arg(value_name = "TYPE")]
        entity: String,
        #[arg(long)]
        json: String,
    },

    /// Get a record by key=value criteria
    Get {
        #[arg(value_name = "TYPE")]
        entity: String,
        criteria: Vec<String>,
    },

    /// List records matching key=value criteria
    List {
        #[arg(value_name = "TYPE")]
        entity: String,
        criteria: Vec<String>,
        /// Field to return (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
    },

    /// Remove a record by key=value criteria
    Remove {
        #[arg(value_name = "TYPE")]
        entity: String,
        criteria: Vec<String>,
    },

    /// Run SQL against the CUCM database (sent as written)
    Sql {
        #[command(subcommand)]
        command: SqlCommands,
    },

    /// LDAP directory synchronization
    Ldap {
        #[command(subcommand)]
        command: LdapCommands,
    },
}

#[derive(Subcommand)]
enum SqlCommands {
    Query { sql: String },
    Update { sql: String },
}

#[derive(Subcommand)]
enum LdapCommands {
    Sync { name: String },
    Status { name: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let started = Instant::now();

    let envelope = match execute(&cli).await {
        Ok((endpoint, operation, result)) => OutputEnvelope::from_result(
            &endpoint,
            &operation,
            result,
            Some(started.elapsed().as_millis() as u64),
        ),
        Err(err) => OutputEnvelope::from_error(&err),
    };

    match envelope.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => println!(
            "{{\"ok\":false,\"error\":{{\"code\":\"EXECUTION_FAILED\",\"message\":\"{}\"}}}}",
            e
        ),
    }

    if !envelope.ok {
        std::process::exit(1);
    }
}

async fn execute(cli: &Cli) -> Result<(String, String, AxlResult)> {
    let args = &cli.connection;
    let flags = ConnectionFlags {
        host: args.host.clone(),
        user: args.user.clone(),
        pass: args.pass.clone(),
        version: args.axl_version.clone(),
        profile: args.profile.clone(),
        endpoint: args.endpoint.clone(),
        timeout_secs: args.timeout,
        insecure: args.insecure,
    };
    let resolved = resolve_connection(&flags, &DefaultProfileLoader)?;
    let defaults = resolved.defaults;
    let transport = AxlTransport::with_options(resolved.config, resolved.options)?;
    info!("AXL endpoint {}", transport.endpoint());

    let (method, entity, result) = match &cli.command {
        Commands::Run { method, entity, body } => {
            let result = transport.run(method, entity, body).await?;
            (method.as_str(), entity.as_str(), result)
        }
        Commands::Add { entity, json } => {
            let mut details = ArgumentParser::parse_details(json)?;
            defaults.apply_to(entity, &mut details);
            let uuid = transport.add(entity, &details).await?;
            ("add", entity.as_str(), AxlResult::Scalar(uuid))
        }
        Commands::Get { entity, criteria } => {
            let pairs = ArgumentParser::parse_pairs(criteria)?;
            let record = transport.get(entity, &as_str_pairs(&pairs)).await?;
            ("get", entity.as_str(), AxlResult::Record(record))
        }
        Commands::List {
            entity,
            criteria,
            tags,
        } => {
            let pairs = ArgumentParser::parse_pairs(criteria)?;
            let tags = tags.iter().map(String::as_str).collect::<Vec<_>>();
            let rows = transport.list(entity, &as_str_pairs(&pairs), &tags).await?;
            ("list", entity.as_str(), AxlResult::Rows(rows))
        }
        Commands::Remove { entity, criteria } => {
            let pairs = ArgumentParser::parse_pairs(criteria)?;
            let uuid = transport.remove(entity, &as_str_pairs(&pairs)).await?;
            ("remove", entity.as_str(), AxlResult::Scalar(uuid))
        }
        Commands::Sql { command } => match command {
            SqlCommands::Query { sql } => {
                let rows = transport.sql_query(&SqlStatement::unchecked(sql)).await?;
                ("execute", "SQLQuery", AxlResult::Rows(rows))
            }
            SqlCommands::Update { sql } => {
                let count = transport.sql_update(&SqlStatement::unchecked(sql)).await?;
                let mut record = Map::new();
                record.insert("rowsUpdated".to_string(), Value::from(count));
                ("execute", "SQLUpdate", AxlResult::Record(record))
            }
        },
        Commands::Ldap { command } => match command {
            LdapCommands::Sync { name } => {
                let message = transport.do_ldap_sync(name, true).await?;
                ("do", "ldapSync", AxlResult::Scalar(message))
            }
            LdapCommands::Status { name } => {
                let message = transport.get_ldap_sync_status(name).await?;
                ("get", "ldapSyncStatus", AxlResult::Scalar(message))
            }
        },
    };

    Ok((
        transport.endpoint().to_string(),
        soap::method_type(method, entity),
        result,
    ))
}
