use a1_core::{endpoints, PolicyTypeDefinition, PolicyTypeId, PropertyType, SchemaDefinition};
use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "a1")]
#[command(about = "A1 CLI - Policy type, instance and xApp management")]
#[command(version = a1_core::VERSION)]
struct Cli {
    /// Base URL of the A1 mediator
    #[arg(long, default_value = "http://localhost:9000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Policy type management commands
    Types {
        #[command(subcommand)]
        action: TypeAction,
    },
    /// Policy instance management commands
    Policies {
        #[command(subcommand)]
        action: PolicyAction,
    },
    /// Show the xApp bound to a policy type
    Lookup { policy_type_id: PolicyTypeId },
    /// Start the xApp bound to a policy type
    Trigger { policy_type_id: PolicyTypeId },
    /// Stop the xApp bound to a policy type
    Stop { policy_type_id: PolicyTypeId },
    /// Mediator health
    Health,
    /// Mediator statistics
    Stats,
}

#[derive(Subcommand)]
enum TypeAction {
    /// List all policy type ids
    List,
    /// Show a policy type
    Get { policy_type_id: PolicyTypeId },
    /// Create a policy type
    Create {
        policy_type_id: PolicyTypeId,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Schema property as NAME=TYPE (integer or boolean), repeatable
        #[arg(long = "property", value_name = "NAME=TYPE")]
        properties: Vec<String>,
        /// JSON schema document, instead of --property
        #[arg(long, conflicts_with = "properties")]
        schema_file: Option<PathBuf>,
    },
    /// Delete a policy type and all its instances
    Delete { policy_type_id: PolicyTypeId },
}

#[derive(Subcommand)]
enum PolicyAction {
    /// List instance ids of a policy type
    List { policy_type_id: PolicyTypeId },
    /// Show a policy instance
    Get {
        policy_type_id: PolicyTypeId,
        instance_id: String,
    },
    /// Create or replace a policy instance
    Put {
        policy_type_id: PolicyTypeId,
        instance_id: String,
        /// Instance payload as a JSON object
        #[arg(long)]
        data: String,
    },
    /// Delete a policy instance
    Delete {
        policy_type_id: PolicyTypeId,
        instance_id: String,
    },
}

/// Thin client for the mediator REST API.
struct MediatorClient {
    http: reqwest::Client,
    base_url: String,
}

impl MediatorClient {
    fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn call(&self, method: Method, path: &str, body: Option<Value>) -> anyhow::Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = response.status();
        let text = response.text().await?;
        let value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !status.is_success() {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            bail!("{status}: {message}");
        }
        Ok(value)
    }
}

/// Fill the `{policy_type_id}` and `{policy_instance_id}` placeholders of an endpoint.
fn endpoint(template: &str, policy_type_id: PolicyTypeId, instance_id: Option<&str>) -> String {
    let path = template.replace("{policy_type_id}", &policy_type_id.to_string());
    match instance_id {
        Some(instance_id) => path.replace("{policy_instance_id}", instance_id),
        None => path,
    }
}

fn parse_property(arg: &str) -> anyhow::Result<(&str, PropertyType)> {
    let (name, ty) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("property '{arg}' must be NAME=TYPE"))?;
    if name.is_empty() {
        bail!("property '{arg}' has an empty name");
    }
    let ty = PropertyType::parse(ty)
        .ok_or_else(|| anyhow!("property '{name}': type must be integer or boolean, got '{ty}'"))?;
    Ok((name, ty))
}

fn schema_from_args(properties: &[String], schema_file: Option<&PathBuf>) -> anyhow::Result<SchemaDefinition> {
    if let Some(path) = schema_file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        return serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()));
    }
    let parsed = properties
        .iter()
        .map(|arg| parse_property(arg))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(SchemaDefinition::with_properties(parsed))
}

fn parse_payload(data: &str) -> anyhow::Result<Value> {
    let value: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
    if !value.is_object() {
        bail!("--data must be a JSON object");
    }
    Ok(value)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = MediatorClient::new(&cli.url);

    let result = match cli.command {
        Commands::Types { action } => handle_type_action(&client, action).await?,
        Commands::Policies { action } => handle_policy_action(&client, action).await?,
        Commands::Lookup { policy_type_id } => {
            client
                .call(Method::GET, &endpoint(endpoints::LOOKUP, policy_type_id, None), None)
                .await?
        }
        Commands::Trigger { policy_type_id } => {
            client
                .call(Method::POST, &endpoint(endpoints::TRIGGER_XAPP, policy_type_id, None), None)
                .await?
        }
        Commands::Stop { policy_type_id } => {
            client
                .call(Method::POST, &endpoint(endpoints::STOP_XAPP, policy_type_id, None), None)
                .await?
        }
        Commands::Health => client.call(Method::GET, endpoints::HEALTH, None).await?,
        Commands::Stats => client.call(Method::GET, endpoints::STATS, None).await?,
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn handle_type_action(client: &MediatorClient, action: TypeAction) -> anyhow::Result<Value> {
    match action {
        TypeAction::List => client.call(Method::GET, endpoints::POLICY_TYPES, None).await,
        TypeAction::Get { policy_type_id } => {
            client
                .call(Method::GET, &endpoint(endpoints::POLICY_TYPE, policy_type_id, None), None)
                .await
        }
        TypeAction::Create {
            policy_type_id,
            name,
            description,
            properties,
            schema_file,
        } => {
            let definition = PolicyTypeDefinition {
                name,
                description,
                policy_type_id: Some(policy_type_id),
                create_schema: schema_from_args(&properties, schema_file.as_ref())?,
            };
            client
                .call(
                    Method::PUT,
                    &endpoint(endpoints::POLICY_TYPE, policy_type_id, None),
                    Some(serde_json::to_value(definition)?),
                )
                .await
        }
        TypeAction::Delete { policy_type_id } => {
            client
                .call(Method::DELETE, &endpoint(endpoints::POLICY_TYPE, policy_type_id, None), None)
                .await
        }
    }
}

async fn handle_policy_action(client: &MediatorClient, action: PolicyAction) -> anyhow::Result<Value> {
    match action {
        PolicyAction::List { policy_type_id } => {
            client
                .call(Method::GET, &endpoint(endpoints::POLICY_INSTANCES, policy_type_id, None), None)
                .await
        }
        PolicyAction::Get {
            policy_type_id,
            instance_id,
        } => {
            let path = endpoint(endpoints::POLICY_INSTANCE, policy_type_id, Some(&instance_id));
            client.call(Method::GET, &path, None).await
        }
        PolicyAction::Put {
            policy_type_id,
            instance_id,
            data,
        } => {
            let payload = parse_payload(&data)?;
            let path = endpoint(endpoints::POLICY_INSTANCE, policy_type_id, Some(&instance_id));
            client.call(Method::PUT, &path, Some(payload)).await
        }
        PolicyAction::Delete {
            policy_type_id,
            instance_id,
        } => {
            let path = endpoint(endpoints::POLICY_INSTANCE, policy_type_id, Some(&instance_id));
            client.call(Method::DELETE, &path, None).await
        }
    }
}
