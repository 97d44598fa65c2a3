//! triplestore — command-line interface for RDF4J-compatible triple stores
//!
//! Uses triplestore-client to talk to a running server.

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use triplestore_client::{
    ClientConfig, ContentType, QueryMethod, QueryOptions, RepositoryOptions, SelectResults,
    StatementFilter, TripleStoreClient, UpdateOptions,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "triplestore", version, about = "Triple store CLI")]
struct Cli {
    /// Server base URL
    #[arg(
        long,
        default_value = "http://localhost:8080/rdf4j-server",
        global = true,
        env = "TRIPLESTORE_URL"
    )]
    url: String,

    /// Basic auth user
    #[arg(long, global = true, env = "TRIPLESTORE_USER")]
    user: Option<String>,

    /// Basic auth password
    #[arg(long, global = true, env = "TRIPLESTORE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum RdfFormat {
    Turtle,
    Ntriples,
    Nquads,
    Rdfxml,
    Jsonld,
    Trig,
}

impl RdfFormat {
    fn content_type(self) -> ContentType {
        match self {
            RdfFormat::Turtle => ContentType::Turtle,
            RdfFormat::Ntriples => ContentType::NTriples,
            RdfFormat::Nquads => ContentType::NQuads,
            RdfFormat::Rdfxml => ContentType::RdfXml,
            RdfFormat::Jsonld => ContentType::JsonLd,
            RdfFormat::Trig => ContentType::TriG,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List repositories
    Repos,
    /// Create a repository
    Create {
        id: String,

        /// Human-readable title
        #[arg(long)]
        title: Option<String>,

        /// Sail type, e.g. openrdf:NativeStore
        #[arg(long)]
        store_type: Option<String>,
    },
    /// Delete a repository and all its data
    Drop { id: String },
    /// Count statements in a repository
    Size {
        repo: String,

        /// Restrict to these contexts (N-Triples encoded, or "null")
        #[arg(long)]
        context: Vec<String>,
    },
    /// Execute a SELECT query
    Query {
        repo: String,

        /// The SPARQL query string
        sparql: String,

        /// Send the query in the request body
        #[arg(long)]
        post: bool,

        /// Disable inferencing
        #[arg(long)]
        no_infer: bool,

        #[arg(long)]
        limit: Option<u64>,
    },
    /// Execute a SPARQL update
    Update { repo: String, sparql: String },
    /// List namespace declarations
    Namespaces { repo: String },
    /// Export statements
    Export {
        repo: String,

        /// Restrict to these contexts
        #[arg(long)]
        context: Vec<String>,

        #[arg(long, value_enum, default_value = "nquads")]
        rdf_format: RdfFormat,
    },
    /// Print the server protocol version
    Ping,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let client = match connect(&cli) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Repos => run_repos(&client, &cli.format).await,
        Commands::Create { id, title, store_type } => {
            run_create(&client, &id, title, store_type).await
        }
        Commands::Drop { id } => run_drop(&client, &id).await,
        Commands::Size { repo, context } => run_size(&client, &repo, &context).await,
        Commands::Query { repo, sparql, post, no_infer, limit } => {
            let mut options = QueryOptions::new();
            if no_infer {
                options = options.infer(false);
            }
            if let Some(limit) = limit {
                options = options.limit(limit);
            }
            let method = if post { QueryMethod::Post } else { QueryMethod::Get };
            run_query(&client, &repo, &sparql, &options, method, &cli.format).await
        }
        Commands::Update { repo, sparql } => run_update(&client, &repo, &sparql).await,
        Commands::Namespaces { repo } => run_namespaces(&client, &repo, &cli.format).await,
        Commands::Export { repo, context, rdf_format } => {
            run_export(&client, &repo, &context, rdf_format).await
        }
        Commands::Ping => run_ping(&client).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn connect(cli: &Cli) -> Result<TripleStoreClient, triplestore_client::ClientError> {
    let mut config = ClientConfig::new(&cli.url);
    if let (Some(user), Some(password)) = (&cli.user, &cli.password) {
        config = config.with_credentials(user, password);
    }
    TripleStoreClient::new(config)
}

async fn run_repos(client: &TripleStoreClient, format: &OutputFormat) -> CliResult {
    let repos = client.list_repositories().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&repos)?);
        }
        OutputFormat::Csv => {
            println!("id,title,uri,readable,writable");
            for repo in &repos {
                println!(
                    "{},{},{},{},{}",
                    csv_cell(&repo.id),
                    csv_cell(&repo.title),
                    csv_cell(&repo.uri),
                    repo.readable,
                    repo.writable
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["id", "title", "readable", "writable"]);
            for repo in &repos {
                table.add_row(vec![
                    repo.id.clone(),
                    repo.title.clone(),
                    repo.readable.to_string(),
                    repo.writable.to_string(),
                ]);
            }
            println!("{}", table);
            println!("{} repositor{}", repos.len(), if repos.len() == 1 { "y" } else { "ies" });
        }
    }

    Ok(())
}

async fn run_create(
    client: &TripleStoreClient,
    id: &str,
    title: Option<String>,
    store_type: Option<String>,
) -> CliResult {
    let mut options = RepositoryOptions::new();
    if let Some(title) = title {
        options = options.title(title);
    }
    if let Some(store_type) = store_type {
        options = options.store_type(store_type);
    }
    client.create_repository(id, &options).await?;
    println!("Created repository {}", id);
    Ok(())
}

async fn run_drop(client: &TripleStoreClient, id: &str) -> CliResult {
    client.delete_repository(id).await?;
    println!("Deleted repository {}", id);
    Ok(())
}

async fn run_size(client: &TripleStoreClient, repo: &str, contexts: &[String]) -> CliResult {
    let size = client.repository(repo).size(contexts).await?;
    println!("{}", size);
    Ok(())
}

async fn run_query(
    client: &TripleStoreClient,
    repo: &str,
    sparql: &str,
    options: &QueryOptions,
    method: QueryMethod,
    format: &OutputFormat,
) -> CliResult {
    let repo = client.repository(repo);
    let raw = repo
        .query_raw(sparql, options, ContentType::SparqlResultsJson, method)
        .await?;

    if let OutputFormat::Json = format {
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let results = triplestore_client::results::parse_select(&raw)?;
    match format {
        OutputFormat::Csv => print_csv(&results),
        _ => print_table(&results),
    }
    Ok(())
}

fn print_csv(results: &SelectResults) {
    if results.variables.is_empty() {
        return;
    }
    println!("{}", results.variables.join(","));
    for row in &results.rows {
        let cells: Vec<String> = results
            .variables
            .iter()
            .map(|var| row.get_str(var).map(csv_cell).unwrap_or_default())
            .collect();
        println!("{}", cells.join(","));
    }
}

fn print_table(results: &SelectResults) {
    if results.variables.is_empty() {
        println!("(no results)");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(&results.variables);

    for row in &results.rows {
        let cells: Vec<String> = results
            .variables
            .iter()
            .map(|var| row.get(var).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        table.add_row(cells);
    }

    println!("{}", table);
    println!("{} row(s)", results.len());
}

fn csv_cell(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

async fn run_update(client: &TripleStoreClient, repo: &str, sparql: &str) -> CliResult {
    client
        .repository(repo)
        .update(sparql, &UpdateOptions::new())
        .await?;
    println!("OK");
    Ok(())
}

async fn run_namespaces(client: &TripleStoreClient, repo: &str, format: &OutputFormat) -> CliResult {
    let namespaces = client.repository(repo).namespaces().await?;
    let mut sorted: Vec<(&String, &String)> = namespaces.iter().collect();
    sorted.sort();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&namespaces)?);
        }
        OutputFormat::Csv => {
            println!("prefix,namespace");
            for (prefix, namespace) in sorted {
                println!("{},{}", csv_cell(prefix), csv_cell(namespace));
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["prefix", "namespace"]);
            for (prefix, namespace) in sorted {
                table.add_row(vec![prefix.as_str(), namespace.as_str()]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}

async fn run_export(
    client: &TripleStoreClient,
    repo: &str,
    contexts: &[String],
    format: RdfFormat,
) -> CliResult {
    let mut filter = StatementFilter::new();
    for context in contexts {
        filter = filter.context(context);
    }
    let body = client
        .repository(repo)
        .export(&filter, format.content_type())
        .await?;
    print!("{}", body);
    Ok(())
}

async fn run_ping(client: &TripleStoreClient) -> CliResult {
    let version = client.protocol_version().await?;
    println!("protocol {}", version);
    Ok(())
}
