use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use clientes::domain::{
    customer::{Customer, CustomerId},
    Id,
};
use clientes_client::{Alert, ApiClient, CustomerForm, Operation, Registry};
use tracing::Level;

#[derive(Parser)]
#[command(name = "clientes", about = "Cadastro de clientes")]
struct Cli {
    /// Gateway base URL
    #[arg(long, env = "CLIENTES_API_URL", default_value = "http://localhost:3000")]
    base_url: String,
    /// Log requests and responses
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List customers, optionally filtered by name or state
    List {
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show one customer
    Get { id: String },
    /// Register a customer
    Add(FormArgs),
    /// Overwrite every field of a customer
    Edit {
        id: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Delete a customer
    Remove { id: String },
}

#[derive(Args)]
struct FormArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    age: String,
    #[arg(long)]
    state: String,
}

impl From<FormArgs> for CustomerForm {
    fn from(value: FormArgs) -> Self {
        Self {
            name: value.name,
            age: value.age,
            state: value.state,
        }
    }
}

const INVALID_ID: Alert = Alert {
    title: "Erro",
    message: "ID inválido. Deve ser um número.",
};

fn parse_id(raw: &str) -> Result<CustomerId, Alert> {
    CustomerId::parse(raw).ok_or(INVALID_ID)
}

/// One line per customer, then how many were shown.
fn render_list(customers: &[&Customer]) -> String {
    let mut out = String::new();
    for c in customers {
        out.push_str(&format!("{}\t{}\t{} anos\t{}\n", c.id, c.name, c.age, c.state));
    }
    match customers.len() {
        1 => out.push_str("1 cliente\n"),
        n => out.push_str(&format!("{} clientes\n", n)),
    }
    out
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(alert) => {
            eprintln!("{}", alert);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Alert> {
    let api = ApiClient::new(cli.base_url);
    let mut registry = Registry::new(api.clone());
    match cli.command {
        Command::List { filter } => {
            registry.refresh().await?;
            let customers = registry.filter(filter.as_deref().unwrap_or(""));
            print!("{}", render_list(&customers));
        }
        Command::Get { id } => {
            let id = parse_id(&id)?;
            match api.get(id).await.map_err(|e| Operation::Load.alert(&e))? {
                Some(c) => println!("{}\t{}\t{} anos\t{}", c.id, c.name, c.age, c.state),
                None => println!("Cliente não encontrado."),
            }
        }
        Command::Add(form) => {
            let id = registry.add(&form.into()).await?;
            println!("Cliente cadastrado com sucesso! (id {})", id);
        }
        Command::Edit { id, form } => {
            let id = parse_id(&id)?;
            registry.edit(id, &form.into()).await?;
            println!("Dados atualizados com sucesso!");
        }
        Command::Remove { id } => {
            let id = parse_id(&id)?;
            registry.remove(id).await?;
            println!("Cliente removido do sistema");
        }
    }
    Ok(())
}
