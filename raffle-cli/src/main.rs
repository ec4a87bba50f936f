//! Raffle CLI
//!
//! Command-line interface for the Raffle API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use raffle_client::RaffleClient;
use raffle_types::{CreateNyxcipherRequest, ItemId, NyxcipherId, PaymentId, TicketId, TicketPatch};

#[derive(Parser)]
#[command(name = "raffle")]
#[command(author, version, about = "Raffle API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Raffle API
    #[arg(long, env = "RAFFLE_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Administrator key for ticket management
    #[arg(long, env = "RAFFLE_ADMIN_KEY", hide_env_values = true)]
    admin_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User operations
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Prize item operations
    Item {
        #[command(subcommand)]
        action: ItemCommands,
    },
    /// Raffle operations
    Nyxcipher {
        #[command(subcommand)]
        action: NyxcipherCommands,
    },
    /// Cart operations
    Cart {
        #[command(subcommand)]
        action: CartCommands,
    },
    /// Checkout and payment history
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Ticket administration (requires the admin key)
    Ticket {
        #[command(subcommand)]
        action: TicketCommands,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a user
    Register {
        /// Email address
        email: String,
    },
}

#[derive(Subcommand)]
enum ItemCommands {
    /// Add a prize item
    Create {
        /// Item name
        name: String,
        /// Declared value in smallest currency unit
        #[arg(long)]
        value: i64,
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum NyxcipherCommands {
    /// Open a raffle for a prize item
    Create {
        /// Raffle name
        name: String,
        /// Prize item ID (UUID)
        #[arg(long)]
        item: ItemId,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        charity: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartCommands {
    /// Show a user's cart
    Show {
        email: String,
    },
    /// Put a block of tickets into a user's cart
    Add {
        email: String,
        /// Raffle ID (UUID)
        #[arg(long)]
        nyxcipher: NyxcipherId,
        /// Number of ticket units
        #[arg(long)]
        count: u32,
        /// Price of the whole block in smallest currency unit
        #[arg(long)]
        price: i64,
    },
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Check out a user's cart
    Checkout {
        email: String,
        /// Payment processor name
        #[arg(long)]
        processor: String,
    },
    /// List a user's payment history
    History {
        email: String,
    },
    /// Get one payment record
    Get {
        email: String,
        /// Payment ID (UUID)
        id: PaymentId,
    },
}

#[derive(Subcommand)]
enum TicketCommands {
    /// Patch a ticket's descriptive fields
    Update {
        /// Ticket ID (UUID)
        id: TicketId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        item: Option<ItemId>,
        #[arg(long)]
        charity: Option<String>,
    },
    /// Delete a ticket
    Delete {
        /// Ticket ID (UUID)
        id: TicketId,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = RaffleClient::new(&cli.api_url);
    if let Some(key) = cli.admin_key {
        client = client.with_admin_key(key);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::User { action } => match action {
            UserCommands::Register { email } => {
                print_json(&client.register_user(&email).await?)?;
            }
        },

        Commands::Item { action } => match action {
            ItemCommands::Create {
                name,
                value,
                description,
            } => {
                print_json(&client.create_item(&name, description, value).await?)?;
            }
        },

        Commands::Nyxcipher { action } => match action {
            NyxcipherCommands::Create {
                name,
                item,
                category,
                charity,
            } => {
                let req = CreateNyxcipherRequest {
                    nyxcipher_name: name,
                    nyxcipher_category: category,
                    nyxcipher_item_id: item,
                    charity_recipient: charity,
                };
                print_json(&client.create_nyxcipher(&req).await?)?;
            }
        },

        Commands::Cart { action } => match action {
            CartCommands::Show { email } => {
                print_json(&client.get_cart(&email).await?)?;
            }
            CartCommands::Add {
                email,
                nyxcipher,
                count,
                price,
            } => {
                print_json(&client.add_to_cart(&email, nyxcipher, count, price).await?)?;
            }
        },

        Commands::Payment { action } => match action {
            PaymentCommands::Checkout { email, processor } => {
                print_json(&client.save_payment(&email, &processor).await?)?;
            }
            PaymentCommands::History { email } => {
                print_json(&client.get_payments_history(&email).await?)?;
            }
            PaymentCommands::Get { email, id } => {
                print_json(&client.get_payment(&email, id).await?)?;
            }
        },

        Commands::Ticket { action } => match action {
            TicketCommands::Update {
                id,
                name,
                category,
                item,
                charity,
            } => {
                let patch = TicketPatch {
                    nyxcipher_name: name,
                    nyxcipher_category: category,
                    nyxcipher_item_id: item,
                    charity_recipient: charity,
                };
                print_json(&client.update_ticket(id, &patch).await?)?;
            }
            TicketCommands::Delete { id } => {
                client.delete_ticket(id).await?;
                println!("✓ Ticket deleted");
            }
        },
    }

    Ok(())
}
