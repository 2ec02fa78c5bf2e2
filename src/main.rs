mod handlers;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rentdesk", version, about = "Rental lifecycle engine with an audit trail")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Initialize the rental store
    Init,
    /// Book a new rental
    Add {
        customer: String,
        /// Start of the rental window (RFC 3339, e.g. 2024-04-12T09:00:00Z)
        #[arg(long, short = 's')]
        start: String,
        /// End of the rental window (RFC 3339)
        #[arg(long, short = 'e')]
        end: String,
        #[arg(long, short = 'v')]
        vehicle: Option<String>,
        /// Booking reference (generated from the customer name if omitted)
        #[arg(long, short = 'r')]
        reference: Option<String>,
        /// Payment status: pending, paid, partial, refunded
        #[arg(long, short = 'p')]
        payment: Option<String>,
    },
    /// List all rentals
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show fleet-wide status counts
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Hand a vehicle over (scheduled -> rented)
    Start {
        rental: String,
        #[arg(long, short = 'a')]
        actor: String,
    },
    /// Close out an active rental (rented -> completed)
    Complete {
        rental: String,
        #[arg(long, short = 'a')]
        actor: String,
        /// Number of return photos/videos captured at hand-back
        #[arg(long, short = 'm')]
        media: Option<u32>,
    },
    /// Cancel a scheduled or active rental
    Cancel {
        rental: String,
        #[arg(long, short = 'a')]
        actor: String,
        #[arg(long, short = 'r')]
        reason: String,
    },
    /// Re-derive every rental's status from the clock
    Reconcile {
        /// Also activate scheduled rentals whose window has opened
        #[arg(long)]
        auto_activate: bool,
        /// Report what would change without persisting anything
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show the audit trail
    History {
        /// Number of entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Restrict to one rental (ID or reference)
        #[arg(long)]
        rental: Option<String>,
    },
    /// Explain the status of a specific rental
    Why {
        rental: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init
        | Commands::Add { .. }
        | Commands::Start { .. }
        | Commands::Complete { .. }
        | Commands::Cancel { .. }
        | Commands::Reconcile { .. } => dispatch_write_ops(cli.command),
        Commands::List { .. }
        | Commands::Status { .. }
        | Commands::History { .. }
        | Commands::Why { .. } => dispatch_read_ops(cli.command),
    }
}

fn dispatch_write_ops(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init => handlers::init::handle(),
        Commands::Add {
            customer,
            start,
            end,
            vehicle,
            reference,
            payment,
        } => handlers::add::handle(
            &customer,
            &start,
            &end,
            vehicle.as_deref(),
            reference.as_deref(),
            payment.as_deref(),
        ),
        Commands::Start { rental, actor } => handlers::start::handle(&rental, &actor),
        Commands::Complete {
            rental,
            actor,
            media,
        } => handlers::complete::handle(&rental, &actor, media),
        Commands::Cancel {
            rental,
            actor,
            reason,
        } => handlers::cancel::handle(&rental, &actor, &reason),
        Commands::Reconcile {
            auto_activate,
            dry_run,
            json,
        } => handlers::reconcile::handle(auto_activate, dry_run, json),
        _ => unreachable!("Invalid write command dispatch"),
    }
}

fn dispatch_read_ops(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::List { json } => handlers::list::handle(json),
        Commands::Status { json } => handlers::status::handle(json),
        Commands::History { limit, rental } => {
            handlers::history::handle(limit, rental.as_deref())
        }
        Commands::Why { rental } => handlers::why::handle(&rental),
        _ => unreachable!("Invalid read command dispatch"),
    }
}
