use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pivot",
    about = "Faceted filtering and search over JSON collections",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply filters and a search term, print qualifying items
    Query {
        /// Path to the collection JSON file
        #[arg(short, long)]
        input: String,

        /// Facet filter, `Facet=Value` or `Facet=lo..hi` (repeatable)
        #[arg(short, long)]
        filter: Vec<String>,

        /// Free-text search term
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print a value-frequency table for a facet
    Tally {
        /// Path to the collection JSON file
        #[arg(short, long)]
        input: String,

        /// Facet name
        facet: String,

        /// Ordering: quantity (default), alpha, or ranked
        #[arg(long, default_value = "quantity")]
        order: String,
    },

    /// Print the two-scale temporal histogram for a DateTime facet
    Buckets {
        /// Path to the collection JSON file
        #[arg(short, long)]
        input: String,

        /// Facet name
        facet: String,
    },

    /// List the collection's filterable facets in display order
    Facets {
        /// Path to the collection JSON file
        #[arg(short, long)]
        input: String,
    },

    /// Show one item's details
    Show {
        /// Path to the collection JSON file
        #[arg(short, long)]
        input: String,

        /// Item id
        id: String,
    },
}
