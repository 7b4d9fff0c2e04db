use std::ffi::OsString;

pub use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    /// Profile name
    /// Profile section to read from the profile file. Default is 'default'.
    /// A missing profile file means built-in defaults.
    #[clap(short = 'p', long, default_value = "default", help = "profile name")]
    profile: String,

    /// Storefront base URL, overriding the profile
    #[clap(short = 'u', long, help = "storefront base URL")]
    url: Option<String>,

    #[clap(short = 'v', long, help = "verbose logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// What to do against the storefront
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show or change the server-side cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
    /// List products, optionally searched, filtered, sorted and paged
    Products(ProductQuery),
    /// Show or toggle the saved color theme
    Theme {
        #[command(subcommand)]
        action: ThemeCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    /// Number of items in the cart
    Count,
    /// Add a product
    Add {
        product_id: u64,
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
        /// Go to checkout afterwards
        #[arg(long)]
        checkout: bool,
    },
    /// Remove a product
    Remove { product_id: u64 },
    /// Set a product's quantity; zero or less removes it
    Update { product_id: u64, quantity: i64 },
    /// Empty the cart
    Clear,
}

#[derive(clap::Args, Debug, Clone, PartialEq, Default)]
pub struct ProductQuery {
    #[arg(short, long)]
    pub query: Option<String>,
    #[arg(long)]
    pub min_price: Option<String>,
    #[arg(long)]
    pub max_price: Option<String>,
    /// Tag filter; repeat for several tags
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
    #[arg(short, long)]
    pub sort: Option<String>,
    #[arg(long)]
    pub page: Option<u32>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeCommand {
    Show,
    Toggle,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    profile: String,
    url: Option<String>,
    verbose: bool,
    command: Command,
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        Self::from_clap(ClapArgs::parse())
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::from_clap(ClapArgs::parse_from(itr))
    }

    fn from_clap(args: ClapArgs) -> Self {
        Self {
            profile: args.profile,
            url: args.url,
            verbose: args.verbose,
            command: args.command,
        }
    }

    pub fn profile(&self) -> &String {
        &self.profile
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}
