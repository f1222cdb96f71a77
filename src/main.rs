use std::io;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use nudge::commands::*;
use nudge::config::Config;
use nudge::error::NudgeError;
use nudge::models::{Priority, RecurrenceType, TaskCategory, TaskType};
use nudge::storage::Store;

#[derive(Parser)]
#[command(name = "nudge")]
#[command(about = "Task tracker with expected-vs-actual success scoring", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database (migrate, and seed sample data in development)
    Init,
    /// Add a new task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
        /// How success is measured
        #[arg(short = 't', long = "type", value_enum)]
        task_type: TypeArg,
        /// Task category
        #[arg(short, long, value_enum)]
        category: Option<CategoryArg>,
        /// Priority 1 (low) to 4 (critical)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
        priority: Option<u8>,
        /// Expected duration in minutes (required for time/commute tasks)
        #[arg(short = 'd', long)]
        expected_duration: Option<u32>,
        /// Expected units (required for unit tasks)
        #[arg(short = 'u', long)]
        expected_units: Option<u32>,
        /// Deadline in YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        deadline: Option<NaiveDate>,
        /// Free-form tag
        #[arg(long)]
        tag: Option<String>,
        /// Notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List tasks with their success percentage
    List {
        /// Include completed, failed and deferred tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Mark a task as completed, recording actual values
    Complete {
        /// Task id (a unique prefix is enough)
        id: String,
        /// Actual duration in minutes
        #[arg(short = 'd', long)]
        actual_duration: Option<u32>,
        /// Actual units delivered
        #[arg(short = 'u', long)]
        actual_units: Option<u32>,
    },
    /// Remove a task
    Remove {
        /// Task id (a unique prefix is enough)
        id: String,
    },
    /// Manage recurring definitions
    Recurring {
        #[command(subcommand)]
        command: RecurringCommands,
    },
    /// Insert development sample data
    Seed,
    /// Delete all data (keeps the schema)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum RecurringCommands {
    /// Add a recurring definition
    Add {
        /// Definition name
        name: String,
        /// Recurrence rule kind
        #[arg(short = 't', long = "type", value_enum)]
        recurrence_type: RecurArg,
        /// Every N days (daily)
        #[arg(long)]
        interval: Option<u32>,
        /// Days of week, 0=Sunday (weekly), e.g. --days 1,3
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<u8>>,
        /// Day of month 1-31 (monthly-date)
        #[arg(long)]
        day_of_month: Option<u8>,
        /// Named pattern such as first_monday (monthly-pattern)
        #[arg(long)]
        pattern: Option<String>,
    },
    /// List recurring definitions
    List,
    /// Remove a definition and every task referencing it
    Remove {
        /// Full definition id
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Unit,
    Time,
    Commute,
}

impl From<TypeArg> for TaskType {
    fn from(v: TypeArg) -> Self {
        match v {
            TypeArg::Unit => TaskType::UnitBased,
            TypeArg::Time => TaskType::TimeBased,
            TypeArg::Commute => TaskType::Commute,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Anchor,
    Transit,
    Action,
}

impl From<CategoryArg> for TaskCategory {
    fn from(v: CategoryArg) -> Self {
        match v {
            CategoryArg::Anchor => TaskCategory::Anchor,
            CategoryArg::Transit => TaskCategory::Transit,
            CategoryArg::Action => TaskCategory::Action,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RecurArg {
    Daily,
    Weekly,
    MonthlyDate,
    MonthlyPattern,
}

impl From<RecurArg> for RecurrenceType {
    fn from(v: RecurArg) -> Self {
        match v {
            RecurArg::Daily => RecurrenceType::Daily,
            RecurArg::Weekly => RecurrenceType::Weekly,
            RecurArg::MonthlyDate => RecurrenceType::MonthlyDate,
            RecurArg::MonthlyPattern => RecurrenceType::MonthlyPattern,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{s}': {e}. Use YYYY-MM-DD."))
}

fn priority_from(p: u8) -> Priority {
    match p {
        1 => Priority::Low,
        2 => Priority::Medium,
        3 => Priority::High,
        _ => Priority::Critical,
    }
}

fn init_tracing(config: &Config) {
    let default = if config.is_development() { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(&config);

    if let Err(e) = run(cli, &config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &Config) -> Result<(), NudgeError> {
    match cli.command.unwrap_or(Commands::Init) {
        Commands::Init => cmd_init(config),
        Commands::Add {
            name,
            task_type,
            category,
            priority,
            expected_duration,
            expected_units,
            deadline,
            tag,
            notes,
        } => {
            let store = Store::connect(config)?;
            cmd_add(
                &store,
                name,
                task_type.into(),
                category.map(Into::into),
                priority.map(priority_from),
                expected_duration,
                expected_units,
                deadline,
                tag,
                notes,
            )
        }
        Commands::List { all } => {
            let store = Store::connect(config)?;
            cmd_list(&store, all)
        }
        Commands::Complete {
            id,
            actual_duration,
            actual_units,
        } => {
            let store = Store::connect(config)?;
            cmd_complete(&store, &id, actual_duration, actual_units)
        }
        Commands::Remove { id } => {
            let store = Store::connect(config)?;
            cmd_remove(&store, &id)
        }
        Commands::Recurring { command } => {
            let store = Store::connect(config)?;
            match command {
                RecurringCommands::Add {
                    name,
                    recurrence_type,
                    interval,
                    days,
                    day_of_month,
                    pattern,
                } => cmd_recurring_add(
                    &store,
                    name,
                    recurrence_type.into(),
                    interval,
                    days,
                    day_of_month,
                    pattern,
                ),
                RecurringCommands::List => cmd_recurring_list(&store),
                RecurringCommands::Remove { id } => cmd_recurring_remove(&store, &id),
            }
        }
        Commands::Seed => {
            let store = Store::connect(config)?;
            cmd_seed(&store)
        }
        Commands::Reset { force } => {
            let store = Store::connect(config)?;
            cmd_reset(&store, force)
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "nudge", &mut io::stdout());
            Ok(())
        }
    }
}
