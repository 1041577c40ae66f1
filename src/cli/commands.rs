use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tb", about = concat!("taskboard v", env!("CARGO_PKG_VERSION"), " - a task board with live filters"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Board data directory (default: .taskboard)
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with a demo account
    Login(LoginArgs),
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List the demo accounts
    Users,
    /// Add a task
    Add(AddArgs),
    /// List tasks matching the current filters
    List(ListArgs),
    /// Show the board: one column per status
    Board(ListArgs),
    /// Show task details
    Show(ShowArgs),
    /// Change a task's title, description or priority
    Edit(EditArgs),
    /// Move a task to another column
    Move(MoveArgs),
    /// Assign a task to a user ("none" to unassign)
    Assign(AssignArgs),
    /// Delete a task (asks for confirmation)
    Delete(DeleteArgs),
    /// Show or change the board filters
    Filter(FilterArgs),
    /// Type a search query into the debounced search box
    Search(SearchArgs),
    /// Add a set of demo tasks
    Seed,
}

// ---------------------------------------------------------------------------
// Session args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct LoginArgs {
    pub username: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Ignore the saved filters
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID (or unique prefix)
    pub id: String,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Longer description
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Priority (low, medium, high, critical)
    #[arg(short, long, default_value = "medium")]
    pub priority: String,
    /// Initial column (todo, in-progress, done)
    #[arg(short, long, default_value = "todo")]
    pub status: String,
    /// Assign to a user (id or username)
    #[arg(short, long)]
    pub assign: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID (or unique prefix)
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long)]
    pub priority: Option<String>,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Task ID (or unique prefix)
    pub id: String,
    /// Target column (todo, in-progress, done)
    pub status: String,
}

#[derive(Args)]
pub struct AssignArgs {
    /// Task ID (or unique prefix)
    pub id: String,
    /// User id or username, or "none"
    pub user: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Task ID (or unique prefix)
    pub id: String,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Filter args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct FilterArgs {
    /// Search text (matches title or description; "" clears)
    #[arg(long)]
    pub search: Option<String>,
    /// Only tasks assigned to this user (id or username; "" clears)
    #[arg(long)]
    pub assignee: Option<String>,
    /// Only tasks with this priority ("any" clears)
    #[arg(long)]
    pub priority: Option<String>,
    /// Remove every filter
    #[arg(long, conflicts_with_all = ["search", "assignee", "priority"])]
    pub clear: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Query, typed one character at a time
    #[arg(default_value = "")]
    pub query: String,
}
