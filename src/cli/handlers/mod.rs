use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::context::BoardContext;
use crate::io::config_io;
use crate::io::storage::{FileStorage, Storage};
use crate::model::config::BoardConfig;
use crate::model::filter::FilterCriteria;
use crate::model::session::User;
use crate::model::task::{Assignee, Priority, Task, TaskChanges, TaskStatus};
use crate::ops::auth::{self, AuthOutcome, MockAuthService};
use crate::ops::filter::column_tasks;
use crate::ops::task_ops::{self, NewTask, TaskError};
use crate::store::DebouncedSearch;

/// Default board data directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = ".taskboard";

/// Modal kind used to confirm `tb delete`
const CONFIRM_DELETE: &str = "confirm-delete";

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs: stores rehydrated from disk plus settings.
struct App {
    ctx: BoardContext,
    config: BoardConfig,
    accounts: MockAuthService,
    json: bool,
}

#[derive(Clone)]
struct ConfirmDelete {
    title: String,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let data_dir = PathBuf::from(cli.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR));
    let config = config_io::read_config(&data_dir)?;
    let storage: Rc<dyn Storage> = Rc::new(FileStorage::open(&data_dir));
    if !storage.is_available() {
        return Err(format!("cannot use data directory '{}'", data_dir.display()).into());
    }
    debug!(dir = %data_dir.display(), "opened board storage");

    let s = App {
        ctx: BoardContext::with_storage(storage),
        accounts: MockAuthService::new(Duration::from_millis(config.auth.delay_ms)),
        config,
        json: cli.json,
    };

    match cli.command {
        // Session
        Commands::Login(args) => cmd_login(&s, args),
        Commands::Logout => cmd_logout(&s),
        Commands::Whoami => cmd_whoami(&s),
        Commands::Users => cmd_users(&s),

        // Read commands
        Commands::List(args) => cmd_list(&s, args),
        Commands::Board(args) => cmd_board(&s, args),
        Commands::Show(args) => cmd_show(&s, args),

        // Write commands
        Commands::Add(args) => cmd_add(&s, args),
        Commands::Edit(args) => cmd_edit(&s, args),
        Commands::Move(args) => cmd_move(&s, args),
        Commands::Assign(args) => cmd_assign(&s, args),
        Commands::Delete(args) => cmd_delete(&s, args),
        Commands::Seed => cmd_seed(&s),

        // Filters
        Commands::Filter(args) => cmd_filter(&s, args),
        Commands::Search(args) => cmd_search(&s, args),
    }
}

/// The signed-in user, or an error telling how to sign in.
fn require_user(s: &App) -> Result<User, Box<dyn std::error::Error>> {
    let user = s.ctx.auth.current_user().get();
    (*user)
        .clone()
        .ok_or_else(|| "not signed in (run `tb login <username> <password>`)".into())
}

fn resolve_task_id(s: &App, id: &str) -> Result<String, TaskError> {
    task_ops::resolve_id(&s.ctx.tasks.get_all(), id)
}

fn find_account(s: &App, id_or_username: &str) -> Result<User, TaskError> {
    s.accounts
        .find_user(id_or_username)
        .ok_or_else(|| TaskError::UnknownUser(id_or_username.to_string()))
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_task(s: &App, id: &str) -> CmdResult {
    let task = s
        .ctx
        .tasks
        .get(&id.to_string())
        .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    if s.json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        print_lines(&format_task_detail(&task));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

fn cmd_login(s: &App, args: LoginArgs) -> CmdResult {
    match auth::login(&s.ctx.auth, &s.accounts, &args.username, &args.password) {
        AuthOutcome::Success { user, .. } => {
            if s.json {
                let out = WhoamiJson {
                    authenticated: true,
                    user: Some(&user),
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Signed in as {}", format_user(&user));
            }
            Ok(())
        }
        AuthOutcome::Failure { error } => Err(error.into()),
    }
}

fn cmd_logout(s: &App) -> CmdResult {
    auth::logout(&s.ctx.auth);
    if !s.json {
        println!("Signed out");
    }
    Ok(())
}

fn cmd_whoami(s: &App) -> CmdResult {
    let session = s.ctx.auth.session();
    if s.json {
        let out = WhoamiJson {
            authenticated: session.authenticated,
            user: session.user.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    match &session.user {
        Some(user) => println!("{}", format_user(user)),
        None => println!("not signed in"),
    }
    Ok(())
}

fn cmd_users(s: &App) -> CmdResult {
    let users = s.accounts.users();
    if s.json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }
    for user in &users {
        println!("{:<10} {:<8} {}", user.id, user.username, user.display_name);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(s: &App, args: ListArgs) -> CmdResult {
    require_user(s)?;
    let tasks: Vec<Task> = if args.all {
        s.ctx.tasks.get_all().to_vec()
    } else {
        s.ctx.board.filtered().get().to_vec()
    };
    if s.json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }
    if tasks.is_empty() {
        println!("no tasks");
    }
    for task in &tasks {
        println!("{}", format_list_line(task, s.config.ui.title_width));
    }
    Ok(())
}

fn cmd_board(s: &App, args: ListArgs) -> CmdResult {
    require_user(s)?;
    let (criteria, columns) = if args.all {
        let all = s.ctx.tasks.get_all();
        let columns: Vec<(TaskStatus, Vec<Task>)> = TaskStatus::ALL
            .iter()
            .map(|&status| (status, column_tasks(&all, status)))
            .collect();
        (FilterCriteria::default(), columns)
    } else {
        let columns = TaskStatus::ALL
            .iter()
            .map(|&status| (status, s.ctx.board.column(status).get().to_vec()))
            .collect();
        ((*s.ctx.filters.criteria()).clone(), columns)
    };

    if s.json {
        println!("{}", serde_json::to_string_pretty(&board_to_json(&criteria, columns))?);
    } else {
        print_lines(&format_board(&columns, &criteria, s.config.ui.title_width));
    }
    Ok(())
}

fn cmd_show(s: &App, args: ShowArgs) -> CmdResult {
    require_user(s)?;
    let id = resolve_task_id(s, &args.id)?;
    print_task(s, &id)
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(s: &App, args: AddArgs) -> CmdResult {
    let user = require_user(s)?;
    let assignee = match &args.assign {
        Some(who) => Some(Assignee::from(&find_account(s, who)?)),
        None => None,
    };
    let new = NewTask {
        title: args.title,
        description: args.description,
        status: args.status.parse()?,
        priority: args.priority.parse()?,
        assignee,
    };
    let task = task_ops::create_task(&s.ctx.tasks, new, &user)?;
    if s.json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!("Created {}: {}", short_id(&task.id), task.title);
    }
    Ok(())
}

fn cmd_edit(s: &App, args: EditArgs) -> CmdResult {
    require_user(s)?;
    let id = resolve_task_id(s, &args.id)?;
    let changes = TaskChanges {
        title: args.title,
        description: args.description,
        priority: args.priority.as_deref().map(str::parse::<Priority>).transpose()?,
        ..Default::default()
    };
    if changes.is_empty() {
        return Err("nothing to change (use --title, --description or --priority)".into());
    }
    task_ops::edit_task(&s.ctx.tasks, &id, changes)?;
    if s.json {
        return print_task(s, &id);
    }
    println!("Updated {}", short_id(&id));
    Ok(())
}

fn cmd_move(s: &App, args: MoveArgs) -> CmdResult {
    require_user(s)?;
    let id = resolve_task_id(s, &args.id)?;
    let status: TaskStatus = args.status.parse()?;
    task_ops::move_task(&s.ctx.tasks, &id, status)?;
    if s.json {
        return print_task(s, &id);
    }
    println!("Moved {} to {}", short_id(&id), status.label());
    Ok(())
}

fn cmd_assign(s: &App, args: AssignArgs) -> CmdResult {
    require_user(s)?;
    let id = resolve_task_id(s, &args.id)?;
    let user = if args.user.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(find_account(s, &args.user)?)
    };
    task_ops::assign_task(&s.ctx.tasks, &id, user.as_ref())?;
    if s.json {
        return print_task(s, &id);
    }
    match &user {
        Some(user) => println!("Assigned {} to {}", short_id(&id), user.display_name),
        None => println!("Unassigned {}", short_id(&id)),
    }
    Ok(())
}

fn cmd_delete(s: &App, args: DeleteArgs) -> CmdResult {
    require_user(s)?;
    let id = resolve_task_id(s, &args.id)?;
    let title = s
        .ctx
        .tasks
        .get(&id)
        .map(|t| t.title)
        .ok_or_else(|| TaskError::NotFound(id.clone()))?;

    let confirm = s.ctx.modals.handler::<ConfirmDelete>(CONFIRM_DELETE);
    let modal_id = confirm.open(Some(ConfirmDelete { title }));
    let approved = args.yes || ask_confirmation(confirm.get_state(Some(modal_id.as_str())))?;
    confirm.close(Some(modal_id.as_str()));

    if !approved {
        if !s.json {
            println!("cancelled");
        }
        return Ok(());
    }
    task_ops::delete_task(&s.ctx.tasks, &id)?;
    if !s.json {
        println!("Deleted {}", short_id(&id));
    }
    Ok(())
}

/// Prompt on stderr; anything but "y" (including EOF) declines.
fn ask_confirmation(state: Option<ConfirmDelete>) -> Result<bool, std::io::Error> {
    let Some(state) = state else {
        return Ok(false);
    };
    eprint!("Delete \"{}\"? [y/n] ", state.title);
    std::io::stderr().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn cmd_seed(s: &App) -> CmdResult {
    let user = require_user(s)?;
    let seeds = task_ops::sample_tasks(&user);
    let count = seeds.len();
    s.ctx.tasks.add_many(seeds);
    if !s.json {
        println!("Added {} demo tasks", count);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

fn print_filters(s: &App) -> CmdResult {
    let criteria = s.ctx.filters.criteria();
    if s.json {
        println!("{}", serde_json::to_string_pretty(&*criteria)?);
    } else {
        println!("{}", format_filters(&criteria));
    }
    Ok(())
}

fn cmd_filter(s: &App, args: FilterArgs) -> CmdResult {
    require_user(s)?;
    let filters = &s.ctx.filters;
    if args.clear {
        filters.clear_filters();
    }
    if let Some(query) = &args.search {
        filters.set_search_query(query);
    }
    if let Some(who) = &args.assignee {
        if who.is_empty() {
            filters.set_assignee_filter(None);
        } else {
            let user = find_account(s, who)?;
            filters.set_assignee_filter(Some(&user.id));
        }
    }
    if let Some(priority) = &args.priority {
        if priority.eq_ignore_ascii_case("any") {
            filters.set_priority_filter(None);
        } else {
            filters.set_priority_filter(Some(priority.parse()?));
        }
    }
    print_filters(s)
}

/// Feed the query to the debounced search box one keystroke at a time, then
/// wait out the quiet period so only the final text reaches the filters.
fn cmd_search(s: &App, args: SearchArgs) -> CmdResult {
    require_user(s)?;
    let delay = Duration::from_millis(s.config.search.debounce_ms);
    let mut search = DebouncedSearch::new(s.ctx.filters.clone(), delay);

    let mut typed = String::new();
    search.input(&typed);
    for ch in args.query.chars() {
        typed.push(ch);
        search.input(&typed);
    }
    while !search.tick() {
        match search.time_remaining() {
            Some(wait) => thread::sleep(wait),
            None => break,
        }
    }

    cmd_board(s, ListArgs { all: false })
}
