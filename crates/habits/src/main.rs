//! habits - Tiny daily habits, tracked locally
//!
//! "Two minutes a day, every day."
//!
//! Usage:
//!   habits                      Show today's habits
//!   habits toggle ID            Mark a habit done today (again to undo)
//!   habits add NAME             Add a habit
//!   habits archive ID           Retire a habit, keeping its history
//!   habits show ID              Month calendar for a habit
//!   habits stats [DAYS]         Streaks and completion rates
//!   habits export               Write a JSON backup
//!   habits import FILE --yes    Replace all data with a backup

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use habits::backup::APP_VERSION;
use habits::calendar::MonthView;
use habits::date::{is_future, key_for, parse_date_key, today};
use habits::habit::{Habit, HabitId, HabitPatch};
use habits::persist::FileStorage;
use habits::setup::{build_selection, SUGGESTIONS};
use habits::stats::{recent_days, HabitStats, StoreSummary};
use habits::tracker::{HabitTracker, ImportOutcome};
use habits_core::{format, Config, Paths};

/// Habits - tiny daily habits, tracked locally
#[derive(Parser)]
#[command(name = "habits")]
#[command(about = "Track a few tiny daily habits: completions, streaks and calendar history")]
#[command(version)]
#[command(after_help = r#"WHEN TO USE:
    Once a day, to tick off the small habits you are building.
    Keep the list short: a few habits done daily beat many done rarely.

EXAMPLES:
    habits                          # Today's habits with streaks
    habits toggle 1                 # Done for today (run again to undo)
    habits toggle 1 --date 2024-05-01
    habits add "Read 2 Pages" --icon 📚
    habits move 3 1                 # Move habit 3 to the top
    habits archive 2                # Retire, keeping history
    habits show 1 --month 2024-05   # Calendar for May 2024
    habits stats 30                 # 30-day statistics
    habits export --dir ~/backups   # JSON backup
    habits import backup.json --yes

DATA:
    Stored in ~/.local/share/habits (override with HABITS_DATA_DIR).
    Config in ~/.config/habits/config.json.

ALIASES:
    habits ls    # list
    habits t     # toggle
    habits cal   # show
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show active habits and today's progress
    #[command(alias = "ls")]
    List,

    /// Add a habit to the end of the list
    Add {
        /// Habit name
        name: String,

        /// Emoji icon
        #[arg(long, default_value = "✅")]
        icon: String,
    },

    /// Rename a habit
    Rename {
        id: HabitId,
        name: String,
    },

    /// Change a habit's icon
    Icon {
        id: HabitId,
        icon: String,
    },

    /// Toggle completion for a day (default: today)
    #[command(alias = "t", alias = "done")]
    Toggle {
        id: HabitId,

        /// Day to toggle (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Move a habit to a position in the list (1 = top)
    #[command(alias = "mv")]
    Move {
        id: HabitId,
        position: usize,
    },

    /// Archive a habit (stops tracking, keeps history)
    Archive {
        id: HabitId,
    },

    /// Resume an archived habit
    Resume {
        id: HabitId,
    },

    /// List archived habits
    #[command(alias = "inactive")]
    Archived,

    /// Show a month calendar for a habit
    #[command(alias = "cal")]
    Show {
        id: HabitId,

        /// Month to show (YYYY-MM, default: current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Show streaks and completion rates
    #[command(alias = "statistics")]
    Stats {
        /// Number of days in the completion window (default from config)
        #[arg(value_parser = clap::value_parser!(u32).range(1..=MAX_STATS_DAYS))]
        days: Option<u32>,
    },

    /// Choose your habits from the suggestions
    Setup {
        /// Suggestion numbers in the order you want them
        picks: Vec<usize>,

        /// Replace the current active habits
        #[arg(long)]
        yes: bool,
    },

    /// Write a JSON backup of all habits
    Export {
        /// Directory to write the backup into (default: current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Replace all habits with a JSON backup
    Import {
        file: PathBuf,

        /// Confirm replacing the current data
        #[arg(long)]
        yes: bool,
    },

    /// Delete all habit data and start over with the default habits
    Clear {
        /// Confirm deleting everything
        #[arg(long)]
        yes: bool,
    },

    /// Print the raw store as JSON
    Json,
}

// ANSI color codes
/// Upper bound for the `stats` window argument (about ten years)
const MAX_STATS_DAYS: i64 = 3650;

const GREEN: &str = "\x1b[0;32m";
const YELLOW: &str = "\x1b[0;33m";
const CYAN: &str = "\x1b[0;36m";
const MAGENTA: &str = "\x1b[0;35m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const NC: &str = "\x1b[0m";

/// Check if stdout is a TTY and colors should be used
fn use_colors() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

/// Conditionally apply color
fn color(code: &str, text: &str) -> String {
    if use_colors() {
        format!("{}{}{}", code, text, NC)
    } else {
        text.to_string()
    }
}

type Tracker = HabitTracker<FileStorage>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = Paths::new();
    let config = Config::load(&paths.config_file())?;
    let data_dir = paths.resolve_data_dir(config.data_dir.as_ref());
    let mut tracker = HabitTracker::open(FileStorage::new(&data_dir)?);

    match cli.command {
        Some(Commands::List) | None => cmd_list(&tracker),
        Some(Commands::Add { name, icon }) => cmd_add(&mut tracker, &name, &icon),
        Some(Commands::Rename { id, name }) => cmd_update(&mut tracker, id, HabitPatch::name(name)),
        Some(Commands::Icon { id, icon }) => cmd_update(&mut tracker, id, HabitPatch::icon(icon)),
        Some(Commands::Toggle { id, date }) => cmd_toggle(&mut tracker, id, date.as_deref()),
        Some(Commands::Move { id, position }) => cmd_move(&mut tracker, id, position),
        Some(Commands::Archive { id }) => cmd_archive(&mut tracker, id),
        Some(Commands::Resume { id }) => cmd_resume(&mut tracker, id),
        Some(Commands::Archived) => cmd_archived(&tracker),
        Some(Commands::Show { id, month }) => cmd_show(&tracker, id, month.as_deref()),
        Some(Commands::Stats { days }) => cmd_stats(&tracker, days.unwrap_or(config.stats_days)),
        Some(Commands::Setup { picks, yes }) => {
            cmd_setup(&mut tracker, &picks, yes, config.max_active_habits)
        }
        Some(Commands::Export { dir }) => cmd_export(&tracker, dir),
        Some(Commands::Import { file, yes }) => cmd_import(&mut tracker, &file, yes),
        Some(Commands::Clear { yes }) => cmd_clear(&mut tracker, yes),
        Some(Commands::Json) => cmd_json(&tracker),
    }
}

fn habit_label(habit: &Habit) -> String {
    format!("{} {}", habit.icon, format::truncate(&habit.name, 28))
}

/// Show today's habits
fn cmd_list(tracker: &Tracker) -> Result<()> {
    let today = today();
    let today_key = key_for(today);
    let summary = StoreSummary::from_store(tracker.store(), today, 7);

    println!(
        "{}",
        color(&format!("{}{}", BOLD, MAGENTA), &format!("HABITS  {}", today.format("%A, %B %-d")))
    );
    println!();

    if tracker.active().is_empty() {
        println!("No active habits");
        println!();
        println!("Add one with: habits add NAME, or pick some with: habits setup");
        return Ok(());
    }

    for (habit, stats) in tracker.active().iter().zip(summary.habits.iter()) {
        let check = if habit.is_done(&today_key) {
            color(GREEN, "[x]")
        } else {
            "[ ]".to_string()
        };
        let week: String = recent_days(habit, today, 7)
            .into_iter()
            .map(|done| if done { '\u{25cf}' } else { '\u{00b7}' })
            .collect();

        println!(
            "  {}. {} {:<32} {}  {}  {}",
            habit.priority,
            check,
            habit_label(habit),
            week,
            color(YELLOW, &format!("{:>3}\u{1f525}", stats.current_streak)),
            color(DIM, &format!("#{}", habit.id)),
        );
    }

    println!();
    println!(
        "  {} [{}] {}/{}",
        color(CYAN, "Today:"),
        format::progress_bar(summary.today_percent(), 20),
        summary.done_today,
        summary.active
    );
    if summary.archived > 0 {
        println!("  {} {}", color(CYAN, "Archived:"), summary.archived);
    }

    Ok(())
}

/// Add a habit
fn cmd_add(tracker: &mut Tracker, name: &str, icon: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Habit name cannot be empty");
    }

    let id = tracker.add_habit(name, icon, &Local::now());
    println!("{} Added {} (#{})", color(GREEN, "[ok]"), habit_label_for(tracker, id), id);
    Ok(())
}

fn habit_label_for(tracker: &Tracker, id: HabitId) -> String {
    tracker
        .get(id)
        .map(habit_label)
        .unwrap_or_else(|| format!("#{}", id))
}

/// Rename or re-icon a habit
fn cmd_update(tracker: &mut Tracker, id: HabitId, patch: HabitPatch) -> Result<()> {
    if let Some(ref name) = patch.name {
        if name.trim().is_empty() {
            bail!("Habit name cannot be empty");
        }
    }

    if tracker.update_habit(id, &patch) {
        println!("{} Updated {}", color(GREEN, "[ok]"), habit_label_for(tracker, id));
    } else {
        println!("{} No habit with id {}", color(CYAN, "[info]"), id);
    }
    Ok(())
}

/// Toggle completion for a day
fn cmd_toggle(tracker: &mut Tracker, id: HabitId, date: Option<&str>) -> Result<()> {
    let today = today();
    let day = match date {
        Some(d) => parse_date_key(d)?,
        None => today,
    };
    if is_future(day, today) {
        bail!("Cannot log {} yet, it is in the future", key_for(day));
    }

    let key = key_for(day);
    match tracker.toggle_log(id, &key) {
        Some(true) => println!(
            "{} {} done for {}",
            color(GREEN, "[ok]"),
            habit_label_for(tracker, id),
            key
        ),
        Some(false) => println!(
            "{} {} not done for {}",
            color(GREEN, "[ok]"),
            habit_label_for(tracker, id),
            key
        ),
        None => match tracker.get(id) {
            Some(h) if h.archived => println!(
                "{} {} is archived. Resume it with: habits resume {}",
                color(CYAN, "[info]"),
                habit_label(h),
                id
            ),
            _ => println!("{} No active habit with id {}", color(CYAN, "[info]"), id),
        },
    }
    Ok(())
}

/// Move a habit within the list
fn cmd_move(tracker: &mut Tracker, id: HabitId, position: usize) -> Result<()> {
    let len = tracker.active().len();
    if position == 0 || position > len {
        bail!("Position must be between 1 and {}", len);
    }

    if tracker.move_habit(id, position - 1) {
        println!(
            "{} Moved {} to position {}",
            color(GREEN, "[ok]"),
            habit_label_for(tracker, id),
            position
        );
    } else {
        println!("{} No active habit with id {}", color(CYAN, "[info]"), id);
    }
    Ok(())
}

/// Archive a habit
fn cmd_archive(tracker: &mut Tracker, id: HabitId) -> Result<()> {
    if tracker.archive_habit(id) {
        println!("{} Archived {}", color(GREEN, "[ok]"), habit_label_for(tracker, id));
        println!("Bring it back with: habits resume {}", id);
    } else {
        println!("{} No active habit with id {}", color(CYAN, "[info]"), id);
    }
    Ok(())
}

/// Resume an archived habit
fn cmd_resume(tracker: &mut Tracker, id: HabitId) -> Result<()> {
    if tracker.resume_habit(id) {
        println!("{} Resumed {}", color(GREEN, "[ok]"), habit_label_for(tracker, id));
    } else {
        println!("{} No archived habit with id {}", color(CYAN, "[info]"), id);
    }
    Ok(())
}

/// List archived habits
fn cmd_archived(tracker: &Tracker) -> Result<()> {
    if tracker.archived().is_empty() {
        println!("No archived habits");
        return Ok(());
    }

    println!("{}", color(BOLD, "Archived habits"));
    println!();
    for habit in tracker.archived() {
        println!(
            "  {:<32} {}  {}",
            habit_label(habit),
            color(CYAN, &format!("{} done", format::days(habit.completed_days() as u32))),
            color(DIM, &format!("#{}", habit.id)),
        );
    }
    Ok(())
}

fn parse_month(s: &str) -> Result<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok((first.year(), first.month()))
}

/// Show a month calendar for one habit
fn cmd_show(tracker: &Tracker, id: HabitId, month: Option<&str>) -> Result<()> {
    let Some(habit) = tracker.get(id) else {
        bail!("No habit with id {}", id);
    };

    let today = today();
    let (year, month) = match month {
        Some(m) => parse_month(m)?,
        None => (today.year(), today.month()),
    };
    let Some(view) = MonthView::build(habit, year, month, today) else {
        bail!("Invalid month {}-{:02}", year, month);
    };
    let stats = HabitStats::for_habit(habit, today, 30);

    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), &habit_label(habit)));
    if habit.archived {
        println!("{}", color(DIM, "(archived)"));
    }
    println!();
    println!("  {} {}", view.month_name(), view.year);
    println!("  Su  Mo  Tu  We  Th  Fr  Sa");
    for week in view.weeks() {
        let row: Vec<String> = week
            .into_iter()
            .map(|cell| match cell {
                None => "    ".to_string(),
                Some(c) if c.completed => color(GREEN, &format!("{:>2}\u{2713} ", c.day)),
                Some(c) if c.is_today => color(BOLD, &format!("{:>2}* ", c.day)),
                Some(c) if c.is_future => color(DIM, &format!("{:>2}  ", c.day)),
                Some(c) => format!("{:>2}  ", c.day),
            })
            .collect();
        println!("  {}", row.concat().trim_end());
    }
    println!();
    println!("  {}  {}", color(CYAN, "This month:"), format::days(view.completed() as u32));
    println!("  {}  {}", color(CYAN, "All time:  "), format::days(stats.total_completions));
    println!("  {}  {}", color(CYAN, "Streak:    "), format::days(stats.current_streak));
    println!("  {}  {}", color(CYAN, "Best:      "), format::days(stats.longest_streak));

    let (py, pm) = view.prev();
    let (ny, nm) = view.next();
    println!();
    println!(
        "{}",
        color(
            DIM,
            &format!("habits show {id} --month {py}-{pm:02}  |  habits show {id} --month {ny}-{nm:02}")
        )
    );
    Ok(())
}

/// Show statistics
fn cmd_stats(tracker: &Tracker, days: u32) -> Result<()> {
    let summary = StoreSummary::from_store(tracker.store(), today(), days);

    println!("{}Habit Statistics (Last {} days){}", BOLD, days, NC);
    println!();

    if summary.habits.is_empty() {
        println!("No active habits");
        return Ok(());
    }

    for (habit, stats) in tracker.active().iter().zip(summary.habits.iter()) {
        println!("  {}", color(BOLD, &habit_label(habit)));
        println!(
            "    {}  [{}] {}%",
            color(CYAN, "Completion:"),
            format::progress_bar(stats.completion_rate, 20),
            stats.completion_rate
        );
        println!(
            "    {}      {} (best {})",
            color(CYAN, "Streak:"),
            format::days(stats.current_streak),
            format::days(stats.longest_streak)
        );
        println!("    {}    {}", color(CYAN, "All time:"), format::days(stats.total_completions));
    }

    println!();
    println!(
        "  {} {}/{} done today",
        color(CYAN, "Today:"),
        summary.done_today,
        summary.active
    );
    Ok(())
}

/// Pick habits from the suggestions
fn cmd_setup(tracker: &mut Tracker, picks: &[usize], yes: bool, max: usize) -> Result<()> {
    if picks.is_empty() {
        println!("{}", color(BOLD, &format!("Choose up to {} habits", max)));
        println!();
        for (idx, (name, icon)) in SUGGESTIONS.iter().enumerate() {
            println!("  {:>2}. {} {}", idx + 1, icon, name);
        }
        println!();
        println!("Then run: habits setup 1 5 7 --yes");
        return Ok(());
    }

    let mut indices = Vec::with_capacity(picks.len());
    for &pick in picks {
        if pick == 0 {
            bail!("Suggestions are numbered from 1");
        }
        indices.push(pick - 1);
    }

    let selection = build_selection(&indices, max, Local::now().timestamp_millis())?;

    if !yes {
        println!("This replaces your {} active habits with:", tracker.active().len());
        for habit in &selection {
            println!("  {}. {} {}", habit.priority, habit.icon, habit.name);
        }
        println!();
        println!("Run again with --yes to confirm");
        return Ok(());
    }

    let count = selection.len();
    tracker.complete_setup(selection);
    println!("{} Tracking {} habits. Ready to start!", color(GREEN, "[ok]"), count);
    Ok(())
}

/// Write a backup file
fn cmd_export(tracker: &Tracker, dir: Option<PathBuf>) -> Result<()> {
    let dir = match dir {
        Some(d) => d,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let path = tracker.export_backup(&dir, today())?;
    println!("{} Exported to {}", color(GREEN, "[ok]"), path.display());
    Ok(())
}

/// Replace everything with a backup
fn cmd_import(tracker: &mut Tracker, file: &Path, yes: bool) -> Result<()> {
    let outcome = tracker.import_backup_file(file, yes)?;

    match outcome {
        ImportOutcome::Replaced { active, inactive } => println!(
            "{} Imported {} active and {} archived habits",
            color(GREEN, "[ok]"),
            active,
            inactive
        ),
        ImportOutcome::NeedsConfirmation { active, inactive } => {
            println!(
                "Backup (version {}) holds {} active and {} archived habits.",
                APP_VERSION, active, inactive
            );
            println!("Importing replaces ALL current data. Run again with --yes to confirm");
        }
    }
    Ok(())
}

/// Delete all data
fn cmd_clear(tracker: &mut Tracker, yes: bool) -> Result<()> {
    if !yes {
        println!("This deletes all habits and history. Run again with --yes to confirm");
        return Ok(());
    }

    tracker.clear_data()?;
    println!("{} All data cleared, default habits restored", color(GREEN, "[ok]"));
    Ok(())
}

/// Dump the raw store
fn cmd_json(tracker: &Tracker) -> Result<()> {
    let json = serde_json::to_string_pretty(tracker.store()).context("Failed to serialize habits")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_with_tty() {
        let result = color(GREEN, "test");
        assert!(result.contains("test"));
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-05").unwrap(), (2024, 5));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("May").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["habits", "toggle", "3", "--date", "2024-01-01"]).unwrap();
        match cli.command {
            Some(Commands::Toggle { id, date }) => {
                assert_eq!(id, 3);
                assert_eq!(date.as_deref(), Some("2024-01-01"));
            }
            _ => panic!("expected toggle"),
        }

        let cli = Cli::try_parse_from(["habits"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_stats_window_is_bounded() {
        let cli = Cli::try_parse_from(["habits", "stats", "30"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Stats { days: Some(30) })));

        assert!(Cli::try_parse_from(["habits", "stats", "3650"]).is_ok());
        assert!(Cli::try_parse_from(["habits", "stats", "0"]).is_err());
        assert!(Cli::try_parse_from(["habits", "stats", "200000000"]).is_err());
    }
}
