mod catalog;
mod console;
mod history;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::{info, warn};
use std::env;
use std::sync::Arc;

use smartgym::db;
use smartgym::db::models::{NewExercise, NewMachine};
use smartgym::db::operations::{
    create_exercise, create_machine, create_nutrition_plan, get_machine_by_qr_code,
    put_recommendation,
};
use smartgym::goals::GoalType;
use smartgym::guidance::TrainingLevel;
use smartgym::reminders::{
    DayOutcome, PermissionStatus, ReconcileOutcome, ReconcileReport, ReminderSettings,
    ToggleOutcome,
};
use smartgym::session::{ALL_CATEGORIES, Session};

use crate::console::ConsolePlatform;
use crate::history::run_history_view;

const DEFAULT_DATABASE: &str = "smartgym.db";
const DEFAULT_USER: &str = "local";

#[derive(Parser, Debug)]
#[command(version, about = "SmartGym - Gym companion CLI", long_about = None)]
struct Args {
    /// SQLite database file (falls back to DATABASE_URL)
    #[arg(short, long)]
    database: Option<String>,
    /// Identity to sign in as (falls back to SMARTGYM_USER)
    #[arg(short, long)]
    user: Option<String>,
    /// Act as if the OS refused notification permission
    #[arg(long)]
    deny_notifications: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert a few sample machines and exercises
    Seed,
    /// Resolve a machine QR code and list its exercises
    Scan {
        qr_code: String,
        #[arg(short, long, default_value = ALL_CATEGORIES)]
        category: String,
        /// Level for the recommended load (defaults to your own)
        #[arg(short, long)]
        level: Option<String>,
    },
    /// Show a machine's nutrition plan
    Nutrition {
        qr_code: String,
        #[arg(short, long)]
        level: Option<String>,
    },
    /// Show or change your training level
    Level { level: Option<String> },
    /// Log a finished exercise
    Log {
        #[arg(short, long)]
        exercise: i64,
        #[arg(short, long)]
        series: i64,
        #[arg(short, long)]
        reps: i64,
        #[arg(short, long)]
        load: Option<f64>,
    },
    /// Per-machine performance history
    History {
        /// Print the groups as JSON instead of opening the chart screen
        #[arg(long)]
        json: bool,
        /// Print statistics and recent sessions
        #[arg(long)]
        summary: bool,
    },
    #[command(subcommand)]
    Goals(GoalCommands),
    #[command(subcommand)]
    Reminders(ReminderCommands),
}

#[derive(Subcommand, Debug)]
enum GoalCommands {
    List,
    Add {
        /// strength, endurance, weight or other
        goal_type: String,
        description: String,
    },
    Edit {
        id: i64,
        description: String,
    },
    /// Mark a goal completed, or reopen it
    Toggle { id: i64 },
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
enum ReminderCommands {
    Show,
    /// Flip one weekday on or off (0 = Sunday)
    ToggleDay { weekday: u8 },
    /// Set a weekday's reminder time as HH:MM
    SetTime { weekday: u8, time: String },
    Enable,
    Disable,
    /// Reschedule every enabled day
    Apply,
}

fn parse_time(time: &str) -> Result<(u8, u8)> {
    let (hour, minute) = time
        .trim()
        .split_once(':')
        .ok_or_else(|| anyhow!("Expected HH:MM, got '{}'", time))?;
    let hour = hour.parse().with_context(|| format!("Invalid hour in '{}'", time))?;
    let minute = minute
        .parse()
        .with_context(|| format!("Invalid minute in '{}'", time))?;
    Ok((hour, minute))
}

async fn database_path(explicit: Option<String>) -> Result<String> {
    if let Some(path) = explicit {
        db::set_db_path(&path).await?;
    }
    let path = match db::get_db_path().await {
        Ok(path) => path.clone(),
        Err(e) => {
            warn!("{}, using {}", e, DEFAULT_DATABASE);
            DEFAULT_DATABASE.to_string()
        }
    };
    Ok(path.trim_start_matches("sqlite://").to_string())
}

async fn seed(session: &Session) -> Result<()> {
    let catalog = [
        (
            "QR-PRESS-01",
            "Chest press",
            "Seated chest press",
            "Chest",
            40.0,
        ),
        ("QR-ROW-02", "Rowing machine", "Seated row", "Back", 35.0),
        ("QR-LEG-03", "Leg press", "Leg press", "Legs", 80.0),
        ("QR-BIKE-04", "Exercise bike", "Interval ride", "Cardio", 0.0),
    ];

    for (qr_code, name, title, category, load) in catalog {
        if get_machine_by_qr_code(&session.db_pool, qr_code)
            .await?
            .is_some()
        {
            info!("Machine {} already present", qr_code);
            continue;
        }
        let machine = create_machine(
            &session.db_pool,
            &NewMachine {
                qr_code: qr_code.to_string(),
                name: name.to_string(),
                description: None,
                image_url: None,
            },
        )
        .await?;
        let exercise = create_exercise(
            &session.db_pool,
            &NewExercise {
                machine_id: Some(machine.id),
                title: title.to_string(),
                category: Some(category.to_string()),
                recommended_load_kg: (load > 0.0).then_some(load),
                level: Some("beginner".to_string()),
                ..Default::default()
            },
        )
        .await?;
        println!(
            "{} [{}] -> exercise #{} {}",
            machine.name, machine.qr_code, exercise.id, exercise.title
        );

        for (level, weight_kg, reps) in catalog::recommended_loads(qr_code).into_iter().flatten() {
            put_recommendation(&session.db_pool, machine.id, level, weight_kg, reps).await?;
        }
        for plan in catalog::nutrition_plans(qr_code) {
            let plan = create_nutrition_plan(&session.db_pool, machine.id, &plan).await?;
            println!("  nutrition plan: {}", plan.title);
        }
    }
    Ok(())
}

async fn resolve_level(session: &Session, level: Option<&str>) -> Result<TrainingLevel> {
    match level {
        Some(level) => level.parse(),
        None => session.training_level().await,
    }
}

async fn scan(
    session: &Session,
    qr_code: &str,
    category: &str,
    level: Option<&str>,
) -> Result<()> {
    let Some(machine) = session.machine_by_qr_code(qr_code).await? else {
        println!("No machine registered for '{}'", qr_code.trim());
        return Ok(());
    };
    println!("{} (#{})", machine.name, machine.id);
    if let Some(description) = &machine.description {
        println!("  {}", description);
    }
    let level = resolve_level(session, level).await?;
    match session.recommendation_for(machine.id, level).await? {
        Some(r) => println!("Recommended ({}): {:.1}kg x {}", level.label(), r.weight_kg, r.reps),
        None => println!("No {} recommendation for this machine", level),
    }
    println!("Categories: {}", session.category_filters().await.join(", "));

    for exercise in session.exercises_for_machine(machine.id).await? {
        let matches = category == ALL_CATEGORIES
            || exercise
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category));
        if !matches {
            continue;
        }
        let load = exercise
            .recommended_load_kg
            .map(|l| format!(", {:.1}kg", l))
            .unwrap_or_default();
        println!(
            "  #{} {} [{}{}]",
            exercise.id,
            exercise.title,
            exercise.category.as_deref().unwrap_or("-"),
            load
        );
    }
    Ok(())
}

async fn nutrition(session: &Session, qr_code: &str, level: Option<&str>) -> Result<()> {
    let Some(machine) = session.machine_by_qr_code(qr_code).await? else {
        println!("No machine registered for '{}'", qr_code.trim());
        return Ok(());
    };
    let level = resolve_level(session, level).await?;
    let Some(plan) = session.nutrition_plan(machine.id, level).await? else {
        let available = session.nutrition_levels(machine.id).await?;
        if available.is_empty() {
            println!("{} has no nutrition plan", machine.name);
        } else {
            let names: Vec<_> = available.iter().map(|l| l.as_str()).collect();
            println!("No {} plan, try: {}", level, names.join(", "));
        }
        return Ok(());
    };

    println!("{}", plan.title);
    println!("  {}", plan.description);
    println!("Calories: {}", plan.calories);
    println!(
        "Protein {} / Carbs {} / Fats {}",
        plan.macros.protein, plan.macros.carbs, plan.macros.fats
    );
    for meal in &plan.meals {
        println!("  {} ({})", meal.time, meal.calories);
        for item in &meal.items {
            println!("    - {}", item);
        }
    }
    for tip in &plan.tips {
        println!("* {}", tip);
    }
    Ok(())
}

async fn history(session: &Session, json: bool, summary: bool) -> Result<()> {
    if summary {
        let stats = session.statistics().await?;
        println!(
            "{} sessions over {} exercises, last on {}",
            stats.total_sessions,
            stats.distinct_exercises,
            stats
                .last_session
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        for recent in session.recent_performances().await? {
            println!(
                "  {} {}: {}x{}",
                recent.performed_at.format("%d/%m %H:%M"),
                recent.exercise_title,
                recent.series_count,
                recent.reps_count
            );
        }
        return Ok(());
    }

    let groups = session.performance_history().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    let terminal = ratatui::init();
    let result = run_history_view(terminal, groups);
    ratatui::restore();
    result
}

async fn goals(session: &Session, command: GoalCommands) -> Result<()> {
    match command {
        GoalCommands::List => {}
        GoalCommands::Add {
            goal_type,
            description,
        } => {
            let goal = session
                .add_goal(goal_type.parse::<GoalType>()?, &description)
                .await?;
            println!("Added goal #{}", goal.id);
        }
        GoalCommands::Edit { id, description } => {
            session.edit_goal(id, &description).await?;
        }
        GoalCommands::Toggle { id } => {
            let goal = session.toggle_goal(id).await?;
            let state = if goal.active { "reopened" } else { "completed" };
            println!("Goal #{} {}", goal.id, state);
        }
        GoalCommands::Delete { id } => {
            session.delete_goal(id).await?;
            println!("Deleted goal #{}", id);
        }
    }

    for goal in session.active_goals().await? {
        println!("  #{} [{}] {}", goal.id, goal.goal_type, goal.description);
    }
    Ok(())
}

fn print_settings(settings: &ReminderSettings) {
    let state = if settings.enabled { "on" } else { "off" };
    println!("Reminders: {}", state);
    for day in &settings.days {
        println!(
            "  {} {:<10} {} {}{}",
            day.weekday_index(),
            day.display_name(),
            if day.enabled() { "[x]" } else { "[ ]" },
            day.time_label(),
            day.scheduled_trigger_id()
                .map(|id| format!("  (trigger {})", id))
                .unwrap_or_default()
        );
    }
}

fn print_report(report: &ReconcileReport) {
    for day in &report.days {
        match &day.outcome {
            DayOutcome::Scheduled { fire_at, .. } => println!(
                "  {}: next at {}",
                day.display_name,
                fire_at.format("%Y-%m-%d %H:%M")
            ),
            DayOutcome::Unscheduled => {}
            DayOutcome::Failed { stage, message } => {
                println!("  {}: {:?} failed: {}", day.display_name, stage, message)
            }
        }
    }
    println!("{} reminders scheduled", report.scheduled_count());
}

async fn set_enabled(
    session: &Session,
    settings: &mut ReminderSettings,
    enabled: bool,
) -> Result<()> {
    match session.set_reminders_enabled(settings, enabled).await? {
        ToggleOutcome::Enabled(report) | ToggleOutcome::Disabled(report) => print_report(&report),
        ToggleOutcome::PermissionDenied => {
            println!("Notification permission denied, reminders left off")
        }
    }
    Ok(())
}

async fn reminders(session: &Session, command: ReminderCommands) -> Result<()> {
    let mut settings = session.reminder_settings().await?;

    match command {
        ReminderCommands::Show => {}
        ReminderCommands::ToggleDay { weekday } => {
            settings.day_mut(weekday)?.toggle();
            session.save_reminder_settings(&settings).await?;
        }
        ReminderCommands::SetTime { weekday, time } => {
            let (hour, minute) = parse_time(&time)?;
            settings.day_mut(weekday)?.set_time(hour, minute)?;
            session.save_reminder_settings(&settings).await?;
        }
        ReminderCommands::Enable => set_enabled(session, &mut settings, true).await?,
        ReminderCommands::Disable => set_enabled(session, &mut settings, false).await?,
        ReminderCommands::Apply => match session.apply_reminders(&mut settings).await? {
            ReconcileOutcome::Completed(report) => print_report(&report),
            ReconcileOutcome::NotificationsDisabled => {
                println!("Reminders are off, saved without scheduling")
            }
            ReconcileOutcome::PermissionDenied => {
                println!("Notification permission denied, nothing scheduled")
            }
        },
    }

    print_settings(&settings);
    Ok(())
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let path = database_path(args.database).await?;
    let permission = PermissionStatus::from(!args.deny_notifications);
    let session = Session::new(&path, Arc::new(ConsolePlatform::new(permission))).await?;

    let user = args
        .user
        .or_else(|| env::var("SMARTGYM_USER").ok())
        .unwrap_or_else(|| DEFAULT_USER.to_string());
    session.login(&user, &user).await?;

    match args.command {
        Commands::Seed => seed(&session).await,
        Commands::Scan {
            qr_code,
            category,
            level,
        } => scan(&session, &qr_code, &category, level.as_deref()).await,
        Commands::Nutrition { qr_code, level } => {
            nutrition(&session, &qr_code, level.as_deref()).await
        }
        Commands::Level { level: None } => {
            println!("{}", session.training_level().await?.label());
            Ok(())
        }
        Commands::Level { level: Some(level) } => {
            let user = session.set_training_level(level.parse()?).await?;
            println!("{} is now {}", user.pseudo, user.general_level);
            Ok(())
        }
        Commands::Log {
            exercise,
            series,
            reps,
            load,
        } => {
            let performance = session
                .finish_exercise(exercise, series, reps, load)
                .await?;
            println!("{}", performance);
            Ok(())
        }
        Commands::History { json, summary } => history(&session, json, summary).await,
        Commands::Goals(command) => goals(&session, command).await,
        Commands::Reminders(command) => reminders(&session, command).await,
    }
}
