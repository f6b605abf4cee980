mod cli;

use clap::Parser;
use cli::{Cli, Command, ListCommand};
use habit_core::config::{self, Palette};
use habit_core::error::AppError;
use habit_core::export;
use habit_core::generate::{self, FileSource, PlanRequest, PlanSource};
use habit_core::model::{DailyTask, HabitPlan, PlanDuration};
use habit_core::plan_api::{self, SessionView};
use habit_core::progress::Progress;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "Day")]
    day: u32,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Title")]
    title: String,
}

#[derive(Tabled)]
struct CheckpointRow {
    #[tabled(rename = "Week")]
    week: u32,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Milestones")]
    milestones: String,
}

#[derive(Tabled)]
struct MessageRow {
    #[tabled(rename = "Day")]
    day: u32,
    #[tabled(rename = "Message")]
    message: String,
}

fn status_label(task: &DailyTask) -> &'static str {
    if task.completed { "completed" } else { "pending" }
}

fn print_task_json(task: &DailyTask) {
    match serde_json::to_string(task) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("ERROR: {}", AppError::invalid_data(err.to_string())),
    }
}

fn print_progress_json(progress: &Progress) {
    match serde_json::to_string(progress) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("ERROR: {}", AppError::invalid_data(err.to_string())),
    }
}

fn print_progress_plain(progress: &Progress, duration: u32, palette: &Palette) {
    println!("{}", palette.accentize("Progress"));
    println!("  Current streak:  {}", progress.current_streak);
    println!("  Longest streak:  {}", progress.longest_streak);
    println!(
        "  Completed:       {} of {} days",
        progress.total_completed, duration
    );
    println!(
        "  Consistency:     {}%",
        progress.consistency_percentage
    );
    println!(
        "  Habit strength:  {}/100",
        progress.habit_strength_score
    );
}

fn print_overview(view: &SessionView, palette: &Palette) {
    let plan = &view.plan;
    println!("{}", palette.accentize(&plan.goal));
    println!(
        "{}",
        palette.mutedize(&format!(
            "{} days | {} | preferred time: {}",
            plan.duration.days(),
            plan.difficulty.label(),
            plan.preferred_time
        ))
    );
    println!("Why: {}", plan.reason);
    println!("Viewing day {} of {}", view.current_day, plan.duration.days());
    println!();
    print_progress_plain(&view.progress, plan.duration.days(), palette);
}

fn print_day_detail(view: &SessionView, day: u32, palette: &Palette) -> Result<(), AppError> {
    let task = view
        .plan
        .task(day)
        .ok_or_else(|| AppError::task_not_found(day))?;

    println!(
        "{}",
        palette.accentize(&format!("Day {}: {}", task.day, task.title))
    );
    println!("{}", task.description);
    match task.completed_at.as_deref() {
        Some(completed_at) => println!("Status: completed at {completed_at}"),
        None => println!("Status: {}", status_label(task)),
    }
    if let Some(notes) = task.notes.as_deref() {
        println!("Notes: {notes}");
    }
    if let Some(message) = view.plan.message_for_day(day) {
        println!("{}", palette.mutedize(&format!("\"{}\"", message.message)));
    }

    Ok(())
}

fn plan_summary_json(plan: &HabitPlan) -> serde_json::Value {
    serde_json::json!({
        "id": plan.id,
        "goal": plan.goal,
        "duration": plan.duration.days(),
        "difficulty": plan.difficulty.label(),
        "daily_tasks": plan.daily_tasks.len(),
        "weekly_checkpoints": plan.weekly_checkpoints.len(),
        "motivational_messages": plan.motivational_messages.len(),
    })
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn build_request(
    goal: &str,
    reason: &str,
    preferred_time: &str,
    difficulty: &str,
    duration: u32,
    context: Option<&str>,
) -> Result<PlanRequest, AppError> {
    let difficulty = difficulty.parse()?;
    let duration = PlanDuration::try_from(duration).map_err(AppError::invalid_input)?;
    PlanRequest::new(goal, reason, preferred_time, difficulty, duration, context)
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config_load = config::load_config_with_fallback();
    if let Some(err) = config_load.error.as_ref() {
        eprintln!("WARNING: {err}");
    }
    let palette = config::palette_for_theme(config_load.config.theme.as_deref());

    match cli.command {
        Command::New {
            goal,
            reason,
            preferred_time,
            difficulty,
            duration,
            context,
            from,
        } => {
            let request = build_request(
                &goal,
                &reason,
                &preferred_time,
                &difficulty,
                duration,
                context.as_deref(),
            )?;

            let source: Box<dyn PlanSource> = match from {
                Some(path) => Box::new(FileSource::new(path)),
                None => generate::source_from_env(config_load.config.model.as_deref())?,
            };

            let plan = plan_api::generate_and_adopt(&request, source.as_ref())?;
            if cli.json {
                println!("{}", plan_summary_json(&plan));
            } else {
                println!(
                    "Adopted a {}-day plan for: {}",
                    plan.duration.days(),
                    palette.accentize(&plan.goal)
                );
                println!("Start with: habit show 1");
            }
        }
        Command::Show { day } => {
            let view = plan_api::session()?;
            if cli.json {
                match day {
                    Some(day) => {
                        let task = view
                            .plan
                            .task(day)
                            .ok_or_else(|| AppError::task_not_found(day))?;
                        print_task_json(task);
                    }
                    None => println!("{}", plan_summary_json(&view.plan)),
                }
            } else {
                match day {
                    Some(day) => print_day_detail(&view, day, &palette)?,
                    None => print_overview(&view, &palette),
                }
            }
        }
        Command::List { list } => {
            let view = plan_api::session()?;
            match list {
                ListCommand::Tasks => {
                    if cli.json {
                        let json = serde_json::to_string(&view.plan.daily_tasks)
                            .map_err(|err| AppError::invalid_data(err.to_string()))?;
                        println!("{json}");
                    } else {
                        let rows: Vec<TaskRow> = view
                            .plan
                            .daily_tasks
                            .iter()
                            .map(|task| TaskRow {
                                day: task.day,
                                status: status_label(task),
                                title: task.title.clone(),
                            })
                            .collect();
                        println!("{}", Table::new(rows));
                    }
                }
                ListCommand::Checkpoints => {
                    if cli.json {
                        let json = serde_json::to_string(&view.plan.weekly_checkpoints)
                            .map_err(|err| AppError::invalid_data(err.to_string()))?;
                        println!("{json}");
                    } else {
                        let rows: Vec<CheckpointRow> = view
                            .plan
                            .weekly_checkpoints
                            .iter()
                            .map(|checkpoint| CheckpointRow {
                                week: checkpoint.week,
                                title: checkpoint.title.clone(),
                                milestones: checkpoint.milestones.join("; "),
                            })
                            .collect();
                        println!("{}", Table::new(rows));
                    }
                }
                ListCommand::Messages => {
                    if cli.json {
                        let json = serde_json::to_string(&view.plan.motivational_messages)
                            .map_err(|err| AppError::invalid_data(err.to_string()))?;
                        println!("{json}");
                    } else {
                        let rows: Vec<MessageRow> = view
                            .plan
                            .motivational_messages
                            .iter()
                            .map(|message| MessageRow {
                                day: message.day,
                                message: message.message.clone(),
                            })
                            .collect();
                        println!("{}", Table::new(rows));
                    }
                }
            }
        }
        Command::Done { day } => {
            let outcome = plan_api::complete_task(day)?;
            if cli.json {
                let json = serde_json::json!({
                    "task": outcome.task,
                    "progress": outcome.progress,
                });
                println!("{json}");
            } else {
                println!(
                    "Completed day {}: {}",
                    outcome.task.day,
                    palette.accentize(&outcome.task.title)
                );
                println!(
                    "Streak {} | consistency {}% | strength {}/100",
                    outcome.progress.current_streak,
                    outcome.progress.consistency_percentage,
                    outcome.progress.habit_strength_score
                );
            }
        }
        Command::Note { day, text } => {
            let task = plan_api::annotate_task(day, &text)?;
            if cli.json {
                print_task_json(&task);
            } else {
                println!("Noted day {}: {}", task.day, task.title);
            }
        }
        Command::Day { day } => {
            let day = plan_api::set_current_day(day)?;
            if cli.json {
                println!("{}", serde_json::json!({ "current_day": day }));
            } else {
                println!("Now viewing day {day}");
            }
        }
        Command::Progress => {
            let view = plan_api::session()?;
            if cli.json {
                print_progress_json(&view.progress);
            } else {
                print_progress_plain(&view.progress, view.plan.duration.days(), &palette);
            }
        }
        Command::Export { output } => {
            let written = export::export_plan(output.as_deref())?;
            if cli.json {
                println!("{}", serde_json::json!({ "path": written }));
            } else {
                println!("Exported plan to {}", written.display());
            }
        }
        Command::Discard => {
            plan_api::discard_plan()?;
            if cli.json {
                println!("{}", serde_json::json!({ "discarded": true }));
            } else {
                println!("Plan discarded");
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // clap renders --help/--version through the error path too.
            if err.use_stderr() {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                std::process::exit(2);
            }
            let _ = err.print();
            return;
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
