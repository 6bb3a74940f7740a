use chrono::NaiveDate;
use project_planner::persistence::write_analysis_csv;
use project_planner::route::{self, MockGeocoder};
use project_planner::{
    PlannerConfig, Project, ProjectError, Task, TaskId, WorkCalendarConfig,
    export_analysis_to_csv, import_tasks_from_csv, layout, load_project_from_json,
    save_project_to_json,
};
use std::fs;
use std::io::{self, Write};

/// Ids from a comma list like `1,2,3`; on failure, every token that is not an id.
fn parse_pred_list(s: &str) -> Result<Vec<TaskId>, Vec<String>> {
    let mut ids = Vec::new();
    let mut bad = Vec::new();
    for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.parse::<TaskId>() {
            Ok(id) => ids.push(id),
            Err(_) => bad.push(token.to_string()),
        }
    }
    if bad.is_empty() { Ok(ids) } else { Err(bad) }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
        line.push_str(" |");
    }
    line
}

fn render_text_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, header.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_project(project: &Project) -> String {
    let header = [
        "id", "name", "preds", "duration", "es", "ef", "ls", "lf", "slack", "critical",
    ];
    let analysis = project.analysis();
    let rows: Vec<Vec<String>> = project
        .tasks()
        .iter()
        .map(|task| {
            let preds = project
                .predecessors_of(task.id)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let mut row = vec![task.id.to_string(), task.name.clone(), preds];
            match analysis.and_then(|a| a.node(task.id)) {
                Some(node) => row.extend([
                    node.duration.to_string(),
                    node.earliest_start.to_string(),
                    node.earliest_finish.to_string(),
                    node.latest_start.to_string(),
                    node.latest_finish.to_string(),
                    node.slack.to_string(),
                    node.is_critical.to_string(),
                ]),
                None => {
                    let duration = task.duration_days(&project.config().duration);
                    row.push(duration.to_string());
                    row.extend(std::iter::repeat_n(String::new(), 6));
                }
            }
            row
        })
        .collect();
    render_text_table(&header, &rows)
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show tasks with the last computed schedule\n  add <id> <name> [hours] [preds_csv]\n                                     Upsert a task (preds like 1,2,3)\n  new <name>                         Add a task with the next free id\n  hours <id> <float>                 Set estimated_hours\n  dates <id> <start> <end>           Set planned start/end (YYYY-MM-DD)\n  dep <pred> <succ>                  Add a dependency\n  undep <pred> <succ>                Remove a dependency\n  delete <id>                        Delete a task and its dependencies\n  compute                            Refresh the critical path analysis\n  dated                              Show calendar dates for the last analysis\n  chains                             Show critical chains\n  levels                             Show dependency levels\n  route <seed>                       Sequence mock-geocoded task sites from a depot\n  meta show                          Show project metadata\n  meta name <text...>                Update project name\n  meta desc <text...>                Update project description\n  meta dates <start> <end>           Update project start/end dates (YYYY-MM-DD)\n  calendar show                      Display calendar configuration summary\n  calendar default                   Reset to default calendar for metadata span\n  calendar set <json_path>           Load calendar config from JSON file\n  save <path>                        Save project as JSON\n  load <path>                        Load project from JSON\n  import <csv_path>                  Import tasks from CSV\n  export <csv_path|->                Export the last analysis as CSV\n  quit|exit                          Exit"
    );
}

fn print_metadata(project: &Project) {
    let metadata = project.metadata();
    println!("Project name       : {}", metadata.project_name);
    println!("Project description: {}", metadata.project_description);
    println!("Project start date : {}", metadata.project_start_date);
    println!("Project end date   : {}", metadata.project_end_date);
}

fn print_calendar_info(project: &Project) {
    let config = project.calendar_config();
    let working_days = config
        .working_days()
        .iter()
        .map(|wd| wd.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!("Calendar custom    : {}", project.calendar_is_custom());
    println!("Working days       : {}", working_days);
    println!("Holidays           : {}", config.holidays().len());
    for holiday in config.holidays() {
        println!("  {} {}", holiday.date, holiday.name);
    }
}

fn report_dates_error(err: &ProjectError) {
    match err {
        ProjectError::StartAfterEnd { .. } => {
            println!("Project start date must be on or before project end date.");
        }
        ProjectError::EndPrecedesScheduleFinish {
            project_end,
            required_finish,
        } => {
            println!(
                "Project end date {} is before current schedule finish {}.",
                project_end, required_finish
            );
        }
        other => println!("Metadata update error: {}", other),
    }
}

fn parse_id(s: Option<&str>) -> Option<TaskId> {
    s.and_then(|s| s.parse::<TaskId>().ok())
}

fn main() {
    env_logger::init();

    let config = match PlannerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}; using default planner config");
            PlannerConfig::default()
        }
    };
    let mut project = Project::new().with_config(config);

    println!("Project Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_project(&project)),
            "add" => {
                let id = parse_id(parts.next());
                let name = parts.next();
                let hours_s = parts.next();
                let preds_s = parts.next();
                match (id, name) {
                    (Some(id), Some(name)) => {
                        let mut task = Task::new(id, name);
                        if let Some(hours_s) = hours_s {
                            match hours_s.parse::<f64>() {
                                Ok(hours) => task.estimated_hours = Some(hours),
                                Err(_) => {
                                    println!("Invalid hours");
                                    continue;
                                }
                            }
                        }
                        let preds = match preds_s.map(parse_pred_list).unwrap_or(Ok(Vec::new())) {
                            Ok(preds) => preds,
                            Err(bad) => {
                                for token in bad {
                                    println!("Invalid predecessor id '{token}'");
                                }
                                continue;
                            }
                        };
                        if let Err(e) = project.upsert_task(task) {
                            println!("Error: {}", e);
                            continue;
                        }
                        let mut failed = false;
                        for pred in preds {
                            if let Err(e) = project.add_dependency(pred, id) {
                                println!("Error adding dependency {pred}->{id}: {}", e);
                                failed = true;
                            }
                        }
                        if !failed {
                            println!("Task upserted.");
                        }
                        println!("{}", render_project(&project));
                    }
                    _ => println!("Usage: add <id> <name> [hours] [preds_csv]"),
                }
            }
            "new" => {
                let rest: Vec<&str> = parts.collect();
                let id = project.next_task_id();
                match project.upsert_task(Task::new(id, rest.join(" "))) {
                    Ok(_) => {
                        println!("Added task id={}", id);
                        println!("{}", render_project(&project));
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "hours" => {
                let id = parse_id(parts.next());
                let hours = parts.next().and_then(|s| s.parse::<f64>().ok());
                match (id, hours) {
                    (Some(id), Some(hours)) => match project.find_task(id).cloned() {
                        Some(mut task) => {
                            task.estimated_hours = Some(hours);
                            match project.upsert_task(task) {
                                Ok(_) => println!("estimated_hours set."),
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        None => println!("Task {id} not found."),
                    },
                    _ => println!("Usage: hours <id> <float>"),
                }
            }
            "dates" => {
                let id = parse_id(parts.next());
                let start = parts.next().and_then(parse_date);
                let end = parts.next().and_then(parse_date);
                match (id, start, end) {
                    (Some(id), Some(start), Some(end)) => match project.find_task(id).cloned() {
                        Some(task) => match project.upsert_task(task.with_dates(start, end)) {
                            Ok(_) => println!("planned dates set."),
                            Err(e) => println!("Error: {}", e),
                        },
                        None => println!("Task {id} not found."),
                    },
                    _ => println!("Usage: dates <id> <YYYY-MM-DD> <YYYY-MM-DD>"),
                }
            }
            "dep" | "undep" => {
                let pred = parse_id(parts.next());
                let succ = parse_id(parts.next());
                match (cmd, pred, succ) {
                    ("dep", Some(pred), Some(succ)) => {
                        match project.add_dependency(pred, succ) {
                            Ok(_) => println!("Dependency {pred}->{succ} added."),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    (_, Some(pred), Some(succ)) => {
                        if project.remove_dependency(pred, succ) {
                            println!("Dependency {pred}->{succ} removed.");
                        } else {
                            println!("Dependency {pred}->{succ} not found.");
                        }
                    }
                    _ => println!("Usage: {} <pred> <succ>", cmd),
                }
            }
            "delete" => match parse_id(parts.next()) {
                Some(id) => {
                    if project.delete_task(id) {
                        println!("Deleted task {id}.");
                        println!("{}", render_project(&project));
                    } else {
                        println!("Task {id} not found.");
                    }
                }
                None => println!("Usage: delete <id>"),
            },
            "compute" => match project.refresh() {
                Ok(summary) => {
                    println!(
                        "Refreshed ({})\n{}",
                        summary.to_cli_summary(),
                        render_project(&project)
                    );
                }
                Err(e) => println!("Refresh error: {}", e),
            },
            "dated" => match project.dated_nodes() {
                Ok(Some(nodes)) => {
                    let rows: Vec<Vec<String>> = nodes
                        .iter()
                        .map(|node| {
                            vec![
                                node.task_id.to_string(),
                                node.early_start.to_string(),
                                node.early_finish.to_string(),
                                node.late_start.to_string(),
                                node.late_finish.to_string(),
                                node.slack.to_string(),
                                node.is_critical.to_string(),
                            ]
                        })
                        .collect();
                    println!(
                        "{}",
                        render_text_table(
                            &["id", "early_start", "early_finish", "late_start", "late_finish", "slack", "critical"],
                            &rows
                        )
                    );
                }
                Ok(None) => println!("No analysis yet. Run 'compute' first."),
                Err(e) => println!("Dating error: {}", e),
            },
            "chains" => match project.analysis() {
                Some(analysis) => {
                    for chain in analysis.critical_chains() {
                        let chain = chain
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(" -> ");
                        println!("{chain}");
                    }
                }
                None => println!("No analysis yet. Run 'compute' first."),
            },
            "levels" => match project.levels() {
                Ok(levels) => {
                    for (level, ids) in layout::group_by_level(&levels).iter().enumerate() {
                        let ids = ids
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", ");
                        println!("level {level}: {ids}");
                    }
                }
                Err(e) => println!("Error: {}", e),
            },
            "route" => {
                let seed = parts.next().and_then(|s| s.parse::<u64>().ok()).unwrap_or(42);
                let mut geocoder = MockGeocoder::new(seed);
                let mut stops = route::locate_tasks(project.tasks(), &mut geocoder);
                let mut depot = route::TaskLocation::new(0, 50.0, 50.0).with_label("Depot");
                let planned = route::plan_route(&mut stops, &mut depot, project.config().route.metric);
                let rows: Vec<Vec<String>> = planned
                    .stops
                    .iter()
                    .map(|stop| {
                        vec![
                            stop.order_index.to_string(),
                            stop.task_id.to_string(),
                            stop.label.clone(),
                            format!("{:.2}", stop.x),
                            format!("{:.2}", stop.y),
                        ]
                    })
                    .collect();
                println!("{}", render_text_table(&["order", "id", "label", "x", "y"], &rows));
                println!("Total distance: {:.2}", planned.total_distance);
            }
            "meta" => match parts.next() {
                Some("show") | None => print_metadata(&project),
                Some("name") => {
                    let rest: Vec<&str> = parts.collect();
                    if rest.is_empty() {
                        println!("Usage: meta name <text...>");
                        continue;
                    }
                    project.set_project_name(rest.join(" "));
                    println!("Project name updated.");
                    print_metadata(&project);
                }
                Some("desc") => {
                    let rest: Vec<&str> = parts.collect();
                    if rest.is_empty() {
                        println!("Usage: meta desc <text...>");
                        continue;
                    }
                    project.set_project_description(rest.join(" "));
                    println!("Project description updated.");
                    print_metadata(&project);
                }
                Some("dates") => {
                    let start = parts.next().and_then(parse_date);
                    let end = parts.next().and_then(parse_date);
                    match (start, end) {
                        (Some(start), Some(end)) => match project.set_project_dates(start, end) {
                            Ok(_) => {
                                println!("Metadata dates updated.");
                                print_metadata(&project);
                            }
                            Err(e) => report_dates_error(&e),
                        },
                        _ => println!("Usage: meta dates <YYYY-MM-DD> <YYYY-MM-DD>"),
                    }
                }
                Some(other) => {
                    println!("Unknown meta command '{}'.", other);
                    println!("Usage: meta show|name|desc|dates ...");
                }
            },
            "calendar" => match parts.next() {
                Some("show") | None => print_calendar_info(&project),
                Some("default") => {
                    project.reset_calendar_to_default();
                    println!("Calendar reset to default.");
                    print_calendar_info(&project);
                }
                Some("set") => match parts.next() {
                    Some(path) => match fs::read_to_string(path) {
                        Ok(contents) => match serde_json::from_str::<WorkCalendarConfig>(&contents)
                        {
                            Ok(config) => match project.set_calendar_from_config(&config) {
                                Ok(_) => {
                                    println!("Calendar updated from {}.", path);
                                    print_calendar_info(&project);
                                }
                                Err(e) => println!("Error applying calendar: {}", e),
                            },
                            Err(e) => println!("Invalid calendar JSON: {}", e),
                        },
                        Err(e) => println!("Error reading {}: {}", path, e),
                    },
                    None => println!("Usage: calendar set <json_path>"),
                },
                Some(other) => {
                    println!("Unknown calendar command '{}'.", other);
                    println!("Usage: calendar show|default|set <json_path>");
                }
            },
            "save" => match parts.next() {
                Some(path) => match save_project_to_json(&project, path) {
                    Ok(_) => println!("Project saved to {}.", path),
                    Err(e) => println!("Error saving project: {}", e),
                },
                None => println!("Usage: save <path>"),
            },
            "load" => match parts.next() {
                Some(path) => match load_project_from_json(path) {
                    Ok(loaded) => {
                        project = loaded;
                        if let Err(e) = project.refresh() {
                            println!("Loaded project but refresh failed: {}", e);
                        }
                        println!("Project loaded from {}.", path);
                        println!("{}", render_project(&project));
                    }
                    Err(e) => println!("Error loading project: {}", e),
                },
                None => println!("Usage: load <path>"),
            },
            "import" => match parts.next() {
                Some(path) => match import_tasks_from_csv(&mut project, path) {
                    Ok(count) => {
                        println!("Imported {count} tasks from {}.", path);
                        println!("{}", render_project(&project));
                    }
                    Err(e) => println!("Error importing tasks: {}", e),
                },
                None => println!("Usage: import <csv_path>"),
            },
            "export" => {
                let path = parts.next();
                if project.analysis().is_none() {
                    if let Err(e) = project.refresh() {
                        println!("Refresh error: {}", e);
                        continue;
                    }
                }
                let Some(analysis) = project.analysis().cloned() else {
                    continue;
                };
                match path {
                    Some("-") => {
                        if let Err(e) = write_analysis_csv(&analysis, io::stdout()) {
                            println!("Error exporting analysis: {}", e);
                        }
                    }
                    Some(path) => match export_analysis_to_csv(&analysis, path) {
                        Ok(_) => println!("Analysis exported to {}.", path),
                        Err(e) => println!("Error exporting analysis: {}", e),
                    },
                    None => println!("Usage: export <csv_path|->"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
