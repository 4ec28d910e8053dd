use schedule_risk::{
    Activity, Analysis, AnalysisConfig, DurationSpec, SimulationReport, load_activities_from_csv,
    load_activities_from_json, save_activities_to_json, save_model_to_json,
};
use std::io::{self, Write};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("SCHEDULE_RISK_LOG")
            .unwrap_or_else(|_| EnvFilter::new("schedule_risk=warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .try_init();
    });
}

fn parse_pred_list(s: &str) -> Vec<String> {
    if s == "-" {
        return Vec::new();
    }
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
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
    out.push_str(&render_row(&widths, headers));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_row(&widths, &cells));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_row(widths: &[usize], cells: &[&str]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(width.saturating_sub(cell.len())));
        line.push_str(" |");
    }
    line
}

fn render_activities(analysis: &Analysis) -> String {
    let rows: Vec<Vec<String>> = analysis
        .activities()
        .iter()
        .map(|a| {
            vec![
                a.code.clone(),
                a.label.clone(),
                a.predecessors.join(","),
                a.duration.kind().to_string(),
                a.duration.params_string(),
                format!("{:.2}", a.duration.point_estimate()),
            ]
        })
        .collect();
    render_text_table(
        &["code", "label", "predecessors", "distribution", "parameters", "estimate"],
        &rows,
    )
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show current activities\n  add <code> <kind> <params_csv> [preds_csv|-] [label...]\n                                     Upsert an activity (kind: fixed|triangular|normal)\n  delete <code>                      Delete an activity and its precedences\n  load <json|csv> <path>             Load activities from disk\n  save json <path>                   Save activities to disk\n  config show                        Show analysis settings\n  config load <path>                 Load settings from a JSON file\n  config save <path>                 Save settings to a JSON file\n  seed <u64>                         Set the sampling seed\n  samples <n>                        Set the Monte Carlo sample count\n  baseline [start end]               Point-estimate critical path and CPM times\n  simulate [start end]               Run the Monte Carlo critical path simulation\n  risk [confidence]                  VaR/CVaR of the simulated durations\n  discretize                         Discretize the simulated durations\n  network build                      Build the completion-time network\n  network show                       List network variables and parents\n  network save <path>                Export the network as JSON\n  summary                            One-line session summary\n  quit|exit                          Exit"
    );
}

fn print_config(config: &AnalysisConfig) {
    println!("Samples            : {}", config.samples);
    println!("Seed               : {}", config.seed);
    println!("Method             : {}", config.method.as_str());
    println!("Confidence         : {}", config.confidence);
    println!("Horizon margin     : {}", config.horizon_margin);
    println!("Max CPT columns    : {}", config.max_cpt_columns);
    println!("Max horizon states : {}", config.max_completion_states);
    println!("Parallel           : {}", config.parallel);
    println!("Query timeout (ms) : {}", config.query_timeout_ms);
}

fn print_report(report: &SimulationReport) {
    println!(
        "Simulated {} samples from {} to {} ({} unreachable).",
        report.len(),
        report.start,
        report.end,
        report.unreachable_count()
    );
    let rows: Vec<Vec<String>> = report
        .path_frequencies()
        .into_iter()
        .take(5)
        .map(|f| {
            vec![
                f.path.join("->"),
                f.count.to_string(),
                format!("{:.3}", f.share),
            ]
        })
        .collect();
    println!("{}", render_text_table(&["critical_path", "count", "share"], &rows));
}

fn endpoints<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<(Option<&'a str>, Option<&'a str>)> {
    match (parts.next(), parts.next()) {
        (None, None) => Some((None, None)),
        (Some(start), Some(end)) => Some((Some(start), Some(end))),
        _ => None,
    }
}

fn main() {
    init_tracing();
    let mut analysis = Analysis::new();

    println!("Schedule Risk (CLI) - type 'help' for commands\n");

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
            "show" => println!("{}", render_activities(&analysis)),
            "add" => {
                let (Some(code), Some(kind), Some(params)) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    println!("Usage: add <code> <kind> <params_csv> [preds_csv|-] [label...]");
                    continue;
                };
                let duration = match DurationSpec::from_kind(kind, params) {
                    Ok(spec) => spec,
                    Err(e) => {
                        println!("Invalid duration: {}", e);
                        continue;
                    }
                };
                let preds = parts.next().map(parse_pred_list).unwrap_or_default();
                let label = parts.collect::<Vec<_>>().join(" ");
                let label = if label.is_empty() { code.to_string() } else { label };
                let activity = Activity::new(code, label, duration).with_predecessors(preds);
                match analysis.add_activity(activity) {
                    Ok(()) => println!("{}", render_activities(&analysis)),
                    Err(e) => println!("Error adding activity: {}", e),
                }
            }
            "delete" => match parts.next() {
                Some(code) => {
                    if analysis.remove_activity(code) {
                        println!("Deleted activity {code}.");
                        println!("{}", render_activities(&analysis));
                    } else {
                        println!("Activity {code} not found.");
                    }
                }
                None => println!("Usage: delete <code>"),
            },
            "load" => {
                let (Some(fmt), Some(path)) = (parts.next(), parts.next()) else {
                    println!("Usage: load <json|csv> <path>");
                    continue;
                };
                let loaded = match fmt {
                    "json" => load_activities_from_json(path),
                    "csv" => load_activities_from_csv(path),
                    _ => {
                        println!("Unknown format '{}'. Use json or csv.", fmt);
                        continue;
                    }
                };
                match loaded.map_err(|e| e.to_string()).and_then(|activities| {
                    analysis
                        .replace_activities(activities)
                        .map_err(|e| e.to_string())
                }) {
                    Ok(()) => {
                        println!("Activities loaded from {}", path);
                        println!("{}", render_activities(&analysis));
                    }
                    Err(e) => println!("Error loading activities: {}", e),
                }
            }
            "save" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => {
                    match save_activities_to_json(analysis.activities(), path) {
                        Ok(()) => println!("Activities saved to {}", path),
                        Err(e) => println!("Error saving activities: {}", e),
                    }
                }
                _ => println!("Usage: save json <path>"),
            },
            "config" => match (parts.next(), parts.next()) {
                (Some("show"), _) => print_config(analysis.config()),
                (Some("load"), Some(path)) => {
                    match AnalysisConfig::from_json_file(path)
                        .map_err(|e| e.to_string())
                        .and_then(|c| analysis.set_config(c).map_err(|e| e.to_string()))
                    {
                        Ok(()) => println!("Config loaded from {}", path),
                        Err(e) => println!("Error loading config: {}", e),
                    }
                }
                (Some("save"), Some(path)) => match analysis.config().to_json_file(path) {
                    Ok(()) => println!("Config saved to {}", path),
                    Err(e) => println!("Error saving config: {}", e),
                },
                _ => println!("Usage: config <show|load <path>|save <path>>"),
            },
            "seed" => match parts.next().map(str::parse::<u64>) {
                Some(Ok(seed)) => match analysis.update_config_with(|c| c.seed = seed) {
                    Ok(()) => println!("Seed set to {seed}."),
                    Err(e) => println!("Error updating config: {}", e),
                },
                _ => println!("Usage: seed <u64>"),
            },
            "samples" => match parts.next().map(str::parse::<usize>) {
                Some(Ok(n)) => match analysis.update_config_with(|c| c.samples = n) {
                    Ok(()) => println!("Sample count set to {n}."),
                    Err(e) => println!("Error updating config: {}", e),
                },
                _ => println!("Usage: samples <n>"),
            },
            "baseline" => {
                let Some((start, end)) = endpoints(&mut parts) else {
                    println!("Usage: baseline [start end]");
                    continue;
                };
                match analysis.baseline(start, end) {
                    Ok(baseline) => {
                        println!("Critical path: {}", baseline.path.chain());
                        println!("Project finish: {:.2}", baseline.project_finish);
                        let rows: Vec<Vec<String>> = baseline
                            .times
                            .iter()
                            .map(|t| {
                                vec![
                                    t.code.clone(),
                                    format!("{:.2}", t.duration),
                                    format!("{:.2}", t.early_start),
                                    format!("{:.2}", t.early_finish),
                                    format!("{:.2}", t.late_start),
                                    format!("{:.2}", t.late_finish),
                                    format!("{:.2}", t.total_float),
                                    t.is_critical.to_string(),
                                ]
                            })
                            .collect();
                        println!(
                            "{}",
                            render_text_table(
                                &["code", "duration", "es", "ef", "ls", "lf", "float", "critical"],
                                &rows
                            )
                        );
                    }
                    Err(e) => println!("Error computing baseline: {}", e),
                }
            }
            "simulate" => {
                let Some((start, end)) = endpoints(&mut parts) else {
                    println!("Usage: simulate [start end]");
                    continue;
                };
                match analysis.simulate(start, end) {
                    Ok(report) => print_report(report),
                    Err(e) => println!("Error running simulation: {}", e),
                }
            }
            "risk" => {
                let result = match parts.next().map(str::parse::<f64>) {
                    None => analysis.risk(),
                    Some(Ok(confidence)) => analysis.risk_at(confidence),
                    Some(Err(_)) => {
                        println!("Usage: risk [confidence]");
                        continue;
                    }
                };
                match result {
                    Ok(risk) => {
                        println!("Confidence         : {}", risk.confidence);
                        println!("Value at risk      : {:.3}", risk.value_at_risk);
                        println!("Conditional VaR    : {:.3}", risk.conditional_value_at_risk);
                        println!("Mean / std dev     : {:.3} / {:.3}", risk.mean, risk.std_dev);
                        println!("Min / max          : {:.3} / {:.3}", risk.min, risk.max);
                    }
                    Err(e) => println!("Error computing risk: {}", e),
                }
            }
            "discretize" => match analysis.discretize() {
                Ok(discretization) => {
                    let rows: Vec<Vec<String>> = discretization
                        .iter()
                        .map(|(code, dist)| {
                            vec![
                                code.to_string(),
                                dist.len().to_string(),
                                dist.labels.first().map(i64::to_string).unwrap_or_default(),
                                dist.max_label().map(|v| v.to_string()).unwrap_or_default(),
                                format!("{:.3}", dist.mean()),
                            ]
                        })
                        .collect();
                    println!(
                        "{}",
                        render_text_table(&["code", "states", "min", "max", "mean"], &rows)
                    );
                }
                Err(e) => println!("Error discretizing samples: {}", e),
            },
            "network" => match (parts.next(), parts.next()) {
                (Some("build"), _) => match analysis.build_network() {
                    Ok(model) => println!(
                        "Network built: {} variables, {} completion states.",
                        model.len(),
                        model.num_completion_states()
                    ),
                    Err(e) => println!("Error building network: {}", e),
                },
                (Some("show"), _) => match analysis.model() {
                    Some(model) => {
                        let rows: Vec<Vec<String>> = model
                            .variables()
                            .iter()
                            .map(|v| {
                                let parents = model
                                    .parents(v.id)
                                    .iter()
                                    .filter_map(|p| model.variable(*p))
                                    .map(|p| p.name.clone())
                                    .collect::<Vec<_>>()
                                    .join(",");
                                vec![v.name.clone(), v.cardinality().to_string(), parents]
                            })
                            .collect();
                        println!(
                            "{}",
                            render_text_table(&["variable", "states", "parents"], &rows)
                        );
                    }
                    None => println!("No network built yet. Run 'network build'."),
                },
                (Some("save"), Some(path)) => match analysis.model() {
                    Some(model) => match save_model_to_json(&model, path) {
                        Ok(()) => println!("Network saved to {}", path),
                        Err(e) => println!("Error saving network: {}", e),
                    },
                    None => println!("No network built yet. Run 'network build'."),
                },
                _ => println!("Usage: network <build|show|save <path>>"),
            },
            "summary" => match analysis.summary() {
                Ok(summary) => println!("{}", summary.to_cli_summary()),
                Err(e) => println!("Error summarizing: {}", e),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
