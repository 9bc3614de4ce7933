use chrono::{Local, NaiveDate};
use khutba_roster::persistence::{self, RosterStore};
use khutba_roster::{
    DEFAULT_WINDOW_WEEKS, EDIT_HORIZON_DAYS, EditChoice, RosterConfig, RosterEntry, SpeakerKind,
    apply_edit, load_roster_from_csv, load_roster_from_json, save_roster_to_csv,
    save_roster_to_json, Roster,
};
use std::io::{self, Write};

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    out.push('|');
    for (i, name) in headers.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        let pad = widths[i] - name.len();
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row in rows {
        out.push('|');
        for (ci, cell) in row.iter().enumerate() {
            out.push(' ');
            out.push_str(cell);
            let pad = widths[ci].saturating_sub(cell.len());
            if pad > 0 {
                out.push_str(&" ".repeat(pad));
            }
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn roster_rows(entries: &[RosterEntry], config: &RosterConfig) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|entry| {
            let kind = SpeakerKind::classify(&entry.khatib, config);
            vec![
                entry.date.format("%d %b").to_string(),
                entry.khatib.clone(),
                kind.label().to_string(),
            ]
        })
        .collect()
}

fn print_upcoming(roster: &Roster, config: &RosterConfig, today: NaiveDate) {
    match roster.upcoming(today, EDIT_HORIZON_DAYS) {
        Ok(entries) => {
            println!(
                "{}",
                render_table(&["Friday", "Khatib", "Kind"], &roster_rows(&entries, config))
            );
        }
        Err(e) => println!("Error reading roster: {e}"),
    }
}

fn print_all(roster: &Roster, config: &RosterConfig) {
    match roster.entries() {
        Ok(mut entries) => {
            entries.sort_by_key(|entry| entry.date);
            println!(
                "{}",
                render_table(&["Date", "Khatib", "Kind"], &roster_rows(&entries, config))
            );
        }
        Err(e) => println!("Error reading roster: {e}"),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show upcoming Fridays (next {EDIT_HORIZON_DAYS} days)\n  all                                Show every stored entry\n  reconcile                          Fill window gaps and persist the extension\n  edit <YYYY-MM-DD> regular <name>   Book a regular khatib (prompts for PIN)\n  edit <YYYY-MM-DD> guest <name...>  Book a guest khatib (prompts for PIN)\n  edit <YYYY-MM-DD> clear            Clear the slot back to unbooked (prompts for PIN)\n  save <json|csv> <path>             Export roster to disk\n  load <json|csv> <path>             Replace in-memory roster from disk\n  quit|exit                          Exit"
    );
}

fn reconcile_and_persist(
    roster: &mut Roster,
    store: &dyn RosterStore,
    store_ok: bool,
    today: NaiveDate,
) {
    match roster.reconcile(today, DEFAULT_WINDOW_WEEKS) {
        Ok(summary) if summary.extended() => {
            if !store_ok {
                println!("Store unavailable; schedule extension not persisted.");
                return;
            }
            match store.save_roster(roster) {
                Ok(()) => println!("Schedule extended ({}).", summary.to_cli_summary()),
                Err(e) => println!("Error persisting extension: {e}"),
            }
        }
        Ok(summary) => println!("Schedule already complete ({}).", summary.to_cli_summary()),
        Err(e) => println!("Reconcile error: {e}"),
    }
}

fn prompt_pin(stdin: &io::Stdin) -> Option<String> {
    print!("PIN: ");
    let _ = io::stdout().flush();
    let mut pin = String::new();
    if stdin.read_line(&mut pin).is_err() {
        return None;
    }
    Some(pin.trim().to_string())
}

fn main() {
    let config = match RosterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };
    let store = match persistence::store_from_env() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Store error: {e}");
            std::process::exit(1);
        }
    };

    let today = Local::now().date_naive();
    let mut store_ok = true;
    let mut roster = match store.load_roster() {
        Ok(Some(roster)) => roster,
        Ok(None) => {
            println!("No stored roster yet; starting empty.");
            Roster::new()
        }
        Err(e) => {
            println!("Warning: {e}. Display only; edits are disabled until a successful load.");
            store_ok = false;
            Roster::new()
        }
    };

    println!("Khutba Roster (CLI) - type 'help' for commands\n");
    if store_ok {
        reconcile_and_persist(&mut roster, store.as_ref(), store_ok, today);
    }
    print_upcoming(&roster, &config, today);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let today = Local::now().date_naive();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_upcoming(&roster, &config, today),
            "all" => print_all(&roster, &config),
            "reconcile" => {
                reconcile_and_persist(&mut roster, store.as_ref(), store_ok, today);
                print_upcoming(&roster, &config, today);
            }
            "edit" => {
                if !store_ok {
                    println!("Store unavailable; edits are disabled.");
                    continue;
                }
                let date_s = parts.next();
                let choice_s = parts.next();
                let name = parts.collect::<Vec<_>>().join(" ");
                let (date_s, choice_s) = match (date_s, choice_s) {
                    (Some(d), Some(c)) => (d, c),
                    _ => {
                        println!("Usage: edit <YYYY-MM-DD> <regular|guest|clear> [name]");
                        continue;
                    }
                };
                let date = match NaiveDate::parse_from_str(date_s, "%Y-%m-%d") {
                    Ok(d) => d,
                    Err(_) => {
                        println!("Invalid date (YYYY-MM-DD)");
                        continue;
                    }
                };
                let choice = match choice_s {
                    "regular" => EditChoice::Regular { name: name.clone() },
                    "guest" => EditChoice::Guest { name: name.clone() },
                    "clear" => EditChoice::Clear,
                    _ => {
                        println!("Choice must be regular, guest or clear");
                        continue;
                    }
                };
                let Some(pin) = prompt_pin(&stdin) else { break };
                match apply_edit(
                    &mut roster,
                    store.as_ref(),
                    &config,
                    today,
                    &pin,
                    date,
                    &choice,
                ) {
                    Ok(updated) => {
                        println!("Saved: {} -> {}.", updated.date, updated.khatib);
                        print_upcoming(&roster, &config, today);
                    }
                    Err(e) => println!("Edit rejected: {e}"),
                }
            }
            "save" | "load" => {
                let format = parts.next();
                let path = parts.next();
                let (format, path) = match (format, path) {
                    (Some(f), Some(p)) => (f, p),
                    _ => {
                        println!("Usage: {cmd} <json|csv> <path>");
                        continue;
                    }
                };
                let result = match (cmd, format) {
                    ("save", "json") => save_roster_to_json(&roster, path).map(|_| None),
                    ("save", "csv") => save_roster_to_csv(&roster, path).map(|_| None),
                    ("load", "json") => load_roster_from_json(path).map(Some),
                    ("load", "csv") => load_roster_from_csv(path).map(Some),
                    _ => {
                        println!("Format must be json or csv");
                        continue;
                    }
                };
                match result {
                    Ok(Some(loaded)) => {
                        roster = loaded;
                        println!("Roster loaded from {path}.");
                        print_all(&roster, &config);
                    }
                    Ok(None) => println!("Roster saved to {path}."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }
}
