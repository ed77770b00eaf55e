use clap::{Parser, Subcommand};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;
use storage::disk::file_store::FileStore;
use storage::list::ListError;
use storage::list::engine::RecordList;
use storage::slot::cursor::Cursor;
use storage::slot::node::Node;

mod command;
use command::{Command, parse_command};

#[derive(Parser)]
#[command(name = "leafdb")]
#[command(about = "Doubly-linked record lists in fixed-slot binary files")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, default_value = "./leaf.db")]
    file: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and format a fresh record file
    Init { capacity: i64 },
    /// Run one command against the file and exit
    Exec { command: String },
    /// Interactive shell
    Shell,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let file = std::env::var("LEAFDB_FILE").unwrap_or(cli.file);

    match cli.command {
        Some(Commands::Init { capacity }) => {
            let mut list = RecordList::create(&file, capacity)?;
            list.sync()?;
            println!("Formatted {} with {} record slots", file, capacity);
        }
        Some(Commands::Exec { command }) => {
            execute_command(&command, &file)?;
        }
        Some(Commands::Shell) | None => {
            start_interactive_shell(&file)?;
        }
    }

    Ok(())
}

fn execute_command(line: &str, file: &str) -> anyhow::Result<()> {
    let cmd = parse_command(line)?;
    let mut list = RecordList::open(file)?;

    match cmd {
        Command::Append(rec) => {
            let cursor = list.insert_append(rec)?;
            println!("Appended at slot {}", cursor);
        }
        Command::Insert(rec) => {
            let cursor = list.insert_sorted(rec)?;
            println!("Inserted at slot {}", cursor);
        }
        Command::Remove { key } => {
            if !list.delete(key)? {
                return Err(ListError::KeyNotFound(key).into());
            }
            println!("Removed key {}", key);
        }
        Command::Search { key } => match list.search(key)? {
            Some((cursor, node)) => {
                println!("Slot {}: key {} | {}", cursor, node.rec.key, node.rec.payload);
            }
            None => return Err(ListError::KeyNotFound(key).into()),
        },
        Command::List => display_active(&list)?,
        Command::Slots => display_slots(&list)?,
        Command::Free => display_free(&list)?,
    }

    Ok(())
}

fn start_interactive_shell(file: &str) -> anyhow::Result<()> {
    println!("LeafDB Interactive Shell");
    println!("Type 'help' for help, 'exit' or 'quit' to quit");
    println!("Record file: {}\n", file);

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline("leafdb> ");
        match readline {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                rl.add_history_entry(line)?;

                match line.to_lowercase().as_str() {
                    "exit" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "help" => {
                        print_help();
                    }
                    "clear" | "cls" => {
                        clear_terminal();
                    }
                    _ => {
                        if let Err(e) = execute_command(line, file) {
                            println!("Error: {}", e);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

fn display_active(list: &RecordList<FileStore>) -> anyhow::Result<()> {
    let active = list.active()?;
    if active.is_empty() {
        println!("(empty list)");
        return Ok(());
    }

    render_table(
        &["Slot", "Key", "Payload", "Next", "Prev"],
        active.iter().map(|(c, n)| node_row(*c, n)).collect(),
    );
    println!("\n({} records)", active.len());

    Ok(())
}

fn display_slots(list: &RecordList<FileStore>) -> anyhow::Result<()> {
    let hdr = list.header()?;
    println!(
        "Header: count={} first={} last={} free={} capacity={}\n",
        hdr.count, hdr.first, hdr.last, hdr.free, hdr.capacity
    );

    let slots = list.slots()?;
    if slots.is_empty() {
        println!("(no slots)");
        return Ok(());
    }

    render_table(
        &["Slot", "Key", "Payload", "Next", "Prev"],
        slots.iter().map(|(c, n)| node_row(*c, n)).collect(),
    );

    Ok(())
}

fn display_free(list: &RecordList<FileStore>) -> anyhow::Result<()> {
    let chain = list.free_chain()?;
    if chain.is_empty() {
        println!("(no free slots)");
        return Ok(());
    }

    let rendered: Vec<String> = chain.iter().map(ToString::to_string).collect();
    println!("{} -> nil", rendered.join(" -> "));
    println!("\n({} free slots)", chain.len());

    Ok(())
}

fn node_row(cursor: Cursor, node: &Node) -> Vec<String> {
    vec![
        cursor.to_string(),
        node.rec.key.to_string(),
        node.rec.payload.clone(),
        node.next.to_string(),
        node.prev.to_string(),
    ]
}

fn render_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut column_widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();

    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            column_widths[i] = column_widths[i].max(cell.len());
        }
    }

    let padded_headers: Vec<String> = headers
        .iter()
        .zip(&column_widths)
        .map(|(header, &width)| format!("{:<width$}", header, width = width))
        .collect();
    println!("{}", padded_headers.join(" | "));

    let separator: Vec<String> = column_widths
        .iter()
        .map(|&width| "-".repeat(width))
        .collect();
    println!("{}", separator.join("-|-"));

    for row in &rows {
        let padded_row: Vec<String> = row
            .iter()
            .zip(&column_widths)
            .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
            .collect();
        println!("{}", padded_row.join(" | "));
    }
}

fn clear_terminal() {
    print!("\x1B[2J\x1B[1;1H");
    Write::flush(&mut std::io::stdout()).unwrap();
}

fn print_help() {
    println!("LeafDB Help:");
    println!("-----------");
    println!();
    println!("  Record Commands:");
    println!("    append <key> <payload>  - Insert at the tail of the list");
    println!("    insert <key> <payload>  - Insert keeping keys in ascending order");
    println!("    remove <key>            - Delete the record holding <key>");
    println!("    search <key>            - Look a record up by key");
    println!("    list                    - Print the active chain in link order");
    println!("    slots                   - Print the header and every slot in file order");
    println!("    free                    - Print the free chain in link order");
    println!();
    println!("  Payloads are bare words or single-quoted strings.");
    println!();
    println!("  Shell Commands:");
    println!("    help    - Show this help");
    println!("    clear   - Clear the terminal screen");
    println!("    cls     - Clear the terminal screen");
    println!("    exit    - Exit the shell");
    println!("    quit    - Exit the shell");
}
