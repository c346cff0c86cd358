mod cache;
mod controller;
mod format;
mod session;
mod transfer;

use std::path::Path;

use patrakosh_core::ApiClient;

use crate::controller::SyncController;
use crate::format::format_bytes;
use crate::session::SessionStore;
use crate::transfer::TransferHelper;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const GENERIC_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List {
        query: String,
    },
    Upload {
        path: String,
    },
    Download {
        id: i64,
        dir: Option<String>,
    },
    Rename {
        id: i64,
        name: String,
    },
    Delete {
        id: i64,
    },
    Login {
        username_or_email: String,
        password: String,
    },
    Signup {
        username: String,
        email: String,
        password: String,
        confirm_password: String,
    },
    Logout,
    Help,
}

fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    let words: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();
    match words.as_slice() {
        [] | ["list"] => Ok(Command::List {
            query: String::new(),
        }),
        ["list", query] => Ok(Command::List {
            query: (*query).to_string(),
        }),
        ["upload", path] => Ok(Command::Upload {
            path: (*path).to_string(),
        }),
        ["download", id] => Ok(Command::Download {
            id: parse_id(id)?,
            dir: None,
        }),
        ["download", id, dir] => Ok(Command::Download {
            id: parse_id(id)?,
            dir: Some((*dir).to_string()),
        }),
        ["rename", id, name] => Ok(Command::Rename {
            id: parse_id(id)?,
            name: (*name).to_string(),
        }),
        ["delete", id] => Ok(Command::Delete { id: parse_id(id)? }),
        ["login", username_or_email, password] => Ok(Command::Login {
            username_or_email: (*username_or_email).to_string(),
            password: (*password).to_string(),
        }),
        ["signup", username, email, password, confirm_password] => Ok(Command::Signup {
            username: (*username).to_string(),
            email: (*email).to_string(),
            password: (*password).to_string(),
            confirm_password: (*confirm_password).to_string(),
        }),
        ["logout"] => Ok(Command::Logout),
        ["--help"] | ["-h"] | ["help"] => Ok(Command::Help),
        other => anyhow::bail!("unknown command: {}", other.join(" ")),
    }
}

fn parse_id(raw: &str) -> anyhow::Result<i64> {
    raw.parse()
        .map_err(|_| anyhow::anyhow!("file id must be an integer, got: {raw}"))
}

fn print_usage() {
    println!("Usage: patrakosh-ui <command>");
    println!("  list [query]                                 List files, optionally filtered");
    println!("  upload <path>                                Upload a local file");
    println!("  download <id> [dir]                          Save a file locally");
    println!("  rename <id> <new-name>                       Rename a file");
    println!("  delete <id>                                  Delete a file");
    println!("  login <username-or-email> <password>         Sign in and save the session");
    println!("  signup <username> <email> <password> <confirm>");
    println!("  logout                                       Clear the saved session");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let command = parse_command(&std::env::args().collect::<Vec<_>>())?;
    let base_url =
        std::env::var("PATRAKOSH_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

    match command {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Login {
            username_or_email,
            password,
        } => {
            let api = ApiClient::new(&base_url)?;
            let session = api
                .login(&username_or_email, &password)
                .await
                .map_err(|err| {
                    anyhow::anyhow!(err.server_message().unwrap_or_else(|| "Login failed".into()))
                })?;
            SessionStore::new()?.save(&session)?;
            eprintln!("[patrakosh] logged in as {}", session.user.username);
            Ok(())
        }
        Command::Signup {
            username,
            email,
            password,
            confirm_password,
        } => {
            let api = ApiClient::new(&base_url)?;
            let session = api
                .signup(&username, &email, &password, &confirm_password)
                .await
                .map_err(|err| {
                    anyhow::anyhow!(
                        err.server_message().unwrap_or_else(|| "Signup failed".into())
                    )
                })?;
            SessionStore::new()?.save(&session)?;
            eprintln!("[patrakosh] account created for {}", session.user.username);
            Ok(())
        }
        Command::Logout => {
            SessionStore::new()?.clear()?;
            eprintln!("[patrakosh] saved session removed");
            Ok(())
        }
        command => {
            let store = SessionStore::new()?;
            let Some(session) = store.load()? else {
                anyhow::bail!("not logged in; run `patrakosh-ui login <username-or-email> <password>`");
            };
            let api = ApiClient::with_token(&base_url, session.token)?;
            run_files_command(api, command).await
        }
    }
}

async fn run_files_command(api: ApiClient, command: Command) -> anyhow::Result<()> {
    let controller = SyncController::new(api.clone());
    match command {
        Command::List { query } => {
            controller.refresh(Some(&query)).await;
        }
        Command::Upload { path } => {
            let filename = Path::new(&path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| anyhow::anyhow!("upload path has no filename: {path}"))?;
            let bytes = tokio::fs::read(&path).await?;
            controller.upload(&filename, None, bytes).await;
        }
        Command::Download { id, dir } => {
            // The record's own filename is the save-as suggestion.
            controller.load().await;
            let suggested = controller
                .view()
                .find(id)
                .map(|file| file.filename.clone())
                .unwrap_or_default();
            let helper = TransferHelper::new(api, dir.as_deref().unwrap_or("."));
            match helper.download(id, &suggested).await {
                Ok(saved) => eprintln!("[patrakosh] saved {}", saved.display()),
                Err(err) => {
                    if matches!(&err, transfer::TransferError::Api(api_err) if api_err.is_auth_error())
                    {
                        eprintln!("[patrakosh] session rejected; log in again");
                    }
                    anyhow::bail!("download failed: {err}");
                }
            }
            return Ok(());
        }
        Command::Rename { id, name } => {
            // Load first so the unchanged-name no-op can consult the record.
            controller.load().await;
            controller.rename(id, &name).await;
        }
        Command::Delete { id } => {
            controller.delete(id).await;
        }
        Command::Login { .. }
        | Command::Signup { .. }
        | Command::Logout
        | Command::Help => unreachable!("handled before session lookup"),
    }
    report(&controller);
    Ok(())
}

fn report(controller: &SyncController) {
    let state = controller.operation_state();
    if state.has_error() {
        eprintln!("[patrakosh] error: {}", state.error_message);
        return;
    }
    let view = controller.view();
    println!(
        "{} files, {} used",
        view.stats.file_count,
        format_bytes(view.stats.storage_used)
    );
    if view.items.is_empty() {
        println!("No files found");
        return;
    }
    for file in &view.items {
        println!(
            "{:>6}  {:>10}  {}  [{}]",
            file.id,
            format_bytes(file.file_size),
            file.filename,
            file.mime_type.as_deref().unwrap_or(GENERIC_MIME)
        );
    }
}
