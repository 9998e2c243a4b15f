use std::path::{Path, PathBuf};

use vidjob_core::Msg;

pub const HELP: &str = "\
Commands:
  login <user> <password>             sign in
  register <user> <email> <password>  create an account
  logout                              sign out and forget the stored session
  select <path>                       choose a video to upload
  upload                              send the selected video
  dashboard                           statistics and recent jobs
  jobs                                all jobs, paginated
  page <n> | next | prev              move between pages
  refresh                             reload the open view
  download <job id>                   save the frames archive of a completed job
  close                               leave the job views
  dismiss                             clear the current message
  help                                show this text
  quit                                exit";

/// One parsed input line.
#[derive(Debug, PartialEq)]
pub enum Command {
    Dispatch(Msg),
    /// Needs file IO before it becomes a `Msg::FileSelected`.
    Select(PathBuf),
    Help,
    Quit,
}

/// Returns `Ok(None)` for blank lines and `Err` with a usage hint otherwise.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    let Some((verb, rest)) = split_verb(line) else {
        return Ok(None);
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("login", [username, password]) => Command::Dispatch(Msg::LoginSubmitted {
            username: username.to_string(),
            password: password.to_string(),
        }),
        ("login", _) => return Err("usage: login <user> <password>".to_string()),
        ("register", [username, email, password]) => Command::Dispatch(Msg::RegisterSubmitted {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }),
        ("register", _) => return Err("usage: register <user> <email> <password>".to_string()),
        ("logout", []) => Command::Dispatch(Msg::LogoutClicked),
        // Paths may contain spaces; take the rest of the line verbatim.
        ("select", [_, ..]) => Command::Select(PathBuf::from(unquote(rest.trim()))),
        ("select", []) => return Err("usage: select <path>".to_string()),
        ("upload", []) => Command::Dispatch(Msg::UploadClicked),
        ("dashboard", []) => Command::Dispatch(Msg::DashboardOpened),
        ("jobs", []) => Command::Dispatch(Msg::JobsViewOpened),
        ("page", [page]) => match page.parse::<u32>() {
            Ok(page) => Command::Dispatch(Msg::PageRequested { page }),
            Err(_) => return Err(format!("not a page number: {page}")),
        },
        ("page", _) => return Err("usage: page <n>".to_string()),
        ("next", []) => Command::Dispatch(Msg::NextPage),
        ("prev" | "previous", []) => Command::Dispatch(Msg::PreviousPage),
        ("refresh", []) => Command::Dispatch(Msg::RefreshClicked),
        ("download", [job_id]) => match job_id.trim_start_matches('#').parse::<u64>() {
            Ok(job_id) => Command::Dispatch(Msg::DownloadClicked { job_id }),
            Err(_) => return Err(format!("not a job id: {job_id}")),
        },
        ("download", _) => return Err("usage: download <job id>".to_string()),
        ("close", []) => Command::Dispatch(Msg::ViewClosed),
        ("dismiss", []) => Command::Dispatch(Msg::DismissNotice),
        ("help" | "?", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        (other, _) => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(command))
}

fn split_verb(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest),
        None => (line, ""),
    })
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

/// Declared media type of a local file, from its extension. Unknown
/// extensions get a generic type, which upload validation rejects.
pub fn media_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" | "qt" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "wmv" => "video/x-ms-wmv",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}
